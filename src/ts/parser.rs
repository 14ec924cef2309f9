use crate::cst::{Cst, CstBuilder, Span};
use crate::ts::errors::TreeSitterError;
use ast_grep_language::{LanguageExt, SupportLang};
use tree_sitter::{Parser, Tree};

/// C and C++ front end. One grammar covers both: the C++ grammar accepts the
/// C subset the rules care about.
pub struct CppParser {
    parser: Parser,
}

impl CppParser {
    pub fn new() -> Result<Self, TreeSitterError> {
        let mut parser = Parser::new();
        // Grammar comes bundled with ast-grep-language
        let grammar = SupportLang::Cpp.get_ts_language();
        parser
            .set_language(&grammar)
            .map_err(|_| TreeSitterError::LanguageSet)?;

        Ok(Self { parser })
    }

    pub fn parse(&mut self, source: &str) -> Result<Tree, TreeSitterError> {
        self.parser
            .parse(source, None)
            .ok_or(TreeSitterError::ParseFailed)
    }

    /// Parse, keeping the source next to the tree for later extraction.
    pub fn parse_with_source<'a>(
        &mut self,
        source: &'a str,
    ) -> Result<ParsedSource<'a>, TreeSitterError> {
        let tree = self.parse(source)?;
        Ok(ParsedSource { source, tree })
    }

    /// Parse straight into the arena form the rewrite engine consumes.
    pub fn parse_cst(&mut self, source: &str) -> Result<Cst, TreeSitterError> {
        self.parse_with_source(source)?.to_cst()
    }
}

pub struct ParsedSource<'a> {
    pub source: &'a str,
    pub tree: Tree,
}

impl ParsedSource<'_> {
    pub fn root_kind(&self) -> &'static str {
        self.tree.root_node().kind()
    }

    /// True when tree-sitter had to recover from at least one syntax error.
    /// Such trees are still usable; the recovered regions simply match no rule.
    pub fn has_errors(&self) -> bool {
        self.tree.root_node().has_error()
    }

    /// ERROR and MISSING nodes in source order.
    pub fn syntax_issues(&self) -> Vec<SyntaxIssue> {
        let mut issues = Vec::new();
        let mut cursor = self.tree.walk();
        loop {
            let node = cursor.node();
            if node.is_error() || node.is_missing() {
                let at = node.start_position();
                issues.push(SyntaxIssue {
                    span: Span::new(node.start_byte(), node.end_byte()),
                    line: at.row + 1,
                    column: at.column + 1,
                    missing: node.is_missing(),
                });
            }
            if node.has_error() && cursor.goto_first_child() {
                continue;
            }
            while !cursor.goto_next_sibling() {
                if !cursor.goto_parent() {
                    return issues;
                }
            }
        }
    }

    /// Copy the tree into a [`Cst`], anonymous tokens included.
    ///
    /// The root is stretched over the whole source so leading and trailing
    /// whitespace survive reconstruction.
    pub fn to_cst(&self) -> Result<Cst, TreeSitterError> {
        let root = self.tree.root_node();
        let mut builder = CstBuilder::new(self.source, root.kind(), Span::new(0, self.source.len()));
        let mut stack = vec![(root, builder.root())];
        while let Some((node, id)) = stack.pop() {
            let mut cursor = node.walk();
            for child in node.children(&mut cursor) {
                let span = Span::new(child.start_byte(), child.end_byte());
                let child_id = builder.push(id, child.kind(), span);
                stack.push((child, child_id));
            }
        }
        Ok(builder.finish()?)
    }
}

/// A region tree-sitter could not parse, or a token it had to invent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxIssue {
    pub span: Span,
    /// 1-based.
    pub line: usize,
    /// 1-based, in bytes.
    pub column: usize,
    pub missing: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cst::NodeKind;

    #[test]
    fn well_formed_source_has_no_issues() {
        let mut parser = CppParser::new().unwrap();
        let parsed = parser
            .parse_with_source("int main() { return 0; }")
            .unwrap();

        assert!(!parsed.has_errors());
        assert!(parsed.syntax_issues().is_empty());
        assert_eq!(parsed.root_kind(), "translation_unit");
    }

    #[test]
    fn issues_carry_line_numbers() {
        let mut parser = CppParser::new().unwrap();
        let parsed = parser
            .parse_with_source("int ok;\nint main( { return 0; }\n")
            .unwrap();

        assert!(parsed.has_errors());
        let issues = parsed.syntax_issues();
        assert!(!issues.is_empty());
        assert!(issues.iter().all(|issue| issue.line == 2), "{issues:?}");
    }

    #[test]
    fn cst_keeps_tokens_and_whitespace() {
        let mut parser = CppParser::new().unwrap();
        let source = "\n\nint x = 1;\n";
        let cst = parser.parse_cst(source).unwrap();

        assert_eq!(cst.root_text(), source);
        assert_eq!(cst.kind(cst.root()), &NodeKind::TranslationUnit);
        let semicolons = cst
            .descendants(cst.root())
            .filter(|&id| cst.is_operator(id, ";"))
            .count();
        assert_eq!(semicolons, 1);
        let literal = cst
            .descendants(cst.root())
            .find(|&id| cst.kind(id) == &NodeKind::NumberLiteral)
            .unwrap();
        assert_eq!(cst.text(literal), "1");
    }
}
