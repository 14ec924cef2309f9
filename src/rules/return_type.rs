//! Return type deduction.

use super::{RewriteError, Rule, SynthContext};
use crate::cst::{Cst, NodeId, NodeKind, Span};

/// `int f(…)` → `auto f(…)`, for definitions and prototypes.
///
/// `void` functions, the program entry point and `virtual` members keep
/// their declared type. So do definitions under a qualified name
/// (`int S::size() { … }`): their prototype sits in a class or namespace
/// body and would still declare the old type.
pub struct ReturnTypeDeduction {
    entry_point: String,
}

impl ReturnTypeDeduction {
    pub fn new(entry_point: &str) -> Self {
        Self {
            entry_point: entry_point.to_string(),
        }
    }

    /// `a::b::name` → `name`.
    fn last_segment(cst: &Cst, mut name: NodeId) -> &str {
        while cst.kind(name) == &NodeKind::QualifiedIdentifier {
            match cst.children(name).last() {
                Some(&last) => name = last,
                None => break,
            }
        }
        cst.text(name)
    }

    /// A prototype whose function is defined elsewhere in the tree under a
    /// qualified name.
    fn defined_out_of_line(cst: &Cst, name: &str) -> bool {
        cst.descendants(cst.root())
            .filter(|&id| cst.kind(id) == &NodeKind::FunctionDefinition)
            .filter_map(|id| cst.function_signature(id)?.name)
            .any(|n| {
                cst.kind(n) == &NodeKind::QualifiedIdentifier && Self::last_segment(cst, n) == name
            })
    }
}

impl Rule for ReturnTypeDeduction {
    fn name(&self) -> &str {
        "return_type_to_auto"
    }

    fn description(&self) -> &str {
        "Replace a function's declared return type with `auto`"
    }

    fn is_match(&self, cst: &Cst, node: NodeId) -> bool {
        let Some(shape) = cst.function_signature(node) else {
            return false;
        };
        let return_type = cst.text(shape.return_type);
        if matches!(return_type, "void" | "auto") {
            return false;
        }
        if shape.name.is_some_and(|name| {
            cst.text(name) == self.entry_point || cst.kind(name) == &NodeKind::QualifiedIdentifier
        }) {
            return false;
        }
        if cst.kind(node) == &NodeKind::Declaration
            && shape
                .name
                .is_some_and(|name| Self::defined_out_of_line(cst, cst.text(name)))
        {
            return false;
        }
        let is_virtual = cst
            .children(node)
            .iter()
            .take_while(|&&c| c != shape.declarator)
            .any(|&c| cst.text(c) == "virtual");
        !is_virtual
    }

    fn target(&self, cst: &Cst, node: NodeId) -> Span {
        cst.function_signature(node)
            .map_or_else(|| cst.span(node), |shape| cst.span(shape.return_type))
    }

    fn synthesize(
        &self,
        _cst: &Cst,
        _node: NodeId,
        _cx: &mut SynthContext<'_>,
    ) -> Result<String, RewriteError> {
        Ok("auto".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::Driver;
    use crate::pool::parse_cpp;

    fn deduce(source: &str) -> String {
        let cst = parse_cpp(source).unwrap();
        let pass = Driver::seeded(Some(0))
            .apply_to_tree(&ReturnTypeDeduction::new("main"), &cst)
            .unwrap();
        pass.tree.root_text().to_string()
    }

    #[test]
    fn definitions_and_prototypes() {
        assert_eq!(
            deduce("int add(int a, int b) { return a + b; }"),
            "auto add(int a, int b) { return a + b; }"
        );
        assert_eq!(deduce("long twice(long x);"), "auto twice(long x);");
        assert_eq!(
            deduce("std::string name() { return s; }"),
            "auto name() { return s; }"
        );
    }

    #[test]
    fn keeps_qualifiers_around_the_type() {
        assert_eq!(
            deduce("static unsigned long hash(int x) { return x; }"),
            "static auto hash(int x) { return x; }"
        );
    }

    #[test]
    fn void_and_entry_point_are_kept() {
        for source in [
            "void run() { go(); }",
            "int main() { return 0; }",
            "int main(int argc, char **argv) { return 0; }",
        ] {
            assert_eq!(deduce(source), source, "{source}");
        }
    }

    #[test]
    fn variables_are_not_functions() {
        let source = "int x = 3;";
        assert_eq!(deduce(source), source);
    }

    #[test]
    fn out_of_class_definitions_keep_their_prototype_type() {
        let source = "struct S { int size() const; };\nint S::size() const { return 1; }";
        assert_eq!(deduce(source), source);
        let source = "namespace n { int f(); }\nint n::f() { return 2; }";
        assert_eq!(deduce(source), source);
        assert_eq!(
            deduce("namespace n { int f(); int g(); }\nint n::f() { return 2; }"),
            "namespace n { int f(); auto g(); }\nint n::f() { return 2; }"
        );
    }

    #[test]
    fn virtual_members_are_kept() {
        let source = "struct S { virtual int size() { return 0; } };";
        assert_eq!(deduce(source), source);
    }
}
