//! Integer literal rewriting.

use super::{RewriteError, Rule, SynthContext};
use crate::cst::{Cst, NodeId, NodeKind};

const BITWISE: [&str; 5] = ["&", "|", "^", "<<", ">>"];

/// How far up a power of two is checked for a bitwise operator.
const BITMASK_DEPTH: usize = 3;

/// Integer literal → equivalent arithmetic expression, e.g. `42` → `( 6 * 7 )`.
///
/// Only plain decimal literals are candidates. Literals inside preprocessor
/// lines or template argument lists, likely bitmasks, and null pointer
/// constants keep their spelling. Literals with a type suffix reach the
/// generator and are refused there, one candidate at a time.
pub struct LiteralRewrite;

impl LiteralRewrite {
    fn plain_decimal(text: &str) -> bool {
        !(text.contains(['.', 'e', 'E', 'x', 'X', 'b', 'B', '\''])
            || (text.len() > 1 && text.starts_with('0')))
    }

    fn looks_like_bitmask(cst: &Cst, node: NodeId) -> bool {
        let is_power_of_two = cst
            .text(node)
            .parse::<u32>()
            .is_ok_and(|v| (1..=8192).contains(&v) && v.is_power_of_two());
        is_power_of_two
            && cst.ancestors(node).take(BITMASK_DEPTH).any(|a| {
                cst.binary(a).is_some_and(|shape| {
                    cst.kind(a) == &NodeKind::BinaryExpression
                        && BITWISE.iter().any(|op| cst.is_operator(shape.operator, op))
                })
            })
    }

    /// `0` where a pointer is expected. Any other expression with value zero
    /// is not a null pointer constant.
    fn is_null_pointer_constant(cst: &Cst, node: NodeId) -> bool {
        if cst.text(node) != "0" {
            return false;
        }
        let Some(parent) = cst.parent(node) else {
            return false;
        };
        match cst.kind(parent) {
            // T *p = 0;
            NodeKind::InitDeclarator => cst
                .child(parent, 0)
                .is_some_and(|d| cst.kind(d) == &NodeKind::PointerDeclarator),
            // p = 0;
            NodeKind::AssignmentExpression => cst
                .assignment(parent)
                .is_some_and(|shape| shape.right == node && names_pointer(cst, shape.left)),
            // p == 0, 0 != p
            NodeKind::BinaryExpression => cst.binary(parent).is_some_and(|shape| {
                let other = if shape.left == node { shape.right } else { shape.left };
                ["==", "!="].iter().any(|op| cst.is_operator(shape.operator, op))
                    && names_pointer(cst, other)
            }),
            // return 0; in `T *f()`
            NodeKind::ReturnStatement => cst
                .find_ancestor(node, |k| {
                    matches!(k, NodeKind::FunctionDefinition | NodeKind::LambdaExpression)
                })
                .is_some_and(|f| cst.child_of_kind(f, &NodeKind::PointerDeclarator).is_some()),
            // f(0) where `f` takes a pointer there
            NodeKind::ArgumentList => pointer_parameter(cst, parent, node),
            _ => false,
        }
    }
}

/// Name declared by a declarator, looking through pointers, references,
/// arrays and initializers.
fn declared_name(cst: &Cst, mut declarator: NodeId) -> Option<&str> {
    loop {
        match cst.kind(declarator) {
            NodeKind::Identifier | NodeKind::FieldIdentifier => return Some(cst.text(declarator)),
            NodeKind::PointerDeclarator | NodeKind::ReferenceDeclarator => {
                declarator = *cst.children(declarator).last()?;
            }
            NodeKind::InitDeclarator | NodeKind::ArrayDeclarator | NodeKind::FunctionDeclarator => {
                declarator = cst.child(declarator, 0)?;
            }
            _ => return None,
        }
    }
}

/// Whether `expr` is a variable or member declared somewhere in the tree as
/// a pointer.
fn names_pointer(cst: &Cst, expr: NodeId) -> bool {
    let name = match cst.kind(expr) {
        NodeKind::Identifier => cst.text(expr),
        NodeKind::FieldExpression => match cst.children(expr).last() {
            Some(&field) if cst.kind(field) == &NodeKind::FieldIdentifier => cst.text(field),
            _ => return false,
        },
        _ => return false,
    };
    cst.descendants(cst.root())
        .filter(|&id| cst.kind(id) == &NodeKind::PointerDeclarator)
        .filter_map(|id| cst.children(id).last().copied())
        .filter(|&inner| cst.kind(inner) != &NodeKind::FunctionDeclarator)
        .any(|inner| declared_name(cst, inner) == Some(name))
}

fn is_punctuation(cst: &Cst, id: NodeId) -> bool {
    ["(", ",", ")"].iter().any(|t| cst.kind(id).is_token(t)) || cst.kind(id) == &NodeKind::Comment
}

/// `argument` is passed to a function declared in the tree whose parameter
/// at the same position is a pointer.
fn pointer_parameter(cst: &Cst, arguments: NodeId, argument: NodeId) -> bool {
    let Some(call) = cst.parent(arguments) else {
        return false;
    };
    let Some(callee) = cst.child(call, 0).filter(|&c| cst.kind(c) == &NodeKind::Identifier) else {
        return false;
    };
    let Some(position) = cst
        .children(arguments)
        .iter()
        .copied()
        .filter(|&c| !is_punctuation(cst, c))
        .position(|c| c == argument)
    else {
        return false;
    };
    let callee = cst.text(callee);
    cst.descendants(cst.root())
        .filter(|&id| cst.kind(id) == &NodeKind::FunctionDeclarator)
        .filter(|&id| cst.child(id, 0).is_some_and(|n| cst.text(n) == callee))
        .filter_map(|id| cst.child_of_kind(id, &NodeKind::ParameterList))
        .filter_map(|list| {
            cst.children(list)
                .iter()
                .copied()
                .filter(|&c| !is_punctuation(cst, c))
                .nth(position)
        })
        .any(|parameter| {
            cst.children(parameter).iter().any(|&c| {
                matches!(
                    cst.kind(c).as_str(),
                    "pointer_declarator" | "abstract_pointer_declarator"
                )
            })
        })
}

impl Rule for LiteralRewrite {
    fn name(&self) -> &str {
        "constant_to_expression"
    }

    fn description(&self) -> &str {
        "Replace an integer literal with an equivalent arithmetic expression"
    }

    fn is_match(&self, cst: &Cst, node: NodeId) -> bool {
        if cst.kind(node) != &NodeKind::NumberLiteral || !Self::plain_decimal(cst.text(node)) {
            return false;
        }
        let excluded_context = cst.has_ancestor(node, |k| {
            k.is_preproc()
                || matches!(
                    k,
                    NodeKind::TemplateArgumentList | NodeKind::TemplateParameterList
                )
        });
        let excluded_parent = cst.parent(node).is_some_and(|p| {
            matches!(cst.kind(p), NodeKind::FieldDeclaration)
                || cst.kind(p).as_str() == "user_defined_literal"
        });
        !excluded_context
            && !excluded_parent
            && !Self::looks_like_bitmask(cst, node)
            && !Self::is_null_pointer_constant(cst, node)
    }

    fn synthesize(
        &self,
        cst: &Cst,
        node: NodeId,
        cx: &mut SynthContext<'_>,
    ) -> Result<String, RewriteError> {
        Ok(cx.generator.rewrite_literal(cst.text(node))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::Driver;
    use crate::expr::evaluate;
    use crate::pool::parse_cpp;

    fn candidates(source: &str) -> Vec<String> {
        let cst = parse_cpp(source).unwrap();
        cst.descendants(cst.root())
            .filter(|&id| LiteralRewrite.is_match(&cst, id))
            .map(|id| cst.text(id).to_string())
            .collect()
    }

    #[test]
    fn plain_decimals_are_candidates() {
        assert_eq!(candidates("int f() { return 42 + x * 7; }"), ["42", "7"]);
    }

    #[test]
    fn other_spellings_are_not() {
        assert!(candidates("double f() { return 1.5 + 0x10 + 017 + 0b1 + 1e3; }").is_empty());
        assert!(candidates("int f() { return 1'000; }").is_empty());
    }

    #[test]
    fn excluded_contexts() {
        assert!(candidates("#define N 10\n").is_empty());
        assert!(candidates("std::array<int, 4> a;").is_empty());
        assert!(candidates("int f(int x) { return x & 8; }").is_empty());
        assert!(candidates("void f() { int *p = 0; }").is_empty());
        assert_eq!(candidates("int f(int x) { return x & 10; }"), ["10"]);
    }

    #[test]
    fn zero_stays_where_a_pointer_is_expected() {
        assert!(candidates("int *g() { int *p; p = 0; return 0; }").is_empty());
        assert!(candidates("struct N { N *next; }; void f(N *n) { n->next = 0; }").is_empty());
        assert!(candidates("int f(char *s) { return s != 0; }").is_empty());
        assert_eq!(
            candidates("void use(int n, char *s);\nvoid f() { use(1, 0); }"),
            ["1"]
        );
        assert_eq!(candidates("int f(int (*cb)(int)) { return 0; }"), ["0"]);
    }

    #[test]
    fn zero_stays_an_integer_elsewhere() {
        assert_eq!(candidates("int f() { int n; n = 0; return 0; }"), ["0", "0"]);
        assert_eq!(candidates("void use(int n);\nvoid f() { use(0); }"), ["0"]);
    }

    #[test]
    fn rewritten_literal_keeps_value() {
        let cst = parse_cpp("int f() { return 42; }").unwrap();
        let pass = Driver::seeded(Some(11))
            .apply_to_tree(&LiteralRewrite, &cst)
            .unwrap();
        let text = pass.tree.root_text();
        let expr = text
            .strip_prefix("int f() { return ")
            .and_then(|rest| rest.strip_suffix("; }"))
            .unwrap();
        assert_ne!(expr, "42");
        assert_eq!(evaluate(expr), Ok(42));
    }

    #[test]
    fn suffixed_literals_are_skipped_not_fatal() {
        let cst = parse_cpp("long f() { return 10L + 3; }").unwrap();
        let pass = Driver::seeded(Some(5))
            .apply_to_tree(&LiteralRewrite, &cst)
            .unwrap();
        assert_eq!(pass.report.skipped.len(), 1);
        assert_eq!(pass.report.applied, 1);
        assert!(pass.tree.root_text().contains("10L"));
    }
}
