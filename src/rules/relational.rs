//! Mirrored relational comparisons.

use super::operand::{binds_tighter_than_relational, has_side_effects, is_pure_operand, variables};
use super::{RewriteError, Rule, SynthContext};
use crate::cst::{Cst, NodeId, NodeKind};

const OPPOSITES: [(&str, &str); 4] = [("<", ">"), (">", "<"), ("<=", ">="), (">=", "<=")];

fn opposite(cst: &Cst, operator: NodeId) -> Option<&'static str> {
    OPPOSITES
        .iter()
        .find(|(op, _)| cst.is_operator(operator, op))
        .map(|&(_, opp)| opp)
}

/// `a < b` → `b > a`, and the same for `>`, `<=` and `>=`.
///
/// Swapping changes evaluation order, so an operand with side effects may only
/// move past one that reads none of its variables. Two effectful operands are
/// never swapped.
pub struct RelationalSwap;

impl RelationalSwap {
    fn operands_commute(cst: &Cst, left: NodeId, right: NodeId) -> bool {
        match (has_side_effects(cst, left), has_side_effects(cst, right)) {
            (false, false) => is_pure_operand(cst, left) && is_pure_operand(cst, right),
            (true, true) => false,
            _ => variables(cst, left).is_disjoint(&variables(cst, right)),
        }
    }
}

impl Rule for RelationalSwap {
    fn name(&self) -> &str {
        "relational_swap"
    }

    fn description(&self) -> &str {
        "Mirror a relational comparison: `a < b` becomes `b > a`"
    }

    fn is_match(&self, cst: &Cst, node: NodeId) -> bool {
        if cst.kind(node) != &NodeKind::BinaryExpression {
            return false;
        }
        let Some(shape) = cst.binary(node) else {
            return false;
        };
        opposite(cst, shape.operator).is_some()
            && binds_tighter_than_relational(cst, shape.left)
            && binds_tighter_than_relational(cst, shape.right)
            && Self::operands_commute(cst, shape.left, shape.right)
    }

    fn synthesize(
        &self,
        cst: &Cst,
        node: NodeId,
        _cx: &mut SynthContext<'_>,
    ) -> Result<String, RewriteError> {
        let shape = cst
            .binary(node)
            .ok_or_else(|| RewriteError::shape(cst, node))?;
        let operator = opposite(cst, shape.operator).ok_or_else(|| RewriteError::shape(cst, node))?;
        Ok(format!(
            "{} {operator} {}",
            cst.text(shape.right),
            cst.text(shape.left)
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::Driver;
    use crate::pool::parse_cpp;

    fn swap(source: &str) -> String {
        let cst = parse_cpp(source).unwrap();
        let pass = Driver::seeded(Some(0))
            .apply_to_tree(&RelationalSwap, &cst)
            .unwrap();
        pass.tree.root_text().to_string()
    }

    #[test]
    fn swaps_each_operator() {
        assert_eq!(swap("int f() { return a < b; }"), "int f() { return b > a; }");
        assert_eq!(swap("int f() { return a > b; }"), "int f() { return b < a; }");
        assert_eq!(swap("int f() { return a <= b; }"), "int f() { return b >= a; }");
        assert_eq!(swap("int f() { return a >= b; }"), "int f() { return b <= a; }");
    }

    #[test]
    fn keeps_arithmetic_operands_intact() {
        assert_eq!(
            swap("int f() { return a + 1 < b * 2; }"),
            "int f() { return b * 2 > a + 1; }"
        );
        assert_eq!(
            swap("int f() { return v[i] <= *p; }"),
            "int f() { return *p >= v[i]; }"
        );
    }

    #[test]
    fn side_effects_on_both_sides_block_the_swap() {
        let source = "int f() { return i++ < j++; }";
        assert_eq!(swap(source), source);
    }

    #[test]
    fn one_effectful_side_needs_disjoint_variables() {
        assert_eq!(swap("int f() { return i++ < 5; }"), "int f() { return 5 > i++; }");
        let source = "int f() { return i++ < i; }";
        assert_eq!(swap(source), source);
        let source = "int f() { return g() < n; }";
        assert_eq!(swap(source), "int f() { return n > g(); }");
    }

    #[test]
    fn impure_operands_are_refused() {
        for source in [
            "int f() { return (a == b) < c; }",
            "int f() { return h(a) < h(b); }",
        ] {
            assert_eq!(swap(source), source, "{source}");
        }
    }

    #[test]
    fn only_the_comparison_inside_a_logical_expression_moves() {
        assert_eq!(
            swap("int f() { return a < b && c; }"),
            "int f() { return b > a && c; }"
        );
    }
}
