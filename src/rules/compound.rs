//! `v op= e` ⇄ `v = v op e`.

use super::operand::{
    compound_assignments, enclosing_statement, is_simple_operand, needs_parentheses,
    unparenthesized_text,
};
use super::{RewriteError, Rule, SynthContext};
use crate::cst::{Cst, NodeId, NodeKind};

/// One compound assignment operator and the binary operator it abbreviates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompoundOperator {
    pub compound: &'static str,
    pub binary: &'static str,
    pub label: &'static str,
}

const fn op(compound: &'static str, binary: &'static str, label: &'static str) -> CompoundOperator {
    CompoundOperator {
        compound,
        binary,
        label,
    }
}

pub const OPERATORS: [CompoundOperator; 10] = [
    op("+=", "+", "plus"),
    op("-=", "-", "minus"),
    op("*=", "*", "multiply"),
    op("/=", "/", "divide"),
    op("%=", "%", "modulo"),
    op("<<=", "<<", "left_shift"),
    op(">>=", ">>", "right_shift"),
    op("&=", "&", "bitwise_and"),
    op("|=", "|", "bitwise_or"),
    op("^=", "^", "bitwise_xor"),
];

/// `v += e` → `v = v + e`.
pub struct CompoundToExpanded {
    op: CompoundOperator,
    name: String,
    description: String,
}

impl CompoundToExpanded {
    pub fn new(op: CompoundOperator) -> Self {
        Self {
            op,
            name: format!("{}_equal_to_expanded", op.label),
            description: format!(
                "Expand `v {} e` into `v = v {} e`",
                op.compound, op.binary
            ),
        }
    }
}

impl Rule for CompoundToExpanded {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn is_match(&self, cst: &Cst, node: NodeId) -> bool {
        let Some(shape) = cst.assignment(node) else {
            return false;
        };
        cst.is_operator(shape.operator, self.op.compound)
            && is_simple_operand(cst, shape.left)
            && compound_assignments(cst, enclosing_statement(cst, node)) <= 1
    }

    fn synthesize(
        &self,
        cst: &Cst,
        node: NodeId,
        _cx: &mut SynthContext<'_>,
    ) -> Result<String, RewriteError> {
        let shape = cst
            .assignment(node)
            .ok_or_else(|| RewriteError::shape(cst, node))?;
        let target = cst.text(shape.left);
        let value = cst.text(shape.right);
        let value = if needs_parentheses(cst, shape.right) {
            format!("({value})")
        } else {
            value.to_string()
        };
        Ok(format!("{target} = {target} {} {value}", self.op.binary))
    }
}

/// `v = v + e` → `v += e`.
pub struct ExpandedToCompound {
    op: CompoundOperator,
    name: String,
    description: String,
}

impl ExpandedToCompound {
    pub fn new(op: CompoundOperator) -> Self {
        Self {
            op,
            name: format!("expanded_to_{}_equal", op.label),
            description: format!(
                "Contract `v = v {} e` into `v {} e`",
                op.binary, op.compound
            ),
        }
    }
}

impl Rule for ExpandedToCompound {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn is_match(&self, cst: &Cst, node: NodeId) -> bool {
        let Some(assign) = cst.assignment(node) else {
            return false;
        };
        if !cst.is_operator(assign.operator, "=") || !is_simple_operand(cst, assign.left) {
            return false;
        }
        // The right side must be exactly `v op e`; `v op e op f` parses as
        // `(v op e) op f` and would need re-association.
        let Some(value) = cst.binary(assign.right) else {
            return false;
        };
        cst.kind(assign.right) == &NodeKind::BinaryExpression
            && cst.is_operator(value.operator, self.op.binary)
            && cst.text(value.left) == cst.text(assign.left)
    }

    fn synthesize(
        &self,
        cst: &Cst,
        node: NodeId,
        _cx: &mut SynthContext<'_>,
    ) -> Result<String, RewriteError> {
        let assign = cst
            .assignment(node)
            .ok_or_else(|| RewriteError::shape(cst, node))?;
        let value = cst
            .binary(assign.right)
            .ok_or_else(|| RewriteError::shape(cst, assign.right))?;
        Ok(format!(
            "{} {} {}",
            cst.text(assign.left),
            self.op.compound,
            unparenthesized_text(cst, value.right)
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::Driver;
    use crate::pool::parse_cpp;

    fn rewrite(rule: &dyn Rule, source: &str) -> String {
        let cst = parse_cpp(source).unwrap();
        let pass = Driver::seeded(Some(0)).apply_to_tree(rule, &cst).unwrap();
        pass.tree.root_text().to_string()
    }

    #[test]
    fn expands_every_operator() {
        for op in OPERATORS {
            let source = format!("void f() {{ x {} y; }}", op.compound);
            let expected = format!("void f() {{ x = x {} y; }}", op.binary);
            assert_eq!(rewrite(&CompoundToExpanded::new(op), &source), expected);
        }
    }

    #[test]
    fn parenthesizes_composite_right_operand() {
        let rule = CompoundToExpanded::new(OPERATORS[2]);
        assert_eq!(
            rewrite(&rule, "void f() { x *= a + b; }"),
            "void f() { x = x * (a + b); }"
        );
        assert_eq!(
            rewrite(&rule, "void f() { x *= -b; }"),
            "void f() { x = x * (-b); }"
        );
        assert_eq!(
            rewrite(&rule, "void f() { x *= c ? a : b; }"),
            "void f() { x = x * (c ? a : b); }"
        );
    }

    #[test]
    fn skips_dense_statements() {
        let rule = CompoundToExpanded::new(OPERATORS[0]);
        let source = "void f() { a += 1, b += 2; c += 3; }";
        assert_eq!(
            rewrite(&rule, source),
            "void f() { a += 1, b += 2; c = c + 3; }"
        );
    }

    #[test]
    fn skips_subscripts_with_side_effects() {
        let rule = CompoundToExpanded::new(OPERATORS[0]);
        let source = "void f() { a[i++] += 1; }";
        assert_eq!(rewrite(&rule, source), source);
    }

    #[test]
    fn contracts_and_strips_one_layer_of_parentheses() {
        let rule = ExpandedToCompound::new(OPERATORS[2]);
        assert_eq!(
            rewrite(&rule, "void f() { x = x * (a + b); }"),
            "void f() { x *= a + b; }"
        );
        assert_eq!(
            rewrite(&rule, "void f() { x = x * (a, b); }"),
            "void f() { x *= (a, b); }"
        );
    }

    #[test]
    fn contraction_requires_same_target() {
        let rule = ExpandedToCompound::new(OPERATORS[0]);
        let source = "void f() { x = y + 1; }";
        assert_eq!(rewrite(&rule, source), source);
        // Left-associated chains are left alone.
        let source = "void f() { x = x + 1 + 2; }";
        assert_eq!(rewrite(&rule, source), source);
    }

    #[test]
    fn minus_direction_round_trips() {
        let expand = CompoundToExpanded::new(OPERATORS[1]);
        let contract = ExpandedToCompound::new(OPERATORS[1]);
        let expanded = rewrite(&expand, "void f() { total -= delta; }");
        assert_eq!(expanded, "void f() { total = total - delta; }");
        assert_eq!(rewrite(&contract, &expanded), "void f() { total -= delta; }");
    }
}
