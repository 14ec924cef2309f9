//! `v++` ⇄ `v = v + 1` and `v--` ⇄ `v = v - 1`.
//!
//! Both directions only fire where the expression's value is discarded: the
//! prefix and postfix forms yield different values, and neither yields the
//! value of the assignment.

use super::operand::{is_simple_operand, value_is_discarded};
use super::{RewriteError, Rule, SynthContext};
use crate::cst::{Cst, NodeId, NodeKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Increment,
    Decrement,
}

impl Step {
    fn token(self) -> &'static str {
        match self {
            Step::Increment => "++",
            Step::Decrement => "--",
        }
    }

    fn operator(self) -> &'static str {
        match self {
            Step::Increment => "+",
            Step::Decrement => "-",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Step::Increment => "increment",
            Step::Decrement => "decrement",
        }
    }
}

/// `v++` → `v = v + 1`.
pub struct StepToAssignment {
    step: Step,
    name: String,
    description: String,
}

impl StepToAssignment {
    pub fn new(step: Step) -> Self {
        Self {
            step,
            name: format!("{}_to_assignment", step.label()),
            description: format!(
                "Replace `v{}` with `v = v {} 1`",
                step.token(),
                step.operator()
            ),
        }
    }
}

impl Rule for StepToAssignment {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn is_match(&self, cst: &Cst, node: NodeId) -> bool {
        let Some(shape) = cst.update(node) else {
            return false;
        };
        cst.is_operator(shape.operator, self.step.token())
            && is_simple_operand(cst, shape.operand)
            && value_is_discarded(cst, node)
            && !cst.has_ancestor(node, |k| {
                matches!(
                    k,
                    NodeKind::SubscriptArgumentList | NodeKind::BinaryExpression
                )
            })
    }

    fn synthesize(
        &self,
        cst: &Cst,
        node: NodeId,
        _cx: &mut SynthContext<'_>,
    ) -> Result<String, RewriteError> {
        let shape = cst
            .update(node)
            .ok_or_else(|| RewriteError::shape(cst, node))?;
        let target = cst.text(shape.operand);
        Ok(format!("{target} = {target} {} 1", self.step.operator()))
    }
}

/// `v = v + 1` → `v++`.
pub struct AssignmentToStep {
    step: Step,
    name: String,
    description: String,
}

impl AssignmentToStep {
    pub fn new(step: Step) -> Self {
        Self {
            step,
            name: format!("assignment_to_{}", step.label()),
            description: format!(
                "Replace `v = v {} 1` with `v{}`",
                step.operator(),
                step.token()
            ),
        }
    }
}

impl Rule for AssignmentToStep {
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
        let Some(value) = cst.binary(assign.right) else {
            return false;
        };
        cst.kind(assign.right) == &NodeKind::BinaryExpression
            && cst.is_operator(value.operator, self.step.operator())
            && cst.text(value.left) == cst.text(assign.left)
            && cst.kind(value.right) == &NodeKind::NumberLiteral
            && cst.text(value.right) == "1"
            && value_is_discarded(cst, node)
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
        Ok(format!("{}{}", cst.text(assign.left), self.step.token()))
    }
}
