//! Operand analysis shared by the expression rules.

use crate::cst::{Cst, ForInit, NodeId, NodeKind};
use std::collections::BTreeSet;

/// Kinds whose evaluation may write memory or call out.
fn is_effectful(kind: &NodeKind) -> bool {
    matches!(
        kind,
        NodeKind::UpdateExpression | NodeKind::AssignmentExpression | NodeKind::CallExpression
    ) || matches!(
        kind.as_str(),
        "new_expression" | "delete_expression" | "throw_expression" | "co_await_expression"
    )
}

pub fn has_side_effects(cst: &Cst, id: NodeId) -> bool {
    cst.subtree_any(id, is_effectful)
}

/// An lvalue that can be written twice without changing meaning:
/// identifier, field access, dereference or subscript, free of side effects.
pub fn is_simple_operand(cst: &Cst, id: NodeId) -> bool {
    match cst.kind(id) {
        NodeKind::Identifier | NodeKind::QualifiedIdentifier => true,
        NodeKind::FieldExpression | NodeKind::SubscriptExpression => !has_side_effects(cst, id),
        NodeKind::PointerExpression => {
            cst.child(id, 0).is_some_and(|op| cst.is_operator(op, "*"))
                && !has_side_effects(cst, id)
        }
        _ => false,
    }
}

/// Names referenced anywhere under `id`.
pub fn variables(cst: &Cst, id: NodeId) -> BTreeSet<&str> {
    cst.descendants(id)
        .filter(|&d| cst.kind(d) == &NodeKind::Identifier)
        .map(|d| cst.text(d))
        .collect()
}

const ARITHMETIC: [&str; 5] = ["+", "-", "*", "/", "%"];

/// Operands built only from names, literals, arithmetic, subscripts,
/// dereferences and isolated updates. Calls and unknown composite
/// expressions are refused.
pub fn is_pure_operand(cst: &Cst, id: NodeId) -> bool {
    match cst.kind(id) {
        NodeKind::Identifier
        | NodeKind::FieldIdentifier
        | NodeKind::QualifiedIdentifier
        | NodeKind::NumberLiteral
        | NodeKind::UpdateExpression
        | NodeKind::AssignmentExpression => true,
        NodeKind::BinaryExpression => cst.binary(id).is_some_and(|shape| {
            ARITHMETIC.iter().any(|op| cst.is_operator(shape.operator, op))
                && is_pure_operand(cst, shape.left)
                && is_pure_operand(cst, shape.right)
        }),
        NodeKind::ParenthesizedExpression
        | NodeKind::SubscriptExpression
        | NodeKind::SubscriptArgumentList
        | NodeKind::PointerExpression
        | NodeKind::FieldExpression
        | NodeKind::UnaryExpression => cst.children(id).iter().all(|&c| {
            matches!(cst.kind(c), NodeKind::Other(_)) && cst.is_leaf(c) || is_pure_operand(cst, c)
        }),
        NodeKind::Other(_) => cst.is_leaf(id),
        _ => false,
    }
}

/// Binds at least as tightly as a relational operator, so it can be moved to
/// either side of one without parentheses.
pub fn binds_tighter_than_relational(cst: &Cst, id: NodeId) -> bool {
    const TIGHTER: [&str; 7] = ["+", "-", "*", "/", "%", "<<", ">>"];
    match cst.kind(id) {
        NodeKind::BinaryExpression => cst
            .binary(id)
            .is_some_and(|shape| TIGHTER.iter().any(|op| cst.is_operator(shape.operator, op))),
        NodeKind::LogicalExpression
        | NodeKind::ConditionalExpression
        | NodeKind::AssignmentExpression
        | NodeKind::CommaExpression => false,
        _ => true,
    }
}

/// Right operand of an expanded assignment needs parentheses to keep its
/// grouping under the binary operator.
pub fn needs_parentheses(cst: &Cst, id: NodeId) -> bool {
    matches!(
        cst.kind(id),
        NodeKind::BinaryExpression
            | NodeKind::LogicalExpression
            | NodeKind::ConditionalExpression
            | NodeKind::AssignmentExpression
            | NodeKind::CommaExpression
    ) || cst.text(id).starts_with(['+', '-'])
}

/// The expression's value is thrown away: it stands as a statement, the
/// left side of a comma, or a `for` header's init or update slot.
pub fn value_is_discarded(cst: &Cst, id: NodeId) -> bool {
    let mut current = id;
    while let Some(parent) = cst.parent(current) {
        match cst.kind(parent) {
            NodeKind::ExpressionStatement => return true,
            NodeKind::ParenthesizedExpression => current = parent,
            NodeKind::CommaExpression => {
                if cst.child(parent, 0) == Some(current) {
                    return true;
                }
                current = parent;
            }
            NodeKind::ForStatement => {
                return cst.for_header(parent).is_some_and(|header| {
                    header.update == Some(current) || header.init == ForInit::Expression(current)
                })
            }
            _ => return false,
        }
    }
    false
}

/// The statement-level unit an expression belongs to: the enclosing
/// expression statement or declaration, or the outermost expression below a
/// control construct.
pub fn enclosing_statement(cst: &Cst, id: NodeId) -> NodeId {
    let mut current = id;
    while let Some(parent) = cst.parent(current) {
        let kind = cst.kind(parent);
        if matches!(
            kind,
            NodeKind::ExpressionStatement
                | NodeKind::Declaration
                | NodeKind::FieldDeclaration
                | NodeKind::ReturnStatement
        ) {
            return parent;
        }
        if kind.is_statement()
            || matches!(
                kind,
                NodeKind::TranslationUnit | NodeKind::ConditionClause | NodeKind::LambdaExpression
            )
        {
            return current;
        }
        current = parent;
    }
    current
}

pub const COMPOUND_TOKENS: [&str; 10] = ["+=", "-=", "*=", "/=", "%=", "<<=", ">>=", "&=", "|=", "^="];

/// Compound assignments anywhere under `id`.
pub fn compound_assignments(cst: &Cst, id: NodeId) -> usize {
    cst.descendants(id)
        .filter(|&d| {
            cst.assignment(d).is_some_and(|shape| {
                COMPOUND_TOKENS
                    .iter()
                    .any(|op| cst.is_operator(shape.operator, op))
            })
        })
        .count()
}

/// Text of an operand with one layer of enclosing parentheses removed,
/// unless the parenthesized expression is a comma expression.
pub fn unparenthesized_text(cst: &Cst, id: NodeId) -> &str {
    if cst.kind(id) == &NodeKind::ParenthesizedExpression {
        if let [open, inner, close] = *cst.children(id) {
            if cst.is_operator(open, "(")
                && cst.is_operator(close, ")")
                && cst.kind(inner) != &NodeKind::CommaExpression
            {
                return cst.text(inner);
            }
        }
    }
    cst.text(id)
}
