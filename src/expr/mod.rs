//! Arithmetic expressions that evaluate to a given integer literal.
//!
//! [`ExpressionGenerator`] picks one of four pattern families (additive,
//! multiplicative, subtractive, mixed) with an operand count that grows
//! with the literal's magnitude; [`evaluate`] checks the result.

mod eval;
mod generate;

pub use eval::{evaluate, EvalError};
pub use generate::{ExpressionGenerator, LiteralError, MAX_LITERAL};
