//! Tree-sitter front end for C and C++ sources.
//!
//! Produces the [`Cst`](crate::cst::Cst) arenas the rewrite engine works on.
//! The engine itself never parses; this module exists for the CLI and for
//! feeding real trees to tests.

pub mod errors;
pub mod parser;

pub use errors::TreeSitterError;
pub use parser::{CppParser, ParsedSource, SyntaxIssue};
