//! Clonegen: semantics-preserving rewrites of C and C++ programs.
//!
//! Rules match idioms in a concrete syntax tree and splice equivalent text
//! back into the source without reparsing: compound assignments, increments,
//! relational comparisons, declarations, `else if` chains, loops, return
//! types, integer literals and identifiers.
//!
//! # Architecture
//!
//! Every rewrite compiles down to a byte-span replacement against the
//! original, immutable source buffer. Rules differ only in how they find
//! spans ([`Rule::is_match`]) and what they put there
//! ([`Rule::synthesize`]); the [`Driver`] owns the loop and picks the splice
//! strategy the rule asks for.
//!
//! # Safety
//!
//! - Predicates check side effects, shared variables and context before a
//!   node becomes a candidate
//! - Direct splices verify the expected before-text and refuse overlaps
//! - Input trees are never mutated; each pass works on a copy
//! - Persisted trees are written atomically (tempfile + fsync + rename)
//!
//! # Example
//!
//! ```no_run
//! use clonegen::pool::parse_cpp;
//! use clonegen::rules::loops::ForToWhile;
//! use clonegen::Rule;
//!
//! let tree = parse_cpp("void f() { for (int i = 0; i < 3; i++) { g(i); } }").unwrap();
//! let rewritten = ForToWhile.apply_to_tree(&tree).unwrap();
//! println!("{}", rewritten.root_text());
//! ```

pub mod config;
pub mod cst;
pub mod driver;
pub mod expr;
pub mod pool;
pub mod rules;
pub mod splice;
pub mod telemetry;
pub mod ts;

// Re-exports
pub use config::{load_from_path, load_from_str, ConfigError, EngineConfig};
pub use cst::{load_tree, save_tree, ArtifactError, Cst, NodeId, NodeKind, Span};
pub use driver::{BatchReport, Driver, DriverError, FileOutcome, Pass, PassReport};
pub use expr::{evaluate, ExpressionGenerator, LiteralError};
pub use rules::{RewriteError, Rule, RuleOptions, RuleSet, Strategy, UnknownRule};
pub use splice::{apply_direct, propagate, Splice, SpliceError, SpliceVerification};
pub use ts::{CppParser, TreeSitterError};
