use std::path::PathBuf;
use thiserror::Error;

/// Structural problems found while assembling a [`Cst`](super::Cst).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CstError {
    #[error("tree has no root node")]
    Empty,

    #[error("root text is {found} bytes but its span covers {expected}")]
    RootLengthMismatch { expected: usize, found: usize },

    #[error("invalid span [{start}, {end}) on `{kind}` node")]
    InvalidSpan {
        kind: String,
        start: usize,
        end: usize,
    },

    #[error("`{kind}` node [{start}, {end}) lies outside its parent [{parent_start}, {parent_end})")]
    OutsideParent {
        kind: String,
        start: usize,
        end: usize,
        parent_start: usize,
        parent_end: usize,
    },

    #[error("children of `{kind}` node overlap at byte {at}")]
    OverlappingChildren { kind: String, at: usize },
}

/// A persisted tree that cannot be used. The file is skipped, never the batch.
#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("failed to read tree {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed tree JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("inconsistent tree in {path}: {source}")]
    Shape {
        path: PathBuf,
        #[source]
        source: CstError,
    },

    #[error("failed to write tree {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
