use crate::cst::CstError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TreeSitterError {
    #[error("failed to initialize the C++ parser")]
    ParserInit,

    #[error("bundled C++ grammar is incompatible with the tree-sitter runtime")]
    LanguageSet,

    #[error("tree-sitter returned no tree (parse cancelled or timed out)")]
    ParseFailed,

    #[error("parse tree does not form a valid CST: {0}")]
    Tree(#[from] CstError),
}
