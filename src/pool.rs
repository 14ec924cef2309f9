//! Thread-local parser pooling.
//!
//! Creates a C++ parser on first use per thread and reuses it for every
//! later parse on that thread.

use crate::cst::Cst;
use crate::ts::{CppParser, TreeSitterError};
use std::cell::RefCell;

thread_local! {
    static CPP_PARSER: RefCell<Option<CppParser>> = const { RefCell::new(None) };
}

/// Execute function with pooled parser instance.
///
/// # Example
///
/// ```no_run
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use clonegen::pool::with_parser;
///
/// let parsed_ok = with_parser(|parser| {
///     parser.parse_with_source("int main() {}").map(|p| !p.has_errors())
/// })??;
/// # Ok(())
/// # }
/// ```
pub fn with_parser<F, R>(f: F) -> Result<R, TreeSitterError>
where
    F: FnOnce(&mut CppParser) -> R,
{
    CPP_PARSER.with(|cell| {
        let mut slot = cell.borrow_mut();
        if slot.is_none() {
            *slot = Some(CppParser::new()?);
        }
        let parser = slot.as_mut().ok_or(TreeSitterError::ParserInit)?;
        Ok(f(parser))
    })
}

/// Parse C/C++ source into a [`Cst`] with the pooled parser.
pub fn parse_cpp(source: &str) -> Result<Cst, TreeSitterError> {
    with_parser(|parser| parser.parse_cst(source))?
}
