//! Byte-span splicing of replacement text into a tree's source.
//!
//! Two strategies share the [`Span`] model:
//!
//! - **Direct**: [`apply_direct`] replaces many non-overlapping spans of the
//!   root text at once, bottom-to-top, so earlier offsets stay valid. Only
//!   the root's text changes; descendants keep their stale text and spans.
//! - **Structural**: [`propagate`] rewrites the innermost node containing a
//!   span and rebuilds every ancestor from its children, so nested
//!   rewrites in the same pass can observe each other.

pub mod structural;

pub use structural::propagate;

use crate::cst::Span;
use thiserror::Error;
use xxhash_rust::xxh3::xxh3_64;

/// A verified byte-span replacement against a tree's root text.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "Splice does nothing until applied"]
pub struct Splice {
    /// Byte range in the original source coordinates
    pub span: Span,
    /// New text for `span`
    pub replacement: String,
    /// What we expect to find at `span` before applying
    pub expected_before: SpliceVerification,
}

/// Verification strategy for splice safety.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpliceVerification {
    /// Exact text match required
    ExactMatch(String),
    /// xxh3 hash of expected text (faster for large spans)
    Hash(u64),
}

impl SpliceVerification {
    /// Check if the provided text matches the verification criteria.
    pub fn matches(&self, text: &str) -> bool {
        match self {
            SpliceVerification::ExactMatch(expected) => text == expected,
            SpliceVerification::Hash(expected_hash) => xxh3_64(text.as_bytes()) == *expected_hash,
        }
    }

    /// Create verification from text, using hash for text over 1KB.
    pub fn from_text(text: &str) -> Self {
        if text.len() > 1024 {
            SpliceVerification::Hash(xxh3_64(text.as_bytes()))
        } else {
            SpliceVerification::ExactMatch(text.to_string())
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpliceError {
    #[error("before-text verification failed at [{start}, {end}): found {found:?}")]
    BeforeTextMismatch {
        start: usize,
        end: usize,
        expected: String,
        found: String,
    },

    #[error("invalid byte range [{start}, {end}) in text of length {len} starting at {base}")]
    InvalidRange {
        start: usize,
        end: usize,
        base: usize,
        len: usize,
    },

    #[error("splices overlap: [{}, {}) and [{}, {})", .first.start, .first.end, .second.start, .second.end)]
    Overlap { first: Span, second: Span },

    #[error("no node contains [{start}, {end})")]
    NoContainingNode { start: usize, end: usize },

    #[error("`{kind}` node was already rewritten; [{start}, {end}) no longer addresses its text")]
    StaleNode {
        kind: String,
        start: usize,
        end: usize,
    },
}

/// Result of one splice.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "SpliceResult should be checked for applied/already-applied"]
pub enum SpliceResult {
    /// Replacement written
    Applied { span: Span, bytes_changed: usize },
    /// Text at the span already equals the replacement
    AlreadyApplied { span: Span },
}

/// The rewritten text plus one result per splice, in application order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpliceOutcome {
    pub text: String,
    pub results: Vec<SpliceResult>,
}

impl SpliceOutcome {
    pub fn applied(&self) -> usize {
        self.results
            .iter()
            .filter(|r| matches!(r, SpliceResult::Applied { .. }))
            .count()
    }
}

impl Splice {
    /// Create a new splice with automatic verification generation.
    pub fn new(
        span: Span,
        replacement: impl Into<String>,
        expected_before: impl AsRef<str>,
    ) -> Self {
        Self {
            span,
            replacement: replacement.into(),
            expected_before: SpliceVerification::from_text(expected_before.as_ref()),
        }
    }

    fn local_range(&self, content: &str, base: usize) -> Result<std::ops::Range<usize>, SpliceError> {
        let invalid = || SpliceError::InvalidRange {
            start: self.span.start,
            end: self.span.end,
            base,
            len: content.len(),
        };
        let start = self.span.start.checked_sub(base).ok_or_else(invalid)?;
        let end = self.span.end.checked_sub(base).ok_or_else(invalid)?;
        if start > end || content.get(start..end).is_none() {
            return Err(invalid());
        }
        Ok(start..end)
    }

    /// Validate the splice against `content`, whose first byte sits at
    /// source offset `base`.
    ///
    /// Returns the current text at the span if validation succeeds.
    fn validate<'a>(&self, content: &'a str, base: usize) -> Result<&'a str, SpliceError> {
        let range = self.local_range(content, base)?;
        let current = &content[range];

        // Check if already applied (idempotency)
        if current == self.replacement {
            return Ok(current);
        }

        if !self.expected_before.matches(current) {
            return Err(SpliceError::BeforeTextMismatch {
                start: self.span.start,
                end: self.span.end,
                expected: format!("{:?}", self.expected_before),
                found: current.to_string(),
            });
        }

        Ok(current)
    }
}

/// Apply splices to `content` in one pass.
///
/// Splices are sorted by start descending and applied bottom-to-top so no
/// replacement shifts the offsets of one still pending. All splices are
/// validated, and checked for overlap, before any is applied.
pub fn apply_direct(
    content: &str,
    base: usize,
    mut splices: Vec<Splice>,
) -> Result<SpliceOutcome, SpliceError> {
    splices.sort_by(|a, b| b.span.start.cmp(&a.span.start).then(b.span.end.cmp(&a.span.end)));

    for splice in &splices {
        splice.validate(content, base)?;
    }

    // Sorted descending: for non-overlapping regions the earlier splice's
    // end must not pass the later splice's start
    for window in splices.windows(2) {
        let (later, earlier) = (&window[0], &window[1]);
        if earlier.span.end > later.span.start {
            return Err(SpliceError::Overlap {
                first: earlier.span,
                second: later.span,
            });
        }
    }

    let mut text = content.to_string();
    let mut results = Vec::with_capacity(splices.len());
    for splice in &splices {
        let range = splice.local_range(content, base)?;
        if text[range.clone()] == splice.replacement {
            results.push(SpliceResult::AlreadyApplied { span: splice.span });
            continue;
        }
        text.replace_range(range, &splice.replacement);
        results.push(SpliceResult::Applied {
            span: splice.span,
            bytes_changed: splice.replacement.len(),
        });
    }

    Ok(SpliceOutcome { text, results })
}
