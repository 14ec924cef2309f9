//! Structural span propagation.
//!
//! Used by rules whose replacement text is built from descendants that an
//! earlier match in the same pass may already have rewritten (nested loops,
//! chained `else if`). Matches are applied innermost-first; each one lands
//! on the innermost node containing its span and every ancestor is rebuilt
//! from its children, so the next, outer match reads up-to-date text.

use super::SpliceError;
use crate::cst::{Cst, NodeId, Span};
use tracing::trace;

/// Replace `target` with `replacement` and rebuild the ancestors.
///
/// Returns the node that received the replacement. When `target` is exactly
/// that node's span its text is overwritten; otherwise the replacement is
/// spliced into the node's text between the untouched prefix and suffix.
pub fn propagate(cst: &mut Cst, target: Span, replacement: &str) -> Result<NodeId, SpliceError> {
    let path = containing_path(cst, target).ok_or(SpliceError::NoContainingNode {
        start: target.start,
        end: target.end,
    })?;
    let Some((&innermost, ancestors)) = path.split_last() else {
        return Err(SpliceError::NoContainingNode {
            start: target.start,
            end: target.end,
        });
    };

    let span = cst.span(innermost);
    let text = if span == target {
        replacement.to_string()
    } else {
        let stale = || SpliceError::StaleNode {
            kind: cst.kind(innermost).to_string(),
            start: target.start,
            end: target.end,
        };
        if cst.node(innermost).is_rewritten() {
            return Err(stale());
        }
        let current = cst.text(innermost);
        let prefix = current
            .get(..target.start - span.start)
            .ok_or_else(stale)?;
        let suffix = current.get(target.end - span.start..).ok_or_else(stale)?;
        format!("{prefix}{replacement}{suffix}")
    };
    trace!(
        kind = %cst.kind(innermost),
        start = span.start,
        end = span.end,
        "propagating rewrite"
    );
    cst.set_text(innermost, text);

    for &ancestor in ancestors.iter().rev() {
        let rebuilt = rebuild_from_children(cst, ancestor);
        cst.set_text(ancestor, rebuilt);
    }

    Ok(innermost)
}

/// Root-to-innermost path of nodes whose spans contain `target`.
fn containing_path(cst: &Cst, target: Span) -> Option<Vec<NodeId>> {
    let root = cst.root();
    if !cst.span(root).contains(target) {
        return None;
    }
    let mut path = vec![root];
    let mut current = root;
    while let Some(next) = cst
        .children(current)
        .iter()
        .copied()
        .find(|&c| cst.span(c).contains(target))
    {
        path.push(next);
        current = next;
    }
    Some(path)
}

/// Concatenate a node's children, restoring the original text between them.
///
/// Gaps are taken from the immutable source buffer; a gap that cannot be
/// recovered there becomes a single space between siblings.
fn rebuild_from_children(cst: &Cst, id: NodeId) -> String {
    let children = cst.children(id);
    if children.is_empty() {
        return cst.text(id).to_string();
    }

    let span = cst.span(id);
    let mut out = String::new();
    let mut cursor = span.start;
    for (i, &child) in children.iter().enumerate() {
        let child_span = cst.span(child);
        match cst.original(Span::new(cursor, child_span.start)) {
            Some(gap) => out.push_str(gap),
            None if i > 0 => out.push(' '),
            None => {}
        }
        out.push_str(cst.text(child));
        cursor = child_span.end;
    }
    if let Some(tail) = cst.original(Span::new(cursor, span.end)) {
        out.push_str(tail);
    }
    out
}
