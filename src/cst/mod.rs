//! Concrete syntax trees over an immutable source buffer.
//!
//! A [`Cst`] is an arena of [`Node`]s addressed by [`NodeId`]. Every node
//! carries the byte span it covered in the original source; its text is the
//! source slice at that span until a rewrite replaces it. The source buffer
//! itself never changes, so the whitespace between siblings stays
//! recoverable after any number of rewrites.
//!
//! Passes never mutate their input: the driver clones the arena and edits
//! the clone.

mod document;
mod errors;
mod kind;
mod render;
mod shape;

pub use document::{atomic_write, load_tree, read_document, save_tree, TreeDocument};
pub use errors::{ArtifactError, CstError};
pub use kind::NodeKind;
pub use shape::{
    BinaryShape, DeclarationShape, ElseIfShape, ForInit, ForShape, FunctionShape, UpdateShape,
    WhileShape,
};

use std::sync::Arc;

/// Half-open byte range `[start, end)` into the original source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub const fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub const fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// `other` lies entirely inside `self`.
    pub const fn contains(&self, other: Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    pub const fn overlaps(&self, other: Span) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Index of a node inside its [`Cst`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    kind: NodeKind,
    span: Span,
    text: Option<String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// The node's text no longer mirrors the source slice at its span.
    pub fn is_rewritten(&self) -> bool {
        self.text.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct Cst {
    source: Arc<str>,
    base: usize,
    nodes: Vec<Node>,
}

impl Cst {
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.node(id).kind
    }

    pub fn span(&self, id: NodeId) -> Span {
        self.node(id).span
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    pub fn child(&self, id: NodeId, index: usize) -> Option<NodeId> {
        self.children(id).get(index).copied()
    }

    pub fn is_leaf(&self, id: NodeId) -> bool {
        self.children(id).is_empty()
    }

    /// Current text of a node: the rewritten value if any, else the
    /// original source slice at its span.
    pub fn text(&self, id: NodeId) -> &str {
        let node = self.node(id);
        match &node.text {
            Some(text) => text,
            None => self.original(node.span).unwrap_or_default(),
        }
    }

    /// The immutable source buffer this tree was built over.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Slice of the original source at `span`, if the span is addressable.
    pub fn original(&self, span: Span) -> Option<&str> {
        let start = span.start.checked_sub(self.base)?;
        let end = span.end.checked_sub(self.base)?;
        self.source.get(start..end)
    }

    /// Text of the whole tree, i.e. the reconstructed source.
    pub fn root_text(&self) -> &str {
        self.text(self.root())
    }

    pub(crate) fn set_text(&mut self, id: NodeId, text: String) {
        self.nodes[id.index()].text = Some(text);
    }

    /// Strict ancestors of `id`, nearest first.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            cst: self,
            next: self.parent(id),
        }
    }

    /// `id` and everything below it, in document (pre-)order.
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants {
            cst: self,
            stack: vec![id],
        }
    }

    /// Nearest strict ancestor satisfying `predicate`.
    pub fn find_ancestor(
        &self,
        id: NodeId,
        mut predicate: impl FnMut(&NodeKind) -> bool,
    ) -> Option<NodeId> {
        self.ancestors(id).find(|&a| predicate(self.kind(a)))
    }

    pub fn has_ancestor(&self, id: NodeId, predicate: impl FnMut(&NodeKind) -> bool) -> bool {
        self.find_ancestor(id, predicate).is_some()
    }

    /// First direct child of the given kind.
    pub fn child_of_kind(&self, id: NodeId, kind: &NodeKind) -> Option<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .find(|&c| self.kind(c) == kind)
    }

    /// Any node in the subtree rooted at `id` (itself included) satisfies
    /// `predicate`.
    pub fn subtree_any(&self, id: NodeId, mut predicate: impl FnMut(&NodeKind) -> bool) -> bool {
        self.descendants(id).any(|d| predicate(self.kind(d)))
    }
}

pub struct Ancestors<'a> {
    cst: &'a Cst,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.cst.parent(current);
        Some(current)
    }
}

pub struct Descendants<'a> {
    cst: &'a Cst,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.stack.pop()?;
        self.stack
            .extend(self.cst.children(current).iter().rev().copied());
        Some(current)
    }
}

/// Incremental construction of a [`Cst`], validated by [`CstBuilder::finish`].
///
/// The root is created up front; children must be pushed in source order
/// under a parent that already exists.
pub struct CstBuilder {
    source: Arc<str>,
    base: usize,
    nodes: Vec<Node>,
}

impl CstBuilder {
    /// Start a tree whose root covers `root_span` and whose text is `source`.
    pub fn new(source: impl Into<Arc<str>>, root_kind: &str, root_span: Span) -> Self {
        let root = Node {
            kind: NodeKind::from_grammar(root_kind),
            span: root_span,
            text: None,
            parent: None,
            children: Vec::new(),
        };
        Self {
            source: source.into(),
            base: root_span.start,
            nodes: vec![root],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn push(&mut self, parent: NodeId, kind: &str, span: Span) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            kind: NodeKind::from_grammar(kind),
            span,
            text: None,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.index()].children.push(id);
        id
    }

    /// Push a node whose recorded text may differ from the source slice,
    /// as happens for trees persisted after an earlier rewrite.
    pub fn push_with_text(&mut self, parent: NodeId, kind: &str, span: Span, text: &str) -> NodeId {
        let id = self.push(parent, kind, span);
        if self.slice(span) != Some(text) {
            self.nodes[id.index()].text = Some(text.to_string());
        }
        id
    }

    fn slice(&self, span: Span) -> Option<&str> {
        let start = span.start.checked_sub(self.base)?;
        let end = span.end.checked_sub(self.base)?;
        self.source.get(start..end)
    }

    pub fn finish(self) -> Result<Cst, CstError> {
        let root = self.nodes.first().ok_or(CstError::Empty)?;
        if root.span.end < root.span.start || root.span.len() != self.source.len() {
            return Err(CstError::RootLengthMismatch {
                expected: root.span.len(),
                found: self.source.len(),
            });
        }

        for node in &self.nodes {
            let span = node.span;
            if span.start > span.end || (node.text.is_none() && self.slice(span).is_none()) {
                return Err(CstError::InvalidSpan {
                    kind: node.kind.to_string(),
                    start: span.start,
                    end: span.end,
                });
            }

            let mut previous_end = span.start;
            for &child in &node.children {
                let child_node = &self.nodes[child.index()];
                let child_span = child_node.span;
                if !span.contains(child_span) {
                    return Err(CstError::OutsideParent {
                        kind: child_node.kind.to_string(),
                        start: child_span.start,
                        end: child_span.end,
                        parent_start: span.start,
                        parent_end: span.end,
                    });
                }
                if child_span.start < previous_end {
                    return Err(CstError::OverlappingChildren {
                        kind: node.kind.to_string(),
                        at: child_span.start,
                    });
                }
                previous_end = child_span.end;
            }
        }

        Ok(Cst {
            source: self.source,
            base: self.base,
            nodes: self.nodes,
        })
    }
}
