use super::{ArtifactError, Cst, CstBuilder, CstError, NodeId, Span};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::Path;

/// Persisted form of a tree: one JSON object per node.
///
/// ```json
/// { "type": "translation_unit", "start_byte": 0, "end_byte": 7,
///   "text": "x += 1;", "children": [ ... ] }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeDocument {
    #[serde(rename = "type")]
    pub kind: String,
    pub start_byte: usize,
    pub end_byte: usize,
    pub text: String,
    #[serde(default)]
    pub children: Vec<TreeDocument>,
}

impl Cst {
    /// Rebuild an arena from a persisted document. The root's text becomes
    /// the immutable source buffer.
    pub fn from_document(doc: &TreeDocument) -> Result<Cst, CstError> {
        if doc.end_byte < doc.start_byte {
            return Err(CstError::InvalidSpan {
                kind: doc.kind.clone(),
                start: doc.start_byte,
                end: doc.end_byte,
            });
        }

        let mut builder = CstBuilder::new(
            doc.text.as_str(),
            &doc.kind,
            Span::new(doc.start_byte, doc.end_byte),
        );
        let mut stack: Vec<(&TreeDocument, NodeId)> = vec![(doc, builder.root())];
        while let Some((parent_doc, parent)) = stack.pop() {
            for child in &parent_doc.children {
                let span = Span::new(child.start_byte, child.end_byte);
                let id = builder.push_with_text(parent, &child.kind, span, &child.text);
                stack.push((child, id));
            }
        }
        builder.finish()
    }

    pub fn to_document(&self) -> TreeDocument {
        self.document_at(self.root())
    }

    fn document_at(&self, id: NodeId) -> TreeDocument {
        let span = self.span(id);
        TreeDocument {
            kind: self.kind(id).as_str().to_string(),
            start_byte: span.start,
            end_byte: span.end,
            text: self.text(id).to_string(),
            children: self
                .children(id)
                .iter()
                .map(|&child| self.document_at(child))
                .collect(),
        }
    }
}

/// Read a persisted tree document without rebuilding the arena.
///
/// Enough for extracting the root text of a tree whose root was rewritten,
/// which no longer validates as a tree over its own source.
pub fn read_document(path: &Path) -> Result<TreeDocument, ArtifactError> {
    let contents = fs::read_to_string(path).map_err(|source| ArtifactError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| ArtifactError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Read and validate a persisted tree.
pub fn load_tree(path: &Path) -> Result<Cst, ArtifactError> {
    let doc = read_document(path)?;
    Cst::from_document(&doc).map_err(|source| ArtifactError::Shape {
        path: path.to_path_buf(),
        source,
    })
}

/// Persist a tree as pretty-printed JSON, atomically.
pub fn save_tree(path: &Path, cst: &Cst) -> Result<(), ArtifactError> {
    let write_error = |source| ArtifactError::Write {
        path: path.to_path_buf(),
        source,
    };
    let json = serde_json::to_string_pretty(&cst.to_document())
        .map_err(|e| write_error(std::io::Error::other(e)))?;
    atomic_write(path, json.as_bytes()).map_err(write_error)
}

/// Atomic file write: tempfile + fsync + rename.
///
/// Either the full write succeeds or the destination is left untouched.
pub fn atomic_write(path: &Path, content: &[u8]) -> std::io::Result<()> {
    // Create tempfile in same directory to ensure same filesystem
    let parent = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };

    let mut temp = tempfile::NamedTempFile::new_in(parent)?;
    temp.write_all(content)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"{
        "type": "translation_unit", "start_byte": 0, "end_byte": 6, "text": "i++;\n\n",
        "children": [
            { "type": "expression_statement", "start_byte": 0, "end_byte": 4, "text": "i++;",
              "children": [
                { "type": "update_expression", "start_byte": 0, "end_byte": 3, "text": "i++",
                  "children": [
                    { "type": "identifier", "start_byte": 0, "end_byte": 1, "text": "i", "children": [] },
                    { "type": "++", "start_byte": 1, "end_byte": 3, "text": "++", "children": [] }
                  ] },
                { "type": ";", "start_byte": 3, "end_byte": 4, "text": ";" }
              ] }
        ]
    }"#;

    #[test]
    fn document_round_trip_is_lossless() {
        let doc: TreeDocument = serde_json::from_str(DOC).unwrap();
        let cst = Cst::from_document(&doc).unwrap();
        assert_eq!(cst.len(), 6);
        assert_eq!(cst.root_text(), "i++;\n\n");
        assert_eq!(cst.to_document(), doc);
    }

    #[test]
    fn stale_child_text_is_kept_as_rewritten() {
        let mut doc: TreeDocument = serde_json::from_str(DOC).unwrap();
        doc.children[0].text = "i = i + 1;".to_string();
        let cst = Cst::from_document(&doc).unwrap();
        let stmt = cst.child(cst.root(), 0).unwrap();
        assert!(cst.node(stmt).is_rewritten());
        assert_eq!(cst.text(stmt), "i = i + 1;");
        assert_eq!(cst.to_document(), doc);
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tree.json");
        let doc: TreeDocument = serde_json::from_str(DOC).unwrap();
        let cst = Cst::from_document(&doc).unwrap();

        save_tree(&path, &cst).unwrap();
        let loaded = load_tree(&path).unwrap();
        assert_eq!(loaded.to_document(), doc);
    }

    #[test]
    fn load_reports_malformed_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ \"type\": ").unwrap();
        assert!(matches!(load_tree(&path), Err(ArtifactError::Json { .. })));
    }

    #[test]
    fn load_reports_inconsistent_spans() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("spans.json");
        fs::write(
            &path,
            r#"{ "type": "translation_unit", "start_byte": 0, "end_byte": 2, "text": "ab",
                 "children": [ { "type": "identifier", "start_byte": 1, "end_byte": 9, "text": "b" } ] }"#,
        )
        .unwrap();
        assert!(matches!(load_tree(&path), Err(ArtifactError::Shape { .. })));
    }
}
