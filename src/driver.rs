//! Rule driver: one pass of one rule over a tree, or over a directory of
//! persisted trees.

use crate::cst::{load_tree, save_tree, Cst, NodeId, Span};
use crate::expr::ExpressionGenerator;
use crate::rules::{RewriteError, Rule, Strategy, SynthContext};
use crate::splice::{apply_direct, propagate, Splice};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Errors that stop a batch before any file is processed.
#[derive(Error, Debug)]
pub enum DriverError {
    #[error("cannot enumerate input trees in {path}: {source}")]
    InputDir {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("cannot create output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A candidate the rule matched but could not rewrite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedCandidate {
    pub span: Span,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassReport {
    /// Nodes the predicate accepted.
    pub matched: usize,
    /// Replacements that changed the tree.
    pub applied: usize,
    pub skipped: Vec<SkippedCandidate>,
}

impl PassReport {
    pub fn changed(&self) -> bool {
        self.applied > 0
    }
}

/// The rewritten copy of a tree plus what happened to it.
#[derive(Debug, Clone)]
pub struct Pass {
    pub tree: Cst,
    pub report: PassReport,
}

#[derive(Debug)]
pub enum FileOutcome {
    Rewritten { path: PathBuf, report: PassReport },
    Unchanged { path: PathBuf },
    Failed { path: PathBuf, reason: String },
}

impl FileOutcome {
    pub fn path(&self) -> &Path {
        match self {
            FileOutcome::Rewritten { path, .. }
            | FileOutcome::Unchanged { path }
            | FileOutcome::Failed { path, .. } => path,
        }
    }
}

/// Per-file results of one rule over one directory.
#[derive(Debug)]
pub struct BatchReport {
    pub rule: String,
    pub files: Vec<FileOutcome>,
}

impl BatchReport {
    pub fn rewritten(&self) -> usize {
        self.count(|f| matches!(f, FileOutcome::Rewritten { .. }))
    }

    pub fn unchanged(&self) -> usize {
        self.count(|f| matches!(f, FileOutcome::Unchanged { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|f| matches!(f, FileOutcome::Failed { .. }))
    }

    fn count(&self, predicate: impl Fn(&FileOutcome) -> bool) -> usize {
        self.files.iter().filter(|f| predicate(f)).count()
    }
}

/// Runs rules over trees. Holds the expression generator so that a seeded
/// driver is reproducible across a whole batch.
pub struct Driver {
    generator: ExpressionGenerator,
    extension: String,
}

impl Default for Driver {
    fn default() -> Self {
        Self::new(ExpressionGenerator::from_entropy())
    }
}

impl Driver {
    pub fn new(generator: ExpressionGenerator) -> Self {
        Self {
            generator,
            extension: "json".to_string(),
        }
    }

    /// Fixed seed for reproducible output, entropy otherwise.
    pub fn seeded(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::new(ExpressionGenerator::from_seed(seed)),
            None => Self::default(),
        }
    }

    /// File extension of persisted trees, without the dot.
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Apply `rule` to a copy of `tree`. The input is never modified.
    ///
    /// Candidates that fail on their own (a literal the generator refuses, an
    /// unexpected child layout) are skipped and reported; a splice failure
    /// aborts the pass.
    pub fn apply_to_tree(&mut self, rule: &dyn Rule, tree: &Cst) -> Result<Pass, RewriteError> {
        let candidates: Vec<(NodeId, Span)> = tree
            .descendants(tree.root())
            .filter(|&id| rule.is_match(tree, id))
            .map(|id| (id, rule.target(tree, id)))
            .collect();

        let mut report = PassReport {
            matched: candidates.len(),
            ..PassReport::default()
        };
        if candidates.is_empty() {
            return Ok(Pass {
                tree: tree.clone(),
                report,
            });
        }

        let tree = match rule.strategy() {
            Strategy::Direct => self.direct(rule, tree, candidates, &mut report)?,
            Strategy::Structural => self.structural(rule, tree, candidates, &mut report)?,
        };
        Ok(Pass { tree, report })
    }

    fn direct(
        &mut self,
        rule: &dyn Rule,
        tree: &Cst,
        mut candidates: Vec<(NodeId, Span)>,
        report: &mut PassReport,
    ) -> Result<Cst, RewriteError> {
        // Outermost first, so a nested candidate is seen after its container
        candidates.sort_by(|a, b| a.1.start.cmp(&b.1.start).then(b.1.end.cmp(&a.1.end)));

        let mut splices = Vec::with_capacity(candidates.len());
        let mut covered_to = None;
        let mut cx = SynthContext {
            generator: &mut self.generator,
        };
        for (id, span) in candidates {
            if covered_to.is_some_and(|end| span.start < end) {
                debug!(
                    rule = rule.name(),
                    start = span.start,
                    end = span.end,
                    "nested candidate dropped"
                );
                continue;
            }
            match rule.synthesize(tree, id, &mut cx) {
                Ok(replacement) => {
                    debug!(
                        rule = rule.name(),
                        kind = %tree.kind(id),
                        start = span.start,
                        end = span.end,
                        "rewriting"
                    );
                    let before = if span == tree.span(id) {
                        tree.text(id)
                    } else {
                        tree.original(span).unwrap_or_default()
                    };
                    splices.push(Splice::new(span, replacement, before));
                    covered_to = Some(span.end);
                }
                Err(e) if e.is_candidate_local() => skip(rule, report, span, &e),
                Err(e) => return Err(e),
            }
        }

        let mut out = tree.clone();
        if splices.is_empty() {
            return Ok(out);
        }
        let root = out.root();
        let outcome = apply_direct(tree.root_text(), tree.span(root).start, splices)?;
        report.applied = outcome.applied();
        if report.applied > 0 {
            out.set_text(root, outcome.text);
        }
        Ok(out)
    }

    fn structural(
        &mut self,
        rule: &dyn Rule,
        tree: &Cst,
        mut candidates: Vec<(NodeId, Span)>,
        report: &mut PassReport,
    ) -> Result<Cst, RewriteError> {
        // Innermost first: later starts, then shorter spans
        candidates.sort_by(|a, b| b.1.start.cmp(&a.1.start).then(a.1.end.cmp(&b.1.end)));

        let mut out = tree.clone();
        let mut cx = SynthContext {
            generator: &mut self.generator,
        };
        for (id, span) in candidates {
            match rule.synthesize(&out, id, &mut cx) {
                Ok(replacement) => {
                    debug!(
                        rule = rule.name(),
                        kind = %out.kind(id),
                        start = span.start,
                        end = span.end,
                        "rewriting"
                    );
                    propagate(&mut out, span, &replacement)?;
                    report.applied += 1;
                }
                Err(e) if e.is_candidate_local() => skip(rule, report, span, &e),
                Err(e) => return Err(e),
            }
        }
        Ok(out)
    }

    /// Apply `rule` to every persisted tree directly inside `input_dir`,
    /// writing each result under the same file name in `output_dir`.
    ///
    /// A file that cannot be read, rewritten or written is recorded as failed
    /// and the batch moves on. Only an unreadable input directory or an
    /// output directory that cannot be created is an error.
    pub fn apply_to_all(
        &mut self,
        rule: &dyn Rule,
        input_dir: &Path,
        output_dir: &Path,
    ) -> Result<BatchReport, DriverError> {
        let mut inputs = Vec::new();
        for entry in WalkDir::new(input_dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|source| DriverError::InputDir {
                path: input_dir.to_path_buf(),
                source,
            })?;
            let path = entry.path();
            if entry.file_type().is_file()
                && path.extension().is_some_and(|ext| ext == self.extension.as_str())
            {
                inputs.push(path.to_path_buf());
            }
        }

        std::fs::create_dir_all(output_dir).map_err(|source| DriverError::OutputDir {
            path: output_dir.to_path_buf(),
            source,
        })?;

        let mut files = Vec::with_capacity(inputs.len());
        for input in inputs {
            let outcome = match self.apply_to_file(rule, &input, output_dir) {
                Ok(report) if report.changed() => FileOutcome::Rewritten {
                    path: input,
                    report,
                },
                Ok(_) => FileOutcome::Unchanged { path: input },
                Err(reason) => {
                    warn!(rule = rule.name(), path = %input.display(), %reason, "file failed");
                    FileOutcome::Failed {
                        path: input,
                        reason,
                    }
                }
            };
            files.push(outcome);
        }

        let report = BatchReport {
            rule: rule.name().to_string(),
            files,
        };
        info!(
            rule = rule.name(),
            rewritten = report.rewritten(),
            unchanged = report.unchanged(),
            failed = report.failed(),
            "batch finished"
        );
        Ok(report)
    }

    fn apply_to_file(
        &mut self,
        rule: &dyn Rule,
        input: &Path,
        output_dir: &Path,
    ) -> Result<PassReport, String> {
        let tree = load_tree(input).map_err(|e| e.to_string())?;
        let pass = self
            .apply_to_tree(rule, &tree)
            .map_err(|e| format!("{}: {e}", input.display()))?;
        let Some(name) = input.file_name() else {
            return Err(format!("{}: path has no file name", input.display()));
        };
        save_tree(&output_dir.join(name), &pass.tree).map_err(|e| e.to_string())?;
        Ok(pass.report)
    }
}

fn skip(rule: &dyn Rule, report: &mut PassReport, span: Span, error: &RewriteError) {
    warn!(
        rule = rule.name(),
        start = span.start,
        end = span.end,
        %error,
        "skipping candidate"
    );
    report.skipped.push(SkippedCandidate {
        span,
        reason: error.to_string(),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::parse_cpp;
    use crate::rules::compound::{CompoundToExpanded, OPERATORS};
    use crate::rules::loops::ForToWhile;

    #[test]
    fn no_match_returns_identical_text() {
        let cst = parse_cpp("int f() { return 0; }").unwrap();
        let pass = Driver::seeded(Some(1))
            .apply_to_tree(&ForToWhile, &cst)
            .unwrap();
        assert_eq!(pass.tree.root_text(), cst.root_text());
        assert_eq!(pass.report, PassReport::default());
    }

    #[test]
    fn input_tree_is_not_modified() {
        let cst = parse_cpp("void f() { a += 1; b += 2; }").unwrap();
        let rule = CompoundToExpanded::new(OPERATORS[0]);
        let pass = Driver::seeded(Some(1)).apply_to_tree(&rule, &cst).unwrap();
        assert_eq!(pass.report.applied, 2);
        assert_eq!(pass.tree.root_text(), "void f() { a = a + 1; b = b + 2; }");
        assert_eq!(cst.root_text(), "void f() { a += 1; b += 2; }");
    }

    #[test]
    fn batch_records_failures_and_continues() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        let cst = parse_cpp("void f() { x += 1; }").unwrap();
        save_tree(&input.path().join("a.json"), &cst).unwrap();
        std::fs::write(input.path().join("b.json"), "not json").unwrap();
        std::fs::write(input.path().join("notes.txt"), "ignored").unwrap();

        let rule = CompoundToExpanded::new(OPERATORS[0]);
        let report = Driver::seeded(Some(1))
            .apply_to_all(&rule, input.path(), output.path())
            .unwrap();
        assert_eq!(report.files.len(), 2);
        assert_eq!(report.rewritten(), 1);
        assert_eq!(report.failed(), 1);
        assert!(output.path().join("a.json").exists());
        assert!(!output.path().join("b.json").exists());
    }

    #[test]
    fn missing_input_directory_is_fatal() {
        let output = tempfile::tempdir().unwrap();
        let rule = CompoundToExpanded::new(OPERATORS[0]);
        let result = Driver::seeded(Some(1)).apply_to_all(
            &rule,
            Path::new("/nonexistent/trees"),
            output.path(),
        );
        assert!(matches!(result, Err(DriverError::InputDir { .. })));
    }
}
