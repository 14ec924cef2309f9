//! Rewrite rules.
//!
//! A rule pairs an eligibility predicate ([`Rule::is_match`]) with a
//! replacement synthesizer ([`Rule::synthesize`]) and names the splice
//! strategy that lands its replacements. Predicates are pure: a node that
//! does not have the expected shape simply does not match.

pub mod compound;
pub mod constant;
pub mod declaration;
pub mod if_else;
pub mod loops;
pub mod operand;
pub mod relational;
pub mod rename;
pub mod return_type;
pub mod unary;

pub use rename::ReservedNames;

use crate::cst::{Cst, NodeId, Span};
use crate::driver::{BatchReport, Driver, DriverError};
use crate::expr::{ExpressionGenerator, LiteralError};
use crate::splice::SpliceError;
use std::path::Path;
use thiserror::Error;

/// How a rule's replacements are written back into the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// All replacements spliced into the root text in one batch.
    Direct,
    /// Innermost-first, each propagated through the ancestors so outer
    /// matches see inner rewrites.
    Structural,
}

/// Mutable state synthesis may draw on.
pub struct SynthContext<'a> {
    pub generator: &'a mut ExpressionGenerator,
}

#[derive(Error, Debug)]
pub enum RewriteError {
    #[error(transparent)]
    Literal(#[from] LiteralError),

    #[error("`{kind}` node at byte {start} does not have the expected shape")]
    Shape { kind: String, start: usize },

    #[error(transparent)]
    Splice(#[from] SpliceError),
}

impl RewriteError {
    pub(crate) fn shape(cst: &Cst, node: NodeId) -> Self {
        RewriteError::Shape {
            kind: cst.kind(node).to_string(),
            start: cst.span(node).start,
        }
    }

    /// The failure concerns one candidate only; the rest of the pass can go on.
    pub fn is_candidate_local(&self) -> bool {
        !matches!(self, RewriteError::Splice(_))
    }
}

pub trait Rule {
    /// Stable identifier used on the command line and in configuration.
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    fn strategy(&self) -> Strategy {
        Strategy::Direct
    }

    fn is_match(&self, cst: &Cst, node: NodeId) -> bool;

    /// Byte range the replacement covers; the whole node unless overridden.
    fn target(&self, cst: &Cst, node: NodeId) -> Span {
        cst.span(node)
    }

    fn synthesize(
        &self,
        cst: &Cst,
        node: NodeId,
        cx: &mut SynthContext<'_>,
    ) -> Result<String, RewriteError>;

    /// One pass over a single tree with an entropy-seeded generator.
    fn apply_to_tree(&self, tree: &Cst) -> Result<Cst, RewriteError>
    where
        Self: Sized,
    {
        Driver::default()
            .apply_to_tree(self, tree)
            .map(|pass| pass.tree)
    }

    /// One pass over every persisted tree in `input_dir`.
    fn apply_to_all(&self, input_dir: &Path, output_dir: &Path) -> Result<BatchReport, DriverError>
    where
        Self: Sized,
    {
        Driver::default().apply_to_all(self, input_dir, output_dir)
    }
}

/// Knobs shared by the rule catalogue.
#[derive(Debug, Clone)]
pub struct RuleOptions {
    pub rename_suffix: String,
    pub entry_point: String,
    pub reserved: ReservedNames,
}

impl Default for RuleOptions {
    fn default() -> Self {
        Self {
            rename_suffix: "_new".to_string(),
            entry_point: "main".to_string(),
            reserved: ReservedNames::standard(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown rule `{name}`{}", did_you_mean(.suggestion))]
pub struct UnknownRule {
    pub name: String,
    pub suggestion: Option<String>,
}

fn did_you_mean(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(name) => format!(" (did you mean `{name}`?)"),
        None => String::new(),
    }
}

/// The full rule catalogue.
pub struct RuleSet {
    rules: Vec<Box<dyn Rule>>,
}

impl RuleSet {
    pub fn standard(options: &RuleOptions) -> Self {
        let mut rules: Vec<Box<dyn Rule>> = Vec::new();
        for op in compound::OPERATORS {
            rules.push(Box::new(compound::CompoundToExpanded::new(op)));
            rules.push(Box::new(compound::ExpandedToCompound::new(op)));
        }
        for step in [unary::Step::Increment, unary::Step::Decrement] {
            rules.push(Box::new(unary::StepToAssignment::new(step)));
            rules.push(Box::new(unary::AssignmentToStep::new(step)));
        }
        rules.push(Box::new(relational::RelationalSwap));
        rules.push(Box::new(declaration::DeclarationSplit));
        rules.push(Box::new(if_else::ElseIfToBlock));
        rules.push(Box::new(loops::ForToWhile));
        rules.push(Box::new(loops::WhileToFor));
        rules.push(Box::new(return_type::ReturnTypeDeduction::new(
            &options.entry_point,
        )));
        rules.push(Box::new(constant::LiteralRewrite));
        rules.push(Box::new(rename::IdentifierRename::new(
            &options.rename_suffix,
            options.reserved.with(&options.entry_point),
        )));
        Self { rules }
    }

    pub fn iter(&self) -> impl Iterator<Item = &(dyn Rule + 'static)> {
        self.rules.iter().map(|r| r.as_ref())
    }

    pub fn get(&self, name: &str) -> Option<&dyn Rule> {
        self.iter().find(|r| r.name() == name)
    }

    /// Look a rule up by name, suggesting the closest known name on a miss.
    pub fn lookup(&self, name: &str) -> Result<&dyn Rule, UnknownRule> {
        self.get(name).ok_or_else(|| UnknownRule {
            name: name.to_string(),
            suggestion: self
                .iter()
                .map(|r| (strsim::jaro_winkler(name, r.name()), r.name()))
                .filter(|(score, _)| *score > 0.8)
                .max_by(|a, b| a.0.total_cmp(&b.0))
                .map(|(_, best)| best.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalogue_names_are_unique() {
        let set = RuleSet::standard(&RuleOptions::default());
        let mut names: Vec<_> = set.iter().map(|r| r.name().to_string()).collect();
        let total = names.len();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), total);
        assert_eq!(total, 32);
    }

    #[test]
    fn lookup_suggests_close_names() {
        let set = RuleSet::standard(&RuleOptions::default());
        assert!(set.lookup("for_to_while").is_ok());
        let err = set.lookup("for_to_whlie").err().unwrap();
        assert_eq!(err.suggestion.as_deref(), Some("for_to_while"));
        assert!(err.to_string().contains("did you mean `for_to_while`"));
        let err = set.lookup("zzz").err().unwrap();
        assert_eq!(err.suggestion, None);
    }
}
