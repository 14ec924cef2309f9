use crate::rules::{ReservedNames, RuleOptions, RuleSet};
use serde::Deserialize;
use std::fmt;

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    #[serde(default)]
    pub rename: RenameSection,
    #[serde(default)]
    pub constant: ConstantSection,
    #[serde(default)]
    pub pipeline: PipelineSection,
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();

        if self.rename.suffix.is_empty() {
            issues.push(ValidationIssue::EmptyField {
                field: "rename.suffix",
            });
        } else if !self
            .rename
            .suffix
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            issues.push(ValidationIssue::InvalidIdentifier {
                field: "rename.suffix",
                value: self.rename.suffix.clone(),
            });
        }

        if !is_identifier(&self.rename.entry_point) {
            issues.push(ValidationIssue::InvalidIdentifier {
                field: "rename.entry_point",
                value: self.rename.entry_point.clone(),
            });
        }
        for name in &self.rename.reserved {
            if !is_identifier(name) {
                issues.push(ValidationIssue::InvalidIdentifier {
                    field: "rename.reserved",
                    value: name.clone(),
                });
            }
        }

        if self.pipeline.extension.trim().is_empty() {
            issues.push(ValidationIssue::EmptyField {
                field: "pipeline.extension",
            });
        }

        let rules = RuleSet::standard(&self.rule_options());
        for name in &self.pipeline.rules {
            if let Err(unknown) = rules.lookup(name) {
                issues.push(ValidationIssue::UnknownRule {
                    name: unknown.name,
                    suggestion: unknown.suggestion,
                });
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues })
        }
    }

    /// Options for building the rule catalogue from this configuration.
    pub fn rule_options(&self) -> RuleOptions {
        RuleOptions {
            rename_suffix: self.rename.suffix.clone(),
            entry_point: self.rename.entry_point.clone(),
            reserved: ReservedNames::standard().extended(self.rename.reserved.iter().cloned()),
        }
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct RenameSection {
    #[serde(default = "default_suffix")]
    pub suffix: String,
    #[serde(default = "default_entry_point")]
    pub entry_point: String,
    /// Added to the standard reserved names.
    #[serde(default)]
    pub reserved: Vec<String>,
}

impl Default for RenameSection {
    fn default() -> Self {
        Self {
            suffix: default_suffix(),
            entry_point: default_entry_point(),
            reserved: Vec::new(),
        }
    }
}

fn default_suffix() -> String {
    "_new".to_string()
}

fn default_entry_point() -> String {
    "main".to_string()
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct ConstantSection {
    /// Fixed generator seed; entropy when absent.
    #[serde(default)]
    pub seed: Option<u64>,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct PipelineSection {
    /// Rules run by `pipeline`, each into its own output directory. Empty
    /// means the whole catalogue.
    #[serde(default)]
    pub rules: Vec<String>,
    #[serde(default = "default_extension")]
    pub extension: String,
}

impl Default for PipelineSection {
    fn default() -> Self {
        Self {
            rules: Vec::new(),
            extension: default_extension(),
        }
    }
}

fn default_extension() -> String {
    "json".to_string()
}

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, issue) in self.issues.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    EmptyField {
        field: &'static str,
    },
    InvalidIdentifier {
        field: &'static str,
        value: String,
    },
    UnknownRule {
        name: String,
        suggestion: Option<String>,
    },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::EmptyField { field } => write!(f, "'{field}' must not be empty"),
            ValidationIssue::InvalidIdentifier { field, value } => {
                write!(f, "'{field}' value '{value}' is not a valid identifier")
            }
            ValidationIssue::UnknownRule { name, suggestion } => match suggestion {
                Some(best) => write!(f, "unknown rule '{name}' (did you mean '{best}'?)"),
                None => write!(f, "unknown rule '{name}'"),
            },
        }
    }
}
