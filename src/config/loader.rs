use crate::config::schema::{EngineConfig, ValidationError};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Toml {
        path: Option<PathBuf>,
        source: toml_edit::de::Error,
    },
    Validation {
        path: Option<PathBuf>,
        source: ValidationError,
    },
}

impl ConfigError {
    fn with_path(self, path: &Path) -> Self {
        let path = path.to_path_buf();
        match self {
            ConfigError::Io { .. } => self,
            ConfigError::Toml { path: None, source } => ConfigError::Toml {
                path: Some(path),
                source,
            },
            ConfigError::Validation { path: None, source } => ConfigError::Validation {
                path: Some(path),
                source,
            },
            other => other,
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, source } => {
                write!(
                    f,
                    "failed to read engine config from {}: {}",
                    path.display(),
                    source
                )
            }
            ConfigError::Toml { path, source } => match path {
                Some(path) => write!(
                    f,
                    "failed to parse engine config TOML ({}): {}",
                    path.display(),
                    source
                ),
                None => write!(f, "failed to parse engine config TOML: {}", source),
            },
            ConfigError::Validation { path, source } => match path {
                Some(path) => write!(f, "invalid engine config ({}): {}", path.display(), source),
                None => write!(f, "invalid engine config: {}", source),
            },
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            ConfigError::Toml { source, .. } => Some(source),
            ConfigError::Validation { source, .. } => Some(source),
        }
    }
}

pub fn load_from_str(input: &str) -> Result<EngineConfig, ConfigError> {
    let config: EngineConfig = toml_edit::de::from_str(input)
        .map_err(|source| ConfigError::Toml { path: None, source })?;
    config
        .validate()
        .map_err(|source| ConfigError::Validation { path: None, source })?;
    Ok(config)
}

pub fn load_from_path(path: impl AsRef<Path>) -> Result<EngineConfig, ConfigError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_from_str(&contents).map_err(|error| error.with_path(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ValidationIssue;

    #[test]
    fn empty_input_uses_defaults() {
        let config = load_from_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.rename.suffix, "_new");
        assert_eq!(config.rename.entry_point, "main");
        assert_eq!(config.pipeline.extension, "json");
        assert_eq!(config.constant.seed, None);
    }

    #[test]
    fn full_config() {
        let config = load_from_str(
            r#"
[rename]
suffix = "_v2"
entry_point = "start"
reserved = ["my_macro"]

[constant]
seed = 42

[pipeline]
rules = ["for_to_while", "plus_equal_to_expanded"]
extension = "ast"
"#,
        )
        .unwrap();
        assert_eq!(config.constant.seed, Some(42));
        assert_eq!(config.pipeline.rules.len(), 2);

        let options = config.rule_options();
        assert_eq!(options.rename_suffix, "_v2");
        assert!(options.reserved.contains("my_macro"));
        assert!(options.reserved.contains("printf"));
    }

    #[test]
    fn unknown_rule_gets_a_suggestion() {
        let err = load_from_str("[pipeline]\nrules = [\"for_to_whlie\"]\n").unwrap_err();
        let ConfigError::Validation { source, .. } = &err else {
            panic!("expected validation error, got {err}");
        };
        assert_eq!(
            source.issues,
            [ValidationIssue::UnknownRule {
                name: "for_to_whlie".to_string(),
                suggestion: Some("for_to_while".to_string()),
            }]
        );
        assert!(err.to_string().contains("did you mean 'for_to_while'"));
    }

    #[test]
    fn collects_every_issue() {
        let err = load_from_str(
            "[rename]\nsuffix = \"\"\nentry_point = \"9main\"\n[pipeline]\nextension = \" \"\n",
        )
        .unwrap_err();
        let ConfigError::Validation { source, .. } = err else {
            panic!("expected validation error");
        };
        assert_eq!(source.issues.len(), 3);
    }

    #[test]
    fn path_is_attached_to_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.toml");
        fs::write(&path, "[rename\n").unwrap();
        let err = load_from_path(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Toml { path: Some(_), .. }));
        assert!(err.to_string().contains("engine.toml"));
    }
}
