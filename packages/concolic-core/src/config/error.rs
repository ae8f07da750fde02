//! Engine configuration errors

use super::io::CONFIG_VERSION;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// A stage setting outside its accepted range
    #[error("{field} = {value} is outside {min}..={max} ({hint})")]
    Range {
        field: String,
        value: String,
        min: String,
        max: String,
        hint: String,
    },

    /// A single solver call could outlive the whole method budget
    #[error(
        "solver timeout of {timeout_ms} ms does not fit the per-method budget of {time_limit_ms} ms; \
         lower smt.timeout_seconds or raise concolic.time_limit_ms"
    )]
    SolverBudget { timeout_ms: u64, time_limit_ms: u64 },

    #[error("configuration has no `version` key, add `version: {}` at the top", CONFIG_VERSION)]
    MissingVersion,

    #[error("configuration version {0} is not supported, expected {}", CONFIG_VERSION)]
    UnsupportedVersion(u32),

    #[error("unknown preset `{0}`, expected fast, balanced, thorough or custom")]
    UnknownPreset(String),

    #[error("cannot read configuration {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

impl ConfigError {
    pub fn range(
        field: impl Into<String>,
        value: impl ToString,
        min: impl ToString,
        max: impl ToString,
        hint: impl Into<String>,
    ) -> Self {
        Self::Range {
            field: field.into(),
            value: value.to_string(),
            min: min.to_string(),
            max: max.to_string(),
            hint: hint.into(),
        }
    }
}
