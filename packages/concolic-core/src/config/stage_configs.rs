//! Stage-specific configuration types
//!
//! Each engine stage has its own configuration struct with validation.

use super::error::ConfigResult;
use super::preset::Preset;
use super::validation::{check_range, Validatable};
use crate::shared::models::Visibility;
use serde::{Deserialize, Serialize};
use std::time::Duration;

// ============================================================================
// Concolic search loop
// ============================================================================

/// Search loop budget and frontier policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConcolicConfig {
    /// Wall-clock budget per target method in milliseconds (1..=86_400_000)
    pub time_limit_ms: u64,

    /// Only analyze methods named `main`
    pub main_only: bool,

    /// Failed attempts on one frontier path before moving past it (1..=100)
    pub max_frontier_retries: usize,

    /// Hard cap on loop iterations per method (0 = unbounded)
    pub max_iterations: usize,
}

fn default_time_limit_ms() -> u64 {
    10_000
}
fn default_max_frontier_retries() -> usize {
    3
}

impl Default for ConcolicConfig {
    fn default() -> Self {
        Self {
            time_limit_ms: default_time_limit_ms(),
            main_only: false,
            max_frontier_retries: default_max_frontier_retries(),
            max_iterations: 0,
        }
    }
}

impl ConcolicConfig {
    pub fn from_preset(preset: Preset) -> Self {
        match preset {
            Preset::Fast => Self {
                time_limit_ms: 2_000,
                max_frontier_retries: 1,
                ..Self::default()
            },
            Preset::Balanced | Preset::Custom => Self::default(),
            Preset::Thorough => Self {
                time_limit_ms: 60_000,
                max_frontier_retries: 5,
                ..Self::default()
            },
        }
    }

    pub fn time_limit(&self) -> Duration {
        Duration::from_millis(self.time_limit_ms)
    }
}

impl Validatable for ConcolicConfig {
    fn validate(&self) -> ConfigResult<()> {
        check_range(
            "concolic.time_limit_ms",
            self.time_limit_ms,
            1,
            86_400_000,
            "Use 10000 (10s) for most projects",
        )?;
        check_range(
            "concolic.max_frontier_retries",
            self.max_frontier_retries,
            1,
            100,
            "Use 3 unless the solver is known to under-approximate heavily",
        )
    }

    fn config_name(&self) -> &'static str {
        "ConcolicConfig"
    }
}

// ============================================================================
// Inliner
// ============================================================================

/// Call inlining before solving
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InlinerConfig {
    pub enabled: bool,

    /// Maximum nested inlining rounds (1..=64)
    pub depth: usize,

    /// Largest callee body, in predicates, that may be inlined (1..=100_000)
    pub max_body_size: usize,
}

fn default_inline_depth() -> usize {
    5
}
fn default_max_body_size() -> usize {
    1_000
}

impl Default for InlinerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            depth: default_inline_depth(),
            max_body_size: default_max_body_size(),
        }
    }
}

impl InlinerConfig {
    pub fn from_preset(preset: Preset) -> Self {
        match preset {
            Preset::Fast => Self {
                depth: 2,
                max_body_size: 200,
                ..Self::default()
            },
            Preset::Balanced | Preset::Custom => Self::default(),
            Preset::Thorough => Self {
                depth: 10,
                max_body_size: 5_000,
                ..Self::default()
            },
        }
    }
}

impl Validatable for InlinerConfig {
    fn validate(&self) -> ConfigResult<()> {
        check_range("inliner.depth", self.depth, 1, 64, "Default is 5")?;
        check_range(
            "inliner.max_body_size",
            self.max_body_size,
            1,
            100_000,
            "Large bodies slow the solver down more than they help",
        )
    }

    fn config_name(&self) -> &'static str {
        "InlinerConfig"
    }
}

// ============================================================================
// SMT
// ============================================================================

/// Solver collaborator settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SmtConfig {
    /// Per-query timeout in seconds (1..=3600)
    pub timeout_seconds: u64,

    /// Log every prepared query at debug level
    pub log_query: bool,

    /// Ask the backend to simplify formulae before solving
    pub simplify_formulae: bool,
}

fn default_smt_timeout() -> u64 {
    3
}

impl Default for SmtConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_smt_timeout(),
            log_query: false,
            simplify_formulae: true,
        }
    }
}

impl SmtConfig {
    pub fn from_preset(preset: Preset) -> Self {
        match preset {
            Preset::Fast => Self {
                timeout_seconds: 1,
                ..Self::default()
            },
            Preset::Balanced | Preset::Custom => Self::default(),
            Preset::Thorough => Self {
                timeout_seconds: 10,
                ..Self::default()
            },
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl Validatable for SmtConfig {
    fn validate(&self) -> ConfigResult<()> {
        check_range(
            "smt.timeout_seconds",
            self.timeout_seconds,
            1,
            3600,
            "Use 3 for interactive runs",
        )
    }

    fn config_name(&self) -> &'static str {
        "SmtConfig"
    }
}

// ============================================================================
// Descriptors
// ============================================================================

/// Descriptor post-processing before code generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DescriptorConfig {
    /// Classes below this visibility are not instantiated directly
    pub visibility: Visibility,

    /// Prune default-valued fields before emitting a test case
    pub reduce: bool,
}

impl Default for DescriptorConfig {
    fn default() -> Self {
        Self {
            visibility: Visibility::Public,
            reduce: true,
        }
    }
}

impl DescriptorConfig {
    pub fn from_preset(preset: Preset) -> Self {
        match preset {
            Preset::Thorough => Self {
                visibility: Visibility::Package,
                ..Self::default()
            },
            _ => Self::default(),
        }
    }
}

impl Validatable for DescriptorConfig {
    fn validate(&self) -> ConfigResult<()> {
        Ok(())
    }

    fn config_name(&self) -> &'static str {
        "DescriptorConfig"
    }
}
