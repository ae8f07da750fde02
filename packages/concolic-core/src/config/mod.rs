//! Engine configuration
//!
//! Three tiers, from simple to complete:
//! - Level 1: Preset - one-liner defaults
//! - Level 2: Stage override - adjust one stage with a closure
//! - Level 3: YAML - versioned file with per-stage overrides
//!
//! # Examples
//!
//! ```rust,ignore
//! use concolic_core::config::{EngineConfig, Preset};
//!
//! let config = EngineConfig::preset(Preset::Fast).build()?;
//!
//! let config = EngineConfig::preset(Preset::Balanced)
//!     .inliner(|c| InlinerConfig { depth: 3, ..c })
//!     .build()?;
//!
//! let config = EngineConfig::from_yaml("engine.yaml")?;
//! ```
//!
//! The validated config is immutable and passed into the checker
//! constructor; nothing reads configuration from globals.

pub mod engine_config;
pub mod error;
pub mod io;
pub mod preset;
pub mod stage_configs;
pub mod validation;

pub use engine_config::{EngineConfig, ValidatedConfig};
pub use error::{ConfigError, ConfigResult};
pub use io::{ConfigExportV1, ConfigOverrides};
pub use preset::Preset;
pub use stage_configs::{ConcolicConfig, DescriptorConfig, InlinerConfig, SmtConfig};
pub use crate::shared::models::Visibility;
pub use validation::Validatable;
