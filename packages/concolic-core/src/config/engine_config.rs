//! Engine configuration root
//!
//! `EngineConfig` composes the stage configs; `build()` validates every
//! stage plus cross-stage constraints and seals the result into a
//! `ValidatedConfig` that the checker takes by reference.

use super::error::{ConfigError, ConfigResult};
use super::io::{ConfigExportV1, ConfigOverrides, CONFIG_VERSION};
use super::preset::Preset;
use super::stage_configs::{ConcolicConfig, DescriptorConfig, InlinerConfig, SmtConfig};
use super::validation::Validatable;
use std::path::Path;

/// Engine configuration (builder form)
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    preset: Preset,
    pub concolic: ConcolicConfig,
    pub inliner: InlinerConfig,
    pub smt: SmtConfig,
    pub descriptor: DescriptorConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::preset(Preset::Balanced)
    }
}

impl EngineConfig {
    /// Start from preset defaults
    pub fn preset(preset: Preset) -> Self {
        Self {
            preset,
            concolic: ConcolicConfig::from_preset(preset),
            inliner: InlinerConfig::from_preset(preset),
            smt: SmtConfig::from_preset(preset),
            descriptor: DescriptorConfig::from_preset(preset),
        }
    }

    pub fn concolic(mut self, f: impl FnOnce(ConcolicConfig) -> ConcolicConfig) -> Self {
        self.concolic = f(self.concolic);
        self
    }

    pub fn inliner(mut self, f: impl FnOnce(InlinerConfig) -> InlinerConfig) -> Self {
        self.inliner = f(self.inliner);
        self
    }

    pub fn smt(mut self, f: impl FnOnce(SmtConfig) -> SmtConfig) -> Self {
        self.smt = f(self.smt);
        self
    }

    pub fn descriptor(mut self, f: impl FnOnce(DescriptorConfig) -> DescriptorConfig) -> Self {
        self.descriptor = f(self.descriptor);
        self
    }

    pub fn get_preset(&self) -> Preset {
        self.preset
    }

    /// Validate all stages and cross-stage constraints
    pub fn build(self) -> ConfigResult<ValidatedConfig> {
        self.concolic.validate()?;
        self.inliner.validate()?;
        self.smt.validate()?;
        self.descriptor.validate()?;

        let timeout_ms = self.smt.timeout_seconds.saturating_mul(1000);
        if timeout_ms > self.concolic.time_limit_ms {
            return Err(ConfigError::SolverBudget {
                timeout_ms,
                time_limit_ms: self.concolic.time_limit_ms,
            });
        }

        Ok(ValidatedConfig(self))
    }

    /// Load a versioned YAML file
    pub fn from_yaml(path: impl AsRef<Path>) -> ConfigResult<ValidatedConfig> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> ConfigResult<ValidatedConfig> {
        let export: ConfigExportV1 = serde_yaml::from_str(content)?;

        let version = export.version.ok_or(ConfigError::MissingVersion)?;
        if version != CONFIG_VERSION {
            return Err(ConfigError::UnsupportedVersion(version));
        }

        let preset = Preset::from_str(&export.preset)
            .map_err(|_| ConfigError::UnknownPreset(export.preset.clone()))?;

        let mut config = Self::preset(preset);
        if let Some(overrides) = export.overrides {
            if let Some(concolic) = overrides.concolic {
                config.concolic = concolic;
            }
            if let Some(inliner) = overrides.inliner {
                config.inliner = inliner;
            }
            if let Some(smt) = overrides.smt {
                config.smt = smt;
            }
            if let Some(descriptor) = overrides.descriptor {
                config.descriptor = descriptor;
            }
        }

        tracing::debug!(preset = %preset, "loaded engine configuration from YAML");
        config.build()
    }

    /// Export as YAML with every stage spelled out
    pub fn to_yaml(&self) -> ConfigResult<String> {
        let export = ConfigExportV1 {
            version: Some(CONFIG_VERSION),
            preset: self.preset.as_str().to_string(),
            overrides: Some(ConfigOverrides {
                concolic: Some(self.concolic.clone()),
                inliner: Some(self.inliner.clone()),
                smt: Some(self.smt.clone()),
                descriptor: Some(self.descriptor.clone()),
            }),
        };
        Ok(serde_yaml::to_string(&export)?)
    }
}

/// Validated, immutable engine configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedConfig(EngineConfig);

impl ValidatedConfig {
    pub fn into_inner(self) -> EngineConfig {
        self.0
    }

    pub fn as_inner(&self) -> &EngineConfig {
        &self.0
    }

    pub fn concolic(&self) -> &ConcolicConfig {
        &self.0.concolic
    }

    pub fn inliner(&self) -> &InlinerConfig {
        &self.0.inliner
    }

    pub fn smt(&self) -> &SmtConfig {
        &self.0.smt
    }

    pub fn descriptor(&self) -> &DescriptorConfig {
        &self.0.descriptor
    }

    pub fn to_yaml(&self) -> ConfigResult<String> {
        self.0.to_yaml()
    }
}

impl Default for ValidatedConfig {
    fn default() -> Self {
        ValidatedConfig(EngineConfig::default())
    }
}
