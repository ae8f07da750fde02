//! Configuration I/O
//!
//! Defines the YAML schema. Loading lives in engine_config.rs.

use super::stage_configs::*;
use serde::{Deserialize, Serialize};

/// Schema version written by `to_yaml` and the only one accepted on load
pub const CONFIG_VERSION: u32 = 1;

/// YAML Schema v1
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigExportV1 {
    /// Schema version (always 1 for v1)
    pub version: Option<u32>,

    /// Base preset
    pub preset: String,

    /// Fine-grained overrides
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overrides: Option<ConfigOverrides>,
}

/// Per-stage overrides applied on top of the preset
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concolic: Option<ConcolicConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inliner: Option<InlinerConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub smt: Option<SmtConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descriptor: Option<DescriptorConfig>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_override_uses_field_defaults() {
        let yaml = "version: 1\npreset: fast\noverrides:\n  inliner:\n    depth: 7\n";
        let export: ConfigExportV1 = serde_yaml::from_str(yaml).unwrap();
        let inliner = export.overrides.unwrap().inliner.unwrap();
        assert_eq!(inliner.depth, 7);
        assert!(inliner.enabled);
        assert_eq!(inliner.max_body_size, 1_000);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let yaml = "version: 1\npreset: fast\noverrides:\n  smt:\n    timeout: 7\n";
        assert!(serde_yaml::from_str::<ConfigExportV1>(yaml).is_err());
    }
}
