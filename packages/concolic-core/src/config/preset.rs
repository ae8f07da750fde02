//! Preset configurations
//!
//! Presets provide complete default configurations for common use cases.

use serde::{Deserialize, Serialize};

/// Configuration preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// CI: short budgets, shallow inlining
    ///
    /// - Concolic: 2s per method
    /// - Inliner: depth 2
    /// - SMT: 1s timeout
    Fast,

    /// Development defaults
    ///
    /// - Concolic: 10s per method
    /// - Inliner: depth 5
    /// - SMT: 3s timeout
    Balanced,

    /// Nightly test generation
    ///
    /// - Concolic: 60s per method
    /// - Inliner: depth 10
    /// - SMT: 10s timeout
    Thorough,

    /// Custom: user-defined (YAML only)
    ///
    /// Starts from balanced defaults.
    Custom,
}

impl Preset {
    /// Parse preset from string
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "fast" => Ok(Self::Fast),
            "balanced" => Ok(Self::Balanced),
            "thorough" => Ok(Self::Thorough),
            "custom" => Ok(Self::Custom),
            _ => Err(format!(
                "Unknown preset '{}'. Valid presets: fast, balanced, thorough, custom",
                s
            )),
        }
    }

    /// Convert to string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fast => "fast",
            Self::Balanced => "balanced",
            Self::Thorough => "thorough",
            Self::Custom => "custom",
        }
    }
}

impl Default for Preset {
    fn default() -> Self {
        Self::Balanced
    }
}

impl std::fmt::Display for Preset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_from_str() {
        assert_eq!(Preset::from_str("fast"), Ok(Preset::Fast));
        assert_eq!(Preset::from_str("THOROUGH"), Ok(Preset::Thorough));
        assert!(Preset::from_str("turbo").is_err());
    }

    #[test]
    fn test_preset_as_str_round_trip() {
        for preset in [Preset::Fast, Preset::Balanced, Preset::Thorough, Preset::Custom] {
            assert_eq!(Preset::from_str(preset.as_str()), Ok(preset));
        }
    }
}
