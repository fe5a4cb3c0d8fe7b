//! Decision engine configuration

use agileweb_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Which pipeline the engine runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FilterMode {
    /// Deny list, custom controls, category classifier and rule table only
    Basic,
    /// Full pipeline with site policies and signal detectors
    #[default]
    Enhanced,
}

/// Confidence thresholds used by the combiner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Self-harm confidence above which the decision is overridden
    #[serde(default = "default_self_harm")]
    pub self_harm: f32,

    /// Cyberbullying confidence above which the decision is overridden
    #[serde(default = "default_cyberbullying")]
    pub cyberbullying: f32,

    /// Below this combined confidence a BLOCK is softened to GATE
    #[serde(default = "default_low_confidence")]
    pub low_confidence: f32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            self_harm: default_self_harm(),
            cyberbullying: default_cyberbullying(),
            low_confidence: default_low_confidence(),
        }
    }
}

fn default_self_harm() -> f32 {
    0.7
}

fn default_cyberbullying() -> f32 {
    0.6
}

fn default_low_confidence() -> f32 {
    0.6
}

/// Engine configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub mode: FilterMode,

    #[serde(default)]
    pub thresholds: Thresholds,
}

impl EngineConfig {
    /// Parse configuration from YAML
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Reject thresholds outside [0, 1]
    pub fn validate(&self) -> Result<()> {
        let thresholds = [
            ("self_harm", self.thresholds.self_harm),
            ("cyberbullying", self.thresholds.cyberbullying),
            ("low_confidence", self.thresholds.low_confidence),
        ];

        for (name, value) in thresholds {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::config(format!(
                    "threshold '{}' must be within [0, 1], got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.mode, FilterMode::Enhanced);
        assert_eq!(config.thresholds.self_harm, 0.7);
        assert_eq!(config.thresholds.cyberbullying, 0.6);
        assert_eq!(config.thresholds.low_confidence, 0.6);
    }

    #[test]
    fn test_from_yaml_partial() {
        let yaml = r#"
mode: basic
thresholds:
  cyberbullying: 0.8
"#;
        let config = EngineConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.mode, FilterMode::Basic);
        assert_eq!(config.thresholds.cyberbullying, 0.8);
        assert_eq!(config.thresholds.self_harm, 0.7);
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "mode: basic\nthresholds:\n  low_confidence: 0.5").unwrap();

        let config = EngineConfig::from_file(file.path()).unwrap();
        assert_eq!(config.mode, FilterMode::Basic);
        assert_eq!(config.thresholds.low_confidence, 0.5);

        let missing = EngineConfig::from_file("/nonexistent/engine.yaml").unwrap_err();
        assert!(matches!(missing, Error::Io(_)));
    }

    #[test]
    fn test_empty_yaml_is_default() {
        let config = EngineConfig::from_yaml("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_out_of_range_threshold_rejected() {
        let err = EngineConfig::from_yaml("thresholds:\n  self_harm: 1.5\n").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_unknown_mode_rejected() {
        assert!(EngineConfig::from_yaml("mode: paranoid\n").is_err());
    }
}
