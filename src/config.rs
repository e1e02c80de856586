//! Experiment configuration structures and YAML parsing.

use std::path::Path;
use std::time::Duration;

use color_eyre::eyre::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::topology::{LinkProfile, StarTopology};

/// Top-level experiment configuration loaded from YAML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentConfig {
    pub experiment: ExperimentSection,
    #[serde(default)]
    pub topology: TopologySection,
}

/// Run identity and length.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentSection {
    /// Experiment name, used in log file names.
    pub name: String,
    /// Duration of each generator's traffic run.
    #[serde(with = "humantime_serde")]
    pub duration: Duration,
}

/// Star topology parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopologySection {
    #[serde(default = "default_generator_count")]
    pub generator_count: usize,
    #[serde(default = "LinkProfile::default_sink")]
    pub sink_link: LinkProfile,
    #[serde(default = "LinkProfile::default_generator")]
    pub generator_link: LinkProfile,
}

fn default_generator_count() -> usize {
    50
}

impl Default for TopologySection {
    fn default() -> Self {
        Self {
            generator_count: default_generator_count(),
            sink_link: LinkProfile::default_sink(),
            generator_link: LinkProfile::default_generator(),
        }
    }
}

impl ExperimentConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        let name = &self.experiment.name;
        if name.is_empty() {
            return Err(ValidationError::InvalidExperiment(
                "experiment name cannot be empty".to_string(),
            ));
        }
        if name.chars().any(|c| c.is_whitespace() || c == '/' || c == '\\') {
            return Err(ValidationError::InvalidExperiment(format!(
                "experiment name '{}' must not contain whitespace or path separators",
                name
            )));
        }
        if self.experiment.duration.as_secs() == 0 {
            return Err(ValidationError::InvalidExperiment(
                "duration must be at least one second".to_string(),
            ));
        }

        if self.topology.generator_count == 0 {
            return Err(ValidationError::InvalidTopology(
                "generator_count must be at least 1".to_string(),
            ));
        }
        for (side, link) in [
            ("sink_link", &self.topology.sink_link),
            ("generator_link", &self.topology.generator_link),
        ] {
            if link.capacity_mbit <= 0.0 {
                return Err(ValidationError::InvalidTopology(format!(
                    "{} capacity must be positive",
                    side
                )));
            }
            if !(0.0..=100.0).contains(&link.loss_percent) {
                return Err(ValidationError::InvalidTopology(format!(
                    "{} loss_percent must be within 0..=100",
                    side
                )));
            }
        }

        Ok(())
    }

    /// The star topology this configuration describes.
    pub fn star_topology(&self) -> StarTopology {
        StarTopology {
            generator_count: self.topology.generator_count,
            sink_link: self.topology.sink_link,
            generator_link: self.topology.generator_link,
        }
    }

    /// Run duration in whole seconds, as encoded into log file names.
    pub fn duration_secs(&self) -> u64 {
        self.experiment.duration.as_secs()
    }
}

/// Configuration validation errors
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid experiment settings: {0}")]
    InvalidExperiment(String),
    #[error("Invalid topology settings: {0}")]
    InvalidTopology(String),
}

/// Load and validate an experiment configuration from a YAML file.
pub fn load_config(path: &Path) -> Result<ExperimentConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
    let config: ExperimentConfig = serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file '{}'", path.display()))?;
    config
        .validate()
        .with_context(|| format!("Invalid configuration in '{}'", path.display()))?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn valid_config() -> ExperimentConfig {
        ExperimentConfig {
            experiment: ExperimentSection {
                name: "HighDelay".to_string(),
                duration: Duration::from_secs(60),
            },
            topology: TopologySection::default(),
        }
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_empty_name_rejected() {
        let mut config = valid_config();
        config.experiment.name = String::new();
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidExperiment(_))
        ));
    }

    #[test]
    fn test_name_with_path_separator_rejected() {
        let mut config = valid_config();
        config.experiment.name = "High/Delay".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_generators_rejected() {
        let mut config = valid_config();
        config.topology.generator_count = 0;
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidTopology(_))
        ));
    }

    #[test]
    fn test_negative_capacity_rejected() {
        let mut config = valid_config();
        config.topology.sink_link.capacity_mbit = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_config_from_yaml() {
        let yaml = r#"
experiment:
  name: HighDelay
  duration: 60s
topology:
  generator_count: 50
  sink_link:
    capacity_mbit: 500
    delay: 2ms
    loss_percent: 0.1
  generator_link:
    capacity_mbit: 10
    delay: 500us
    loss_percent: 0.1
"#;
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(yaml.as_bytes()).unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.experiment.name, "HighDelay");
        assert_eq!(config.duration_secs(), 60);
        assert_eq!(config.topology.generator_count, 50);
        assert_eq!(config.topology.sink_link.capacity_mbit, 500.0);
        assert_eq!(config.topology.generator_link.delay, Duration::from_micros(500));
    }

    #[test]
    fn test_load_config_defaults_topology() {
        let yaml = "experiment:\n  name: Quick\n  duration: 30s\n";
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(yaml.as_bytes()).unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.topology.generator_count, 50);
        assert_eq!(config.topology.sink_link, LinkProfile::default_sink());
    }
}
