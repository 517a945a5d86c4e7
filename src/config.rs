//! YAML configuration for the filter and the ground segmenter.

use lidsor_core::LidsorError;
use lidsor_filters::LidsorParams;
use lidsor_segmentation::{RansacGround, RansacGroundConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to access config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Invalid(#[from] LidsorError),
}

/// Filter and ground-segmentation settings, loadable from YAML.
///
/// Every field has a default, so an empty document is a valid config:
///
/// ```yaml
/// filter:
///   k: 20
///   s: 1.5
///   scaling_factor: 50.0
/// ground:
///   distance_threshold: 0.15
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LidsorConfig {
    #[serde(default)]
    pub filter: LidsorParams,

    #[serde(default)]
    pub ground: RansacGroundConfig,
}

impl LidsorConfig {
    /// Parse and validate a YAML document.
    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        let config: LidsorConfig = if content.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(content)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file.
    pub fn from_yaml<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    pub fn to_yaml_string(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Save configuration to a YAML file.
    pub fn to_yaml<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        std::fs::write(path, self.to_yaml_string()?)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), LidsorError> {
        self.filter.validate()?;
        self.ground.validate()
    }

    /// The RANSAC segmenter described by `ground`.
    pub fn segmenter(&self) -> RansacGround {
        RansacGround::new(self.ground)
    }
}
