//! Encoder configuration and its builder.
//!
//! The numeric knobs of the tree encoding (branch margin, threshold scaling,
//! threshold precision) are passed explicitly to every encoder through an
//! [`EncoderConfig`]; there is no module-level state.

use crate::core::constants::*;
use crate::core::error::{Result, TreeMipError};
use crate::core::types::FloatPrecision;

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Scaling applied to both sides of a split comparison.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ThresholdScaling {
    /// Compare `x <= t` and `x >= t + eps` unscaled
    Disabled,
    /// Multiply by `max(1/|t|, min_scale)` (or `min_scale` when `t == 0`)
    Magnitude {
        /// Lower bound on the scale factor
        min_scale: f64,
    },
}

impl ThresholdScaling {
    /// Scale factor for a split with threshold `threshold`.
    pub fn scale_for(&self, threshold: f64) -> f64 {
        match *self {
            ThresholdScaling::Disabled => 1.0,
            ThresholdScaling::Magnitude { min_scale } => {
                if threshold == 0.0 {
                    min_scale
                } else {
                    (1.0 / threshold.abs()).max(min_scale)
                }
            }
        }
    }
}

impl Default for ThresholdScaling {
    fn default() -> Self {
        ThresholdScaling::Disabled
    }
}

/// Configuration shared by all tree encoders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderConfig {
    /// Margin of the right-branch comparison `x >= t + epsilon`
    pub epsilon: f64,
    /// Scaling of split comparisons
    pub threshold_scaling: ThresholdScaling,
    /// Precision thresholds are rounded to before encoding
    pub float_precision: FloatPrecision,
    /// Name of single-tree encoders, used as the prefix of their constraint rows
    pub tree_name: String,
    /// Name of random forest encoders
    pub forest_name: String,
    /// Name of gradient boosting encoders
    pub boosting_name: String,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        EncoderConfig {
            epsilon: DEFAULT_EPSILON,
            threshold_scaling: ThresholdScaling::Disabled,
            float_precision: DEFAULT_FLOAT_PRECISION,
            tree_name: DEFAULT_TREE_NAME.to_string(),
            forest_name: DEFAULT_FOREST_NAME.to_string(),
            boosting_name: DEFAULT_BOOSTING_NAME.to_string(),
        }
    }
}

impl EncoderConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the configuration parameters
    pub fn validate(&self) -> Result<()> {
        if !(self.epsilon.is_finite() && self.epsilon >= 0.0) {
            return Err(TreeMipError::invalid_parameter(
                "epsilon",
                self.epsilon.to_string(),
                "must be finite and non-negative",
            ));
        }

        if let ThresholdScaling::Magnitude { min_scale } = self.threshold_scaling {
            if !(min_scale.is_finite() && min_scale > 0.0) {
                return Err(TreeMipError::invalid_parameter(
                    "min_scale",
                    min_scale.to_string(),
                    "must be finite and positive",
                ));
            }
        }

        for (parameter, name) in [
            ("tree_name", &self.tree_name),
            ("forest_name", &self.forest_name),
            ("boosting_name", &self.boosting_name),
        ] {
            if name.trim().is_empty() {
                return Err(TreeMipError::invalid_parameter(
                    parameter,
                    name.clone(),
                    "must not be empty",
                ));
            }
        }

        Ok(())
    }

    /// Load configuration from a `.json` or `.toml` file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| TreeMipError::config(format!("Failed to read config file: {}", e)))?;

        let config: EncoderConfig = match path.extension().and_then(|s| s.to_str()) {
            Some("json") => serde_json::from_str(&content)
                .map_err(|e| TreeMipError::config(format!("Failed to parse JSON config: {}", e)))?,
            Some("toml") => toml::from_str(&content)
                .map_err(|e| TreeMipError::config(format!("Failed to parse TOML config: {}", e)))?,
            _ => {
                return Err(TreeMipError::config(
                    "Unsupported config file format. Use .json or .toml",
                ))
            }
        };

        config.validate()?;
        log::debug!("Loaded encoder configuration from {}", path.display());
        Ok(config)
    }

    /// Save configuration to a `.json` or `.toml` file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = match path.extension().and_then(|s| s.to_str()) {
            Some("json") => serde_json::to_string_pretty(self)
                .map_err(|e| TreeMipError::config(format!("Failed to serialize to JSON: {}", e)))?,
            Some("toml") => toml::to_string_pretty(self)
                .map_err(|e| TreeMipError::config(format!("Failed to serialize to TOML: {}", e)))?,
            _ => {
                return Err(TreeMipError::config(
                    "Unsupported config file format. Use .json or .toml",
                ))
            }
        };

        std::fs::write(path, content)
            .map_err(|e| TreeMipError::config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Apply `TREEMIP_*` environment variable overrides
    pub fn apply_environment_overrides(&mut self) -> Result<()> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides read through `lookup`, then re-validate
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup(ENV_EPSILON) {
            self.epsilon = val
                .trim()
                .parse()
                .map_err(|_| TreeMipError::config(format!("Invalid {}: {}", ENV_EPSILON, val)))?;
        }

        if let Some(val) = lookup(ENV_FLOAT_PRECISION) {
            self.float_precision = val.trim().parse().map_err(|e: String| {
                TreeMipError::config(format!("Invalid {}: {}", ENV_FLOAT_PRECISION, e))
            })?;
        }

        if let Some(val) = lookup(ENV_MIN_SCALE) {
            let min_scale = val
                .trim()
                .parse()
                .map_err(|_| TreeMipError::config(format!("Invalid {}: {}", ENV_MIN_SCALE, val)))?;
            self.threshold_scaling = ThresholdScaling::Magnitude { min_scale };
        }

        self.validate()
    }
}

/// Configuration builder for fluent configuration creation
#[derive(Debug, Clone)]
pub struct EncoderConfigBuilder {
    config: EncoderConfig,
    validation_errors: Vec<String>,
}

impl EncoderConfigBuilder {
    /// Create a new configuration builder
    pub fn new() -> Self {
        EncoderConfigBuilder {
            config: EncoderConfig::default(),
            validation_errors: Vec::new(),
        }
    }

    /// Set the right-branch margin
    pub fn epsilon(mut self, epsilon: f64) -> Self {
        if !(epsilon.is_finite() && epsilon >= 0.0) {
            self.validation_errors
                .push("epsilon must be finite and non-negative".to_string());
        }
        self.config.epsilon = epsilon;
        self
    }

    /// Enable magnitude scaling of split comparisons
    pub fn magnitude_scaling(mut self, min_scale: f64) -> Self {
        if !(min_scale.is_finite() && min_scale > 0.0) {
            self.validation_errors
                .push("min_scale must be finite and positive".to_string());
        }
        self.config.threshold_scaling = ThresholdScaling::Magnitude { min_scale };
        self
    }

    /// Set the threshold scaling mode
    pub fn threshold_scaling(mut self, scaling: ThresholdScaling) -> Self {
        self.config.threshold_scaling = scaling;
        self
    }

    /// Set the threshold precision
    pub fn float_precision(mut self, precision: FloatPrecision) -> Self {
        self.config.float_precision = precision;
        self
    }

    /// Set the single-tree encoder name
    pub fn tree_name<S: Into<String>>(mut self, name: S) -> Self {
        self.config.tree_name = name.into();
        self
    }

    /// Set the random forest encoder name
    pub fn forest_name<S: Into<String>>(mut self, name: S) -> Self {
        self.config.forest_name = name.into();
        self
    }

    /// Set the gradient boosting encoder name
    pub fn boosting_name<S: Into<String>>(mut self, name: S) -> Self {
        self.config.boosting_name = name.into();
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<EncoderConfig> {
        if !self.validation_errors.is_empty() {
            return Err(TreeMipError::config(format!(
                "Configuration validation failed: {}",
                self.validation_errors.join(", ")
            )));
        }

        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for EncoderConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
