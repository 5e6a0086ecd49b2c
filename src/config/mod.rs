//! Configuration management for the tree encoders.
//!
//! [`EncoderConfig`] can be built in code ([`EncoderConfigBuilder`]), read
//! from a JSON or TOML file, and adjusted through `TREEMIP_*` environment
//! variables.

pub mod core;

pub use self::core::{EncoderConfig, EncoderConfigBuilder, ThresholdScaling};

/// Conventional configuration file name
pub const DEFAULT_CONFIG_FILE: &str = "treemip.toml";
