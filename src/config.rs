use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

use crate::core::breeds::default_feature_names;
use crate::core::normalize::{AttributeScale, RangeError, RangeModel, DEFAULT_MISMATCH_PENALTY};

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid matching configuration: {0}")]
    Matching(#[from] RangeError),
}

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default)]
    pub matching: MatchingSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub workers: Option<usize>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: None,
        }
    }
}

fn default_host() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16 { 8080 }

#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    /// JSON file mirroring registered animals; in-memory only when unset
    pub records_path: Option<String>,
    #[serde(default = "default_breed_table_path")]
    pub breed_table_path: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            records_path: None,
            breed_table_path: default_breed_table_path(),
        }
    }
}

fn default_breed_table_path() -> String { "data/breeds.csv".to_string() }

#[derive(Debug, Clone, Deserialize)]
pub struct MatchingSettings {
    #[serde(default)]
    pub ranges: ScaleConfig,
    #[serde(default)]
    pub coefficients: CoefficientConfig,
    #[serde(default = "default_mismatch_penalty")]
    pub mismatch_penalty: f64,
    #[serde(default = "default_feature_names")]
    pub feature_columns: Vec<String>,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            ranges: ScaleConfig::default(),
            coefficients: CoefficientConfig::default(),
            mismatch_penalty: default_mismatch_penalty(),
            feature_columns: default_feature_names(),
        }
    }
}

fn default_mismatch_penalty() -> f64 { DEFAULT_MISMATCH_PENALTY }

impl MatchingSettings {
    /// Build and validate the range model described by this section
    pub fn range_model(&self) -> Result<RangeModel, RangeError> {
        let ranges = &self.ranges;
        let coefficients = &self.coefficients;

        let mut model = RangeModel::new(
            AttributeScale::new(ranges.age, coefficients.age),
            AttributeScale::new(ranges.gender, coefficients.gender),
            AttributeScale::new(ranges.size, coefficients.size),
        )
        .with_mismatch_penalty(self.mismatch_penalty);
        model.default_feature = AttributeScale::new(ranges.feature, coefficients.feature);

        for name in &self.feature_columns {
            let range = ranges.feature_override(name).unwrap_or(ranges.feature);
            let coefficient = coefficients.feature_override(name).unwrap_or(coefficients.feature);
            model = model.with_feature(name.clone(), AttributeScale::new(range, coefficient));
        }

        model.validate()?;
        Ok(model)
    }
}

/// Attribute ranges: one per scalar attribute, a default for breed
/// features, and optional per-feature overrides
#[derive(Debug, Clone, Deserialize)]
pub struct ScaleConfig {
    #[serde(default = "default_age_range")]
    pub age: f64,
    #[serde(default = "default_one")]
    pub gender: f64,
    #[serde(default = "default_size_range")]
    pub size: f64,
    #[serde(default = "default_one")]
    pub feature: f64,
    #[serde(default)]
    pub features: HashMap<String, f64>,
}

impl ScaleConfig {
    fn feature_override(&self, name: &str) -> Option<f64> {
        find_feature(&self.features, name)
    }
}

impl Default for ScaleConfig {
    fn default() -> Self {
        Self {
            age: default_age_range(),
            gender: default_one(),
            size: default_size_range(),
            feature: default_one(),
            features: HashMap::new(),
        }
    }
}

/// Per-attribute coefficients; anything left out is 1.0
#[derive(Debug, Clone, Deserialize)]
pub struct CoefficientConfig {
    #[serde(default = "default_one")]
    pub age: f64,
    #[serde(default = "default_one")]
    pub gender: f64,
    #[serde(default = "default_one")]
    pub size: f64,
    #[serde(default = "default_one")]
    pub feature: f64,
    #[serde(default)]
    pub features: HashMap<String, f64>,
}

impl CoefficientConfig {
    fn feature_override(&self, name: &str) -> Option<f64> {
        find_feature(&self.features, name)
    }
}

impl Default for CoefficientConfig {
    fn default() -> Self {
        Self {
            age: default_one(),
            gender: default_one(),
            size: default_one(),
            feature: default_one(),
            features: HashMap::new(),
        }
    }
}

/// Config sources may lower-case keys, so feature names compare
/// case-insensitively
fn find_feature(features: &HashMap<String, f64>, name: &str) -> Option<f64> {
    features
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| *value)
}

fn default_age_range() -> f64 { 20.0 }
fn default_size_range() -> f64 { 2.0 }
fn default_one() -> f64 { 1.0 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "full".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with SHELTER)
    pub fn load() -> Result<Self, SettingsError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., SHELTER__SERVER__PORT -> server.port
            .add_source(environment())
            .build()?;

        Self::finish(settings)
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(environment())
            .build()?;

        Self::finish(settings)
    }

    fn finish(config: Config) -> Result<Self, SettingsError> {
        let settings: Settings = config.try_deserialize()?;
        settings.matching.range_model()?;
        Ok(settings)
    }
}

fn environment() -> Environment {
    Environment::with_prefix("SHELTER")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}
