use serde::Deserialize;
use std::path::Path;
use tracing::debug;

/// Default per-pixel intensity delta above which a pixel counts as changed.
pub const DEFAULT_DIFF_THRESHOLD: u8 = 35;
/// Default share of changed pixels above which a frame is accepted as new.
pub const DEFAULT_ACCEPT_FRACTION: f64 = 0.3;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub kafka: KafkaConfig,
    #[serde(default)]
    pub detector: DetectorConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct KafkaConfig {
    pub brokers: String,
    #[serde(default = "default_input_topic")]
    pub input_topic: String,
    #[serde(default = "default_output_topic")]
    pub output_topic: String,
    #[serde(default = "default_group_id")]
    pub group_id: String,
    #[serde(default = "default_compression")]
    pub compression: String,
}

/// Tuning for the change detector.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct DetectorConfig {
    /// A pixel is changed if `|current - reference| > diff_threshold`.
    #[serde(default = "default_diff_threshold")]
    pub diff_threshold: u8,
    /// A frame is accepted if the changed-pixel fraction is strictly above this.
    #[serde(default = "default_accept_fraction")]
    pub accept_fraction: f64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            diff_threshold: default_diff_threshold(),
            accept_fraction: default_accept_fraction(),
        }
    }
}

impl DetectorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.accept_fraction.is_finite() || !(0.0..1.0).contains(&self.accept_fraction) {
            return Err(ConfigError::Invalid(format!(
                "detector.accept_fraction must be in [0, 1), got {}",
                self.accept_fraction
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadFile(path.display().to_string(), e))?;
        let config = Self::from_toml_str(&content)?;
        debug!(path = %path.display(), "config loaded");
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Config =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.detector.validate()?;
        // Publishing into the input topic would feed forwarded frames back in.
        if self.kafka.input_topic == self.kafka.output_topic {
            return Err(ConfigError::Invalid(format!(
                "kafka.input_topic and kafka.output_topic are both '{}'",
                self.kafka.input_topic
            )));
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {0}: {1}")]
    ReadFile(String, std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(String),
    #[error("invalid config: {0}")]
    Invalid(String),
}

// Default value functions
fn default_input_topic() -> String {
    "camera.frames".into()
}
fn default_output_topic() -> String {
    "camera.changes".into()
}
fn default_group_id() -> String {
    "frame-gate".into()
}
fn default_compression() -> String {
    "snappy".into()
}
fn default_diff_threshold() -> u8 {
    DEFAULT_DIFF_THRESHOLD
}
fn default_accept_fraction() -> f64 {
    DEFAULT_ACCEPT_FRACTION
}
fn default_log_level() -> String {
    "info".into()
}
