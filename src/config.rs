use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use serde::Deserialize;
use thiserror::Error;
use crate::acquisition::threshold::ThresholdRule;
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}
/// Static description of one sensor channel.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ChannelSpec {
    pub name: String,
    pub unit: String,
    pub y_min: f64,
    pub y_max: f64,
    /// Values above this ceiling are stored as the ceiling.
    #[serde(default)]
    pub clamp_max: Option<f64>,
}
impl ChannelSpec {
    pub fn new(name: &str, unit: &str, y_min: f64, y_max: f64) -> Self {
        Self {
            name: name.to_owned(),
            unit: unit.to_owned(),
            y_min,
            y_max,
            clamp_max: None,
        }
    }
    pub fn with_clamp(mut self, ceiling: f64) -> Self {
        self.clamp_max = Some(ceiling);
        self
    }
    /// Column title used in exported files, e.g. `Presion(hPa)`.
    pub fn column_label(&self) -> String {
        format!("{}({})", self.name, self.unit)
    }
    pub fn title(&self) -> String {
        format!("{} ({})", self.name, self.unit)
    }
}
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SerialConfig {
    pub port: String,
    pub baud_rate: u32,
    pub read_timeout_ms: u64,
    /// Boards reset when the port opens; wait this long before reading.
    pub settle_ms: u64,
}
impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: "COM10".to_owned(),
            baud_rate: 9600,
            read_timeout_ms: 1000,
            settle_ms: 2000,
        }
    }
}
impl SerialConfig {
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }
    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub serial: SerialConfig,
    /// Samples kept per channel.
    pub samples: usize,
    pub sample_time_ms: u64,
    /// Lines containing this text are device header echoes.
    pub header_marker: String,
    pub export_path: PathBuf,
    pub channels: Vec<ChannelSpec>,
    pub threshold: ThresholdRule,
}
impl Default for AppConfig {
    fn default() -> Self {
        Self {
            serial: SerialConfig::default(),
            samples: 50,
            sample_time_ms: 200,
            header_marker: "MQ135".to_owned(),
            export_path: PathBuf::from("datos_sensores.csv"),
            channels: vec![
                ChannelSpec::new("MQ135", "Ppm", 0.0, 1023.0),
                ChannelSpec::new("Temperatura", "C", 0.0, 50.0),
                ChannelSpec::new("Presion", "hPa", 900.0, 1100.0),
                ChannelSpec::new("Luz", "Lux", 0.0, 1000.0).with_clamp(850.0),
            ],
            threshold: ThresholdRule::default(),
        }
    }
}
impl AppConfig {
    /// Reads a TOML file; omitted keys keep their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: AppConfig = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.channels.is_empty() {
            return Err(ConfigError::Invalid("at least one channel is required".into()));
        }
        if self.samples == 0 {
            return Err(ConfigError::Invalid("samples must be greater than zero".into()));
        }
        if self.sample_time_ms == 0 {
            return Err(ConfigError::Invalid(
                "sample_time_ms must be greater than zero".into(),
            ));
        }
        for (i, ch) in self.channels.iter().enumerate() {
            if !(ch.y_min.is_finite() && ch.y_max.is_finite() && ch.y_min < ch.y_max) {
                return Err(ConfigError::Invalid(format!(
                    "channel {i} ({}) has invalid bounds [{}, {}]",
                    ch.name, ch.y_min, ch.y_max
                )));
            }
            if ch.clamp_max.is_some_and(|c| !c.is_finite()) {
                return Err(ConfigError::Invalid(format!(
                    "channel {i} ({}) clamp must be finite",
                    ch.name
                )));
            }
        }
        if self.threshold.channel >= self.channels.len() {
            return Err(ConfigError::Invalid(format!(
                "threshold channel {} out of range (0..{})",
                self.threshold.channel,
                self.channels.len()
            )));
        }
        if !self.threshold.limit.is_finite() {
            return Err(ConfigError::Invalid("threshold limit must be finite".into()));
        }
        Ok(())
    }
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }
    pub fn sample_period(&self) -> Duration {
        Duration::from_millis(self.sample_time_ms)
    }
    pub fn ceilings(&self) -> Vec<Option<f64>> {
        self.channels.iter().map(|c| c.clamp_max).collect()
    }
    pub fn column_labels(&self) -> Vec<String> {
        self.channels.iter().map(ChannelSpec::column_label).collect()
    }
}
