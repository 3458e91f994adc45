// Node configuration, loaded once at startup from a TOML file.
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::info;

use crate::error::ConfigError;
use crate::reading::RECORD_LEN;
use crate::transport::Qos;

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NodeConfig {
    pub room_number: u16,
    pub sample_period_ms: u64,
    pub sensor_queue_depth: usize,
    pub log_queue_depth: usize,
    pub stream_buffer_bytes: usize,
    pub log_line_max_len: usize,
    pub cooling_above: u16,
    pub heating_below: u16,
    pub simulation_seed: u64,
    pub telemetry_topic: String,
    pub telemetry_qos: u8,
    pub link_path: Option<PathBuf>,
    pub run_for_secs: Option<u64>,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            room_number: 101,
            sample_period_ms: 10_000,
            sensor_queue_depth: 20,
            log_queue_depth: 20,
            stream_buffer_bytes: 256,
            log_line_max_len: 128,
            cooling_above: 25,
            heating_below: 20,
            simulation_seed: 42,
            telemetry_topic: "sensor/data".to_string(),
            telemetry_qos: 1,
            link_path: None,
            run_for_secs: None,
        }
    }
}

impl NodeConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: NodeConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_period_ms == 0 {
            return Err(ConfigError::Invalid("sample_period_ms must be at least 1".into()));
        }
        if self.sensor_queue_depth == 0 || self.log_queue_depth == 0 {
            return Err(ConfigError::Invalid("queue depths must be at least 1".into()));
        }
        if self.stream_buffer_bytes < RECORD_LEN {
            return Err(ConfigError::Invalid(format!(
                "stream_buffer_bytes must hold one {RECORD_LEN}-byte record, got {}",
                self.stream_buffer_bytes
            )));
        }
        if self.log_line_max_len < 2 {
            return Err(ConfigError::Invalid("log_line_max_len must be at least 2".into()));
        }
        if self.heating_below > self.cooling_above {
            return Err(ConfigError::Invalid(format!(
                "heating_below ({}) must not exceed cooling_above ({})",
                self.heating_below, self.cooling_above
            )));
        }
        Qos::try_from(self.telemetry_qos).map_err(ConfigError::Invalid)?;
        Ok(())
    }

    pub fn sample_period(&self) -> Duration {
        Duration::from_millis(self.sample_period_ms)
    }

    pub fn qos(&self) -> Qos {
        Qos::try_from(self.telemetry_qos).unwrap_or(Qos::AtLeastOnce)
    }
}

/// Loads the config at `path`. A missing file means "use the defaults".
pub fn load_config(path: impl AsRef<Path>) -> Result<NodeConfig, ConfigError> {
    let path = path.as_ref();
    match std::fs::read_to_string(path) {
        Ok(s) => NodeConfig::from_toml_str(&s),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            info!(path = %path.display(), "no config file, using defaults");
            Ok(NodeConfig::default())
        }
        Err(source) => Err(ConfigError::Io {
            path: path.display().to_string(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_firmware_constants() {
        let cfg = NodeConfig::default();
        assert_eq!(cfg.sensor_queue_depth, 20);
        assert_eq!(cfg.log_queue_depth, 20);
        assert_eq!(cfg.stream_buffer_bytes, 256);
        assert_eq!(cfg.sample_period(), Duration::from_secs(10));
        assert_eq!((cfg.heating_below, cfg.cooling_above), (20, 25));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let cfg = NodeConfig::from_toml_str("sample_period_ms = 50\nroom_number = 7\n").unwrap();
        assert_eq!(cfg.sample_period_ms, 50);
        assert_eq!(cfg.room_number, 7);
        assert_eq!(cfg.telemetry_topic, "sensor/data");
        assert_eq!(cfg.qos(), Qos::AtLeastOnce);
    }

    #[test]
    fn rejects_inverted_thresholds() {
        let err = NodeConfig::from_toml_str("heating_below = 30\ncooling_above = 25\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_stream_buffer_smaller_than_a_record() {
        let err = NodeConfig::from_toml_str("stream_buffer_bytes = 4\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_unknown_qos_and_keys() {
        assert!(NodeConfig::from_toml_str("telemetry_qos = 2\n").is_err());
        assert!(matches!(
            NodeConfig::from_toml_str("sample_rate_hz = 100\n"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let cfg = load_config("does/not/exist/node.toml").unwrap();
        assert_eq!(cfg.room_number, 101);
    }
}
