/*!
 * Configuration types for pinlink
 */

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{PinError, Result};

/// Main configuration for device connection and recording
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PinConfig {
    /// Path to the adb executable
    #[serde(default = "default_adb_path")]
    pub adb_path: String,

    /// Path to the ffmpeg executable
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: String,

    /// Path to the ffplay executable (stream viewer)
    #[serde(default = "default_ffplay_path")]
    pub ffplay_path: String,

    /// External hotspot join command; invoked as `<cmd> <ssid> <password>`
    #[serde(default = "default_hotspot_join_cmd")]
    pub hotspot_join_cmd: String,

    /// RTSP stream port on the device
    #[serde(default = "default_stream_port")]
    pub stream_port: u16,

    /// RTSP stream path on the device
    #[serde(default = "default_stream_path")]
    pub stream_path: String,

    /// TCP reachability probe timeout in seconds
    #[serde(default = "default_probe_timeout")]
    pub probe_timeout_secs: u64,

    /// Overall timeout for a single bridge command in seconds
    #[serde(default = "default_bridge_timeout")]
    pub bridge_timeout_secs: u64,

    /// IP cache file path (None = ~/.pinlink/device_ip)
    #[serde(default)]
    pub cache_file: Option<PathBuf>,

    /// Directory recordings are written to
    #[serde(default = "default_save_dir")]
    pub save_dir: PathBuf,

    /// FFmpeg segment duration in seconds
    #[serde(default = "default_segment_time")]
    pub segment_time: u32,

    /// Recording duration in seconds
    #[serde(default = "default_duration")]
    pub duration: u64,

    /// Log level for diagnostic output
    #[serde(default)]
    pub log_level: LogLevel,

    /// Log file path (None = stdout)
    #[serde(default)]
    pub log_file: Option<PathBuf>,

    /// Enable verbose logging (shorthand for log_level = debug)
    #[serde(default)]
    pub verbose: bool,
}

fn default_adb_path() -> String {
    "adb".to_string()
}

fn default_ffmpeg_path() -> String {
    "ffmpeg".to_string()
}

fn default_ffplay_path() -> String {
    "ffplay".to_string()
}

fn default_hotspot_join_cmd() -> String {
    "pinlink-hotspot-join".to_string()
}

fn default_stream_port() -> u16 {
    50001
}

fn default_stream_path() -> String {
    "/live/0".to_string()
}

fn default_probe_timeout() -> u64 {
    2
}

fn default_bridge_timeout() -> u64 {
    30
}

fn default_save_dir() -> PathBuf {
    PathBuf::from("recordings")
}

fn default_segment_time() -> u32 {
    5
}

fn default_duration() -> u64 {
    10
}

impl Default for PinConfig {
    fn default() -> Self {
        Self {
            adb_path: default_adb_path(),
            ffmpeg_path: default_ffmpeg_path(),
            ffplay_path: default_ffplay_path(),
            hotspot_join_cmd: default_hotspot_join_cmd(),
            stream_port: default_stream_port(),
            stream_path: default_stream_path(),
            probe_timeout_secs: default_probe_timeout(),
            bridge_timeout_secs: default_bridge_timeout(),
            cache_file: None,
            save_dir: default_save_dir(),
            segment_time: default_segment_time(),
            duration: default_duration(),
            log_level: LogLevel::default(),
            log_file: None,
            verbose: false,
        }
    }
}

impl PinConfig {
    /// Default configuration directory: ~/.pinlink
    pub fn config_dir() -> Result<PathBuf> {
        dirs::home_dir()
            .map(|home| home.join(".pinlink"))
            .ok_or_else(|| PinError::Config("Could not determine home directory".to_string()))
    }

    /// Default configuration file path: ~/.pinlink/pinlink.toml
    pub fn default_config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("pinlink.toml"))
    }

    /// Resolved IP cache file path
    pub fn cache_path(&self) -> Result<PathBuf> {
        match &self.cache_file {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::config_dir()?.join("device_ip")),
        }
    }

    /// Load configuration from the default location, falling back to
    /// defaults when no file exists.
    pub fn load_default() -> Result<Self> {
        let path = Self::default_config_path()?;
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a TOML file
    pub fn load(path: &std::path::Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            PinError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        toml::from_str(&contents)
            .map_err(|e| PinError::Config(format!("Failed to parse {}: {}", path.display(), e)))
    }

    /// Merge record-command flags over the loaded configuration. Only
    /// flags the user actually passed overwrite file values; absent flags
    /// leave the configured (or default) values in place.
    pub fn apply_record_overrides(
        &mut self,
        duration: Option<u64>,
        segment_time: Option<u32>,
        save_dir: Option<PathBuf>,
        ffmpeg: Option<String>,
    ) {
        if let Some(duration) = duration {
            self.duration = duration;
        }
        if let Some(segment_time) = segment_time {
            self.segment_time = segment_time;
        }
        if let Some(save_dir) = save_dir {
            self.save_dir = save_dir;
        }
        if let Some(ffmpeg) = ffmpeg {
            self.ffmpeg_path = ffmpeg;
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.stream_path.is_empty() || !self.stream_path.starts_with('/') {
            return Err(PinError::Config(format!(
                "stream_path must start with '/': '{}'",
                self.stream_path
            )));
        }
        if self.probe_timeout_secs == 0 {
            return Err(PinError::Config(
                "probe_timeout_secs must be at least 1".to_string(),
            ));
        }
        if self.segment_time == 0 {
            return Err(PinError::Config("segment_time must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// Log level configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PinConfig::default();
        assert_eq!(config.stream_port, 50001);
        assert_eq!(config.stream_path, "/live/0");
        assert_eq!(config.probe_timeout_secs, 2);
        assert_eq!(config.segment_time, 5);
        assert_eq!(config.adb_path, "adb");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = PinConfig {
            stream_port: 8554,
            verbose: true,
            ..Default::default()
        };
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: PinConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.stream_port, 8554);
        assert!(parsed.verbose);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let parsed: PinConfig = toml::from_str("stream_port = 9000\n").unwrap();
        assert_eq!(parsed.stream_port, 9000);
        assert_eq!(parsed.stream_path, "/live/0");
        assert_eq!(parsed.ffmpeg_path, "ffmpeg");
    }

    #[test]
    fn test_absent_record_flags_keep_file_values() {
        let mut config: PinConfig =
            toml::from_str("ffmpeg_path = \"custom-ffmpeg\"\nsegment_time = 9\n").unwrap();
        config.apply_record_overrides(None, None, None, None);
        assert_eq!(config.ffmpeg_path, "custom-ffmpeg");
        assert_eq!(config.segment_time, 9);
    }

    #[test]
    fn test_passed_record_flags_override_file_values() {
        let mut config: PinConfig =
            toml::from_str("ffmpeg_path = \"custom-ffmpeg\"\nduration = 60\n").unwrap();
        config.apply_record_overrides(
            Some(30),
            None,
            Some(PathBuf::from("clips")),
            Some("other-ffmpeg".to_string()),
        );
        assert_eq!(config.duration, 30);
        assert_eq!(config.segment_time, 5);
        assert_eq!(config.save_dir, PathBuf::from("clips"));
        assert_eq!(config.ffmpeg_path, "other-ffmpeg");
    }

    #[test]
    fn test_validate_rejects_bad_stream_path() {
        let config = PinConfig {
            stream_path: "live/0".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pinlink.toml");
        std::fs::write(&path, "probe_timeout_secs = 5\nsave_dir = \"clips\"\n").unwrap();

        let config = PinConfig::load(&path).unwrap();
        assert_eq!(config.probe_timeout_secs, 5);
        assert_eq!(config.save_dir, PathBuf::from("clips"));
    }

    #[test]
    fn test_log_level_conversion() {
        assert_eq!(LogLevel::Error.to_tracing_level(), tracing::Level::ERROR);
        assert_eq!(LogLevel::Debug.to_tracing_level(), tracing::Level::DEBUG);
        assert_eq!(LogLevel::default(), LogLevel::Info);
    }
}
