use std::env;
use std::fs;
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::reading::{MetReading, WindReading};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Hard cap on concurrent client workers; connections beyond it queue
    /// in the OS accept backlog.
    pub max_clients: usize,
    /// Legacy debug aid: pause 10 ms after each accepted connection.
    pub throttle: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 30384,
            max_clients: 10,
            throttle: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialConfig {
    pub enabled: bool,
    pub device: String,
    pub baud: u32,
    pub data_bits: u8,
    pub parity: String,
    pub timeout_secs: u64,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            device: "/dev/ttyUSB0".into(),
            baud: 9600,
            data_bits: 8,
            parity: "N".into(),
            timeout_secs: 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    pub enabled: bool,
    pub host: String,
    pub port: u16,
    pub timeout_secs: u64,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            host: "192.168.0.100".into(),
            port: 5000,
            timeout_secs: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindConfig {
    pub group: String,
    pub port: u16,
    /// Mount misalignment added to the reported direction, degrees.
    pub misalignment_deg: f64,
    pub attempts: u32,
    pub retry_delay_secs: u64,
    pub read_timeout_secs: u64,
}

impl Default for WindConfig {
    fn default() -> Self {
        Self {
            group: "239.192.0.4".into(),
            port: 60004,
            misalignment_deg: 20.0,
            attempts: 3,
            retry_delay_secs: 1,
            read_timeout_secs: 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    pub interval_secs: u64,
    /// Met sentinel, matches the legacy getmet.c initialisation.
    pub met_error: [f64; 3],
    /// Wind sentinel.
    pub wind_error: [f64; 2],
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            interval_secs: 20,
            met_error: [-51.0, -1.0, -1.0],
            wind_error: [-1.0, -1.0],
        }
    }
}

impl SamplingConfig {
    pub fn met_sentinel(&self) -> MetReading {
        MetReading {
            temperature: self.met_error[0],
            pressure: self.met_error[1],
            humidity: self.met_error[2],
        }
    }

    pub fn wind_sentinel(&self) -> WindReading {
        WindReading {
            speed: self.wind_error[0],
            direction: self.wind_error[1],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub file: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            file: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MetServerConfig {
    pub server: ServerConfig,
    pub serial: SerialConfig,
    pub relay: RelayConfig,
    pub wind: WindConfig,
    pub sampling: SamplingConfig,
    pub logging: LogConfig,
}

/// Which met sensor paths are enabled, fixed at validation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceMode {
    SerialOnly,
    RelayOnly,
    RelayWithSerialFallback,
}

impl MetServerConfig {
    /// One-shot startup validation. Checks the transport mode flags and
    /// the address/parameter syntax; never re-run at sample time.
    pub fn validate(&self) -> Result<SourceMode, ConfigError> {
        let mode = match (self.relay.enabled, self.serial.enabled) {
            (false, false) => return Err(ConfigError::NoSourceEnabled),
            (true, true) => SourceMode::RelayWithSerialFallback,
            (true, false) => SourceMode::RelayOnly,
            (false, true) => SourceMode::SerialOnly,
        };

        if self.relay.enabled && self.relay.host.parse::<Ipv4Addr>().is_err() {
            return Err(ConfigError::InvalidRelayHost(self.relay.host.clone()));
        }

        match self.wind.group.parse::<Ipv4Addr>() {
            Ok(group) if group.is_multicast() => {}
            _ => return Err(ConfigError::InvalidWindGroup(self.wind.group.clone())),
        }

        if self.serial.enabled {
            match self.serial.parity.as_str() {
                "N" | "n" | "E" | "e" | "O" | "o" => {}
                other => return Err(ConfigError::InvalidParity(other.into())),
            }
            if !(5..=8).contains(&self.serial.data_bits) {
                return Err(ConfigError::InvalidDataBits(self.serial.data_bits));
            }
        }

        Ok(mode)
    }
}

/// Layered loader: first existing candidate file wins, then environment
/// overrides, then validation by the caller.
pub struct ConfigLoader {
    config_paths: Vec<PathBuf>,
    env_prefix: String,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self {
            config_paths: vec![
                PathBuf::from("metserver.toml"),
                PathBuf::from("metserver.json"),
            ],
            env_prefix: "METSERVER_".into(),
        }
    }

    pub fn with_paths(paths: Vec<PathBuf>) -> Self {
        Self {
            config_paths: paths,
            env_prefix: "METSERVER_".into(),
        }
    }

    pub fn with_env_prefix(mut self, prefix: String) -> Self {
        self.env_prefix = prefix;
        self
    }

    pub fn load(&self) -> Result<MetServerConfig, ConfigError> {
        let mut config = MetServerConfig::default();
        for path in &self.config_paths {
            if path.exists() {
                config = self.load_from_file(path)?;
                break;
            }
        }
        self.apply_env_overrides(&mut config)?;
        Ok(config)
    }

    fn load_from_file(&self, path: &Path) -> Result<MetServerConfig, ConfigError> {
        let content = fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("failed to read {}: {}", path.display(), e)))?;
        match path.extension().and_then(|s| s.to_str()) {
            Some("toml") => toml::from_str(&content)
                .map_err(|e| ConfigError::Parse(format!("{}: {}", path.display(), e))),
            Some("json") => serde_json::from_str(&content)
                .map_err(|e| ConfigError::Parse(format!("{}: {}", path.display(), e))),
            _ => Err(ConfigError::Parse(format!(
                "unsupported config file format: {}",
                path.display()
            ))),
        }
    }

    fn apply_env_overrides(&self, config: &mut MetServerConfig) -> Result<(), ConfigError> {
        if let Ok(host) = env::var(format!("{}HOST", self.env_prefix)) {
            config.server.host = host;
        }
        if let Ok(port) = env::var(format!("{}PORT", self.env_prefix)) {
            config.server.port = port
                .parse()
                .map_err(|_| ConfigError::Parse(format!("invalid port override: {}", port)))?;
        }
        if let Ok(interval) = env::var(format!("{}INTERVAL_SECS", self.env_prefix)) {
            config.sampling.interval_secs = interval.parse().map_err(|_| {
                ConfigError::Parse(format!("invalid interval override: {}", interval))
            })?;
        }
        if let Ok(level) = env::var(format!("{}LOG_LEVEL", self.env_prefix)) {
            config.logging.level = level;
        }
        Ok(())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
