use std::error::Error;
use std::fmt;

/// Errors raised by the sensor transports.
///
/// Every variant is recovered locally: the sampler substitutes the
/// configured sentinel for the failing half of the reading and logs the
/// cause. Nothing here reaches the scheduler or a client.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportError {
    /// The exchange did not complete within the configured timeout.
    Timeout(String),
    /// Response was empty or shorter than the fixed header.
    ShortResponse { len: usize },
    /// Response or datagram did not parse as a numeric reading.
    Malformed(String),
    /// The serial device could not be opened or driven.
    Device(String),
    /// Socket-level failure.
    Io(String),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Timeout(what) => write!(f, "timed out: {}", what),
            TransportError::ShortResponse { len } => {
                write!(f, "response too short: {} bytes", len)
            }
            TransportError::Malformed(what) => write!(f, "malformed data: {}", what),
            TransportError::Device(what) => write!(f, "device error: {}", what),
            TransportError::Io(what) => write!(f, "i/o error: {}", what),
        }
    }
}

impl Error for TransportError {}

impl From<std::io::Error> for TransportError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock => {
                TransportError::Timeout(err.to_string())
            }
            _ => TransportError::Io(err.to_string()),
        }
    }
}

impl From<serialport::Error> for TransportError {
    fn from(err: serialport::Error) -> Self {
        TransportError::Device(err.to_string())
    }
}

pub type TransportResult<T> = Result<T, TransportError>;

/// Configuration errors. Fatal: reported once at startup, the process
/// exits non-zero before serving begins.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Neither serial nor relay mode is enabled.
    NoSourceEnabled,
    /// Relay host is not a syntactically valid IPv4 address.
    InvalidRelayHost(String),
    /// Wind group is not a valid IPv4 multicast address.
    InvalidWindGroup(String),
    /// Serial parity is not one of N/E/O.
    InvalidParity(String),
    /// Serial data bits outside 5..=8.
    InvalidDataBits(u8),
    /// Config file could not be read.
    Io(String),
    /// Config file or environment override could not be parsed.
    Parse(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NoSourceEnabled => {
                write!(f, "no met source configured: enable serial or relay mode")
            }
            ConfigError::InvalidRelayHost(host) => {
                write!(f, "invalid relay host address: {}", host)
            }
            ConfigError::InvalidWindGroup(group) => {
                write!(f, "invalid multicast group: {}", group)
            }
            ConfigError::InvalidParity(parity) => {
                write!(f, "invalid serial parity (want N, E or O): {}", parity)
            }
            ConfigError::InvalidDataBits(bits) => {
                write!(f, "invalid serial data bits (want 5-8): {}", bits)
            }
            ConfigError::Io(what) => write!(f, "config i/o error: {}", what),
            ConfigError::Parse(what) => write!(f, "config parse error: {}", what),
        }
    }
}

impl Error for ConfigError {}
