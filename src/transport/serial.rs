//! Direct serial-line driver for the met sensor.

use std::io::{Read, Write};
use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use serialport::{DataBits, Parity, SerialPort};

use super::{
    parse_met_response, MetSource, MAX_RESPONSE_LEN, QUERY_HUMIDITY, QUERY_PRESSURE,
    QUERY_TEMPERATURE,
};
use crate::config::SerialConfig;
use crate::error::{TransportError, TransportResult};
use crate::reading::MetReading;

/// Reads the met sensor over a directly attached serial line.
///
/// The exchange is blocking and runs on the blocking thread pool; the
/// port handle is dropped on every exit path, releasing the device.
pub struct SerialReader {
    config: SerialConfig,
}

impl SerialReader {
    pub fn new(config: SerialConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl MetSource for SerialReader {
    async fn poll_met(&self) -> TransportResult<MetReading> {
        let config = self.config.clone();
        tokio::task::spawn_blocking(move || poll_blocking(&config))
            .await
            .map_err(|e| TransportError::Device(format!("serial worker failed: {}", e)))?
    }
}

/// One full three-command exchange against the device.
fn poll_blocking(config: &SerialConfig) -> TransportResult<MetReading> {
    let mut port = serialport::new(config.device.as_str(), config.baud)
        .data_bits(data_bits(config.data_bits)?)
        .parity(parity(&config.parity)?)
        .timeout(Duration::from_secs(config.timeout_secs))
        .open()?;
    debug!("opened serial device {}", config.device);

    let temperature = exchange(port.as_mut(), QUERY_TEMPERATURE)?;
    let pressure = exchange(port.as_mut(), QUERY_PRESSURE)?;
    let humidity = exchange(port.as_mut(), QUERY_HUMIDITY)?;

    Ok(MetReading {
        temperature,
        pressure,
        humidity,
    })
}

/// Send one query and parse its `\r\n`-terminated response.
fn exchange(port: &mut dyn SerialPort, command: &[u8]) -> TransportResult<f64> {
    port.write_all(command)?;
    let raw = read_line(port)?;
    parse_met_response(&raw)
}

fn read_line(port: &mut dyn SerialPort) -> TransportResult<String> {
    let mut buf: Vec<u8> = Vec::with_capacity(64);
    let mut byte = [0u8; 1];
    while !buf.ends_with(b"\r\n") && buf.len() < MAX_RESPONSE_LEN {
        match port.read(&mut byte) {
            Ok(0) => break,
            Ok(_) => buf.push(byte[0]),
            Err(e) if e.kind() == std::io::ErrorKind::TimedOut => {
                return Err(TransportError::Timeout(format!(
                    "no response terminator after {} bytes",
                    buf.len()
                )))
            }
            Err(e) => return Err(e.into()),
        }
    }
    String::from_utf8(buf)
        .map_err(|e| TransportError::Malformed(format!("non-UTF-8 response: {}", e)))
}

fn parity(value: &str) -> TransportResult<Parity> {
    match value {
        "N" | "n" => Ok(Parity::None),
        "E" | "e" => Ok(Parity::Even),
        "O" | "o" => Ok(Parity::Odd),
        other => Err(TransportError::Device(format!(
            "unsupported parity: {:?}",
            other
        ))),
    }
}

fn data_bits(value: u8) -> TransportResult<DataBits> {
    match value {
        5 => Ok(DataBits::Five),
        6 => Ok(DataBits::Six),
        7 => Ok(DataBits::Seven),
        8 => Ok(DataBits::Eight),
        other => Err(TransportError::Device(format!(
            "unsupported data bits: {}",
            other
        ))),
    }
}
