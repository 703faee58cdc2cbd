//! UDP multicast anemometer feed driver.

use std::net::Ipv4Addr;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use tokio::net::UdpSocket;
use tokio::time::{sleep, timeout};

use super::WindSource;
use crate::config::WindConfig;
use crate::error::{ConfigError, TransportError, TransportResult};
use crate::reading::WindReading;

/// Field positions in the comma-separated anemometer datagram.
const DIRECTION_FIELD: usize = 2;
const SPEED_FIELD: usize = 4;

/// Reads one wind sample per poll from the multicast feed.
///
/// Transient socket errors and timeouts are retried with a backoff; a
/// malformed datagram aborts the poll immediately.
pub struct WindReader {
    config: WindConfig,
    group: Ipv4Addr,
}

impl WindReader {
    pub fn new(config: &WindConfig) -> Result<Self, ConfigError> {
        let group = config
            .group
            .parse::<Ipv4Addr>()
            .map_err(|_| ConfigError::InvalidWindGroup(config.group.clone()))?;
        Ok(Self {
            config: config.clone(),
            group,
        })
    }

    async fn open_socket(&self) -> TransportResult<UdpSocket> {
        let socket = UdpSocket::bind(("0.0.0.0", self.config.port)).await?;
        // Join is best effort: a rig without a multicast route still
        // receives datagrams addressed straight to the bound port.
        if let Err(e) = socket.join_multicast_v4(self.group, Ipv4Addr::UNSPECIFIED) {
            warn!("could not join multicast group {}: {}", self.group, e);
        }
        Ok(socket)
    }
}

#[async_trait]
impl WindSource for WindReader {
    async fn poll_wind(&self) -> TransportResult<WindReading> {
        let socket = self.open_socket().await?;
        let limit = Duration::from_secs(self.config.read_timeout_secs);
        let mut buf = [0u8; 1024];

        for attempt in (1..=self.config.attempts).rev() {
            match timeout(limit, socket.recv_from(&mut buf)).await {
                Ok(Ok((len, _))) => {
                    let wind = parse_wind_datagram(&buf[..len], self.config.misalignment_deg)?;
                    debug!("wind: {} m/s, dir {} deg", wind.speed, wind.direction);
                    return Ok(wind);
                }
                Ok(Err(e)) => {
                    warn!("wind socket error: {}. {} attempts left", e, attempt - 1);
                }
                Err(_) => {
                    warn!(
                        "no wind datagram within {:?}. {} attempts left",
                        limit,
                        attempt - 1
                    );
                }
            }
            if attempt > 1 {
                sleep(Duration::from_secs(self.config.retry_delay_secs)).await;
            }
        }

        Err(TransportError::Timeout(format!(
            "no wind datagram after {} attempts",
            self.config.attempts
        )))
    }
}

/// Extract speed (field 4) and direction (field 2) from one datagram.
/// The misalignment offset applies before the 2-decimal rounding.
fn parse_wind_datagram(data: &[u8], misalignment: f64) -> TransportResult<WindReading> {
    let text = std::str::from_utf8(data)
        .map_err(|e| TransportError::Malformed(format!("non-UTF-8 datagram: {}", e)))?;
    let fields: Vec<&str> = text.trim().split(',').collect();

    let speed = field_f64(&fields, SPEED_FIELD)?;
    let direction = field_f64(&fields, DIRECTION_FIELD)?;

    Ok(WindReading {
        speed: round2(speed),
        direction: round2(direction + misalignment),
    })
}

fn field_f64(fields: &[&str], index: usize) -> TransportResult<f64> {
    let raw = fields.get(index).ok_or_else(|| {
        TransportError::Malformed(format!(
            "datagram has {} fields, need index {}",
            fields.len(),
            index
        ))
    })?;
    raw.trim()
        .parse::<f64>()
        .map_err(|_| TransportError::Malformed(format!("field {} is not numeric: {:?}", index, raw)))
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
