//! Serial-to-ethernet relay driver.
//!
//! Same command protocol as the direct serial line, carried over a TCP
//! connection to the relay device. The connection drops on every exit
//! path.

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::time::timeout;

use super::{parse_met_response, MetSource, QUERY_HUMIDITY, QUERY_PRESSURE, QUERY_TEMPERATURE};
use crate::config::RelayConfig;
use crate::error::{TransportError, TransportResult};
use crate::reading::MetReading;

pub struct RelayReader {
    config: RelayConfig,
}

impl RelayReader {
    pub fn new(config: RelayConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl MetSource for RelayReader {
    async fn poll_met(&self) -> TransportResult<MetReading> {
        let limit = Duration::from_secs(self.config.timeout_secs);
        let addr = format!("{}:{}", self.config.host, self.config.port);

        let stream = timeout(limit, TcpStream::connect(addr.as_str()))
            .await
            .map_err(|_| TransportError::Timeout(format!("connect to relay {}", addr)))??;
        debug!("connected to relay {}", addr);

        let (read_half, mut write_half) = stream.into_split();
        let mut reader = BufReader::new(read_half);

        let mut values = [0f64; 3];
        let queries = [QUERY_TEMPERATURE, QUERY_PRESSURE, QUERY_HUMIDITY];
        for (slot, query) in values.iter_mut().zip(queries) {
            write_half.write_all(query).await?;

            let mut line = Vec::new();
            let n = timeout(limit, reader.read_until(b'\n', &mut line))
                .await
                .map_err(|_| TransportError::Timeout(format!("response from relay {}", addr)))??;
            if n == 0 {
                return Err(TransportError::ShortResponse { len: 0 });
            }
            *slot = parse_met_response(&String::from_utf8_lossy(&line))?;
        }

        Ok(MetReading {
            temperature: values[0],
            pressure: values[1],
            humidity: values[2],
        })
    }
}
