//! Periodic weather sampling with transport fallback.

use log::{error, warn};

use crate::config::MetServerConfig;
use crate::error::ConfigError;
use crate::reading::{MetReading, Reading, WindReading};
use crate::transport::relay::RelayReader;
use crate::transport::serial::SerialReader;
use crate::transport::wind::WindReader;
use crate::transport::{MetSource, WindSource};

/// Polls the enabled transports and assembles the 5-field reading.
///
/// `sample` is infallible: a failing transport degrades its half of the
/// reading to the configured sentinel instead of propagating. Fallback
/// order for the met half: relay first when enabled, then serial only if
/// both modes are enabled; serial directly when it is the only mode.
pub struct Sampler {
    relay: Option<Box<dyn MetSource>>,
    serial: Option<Box<dyn MetSource>>,
    wind: Box<dyn WindSource>,
    met_error: MetReading,
    wind_error: WindReading,
}

impl Sampler {
    /// Build the sampler from a validated configuration.
    pub fn from_config(config: &MetServerConfig) -> Result<Self, ConfigError> {
        let relay = config
            .relay
            .enabled
            .then(|| Box::new(RelayReader::new(config.relay.clone())) as Box<dyn MetSource>);
        let serial = config
            .serial
            .enabled
            .then(|| Box::new(SerialReader::new(config.serial.clone())) as Box<dyn MetSource>);
        let wind = Box::new(WindReader::new(&config.wind)?) as Box<dyn WindSource>;

        Ok(Self::new(
            relay,
            serial,
            wind,
            config.sampling.met_sentinel(),
            config.sampling.wind_sentinel(),
        ))
    }

    /// Assemble a sampler from explicit sources.
    pub fn new(
        relay: Option<Box<dyn MetSource>>,
        serial: Option<Box<dyn MetSource>>,
        wind: Box<dyn WindSource>,
        met_error: MetReading,
        wind_error: WindReading,
    ) -> Self {
        Self {
            relay,
            serial,
            wind,
            met_error,
            wind_error,
        }
    }

    /// Take one full sample. Both halves are polled concurrently; failure
    /// in one half never affects the other, and the result always has
    /// five fields.
    pub async fn sample(&self) -> Reading {
        let (met, wind) = tokio::join!(self.sample_met(), self.sample_wind());
        Reading { met, wind }
    }

    async fn sample_met(&self) -> MetReading {
        if let Some(relay) = &self.relay {
            match relay.poll_met().await {
                Ok(met) => return met,
                Err(e) => warn!("relay poll failed: {}", e),
            }
            if let Some(serial) = &self.serial {
                match serial.poll_met().await {
                    Ok(met) => return met,
                    Err(e) => error!("serial fallback failed: {}", e),
                }
            }
        } else if let Some(serial) = &self.serial {
            match serial.poll_met().await {
                Ok(met) => return met,
                Err(e) => error!("serial poll failed: {}", e),
            }
        }
        self.met_error
    }

    async fn sample_wind(&self) -> WindReading {
        match self.wind.poll_wind().await {
            Ok(wind) => wind,
            Err(e) => {
                error!("wind poll failed: {}", e);
                self.wind_error
            }
        }
    }
}
