//! Request/response drivers for the sensor transports.
//!
//! Each reader performs a fixed exchange against its medium and returns a
//! well-formed partial reading or an error; the sampler turns errors into
//! the configured sentinel for that half.

pub mod relay;
pub mod serial;
pub mod wind;

use async_trait::async_trait;

use crate::error::TransportResult;
use crate::reading::{MetReading, WindReading};

/// A source of the 3-field meteorological half of a reading.
#[async_trait]
pub trait MetSource: Send + Sync {
    async fn poll_met(&self) -> TransportResult<MetReading>;
}

/// A source of the 2-field wind half of a reading.
#[async_trait]
pub trait WindSource: Send + Sync {
    async fn poll_wind(&self) -> TransportResult<WindReading>;
}

/// The three met sensor queries (see the met4 manual).
pub(crate) const QUERY_TEMPERATURE: &[u8] = b"*0100TT\r\n";
pub(crate) const QUERY_PRESSURE: &[u8] = b"*0100P3\r\n";
pub(crate) const QUERY_HUMIDITY: &[u8] = b"*0100RH\r\n";

/// Byte offset where the numeric payload starts in a met4 response.
const RESPONSE_HEADER_LEN: usize = 5;

/// Longest response line the sensor produces.
pub(crate) const MAX_RESPONSE_LEN: usize = 256;

/// Extract the numeric payload from one met4 response line.
///
/// The sensor answers `<5-byte header><payload>`; the value is the first
/// whitespace-delimited token of the payload. Empty or sub-header-length
/// responses are rejected.
pub(crate) fn parse_met_response(raw: &str) -> TransportResult<f64> {
    use crate::error::TransportError;

    let trimmed = raw.trim();
    if trimmed.len() < RESPONSE_HEADER_LEN {
        return Err(TransportError::ShortResponse { len: trimmed.len() });
    }
    let payload = trimmed.get(RESPONSE_HEADER_LEN..).ok_or_else(|| {
        TransportError::Malformed(format!("non-ASCII response header: {:?}", trimmed))
    })?;
    let token = payload
        .split_whitespace()
        .next()
        .ok_or_else(|| TransportError::Malformed(format!("no payload in {:?}", trimmed)))?;
    token
        .parse::<f64>()
        .map_err(|_| TransportError::Malformed(format!("non-numeric payload {:?}", token)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;

    #[test]
    fn test_parse_met_response_skips_header() {
        assert_eq!(parse_met_response("*0001 22.4\r\n").unwrap(), 22.4);
        assert_eq!(parse_met_response("*0001 1002.3 X").unwrap(), 1002.3);
    }

    #[test]
    fn test_parse_met_response_takes_first_token() {
        assert_eq!(parse_met_response("*0001 48.2 12.0 junk").unwrap(), 48.2);
    }

    #[test]
    fn test_parse_met_response_rejects_short() {
        assert_eq!(
            parse_met_response("*01"),
            Err(TransportError::ShortResponse { len: 3 })
        );
        assert_eq!(
            parse_met_response("   \r\n"),
            Err(TransportError::ShortResponse { len: 0 })
        );
    }

    #[test]
    fn test_parse_met_response_rejects_non_numeric() {
        assert!(matches!(
            parse_met_response("*0001 ERR"),
            Err(TransportError::Malformed(_))
        ));
    }

    #[test]
    fn test_parse_met_response_rejects_header_only() {
        assert!(matches!(
            parse_met_response("*0001"),
            Err(TransportError::Malformed(_))
        ));
    }
}
