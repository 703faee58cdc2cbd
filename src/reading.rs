use std::fmt;

/// The 3-field meteorological half of a reading (met4 sensor).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetReading {
    /// Air temperature, degrees C.
    pub temperature: f64,
    /// Barometric pressure, hPa.
    pub pressure: f64,
    /// Relative humidity, percent.
    pub humidity: f64,
}

/// The 2-field wind half of a reading (anemometer feed).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindReading {
    /// Wind speed, m/s.
    pub speed: f64,
    /// Azimuth wind direction, degrees.
    pub direction: f64,
}

/// The full 5-field weather record served to clients.
///
/// Always exactly five fields. A transport failure degrades the whole
/// corresponding half to its configured sentinel, never single fields.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    pub met: MetReading,
    pub wind: WindReading,
}

impl Reading {
    pub fn new(met: MetReading, wind: WindReading) -> Self {
        Self { met, wind }
    }

    /// The five fields in wire order.
    pub fn fields(&self) -> [f64; 5] {
        [
            self.met.temperature,
            self.met.pressure,
            self.met.humidity,
            self.wind.speed,
            self.wind.direction,
        ]
    }
}

/// Integral values keep one decimal place (`-51.0`, `143.0`), everything
/// else prints in its natural shortest form (`3.42`). Matches the legacy
/// server output; sentinels are not special-cased.
fn format_field(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields = self.fields().map(format_field);
        write!(f, "{}", fields.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_comma_joined() {
        let reading = Reading::new(
            MetReading {
                temperature: 22.4,
                pressure: 1013.2,
                humidity: 54.1,
            },
            WindReading {
                speed: 3.42,
                direction: 187.15,
            },
        );
        assert_eq!(reading.to_string(), "22.4,1013.2,54.1,3.42,187.15");
    }

    #[test]
    fn test_display_integral_values_keep_one_decimal() {
        let reading = Reading::new(
            MetReading {
                temperature: -51.0,
                pressure: -1.0,
                humidity: -1.0,
            },
            WindReading {
                speed: 5.0,
                direction: 143.0,
            },
        );
        assert_eq!(reading.to_string(), "-51.0,-1.0,-1.0,5.0,143.0");
    }

    #[test]
    fn test_fields_in_wire_order() {
        let reading = Reading::new(
            MetReading {
                temperature: 1.0,
                pressure: 2.0,
                humidity: 3.0,
            },
            WindReading {
                speed: 4.0,
                direction: 5.0,
            },
        );
        assert_eq!(reading.fields(), [1.0, 2.0, 3.0, 4.0, 5.0]);
    }
}
