//! Location samples and sensor readings.
//!
//! A [`LocationSample`] is one position fix as reported by a device. The
//! primary fix comes from the GPS provider at the highest available accuracy;
//! an optional secondary fix comes from the network (cell/Wi-Fi) provider and
//! is used only for cross-checking in the trust scorer.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// A single position reading (WGS84 degrees).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationSample {
    /// Latitude in degrees, [-90, 90].
    pub latitude: f64,

    /// Longitude in degrees, [-180, 180].
    pub longitude: f64,

    /// Estimated accuracy radius in meters, >= 0.
    pub accuracy: f64,

    /// Altitude in meters, if the provider reported one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub altitude: Option<f64>,

    /// Heading in degrees, if the provider reported one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heading: Option<f64>,

    /// Ground speed in meters/second, if the provider reported one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,

    /// Capture time in epoch milliseconds, from the device GPS clock
    /// (not wall clock).
    pub captured_at_ms: i64,

    /// OS-reported mock-location indicator.
    ///
    /// `Some(true)` means the position was injected by a non-hardware source
    /// and the sample must never be verified. `None` means the platform could
    /// not report the flag; the trust scorer treats that conservatively.
    pub is_mocked: Option<bool>,
}

impl LocationSample {
    /// Capture time as a UTC timestamp.
    pub fn captured_at(&self) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(self.captured_at_ms)
            .single()
            .unwrap_or_else(Utc::now)
    }

    /// Extract the environmental sensor readings carried on this sample.
    pub fn sensors(&self) -> SensorReadings {
        SensorReadings {
            altitude: self.altitude,
            heading: self.heading,
            speed: self.speed,
        }
    }

    /// Basic range validation of the coordinate fields.
    ///
    /// Returns the name of the first out-of-range field. A negative speed is
    /// deliberately *not* an input error here: it is a sensor-consistency
    /// signal consumed by the trust scorer.
    pub fn check_ranges(&self) -> Result<(), &'static str> {
        if !self.latitude.is_finite() || !(-90.0..=90.0).contains(&self.latitude) {
            return Err("latitude");
        }
        if !self.longitude.is_finite() || !(-180.0..=180.0).contains(&self.longitude) {
            return Err("longitude");
        }
        if !self.accuracy.is_finite() || self.accuracy < 0.0 {
            return Err("accuracy");
        }
        if self.captured_at_ms <= 0 {
            return Err("timestamp");
        }
        Ok(())
    }
}

/// Environmental sensor readings captured alongside a position fix.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorReadings {
    /// Altitude in meters.
    pub altitude: Option<f64>,

    /// Heading in degrees.
    pub heading: Option<f64>,

    /// Ground speed in meters/second.
    pub speed: Option<f64>,
}
