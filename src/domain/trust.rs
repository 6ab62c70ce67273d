//! Multi-signal location trust scoring.
//!
//! [`assess`] is a pure function over the captured signals. It runs twice per
//! proof: once on the client as an advisory pre-check (UX only) and once on
//! the server as the authoritative gate. Both ends must produce the identical
//! score and check flags for the same inputs, so the deduction rules below are
//! fixed constants and all arithmetic is deterministic.
//!
//! # Deduction rules
//!
//! Starting from 100:
//! - network fix more than 5 km from the GPS fix: -40, `gps_network_match`
//!   flagged false
//! - network fix between 1 km and 5 km away: -20 (flag stays true)
//! - no network fix available: -10
//! - mock-location flag unavailable on the platform: -10
//! - altitude outside [-500 m, 8900 m]: -20, `altitude_reasonable` false
//! - negative reported speed: -10, `sensors_consistent` false
//!
//! The final score is clamped to [0, 100]. A score below
//! [`TRUST_SCORE_THRESHOLD`] fails the gate; an OS-confirmed mock location
//! fails it outright, regardless of score.

use serde::{Deserialize, Serialize};

use super::location::{LocationSample, SensorReadings};

/// Minimum score required to pass the trust gate.
pub const TRUST_SCORE_THRESHOLD: u8 = 50;

/// Mean Earth radius used for great-circle distance, in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// GPS/network separation beyond which the fixes are considered contradictory.
const HARD_MISMATCH_KM: f64 = 5.0;

/// GPS/network separation beyond which confidence is reduced.
const SOFT_MISMATCH_KM: f64 = 1.0;

/// Plausible altitude band for field work, in meters.
const ALTITUDE_MIN_M: f64 = -500.0;
const ALTITUDE_MAX_M: f64 = 8900.0;

const DEDUCT_HARD_MISMATCH: i32 = 40;
const DEDUCT_SOFT_MISMATCH: i32 = 20;
const DEDUCT_NO_NETWORK_FIX: i32 = 10;
const DEDUCT_MOCK_FLAG_UNKNOWN: i32 = 10;
const DEDUCT_IMPLAUSIBLE_ALTITUDE: i32 = 20;
const DEDUCT_NEGATIVE_SPEED: i32 = 10;

/// Named boolean outcomes of the individual cross-checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrustChecks {
    /// GPS and network fixes agree to within 5 km (or no network fix).
    pub gps_network_match: bool,

    /// Reported altitude falls inside the plausible band (or none reported).
    pub altitude_reasonable: bool,

    /// Sensor readings are internally consistent (no negative speed).
    pub sensors_consistent: bool,
}

impl Default for TrustChecks {
    fn default() -> Self {
        Self {
            gps_network_match: true,
            altitude_reasonable: true,
            sensors_consistent: true,
        }
    }
}

impl TrustChecks {
    /// Names of the checks that failed, for error payloads.
    pub fn failed(&self) -> Vec<&'static str> {
        let mut failed = Vec::new();
        if !self.gps_network_match {
            failed.push("gpsNetworkMatch");
        }
        if !self.altitude_reasonable {
            failed.push("altitudeReasonable");
        }
        if !self.sensors_consistent {
            failed.push("sensorsConsistent");
        }
        failed
    }
}

/// Result of scoring one capture attempt.
///
/// Derived fresh each time from the submitted signals; never persisted on its
/// own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrustAssessment {
    pub checks: TrustChecks,

    /// Confidence score in [0, 100].
    pub score: u8,
}

impl TrustAssessment {
    /// Whether the score clears the gate threshold.
    pub fn passes(&self) -> bool {
        self.score >= TRUST_SCORE_THRESHOLD
    }
}

/// Why the trust gate rejected a capture.
#[derive(Debug, Clone, PartialEq)]
pub enum TrustRejection {
    /// The OS reported the position as injected. Terminal, independent of
    /// score.
    MockLocation,

    /// The combined score fell below the threshold.
    LowScore(TrustAssessment),
}

/// Score one capture attempt from its signals.
///
/// Pure and deterministic: identical inputs always yield the identical score
/// and flags, on client and server alike.
pub fn assess(
    primary: &LocationSample,
    network: Option<&LocationSample>,
    sensors: &SensorReadings,
) -> TrustAssessment {
    let mut checks = TrustChecks::default();
    let mut score: i32 = 100;

    match network {
        Some(net) => {
            let distance_km = haversine_km(
                primary.latitude,
                primary.longitude,
                net.latitude,
                net.longitude,
            );
            if distance_km > HARD_MISMATCH_KM {
                checks.gps_network_match = false;
                score -= DEDUCT_HARD_MISMATCH;
            } else if distance_km > SOFT_MISMATCH_KM {
                score -= DEDUCT_SOFT_MISMATCH;
            }
        }
        None => {
            score -= DEDUCT_NO_NETWORK_FIX;
        }
    }

    if primary.is_mocked.is_none() {
        score -= DEDUCT_MOCK_FLAG_UNKNOWN;
    }

    if let Some(altitude) = sensors.altitude {
        if !(ALTITUDE_MIN_M..=ALTITUDE_MAX_M).contains(&altitude) {
            checks.altitude_reasonable = false;
            score -= DEDUCT_IMPLAUSIBLE_ALTITUDE;
        }
    }

    if let Some(speed) = sensors.speed {
        if speed < 0.0 {
            checks.sensors_consistent = false;
            score -= DEDUCT_NEGATIVE_SPEED;
        }
    }

    TrustAssessment {
        checks,
        score: score.clamp(0, 100) as u8,
    }
}

/// Apply the full gate policy: hard mock-location fail first, then the score
/// threshold. Used verbatim by the client pre-check and the server re-check.
pub fn gate(
    primary: &LocationSample,
    network: Option<&LocationSample>,
    sensors: &SensorReadings,
) -> Result<TrustAssessment, TrustRejection> {
    if primary.is_mocked == Some(true) {
        return Err(TrustRejection::MockLocation);
    }

    let assessment = assess(primary, network, sensors);
    if !assessment.passes() {
        return Err(TrustRejection::LowScore(assessment));
    }

    Ok(assessment)
}

/// Great-circle distance between two WGS84 points, in kilometers.
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

#[cfg(test)]
mod tests {
    use super::*;

    fn primary() -> LocationSample {
        LocationSample {
            latitude: 12.9716,
            longitude: 77.5946,
            accuracy: 5.0,
            altitude: Some(900.0),
            heading: None,
            speed: None,
            captured_at_ms: 1_700_000_000_000,
            is_mocked: Some(false),
        }
    }

    fn network_at(latitude: f64, longitude: f64) -> LocationSample {
        LocationSample {
            latitude,
            longitude,
            accuracy: 50.0,
            altitude: None,
            heading: None,
            speed: None,
            captured_at_ms: 1_700_000_000_000,
            is_mocked: Some(false),
        }
    }

    #[test]
    fn haversine_known_distance() {
        // Bangalore to Chennai, roughly 290 km.
        let d = haversine_km(12.9716, 77.5946, 13.0827, 80.2707);
        assert!((d - 290.0).abs() < 15.0, "got {d}");
    }

    #[test]
    fn nearby_network_fix_keeps_full_score() {
        let p = primary();
        let net = network_at(12.9720, 77.5950);
        let sensors = p.sensors();

        let a = assess(&p, Some(&net), &sensors);
        assert_eq!(a.score, 100);
        assert!(a.checks.gps_network_match);
    }

    #[test]
    fn soft_mismatch_deducts_twenty_without_flagging() {
        let p = primary();
        // ~2 km north.
        let net = network_at(12.9896, 77.5946);
        let sensors = p.sensors();

        let a = assess(&p, Some(&net), &sensors);
        assert_eq!(a.score, 80);
        assert!(a.checks.gps_network_match);
    }

    #[test]
    fn hard_mismatch_deducts_forty_and_flags() {
        let p = primary();
        // ~8 km north.
        let net = network_at(13.0436, 77.5946);
        let sensors = p.sensors();

        let a = assess(&p, Some(&net), &sensors);
        assert_eq!(a.score, 60);
        assert!(!a.checks.gps_network_match);
    }

    #[test]
    fn missing_network_fix_deducts_ten() {
        let p = primary();
        let sensors = p.sensors();

        let a = assess(&p, None, &sensors);
        assert_eq!(a.score, 90);
        assert!(a.checks.gps_network_match);
    }

    #[test]
    fn unknown_mock_flag_deducts_ten() {
        let mut p = primary();
        p.is_mocked = None;
        let net = network_at(12.9720, 77.5950);
        let sensors = p.sensors();

        let a = assess(&p, Some(&net), &sensors);
        assert_eq!(a.score, 90);
    }

    #[test]
    fn implausible_altitude_deducts_twenty() {
        let mut p = primary();
        p.altitude = Some(9500.0);
        let net = network_at(12.9720, 77.5950);
        let sensors = p.sensors();

        let a = assess(&p, Some(&net), &sensors);
        assert_eq!(a.score, 80);
        assert!(!a.checks.altitude_reasonable);

        let mut p = primary();
        p.altitude = Some(-600.0);
        let sensors = p.sensors();
        let a = assess(&p, Some(&net), &sensors);
        assert!(!a.checks.altitude_reasonable);
    }

    #[test]
    fn negative_speed_deducts_ten() {
        let mut p = primary();
        p.speed = Some(-1.0);
        let net = network_at(12.9720, 77.5950);
        let sensors = p.sensors();

        let a = assess(&p, Some(&net), &sensors);
        assert_eq!(a.score, 90);
        assert!(!a.checks.sensors_consistent);
    }

    #[test]
    fn deductions_stack_and_floor_at_zero() {
        let mut p = primary();
        p.is_mocked = None;
        p.altitude = Some(10_000.0);
        p.speed = Some(-3.0);
        // ~8 km away.
        let net = network_at(13.0436, 77.5946);
        let sensors = p.sensors();

        // 100 - 40 - 10 - 20 - 10 = 20
        let a = assess(&p, Some(&net), &sensors);
        assert_eq!(a.score, 20);
        assert!(!a.passes());
    }

    #[test]
    fn gate_rejects_mocked_location_regardless_of_score() {
        let mut p = primary();
        p.is_mocked = Some(true);
        let net = network_at(12.9720, 77.5950);
        let sensors = p.sensors();

        // Every other signal is perfect; the mock flag still wins.
        assert_eq!(
            gate(&p, Some(&net), &sensors),
            Err(TrustRejection::MockLocation)
        );
    }

    #[test]
    fn gate_rejects_below_threshold_with_assessment() {
        let mut p = primary();
        p.altitude = Some(9500.0);
        // 8 km mismatch (-40) plus altitude (-20) = 40.
        let net = network_at(13.0436, 77.5946);
        let sensors = p.sensors();

        match gate(&p, Some(&net), &sensors) {
            Err(TrustRejection::LowScore(a)) => {
                assert_eq!(a.score, 40);
                assert_eq!(a.checks.failed(), vec!["gpsNetworkMatch", "altitudeReasonable"]);
            }
            other => panic!("expected low-score rejection, got {other:?}"),
        }
    }

    #[test]
    fn gate_passes_sixty_with_failed_flag_surfaced() {
        let p = primary();
        let net = network_at(13.0436, 77.5946);
        let sensors = p.sensors();

        let a = gate(&p, Some(&net), &sensors).expect("60 clears the threshold");
        assert_eq!(a.score, 60);
        assert!(!a.checks.gps_network_match);
    }

    #[test]
    fn assess_is_deterministic() {
        let p = primary();
        let net = network_at(12.9896, 77.5946);
        let sensors = p.sensors();

        let a = assess(&p, Some(&net), &sensors);
        let b = assess(&p, Some(&net), &sensors);
        assert_eq!(a, b);
    }
}
