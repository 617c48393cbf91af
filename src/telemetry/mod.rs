//! Aircraft state for situational answers.
//!
//! Simulator connections are platform specific, so sources sit behind
//! [`TelemetrySource`]. [`MockTelemetry`] serves a fixed cruise snapshot.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Where a snapshot came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TelemetryMode {
    Live,
    Mock,
}

impl std::fmt::Display for TelemetryMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TelemetryMode::Live => write!(f, "LIVE"),
            TelemetryMode::Mock => write!(f, "MOCK"),
        }
    }
}

/// One snapshot of aircraft state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightStatus {
    pub altitude_ft: f64,
    pub airspeed_kts: f64,
    pub heading_deg: f64,
    pub vertical_speed_fpm: f64,
    pub fuel_quantity_gal: f64,
    pub engine_rpm: f64,
    /// Flap handle index.
    pub flaps: u32,
    pub pitch_deg: f64,
    pub roll_deg: f64,
    pub mode: TelemetryMode,
}

impl FlightStatus {
    /// One-line summary for prompts.
    pub fn contextual_summary(&self) -> String {
        format!(
            "Altitude: {:.0} ft, Airspeed: {:.0} kts, Heading: {:.0}°, VS: {:.0} fpm",
            self.altitude_ft, self.airspeed_kts, self.heading_deg, self.vertical_speed_fpm
        )
    }

    pub fn is_live(&self) -> bool {
        self.mode == TelemetryMode::Live
    }
}

/// A provider of aircraft state.
#[async_trait]
pub trait TelemetrySource: Send + Sync {
    fn name(&self) -> &str;

    async fn flight_status(&self) -> Result<FlightStatus>;
}

/// Fixed snapshot: level cruise at 5000 ft heading west.
#[derive(Debug, Default, Clone, Copy)]
pub struct MockTelemetry;

impl MockTelemetry {
    pub fn snapshot() -> FlightStatus {
        FlightStatus {
            altitude_ft: 5000.0,
            airspeed_kts: 120.0,
            heading_deg: 270.0,
            vertical_speed_fpm: 0.0,
            fuel_quantity_gal: 45.5,
            engine_rpm: 2400.0,
            flaps: 0,
            pitch_deg: 2.5,
            roll_deg: 0.0,
            mode: TelemetryMode::Mock,
        }
    }
}

#[async_trait]
impl TelemetrySource for MockTelemetry {
    fn name(&self) -> &str {
        "mock"
    }

    async fn flight_status(&self) -> Result<FlightStatus> {
        Ok(Self::snapshot())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_snapshot() {
        let status = MockTelemetry.flight_status().await.unwrap();
        assert_eq!(status.altitude_ft, 5000.0);
        assert_eq!(status.fuel_quantity_gal, 45.5);
        assert_eq!(status.mode, TelemetryMode::Mock);
        assert!(!status.is_live());
    }

    #[test]
    fn test_contextual_summary() {
        assert_eq!(
            MockTelemetry::snapshot().contextual_summary(),
            "Altitude: 5000 ft, Airspeed: 120 kts, Heading: 270°, VS: 0 fpm"
        );

        let climbing = FlightStatus {
            altitude_ft: 6543.4,
            vertical_speed_fpm: -499.6,
            ..MockTelemetry::snapshot()
        };
        assert!(climbing.contextual_summary().starts_with("Altitude: 6543 ft"));
        assert!(climbing.contextual_summary().ends_with("VS: -500 fpm"));
    }

    #[test]
    fn test_mode_serializes_uppercase() {
        let json = serde_json::to_string(&MockTelemetry::snapshot()).unwrap();
        assert!(json.contains("\"mode\":\"MOCK\""));
    }
}
