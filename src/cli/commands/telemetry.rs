//! Telemetry command implementation.

use crate::cli::Output;
use crate::telemetry::{MockTelemetry, TelemetrySource};
use anyhow::Result;

/// Run the telemetry command.
pub async fn run_telemetry() -> Result<()> {
    let source = MockTelemetry;
    let status = source.flight_status().await?;

    Output::header(&format!("Flight Status ({})", status.mode));
    Output::kv("Altitude", &format!("{:.0} ft", status.altitude_ft));
    Output::kv("Airspeed", &format!("{:.0} kts", status.airspeed_kts));
    Output::kv("Heading", &format!("{:.0}°", status.heading_deg));
    Output::kv("Vertical speed", &format!("{:.0} fpm", status.vertical_speed_fpm));
    Output::kv("Fuel", &format!("{:.1} gal", status.fuel_quantity_gal));
    Output::kv("Engine", &format!("{:.0} rpm", status.engine_rpm));
    Output::kv("Flaps", &status.flaps.to_string());
    Output::kv("Attitude", &format!("pitch {:.1}°, roll {:.1}°", status.pitch_deg, status.roll_deg));
    println!();
    Output::info(&status.contextual_summary());

    Ok(())
}
