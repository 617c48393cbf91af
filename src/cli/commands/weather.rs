//! Weather command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::weather::WeatherChain;
use anyhow::Result;

/// Run the weather command.
pub async fn run_weather(station: &str, decode: bool, settings: &Settings) -> Result<()> {
    let chain = WeatherChain::from_settings(&settings.weather)?;

    let spinner = Output::spinner(&format!("Fetching weather for {}...", station.trim().to_uppercase()));
    let report = chain.get_weather(station).await;
    spinner.finish_and_clear();

    if !report.is_live() {
        Output::warning("Live weather unavailable, showing mock data.");
    }
    Output::weather_report(&report);

    if decode {
        Output::header("Decoded");
        for line in report.decoded().lines() {
            println!("  {}", line);
        }
    }

    Ok(())
}
