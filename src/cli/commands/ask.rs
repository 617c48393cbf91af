//! Ask command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use crate::rag::FlightContext;
use crate::telemetry::{MockTelemetry, TelemetrySource};
use crate::weather::WeatherReport;
use anyhow::Result;

/// METAR text handed to the model, flagged when it is not a live observation.
fn metar_context(report: &WeatherReport) -> String {
    if report.is_live() {
        format!("{} (source: {})", report.raw, report.source)
    } else {
        format!("{} (source: {}, NOT LIVE DATA)", report.raw, report.source)
    }
}

/// Run the ask command.
pub async fn run_ask(
    question: &str,
    show_sources: bool,
    station: Option<&str>,
    with_telemetry: bool,
    model: Option<String>,
    mut settings: Settings,
) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Ask, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'flightlens doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    if let Some(model) = model {
        settings.rag.model = model;
    }

    let orchestrator = Orchestrator::new(settings)?;
    let engine = orchestrator.rag_engine()?;

    let mut context = FlightContext::default();

    if let Some(station) = station {
        let report = orchestrator.weather_chain()?.get_weather(station).await;
        if !report.is_live() {
            Output::warning(&format!("Using mock weather for {}", report.station));
        }
        context.metar = Some(metar_context(&report));
    }

    if with_telemetry {
        let status = MockTelemetry.flight_status().await?;
        context.telemetry = Some(format!("{} ({})", status.contextual_summary(), status.mode));
    }

    let spinner = Output::spinner("Searching manuals...");
    let result = engine.ask_with_context(question, &context).await;
    spinner.finish_and_clear();

    match result {
        Ok(response) if show_sources => println!("\n{}\n", response.format_for_display()),
        Ok(response) => println!("\n{}\n", response.answer),
        Err(e) => {
            Output::error(&format!("Failed to generate answer: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weather::ReportSource;

    #[test]
    fn test_metar_context_flags_mock_data() {
        let mut report = WeatherReport {
            station: "KDFW".to_string(),
            raw: "METAR KDFW 091856Z 18010KT 10SM FEW050 25/18 A3012".to_string(),
            source: ReportSource::Mock,
        };
        assert!(metar_context(&report).ends_with("(source: mock, NOT LIVE DATA)"));

        report.source = ReportSource::AviationWeather;
        assert!(metar_context(&report).ends_with("(source: aviationweather)"));
    }
}
