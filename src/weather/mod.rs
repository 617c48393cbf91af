//! Weather observations for the cockpit assistant.
//!
//! A [`WeatherChain`] asks each configured [`WeatherProvider`] in priority
//! order and falls back to a built-in mock table, so a report is always
//! returned. Every report records which source produced it.

mod aviation_weather;
pub mod decode;
mod mock;
mod weatherapi;

pub use aviation_weather::AviationWeatherProvider;
pub use decode::{decode_report, MetarDecoder};
pub use mock::mock_report;
pub use weatherapi::WeatherApiProvider;

use crate::config::WeatherSettings;
use crate::error::Result;
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Which source produced a report.
///
/// Serializes and displays as the provider name, e.g. `aviationweather`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportSource {
    /// Primary public aviation weather service.
    AviationWeather,
    /// Secondary keyed provider; report text is synthesized from its fields.
    WeatherApi,
    /// Static fallback data.
    Mock,
}

impl ReportSource {
    /// Whether the report reflects current observations.
    pub fn is_live(&self) -> bool {
        !matches!(self, ReportSource::Mock)
    }
}

impl std::fmt::Display for ReportSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportSource::AviationWeather => write!(f, "aviationweather"),
            ReportSource::WeatherApi => write!(f, "weatherapi"),
            ReportSource::Mock => write!(f, "mock"),
        }
    }
}

/// A raw METAR-style report with its provenance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeatherReport {
    pub station: String,
    pub raw: String,
    pub source: ReportSource,
}

impl WeatherReport {
    pub fn is_live(&self) -> bool {
        self.source.is_live()
    }

    /// Decode the raw text into readable prose. Never fails.
    pub fn decoded(&self) -> String {
        decode_report(&self.raw)
    }
}

/// Trait for weather data providers.
///
/// Any failure, including "no data for this station", is an `Err`; the
/// chain treats it as a signal to try the next provider.
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Provider name for logs.
    fn name(&self) -> &str;

    /// Source tag attached to reports from this provider.
    fn source(&self) -> ReportSource;

    /// Fetch the current report for a normalized station code.
    async fn fetch(&self, station: &str) -> Result<String>;
}

/// Trim and upper-case a station code.
pub fn normalize_station(station: &str) -> String {
    station.trim().to_uppercase()
}

/// Build the HTTP client shared by the network providers.
pub fn http_client(settings: &WeatherSettings) -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .timeout(Duration::from_secs(settings.timeout_secs))
        .user_agent(settings.user_agent.clone())
        .build()?)
}

/// Ordered provider chain with a guaranteed mock fallback.
pub struct WeatherChain {
    providers: Vec<Box<dyn WeatherProvider>>,
}

impl WeatherChain {
    /// Create a chain from explicit providers, highest priority first.
    pub fn new(providers: Vec<Box<dyn WeatherProvider>>) -> Self {
        Self { providers }
    }

    /// A chain with no network providers; every request is served from the mock table.
    pub fn offline() -> Self {
        Self::new(Vec::new())
    }

    /// Build the standard chain from settings.
    ///
    /// The secondary provider is only included when an API key is configured.
    pub fn from_settings(settings: &WeatherSettings) -> Result<Self> {
        let client = http_client(settings)?;
        let mut providers: Vec<Box<dyn WeatherProvider>> = vec![Box::new(
            AviationWeatherProvider::new(client.clone(), &settings.primary_url),
        )];

        match settings.weatherapi_key() {
            Some(key) => providers.push(Box::new(WeatherApiProvider::new(
                client,
                &settings.weatherapi_url,
                key,
            ))),
            None => debug!("No WeatherAPI key configured, secondary provider disabled"),
        }

        Ok(Self::new(providers))
    }

    /// Names of the network providers, in priority order.
    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// Get the current report for a station.
    ///
    /// Each provider is tried exactly once; the first non-empty report wins.
    /// Falls back to mock data, so this always returns a report.
    #[instrument(skip(self))]
    pub async fn get_weather(&self, station: &str) -> WeatherReport {
        let station = normalize_station(station);

        for provider in &self.providers {
            match provider.fetch(&station).await {
                Ok(raw) if !raw.trim().is_empty() => {
                    info!("Weather for {} from {}", station, provider.name());
                    return WeatherReport {
                        station,
                        raw: raw.trim().to_string(),
                        source: provider.source(),
                    };
                }
                Ok(_) => warn!("{} returned an empty report for {}", provider.name(), station),
                Err(e) => warn!("{} failed for {}: {}", provider.name(), station, e),
            }
        }

        warn!("All weather providers failed, using mock data for {}", station);
        WeatherReport {
            raw: mock_report(&station),
            station,
            source: ReportSource::Mock,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FlightLensError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Fixed {
        name: &'static str,
        source: ReportSource,
        result: std::result::Result<&'static str, &'static str>,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl WeatherProvider for Fixed {
        fn name(&self) -> &str {
            self.name
        }

        fn source(&self) -> ReportSource {
            self.source
        }

        async fn fetch(&self, _station: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result
                .map(str::to_string)
                .map_err(|e| FlightLensError::Weather(e.to_string()))
        }
    }

    fn fixed(
        name: &'static str,
        source: ReportSource,
        result: std::result::Result<&'static str, &'static str>,
    ) -> (Box<dyn WeatherProvider>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let provider = Fixed { name, source, result, calls: calls.clone() };
        (Box::new(provider), calls)
    }

    #[test]
    fn test_source_tag_spelling_is_consistent() {
        for source in [ReportSource::AviationWeather, ReportSource::WeatherApi, ReportSource::Mock] {
            let json = serde_json::to_string(&source).unwrap();
            assert_eq!(json, format!("\"{}\"", source));
        }
        assert_eq!(ReportSource::WeatherApi.to_string(), "weatherapi");
    }

    #[tokio::test]
    async fn test_first_success_wins() {
        let (primary, primary_calls) =
            fixed("primary", ReportSource::AviationWeather, Ok("METAR KORD 121651Z 27012KT 10SM CLR 05/M03 A3001"));
        let (secondary, secondary_calls) = fixed("secondary", ReportSource::WeatherApi, Ok("unused"));

        let report = WeatherChain::new(vec![primary, secondary]).get_weather("kord").await;
        assert_eq!(report.station, "KORD");
        assert_eq!(report.source, ReportSource::AviationWeather);
        assert!(report.is_live());
        assert_eq!(primary_calls.load(Ordering::SeqCst), 1);
        assert_eq!(secondary_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_falls_through_errors_and_empty_reports() {
        let (primary, primary_calls) = fixed("primary", ReportSource::AviationWeather, Err("timeout"));
        let (empty, _) = fixed("empty", ReportSource::AviationWeather, Ok("   "));
        let (secondary, _) = fixed("secondary", ReportSource::WeatherApi, Ok("METAR KDFW 121650Z 18010KT 25/ A3012"));

        let report = WeatherChain::new(vec![primary, empty, secondary]).get_weather("KDFW").await;
        assert_eq!(report.source, ReportSource::WeatherApi);
        assert_eq!(report.raw, "METAR KDFW 121650Z 18010KT 25/ A3012");
        assert_eq!(primary_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_mock_fallback_known_station() {
        let (primary, _) = fixed("primary", ReportSource::AviationWeather, Err("down"));
        let report = WeatherChain::new(vec![primary]).get_weather("KDFW").await;
        assert_eq!(report.raw, "METAR KDFW 091856Z 18010KT 10SM FEW050 25/18 A3012");
        assert_eq!(report.source, ReportSource::Mock);
        assert!(!report.is_live());
    }

    #[tokio::test]
    async fn test_mock_fallback_unknown_station() {
        let report = WeatherChain::offline().get_weather(" zzzz ").await;
        assert!(report.raw.contains("ZZZZ"));
        assert_eq!(report.source, ReportSource::Mock);
    }

    #[tokio::test]
    async fn test_unreachable_network_providers_fall_back_to_mock() {
        let settings = WeatherSettings {
            primary_url: "http://127.0.0.1:9/metar".to_string(),
            weatherapi_url: "http://127.0.0.1:9/current.json".to_string(),
            weatherapi_key: Some("test-key".to_string()),
            timeout_secs: 2,
            ..WeatherSettings::default()
        };
        let chain = WeatherChain::from_settings(&settings).unwrap();
        assert_eq!(chain.provider_names(), vec!["aviationweather", "weatherapi"]);

        let report = chain.get_weather("KDFW").await;
        assert_eq!(report.raw, "METAR KDFW 091856Z 18010KT 10SM FEW050 25/18 A3012");

        let report = chain.get_weather("ZZZZ").await;
        assert!(!report.raw.is_empty());
        assert!(report.raw.contains("ZZZZ"));
    }

    #[test]
    fn test_secondary_skipped_without_key() {
        let chain = WeatherChain::from_settings(&WeatherSettings::default()).unwrap();
        assert_eq!(chain.provider_names(), vec!["aviationweather"]);
    }

    #[test]
    fn test_report_decodes() {
        let report = WeatherReport {
            station: "KDFW".to_string(),
            raw: mock_report("KDFW"),
            source: ReportSource::Mock,
        };
        assert!(report.decoded().contains("station: KDFW"));
    }
}
