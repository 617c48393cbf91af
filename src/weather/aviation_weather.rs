//! Primary provider: the public aviation weather data service.

use super::{ReportSource, WeatherProvider};
use crate::error::{FlightLensError, Result};
use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, instrument};

/// Unauthenticated METAR lookups.
pub struct AviationWeatherProvider {
    client: reqwest::Client,
    base_url: String,
}

impl AviationWeatherProvider {
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.to_string(),
        }
    }

    /// The METAR request for one station: latest observation in the past hour, as JSON.
    pub fn request(&self, station: &str) -> Result<reqwest::Request> {
        Ok(self
            .client
            .get(&self.base_url)
            .query(&[("ids", station), ("format", "json"), ("hours", "1")])
            .build()?)
    }
}

/// Pull the first raw report out of a response body.
///
/// Understands the data API's array of observations (`[].rawOb`) and the
/// legacy data server shape (`data.METAR[].raw_text`) some mirrors still serve.
pub fn extract_raw_report(body: &Value) -> Option<String> {
    let current = body
        .as_array()
        .and_then(|items| items.first())
        .and_then(|first| first.get("rawOb"));

    let legacy = body
        .get("data")
        .and_then(|d| d.get("METAR"))
        .and_then(|m| match m {
            Value::Array(items) => items.first(),
            other => Some(other),
        })
        .and_then(|first| first.get("raw_text"));

    current
        .or(legacy)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|raw| !raw.is_empty())
        .map(str::to_string)
}

#[async_trait]
impl WeatherProvider for AviationWeatherProvider {
    fn name(&self) -> &str {
        "aviationweather"
    }

    fn source(&self) -> ReportSource {
        ReportSource::AviationWeather
    }

    #[instrument(skip(self))]
    async fn fetch(&self, station: &str) -> Result<String> {
        let request = self.request(station)?;
        let response = self.client.execute(request).await?.error_for_status()?;

        let body: Value = response.json().await?;
        debug!("Received aviation weather response for {}", station);

        extract_raw_report(&body).ok_or_else(|| {
            FlightLensError::Weather(format!("No METAR in response for {}", station))
        })
    }
}
