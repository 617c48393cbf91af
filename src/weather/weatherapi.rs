//! Secondary provider: WeatherAPI current conditions.
//!
//! The service reports general weather, not METARs, so the fields are
//! converted into an approximate METAR-style line.

use super::{ReportSource, WeatherProvider};
use crate::error::{FlightLensError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{info, instrument};

const KPH_TO_KNOTS: f64 = 0.539957;
const HPA_PER_INHG: f64 = 33.8639;

/// Query locations for supported stations.
const STATION_LOCATIONS: &[(&str, &str)] = &[
    ("KDFW", "Dallas, Texas"),
    ("KLAX", "Los Angeles, California"),
    ("KJFK", "New York, New York"),
    ("KORD", "Chicago, Illinois"),
];

/// Location query for a station, if supported.
pub fn station_location(station: &str) -> Option<&'static str> {
    STATION_LOCATIONS
        .iter()
        .find(|(code, _)| *code == station)
        .map(|(_, location)| *location)
}

#[derive(Debug, Deserialize)]
struct CurrentResponse {
    current: CurrentConditions,
}

/// Subset of the `current` object used for the report.
#[derive(Debug, Clone, Deserialize)]
pub struct CurrentConditions {
    pub temp_c: f64,
    pub wind_kph: f64,
    pub wind_degree: u32,
    pub pressure_mb: f64,
    #[serde(default)]
    pub dewpoint_c: Option<f64>,
}

/// Temperature group value, `M` for negatives.
fn metar_temp(celsius: f64) -> String {
    let rounded = celsius.round() as i64;
    if rounded < 0 {
        format!("M{:02}", -rounded)
    } else {
        format!("{:02}", rounded)
    }
}

/// Render conditions as a METAR-style line.
pub fn to_metar(station: &str, conditions: &CurrentConditions, observed: DateTime<Utc>) -> String {
    let wind_kt = (conditions.wind_kph * KPH_TO_KNOTS) as u32;
    let wind = if wind_kt == 0 {
        "00000KT".to_string()
    } else {
        format!("{:03}{:02}KT", conditions.wind_degree % 360, wind_kt)
    };

    let dew = conditions.dewpoint_c.map(metar_temp).unwrap_or_default();
    let altimeter = (conditions.pressure_mb / HPA_PER_INHG * 100.0).round() as u32;

    format!(
        "METAR {} {}Z {} {}/{} A{:04}",
        station,
        observed.format("%d%H%M"),
        wind,
        metar_temp(conditions.temp_c),
        dew,
        altimeter
    )
}

/// Keyed provider backed by WeatherAPI.
pub struct WeatherApiProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl WeatherApiProvider {
    pub fn new(client: reqwest::Client, base_url: &str, api_key: &str) -> Self {
        Self {
            client,
            base_url: base_url.to_string(),
            api_key: api_key.to_string(),
        }
    }
}

#[async_trait]
impl WeatherProvider for WeatherApiProvider {
    fn name(&self) -> &str {
        "weatherapi"
    }

    fn source(&self) -> ReportSource {
        ReportSource::WeatherApi
    }

    #[instrument(skip(self))]
    async fn fetch(&self, station: &str) -> Result<String> {
        let location = station_location(station).ok_or_else(|| {
            FlightLensError::Weather(format!("No WeatherAPI location for {}", station))
        })?;

        let response: CurrentResponse = self
            .client
            .get(&self.base_url)
            .query(&[("key", self.api_key.as_str()), ("q", location), ("aqi", "no")])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let metar = to_metar(station, &response.current, Utc::now());
        info!("Real-time weather from WeatherAPI: {}", station);
        Ok(metar)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn observed() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 9, 18, 56, 0).unwrap()
    }

    #[test]
    fn test_to_metar() {
        let conditions = CurrentConditions {
            temp_c: 25.3,
            wind_kph: 18.5,
            wind_degree: 180,
            pressure_mb: 1020.0,
            dewpoint_c: Some(18.0),
        };
        assert_eq!(
            to_metar("KDFW", &conditions, observed()),
            "METAR KDFW 091856Z 18009KT 25/18 A3012"
        );
    }

    #[test]
    fn test_to_metar_calm_and_negative() {
        let conditions = CurrentConditions {
            temp_c: -3.6,
            wind_kph: 0.0,
            wind_degree: 0,
            pressure_mb: 1013.2,
            dewpoint_c: None,
        };
        assert_eq!(
            to_metar("KORD", &conditions, observed()),
            "METAR KORD 091856Z 00000KT M04/ A2992"
        );
    }

    #[test]
    fn test_parse_response() {
        let body = r#"{"location":{"name":"Dallas"},"current":{"temp_c":31.1,"wind_kph":20.2,"wind_degree":170,"pressure_mb":1011.0,"humidity":40}}"#;
        let parsed: CurrentResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.current.wind_degree, 170);
        assert!(parsed.current.dewpoint_c.is_none());
    }

    #[test]
    fn test_station_location() {
        assert_eq!(station_location("KJFK"), Some("New York, New York"));
        assert_eq!(station_location("ZZZZ"), None);
    }
}
