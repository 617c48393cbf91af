//! METAR decoding.
//!
//! Parses the body groups of a METAR/SPECI report into structured fields and
//! renders them as readable lines. Remarks are kept mostly verbatim.

use crate::error::{FlightLensError, Result};
use regex::{Captures, Regex};
use std::sync::LazyLock;

static DECODER: LazyLock<MetarDecoder> = LazyLock::new(MetarDecoder::new);

/// Decode a raw report into readable text.
///
/// Never fails: a report that cannot be parsed yields an
/// `"Error decoding: ..."` string instead.
pub fn decode_report(raw: &str) -> String {
    match DECODER.decode(raw) {
        Ok(metar) => metar.to_string(),
        Err(FlightLensError::Decode(msg)) => format!("Error decoding: {}", msg),
        Err(e) => format!("Error decoding: {}", e),
    }
}

/// Surface wind.
#[derive(Debug, Clone, PartialEq)]
pub struct Wind {
    /// Direction in degrees, `None` when variable.
    pub direction: Option<u16>,
    pub speed: u16,
    pub gust: Option<u16>,
    /// "knots", "meters per second" or "km/h".
    pub unit: &'static str,
    /// Variable direction sector, e.g. 150 to 210.
    pub variable_sector: Option<(u16, u16)>,
}

/// Prevailing visibility.
#[derive(Debug, Clone, PartialEq)]
pub enum Visibility {
    /// Statute miles as written, with an optional "less than"/"greater than" qualifier.
    Miles { value: String, qualifier: Option<&'static str> },
    Meters(u32),
    /// 9999: 10 km or more.
    TenKmOrMore,
    /// Ceiling and visibility OK.
    Cavok,
}

/// One sky condition group.
#[derive(Debug, Clone, PartialEq)]
pub struct SkyLayer {
    /// FEW, SCT, BKN, OVC, VV, a clear-sky code, or `///` when the
    /// station could not observe it.
    pub cover: String,
    /// Base in feet above ground level.
    pub height_ft: Option<u32>,
    /// CB or TCU.
    pub cloud_type: Option<String>,
}

/// Altimeter setting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Pressure {
    InHg(f64),
    Hpa(f64),
}

impl Pressure {
    pub fn hpa(&self) -> f64 {
        match *self {
            Pressure::InHg(v) => v * 33.8639,
            Pressure::Hpa(v) => v,
        }
    }

    pub fn inhg(&self) -> f64 {
        match *self {
            Pressure::InHg(v) => v,
            Pressure::Hpa(v) => v / 33.8639,
        }
    }
}

/// A decoded report.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metar {
    /// METAR or SPECI.
    pub report_type: String,
    pub station: String,
    /// Day of month, hour and minute (UTC).
    pub time: Option<(u8, u8, u8)>,
    /// AUTO or COR.
    pub modifier: Option<String>,
    pub wind: Option<Wind>,
    pub visibility: Option<Visibility>,
    pub runway_visual_range: Vec<String>,
    /// Present weather, already in words.
    pub weather: Vec<String>,
    pub sky: Vec<SkyLayer>,
    pub temperature: Option<i32>,
    pub dewpoint: Option<i32>,
    pub pressure: Option<Pressure>,
    pub trend: Option<String>,
    pub remarks: Option<String>,
}

/// Regex-driven METAR group parser.
pub struct MetarDecoder {
    station: Regex,
    time: Regex,
    wind: Regex,
    wind_variation: Regex,
    visibility_miles: Regex,
    whole_miles: Regex,
    visibility_meters: Regex,
    rvr: Regex,
    weather: Regex,
    sky: Regex,
    temperature: Regex,
    altimeter: Regex,
}

impl Default for MetarDecoder {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_temp(s: &str) -> Option<i32> {
    match s.strip_prefix('M') {
        Some(rest) => rest.parse::<i32>().ok().map(|v| -v),
        None => s.parse().ok(),
    }
}

fn num<T: std::str::FromStr>(caps: &Captures, i: usize) -> Option<T> {
    caps.get(i).and_then(|m| m.as_str().parse().ok())
}

impl MetarDecoder {
    pub fn new() -> Self {
        let re = |pattern: &str| Regex::new(pattern).expect("Invalid regex");
        Self {
            station: re(r"^[A-Z][A-Z0-9]{3}$"),
            time: re(r"^(\d{2})(\d{2})(\d{2})Z$"),
            wind: re(r"^(\d{3}|VRB)(\d{2,3})(?:G(\d{2,3}))?(KT|MPS|KMH)$"),
            wind_variation: re(r"^(\d{3})V(\d{3})$"),
            visibility_miles: re(r"^([MP])?(\d{1,2}|\d/\d{1,2})SM$"),
            whole_miles: re(r"^\d$"),
            visibility_meters: re(r"^(\d{4})(?:NDV)?$"),
            rvr: re(r"^R\d{2}[LRC]?/[MP]?\d{4}(?:V[MP]?\d{4})?(?:FT)?[UDN]?$"),
            weather: re(
                r"^(-|\+|VC)?(MI|PR|BC|DR|BL|SH|TS|FZ)?((?:DZ|RA|SN|SG|IC|PL|GR|GS|UP)*)(BR|FG|FU|VA|DU|SA|HZ|PY)?(PO|SQ|FC|SS|DS)?$",
            ),
            sky: re(r"^(FEW|SCT|BKN|OVC|VV|///)(\d{3}|///)(CB|TCU|///)?$"),
            temperature: re(r"^(M?\d{2})/(M?\d{2})?$"),
            altimeter: re(r"^([AQ])(\d{4})$"),
        }
    }

    /// Parse a raw report.
    pub fn decode(&self, raw: &str) -> Result<Metar> {
        let body = raw.trim().trim_end_matches('=');
        let (body, remarks) = match body.split_once(" RMK") {
            Some((b, r)) => (b, Some(r.trim().to_string()).filter(|r| !r.is_empty())),
            None => (body, None),
        };

        let tokens: Vec<&str> = body.split_whitespace().collect();
        if tokens.is_empty() {
            return Err(FlightLensError::Decode("empty report".to_string()));
        }

        let mut metar = Metar {
            report_type: "METAR".to_string(),
            remarks,
            ..Metar::default()
        };

        let mut i = 0;
        if matches!(tokens[0], "METAR" | "SPECI") {
            metar.report_type = tokens[0].to_string();
            i += 1;
        }

        match tokens.get(i) {
            Some(t) if self.station.is_match(t) => {
                metar.station = t.to_string();
                i += 1;
            }
            _ => {
                return Err(FlightLensError::Decode(format!(
                    "missing station identifier in '{}'",
                    raw.trim()
                )))
            }
        }

        let mut unparsed = Vec::new();
        while i < tokens.len() {
            let token = tokens[i];

            // "1 1/2SM" spans two tokens
            if self.whole_miles.is_match(token) {
                if let Some(next) = tokens.get(i + 1) {
                    if let Some(caps) = self.visibility_miles.captures(next) {
                        if caps.get(1).is_none() && next.contains('/') {
                            metar.visibility = Some(Visibility::Miles {
                                value: format!("{} {}", token, &caps[2]),
                                qualifier: None,
                            });
                            i += 2;
                            continue;
                        }
                    }
                }
            }

            if matches!(token, "NOSIG" | "BECMG" | "TEMPO") {
                metar.trend = Some(tokens[i..].join(" "));
                break;
            }

            if !self.parse_group(token, &mut metar) {
                unparsed.push(token);
            }
            i += 1;
        }

        if !unparsed.is_empty() {
            return Err(FlightLensError::Decode(format!(
                "Unparsed groups in body '{}' while processing '{}'",
                unparsed.join(" "),
                raw.trim()
            )));
        }

        Ok(metar)
    }

    /// Apply one body group. Returns false when the group is not recognised.
    fn parse_group(&self, token: &str, metar: &mut Metar) -> bool {
        match token {
            "AUTO" | "COR" => {
                metar.modifier = Some(token.to_string());
                return true;
            }
            "CAVOK" => {
                metar.visibility = Some(Visibility::Cavok);
                return true;
            }
            "SKC" | "CLR" | "NSC" | "NCD" => {
                metar.sky.push(SkyLayer {
                    cover: token.to_string(),
                    height_ft: None,
                    cloud_type: None,
                });
                return true;
            }
            _ => {}
        }

        if metar.time.is_none() {
            if let Some(caps) = self.time.captures(token) {
                metar.time = Some((num(&caps, 1).unwrap_or(0), num(&caps, 2).unwrap_or(0), num(&caps, 3).unwrap_or(0)));
                return true;
            }
        }

        if let Some(caps) = self.wind.captures(token) {
            let unit = match &caps[4] {
                "MPS" => "meters per second",
                "KMH" => "km/h",
                _ => "knots",
            };
            metar.wind = Some(Wind {
                direction: num(&caps, 1),
                speed: num(&caps, 2).unwrap_or(0),
                gust: num(&caps, 3),
                unit,
                variable_sector: None,
            });
            return true;
        }

        if let Some(caps) = self.wind_variation.captures(token) {
            if let Some(wind) = metar.wind.as_mut() {
                wind.variable_sector = Some((num(&caps, 1).unwrap_or(0), num(&caps, 2).unwrap_or(0)));
                return true;
            }
            return false;
        }

        if let Some(caps) = self.visibility_miles.captures(token) {
            let qualifier = caps.get(1).map(|m| match m.as_str() {
                "M" => "less than",
                _ => "greater than",
            });
            metar.visibility = Some(Visibility::Miles {
                value: caps[2].to_string(),
                qualifier,
            });
            return true;
        }

        if metar.visibility.is_none() {
            if let Some(caps) = self.visibility_meters.captures(token) {
                let meters: u32 = num(&caps, 1).unwrap_or(0);
                metar.visibility = Some(if meters == 9999 {
                    Visibility::TenKmOrMore
                } else {
                    Visibility::Meters(meters)
                });
                return true;
            }
        }

        if self.rvr.is_match(token) {
            metar.runway_visual_range.push(token.to_string());
            return true;
        }

        if let Some(caps) = self.sky.captures(token) {
            metar.sky.push(SkyLayer {
                cover: caps[1].to_string(),
                height_ft: num::<u32>(&caps, 2).map(|h| h * 100),
                cloud_type: caps
                    .get(3)
                    .map(|m| m.as_str())
                    .filter(|t| *t != "///")
                    .map(str::to_string),
            });
            return true;
        }

        // Automated stations report unobserved present weather as "//"
        if token == "//" {
            return true;
        }

        if let Some(caps) = self.temperature.captures(token) {
            metar.temperature = parse_temp(&caps[1]);
            metar.dewpoint = caps.get(2).and_then(|m| parse_temp(m.as_str()));
            return true;
        }

        if let Some(caps) = self.altimeter.captures(token) {
            let value: f64 = num(&caps, 2).unwrap_or(0.0);
            metar.pressure = Some(match &caps[1] {
                "A" => Pressure::InHg(value / 100.0),
                _ => Pressure::Hpa(value),
            });
            return true;
        }

        if let Some(caps) = self.weather.captures(token) {
            if (2..=5).any(|g| caps.get(g).is_some_and(|m| !m.as_str().is_empty())) {
                metar.weather.push(describe_weather(&caps));
                return true;
            }
        }

        false
    }
}

fn describe_weather(caps: &Captures) -> String {
    let mut words: Vec<&str> = Vec::new();

    if let Some(m) = caps.get(1) {
        words.push(match m.as_str() {
            "-" => "light",
            "+" => "heavy",
            _ => "nearby",
        });
    }
    if let Some(m) = caps.get(2) {
        words.push(match m.as_str() {
            "MI" => "shallow",
            "PR" => "partial",
            "BC" => "patches of",
            "DR" => "low drifting",
            "BL" => "blowing",
            "SH" => "showers of",
            "TS" => "thunderstorm with",
            _ => "freezing",
        });
    }

    let precipitation = caps.get(3).map(|m| m.as_str()).unwrap_or("");
    for code in precipitation.as_bytes().chunks(2) {
        words.push(match code {
            b"DZ" => "drizzle",
            b"RA" => "rain",
            b"SN" => "snow",
            b"SG" => "snow grains",
            b"IC" => "ice crystals",
            b"PL" => "ice pellets",
            b"GR" => "hail",
            b"GS" => "small hail",
            _ => "unknown precipitation",
        });
    }

    for g in [4, 5] {
        if let Some(m) = caps.get(g) {
            words.push(match m.as_str() {
                "BR" => "mist",
                "FG" => "fog",
                "FU" => "smoke",
                "VA" => "volcanic ash",
                "DU" => "dust",
                "SA" => "sand",
                "HZ" => "haze",
                "PY" => "spray",
                "PO" => "dust whirls",
                "SQ" => "squalls",
                "FC" => "funnel cloud",
                "SS" => "sandstorm",
                _ => "duststorm",
            });
        }
    }

    // "thunderstorm with" / "showers of" read oddly with nothing after them
    if let Some(last) = words.pop() {
        words.push(last.trim_end_matches(" with").trim_end_matches(" of"));
    }
    words.join(" ")
}

/// 16-point compass name for a wind direction.
pub fn compass_point(degrees: u16) -> &'static str {
    const POINTS: [&str; 16] = [
        "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW",
        "NW", "NNW",
    ];
    POINTS[((degrees as f64 + 11.25) / 22.5) as usize % 16]
}

fn describe_layer(layer: &SkyLayer) -> String {
    let base = layer
        .height_ft
        .map(|h| format!("{} feet", h))
        .unwrap_or_else(|| "unknown height".to_string());

    let mut text = match layer.cover.as_str() {
        "FEW" => format!("a few clouds at {}", base),
        "SCT" => format!("scattered clouds at {}", base),
        "BKN" => format!("broken clouds at {}", base),
        "OVC" => format!("overcast at {}", base),
        "VV" => format!("indefinite ceiling, vertical visibility {}", base),
        "NSC" => "no significant clouds".to_string(),
        "NCD" => "no clouds detected".to_string(),
        "///" => match layer.height_ft {
            Some(h) => format!("clouds of unknown amount at {} feet", h),
            None => "cloud cover not observed".to_string(),
        },
        _ => "clear".to_string(),
    };

    match layer.cloud_type.as_deref() {
        Some("CB") => text.push_str(" (cumulonimbus)"),
        Some("TCU") => text.push_str(" (towering cumulus)"),
        _ => {}
    }
    text
}

impl std::fmt::Display for Metar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "station: {}", self.station)?;

        let kind = if self.report_type == "SPECI" { "special report" } else { "routine report" };
        match self.modifier.as_deref() {
            Some("AUTO") => writeln!(f, "type: {} (automatic report)", kind)?,
            Some("COR") => writeln!(f, "type: {} (corrected report)", kind)?,
            _ => writeln!(f, "type: {}", kind)?,
        }

        if let Some((day, hour, minute)) = self.time {
            writeln!(f, "time: day {:02} at {:02}:{:02} UTC", day, hour, minute)?;
        }
        if let Some(t) = self.temperature {
            writeln!(f, "temperature: {:.1} C", t as f64)?;
        }
        if let Some(d) = self.dewpoint {
            writeln!(f, "dew point: {:.1} C", d as f64)?;
        }

        if let Some(wind) = &self.wind {
            let mut text = if wind.speed == 0 {
                "calm".to_string()
            } else {
                let from = match wind.direction {
                    Some(deg) => compass_point(deg).to_string(),
                    None => "variable".to_string(),
                };
                format!("{} at {} {}", from, wind.speed, wind.unit)
            };
            if let Some(gust) = wind.gust {
                text.push_str(&format!(", gusting to {} {}", gust, wind.unit));
            }
            if let Some((from, to)) = wind.variable_sector {
                text.push_str(&format!(", varying between {} and {} degrees", from, to));
            }
            writeln!(f, "wind: {}", text)?;
        }

        if let Some(vis) = &self.visibility {
            let text = match vis {
                Visibility::Miles { value, qualifier: Some(q) } => format!("{} {} miles", q, value),
                Visibility::Miles { value, qualifier: None } => format!("{} miles", value),
                Visibility::Meters(m) => format!("{} meters", m),
                Visibility::TenKmOrMore => "10 km or more".to_string(),
                Visibility::Cavok => "ceiling and visibility OK".to_string(),
            };
            writeln!(f, "visibility: {}", text)?;
        }

        if !self.runway_visual_range.is_empty() {
            writeln!(f, "runway visual range: {}", self.runway_visual_range.join(", "))?;
        }

        if let Some(p) = self.pressure {
            writeln!(f, "pressure: {:.1} mb ({:.2} inHg)", p.hpa(), p.inhg())?;
        }

        if !self.weather.is_empty() {
            writeln!(f, "weather: {}", self.weather.join("; "))?;
        }

        if !self.sky.is_empty() {
            let layers: Vec<String> = self.sky.iter().map(describe_layer).collect();
            writeln!(f, "sky: {}", layers.join("; "))?;
        }

        if let Some(trend) = &self.trend {
            writeln!(f, "trend: {}", trend)?;
        }

        if let Some(remarks) = &self.remarks {
            let decoded: Vec<String> = remarks
                .split_whitespace()
                .map(|r| match r {
                    "AO1" => "automated station without precipitation sensor".to_string(),
                    "AO2" => "automated station with precipitation sensor".to_string(),
                    other => other.to_string(),
                })
                .collect();
            write!(f, "remarks: {}", decoded.join("; "))?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_mock_report() {
        let metar = MetarDecoder::new()
            .decode("METAR KDFW 091856Z 18010KT 10SM FEW050 25/18 A3012")
            .unwrap();

        assert_eq!(metar.station, "KDFW");
        assert_eq!(metar.time, Some((9, 18, 56)));
        let wind = metar.wind.as_ref().unwrap();
        assert_eq!((wind.direction, wind.speed), (Some(180), 10));
        assert_eq!(metar.temperature, Some(25));
        assert_eq!(metar.dewpoint, Some(18));
        assert_eq!(metar.sky[0].height_ft, Some(5000));

        let text = metar.to_string();
        assert!(text.contains("wind: S at 10 knots"));
        assert!(text.contains("visibility: 10 miles"));
        assert!(text.contains("sky: a few clouds at 5000 feet"));
        assert!(text.contains("30.12 inHg"));
    }

    #[test]
    fn test_decode_low_ifr_with_weather_and_remarks() {
        let text = decode_report(
            "SPECI KORD 121651Z AUTO VRB03G15KT 1 1/2SM R28L/2400FT -TSRA BR OVC004CB M02/M04 A2992 RMK AO2",
        );
        assert!(text.contains("type: special report (automatic report)"), "{}", text);
        assert!(text.contains("wind: variable at 3 knots, gusting to 15 knots"));
        assert!(text.contains("visibility: 1 1/2 miles"));
        assert!(text.contains("light thunderstorm with rain; mist"));
        assert!(text.contains("overcast at 400 feet (cumulonimbus)"));
        assert!(text.contains("temperature: -2.0 C"));
        assert!(text.contains("automated station with precipitation sensor"));
    }

    #[test]
    fn test_decode_icao_style() {
        let metar = MetarDecoder::new()
            .decode("EGLL 121650Z 24012KT 210V270 9999 SCT030 18/11 Q1016 NOSIG")
            .unwrap();
        assert_eq!(metar.report_type, "METAR");
        assert_eq!(metar.visibility, Some(Visibility::TenKmOrMore));
        assert_eq!(metar.wind.unwrap().variable_sector, Some((210, 270)));
        assert_eq!(metar.pressure, Some(Pressure::Hpa(1016.0)));
        assert_eq!(metar.trend.as_deref(), Some("NOSIG"));
    }

    #[test]
    fn test_decode_automated_station_unobserved_groups() {
        let metar = MetarDecoder::new()
            .decode("EDDF 121650Z AUTO 24012KT 9999 // BKN008/// ///015 ////// 18/11 Q1016")
            .unwrap();
        assert_eq!(metar.modifier.as_deref(), Some("AUTO"));
        assert!(metar.weather.is_empty());
        assert_eq!(metar.sky.len(), 3);
        assert_eq!(metar.sky[0].height_ft, Some(800));
        assert_eq!(metar.sky[0].cloud_type, None);
        assert_eq!(metar.sky[1].cover, "///");
        assert_eq!(metar.sky[1].height_ft, Some(1500));
        assert_eq!(metar.sky[2].height_ft, None);

        let text = metar.to_string();
        assert!(text.contains("broken clouds at 800 feet"), "{}", text);
        assert!(text.contains("clouds of unknown amount at 1500 feet"));
        assert!(text.contains("cloud cover not observed"));
        assert!(!text.contains("Error"));
    }

    #[test]
    fn test_decode_unknown_cloud_height() {
        let text = decode_report("EDDF 121650Z AUTO 24012KT 9999 OVC///CB 18/11 Q1016");
        assert!(text.contains("overcast at unknown height (cumulonimbus)"), "{}", text);
    }

    #[test]
    fn test_decode_synthesized_secondary_report() {
        let text = decode_report("METAR KORD 091856Z 00000KT M04/ A2992");
        assert!(text.contains("wind: calm"), "{}", text);
        assert!(text.contains("temperature: -4.0 C"));
        assert!(!text.contains("dew point"));
    }

    #[test]
    fn test_decode_errors_become_text() {
        let text = decode_report("METAR KDFW 091856Z 18010KT GARBAGE 25/18");
        assert!(text.starts_with("Error decoding:"));
        assert!(text.contains("GARBAGE"));

        assert!(decode_report("").starts_with("Error decoding:"));
        assert!(decode_report("OpenWeather: clear sky").starts_with("Error decoding:"));
    }

    #[test]
    fn test_compass_point() {
        assert_eq!(compass_point(0), "N");
        assert_eq!(compass_point(180), "S");
        assert_eq!(compass_point(260), "W");
        assert_eq!(compass_point(350), "N");
    }
}
