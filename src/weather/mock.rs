//! Static fallback reports.

/// Known stations with canned reports.
const MOCK_REPORTS: &[(&str, &str)] = &[
    ("KDFW", "METAR KDFW 091856Z 18010KT 10SM FEW050 25/18 A3012"),
    ("KLAX", "METAR KLAX 091853Z 26008KT 10SM SCT015 22/20 A2990"),
];

/// Canned report for a station; unknown stations get a synthesized one.
///
/// Always returns a non-empty report naming the station.
pub fn mock_report(station: &str) -> String {
    MOCK_REPORTS
        .iter()
        .find(|(code, _)| *code == station)
        .map(|(_, raw)| raw.to_string())
        .unwrap_or_else(|| format!("METAR {} 091856Z 18010KT 10SM SKC 25/18 A3012", station))
}
