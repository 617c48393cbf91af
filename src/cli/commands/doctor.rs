//! Doctor command - verify keys, data files and configuration.

use crate::cli::Output;
use crate::config::Settings;
use console::style;
use std::path::Path;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

fn print_section(title: &str, checks: &[CheckResult]) {
    println!("{}", style(title).bold());
    for check in checks {
        check.print();
    }
    println!();
}

/// Run all diagnostic checks.
pub fn run_doctor(settings: &Settings) -> anyhow::Result<()> {
    Output::header("FlightLens Doctor");
    println!();

    let api = vec![
        check_openai_api_key(std::env::var("OPENAI_API_KEY").ok().as_deref()),
        check_weather_key(settings),
    ];
    print_section("API Configuration", &api);

    let data = check_data_files(settings);
    print_section("Data", &data);

    let config = vec![check_config_file()];
    print_section("Configuration", &config);

    let checks: Vec<&CheckResult> = api.iter().chain(&data).chain(&config).collect();
    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!("{} error(s) found. Fix them before asking questions.", errors));
        std::process::exit(1);
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! FlightLens is ready.");
    }

    Ok(())
}

/// First seven and last four characters of a key.
fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    let head: String = chars.iter().take(7).collect();
    let tail: String = chars[chars.len().saturating_sub(4)..].iter().collect();
    format!("{}...{}", head, tail)
}

fn check_openai_api_key(key: Option<&str>) -> CheckResult {
    match key {
        Some(key) if key.starts_with("sk-") && key.chars().count() > 20 => {
            CheckResult::ok("OPENAI_API_KEY", &format!("configured ({})", mask_key(key)))
        }
        Some(key) if key.trim().is_empty() => CheckResult::error(
            "OPENAI_API_KEY",
            "empty",
            "Set with: export OPENAI_API_KEY='sk-...' or add it to .env",
        ),
        Some(_) => CheckResult::warning(
            "OPENAI_API_KEY",
            "set but format looks unusual",
            "Expected format: sk-...",
        ),
        None => CheckResult::error(
            "OPENAI_API_KEY",
            "not set",
            "Set with: export OPENAI_API_KEY='sk-...' or add it to .env",
        ),
    }
}

fn check_weather_key(settings: &Settings) -> CheckResult {
    match settings.weather.weatherapi_key() {
        Some(_) => CheckResult::ok("WEATHERAPI_KEY", "configured, secondary provider enabled"),
        None => CheckResult::warning(
            "WEATHERAPI_KEY",
            "not set, secondary weather provider disabled",
            "Optional. Reports fall back to mock data if the primary service is down",
        ),
    }
}

fn check_data_files(settings: &Settings) -> Vec<CheckResult> {
    let mut results = Vec::new();

    let raw_dir = settings.raw_dir();
    match count_documents(&raw_dir) {
        Some(0) => results.push(CheckResult::warning(
            "Documents",
            &format!("{} (no .txt/.md files)", raw_dir.display()),
            "Add text renderings of your manuals, then run: flightlens ingest",
        )),
        Some(n) => results.push(CheckResult::ok(
            "Documents",
            &format!("{} ({} files)", raw_dir.display(), n),
        )),
        None => results.push(CheckResult::warning(
            "Documents",
            &format!("{} (missing)", raw_dir.display()),
            "Create with: flightlens init",
        )),
    }

    let chunks_file = settings.chunks_file();
    results.push(match file_size(&chunks_file) {
        Some(size) => CheckResult::ok(
            "Chunk corpus",
            &format!("{} ({})", chunks_file.display(), format_size(size)),
        ),
        None => CheckResult::warning(
            "Chunk corpus",
            &format!("{} (not created yet)", chunks_file.display()),
            "Create with: flightlens ingest",
        ),
    });

    let db_path = settings.sqlite_path();
    results.push(match file_size(&db_path) {
        Some(size) => CheckResult::ok("Index", &format!("{} ({})", db_path.display(), format_size(size))),
        None => CheckResult::warning(
            "Index",
            &format!("{} (not created yet)", db_path.display()),
            "Create with: flightlens index",
        ),
    });

    results
}

fn check_config_file() -> CheckResult {
    let config_path = Settings::default_config_path();
    if config_path.exists() {
        CheckResult::ok("Config file", &format!("{}", config_path.display()))
    } else {
        CheckResult::warning(
            "Config file",
            "using defaults",
            "Create with: flightlens init (or flightlens config edit)",
        )
    }
}

fn count_documents(dir: &Path) -> Option<usize> {
    let entries = std::fs::read_dir(dir).ok()?;
    Some(
        entries
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.path()
                    .extension()
                    .and_then(|x| x.to_str())
                    .map(|x| matches!(x.to_lowercase().as_str(), "txt" | "md"))
                    .unwrap_or(false)
            })
            .count(),
    )
}

fn file_size(path: &Path) -> Option<u64> {
    std::fs::metadata(path).ok().map(|m| m.len())
}

/// Format file size in human-readable format.
fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_result_error() {
        let result = CheckResult::error("test", "failed", "fix it");
        assert_eq!(result.status, CheckStatus::Error);
        assert_eq!(result.hint, Some("fix it".to_string()));
    }

    #[test]
    fn test_openai_key_checks() {
        assert_eq!(check_openai_api_key(None).status, CheckStatus::Error);
        assert_eq!(check_openai_api_key(Some("  ")).status, CheckStatus::Error);
        assert_eq!(check_openai_api_key(Some("abc")).status, CheckStatus::Warning);

        let ok = check_openai_api_key(Some("sk-proj-abcdefghijklmnopqrstuvwxyz1234"));
        assert_eq!(ok.status, CheckStatus::Ok);
        assert!(ok.message.contains("sk-proj...1234"));
    }

    #[test]
    fn test_key_mask_respects_char_boundaries() {
        let key = "sk-é€ñøabcdefghijklmnopqrstuv€xyz";
        let result = check_openai_api_key(Some(key));
        assert_eq!(result.status, CheckStatus::Ok);
        assert!(result.message.contains("sk-é€ñø...€xyz"), "{}", result.message);

        assert_eq!(mask_key("sk-"), "sk-...sk-");
    }

    #[test]
    fn test_data_checks_on_empty_layout() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = Settings::default();
        settings.paths.raw_dir = dir.path().join("raw").to_string_lossy().to_string();
        settings.paths.chunks_file = dir.path().join("chunks.jsonl").to_string_lossy().to_string();
        settings.vector_store.sqlite_path = dir.path().join("index.db").to_string_lossy().to_string();

        let checks = check_data_files(&settings);
        assert_eq!(checks.len(), 3);
        assert!(checks.iter().all(|c| c.status == CheckStatus::Warning));

        std::fs::create_dir_all(dir.path().join("raw")).unwrap();
        std::fs::write(dir.path().join("raw/poh.txt"), "text").unwrap();
        std::fs::write(dir.path().join("raw/scan.pdf"), "bin").unwrap();
        assert_eq!(count_documents(&dir.path().join("raw")), Some(1));
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(500), "500 B");
        assert_eq!(format_size(1024), "1.0 KB");
        assert_eq!(format_size(1024 * 1024), "1.0 MB");
    }
}
