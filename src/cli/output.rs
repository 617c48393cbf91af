//! CLI output formatting utilities.

use crate::evaluate::Summary;
use crate::weather::WeatherReport;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Output helper for CLI formatting.
pub struct Output;

impl Output {
    pub fn info(msg: &str) {
        println!("{} {}", style(">>").cyan().bold(), msg);
    }

    pub fn success(msg: &str) {
        println!("{} {}", style(">>").green().bold(), msg);
    }

    pub fn warning(msg: &str) {
        eprintln!("{} {}", style(">>").yellow().bold(), msg);
    }

    pub fn error(msg: &str) {
        eprintln!("{} {}", style(">>").red().bold(), msg);
    }

    pub fn header(msg: &str) {
        println!("\n{}", style(msg).bold().underlined());
    }

    pub fn kv(key: &str, value: &str) {
        println!("  {}: {}", style(key).dim(), value);
    }

    pub fn list_item(msg: &str) {
        println!("  {} {}", style("*").cyan(), msg);
    }

    /// One indexed document.
    pub fn source_info(source: &str, chunks: u32, pages: u32) {
        println!(
            "  {} {} ({} chunks, {} pages)",
            style("*").cyan(),
            style(source).bold(),
            chunks,
            pages
        );
    }

    /// One stored chunk, numbered by its position in the document.
    pub fn chunk(order: u32, citation: &str, content: &str) {
        println!("\n{} {}", style(format!("#{}", order)).cyan(), style(citation).bold());
        println!("   {}", content_preview(content, 200));
    }

    pub fn search_result(citation: &str, score: f32, content: &str) {
        println!(
            "\n{} {} (score: {:.2})",
            style(">>").green(),
            style(citation).bold(),
            score
        );
        println!("   {}", content_preview(content, 200));
    }

    /// Raw report with a provenance tag; mock data is flagged.
    pub fn weather_report(report: &WeatherReport) {
        let tag = if report.is_live() {
            style(format!("[{}]", report.source)).green()
        } else {
            style(format!("[{}, not live]", report.source)).yellow()
        };
        println!("{} {}", tag, report.raw);
    }

    /// Summary line for one evaluated system.
    pub fn summary(system: &str, summary: &Summary) {
        println!(
            "  {:<6} F1 {:.3}  exact {:.3}  length ratio {:.3}",
            style(system).bold(),
            summary.f1,
            summary.exact_match,
            summary.length_ratio
        );
    }

    pub fn progress_bar(len: u64, msg: &str) -> ProgressBar {
        let pb = ProgressBar::new(len);
        if let Ok(bar) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            pb.set_style(bar.progress_chars("#>-"));
        }
        pb.set_message(msg.to_string());
        pb
    }

    pub fn spinner(msg: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        if let Ok(spinner) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            pb.set_style(spinner);
        }
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    }
}

/// Single-line preview, cut on a char boundary.
fn content_preview(content: &str, max_chars: usize) -> String {
    let content = content.replace('\n', " ");
    match content.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &content[..idx]),
        None => content,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_preview() {
        assert_eq!(content_preview("short\ntext", 20), "short text");
        assert_eq!(content_preview("abcdef", 3), "abc...");
        assert_eq!(content_preview("°°°°", 2), "°°...");
    }
}
