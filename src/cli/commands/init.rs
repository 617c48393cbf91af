//! Init command - first-run setup.

use crate::cli::Output;
use crate::config::Settings;
use console::style;
use std::io::{self, Write};
use std::path::PathBuf;

/// Directories the pipeline reads from and writes to.
fn required_dirs(settings: &Settings) -> Vec<(&'static str, PathBuf)> {
    let mut dirs = vec![
        ("Data directory", settings.data_dir()),
        ("Documents", settings.raw_dir()),
        ("Results", settings.results_dir()),
    ];
    if let Some(parent) = settings.chunks_file().parent() {
        dirs.push(("Processed chunks", parent.to_path_buf()));
    }
    dirs
}

/// Run the init command for first-time setup.
pub fn run_init(settings: &Settings) -> anyhow::Result<()> {
    Output::header("FlightLens Setup");
    println!();

    println!("{}", style("Step 1: API configuration").bold().cyan());
    println!();

    if crate::openai::api_key_present() {
        Output::success("OpenAI API key is configured.");
    } else {
        Output::warning("OPENAI_API_KEY is not set.");
        println!("  Indexing and answering need an OpenAI key. The BM25 baseline and weather work without one.");
        println!("  Add it to your shell or a .env file: {}", style("OPENAI_API_KEY=sk-...").green());
    }

    if settings.weather.weatherapi_key().is_none() {
        Output::info("WEATHERAPI_KEY not set; the secondary weather provider stays disabled.");
    }

    println!();
    println!("{}", style("Step 2: Directories").bold().cyan());
    println!();

    for (label, dir) in required_dirs(settings) {
        if dir.exists() {
            Output::info(&format!("{} exists: {}", label, dir.display()));
        } else {
            std::fs::create_dir_all(&dir)?;
            Output::success(&format!("Created {}: {}", label.to_lowercase(), dir.display()));
        }
    }

    println!();
    println!("{}", style("Step 3: Configuration file").bold().cyan());
    println!();

    let config_path = Settings::default_config_path();
    if config_path.exists() {
        Output::info(&format!("Config file exists: {}", config_path.display()));
    } else if prompt_continue("Create default configuration file?")? {
        settings.save_to(&config_path)?;
        Output::success(&format!("Created config file: {}", config_path.display()));
    } else {
        Output::info("Skipped config file creation. Using defaults.");
    }

    println!();
    println!("{}", style("Setup Complete!").bold().green());
    println!();
    println!("Next steps:");
    println!("  {} Put manual text files in {}", style("1.").cyan(), settings.raw_dir().display());
    println!("  {} Split them into chunks", style("flightlens ingest").cyan());
    println!("  {} Build the search index", style("flightlens index").cyan());
    println!("  {} Ask a question", style("flightlens ask \"<question>\"").cyan());

    Ok(())
}

/// Prompt user for yes/no confirmation.
fn prompt_continue(message: &str) -> io::Result<bool> {
    print!("{} {} ", style("?").cyan(), message);
    print!("{} ", style("[y/N]").dim());
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    let answer = input.trim().to_lowercase();
    Ok(answer == "y" || answer == "yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_dirs_cover_pipeline_paths() {
        let settings = Settings::default();
        let dirs = required_dirs(&settings);
        let paths: Vec<&PathBuf> = dirs.iter().map(|(_, p)| p).collect();

        assert!(paths.contains(&&settings.raw_dir()));
        assert!(paths.contains(&&settings.results_dir()));
        assert!(dirs.iter().any(|(label, _)| *label == "Processed chunks"));
    }
}
