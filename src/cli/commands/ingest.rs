//! Ingest command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::ingest_documents;
use anyhow::Result;

/// Run the ingest command.
pub fn run_ingest(dir: Option<&str>, mut settings: Settings) -> Result<()> {
    if let Some(dir) = dir {
        settings.paths.raw_dir = dir.to_string();
    }

    if let Err(e) = preflight::check(Operation::Ingest, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Put .txt or .md renderings of your manuals there, or pass --dir.");
        return Err(e.into());
    }

    let result = ingest_documents(&settings)?;

    Output::success(&format!(
        "Split {} documents ({} pages) into {} chunks",
        result.documents, result.pages, result.chunks
    ));
    Output::kv("Corpus", &result.chunks_file.display().to_string());
    Output::info("Next: flightlens index");

    Ok(())
}
