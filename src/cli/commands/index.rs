//! Index command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::Result;

/// Run the index command.
pub async fn run_index(settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Index, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'flightlens ingest' first, and 'flightlens doctor' for diagnostics.");
        return Err(e.into());
    }

    let orchestrator = Orchestrator::new(settings)?;

    let spinner = Output::spinner("Embedding chunks...");
    let result = orchestrator.index().await;
    spinner.finish_and_clear();

    let result = result?;
    Output::success(&format!(
        "Indexed {} chunks from {} documents",
        result.chunks_indexed, result.sources
    ));

    Ok(())
}
