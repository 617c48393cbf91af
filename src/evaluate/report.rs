//! Evaluation run artifacts.
//!
//! Each run writes timestamped JSON and CSV record files plus a summary
//! comparing the RAG pipeline against the BM25 baseline.

use super::metrics::Summary;
use super::runner::{summarize_records, ScoredRecord};
use crate::error::Result;
use chrono::Local;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

/// Summary file contents.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub rag: Summary,
    pub bm25: Summary,
    pub total_questions: usize,
}

impl RunSummary {
    /// Summarize both record sets.
    pub fn from_records(rag: &[ScoredRecord], bm25: &[ScoredRecord]) -> Self {
        Self {
            rag: summarize_records(rag),
            bm25: summarize_records(bm25),
            total_questions: rag.len().max(bm25.len()),
        }
    }
}

/// Paths written for one run.
#[derive(Debug, Clone)]
pub struct RunArtifacts {
    pub timestamp: String,
    pub files: Vec<PathBuf>,
    pub summary: RunSummary,
}

/// Write all artifacts for a run under `output_dir`.
pub fn save_run(output_dir: &Path, rag: &[ScoredRecord], bm25: &[ScoredRecord]) -> Result<RunArtifacts> {
    let timestamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
    save_run_with_timestamp(output_dir, &timestamp, rag, bm25)
}

/// Write all artifacts using a caller-supplied timestamp.
pub fn save_run_with_timestamp(
    output_dir: &Path,
    timestamp: &str,
    rag: &[ScoredRecord],
    bm25: &[ScoredRecord],
) -> Result<RunArtifacts> {
    std::fs::create_dir_all(output_dir)?;
    let mut files = Vec::with_capacity(5);

    for (name, records) in [("rag", rag), ("bm25", bm25)] {
        let json_path = output_dir.join(format!("{}_results_{}.json", name, timestamp));
        std::fs::write(&json_path, serde_json::to_string_pretty(records)?)?;
        files.push(json_path);

        let csv_path = output_dir.join(format!("{}_results_{}.csv", name, timestamp));
        write_csv(&csv_path, records)?;
        files.push(csv_path);
    }

    let summary = RunSummary::from_records(rag, bm25);
    let summary_path = output_dir.join(format!("summary_{}.json", timestamp));
    std::fs::write(&summary_path, serde_json::to_string_pretty(&summary)?)?;
    files.push(summary_path);

    info!("Wrote {} evaluation artifacts to {:?}", files.len(), output_dir);

    Ok(RunArtifacts {
        timestamp: timestamp.to_string(),
        files,
        summary,
    })
}

/// Write records as CSV with a header row.
///
/// The header is written even when there are no records.
pub fn write_csv(path: &Path, records: &[ScoredRecord]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;
    writer.write_record(ScoredRecord::FIELDS)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}
