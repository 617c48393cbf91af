//! Pre-flight checks before expensive operations.
//!
//! Validates that keys and data files are in place before starting work
//! that would otherwise fail midway.

use crate::config::Settings;
use crate::error::{FlightLensError, Result};

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Needs the raw document directory.
    Ingest,
    /// Needs an API key and the chunk corpus.
    Index,
    /// Needs an API key for embeddings and chat.
    Ask,
    /// Needs an API key for query embeddings.
    Search,
    /// The baseline needs the corpus; the RAG side also needs a key.
    Eval { rag: bool, baseline: bool },
}

/// Run pre-flight checks for the given operation.
pub fn check(operation: Operation, settings: &Settings) -> Result<()> {
    match operation {
        Operation::Ingest => check_exists(&settings.raw_dir(), "Document directory")?,
        Operation::Index => {
            check_api_key()?;
            check_exists(&settings.chunks_file(), "Chunk corpus")?;
        }
        Operation::Ask | Operation::Search => check_api_key()?,
        Operation::Eval { rag, baseline } => {
            if rag {
                check_api_key()?;
            }
            if baseline {
                check_exists(&settings.chunks_file(), "Chunk corpus")?;
            }
        }
    }
    Ok(())
}

fn check_api_key() -> Result<()> {
    match std::env::var("OPENAI_API_KEY") {
        Ok(key) if !key.trim().is_empty() => Ok(()),
        Ok(_) => Err(FlightLensError::Config(
            "OPENAI_API_KEY is empty. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        )),
        Err(_) => Err(FlightLensError::Config(
            "OPENAI_API_KEY not set. Set it with: export OPENAI_API_KEY='sk-...' or add it to .env"
                .to_string(),
        )),
    }
}

fn check_exists(path: &std::path::Path, what: &str) -> Result<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(FlightLensError::NotFound(format!("{} {}", what, path.display())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_corpus_fails_baseline_check() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = Settings::default();
        settings.paths.chunks_file = dir.path().join("chunks.jsonl").to_string_lossy().to_string();

        let result = check(Operation::Eval { rag: false, baseline: true }, &settings);
        assert!(matches!(result, Err(FlightLensError::NotFound(_))));

        std::fs::write(dir.path().join("chunks.jsonl"), "").unwrap();
        assert!(check(Operation::Eval { rag: false, baseline: true }, &settings).is_ok());
    }

    #[test]
    fn test_ingest_requires_raw_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = Settings::default();
        settings.paths.raw_dir = dir.path().join("missing").to_string_lossy().to_string();
        assert!(check(Operation::Ingest, &settings).is_err());

        settings.paths.raw_dir = dir.path().to_string_lossy().to_string();
        assert!(check(Operation::Ingest, &settings).is_ok());
    }
}
