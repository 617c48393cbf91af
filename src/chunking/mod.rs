//! Document chunking for retrieval.
//!
//! Splits document pages into overlapping passages and persists them as a
//! line-delimited JSON corpus shared by the vector index and the BM25 baseline.

mod recursive;
mod source;

pub use recursive::RecursiveSplitter;
pub use source::{load_pages, Page};

use crate::error::{FlightLensError, Result};
use serde::{Deserialize, Serialize};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Where a chunk came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    /// Source file name.
    pub source: String,
    /// Zero-based page number, if known.
    pub page: Option<u32>,
}

/// A passage of document text, one line of the corpus file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentChunk {
    pub text: String,
    pub metadata: ChunkMetadata,
}

/// Trait for text splitting implementations.
pub trait TextSplitter: Send + Sync {
    /// Split raw text into passages.
    fn split_text(&self, text: &str) -> Vec<String>;

    /// Split pages into chunks, carrying page metadata onto every chunk.
    fn split_pages(&self, pages: &[Page]) -> Vec<DocumentChunk> {
        pages
            .iter()
            .flat_map(|page| {
                self.split_text(&page.text)
                    .into_iter()
                    .map(move |text| DocumentChunk {
                        text,
                        metadata: ChunkMetadata {
                            source: page.source.clone(),
                            page: Some(page.number),
                        },
                    })
            })
            .collect()
    }
}

/// Read a JSONL chunk corpus. Blank lines are skipped.
pub fn read_chunks(path: &Path) -> Result<Vec<DocumentChunk>> {
    let file = std::fs::File::open(path)?;
    let reader = BufReader::new(file);
    let mut chunks = Vec::new();

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let chunk: DocumentChunk = serde_json::from_str(&line).map_err(|e| {
            FlightLensError::Ingest(format!("{}:{}: {}", path.display(), i + 1, e))
        })?;
        chunks.push(chunk);
    }

    Ok(chunks)
}

/// Write chunks as JSONL, replacing any existing file.
pub fn write_chunks(path: &Path, chunks: &[DocumentChunk]) -> Result<usize> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = BufWriter::new(std::fs::File::create(path)?);
    for chunk in chunks {
        serde_json::to_writer(&mut writer, chunk)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;

    Ok(chunks.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jsonl_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("processed").join("chunks.jsonl");

        let chunks = vec![
            DocumentChunk {
                text: "CHECKLIST Before Landing".to_string(),
                metadata: ChunkMetadata { source: "c172.txt".to_string(), page: Some(4) },
            },
            DocumentChunk {
                text: "91.119 Minimum safe altitudes".to_string(),
                metadata: ChunkMetadata { source: "far.txt".to_string(), page: None },
            },
        ];

        assert_eq!(write_chunks(&path, &chunks).unwrap(), 2);

        let raw = std::fs::read_to_string(&path).unwrap();
        let first: serde_json::Value = serde_json::from_str(raw.lines().next().unwrap()).unwrap();
        assert_eq!(first["metadata"]["source"], "c172.txt");
        assert_eq!(first["metadata"]["page"], 4);

        assert_eq!(read_chunks(&path).unwrap(), chunks);
    }

    #[test]
    fn test_read_skips_blank_and_reports_bad_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chunks.jsonl");
        std::fs::write(
            &path,
            "{\"text\":\"a\",\"metadata\":{\"source\":\"x\",\"page\":0}}\n\n{not json}\n",
        )
        .unwrap();

        let err = read_chunks(&path).unwrap_err().to_string();
        assert!(err.contains(":3:"), "{}", err);
    }

    #[test]
    fn test_split_pages_keeps_metadata() {
        let splitter = RecursiveSplitter::new(40, 0, vec![" ".to_string()]).unwrap();
        let pages = vec![Page {
            source: "poh.txt".to_string(),
            number: 2,
            text: "Airspeed 65 KIAS. Mixture rich. Carburetor heat on. Fuel selector both.".to_string(),
        }];

        let chunks = splitter.split_pages(&pages);
        assert!(chunks.len() >= 2);
        assert!(chunks.iter().all(|c| c.metadata.page == Some(2) && c.metadata.source == "poh.txt"));
    }
}
