//! Loading text renderings of source documents.

use crate::error::{FlightLensError, Result};
use std::path::Path;
use tracing::debug;

/// Page separator emitted by text extractors such as `pdftotext`.
const PAGE_BREAK: char = '\x0c';

/// One page of a source document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// File name of the document.
    pub source: String,
    /// Zero-based page number.
    pub number: u32,
    pub text: String,
}

fn is_document(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| matches!(e.to_lowercase().as_str(), "txt" | "md"))
        .unwrap_or(false)
}

/// Load every `.txt`/`.md` document in `dir`, split into pages.
///
/// Files are visited in name order so chunk order is reproducible.
pub fn load_pages(dir: &Path) -> Result<Vec<Page>> {
    if !dir.is_dir() {
        return Err(FlightLensError::NotFound(format!(
            "Document directory not found: {}",
            dir.display()
        )));
    }

    let mut paths: Vec<_> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && is_document(p))
        .collect();
    paths.sort();

    let mut pages = Vec::new();
    for path in paths {
        let source = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let content = std::fs::read_to_string(&path)?;

        let before = pages.len();
        pages.extend(content.split(PAGE_BREAK).enumerate().map(|(i, text)| Page {
            source: source.clone(),
            number: i as u32,
            text: text.to_string(),
        }));
        debug!("Loaded {} pages from {}", pages.len() - before, source);
    }

    Ok(pages)
}
