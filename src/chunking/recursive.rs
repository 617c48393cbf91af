//! Recursive character splitting.
//!
//! Splits on the first separator present in the text, greedily merges the
//! pieces up to `chunk_size` characters with `chunk_overlap` characters of
//! carried context, and recurses with the next separator on pieces that are
//! still too large. Separators stay attached to the piece that follows them,
//! so a `CHECKLIST` heading starts its chunk.

use super::TextSplitter;
use crate::error::{FlightLensError, Result};
use std::collections::VecDeque;

/// Separator-aware splitter with overlap.
#[derive(Debug, Clone)]
pub struct RecursiveSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
    separators: Vec<String>,
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

impl RecursiveSplitter {
    /// Create a splitter. Overlap must be smaller than the chunk size.
    pub fn new(chunk_size: usize, chunk_overlap: usize, separators: Vec<String>) -> Result<Self> {
        if chunk_size == 0 {
            return Err(FlightLensError::Config("chunk_size must be positive".to_string()));
        }
        if chunk_overlap >= chunk_size {
            return Err(FlightLensError::Config(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                chunk_overlap, chunk_size
            )));
        }
        Ok(Self {
            chunk_size,
            chunk_overlap,
            separators,
        })
    }

    /// Create a splitter from chunking settings.
    pub fn from_settings(settings: &crate::config::ChunkingSettings) -> Result<Self> {
        Self::new(settings.chunk_size, settings.chunk_overlap, settings.separators.clone())
    }

    fn split_recursive(&self, text: &str, separators: &[String]) -> Vec<String> {
        let mut separator = separators.last().map(String::as_str).unwrap_or("");
        let mut remaining: &[String] = &[];

        for (i, sep) in separators.iter().enumerate() {
            if sep.is_empty() {
                separator = "";
                break;
            }
            if text.contains(sep.as_str()) {
                separator = sep;
                remaining = &separators[i + 1..];
                break;
            }
        }

        let mut chunks = Vec::new();
        let mut fitting: Vec<String> = Vec::new();

        for piece in split_keeping_separator(text, separator) {
            if char_len(&piece) < self.chunk_size {
                fitting.push(piece);
                continue;
            }

            if !fitting.is_empty() {
                chunks.extend(self.merge(&fitting));
                fitting.clear();
            }
            if remaining.is_empty() {
                let piece = piece.trim();
                if !piece.is_empty() {
                    chunks.push(piece.to_string());
                }
            } else {
                chunks.extend(self.split_recursive(&piece, remaining));
            }
        }

        if !fitting.is_empty() {
            chunks.extend(self.merge(&fitting));
        }

        chunks
    }

    /// Greedily join pieces into chunks, carrying trailing pieces as overlap.
    fn merge(&self, pieces: &[String]) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut current: VecDeque<&str> = VecDeque::new();
        let mut total = 0usize;

        for piece in pieces {
            let len = char_len(piece);

            if total + len > self.chunk_size && !current.is_empty() {
                push_joined(&mut chunks, &current);

                while total > self.chunk_overlap || (total + len > self.chunk_size && total > 0) {
                    match current.pop_front() {
                        Some(front) => total -= char_len(front),
                        None => break,
                    }
                }
            }

            current.push_back(piece);
            total += len;
        }

        push_joined(&mut chunks, &current);
        chunks
    }
}

fn push_joined(chunks: &mut Vec<String>, pieces: &VecDeque<&str>) {
    let joined: String = pieces.iter().copied().collect();
    let trimmed = joined.trim();
    if !trimmed.is_empty() {
        chunks.push(trimmed.to_string());
    }
}

/// Split `text` before every occurrence of `separator`.
///
/// An empty separator splits into characters.
fn split_keeping_separator(text: &str, separator: &str) -> Vec<String> {
    if separator.is_empty() {
        return text.chars().map(|c| c.to_string()).collect();
    }

    let mut pieces = Vec::new();
    let mut start = 0;
    for (idx, _) in text.match_indices(separator) {
        if idx > start {
            pieces.push(text[start..idx].to_string());
        }
        start = idx;
    }
    if start < text.len() {
        pieces.push(text[start..].to_string());
    }

    pieces.retain(|p| !p.is_empty());
    pieces
}

impl TextSplitter for RecursiveSplitter {
    fn split_text(&self, text: &str) -> Vec<String> {
        self.split_recursive(text, &self.separators)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ChunkingSettings;

    fn words(n: usize) -> String {
        (0..n).map(|i| format!("w{:03}", i)).collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn test_rejects_overlap_not_smaller_than_size() {
        assert!(RecursiveSplitter::new(100, 100, vec![]).is_err());
        assert!(RecursiveSplitter::new(0, 0, vec![]).is_err());
        assert!(RecursiveSplitter::from_settings(&ChunkingSettings::default()).is_ok());
    }

    #[test]
    fn test_short_text_is_one_chunk() {
        let splitter = RecursiveSplitter::from_settings(&ChunkingSettings::default()).unwrap();
        let chunks = splitter.split_text("  Fuel selector - BOTH  ");
        assert_eq!(chunks, vec!["Fuel selector - BOTH"]);
        assert!(splitter.split_text("   \n  ").is_empty());
    }

    #[test]
    fn test_chunks_respect_size_and_overlap() {
        let splitter = RecursiveSplitter::new(50, 20, vec![" ".to_string()]).unwrap();
        let text = words(40);
        let chunks = splitter.split_text(&text);

        assert!(chunks.len() > 1);
        for c in &chunks {
            assert!(c.chars().count() <= 50, "{:?}", c);
        }
        // Consecutive chunks share trailing words
        let last_word = chunks[0].split(' ').last().unwrap();
        assert!(chunks[1].contains(last_word));
        // Nothing is lost
        assert!(chunks.last().unwrap().ends_with("w039"));
    }

    #[test]
    fn test_heading_separator_starts_chunk() {
        let splitter = RecursiveSplitter::from_settings(&ChunkingSettings {
            chunk_size: 60,
            chunk_overlap: 0,
            ..ChunkingSettings::default()
        })
        .unwrap();

        let text = "Intro text about the airplane.\nCHECKLIST Engine fire: mixture cutoff\nCHECKLIST Smoke: vents open";
        let chunks = splitter.split_text(text);
        assert_eq!(chunks.len(), 3);
        assert!(chunks[1].starts_with("CHECKLIST Engine fire"));
        assert!(chunks[2].starts_with("CHECKLIST Smoke"));
    }

    #[test]
    fn test_split_keeping_separator() {
        assert_eq!(split_keeping_separator("a b c", " "), vec!["a", " b", " c"]);
        assert_eq!(split_keeping_separator("\n\nx", "\n\n"), vec!["\n\nx"]);
        assert_eq!(split_keeping_separator("ab", ""), vec!["a", "b"]);
    }
}
