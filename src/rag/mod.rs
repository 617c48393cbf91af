//! Retrieval-augmented answering over the indexed manuals.
//!
//! [`RagEngine`] retrieves manual chunks for a question and asks a chat model
//! to answer from them. Anything that turns a question into an answer string
//! implements [`AnswerProducer`], which is what the evaluation runner drives.

pub mod context;
mod response;

pub use context::ContextBuilder;
pub use response::{select_prompt, FlightContext, RagEngine, RagResponse, NO_CONTEXT_ANSWER};

use crate::error::Result;
use crate::vector_store::SearchResult;
use async_trait::async_trait;

/// Characters of chunk text shown in source previews.
pub const PREVIEW_CHARS: usize = 300;

/// Something that answers free-text questions.
#[async_trait]
pub trait AnswerProducer: Send + Sync {
    /// Short system name used in logs and reports, e.g. "rag" or "bm25".
    fn name(&self) -> &str;

    async fn answer(&self, question: &str) -> Result<String>;
}

/// A retrieved chunk prepared for prompting and display.
#[derive(Debug, Clone)]
pub struct ContextChunk {
    pub source: String,
    pub page: Option<u32>,
    pub content: String,
    pub score: f32,
}

impl ContextChunk {
    pub fn citation(&self) -> String {
        match self.page {
            Some(page) => format!("{} p.{}", self.source, page),
            None => self.source.clone(),
        }
    }

    /// Content cut to [`PREVIEW_CHARS`] characters, with an ellipsis when cut.
    pub fn preview(&self) -> String {
        truncate_chars(&self.content, PREVIEW_CHARS)
    }
}

impl From<SearchResult> for ContextChunk {
    fn from(result: SearchResult) -> Self {
        Self {
            source: result.document.source,
            page: result.document.page,
            content: result.document.content,
            score: result.score,
        }
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector_store::Document;

    #[test]
    fn test_context_chunk_from_search_result() {
        let result = SearchResult {
            document: Document::new("poh.txt".to_string(), Some(2), "Flaps 10".to_string(), vec![], 0),
            score: 0.8,
        };
        let chunk = ContextChunk::from(result);
        assert_eq!(chunk.citation(), "poh.txt p.2");
        assert_eq!(chunk.preview(), "Flaps 10");
    }

    #[test]
    fn test_preview_truncates_on_char_boundary() {
        let chunk = ContextChunk {
            source: "a".to_string(),
            page: None,
            content: "°".repeat(400),
            score: 0.0,
        };
        let preview = chunk.preview();
        assert!(preview.ends_with("..."));
        assert_eq!(preview.chars().count(), PREVIEW_CHARS + 3);
    }
}
