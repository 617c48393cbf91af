//! Context retrieval for RAG prompts.

use super::ContextChunk;
use crate::embedding::Embedder;
use crate::error::Result;
use crate::vector_store::{SearchResult, VectorStore};
use std::sync::Arc;
use tracing::debug;

/// Embeds a question and pulls the closest manual chunks.
pub struct ContextBuilder {
    vector_store: Arc<dyn VectorStore>,
    embedder: Arc<dyn Embedder>,
    max_chunks: usize,
    min_score: f32,
}

impl ContextBuilder {
    pub fn new(vector_store: Arc<dyn VectorStore>, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            vector_store,
            embedder,
            max_chunks: 3,
            min_score: 0.2,
        }
    }

    pub fn with_max_chunks(mut self, max_chunks: usize) -> Self {
        self.max_chunks = max_chunks;
        self
    }

    pub fn with_min_score(mut self, min_score: f32) -> Self {
        self.min_score = min_score;
        self
    }

    /// Retrieve context for a question, best match first.
    pub async fn build(&self, query: &str) -> Result<Vec<ContextChunk>> {
        let query_embedding = self.embedder.embed(query).await?;

        let results = self
            .vector_store
            .search_with_threshold(&query_embedding, self.max_chunks, self.min_score)
            .await?;

        debug!("Retrieved {} context chunks", results.len());
        Ok(Self::from_results(results))
    }

    pub fn from_results(results: Vec<SearchResult>) -> Vec<ContextChunk> {
        results.into_iter().map(ContextChunk::from).collect()
    }
}

/// Number and cite each chunk for the model.
pub fn format_context_for_prompt(chunks: &[ContextChunk]) -> String {
    chunks
        .iter()
        .enumerate()
        .map(|(i, chunk)| format!("[{}] {}\n{}", i + 1, chunk.citation(), chunk.content))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// One line per chunk with its citation and score, followed by a preview.
pub fn format_context_for_display(chunks: &[ContextChunk]) -> String {
    chunks
        .iter()
        .map(|chunk| {
            format!(
                "{} (score: {:.2})\n  {}",
                chunk.citation(),
                chunk.score,
                chunk.preview().replace('\n', " ")
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector_store::{Document, MemoryVectorStore};
    use async_trait::async_trait;

    /// Embeds "fire" questions along one axis and everything else along another.
    struct AxisEmbedder;

    #[async_trait]
    impl Embedder for AxisEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            Ok(if text.to_lowercase().contains("fire") { vec![1.0, 0.0] } else { vec![0.0, 1.0] })
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            let mut out = Vec::new();
            for text in texts {
                out.push(self.embed(text).await?);
            }
            Ok(out)
        }

        fn dimensions(&self) -> usize {
            2
        }
    }

    #[tokio::test]
    async fn test_build_filters_by_score() {
        let store = Arc::new(MemoryVectorStore::new());
        store
            .upsert_batch(&[
                Document::new("poh.txt".to_string(), Some(3), "Engine fire checklist".to_string(), vec![1.0, 0.0], 0),
                Document::new("poh.txt".to_string(), Some(5), "Crosswind landing".to_string(), vec![0.0, 1.0], 1),
            ])
            .await
            .unwrap();

        let builder = ContextBuilder::new(store, Arc::new(AxisEmbedder)).with_max_chunks(5);
        let chunks = builder.build("What do I do for an engine fire?").await.unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].citation(), "poh.txt p.3");

        let prompt = format_context_for_prompt(&chunks);
        assert_eq!(prompt, "[1] poh.txt p.3\nEngine fire checklist");
    }
}
