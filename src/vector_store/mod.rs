//! Vector store for embedded manual chunks.
//!
//! Two backends share the [`VectorStore`] trait: SQLite for the persistent
//! index and an in-memory map for tests and throwaway sessions.

mod memory;
mod sqlite;

pub use memory::MemoryVectorStore;
pub use sqlite::SqliteVectorStore;

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An embedded chunk of a manual.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: Uuid,
    /// File the chunk came from.
    pub source: String,
    /// Zero-based page, when known.
    pub page: Option<u32>,
    pub content: String,
    pub embedding: Vec<f32>,
    /// Position of this chunk within its source.
    pub chunk_order: u32,
    pub indexed_at: DateTime<Utc>,
}

impl Document {
    pub fn new(
        source: String,
        page: Option<u32>,
        content: String,
        embedding: Vec<f32>,
        chunk_order: u32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            source,
            page,
            content,
            embedding,
            chunk_order,
            indexed_at: Utc::now(),
        }
    }

    /// Short citation such as `c172_poh.txt p.4`.
    pub fn citation(&self) -> String {
        match self.page {
            Some(page) => format!("{} p.{}", self.source, page),
            None => self.source.clone(),
        }
    }
}

/// A search result with score.
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub document: Document,
    /// Cosine similarity, higher is better.
    pub score: f32,
}

/// Summary of one indexed source file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexedSource {
    pub source: String,
    pub chunk_count: u32,
    /// Distinct pages seen among the chunks.
    pub page_count: u32,
    pub indexed_at: DateTime<Utc>,
}

/// Trait for vector store implementations.
#[async_trait]
pub trait VectorStore: Send + Sync {
    async fn upsert(&self, doc: &Document) -> Result<()>;

    async fn upsert_batch(&self, docs: &[Document]) -> Result<usize>;

    /// Most similar documents scoring at least `min_score`, best first.
    async fn search_with_threshold(
        &self,
        query_embedding: &[f32],
        limit: usize,
        min_score: f32,
    ) -> Result<Vec<SearchResult>>;

    /// Remove every chunk of a source. Returns the number removed.
    async fn delete_by_source(&self, source: &str) -> Result<usize>;

    /// Indexed sources, most recently indexed first.
    async fn list_sources(&self) -> Result<Vec<IndexedSource>>;

    /// Chunks of one source in chunk order.
    async fn get_by_source(&self, source: &str) -> Result<Vec<Document>>;

    async fn document_count(&self) -> Result<usize>;
}

/// Compute cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

/// Sort best-first and keep the top `limit`.
fn rank(mut results: Vec<SearchResult>, limit: usize) -> Vec<SearchResult> {
    results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    results.truncate(limit);
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity() {
        let a = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &[1.0, 0.0, 0.0]) - 1.0).abs() < 0.001);
        assert!(cosine_similarity(&a, &[0.0, 1.0, 0.0]).abs() < 0.001);
        assert!((cosine_similarity(&a, &[-1.0, 0.0, 0.0]) + 1.0).abs() < 0.001);
        assert_eq!(cosine_similarity(&a, &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&a, &[0.0, 0.0, 0.0]), 0.0);
    }

    #[test]
    fn test_citation() {
        let doc = Document::new("poh.txt".to_string(), Some(4), "text".to_string(), vec![], 0);
        assert_eq!(doc.citation(), "poh.txt p.4");

        let doc = Document::new("notes.md".to_string(), None, "text".to_string(), vec![], 0);
        assert_eq!(doc.citation(), "notes.md");
    }
}
