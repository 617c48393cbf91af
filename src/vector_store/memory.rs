//! In-memory vector store.

use super::{cosine_similarity, rank, Document, IndexedSource, SearchResult, VectorStore};
use crate::error::{FlightLensError, Result};
use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

/// Map-backed store; contents are lost on drop.
#[derive(Default)]
pub struct MemoryVectorStore {
    documents: RwLock<HashMap<Uuid, Document>>,
}

impl MemoryVectorStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<Uuid, Document>>> {
        self.documents
            .read()
            .map_err(|e| FlightLensError::VectorStore(format!("Failed to acquire lock: {}", e)))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<Uuid, Document>>> {
        self.documents
            .write()
            .map_err(|e| FlightLensError::VectorStore(format!("Failed to acquire lock: {}", e)))
    }
}

#[async_trait]
impl VectorStore for MemoryVectorStore {
    async fn upsert(&self, doc: &Document) -> Result<()> {
        self.write()?.insert(doc.id, doc.clone());
        Ok(())
    }

    async fn upsert_batch(&self, docs: &[Document]) -> Result<usize> {
        let mut store = self.write()?;
        for doc in docs {
            store.insert(doc.id, doc.clone());
        }
        Ok(docs.len())
    }

    async fn search_with_threshold(
        &self,
        query_embedding: &[f32],
        limit: usize,
        min_score: f32,
    ) -> Result<Vec<SearchResult>> {
        let results = self
            .read()?
            .values()
            .map(|doc| SearchResult {
                score: cosine_similarity(query_embedding, &doc.embedding),
                document: doc.clone(),
            })
            .filter(|r| r.score >= min_score)
            .collect();

        Ok(rank(results, limit))
    }

    async fn delete_by_source(&self, source: &str) -> Result<usize> {
        let mut docs = self.write()?;
        let before = docs.len();
        docs.retain(|_, doc| doc.source != source);
        Ok(before - docs.len())
    }

    async fn list_sources(&self) -> Result<Vec<IndexedSource>> {
        let docs = self.read()?;
        let mut grouped: HashMap<&str, (IndexedSource, BTreeSet<u32>)> = HashMap::new();

        for doc in docs.values() {
            let (entry, pages) = grouped.entry(doc.source.as_str()).or_insert_with(|| {
                let summary = IndexedSource {
                    source: doc.source.clone(),
                    chunk_count: 0,
                    page_count: 0,
                    indexed_at: doc.indexed_at,
                };
                (summary, BTreeSet::new())
            });

            entry.chunk_count += 1;
            entry.indexed_at = entry.indexed_at.max(doc.indexed_at);
            if let Some(page) = doc.page {
                pages.insert(page);
            }
        }

        let mut sources: Vec<IndexedSource> = grouped
            .into_values()
            .map(|(mut summary, pages)| {
                summary.page_count = pages.len() as u32;
                summary
            })
            .collect();
        sources.sort_by(|a, b| b.indexed_at.cmp(&a.indexed_at).then_with(|| a.source.cmp(&b.source)));

        Ok(sources)
    }

    async fn get_by_source(&self, source: &str) -> Result<Vec<Document>> {
        let mut result: Vec<Document> = self
            .read()?
            .values()
            .filter(|d| d.source == source)
            .cloned()
            .collect();
        result.sort_by_key(|d| d.chunk_order);
        Ok(result)
    }

    async fn document_count(&self) -> Result<usize> {
        Ok(self.read()?.len())
    }
}
