//! SQLite-backed vector store.
//!
//! Embeddings are stored as little-endian f32 blobs and similarity is computed
//! in Rust. Manual collections are small enough that a full scan is fine.

use super::{cosine_similarity, rank, Document, IndexedSource, SearchResult, VectorStore};
use crate::error::{FlightLensError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, instrument};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS documents (
    id TEXT PRIMARY KEY,
    source TEXT NOT NULL,
    page INTEGER,
    content TEXT NOT NULL,
    embedding BLOB NOT NULL,
    chunk_order INTEGER NOT NULL,
    indexed_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_documents_source ON documents(source);
"#;

const SELECT_DOCUMENT: &str =
    "SELECT id, source, page, content, embedding, chunk_order, indexed_at FROM documents";

/// SQLite-based vector store.
pub struct SqliteVectorStore {
    conn: Mutex<Connection>,
}

impl SqliteVectorStore {
    /// Open or create the index database at `path`.
    #[instrument(skip_all)]
    pub fn new(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch(SCHEMA)?;

        info!("Initialized SQLite vector store at {:?}", path);
        Ok(Self { conn: Mutex::new(conn) })
    }

    /// Create an in-memory database.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| FlightLensError::VectorStore(format!("Failed to acquire lock: {}", e)))
    }

    fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
        embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    fn bytes_to_embedding(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect()
    }

    fn parse_time(value: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(value)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now())
    }

    fn row_to_document(row: &Row<'_>) -> rusqlite::Result<Document> {
        let id: String = row.get(0)?;
        let embedding: Vec<u8> = row.get(4)?;
        let indexed_at: String = row.get(6)?;

        Ok(Document {
            id: uuid::Uuid::parse_str(&id).unwrap_or_default(),
            source: row.get(1)?,
            page: row.get(2)?,
            content: row.get(3)?,
            embedding: Self::bytes_to_embedding(&embedding),
            chunk_order: row.get(5)?,
            indexed_at: Self::parse_time(&indexed_at),
        })
    }

    fn insert(conn: &Connection, doc: &Document) -> Result<()> {
        conn.execute(
            r#"
            INSERT OR REPLACE INTO documents
            (id, source, page, content, embedding, chunk_order, indexed_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                doc.id.to_string(),
                doc.source,
                doc.page,
                doc.content,
                Self::embedding_to_bytes(&doc.embedding),
                doc.chunk_order,
                doc.indexed_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }
}

#[async_trait]
impl VectorStore for SqliteVectorStore {
    #[instrument(skip(self, doc))]
    async fn upsert(&self, doc: &Document) -> Result<()> {
        let conn = self.lock()?;
        Self::insert(&conn, doc)?;
        debug!("Upserted document {}", doc.id);
        Ok(())
    }

    #[instrument(skip(self, docs))]
    async fn upsert_batch(&self, docs: &[Document]) -> Result<usize> {
        let conn = self.lock()?;
        let tx = conn.unchecked_transaction()?;
        for doc in docs {
            Self::insert(&tx, doc)?;
        }
        tx.commit()?;

        info!("Batch upserted {} documents", docs.len());
        Ok(docs.len())
    }

    #[instrument(skip(self, query_embedding))]
    async fn search_with_threshold(
        &self,
        query_embedding: &[f32],
        limit: usize,
        min_score: f32,
    ) -> Result<Vec<SearchResult>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(SELECT_DOCUMENT)?;

        let results: Vec<SearchResult> = stmt
            .query_map([], Self::row_to_document)?
            .filter_map(|doc| doc.ok())
            .map(|doc| SearchResult {
                score: cosine_similarity(query_embedding, &doc.embedding),
                document: doc,
            })
            .filter(|r| r.score >= min_score)
            .collect();

        let results = rank(results, limit);
        debug!("Found {} matching documents", results.len());
        Ok(results)
    }

    #[instrument(skip(self))]
    async fn delete_by_source(&self, source: &str) -> Result<usize> {
        let deleted = self
            .lock()?
            .execute("DELETE FROM documents WHERE source = ?1", params![source])?;

        info!("Deleted {} documents for {}", deleted, source);
        Ok(deleted)
    }

    #[instrument(skip(self))]
    async fn list_sources(&self) -> Result<Vec<IndexedSource>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT source, COUNT(*), COUNT(DISTINCT page), MAX(indexed_at) AS latest
            FROM documents
            GROUP BY source
            ORDER BY latest DESC, source ASC
            "#,
        )?;

        let sources = stmt
            .query_map([], |row| {
                let indexed_at: String = row.get(3)?;
                Ok(IndexedSource {
                    source: row.get(0)?,
                    chunk_count: row.get(1)?,
                    page_count: row.get(2)?,
                    indexed_at: Self::parse_time(&indexed_at),
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(sources)
    }

    #[instrument(skip(self))]
    async fn get_by_source(&self, source: &str) -> Result<Vec<Document>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "{} WHERE source = ?1 ORDER BY chunk_order",
            SELECT_DOCUMENT
        ))?;

        let docs = stmt
            .query_map(params![source], Self::row_to_document)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        debug!("Found {} documents for {}", docs.len(), source);
        Ok(docs)
    }

    async fn document_count(&self) -> Result<usize> {
        let count: i64 =
            self.lock()?
                .query_row("SELECT COUNT(*) FROM documents", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn doc(source: &str, page: Option<u32>, content: &str, embedding: Vec<f32>, order: u32) -> Document {
        Document::new(source.to_string(), page, content.to_string(), embedding, order)
    }

    #[tokio::test]
    async fn test_sqlite_vector_store() {
        let store = SqliteVectorStore::in_memory().unwrap();

        store
            .upsert(&doc("poh.txt", Some(3), "Engine fire in flight", vec![1.0, 0.0, 0.0], 0))
            .await
            .unwrap();

        let sources = store.list_sources().await.unwrap();
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].source, "poh.txt");
        assert_eq!(sources[0].page_count, 1);

        let results = store.search_with_threshold(&[1.0, 0.0, 0.0], 10, 0.0).await.unwrap();
        assert_eq!(results.len(), 1);
        assert!((results[0].score - 1.0).abs() < 0.001);
        assert_eq!(results[0].document.page, Some(3));

        assert_eq!(store.delete_by_source("poh.txt").await.unwrap(), 1);
        assert!(store.list_sources().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_persists_across_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("index.db");

        {
            let store = SqliteVectorStore::new(&path).unwrap();
            store
                .upsert_batch(&[
                    doc("poh.txt", Some(0), "one", vec![0.5, 0.5], 1),
                    doc("poh.txt", None, "zero", vec![0.25, -1.5], 0),
                ])
                .await
                .unwrap();
        }

        let store = SqliteVectorStore::new(&path).unwrap();
        assert_eq!(store.document_count().await.unwrap(), 2);

        let docs = store.get_by_source("poh.txt").await.unwrap();
        assert_eq!(docs[0].content, "zero");
        assert_eq!(docs[0].page, None);
        assert_eq!(docs[0].embedding, vec![0.25, -1.5]);

        let sources = store.list_sources().await.unwrap();
        assert_eq!(sources[0].chunk_count, 2);
        assert_eq!(sources[0].page_count, 1);
    }

    #[tokio::test]
    async fn test_threshold_filters() {
        let store = SqliteVectorStore::in_memory().unwrap();
        store
            .upsert_batch(&[
                doc("a.txt", None, "match", vec![1.0, 0.0], 0),
                doc("a.txt", None, "orthogonal", vec![0.0, 1.0], 1),
            ])
            .await
            .unwrap();

        let results = store.search_with_threshold(&[1.0, 0.0], 5, 0.2).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].document.content, "match");
    }
}
