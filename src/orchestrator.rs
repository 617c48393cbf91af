//! Pipeline orchestrator for FlightLens.
//!
//! Coordinates manual ingestion, indexing, and construction of the answering
//! and weather components from one set of settings.

use crate::chunking::{load_pages, read_chunks, write_chunks, DocumentChunk, RecursiveSplitter, TextSplitter};
use crate::config::{Prompts, Settings};
use crate::embedding::{Embedder, OpenAIEmbedder};
use crate::error::{FlightLensError, Result};
use crate::rag::RagEngine;
use crate::vector_store::{Document, IndexedSource, SqliteVectorStore, VectorStore};
use crate::weather::WeatherChain;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, instrument};

/// The main orchestrator for the FlightLens pipeline.
pub struct Orchestrator {
    settings: Settings,
    prompts: Prompts,
    embedder: Arc<dyn Embedder>,
    vector_store: Arc<dyn VectorStore>,
}

impl Orchestrator {
    /// Create an orchestrator backed by OpenAI embeddings and the SQLite index.
    pub fn new(settings: Settings) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        let embedder = Arc::new(OpenAIEmbedder::from_settings(&settings.embedding)?);
        let vector_store = Arc::new(SqliteVectorStore::new(&settings.sqlite_path())?);

        Ok(Self::with_components(settings, prompts, embedder, vector_store))
    }

    /// Create an orchestrator with custom components.
    pub fn with_components(
        settings: Settings,
        prompts: Prompts,
        embedder: Arc<dyn Embedder>,
        vector_store: Arc<dyn VectorStore>,
    ) -> Self {
        Self {
            settings,
            prompts,
            embedder,
            vector_store,
        }
    }

    pub fn vector_store(&self) -> Arc<dyn VectorStore> {
        self.vector_store.clone()
    }

    pub fn embedder(&self) -> Arc<dyn Embedder> {
        self.embedder.clone()
    }

    /// A RAG engine over this orchestrator's index, using the loaded prompts.
    pub fn rag_engine(&self) -> Result<RagEngine> {
        Ok(RagEngine::new(self.vector_store(), self.embedder(), &self.settings.rag)?
            .with_prompts(self.prompts.clone()))
    }

    /// The configured weather provider chain.
    pub fn weather_chain(&self) -> Result<WeatherChain> {
        WeatherChain::from_settings(&self.settings.weather)
    }

    /// Split every document in the raw directory and write the chunk corpus.
    pub fn ingest(&self) -> Result<IngestResult> {
        ingest_documents(&self.settings)
    }

    /// Embed the chunk corpus into the vector store.
    ///
    /// Each source is replaced wholesale, so re-indexing never duplicates chunks.
    #[instrument(skip(self))]
    pub async fn index(&self) -> Result<IndexResult> {
        let chunks_file = self.settings.chunks_file();
        if !chunks_file.exists() {
            return Err(FlightLensError::NotFound(format!(
                "{} (run `flightlens ingest` first)",
                chunks_file.display()
            )));
        }

        let groups = group_by_source(read_chunks(&chunks_file)?);
        let mut result = IndexResult::default();

        for (source, chunks) in groups {
            let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
            let embeddings = self.embedder.embed_batch(&texts).await?;

            let documents: Vec<Document> = chunks
                .into_iter()
                .zip(embeddings)
                .enumerate()
                .map(|(order, (chunk, embedding))| {
                    Document::new(source.clone(), chunk.metadata.page, chunk.text, embedding, order as u32)
                })
                .collect();

            let replaced = self.vector_store.delete_by_source(&source).await?;
            let indexed = self.vector_store.upsert_batch(&documents).await?;
            info!("Indexed {} chunks from {} (replaced {})", indexed, source, replaced);

            result.sources += 1;
            result.chunks_indexed += indexed;
        }

        Ok(result)
    }

    pub async fn list_sources(&self) -> Result<Vec<IndexedSource>> {
        self.vector_store.list_sources().await
    }
}

/// Split every document in `paths.raw_dir` and write the chunk corpus.
///
/// Needs no embedder or index, so it runs without an API key.
#[instrument(skip(settings))]
pub fn ingest_documents(settings: &Settings) -> Result<IngestResult> {
    let raw_dir = settings.raw_dir();
    let chunks_file = settings.chunks_file();

    let pages = load_pages(&raw_dir)?;
    if pages.is_empty() {
        return Err(FlightLensError::NotFound(format!(
            "No .txt or .md documents in {}",
            raw_dir.display()
        )));
    }

    let mut documents: Vec<&str> = pages.iter().map(|p| p.source.as_str()).collect();
    documents.dedup();

    let splitter = RecursiveSplitter::from_settings(&settings.chunking)?;
    let chunks = splitter.split_pages(&pages);
    let written = write_chunks(&chunks_file, &chunks)?;

    info!(
        "Ingested {} documents ({} pages) into {} chunks",
        documents.len(),
        pages.len(),
        written
    );

    Ok(IngestResult {
        documents: documents.len(),
        pages: pages.len(),
        chunks: written,
        chunks_file,
    })
}

/// Group chunks by source, keeping first-seen source order and chunk order.
fn group_by_source(chunks: Vec<DocumentChunk>) -> Vec<(String, Vec<DocumentChunk>)> {
    let mut groups: Vec<(String, Vec<DocumentChunk>)> = Vec::new();
    for chunk in chunks {
        match groups.iter_mut().find(|(source, _)| *source == chunk.metadata.source) {
            Some((_, members)) => members.push(chunk),
            None => groups.push((chunk.metadata.source.clone(), vec![chunk])),
        }
    }
    groups
}

/// Result of splitting the raw documents.
#[derive(Debug, Clone)]
pub struct IngestResult {
    pub documents: usize,
    pub pages: usize,
    pub chunks: usize,
    pub chunks_file: PathBuf,
}

/// Result of embedding the corpus.
#[derive(Debug, Clone, Default)]
pub struct IndexResult {
    pub sources: usize,
    pub chunks_indexed: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector_store::MemoryVectorStore;
    use async_trait::async_trait;
    use tempfile::tempdir;

    struct LengthEmbedder;

    #[async_trait]
    impl Embedder for LengthEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            Ok(vec![text.len() as f32, 1.0])
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(texts.iter().map(|t| vec![t.len() as f32, 1.0]).collect())
        }

        fn dimensions(&self) -> usize {
            2
        }
    }

    fn orchestrator(root: &std::path::Path) -> Orchestrator {
        let mut settings = Settings::default();
        settings.paths.raw_dir = root.join("raw").to_string_lossy().to_string();
        settings.paths.chunks_file = root.join("processed/chunks.jsonl").to_string_lossy().to_string();
        settings.chunking.chunk_size = 60;
        settings.chunking.chunk_overlap = 10;

        Orchestrator::with_components(
            settings,
            Prompts::default(),
            Arc::new(LengthEmbedder),
            Arc::new(MemoryVectorStore::new()),
        )
    }

    #[tokio::test]
    async fn test_ingest_then_index() {
        let dir = tempdir().unwrap();
        let raw = dir.path().join("raw");
        std::fs::create_dir_all(&raw).unwrap();
        std::fs::write(
            raw.join("poh.txt"),
            "CHECKLIST Engine fire during start\nCranking continue\n\x0cPROCEDURE Forced landing\nAirspeed 65 KIAS",
        )
        .unwrap();
        std::fs::write(raw.join("notes.md"), "Short note about pattern altitude").unwrap();

        let orch = orchestrator(dir.path());
        let ingested = orch.ingest().unwrap();
        assert_eq!(ingested.documents, 2);
        assert_eq!(ingested.pages, 3);
        assert!(ingested.chunks >= 3);
        assert!(ingested.chunks_file.exists());

        let indexed = orch.index().await.unwrap();
        assert_eq!(indexed.sources, 2);
        assert_eq!(indexed.chunks_indexed, ingested.chunks);

        // second run replaces instead of duplicating
        orch.index().await.unwrap();
        assert_eq!(orch.vector_store().document_count().await.unwrap(), ingested.chunks);

        let sources = orch.list_sources().await.unwrap();
        let poh = sources.iter().find(|s| s.source == "poh.txt").unwrap();
        assert_eq!(poh.page_count, 2);
    }

    #[tokio::test]
    async fn test_index_without_corpus() {
        let dir = tempdir().unwrap();
        let err = orchestrator(dir.path()).index().await.unwrap_err();
        assert!(matches!(err, FlightLensError::NotFound(_)));
    }

    #[test]
    fn test_ingest_empty_raw_dir() {
        let dir = tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("raw")).unwrap();
        assert!(orchestrator(dir.path()).ingest().is_err());
    }

    #[test]
    fn test_group_by_source_keeps_order() {
        use crate::chunking::ChunkMetadata;

        let chunk = |source: &str, text: &str| DocumentChunk {
            text: text.to_string(),
            metadata: ChunkMetadata { source: source.to_string(), page: Some(0) },
        };
        let groups = group_by_source(vec![chunk("b", "1"), chunk("a", "2"), chunk("b", "3")]);
        assert_eq!(groups[0].0, "b");
        assert_eq!(groups[0].1.len(), 2);
        assert_eq!(groups[1].0, "a");
    }
}
