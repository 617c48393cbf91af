//! Lexical retrieval baseline.
//!
//! BM25 over the chunk corpus, scored by an in-RAM tantivy index. The
//! "answer" is the concatenation of the top-k passages, which gives the
//! generated answers something to beat.

use crate::chunking::read_chunks;
use crate::error::{FlightLensError, Result};
use crate::rag::AnswerProducer;
use async_trait::async_trait;
use std::path::Path;
use tantivy::collector::TopDocs;
use tantivy::query::BooleanQuery;
use tantivy::schema::*;
use tantivy::tokenizer::TokenStream;
use tantivy::{doc, Index, IndexReader, IndexWriter, ReloadPolicy};
use tracing::{debug, info};

/// Writer heap for building the index.
const WRITER_HEAP_BYTES: usize = 50_000_000;

/// An in-memory BM25 index over a list of texts.
///
/// Each text is stored with its corpus position so results can be mapped
/// back and ties broken in corpus order.
pub struct Bm25Index {
    texts: Vec<String>,
    index: Index,
    reader: IndexReader,
    order_field: Field,
    text_field: Field,
}

impl Bm25Index {
    /// Build an index over `texts`.
    pub fn new(texts: Vec<String>) -> Result<Self> {
        let mut schema_builder = Schema::builder();
        let order_field = schema_builder.add_u64_field("order", STORED);
        let text_field = schema_builder.add_text_field("text", TEXT);
        let schema = schema_builder.build();

        let index = Index::create_in_ram(schema);
        let mut writer: IndexWriter = index.writer_with_num_threads(1, WRITER_HEAP_BYTES)?;
        for (order, text) in texts.iter().enumerate() {
            writer.add_document(doc!(
                order_field => order as u64,
                text_field => text.as_str(),
            ))?;
        }
        writer.commit()?;

        let reader: IndexReader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()?;

        Ok(Self {
            texts,
            index,
            reader,
            order_field,
            text_field,
        })
    }

    /// Number of indexed texts.
    pub fn len(&self) -> usize {
        self.texts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }

    /// Query terms, run through the same analyzer as the indexed text.
    fn query_terms(&self, query: &str) -> Result<Vec<Term>> {
        let mut analyzer = self.index.tokenizer_for_field(self.text_field)?;
        let mut stream = analyzer.token_stream(query);
        let mut terms = Vec::new();
        while stream.advance() {
            terms.push(Term::from_field_text(self.text_field, &stream.token().text));
        }
        Ok(terms)
    }

    /// BM25 score of every text for the query, in corpus order.
    ///
    /// Texts sharing no term with the query score 0.
    pub fn scores(&self, query: &str) -> Result<Vec<f32>> {
        let mut scores = vec![0.0; self.texts.len()];
        if self.texts.is_empty() {
            return Ok(scores);
        }

        let terms = self.query_terms(query)?;
        if terms.is_empty() {
            return Ok(scores);
        }

        let searcher = self.reader.searcher();
        let query = BooleanQuery::new_multiterms_query(terms);
        let hits = searcher.search(&query, &TopDocs::with_limit(self.texts.len()))?;

        for (score, address) in hits {
            let doc: TantivyDocument = searcher.doc(address)?;
            if let Some(order) = doc.get_first(self.order_field).and_then(|v| v.as_u64()) {
                if let Some(slot) = scores.get_mut(order as usize) {
                    *slot = score;
                }
            }
        }
        Ok(scores)
    }

    /// The `k` highest-scoring texts. Ties keep corpus order.
    pub fn top_n(&self, query: &str, k: usize) -> Result<Vec<&str>> {
        let scores = self.scores(query)?;
        let mut order: Vec<usize> = (0..scores.len()).collect();
        order.sort_by(|&a, &b| {
            scores[b]
                .partial_cmp(&scores[a])
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        Ok(order
            .into_iter()
            .take(k)
            .map(|i| self.texts[i].as_str())
            .collect())
    }
}

/// BM25 over the chunk corpus, exposed as an answer producer.
pub struct Bm25Baseline {
    index: Bm25Index,
    top_k: usize,
}

impl Bm25Baseline {
    /// Wrap an existing index.
    pub fn new(index: Bm25Index, top_k: usize) -> Self {
        Self { index, top_k }
    }

    /// Load the chunk corpus from a JSONL file.
    pub fn load(chunks_file: &Path, top_k: usize) -> Result<Self> {
        if !chunks_file.exists() {
            return Err(FlightLensError::NotFound(format!(
                "Chunk file not found: {}",
                chunks_file.display()
            )));
        }

        let texts: Vec<String> = read_chunks(chunks_file)?
            .into_iter()
            .map(|c| c.text)
            .collect();
        info!("Loaded {} chunks for BM25 baseline", texts.len());

        Ok(Self::new(Bm25Index::new(texts)?, top_k))
    }

    /// Concatenate the `k` most relevant passages.
    pub fn answer_question(&self, question: &str, k: usize) -> Result<String> {
        let passages = self.index.top_n(question, k)?;
        debug!("BM25 returned {} passages", passages.len());
        Ok(passages.join("\n\n"))
    }
}

#[async_trait]
impl AnswerProducer for Bm25Baseline {
    fn name(&self) -> &str {
        "bm25"
    }

    async fn answer(&self, question: &str) -> Result<String> {
        self.answer_question(question, self.top_k)
    }
}
