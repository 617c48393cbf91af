//! FlightLens - cockpit assistant over aviation manuals
//!
//! Answers pilot questions from indexed POH/AFM text, folds in live weather
//! and aircraft state, and measures answer quality against a keyword baseline.
//!
//! # Architecture
//!
//! - `config` - Settings and prompt templates
//! - `chunking` - Page loading, recursive splitting, and the JSONL corpus
//! - `embedding` - Embedding generation
//! - `vector_store` - Vector index abstraction
//! - `rag` - Retrieval-augmented answering
//! - `weather` - METAR provider chain with mock fallback, and decoding
//! - `telemetry` - Aircraft state sources
//! - `evaluate` - Metrics, question set, BM25 baseline and run reports
//! - `orchestrator` - Pipeline coordination
//!
//! # Example
//!
//! ```rust,no_run
//! use flightlens::config::Settings;
//! use flightlens::orchestrator::Orchestrator;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let orchestrator = Orchestrator::new(settings)?;
//!
//!     orchestrator.ingest()?;
//!     orchestrator.index().await?;
//!
//!     let engine = orchestrator.rag_engine()?;
//!     let response = engine.ask("What is the best glide speed?").await?;
//!     println!("{}", response.format_for_display());
//!
//!     Ok(())
//! }
//! ```

pub mod chunking;
pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod evaluate;
pub mod openai;
pub mod orchestrator;
pub mod rag;
pub mod telemetry;
pub mod vector_store;
pub mod weather;

pub use error::{FlightLensError, Result};
