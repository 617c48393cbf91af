//! Evaluation harness.
//!
//! Scores answers from the RAG pipeline and from a BM25 baseline against a
//! fixed question set.

pub mod baseline;
pub mod dataset;
pub mod metrics;
pub mod report;
pub mod runner;

pub use baseline::{Bm25Baseline, Bm25Index};
pub use dataset::{Difficulty, Question, ALL_QUESTIONS};
pub use metrics::{
    evaluate_pair, exact_match, length_ratio, normalize, summarize, token_f1, tokenize,
    MetricScores, Summary,
};
pub use report::{save_run, RunArtifacts, RunSummary};
pub use runner::{
    summarize_by_difficulty, summarize_records, EvalRun, EvalRunner, ScoredRecord, ERROR_MARKER,
};
