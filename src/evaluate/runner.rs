//! Evaluation runner.
//!
//! Runs an [`AnswerProducer`] over the question set and scores every answer.

use super::dataset::{Difficulty, Question};
use super::metrics::{evaluate_pair, summarize, MetricScores, Summary};
use crate::rag::AnswerProducer;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

/// Prefix marking an answer that is really a producer failure.
pub const ERROR_MARKER: &str = "[ERROR during answer generation:";

/// One scored answer, carrying the question metadata.
///
/// Flat on purpose: the same struct is written as JSON and as a CSV row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredRecord {
    pub id: String,
    pub question: String,
    pub ground_truth: String,
    pub answer: String,
    pub category: String,
    pub difficulty: String,
    /// Comma-joined context tags.
    pub requires_context: String,
    pub f1: f64,
    pub exact_match: f64,
    pub length_ratio: f64,
}

impl ScoredRecord {
    /// Column names, in field order.
    pub const FIELDS: [&'static str; 10] = [
        "id",
        "question",
        "ground_truth",
        "answer",
        "category",
        "difficulty",
        "requires_context",
        "f1",
        "exact_match",
        "length_ratio",
    ];

    fn new(question: &Question, answer: String, scores: MetricScores) -> Self {
        Self {
            id: question.id.to_string(),
            question: question.question.to_string(),
            ground_truth: question.ground_truth.to_string(),
            answer,
            category: question.category.to_string(),
            difficulty: question.difficulty.to_string(),
            requires_context: question.requires_context.join(","),
            f1: scores.f1,
            exact_match: scores.exact_match,
            length_ratio: scores.length_ratio,
        }
    }

    /// The metric fields of this record.
    pub fn scores(&self) -> MetricScores {
        MetricScores {
            f1: self.f1,
            exact_match: self.exact_match,
            length_ratio: self.length_ratio,
        }
    }

    /// Whether the answer is an encoded producer failure.
    pub fn is_error(&self) -> bool {
        self.answer.starts_with(ERROR_MARKER)
    }
}

/// Records and summary from running one producer over the dataset.
#[derive(Debug, Clone)]
pub struct EvalRun {
    /// Name of the producer that generated the answers.
    pub producer: String,
    pub records: Vec<ScoredRecord>,
    pub summary: Summary,
}

impl EvalRun {
    /// Number of questions whose answer is an error marker.
    pub fn error_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_error()).count()
    }
}

/// Mean metrics over scored records.
pub fn summarize_records(records: &[ScoredRecord]) -> Summary {
    let scores: Vec<MetricScores> = records.iter().map(ScoredRecord::scores).collect();
    summarize(&scores)
}

/// Sequential runner over a fixed question set.
pub struct EvalRunner<'a> {
    questions: &'a [Question],
}

impl<'a> EvalRunner<'a> {
    pub fn new(questions: &'a [Question]) -> Self {
        Self { questions }
    }

    /// Number of questions in the set.
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Answer and score every question in dataset order.
    ///
    /// Always yields one record per question: a failing producer call is
    /// stored as an error-marked answer and scored like any other.
    #[instrument(skip(self, producer), fields(producer = producer.name()))]
    pub async fn run(&self, producer: &dyn AnswerProducer) -> EvalRun {
        self.run_with_progress(producer, |_, _| {}).await
    }

    /// Like [`run`](Self::run), calling `on_answer(index, record)` after each question.
    pub async fn run_with_progress<F>(&self, producer: &dyn AnswerProducer, mut on_answer: F) -> EvalRun
    where
        F: FnMut(usize, &ScoredRecord),
    {
        let total = self.questions.len();
        let mut records = Vec::with_capacity(total);

        for (i, q) in self.questions.iter().enumerate() {
            info!("[{}/{}] {}: {}", i + 1, total, q.id, preview(q.question, 70));

            let answer = match producer.answer(q.question).await {
                Ok(answer) => answer,
                Err(e) => {
                    warn!("{} failed on {}: {}", producer.name(), q.id, e);
                    format!("{} {}]", ERROR_MARKER, e)
                }
            };

            let scores = evaluate_pair(&answer, q.ground_truth);
            let record = ScoredRecord::new(q, answer, scores);
            on_answer(i, &record);
            records.push(record);
        }

        let summary = summarize_records(&records);
        info!(
            "{} summary: f1={:.3} em={:.3} len={:.3}",
            producer.name(),
            summary.f1,
            summary.exact_match,
            summary.length_ratio
        );

        EvalRun {
            producer: producer.name().to_string(),
            records,
            summary,
        }
    }
}

/// Per-difficulty mean metrics, in easy/medium/high order. Empty buckets are omitted.
pub fn summarize_by_difficulty(records: &[ScoredRecord]) -> Vec<(Difficulty, Summary)> {
    [Difficulty::Easy, Difficulty::Medium, Difficulty::High]
        .into_iter()
        .filter_map(|d| {
            let bucket: Vec<ScoredRecord> = records
                .iter()
                .filter(|r| r.difficulty == d.to_string())
                .cloned()
                .collect();
            (!bucket.is_empty()).then(|| (d, summarize_records(&bucket)))
        })
        .collect()
}

fn preview(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
