//! Eval command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::evaluate::{
    save_run, summarize_by_difficulty, Bm25Baseline, EvalRun, EvalRunner, ALL_QUESTIONS,
};
use crate::orchestrator::Orchestrator;
use crate::rag::AnswerProducer;
use anyhow::Result;
use std::path::PathBuf;

async fn run_producer(runner: &EvalRunner<'_>, producer: &dyn AnswerProducer) -> EvalRun {
    let pb = Output::progress_bar(runner.len() as u64, producer.name());
    let run = runner
        .run_with_progress(producer, |_, record| {
            pb.set_message(format!("{} {}", producer.name(), record.id));
            pb.inc(1);
        })
        .await;
    pb.finish_and_clear();

    if run.error_count() > 0 {
        Output::warning(&format!(
            "{}: {} of {} answers failed",
            run.producer,
            run.error_count(),
            run.records.len()
        ));
    }
    run
}

/// Run the eval command.
pub async fn run_eval(
    skip_rag: bool,
    skip_baseline: bool,
    top_k: usize,
    output_dir: Option<PathBuf>,
    settings: Settings,
) -> Result<()> {
    if skip_rag && skip_baseline {
        Output::warning("Both systems skipped, nothing to evaluate.");
        return Ok(());
    }

    let operation = Operation::Eval { rag: !skip_rag, baseline: !skip_baseline };
    if let Err(e) = preflight::check(operation, &settings) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let runner = EvalRunner::new(ALL_QUESTIONS);
    Output::info(&format!("Evaluating {} questions", runner.len()));

    let rag_records = if skip_rag {
        Vec::new()
    } else {
        let engine = Orchestrator::new(settings.clone())?.rag_engine()?;
        run_producer(&runner, &engine).await.records
    };

    let bm25_records = if skip_baseline {
        Vec::new()
    } else {
        let baseline = Bm25Baseline::load(&settings.chunks_file(), top_k)?;
        run_producer(&runner, &baseline).await.records
    };

    let output_dir = output_dir.unwrap_or_else(|| settings.results_dir());
    let artifacts = save_run(&output_dir, &rag_records, &bm25_records)?;

    Output::header("Summary");
    if !skip_rag {
        Output::summary("rag", &artifacts.summary.rag);
    }
    if !skip_baseline {
        Output::summary("bm25", &artifacts.summary.bm25);
    }

    Output::header("By difficulty");
    for (system, records) in [("rag", &rag_records), ("bm25", &bm25_records)] {
        for (difficulty, summary) in summarize_by_difficulty(records) {
            Output::summary(&format!("{} {}", system, difficulty), &summary);
        }
    }
    println!();
    Output::success(&format!(
        "Wrote {} files to {}",
        artifacts.files.len(),
        output_dir.display()
    ));

    Ok(())
}
