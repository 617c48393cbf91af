//! CLI module for FlightLens.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// FlightLens - cockpit assistant over aviation manuals
///
/// Answers pilot questions from indexed POH/AFM text, fetches and decodes
/// METARs, and evaluates retrieval answers against a keyword baseline.
#[derive(Parser, Debug)]
#[command(name = "flightlens")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "FLIGHTLENS_CONFIG")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create data directories and a default configuration
    Init,

    /// Check configuration, API keys and data files
    Doctor,

    /// Split raw documents into the chunk corpus
    Ingest {
        /// Directory of .txt/.md documents (defaults to paths.raw_dir)
        #[arg(short, long)]
        dir: Option<String>,
    },

    /// Embed the chunk corpus into the vector index
    Index,

    /// List indexed documents
    List {
        /// Show the chunks of one document instead
        #[arg(short, long)]
        source: Option<String>,
    },

    /// Ask a question about the manuals
    Ask {
        /// The question to ask
        question: String,

        /// Show the retrieved source passages
        #[arg(short, long)]
        sources: bool,

        /// Include the current METAR for this station
        #[arg(long)]
        station: Option<String>,

        /// Include aircraft state in the prompt
        #[arg(short, long)]
        telemetry: bool,

        /// LLM model to use
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Search the indexed manuals
    Search {
        /// Search query
        query: String,

        /// Maximum number of results
        #[arg(short, long, default_value = "5")]
        limit: usize,

        /// Minimum similarity score (0.0-1.0)
        #[arg(short, long, default_value = "0.2")]
        min_score: f32,
    },

    /// Fetch the current METAR for a station
    Weather {
        /// ICAO station code, e.g. KDFW
        station: String,

        /// Print the decoded report as well
        #[arg(short, long)]
        decode: bool,
    },

    /// Show the current aircraft state
    Telemetry,

    /// Run the evaluation question set against RAG and the BM25 baseline
    Eval {
        /// Skip the RAG system
        #[arg(long)]
        skip_rag: bool,

        /// Skip the BM25 baseline
        #[arg(long)]
        skip_baseline: bool,

        /// Passages returned by the baseline
        #[arg(short = 'k', long, default_value = "3")]
        top_k: usize,

        /// Directory for result files (defaults to paths.results_dir)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}
