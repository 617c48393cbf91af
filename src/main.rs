//! FlightLens CLI entry point.

use anyhow::Result;
use clap::Parser;
use flightlens::cli::{commands, Cli, Commands};
use flightlens::config::Settings;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // .env is optional
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => Settings::load_from(Some(&std::path::PathBuf::from(path)))?,
        None => Settings::load()?,
    };

    let log_level = match cli.verbose {
        0 => settings.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("flightlens={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    std::fs::create_dir_all(settings.data_dir())?;

    match &cli.command {
        Commands::Init => {
            commands::run_init(&settings)?;
        }

        Commands::Doctor => {
            commands::run_doctor(&settings)?;
        }

        Commands::Ingest { dir } => {
            commands::run_ingest(dir.as_deref(), settings)?;
        }

        Commands::Index => {
            commands::run_index(settings).await?;
        }

        Commands::List { source } => {
            commands::run_list(source.as_deref(), settings).await?;
        }

        Commands::Ask {
            question,
            sources,
            station,
            telemetry,
            model,
        } => {
            commands::run_ask(
                question,
                *sources,
                station.as_deref(),
                *telemetry,
                model.clone(),
                settings,
            )
            .await?;
        }

        Commands::Search {
            query,
            limit,
            min_score,
        } => {
            commands::run_search(query, *limit, *min_score, settings).await?;
        }

        Commands::Weather { station, decode } => {
            commands::run_weather(station, *decode, &settings).await?;
        }

        Commands::Telemetry => {
            commands::run_telemetry().await?;
        }

        Commands::Eval {
            skip_rag,
            skip_baseline,
            top_k,
            output_dir,
        } => {
            commands::run_eval(*skip_rag, *skip_baseline, *top_k, output_dir.clone(), settings).await?;
        }

        Commands::Config { action } => {
            commands::run_config(action, settings)?;
        }
    }

    Ok(())
}
