//! List command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::vector_store::{SqliteVectorStore, VectorStore};
use anyhow::Result;

/// Run the list command.
///
/// With a source, prints that document's chunks in order instead of the
/// document summary.
pub async fn run_list(source: Option<&str>, settings: Settings) -> Result<()> {
    let store = SqliteVectorStore::new(&settings.sqlite_path())?;

    if let Some(source) = source {
        return list_chunks(&store, source).await;
    }

    let sources = store.list_sources().await?;

    if sources.is_empty() {
        Output::info("Nothing indexed yet. Run 'flightlens ingest' then 'flightlens index'.");
        return Ok(());
    }

    Output::header(&format!("Indexed Documents ({})", sources.len()));
    println!();

    for source in &sources {
        Output::source_info(&source.source, source.chunk_count, source.page_count);
    }

    let total_chunks: u32 = sources.iter().map(|s| s.chunk_count).sum();
    println!();
    Output::kv("Total documents", &sources.len().to_string());
    Output::kv("Total chunks", &total_chunks.to_string());

    Ok(())
}

async fn list_chunks(store: &dyn VectorStore, source: &str) -> Result<()> {
    let chunks = store.get_by_source(source).await?;

    if chunks.is_empty() {
        Output::warning(&format!("No chunks indexed for '{}'", source));
        return Ok(());
    }

    Output::header(&format!("{} ({} chunks)", source, chunks.len()));
    for chunk in &chunks {
        Output::chunk(chunk.chunk_order, &chunk.citation(), &chunk.content);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector_store::Document;

    #[tokio::test]
    async fn test_list_with_and_without_source() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = Settings::default();
        settings.vector_store.sqlite_path = dir.path().join("index.db").to_string_lossy().to_string();

        {
            let store = SqliteVectorStore::new(&settings.sqlite_path()).unwrap();
            store
                .upsert_batch(&[
                    Document::new("poh.txt".to_string(), Some(4), "Best glide 68 KIAS".to_string(), vec![1.0], 0),
                    Document::new("poh.txt".to_string(), Some(5), "Restart checklist".to_string(), vec![1.0], 1),
                ])
                .await
                .unwrap();
        }

        run_list(None, settings.clone()).await.unwrap();
        run_list(Some("poh.txt"), settings.clone()).await.unwrap();
        run_list(Some("missing.txt"), settings).await.unwrap();
    }
}
