//! Populate command handler.

use clap::Args;
use vrag_core::{config::AppConfig, AppResult};

/// Load PDFs and add new chunks to the collection
#[derive(Args, Debug)]
pub struct PopulateCommand {
    /// Clear the collection before populating
    #[arg(long)]
    pub reset: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl PopulateCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing populate command (reset: {})", self.reset);

        let stats = vrag_knowledge::ingest(config, self.reset).await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&stats)?);
        } else {
            if self.reset {
                println!("Cleared collection '{}'", config.rag.collection_name);
            }
            println!(
                "Loaded {} documents ({} pages, {} chunks) in {:.2}s",
                stats.documents, stats.pages, stats.chunks, stats.duration_secs
            );
            if stats.added == 0 {
                println!("No new documents to add ({} already indexed)", stats.skipped);
            } else {
                println!(
                    "Added {} new chunks ({} already indexed)",
                    stats.added, stats.skipped
                );
            }
        }

        Ok(())
    }
}
