//! Stats command handler.

use clap::Args;
use vrag_core::{config::AppConfig, AppResult};

/// Show collection statistics
#[derive(Args, Debug)]
pub struct StatsCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl StatsCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing stats command");

        let stats = vrag_knowledge::stats(config).await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&stats)?);
        } else {
            println!("Collection: {}", stats.collection_name);
            println!("Location:   {}", stats.collection_path);
            println!("Entries:    {}", stats.entries);
        }

        Ok(())
    }
}
