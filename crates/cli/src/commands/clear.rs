//! Clear command handler.

use clap::Args;
use vrag_core::{config::AppConfig, AppResult};

/// Remove every entry from the collection
#[derive(Args, Debug)]
pub struct ClearCommand {}

impl ClearCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!(
            "Executing clear command for collection '{}'",
            config.rag.collection_name
        );

        vrag_knowledge::clear(config).await?;

        println!("Collection '{}' cleared", config.rag.collection_name);

        Ok(())
    }
}
