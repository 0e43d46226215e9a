//! Query command handler.

use clap::Args;
use vrag_core::{config::AppConfig, AppResult};

/// Answer a question from the collection
#[derive(Args, Debug)]
pub struct QueryCommand {
    /// Question text
    pub text: String,

    /// Number of chunks to retrieve (default: chunksToReturn from config)
    #[arg(short = 'k', long)]
    pub k: Option<usize>,

    /// Sampling temperature for the answer (default: from config)
    #[arg(short, long)]
    pub temperature: Option<f32>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl QueryCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing query command");
        tracing::debug!("Query: {}", self.text);

        let answer = vrag_knowledge::query(config, &self.text, self.k, self.temperature).await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&answer)?);
        } else {
            println!("Response: {}", answer.response);
            println!("Sources: {:?}", answer.sources);
        }

        Ok(())
    }
}
