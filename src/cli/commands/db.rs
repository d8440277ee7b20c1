use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::database::{PgStore, Store};

#[derive(Subcommand)]
pub enum DbCommands {
    #[command(about = "Connect and run a trivial query")]
    Check,
}

pub async fn handle(cmd: DbCommands, store: &PgStore, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        DbCommands::Check => {
            let url = store.manager().redacted_url().unwrap_or_else(|| "(DATABASE_URL not set)".to_string());
            store.health_check().await?;

            output_success(
                &output_format,
                &format!("Database reachable at {}", url),
                Some(json!({ "database": url })),
            )
        }
    }
}
