use clap::Subcommand;
use serde_json::json;

use crate::auth::session::now;
use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::database::Store;

#[derive(Subcommand)]
pub enum SessionCommands {
    #[command(about = "Delete expired sessions")]
    Purge,
}

pub async fn handle(cmd: SessionCommands, store: &dyn Store, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        SessionCommands::Purge => {
            let purged = store.purge_expired_sessions(now()).await?;
            tracing::info!(purged, "Purged expired sessions");

            output_success(
                &output_format,
                &format!("Purged {} expired session(s)", purged),
                Some(json!({ "purged": purged })),
            )
        }
    }
}
