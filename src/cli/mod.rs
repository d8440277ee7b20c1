pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::config::config;
use crate::database::PgStore;

#[derive(Parser)]
#[command(name = "chessctl")]
#[command(about = "chessctl - operator tools for the Chess Tournament API database")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "User accounts and roles")]
    User {
        #[command(subcommand)]
        cmd: commands::user::UserCommands,
    },

    #[command(about = "Session maintenance")]
    Session {
        #[command(subcommand)]
        cmd: commands::session::SessionCommands,
    },

    #[command(about = "Database connectivity")]
    Db {
        #[command(subcommand)]
        cmd: commands::db::DbCommands,
    },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let store = PgStore::from_config(config())?;

    let result = match cli.command {
        Commands::User { cmd } => commands::user::handle(cmd, &store, output_format).await,
        Commands::Session { cmd } => commands::session::handle(cmd, &store, output_format).await,
        Commands::Db { cmd } => commands::db::handle(cmd, &store, output_format).await,
    };

    store.manager().close().await;
    result
}
