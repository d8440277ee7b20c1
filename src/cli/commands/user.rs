use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::database::models::AdminUserView;
use crate::database::schemas::ADMIN_USER;
use crate::database::{Patch, Store};

#[derive(Subcommand)]
pub enum UserCommands {
    #[command(about = "List user accounts, newest first")]
    List {
        #[arg(long, help = "Include deactivated accounts")]
        all: bool,
    },

    #[command(about = "Change a user's role (admin, moderator or player)")]
    Promote {
        #[arg(help = "Username")]
        username: String,

        #[arg(long, help = "New role: admin, moderator or player")]
        role: String,
    },
}

pub async fn handle(cmd: UserCommands, store: &dyn Store, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        UserCommands::List { all } => {
            let users = store.list_users(all).await?;

            if users.is_empty() {
                return output_empty_collection(&output_format, "users", "No users found");
            }

            match output_format {
                OutputFormat::Json => {
                    let users: Vec<AdminUserView> = users.iter().map(AdminUserView::from).collect();
                    println!("{}", serde_json::to_string_pretty(&json!({ "users": users }))?);
                }
                OutputFormat::Text => {
                    println!(
                        "{:<6} {:<20} {:<30} {:<10} {:<7} {:<17} {}",
                        "ID", "USERNAME", "EMAIL", "ROLE", "ACTIVE", "LAST LOGIN", "FULL NAME"
                    );
                    println!("{}", "-".repeat(110));

                    for user in &users {
                        println!(
                            "{:<6} {:<20} {:<30} {:<10} {:<7} {:<17} {}",
                            user.id,
                            user.username,
                            user.email,
                            user.role,
                            if user.is_active { "yes" } else { "no" },
                            format_timestamp(user.last_login),
                            user.full_name
                        );
                    }
                }
            }

            Ok(())
        }
        UserCommands::Promote { username, role } => {
            let user = store
                .find_user_by_username(&username)
                .await?
                .ok_or_else(|| anyhow::anyhow!("User '{}' not found", username))?;

            // Same whitelist and validation as PUT /admin-users
            let patch = Patch::from_input(&ADMIN_USER, &json!({ "role": role }))
                .map_err(|e| anyhow::anyhow!("Invalid role '{}': {}", role, e))?;

            let updated = store
                .update_user(user.id, &patch)
                .await?
                .ok_or_else(|| anyhow::anyhow!("User '{}' disappeared during update", username))?;

            output_success(
                &output_format,
                &format!("User '{}' is now {}", updated.username, updated.role),
                Some(json!({ "user": AdminUserView::from(&updated) })),
            )
        }
    }
}
