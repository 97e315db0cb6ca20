use anyhow::Context;
use clap::Subcommand;
use colored::*;
use flowcraft_config::ServerConfig;
use flowcraft_core::Profile;
use flowcraft_storage::{connect, ProfileStorage};
use std::path::PathBuf;

use super::utils::new_table;

#[derive(Subcommand)]
pub enum UsersCommands {
    /// Create or rename a user in the profile directory
    Set {
        /// User id, as carried by tokens and assignees
        id: String,
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        email: Option<String>,
        /// SQLite database file (overrides FLOWCRAFT_DB_PATH)
        #[arg(long)]
        db: Option<PathBuf>,
    },
    /// List the profile directory
    List {
        #[arg(long)]
        db: Option<PathBuf>,
    },
}

async fn open_profile_storage(db: Option<PathBuf>) -> anyhow::Result<ProfileStorage> {
    let path = match db {
        Some(path) => path,
        None => ServerConfig::from_env()?.database_path,
    };
    let pool = connect(&path)
        .await
        .with_context(|| format!("Failed to open database at {}", path.display()))?;
    Ok(ProfileStorage::new(pool))
}

pub async fn handle_users_command(command: UsersCommands) -> anyhow::Result<()> {
    match command {
        UsersCommands::Set {
            id,
            username,
            email,
            db,
        } => {
            let storage = open_profile_storage(db).await?;
            let profile = storage
                .upsert_profile(&Profile {
                    id,
                    username,
                    email,
                })
                .await?;
            println!(
                "{} Saved {} as {}",
                "✓".green(),
                profile.id.bold(),
                profile.display_name()
            );
            Ok(())
        }
        UsersCommands::List { db } => {
            let storage = open_profile_storage(db).await?;
            let profiles = storage.list_profiles().await?;

            if profiles.is_empty() {
                println!("{}", "No users found".yellow());
                println!("{}", "Use 'flowcraft users set <id> --username <name>' to add one".dimmed());
                return Ok(());
            }

            let mut table = new_table(vec!["ID", "Username", "Email"]);
            for profile in &profiles {
                table.add_row(vec![
                    profile.id.clone(),
                    profile.username.clone().unwrap_or_else(|| "-".to_string()),
                    profile.email.clone().unwrap_or_else(|| "-".to_string()),
                ]);
            }
            println!("{}", table);
            println!("Total: {} users", profiles.len().to_string().cyan());
            Ok(())
        }
    }
}
