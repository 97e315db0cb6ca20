use anyhow::Context;
use chrono::{Duration, Utc};
use clap::Subcommand;
use colored::*;
use flowcraft_config::ServerConfig;
use flowcraft_security::TokenStorage;
use flowcraft_storage::connect;
use std::path::PathBuf;

use super::utils::{format_timestamp, new_table};

#[derive(Subcommand)]
pub enum TokenCommands {
    /// Mint a bearer token for a user
    Create {
        /// Label for the token
        name: String,
        /// User the token authenticates as
        #[arg(long, default_value = "local-user")]
        user: String,
        /// Expire after this many days
        #[arg(long)]
        expires_in_days: Option<i64>,
        /// SQLite database file (overrides FLOWCRAFT_DB_PATH)
        #[arg(long)]
        db: Option<PathBuf>,
    },
    /// List tokens
    List {
        #[arg(long)]
        db: Option<PathBuf>,
    },
    /// Revoke a token by id
    Revoke {
        id: String,
        #[arg(long)]
        db: Option<PathBuf>,
    },
}

async fn open_token_storage(db: Option<PathBuf>) -> anyhow::Result<TokenStorage> {
    let path = match db {
        Some(path) => path,
        None => ServerConfig::from_env()?.database_path,
    };
    let pool = connect(&path)
        .await
        .with_context(|| format!("Failed to open database at {}", path.display()))?;
    Ok(TokenStorage::new(pool))
}

pub async fn handle_token_command(command: TokenCommands) -> anyhow::Result<()> {
    match command {
        TokenCommands::Create {
            name,
            user,
            expires_in_days,
            db,
        } => {
            let storage = open_token_storage(db).await?;
            let expires_at = expires_in_days.map(|days| Utc::now() + Duration::days(days));
            let generated = storage.create_token(&name, &user, expires_at).await?;

            println!("{}", "Token created".green().bold());
            println!("  {} {}", "ID:".bold(), generated.record.id);
            println!("  {} {}", "User:".bold(), generated.record.user_id);
            println!("  {} {}", "Token:".bold(), generated.token.yellow());
            println!();
            println!(
                "{}",
                "Store it now; only its hash is kept. Set FLOWCRAFT_TOKEN to use it.".dimmed()
            );
            Ok(())
        }
        TokenCommands::List { db } => {
            let storage = open_token_storage(db).await?;
            let tokens = storage.list_tokens().await?;

            if tokens.is_empty() {
                println!("{}", "No tokens found".yellow());
                println!("{}", "Use 'flowcraft token create <name>' to mint one".dimmed());
                return Ok(());
            }

            let now = Utc::now();
            let mut table = new_table(vec!["ID", "Name", "User", "Created", "Last used", "State"]);
            for token in &tokens {
                let state = if !token.is_active {
                    "revoked"
                } else if token.is_expired(now) {
                    "expired"
                } else {
                    "active"
                };
                table.add_row(vec![
                    token.id.clone(),
                    token.name.clone(),
                    token.user_id.clone(),
                    format_timestamp(&token.created_at),
                    token
                        .last_used_at
                        .as_ref()
                        .map(format_timestamp)
                        .unwrap_or_else(|| "never".to_string()),
                    state.to_string(),
                ]);
            }

            println!("{}", table);
            println!("Total: {} tokens", tokens.len().to_string().cyan());
            Ok(())
        }
        TokenCommands::Revoke { id, db } => {
            let storage = open_token_storage(db).await?;
            storage.revoke_token(&id).await?;
            println!("{} Token {} revoked", "✓".green(), id);
            Ok(())
        }
    }
}
