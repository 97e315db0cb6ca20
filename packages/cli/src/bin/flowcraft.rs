use clap::{Parser, Subcommand};
use colored::*;
use flowcraft_config::{ClientConfig, ServerConfig};
use std::path::PathBuf;
use std::process;

mod cli;

use cli::events::EventsCommands;
use cli::issues::IssuesCommands;
use cli::sprints::SprintsCommands;
use cli::token::TokenCommands;
use cli::users::UsersCommands;

#[derive(Parser)]
#[command(name = "flowcraft")]
#[command(about = "Flowcraft - sprint boards and issue tracking")]
#[command(version)]
struct Cli {
    /// Debug-level logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the API server and status-mutation function
    Serve {
        #[arg(long, help = "Interface to bind (overrides FLOWCRAFT_API_HOST)")]
        host: Option<String>,
        #[arg(long, help = "Port to bind (overrides FLOWCRAFT_API_PORT)")]
        port: Option<u16>,
        #[arg(long, help = "SQLite database file (overrides FLOWCRAFT_DB_PATH)")]
        db: Option<PathBuf>,
    },
    /// Manage identity tokens
    #[command(subcommand)]
    Token(TokenCommands),
    /// Manage the user directory used for assignee names
    #[command(subcommand)]
    Users(UsersCommands),
    /// List, create, and move issues
    #[command(subcommand)]
    Issues(IssuesCommands),
    /// Manage sprints
    #[command(subcommand)]
    Sprints(SprintsCommands),
    /// Dashboard summary, alerts, and sprint progress
    Report {
        /// Sprint to report on (defaults to the current sprint)
        #[arg(long, conflicts_with = "users")]
        sprint: Option<String>,
        /// Per-user activity instead of the dashboard
        #[arg(long)]
        users: bool,
        /// Keep users whose name, email, or id contains this
        #[arg(long, requires = "users")]
        query: Option<String>,
    },
    /// Inspect the local diagnostic event log
    #[command(subcommand)]
    Events(EventsCommands),
}

#[tokio::main]
async fn main() {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    flowcraft_cli::logging::init_tracing(cli.verbose);

    if let Err(e) = handle_command(cli.command).await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        process::exit(1);
    }
}

async fn handle_command(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Serve { host, port, db } => {
            let mut config = ServerConfig::from_env()?;
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(port) = port {
                config.port = port;
            }
            if let Some(db) = db {
                config.database_path = db;
            }

            println!(
                "{} Starting Flowcraft API on http://{}",
                "▶".green(),
                config.bind_address()
            );
            flowcraft_cli::run_server(config).await
        }
        Commands::Token(cmd) => cli::token::handle_token_command(cmd).await,
        Commands::Issues(cmd) => {
            cli::issues::handle_issues_command(cmd, &ClientConfig::from_env()?).await
        }
        Commands::Sprints(cmd) => {
            cli::sprints::handle_sprints_command(cmd, &ClientConfig::from_env()?).await
        }
        Commands::Users(cmd) => cli::users::handle_users_command(cmd).await,
        Commands::Report {
            users: true, query, ..
        } => {
            cli::report::show_user_activity(&ClientConfig::from_env()?, query.as_deref()).await
        }
        Commands::Report { sprint, .. } => {
            cli::report::show_report(&ClientConfig::from_env()?, sprint.as_deref()).await
        }
        Commands::Events(cmd) => cli::events::handle_events_command(cmd, &ClientConfig::from_env()?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowcraft_core::IssueStatus;

    #[test]
    fn test_parse_issue_move() {
        let cli = Cli::try_parse_from([
            "flowcraft",
            "issues",
            "move",
            "TSK-004",
            "In Review",
            "--index",
            "3",
        ])
        .unwrap();

        match cli.command {
            Commands::Issues(IssuesCommands::Move { id, status, index }) => {
                assert_eq!(id, "TSK-004");
                assert_eq!(status, IssueStatus::InReview);
                assert_eq!(index, Some(3));
            }
            _ => panic!("expected issues move"),
        }
    }

    #[test]
    fn test_move_accepts_column_ids() {
        let cli =
            Cli::try_parse_from(["flowcraft", "issues", "move", "TSK-004", "in_progress"]).unwrap();
        match cli.command {
            Commands::Issues(IssuesCommands::Move { status, index, .. }) => {
                assert_eq!(status, IssueStatus::InProgress);
                assert_eq!(index, None);
            }
            _ => panic!("expected issues move"),
        }
    }

    #[test]
    fn test_move_rejects_unknown_status() {
        assert!(Cli::try_parse_from(["flowcraft", "issues", "move", "TSK-004", "Doing"]).is_err());
    }

    #[test]
    fn test_sprint_and_backlog_conflict() {
        assert!(
            Cli::try_parse_from(["flowcraft", "issues", "list", "--sprint", "SPR-001", "--backlog"])
                .is_err()
        );
    }

    #[test]
    fn test_parse_serve_overrides() {
        let cli = Cli::try_parse_from(["flowcraft", "serve", "--port", "4100", "-v"]).unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Serve { host, port, db } => {
                assert_eq!(host, None);
                assert_eq!(port, Some(4100));
                assert_eq!(db, None);
            }
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn test_parse_token_create() {
        let cli = Cli::try_parse_from(["flowcraft", "token", "create", "laptop", "--user", "ana"])
            .unwrap();
        match cli.command {
            Commands::Token(TokenCommands::Create { name, user, .. }) => {
                assert_eq!(name, "laptop");
                assert_eq!(user, "ana");
            }
            _ => panic!("expected token create"),
        }
    }

    #[test]
    fn test_parse_report_users_query() {
        let cli = Cli::try_parse_from(["flowcraft", "report", "--users", "--query", "ali"]).unwrap();
        match cli.command {
            Commands::Report { users, query, sprint } => {
                assert!(users);
                assert_eq!(query.as_deref(), Some("ali"));
                assert_eq!(sprint, None);
            }
            _ => panic!("expected report"),
        }

        assert!(Cli::try_parse_from(["flowcraft", "report", "--query", "ali"]).is_err());
    }

    #[test]
    fn test_parse_users_set() {
        let cli = Cli::try_parse_from([
            "flowcraft", "users", "set", "user-1", "--username", "alice",
        ])
        .unwrap();
        match cli.command {
            Commands::Users(UsersCommands::Set {
                id,
                username,
                email,
                ..
            }) => {
                assert_eq!(id, "user-1");
                assert_eq!(username.as_deref(), Some("alice"));
                assert_eq!(email, None);
            }
            _ => panic!("expected users set"),
        }
    }
}
