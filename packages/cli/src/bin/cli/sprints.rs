use chrono::NaiveDate;
use clap::Subcommand;
use colored::*;
use flowcraft_config::ClientConfig;
use flowcraft_core::{Sprint, SprintCreateInput, SprintStatus};

use super::utils::new_table;

#[derive(Subcommand)]
pub enum SprintsCommands {
    /// List sprints, newest first
    List,
    /// Create a planned sprint
    Create {
        name: String,
        /// First day (YYYY-MM-DD)
        #[arg(long)]
        start: NaiveDate,
        /// Last day (YYYY-MM-DD), after the start
        #[arg(long)]
        end: NaiveDate,
    },
    /// Make a sprint the active one
    Start { id: String },
    /// Complete a sprint; unfinished issues return to the backlog
    End { id: String },
}

pub async fn handle_sprints_command(
    command: SprintsCommands,
    config: &ClientConfig,
) -> anyhow::Result<()> {
    let store = flowcraft_cli::open_store(config)?;

    match command {
        SprintsCommands::List => {
            store.load_data().await?;
            print_sprints(&store.sprints());
            Ok(())
        }
        SprintsCommands::Create { name, start, end } => {
            let input = SprintCreateInput {
                name,
                status: SprintStatus::Planned,
                start_date: start,
                end_date: end,
            };
            let sprint = store.create_sprint(&input).await?;
            println!("{} Created {} {}", "✓".green(), sprint.id.bold(), sprint.name);
            Ok(())
        }
        SprintsCommands::Start { id } => {
            store.load_data().await?;
            let result = store.start_sprint(&id).await?;

            println!("{} {} is now active", "✓".green(), result.sprint.name.bold());
            for demoted in &result.demoted {
                println!("  {} {} moved back to Planned", "↩".yellow(), demoted.name);
            }
            Ok(())
        }
        SprintsCommands::End { id } => {
            store.load_data().await?;
            let result = store.end_sprint(&id).await?;

            println!("{} {} completed", "✓".green(), result.sprint.name.bold());
            if result.detached_issue_ids.is_empty() {
                println!("  All issues were done");
            } else {
                println!(
                    "  {} unfinished issue(s) returned to the backlog: {}",
                    result.detached_issue_ids.len().to_string().yellow(),
                    result.detached_issue_ids.join(", ")
                );
            }
            Ok(())
        }
    }
}

fn print_sprints(sprints: &[Sprint]) {
    if sprints.is_empty() {
        println!("{}", "No sprints found".yellow());
        println!("{}", "Use 'flowcraft sprints create' to plan one".dimmed());
        return;
    }

    let mut table = new_table(vec!["ID", "Name", "Status", "Start", "End"]);
    for sprint in sprints {
        let status = match sprint.status {
            SprintStatus::Active => sprint.status.as_str().green().to_string(),
            SprintStatus::Completed => sprint.status.as_str().dimmed().to_string(),
            SprintStatus::Planned => sprint.status.as_str().to_string(),
        };
        table.add_row(vec![
            sprint.id.clone(),
            sprint.name.clone(),
            status,
            sprint.start_date.to_string(),
            sprint.end_date.to_string(),
        ]);
    }

    println!("{}", table);
}
