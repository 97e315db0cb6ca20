use clap::Subcommand;
use colored::*;
use flowcraft_client::{AppStore, MutationOutcome};
use flowcraft_config::ClientConfig;
use flowcraft_core::filters::IssueFilter;
use flowcraft_core::{Issue, IssueCreateInput, IssueStatus, IssueType, Priority};

use super::utils::{colored_priority, colored_status, format_timestamp, new_table, parse_status, truncate};

#[derive(Subcommand)]
pub enum IssuesCommands {
    /// List issues, newest first
    List {
        /// Only issues in this sprint
        #[arg(long, conflicts_with = "backlog")]
        sprint: Option<String>,
        /// Only issues without a sprint
        #[arg(long)]
        backlog: bool,
        /// Case-insensitive title substring
        #[arg(long)]
        title: Option<String>,
        /// Case-insensitive assignee substring
        #[arg(long)]
        assignee: Option<String>,
        #[arg(long)]
        priority: Option<Priority>,
    },
    /// Create an issue
    Create {
        title: String,
        #[arg(long = "type", default_value = "Task")]
        issue_type: IssueType,
        #[arg(long, default_value = "P2")]
        priority: Priority,
        #[arg(long)]
        sprint: Option<String>,
        #[arg(long)]
        assignee: Option<String>,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Move an issue to another board column
    Move {
        id: String,
        /// Target status, e.g. "In Progress" or IN_PROGRESS
        #[arg(value_parser = parse_status)]
        status: IssueStatus,
        /// Position within the target column
        #[arg(long)]
        index: Option<i64>,
    },
}

pub async fn handle_issues_command(
    command: IssuesCommands,
    config: &ClientConfig,
) -> anyhow::Result<()> {
    let store = flowcraft_cli::open_store(config)?;

    match command {
        IssuesCommands::List {
            sprint,
            backlog,
            title,
            assignee,
            priority,
        } => {
            store.load_data().await?;
            if let Err(e) = store.load_profiles().await {
                eprintln!("{} Showing raw assignee ids: {}", "!".yellow(), e);
            }

            let issues = match (&sprint, backlog) {
                (Some(sprint_id), _) => store.issues_in_sprint(sprint_id),
                (None, true) => store.backlog(),
                (None, false) => store.issues(),
            };
            let filter = IssueFilter {
                title: title.unwrap_or_default(),
                assignee: assignee.unwrap_or_default(),
                priority,
            };
            let shown = filter.apply(&issues, |id| store.assignee_name(id));

            print_issues(&shown, &store);
            Ok(())
        }
        IssuesCommands::Create {
            title,
            issue_type,
            priority,
            sprint,
            assignee,
            description,
        } => {
            let input = IssueCreateInput {
                issue_type,
                priority,
                sprint_id: sprint,
                assignee_id: assignee,
                description,
                ..IssueCreateInput::new(title)
            };
            let issue = store.create_issue(&input).await?;
            println!("{} Created {} {}", "✓".green(), issue.id.bold(), issue.title);
            Ok(())
        }
        IssuesCommands::Move { id, status, index } => move_issue(&store, &id, status, index).await,
    }
}

async fn move_issue(
    store: &AppStore,
    issue_id: &str,
    status: IssueStatus,
    index: Option<i64>,
) -> anyhow::Result<()> {
    store.load_data().await?;

    match store.move_issue_status(issue_id, status, index).await? {
        MutationOutcome::Confirmed(issue) => {
            println!(
                "{} {} is now {}",
                "✓".green(),
                issue.id.bold(),
                colored_status(issue.status)
            );
        }
        MutationOutcome::Superseded => {
            println!(
                "{} A newer move of {} took precedence",
                "!".yellow(),
                issue_id.bold()
            );
        }
    }
    Ok(())
}

fn print_issues(issues: &[&Issue], store: &AppStore) {
    if issues.is_empty() {
        println!("{}", "No issues found".yellow());
        return;
    }

    let mut table = new_table(vec![
        "ID", "Title", "Type", "Status", "Priority", "Sprint", "Assignee", "Updated",
    ]);
    for issue in issues {
        table.add_row(vec![
            issue.id.clone(),
            truncate(&issue.title, 40),
            issue.issue_type.as_str().to_string(),
            colored_status(issue.status).to_string(),
            colored_priority(issue.priority).to_string(),
            issue.sprint_id.clone().unwrap_or_else(|| "backlog".to_string()),
            match issue.assignee_id.as_deref() {
                Some(id) => store.assignee_name(Some(id)),
                None => "-".to_string(),
            },
            format_timestamp(&issue.updated_at),
        ]);
    }

    println!("{}", table);
    println!("Total: {} issues", issues.len().to_string().cyan());
}
