use anyhow::anyhow;
use chrono::Utc;
use colored::*;
use flowcraft_client::TelemetryEvent;
use flowcraft_config::ClientConfig;
use flowcraft_core::metrics::{
    aggregate_sprint_issues, is_on_track, user_activity, AlertKind, DashboardAlerts,
    DashboardSummary,
};
use flowcraft_core::IssueStatus;

use super::utils::new_table;

pub async fn show_report(config: &ClientConfig, sprint_id: Option<&str>) -> anyhow::Result<()> {
    let store = flowcraft_cli::open_store(config)?;
    store.load_data().await?;
    store.event_log().record(TelemetryEvent::dashboard_open()).await;

    let issues = store.issues();
    let sprints = store.sprints();

    let summary = DashboardSummary::compute(&issues, &sprints, None);
    println!("{}", "Dashboard".blue().bold());
    println!("  Open issues:          {}", summary.open_issues.to_string().cyan());
    println!(
        "  Open high priority:   {}",
        summary.open_high_priority.to_string().red()
    );
    if let Some(pct) = summary.active_sprint_done_pct {
        println!("  Active sprint done:   {}%", pct);
    }
    println!();

    let alerts = DashboardAlerts::compute(&issues, &sprints, Utc::now());
    if alerts.is_empty() {
        println!("{}", "No alerts".green());
    } else {
        println!("{}", "Alerts".yellow().bold());
        for (kind, label) in [
            (AlertKind::Overdue, "Overdue sprints"),
            (AlertKind::Unassigned, "Unassigned issues"),
            (AlertKind::Stale, "Stale in-progress issues"),
        ] {
            let ids = alerts.ids(kind);
            if !ids.is_empty() {
                println!("  {} ({}): {}", label, ids.len(), ids.join(", "));
            }
        }
    }
    println!();

    let sprint = match sprint_id {
        Some(id) => Some(
            store
                .sprint(id)
                .ok_or_else(|| anyhow!("Sprint not found: {}", id))?,
        ),
        None => store.current_sprint(),
    };
    let Some(sprint) = sprint else {
        println!("{}", "No sprints yet".dimmed());
        return Ok(());
    };

    let sprint_issues = store.issues_in_sprint(&sprint.id);
    let aggregate = aggregate_sprint_issues(&sprint_issues);

    println!(
        "{} {} ({}, {} to {})",
        "Sprint".blue().bold(),
        sprint.name.bold(),
        sprint.status,
        sprint.start_date,
        sprint.end_date
    );
    let mut table = new_table(vec!["Status", "Issues"]);
    for status in IssueStatus::ALL {
        let count = aggregate.by_status.get(&status).copied().unwrap_or_default();
        table.add_row(vec![status.as_str().to_string(), count.to_string()]);
    }
    println!("{}", table);

    let progress = format!("{}% done", aggregate.done_pct);
    if is_on_track(aggregate.done_pct) {
        println!("{} ({} issues, on track)", progress.green(), aggregate.total);
    } else {
        println!("{} ({} issues)", progress.yellow(), aggregate.total);
    }
    Ok(())
}

/// Per-assignee workload, most completed first
pub async fn show_user_activity(config: &ClientConfig, query: Option<&str>) -> anyhow::Result<()> {
    let store = flowcraft_cli::open_store(config)?;
    store.load_data().await?;
    if let Err(e) = store.load_profiles().await {
        eprintln!("{} Showing raw assignee ids: {}", "!".yellow(), e);
    }

    let rows = user_activity(&store.issues(), &store.profiles(), query.unwrap_or_default());
    println!("{}", "User Activity".blue().bold());
    if rows.is_empty() {
        println!("{}", "No users / issues to report".yellow());
        return Ok(());
    }

    let mut table = new_table(vec![
        "User",
        "Assigned",
        "Done",
        "In Progress",
        "In Review",
        "Todo",
    ]);
    for row in &rows {
        table.add_row(vec![
            row.label().to_string(),
            row.assigned.to_string(),
            row.done.to_string(),
            row.in_progress.to_string(),
            row.in_review.to_string(),
            row.todo.to_string(),
        ]);
    }
    println!("{}", table);
    Ok(())
}
