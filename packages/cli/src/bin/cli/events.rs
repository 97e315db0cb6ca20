use clap::Subcommand;
use colored::*;
use flowcraft_client::{EventLog, TelemetryEvent};
use flowcraft_config::ClientConfig;

use super::utils::{format_millis, new_table};

#[derive(Subcommand)]
pub enum EventsCommands {
    /// Show recorded events, oldest first
    List {
        /// Print the raw JSON array
        #[arg(long)]
        json: bool,
    },
    /// Delete the event log
    Clear,
}

pub fn handle_events_command(command: EventsCommands, config: &ClientConfig) -> anyhow::Result<()> {
    let log = EventLog::new(config.events_path.clone());

    match command {
        EventsCommands::List { json } => {
            let events = log.events();
            if json {
                println!("{}", serde_json::to_string_pretty(&events)?);
                return Ok(());
            }
            if events.is_empty() {
                println!("{}", "No events recorded".yellow());
                return Ok(());
            }

            let mut table = new_table(vec!["When", "Event", "Details"]);
            for event in &events {
                let (name, details) = describe(event);
                table.add_row(vec![format_millis(event.at()), name.to_string(), details]);
            }
            println!("{}", table);
            println!(
                "Total: {} events ({})",
                events.len().to_string().cyan(),
                log.path().display()
            );
            Ok(())
        }
        EventsCommands::Clear => {
            log.clear()?;
            println!("{} Event log cleared", "✓".green());
            Ok(())
        }
    }
}

fn describe(event: &TelemetryEvent) -> (&'static str, String) {
    match event {
        TelemetryEvent::DashboardOpen { .. } => ("dashboard_open", String::new()),
        TelemetryEvent::AlertClick { kind, .. } => ("alert_click", format!("{:?}", kind).to_lowercase()),
        TelemetryEvent::DndMove { from, to, .. } => ("dnd_move", format!("{} -> {}", from, to)),
        TelemetryEvent::MyIssuesOpen { .. } => ("my_issues_open", String::new()),
    }
}
