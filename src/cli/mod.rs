//! Command-line interface for triggerhub.
//!
//! Provides commands for removing a trigger from a workflow and for
//! inspecting the registries and the removal journal.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::adapters::HttpFrontendClient;
use crate::config::{self, ResolvedConfig};
use crate::core::{handle_request, Coordinator, Journal};
use crate::domain::RemovalRequest;
use crate::store::SqliteStore;

/// triggerhub - Trigger/workflow association manager
#[derive(Parser, Debug)]
#[command(name = "triggerhub")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Remove a trigger from a workflow
    Remove {
        /// Owner's email
        #[arg(long)]
        email: String,

        /// Trigger name
        #[arg(short, long)]
        trigger: String,

        /// Workflow name
        #[arg(short, long)]
        workflow: String,

        /// Storage user id (derived from the email if omitted)
        #[arg(long)]
        storage_userid: Option<String>,
    },

    /// Show a trigger record
    Trigger {
        /// Trigger id ({storage_userid}_{trigger_name})
        trigger_id: String,
    },

    /// List a user's triggers
    Triggers {
        #[arg(long)]
        email: String,
    },

    /// List available trigger frontends
    Frontends,

    /// Show the removal journal
    History {
        /// Only events for this trigger id
        #[arg(short, long)]
        trigger: Option<String>,

        /// Only events for this workflow (requires --trigger)
        #[arg(short, long, requires = "trigger")]
        workflow: Option<String>,
    },
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        let config = config::config()?;

        match self.command {
            Commands::Remove {
                email,
                trigger,
                workflow,
                storage_userid,
            } => {
                let request = RemovalRequest {
                    email,
                    trigger_name: trigger,
                    workflow_name: workflow,
                    storage_userid,
                };
                cmd_remove(config, request).await
            }
            Commands::Trigger { trigger_id } => cmd_trigger(config, &trigger_id).await,
            Commands::Triggers { email } => cmd_triggers(config, &email).await,
            Commands::Frontends => cmd_frontends(config).await,
            Commands::History { trigger, workflow } => {
                cmd_history(config, trigger.as_deref(), workflow.as_deref()).await
            }
        }
    }
}

async fn build_coordinator(config: &ResolvedConfig) -> Result<Coordinator> {
    let store = SqliteStore::open(&config.store_path)
        .with_context(|| format!("Failed to open store: {}", config.store_path.display()))?;
    let client = HttpFrontendClient::from_settings(&config.frontend)
        .context("Failed to build frontend HTTP client")?;

    let mut coordinator = Coordinator::new(Arc::new(store), Arc::new(client));
    if let Some(path) = &config.journal_path {
        coordinator = coordinator.with_journal(Journal::open(path).await?);
    }
    Ok(coordinator)
}

async fn cmd_remove(config: &ResolvedConfig, request: RemovalRequest) -> Result<()> {
    let coordinator = Arc::new(build_coordinator(config).await?);
    let response = handle_request(&coordinator, request).await;

    println!("{}", serde_json::to_string_pretty(&response)?);
    if !response.is_success() {
        anyhow::bail!("removal failed");
    }
    Ok(())
}

async fn cmd_trigger(config: &ResolvedConfig, trigger_id: &str) -> Result<()> {
    let coordinator = build_coordinator(config).await?;

    match coordinator.triggers().lookup(trigger_id).await {
        Some(record) => {
            println!("Trigger:  {}", trigger_id);
            println!("Frontend: {}", record.frontend_ip_port);
            if record.associated_workflows.is_empty() {
                println!("Workflows: (none)");
            } else {
                println!("Workflows:");
                for (name, reference) in &record.associated_workflows {
                    println!("  {} -> {}", name, reference);
                }
            }
            Ok(())
        }
        None => anyhow::bail!("Trigger {} not found", trigger_id),
    }
}

async fn cmd_triggers(config: &ResolvedConfig, email: &str) -> Result<()> {
    let coordinator = build_coordinator(config).await?;
    let triggers = coordinator.triggers().user_triggers(email).await?;

    if triggers.is_empty() {
        println!("No triggers for {}", email);
        return Ok(());
    }

    println!("{:<30} TRIGGER ID", "NAME");
    println!("{}", "-".repeat(60));
    for (name, id) in &triggers {
        println!("{:<30} {}", name, id);
    }
    Ok(())
}

async fn cmd_frontends(config: &ResolvedConfig) -> Result<()> {
    let coordinator = build_coordinator(config).await?;
    let frontends = coordinator.frontends().list_available().await?;

    if frontends.is_empty() {
        println!("No available trigger frontends");
        return Ok(());
    }

    for frontend in &frontends {
        let info = coordinator.frontends().info(frontend).await?;
        match info {
            Some(entry) => println!("{}  {}", frontend, serde_json::to_string(&entry)?),
            None => println!("{}", frontend),
        }
    }
    Ok(())
}

async fn cmd_history(
    config: &ResolvedConfig,
    trigger: Option<&str>,
    workflow: Option<&str>,
) -> Result<()> {
    let Some(path) = &config.journal_path else {
        anyhow::bail!("Journal is disabled in the configuration");
    };
    let journal = Journal::open(path).await?;

    let events = journal.replay().await?;
    let events: Vec<_> = events
        .into_iter()
        .filter(|e| trigger.map_or(true, |t| e.trigger_id == t))
        .filter(|e| workflow.map_or(true, |w| e.workflow_name == w))
        .collect();

    if events.is_empty() {
        println!("No journal entries");
        return Ok(());
    }

    for event in &events {
        let error = event
            .error
            .as_deref()
            .map(|e| format!("  error: {}", e))
            .unwrap_or_default();
        println!(
            "{}  {:<20} {:<25} {:?}  {}{}",
            event.timestamp.format("%Y-%m-%d %H:%M:%S"),
            event.trigger_id,
            event.workflow_name,
            event.event_type,
            event.summary,
            error
        );
    }

    if let (Some(t), Some(w)) = (trigger, workflow) {
        if let Some(state) = journal.edge_state(t, w).await? {
            println!("\nEdge state: {:?}", state);
        }
    }
    Ok(())
}
