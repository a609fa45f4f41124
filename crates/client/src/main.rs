//! `podium` -- command-line companion to the booking console.
//!
//! # Environment variables
//!
//! | Variable                      | Required | Default                     |
//! |-------------------------------|----------|-----------------------------|
//! | `PODIUM_API_URL`              | no       | `http://localhost:3000/api` |
//! | `PODIUM_API_TOKEN`            | no       | --                          |
//! | `PODIUM_BYPASS_HEADER`        | no       | -- (`name:value`)           |
//! | `PODIUM_POLL_INTERVAL_SECS`   | no       | `30`                        |
//! | `PODIUM_REQUEST_TIMEOUT_SECS` | no       | --                          |

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde_json::json;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use podium_client::api::ApiClient;
use podium_client::config::ClientConfig;
use podium_client::gateway::{Endpoint, Gateway};
use podium_client::poller::{self, DashboardEndpoints};
use podium_client::resource::{Remote, RemoteState};
use podium_core::checklist::{self, StageChecklist};
use podium_core::layouts::project_details;
use podium_core::status::{Lifecycle, ProjectStage};
use podium_core::types::EntityId;

#[derive(Debug, Parser)]
#[command(name = "podium", about = "Podium booking console tools")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print a project's details completion and checklist progress as JSON.
    Report { project_id: EntityId },
    /// Poll dashboard statistics and log each snapshot until Ctrl-C.
    Dashboard,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "podium_client=info,podium=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = ClientConfig::from_env().context("invalid configuration")?;
    let client = ApiClient::from_config(&config).context("failed to build HTTP client")?;

    tracing::info!(
        api_url = %config.api_url,
        authenticated = config.token.is_some(),
        "Starting podium",
    );

    match cli.command {
        Command::Report { project_id } => report(client, project_id).await,
        Command::Dashboard => dashboard(client, &config).await,
    }
}

async fn report(client: ApiClient, project_id: EntityId) -> anyhow::Result<()> {
    let gateway = Gateway::new(client);
    let endpoint = Endpoint::entity("projects", project_id);
    let editor = gateway
        .load(&endpoint, project_details::layout()?)
        .await
        .with_context(|| format!("failed to load project {project_id}"))?;

    let score = editor.completion(&project_details::completion_schema());

    let stage = editor
        .record()
        .lookup("status")
        .and_then(|node| node.as_leaf())
        .and_then(|value| value.as_str())
        .and_then(|raw| ProjectStage::from_str_db(raw).ok());

    let stages: Vec<serde_json::Value> = match stage {
        Some(current) => {
            let list = StageChecklist::from_record(editor.record());
            checklist::visible_stages(current)
                .iter()
                .map(|&stage| {
                    let progress = list.stage_progress(stage);
                    json!({
                        "stage": stage.as_str(),
                        "label": stage.label(),
                        "completed": progress.completed,
                        "total": progress.total,
                        "percentage": progress.percentage,
                    })
                })
                .collect()
        }
        None => Vec::new(),
    };

    let output = json!({
        "project_id": project_id,
        "status": stage.map(|s| s.as_str()),
        "completion": score,
        "checklist": stages,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

async fn dashboard(client: ApiClient, config: &ClientConfig) -> anyhow::Result<()> {
    let (sender, mut receiver) = watch::channel(Remote::new());
    let cancel = CancellationToken::new();

    let handle = tokio::spawn(poller::run(
        client,
        DashboardEndpoints::default(),
        config.poll_interval,
        sender,
        cancel.clone(),
    ));

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutdown requested");
                break;
            }
            changed = receiver.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = receiver.borrow_and_update().clone();
                log_snapshot(&snapshot);
            }
        }
    }

    cancel.cancel();
    handle.await.context("dashboard poller panicked")?;
    Ok(())
}

fn log_snapshot(snapshot: &Remote<podium_core::dashboard::DashboardStats>) {
    match snapshot.state() {
        RemoteState::Ready(stats) => tracing::info!(
            open_deals = stats.open_deals,
            pipeline_value = stats.pipeline_value,
            win_rate = stats.win_rate,
            active_projects = stats.active_projects,
            upcoming_events = stats.upcoming_events,
            outstanding = stats.outstanding_amount,
            overdue_invoices = stats.overdue_invoices,
            "Dashboard",
        ),
        RemoteState::Failed(error) => tracing::warn!(
            error = %error,
            stale = snapshot.is_stale(),
            "Dashboard unavailable",
        ),
        RemoteState::Loading | RemoteState::Idle => {}
    }
}
