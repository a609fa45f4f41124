//! Periodic refresh of the admin dashboard.
//!
//! Fetches deal, project, and invoice lists concurrently on a fixed
//! interval, computes [`DashboardStats`], and publishes a [`Remote`]
//! snapshot over a `watch` channel. Runs until `cancel` is triggered.

use std::time::Duration;

use chrono::{NaiveDate, Utc};
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use podium_core::dashboard::{compute_stats, DashboardStats, DealSummary, InvoiceSummary, ProjectSummary};

use crate::api::ApiClient;
use crate::error::FetchError;
use crate::resource::Remote;

/// List endpoints the dashboard aggregates, relative to the API root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardEndpoints {
    pub deals: String,
    pub projects: String,
    pub invoices: String,
}

impl Default for DashboardEndpoints {
    fn default() -> Self {
        Self {
            deals: "deals".to_string(),
            projects: "projects".to_string(),
            invoices: "invoices".to_string(),
        }
    }
}

/// Fetch the three lists concurrently and aggregate them. Any failed list
/// fails the whole fetch.
pub async fn fetch_stats(
    client: &ApiClient,
    endpoints: &DashboardEndpoints,
    today: NaiveDate,
) -> Result<DashboardStats, FetchError> {
    let (deals, projects, invoices) = tokio::try_join!(
        client.get_list::<DealSummary>(&endpoints.deals),
        client.get_list::<ProjectSummary>(&endpoints.projects),
        client.get_list::<InvoiceSummary>(&endpoints.invoices),
    )?;
    Ok(compute_stats(&deals, &projects, &invoices, today))
}

/// Run the dashboard polling loop.
///
/// The first fetch happens immediately. Failures are logged and published;
/// the previous stats stay available as stale data and the loop continues.
pub async fn run(
    client: ApiClient,
    endpoints: DashboardEndpoints,
    interval: Duration,
    sender: watch::Sender<Remote<DashboardStats>>,
    cancel: CancellationToken,
) {
    tracing::info!(interval_secs = interval.as_secs(), "Dashboard poller started");

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Dashboard poller stopping");
                break;
            }
            _ = ticker.tick() => {
                sender.send_modify(Remote::start_loading);

                let result = tokio::select! {
                    _ = cancel.cancelled() => {
                        tracing::info!("Dashboard poller stopping during refresh");
                        break;
                    }
                    result = fetch_stats(&client, &endpoints, Utc::now().date_naive()) => result,
                };
                match &result {
                    Ok(stats) => tracing::debug!(
                        open_deals = stats.open_deals,
                        active_projects = stats.active_projects,
                        "Dashboard refreshed",
                    ),
                    Err(e) => tracing::error!(error = %e, "Dashboard refresh failed"),
                }

                sender.send_modify(|remote| remote.resolve(result));
            }
        }
    }
}
