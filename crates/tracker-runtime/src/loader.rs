//! One-shot initial load.
//!
//! Eight reads run concurrently. Six of them are required: if any fails the
//! whole load is reported as a single failure and nothing is applied. The
//! two GitHub reads are optional and fall back to empty defaults, since most
//! installations never configure GitHub.

use serde_json::Value;

use tracker_core::notifications::Notice;
use tracker_core::store::{Action, InitialData};
use tracker_core::Result;

use crate::api::DashboardApi;

/// Fetch everything the dashboard shows on start.
pub async fn load_initial_data(api: &dyn DashboardApi) -> Result<InitialData> {
    let (
        name_alerts,
        ca_alerts,
        accounts,
        performance,
        versions,
        monitoring_status,
        github_backups,
        github_stats,
    ) = tokio::join!(
        api.name_alerts(),
        api.ca_alerts(),
        api.accounts(),
        api.performance(),
        api.versions(),
        api.monitoring_status(),
        api.github_backups(),
        api.github_stats(),
    );

    let github_backups = github_backups.unwrap_or_else(|e| {
        tracing::debug!(error = %e, "GitHub backups unavailable");
        Vec::new()
    });
    let github_stats = github_stats.unwrap_or_else(|e| {
        tracing::debug!(error = %e, "GitHub stats unavailable");
        Value::Object(Default::default())
    });

    Ok(InitialData {
        name_alerts: name_alerts?,
        ca_alerts: ca_alerts?,
        accounts: accounts?,
        performance: performance?,
        versions: versions?,
        monitoring_status: monitoring_status?,
        github_backups,
        github_stats,
    })
}

/// Run the initial load and express the outcome as a store action.
pub async fn initial_load_action(api: &dyn DashboardApi) -> Action {
    match load_initial_data(api).await {
        Ok(data) => {
            tracing::info!(
                name_alerts = data.name_alerts.len(),
                ca_alerts = data.ca_alerts.len(),
                accounts = data.accounts.len(),
                versions = data.versions.len(),
                "initial data loaded"
            );
            Action::InitialDataLoaded(Box::new(data))
        }
        Err(e) => {
            tracing::warn!(error = %e, "initial load failed");
            Action::Notify(Notice::failure("load initial data"))
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
