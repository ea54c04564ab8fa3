//! Plain-text lines for terminal output.

use tracker_core::formatting::{abbreviate, format_bytes, format_currency};
use tracker_core::models::{
    AppVersion, CaAlert, GitHubBackup, MonitoringConfig, MonitoringStatus, NameAlert,
    TrackedAccount,
};
use tracker_core::notifications::{Notice, NoticeLevel};
use tracker_core::store::DashboardStore;
use tracker_core::time_utils::{parse_backend_timestamp, TimezoneHandler};

/// Renders timestamps in the configured timezone and clock.
#[derive(Debug, Clone, Copy)]
pub struct Renderer {
    tz: TimezoneHandler,
    use_12h: bool,
}

impl Renderer {
    pub fn new(timezone: &str, use_12h: bool) -> Self {
        Self {
            tz: TimezoneHandler::new(timezone),
            use_12h,
        }
    }

    pub fn timezone(&self) -> &TimezoneHandler {
        &self.tz
    }

    pub fn use_12h(&self) -> bool {
        self.use_12h
    }

    fn time(&self, dt: Option<chrono::DateTime<chrono::Utc>>) -> String {
        dt.map(|dt| self.tz.format_local(dt, self.use_12h))
            .unwrap_or_else(|| "-".to_string())
    }

    pub fn notice(&self, notice: &Notice) -> String {
        let marker = match notice.level {
            NoticeLevel::Info => "",
            NoticeLevel::Error => "[error] ",
        };
        format!(
            "{} {}{}: {}",
            self.time(Some(notice.raised_at)),
            marker,
            notice.title,
            notice.description
        )
    }

    pub fn name_alert(&self, alert: &NameAlert) -> String {
        let mut line = format!(
            "{:<12} {:>3} accounts  first seen {}",
            alert.token_name,
            alert.quorum_count,
            self.time(alert.first_seen)
        );
        if !alert.accounts_mentioned.is_empty() {
            let handles: Vec<String> = alert
                .accounts_mentioned
                .iter()
                .map(|a| format!("@{a}"))
                .collect();
            line.push_str("  ");
            line.push_str(&handles.join(", "));
        }
        line
    }

    pub fn ca_alert(&self, alert: &CaAlert) -> String {
        // alert_time_utc is a display string; show it localised when it parses.
        let when = parse_backend_timestamp(&alert.alert_time_utc)
            .map(|dt| self.tz.format_local(dt, self.use_12h))
            .unwrap_or_else(|| alert.alert_time_utc.clone());
        let mut line = format!(
            "{:<12} {:>14}  {}  {}",
            alert.token_name,
            format_currency(alert.market_cap),
            abbreviate(&alert.contract_address, 6, 4),
            when
        );
        if !alert.photon_url.is_empty() {
            line.push_str("  ");
            line.push_str(&alert.photon_url);
        }
        line
    }

    pub fn version(&self, version: &AppVersion) -> String {
        format!(
            "{:<16} {:<36} {}  {}",
            version.version_number,
            version.tag_name.as_deref().unwrap_or("-"),
            self.time(version.timestamp),
            version.id.as_deref().unwrap_or("-")
        )
    }

    pub fn backup(&self, backup: &GitHubBackup) -> String {
        format!(
            "{:<16} {}  {}",
            backup.version_tag.as_deref().unwrap_or("-"),
            self.time(backup.timestamp),
            backup.size.map(format_bytes).unwrap_or_else(|| "-".to_string())
        )
    }

    /// Multi-line summary of a loaded store.
    pub fn summary(&self, store: &DashboardStore) -> Vec<String> {
        let mut lines = Vec::new();
        lines.extend(status(&store.monitoring_status, store.alert_threshold));

        lines.push(String::new());
        lines.push(format!("Name alerts ({})", store.name_alerts.len()));
        lines.extend(store.name_alerts.iter().map(|a| format!("  {}", self.name_alert(a))));

        lines.push(String::new());
        lines.push(format!("CA alerts ({})", store.ca_alerts.len()));
        lines.extend(store.ca_alerts.iter().map(|a| format!("  {}", self.ca_alert(a))));

        lines.push(String::new());
        lines.push(format!("Tracked accounts ({})", store.accounts.len()));
        lines.extend(store.accounts.iter().map(|a| format!("  {}", account(a))));

        lines.push(String::new());
        lines.push(format!("Versions ({})", store.versions.len()));
        lines.extend(store.versions.iter().map(|v| format!("  {}", self.version(v))));

        if !store.github_backups.is_empty() {
            lines.push(String::new());
            lines.push(format!("GitHub backups ({})", store.github_backups.len()));
            lines.extend(store.github_backups.iter().map(|b| format!("  {}", self.backup(b))));
        }
        lines
    }
}

pub fn account(account: &TrackedAccount) -> String {
    let state = if account.is_active { "active" } else { "inactive" };
    let display = if account.display_name.is_empty() {
        &account.username
    } else {
        &account.display_name
    };
    format!(
        "{:<10} @{:<20} {:<24} {:<8} names {:>3}  CAs {:>3}",
        account.id.as_deref().unwrap_or("-"),
        account.username,
        display,
        state,
        account.name_alerts_contributed,
        account.accepted_cas_posted
    )
}

pub fn status(status: &MonitoringStatus, threshold: u32) -> Vec<String> {
    let state = if status.is_monitoring { "running" } else { "stopped" };
    let mut lines = vec![
        format!("Monitoring:      {state}"),
        format!("Accounts:        {}", status.monitored_accounts_count),
        format!("Alert threshold: {threshold}"),
    ];
    if let Some(kind) = &status.monitoring_type {
        lines.push(format!("Type:            {kind}"));
    }
    if let Some(filtered) = status.known_tokens_filtered {
        lines.push(format!("Known tokens:    {filtered}"));
    }
    if let Some(last) = &status.last_check {
        lines.push(format!("Last check:      {last}"));
    }
    lines
}

pub fn config(config: &MonitoringConfig) -> Vec<String> {
    vec![
        format!("alert_threshold            {}", config.alert_threshold),
        format!("check_interval_seconds     {}", config.check_interval_seconds),
        format!("enable_browser_monitoring  {}", config.enable_browser_monitoring),
        format!("enable_rss_monitoring      {}", config.enable_rss_monitoring),
        format!("enable_scraping_monitoring {}", config.enable_scraping_monitoring),
        format!("filter_old_tokens          {}", config.filter_old_tokens),
        format!("filter_tokens_with_ca      {}", config.filter_tokens_with_ca),
    ]
}

// ── Tests ──────────────────────────────────────────────────────────────────────
