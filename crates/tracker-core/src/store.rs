//! Dashboard state and its reducer.
//!
//! [`DashboardStore`] is owned by exactly one task. Everything that changes
//! it (the initial loader, the live channel, user actions) is expressed as
//! an [`Action`] and applied in arrival order by [`DashboardStore::apply`].
//! The store never performs I/O.

use std::fmt;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, trace};

use crate::messages::{InitialState, ServerMessage};
use crate::models::{
    AppVersion, CaAlert, GitHubBackup, MonitoringStatus, NameAlert, TokenMention, TrackedAccount,
    DEFAULT_ALERT_THRESHOLD,
};
use crate::notifications::{Notice, NoticeLog};

// ── Connection status ─────────────────────────────────────────────────────────

/// State of the live-update socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    /// A connect attempt or the open socket failed.
    Error,
    /// Reconnecting stopped after the configured number of failures.
    GaveUp,
}

impl ConnectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionStatus::Disconnected => "disconnected",
            ConnectionStatus::Connecting => "connecting",
            ConnectionStatus::Connected => "connected",
            ConnectionStatus::Error => "error",
            ConnectionStatus::GaveUp => "gave_up",
        }
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Forms ─────────────────────────────────────────────────────────────────────

/// Pending input for the add-account action.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountForm {
    pub username: String,
    pub display_name: String,
}

/// Pending input for the GitHub setup action.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GitHubForm {
    pub token: String,
    pub username: String,
}

// ── Actions ───────────────────────────────────────────────────────────────────

/// Everything the initial loader fetched, applied as one unit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InitialData {
    pub name_alerts: Vec<NameAlert>,
    pub ca_alerts: Vec<CaAlert>,
    pub accounts: Vec<TrackedAccount>,
    pub performance: Vec<Value>,
    pub versions: Vec<AppVersion>,
    pub monitoring_status: MonitoringStatus,
    pub github_backups: Vec<GitHubBackup>,
    pub github_stats: Value,
}

/// A state transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// The initial fan-out succeeded.
    InitialDataLoaded(Box<InitialData>),
    /// A decoded live-update frame.
    Live(ServerMessage),
    ConnectionChanged(ConnectionStatus),
    /// The socket closed and the next connect attempt is `retry_in` away.
    ReconnectScheduled { retry_in: Duration },
    /// Reconnecting stopped after `attempts` consecutive failures.
    ReconnectAbandoned { attempts: u32 },

    AccountAdded(TrackedAccount),
    AccountRemoved { id: String },
    MentionAdded { token_name: String },
    VersionSaved(AppVersion),
    VersionLoaded(AppVersion),
    MonitoringStarted { accounts_count: u64 },
    MonitoringStopped,
    MonitoringStatusRefreshed(MonitoringStatus),
    ConfigUpdated { alert_threshold: u32 },
    GitHubConnected { repository: Value },
    BackupCreated { version_tag: String },
    BackupsRefreshed(Vec<GitHubBackup>),

    /// Surface a notice without touching any other state (failures).
    Notify(Notice),
}

/// Connection transitions the reducer turns into status and notices.
enum ConnectionEvent {
    Status(ConnectionStatus),
    RetryScheduled(Duration),
    GaveUp { attempts: u32 },
}

// ── Store ─────────────────────────────────────────────────────────────────────

/// In-memory dashboard state.
#[derive(Debug)]
pub struct DashboardStore {
    pub name_alerts: Vec<NameAlert>,
    pub ca_alerts: Vec<CaAlert>,
    pub accounts: Vec<TrackedAccount>,
    pub performance: Vec<Value>,
    pub versions: Vec<AppVersion>,
    pub monitoring_status: MonitoringStatus,
    pub alert_threshold: u32,
    pub github_backups: Vec<GitHubBackup>,
    pub github_stats: Value,
    pub github_repository: Option<String>,
    pub connection: ConnectionStatus,
    /// Whether an initial load has been applied.
    pub loaded: bool,

    pub account_form: AccountForm,
    pub mention_form: TokenMention,
    pub github_form: GitHubForm,

    notices: NoticeLog,
}

impl Default for DashboardStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DashboardStore {
    pub fn new() -> Self {
        Self {
            name_alerts: Vec::new(),
            ca_alerts: Vec::new(),
            accounts: Vec::new(),
            performance: Vec::new(),
            versions: Vec::new(),
            monitoring_status: MonitoringStatus::default(),
            alert_threshold: DEFAULT_ALERT_THRESHOLD,
            github_backups: Vec::new(),
            github_stats: Value::Object(Default::default()),
            github_repository: None,
            connection: ConnectionStatus::Disconnected,
            loaded: false,
            account_form: AccountForm::default(),
            mention_form: TokenMention::default(),
            github_form: GitHubForm::default(),
            notices: NoticeLog::default(),
        }
    }

    /// Recent notices, newest first.
    pub fn notices(&self) -> &NoticeLog {
        &self.notices
    }

    /// Apply one action.
    ///
    /// Returns the notice raised by the action, if any and if it was not
    /// suppressed by a cooldown.
    pub fn apply(&mut self, action: Action) -> Option<Notice> {
        let notice = match action {
            Action::InitialDataLoaded(data) => {
                self.apply_initial_data(*data);
                None
            }
            Action::Live(message) => self.apply_live(message),
            Action::ConnectionChanged(status) => {
                self.apply_connection(ConnectionEvent::Status(status))
            }
            Action::ReconnectScheduled { retry_in } => {
                self.apply_connection(ConnectionEvent::RetryScheduled(retry_in))
            }
            Action::ReconnectAbandoned { attempts } => {
                self.apply_connection(ConnectionEvent::GaveUp { attempts })
            }

            Action::AccountAdded(account) => {
                let notice = Notice::account_added(&account.username);
                self.accounts.push(account);
                self.account_form = AccountForm::default();
                Some(notice)
            }
            Action::AccountRemoved { id } => {
                let position = self
                    .accounts
                    .iter()
                    .position(|a| a.id.as_deref() == Some(id.as_str()));
                let username = position.map(|i| self.accounts.remove(i).username);
                Some(Notice::account_removed(username.as_deref().unwrap_or(&id)))
            }
            Action::MentionAdded { token_name } => {
                self.mention_form = TokenMention::default();
                Some(Notice::mention_added(&token_name))
            }
            Action::VersionSaved(version) => {
                self.versions.insert(0, version);
                Some(Notice::version_saved())
            }
            Action::VersionLoaded(version) => Some(Notice::version_loaded(&version.version_number)),
            Action::MonitoringStarted { accounts_count } => {
                self.monitoring_status.is_monitoring = true;
                self.monitoring_status.monitored_accounts_count = accounts_count;
                Some(Notice::monitoring_started(accounts_count))
            }
            Action::MonitoringStopped => {
                self.monitoring_status.is_monitoring = false;
                Some(Notice::monitoring_stopped())
            }
            Action::MonitoringStatusRefreshed(status) => {
                if let Some(threshold) = status.alert_threshold {
                    self.alert_threshold = threshold;
                }
                self.monitoring_status = status;
                None
            }
            Action::ConfigUpdated { alert_threshold } => {
                self.alert_threshold = alert_threshold;
                self.monitoring_status.alert_threshold = Some(alert_threshold);
                Some(Notice::config_updated(alert_threshold))
            }
            Action::GitHubConnected { repository } => {
                let label = repository_label(&repository);
                self.github_repository = Some(label.clone());
                self.github_form = GitHubForm::default();
                Some(Notice::github_connected(&label))
            }
            Action::BackupCreated { version_tag } => Some(Notice::backup_created(&version_tag)),
            Action::BackupsRefreshed(backups) => {
                self.github_backups = backups;
                None
            }

            Action::Notify(notice) => Some(notice),
        };

        notice.filter(|n| self.notices.push(n.clone()))
    }

    fn apply_initial_data(&mut self, data: InitialData) {
        self.alert_threshold = data
            .monitoring_status
            .alert_threshold
            .unwrap_or(DEFAULT_ALERT_THRESHOLD);
        self.name_alerts = data.name_alerts;
        self.ca_alerts = data.ca_alerts;
        self.accounts = data.accounts;
        self.performance = data.performance;
        self.versions = data.versions;
        self.monitoring_status = data.monitoring_status;
        self.github_backups = data.github_backups;
        self.github_stats = data.github_stats;
        self.loaded = true;

        debug!(
            name_alerts = self.name_alerts.len(),
            ca_alerts = self.ca_alerts.len(),
            accounts = self.accounts.len(),
            alert_threshold = self.alert_threshold,
            "initial data applied"
        );
    }

    fn apply_live(&mut self, message: ServerMessage) -> Option<Notice> {
        match message {
            ServerMessage::NameAlert(alert) => {
                let notice = Notice::name_alert(&alert);
                self.name_alerts.insert(0, alert);
                Some(notice)
            }
            ServerMessage::CaAlert(alert) => {
                let notice = Notice::ca_alert(&alert);
                self.ca_alerts.insert(0, alert);
                Some(notice)
            }
            ServerMessage::InitialState(InitialState {
                name_alerts,
                ca_alerts,
                ..
            }) => {
                self.name_alerts = name_alerts;
                self.ca_alerts = ca_alerts;
                None
            }
            ServerMessage::Pong { timestamp } => {
                trace!(?timestamp, "pong");
                None
            }
            ServerMessage::Unknown { kind } => {
                debug!(kind = %kind, "ignoring live message with unknown type");
                None
            }
        }
    }

    fn apply_connection(&mut self, event: ConnectionEvent) -> Option<Notice> {
        let (status, notice) = match event {
            ConnectionEvent::Status(status) => (
                status,
                (status == ConnectionStatus::Connected).then(Notice::connected),
            ),
            ConnectionEvent::RetryScheduled(delay) => (
                ConnectionStatus::Disconnected,
                Some(Notice::disconnected(delay.as_secs_f64())),
            ),
            ConnectionEvent::GaveUp { attempts } => {
                (ConnectionStatus::GaveUp, Some(Notice::gave_up(attempts)))
            }
        };

        let previous = self.connection;
        self.connection = status;
        if previous != status {
            debug!(from = %previous, to = %status, "connection status changed");
        }
        notice
    }
}

/// Human-readable name for the repository object returned by GitHub setup.
///
/// The backend returns either a plain string or a GitHub repository object.
pub fn repository_label(repository: &Value) -> String {
    match repository {
        Value::String(s) => s.clone(),
        Value::Object(map) => ["full_name", "name", "html_url"]
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_str))
            .map(str::to_string)
            .unwrap_or_else(|| repository.to_string()),
        Value::Null => "GitHub".to_string(),
        other => other.to_string(),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
