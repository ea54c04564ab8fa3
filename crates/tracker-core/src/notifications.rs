//! User-visible notices.
//!
//! Every alert, connection change and action outcome is reduced to a
//! [`Notice`]: a title, a one-line description and a level. Failures are
//! deliberately generic ("Failed to add account"); the typed error behind
//! them goes to the log instead.
//!
//! [`NoticeLog`] keeps the most recent notices in memory. Notices that carry
//! a cooldown key (connection chatter while the backend is flapping) are
//! suppressed when the last notice shown for that key had the same title and
//! fired within the cooldown window. A change of state is always shown.

use std::collections::{HashMap, VecDeque};

use chrono::{DateTime, Duration, Utc};

use crate::models::{CaAlert, NameAlert};

/// Cooldown key shared by all connection-state notices.
pub const KEY_CONNECTION: &str = "connection";

/// Default number of notices retained by [`NoticeLog`].
pub const DEFAULT_LOG_CAPACITY: usize = 100;

// ── Notice ────────────────────────────────────────────────────────────────────

/// How prominently a notice should be shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    /// Something the user asked for did not happen.
    Error,
}

/// A single user-visible notification.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub title: String,
    pub description: String,
    pub level: NoticeLevel,
    pub raised_at: DateTime<Utc>,
    /// Repeats of the same title under one key are rate-limited.
    pub cooldown_key: Option<&'static str>,
}

impl Notice {
    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            level: NoticeLevel::Info,
            raised_at: Utc::now(),
            cooldown_key: None,
        }
    }

    /// Generic failure notice: `Error` / `Failed to <action>`.
    pub fn failure(action: &str) -> Self {
        Self {
            title: "Error".to_string(),
            description: format!("Failed to {action}"),
            level: NoticeLevel::Error,
            raised_at: Utc::now(),
            cooldown_key: None,
        }
    }

    /// Failure notice carrying a message the backend supplied.
    pub fn backend_failure(title: &str, message: &str) -> Self {
        Self {
            title: title.to_string(),
            description: message.to_string(),
            level: NoticeLevel::Error,
            raised_at: Utc::now(),
            cooldown_key: None,
        }
    }

    fn keyed(mut self, key: &'static str) -> Self {
        self.cooldown_key = Some(key);
        self
    }

    pub fn name_alert(alert: &NameAlert) -> Self {
        Self::info(
            "🚨 Name Alert!",
            format!(
                "{} mentioned by {} accounts",
                alert.token_name, alert.quorum_count
            ),
        )
    }

    pub fn ca_alert(alert: &CaAlert) -> Self {
        Self::info("⚡ CA Alert!", format!("New token: {}", alert.token_name))
    }

    pub fn connected() -> Self {
        Self::info("Connected", "Real-time alerts are now active").keyed(KEY_CONNECTION)
    }

    pub fn disconnected(retry_in_secs: f64) -> Self {
        Self::info(
            "Disconnected",
            format!("Reconnecting in {:.1}s", retry_in_secs),
        )
        .keyed(KEY_CONNECTION)
    }

    pub fn gave_up(attempts: u32) -> Self {
        Self {
            level: NoticeLevel::Error,
            ..Self::info(
                "Offline",
                format!("Stopped reconnecting after {attempts} failed attempts"),
            )
        }
    }

    pub fn account_added(username: &str) -> Self {
        Self::info("Account Added", format!("Now tracking @{username}"))
    }

    pub fn account_removed(username: &str) -> Self {
        Self::info("Account Removed", format!("No longer tracking @{username}"))
    }

    pub fn mention_added(token_name: &str) -> Self {
        Self::info("Mention Added", format!("Token mention tracked: {token_name}"))
    }

    pub fn version_saved() -> Self {
        Self::info("Version Saved", "Current state has been saved")
    }

    pub fn version_loaded(version_number: &str) -> Self {
        Self::info("Version Loaded", format!("Restored {version_number}"))
    }

    pub fn monitoring_started(accounts: u64) -> Self {
        Self::info(
            "🚀 Monitoring Started!",
            format!("Now monitoring {accounts} X accounts automatically"),
        )
    }

    pub fn monitoring_stopped() -> Self {
        Self::info(
            "⏹️ Monitoring Stopped",
            "Automatic X account monitoring has been stopped",
        )
    }

    pub fn config_updated(threshold: u32) -> Self {
        Self::info(
            "Settings Updated",
            format!("Name alerts now require {threshold} accounts"),
        )
    }

    pub fn github_connected(repository: &str) -> Self {
        Self::info("GitHub Connected", format!("Backups go to {repository}"))
    }

    pub fn backup_created(version_tag: &str) -> Self {
        Self::info("Backup Created", format!("{version_tag} pushed to GitHub"))
    }
}

// ── NoticeLog ─────────────────────────────────────────────────────────────────

/// Bounded, newest-first history of notices with per-key cooldown.
#[derive(Debug)]
pub struct NoticeLog {
    entries: VecDeque<Notice>,
    capacity: usize,
    cooldown: Duration,
    /// Title and time of the last notice shown per cooldown key.
    last_by_key: HashMap<&'static str, (String, DateTime<Utc>)>,
}

impl NoticeLog {
    pub fn new(capacity: usize, cooldown: Duration) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.min(DEFAULT_LOG_CAPACITY)),
            capacity: capacity.max(1),
            cooldown,
            last_by_key: HashMap::new(),
        }
    }

    /// Return `true` when a notice titled `title` under `key`, raised at
    /// `at`, should be shown.
    pub fn should_notify(&self, key: &str, title: &str, at: DateTime<Utc>) -> bool {
        match self.last_by_key.get(key) {
            Some((last_title, last_at)) if last_title == title => at - *last_at >= self.cooldown,
            _ => true,
        }
    }

    /// Record a notice. Returns `false` (and drops it) when the same notice
    /// was shown under its cooldown key too recently.
    pub fn push(&mut self, notice: Notice) -> bool {
        if let Some(key) = notice.cooldown_key {
            if !self.should_notify(key, &notice.title, notice.raised_at) {
                tracing::trace!(key, title = %notice.title, "notice suppressed by cooldown");
                return false;
            }
            self.last_by_key
                .insert(key, (notice.title.clone(), notice.raised_at));
        }

        self.entries.push_front(notice);
        self.entries.truncate(self.capacity);
        true
    }

    /// Notices, newest first.
    pub fn iter(&self) -> impl Iterator<Item = &Notice> {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&Notice> {
        self.entries.front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for NoticeLog {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_CAPACITY, Duration::seconds(10))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
