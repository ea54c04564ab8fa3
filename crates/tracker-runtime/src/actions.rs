//! User-initiated writes.
//!
//! Each action makes at most one REST call and reports an [`Outcome`]:
//! `Skipped` when the input was blank and nothing was sent, `Succeeded`
//! with the store action to apply, or `Failed` with a generic notice for
//! the user and the typed error for the log. There are no retries.

use chrono::{DateTime, Utc};
use tracker_core::models::{
    GitHubBackupRequest, GitHubSetup, MonitoringConfig, NewAccount, SaveVersion, TokenMention,
};
use tracker_core::notifications::Notice;
use tracker_core::store::{AccountForm, Action, GitHubForm};
use tracker_core::time_utils::TimezoneHandler;
use tracker_core::TrackerError;

use crate::api::DashboardApi;

/// Result of one mutation action.
#[derive(Debug)]
pub enum Outcome {
    /// Required input was blank; no request was made.
    Skipped,
    Succeeded(Action),
    Failed { notice: Notice, error: TrackerError },
}

impl Outcome {
    fn failed(action: &str, error: TrackerError) -> Self {
        tracing::warn!(action, error = %error, "action failed");
        Outcome::Failed {
            notice: Notice::failure(action),
            error,
        }
    }

    /// The store action to apply, if any.
    pub fn into_action(self) -> Option<Action> {
        match self {
            Outcome::Skipped => None,
            Outcome::Succeeded(action) => Some(action),
            Outcome::Failed { notice, .. } => Some(Action::Notify(notice)),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Succeeded(_))
    }
}

fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

// ── Accounts & mentions ───────────────────────────────────────────────────────

/// `POST /api/accounts`. The display name defaults to the username.
pub async fn add_account(api: &dyn DashboardApi, form: &AccountForm) -> Outcome {
    if is_blank(&form.username) {
        return Outcome::Skipped;
    }

    let display_name = if form.display_name.is_empty() {
        form.username.clone()
    } else {
        form.display_name.clone()
    };
    let request = NewAccount {
        username: form.username.clone(),
        display_name,
    };

    match api.add_account(&request).await {
        Ok(account) => Outcome::Succeeded(Action::AccountAdded(account)),
        Err(e) => Outcome::failed("add account", e),
    }
}

/// `DELETE /api/accounts/{id}`.
pub async fn remove_account(api: &dyn DashboardApi, id: &str) -> Outcome {
    if is_blank(id) {
        return Outcome::Skipped;
    }
    match api.remove_account(id).await {
        Ok(()) => Outcome::Succeeded(Action::AccountRemoved { id: id.to_string() }),
        Err(e) => Outcome::failed("remove account", e),
    }
}

/// `POST /api/mentions`. Token name and account username are required.
pub async fn add_mention(api: &dyn DashboardApi, mention: &TokenMention) -> Outcome {
    if is_blank(&mention.token_name) || is_blank(&mention.account_username) {
        return Outcome::Skipped;
    }
    match api.add_mention(mention).await {
        Ok(()) => Outcome::Succeeded(Action::MentionAdded {
            token_name: mention.token_name.clone(),
        }),
        Err(e) => Outcome::failed("add token mention", e),
    }
}

// ── Versions ──────────────────────────────────────────────────────────────────

/// Request body for a snapshot taken at `now`: `v<unix-millis>` tagged
/// `Snapshot <local time>`.
pub fn snapshot_request(now: DateTime<Utc>, tz: &TimezoneHandler, use_12h: bool) -> SaveVersion {
    SaveVersion {
        version_number: format!("v{}", now.timestamp_millis()),
        tag_name: format!("Snapshot {}", tz.format_local(now, use_12h)),
    }
}

/// `POST /api/versions/save` with a snapshot stamped now.
pub async fn save_version(api: &dyn DashboardApi, tz: &TimezoneHandler, use_12h: bool) -> Outcome {
    let request = snapshot_request(Utc::now(), tz, use_12h);
    match api.save_version(&request).await {
        Ok(version) => Outcome::Succeeded(Action::VersionSaved(version)),
        Err(e) => Outcome::failed("save version", e),
    }
}

/// `POST /api/versions/{id}/load`.
pub async fn load_version(api: &dyn DashboardApi, id: &str) -> Outcome {
    if is_blank(id) {
        return Outcome::Skipped;
    }
    match api.load_version(id).await {
        Ok(version) => Outcome::Succeeded(Action::VersionLoaded(version)),
        Err(e) if e.is_not_found() => {
            tracing::warn!(id, "version not found");
            Outcome::Failed {
                notice: Notice::backend_failure("Error", "Version not found"),
                error: e,
            }
        }
        Err(e) => Outcome::failed("load version", e),
    }
}

// ── Monitoring ────────────────────────────────────────────────────────────────

pub async fn start_monitoring(api: &dyn DashboardApi) -> Outcome {
    match api.start_monitoring().await {
        Ok(started) => Outcome::Succeeded(Action::MonitoringStarted {
            accounts_count: started.accounts_count,
        }),
        Err(e) => Outcome::failed("start monitoring", e),
    }
}

pub async fn stop_monitoring(api: &dyn DashboardApi) -> Outcome {
    match api.stop_monitoring().await {
        Ok(()) => Outcome::Succeeded(Action::MonitoringStopped),
        Err(e) => Outcome::failed("stop monitoring", e),
    }
}

/// `GET /api/monitoring/status`.
pub async fn refresh_monitoring_status(api: &dyn DashboardApi) -> Outcome {
    match api.monitoring_status().await {
        Ok(status) => Outcome::Succeeded(Action::MonitoringStatusRefreshed(status)),
        Err(e) => Outcome::failed("load monitoring status", e),
    }
}

/// `POST /api/monitoring/config`; the threshold is kept locally on success.
pub async fn update_config(api: &dyn DashboardApi, config: &MonitoringConfig) -> Outcome {
    match api.update_monitoring_config(config).await {
        Ok(()) => Outcome::Succeeded(Action::ConfigUpdated {
            alert_threshold: config.alert_threshold,
        }),
        Err(e) => Outcome::failed("update settings", e),
    }
}

// ── GitHub ────────────────────────────────────────────────────────────────────

/// `POST /api/github/setup`. A `{error}` body is a failure carrying the
/// backend's message.
pub async fn github_setup(api: &dyn DashboardApi, form: &GitHubForm) -> Outcome {
    if is_blank(&form.token) || is_blank(&form.username) {
        return Outcome::Skipped;
    }

    let request = GitHubSetup {
        github_token: form.token.clone(),
        username: form.username.clone(),
    };
    match api.github_setup(&request).await {
        Ok(result) => match (result.error, result.repository) {
            (Some(message), _) => backend_failure("GitHub Setup Failed", message),
            (None, Some(repository)) if !repository.is_null() => {
                Outcome::Succeeded(Action::GitHubConnected { repository })
            }
            (None, _) => Outcome::failed(
                "set up GitHub",
                TrackerError::Backend("no repository in response".to_string()),
            ),
        },
        Err(e) => Outcome::failed("set up GitHub", e),
    }
}

/// `POST /api/github/backup` for `version_tag`.
pub async fn github_backup(api: &dyn DashboardApi, version_tag: &str) -> Outcome {
    if is_blank(version_tag) {
        return Outcome::Skipped;
    }

    let request = GitHubBackupRequest {
        version_tag: version_tag.to_string(),
    };
    match api.github_backup(&request).await {
        Ok(result) if result.success => Outcome::Succeeded(Action::BackupCreated {
            version_tag: version_tag.to_string(),
        }),
        Ok(result) => match result.error {
            Some(message) => backend_failure("Backup Failed", message),
            None => Outcome::failed(
                "create backup",
                TrackerError::Backend("backup was not created".to_string()),
            ),
        },
        Err(e) => Outcome::failed("create backup", e),
    }
}

/// `GET /api/github/backups`.
pub async fn refresh_backups(api: &dyn DashboardApi) -> Outcome {
    match api.github_backups().await {
        Ok(backups) => Outcome::Succeeded(Action::BackupsRefreshed(backups)),
        Err(e) => Outcome::failed("load GitHub backups", e),
    }
}

fn backend_failure(title: &str, message: String) -> Outcome {
    tracing::warn!(title, message = %message, "backend rejected request");
    Outcome::Failed {
        notice: Notice::backend_failure(title, &message),
        error: TrackerError::Backend(message),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockApi;
    use chrono::TimeZone;
    use serde_json::json;
    use tracker_core::models::{GitHubBackupResult, GitHubSetupResult, MonitoringStatus};
    use tracker_core::notifications::NoticeLevel;
    use tracker_core::store::DashboardStore;

    fn account_form(username: &str, display_name: &str) -> AccountForm {
        AccountForm {
            username: username.to_string(),
            display_name: display_name.to_string(),
        }
    }

    fn mention(token: &str, account: &str) -> TokenMention {
        TokenMention {
            token_name: token.to_string(),
            account_username: account.to_string(),
            tweet_url: String::new(),
        }
    }

    fn failure_text(outcome: Outcome) -> String {
        match outcome {
            Outcome::Failed { notice, .. } => {
                assert_eq!(notice.level, NoticeLevel::Error);
                notice.description
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }

    // ── add account ──────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_blank_username_makes_no_call() {
        let api = MockApi::default();
        for username in ["", "   ", "\t\n"] {
            let outcome = add_account(&api, &account_form(username, "Alice")).await;
            assert!(matches!(outcome, Outcome::Skipped));
        }
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_display_name_defaults_to_username() {
        let api = MockApi::default();
        let outcome = add_account(&api, &account_form("alice", "")).await;

        assert!(outcome.is_success());
        assert_eq!(
            api.bodies()[0],
            json!({ "username": "alice", "display_name": "alice" })
        );
    }

    #[tokio::test]
    async fn test_add_account_success_updates_store() {
        let api = MockApi::default();
        let mut store = DashboardStore::new();
        store.account_form = account_form("bob", "Bob");

        let outcome = add_account(&api, &store.account_form.clone()).await;
        store.apply(outcome.into_action().unwrap());

        assert_eq!(store.accounts.len(), 1);
        assert_eq!(store.accounts[0].username, "bob");
        assert_eq!(store.account_form, AccountForm::default());
    }

    #[tokio::test]
    async fn test_add_account_failure_is_generic_notice() {
        let api = MockApi::default().with_failures(&["add_account"]);
        let outcome = add_account(&api, &account_form("alice", "")).await;
        assert_eq!(failure_text(outcome), "Failed to add account");
    }

    // ── add mention ──────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_mention_requires_token_and_account() {
        let api = MockApi::default();
        assert!(matches!(add_mention(&api, &mention(" ", "alice")).await, Outcome::Skipped));
        assert!(matches!(add_mention(&api, &mention("BONK", "")).await, Outcome::Skipped));
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_successful_mention_clears_form() {
        let api = MockApi::default();
        let mut store = DashboardStore::new();
        store.mention_form = TokenMention {
            tweet_url: "https://x.com/alice/status/9".to_string(),
            ..mention("BONK", "alice")
        };

        let outcome = add_mention(&api, &store.mention_form.clone()).await;
        let notice = store.apply(outcome.into_action().unwrap()).unwrap();

        assert_eq!(store.mention_form, TokenMention::default());
        assert_eq!(notice.description, "Token mention tracked: BONK");
        assert_eq!(api.bodies()[0]["tweet_url"], "https://x.com/alice/status/9");
    }

    #[tokio::test]
    async fn test_failed_mention_keeps_form() {
        let api = MockApi::default().with_failures(&["add_mention"]);
        let mut store = DashboardStore::new();
        store.mention_form = mention("BONK", "alice");

        let outcome = add_mention(&api, &store.mention_form.clone()).await;
        store.apply(outcome.into_action().unwrap());

        assert_eq!(store.mention_form.token_name, "BONK");
        assert_eq!(
            store.notices().latest().unwrap().description,
            "Failed to add token mention"
        );
    }

    // ── versions ─────────────────────────────────────────────────────────────

    #[test]
    fn test_snapshot_request_format() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let request = snapshot_request(now, &TimezoneHandler::new("UTC"), false);
        assert_eq!(request.version_number, format!("v{}", now.timestamp_millis()));
        assert_eq!(request.tag_name, "Snapshot 2024-05-01 12:00:00");
    }

    #[tokio::test]
    async fn test_save_version_prepends() {
        let api = MockApi::default();
        let mut store = DashboardStore::new();
        store.versions = vec![serde_json::from_value(json!({ "version_number": "v1" })).unwrap()];

        let outcome = save_version(&api, &TimezoneHandler::new("UTC"), false).await;
        store.apply(outcome.into_action().unwrap());

        assert_eq!(store.versions.len(), 2);
        assert!(store.versions[0].version_number.starts_with('v'));
        assert_ne!(store.versions[0].version_number, "v1");
    }

    #[tokio::test]
    async fn test_load_missing_version_reports_not_found() {
        let api = MockApi {
            not_found: ["load_version"].into_iter().collect(),
            ..MockApi::default()
        };
        let outcome = load_version(&api, "nope").await;
        assert_eq!(failure_text(outcome), "Version not found");
    }

    // ── monitoring ───────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_start_and_stop_monitoring() {
        let api = MockApi {
            accounts: vec![
                serde_json::from_value(json!({ "username": "a" })).unwrap(),
                serde_json::from_value(json!({ "username": "b" })).unwrap(),
            ],
            ..MockApi::default()
        };
        let mut store = DashboardStore::new();

        store.apply(start_monitoring(&api).await.into_action().unwrap());
        assert!(store.monitoring_status.is_monitoring);
        assert_eq!(store.monitoring_status.monitored_accounts_count, 2);

        store.apply(stop_monitoring(&api).await.into_action().unwrap());
        assert!(!store.monitoring_status.is_monitoring);
    }

    #[tokio::test]
    async fn test_update_config_stores_threshold() {
        let api = MockApi::default();
        let mut store = DashboardStore::new();
        let config = MonitoringConfig {
            alert_threshold: 4,
            ..MonitoringConfig::default()
        };

        store.apply(update_config(&api, &config).await.into_action().unwrap());

        assert_eq!(store.alert_threshold, 4);
        assert_eq!(api.bodies()[0]["alert_threshold"], 4);
        assert_eq!(api.bodies()[0]["check_interval_seconds"], 60);
    }

    #[tokio::test]
    async fn test_update_config_failure_keeps_threshold() {
        let api = MockApi::default().with_failures(&["update_monitoring_config"]);
        let mut store = DashboardStore::new();
        let config = MonitoringConfig {
            alert_threshold: 9,
            ..MonitoringConfig::default()
        };
        store.apply(update_config(&api, &config).await.into_action().unwrap());
        assert_eq!(store.alert_threshold, 2);
    }

    #[tokio::test]
    async fn test_refresh_monitoring_status_replaces_status() {
        let api = MockApi {
            monitoring_status: MonitoringStatus {
                is_monitoring: true,
                monitored_accounts_count: 5,
                alert_threshold: Some(3),
                ..MonitoringStatus::default()
            },
            ..MockApi::default()
        };
        let mut store = DashboardStore::new();

        let notice = store.apply(refresh_monitoring_status(&api).await.into_action().unwrap());

        assert!(notice.is_none());
        assert!(store.monitoring_status.is_monitoring);
        assert_eq!(store.monitoring_status.monitored_accounts_count, 5);
        assert_eq!(store.alert_threshold, 3);

        let down = MockApi::default().with_failures(&["monitoring_status"]);
        let outcome = refresh_monitoring_status(&down).await;
        assert_eq!(failure_text(outcome), "Failed to load monitoring status");
    }

    // ── GitHub ───────────────────────────────────────────────────────────────

    fn github_form(token: &str, username: &str) -> GitHubForm {
        GitHubForm {
            token: token.to_string(),
            username: username.to_string(),
        }
    }

    #[tokio::test]
    async fn test_github_setup_blank_input_skipped() {
        let api = MockApi::default();
        assert!(matches!(github_setup(&api, &github_form("", "alice")).await, Outcome::Skipped));
        assert!(matches!(github_setup(&api, &github_form("ghp", " ")).await, Outcome::Skipped));
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_github_setup_success() {
        let api = MockApi {
            github_setup_result: GitHubSetupResult {
                repository: Some(json!({ "full_name": "alice/tweet-tracker-backups" })),
                error: None,
            },
            ..MockApi::default()
        };
        let outcome = github_setup(&api, &github_form("ghp_x", "alice")).await;
        match outcome {
            Outcome::Succeeded(Action::GitHubConnected { repository }) => {
                assert_eq!(tracker_core::store::repository_label(&repository), "alice/tweet-tracker-backups");
            }
            other => panic!("unexpected outcome {other:?}"),
        }
        assert_eq!(api.bodies()[0], json!({ "github_token": "ghp_x", "username": "alice" }));
    }

    #[tokio::test]
    async fn test_github_setup_backend_error_message_is_shown() {
        let api = MockApi {
            github_setup_result: GitHubSetupResult {
                repository: None,
                error: Some("Bad credentials".to_string()),
            },
            ..MockApi::default()
        };
        let outcome = github_setup(&api, &github_form("ghp_x", "alice")).await;
        match outcome {
            Outcome::Failed { notice, error } => {
                assert_eq!(notice.description, "Bad credentials");
                assert!(matches!(error, TrackerError::Backend(_)));
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_github_backup_success_and_failure() {
        let ok = MockApi {
            github_backup_result: GitHubBackupResult {
                success: true,
                error: None,
            },
            ..MockApi::default()
        };
        assert!(github_backup(&ok, "v1700000000000").await.is_success());

        let rejected = MockApi {
            github_backup_result: GitHubBackupResult {
                success: false,
                error: Some("Repository not configured".to_string()),
            },
            ..MockApi::default()
        };
        let outcome = github_backup(&rejected, "v1700000000000").await;
        assert_eq!(failure_text(outcome), "Repository not configured");

        let silent = MockApi::default();
        let outcome = github_backup(&silent, "v1").await;
        assert_eq!(failure_text(outcome), "Failed to create backup");
    }

    #[tokio::test]
    async fn test_refresh_backups_replaces_list() {
        let api = MockApi {
            github_backups: vec![serde_json::from_value(json!({ "version_tag": "v2" })).unwrap()],
            ..MockApi::default()
        };
        let mut store = DashboardStore::new();
        store.github_backups =
            vec![serde_json::from_value(json!({ "version_tag": "stale" })).unwrap()];

        store.apply(refresh_backups(&api).await.into_action().unwrap());

        assert_eq!(store.github_backups.len(), 1);
        assert_eq!(store.github_backups[0].version_tag.as_deref(), Some("v2"));

        let down = MockApi::default().with_failures(&["github_backups"]);
        assert_eq!(failure_text(refresh_backups(&down).await), "Failed to load GitHub backups");
    }

    #[tokio::test]
    async fn test_remove_account_by_id() {
        let api = MockApi::default();
        let mut store = DashboardStore::new();
        store.accounts = vec![serde_json::from_value(json!({ "id": "7", "username": "carol" })).unwrap()];

        store.apply(remove_account(&api, "7").await.into_action().unwrap());

        assert!(store.accounts.is_empty());
        assert!(api.called("remove_account"));
    }
}
