use clap::{CommandFactory, Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::models::MonitoringConfig;

/// Backend used when neither the command line, the environment nor the
/// last-used file names one.
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8001";

/// Environment variable read by clap for `--backend-url`.
pub const BACKEND_URL_ENV: &str = "TWEET_TRACKER_BACKEND_URL";

/// Deployment variable of the web dashboard, honoured as a fallback.
pub const LEGACY_BACKEND_URL_ENV: &str = "REACT_APP_BACKEND_URL";

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Terminal client for the Tweet Tracker backend
#[derive(Parser, Debug, Clone)]
#[command(
    name = "tweet-tracker",
    about = "Terminal client for the Tweet Tracker backend",
    version
)]
pub struct Settings {
    /// Backend base URL (the API lives under `<url>/api`)
    #[arg(long, global = true, env = BACKEND_URL_ENV, default_value = DEFAULT_BACKEND_URL)]
    pub backend_url: String,

    /// Timezone for displayed timestamps (auto-detected if not specified)
    #[arg(long, global = true, default_value = "auto")]
    pub timezone: String,

    /// Time format
    #[arg(long, global = true, default_value = "auto", value_parser = ["12h", "24h", "auto"])]
    pub time_format: String,

    /// HTTP request timeout in seconds (1-300)
    #[arg(long, global = true, default_value = "10", value_parser = clap::value_parser!(u64).range(1..=300))]
    pub request_timeout_secs: u64,

    /// First reconnect delay in seconds
    #[arg(long, global = true, default_value = "3")]
    pub reconnect_initial_secs: f64,

    /// Upper bound on the reconnect delay in seconds
    #[arg(long, global = true, default_value = "60")]
    pub reconnect_max_secs: f64,

    /// Stop reconnecting after this many consecutive failures (default: never)
    #[arg(long, global = true)]
    pub reconnect_max_attempts: Option<u32>,

    /// Heartbeat interval in seconds (0 disables)
    #[arg(long, global = true, default_value = "30")]
    pub ping_interval_secs: u64,

    /// Logging level
    #[arg(long, global = true, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Log file path
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Clear saved configuration
    #[arg(long, global = true)]
    pub clear: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

// ── Subcommands ────────────────────────────────────────────────────────────────

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Load the dashboard and stream live alerts until Ctrl+C (default)
    Watch,
    /// Load the dashboard once and print a summary
    Snapshot,
    /// Manage tracked X accounts
    Accounts {
        #[command(subcommand)]
        action: AccountsCommand,
    },
    /// Report a token mention manually
    Mention {
        /// Token name, e.g. BONK
        token_name: String,
        /// Username of the account that mentioned it
        account_username: String,
        /// Link to the tweet
        #[arg(long, default_value = "")]
        tweet_url: String,
    },
    /// Control backend monitoring
    Monitoring {
        #[command(subcommand)]
        action: MonitoringCommand,
    },
    /// Saved snapshots of backend state
    Versions {
        #[command(subcommand)]
        action: VersionsCommand,
    },
    /// GitHub backup integration
    Github {
        #[command(subcommand)]
        action: GitHubCommand,
    },
    /// Check that the backend answers
    Ping,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum AccountsCommand {
    /// List tracked accounts
    List,
    /// Start tracking an account
    Add {
        username: String,
        /// Display name (defaults to the username)
        #[arg(long)]
        display_name: Option<String>,
    },
    /// Stop tracking an account
    Remove {
        /// Backend account id
        id: String,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum MonitoringCommand {
    /// Show monitoring status
    Status,
    /// Start monitoring all tracked accounts
    Start,
    /// Stop monitoring
    Stop,
    /// Show the monitoring configuration, or update it when options are given
    Config(MonitoringConfigArgs),
}

/// Partial update of [`MonitoringConfig`]; unset fields keep their current
/// backend value.
#[derive(clap::Args, Debug, Clone, Default, PartialEq)]
pub struct MonitoringConfigArgs {
    /// Distinct accounts required for a name alert
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub alert_threshold: Option<u32>,
    /// Seconds between monitoring cycles
    #[arg(long)]
    pub check_interval_seconds: Option<u64>,
    #[arg(long)]
    pub enable_browser_monitoring: Option<bool>,
    #[arg(long)]
    pub enable_rss_monitoring: Option<bool>,
    #[arg(long)]
    pub enable_scraping_monitoring: Option<bool>,
    #[arg(long)]
    pub filter_old_tokens: Option<bool>,
    #[arg(long)]
    pub filter_tokens_with_ca: Option<bool>,
}

impl MonitoringConfigArgs {
    /// `true` when no option was given, i.e. the command only reads.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Overlay the given options on `current`.
    pub fn apply_to(&self, current: MonitoringConfig) -> MonitoringConfig {
        MonitoringConfig {
            alert_threshold: self.alert_threshold.unwrap_or(current.alert_threshold),
            check_interval_seconds: self
                .check_interval_seconds
                .unwrap_or(current.check_interval_seconds),
            enable_browser_monitoring: self
                .enable_browser_monitoring
                .unwrap_or(current.enable_browser_monitoring),
            enable_rss_monitoring: self
                .enable_rss_monitoring
                .unwrap_or(current.enable_rss_monitoring),
            enable_scraping_monitoring: self
                .enable_scraping_monitoring
                .unwrap_or(current.enable_scraping_monitoring),
            filter_old_tokens: self.filter_old_tokens.unwrap_or(current.filter_old_tokens),
            filter_tokens_with_ca: self
                .filter_tokens_with_ca
                .unwrap_or(current.filter_tokens_with_ca),
        }
    }
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum VersionsCommand {
    /// List saved versions
    List,
    /// Save a snapshot of the current backend state
    Save,
    /// Restore a saved version
    Load {
        /// Backend version id
        id: String,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum GitHubCommand {
    /// Connect a GitHub account for backups
    Setup {
        /// Personal access token
        #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true, default_value = "")]
        token: String,
        /// GitHub username
        #[arg(long, default_value = "")]
        username: String,
    },
    /// Push a saved version to GitHub
    Backup {
        /// Version tag, e.g. v1700000000000
        version_tag: String,
    },
    /// List GitHub backups
    Backups,
    /// Show GitHub backup statistics
    Stats,
}

// ── LastUsedParams ─────────────────────────────────────────────────────────────

/// Persisted last-used parameters saved to `~/.tweet-tracker/last_used.json`.
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct LastUsedParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_format: Option<String>,
}

impl LastUsedParams {
    /// Return the default path to the persisted config file.
    /// Uses `~/.tweet-tracker/last_used.json`.
    pub fn config_path() -> PathBuf {
        Self::config_path_in(&dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    /// Return the config path rooted at `base_dir` (used for testing).
    pub fn config_path_in(base_dir: &std::path::Path) -> PathBuf {
        base_dir.join(".tweet-tracker").join("last_used.json")
    }

    /// Load persisted params from an explicit path.
    /// Returns `Default` when the file is absent or cannot be parsed.
    pub fn load_from(path: &std::path::Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        serde_json::from_str(&content).unwrap_or_else(|e| {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable last-used file");
            Self::default()
        })
    }

    /// Atomically write params to an explicit path, creating parent
    /// directories if needed.
    pub fn save_to(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;

        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &json)?;
        std::fs::rename(&tmp, path)?;

        Ok(())
    }

    /// Delete the config file at an explicit path if it exists.
    pub fn clear_at(path: &std::path::Path) -> Result<(), std::io::Error> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse CLI arguments, merge with last-used params where no explicit
    /// value was provided, resolve `"auto"` values, and persist the result.
    pub fn load_with_last_used() -> Self {
        Self::load_with_last_used_impl(
            std::env::args_os().collect(),
            &LastUsedParams::config_path(),
        )
    }

    /// Full implementation – accepts args and an explicit config path so that
    /// tests can redirect to a temporary directory.
    pub fn load_with_last_used_impl(
        args: Vec<std::ffi::OsString>,
        config_path: &std::path::Path,
    ) -> Self {
        Self::load_with_last_used_env(args, config_path, |key| std::env::var(key).ok())
    }

    /// As [`Settings::load_with_last_used_impl`], reading the dashboard's
    /// legacy backend variable through `env` instead of the process
    /// environment.
    pub fn load_with_last_used_env(
        args: Vec<std::ffi::OsString>,
        config_path: &std::path::Path,
        env: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let matches = Settings::command().get_matches_from(args.clone());
        let mut settings = Settings::parse_from(args);

        if settings.clear {
            if let Err(e) = LastUsedParams::clear_at(config_path) {
                tracing::warn!(error = %e, "could not clear last-used file");
            }
            apply_legacy_backend_env(&mut settings, &matches, &env);
            return Self::resolve_auto_values(settings);
        }

        let last = LastUsedParams::load_from(config_path);

        // Precedence for the backend: CLI, our env var, the dashboard's env
        // var, last-used, built-in default.
        if !is_arg_set_by_user(&matches, "backend_url")
            && !apply_legacy_backend_env(&mut settings, &matches, &env)
        {
            if let Some(v) = last.backend_url {
                settings.backend_url = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "timezone") {
            if let Some(v) = last.timezone {
                settings.timezone = v;
            }
        }
        // clap stores the arg id using the field name (underscores).
        if !is_arg_explicitly_set(&matches, "time_format") {
            if let Some(v) = last.time_format {
                settings.time_format = v;
            }
        }

        settings = Self::resolve_auto_values(settings);

        let params = LastUsedParams::from(&settings);
        if let Err(e) = params.save_to(config_path) {
            tracing::debug!(error = %e, "could not persist last-used params");
        }

        settings
    }

    /// Resolve `"auto"` sentinel values and apply the `--debug` flag.
    fn resolve_auto_values(mut settings: Settings) -> Settings {
        if settings.timezone == "auto" {
            settings.timezone = crate::time_utils::get_system_timezone();
        }

        if settings.time_format == "auto" {
            let is_12h = crate::time_utils::detect_time_format(Some(&settings.timezone), None);
            settings.time_format = if is_12h {
                "12h".to_string()
            } else {
                "24h".to_string()
            };
        }

        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }

        settings
    }

    /// The subcommand to run; `watch` when none was given.
    pub fn resolved_command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Watch)
    }

    pub fn uses_12h_clock(&self) -> bool {
        self.time_format == "12h"
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Heartbeat interval, `None` when disabled.
    pub fn ping_interval(&self) -> Option<Duration> {
        (self.ping_interval_secs > 0).then(|| Duration::from_secs(self.ping_interval_secs))
    }
}

// ── Conversion ─────────────────────────────────────────────────────────────────

impl From<&Settings> for LastUsedParams {
    fn from(s: &Settings) -> Self {
        LastUsedParams {
            backend_url: Some(s.backend_url.clone()),
            timezone: Some(s.timezone.clone()),
            time_format: Some(s.time_format.clone()),
        }
    }
}

// ── Helpers ────────────────────────────────────────────────────────────────────

/// Returns `true` when `name` was supplied explicitly on the command line
/// (not via default value or environment variable).
fn is_arg_explicitly_set(matches: &clap::ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(clap::parser::ValueSource::CommandLine)
}

/// Like [`is_arg_explicitly_set`] but also counts the arg's environment
/// variable.
fn is_arg_set_by_user(matches: &clap::ArgMatches, name: &str) -> bool {
    matches!(
        matches.value_source(name),
        Some(clap::parser::ValueSource::CommandLine | clap::parser::ValueSource::EnvVariable)
    )
}

/// Take the backend URL from the dashboard's deployment variable when
/// nothing more specific set it. Returns `true` if it did.
fn apply_legacy_backend_env(
    settings: &mut Settings,
    matches: &clap::ArgMatches,
    env: &dyn Fn(&str) -> Option<String>,
) -> bool {
    if is_arg_set_by_user(matches, "backend_url") {
        return false;
    }
    match env(LEGACY_BACKEND_URL_ENV) {
        Some(url) if !url.trim().is_empty() => {
            settings.backend_url = url;
            true
        }
        _ => false,
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    // ── Helpers ───────────────────────────────────────────────────────────────

    fn tmp_config_path(tmp: &TempDir) -> PathBuf {
        LastUsedParams::config_path_in(tmp.path())
    }

    fn args(list: &[&str]) -> Vec<std::ffi::OsString> {
        list.iter().map(Into::into).collect()
    }

    // ── LastUsedParams ────────────────────────────────────────────────────────

    #[test]
    fn test_last_used_params_save_load() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp_config_path(&tmp);
        let params = LastUsedParams {
            backend_url: Some("https://tracker.example.com".to_string()),
            timezone: Some("Europe/Berlin".to_string()),
            time_format: Some("24h".to_string()),
        };

        params.save_to(&path).expect("save");
        let loaded = LastUsedParams::load_from(&path);

        assert_eq!(loaded.backend_url.as_deref(), Some("https://tracker.example.com"));
        assert_eq!(loaded.timezone.as_deref(), Some("Europe/Berlin"));
        assert_eq!(loaded.time_format.as_deref(), Some("24h"));
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_last_used_params_clear() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp_config_path(&tmp);

        LastUsedParams::default().save_to(&path).expect("save");
        assert!(path.exists(), "file must exist after save");

        LastUsedParams::clear_at(&path).expect("clear");
        assert!(!path.exists(), "file must be gone after clear");
        // Clearing twice is fine.
        LastUsedParams::clear_at(&path).expect("clear again");
    }

    #[test]
    fn test_last_used_params_default_when_missing_or_corrupt() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp_config_path(&tmp);
        assert!(LastUsedParams::load_from(&path).backend_url.is_none());

        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "{ not json").unwrap();
        assert!(LastUsedParams::load_from(&path).timezone.is_none());
    }

    // ── CLI parsing ───────────────────────────────────────────────────────────

    #[test]
    fn test_settings_default_values() {
        let settings = Settings::parse_from(["tweet-tracker"]);

        assert_eq!(settings.timezone, "auto");
        assert_eq!(settings.time_format, "auto");
        assert_eq!(settings.request_timeout_secs, 10);
        assert!((settings.reconnect_initial_secs - 3.0).abs() < f64::EPSILON);
        assert!((settings.reconnect_max_secs - 60.0).abs() < f64::EPSILON);
        assert!(settings.reconnect_max_attempts.is_none());
        assert_eq!(settings.ping_interval_secs, 30);
        assert_eq!(settings.log_level, "INFO");
        assert!(settings.log_file.is_none());
        assert!(!settings.debug);
        assert!(!settings.clear);
        assert_eq!(settings.resolved_command(), Command::Watch);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let settings = Settings::parse_from([
            "tweet-tracker",
            "snapshot",
            "--backend-url",
            "https://api.example.com",
        ]);
        assert_eq!(settings.backend_url, "https://api.example.com");
        assert_eq!(settings.resolved_command(), Command::Snapshot);
    }

    #[test]
    fn test_accounts_add_subcommand() {
        let settings =
            Settings::parse_from(["tweet-tracker", "accounts", "add", "alice", "--display-name", "Alice"]);
        assert_eq!(
            settings.resolved_command(),
            Command::Accounts {
                action: AccountsCommand::Add {
                    username: "alice".to_string(),
                    display_name: Some("Alice".to_string()),
                }
            }
        );
    }

    #[test]
    fn test_mention_subcommand() {
        let settings = Settings::parse_from([
            "tweet-tracker",
            "mention",
            "BONK",
            "alice",
            "--tweet-url",
            "https://x.com/alice/status/1",
        ]);
        match settings.resolved_command() {
            Command::Mention {
                token_name,
                account_username,
                tweet_url,
            } => {
                assert_eq!(token_name, "BONK");
                assert_eq!(account_username, "alice");
                assert_eq!(tweet_url, "https://x.com/alice/status/1");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_monitoring_config_args() {
        let settings = Settings::parse_from([
            "tweet-tracker",
            "monitoring",
            "config",
            "--alert-threshold",
            "4",
            "--filter-old-tokens",
            "false",
        ]);
        let Command::Monitoring {
            action: MonitoringCommand::Config(cfg_args),
        } = settings.resolved_command()
        else {
            panic!("expected monitoring config");
        };
        assert!(!cfg_args.is_empty());

        let merged = cfg_args.apply_to(MonitoringConfig::default());
        assert_eq!(merged.alert_threshold, 4);
        assert!(!merged.filter_old_tokens);
        assert_eq!(merged.check_interval_seconds, 60);
        assert!(merged.enable_rss_monitoring);
    }

    #[test]
    fn test_monitoring_config_without_options_is_read_only() {
        assert!(MonitoringConfigArgs::default().is_empty());
    }

    #[test]
    fn test_request_timeout_out_of_range_rejected() {
        let result = Settings::try_parse_from(["tweet-tracker", "--request-timeout-secs", "0"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_ping_interval_zero_disables() {
        let settings = Settings::parse_from(["tweet-tracker", "--ping-interval-secs", "0"]);
        assert!(settings.ping_interval().is_none());
        let settings = Settings::parse_from(["tweet-tracker"]);
        assert_eq!(settings.ping_interval(), Some(Duration::from_secs(30)));
    }

    // ── load_with_last_used (uses config path injection) ──────────────────────

    #[test]
    fn test_load_with_last_used_merges_persisted_timezone() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);
        LastUsedParams {
            backend_url: None,
            timezone: Some("Asia/Tokyo".to_string()),
            time_format: Some("24h".to_string()),
        }
        .save_to(&config_path)
        .expect("save");

        let settings = Settings::load_with_last_used_impl(args(&["tweet-tracker"]), &config_path);
        assert_eq!(settings.timezone, "Asia/Tokyo");
        assert_eq!(settings.time_format, "24h");
        assert!(!settings.uses_12h_clock());
    }

    #[test]
    fn test_load_with_last_used_cli_overrides_persisted() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);
        LastUsedParams {
            backend_url: Some("http://old:8001".to_string()),
            timezone: Some("UTC".to_string()),
            time_format: Some("24h".to_string()),
        }
        .save_to(&config_path)
        .expect("save");

        let settings = Settings::load_with_last_used_impl(
            args(&["tweet-tracker", "--backend-url", "http://new:8001", "--time-format", "12h"]),
            &config_path,
        );
        assert_eq!(settings.backend_url, "http://new:8001");
        assert!(settings.uses_12h_clock());

        let persisted = LastUsedParams::load_from(&config_path);
        assert_eq!(persisted.backend_url.as_deref(), Some("http://new:8001"));
    }

    // ── Backend precedence ────────────────────────────────────────────────────

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn legacy_env(url: &'static str) -> impl Fn(&str) -> Option<String> {
        move |key: &str| (key == LEGACY_BACKEND_URL_ENV).then(|| url.to_string())
    }

    fn save_backend(config_path: &std::path::Path, url: &str) {
        LastUsedParams {
            backend_url: Some(url.to_string()),
            timezone: Some("UTC".to_string()),
            time_format: Some("24h".to_string()),
        }
        .save_to(config_path)
        .expect("save");
    }

    #[test]
    fn test_backend_restored_from_last_used_without_flag() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);
        save_backend(&config_path, "http://remembered:8001");

        let settings =
            Settings::load_with_last_used_env(args(&["tweet-tracker"]), &config_path, no_env);
        assert_eq!(settings.backend_url, "http://remembered:8001");
    }

    #[test]
    fn test_legacy_env_beats_last_used_backend() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);
        save_backend(&config_path, "http://remembered:8001");

        let settings = Settings::load_with_last_used_env(
            args(&["tweet-tracker"]),
            &config_path,
            legacy_env("https://dashboard.example.com"),
        );
        assert_eq!(settings.backend_url, "https://dashboard.example.com");

        let persisted = LastUsedParams::load_from(&config_path);
        assert_eq!(persisted.backend_url.as_deref(), Some("https://dashboard.example.com"));
    }

    #[test]
    fn test_blank_legacy_env_falls_through_to_last_used() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);
        save_backend(&config_path, "http://remembered:8001");

        let settings = Settings::load_with_last_used_env(
            args(&["tweet-tracker"]),
            &config_path,
            legacy_env("  "),
        );
        assert_eq!(settings.backend_url, "http://remembered:8001");
    }

    #[test]
    fn test_cli_backend_beats_legacy_env_and_last_used() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);
        save_backend(&config_path, "http://remembered:8001");

        let settings = Settings::load_with_last_used_env(
            args(&["tweet-tracker", "--backend-url", "http://cli:8001"]),
            &config_path,
            legacy_env("https://dashboard.example.com"),
        );
        assert_eq!(settings.backend_url, "http://cli:8001");
    }

    #[test]
    fn test_clear_still_honours_legacy_env() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);
        save_backend(&config_path, "http://remembered:8001");

        let settings = Settings::load_with_last_used_env(
            args(&["tweet-tracker", "--clear"]),
            &config_path,
            legacy_env("https://dashboard.example.com"),
        );
        assert_eq!(settings.backend_url, "https://dashboard.example.com");
        assert!(!config_path.exists());
    }

    #[test]
    fn test_load_with_last_used_clear_removes_file() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);
        LastUsedParams::default().save_to(&config_path).expect("save");

        Settings::load_with_last_used_impl(args(&["tweet-tracker", "--clear"]), &config_path);

        assert!(!config_path.exists(), "file must be gone after --clear");
    }

    #[test]
    fn test_load_with_last_used_debug_overrides_log_level() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);

        let settings =
            Settings::load_with_last_used_impl(args(&["tweet-tracker", "--debug"]), &config_path);
        assert_eq!(settings.log_level, "DEBUG");
        assert_ne!(settings.timezone, "auto");
        assert!(settings.time_format == "12h" || settings.time_format == "24h");
    }
}
