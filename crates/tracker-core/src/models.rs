use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::time_utils::lenient_timestamp;

fn default_true() -> bool {
    true
}

fn default_quorum() -> u32 {
    1
}

/// Deserialize `null` the same as a missing field. Pair with
/// `#[serde(default)]`.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ── Alerts ────────────────────────────────────────────────────────────────────

/// A token name mentioned by at least a threshold number of distinct tracked
/// accounts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NameAlert {
    /// Backend-assigned identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// The mentioned token name (e.g. `"BONK"`).
    pub token_name: String,
    /// Number of distinct accounts whose mentions triggered this alert.
    #[serde(default = "default_quorum")]
    pub quorum_count: u32,
    /// When the earliest contributing mention was seen.
    #[serde(default, with = "lenient_timestamp")]
    pub first_seen: Option<DateTime<Utc>>,
    /// Usernames of the mentioning accounts.
    #[serde(default, deserialize_with = "null_as_default")]
    pub accounts_mentioned: Vec<String>,
    /// Links to the contributing tweets.
    #[serde(default, deserialize_with = "null_as_default")]
    pub tweet_urls: Vec<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub alert_triggered: bool,
}

/// A newly observed token contract address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaAlert {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub token_name: String,
    /// Market capitalisation in USD at alert time.
    #[serde(default)]
    pub market_cap: f64,
    /// Alert time as the backend formatted it (`%Y-%m-%d %H:%M:%S`, UTC).
    #[serde(default)]
    pub alert_time_utc: String,
    /// On-chain contract (mint) address.
    #[serde(default)]
    pub contract_address: String,
    /// Chart URL for the token.
    #[serde(default)]
    pub photon_url: String,
    #[serde(default, with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

// ── Accounts & mentions ───────────────────────────────────────────────────────

/// An X account the backend watches for token mentions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedAccount {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub username: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default, with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub name_alerts_contributed: u32,
    #[serde(default)]
    pub accepted_cas_posted: u32,
    #[serde(default)]
    pub max_gain_24h: f64,
}

/// Request body for `POST /api/accounts`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAccount {
    pub username: String,
    pub display_name: String,
}

/// A manually reported token mention (`POST /api/mentions`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMention {
    pub token_name: String,
    pub account_username: String,
    pub tweet_url: String,
}

// ── Monitoring ────────────────────────────────────────────────────────────────

/// Snapshot of the backend monitoring process.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonitoringStatus {
    #[serde(default)]
    pub is_monitoring: bool,
    #[serde(default)]
    pub monitored_accounts_count: u64,
    #[serde(default)]
    pub accounts: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alert_threshold: Option<u32>,
    /// Number of already-known tokens the backend filtered out.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub known_tokens_filtered: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monitoring_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_check: Option<String>,
}

/// Monitoring configuration accepted by `POST /api/monitoring/config`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitoringConfig {
    /// Distinct accounts required before a name alert fires.
    pub alert_threshold: u32,
    /// Seconds between backend monitoring cycles.
    pub check_interval_seconds: u64,
    pub enable_browser_monitoring: bool,
    pub enable_rss_monitoring: bool,
    pub enable_scraping_monitoring: bool,
    pub filter_old_tokens: bool,
    pub filter_tokens_with_ca: bool,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            alert_threshold: DEFAULT_ALERT_THRESHOLD,
            check_interval_seconds: 60,
            enable_browser_monitoring: true,
            enable_rss_monitoring: true,
            enable_scraping_monitoring: true,
            filter_old_tokens: true,
            filter_tokens_with_ca: true,
        }
    }
}

/// Alert threshold assumed when the backend does not report one.
pub const DEFAULT_ALERT_THRESHOLD: u32 = 2;

/// Response of `POST /api/monitoring/start`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitoringStarted {
    #[serde(default)]
    pub accounts_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

// ── Versions & backups ────────────────────────────────────────────────────────

/// A saved snapshot of backend state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppVersion {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub version_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_name: Option<String>,
    #[serde(default, with = "lenient_timestamp")]
    pub timestamp: Option<DateTime<Utc>>,
    /// Opaque state captured by the backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot_data: Option<Value>,
}

/// Request body for `POST /api/versions/save`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveVersion {
    pub version_number: String,
    pub tag_name: String,
}

/// A backup of a version pushed to GitHub.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GitHubBackup {
    #[serde(default, alias = "tag", alias = "version")]
    pub version_tag: Option<String>,
    #[serde(default, with = "lenient_timestamp")]
    pub timestamp: Option<DateTime<Utc>>,
    /// Size in bytes.
    #[serde(default)]
    pub size: Option<u64>,
    /// Any further fields the backend includes.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// Request body for `POST /api/github/setup`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitHubSetup {
    pub github_token: String,
    pub username: String,
}

/// Response of `POST /api/github/setup`: either a repository or an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GitHubSetupResult {
    #[serde(default)]
    pub repository: Option<Value>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Request body for `POST /api/github/backup`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitHubBackupRequest {
    pub version_tag: String,
}

/// Response of `POST /api/github/backup`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitHubBackupResult {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
}

// ── Response envelopes ────────────────────────────────────────────────────────

/// `{ "alerts": [...] }`
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct AlertsEnvelope<T> {
    #[serde(default = "Vec::new", deserialize_with = "null_as_default")]
    pub alerts: Vec<T>,
}

/// `{ "performance": [...] }`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PerformanceEnvelope {
    #[serde(default, deserialize_with = "null_as_default")]
    pub performance: Vec<Value>,
}

/// `{ "versions": [...] }`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VersionsEnvelope {
    #[serde(default, deserialize_with = "null_as_default")]
    pub versions: Vec<AppVersion>,
}

/// `{ "version": {...} }` returned by save and load.
#[derive(Debug, Clone, Deserialize)]
pub struct VersionEnvelope {
    pub version: AppVersion,
}

/// `{ "backups": [...] }`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BackupsEnvelope {
    #[serde(default, deserialize_with = "null_as_default")]
    pub backups: Vec<GitHubBackup>,
}

/// `{ "message": "...", "version": "..." }` returned by the API root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ApiInfo {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub version: String,
}

// ── Tests ─────────────────────────────────────────────────────────────────────
