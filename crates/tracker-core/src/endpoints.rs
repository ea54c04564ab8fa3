//! Backend URL resolution.
//!
//! A single base URL (e.g. `https://tracker.example.com`) selects both the
//! REST root (`<base>/api`) and the live-update socket (`<base>/api/ws`). The
//! socket scheme is derived from the HTTP scheme by substitution:
//! `https://` → `wss://`, `http://` → `ws://`.

use crate::error::{Result, TrackerError};

// ── REST paths (relative to the API root) ────────────────────────────────────

pub const ROOT: &str = "";
pub const ALERTS_NAMES: &str = "alerts/names";
pub const ALERTS_CAS: &str = "alerts/cas";
pub const ACCOUNTS: &str = "accounts";
pub const MENTIONS: &str = "mentions";
pub const PERFORMANCE: &str = "performance";
pub const VERSIONS: &str = "versions";
pub const VERSIONS_SAVE: &str = "versions/save";
pub const MONITORING_STATUS: &str = "monitoring/status";
pub const MONITORING_START: &str = "monitoring/start";
pub const MONITORING_STOP: &str = "monitoring/stop";
pub const MONITORING_CONFIG: &str = "monitoring/config";
pub const GITHUB_SETUP: &str = "github/setup";
pub const GITHUB_BACKUP: &str = "github/backup";
pub const GITHUB_BACKUPS: &str = "github/backups";
pub const GITHUB_STATS: &str = "github/stats";

/// `accounts/{id}`, with `id` percent-encoded as one path segment.
pub fn account(id: &str) -> String {
    format!("{ACCOUNTS}/{}", urlencoding::encode(id))
}

/// `versions/{id}/load`, with `id` percent-encoded as one path segment.
pub fn version_load(id: &str) -> String {
    format!("{VERSIONS}/{}/load", urlencoding::encode(id))
}

// ── Endpoints ─────────────────────────────────────────────────────────────────

/// Resolved REST and WebSocket locations for one backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    api_root: String,
    ws_url: String,
}

impl Endpoints {
    /// Resolve endpoints from a backend base URL.
    ///
    /// A trailing `/` is trimmed. Only `http://` and `https://` bases are
    /// accepted.
    pub fn from_base_url(base_url: &str) -> Result<Self> {
        let base = base_url.trim().trim_end_matches('/');
        if base.is_empty() {
            return Err(TrackerError::InvalidUrl(base_url.to_string()));
        }

        let api_root = format!("{base}/api");
        let ws_url = to_socket_scheme(&format!("{api_root}/ws"))
            .ok_or_else(|| TrackerError::InvalidUrl(base_url.to_string()))?;

        Ok(Self { api_root, ws_url })
    }

    /// The REST root, e.g. `https://host/api`.
    pub fn api_root(&self) -> &str {
        &self.api_root
    }

    /// The live-update socket URL, e.g. `wss://host/api/ws`.
    pub fn ws_url(&self) -> &str {
        &self.ws_url
    }

    /// Absolute URL for a REST path relative to the API root.
    pub fn url(&self, path: &str) -> String {
        let path = path.trim_start_matches('/');
        if path.is_empty() {
            format!("{}/", self.api_root)
        } else {
            format!("{}/{}", self.api_root, path)
        }
    }
}

/// Swap an HTTP scheme for its WebSocket counterpart.
///
/// Returns `None` when `url` is neither `http://` nor `https://`.
pub fn to_socket_scheme(url: &str) -> Option<String> {
    if let Some(rest) = url.strip_prefix("https://") {
        Some(format!("wss://{rest}"))
    } else {
        url.strip_prefix("http://").map(|rest| format!("ws://{rest}"))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
