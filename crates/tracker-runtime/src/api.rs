//! REST access to the backend.
//!
//! [`DashboardApi`] is the seam the loader and the mutation actions depend
//! on; [`HttpApi`] implements it with `reqwest`. Bodies are read as bytes and
//! decoded with `serde_json` so a malformed body surfaces as
//! [`TrackerError::JsonParse`] rather than as a transport failure.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use tracker_core::endpoints::{self, Endpoints};
use tracker_core::models::{
    AlertsEnvelope, ApiInfo, AppVersion, BackupsEnvelope, CaAlert, GitHubBackup,
    GitHubBackupRequest, GitHubBackupResult, GitHubSetup, GitHubSetupResult, MonitoringConfig,
    MonitoringStarted, MonitoringStatus, NameAlert, NewAccount, PerformanceEnvelope, SaveVersion,
    TokenMention, TrackedAccount, VersionEnvelope, VersionsEnvelope,
};
use tracker_core::settings::Settings;
use tracker_core::{Result, TrackerError};

const USER_AGENT: &str = concat!("tweet-tracker/", env!("CARGO_PKG_VERSION"));

// ── DashboardApi ──────────────────────────────────────────────────────────────

/// Every backend call the client makes.
#[async_trait]
pub trait DashboardApi: Send + Sync {
    /// `GET /api/`: health probe.
    async fn api_info(&self) -> Result<ApiInfo>;

    async fn name_alerts(&self) -> Result<Vec<NameAlert>>;
    async fn ca_alerts(&self) -> Result<Vec<CaAlert>>;
    async fn accounts(&self) -> Result<Vec<TrackedAccount>>;
    async fn performance(&self) -> Result<Vec<Value>>;
    async fn versions(&self) -> Result<Vec<AppVersion>>;
    async fn monitoring_status(&self) -> Result<MonitoringStatus>;
    async fn github_backups(&self) -> Result<Vec<GitHubBackup>>;
    async fn github_stats(&self) -> Result<Value>;

    async fn add_account(&self, account: &NewAccount) -> Result<TrackedAccount>;
    async fn remove_account(&self, id: &str) -> Result<()>;
    async fn add_mention(&self, mention: &TokenMention) -> Result<()>;
    async fn save_version(&self, request: &SaveVersion) -> Result<AppVersion>;
    async fn load_version(&self, id: &str) -> Result<AppVersion>;
    async fn start_monitoring(&self) -> Result<MonitoringStarted>;
    async fn stop_monitoring(&self) -> Result<()>;
    async fn monitoring_config(&self) -> Result<MonitoringConfig>;
    async fn update_monitoring_config(&self, config: &MonitoringConfig) -> Result<()>;
    async fn github_setup(&self, setup: &GitHubSetup) -> Result<GitHubSetupResult>;
    async fn github_backup(&self, request: &GitHubBackupRequest) -> Result<GitHubBackupResult>;
}

// ── HttpApi ───────────────────────────────────────────────────────────────────

/// `reqwest`-backed [`DashboardApi`].
#[derive(Debug, Clone)]
pub struct HttpApi {
    client: Client,
    endpoints: Endpoints,
}

impl HttpApi {
    pub fn new(endpoints: Endpoints, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| TrackerError::Config(format!("could not build HTTP client: {e}")))?;
        Ok(Self { client, endpoints })
    }

    /// Build a client for the backend and timeout named in `settings`.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let endpoints = Endpoints::from_base_url(&settings.backend_url)?;
        Self::new(endpoints, settings.request_timeout())
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client.request(method, self.endpoints.url(path))
    }

    /// Send `builder` and return the body of a 2xx response.
    async fn send(&self, path: &str, builder: RequestBuilder) -> Result<Vec<u8>> {
        let endpoint = format!("/api/{path}");
        let response = builder.send().await.map_err(|e| TrackerError::Http {
            endpoint: endpoint.clone(),
            message: e.to_string(),
        })?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!(endpoint = %endpoint, status = status.as_u16(), "non-success response");
            return Err(TrackerError::Status {
                endpoint,
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await.map_err(|e| TrackerError::Http {
            endpoint: endpoint.clone(),
            message: e.to_string(),
        })?;
        tracing::trace!(endpoint = %endpoint, len = bytes.len(), "response received");
        Ok(bytes.to_vec())
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        decode(&self.send(path, self.request(Method::GET, path)).await?)
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        decode(&self.send(path, self.request(Method::POST, path).json(body)).await?)
    }

    /// POST without a request body.
    async fn post_empty(&self, path: &str) -> Result<Vec<u8>> {
        self.send(path, self.request(Method::POST, path)).await
    }
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    Ok(serde_json::from_slice(body)?)
}

#[async_trait]
impl DashboardApi for HttpApi {
    async fn api_info(&self) -> Result<ApiInfo> {
        self.get_json(endpoints::ROOT).await
    }

    async fn name_alerts(&self) -> Result<Vec<NameAlert>> {
        let envelope: AlertsEnvelope<NameAlert> = self.get_json(endpoints::ALERTS_NAMES).await?;
        Ok(envelope.alerts)
    }

    async fn ca_alerts(&self) -> Result<Vec<CaAlert>> {
        let envelope: AlertsEnvelope<CaAlert> = self.get_json(endpoints::ALERTS_CAS).await?;
        Ok(envelope.alerts)
    }

    async fn accounts(&self) -> Result<Vec<TrackedAccount>> {
        self.get_json(endpoints::ACCOUNTS).await
    }

    async fn performance(&self) -> Result<Vec<Value>> {
        let envelope: PerformanceEnvelope = self.get_json(endpoints::PERFORMANCE).await?;
        Ok(envelope.performance)
    }

    async fn versions(&self) -> Result<Vec<AppVersion>> {
        let envelope: VersionsEnvelope = self.get_json(endpoints::VERSIONS).await?;
        Ok(envelope.versions)
    }

    async fn monitoring_status(&self) -> Result<MonitoringStatus> {
        self.get_json(endpoints::MONITORING_STATUS).await
    }

    async fn github_backups(&self) -> Result<Vec<GitHubBackup>> {
        let envelope: BackupsEnvelope = self.get_json(endpoints::GITHUB_BACKUPS).await?;
        Ok(envelope.backups)
    }

    async fn github_stats(&self) -> Result<Value> {
        self.get_json(endpoints::GITHUB_STATS).await
    }

    async fn add_account(&self, account: &NewAccount) -> Result<TrackedAccount> {
        self.post_json(endpoints::ACCOUNTS, account).await
    }

    async fn remove_account(&self, id: &str) -> Result<()> {
        let path = endpoints::account(id);
        self.send(&path, self.request(Method::DELETE, &path)).await?;
        Ok(())
    }

    async fn add_mention(&self, mention: &TokenMention) -> Result<()> {
        let _: Value = self.post_json(endpoints::MENTIONS, mention).await?;
        Ok(())
    }

    async fn save_version(&self, request: &SaveVersion) -> Result<AppVersion> {
        let envelope: VersionEnvelope = self.post_json(endpoints::VERSIONS_SAVE, request).await?;
        Ok(envelope.version)
    }

    async fn load_version(&self, id: &str) -> Result<AppVersion> {
        let envelope: VersionEnvelope = decode(&self.post_empty(&endpoints::version_load(id)).await?)?;
        Ok(envelope.version)
    }

    async fn start_monitoring(&self) -> Result<MonitoringStarted> {
        decode(&self.post_empty(endpoints::MONITORING_START).await?)
    }

    async fn stop_monitoring(&self) -> Result<()> {
        self.post_empty(endpoints::MONITORING_STOP).await?;
        Ok(())
    }

    async fn monitoring_config(&self) -> Result<MonitoringConfig> {
        self.get_json(endpoints::MONITORING_CONFIG).await
    }

    async fn update_monitoring_config(&self, config: &MonitoringConfig) -> Result<()> {
        let _: Value = self.post_json(endpoints::MONITORING_CONFIG, config).await?;
        Ok(())
    }

    async fn github_setup(&self, setup: &GitHubSetup) -> Result<GitHubSetupResult> {
        self.post_json(endpoints::GITHUB_SETUP, setup).await
    }

    async fn github_backup(&self, request: &GitHubBackupRequest) -> Result<GitHubBackupResult> {
        self.post_json(endpoints::GITHUB_BACKUP, request).await
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
