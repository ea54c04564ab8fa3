//! In-memory doubles for [`DashboardApi`] and [`SocketConnector`].

use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::time::Instant;

use tracker_core::models::{
    ApiInfo, AppVersion, CaAlert, GitHubBackup, GitHubBackupRequest, GitHubBackupResult,
    GitHubSetup, GitHubSetupResult, MonitoringConfig, MonitoringStarted, MonitoringStatus,
    NameAlert, NewAccount, SaveVersion, TokenMention, TrackedAccount,
};
use tracker_core::{Result, TrackerError};

use crate::api::DashboardApi;
use crate::socket::{SocketConnector, SocketSession};

// ── MockApi ───────────────────────────────────────────────────────────────────

/// Canned backend. Methods named in `failing` answer HTTP 500, those in
/// `not_found` answer 404.
#[derive(Default)]
pub struct MockApi {
    pub name_alerts: Vec<NameAlert>,
    pub ca_alerts: Vec<CaAlert>,
    pub accounts: Vec<TrackedAccount>,
    pub versions: Vec<AppVersion>,
    pub monitoring_status: MonitoringStatus,
    pub github_backups: Vec<GitHubBackup>,
    pub github_stats: Value,
    pub monitoring_config: MonitoringConfig,
    pub github_setup_result: GitHubSetupResult,
    pub github_backup_result: GitHubBackupResult,
    pub failing: HashSet<&'static str>,
    pub not_found: HashSet<&'static str>,
    /// Every call sleeps this long first.
    pub latency: Option<Duration>,
    pub calls: Mutex<Vec<String>>,
    pub bodies: Mutex<Vec<Value>>,
}

impl MockApi {
    pub fn with_failures(mut self, methods: &[&'static str]) -> Self {
        self.failing.extend(methods);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn called(&self, method: &str) -> bool {
        self.calls().iter().any(|c| c == method)
    }

    /// JSON bodies of every write call, in order.
    pub fn bodies(&self) -> Vec<Value> {
        self.bodies.lock().unwrap().clone()
    }

    async fn call(&self, method: &'static str) -> Result<()> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        self.calls.lock().unwrap().push(method.to_string());
        if self.failing.contains(method) {
            return Err(TrackerError::Status {
                endpoint: method.to_string(),
                status: 500,
            });
        }
        if self.not_found.contains(method) {
            return Err(TrackerError::Status {
                endpoint: method.to_string(),
                status: 404,
            });
        }
        Ok(())
    }

    fn record<B: serde::Serialize>(&self, body: &B) {
        let value = serde_json::to_value(body).unwrap();
        self.bodies.lock().unwrap().push(value);
    }
}

#[async_trait]
impl DashboardApi for MockApi {
    async fn api_info(&self) -> Result<ApiInfo> {
        self.call("api_info").await?;
        Ok(ApiInfo {
            message: "Tweet Tracker API".to_string(),
            version: "1.0.0".to_string(),
        })
    }

    async fn name_alerts(&self) -> Result<Vec<NameAlert>> {
        self.call("name_alerts").await?;
        Ok(self.name_alerts.clone())
    }

    async fn ca_alerts(&self) -> Result<Vec<CaAlert>> {
        self.call("ca_alerts").await?;
        Ok(self.ca_alerts.clone())
    }

    async fn accounts(&self) -> Result<Vec<TrackedAccount>> {
        self.call("accounts").await?;
        Ok(self.accounts.clone())
    }

    async fn performance(&self) -> Result<Vec<Value>> {
        self.call("performance").await?;
        Ok(vec![])
    }

    async fn versions(&self) -> Result<Vec<AppVersion>> {
        self.call("versions").await?;
        Ok(self.versions.clone())
    }

    async fn monitoring_status(&self) -> Result<MonitoringStatus> {
        self.call("monitoring_status").await?;
        Ok(self.monitoring_status.clone())
    }

    async fn github_backups(&self) -> Result<Vec<GitHubBackup>> {
        self.call("github_backups").await?;
        Ok(self.github_backups.clone())
    }

    async fn github_stats(&self) -> Result<Value> {
        self.call("github_stats").await?;
        Ok(self.github_stats.clone())
    }

    async fn add_account(&self, account: &NewAccount) -> Result<TrackedAccount> {
        self.call("add_account").await?;
        self.record(account);
        Ok(serde_json::from_value(json!({
            "id": format!("id-{}", account.username),
            "username": account.username,
            "display_name": account.display_name,
        }))
        .unwrap())
    }

    async fn remove_account(&self, _id: &str) -> Result<()> {
        self.call("remove_account").await
    }

    async fn add_mention(&self, mention: &TokenMention) -> Result<()> {
        self.call("add_mention").await?;
        self.record(mention);
        Ok(())
    }

    async fn save_version(&self, request: &SaveVersion) -> Result<AppVersion> {
        self.call("save_version").await?;
        self.record(request);
        Ok(serde_json::from_value(json!({
            "id": "saved",
            "version_number": request.version_number,
            "tag_name": request.tag_name,
        }))
        .unwrap())
    }

    async fn load_version(&self, id: &str) -> Result<AppVersion> {
        self.call("load_version").await?;
        Ok(serde_json::from_value(json!({ "id": id, "version_number": "v1" })).unwrap())
    }

    async fn start_monitoring(&self) -> Result<MonitoringStarted> {
        self.call("start_monitoring").await?;
        Ok(MonitoringStarted {
            accounts_count: self.accounts.len() as u64,
            message: None,
        })
    }

    async fn stop_monitoring(&self) -> Result<()> {
        self.call("stop_monitoring").await
    }

    async fn monitoring_config(&self) -> Result<MonitoringConfig> {
        self.call("monitoring_config").await?;
        Ok(self.monitoring_config.clone())
    }

    async fn update_monitoring_config(&self, config: &MonitoringConfig) -> Result<()> {
        self.call("update_monitoring_config").await?;
        self.record(config);
        Ok(())
    }

    async fn github_setup(&self, setup: &GitHubSetup) -> Result<GitHubSetupResult> {
        self.call("github_setup").await?;
        self.record(setup);
        Ok(self.github_setup_result.clone())
    }

    async fn github_backup(&self, request: &GitHubBackupRequest) -> Result<GitHubBackupResult> {
        self.call("github_backup").await?;
        self.record(request);
        Ok(self.github_backup_result.clone())
    }
}

// ── MockConnector ─────────────────────────────────────────────────────────────

/// What a scripted session does after its frames run out.
#[derive(Debug, Clone, Copy)]
pub enum Then {
    /// Peer closes the socket.
    Close,
    /// Socket reports an error.
    Fail,
    /// Socket stays open until the client closes it.
    Hold,
}

/// One scripted connect attempt.
#[derive(Debug, Clone)]
pub enum Attempt {
    Refused,
    Open { frames: Vec<String>, then: Then },
}

impl Attempt {
    pub fn open(frames: &[&str], then: Then) -> Self {
        Attempt::Open {
            frames: frames.iter().map(|f| f.to_string()).collect(),
            then,
        }
    }
}

/// Connector that plays back [`Attempt`]s in order, refusing once the
/// script is exhausted.
#[derive(Default)]
pub struct MockConnector {
    script: Mutex<VecDeque<Attempt>>,
    connect_times: Mutex<Vec<Instant>>,
    sent: Arc<Mutex<Vec<String>>>,
}

impl MockConnector {
    pub fn new(script: Vec<Attempt>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            ..Self::default()
        }
    }

    pub fn attempts(&self) -> usize {
        self.connect_times.lock().unwrap().len()
    }

    /// Seconds between consecutive connect attempts.
    pub fn gaps_secs(&self) -> Vec<f64> {
        let times = self.connect_times.lock().unwrap();
        times
            .windows(2)
            .map(|w| (w[1] - w[0]).as_secs_f64())
            .collect()
    }

    /// Frames the client sent, across all sessions.
    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl SocketConnector for MockConnector {
    async fn connect(&self, url: &str) -> Result<Box<dyn SocketSession>> {
        self.connect_times.lock().unwrap().push(Instant::now());
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(Attempt::Open { frames, then }) => Ok(Box::new(MockSession {
                frames: frames.into(),
                then,
                sent: Arc::clone(&self.sent),
            })),
            Some(Attempt::Refused) | None => {
                Err(TrackerError::Socket(format!("connection to {url} refused")))
            }
        }
    }
}

struct MockSession {
    frames: VecDeque<String>,
    then: Then,
    sent: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl SocketSession for MockSession {
    async fn recv(&mut self) -> Option<Result<String>> {
        if let Some(frame) = self.frames.pop_front() {
            return Some(Ok(frame));
        }
        match self.then {
            Then::Close => None,
            Then::Fail => Some(Err(TrackerError::Socket("connection reset".to_string()))),
            Then::Hold => std::future::pending().await,
        }
    }

    async fn send_text(&mut self, text: String) -> Result<()> {
        self.sent.lock().unwrap().push(text);
        Ok(())
    }

    async fn close(&mut self) {}
}
