//! Dashboard session orchestrator.
//!
//! Spawns the one-shot initial load and the live channel as tokio tasks that
//! feed a single `mpsc` stream of [`Action`]s, so the consumer owns the
//! [`DashboardStore`](tracker_core::store::DashboardStore) without any shared
//! mutable state.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use tracker_core::settings::Settings;
use tracker_core::store::Action;
use tracker_core::Result;

use crate::api::{DashboardApi, HttpApi};
use crate::backoff::ReconnectPolicy;
use crate::live::{LiveChannel, DEFAULT_PING_INTERVAL};
use crate::loader;
use crate::socket::{SocketConnector, WsConnector};

/// Actions buffered between the background tasks and the consumer.
const ACTION_BUFFER: usize = 64;

// ── DashboardOrchestrator ─────────────────────────────────────────────────────

pub struct DashboardOrchestrator {
    api: Arc<dyn DashboardApi>,
    connector: Arc<dyn SocketConnector>,
    socket_url: String,
    policy: ReconnectPolicy,
    ping_interval: Option<Duration>,
}

impl DashboardOrchestrator {
    pub fn new(
        api: Arc<dyn DashboardApi>,
        connector: Arc<dyn SocketConnector>,
        socket_url: impl Into<String>,
    ) -> Self {
        Self {
            api,
            connector,
            socket_url: socket_url.into(),
            policy: ReconnectPolicy::default(),
            ping_interval: Some(DEFAULT_PING_INTERVAL),
        }
    }

    /// Wire the HTTP client and WebSocket connector for the backend in
    /// `settings`.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let api = HttpApi::from_settings(settings)?;
        let socket_url = api.endpoints().ws_url().to_string();
        Ok(Self::new(Arc::new(api), Arc::new(WsConnector), socket_url)
            .with_policy(ReconnectPolicy::from_settings(settings))
            .with_ping_interval(settings.ping_interval()))
    }

    pub fn with_policy(mut self, policy: ReconnectPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_ping_interval(mut self, interval: Option<Duration>) -> Self {
        self.ping_interval = interval;
        self
    }

    /// Start the initial load and the live channel.
    ///
    /// Returns the action stream and a [`DashboardHandle`] that stops both
    /// tasks. The stream ends once both tasks have finished.
    pub fn start(self) -> (mpsc::Receiver<Action>, DashboardHandle) {
        let (tx, rx) = mpsc::channel(ACTION_BUFFER);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let api = Arc::clone(&self.api);
        let loader_tx = tx.clone();
        let loader = tokio::spawn(async move {
            let action = loader::initial_load_action(api.as_ref()).await;
            if loader_tx.send(action).await.is_err() {
                tracing::debug!("initial data discarded; receiver dropped");
            }
        });

        let channel = LiveChannel::new(self.connector, self.socket_url)
            .with_policy(self.policy)
            .with_ping_interval(self.ping_interval);
        let live = tokio::spawn(channel.run(tx, shutdown_rx));

        (
            rx,
            DashboardHandle {
                shutdown: shutdown_tx,
                loader,
                live,
            },
        )
    }
}

// ── DashboardHandle ───────────────────────────────────────────────────────────

/// Handle to the background tasks of one dashboard session.
pub struct DashboardHandle {
    shutdown: watch::Sender<bool>,
    loader: JoinHandle<()>,
    live: JoinHandle<()>,
}

impl DashboardHandle {
    /// Cancel any pending reconnect, close the socket and wait for the live
    /// task to end. An unfinished initial load is abandoned. Returns even
    /// when the action stream is full and nobody is draining it.
    pub async fn shutdown(self) {
        self.shutdown.send_replace(true);
        self.loader.abort();
        if let Err(e) = self.live.await {
            if !e.is_cancelled() {
                tracing::warn!(error = %e, "live channel task failed");
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
