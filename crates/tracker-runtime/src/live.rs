//! The live-update channel.
//!
//! [`LiveChannel::run`] keeps one socket open to `/api/ws`, forwarding every
//! decoded frame as an [`Action::Live`] and every status change as an
//! [`Action::ConnectionChanged`]. When the socket closes, or a connect
//! attempt fails, exactly one reconnect is scheduled after the delay handed
//! out by [`Backoff`] and announced as [`Action::ReconnectScheduled`].
//! Setting the shutdown flag cancels that timer, closes an open socket and
//! ends the task, even while a send to a full action channel is pending.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::time::{self, Interval, MissedTickBehavior};

use tracker_core::messages::{ClientMessage, ServerMessage};
use tracker_core::store::{Action, ConnectionStatus};

use crate::backoff::{Backoff, ReconnectPolicy};
use crate::socket::{SocketConnector, SocketSession};

/// Default heartbeat interval.
pub const DEFAULT_PING_INTERVAL: Duration = Duration::from_secs(30);

/// Why a connected session ended.
#[derive(Debug, PartialEq, Eq)]
enum SessionEnd {
    /// The peer closed the socket.
    Closed,
    /// The socket reported an error.
    Failed,
    /// Shutdown was requested or the consumer went away.
    Stopped,
}

// ── LiveChannel ───────────────────────────────────────────────────────────────

pub struct LiveChannel {
    connector: Arc<dyn SocketConnector>,
    url: String,
    policy: ReconnectPolicy,
    ping_interval: Option<Duration>,
}

impl LiveChannel {
    pub fn new(connector: Arc<dyn SocketConnector>, url: impl Into<String>) -> Self {
        Self {
            connector,
            url: url.into(),
            policy: ReconnectPolicy::default(),
            ping_interval: Some(DEFAULT_PING_INTERVAL),
        }
    }

    pub fn with_policy(mut self, policy: ReconnectPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Heartbeat interval; `None` disables pings.
    pub fn with_ping_interval(mut self, interval: Option<Duration>) -> Self {
        self.ping_interval = interval.filter(|d| !d.is_zero());
        self
    }

    /// Run until shutdown, until the receiver of `tx` is dropped, or until
    /// the reconnect budget is exhausted.
    pub async fn run(self, tx: mpsc::Sender<Action>, mut shutdown: watch::Receiver<bool>) {
        let mut backoff = Backoff::new(self.policy.clone());

        loop {
            if *shutdown.borrow() {
                break;
            }
            if !emit(&tx, &mut shutdown, Action::ConnectionChanged(ConnectionStatus::Connecting))
                .await
            {
                break;
            }

            tracing::debug!(url = %self.url, attempt = backoff.failures() + 1, "connecting live channel");
            let connected = tokio::select! {
                _ = stopped(&mut shutdown) => break,
                result = self.connector.connect(&self.url) => result,
            };

            match connected {
                Ok(session) => {
                    backoff.reset();
                    tracing::info!(url = %self.url, "live channel connected");
                    let opened = Action::ConnectionChanged(ConnectionStatus::Connected);
                    if !emit(&tx, &mut shutdown, opened).await {
                        break;
                    }

                    match self.drive(session, &tx, &mut shutdown).await {
                        SessionEnd::Stopped => break,
                        SessionEnd::Failed => {
                            let failed = Action::ConnectionChanged(ConnectionStatus::Error);
                            if !emit(&tx, &mut shutdown, failed).await {
                                break;
                            }
                        }
                        SessionEnd::Closed => {}
                    }
                }
                Err(e) => {
                    tracing::warn!(url = %self.url, error = %e, "live channel connect failed");
                    if !emit(&tx, &mut shutdown, Action::ConnectionChanged(ConnectionStatus::Error))
                        .await
                    {
                        break;
                    }
                }
            }

            if !emit(&tx, &mut shutdown, Action::ConnectionChanged(ConnectionStatus::Disconnected))
                .await
            {
                break;
            }

            let Some(delay) = backoff.next_delay() else {
                let attempts = backoff.failures();
                tracing::warn!(attempts, "giving up on live channel");
                emit(&tx, &mut shutdown, Action::ReconnectAbandoned { attempts }).await;
                break;
            };

            tracing::debug!(delay_ms = delay.as_millis() as u64, "reconnect scheduled");
            if !emit(&tx, &mut shutdown, Action::ReconnectScheduled { retry_in: delay }).await {
                break;
            }

            tokio::select! {
                _ = stopped(&mut shutdown) => {
                    tracing::debug!("pending reconnect cancelled");
                    break;
                }
                _ = time::sleep(delay) => {}
            }
        }

        tracing::debug!("live channel stopped");
    }

    /// Pump one open session until it ends.
    async fn drive(
        &self,
        mut session: Box<dyn SocketSession>,
        tx: &mpsc::Sender<Action>,
        shutdown: &mut watch::Receiver<bool>,
    ) -> SessionEnd {
        let mut heartbeat = self.ping_interval.map(|period| {
            let mut interval = time::interval_at(time::Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            interval
        });

        loop {
            tokio::select! {
                _ = stopped(shutdown) => {
                    session.close().await;
                    return SessionEnd::Stopped;
                }
                _ = next_tick(&mut heartbeat) => {
                    let frame = match ClientMessage::ping_now().encode() {
                        Ok(frame) => frame,
                        Err(e) => {
                            tracing::warn!(error = %e, "could not encode heartbeat");
                            continue;
                        }
                    };
                    if let Err(e) = session.send_text(frame).await {
                        tracing::warn!(error = %e, "heartbeat failed");
                        return SessionEnd::Failed;
                    }
                    tracing::trace!("ping sent");
                }
                frame = session.recv() => match frame {
                    Some(Ok(text)) => {
                        // The select futures are dropped here, so `shutdown` is free again.
                        if !forward(&text, tx, shutdown).await {
                            session.close().await;
                            return SessionEnd::Stopped;
                        }
                    }
                    Some(Err(e)) => {
                        tracing::warn!(error = %e, "live channel error");
                        return SessionEnd::Failed;
                    }
                    None => {
                        tracing::info!("live channel closed by server");
                        return SessionEnd::Closed;
                    }
                },
            }
        }
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Decode one frame and pass it on. Undecodable frames are logged and
/// dropped. Returns `false` when the consumer is gone or shutdown was
/// requested.
async fn forward(
    text: &str,
    tx: &mpsc::Sender<Action>,
    shutdown: &mut watch::Receiver<bool>,
) -> bool {
    match ServerMessage::decode(text) {
        Ok(message) => {
            tracing::trace!(kind = message.kind(), "live message");
            emit(tx, shutdown, Action::Live(message)).await
        }
        Err(e) => {
            tracing::warn!(error = %e, frame_len = text.len(), "dropping undecodable live frame");
            true
        }
    }
}

/// Send one action. A send blocked on a full channel gives up as soon as
/// shutdown is requested; nothing is sent once it has been.
async fn emit(
    tx: &mpsc::Sender<Action>,
    shutdown: &mut watch::Receiver<bool>,
    action: Action,
) -> bool {
    tokio::select! {
        biased;
        _ = stopped(shutdown) => {
            tracing::debug!("shutdown requested; action dropped");
            false
        }
        sent = tx.send(action) => {
            if sent.is_err() {
                tracing::debug!("action receiver dropped");
            }
            sent.is_ok()
        }
    }
}

/// Resolves once shutdown is requested or its sender is dropped.
async fn stopped(shutdown: &mut watch::Receiver<bool>) {
    let _ = shutdown.wait_for(|stop| *stop).await;
}

async fn next_tick(heartbeat: &mut Option<Interval>) {
    match heartbeat {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
