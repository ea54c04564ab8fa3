//! Transport for the live-update channel.
//!
//! [`SocketConnector`] opens sessions; [`SocketSession`] yields text frames
//! and accepts outgoing ones. [`WsConnector`] implements both on top of
//! `tokio-tungstenite`. The reconnect logic in [`crate::live`] only sees the
//! traits, which keeps it testable without a network.

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use tracker_core::{Result, TrackerError};

/// Opens live-update sessions.
#[async_trait]
pub trait SocketConnector: Send + Sync {
    async fn connect(&self, url: &str) -> Result<Box<dyn SocketSession>>;
}

/// One open socket.
#[async_trait]
pub trait SocketSession: Send {
    /// Next text frame.
    ///
    /// `None` means the peer closed the socket; `Some(Err(_))` is a socket
    /// error, after which the session is unusable. Must be cancel-safe.
    async fn recv(&mut self) -> Option<Result<String>>;

    async fn send_text(&mut self, text: String) -> Result<()>;

    /// Close politely. Errors are not interesting at this point.
    async fn close(&mut self);
}

// ── tokio-tungstenite ─────────────────────────────────────────────────────────

/// Connector backed by `tokio-tungstenite` (plain and TLS sockets).
#[derive(Debug, Clone, Copy, Default)]
pub struct WsConnector;

#[async_trait]
impl SocketConnector for WsConnector {
    async fn connect(&self, url: &str) -> Result<Box<dyn SocketSession>> {
        let (stream, response) = connect_async(url)
            .await
            .map_err(|e| TrackerError::Socket(format!("connect to {url} failed: {e}")))?;
        tracing::debug!(url, status = response.status().as_u16(), "socket handshake complete");
        Ok(Box::new(WsSession { stream }))
    }
}

struct WsSession {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait]
impl SocketSession for WsSession {
    async fn recv(&mut self) -> Option<Result<String>> {
        loop {
            match self.stream.next().await? {
                Ok(Message::Text(text)) => return Some(Ok(text)),
                Ok(Message::Close(frame)) => {
                    tracing::debug!(?frame, "server closed socket");
                    return None;
                }
                // Control frames are answered by tungstenite itself; the
                // backend never sends binary payloads.
                Ok(Message::Binary(_) | Message::Ping(_) | Message::Pong(_) | Message::Frame(_)) => {
                    continue
                }
                Err(e) => return Some(Err(TrackerError::Socket(e.to_string()))),
            }
        }
    }

    async fn send_text(&mut self, text: String) -> Result<()> {
        self.stream
            .send(Message::Text(text))
            .await
            .map_err(|e| TrackerError::Socket(e.to_string()))
    }

    async fn close(&mut self) {
        if let Err(e) = self.stream.close(None).await {
            tracing::trace!(error = %e, "error while closing socket");
        }
    }
}
