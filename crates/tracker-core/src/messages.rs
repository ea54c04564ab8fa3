//! Live-update wire messages.
//!
//! Every frame on `/api/ws` is a JSON object `{ "type": <tag>, "data": ... }`.
//! [`ServerMessage::decode`] turns a frame into a closed enum; tags this
//! client does not know decode to [`ServerMessage::Unknown`] instead of
//! failing, so a newer backend cannot break an older client.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::models::{null_as_default, CaAlert, NameAlert};
use crate::time_utils::{lenient_timestamp, parse_backend_timestamp};

pub const TAG_NAME_ALERT: &str = "name_alert";
pub const TAG_CA_ALERT: &str = "ca_alert";
pub const TAG_INITIAL_STATE: &str = "initial_state";
pub const TAG_PONG: &str = "pong";

// ── Server → client ──────────────────────────────────────────────────────────

/// State the backend pushes right after a socket opens.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InitialState {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name_alerts: Vec<NameAlert>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub ca_alerts: Vec<CaAlert>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracked_accounts_count: Option<u64>,
}

/// A decoded frame from the live-update socket.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerMessage {
    /// A token crossed the mention quorum.
    NameAlert(NameAlert),
    /// A new contract address was observed.
    CaAlert(CaAlert),
    /// Recent alerts, replacing whatever the client holds.
    InitialState(InitialState),
    /// Reply to a client heartbeat.
    Pong { timestamp: Option<DateTime<Utc>> },
    /// A tag this client does not handle.
    Unknown { kind: String },
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    data: Value,
    #[serde(default)]
    timestamp: Option<String>,
}

impl ServerMessage {
    /// Decode one text frame.
    ///
    /// Fails when the frame is not a JSON object with a string `type`, or
    /// when a known tag carries a payload of the wrong shape.
    pub fn decode(text: &str) -> Result<Self> {
        let envelope: Envelope = serde_json::from_str(text)?;

        let message = match envelope.kind.as_str() {
            TAG_NAME_ALERT => ServerMessage::NameAlert(serde_json::from_value(envelope.data)?),
            TAG_CA_ALERT => ServerMessage::CaAlert(serde_json::from_value(envelope.data)?),
            TAG_INITIAL_STATE => {
                // The backend may send `"data": null` when it has nothing yet.
                let state = if envelope.data.is_null() {
                    InitialState::default()
                } else {
                    serde_json::from_value(envelope.data)?
                };
                ServerMessage::InitialState(state)
            }
            TAG_PONG => ServerMessage::Pong {
                timestamp: envelope.timestamp.as_deref().and_then(parse_backend_timestamp),
            },
            _ => ServerMessage::Unknown {
                kind: envelope.kind,
            },
        };

        Ok(message)
    }

    /// The wire tag of this message.
    pub fn kind(&self) -> &str {
        match self {
            ServerMessage::NameAlert(_) => TAG_NAME_ALERT,
            ServerMessage::CaAlert(_) => TAG_CA_ALERT,
            ServerMessage::InitialState(_) => TAG_INITIAL_STATE,
            ServerMessage::Pong { .. } => TAG_PONG,
            ServerMessage::Unknown { kind } => kind,
        }
    }
}

// ── Client → server ──────────────────────────────────────────────────────────

/// Frames this client sends on the live-update socket.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Heartbeat; the backend answers with `pong`.
    Ping {
        #[serde(with = "lenient_timestamp")]
        timestamp: Option<DateTime<Utc>>,
    },
}

impl ClientMessage {
    /// A heartbeat stamped with the current time.
    pub fn ping_now() -> Self {
        ClientMessage::Ping {
            timestamp: Some(Utc::now()),
        }
    }

    /// Serialise to a text frame.
    pub fn encode(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
