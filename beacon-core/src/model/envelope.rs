use crate::model::role::Role;
use crate::model::viewer::ViewerId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Inbound envelopes. `room`/`role` stay optional so a malformed `join` can be
/// answered with an `error` envelope instead of failing to parse.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientEnvelope {
    Join {
        #[serde(default)]
        room: Option<String>,
        #[serde(default)]
        role: Option<String>,
    },
    Signal {
        /// Informational; routing uses the sender's session, not this field.
        #[serde(default)]
        room: Option<String>,
        payload: Value,
        /// Target viewer, required when the sender is the broadcaster.
        #[serde(default)]
        to: Option<ViewerId>,
    },
    /// Application-level liveness ack, for transports without pong frames.
    Pong,
}

/// Outbound envelopes. Payloads are relayed verbatim, never parsed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum ServerEnvelope {
    Joined {
        role: Role,
        room: String,
    },
    Registered {
        client_id: ViewerId,
        room: String,
    },
    BroadcasterStatus {
        online: bool,
    },
    ViewerJoined {
        viewer_id: ViewerId,
    },
    ViewerLeft {
        viewer_id: ViewerId,
    },
    Signal {
        viewer_id: ViewerId,
        payload: Value,
    },
    Error {
        message: String,
    },
    /// Application-level liveness probe, for transports without ping frames.
    Ping {
        timestamp: u64,
    },
}
