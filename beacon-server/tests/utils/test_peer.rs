use beacon_core::{ClientEnvelope, Role, ServerEnvelope, ViewerId};
use beacon_server::{ConnectionId, Outgoing, ProbeKind, RelayService};
use serde_json::Value;
use std::time::Duration;
use tokio::sync::mpsc;

/// Timeout for receiving a queued frame (ms).
pub const RECV_TIMEOUT_MS: u64 = 1000;

/// A connection registered with the relay, reading its outbound queue
/// directly instead of through a live socket.
pub struct TestPeer {
    pub conn_id: ConnectionId,
    rx: mpsc::UnboundedReceiver<Outgoing>,
}

impl TestPeer {
    pub fn connect(service: &RelayService) -> Self {
        Self::connect_with_probe(service, ProbeKind::Native)
    }

    pub fn connect_with_probe(service: &RelayService, probe: ProbeKind) -> Self {
        let conn_id = ConnectionId::new();
        let (tx, rx) = mpsc::unbounded_channel();
        service.registry().register(conn_id.clone(), tx, probe);
        Self { conn_id, rx }
    }

    /// Feeds a client envelope into the router, as the transport layer would.
    pub fn send(&self, service: &RelayService, envelope: ClientEnvelope) {
        service.handle_envelope(&self.conn_id, envelope);
    }

    pub fn join(&self, service: &RelayService, room: &str, role: &str) {
        self.send(
            service,
            ClientEnvelope::Join {
                room: Some(room.to_string()),
                role: Some(role.to_string()),
            },
        );
    }

    pub fn signal(&self, service: &RelayService, payload: Value, to: Option<ViewerId>) {
        self.send(
            service,
            ClientEnvelope::Signal {
                room: None,
                payload,
                to,
            },
        );
    }

    pub fn disconnect(&self, service: &RelayService) {
        service.disconnect(&self.conn_id);
    }

    /// Next queued frame, or a panic after the timeout.
    pub async fn recv_outgoing(&mut self) -> Outgoing {
        tokio::time::timeout(Duration::from_millis(RECV_TIMEOUT_MS), self.rx.recv())
            .await
            .expect("timed out waiting for an outgoing frame")
            .expect("outbound queue closed")
    }

    /// Next queued envelope; panics on a transport frame.
    pub async fn recv_envelope(&mut self) -> ServerEnvelope {
        match self.recv_outgoing().await {
            Outgoing::Envelope(envelope) => envelope,
            other => panic!("expected an envelope, got {other:?}"),
        }
    }

    /// Asserts nothing is queued for this peer.
    pub fn assert_silent(&mut self) {
        match self.rx.try_recv() {
            Err(mpsc::error::TryRecvError::Empty) => {}
            other => panic!("expected no traffic, got {other:?}"),
        }
    }

    /// Completes the broadcaster join flow and asserts the reply.
    pub async fn join_as_broadcaster(&mut self, service: &RelayService, room: &str) {
        self.join(service, room, "broadcaster");
        match self.recv_envelope().await {
            ServerEnvelope::Joined {
                role,
                room: joined_room,
            } => {
                assert_eq!(role, Role::Broadcaster);
                assert_eq!(joined_room, room);
            }
            other => panic!("expected joined, got {other:?}"),
        }
    }

    /// Completes the viewer join flow, consuming both replies. Returns the
    /// assigned identifier and the reported broadcaster status.
    pub async fn join_as_viewer(&mut self, service: &RelayService, room: &str) -> (ViewerId, bool) {
        self.join(service, room, "viewer");

        let viewer_id = match self.recv_envelope().await {
            ServerEnvelope::Registered {
                client_id,
                room: joined_room,
            } => {
                assert_eq!(joined_room, room);
                client_id
            }
            other => panic!("expected registered, got {other:?}"),
        };

        let online = match self.recv_envelope().await {
            ServerEnvelope::BroadcasterStatus { online } => online,
            other => panic!("expected broadcaster-status, got {other:?}"),
        };

        (viewer_id, online)
    }
}
