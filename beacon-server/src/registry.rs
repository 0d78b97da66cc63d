use crate::signaling::SessionState;
use beacon_core::ServerEnvelope;
use dashmap::DashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::mpsc;
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Debug, Clone, Hash, Eq, PartialEq)]
pub struct ConnectionId(pub Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Frames queued for a connection's send task.
#[derive(Debug)]
pub enum Outgoing {
    Envelope(ServerEnvelope),
    /// Protocol-level liveness probe (ping frame).
    Probe,
    /// Close the transport; the send task stops after flushing this.
    Terminate,
}

/// How a connection's transport can be probed for liveness.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ProbeKind {
    /// The transport has ping frames the peer answers automatically.
    Native,
    /// No ping frames; probe with a `ping` envelope the peer must echo
    /// back as a `pong` envelope.
    Envelope,
}

pub type PeerSender = mpsc::UnboundedSender<Outgoing>;

/// One live transport connection: its outbound queue, liveness flag, probe
/// capability, and role session.
pub struct ConnectionHandle {
    sender: PeerSender,
    alive: AtomicBool,
    probe: ProbeKind,
    session: Mutex<SessionState>,
}

impl ConnectionHandle {
    fn new(sender: PeerSender, probe: ProbeKind) -> Self {
        Self {
            sender,
            alive: AtomicBool::new(true),
            probe,
            session: Mutex::new(SessionState::Unjoined),
        }
    }

    pub fn sender(&self) -> PeerSender {
        self.sender.clone()
    }

    pub fn send(&self, envelope: ServerEnvelope) {
        if self.sender.send(Outgoing::Envelope(envelope)).is_err() {
            debug!("Connection queue closed, dropping envelope");
        }
    }

    pub fn session(&self) -> SessionState {
        self.session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set_session(&self, next: SessionState) {
        *self.session.lock().unwrap_or_else(PoisonError::into_inner) = next;
    }

    pub fn mark_alive(&self) {
        self.alive.store(true, Ordering::Release);
    }

    fn probe(&self) {
        let frame = match self.probe {
            ProbeKind::Native => Outgoing::Probe,
            ProbeKind::Envelope => Outgoing::Envelope(ServerEnvelope::Ping {
                timestamp: unix_millis(),
            }),
        };
        let _ = self.sender.send(frame);
    }

    fn terminate(&self) {
        let _ = self.sender.send(Outgoing::Terminate);
    }

    fn is_closing(&self) -> bool {
        self.sender.is_closed()
    }
}

/// Tracks every live connection and owns the liveness sweep.
#[derive(Clone, Default)]
pub struct ConnectionRegistry {
    connections: Arc<DashMap<ConnectionId, Arc<ConnectionHandle>>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &self,
        conn_id: ConnectionId,
        sender: PeerSender,
        probe: ProbeKind,
    ) -> Arc<ConnectionHandle> {
        let handle = Arc::new(ConnectionHandle::new(sender, probe));
        self.connections.insert(conn_id, handle.clone());
        handle
    }

    pub fn get(&self, conn_id: &ConnectionId) -> Option<Arc<ConnectionHandle>> {
        self.connections.get(conn_id).map(|entry| Arc::clone(entry.value()))
    }

    pub fn remove(&self, conn_id: &ConnectionId) -> Option<Arc<ConnectionHandle>> {
        self.connections.remove(conn_id).map(|(_, handle)| handle)
    }

    pub fn mark_alive(&self, conn_id: &ConnectionId) {
        if let Some(conn) = self.connections.get(conn_id) {
            conn.mark_alive();
        }
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// One liveness pass: a connection that never acknowledged the previous
    /// probe is terminated; every other connection has its flag cleared and
    /// gets a fresh probe. A dead peer is gone within two sweep periods.
    pub fn sweep(&self) {
        for entry in self.connections.iter() {
            let conn = entry.value();
            if conn.is_closing() {
                continue;
            }
            if !conn.alive.swap(false, Ordering::AcqRel) {
                info!("Terminating unresponsive connection {}", entry.key());
                conn.terminate();
                continue;
            }
            conn.probe();
        }
    }
}

fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or_default()
}
