use crate::registry::{
    ConnectionHandle, ConnectionId, ConnectionRegistry, Outgoing, PeerSender,
};
use crate::room::RoomStore;
use crate::signaling::SessionState;
use beacon_core::{ClientEnvelope, Role, ServerEnvelope, ViewerId};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Routes envelopes between the broadcaster and viewers of a room.
///
/// Every send is a fire-and-forget push to a per-connection outbound queue; a
/// missing counterpart drops the envelope silently. Room mutations happen
/// under the store's entry guards; notification fan-out collects the senders
/// first and sends after the guard is released.
#[derive(Clone, Default)]
pub struct RelayService {
    rooms: RoomStore,
    registry: ConnectionRegistry,
}

impl RelayService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rooms(&self) -> &RoomStore {
        &self.rooms
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    pub fn handle_envelope(&self, conn_id: &ConnectionId, envelope: ClientEnvelope) {
        let Some(conn) = self.registry.get(conn_id) else {
            return;
        };

        match envelope {
            ClientEnvelope::Join { room, role } => self.handle_join(&conn, room, role),
            ClientEnvelope::Signal { payload, to, .. } => self.handle_signal(&conn, payload, to),
            ClientEnvelope::Pong => conn.mark_alive(),
        }
    }

    /// Join is a one-way transition; a second join on the same connection is
    /// ignored.
    fn handle_join(
        &self,
        conn: &Arc<ConnectionHandle>,
        room: Option<String>,
        role: Option<String>,
    ) {
        if conn.session().is_joined() {
            warn!("Ignoring join on an already joined connection");
            return;
        }

        let (room_id, role) = match (room, role) {
            (Some(room), Some(role)) if !room.is_empty() && !role.is_empty() => (room, role),
            _ => {
                conn.send(ServerEnvelope::Error {
                    message: "Room and role required".to_string(),
                });
                return;
            }
        };

        match Role::parse(&role) {
            Role::Broadcaster => self.join_broadcaster(conn, room_id),
            Role::Viewer => self.join_viewer(conn, room_id),
        }
    }

    /// A later broadcaster silently replaces the previous reference; the
    /// replaced connection gets no eviction notice.
    fn join_broadcaster(&self, conn: &Arc<ConnectionHandle>, room_id: String) {
        let viewers: Vec<PeerSender> = {
            let mut room = self.rooms.entry(&room_id);
            room.broadcaster = Some(conn.sender());
            room.viewers.values().cloned().collect()
        };

        conn.set_session(SessionState::Broadcaster {
            room: room_id.clone(),
        });
        info!("Broadcaster joined room {}", room_id);

        conn.send(ServerEnvelope::Joined {
            role: Role::Broadcaster,
            room: room_id,
        });
        for viewer in &viewers {
            send_to(viewer, ServerEnvelope::BroadcasterStatus { online: true });
        }
    }

    fn join_viewer(&self, conn: &Arc<ConnectionHandle>, room_id: String) {
        let viewer_id = ViewerId::new();
        let broadcaster = {
            let mut room = self.rooms.entry(&room_id);
            room.viewers.insert(viewer_id.clone(), conn.sender());
            room.broadcaster.clone()
        };

        conn.set_session(SessionState::Viewer {
            room: room_id.clone(),
            id: viewer_id.clone(),
        });
        info!("Viewer {} joined room {}", viewer_id, room_id);

        conn.send(ServerEnvelope::Registered {
            client_id: viewer_id.clone(),
            room: room_id,
        });
        match broadcaster {
            Some(broadcaster) => {
                send_to(&broadcaster, ServerEnvelope::ViewerJoined { viewer_id });
                conn.send(ServerEnvelope::BroadcasterStatus { online: true });
            }
            None => conn.send(ServerEnvelope::BroadcasterStatus { online: false }),
        }
    }

    /// Relays the opaque payload to the counterpart. Requires a joined
    /// session; every miss (no join, no broadcaster, unknown target) drops
    /// the envelope without an error.
    fn handle_signal(&self, conn: &Arc<ConnectionHandle>, payload: Value, to: Option<ViewerId>) {
        match conn.session() {
            SessionState::Unjoined => {
                debug!("Dropping signal from a connection that never joined");
            }
            SessionState::Viewer { room, id } => {
                let Some(broadcaster) =
                    self.rooms.get(&room).and_then(|r| r.broadcaster.clone())
                else {
                    debug!("No broadcaster in room {}, dropping signal", room);
                    return;
                };
                send_to(
                    &broadcaster,
                    ServerEnvelope::Signal {
                        viewer_id: id,
                        payload,
                    },
                );
            }
            SessionState::Broadcaster { room } => {
                let Some(target_id) = to else {
                    debug!("Broadcaster signal without a target, dropping");
                    return;
                };
                let Some(target) = self
                    .rooms
                    .get(&room)
                    .and_then(|r| r.viewers.get(&target_id).cloned())
                else {
                    debug!("Viewer {} not in room {}, dropping signal", target_id, room);
                    return;
                };
                send_to(
                    &target,
                    ServerEnvelope::Signal {
                        viewer_id: target_id,
                        payload,
                    },
                );
            }
        }
    }

    /// Removes the connection and unwinds its room registration, notifying
    /// the counterpart. Runs at most once per connection: the first call
    /// takes the registry entry, later calls find nothing.
    pub fn disconnect(&self, conn_id: &ConnectionId) {
        let Some(conn) = self.registry.remove(conn_id) else {
            return;
        };

        match conn.session() {
            SessionState::Unjoined => {}
            SessionState::Broadcaster { room } => {
                let viewers: Vec<PeerSender> = {
                    let Some(mut entry) = self.rooms.get_mut(&room) else {
                        return;
                    };
                    entry.broadcaster = None;
                    entry.viewers.values().cloned().collect()
                };
                info!("Broadcaster left room {}", room);

                for viewer in &viewers {
                    send_to(viewer, ServerEnvelope::BroadcasterStatus { online: false });
                }
                self.rooms.remove_if_empty(&room);
            }
            SessionState::Viewer { room, id } => {
                let broadcaster = {
                    let Some(mut entry) = self.rooms.get_mut(&room) else {
                        return;
                    };
                    if entry.viewers.remove(&id).is_some() {
                        entry.broadcaster.clone()
                    } else {
                        None
                    }
                };
                info!("Viewer {} left room {}", id, room);

                if let Some(broadcaster) = broadcaster {
                    send_to(&broadcaster, ServerEnvelope::ViewerLeft { viewer_id: id });
                }
                self.rooms.remove_if_empty(&room);
            }
        }
    }
}

/// Fan-out delivery never awaits and never aborts on one failed peer.
fn send_to(peer: &PeerSender, envelope: ServerEnvelope) {
    if peer.send(Outgoing::Envelope(envelope)).is_err() {
        debug!("Peer queue closed, dropping envelope");
    }
}
