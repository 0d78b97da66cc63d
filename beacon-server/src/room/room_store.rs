use crate::room::Room;
use dashmap::DashMap;
use dashmap::mapref::one::{Ref, RefMut};
use std::sync::Arc;
use tracing::info;

/// Shared room table. A room exists here if and only if it has a broadcaster
/// or at least one viewer; callers run `remove_if_empty` after every mutation
/// that could vacate a room.
///
/// Mutations to one room go through the entry guards and are serialized
/// relative to each other; routing reads take read guards and must tolerate
/// concurrent removal (a miss is a normal outcome).
#[derive(Clone, Default)]
pub struct RoomStore {
    rooms: Arc<DashMap<String, Room>>,
}

impl RoomStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The existing room, or a freshly created empty one.
    pub fn entry(&self, room_id: &str) -> RefMut<'_, String, Room> {
        self.rooms
            .entry(room_id.to_string())
            .or_insert_with(|| {
                info!("Creating new room: {}", room_id);
                Room::default()
            })
    }

    /// Lookup without creation.
    pub fn get(&self, room_id: &str) -> Option<Ref<'_, String, Room>> {
        self.rooms.get(room_id)
    }

    pub fn get_mut(&self, room_id: &str) -> Option<RefMut<'_, String, Room>> {
        self.rooms.get_mut(room_id)
    }

    /// Drops the room once it has neither broadcaster nor viewers. Idempotent.
    pub fn remove_if_empty(&self, room_id: &str) {
        if self
            .rooms
            .remove_if(room_id, |_, room| room.is_empty())
            .is_some()
        {
            info!("Room {} is empty, removing", room_id);
        }
    }

    pub fn contains(&self, room_id: &str) -> bool {
        self.rooms.contains_key(room_id)
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}
