use crate::registry::PeerSender;
use beacon_core::ViewerId;
use std::collections::HashMap;

/// Peers currently present in one room: at most one broadcaster and any
/// number of viewers keyed by their server-generated identifier.
#[derive(Default)]
pub struct Room {
    pub(crate) broadcaster: Option<PeerSender>,
    pub(crate) viewers: HashMap<ViewerId, PeerSender>,
}

impl Room {
    pub fn has_broadcaster(&self) -> bool {
        self.broadcaster.is_some()
    }

    pub fn viewer_count(&self) -> usize {
        self.viewers.len()
    }

    pub fn has_viewer(&self, viewer_id: &ViewerId) -> bool {
        self.viewers.contains_key(viewer_id)
    }

    pub fn is_empty(&self) -> bool {
        self.broadcaster.is_none() && self.viewers.is_empty()
    }
}
