use beacon_core::ViewerId;

/// Per-connection role state: `Unjoined` until a valid `join`, then fixed for
/// the life of the connection. The broadcaster needs no generated identifier;
/// the variant itself is the identity cleanup branches on.
#[derive(Debug, Clone, Default)]
pub enum SessionState {
    #[default]
    Unjoined,
    Broadcaster {
        room: String,
    },
    Viewer {
        room: String,
        id: ViewerId,
    },
}

impl SessionState {
    pub fn is_joined(&self) -> bool {
        !matches!(self, SessionState::Unjoined)
    }
}
