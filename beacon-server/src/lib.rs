mod app;
mod config;
mod heartbeat;
mod registry;
mod room;
mod signaling;

pub use app::*;
pub use config::*;
pub use heartbeat::*;
pub use registry::*;
pub use room::*;
pub use signaling::*;
