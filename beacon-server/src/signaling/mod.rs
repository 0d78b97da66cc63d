mod relay_service;
mod session;
mod ws_handler;

pub use relay_service::*;
pub use session::*;
pub use ws_handler::*;
