pub mod model;

pub use model::{ClientEnvelope, Role, ServerEnvelope, ViewerId};
