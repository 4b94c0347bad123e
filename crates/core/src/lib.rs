// WiFi Surveyor Core - Survey model, ports and signal polling
// NO process spawning or RPC here; adapters live in the infra crates

pub mod application;
pub mod domain;
pub mod error;
pub mod port;

pub use error::{AppError, Result};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
