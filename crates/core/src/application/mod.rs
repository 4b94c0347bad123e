// Application Layer - Use cases

pub mod signal_service;

// Re-exports
pub use signal_service::{SignalService, SignalSnapshot};
