// Domain Layer - Survey model and signal selection

pub mod error;
pub mod reading;
pub mod signal;

// Re-exports
pub use error::DomainError;
pub use reading::{strongest, Point, Reading, ReadingId};
pub use signal::{Band, Signal, Strength};
