//! JSON-RPC API Layer
//!
//! Read-only view of the live signal state for survey front ends, plus
//! capturing the current signals as a Reading.

pub mod error;
pub mod handler;
pub mod server;
pub mod types;

pub use server::{RpcServer, RpcServerConfig};
