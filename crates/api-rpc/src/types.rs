//! RPC Request/Response Types
//!
//! Defines the JSON-RPC method parameters and results.

use serde::{Deserialize, Serialize};
use surveyor_core::domain::{Band, ReadingId, Signal, Strength};

/// signals.list.v1 - Latest signal set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListSignalsResponse {
    pub signals: Vec<Signal>,
    pub status: String,
    pub scanned_at: Option<i64>,
}

/// signals.status.v1 - Service state without the signal payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
    pub signal_count: usize,
    pub ssids: Vec<String>,
    pub scanned_at: Option<i64>,
    pub polling: bool,
}

/// signals.strongest.v1 - Best strength for a network
#[derive(Debug, Deserialize)]
pub struct StrongestRequest {
    pub ssid: String,
    #[serde(default)]
    pub frequency: Option<Band>,
    #[serde(default)]
    pub mac: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrongestResponse {
    pub ssid: String,
    pub frequency: Option<Band>,
    pub mac: Option<String>,
    /// dBm, or null when nothing matched
    pub strength: Option<Strength>,
}

/// survey.capture.v1 - Record the current signals at a floor-plan point
#[derive(Debug, Deserialize)]
pub struct CaptureRequest {
    pub id: ReadingId,
    pub x: f64,
    pub y: f64,
}
