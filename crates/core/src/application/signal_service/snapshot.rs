// Published signal state

use serde::Serialize;

use super::constants::STATUS_LOADING;
use crate::domain::reading::distinct_ssids;
use crate::domain::{strongest, Band, Point, Reading, ReadingId, Signal, Strength};
use crate::error::{AppError, Result};

/// Latest scan result as seen by consumers
///
/// Always replaced as a whole, so `signals` and `status` are consistent
/// with each other.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalSnapshot {
    pub signals: Vec<Signal>,
    pub status: String,
    /// Epoch ms of the scan that produced `signals` (None until the first one)
    pub scanned_at: Option<i64>,
}

impl SignalSnapshot {
    /// State before any scan has completed
    pub fn loading() -> Self {
        Self {
            signals: Vec::new(),
            status: STATUS_LOADING.to_string(),
            scanned_at: None,
        }
    }

    /// True until a scan has been parsed successfully
    pub fn is_loading(&self) -> bool {
        self.scanned_at.is_none()
    }

    /// Strongest matching signal in this snapshot
    pub fn strongest(
        &self,
        ssid: &str,
        frequency: Option<Band>,
        mac: Option<&str>,
    ) -> Option<Strength> {
        strongest(&self.signals, ssid, frequency, mac)
    }

    /// Network names in this snapshot, first-seen order
    pub fn ssids(&self) -> Vec<&str> {
        distinct_ssids(&self.signals)
    }

    /// Record the current signals as a survey reading at `point`
    ///
    /// # Errors
    /// - AppError::NotReady while no scan has completed yet
    pub fn capture(&self, id: ReadingId, point: Point) -> Result<Reading> {
        if self.is_loading() {
            return Err(AppError::NotReady(
                "no scan has completed yet".to_string(),
            ));
        }
        Ok(Reading::new(id, point, self.signals.clone()))
    }
}

impl Default for SignalSnapshot {
    fn default() -> Self {
        Self::loading()
    }
}
