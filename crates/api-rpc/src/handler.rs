//! RPC Method Handlers
//!
//! Read the published snapshot once per call so every response is
//! consistent with a single scan.

use crate::error::to_rpc_error;
use crate::types::{
    CaptureRequest, ListSignalsResponse, StatusResponse, StrongestRequest, StrongestResponse,
};
use jsonrpsee::types::ErrorObjectOwned;
use surveyor_core::application::SignalService;
use surveyor_core::domain::{Point, Reading};
use surveyor_core::error::AppError;
use std::sync::Arc;
use tracing::info;

/// RPC Handler with injected dependencies
pub struct RpcHandler {
    service: Arc<SignalService>,
}

impl RpcHandler {
    pub fn new(service: Arc<SignalService>) -> Self {
        Self { service }
    }

    /// signals.list.v1
    pub async fn list_signals(&self) -> Result<ListSignalsResponse, ErrorObjectOwned> {
        let snapshot = self.service.snapshot();

        Ok(ListSignalsResponse {
            signals: snapshot.signals.clone(),
            status: snapshot.status.clone(),
            scanned_at: snapshot.scanned_at,
        })
    }

    /// signals.status.v1
    pub async fn status(&self) -> Result<StatusResponse, ErrorObjectOwned> {
        let snapshot = self.service.snapshot();

        Ok(StatusResponse {
            status: snapshot.status.clone(),
            signal_count: snapshot.signals.len(),
            ssids: snapshot.ssids().into_iter().map(str::to_string).collect(),
            scanned_at: snapshot.scanned_at,
            polling: self.service.is_running(),
        })
    }

    /// signals.strongest.v1
    pub async fn strongest(
        &self,
        params: StrongestRequest,
    ) -> Result<StrongestResponse, ErrorObjectOwned> {
        let snapshot = self.service.snapshot();
        let strength = snapshot.strongest(&params.ssid, params.frequency, params.mac.as_deref());

        Ok(StrongestResponse {
            ssid: params.ssid,
            frequency: params.frequency,
            mac: params.mac,
            strength,
        })
    }

    /// survey.capture.v1
    pub async fn capture(&self, params: CaptureRequest) -> Result<Reading, ErrorObjectOwned> {
        if !params.x.is_finite() || !params.y.is_finite() {
            return Err(to_rpc_error(AppError::Validation(format!(
                "point ({}, {}) is not on the floor plan",
                params.x, params.y
            ))));
        }

        let reading = self
            .service
            .snapshot()
            .capture(params.id, Point::new(params.x, params.y))
            .map_err(to_rpc_error)?;

        info!(
            reading_id = reading.id,
            x = params.x,
            y = params.y,
            signal_count = reading.signals.len(),
            "Reading captured"
        );

        Ok(reading)
    }
}
