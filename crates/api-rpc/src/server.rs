//! JSON-RPC Server
//!
//! Serves the signal query surface over HTTP on localhost.

use crate::handler::RpcHandler;
use crate::types::{CaptureRequest, StrongestRequest};
use jsonrpsee::server::{Server, ServerHandle};
use jsonrpsee::RpcModule;
use std::net::SocketAddr;
use std::sync::Arc;
use surveyor_core::application::SignalService;
use tracing::info;

const DEFAULT_RPC_HOST: &str = "127.0.0.1";
const DEFAULT_RPC_PORT: u16 = 9528;

/// RPC Server Configuration
#[derive(Debug, Clone)]
pub struct RpcServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for RpcServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_RPC_HOST.to_string(),
            port: DEFAULT_RPC_PORT,
        }
    }
}

/// RPC Server
pub struct RpcServer {
    config: RpcServerConfig,
    handler: Arc<RpcHandler>,
}

impl RpcServer {
    pub fn new(config: RpcServerConfig, service: Arc<SignalService>) -> Self {
        Self {
            config,
            handler: Arc::new(RpcHandler::new(service)),
        }
    }

    /// Start the JSON-RPC server
    ///
    /// Returns the bound address (useful with port 0) and the handle used
    /// to stop the server.
    pub async fn start(self) -> Result<(SocketAddr, ServerHandle), String> {
        let addr = format!("{}:{}", self.config.host, self.config.port);

        let server = Server::builder()
            .build(&addr)
            .await
            .map_err(|e| format!("Failed to build server on {}: {}", addr, e))?;
        let local_addr = server
            .local_addr()
            .map_err(|e| format!("Failed to read bound address: {}", e))?;

        let mut module = RpcModule::new(());

        let handler = self.handler.clone();
        module
            .register_async_method("signals.list.v1", move |_, _, _| {
                let handler = handler.clone();
                async move { handler.list_signals().await }
            })
            .map_err(|e| e.to_string())?;

        let handler = self.handler.clone();
        module
            .register_async_method("signals.status.v1", move |_, _, _| {
                let handler = handler.clone();
                async move { handler.status().await }
            })
            .map_err(|e| e.to_string())?;

        let handler = self.handler.clone();
        module
            .register_async_method("signals.strongest.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: StrongestRequest = params.parse()?;
                    handler.strongest(req).await
                }
            })
            .map_err(|e| e.to_string())?;

        let handler = self.handler.clone();
        module
            .register_async_method("survey.capture.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: CaptureRequest = params.parse()?;
                    handler.capture(req).await
                }
            })
            .map_err(|e| e.to_string())?;

        info!(address = %local_addr, "JSON-RPC server started");

        let handle = server.start(module);
        Ok((local_addr, handle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonrpsee::core::client::ClientT;
    use jsonrpsee::core::params::ObjectParams;
    use jsonrpsee::http_client::HttpClientBuilder;
    use jsonrpsee::rpc_params;
    use surveyor_core::port::command_runner::mocks::MockCommandRunner;
    use surveyor_core::port::scan_parser::mocks::MockScanParser;
    use surveyor_core::port::time_provider::SystemTimeProvider;
    use surveyor_core::port::CommandSpec;

    async fn serve(output: &str) -> (String, ServerHandle, Arc<SignalService>) {
        let service = Arc::new(SignalService::new(
            Arc::new(MockCommandRunner::new([output])),
            Arc::new(MockScanParser),
            CommandSpec::new("scan", Vec::<String>::new()),
            Arc::new(SystemTimeProvider),
        ));
        let config = RpcServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        };
        let (addr, handle) = RpcServer::new(config, service.clone())
            .start()
            .await
            .unwrap();
        (format!("http://{}", addr), handle, service)
    }

    #[tokio::test]
    async fn test_status_and_strongest_over_http() {
        let (url, handle, service) = serve("mac5,ssid2,2,-55\nmac6,ssid2,2,-50\nmac7,ssid2,5,-65\n").await;
        let client = HttpClientBuilder::default().build(&url).unwrap();

        let status: serde_json::Value = client
            .request("signals.status.v1", rpc_params![])
            .await
            .unwrap();
        assert_eq!(status["status"], "loading");

        service.poll_once().await;

        let mut params = ObjectParams::new();
        params.insert("ssid", "ssid2").unwrap();
        let best: serde_json::Value = client
            .request("signals.strongest.v1", params)
            .await
            .unwrap();
        assert_eq!(best["strength"], -50);

        let mut params = ObjectParams::new();
        params.insert("ssid", "ssid2").unwrap();
        params.insert("frequency", 5).unwrap();
        let best: serde_json::Value = client
            .request("signals.strongest.v1", params)
            .await
            .unwrap();
        assert_eq!(best["strength"], -65);

        handle.stop().unwrap();
    }

    #[tokio::test]
    async fn test_capture_over_http() {
        let (url, handle, service) = serve("mac1,ssid1,5,-45\n").await;
        let client = HttpClientBuilder::default().build(&url).unwrap();
        service.poll_once().await;

        let mut params = ObjectParams::new();
        params.insert("id", 7).unwrap();
        params.insert("x", 12.5).unwrap();
        params.insert("y", 4.0).unwrap();
        let reading: serde_json::Value = client
            .request("survey.capture.v1", params)
            .await
            .unwrap();

        assert_eq!(reading["id"], 7);
        assert_eq!(reading["point"]["x"], 12.5);
        assert_eq!(reading["signals"][0]["mac"], "mac1");

        let list: serde_json::Value = client
            .request("signals.list.v1", rpc_params![])
            .await
            .unwrap();
        assert_eq!(list["signals"].as_array().unwrap().len(), 1);

        handle.stop().unwrap();
    }
}
