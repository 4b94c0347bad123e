//! WiFi Surveyor CLI - Command-line interface for the surveyor daemon

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use serde_json::json;
use surveyor_core::domain::{Band, Reading, Signal};
use tabled::{Table, Tabled};

const DEFAULT_RPC_URL: &str = "http://127.0.0.1:9528";

#[derive(Parser)]
#[command(name = "surveyor")]
#[command(about = "WiFi Surveyor CLI", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// RPC server URL
    #[arg(long, env = "SURVEYOR_RPC_URL", default_value = DEFAULT_RPC_URL)]
    rpc_url: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Show scanner status
    Status,

    /// List the latest scanned signals
    Signals {
        /// Only show this network
        #[arg(short, long)]
        ssid: Option<String>,
    },

    /// Strongest signal for a network
    Best {
        /// Network name
        ssid: String,

        /// Band filter (2.4, 5 or 6)
        #[arg(short, long)]
        frequency: Option<Band>,

        /// Radio MAC filter
        #[arg(short, long)]
        mac: Option<String>,
    },

    /// Record the current signals at a floor-plan point
    Capture {
        /// Reading ID
        id: u64,
        x: f64,
        y: f64,
    },
}

#[derive(Serialize)]
struct JsonRpcRequest {
    jsonrpc: String,
    method: String,
    params: serde_json::Value,
    id: u64,
}

#[derive(Deserialize)]
struct JsonRpcResponse {
    #[allow(dead_code)]
    jsonrpc: String,
    #[allow(dead_code)]
    id: u64,
    result: Option<serde_json::Value>,
    error: Option<JsonRpcError>,
}

#[derive(Deserialize)]
struct JsonRpcError {
    code: i32,
    message: String,
}

#[derive(Deserialize)]
struct SignalList {
    signals: Vec<Signal>,
    status: String,
}

#[derive(Tabled)]
struct SignalRow {
    ssid: String,
    mac: String,
    band: String,
    #[tabled(rename = "dBm")]
    strength: i32,
}

/// Rows for the signal table, strongest first
fn signal_rows(signals: Vec<Signal>, ssid: Option<&str>) -> Vec<SignalRow> {
    let mut rows: Vec<SignalRow> = signals
        .into_iter()
        .filter(|signal| ssid.map_or(true, |ssid| signal.ssid == ssid))
        .map(|signal| SignalRow {
            ssid: signal.ssid,
            mac: signal.mac,
            band: signal.frequency.to_string(),
            strength: signal.strength,
        })
        .collect();
    rows.sort_by(|a, b| b.strength.cmp(&a.strength));
    rows
}

async fn call_rpc(url: &str, method: &str, params: serde_json::Value) -> Result<serde_json::Value> {
    let request = JsonRpcRequest {
        jsonrpc: "2.0".to_string(),
        method: method.to_string(),
        params,
        id: 1,
    };

    let client = reqwest::Client::new();
    let response: JsonRpcResponse = client
        .post(url)
        .json(&request)
        .send()
        .await
        .context("Failed to connect to daemon")?
        .json()
        .await
        .context("Failed to parse response")?;

    if let Some(error) = response.error {
        anyhow::bail!("RPC error ({}): {}", error.code, error.message);
    }

    response
        .result
        .ok_or_else(|| anyhow::anyhow!("No result in response"))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Status => {
            println!("{}", "Scanner Status".cyan().bold());
            println!();

            match call_rpc(&cli.rpc_url, "signals.status.v1", json!([])).await {
                Ok(status) => {
                    let state = status["status"].as_str().unwrap_or_default();
                    let state = match state {
                        "ok" => state.green(),
                        "loading" | "no networks found" => state.yellow(),
                        _ => state.red(),
                    };
                    println!("  {} {}", "RPC URL:".bold(), cli.rpc_url);
                    println!("  {} {}", "Scanner:".bold(), state);
                    println!("  {} {}", "Polling:".bold(), status["polling"]);
                    println!("  {} {}", "Signals:".bold(), status["signal_count"]);
                    println!("  {} {}", "Networks:".bold(), status["ssids"]);
                    println!("  {} {}", "Scanned at:".bold(), status["scanned_at"]);
                }
                Err(e) => {
                    println!("  {} {}", "Status:".bold(), "ERROR".red());
                    println!("  {} {}", "Error:".bold(), e);
                }
            }
        }

        Commands::Signals { ssid } => {
            let result = call_rpc(&cli.rpc_url, "signals.list.v1", json!([])).await?;
            let list: SignalList = serde_json::from_value(result)?;

            let rows = signal_rows(list.signals, ssid.as_deref());
            if rows.is_empty() {
                println!("{} ({})", "No signals".yellow(), list.status);
            } else {
                println!("{}", Table::new(rows));
            }
        }

        Commands::Best {
            ssid,
            frequency,
            mac,
        } => {
            let params = json!({
                "ssid": ssid,
                "frequency": frequency,
                "mac": mac,
            });

            let result = call_rpc(&cli.rpc_url, "signals.strongest.v1", params).await?;

            match result["strength"].as_i64() {
                Some(strength) => {
                    println!("{} {} dBm", format!("{}:", ssid).bold(), strength.to_string().green());
                }
                None => println!("{}", format!("No signal for {}", ssid).yellow()),
            }
        }

        Commands::Capture { id, x, y } => {
            let params = json!({ "id": id, "x": x, "y": y });

            let result = call_rpc(&cli.rpc_url, "survey.capture.v1", params).await?;
            let reading: Reading = serde_json::from_value(result)?;

            println!(
                "{}",
                format!("✓ Reading {} captured at ({}, {})", reading.id, x, y)
                    .green()
                    .bold()
            );
            println!();
            println!("{}", Table::new(signal_rows(reading.signals, None)));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_rows_filter_and_sort() {
        let signals = vec![
            Signal::new("mac1", "ssid1", Band::Ghz2_4, -60),
            Signal::new("mac2", "ssid2", Band::Ghz5, -40),
            Signal::new("mac3", "ssid1", Band::Ghz5, -45),
        ];

        let rows = signal_rows(signals, Some("ssid1"));

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].mac, "mac3");
        assert_eq!(rows[1].mac, "mac1");
    }

    #[test]
    fn test_cli_parses_band() {
        let cli = Cli::try_parse_from(["surveyor", "best", "HomeNet", "--frequency", "5"]).unwrap();
        match cli.command {
            Commands::Best { frequency, .. } => assert_eq!(frequency, Some(Band::Ghz5)),
            _ => panic!("expected best"),
        }
    }
}
