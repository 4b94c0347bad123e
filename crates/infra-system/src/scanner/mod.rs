// Platform scanners
// Each platform pairs a scan command with the parser for its output

pub mod airport;
pub mod netsh;
pub mod nmcli;

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use surveyor_core::port::{CommandSpec, ParseError, ScanParser};

pub use airport::AirportParser;
pub use netsh::NetshParser;
pub use nmcli::NmcliParser;

/// Operating system whose scanner tool is used
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Linux,
    Macos,
    Windows,
}

impl Platform {
    /// Platform this binary was built for, if it has a known scanner
    pub fn current() -> Option<Self> {
        std::env::consts::OS.parse().ok()
    }

    /// Default scan command
    pub fn scan_command(self) -> CommandSpec {
        match self {
            Platform::Linux => nmcli::scan_command(),
            Platform::Macos => airport::scan_command(),
            Platform::Windows => netsh::scan_command(),
        }
    }

    /// Parser for the default scan command's output
    pub fn parser(self) -> Arc<dyn ScanParser> {
        match self {
            Platform::Linux => Arc::new(NmcliParser),
            Platform::Macos => Arc::new(AirportParser),
            Platform::Windows => Arc::new(NetshParser),
        }
    }
}

/// Reject output whose last record has no line terminator
///
/// Every supported scanner ends each record with a newline, so a missing one
/// means the process was killed mid-write and the record may be cut short.
pub(crate) fn ensure_terminated(output: &str) -> Result<(), ParseError> {
    if output.ends_with('\n') {
        return Ok(());
    }

    match output.lines().enumerate().last() {
        Some((index, line)) if !line.trim().is_empty() => Err(ParseError::MalformedLine {
            line: index + 1,
            reason: "truncated record (no trailing newline)".to_string(),
        }),
        _ => Ok(()),
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Platform::Linux => write!(f, "linux"),
            Platform::Macos => write!(f, "macos"),
            Platform::Windows => write!(f, "windows"),
        }
    }
}

impl std::str::FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "linux" => Ok(Platform::Linux),
            "macos" | "mac" | "darwin" => Ok(Platform::Macos),
            "windows" => Ok(Platform::Windows),
            other => Err(format!("unsupported platform '{}'", other)),
        }
    }
}
