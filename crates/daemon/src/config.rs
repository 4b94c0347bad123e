//! Daemon configuration
//!
//! Layered with the `config` crate: built-in defaults, then an optional
//! `surveyor.toml`, then `SURVEYOR_*` environment variables.

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;
use std::time::Duration;
use surveyor_core::port::CommandSpec;
use surveyor_core::AppError;
use surveyor_infra_system::Platform;

const DEFAULT_CONFIG_FILE: &str = "surveyor.toml";
const ENV_PREFIX: &str = "SURVEYOR";

#[derive(Debug, Clone, Deserialize)]
pub struct SurveyorConfig {
    pub poll_interval_ms: u64,
    pub command_timeout_ms: u64,
    /// Scanner platform; detected from the build target when unset
    #[serde(default)]
    pub platform: Option<String>,
    /// Replaces the platform scan executable (output must keep its format)
    #[serde(default)]
    pub scan_program: Option<String>,
    #[serde(default)]
    pub scan_args: Vec<String>,
    pub rpc_host: String,
    pub rpc_port: u16,
}

impl SurveyorConfig {
    /// Load from `SURVEYOR_CONFIG` (or `surveyor.toml`) and the environment
    pub fn load() -> Result<Self, AppError> {
        let path =
            std::env::var("SURVEYOR_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());

        let config = defaults()
            .and_then(|builder| {
                builder
                    .add_source(File::with_name(&path).required(false))
                    .add_source(environment())
                    .build()
            })
            .map_err(|e| AppError::Config(e.to_string()))?;

        Self::from_config(config)
    }

    /// Deserialize and validate an assembled configuration
    pub fn from_config(config: Config) -> Result<Self, AppError> {
        let loaded: Self = config
            .try_deserialize()
            .map_err(|e| AppError::Config(e.to_string()))?;
        loaded.validate()?;
        Ok(loaded)
    }

    fn validate(&self) -> Result<(), AppError> {
        if self.poll_interval_ms == 0 {
            return Err(AppError::Config(
                "poll_interval_ms must be greater than zero".to_string(),
            ));
        }
        if self.scan_program.as_deref().is_some_and(|p| p.trim().is_empty()) {
            return Err(AppError::Config("scan_program must not be empty".to_string()));
        }
        self.platform()?;
        Ok(())
    }

    pub fn platform(&self) -> Result<Platform, AppError> {
        match self.platform.as_deref() {
            Some(name) => name.parse().map_err(AppError::Config),
            None => Platform::current().ok_or_else(|| {
                AppError::Config(format!(
                    "no scanner for '{}', set platform explicitly",
                    std::env::consts::OS
                ))
            }),
        }
    }

    /// Scan command: the override when configured, otherwise the platform's
    pub fn scan_command(&self, platform: Platform) -> CommandSpec {
        match &self.scan_program {
            Some(program) => CommandSpec::new(program.clone(), self.scan_args.iter().cloned()),
            None => platform.scan_command(),
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_millis(self.command_timeout_ms)
    }
}

fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("poll_interval_ms", 1000)?
        .set_default("command_timeout_ms", 10_000)?
        .set_default("rpc_host", "127.0.0.1")?
        .set_default("rpc_port", 9528)
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .try_parsing(true)
        .list_separator(" ")
        .with_list_parse_key("scan_args")
}
