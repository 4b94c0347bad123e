// Port Layer - Interfaces for external dependencies

pub mod command_runner;
pub mod process_launcher;
pub mod scan_parser;
pub mod time_provider;

// Re-exports
pub use command_runner::CommandRunner;
pub use process_launcher::{CommandSpec, FnLauncher, ProcessLauncher, ProcessStdout, RunningProcess};
pub use scan_parser::{ParseError, ScanParser};
pub use time_provider::TimeProvider;
