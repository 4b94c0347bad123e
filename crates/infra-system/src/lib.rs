// WiFi Surveyor Infrastructure - System Adapters
// Implements: ProcessLauncher, CommandRunner, ScanParser

pub mod command_runner;
pub mod process_launcher;
pub mod scanner;

pub use command_runner::ProcessCommandRunner;
pub use process_launcher::TokioProcessLauncher;
pub use scanner::Platform;
