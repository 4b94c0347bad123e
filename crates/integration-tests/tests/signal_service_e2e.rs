//! Signal Service End-to-End Tests
//!
//! Real scan commands (canned scanner output served by `cat`) through the
//! full poll → parse → publish path.

#![cfg(unix)]

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use surveyor_core::application::SignalService;
use surveyor_core::domain::{Band, Point};
use surveyor_core::port::process_launcher::mocks::MockProcessLauncher;
use surveyor_core::port::time_provider::SystemTimeProvider;
use surveyor_core::port::{CommandSpec, FnLauncher, ProcessLauncher};
use surveyor_infra_system::scanner::NmcliParser;
use surveyor_infra_system::{Platform, ProcessCommandRunner, TokioProcessLauncher};

const NMCLI_OUTPUT: &str = "\
AA\\:BB\\:CC\\:DD\\:EE\\:01:HomeNet:2437 MHz:70
AA\\:BB\\:CC\\:DD\\:EE\\:02:HomeNet:5180 MHz:80
AA\\:BB\\:CC\\:DD\\:EE\\:03:HomeNet:5200 MHz:90
AA\\:BB\\:CC\\:DD\\:EE\\:04:Office:2412 MHz:40
";

/// Scanner output file, removed on drop
struct CannedScan(PathBuf);

impl CannedScan {
    fn new(name: &str, contents: &str) -> Self {
        let path = std::env::temp_dir().join(format!(
            "surveyor-{}-{}.txt",
            name,
            std::process::id()
        ));
        std::fs::write(&path, contents).unwrap();
        Self(path)
    }

    fn command(&self) -> CommandSpec {
        CommandSpec::new("cat", [self.0.to_string_lossy().into_owned()])
    }
}

impl Drop for CannedScan {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.0);
    }
}

fn service(command: CommandSpec, timeout: Duration) -> SignalService {
    let runner = ProcessCommandRunner::new(Arc::new(TokioProcessLauncher::new()))
        .with_timeout(timeout);
    SignalService::new(
        Arc::new(runner),
        Arc::new(NmcliParser),
        command,
        Arc::new(SystemTimeProvider),
    )
}

#[tokio::test]
async fn test_poll_publishes_parsed_signals() {
    let scan = CannedScan::new("poll", NMCLI_OUTPUT);
    let service = service(scan.command(), Duration::from_secs(5));

    assert_eq!(service.status(), "loading");
    assert!(service.signals().is_empty());

    service.poll_once().await;

    assert_eq!(service.status(), "ok");
    let signals = service.signals();
    assert_eq!(signals.len(), 4);
    assert_eq!(signals[0].mac, "AA:BB:CC:DD:EE:01");
    assert_eq!(signals[0].frequency, Band::Ghz2_4);
    assert_eq!(signals[0].strength, -65);
    assert!(service.snapshot().scanned_at.is_some());
}

#[tokio::test]
async fn test_capture_and_query_reading() {
    let scan = CannedScan::new("capture", NMCLI_OUTPUT);
    let service = service(scan.command(), Duration::from_secs(5));
    service.poll_once().await;

    let reading = service
        .snapshot()
        .capture(1, Point::new(3.0, 4.5))
        .unwrap();

    assert_eq!(reading.signal_for("HomeNet", None, None), Some(-55));
    assert_eq!(reading.signal_for("HomeNet", Some(Band::Ghz5), None), Some(-55));
    assert_eq!(
        reading.signal_for("HomeNet", Some(Band::Ghz5), Some("AA:BB:CC:DD:EE:02")),
        Some(-60)
    );
    assert_eq!(reading.signal_for("Office", Some(Band::Ghz5), None), None);
    assert_eq!(reading.ssids(), vec!["HomeNet", "Office"]);
}

#[tokio::test]
async fn test_garbage_output_keeps_previous_signals() {
    let scan = CannedScan::new("garbage", NMCLI_OUTPUT);
    let service = service(scan.command(), Duration::from_secs(5));
    service.poll_once().await;
    assert_eq!(service.signals().len(), 4);

    std::fs::write(&scan.0, "this is not nmcli output\n").unwrap();
    service.poll_once().await;

    assert!(service.status().starts_with("error: "));
    assert_eq!(service.signals().len(), 4);
}

#[tokio::test]
async fn test_missing_scanner_reports_no_output() {
    let service = service(
        CommandSpec::new("surveyor-no-such-scanner", Vec::<String>::new()),
        Duration::from_secs(5),
    );

    service.poll_once().await;

    assert_eq!(service.status(), "error: scanner produced no output");
    assert!(service.signals().is_empty());
    assert!(service.snapshot().is_loading());
}

#[tokio::test]
async fn test_hung_scanner_times_out() {
    let service = service(
        CommandSpec::new("sleep", ["5"]),
        Duration::from_millis(100),
    );

    let result = tokio::time::timeout(Duration::from_secs(3), service.poll_once()).await;

    assert!(result.is_ok());
    assert_eq!(service.status(), "error: scanner produced no output");
}

/// A scanner killed mid-record must not publish the cut-off value
#[tokio::test]
async fn test_scanner_killed_mid_record_keeps_previous_signals() {
    let complete = MockProcessLauncher::exiting(NMCLI_OUTPUT);
    // Was writing "70" (-65 dBm) when the deadline hit
    let cut_off = MockProcessLauncher::hanging("AA\\:BB\\:CC\\:DD\\:EE\\:01:HomeNet:2437 MHz:7");
    let launches = AtomicUsize::new(0);
    let launcher = FnLauncher::new(move |command: &CommandSpec| {
        if launches.fetch_add(1, Ordering::SeqCst) == 0 {
            complete.launch(command)
        } else {
            cut_off.launch(command)
        }
    });
    let runner =
        ProcessCommandRunner::new(Arc::new(launcher)).with_timeout(Duration::from_millis(20));
    let service = SignalService::new(
        Arc::new(runner),
        Arc::new(NmcliParser),
        Platform::Linux.scan_command(),
        Arc::new(SystemTimeProvider),
    );

    service.poll_once().await;
    let before = service.signals();
    assert_eq!(service.status(), "ok");
    assert_eq!(before[0].strength, -65);

    service.poll_once().await;

    assert!(service.status().starts_with("error: "));
    assert!(service.status().contains("truncated"));
    assert_eq!(service.signals(), before);
}

#[tokio::test]
async fn test_first_scan_killed_mid_record_stays_loading() {
    let launcher = MockProcessLauncher::hanging("AA\\:BB\\:CC\\:DD\\:EE\\:01:HomeNet:2437 MHz:7");
    let runner =
        ProcessCommandRunner::new(Arc::new(launcher)).with_timeout(Duration::from_millis(20));
    let service = SignalService::new(
        Arc::new(runner),
        Arc::new(NmcliParser),
        Platform::Linux.scan_command(),
        Arc::new(SystemTimeProvider),
    );

    service.poll_once().await;

    assert!(service.status().contains("truncated"));
    assert!(service.signals().is_empty());
    assert!(service.snapshot().is_loading());
}

#[tokio::test]
async fn test_background_loop_publishes_and_stops() {
    let scan = CannedScan::new("loop", NMCLI_OUTPUT);
    let service = service(scan.command(), Duration::from_secs(5))
        .with_poll_interval(Duration::from_millis(50));
    let mut updates = service.subscribe();

    assert!(service.start());
    tokio::time::timeout(Duration::from_secs(3), updates.changed())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updates.borrow().signals.len(), 4);
    assert!(service.stop().await);
    assert!(!service.is_running());
}

#[cfg(target_os = "linux")]
#[test]
fn test_linux_platform_uses_nmcli() {
    let command = Platform::Linux.scan_command();
    assert_eq!(command.program, "nmcli");
    assert_eq!(
        command.args,
        vec!["-t", "-f", "BSSID,SSID,FREQ,SIGNAL", "device", "wifi", "list"]
    );
}
