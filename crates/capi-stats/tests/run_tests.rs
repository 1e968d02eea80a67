//! End-to-end tests running the capi-stats binary against a state file

use std::io::Read;
use std::net::TcpListener;
use std::path::Path;
use std::process::{Command, Output};
use std::thread;
use tempfile::TempDir;

const STATE: &str = r#"{
    "hosts": {
        "foo.vm.search.yandex.net": {
            "hostHealth": { "state": "READY" },
            "entities": [{
                "schedulerId": { "name": "sched1" },
                "computingRequirements": { "resources": {
                    "ru.yandex.schedulers.cluster.api.computing.CPUPower": { "powerPercents": 50.0 },
                    "ru.yandex.schedulers.cluster.api.computing.RAM": { "capacity": 1073741824 },
                    "ru.yandex.schedulers.cluster.api.computing.HDDSpace": { "capacity": 100 }
                } }
            }]
        },
        "unknownhost": {}
    }
}"#;

fn free_port() -> u16 {
    TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

fn run_stats(state_file: &Path, sink_port: u16, snapshot_dir: Option<&Path>) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_capi-stats"));
    cmd.env("CAPI_STATS_STATE_FILE", state_file)
        .env("CAPI_STATS_SINK_HOST", "127.0.0.1")
        .env("CAPI_STATS_SINK_PORT", sink_port.to_string())
        .env_remove("RUST_LOG");
    match snapshot_dir {
        Some(dir) => cmd.env("CAPI_STATS_SNAPSHOT_DIR", dir),
        None => cmd.env("CAPI_STATS_DUMP_SNAPSHOTS", "false"),
    };
    cmd.output().expect("Failed to execute capi-stats")
}

/// Test a full run delivers the expected payload to a listening collector
#[test]
fn test_run_delivers_metrics() {
    let temp_dir = TempDir::new().unwrap();
    let state_file = temp_dir.path().join("state.json");
    std::fs::write(&state_file, STATE).unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let collector = thread::spawn(move || {
        let (mut socket, _) = listener.accept().unwrap();
        let mut received = String::new();
        socket.read_to_string(&mut received).unwrap();
        received
    });

    let output = run_stats(&state_file, port, None);
    assert!(output.status.success(), "capi-stats should succeed");

    let received = collector.join().unwrap();
    assert!(received.ends_with("\n\n"), "payload ends with a blank line");
    let lines: Vec<&str> = received.trim_end().lines().collect();
    assert_eq!(lines.len(), 6);
    assert!(lines
        .iter()
        .any(|l| l.starts_with("one_min.capi.rtc.sched1.number_of_jobs 1 ")));
    assert!(lines
        .iter()
        .any(|l| l.starts_with("one_min.capi.rtc.sched1.mem_alloc 1073741824.0 ")));
    assert!(lines
        .iter()
        .any(|l| l.starts_with("one_min.capi.unknown.hosts.unknown 1 ")));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("start"), "Should log start");
    assert!(stdout.contains("done"), "Should log completion");
}

/// Test a run with no collector listening still exits 0
#[test]
fn test_run_without_collector_succeeds() {
    let temp_dir = TempDir::new().unwrap();
    let state_file = temp_dir.path().join("state.json");
    std::fs::write(&state_file, STATE).unwrap();

    let output = run_stats(&state_file, free_port(), None);
    assert!(output.status.success(), "Sink failure must not fail the run");
}

/// Test snapshots land in the configured directory
#[test]
fn test_run_writes_snapshots() {
    let temp_dir = TempDir::new().unwrap();
    let dump_dir = TempDir::new().unwrap();
    let state_file = temp_dir.path().join("state.json");
    std::fs::write(&state_file, STATE).unwrap();

    let output = run_stats(&state_file, free_port(), Some(dump_dir.path()));
    assert!(output.status.success());

    let mut names: Vec<String> = std::fs::read_dir(dump_dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    assert_eq!(names.len(), 2);
    assert!(names[0].starts_with("cluster_state_"));
    assert!(names[1].starts_with("result_"));

    let result: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(dump_dir.path().join(&names[1])).unwrap(),
    )
    .unwrap();
    assert_eq!(result["rtc"]["sched1"]["number_of_jobs"], 1);
}

/// Test malformed state exits non-zero
#[test]
fn test_malformed_state_fails() {
    let temp_dir = TempDir::new().unwrap();
    let state_file = temp_dir.path().join("state.json");
    std::fs::write(&state_file, "{ not json").unwrap();

    let output = run_stats(&state_file, free_port(), None);
    assert!(!output.status.success(), "Parse failure must fail the run");
    assert_eq!(output.status.code(), Some(1));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to load"), "Should report the failure");
}
