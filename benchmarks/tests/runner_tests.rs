use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

#[test]
fn test_runner_writes_report() {
    let temp = TempDir::new().unwrap();
    let report = temp.path().join("logs").join("bench.json");

    Command::cargo_bin("benchmark-runner")
        .unwrap()
        .args(["--time-scale", "0.01", "--output"])
        .arg(&report)
        .assert()
        .success()
        .stdout(predicate::str::contains("Overall Grade:"))
        .stdout(predicate::str::contains("Recommendations:"));

    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&report).unwrap()).unwrap();
    assert_eq!(value["benchmarks"]["agent_coordination"].as_object().unwrap().len(), 5);
    assert_eq!(value["metadata"]["time_scale"], 0.01);
}

#[test]
fn test_runner_rejects_zero_time_scale() {
    let temp = TempDir::new().unwrap();

    Command::cargo_bin("benchmark-runner")
        .unwrap()
        .current_dir(temp.path())
        .args(["--time-scale", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("time scale"));

    assert!(!temp.path().join("logs").exists());
}

#[test]
fn test_runner_rejects_oversized_time_scale() {
    let temp = TempDir::new().unwrap();
    let output = temp.path().join("report.json");

    Command::cargo_bin("benchmark-runner")
        .unwrap()
        .args(["--time-scale", "1e300", "--output"])
        .arg(&output)
        .assert()
        .failure()
        .stderr(predicate::str::contains("must not exceed"));

    assert!(!output.exists());
}
