use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const HEALTH_HEADER: &str = "Date,Análisis del Sueño [Total] (hr),Análisis del Sueño [Core] (hr),Análisis del Sueño [Deep] (hr),Análisis del Sueño [REM] (hr),Análisis del Sueño [Awake] (hr),Variabilidad de Frecuencia Cardíaca (ms) ,Minutos de Ejercicio (min)";
const WEATHER_HEADER: &str = "fecha,Temperature,Humidity (%)";

/// Thirty nights of joined data in a temporary directory
fn datasets() -> TempDir {
    let dir = tempfile::tempdir().unwrap();

    let mut health = format!("{}\n", HEALTH_HEADER);
    let mut weather = format!("{}\n", WEATHER_HEADER);
    for i in 0..30u32 {
        let total = 6.0 + (i % 5) as f64 * 0.5;
        let deep = 0.8 + (i % 3) as f64 * 0.2;
        let rem = 1.2 + (i % 4) as f64 * 0.1;
        let awake = 0.4;
        health.push_str(&format!(
            "2024-03-{:02},{},{},{},{},{},{},{}\n",
            i + 1,
            total,
            total - deep - rem - awake,
            deep,
            rem,
            awake,
            35 + (i * 7) % 30,
            (i * 11) % 45
        ));
        weather.push_str(&format!(
            "2024-03-{:02},{},{}\n",
            i + 1,
            8 + (i * 5) % 17,
            45 + (i * 3) % 40
        ));
    }

    fs::write(dir.path().join("health.csv"), health).unwrap();
    fs::write(dir.path().join("weather.csv"), weather).unwrap();
    dir
}

fn command(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("sleep-quality").unwrap();
    cmd.current_dir(dir.path())
        .arg("--health")
        .arg(dir.path().join("health.csv"))
        .arg("--weather")
        .arg(dir.path().join("weather.csv"));
    cmd
}

#[test]
fn test_help_command() {
    let mut cmd = Command::cargo_bin("sleep-quality").unwrap();
    cmd.arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Sleep quality scoring"))
        .stdout(predicate::str::contains("train"))
        .stdout(predicate::str::contains("predict"));
}

#[test]
fn test_version_command() {
    let mut cmd = Command::cargo_bin("sleep-quality").unwrap();
    cmd.arg("--version");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_completions_command() {
    let mut cmd = Command::cargo_bin("sleep-quality").unwrap();
    cmd.arg("completions").arg("bash");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("sleep-quality"));
}

#[test]
fn test_train_prints_metrics() {
    let dir = datasets();
    command(&dir)
        .arg("train")
        .assert()
        .success()
        .stdout(predicate::str::contains("RMSE"))
        .stdout(predicate::str::contains("MAPE"));
}

#[test]
fn test_predict_json_output() {
    let dir = datasets();
    let output = command(&dir)
        .args(["--json", "predict", "--hrv", "10000", "--wind", "20"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let body: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let score = body["score"].as_f64().unwrap();
    assert!((0.0..=100.0).contains(&score));
    assert_eq!(body["skipped_fields"], serde_json::json!(["wind"]));
}

#[test]
fn test_day_not_found_fails() {
    let dir = datasets();
    command(&dir)
        .args(["day", "2020-01-01"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("2020-01-01"));
}

#[test]
fn test_missing_dataset_fails() {
    let dir = tempfile::tempdir().unwrap();
    command(&dir)
        .arg("stats")
        .assert()
        .failure()
        .stderr(predicate::str::contains("health.csv"));
}
