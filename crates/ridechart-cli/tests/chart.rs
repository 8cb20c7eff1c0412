use assert_cmd::Command;
use serde_json::Value;
use std::{error::Error, fs, path::PathBuf};
use tempfile::tempdir;

fn fixture(name: &str) -> String {
    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("test_data")
        .join(name)
        .to_str()
        .unwrap()
        .to_string()
}

fn probe(args: &[&str]) -> Result<Value, Box<dyn Error>> {
    let input = fixture("interval_session.json");
    let output = Command::cargo_bin("ridechart")?
        .args(["probe", "--input", &input, "--budget", "100"])
        .args(args)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    Ok(serde_json::from_slice(&output)?)
}

#[test]
fn plot_writes_png() {
    let temp = tempdir().unwrap();
    let out = temp.path().join("ride.png");
    Command::cargo_bin("ridechart")
        .unwrap()
        .args([
            "plot",
            "--input",
            &fixture("interval_session.json"),
            "--budget",
            "200",
            "--out",
            out.to_str().unwrap(),
        ])
        .assert()
        .success();
    let bytes = fs::read(&out).unwrap();
    assert!(bytes.starts_with(b"\x89PNG"));
}

#[test]
fn plot_window_without_band() {
    let temp = tempdir().unwrap();
    let out = temp.path().join("window.png");
    Command::cargo_bin("ridechart")
        .unwrap()
        .args([
            "plot",
            "--config",
            &fixture("chart.toml"),
            "--start",
            "10",
            "--end",
            "60",
            "--no-band",
            "--out",
            out.to_str().unwrap(),
        ])
        .assert()
        .success();
    assert!(out.exists());
}

#[test]
fn probe_edges_clamp_to_first_and_last_sample() -> Result<(), Box<dyn Error>> {
    let left = probe(&["--x", "-50"])?;
    assert_eq!(left["index"], 0);
    assert_eq!(left["original_index"], 0);
    assert_eq!(left["x"], 40.0);

    let right = probe(&["--x", "10000"])?;
    assert_eq!(right["index"], 99);
    assert_eq!(right["original_index"], 599);
    assert_eq!(right["time"], 599.0);
    Ok(())
}

#[test]
fn probe_respects_the_window() -> Result<(), Box<dyn Error>> {
    let tip = probe(&["--x", "0", "--start", "30", "--end", "50"])?;
    assert_eq!(tip["index"], 30);
    assert_eq!(tip["y"].as_array().unwrap().len(), 2);
    let power = tip["power"].as_f64().unwrap();
    assert!(power >= 180.0);
    Ok(())
}
