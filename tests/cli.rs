use assert_cmd::prelude::*;
use predicates::str::{contains, is_match};
use std::io::Write;
use std::process::Command;
use tempfile::NamedTempFile;

fn write_config(xml: &str) -> NamedTempFile {
    let mut tmp = NamedTempFile::new().expect("temp config");
    tmp.write_all(xml.as_bytes()).expect("write config");
    tmp
}

#[test]
fn summary_reports_default_spiral() {
    let mut cmd = Command::cargo_bin("spiral-sketch").expect("binary exists");
    cmd.arg("--summary-only").arg("--seed").arg("3");
    cmd.assert()
        .success()
        .stdout(contains("Spiral mesh: 106276 vertices, 211250 triangles"))
        .stdout(contains("Palette: #"))
        .stdout(contains("Band usage: "))
        .stdout(contains("Row sample: row 0 -> #"))
        .stdout(contains("Playhead: 0.000 after 0 frame(s)"));
}

#[test]
fn summary_uses_config_file_and_frames() {
    let config = write_config(
        r#"<sketch>
  <palette>#69d2e7 #a7dbd8 #e0e4cc #f38630 #fa6900</palette>
  <segments>20 10</segments>
  <speed>0.002</speed>
</sketch>
"#,
    );
    let mut cmd = Command::cargo_bin("spiral-sketch").expect("binary exists");
    cmd.arg("--config")
        .arg(config.path())
        .arg("--frames")
        .arg("25")
        .arg("--summary-only");
    cmd.assert()
        .success()
        .stdout(contains("Spiral mesh: 231 vertices, 400 triangles"))
        .stdout(contains("Bounds: min=("))
        .stdout(contains("Palette: #69d2e7 #a7dbd8 #e0e4cc #f38630 #fa6900"))
        .stdout(contains("Playhead: -0.050 after 25 frame(s)"))
        .stdout(
            is_match(
                r"Row sample: row 54 -> #(69d2e7|a7dbd8|e0e4cc|f38630|fa6900) color=\(\d\.\d{3}, \d\.\d{3}, \d\.\d{3}\) roughness=\d\.\d{3}",
            )
            .expect("valid pattern"),
        );
}

#[test]
fn invalid_config_fails() {
    let config = write_config("<sketch><segments>0</segments></sketch>");
    let mut cmd = Command::cargo_bin("spiral-sketch").expect("binary exists");
    cmd.arg("--config").arg(config.path()).arg("--summary-only");
    cmd.assert()
        .failure()
        .stderr(contains("segments must be positive"));
}

#[test]
fn unknown_argument_fails() {
    let mut cmd = Command::cargo_bin("spiral-sketch").expect("binary exists");
    cmd.arg("--wireframe");
    cmd.assert()
        .failure()
        .stderr(contains("Unknown argument: --wireframe"));
}
