use assert_cmd::Command;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use std::fs;
use std::path::{Path, PathBuf};

fn artifact(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/artifacts").join(name)
}

fn cli() -> Command {
    Command::cargo_bin("lbrn-export").unwrap()
}

#[test]
fn test_convert_to_svg() {
    let out = tempfile::tempdir().unwrap();
    let output = out.path().join("square.svg");

    cli()
        .args(["convert", "--format", "svg"])
        .arg(artifact("square.lbrn2"))
        .arg(&output)
        .assert()
        .success();

    let svg = fs::read_to_string(&output).unwrap();
    assert!(svg.contains("<rect x=\"0\" y=\"0\" width=\"20\" height=\"20\""));
}

#[test]
fn test_convert_to_png() {
    let out = tempfile::tempdir().unwrap();
    let output = out.path().join("circle.png");

    cli()
        .arg("convert")
        .arg(artifact("circle.lbrn2"))
        .arg(&output)
        .assert()
        .success();

    let png = fs::read(&output).unwrap();
    assert!(png.starts_with(b"\x89PNG\r\n\x1a\n"));
}

#[test]
fn test_no_scale_keeps_canvas_size() {
    let out = tempfile::tempdir().unwrap();
    let output = out.path().join("square.png");

    cli()
        .args(["convert", "--no-scale"])
        .arg(artifact("square.lbrn2"))
        .arg(&output)
        .assert()
        .success();

    let img = image::open(&output).unwrap();
    assert_eq!((img.width(), img.height()), (1000, 1000));
}

#[test]
fn test_thumbnail_written_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("thumb.lbrn2");
    fs::copy(artifact("thumbnail_only.lbrn2"), &input).unwrap();

    cli().arg("convert").arg(&input).assert().success();

    let xml = fs::read_to_string(&input).unwrap();
    let source = xml
        .split("Source=\"")
        .nth(1)
        .and_then(|rest| rest.split('"').next())
        .unwrap();
    let expected = STANDARD.decode(source).unwrap();
    assert_eq!(fs::read(dir.path().join("thumb.png")).unwrap(), expected);
}

#[test]
fn test_no_content_exit_code() {
    let out = tempfile::tempdir().unwrap();
    cli()
        .arg("convert")
        .arg(artifact("empty.lbrn2"))
        .arg(out.path().join("empty.png"))
        .assert()
        .code(3);
}

#[test]
fn test_malformed_input_exit_code() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("broken.lbrn2");
    fs::write(&input, "<LightBurnProject><Shape Type=\"Rect\">").unwrap();
    cli().arg("convert").arg(&input).assert().code(1);
}

#[test]
fn test_usage_error_exit_code() {
    cli().arg("convert").assert().code(1);
    cli().args(["convert", "a.lbrn2", "--format", "gif"]).assert().code(1);
}

#[test]
fn test_help_exit_code() {
    cli().arg("--help").assert().success();
}

#[test]
fn test_batch_reports_failure() {
    let dir = tempfile::tempdir().unwrap();
    fs::copy(artifact("circle.lbrn2"), dir.path().join("circle.lbrn2")).unwrap();
    fs::copy(artifact("empty.lbrn2"), dir.path().join("empty.lbrn2")).unwrap();

    cli()
        .args(["batch", "--format", "svg"])
        .arg(dir.path())
        .assert()
        .code(1);

    assert!(dir.path().join("png/circle.svg").exists());
    assert!(!dir.path().join("png/empty.svg").exists());
}

#[test]
fn test_batch_success() {
    let dir = tempfile::tempdir().unwrap();
    fs::copy(artifact("circle.lbrn2"), dir.path().join("circle.lbrn2")).unwrap();

    cli()
        .args(["batch", "--subfolder", "renders", "--format", "svg"])
        .arg(dir.path().join("circle.lbrn2"))
        .assert()
        .success();

    assert!(dir.path().join("renders/circle.svg").exists());
}
