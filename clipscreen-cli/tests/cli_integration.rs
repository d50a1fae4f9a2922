use assert_cmd::Command;
use predicates::str::contains;
use serde_json::Value;
use std::error::Error;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

const CLIPSCREEN_ENV: [&str; 11] = [
    "CLIPSCREEN_MANIFEST",
    "CLIPSCREEN_GATEWAY_URL",
    "CLIPSCREEN_GATEWAY_KEY",
    "CLIPSCREEN_GATEWAY_TABLE",
    "CLIPSCREEN_EMBEDDING_URL",
    "CLIPSCREEN_EMBEDDING_KEY",
    "CLIPSCREEN_TEMP_DIR",
    "CLIPSCREEN_MAX_FILE_SIZE_MB",
    "CLIPSCREEN_THRESHOLD",
    "CLIPSCREEN_LOG_LEVEL",
    "RUST_LOG",
];

// Helper function to get the binary with a clean environment
fn clipscreen_cmd() -> Command {
    let mut cmd = Command::cargo_bin("clipscreen").expect("Failed to find clipscreen binary");
    for var in CLIPSCREEN_ENV {
        cmd.env_remove(var);
    }
    cmd
}

fn write_manifest(dir: &Path, body: &str) -> Result<String, Box<dyn Error>> {
    let path = dir.join("clips.json");
    fs::write(&path, body)?;
    Ok(path.to_string_lossy().into_owned())
}

/// Process arguments pointing every output into `dir`.
fn process_args(dir: &Path) -> Vec<String> {
    vec![
        "--output".to_string(),
        dir.join("frames").to_string_lossy().into_owned(),
        "--temp-dir".to_string(),
        dir.join("tmp").to_string_lossy().into_owned(),
    ]
}

#[test]
fn test_help_lists_subcommands() -> Result<(), Box<dyn Error>> {
    clipscreen_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("run"))
        .stdout(contains("clip"))
        .stdout(contains("health"))
        .stdout(contains("vocabulary"));
    Ok(())
}

#[test]
fn test_vocabulary_prints_builtin_catalog() -> Result<(), Box<dyn Error>> {
    let output = clipscreen_cmd().arg("vocabulary").output()?;
    assert!(output.status.success());

    let json: Value = serde_json::from_slice(&output.stdout)?;
    let categories = json.as_object().expect("vocabulary is a JSON object");
    let names: Vec<&str> = categories.keys().map(String::as_str).collect();
    assert_eq!(names.len(), 5);
    assert!(names.contains(&"violence"));
    assert!(categories["violence"].as_array().unwrap().contains(&Value::from("gun")));
    Ok(())
}

#[test]
fn test_vocabulary_additions() -> Result<(), Box<dyn Error>> {
    let output = clipscreen_cmd()
        .args(["vocabulary", "--add", "weapons:crossbow"])
        .output()?;
    assert!(output.status.success());
    let json: Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(json["weapons"], serde_json::json!(["crossbow"]));

    clipscreen_cmd()
        .args(["vocabulary", "--add", "no-separator"])
        .assert()
        .failure()
        .stderr(contains("CATEGORY:WORD"));
    Ok(())
}

#[test]
fn test_vocabulary_file_replaces_catalog() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let file = dir.path().join("vocab.json");
    fs::write(&file, r#"{"animals": ["snake", "spider"]}"#)?;

    let output = clipscreen_cmd()
        .arg("vocabulary")
        .arg("--vocabulary")
        .arg(&file)
        .output()?;
    assert!(output.status.success());
    let json: Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(json, serde_json::json!({"animals": ["snake", "spider"]}));
    Ok(())
}

#[test]
fn test_run_without_source_fails() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    clipscreen_cmd()
        .arg("run")
        .args(process_args(dir.path()))
        .assert()
        .failure()
        .stderr(contains("No clip source configured"));
    Ok(())
}

#[test]
fn test_gateway_url_needs_key() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    clipscreen_cmd()
        .args(["run", "--gateway-url", "https://db.example.com"])
        .args(process_args(dir.path()))
        .assert()
        .failure()
        .stderr(contains("gateway key"));
    Ok(())
}

#[test]
fn test_run_with_empty_manifest_succeeds() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let manifest = write_manifest(dir.path(), "[]")?;

    clipscreen_cmd()
        .args(["run", "--manifest", &manifest])
        .args(process_args(dir.path()))
        .assert()
        .success()
        .stdout(contains("Total clips"))
        .stdout(contains("0.0%"));
    Ok(())
}

#[test]
fn test_clip_without_url_fails_run() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let manifest = write_manifest(dir.path(), r#"{"clips": [{"id": "c1", "title": "No Source"}]}"#)?;

    clipscreen_cmd()
        .args(["run", "--manifest", &manifest])
        .args(process_args(dir.path()))
        .assert()
        .failure()
        .stdout(contains("Failed Clips"))
        .stdout(contains("c1 (No Source)"))
        .stdout(contains("source URL"));
    Ok(())
}

#[test]
fn test_run_json_output() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let manifest = write_manifest(dir.path(), r#"[{"id": 7, "source_url": "  "}]"#)?;

    let output = clipscreen_cmd()
        .args(["run", "--json", "--manifest", &manifest])
        .args(process_args(dir.path()))
        .output()?;
    assert_eq!(output.status.code(), Some(1));

    let report: Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(report["statistics"]["total"], 1);
    assert_eq!(report["statistics"]["failed"], 1);
    assert_eq!(report["results"][0]["clip_id"], "7");
    assert_eq!(report["results"][0]["clip_title"], "Unknown");
    assert_eq!(report["results"][0]["error_kind"], "MissingInput");
    assert_eq!(report["cancelled"], false);
    Ok(())
}

#[test]
fn test_unknown_clip_id_fails() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let manifest = write_manifest(dir.path(), r#"[{"id": "c1", "url": "https://x.test/a.mp4"}]"#)?;

    clipscreen_cmd()
        .args(["clip", "missing", "--manifest", &manifest])
        .args(process_args(dir.path()))
        .assert()
        .failure()
        .stderr(contains("Clip not found"));
    Ok(())
}

#[test]
fn test_unreadable_manifest_is_fatal() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let manifest = write_manifest(dir.path(), "not json")?;

    clipscreen_cmd()
        .args(["run", "--manifest", &manifest])
        .args(process_args(dir.path()))
        .assert()
        .failure()
        .stderr(contains("Failed to list clips"));
    Ok(())
}

#[test]
fn test_invalid_threshold_is_rejected() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let manifest = write_manifest(dir.path(), "[]")?;

    clipscreen_cmd()
        .args(["run", "--manifest", &manifest, "--threshold", "1.5"])
        .args(process_args(dir.path()))
        .assert()
        .failure()
        .stderr(contains("similarity_threshold"));
    Ok(())
}

#[test]
fn test_invalid_size_limit_is_a_parse_error() -> Result<(), Box<dyn Error>> {
    clipscreen_cmd()
        .args(["run", "--max-file-size-mb", "abc"])
        .assert()
        .failure()
        .stderr(contains("invalid value 'abc'"));
    Ok(())
}

#[test]
fn test_size_limit_from_environment() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let manifest = write_manifest(dir.path(), "[]")?;

    clipscreen_cmd()
        .env("CLIPSCREEN_MAX_FILE_SIZE_MB", "0")
        .args(["run", "--manifest", &manifest])
        .args(process_args(dir.path()))
        .assert()
        .failure()
        .stderr(contains("max_download_bytes"));
    Ok(())
}

#[test]
fn test_huge_size_limit_is_accepted() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let manifest = write_manifest(dir.path(), "[]")?;

    clipscreen_cmd()
        .args(["run", "--manifest", &manifest, "--max-file-size-mb", "18014398509481984"])
        .args(process_args(dir.path()))
        .assert()
        .success()
        .stdout(contains("Total clips"));
    Ok(())
}

#[test]
fn test_health_reports_components() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let manifest = write_manifest(dir.path(), "[]")?;
    fs::create_dir_all(dir.path().join("tmp"))?;

    // Exit status depends on whether ffmpeg is installed.
    let output = clipscreen_cmd()
        .args(["health", "--json", "--manifest", &manifest])
        .args(process_args(dir.path()))
        .output()?;

    let report: Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(report["metadata_gateway"], true);
    assert_eq!(report["temp_directory"], true);
    assert_eq!(report["downloader"], true);
    assert!(report["frame_extractor"].is_boolean());
    Ok(())
}

#[test]
fn test_health_does_not_create_temp_dir() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let manifest = write_manifest(dir.path(), "[]")?;

    let output = clipscreen_cmd()
        .args(["health", "--json", "--manifest", &manifest])
        .args(process_args(dir.path()))
        .output()?;
    assert_eq!(output.status.code(), Some(1));

    let report: Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(report["temp_directory"], false);
    assert!(!dir.path().join("tmp").exists());
    Ok(())
}

#[test]
fn test_log_dir_receives_run_log() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let log_dir = dir.path().join("logs");

    clipscreen_cmd()
        .arg("vocabulary")
        .arg("--log-dir")
        .arg(&log_dir)
        .assert()
        .success();

    let logs: Vec<String> = fs::read_dir(&log_dir)?
        .filter_map(Result::ok)
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(logs.len(), 1);
    assert!(logs[0].starts_with("clipscreen_run_") && logs[0].ends_with(".log"));
    Ok(())
}
