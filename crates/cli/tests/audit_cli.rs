// Integration tests for the `mgrid` binary: exit codes and a full audit run
// against mocked Plex and TVMaze endpoints.
// Run with: cargo test -p mediagrid-cli --test audit_cli

use std::path::Path;
use std::process::{Command, Output};

use httpmock::prelude::*;
use serde_json::json;

fn mgrid(config: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_mgrid"));
    cmd.current_dir(env!("CARGO_MANIFEST_DIR"));
    // Never pick up a real server, token or config from the environment
    cmd.env_remove("PLEX_URL");
    cmd.env_remove("PLEX_TOKEN");
    cmd.env_remove("MEDIAGRID_CONFIG");
    cmd.env_remove("MGRID_LOG");
    cmd.arg("--config").arg(config);
    cmd
}

fn write_config(dir: &Path, catalog_url: &str) -> std::path::PathBuf {
    let path = dir.join("config.toml");
    std::fs::write(
        &path,
        format!("[catalog]\nbase_url = \"{catalog_url}\"\n\n[inventory]\nworkers = 3\ntimeout_secs = 5\n"),
    )
    .unwrap();
    path
}

fn assert_exit(output: &Output, code: i32) {
    assert_eq!(
        output.status.code(),
        Some(code),
        "expected exit {code}, got {:?}\nstderr: {}",
        output.status.code(),
        String::from_utf8_lossy(&output.stderr),
    );
}

fn mock_plex(server: &MockServer) {
    server.mock(|when, then| {
        when.method(GET).path("/identity").header("X-Plex-Token", "tok");
        then.status(200).json_body(json!({"MediaContainer": {"machineIdentifier": "m1", "version": "1.40"}}));
    });
    server.mock(|when, then| {
        when.method(GET).path("/library/sections");
        then.status(200).json_body(json!({"MediaContainer": {"Directory": [
            {"key": "1", "title": "Movies", "type": "movie"},
            {"key": "2", "title": "TV Shows", "type": "show"}
        ]}}));
    });
    server.mock(|when, then| {
        when.method(GET).path("/library/sections/1/all");
        then.status(200).json_body(json!({"MediaContainer": {"Metadata": [
            {"ratingKey": "10", "title": "Heat", "year": 1995,
             "Media": [{"videoResolution": "4k", "container": "mkv", "Part": [{"file": "/m/heat.mkv"}]}]},
            {"ratingKey": "11", "title": "Alien", "year": 1979,
             "Media": [{"videoResolution": "sd", "container": "avi"}]}
        ]}}));
    });
    server.mock(|when, then| {
        when.method(GET).path("/library/sections/2/all");
        then.status(200).json_body(json!({"MediaContainer": {"Metadata": [
            {"ratingKey": "20", "title": "Show A"},
            {"ratingKey": "21", "title": "Obscure Show"}
        ]}}));
    });
    server.mock(|when, then| {
        when.method(GET).path("/library/metadata/20/allLeaves");
        then.status(200).json_body(json!({"MediaContainer": {"Metadata": [
            {"parentIndex": 1}, {"parentIndex": 1}, {"parentIndex": 2}
        ]}}));
    });
    server.mock(|when, then| {
        when.method(GET).path("/library/metadata/21/allLeaves");
        then.status(200).json_body(json!({"MediaContainer": {"Metadata": [{"parentIndex": 1}]}}));
    });
}

fn mock_catalog(server: &MockServer) {
    server.mock(|when, then| {
        when.method(GET).path("/search/shows").query_param("q", "Show A");
        then.status(200).json_body(json!([{"score": 1.0, "show": {"id": 5, "name": "Show A"}}]));
    });
    server.mock(|when, then| {
        when.method(GET).path("/search/shows").query_param("q", "Obscure Show");
        then.status(200).json_body(json!([]));
    });
    server.mock(|when, then| {
        when.method(GET).path("/shows/5/episodes");
        then.status(200).json_body(json!([
            {"season": 1, "number": 1}, {"season": 1, "number": 2},
            {"season": 2, "number": 1}, {"season": 2, "number": 2}
        ]));
    });
}

#[test]
fn missing_subcommand_exits_2() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), "http://127.0.0.1:9");
    let output = mgrid(&config).output().expect("failed to run mgrid");
    assert_exit(&output, 2);
}

#[test]
fn missing_server_exits_2() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), "http://127.0.0.1:9");
    let output = mgrid(&config).args(["audit", "--token", "tok"]).output().expect("failed to run mgrid");
    assert_exit(&output, 2);
}

#[test]
fn invalid_config_exits_2() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("bad.toml");
    std::fs::write(&config, "[inventory]\nworkers = 0\n").unwrap();

    let output = mgrid(&config)
        .args(["audit", "--server", "http://127.0.0.1:9", "--token", "tok"])
        .output()
        .expect("failed to run mgrid");
    assert_exit(&output, 2);
    assert!(String::from_utf8_lossy(&output.stderr).contains("inventory.workers"));
}

#[test]
fn unwritable_output_exits_3_before_contacting_server() {
    let server = MockServer::start();
    let identity = server.mock(|when, then| {
        when.method(GET).path("/identity");
        then.status(200).json_body(json!({"MediaContainer": {}}));
    });

    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), &server.base_url());
    let output_path = dir.path().join("no-such-dir").join("report.xlsx");

    let output = mgrid(&config)
        .args(["audit", "--server", &server.base_url(), "--token", "tok", "--quiet", "--output"])
        .arg(&output_path)
        .output()
        .expect("failed to run mgrid");

    assert_exit(&output, 3);
    identity.assert_calls(0);
}

#[test]
fn rejected_token_exits_4() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/identity");
        then.status(401);
    });

    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), &server.base_url());
    let output = mgrid(&config)
        .args(["audit", "--server", &server.base_url(), "--token", "wrong", "--output"])
        .arg(dir.path().join("report.xlsx"))
        .output()
        .expect("failed to run mgrid");

    assert_exit(&output, 4);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("PLEX_TOKEN"), "stderr: {stderr}");
    assert!(!dir.path().join("report.xlsx").exists());
}

#[test]
fn unreachable_server_exits_4() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), "http://127.0.0.1:9");
    let output = mgrid(&config)
        .args(["sections", "--server", "http://127.0.0.1:9", "--token", "tok"])
        .output()
        .expect("failed to run mgrid");
    assert_exit(&output, 4);
}

#[test]
fn unknown_section_exits_2() {
    let server = MockServer::start();
    mock_plex(&server);

    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), &server.base_url());
    let output = mgrid(&config)
        .args(["audit", "--server", &server.base_url(), "--token", "tok", "--section", "Anime", "--output"])
        .arg(dir.path().join("report.xlsx"))
        .output()
        .expect("failed to run mgrid");

    assert_exit(&output, 2);
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown library section"));
}

#[test]
fn full_audit_writes_workbook_and_json_summary() {
    let server = MockServer::start();
    mock_plex(&server);
    mock_catalog(&server);

    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), &server.base_url());
    let report = dir.path().join("report.xlsx");

    let output = mgrid(&config)
        .env("PLEX_URL", server.base_url())
        .env("PLEX_TOKEN", "tok")
        .args(["audit", "--json", "--output"])
        .arg(&report)
        .output()
        .expect("failed to run mgrid");

    assert_exit(&output, 0);
    assert!(report.exists());

    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let sheets = summary["sheets"].as_array().unwrap();
    assert_eq!(sheets.len(), 2);
    assert_eq!(sheets[0]["name"], "Movies");
    assert_eq!(sheets[0]["items"], 2);
    assert!(sheets[0].get("status").is_none());

    let shows = &sheets[1]["status"];
    assert_eq!(shows["items"], 2);
    assert_eq!(shows["partial"], 1);
    assert_eq!(shows["unknown"], 1);
    assert_eq!(summary["cache"]["fetches"], 2);
}

#[test]
fn section_filter_limits_sheets() {
    let server = MockServer::start();
    mock_plex(&server);

    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), &server.base_url());
    let report = dir.path().join("movies.xlsx");

    let output = mgrid(&config)
        .args(["audit", "--server", &server.base_url(), "--token", "tok", "--section", "movies", "--json", "-o"])
        .arg(&report)
        .output()
        .expect("failed to run mgrid");

    assert_exit(&output, 0);
    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["sheets"].as_array().unwrap().len(), 1);
    assert_eq!(summary["cache"]["fetches"], 0);
}

#[test]
fn lookup_not_found_exits_0() {
    let server = MockServer::start();
    mock_catalog(&server);

    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), &server.base_url());
    let output = mgrid(&config).args(["lookup", "Obscure Show"]).output().expect("failed to run mgrid");

    assert_exit(&output, 0);
    assert!(String::from_utf8_lossy(&output.stdout).contains("not found"));
}

#[test]
fn lookup_prints_seasons() {
    let server = MockServer::start();
    mock_catalog(&server);

    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), &server.base_url());
    let output = mgrid(&config).args(["lookup", "Show A"]).output().expect("failed to run mgrid");

    assert_exit(&output, 0);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("2 seasons"), "stdout: {stdout}");
    assert!(stdout.contains("Season 2: 2 episodes"), "stdout: {stdout}");
}
