// spinarak/tests/cli_integration.rs

use assert_cmd::assert::OutputAssertExt;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::process::Output;
use tempfile::NamedTempFile;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Nothing listens on port 1, so connecting is refused immediately.
const UNREACHABLE: &str = "http://127.0.0.1:1/page";

/// A spinarak command isolated from the user's config files and environment.
fn spinarak() -> Command {
    let mut cmd = Command::cargo_bin("spinarak").unwrap();
    cmd.env("HOME", "/nonexistent-spinarak-home")
        .env("XDG_CONFIG_HOME", "/nonexistent-spinarak-home")
        .env_remove("SPINARAK_WORD")
        .env_remove("SPINARAK_WORKERS")
        .env_remove("SPINARAK_JSON")
        .env_remove("SPINARAK_PRETTY")
        .env_remove("SPINARAK_CONFIG")
        .env_remove("RUST_LOG");
    cmd
}

/// Run the binary off the async runtime so the mock server keeps serving.
async fn run_blocking(args: Vec<String>) -> Output {
    tokio::task::spawn_blocking(move || spinarak().args(&args).output().unwrap())
        .await
        .unwrap()
}

/// Helper to create a temp file with the given content
fn create_temp_file(content: &str) -> NamedTempFile {
    let file = NamedTempFile::new().expect("Failed to create temp file");
    fs::write(file.path(), content).expect("Failed to write to temp file");
    file
}

#[test]
fn test_help_shows_options() {
    spinarak()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--word"))
        .stdout(predicate::str::contains("--workers"))
        .stdout(predicate::str::contains("--file"));
}

#[test]
fn test_missing_word_is_rejected() {
    spinarak()
        .arg(UNREACHABLE)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Need a word to process."))
        .stderr(predicate::str::contains("Usage:"));
}

#[test]
fn test_empty_word_is_rejected() {
    spinarak()
        .args(["--word", "", UNREACHABLE])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Need a word to process."));
}

#[test]
fn test_zero_workers_is_rejected() {
    spinarak()
        .args(["--word", "cat", "--workers", "0", UNREACHABLE])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Number of workers must be greater than 0."))
        .stderr(predicate::str::contains("Usage:"));
}

#[test]
fn test_no_links_is_rejected() {
    spinarak()
        .args(["--word", "cat"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Need links to process."));
}

#[test]
fn test_unreachable_link_still_reports() {
    spinarak()
        .args(["--word", "cat", UNREACHABLE])
        .assert()
        .success()
        .stdout(predicate::str::contains(UNREACHABLE))
        .stdout(predicate::str::contains("count: 0"))
        .stdout(predicate::str::contains("Fetch failed"));
}

#[test]
fn test_word_from_environment() {
    spinarak()
        .env("SPINARAK_WORD", "cat")
        .arg(UNREACHABLE)
        .assert()
        .success()
        .stdout(predicate::str::contains("count: 0"));
}

#[test]
fn test_word_from_config_file() {
    let config = create_temp_file("[defaults]\nword = \"cat\"\nworkers = 2\n");
    spinarak()
        .args(["--config", &config.path().to_string_lossy(), UNREACHABLE])
        .assert()
        .success()
        .stdout(predicate::str::contains(UNREACHABLE));
}

#[test]
fn test_invalid_config_file_fails() {
    let config = create_temp_file("[defaults]\nworkers = 0\n");
    spinarak()
        .args(["--word", "cat", "--config", &config.path().to_string_lossy(), UNREACHABLE])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load config file"));
}

#[test]
fn test_missing_links_file_fails() {
    spinarak()
        .args(["--word", "cat", "--file", "/no/such/links.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("File error"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_counts_words_on_served_pages() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(ResponseTemplate::new(200).set_body_string("cat sat cat"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/b"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let a = format!("{}/a", server.uri());
    let b = format!("{}/b", server.uri());
    let output = run_blocking(vec![
        "--word".into(),
        "cat".into(),
        "--workers".into(),
        "2".into(),
        a.clone(),
        b.clone(),
    ])
    .await;

    output
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("{}\n\tcount: 2\n\terror: <nil>", a)))
        .stdout(predicate::str::contains(format!("{}\n\tcount: 0\n\terror: ", b)))
        .stdout(predicate::str::contains("404"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_json_output() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(ResponseTemplate::new(200).set_body_string("dog cat dog"))
        .mount(&server)
        .await;

    let a = format!("{}/a", server.uri());
    let output = run_blocking(vec![
        "--word".into(),
        "dog".into(),
        "--json".into(),
        a.clone(),
        UNREACHABLE.into(),
    ])
    .await;

    assert!(output.status.success());
    let results: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let results = results.as_array().unwrap();
    assert_eq!(results.len(), 2);

    let page = results.iter().find(|r| r["link"] == a.as_str()).unwrap();
    assert_eq!(page["count"], 2);
    assert!(page["error"].is_null());

    let failed = results.iter().find(|r| r["link"] == UNREACHABLE).unwrap();
    assert_eq!(failed["count"], 0);
    assert!(failed["error"].is_string());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_links_from_file() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/listed"))
        .respond_with(ResponseTemplate::new(200).set_body_string("cat"))
        .mount(&server)
        .await;

    let listed = format!("{}/listed", server.uri());
    let links = create_temp_file(&format!("# pages\n{}\n\n{}\n", listed, listed));

    let output = run_blocking(vec![
        "--word".into(),
        "cat".into(),
        "--file".into(),
        links.path().to_string_lossy().to_string(),
    ])
    .await;

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert_eq!(stdout.matches("count: 1").count(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_pretty_output_has_summary() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(ResponseTemplate::new(200).set_body_string("cat"))
        .mount(&server)
        .await;

    let a = format!("{}/a", server.uri());
    let output = run_blocking(vec![
        "--word".into(),
        "cat".into(),
        "--pretty".into(),
        a,
        UNREACHABLE.into(),
    ])
    .await;

    output
        .assert()
        .success()
        .stdout(predicate::str::contains("2 pages"))
        .stdout(predicate::str::contains("1 match"))
        .stdout(predicate::str::contains("Some pages could not be counted"));
}
