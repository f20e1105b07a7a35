use assert_cmd::cargo;
use predicates::prelude::*;

mod server;

#[tokio::test]
async fn test_cli_help() {
    let mut cmd = cargo::cargo_bin_cmd!("sitegrade");
    let assert = cmd.arg("--help").assert();

    // On Windows, the binary name in help might be "sitegrade.exe"
    let expected_pattern = if cfg!(windows) {
        "sitegrade.exe [OPTIONS] <URL>"
    } else {
        "sitegrade [OPTIONS] <URL>"
    };

    assert
        .success()
        .stderr(predicate::str::is_empty())
        .stdout(predicate::str::contains(expected_pattern))
        .stdout(predicate::str::contains("--max-pages"))
        .stdout(predicate::str::contains("--probe-limit"))
        .stdout(predicate::str::contains("--max-duration"));
}

#[tokio::test]
async fn test_cli_requires_url() {
    let mut cmd = cargo::cargo_bin_cmd!("sitegrade");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("<URL>"));
}

#[tokio::test]
async fn test_cli_rejects_url_without_scheme() {
    let mut cmd = cargo::cargo_bin_cmd!("sitegrade");
    cmd.arg("example.com")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Invalid URL"));
}

#[tokio::test]
async fn test_cli_rejects_zero_max_pages() {
    let mut cmd = cargo::cargo_bin_cmd!("sitegrade");
    cmd.args(["https://example.com", "--max-pages", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("max_pages must be at least 1"));
}

#[tokio::test]
async fn test_cli_json_output_for_unreachable_site() {
    let mut cmd = cargo::cargo_bin_cmd!("sitegrade");
    cmd.args([server::unreachable_url().as_str(), "--output", "json", "--timeout", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"unreachable\": 1"))
        .stdout(predicate::str::contains("\"grade\""));
}
