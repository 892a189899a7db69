//! CLI smoke tests for the toolfetch binary.

mod common;

use assert_cmd::Command;
use predicates::prelude::*;

use common::build_zip;

#[test]
fn install_unpacks_archive_to_destination() {
    let mut server = mockito::Server::new();
    let _m = server
        .mock("GET", "/tool.zip")
        .with_status(200)
        .with_header("last-modified", "Wed, 01 Jan 2025 00:00:00 GMT")
        .with_body(build_zip(&[("bin/", None), ("bin/tool", Some(b"payload"))]))
        .create();

    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("tool");

    Command::cargo_bin("toolfetch")
        .unwrap()
        .args(["install", &format!("{}/tool.zip", server.url()), "--dest"])
        .arg(&dest)
        .assert()
        .success()
        .stdout(predicate::str::contains("Installed"));

    assert!(dest.join("bin/tool").is_file());
}

#[test]
fn second_install_reports_up_to_date() {
    let mut server = mockito::Server::new();
    let _m = server
        .mock("GET", "/tool.zip")
        .with_status(200)
        .with_header("last-modified", "Wed, 01 Jan 2025 00:00:00 GMT")
        .with_body(build_zip(&[("file.txt", Some(b"contents"))]))
        .create();

    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("tool");
    let url = format!("{}/tool.zip", server.url());

    Command::cargo_bin("toolfetch")
        .unwrap()
        .args(["install", &url, "--dest"])
        .arg(&dest)
        .assert()
        .success();

    // Same Last-Modified on the second run: the gate skips.
    Command::cargo_bin("toolfetch")
        .unwrap()
        .args(["install", &url, "--dest"])
        .arg(&dest)
        .assert()
        .success()
        .stdout(predicate::str::contains("up to date"));
}

#[test]
fn install_rejects_malformed_url() {
    let dir = tempfile::tempdir().unwrap();

    Command::cargo_bin("toolfetch")
        .unwrap()
        .args(["install", "not a url", "--dest"])
        .arg(dir.path().join("tool"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Malformed URL"));
}

#[test]
fn check_reports_reachable_url() {
    let mut server = mockito::Server::new();
    let _m = server.mock("GET", "/tool.zip").with_status(200).create();

    Command::cargo_bin("toolfetch")
        .unwrap()
        .args(["check", &format!("{}/tool.zip", server.url())])
        .assert()
        .success()
        .stdout(predicate::str::contains("OK"));
}

#[test]
fn check_fails_for_unreachable_host() {
    Command::cargo_bin("toolfetch")
        .unwrap()
        .args(["check", "http://127.0.0.1:1/tool.zip"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Could not connect"));
}
