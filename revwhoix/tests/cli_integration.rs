// revwhoix/tests/cli_integration.rs

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::path::Path;
use std::process::{self, Stdio};
use std::sync::{Arc, Mutex};
use std::thread;
use tempfile::TempDir;

/// Request bodies received by a canned API server, in arrival order.
type Received = Arc<Mutex<Vec<serde_json::Value>>>;

/// Serve `responses` (status, JSON body) to consecutive connections on a
/// local port. Returns the endpoint URL and the recorded request bodies.
fn spawn_api(responses: Vec<(u16, &'static str)>) -> (String, Received) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind test server");
    let endpoint = format!("http://{}/api/v2", listener.local_addr().unwrap());
    let received = Received::default();

    let log = received.clone();
    thread::spawn(move || {
        for (status, body) in responses {
            let Ok((stream, _)) = listener.accept() else {
                return;
            };
            handle_connection(stream, status, body, &log);
        }
    });

    (endpoint, received)
}

fn handle_connection(mut stream: TcpStream, status: u16, body: &str, log: &Received) {
    let mut reader = BufReader::new(stream.try_clone().unwrap());

    let mut content_length = 0usize;
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).unwrap_or(0) == 0 {
            return;
        }
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.eq_ignore_ascii_case("content-length") {
                content_length = value.trim().parse().unwrap_or(0);
            }
        }
    }

    let mut request_body = vec![0u8; content_length];
    reader.read_exact(&mut request_body).unwrap();
    log.lock()
        .unwrap()
        .push(serde_json::from_slice(&request_body).unwrap_or(serde_json::Value::Null));

    let response = format!(
        "HTTP/1.1 {} Canned\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    );
    stream.write_all(response.as_bytes()).unwrap();
    stream.flush().unwrap();
}

/// A temporary HOME holding an API key file.
fn home_with_key(key: &str) -> TempDir {
    let home = TempDir::new().expect("Failed to create temp dir");
    let config_dir = home.path().join(".config");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(config_dir.join("whoisxml.conf"), key).unwrap();
    home
}

/// The binary as a plain process, isolated from the caller's environment
/// and config files.
fn revwhoix_process(home: &Path) -> process::Command {
    let mut cmd = process::Command::new(assert_cmd::cargo::cargo_bin("revwhoix"));
    cmd.env("HOME", home)
        .env_remove("XDG_CONFIG_HOME")
        .env_remove("RW_ENDPOINT")
        .env_remove("RW_CONFIG")
        .env_remove("RW_API_KEY_FILE")
        .env_remove("RW_MAX_PAGES")
        .env_remove("RW_TIMEOUT")
        .env_remove("RW_LOOKUP_TIMEOUT")
        .env_remove("RW_LOG")
        .env_remove("RUST_LOG")
        .env_remove("HTTP_PROXY")
        .env_remove("http_proxy")
        .env_remove("ALL_PROXY")
        .env_remove("all_proxy")
        .current_dir(home);
    cmd
}

/// The isolated binary with an empty stdin.
fn revwhoix(home: &Path) -> Command {
    let mut cmd = Command::from(revwhoix_process(home));
    cmd.write_stdin("");
    cmd
}

#[test]
fn test_help_shows_keyword_flag() {
    let mut cmd = Command::cargo_bin("revwhoix").unwrap();
    cmd.arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("--keyword"))
        .stdout(predicate::str::contains("-k"));
}

#[test]
fn test_missing_keyword_fails() {
    let home = home_with_key("at_test_key");
    revwhoix(home.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("--keyword"));
}

#[test]
fn test_short_api_key_exits_without_network() {
    let home = home_with_key("x\n");
    let (endpoint, received) = spawn_api(vec![(200, r#"{"domainsCount": 3}"#)]);

    revwhoix(home.path())
        .env("RW_ENDPOINT", &endpoint)
        .args(["-k", "Acme Corp"])
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("API key is missing or too short"));

    assert!(received.lock().unwrap().is_empty());
}

#[test]
fn test_missing_api_key_file() {
    let home = TempDir::new().unwrap();

    revwhoix(home.path())
        .args(["-k", "Acme Corp"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("API key file not found"))
        .stderr(predicate::str::contains("whoisxml.conf"));
}

#[test]
fn test_api_key_file_from_env() {
    let home = TempDir::new().unwrap();
    let key_file = home.path().join("key.txt");
    fs::write(&key_file, "at_env_key\n").unwrap();
    let (endpoint, received) = spawn_api(vec![(200, r#"{"domainsCount": 0}"#)]);

    revwhoix(home.path())
        .env("RW_ENDPOINT", &endpoint)
        .env("RW_API_KEY_FILE", &key_file)
        .args(["-k", "Acme Corp"])
        .assert()
        .success();

    let received = received.lock().unwrap();
    assert_eq!(received[0]["apiKey"], "at_env_key");
}

#[test]
fn test_connection_refused_is_fatal() {
    let home = home_with_key("at_test_key");
    // Bind then drop to get a port nobody listens on
    let port = TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();

    revwhoix(home.path())
        .env("RW_ENDPOINT", format!("http://127.0.0.1:{}/api/v2", port))
        .args(["-k", "Acme Corp"])
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_api_error_status_is_fatal() {
    let home = home_with_key("at_bad_key");
    let (endpoint, _received) = spawn_api(vec![(
        403,
        r#"{"code": 403, "messages": "Access restricted. Check credits balance or enter the correct API key."}"#,
    )]);

    revwhoix(home.path())
        .env("RW_ENDPOINT", &endpoint)
        .args(["-k", "Acme Corp"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("403"));
}

#[test]
fn test_end_to_end_search() {
    let home = home_with_key("at_test_key");
    let (endpoint, received) = spawn_api(vec![
        (200, r#"{"domainsCount": 3}"#),
        (
            200,
            r#"{"domainsCount": 3, "domainsList": ["acme1.com", "acme2.net", "acme3.org"]}"#,
        ),
    ]);

    revwhoix(home.path())
        .env("RW_ENDPOINT", &endpoint)
        .args(["-k", "Acme Corp"])
        .assert()
        .success()
        .stdout("acme1.com\nacme2.net\nacme3.org\n")
        .stderr(predicate::str::contains("Checking if domains exist"))
        .stderr(predicate::str::contains("Acme Corp"));

    let received = received.lock().unwrap();
    assert_eq!(received.len(), 2);

    assert_eq!(received[0]["mode"], "preview");
    assert_eq!(received[0]["apiKey"], "at_test_key");
    assert_eq!(received[0]["searchType"], "current");
    assert_eq!(received[0]["punycode"], true);
    assert_eq!(received[0]["basicSearchTerms"]["include"][0], "Acme Corp");

    assert_eq!(received[1]["mode"], "purchase");
    assert!(received[1].get("searchAfter").is_none());
}

#[test]
fn test_multi_page_search() {
    let home = home_with_key("at_test_key");
    let (endpoint, received) = spawn_api(vec![
        (200, r#"{"domainsCount": 20001}"#),
        (
            200,
            r#"{"domainsCount": 10000, "domainsList": ["p1.com"], "nextPageSearchAfter": 111}"#,
        ),
        (200, r#"{"domainsCount": 1, "domainsList": ["p2.com"]}"#),
    ]);

    revwhoix(home.path())
        .env("RW_ENDPOINT", &endpoint)
        .args(["-k", "acme"])
        .assert()
        .success()
        .stdout("p1.com\np2.com\n");

    let received = received.lock().unwrap();
    assert_eq!(received.len(), 3);
    assert_eq!(received[2]["searchAfter"], 111);
}

#[test]
fn test_no_matches_skips_fetch() {
    let home = home_with_key("at_test_key");
    let (endpoint, received) = spawn_api(vec![
        (200, r#"{"domainsCount": 0}"#),
        (200, r#"{"domainsCount": 1, "domainsList": ["unexpected.com"]}"#),
    ]);

    revwhoix(home.path())
        .env("RW_ENDPOINT", &endpoint)
        .args(["-k", "nobody-registers-this"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    assert_eq!(received.lock().unwrap().len(), 1);
}

#[test]
fn test_blank_lookup_input_is_ignored() {
    let home = home_with_key("at_test_key");
    let (endpoint, _received) = spawn_api(vec![(200, r#"{"domainsCount": 0}"#)]);

    revwhoix(home.path())
        .env("RW_ENDPOINT", &endpoint)
        .args(["-k", "acme"])
        .write_stdin("\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("WHOIS").not());
}

#[test]
fn test_local_config_file_is_used() {
    let home = home_with_key("at_test_key");
    let (endpoint, received) = spawn_api(vec![(200, r#"{"domainsCount": 0}"#)]);
    fs::write(
        home.path().join("revwhoix.toml"),
        format!(
            "[search]\nendpoint = \"{}\"\nsearch_type = \"historic\"\n",
            endpoint
        ),
    )
    .unwrap();

    revwhoix(home.path())
        .env_remove("RW_ENDPOINT")
        .args(["-k", "acme"])
        .assert()
        .success();

    assert_eq!(received.lock().unwrap()[0]["searchType"], "historic");
}

#[test]
fn test_invalid_explicit_config_is_fatal() {
    let home = home_with_key("at_test_key");
    let config = home.path().join("broken.toml");
    fs::write(&config, "[search]\nmax_pages = 0\n").unwrap();

    revwhoix(home.path())
        .env("RW_CONFIG", &config)
        .args(["-k", "acme"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("max_pages"));
}

#[test]
fn test_closed_stdout_stops_cleanly() {
    let home = home_with_key("at_test_key");
    let (endpoint, received) = spawn_api(vec![
        (200, r#"{"domainsCount": 20001}"#),
        (
            200,
            r#"{"domainsCount": 10000, "domainsList": ["c1.com", "c2.com", "c3.com"], "nextPageSearchAfter": 1}"#,
        ),
        (200, r#"{"domainsCount": 1, "domainsList": ["c4.com"]}"#),
    ]);

    // Like `revwhoix -k acme | head -0`: the reader is gone before any output
    let mut child = revwhoix_process(home.path())
        .env("RW_ENDPOINT", &endpoint)
        .args(["-k", "acme"])
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn revwhoix");
    drop(child.stdout.take());

    let output = child.wait_with_output().unwrap();
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr);
    assert!(!stderr.contains("panicked"), "stderr: {}", stderr);

    // The second page is never requested once nothing can be printed
    assert_eq!(received.lock().unwrap().len(), 2);
}

#[test]
fn test_invalid_discovered_config_is_skipped() {
    let home = home_with_key("at_test_key");
    let (endpoint, received) = spawn_api(vec![(200, r#"{"domainsCount": 0}"#)]);
    fs::write(home.path().join("revwhoix.toml"), "[search\nmax_pages = \"many\"\n").unwrap();

    revwhoix(home.path())
        .env("RW_ENDPOINT", &endpoint)
        .args(["-k", "acme"])
        .assert()
        .success();

    assert_eq!(received.lock().unwrap().len(), 1);
}
