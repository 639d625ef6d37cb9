//! Runs the compiled binary against a temp project.

use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn event_pages(root: &Path, args: &[&str]) -> Output {
    event_pages_in(root, root, args)
}

fn event_pages_in(cwd: &Path, root: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_event-pages"))
        .current_dir(cwd)
        .arg("--root")
        .arg(root)
        .args(args)
        .env_remove("AIRTABLE_API_KEY")
        .env_remove("AIRTABLE_BASE_ID")
        .env_remove("AIRTABLE_TABLE_NAME")
        .output()
        .expect("failed to run event-pages")
}

fn project_with_template() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let template = event_pages(tmp.path(), &["gen-template"]);
    assert!(template.status.success());
    std::fs::write(tmp.path().join("template.html"), &template.stdout).unwrap();
    tmp
}

#[test]
fn build_from_records_file_twice() {
    let tmp = project_with_template();
    let records = tmp.path().join("records.json");
    std::fs::write(
        &records,
        r#"{"records": [{"id": "rec1", "fields": {"title": "Demo Talk"}}]}"#,
    )
    .unwrap();
    let records = records.to_str().unwrap();

    let first = event_pages(tmp.path(), &["build", "--records-file", records]);
    assert!(first.status.success(), "{}", String::from_utf8_lossy(&first.stderr));
    let stdout = String::from_utf8_lossy(&first.stdout);
    assert!(stdout.contains("001 Demo Talk"));
    assert!(stdout.contains("Generated 1 new page,"));
    assert!(tmp.path().join("events/demo-talk.html").exists());

    let second = event_pages(tmp.path(), &["build", "--records-file", records]);
    assert!(second.status.success());
    assert!(String::from_utf8_lossy(&second.stdout).contains("Generated 0 new pages"));
}

#[test]
fn missing_credentials_fail_without_output() {
    let tmp = project_with_template();
    let out = event_pages(tmp.path(), &[]);

    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("AIRTABLE_API_KEY"));
    assert!(!tmp.path().join("index.html").exists());
    assert!(!tmp.path().join("processed-records.json").exists());
}

/// Answer one list-records request with an empty table. Joining the handle
/// yields the request's header lines.
fn serve_empty_table() -> (String, std::thread::JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let base = format!("http://{}/v0", listener.local_addr().unwrap());
    let handle = std::thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        let mut reader = BufReader::new(stream);
        let mut lines = Vec::new();
        loop {
            let mut line = String::new();
            reader.read_line(&mut line).unwrap();
            if line == "\r\n" || line.is_empty() {
                break;
            }
            lines.push(line.trim_end().to_string());
        }
        let body = r#"{"records": []}"#;
        write!(
            reader.into_inner(),
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        )
        .unwrap();
        lines
    });
    (base, handle)
}

#[test]
fn dotenv_is_read_from_project_root() {
    let tmp = project_with_template();
    let elsewhere = TempDir::new().unwrap();
    let (base, server) = serve_empty_table();
    std::fs::write(
        tmp.path().join("event-pages.toml"),
        format!("[airtable]\napi_url = \"{base}\"\n"),
    )
    .unwrap();
    std::fs::write(
        tmp.path().join(".env"),
        "AIRTABLE_API_KEY=keyFromDotenv\nAIRTABLE_BASE_ID=appXYZ\nAIRTABLE_TABLE_NAME=Events\n",
    )
    .unwrap();

    let out = event_pages_in(elsewhere.path(), tmp.path(), &["build"]);
    let request = server.join().unwrap();

    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    assert!(request[0].starts_with("GET /v0/appXYZ/Events?"));
    assert!(
        request
            .iter()
            .any(|h| h.eq_ignore_ascii_case("authorization: Bearer keyFromDotenv"))
    );
    assert!(tmp.path().join("index.html").exists());
    assert!(!elsewhere.path().join("index.html").exists());
}

#[test]
fn index_command_on_empty_project() {
    let tmp = TempDir::new().unwrap();
    let out = event_pages(tmp.path(), &["index"]);

    assert!(out.status.success());
    assert!(String::from_utf8_lossy(&out.stdout).contains("(0 events)"));
    assert!(tmp.path().join("index.html").exists());
}

#[test]
fn gen_config_is_valid_toml() {
    let tmp = TempDir::new().unwrap();
    let out = event_pages(tmp.path(), &["gen-config"]);
    assert!(out.status.success());
    let text = String::from_utf8(out.stdout).unwrap();
    let _: toml::Value = toml::from_str(&text).expect("stock config must be valid TOML");
}
