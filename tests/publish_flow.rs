//! Integration tests for the publish pipeline.
//!
//! Most tests swap the network for a recording transport; the last one
//! points the real `ApiClient` at a one-shot local HTTP server and checks
//! the multipart request it sends.

use std::cell::RefCell;
use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use tempfile::TempDir;

use bjspm::api::{ApiClient, PackageTransport, UploadResponse};
use bjspm::error::{BjspmError, Result};
use bjspm::publish::{publish, UploadJob, ARCHIVE_FILE_NAME};
use bjspm::ui::{run_publish, Prompter};

// ============================================================
// Test doubles
// ============================================================

/// Records the archive it was handed and the entries inside it.
struct RecordingTransport {
    fail: bool,
    seen: RefCell<Option<(PathBuf, Vec<String>)>>,
}

impl RecordingTransport {
    fn succeeding() -> Self {
        Self {
            fail: false,
            seen: RefCell::new(None),
        }
    }

    fn failing() -> Self {
        Self {
            fail: true,
            seen: RefCell::new(None),
        }
    }

    fn archive_path(&self) -> PathBuf {
        self.seen.borrow().as_ref().expect("upload was attempted").0.clone()
    }

    fn entries(&self) -> Vec<String> {
        self.seen.borrow().as_ref().expect("upload was attempted").1.clone()
    }
}

impl PackageTransport for RecordingTransport {
    fn upload_package(&self, archive: &Path) -> Result<UploadResponse> {
        let zip = zip::ZipArchive::new(File::open(archive).unwrap()).unwrap();
        let mut names: Vec<String> = zip.file_names().map(String::from).collect();
        names.sort();
        *self.seen.borrow_mut() = Some((archive.to_path_buf(), names));

        if self.fail {
            return Err(BjspmError::io(
                "Failed to reach registry",
                archive,
                io::Error::new(io::ErrorKind::ConnectionRefused, "connection refused"),
            ));
        }
        Ok(UploadResponse {
            status: 200,
            body: r#"{"status":"ok"}"#.into(),
        })
    }
}

#[derive(Default)]
struct CapturingPrompter {
    messages: Vec<String>,
}

impl Prompter for CapturingPrompter {
    fn ask(&mut self, _prompt: &str) -> io::Result<String> {
        Err(io::Error::new(io::ErrorKind::Unsupported, "publish never asks"))
    }

    fn say(&mut self, message: &str) {
        self.messages.push(message.to_string());
    }
}

fn project_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("bjspackage.json"), "{}").unwrap();
    fs::write(dir.path().join("index.js"), "module.exports = 1;").unwrap();
    fs::create_dir(dir.path().join("src")).unwrap();
    fs::write(dir.path().join("src/lib.js"), "export {}").unwrap();
    dir
}

// ============================================================
// Pipeline
// ============================================================

#[test]
fn given_project_when_published_then_archive_sent_and_scratch_removed() {
    let dir = project_dir();
    let transport = RecordingTransport::succeeding();

    let report = publish(dir.path(), &transport).expect("publish succeeds");

    assert_eq!(report.response.status, 200);
    assert_eq!(report.files, 3);
    assert_eq!(
        transport.entries(),
        vec!["bjspackage.json", "index.js", "src/", "src/lib.js"]
    );
    let archive = transport.archive_path();
    assert_eq!(archive, report.archive_path);
    assert!(archive.ends_with(ARCHIVE_FILE_NAME));
    assert!(!archive.parent().unwrap().exists(), "scratch dir must be gone");
    assert!(!dir.path().join(ARCHIVE_FILE_NAME).exists());
}

#[test]
fn given_transmit_failure_then_error_returned_and_scratch_still_removed() {
    let dir = project_dir();
    let transport = RecordingTransport::failing();

    let err = publish(dir.path(), &transport).unwrap_err();

    assert!(err.to_string().contains("connection refused"), "got {err}");
    let archive = transport.archive_path();
    assert!(!archive.parent().unwrap().exists(), "scratch dir must be gone");
}

#[test]
fn given_archive_failure_then_nothing_is_sent() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("gone");
    let transport = RecordingTransport::succeeding();

    let err = publish(&missing, &transport).unwrap_err();

    assert!(matches!(err, BjspmError::Io { .. }), "got {err:?}");
    assert!(transport.seen.borrow().is_none());
}

#[test]
fn dropped_job_releases_scratch_dir() {
    let dir = project_dir();
    let job = UploadJob::new(dir.path()).unwrap();
    let scratch = job.scratch_dir().to_path_buf();
    assert!(scratch.is_dir());

    let _ = job.run(&RecordingTransport::failing());
    drop(job);

    assert!(!scratch.exists());
}

#[test]
fn run_publish_prints_archive_path_and_raw_response() {
    let dir = project_dir();
    let transport = RecordingTransport::succeeding();
    let mut prompter = CapturingPrompter::default();

    let report = run_publish(&mut prompter, dir.path(), &transport).unwrap();

    assert!(prompter
        .messages
        .iter()
        .any(|m| m.contains(&report.archive_path.display().to_string())));
    assert!(prompter.messages.iter().any(|m| m.contains("200")));
    assert!(prompter.messages.contains(&r#"{"status":"ok"}"#.to_string()));
}

#[test]
fn run_publish_names_the_package_from_its_manifest() {
    let dir = project_dir();
    fs::write(
        dir.path().join("bjspackage.json"),
        r#"{"name":"mypkg","version":"1.2.0","description":"","keywords":[""],"license":"MIT","username":"alice"}"#,
    )
    .unwrap();
    let mut prompter = CapturingPrompter::default();

    run_publish(&mut prompter, dir.path(), &RecordingTransport::succeeding()).unwrap();

    assert_eq!(prompter.messages.first().map(String::as_str), Some("Publishing mypkg 1.2.0"));
}

#[test]
fn run_publish_without_readable_manifest_still_uploads() {
    let dir = project_dir();
    let mut prompter = CapturingPrompter::default();

    run_publish(&mut prompter, dir.path(), &RecordingTransport::succeeding()).unwrap();

    assert!(!prompter.messages.iter().any(|m| m.starts_with("Publishing")));
}

// ============================================================
// ApiClient against a local server
// ============================================================

/// Accept one connection, read the whole request, answer `body`.
fn serve_once(status_line: &'static str, body: &'static str) -> (String, thread::JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}/api.php", listener.local_addr().unwrap());
    let handle = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        stream.set_read_timeout(Some(Duration::from_secs(10))).unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 8192];
        while !request_complete(&request) {
            let n = stream.read(&mut buf).unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }
        let response = format!(
            "HTTP/1.1 {status_line}\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        stream.write_all(response.as_bytes()).unwrap();
        String::from_utf8_lossy(&request).into_owned()
    });
    (url, handle)
}

fn request_complete(request: &[u8]) -> bool {
    let text = String::from_utf8_lossy(request);
    let Some(header_end) = text.find("\r\n\r\n") else {
        return false;
    };
    let headers = text[..header_end].to_ascii_lowercase();
    let body_len = request.len() - (header_end + 4);
    if let Some(line) = headers.lines().find(|l| l.starts_with("content-length:")) {
        let expected: usize = line["content-length:".len()..].trim().parse().unwrap();
        return body_len >= expected;
    }
    request.ends_with(b"0\r\n\r\n")
}

fn local_client(url: String) -> ApiClient {
    let client = reqwest::blocking::Client::builder().no_proxy().build().unwrap();
    ApiClient::with_client(client, url)
}

#[test]
fn api_client_posts_multipart_with_action_and_package() {
    let (url, server) = serve_once("200 OK", "uploaded");
    let dir = TempDir::new().unwrap();
    let archive = dir.path().join(ARCHIVE_FILE_NAME);
    fs::write(&archive, b"PK-not-really-a-zip").unwrap();

    let response = local_client(url).upload_package(&archive).unwrap();
    let request = server.join().unwrap();

    assert_eq!(
        response,
        UploadResponse {
            status: 200,
            body: "uploaded".into()
        }
    );
    assert!(request.starts_with("POST /api.php HTTP/1.1"));
    assert!(request.to_ascii_lowercase().contains("content-type: multipart/form-data"));
    assert!(request.contains("name=\"action\""));
    assert!(request.contains("UPLOAD_PACKAGE"));
    assert!(request.contains("name=\"package\"; filename=\"package.zip\""));
    assert!(request.contains("PK-not-really-a-zip"));
}

#[test]
fn api_client_returns_non_success_responses_unvalidated() {
    let (url, server) = serve_once("500 Internal Server Error", "boom");
    let dir = TempDir::new().unwrap();
    let archive = dir.path().join(ARCHIVE_FILE_NAME);
    fs::write(&archive, b"zip").unwrap();

    let response = local_client(url).upload_package(&archive).unwrap();
    server.join().unwrap();

    assert_eq!(response.status, 500);
    assert_eq!(response.body, "boom");
}

#[test]
fn api_client_reports_unreachable_endpoint_as_network_error() {
    // bind then drop to get a port nothing listens on
    let port = TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap().port();
    let dir = TempDir::new().unwrap();
    let archive = dir.path().join(ARCHIVE_FILE_NAME);
    fs::write(&archive, b"zip").unwrap();

    let err = local_client(format!("http://127.0.0.1:{port}/api.php"))
        .upload_package(&archive)
        .unwrap_err();

    assert!(matches!(err, BjspmError::Network(_)), "got {err:?}");
}
