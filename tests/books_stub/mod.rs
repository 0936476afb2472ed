#![allow(dead_code)]

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use anyhow::Context as _;
use serde_json::Value;

const SERVICE_ACCOUNT_FIXTURE: &str = include_str!("../fixtures/service_account.json");

pub const STUB_TOKEN: &str = "stub-access-token";
pub const TOKEN_PATH: &str = "/token";
pub const VOLUMES_PATH: &str = "/books/v1/volumes";

#[derive(Debug, Clone)]
pub struct StubRequest {
    pub method: String,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub authorization: Option<String>,
    pub body: String,
}

impl StubRequest {
    pub fn query_value(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Answers `(status, json body)` for each request; requests are recorded in arrival order.
pub struct BooksStub {
    pub base_url: String,
    requests: Arc<Mutex<Vec<StubRequest>>>,
    shutdown_tx: Option<mpsc::Sender<()>>,
    handle: Option<thread::JoinHandle<()>>,
}

impl BooksStub {
    pub fn spawn<F>(handler: F) -> Self
    where
        F: Fn(&StubRequest) -> (u16, String) + Send + 'static,
    {
        let server = tiny_http::Server::http("127.0.0.1:0").expect("start books stub server");
        let addr = server.server_addr();
        let base_url = format!("http://{addr}");

        let requests = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&requests);
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

        let handle = thread::spawn(move || {
            loop {
                if shutdown_rx.try_recv().is_ok() {
                    break;
                }

                let mut request = match server.recv_timeout(Duration::from_millis(50)) {
                    Ok(Some(req)) => req,
                    Ok(None) => continue,
                    Err(_) => break,
                };

                let mut body = String::new();
                if request.as_reader().read_to_string(&mut body).is_err() {
                    let _ = request.respond(
                        tiny_http::Response::from_string("invalid request body")
                            .with_status_code(400),
                    );
                    continue;
                }

                let parsed = url::Url::parse(&format!("http://stub{}", request.url()))
                    .expect("parse stub request url");
                let stub_request = StubRequest {
                    method: request.method().to_string(),
                    path: parsed.path().to_owned(),
                    query: parsed
                        .query_pairs()
                        .map(|(k, v)| (k.into_owned(), v.into_owned()))
                        .collect(),
                    authorization: request
                        .headers()
                        .iter()
                        .find(|h| h.field.equiv("Authorization"))
                        .map(|h| h.value.as_str().to_owned()),
                    body,
                };

                let (status, response_body) = handler(&stub_request);
                recorded
                    .lock()
                    .expect("lock recorded requests")
                    .push(stub_request);

                let header =
                    tiny_http::Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..])
                        .expect("build header");
                let response = tiny_http::Response::from_string(response_body)
                    .with_status_code(status)
                    .with_header(header);
                let _ = request.respond(response);
            }
        });

        Self {
            base_url,
            requests,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        }
    }

    pub fn token_uri(&self) -> String {
        format!("{}{TOKEN_PATH}", self.base_url)
    }

    pub fn volumes_endpoint(&self) -> String {
        format!("{}{VOLUMES_PATH}", self.base_url)
    }

    pub fn requests(&self) -> Vec<StubRequest> {
        self.requests
            .lock()
            .expect("lock recorded requests")
            .clone()
    }

    pub fn requests_to(&self, path: &str) -> Vec<StubRequest> {
        self.requests()
            .into_iter()
            .filter(|req| req.path == path)
            .collect()
    }
}

impl Drop for BooksStub {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// Token endpoint that accepts any jwt-bearer grant with a non-empty assertion.
pub fn token_response(request: &StubRequest) -> (u16, String) {
    let form: Vec<(String, String)> = url::form_urlencoded::parse(request.body.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    let grant_ok = form.iter().any(|(k, v)| {
        k == "grant_type" && v == "urn:ietf:params:oauth:grant-type:jwt-bearer"
    });
    let assertion_ok = form.iter().any(|(k, v)| k == "assertion" && !v.is_empty());

    if request.method != "POST" || !grant_ok || !assertion_ok {
        return (
            400,
            serde_json::json!({
                "error": "invalid_request",
                "error_description": "expected jwt-bearer grant"
            })
            .to_string(),
        );
    }

    (
        200,
        serde_json::json!({
            "access_token": STUB_TOKEN,
            "expires_in": 3599,
            "token_type": "Bearer"
        })
        .to_string(),
    )
}

pub fn volumes_body(titles: &[&str]) -> String {
    let items = titles
        .iter()
        .enumerate()
        .map(|(idx, title)| {
            serde_json::json!({
                "kind": "books#volume",
                "id": format!("vol-{idx}"),
                "volumeInfo": {
                    "title": title,
                    "authors": ["Stub Author"],
                    "pageCount": 100 + idx,
                    "infoLink": "http://stub/info"
                }
            })
        })
        .collect::<Vec<_>>();

    serde_json::json!({
        "kind": "books#volumes",
        "totalItems": items.len(),
        "items": items,
    })
    .to_string()
}

/// Writes the fixture service account with `token_uri` pointed at `token_uri`.
pub fn write_credential_file(dir: &Path, token_uri: &str) -> anyhow::Result<PathBuf> {
    let mut value: Value =
        serde_json::from_str(SERVICE_ACCOUNT_FIXTURE).context("parse service account fixture")?;
    value["token_uri"] = Value::String(token_uri.to_owned());

    let path = dir.join("service_account.json");
    std::fs::write(&path, value.to_string())
        .with_context(|| format!("write credential file: {}", path.display()))?;
    Ok(path)
}

pub fn write_book_list(dir: &Path, contents: &str) -> anyhow::Result<PathBuf> {
    let path = dir.join("books.txt");
    std::fs::write(&path, contents)
        .with_context(|| format!("write book list: {}", path.display()))?;
    Ok(path)
}

/// In-memory log sink for `RunLog::from_writer`.
#[derive(Clone, Default)]
pub struct CapturedLog(Arc<Mutex<Vec<u8>>>);

impl Write for CapturedLog {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0
            .lock()
            .expect("lock captured log")
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl CapturedLog {
    pub fn run_log(&self) -> anyhow::Result<booklookup::logging::RunLog> {
        let sink = self.clone();
        booklookup::logging::RunLog::from_writer(move || sink.clone())
    }

    pub fn text(&self) -> String {
        let bytes = self.0.lock().expect("lock captured log").clone();
        String::from_utf8(bytes).expect("utf-8 log")
    }

    pub fn lines(&self) -> Vec<String> {
        self.text().lines().map(str::to_owned).collect()
    }
}
