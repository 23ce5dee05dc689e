//! HTTP front end: `tiny_http` listener, worker threads, CORS and static files.
//!
//! # Request handling
//!
//! | Method  | Path                         | Result                                  |
//! |---------|------------------------------|-----------------------------------------|
//! | OPTIONS | any                          | 204 preflight                           |
//! | POST    | `/api/{touchpad,mouse,...}`  | [`ApiService::handle`] as JSON          |
//! | other   | `/api/...` route             | 405                                     |
//! | GET     | anything else                | file from `static_dir`, or 404          |
//!
//! Every response carries `Access-Control-Allow-Origin: *`.
//!
//! # Threading
//!
//! `tiny_http` accepts connections on its own thread and queues requests.
//! [`HttpServer::serve`] starts `worker_threads` OS threads that pull from the
//! queue with a 200 ms timeout so they notice the shutdown flag promptly.  The
//! engine's delayed clicks run on the Tokio runtime, not on these threads.

use std::io::{Cursor, Read};
use std::net::SocketAddr;
use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::Context;
use tiny_http::{Header, Method, Request, Response, Server};
use tracing::{debug, error, info};

use crate::application::{ApiService, Route};
use crate::domain::messages::ApiResponse;

/// Largest accepted request body.
pub const MAX_BODY_BYTES: u64 = 64 * 1024;

const RECV_TIMEOUT: Duration = Duration::from_millis(200);

type HttpResponse = Response<Cursor<Vec<u8>>>;

/// A bound listener that has not started serving yet.
pub struct HttpServer {
    server: Arc<Server>,
    local_addr: SocketAddr,
    static_dir: Option<PathBuf>,
}

impl HttpServer {
    /// Binds the listener.  Port 0 picks a free port; see [`Self::local_addr`].
    ///
    /// # Errors
    ///
    /// Returns an error if the address is in use or cannot be bound.
    pub fn bind(addr: SocketAddr, static_dir: Option<PathBuf>) -> anyhow::Result<Self> {
        let server = Server::http(addr)
            .map_err(|e| anyhow::anyhow!("failed to bind HTTP listener on {addr}: {e}"))?;
        let local_addr = server.server_addr().to_ip().unwrap_or(addr);
        Ok(Self {
            server: Arc::new(server),
            local_addr,
            static_dir,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Serves requests until `running` is cleared.  Blocks the caller.
    ///
    /// # Errors
    ///
    /// Returns an error if a worker thread cannot be spawned or panics.
    pub fn serve(
        self,
        service: Arc<ApiService>,
        running: Arc<AtomicBool>,
        worker_threads: usize,
    ) -> anyhow::Result<()> {
        let workers = worker_threads.max(1);
        info!(addr = %self.local_addr, workers, "HTTP server listening");

        let mut handles = Vec::with_capacity(workers);
        for i in 0..workers {
            let server = Arc::clone(&self.server);
            let service = Arc::clone(&service);
            let running = Arc::clone(&running);
            let static_dir = self.static_dir.clone();
            let handle = thread::Builder::new()
                .name(format!("http-worker-{i}"))
                .spawn(move || worker_loop(&server, &service, static_dir.as_deref(), &running))
                .context("failed to spawn HTTP worker thread")?;
            handles.push(handle);
        }

        let mut panicked = 0;
        for handle in handles {
            if handle.join().is_err() {
                panicked += 1;
            }
        }
        if panicked > 0 {
            anyhow::bail!("{panicked} HTTP worker thread(s) panicked");
        }

        info!("HTTP server stopped");
        Ok(())
    }
}

fn worker_loop(
    server: &Server,
    service: &ApiService,
    static_dir: Option<&Path>,
    running: &AtomicBool,
) {
    while running.load(Ordering::Relaxed) {
        match server.recv_timeout(RECV_TIMEOUT) {
            Ok(Some(request)) => respond(request, service, static_dir),
            Ok(None) => {}
            Err(e) => {
                error!("failed to receive HTTP request: {e}");
                thread::sleep(RECV_TIMEOUT);
            }
        }
    }
}

fn respond(mut request: Request, service: &ApiService, static_dir: Option<&Path>) {
    let response = with_cors(route_request(&mut request, service, static_dir));
    if let Err(e) = request.respond(response) {
        debug!("client went away before the response was sent: {e}");
    }
}

fn route_request(
    request: &mut Request,
    service: &ApiService,
    static_dir: Option<&Path>,
) -> HttpResponse {
    let url = request.url().to_string();
    let method = request.method().clone();
    match (&method, Route::from_path(&url)) {
        (Method::Options, _) => preflight(),
        (Method::Post, Some(route)) => match read_body(request) {
            Ok(body) => json_response(&service.handle(route, &body)),
            Err(response) => response,
        },
        (_, Some(_)) => json_response(&ApiResponse::error(405, "method not allowed")),
        (Method::Get | Method::Head, None) => static_file(static_dir, &url),
        _ => not_found(),
    }
}

fn read_body(request: &mut Request) -> Result<Vec<u8>, HttpResponse> {
    let too_large = || {
        json_response(&ApiResponse::error(
            413,
            format!("request body exceeds {MAX_BODY_BYTES} bytes"),
        ))
    };

    if request
        .body_length()
        .is_some_and(|len| len as u64 > MAX_BODY_BYTES)
    {
        return Err(too_large());
    }

    let mut body = Vec::new();
    request
        .as_reader()
        .take(MAX_BODY_BYTES + 1)
        .read_to_end(&mut body)
        .map_err(|e| {
            json_response(&ApiResponse::error(
                400,
                format!("could not read request body: {e}"),
            ))
        })?;

    if body.len() as u64 > MAX_BODY_BYTES {
        return Err(too_large());
    }
    Ok(body)
}

// ── Responses ─────────────────────────────────────────────────────────────────

fn with_header(response: HttpResponse, name: &str, value: &str) -> HttpResponse {
    match Header::from_bytes(name.as_bytes(), value.as_bytes()) {
        Ok(header) => response.with_header(header),
        Err(()) => response,
    }
}

fn with_cors(response: HttpResponse) -> HttpResponse {
    with_header(response, "Access-Control-Allow-Origin", "*")
}

fn json_response(api: &ApiResponse) -> HttpResponse {
    let response = Response::from_string(api.to_json()).with_status_code(api.http_status);
    with_header(response, "Content-Type", "application/json")
}

fn preflight() -> HttpResponse {
    let response = Response::from_data(Vec::new()).with_status_code(204);
    let response = with_header(response, "Access-Control-Allow-Methods", "GET, POST, OPTIONS");
    let response = with_header(response, "Access-Control-Allow-Headers", "Content-Type");
    with_header(response, "Access-Control-Max-Age", "86400")
}

fn not_found() -> HttpResponse {
    Response::from_string("404 Not Found").with_status_code(404)
}

// ── Static files ──────────────────────────────────────────────────────────────

fn static_file(static_dir: Option<&Path>, url: &str) -> HttpResponse {
    let Some(path) = static_dir.and_then(|dir| resolve_static_path(dir, url)) else {
        return not_found();
    };
    match std::fs::read(&path) {
        Ok(content) => with_header(
            Response::from_data(content),
            "Content-Type",
            content_type(&path),
        ),
        Err(e) => {
            debug!("cannot read {}: {e}", path.display());
            not_found()
        }
    }
}

/// Maps a URL path to a file under `root`.
///
/// `/` and directories map to their `index.html`.  Returns `None` for paths
/// that would leave `root` or do not name an existing file.
fn resolve_static_path(root: &Path, url: &str) -> Option<PathBuf> {
    let path = url.split(['?', '#']).next().unwrap_or_default();
    let relative = path.trim_start_matches('/');
    if relative.contains('\\') {
        return None;
    }

    let relative = Path::new(relative);
    if !relative.components().all(|c| matches!(c, Component::Normal(_))) {
        return None;
    }

    let mut full = root.join(relative);
    if full.is_dir() {
        full.push("index.html");
    }
    full.is_file().then_some(full)
}

fn content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("html") => "text/html; charset=utf-8",
        Some("js") => "application/javascript",
        Some("css") => "text/css",
        Some("json") => "application/json",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("ico") => "image/x-icon",
        Some("webmanifest") => "application/manifest+json",
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        Some("txt") => "text/plain",
        _ => "application/octet-stream",
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
