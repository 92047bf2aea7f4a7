use crate::error::{json_error_response, ErrorCode};
use crate::handler::{DescribeHandler, ScriptHandler, ScriptResponse};
use crate::listing;
use crate::paths::split_request_target;
use crate::pipeline::{Resolution, Resolver};
use http_body_util::combinators::BoxBody;
use http_body_util::{BodyExt, Empty, Full};
use hyper::body::{Bytes, Incoming};
use hyper::header::HeaderValue;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as AutoBuilder;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Header name for request ID
const X_REQUEST_ID: &str = "x-request-id";
/// Header naming the resolution outcome
const X_RESOLUTION: &str = "x-parkgate-resolution";

/// Maximum hostname length per DNS specification
const MAX_HOSTNAME_LEN: usize = 253;

const NOT_FOUND_PAGE: &str = "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>404 Not Found</title></head>\
<body><h1>404 Not Found</h1><p>The requested site or page could not be found.</p></body></html>";

const FORBIDDEN_PAGE: &str = "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>403 Forbidden</title></head>\
<body><h1>403 Forbidden</h1></body></html>";

type HttpResponse = Response<BoxBody<Bytes, hyper::Error>>;

struct Shared {
    resolver: Arc<Resolver>,
    handler: Arc<dyn ScriptHandler>,
}

/// HTTP front end that resolves every request and serves the outcome
pub struct ParkServer {
    bind_addr: SocketAddr,
    resolver: Arc<Resolver>,
    handler: Arc<dyn ScriptHandler>,
    shutdown_rx: watch::Receiver<bool>,
}

impl ParkServer {
    pub fn new(bind_addr: SocketAddr, resolver: Arc<Resolver>, shutdown_rx: watch::Receiver<bool>) -> Self {
        Self {
            bind_addr,
            resolver,
            handler: Arc::new(DescribeHandler),
            shutdown_rx,
        }
    }

    /// Replace the script handler (default: [`DescribeHandler`])
    pub fn with_handler(mut self, handler: Arc<dyn ScriptHandler>) -> Self {
        self.handler = handler;
        self
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let listener = TcpListener::bind(self.bind_addr).await?;
        self.serve(listener).await
    }

    /// Accept connections on an already bound listener until shutdown is signalled.
    pub async fn serve(self, listener: TcpListener) -> anyhow::Result<()> {
        let addr = listener.local_addr()?;
        info!(addr = %addr, drivers = self.resolver.registry().len(), "Server listening (HTTP/1.1 and HTTP/2)");

        let shared = Arc::new(Shared {
            resolver: self.resolver,
            handler: self.handler,
        });
        let mut shutdown_rx = self.shutdown_rx;

        loop {
            tokio::select! {
                result = listener.accept() => {
                    match result {
                        Ok((stream, addr)) => {
                            let shared = Arc::clone(&shared);
                            tokio::spawn(async move {
                                if let Err(e) = handle_connection(stream, addr, shared).await {
                                    debug!(addr = %addr, error = %e, "Connection error");
                                }
                            });
                        }
                        Err(e) => {
                            error!(error = %e, "Failed to accept connection");
                        }
                    }
                }
                _ = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        info!("Server shutting down");
                        break;
                    }
                }
            }
        }

        Ok(())
    }
}

async fn handle_connection(stream: TcpStream, addr: SocketAddr, shared: Arc<Shared>) -> anyhow::Result<()> {
    let io = TokioIo::new(stream);

    let service = service_fn(move |req: Request<Incoming>| {
        let shared = Arc::clone(&shared);
        async move { handle_request(req, shared, addr).await }
    });

    AutoBuilder::new(TokioExecutor::new())
        .http1()
        .preserve_header_case(true)
        .http2()
        .max_concurrent_streams(250)
        .serve_connection(io, service)
        .await
        .map_err(|e| anyhow::anyhow!("Connection error: {}", e))?;

    Ok(())
}

async fn handle_request(
    req: Request<Incoming>,
    shared: Arc<Shared>,
    client_addr: SocketAddr,
) -> Result<HttpResponse, hyper::Error> {
    let request_id = req
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .map(String::from)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let Some(host) = extract_host(&req) else {
        return Ok(with_request_id(
            json_error_response(ErrorCode::MissingHostHeader, "Missing or invalid Host header"),
            &request_id,
        ));
    };

    let method = req.method().clone();
    let target = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| "/".to_string());

    let resolver = Arc::clone(&shared.resolver);
    let resolved = {
        let (host, target, method) = (host.clone(), target.clone(), method.as_str().to_string());
        tokio::task::spawn_blocking(move || resolver.resolve(&host, &target, &method)).await
    };
    let resolution = match resolved {
        Ok(resolution) => resolution,
        Err(e) => {
            error!(request_id = %request_id, host = %host, error = %e, "Resolution task failed");
            return Ok(with_request_id(
                json_error_response(ErrorCode::InternalError, "Failed to resolve request"),
                &request_id,
            ));
        }
    };

    let kind = resolution.kind();
    debug!(request_id = %request_id, client = %client_addr, host = %host, method = %method, target = %target, resolution = kind, "Request resolved");

    let response = match resolution {
        Resolution::Static(path) => serve_file(&path, &method).await,
        Resolution::Script { path, context } => {
            let handler = Arc::clone(&shared.handler);
            let executed = tokio::task::spawn_blocking(move || handler.handle(&path, &context)).await;
            match executed {
                Ok(Ok(response)) => script_response(response),
                Ok(Err(e)) => {
                    warn!(request_id = %request_id, host = %host, error = %e, "Script handler failed");
                    json_error_response(ErrorCode::ScriptFailed, "Script handler failed")
                }
                Err(e) => {
                    error!(request_id = %request_id, host = %host, error = %e, "Script task failed");
                    json_error_response(ErrorCode::InternalError, "Script task failed")
                }
            }
        }
        Resolution::Redirect(location) => redirect(&location),
        Resolution::Forbidden => html_response(StatusCode::FORBIDDEN, FORBIDDEN_PAGE),
        Resolution::NotFound => not_found(),
        Resolution::DirectoryListing(dir) => {
            let (uri, _) = split_request_target(&target);
            serve_listing(&dir, &uri, &method).await
        }
    };

    let mut response = with_request_id(response, &request_id);
    response
        .headers_mut()
        .insert(X_RESOLUTION, HeaderValue::from_static(kind));
    Ok(response)
}

/// Host header (port kept), validated to contain only hostname characters.
///
/// HTTP/2 requests carry the authority in the URI instead of a Host header.
fn extract_host(req: &Request<Incoming>) -> Option<String> {
    let host = req
        .headers()
        .get(hyper::header::HOST)
        .and_then(|h| h.to_str().ok())
        .map(String::from)
        .or_else(|| req.uri().authority().map(|a| a.as_str().to_string()))?;

    let hostname = crate::hostname::strip_port(&host);
    if hostname.is_empty() || hostname.len() > MAX_HOSTNAME_LEN {
        return None;
    }

    // Alphanumeric, hyphen, underscore and dot only; keeps control characters out of logs
    if !hostname
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
    {
        return None;
    }

    Some(host.to_lowercase())
}

fn full_body(body: impl Into<Bytes>) -> BoxBody<Bytes, hyper::Error> {
    Full::new(body.into()).map_err(|never| match never {}).boxed()
}

fn empty_body() -> BoxBody<Bytes, hyper::Error> {
    Empty::<Bytes>::new().map_err(|never| match never {}).boxed()
}

fn with_request_id(mut response: HttpResponse, request_id: &str) -> HttpResponse {
    if let Ok(value) = HeaderValue::from_str(request_id) {
        response.headers_mut().insert(X_REQUEST_ID, value);
    }
    response
}

fn html_response(status: StatusCode, html: &'static str) -> HttpResponse {
    Response::builder()
        .status(status)
        .header(hyper::header::CONTENT_TYPE, "text/html; charset=utf-8")
        .body(full_body(html))
        .expect("valid response builder")
}

fn not_found() -> HttpResponse {
    html_response(StatusCode::NOT_FOUND, NOT_FOUND_PAGE)
}

fn redirect(location: &str) -> HttpResponse {
    let Ok(location) = HeaderValue::from_str(location) else {
        return not_found();
    };
    Response::builder()
        .status(StatusCode::MOVED_PERMANENTLY)
        .header(hyper::header::LOCATION, location)
        .header(hyper::header::CONTENT_TYPE, "text/plain")
        .body(full_body("Redirecting"))
        .expect("valid response builder")
}

fn allows_read(method: &Method) -> bool {
    method == Method::GET || method == Method::HEAD
}

/// Stream a file with a guessed content type. A file that vanished since resolution
/// is a 404.
async fn serve_file(path: &Path, method: &Method) -> HttpResponse {
    if !allows_read(method) {
        return json_error_response(ErrorCode::MethodNotAllowed, "Static files only answer GET and HEAD");
    }

    let body = match tokio::fs::read(path).await {
        Ok(body) => body,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "Static file could not be read");
            return not_found();
        }
    };

    let mime = mime_guess::from_path(path).first_or_octet_stream();
    let builder = Response::builder()
        .status(StatusCode::OK)
        .header(hyper::header::CONTENT_TYPE, mime.as_ref())
        .header(hyper::header::CONTENT_LENGTH, body.len());

    let body = if method == Method::HEAD {
        empty_body()
    } else {
        full_body(body)
    };
    builder.body(body).expect("valid response builder")
}

async fn serve_listing(dir: &Path, uri: &str, method: &Method) -> HttpResponse {
    if !allows_read(method) {
        return json_error_response(ErrorCode::MethodNotAllowed, "Directory listings only answer GET and HEAD");
    }

    match listing::render(dir, uri).await {
        Ok(html) => Response::builder()
            .status(StatusCode::OK)
            .header(hyper::header::CONTENT_TYPE, "text/html; charset=utf-8")
            .body(if method == Method::HEAD { empty_body() } else { full_body(html) })
            .expect("valid response builder"),
        Err(e) => {
            debug!(dir = %dir.display(), error = %e, "Directory listing failed");
            not_found()
        }
    }
}

fn script_response(script: ScriptResponse) -> HttpResponse {
    let mut response = Response::builder().status(script.status);
    for (name, value) in &script.headers {
        if let Ok(value) = HeaderValue::from_str(value) {
            response = response.header(name.as_str(), value);
        }
    }
    response
        .body(full_body(script.body))
        .unwrap_or_else(|e| {
            warn!(error = %e, "Script handler produced an invalid response");
            json_error_response(ErrorCode::ScriptFailed, "Script handler produced an invalid response")
        })
}
