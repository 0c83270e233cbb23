/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Local Wikipedia REST passthrough proxy.
//!
//! Browsers cannot call the Wikipedia REST API directly from an explorer
//! page, so this server forwards `/api/wikipedia/<rest>` to the upstream
//! API and stamps permissive CORS plus a shared-cache policy onto every
//! response. The proxy is a dumb pipe: request bodies are not forwarded
//! and upstream payloads pass through byte-for-byte.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, anyhow};
use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::header::{
    ACCEPT, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN, CACHE_CONTROL, CONTENT_TYPE,
};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use log::{info, warn};
use tokio::net::TcpListener;

/// Route prefix stripped before forwarding.
pub const API_PREFIX: &str = "/api/wikipedia/";

/// Upstream REST API used when none is configured.
pub const DEFAULT_UPSTREAM: &str = "https://en.wikipedia.org/api/rest_v1";

/// Shared-cache policy stamped on every forwarded response.
const CACHE_POLICY: &str = "public, s-maxage=300, stale-while-revalidate=600";

const ALLOW_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";
const ALLOW_HEADERS: &str = "Content-Type, Authorization";
const USER_AGENT: &str = "WikiGraphExplorer/0.1 (graph explorer; rust)";

/// Proxy server configuration.
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    pub listen: SocketAddr,
    pub upstream: String,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from(([127, 0, 0, 1], 8080)),
            upstream: DEFAULT_UPSTREAM.to_string(),
        }
    }
}

struct ProxyState {
    client: reqwest::Client,
    upstream: String,
}

/// Run the proxy until the process is stopped.
pub async fn serve(config: ProxyConfig) -> anyhow::Result<()> {
    let client = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .context("proxy: failed to build http client")?;
    let state = Arc::new(ProxyState {
        client,
        upstream: config.upstream,
    });

    let listener = TcpListener::bind(config.listen)
        .await
        .with_context(|| format!("proxy: failed to bind {}", config.listen))?;
    let bound = listener
        .local_addr()
        .context("proxy: failed to read bound addr")?;
    info!("proxy: listening on http://{bound} -> {}", state.upstream);

    loop {
        let (stream, _peer) = listener
            .accept()
            .await
            .map_err(|e| anyhow!("proxy: accept failed: {e}"))?;
        let io = TokioIo::new(stream);
        let state = state.clone();

        tokio::spawn(async move {
            let service = service_fn(move |req| handle_request(req, state.clone()));
            if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                warn!("proxy: connection error: {e}");
            }
        });
    }
}

async fn handle_request(
    req: Request<Incoming>,
    state: Arc<ProxyState>,
) -> Result<Response<Full<Bytes>>, hyper::Error> {
    if req.method() == Method::OPTIONS {
        return Ok(preflight_response());
    }
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let query = req.uri().query().map(str::to_string);
    Ok(forward(&state, &method, &path, query.as_deref()).await)
}

async fn forward(
    state: &ProxyState,
    method: &Method,
    path: &str,
    query: Option<&str>,
) -> Response<Full<Bytes>> {
    let Some(rest) = path.strip_prefix(API_PREFIX) else {
        return json_error(StatusCode::NOT_FOUND, "not found");
    };
    let upstream_method = match *method {
        Method::GET => reqwest::Method::GET,
        Method::POST => reqwest::Method::POST,
        Method::PUT => reqwest::Method::PUT,
        Method::DELETE => reqwest::Method::DELETE,
        _ => return json_error(StatusCode::METHOD_NOT_ALLOWED, "method not allowed"),
    };

    let target = target_url(&state.upstream, rest, query);
    let upstream = state
        .client
        .request(upstream_method, &target)
        .header(ACCEPT.as_str(), "application/json")
        .send()
        .await;

    let response = match upstream {
        Ok(response) => response,
        Err(err) => {
            warn!("proxy: upstream request to {target} failed: {err}");
            return fetch_failed(&err.to_string());
        }
    };

    let status = StatusCode::from_u16(response.status().as_u16())
        .unwrap_or(StatusCode::BAD_GATEWAY);
    let content_type = response
        .headers()
        .get(CONTENT_TYPE.as_str())
        .and_then(|value| value.to_str().ok())
        .unwrap_or("application/json")
        .to_string();

    let body = match response.bytes().await {
        Ok(body) => body,
        Err(err) => {
            warn!("proxy: failed to read upstream body from {target}: {err}");
            return fetch_failed(&err.to_string());
        }
    };

    with_cors(Response::builder().status(status))
        .header(CONTENT_TYPE, content_type)
        .header(CACHE_CONTROL, CACHE_POLICY)
        .body(Full::new(body))
        .unwrap_or_else(|_| json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal error"))
}

/// `{upstream}/{rest}` with the original query string reattached.
fn target_url(upstream: &str, rest: &str, query: Option<&str>) -> String {
    let mut target = format!("{}/{rest}", upstream.trim_end_matches('/'));
    if let Some(query) = query {
        target.push('?');
        target.push_str(query);
    }
    target
}

fn with_cors(builder: hyper::http::response::Builder) -> hyper::http::response::Builder {
    builder
        .header(ACCESS_CONTROL_ALLOW_ORIGIN, "*")
        .header(ACCESS_CONTROL_ALLOW_METHODS, ALLOW_METHODS)
        .header(ACCESS_CONTROL_ALLOW_HEADERS, ALLOW_HEADERS)
}

fn preflight_response() -> Response<Full<Bytes>> {
    with_cors(Response::builder().status(StatusCode::OK))
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|_| Response::new(Full::new(Bytes::new())))
}

fn fetch_failed(details: &str) -> Response<Full<Bytes>> {
    let body = serde_json::json!({
        "error": "Failed to fetch from Wikipedia",
        "details": details,
    });
    json_body(StatusCode::INTERNAL_SERVER_ERROR, &body)
}

fn json_error(status: StatusCode, message: &str) -> Response<Full<Bytes>> {
    json_body(status, &serde_json::json!({ "error": message }))
}

fn json_body(status: StatusCode, value: &serde_json::Value) -> Response<Full<Bytes>> {
    let body = value.to_string();
    with_cors(Response::builder().status(status))
        .header(CONTENT_TYPE, "application/json")
        .body(Full::new(Bytes::from(body)))
        .unwrap_or_else(|_| {
            Response::new(Full::new(Bytes::from_static(b"{\"error\":\"internal\"}")))
        })
}
