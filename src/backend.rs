//! HTTP client for the review backend.
//!
//! One inbound request maps to exactly one outbound call: no retries and no
//! overall timeout (review generation can run long; callers cancel by
//! dropping the request). The outcome is a closed `Result` so the boundary
//! can map every failure without catch-alls.
//!
//! Calls log method, path, status, latency and body size, never the
//! credential or the body itself.

use std::time::{Duration, Instant};

use reqwest::header::{ACCEPT, AUTHORIZATION, CACHE_CONTROL, USER_AGENT};
use serde_json::Value;
use thiserror::Error;
use tracing::{error, info, instrument, warn};

use crate::auth::Credential;

const GATEWAY_USER_AGENT: &str = "review-gateway/0.1";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
  Get,
  Post,
  Delete,
}

impl Method {
  fn as_reqwest(self) -> reqwest::Method {
    match self {
      Method::Get => reqwest::Method::GET,
      Method::Post => reqwest::Method::POST,
      Method::Delete => reqwest::Method::DELETE,
    }
  }
}

/// Fully resolved outbound call.
#[derive(Debug, Clone)]
pub struct ForwardRequest {
  pub method: Method,
  pub path: String,
  pub query: Vec<(String, String)>,
  pub body: Option<Value>,
  pub credential: Option<Credential>,
  pub no_store: bool,
}

/// Successful backend answer: 2xx status and its JSON body (`Null` when empty).
#[derive(Debug, Clone, PartialEq)]
pub struct BackendReply {
  pub status: u16,
  pub body: Value,
}

#[derive(Debug, Error)]
pub enum ForwardError {
  /// Backend reachable but answered with a non-success status.
  #[error("backend returned HTTP {status}")]
  Rejected { status: u16, body: String },
  /// Backend unreachable or its answer unusable.
  #[error("{0}")]
  Transport(String),
}

#[derive(Clone)]
pub struct BackendClient {
  client: reqwest::Client,
  pub base_url: String,
}

impl BackendClient {
  pub fn new(base_url: impl Into<String>, connect_timeout: Option<Duration>) -> Result<Self, reqwest::Error> {
    // The backend is addressed directly; proxy env vars are not honored.
    let mut builder = reqwest::Client::builder().user_agent(GATEWAY_USER_AGENT).no_proxy();
    if let Some(t) = connect_timeout {
      builder = builder.connect_timeout(t);
    }
    let base_url = base_url.into().trim_end_matches('/').to_string();
    Ok(Self { client: builder.build()?, base_url })
  }

  pub fn url_for(&self, path: &str) -> String {
    format!("{}{}", self.base_url, path)
  }

  #[instrument(
    level = "info",
    target = "backend",
    skip(self, req),
    fields(method = ?req.method, path = %req.path, has_credential = req.credential.is_some(), no_store = req.no_store)
  )]
  pub async fn forward(&self, req: ForwardRequest) -> Result<BackendReply, ForwardError> {
    let url = self.url_for(&req.path);
    let mut builder = self
      .client
      .request(req.method.as_reqwest(), &url)
      .header(USER_AGENT, GATEWAY_USER_AGENT)
      .header(ACCEPT, "application/json");

    if !req.query.is_empty() {
      builder = builder.query(&req.query);
    }
    if let Some(cred) = &req.credential {
      builder = builder.header(AUTHORIZATION, cred.authorization_value());
    }
    if req.no_store {
      builder = builder.header(CACHE_CONTROL, "no-store");
    }
    if let Some(body) = &req.body {
      builder = builder.json(body);
    }

    let start = Instant::now();
    let res = builder.send().await.map_err(|e| {
      let e = e.without_url();
      error!(target: "backend", elapsed = ?start.elapsed(), error = %e, "Backend call failed");
      ForwardError::Transport(e.to_string())
    })?;

    let status = res.status();
    let text = res.text().await.map_err(|e| {
      let e = e.without_url();
      error!(target: "backend", status = status.as_u16(), error = %e, "Failed reading backend body");
      ForwardError::Transport(e.to_string())
    })?;
    let elapsed = start.elapsed();

    if !status.is_success() {
      warn!(target: "backend", status = status.as_u16(), ?elapsed, body_len = text.len(), "Backend rejected request");
      return Err(ForwardError::Rejected { status: status.as_u16(), body: text });
    }

    let body = parse_success_body(&text)?;
    info!(target: "backend", status = status.as_u16(), ?elapsed, body_len = text.len(), "Backend call succeeded");
    Ok(BackendReply { status: status.as_u16(), body })
  }
}

fn parse_success_body(text: &str) -> Result<Value, ForwardError> {
  if text.trim().is_empty() {
    return Ok(Value::Null);
  }
  serde_json::from_str(text).map_err(|e| ForwardError::Transport(format!("backend returned invalid JSON: {}", e)))
}

/// Substitute each `{}` in `template` with the next parameter, percent-encoded on its own.
/// Missing parameters leave the placeholder empty; extra ones are ignored.
pub fn expand_path(template: &str, params: &[String]) -> String {
  let mut out = String::with_capacity(template.len() + 16);
  let mut params = params.iter();
  let mut rest = template;
  while let Some(idx) = rest.find("{}") {
    out.push_str(&rest[..idx]);
    if let Some(p) = params.next() {
      out.push_str(&urlencoding::encode(p));
    }
    rest = &rest[idx + 2..];
  }
  out.push_str(rest);
  out
}
