//! Core proxy steps shared by the HTTP handlers.
//!
//! A handler always runs them in the same order:
//!   1. `authorize`: resolve the credential (401 before anything else)
//!   2. read and check the inbound body, if the endpoint takes one
//!   3. `forward`: exactly one backend call
//!   4. optional post-processing of the success body
//!
//! Failures at any step are `GatewayError`s and leave through the normalizer.

use std::collections::HashMap;
use std::fmt::Display;

use axum::body::Bytes;
use axum::http::HeaderMap;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::auth::{self, Credential};
use crate::backend::{expand_path, BackendReply, ForwardRequest};
use crate::dashboard::{active_view, DashboardItemView};
use crate::domain::DashboardItem;
use crate::endpoints::Endpoint;
use crate::error::GatewayError;
use crate::state::AppState;
use crate::subjects::order_subjects;

/// Per-request inputs beyond the credential.
#[derive(Debug, Default)]
pub struct Call {
  params: Vec<String>,
  query: HashMap<String, String>,
  body: Option<Value>,
}

impl Call {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn param(mut self, value: impl Into<String>) -> Self {
    self.params.push(value.into());
    self
  }

  pub fn query(mut self, query: HashMap<String, String>) -> Self {
    self.query = query;
    self
  }

  pub fn body(mut self, body: Option<Value>) -> Self {
    self.body = body;
    self
  }
}

pub fn authorize(state: &AppState, ep: &Endpoint, headers: &HeaderMap) -> Result<Option<Credential>, GatewayError> {
  Ok(auth::resolve(headers, ep.policy, &state.config.session_cookie_name)?)
}

#[instrument(level = "info", skip(state, credential, call), fields(endpoint = ep.name))]
pub async fn forward(
  state: &AppState,
  ep: &Endpoint,
  credential: Option<Credential>,
  call: Call,
) -> Result<BackendReply, GatewayError> {
  let req = ForwardRequest {
    method: ep.method,
    path: expand_path(ep.backend_path, &call.params),
    query: declared_query(ep, &call.query),
    body: call.body,
    credential,
    no_store: ep.no_store,
  };
  let messages = &state.config.messages;
  state
    .backend
    .forward(req)
    .await
    .map_err(|e| GatewayError::from_forward(e, messages.get(ep.message), &messages.unexpected))
}

/// Inbound query parameters the endpoint declares, in declaration order.
/// Absent and empty values are left out.
pub fn declared_query(ep: &Endpoint, inbound: &HashMap<String, String>) -> Vec<(String, String)> {
  let dropped = inbound.keys().filter(|k| !ep.query.contains(&k.as_str())).count();
  if dropped > 0 {
    debug!(target: "review_gateway", endpoint = ep.name, dropped, "Ignoring undeclared query parameters");
  }
  ep.query
    .iter()
    .filter_map(|k| {
      let v = inbound.get(*k)?;
      (!v.is_empty()).then(|| (k.to_string(), v.clone()))
    })
    .collect()
}

/// Body for endpoints that accept an optional JSON payload.
pub fn optional_json(raw: &Bytes) -> Result<Option<Value>, GatewayError> {
  if raw.iter().all(u8::is_ascii_whitespace) {
    return Ok(None);
  }
  serde_json::from_slice(raw)
    .map(Some)
    .map_err(|e| GatewayError::BadRequest(format!("リクエストの形式が不正です: {}", e)))
}

/// Body for endpoints that cannot be called without a JSON payload.
pub fn required_json(raw: &Bytes) -> Result<Value, GatewayError> {
  optional_json(raw)?.ok_or_else(|| GatewayError::BadRequest("リクエストボディが必要です".into()))
}

/// A success body that could not be interpreted is a transport-class failure.
pub fn malformed(state: &AppState, err: impl Display) -> GatewayError {
  GatewayError::TransportFailure {
    message: err.to_string(),
    fallback: state.config.messages.unexpected.clone(),
  }
}

/// Subject listing: JSON array of names, returned in canonical order.
pub fn ordered_subject_listing(body: &Value) -> Result<Vec<String>, String> {
  let items = body.as_array().ok_or("科目一覧の形式が不正です")?;
  let names = items
    .iter()
    .map(|v| v.as_str().map(str::to_string))
    .collect::<Option<Vec<String>>>()
    .ok_or("科目一覧の形式が不正です")?;
  Ok(order_subjects(names))
}

/// Dashboard listing: JSON array of items, reduced to the active view.
pub fn dashboard_listing(body: &Value) -> Result<Vec<DashboardItemView>, serde_json::Error> {
  let items: Vec<DashboardItem> = serde_json::from_value(body.clone())?;
  Ok(active_view(items))
}
