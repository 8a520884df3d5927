//! Boundary error type. Every failure leaving a handler is one of these
//! variants and reaches the browser as `{"error": "..."}` plus a status code.

use axum::extract::rejection::{BytesRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::auth::MissingCredential;
use crate::backend::ForwardError;

pub const UNAUTHENTICATED_MESSAGE: &str = "認証が必要です";

#[derive(Debug, Error)]
pub enum GatewayError {
  /// No usable credential; the backend was never contacted.
  #[error("authentication required")]
  Unauthenticated,
  /// Inbound request rejected locally before forwarding.
  #[error("bad request: {0}")]
  BadRequest(String),
  /// Request unusable at the routing or extraction layer (unknown route,
  /// wrong method, undecodable path, unreadable or oversized body).
  #[error("request rejected with HTTP {status}: {message}")]
  RequestRejected { status: u16, message: String },
  /// Backend answered with a non-success status.
  #[error("backend rejected request with HTTP {status}")]
  BackendRejected { status: u16, body: String, fallback: String },
  /// Backend unreachable, malformed answer, or any other unexpected fault.
  #[error("transport failure: {message}")]
  TransportFailure { message: String, fallback: String },
}

/// Canonical user-facing failure. Only `error` is serialized; `status`
/// travels as the HTTP status code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorEnvelope {
  pub error: String,
  #[serde(skip)]
  pub status: u16,
}

impl From<MissingCredential> for GatewayError {
  fn from(_: MissingCredential) -> Self {
    GatewayError::Unauthenticated
  }
}

impl From<PathRejection> for GatewayError {
  fn from(rej: PathRejection) -> Self {
    GatewayError::rejected(rej.status(), rej.body_text())
  }
}

impl From<BytesRejection> for GatewayError {
  fn from(rej: BytesRejection) -> Self {
    GatewayError::rejected(rej.status(), rej.body_text())
  }
}

impl GatewayError {
  /// Routing/extraction failure with a user-facing message for its status.
  pub fn rejected(status: StatusCode, detail: String) -> Self {
    let message = match status.as_u16() {
      404 => "指定されたAPIは存在しません".to_string(),
      405 => "このメソッドは使用できません".to_string(),
      413 => "リクエストボディが大きすぎます".to_string(),
      _ => format!("リクエストの形式が不正です: {}", detail),
    };
    GatewayError::RequestRejected { status: status.as_u16(), message }
  }

  /// Attach the endpoint fallback (rejections) or the generic one (transport).
  pub fn from_forward(err: ForwardError, endpoint_fallback: &str, unexpected_fallback: &str) -> Self {
    match err {
      ForwardError::Rejected { status, body } => {
        GatewayError::BackendRejected { status, body, fallback: endpoint_fallback.to_string() }
      }
      ForwardError::Transport(message) => {
        GatewayError::TransportFailure { message, fallback: unexpected_fallback.to_string() }
      }
    }
  }

  /// Total mapping onto the canonical envelope.
  pub fn envelope(&self) -> ErrorEnvelope {
    match self {
      GatewayError::Unauthenticated => ErrorEnvelope { error: UNAUTHENTICATED_MESSAGE.into(), status: 401 },
      GatewayError::BadRequest(msg) => ErrorEnvelope { error: msg.clone(), status: 400 },
      GatewayError::RequestRejected { status, message } => ErrorEnvelope { error: message.clone(), status: *status },
      GatewayError::BackendRejected { status, body, fallback } => ErrorEnvelope {
        error: extract_error_message(body).unwrap_or_else(|| fallback.clone()),
        status: *status,
      },
      GatewayError::TransportFailure { message, fallback } => {
        let message = message.trim();
        ErrorEnvelope {
          error: if message.is_empty() { fallback.clone() } else { message.to_string() },
          status: 500,
        }
      }
    }
  }
}

impl IntoResponse for GatewayError {
  fn into_response(self) -> Response {
    match &self {
      GatewayError::Unauthenticated => info!(target: "auth", "Rejected request without credential"),
      GatewayError::BadRequest(msg) => info!(target: "review_gateway", %msg, "Rejected malformed request"),
      GatewayError::RequestRejected { status, message } => {
        info!(target: "review_gateway", status, %message, "Rejected request before forwarding")
      }
      GatewayError::BackendRejected { status, body, .. } => {
        warn!(target: "review_gateway", status, body_len = body.len(), "Backend rejection normalized")
      }
      GatewayError::TransportFailure { message, .. } => {
        error!(target: "review_gateway", %message, "Transport failure normalized")
      }
    }

    let envelope = self.envelope();
    let status = StatusCode::from_u16(envelope.status).unwrap_or(StatusCode::BAD_GATEWAY);
    (status, Json(envelope)).into_response()
  }
}

/// Pull a readable message out of a backend error body.
///
/// Recognized shapes: `{"detail": "..."}`, `{"detail": [{"msg": "..."}, ...]}`,
/// `{"detail": {"message": "..."}}`, `{"error": "..."}`, `{"error": {"message": "..."}}`
/// and `{"message": "..."}`.
pub fn extract_error_message(body: &str) -> Option<String> {
  #[derive(Deserialize)]
  struct Wrap {
    #[serde(default)] detail: Option<Value>,
    #[serde(default)] error: Option<Value>,
    #[serde(default)] message: Option<Value>,
  }

  let w = serde_json::from_str::<Wrap>(body).ok()?;
  [w.detail, w.error, w.message]
    .into_iter()
    .flatten()
    .find_map(|v| message_of(&v))
}

fn message_of(v: &Value) -> Option<String> {
  let msg = match v {
    Value::String(s) => s.trim().to_string(),
    Value::Array(items) => items
      .iter()
      .filter_map(|item| match item {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Object(o) => o.get("msg").or_else(|| o.get("message")).and_then(Value::as_str).map(|s| s.trim().to_string()),
        _ => None,
      })
      .filter(|s| !s.is_empty())
      .collect::<Vec<_>>()
      .join("\n"),
    Value::Object(o) => o.get("message").or_else(|| o.get("msg")).and_then(Value::as_str)?.trim().to_string(),
    _ => return None,
  };
  (!msg.is_empty()).then_some(msg)
}
