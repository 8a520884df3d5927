//! Browser-facing response types. Success bodies from the backend pass
//! through as JSON; a few local endpoints have their own small DTOs.

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::Value;

use crate::backend::BackendReply;
use crate::endpoints::Endpoint;

/// Successful proxied answer: backend status, JSON body, optional `no-store`.
#[derive(Debug, Clone, PartialEq)]
pub struct ProxyResponse {
  pub status: u16,
  pub body: Value,
  pub no_store: bool,
}

impl ProxyResponse {
  /// Backend body as received.
  pub fn echo(reply: BackendReply, ep: &Endpoint) -> Self {
    Self { status: reply.status, body: reply.body, no_store: ep.no_store }
  }

  /// Backend status with a locally post-processed body.
  pub fn replaced(reply_status: u16, body: Value, ep: &Endpoint) -> Self {
    Self { status: reply_status, body, no_store: ep.no_store }
  }
}

impl IntoResponse for ProxyResponse {
  fn into_response(self) -> Response {
    let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::OK);
    let mut res = if status == StatusCode::NO_CONTENT {
      status.into_response()
    } else {
      (status, Json(self.body)).into_response()
    };
    if self.no_store {
      res.headers_mut().insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    }
    res
  }
}

#[derive(Serialize)]
pub struct HealthOut {
  pub ok: bool,
}

#[derive(Serialize)]
pub struct LogoutOut {
  pub ok: bool,
}

/// `Set-Cookie` value that expires the session cookie immediately.
pub fn expired_session_cookie(name: &str) -> String {
  format!("{}=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax", name)
}
