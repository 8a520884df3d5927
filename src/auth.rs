//! Credential resolution for inbound browser requests.
//!
//! Each endpoint declares a `CredentialPolicy`. Resolution only reads the
//! request headers; nothing is cached and nothing is ever synthesized.

use std::fmt;

use axum::http::{header, HeaderMap};
use thiserror::Error;
use tracing::debug;

/// Where an endpoint looks for the caller's credential.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CredentialPolicy {
  /// Catalog reads, no credential involved.
  Public,
  /// Session cookie only.
  Cookie,
  /// Session cookie, falling back to `Authorization: Bearer <token>`.
  CookieOrBearer,
  /// `Authorization` header required and forwarded as received.
  Header,
}

#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
  /// Bare token taken from the cookie or a Bearer header.
  Bearer(String),
  /// Full `Authorization` value, passed through unchanged.
  Verbatim(String),
}

impl Credential {
  /// Value for the outbound `Authorization` header.
  pub fn authorization_value(&self) -> String {
    match self {
      Credential::Bearer(token) => format!("Bearer {}", token),
      Credential::Verbatim(raw) => raw.clone(),
    }
  }
}

// Tokens must never reach the logs.
impl fmt::Debug for Credential {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Credential::Bearer(t) => write!(f, "Bearer(<{} bytes>)", t.len()),
      Credential::Verbatim(t) => write!(f, "Verbatim(<{} bytes>)", t.len()),
    }
  }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("no usable credential on request")]
pub struct MissingCredential;

/// Resolve the credential required by `policy`.
/// `Ok(None)` is only returned for `CredentialPolicy::Public`.
pub fn resolve(
  headers: &HeaderMap,
  policy: CredentialPolicy,
  cookie_name: &str,
) -> Result<Option<Credential>, MissingCredential> {
  let found = match policy {
    CredentialPolicy::Public => return Ok(None),
    CredentialPolicy::Cookie => session_cookie(headers, cookie_name).map(Credential::Bearer),
    CredentialPolicy::CookieOrBearer => session_cookie(headers, cookie_name)
      .or_else(|| bearer_token(headers))
      .map(Credential::Bearer),
    CredentialPolicy::Header => raw_authorization(headers).map(Credential::Verbatim),
  };
  debug!(target: "auth", ?policy, found = found.is_some(), "credential resolution");
  found.map(Some).ok_or(MissingCredential)
}

/// Value of the named cookie across all `Cookie` headers. Empty values count as absent.
pub fn session_cookie(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
  headers
    .get_all(header::COOKIE)
    .iter()
    .filter_map(|v| v.to_str().ok())
    .flat_map(|line| line.split(';'))
    .filter_map(|pair| {
      let (name, value) = pair.trim().split_once('=')?;
      (name.trim() == cookie_name).then(|| value.trim().trim_matches('"').to_string())
    })
    .find(|v| !v.is_empty())
}

/// Token of an `Authorization: Bearer <token>` header (scheme is case-insensitive).
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
  let raw = raw_authorization(headers)?;
  let (scheme, token) = raw.split_once(' ')?;
  let token = token.trim();
  (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then(|| token.to_string())
}

fn raw_authorization(headers: &HeaderMap) -> Option<String> {
  headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .map(str::trim)
    .filter(|v| !v.is_empty())
    .map(str::to_string)
}
