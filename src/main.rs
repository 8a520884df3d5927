//! Answer Review Gateway · browser-facing proxy for the legal-exam review backend
//!
//! - Axum HTTP API under /api/...
//! - Credential resolution (session cookie / Authorization header) per endpoint
//! - One backend call per request, failures normalized to {"error": "..."}
//! - Review envelope checks and canonical subject ordering
//!
//! Important env variables:
//!   PORT                          : u16 (default 3000)
//!   BACKEND_INTERNAL_URL          : private backend base URL (preferred)
//!   BACKEND_URL                   : public backend base URL (default "http://127.0.0.1:8000")
//!   BACKEND_CONNECT_TIMEOUT_SECS  : optional connect timeout; no overall timeout is applied
//!   SESSION_COOKIE_NAME           : session cookie carrying the bearer token (default "access_token")
//!   GATEWAY_CONFIG_PATH           : path to TOML config (fallback messages, cookie name)
//!   LOG_LEVEL                     : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT                    : "pretty" (default) or "json"

mod auth;
mod backend;
mod config;
mod dashboard;
mod domain;
mod endpoints;
mod error;
mod logic;
mod protocol;
mod review;
mod routes;
mod state;
mod subjects;
mod telemetry;

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  // Read-only state: config + shared backend client.
  let state = Arc::new(AppState::from_env()?);

  let app = build_router(state.clone());

  // Read port from env or default to 3000.
  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "review_gateway", %addr, "HTTP server listening");
  axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
  info!(target: "review_gateway", "HTTP server stopped");
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    warn!(target: "review_gateway", error = %e, "Failed to listen for shutdown signal");
    std::future::pending::<()>().await;
  }
  info!(target: "review_gateway", "Shutdown signal received");
}
