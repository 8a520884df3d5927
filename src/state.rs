//! Application state: read-only configuration and the shared backend client.
//!
//! Nothing here is mutated after startup, so handlers share it through an
//! `Arc` without locking.

use tracing::{info, instrument};

use crate::backend::BackendClient;
use crate::config::GatewayConfig;

#[derive(Clone)]
pub struct AppState {
  pub backend: BackendClient,
  pub config: GatewayConfig,
}

impl AppState {
  /// Build state from env: load config, then the backend client.
  #[instrument(level = "info", skip_all)]
  pub fn from_env() -> Result<Self, reqwest::Error> {
    Self::new(GatewayConfig::from_env())
  }

  pub fn new(config: GatewayConfig) -> Result<Self, reqwest::Error> {
    let backend = BackendClient::new(config.backend_base_url.clone(), config.connect_timeout)?;
    info!(
      target: "review_gateway",
      backend = %backend.base_url,
      cookie = %config.session_cookie_name,
      connect_timeout = ?config.connect_timeout,
      "Backend client ready"
    );
    Ok(Self { backend, config })
  }
}
