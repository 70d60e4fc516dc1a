pub mod commands;

use sorng_sharepoint::{SharePointConfig, SharePointError, SharePointResult, SharePointService};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

pub use commands::sp_invoke;
pub use sorng_sharepoint::SharePointServiceState;

/// Environment variable holding the pre-acquired Graph access token.
pub const ACCESS_TOKEN_ENV: &str = "SHAREPOINT_ACCESS_TOKEN";

/// Install the global subscriber. `RUST_LOG` drives the filter (default
/// `info`); `log` records from the library crates are bridged in.
/// Calling it twice is harmless.
pub fn init_logging() {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
  let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);

  let result = if cfg!(feature = "logs-json") {
    builder.json().try_init()
  } else {
    builder.try_init()
  };
  if result.is_ok() {
    tracing::debug!("logging initialised");
  }
}

/// Build the shared service from `SHAREPOINT_*` environment variables.
pub fn connect_from_env() -> SharePointResult<SharePointServiceState> {
  let token = std::env::var(ACCESS_TOKEN_ENV)
    .ok()
    .filter(|t| !t.trim().is_empty())
    .ok_or_else(|| SharePointError::internal(format!("{} is not set", ACCESS_TOKEN_ENV)))?;
  connect(SharePointConfig::from_env(), token.trim())
}

/// Build the shared service from explicit settings.
pub fn connect(config: SharePointConfig, access_token: &str) -> SharePointResult<SharePointServiceState> {
  let service = SharePointService::new(config, access_token)?;
  tracing::info!(base_url = %service.config().graph_base_url, "SharePoint connector ready");
  Ok(Arc::new(service))
}
