//! Shared HTTP client construction for consistent timeout and TLS configuration.

use std::time::Duration;

use crate::error::LlmError;

/// Create the HTTP client shared by every adapter.
///
/// Config: 30s connect timeout, 60s request timeout, rustls TLS,
/// `assessor/{version}` user-agent, redirect limit 10. The extraction layer
/// applies its own, usually tighter, per-attempt deadline on top.
///
/// # Errors
///
/// Returns `LlmError::Http` if the TLS backend cannot be initialised.
pub fn default_client() -> Result<reqwest::Client, LlmError> {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(30))
        .timeout(Duration::from_secs(60))
        .user_agent(concat!("assessor/", env!("CARGO_PKG_VERSION")))
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
        .map_err(LlmError::Http)
}

/// Trim trailing slashes so endpoint paths can be appended verbatim.
pub(crate) fn normalize_base_url(mut base_url: String) -> String {
    while base_url.ends_with('/') {
        base_url.pop();
    }
    base_url
}
