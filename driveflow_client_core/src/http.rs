//! Shared HTTP plumbing for the API clients

use crate::ClientConfig;
use crate::error::{ApiError, Error, Result};
use std::time::Duration;

/// Build the reqwest client both API clients run on.
pub(crate) fn build_client(config: &ClientConfig) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_seconds))
        .build()
        .map_err(Error::from)
}

/// Convert a non-success response into a classified [`ApiError`].
///
/// `resource` names what was being addressed so permission and not-found
/// failures point at the right identifier.
pub(crate) async fn ensure_success(
    response: reqwest::Response,
    resource: &str,
) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ApiError::from_status(status.as_u16(), resource, &body).into())
}
