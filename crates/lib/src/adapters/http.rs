//! Outbound HTTP client shared by the provider adapters, the model backend, and the LINE channel.

use std::time::Duration;

/// Upper bound for one outbound request (connect, send, and body read).
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// reqwest client whose requests give up after `timeout`. A timed-out call maps to
/// [`ApiErrorKind::Network`](super::ApiErrorKind::Network).
pub fn http_client(timeout: Duration) -> reqwest::Client {
    match reqwest::Client::builder().timeout(timeout).build() {
        Ok(client) => client,
        Err(e) => {
            log::error!("http client with {:?} timeout unavailable: {}", timeout, e);
            reqwest::Client::new()
        }
    }
}
