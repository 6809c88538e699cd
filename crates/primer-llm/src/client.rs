use std::time::Duration;

use reqwest::Client;

/// Builds the HTTP client shared by a provider.
///
/// Without a timeout a hung upstream call blocks its caller indefinitely.
pub fn build_client(timeout: Option<Duration>) -> Client {
    let mut builder = Client::builder();
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }

    builder.build().unwrap_or_else(|e| {
        log::warn!("Failed to build configured HTTP client, using defaults: {}", e);
        Client::new()
    })
}
