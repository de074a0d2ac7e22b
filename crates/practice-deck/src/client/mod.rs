//! Outbound HTTP clients for the provider token and API endpoints.
//!
//! One pooled `reqwest` client is shared by all of them. Calls are made
//! once: a failed provider call fails the current request.

pub mod app_token;
pub mod spotify;
pub mod token;
pub mod youtube;

use reqwest::Client;

use crate::config::Config;
use crate::error::{ClientError, ClientResult};

pub use app_token::AppTokenCache;
pub use spotify::SpotifyClient;
pub use token::{TokenClient, TokenResponse};
pub use youtube::YouTubeClient;

/// Build the shared HTTP client.
///
/// # Errors
///
/// Returns error if HTTP client initialization fails.
pub fn build_http_client(config: &Config) -> anyhow::Result<Client> {
    let client = Client::builder()
        .user_agent(concat!("practice-deck/", env!("CARGO_PKG_VERSION")))
        .timeout(config.request_timeout)
        .connect_timeout(config.connect_timeout)
        .gzip(true)
        .build()?;
    Ok(client)
}

/// Turn a non-2xx response into [`ClientError::Upstream`], logging status and body.
pub(crate) async fn check_status(
    context: &'static str,
    response: reqwest::Response,
) -> ClientResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    tracing::error!(context, status = status.as_u16(), body = %body, "Provider request failed");
    Err(ClientError::upstream(context, status.as_u16(), body))
}

/// Check the status, then decode the body as JSON.
pub(crate) async fn read_json<T>(
    context: &'static str,
    response: reqwest::Response,
) -> ClientResult<T>
where
    T: serde::de::DeserializeOwned,
{
    let response = check_status(context, response).await?;
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|source| {
        tracing::error!(context, error = %source, "Provider returned malformed JSON");
        ClientError::InvalidResponse { context, source }
    })
}
