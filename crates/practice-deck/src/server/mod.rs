//! HTTP server.
//!
//! Owns the shared [`AppState`] and serves the router built in [`routes`].

pub mod media;
pub mod routes;

use std::net::SocketAddr;
use std::sync::Arc;

use crate::client::{self, AppTokenCache, SpotifyClient, TokenClient, YouTubeClient};
use crate::config::Config;
use crate::oauth::Provider;

/// State shared by every handler.
pub struct AppState {
    pub config: Config,
    pub tokens: TokenClient,
    pub app_tokens: Arc<AppTokenCache>,
    pub spotify: SpotifyClient,
    pub youtube: YouTubeClient,
}

impl AppState {
    /// Build the provider clients from the configuration.
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let http = client::build_http_client(&config)?;
        let tokens = TokenClient::new(http.clone());
        let app_tokens = Arc::new(AppTokenCache::new(
            Provider::Spotify,
            tokens.clone(),
            config.spotify.clone(),
            config.spotify_endpoints.clone(),
        ));
        let spotify = SpotifyClient::new(http.clone(), &config, Arc::clone(&app_tokens));
        let youtube = YouTubeClient::new(http, &config);

        Ok(Self { config, tokens, app_tokens, spotify, youtube })
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState").field("config", &self.config).finish()
    }
}

/// practice-deck HTTP server.
#[derive(Debug)]
pub struct Server {
    state: Arc<AppState>,
}

impl Server {
    /// Create a new server.
    ///
    /// # Errors
    ///
    /// Returns error if the provider clients cannot be built.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        Ok(Self { state: Arc::new(AppState::new(config)?) })
    }

    /// Serve until Ctrl-C.
    ///
    /// # Errors
    ///
    /// Returns error on bind or server failure.
    pub async fn run(self, addr: SocketAddr) -> anyhow::Result<()> {
        for provider in Provider::ALL {
            let configured = provider.credentials(&self.state.config).is_configured();
            tracing::info!(provider = %provider, configured, "Provider status");
        }

        let router = routes::create_router(self.state);
        let listener = tokio::net::TcpListener::bind(addr).await?;

        tracing::info!("HTTP server listening on http://{}", addr);

        axum::serve(listener, router).with_graceful_shutdown(shutdown_signal()).await?;

        tracing::info!("HTTP server shut down");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Received shutdown signal");
}
