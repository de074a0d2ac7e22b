//! Router assembly.

use std::sync::Arc;

use axum::{
    Extension, Json, Router,
    response::IntoResponse,
    routing::{MethodRouter, get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::AppState;
use super::media;
use crate::oauth::Provider;
use crate::oauth::handlers::{handle_authorize, handle_callback, handle_logout, handle_status};

/// Create the HTTP router.
pub fn create_router(state: Arc<AppState>) -> Router {
    let mut router =
        Router::new().route("/", get(health_check)).route("/health", get(health_check));

    for provider in Provider::ALL {
        router = router.nest(&format!("/api/{}", provider.slug()), provider_routes(provider));
    }

    router.layer(CorsLayer::permissive()).layer(TraceLayer::new_for_http()).with_state(state)
}

/// OAuth routes for one provider plus the API routes it backs.
fn provider_routes(provider: Provider) -> Router<Arc<AppState>> {
    let logout: MethodRouter<Arc<AppState>> = if provider.descriptor().logout_via_get {
        post(handle_logout).get(handle_logout)
    } else {
        post(handle_logout)
    };

    let oauth = Router::new()
        .route("/auth", get(handle_authorize))
        .route("/callback", get(handle_callback))
        .route("/status", get(handle_status))
        .route("/logout", logout);

    let api = match provider {
        Provider::YouTube => Router::new()
            .route("/playlists", get(media::handle_youtube_playlists))
            .route("/playlists/{playlist_id}/items", get(media::handle_youtube_playlist_items)),
        Provider::Spotify => Router::new()
            .route("/search", get(media::handle_spotify_search))
            .route("/tracks/{track_id}", get(media::handle_spotify_track)),
    };

    oauth.merge(api).layer(Extension(provider))
}

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "practice-deck",
        "version": env!("CARGO_PKG_VERSION")
    }))
}
