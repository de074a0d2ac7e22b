//! Media endpoint tests against mocked Spotify and YouTube APIs.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, Response, StatusCode, header};
use axum_extra::extract::cookie::Cookie;
use tower::ServiceExt;
use wiremock::matchers::{
    body_string_contains, header as header_eq, method, path, query_param, query_param_is_missing,
};
use wiremock::{Mock, MockServer, Respond, ResponseTemplate};

use practice_deck::client::youtube::MAX_PLAYLIST_PAGES;
use practice_deck::config::Config;
use practice_deck::server::AppState;
use practice_deck::server::routes::create_router;

fn build_test_router(config: Config) -> axum::Router {
    create_router(Arc::new(AppState::new(config).unwrap()))
}

async fn body_json(response: Response<Body>) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

fn set_cookies(response: &Response<Body>) -> HashMap<String, Cookie<'static>> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| Cookie::parse_encoded(v.to_owned()).ok())
        .map(|c| (c.name().to_owned(), c))
        .collect()
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

fn get_with_cookies(uri: &str, cookies: &str) -> Request<Body> {
    Request::get(uri).header(header::COOKIE, cookies).body(Body::empty()).unwrap()
}

async fn mount_app_token(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/spotify/token"))
        .and(body_string_contains("grant_type=client_credentials"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "app-token",
            "token_type": "Bearer",
            "expires_in": 3600
        })))
        .expect(1)
        .mount(server)
        .await;
}

fn sample_track() -> serde_json::Value {
    serde_json::json!({
        "id": "4uLU6hMCjMI75M1A2tKUQC",
        "name": "Little Wing",
        "artists": [{"id": "776Uo845nYHJpNaStv1Ds4", "name": "Jimi Hendrix"}],
        "album": {
            "name": "Axis: Bold as Love",
            "images": [{"url": "https://i.scdn.co/image/640", "width": 640}]
        },
        "duration_ms": 145_000,
        "preview_url": null,
        "uri": "spotify:track:4uLU6hMCjMI75M1A2tKUQC"
    })
}

// ─── Spotify ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_spotify_search() {
    let mock_server = MockServer::start().await;
    mount_app_token(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/spotify/v1/search"))
        .and(query_param("q", "little wing"))
        .and(query_param("type", "track"))
        .and(query_param("limit", "5"))
        .and(header_eq("authorization", "Bearer app-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "tracks": {"items": [sample_track()], "total": 87}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let app = build_test_router(Config::for_testing(&mock_server.uri()));

    let response = app.oneshot(get("/api/spotify/search?q=little%20wing&limit=5")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["total"], 87);
    assert_eq!(json["tracks"][0]["name"], "Little Wing");
    assert_eq!(json["tracks"][0]["artists"][0], "Jimi Hendrix");
    assert_eq!(json["tracks"][0]["image_url"], "https://i.scdn.co/image/640");
}

#[tokio::test]
async fn test_spotify_requests_share_app_token() {
    let mock_server = MockServer::start().await;
    mount_app_token(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/spotify/v1/tracks/4uLU6hMCjMI75M1A2tKUQC"))
        .and(header_eq("authorization", "Bearer app-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sample_track()))
        .expect(2)
        .mount(&mock_server)
        .await;

    let app = build_test_router(Config::for_testing(&mock_server.uri()));

    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(get("/api/spotify/tracks/4uLU6hMCjMI75M1A2tKUQC"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["album"], "Axis: Bold as Love");
    }
}

#[tokio::test]
async fn test_spotify_search_validation() {
    let app = build_test_router(Config::for_testing("http://unused.localhost"));

    for uri in [
        "/api/spotify/search",
        "/api/spotify/search?q=%20%20",
        "/api/spotify/search?q=blues&limit=0",
        "/api/spotify/search?q=blues&limit=51",
    ] {
        let response = app.clone().oneshot(get(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
        assert!(body_json(response).await["error"].as_str().unwrap().starts_with("Invalid input"));
    }
}

#[tokio::test]
async fn test_spotify_track_id_validation() {
    let app = build_test_router(Config::for_testing("http://unused.localhost"));

    let response = app.oneshot(get("/api/spotify/tracks/not%20an%20id")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_spotify_upstream_failure_is_bad_gateway() {
    let mock_server = MockServer::start().await;
    mount_app_token(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/spotify/v1/search"))
        .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let app = build_test_router(Config::for_testing(&mock_server.uri()));

    let response = app.oneshot(get("/api/spotify/search?q=blues")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let json = body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("503"));
}

#[tokio::test]
async fn test_spotify_malformed_json_is_bad_gateway() {
    let mock_server = MockServer::start().await;
    mount_app_token(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/spotify/v1/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&mock_server)
        .await;

    let app = build_test_router(Config::for_testing(&mock_server.uri()));

    let response = app.oneshot(get("/api/spotify/search?q=blues")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_spotify_wrong_shape_is_not_cached() {
    let mock_server = MockServer::start().await;
    mount_app_token(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/spotify/v1/tracks/4uLU6hMCjMI75M1A2tKUQC"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": 5})))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/spotify/v1/tracks/4uLU6hMCjMI75M1A2tKUQC"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sample_track()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut config = Config::for_testing(&mock_server.uri());
    config.cache_ttl = Duration::from_secs(300);
    config.cache_max_size = 100;
    let app = build_test_router(config);

    let first =
        app.clone().oneshot(get("/api/spotify/tracks/4uLU6hMCjMI75M1A2tKUQC")).await.unwrap();
    assert_eq!(first.status(), StatusCode::BAD_GATEWAY);

    // Reaches Spotify again, then serves the good payload from cache.
    for _ in 0..2 {
        let response =
            app.clone().oneshot(get("/api/spotify/tracks/4uLU6hMCjMI75M1A2tKUQC")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["name"], "Little Wing");
    }
}

#[tokio::test]
async fn test_spotify_unknown_track_is_not_found() {
    let mock_server = MockServer::start().await;
    mount_app_token(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/spotify/v1/tracks/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "error": {"status": 404, "message": "Non existing id"}
        })))
        .mount(&mock_server)
        .await;

    let app = build_test_router(Config::for_testing(&mock_server.uri()));

    let response = app.oneshot(get("/api/spotify/tracks/missing")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_spotify_unconfigured() {
    let app = build_test_router(Config::default());

    let response = app.oneshot(get("/api/spotify/search?q=blues")).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(response).await["error"], "Spotify OAuth is not configured.");
}

// ─── YouTube ─────────────────────────────────────────────────────────────────

fn playlist(id: &str, title: &str, count: u32) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "snippet": {
            "title": title,
            "description": "",
            "thumbnails": {"medium": {"url": format!("https://i.ytimg.com/{id}.jpg")}}
        },
        "contentDetails": {"itemCount": count}
    })
}

#[tokio::test]
async fn test_youtube_playlists_require_session() {
    let app = build_test_router(Config::for_testing("http://unused.localhost"));

    let response = app.oneshot(get("/api/youtube/playlists")).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"], "Not authorized with YouTube.");
}

#[tokio::test]
async fn test_youtube_playlists_follow_pages() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/youtube/v3/playlists"))
        .and(query_param("mine", "true"))
        .and(query_param_is_missing("pageToken"))
        .and(header_eq("authorization", "Bearer user-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "items": [playlist("PL1", "Blues licks", 12)],
            "nextPageToken": "page-2"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/youtube/v3/playlists"))
        .and(query_param("pageToken", "page-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "items": [playlist("PL2", "Jazz comping", 4)]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let app = build_test_router(Config::for_testing(&mock_server.uri()));
    let far_future = chrono::Utc::now().timestamp_millis() + 3_600_000;

    let response = app
        .oneshot(get_with_cookies(
            "/api/youtube/playlists",
            &format!("yt_access_token=user-token; yt_token_expires_at={far_future}"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    // Token was fresh: no cookies rewritten.
    assert!(set_cookies(&response).is_empty());

    let json = body_json(response).await;
    let playlists = json["playlists"].as_array().unwrap();
    assert_eq!(playlists.len(), 2);
    assert_eq!(playlists[0]["title"], "Blues licks");
    assert_eq!(playlists[0]["item_count"], 12);
    assert_eq!(playlists[1]["id"], "PL2");
}

#[tokio::test]
async fn test_youtube_playlists_stop_on_repeated_page_token() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/youtube/v3/playlists"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "items": [playlist("PL1", "Loop", 1)],
            "nextPageToken": "same"
        })))
        .expect(2)
        .mount(&mock_server)
        .await;

    let app = build_test_router(Config::for_testing(&mock_server.uri()));

    let response = tokio::time::timeout(
        Duration::from_secs(5),
        app.oneshot(get_with_cookies("/api/youtube/playlists", "yt_access_token=user-token")),
    )
    .await
    .expect("listing should terminate")
    .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["playlists"].as_array().unwrap().len(), 2);
}

/// Hands out a fresh page token on every call.
struct EndlessPages {
    calls: AtomicUsize,
}

impl Respond for EndlessPages {
    fn respond(&self, _request: &wiremock::Request) -> ResponseTemplate {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "items": [playlist(&format!("PL{n}"), "Page", 1)],
            "nextPageToken": format!("page-{}", n + 1)
        }))
    }
}

#[tokio::test]
async fn test_youtube_playlists_page_count_is_capped() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/youtube/v3/playlists"))
        .respond_with(EndlessPages { calls: AtomicUsize::new(0) })
        .expect(MAX_PLAYLIST_PAGES as u64)
        .mount(&mock_server)
        .await;

    let app = build_test_router(Config::for_testing(&mock_server.uri()));

    let response = tokio::time::timeout(
        Duration::from_secs(10),
        app.oneshot(get_with_cookies("/api/youtube/playlists", "yt_access_token=user-token")),
    )
    .await
    .expect("listing should terminate")
    .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["playlists"].as_array().unwrap().len(), MAX_PLAYLIST_PAGES);
}

#[tokio::test]
async fn test_youtube_expired_token_is_refreshed() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/google/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("refresh_token=stored-refresh"))
        .and(body_string_contains("client_id=yt-client-id"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "fresh-token",
            "expires_in": 3599
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/youtube/v3/playlists"))
        .and(header_eq("authorization", "Bearer fresh-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"items": []})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let app = build_test_router(Config::for_testing(&mock_server.uri()));
    let past = chrono::Utc::now().timestamp_millis() - 1_000;

    let response = app
        .oneshot(get_with_cookies(
            "/api/youtube/playlists",
            &format!(
                "yt_access_token=stale-token; yt_refresh_token=stored-refresh; \
                 yt_token_expires_at={past}"
            ),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let cookies = set_cookies(&response);
    assert_eq!(cookies["yt_access_token"].value(), "fresh-token");
    let expires_at: i64 = cookies["yt_token_expires_at"].value().parse().unwrap();
    assert!(expires_at > past);
    // Refresh response had no refresh token: the stored one is kept.
    assert!(!cookies.contains_key("yt_refresh_token"));
}

#[tokio::test]
async fn test_youtube_refreshed_cookies_survive_api_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/google/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "fresh-token",
            "expires_in": 3599
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/youtube/v3/playlistItems"))
        .and(header_eq("authorization", "Bearer fresh-token"))
        .respond_with(ResponseTemplate::new(500).set_body_string("backend error"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let app = build_test_router(Config::for_testing(&mock_server.uri()));

    let response = app
        .oneshot(get_with_cookies("/api/youtube/playlists/PL1/items", "yt_refresh_token=stored"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let cookies = set_cookies(&response);
    assert_eq!(cookies["yt_access_token"].value(), "fresh-token");
    assert!(cookies.contains_key("yt_token_expires_at"));
}

#[tokio::test]
async fn test_youtube_refresh_failure_is_bad_gateway() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/google/token"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(serde_json::json!({"error": "invalid_grant"})),
        )
        .mount(&mock_server)
        .await;

    let app = build_test_router(Config::for_testing(&mock_server.uri()));

    let response = app
        .oneshot(get_with_cookies("/api/youtube/playlists", "yt_refresh_token=revoked"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_youtube_playlist_items() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/youtube/v3/playlistItems"))
        .and(query_param("playlistId", "PL1"))
        .and(query_param("pageToken", "next-1"))
        .and(header_eq("authorization", "Bearer user-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "items": [
                {
                    "snippet": {
                        "title": "Minor pentatonic box 1",
                        "position": 0,
                        "videoOwnerChannelTitle": "Guitar Lessons",
                        "resourceId": {"videoId": "dQw4w9WgXcQ"}
                    }
                },
                {"snippet": {"title": "Deleted video", "position": 1, "resourceId": {}}}
            ],
            "nextPageToken": "next-2"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let app = build_test_router(Config::for_testing(&mock_server.uri()));

    let response = app
        .oneshot(get_with_cookies(
            "/api/youtube/playlists/PL1/items?page_token=next-1",
            "yt_access_token=user-token",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let items = json["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["video_id"], "dQw4w9WgXcQ");
    assert_eq!(items[0]["channel_title"], "Guitar Lessons");
    assert_eq!(json["next_page_token"], "next-2");
}

#[tokio::test]
async fn test_youtube_expired_upstream_token_is_bad_gateway() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/youtube/v3/playlistItems"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "error": {"code": 401, "message": "Invalid Credentials"}
        })))
        .mount(&mock_server)
        .await;

    let app = build_test_router(Config::for_testing(&mock_server.uri()));

    let response = app
        .oneshot(get_with_cookies("/api/youtube/playlists/PL1/items", "yt_access_token=revoked"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}
