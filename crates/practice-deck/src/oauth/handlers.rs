//! OAuth endpoint handlers, shared by every provider.
//!
//! Mounted under `/api/{provider}` with the [`Provider`] supplied as a
//! request extension:
//! - `GET  /auth`: start an authorization attempt
//! - `GET  /callback`: finish it and store the session
//! - `GET  /status`: configured / authorized flags
//! - `POST /logout` (YouTube also `GET`): clear the session

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use url::Url;

use super::cookies::{AUTH_COOKIE_MAX_AGE, CookieNames, CookieOptions, SessionTokens, removal};
use super::provider::Provider;
use super::redirect::{
    choose_redirect_target, request_base_url, sanitize_redirect, with_query_param,
};
use super::session::store_session;
use crate::config::{OAuthCredentials, ProviderEndpoints};
use crate::error::ClientError;
use crate::server::AppState;

/// Query parameter appended to the post-login target when the flow fails.
pub const AUTH_ERROR_PARAM: &str = "auth_error";

/// Callback URL registered with the provider: the configured override, or
/// `<base>/api/<slug>/callback`.
#[must_use]
pub fn effective_redirect_uri(
    provider: Provider,
    credentials: &OAuthCredentials,
    base_url: &str,
) -> String {
    credentials
        .redirect_uri
        .clone()
        .unwrap_or_else(|| format!("{}{}", base_url, provider.callback_path()))
}

/// Consent screen URL for one authorization attempt.
///
/// # Errors
///
/// Returns error if the configured authorize URL is not a valid URL.
pub fn authorization_url(
    provider: Provider,
    endpoints: &ProviderEndpoints,
    client_id: &str,
    redirect_uri: &str,
    state: &str,
) -> Result<Url, url::ParseError> {
    let descriptor = provider.descriptor();
    let mut url = Url::parse(&endpoints.authorize_url)?;
    {
        let mut query = url.query_pairs_mut();
        query
            .append_pair("client_id", client_id)
            .append_pair("redirect_uri", redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("scope", &descriptor.scopes.join(" "));
        for (key, value) in descriptor.extra_auth_params {
            query.append_pair(key, value);
        }
        query.append_pair("state", state);
    }
    Ok(url)
}

fn not_configured(provider: Provider) -> Response {
    let error = ClientError::NotConfigured(provider.display_name());
    tracing::warn!(provider = %provider, "OAuth requested but provider is not configured");
    (StatusCode::INTERNAL_SERVER_ERROR, Json(serde_json::json!({ "error": error.to_string() })))
        .into_response()
}

fn found(jar: CookieJar, location: String) -> Response {
    (StatusCode::FOUND, jar, [(header::LOCATION, location)]).into_response()
}

fn referer(headers: &HeaderMap) -> Option<&str> {
    headers.get(header::REFERER).and_then(|v| v.to_str().ok())
}

// ─── Authorize ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AuthorizeQuery {
    pub redirect: Option<String>,
}

/// `GET /api/{provider}/auth`
///
/// Sets the state and redirect cookies and sends the browser to the
/// provider's consent screen.
pub async fn handle_authorize(
    State(state): State<Arc<AppState>>,
    Extension(provider): Extension<Provider>,
    Query(query): Query<AuthorizeQuery>,
    headers: HeaderMap,
    jar: CookieJar,
) -> Response {
    let credentials = provider.credentials(&state.config);
    let Some(client_id) = credentials.client_id.as_deref().filter(|_| credentials.is_configured())
    else {
        return not_configured(provider);
    };

    let base_url = request_base_url(&headers);
    let redirect_uri = effective_redirect_uri(provider, credentials, &base_url);
    let oauth_state = uuid::Uuid::new_v4().to_string();
    let target = choose_redirect_target(
        query.redirect.as_deref(),
        referer(&headers),
        &base_url,
        provider.descriptor().default_redirect,
    );

    let auth_url = match authorization_url(
        provider,
        provider.endpoints(&state.config),
        client_id,
        &redirect_uri,
        &oauth_state,
    ) {
        Ok(url) => url,
        Err(e) => {
            tracing::error!(provider = %provider, error = %e, "Invalid authorize URL");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": "Invalid authorization endpoint." })),
            )
                .into_response();
        }
    };

    let names = CookieNames::for_provider(provider);
    let opts = CookieOptions::new(state.config.environment, Some(AUTH_COOKIE_MAX_AGE));
    let jar = jar.add(opts.build(names.state, oauth_state)).add(opts.build(names.redirect, target));

    tracing::info!(provider = %provider, redirect_uri = %redirect_uri, "Starting authorization");

    found(jar, auth_url.into())
}

// ─── Callback ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

/// `GET /api/{provider}/callback`
///
/// Validates the state cookie, exchanges the code and stores the session.
/// Every outcome clears the attempt's cookies; failures land on the
/// post-login target with `auth_error` set.
pub async fn handle_callback(
    State(state): State<Arc<AppState>>,
    Extension(provider): Extension<Provider>,
    Query(query): Query<CallbackQuery>,
    headers: HeaderMap,
    jar: CookieJar,
) -> Response {
    let names = CookieNames::for_provider(provider);
    let base_url = request_base_url(&headers);

    let stored_state = jar.get(&names.state).map(|c| c.value().to_owned());
    let target = jar
        .get(&names.redirect)
        .and_then(|c| sanitize_redirect(c.value(), &base_url))
        .unwrap_or_else(|| provider.descriptor().default_redirect.to_string());
    let jar = jar.remove(removal(&names.state)).remove(removal(&names.redirect));

    let credentials = provider.credentials(&state.config);
    if !credentials.is_configured() {
        return (jar, not_configured(provider)).into_response();
    }

    let fail = |jar: CookieJar, reason: &str| {
        tracing::warn!(provider = %provider, reason, "Authorization failed");
        found(jar, with_query_param(&target, AUTH_ERROR_PARAM, reason))
    };

    if let Some(error) = query.error.as_deref() {
        return fail(jar, error);
    }

    let state_matches = match (stored_state.as_deref(), query.state.as_deref()) {
        (Some(expected), Some(returned)) if !expected.is_empty() => {
            bool::from(expected.as_bytes().ct_eq(returned.as_bytes()))
        }
        _ => false,
    };
    if !state_matches {
        return fail(jar, "state_mismatch");
    }

    let Some(code) = query.code.as_deref().filter(|c| !c.is_empty()) else {
        return fail(jar, "missing_code");
    };

    let redirect_uri = effective_redirect_uri(provider, credentials, &base_url);
    let endpoints = provider.endpoints(&state.config);
    let tokens = match state
        .tokens
        .exchange_code(provider, credentials, endpoints, code, &redirect_uri)
        .await
    {
        Ok(tokens) => tokens,
        Err(e) => {
            tracing::error!(provider = %provider, error = %e, "Code exchange failed");
            return fail(jar, "token_exchange_failed");
        }
    };

    let now_ms = chrono::Utc::now().timestamp_millis();
    let jar = store_session(jar, provider, state.config.environment, &tokens, now_ms);

    tracing::info!(provider = %provider, "Authorization complete");

    found(jar, target)
}

// ─── Status ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub configured: bool,
    pub authorized: bool,
}

/// `GET /api/{provider}/status`
pub async fn handle_status(
    State(state): State<Arc<AppState>>,
    Extension(provider): Extension<Provider>,
    jar: CookieJar,
) -> Json<StatusResponse> {
    Json(StatusResponse {
        configured: provider.credentials(&state.config).is_configured(),
        authorized: SessionTokens::from_jar(provider, &jar).is_authorized(),
    })
}

// ─── Logout ──────────────────────────────────────────────────────────────────

/// `POST /api/{provider}/logout`
///
/// Clears the session cookies. Succeeds whether or not a session exists.
pub async fn handle_logout(
    Extension(provider): Extension<Provider>,
    jar: CookieJar,
) -> (CookieJar, Json<serde_json::Value>) {
    let names = CookieNames::for_provider(provider);
    let jar = names.session().into_iter().fold(jar, |jar, name| jar.remove(removal(name)));

    tracing::info!(provider = %provider, "Logged out");

    (jar, Json(serde_json::json!({ "ok": true })))
}
