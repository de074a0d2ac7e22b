//! Writing session cookies and keeping the access token fresh.

use axum_extra::extract::cookie::CookieJar;

use super::cookies::{CookieNames, CookieOptions, SESSION_COOKIE_MAX_AGE, SessionTokens};
use super::provider::Provider;
use crate::client::TokenResponse;
use crate::config::Environment;
use crate::error::{ApiResult, ClientError};
use crate::server::AppState;

/// Access tokens are refreshed this long before they expire.
pub const REFRESH_SKEW_MS: i64 = 60_000;

/// Store a token response as session cookies.
///
/// The refresh-token cookie is only written when the provider returned
/// one, so a refresh that omits it keeps the existing cookie.
#[must_use]
pub fn store_session(
    jar: CookieJar,
    provider: Provider,
    environment: Environment,
    tokens: &TokenResponse,
    now_ms: i64,
) -> CookieJar {
    let names = CookieNames::for_provider(provider);
    let access_opts = CookieOptions::new(environment, Some(tokens.lifetime_secs()));
    let session_opts = CookieOptions::new(environment, Some(SESSION_COOKIE_MAX_AGE));

    let mut jar = jar
        .add(access_opts.build(names.access_token, tokens.access_token.clone()))
        .add(session_opts.build(names.expires_at, tokens.expires_at_ms(now_ms).to_string()));
    if let Some(refresh) = tokens.refresh_token.as_ref().filter(|t| !t.is_empty()) {
        jar = jar.add(session_opts.build(names.refresh_token, refresh.clone()));
    }
    jar
}

/// A usable access token for `provider`, refreshing it when it is missing
/// or within [`REFRESH_SKEW_MS`] of expiry.
///
/// Returns the jar to send back, updated when a refresh happened.
pub async fn ensure_access_token(
    state: &AppState,
    provider: Provider,
    jar: CookieJar,
) -> ApiResult<(CookieJar, String)> {
    let session = SessionTokens::from_jar(provider, &jar);
    let now_ms = chrono::Utc::now().timestamp_millis();

    if let Some(token) = session.usable_access_token(now_ms, REFRESH_SKEW_MS) {
        return Ok((jar, token.to_owned()));
    }

    let Some(refresh_token) = session.refresh_token.as_deref() else {
        return Err(ClientError::MissingSession(provider.display_name()).into());
    };

    let refreshed = state
        .tokens
        .refresh(
            provider,
            provider.credentials(&state.config),
            provider.endpoints(&state.config),
            refresh_token,
        )
        .await?;
    tracing::info!(provider = %provider, "Refreshed user access token");

    let jar = store_session(jar, provider, state.config.environment, &refreshed, now_ms);
    Ok((jar, refreshed.access_token))
}
