//! Cookie names, attributes, and session cookie access.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use cookie::time::Duration;

use super::provider::Provider;
use crate::config::Environment;

/// Lifetime of the state and redirect cookies of one authorization attempt.
pub const AUTH_COOKIE_MAX_AGE: i64 = 600;

/// Lifetime of the refresh-token and expiry cookies (30 days).
pub const SESSION_COOKIE_MAX_AGE: i64 = 30 * 24 * 3600;

/// Attributes applied to every cookie this server sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CookieOptions {
    pub http_only: bool,
    pub same_site: SameSite,
    pub secure: bool,
    pub path: &'static str,
    pub max_age: Option<i64>,
}

impl CookieOptions {
    /// `HttpOnly; SameSite=Lax; Path=/`, `Secure` only in production.
    #[must_use]
    pub const fn new(environment: Environment, max_age: Option<i64>) -> Self {
        Self {
            http_only: true,
            same_site: SameSite::Lax,
            secure: environment.is_production(),
            path: "/",
            max_age,
        }
    }

    /// Build a cookie carrying these attributes.
    #[must_use]
    pub fn build(&self, name: String, value: String) -> Cookie<'static> {
        let mut builder = Cookie::build((name, value))
            .http_only(self.http_only)
            .same_site(self.same_site)
            .secure(self.secure)
            .path(self.path);
        if let Some(seconds) = self.max_age {
            builder = builder.max_age(Duration::seconds(seconds));
        }
        builder.build()
    }
}

/// Names of the cookies one provider uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieNames {
    pub state: String,
    pub redirect: String,
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: String,
}

impl CookieNames {
    #[must_use]
    pub fn for_provider(provider: Provider) -> Self {
        let prefix = provider.descriptor().cookie_prefix;
        Self {
            state: format!("{prefix}_oauth_state"),
            redirect: format!("{prefix}_oauth_redirect"),
            access_token: format!("{prefix}_access_token"),
            refresh_token: format!("{prefix}_refresh_token"),
            expires_at: format!("{prefix}_token_expires_at"),
        }
    }

    /// The three cookies that make up a signed-in session.
    #[must_use]
    pub fn session(&self) -> [&str; 3] {
        [self.access_token.as_str(), self.refresh_token.as_str(), self.expires_at.as_str()]
    }
}

/// Removal cookie matching the path the original was set with.
#[must_use]
pub fn removal(name: &str) -> Cookie<'static> {
    Cookie::build((name.to_owned(), "")).path("/").build()
}

fn non_empty_value(jar: &CookieJar, name: &str) -> Option<String> {
    jar.get(name).map(|c| c.value().to_owned()).filter(|v| !v.is_empty())
}

/// Session tokens as read from a request's cookies.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SessionTokens {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    /// Access token expiry, epoch milliseconds.
    pub expires_at: Option<i64>,
}

impl SessionTokens {
    #[must_use]
    pub fn from_jar(provider: Provider, jar: &CookieJar) -> Self {
        let names = CookieNames::for_provider(provider);
        Self {
            access_token: non_empty_value(jar, &names.access_token),
            refresh_token: non_empty_value(jar, &names.refresh_token),
            expires_at: non_empty_value(jar, &names.expires_at).and_then(|v| v.parse().ok()),
        }
    }

    /// A session exists when either token cookie is present.
    #[must_use]
    pub const fn is_authorized(&self) -> bool {
        self.access_token.is_some() || self.refresh_token.is_some()
    }

    /// The access token, if it has more than `skew_ms` of life left at `now_ms`.
    ///
    /// A missing expiry is treated as unknown and the token is used as is.
    #[must_use]
    pub fn usable_access_token(&self, now_ms: i64, skew_ms: i64) -> Option<&str> {
        let token = self.access_token.as_deref()?;
        match self.expires_at {
            Some(expires_at) if expires_at - skew_ms <= now_ms => None,
            _ => Some(token),
        }
    }
}

impl std::fmt::Debug for SessionTokens {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionTokens")
            .field("has_access_token", &self.access_token.is_some())
            .field("has_refresh_token", &self.refresh_token.is_some())
            .field("expires_at", &self.expires_at)
            .finish()
    }
}
