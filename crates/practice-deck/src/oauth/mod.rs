//! OAuth 2.0 authorization-code flow against YouTube (Google) and Spotify.
//!
//! One generic set of handlers serves both providers; everything that
//! differs between them is a [`ProviderDescriptor`]. Sessions are carried
//! entirely in `HttpOnly` cookies:
//!
//! - `{prefix}_oauth_state` / `{prefix}_oauth_redirect`: one authorization
//!   attempt, 10 minutes
//! - `{prefix}_access_token`, `{prefix}_refresh_token`,
//!   `{prefix}_token_expires_at`: the signed-in session

pub mod cookies;
pub mod handlers;
pub mod provider;
pub mod redirect;
pub mod session;

pub use cookies::{CookieNames, CookieOptions, SessionTokens};
pub use provider::{Provider, ProviderDescriptor};
pub use redirect::sanitize_redirect;
