//! practice-deck server
//!
//! Backend for a personal guitar-practice media manager. The browser UI
//! organizes local recordings, YouTube videos and Spotify tracks; this
//! crate signs the user in to YouTube (Google) and Spotify and proxies the
//! provider APIs the UI needs.
//!
//! # Features
//!
//! - **OAuth per provider**: `/api/{youtube,spotify}/{auth,callback,status,logout}`
//!   driven by one generic set of handlers
//! - **Cookie sessions**: state, redirect and token cookies, `HttpOnly` and
//!   `SameSite=Lax`, `Secure` in production
//! - **Same-origin redirects**: post-login targets are reduced to relative paths
//! - **Spotify app token**: cached, refreshed once for all concurrent callers
//!
//! # Example
//!
//! ```no_run
//! use practice_deck::{config::Config, server::Server};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     Server::new(config)?.run(([127, 0, 0, 1], 3000).into()).await
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod oauth;
pub mod server;

pub use config::Config;
pub use error::{ApiError, ClientError};
pub use server::{AppState, Server};
