//! Base URL derivation and same-origin redirect sanitization.

use axum::http::{HeaderMap, HeaderName, header};
use url::Url;

const X_FORWARDED_PROTO: HeaderName = HeaderName::from_static("x-forwarded-proto");
const X_FORWARDED_HOST: HeaderName = HeaderName::from_static("x-forwarded-host");

fn first_header_value(headers: &HeaderMap, name: &HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToOwned::to_owned)
}

/// Public origin of the application as seen by the browser.
///
/// Reverse-proxy headers win over the request's own `Host`. The server
/// itself only speaks plain HTTP, so `http` is the scheme without a proxy.
#[must_use]
pub fn request_base_url(headers: &HeaderMap) -> String {
    let proto = first_header_value(headers, &X_FORWARDED_PROTO)
        .filter(|p| p.eq_ignore_ascii_case("http") || p.eq_ignore_ascii_case("https"))
        .map(|p| p.to_ascii_lowercase())
        .unwrap_or_else(|| "http".to_string());
    let host = first_header_value(headers, &X_FORWARDED_HOST)
        .or_else(|| first_header_value(headers, &header::HOST))
        .unwrap_or_else(|| "localhost".to_string());
    format!("{proto}://{host}")
}

/// Path, query and fragment of `url`, omitting empty query and fragment.
fn relative_part(url: &Url) -> String {
    let mut out = url.path().to_string();
    if let Some(query) = url.query().filter(|q| !q.is_empty()) {
        out.push('?');
        out.push_str(query);
    }
    if let Some(fragment) = url.fragment().filter(|f| !f.is_empty()) {
        out.push('#');
        out.push_str(fragment);
    }
    out
}

/// Reduce a redirect candidate to a same-origin relative path.
///
/// Candidates starting with `/` are returned untouched. Anything else must
/// parse as an absolute URL whose origin equals `base_url`'s; its path,
/// query and fragment are returned. Everything else is `None`.
#[must_use]
pub fn sanitize_redirect(candidate: &str, base_url: &str) -> Option<String> {
    if candidate.starts_with('/') {
        return Some(candidate.to_string());
    }

    let base = Url::parse(base_url).ok()?;
    let url = Url::parse(candidate).ok()?;
    if url.origin() != base.origin() {
        return None;
    }
    Some(relative_part(&url))
}

/// Pick the post-login target: `redirect` query, then `Referer`, then the
/// provider default. The first candidate that sanitizes wins.
#[must_use]
pub fn choose_redirect_target(
    requested: Option<&str>,
    referer: Option<&str>,
    base_url: &str,
    default: &str,
) -> String {
    [requested, referer]
        .into_iter()
        .flatten()
        .find_map(|candidate| sanitize_redirect(candidate, base_url))
        .unwrap_or_else(|| default.to_string())
}

/// Append `key=value` to the query of a relative target, keeping its
/// fragment last.
#[must_use]
pub fn with_query_param(target: &str, key: &str, value: &str) -> String {
    let Ok(mut url) = Url::parse("http://placeholder.invalid").and_then(|base| base.join(target))
    else {
        return target.to_string();
    };
    url.query_pairs_mut().append_pair(key, value);
    relative_part(&url)
}
