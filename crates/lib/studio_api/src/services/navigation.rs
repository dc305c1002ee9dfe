//! Redirect targets and `next` handling.

use studio_core::auth::access::RouteId;
use url::form_urlencoded;

pub const INDEX_PATH: &str = "/";
pub const LOGIN_PATH: &str = "/auth/login";
pub const UNCONFIRMED_PATH: &str = "/auth/unconfirmed";

/// Path a gate redirect to `route` resolves to.
pub fn redirect_path(route: RouteId) -> &'static str {
    match route {
        RouteId::Unconfirmed => UNCONFIRMED_PATH,
        RouteId::Login => LOGIN_PATH,
        _ => INDEX_PATH,
    }
}

/// Login URL carrying the originally requested location.
pub fn login_url(requested: &str) -> String {
    let next: String = form_urlencoded::byte_serialize(requested.as_bytes()).collect();
    format!("{LOGIN_PATH}?next={next}")
}

/// Accept only site-local paths as post-login targets.
///
/// Anything else (absent, absolute URL, protocol-relative `//host`,
/// backslash tricks) falls back to the index.
pub fn safe_next(next: Option<&str>) -> String {
    match next {
        Some(path)
            if path.starts_with('/')
                && !path.starts_with("//")
                && !path.starts_with("/\\")
                && !path.chars().any(char::is_control) =>
        {
            path.to_string()
        }
        _ => INDEX_PATH.to_string(),
    }
}
