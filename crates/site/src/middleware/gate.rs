//! Edge gate: presence-only credential check for the portal namespace.
//!
//! Runs once per inbound request, before any page content is produced.
//! Requests outside `/portal` pass through untouched. Portal requests with
//! no session cookie are redirected to the public entry point with the
//! original path and an `auth=required` flag attached; requests carrying the
//! cookie pass through.
//!
//! This layer deliberately does not validate the session token - it only
//! gates on presence. Wholly anonymous traffic is rejected cheaply here;
//! full role enforcement happens in the portal extractors once the member is
//! resolved from the session store.

use axum::{
    extract::Request,
    http::{HeaderMap, header::COOKIE},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::middleware::session::SESSION_COOKIE_NAME;
use crate::portal::policy::PORTAL_PREFIX;

/// Middleware entry point.
pub async fn portal_gate(request: Request, next: Next) -> Response {
    let path = request.uri().path();
    let credential_present = has_session_cookie(request.headers());

    if let Some(location) = gate_redirect(path, credential_present) {
        tracing::debug!(path, "portal gate: no credential, redirecting");
        return Redirect::to(&location).into_response();
    }

    next.run(request).await
}

/// The redirect location for a denied request, or `None` to pass through.
fn gate_redirect(path: &str, credential_present: bool) -> Option<String> {
    if !path.starts_with(PORTAL_PREFIX) {
        return None;
    }
    if credential_present {
        return None;
    }
    Some(format!(
        "/?redirect={}&auth=required",
        urlencoding::encode(path)
    ))
}

/// Whether any `Cookie` header carries a non-empty session cookie.
fn has_session_cookie(headers: &HeaderMap) -> bool {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| {
            let (name, value) = pair.trim().split_once('=')?;
            Some((name.trim(), value.trim()))
        })
        .any(|(name, value)| name == SESSION_COOKIE_NAME && !value.is_empty())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with_cookie(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn public_paths_pass_through() {
        assert_eq!(gate_redirect("/about", false), None);
        assert_eq!(gate_redirect("/", false), None);
        assert_eq!(gate_redirect("/news/some-post", false), None);
    }

    #[test]
    fn portal_without_credential_redirects_with_intent() {
        assert_eq!(
            gate_redirect("/portal/anything", false).as_deref(),
            Some("/?redirect=%2Fportal%2Fanything&auth=required")
        );
    }

    #[test]
    fn portal_with_credential_passes_through() {
        // Presence only; no token validation at this layer.
        assert_eq!(gate_redirect("/portal", true), None);
        assert_eq!(gate_redirect("/portal/admin/members", true), None);
    }

    #[test]
    fn session_cookie_is_found_among_others() {
        let headers = headers_with_cookie("theme=dark; cascade_session=abc123; lang=en");
        assert!(has_session_cookie(&headers));
    }

    #[test]
    fn missing_or_empty_cookie_is_absent() {
        assert!(!has_session_cookie(&HeaderMap::new()));
        assert!(!has_session_cookie(&headers_with_cookie("theme=dark")));
        assert!(!has_session_cookie(&headers_with_cookie("cascade_session=")));
    }
}
