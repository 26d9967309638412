//! Per-request correlation IDs.

use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use tracing::Span;
use uuid::Uuid;

/// Header carrying the correlation ID, inbound and outbound.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Tag every request with a correlation ID and echo it on the response.
///
/// An inbound `x-request-id` (set by a reverse proxy) is trusted as-is;
/// otherwise a fresh UUID is minted. The ID lands in the current tracing
/// span and on the Sentry scope so log lines and error events line up.
pub async fn request_id_middleware(request: Request, next: Next) -> Response {
    let request_id = incoming_id(&request).unwrap_or_else(|| Uuid::new_v4().to_string());

    Span::current().record("request_id", &request_id);
    sentry::configure_scope(|scope| {
        scope.set_tag("request_id", &request_id);
    });

    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

fn incoming_id(request: &Request) -> Option<String> {
    let value = request.headers().get(REQUEST_ID_HEADER)?.to_str().ok()?;
    if value.is_empty() || value.len() > 128 {
        return None;
    }
    Some(value.to_owned())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn proxy_supplied_id_is_kept() {
        let request = Request::builder()
            .header(REQUEST_ID_HEADER, "edge-7f3a")
            .body(axum::body::Body::empty())
            .unwrap();
        assert_eq!(incoming_id(&request).as_deref(), Some("edge-7f3a"));
    }

    #[test]
    fn empty_or_oversized_ids_are_replaced() {
        let empty = Request::builder()
            .header(REQUEST_ID_HEADER, "")
            .body(axum::body::Body::empty())
            .unwrap();
        assert_eq!(incoming_id(&empty), None);

        let oversized = Request::builder()
            .header(REQUEST_ID_HEADER, "x".repeat(200))
            .body(axum::body::Body::empty())
            .unwrap();
        assert_eq!(incoming_id(&oversized), None);
    }
}
