//! Request ID middleware for request tracing and correlation.
//!
//! An upstream `x-request-id` is reused when it is short printable ASCII;
//! anything else is replaced with a fresh UUID v4. The ID is recorded on the
//! tracing span, tagged on the Sentry scope, stored as a [`RequestId`]
//! extension for handlers, and echoed on the response.

use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use tracing::Span;
use uuid::Uuid;

/// The HTTP header name for request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

const MAX_UPSTREAM_ID_LEN: usize = 128;

/// Request ID available to handlers via `Extension<RequestId>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(pub String);

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

fn accept_upstream(value: &str) -> bool {
    !value.is_empty()
        && value.len() <= MAX_UPSTREAM_ID_LEN
        && value.bytes().all(|b| b.is_ascii_graphic())
}

/// Middleware that ensures every request carries a request ID.
pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .filter(|v| accept_upstream(v))
        .map_or_else(|| Uuid::new_v4().to_string(), String::from);

    Span::current().record("request_id", request_id.as_str());
    sentry::configure_scope(|scope| {
        scope.set_tag("request_id", &request_id);
    });

    request
        .extensions_mut()
        .insert(RequestId(request_id.clone()));

    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accept_upstream() {
        assert!(accept_upstream("cf-1234-abcd"));
        assert!(!accept_upstream(""));
        assert!(!accept_upstream("has space"));
        assert!(!accept_upstream(&"a".repeat(MAX_UPSTREAM_ID_LEN + 1)));
    }
}
