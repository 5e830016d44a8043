//! Request correlation.
//!
//! Every request runs inside a tracing span carrying its request id, taken
//! from the `x-request-id` header when the caller supplies one. The id is
//! echoed back on the response so client and server logs can be joined.

use axum::{
    body::Body,
    extract::Request,
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use tracing::Instrument;
use uuid::Uuid;

/// Header name for request ID.
pub static REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Caller-supplied ids longer than this are replaced with a fresh one.
const MAX_REQUEST_ID_LEN: usize = 128;

fn request_id_for(request: &Request) -> String {
    request
        .headers()
        .get(&REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty() && s.len() <= MAX_REQUEST_ID_LEN)
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

pub async fn request_id_middleware(request: Request, next: Next) -> Response<Body> {
    let request_id = request_id_for(&request);

    let span = tracing::info_span!(
        "request",
        request_id = %request_id,
        method = %request.method(),
        uri = %request.uri(),
    );

    async move {
        tracing::debug!("Request started");

        let mut response = next.run(request).await;

        if let Ok(value) = HeaderValue::from_str(&request_id) {
            response
                .headers_mut()
                .insert(REQUEST_ID_HEADER.clone(), value);
        }

        let status = response.status();
        if status.is_server_error() {
            tracing::warn!(status = status.as_u16(), "Request failed");
        } else {
            tracing::info!(status = status.as_u16(), "Request completed");
        }

        response
    }
    .instrument(span)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request_with(header: Option<&str>) -> Request {
        let mut builder = Request::builder().uri("/segments");
        if let Some(value) = header {
            builder = builder.header("x-request-id", value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn test_uses_supplied_request_id() {
        assert_eq!(request_id_for(&request_with(Some("abc-123"))), "abc-123");
    }

    #[test]
    fn test_generates_request_id() {
        let id = request_id_for(&request_with(None));
        assert!(Uuid::parse_str(&id).is_ok());

        let oversized = "x".repeat(MAX_REQUEST_ID_LEN + 1);
        let id = request_id_for(&request_with(Some(&oversized)));
        assert!(Uuid::parse_str(&id).is_ok());
    }
}
