use std::time::Instant;

use axum::{
    extract::Request,
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use tracing::{info, info_span, Instrument};

use crate::context::RequestId;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Open a span per request, log the outcome, and tag the response with the
/// request id.
pub async fn trace_requests(req: Request, next: Next) -> Response {
    let request_id = RequestId::new();
    let method = req.method().clone();
    let path = req.uri().path().to_owned();

    let span = info_span!("http_request", %request_id, %method, %path);
    let started = Instant::now();

    let mut response = next.run(req).instrument(span.clone()).await;

    let status = response.status();
    span.in_scope(|| {
        info!(
            status = status.as_u16(),
            latency_ms = started.elapsed().as_millis() as u64,
            "request completed"
        );
    });

    if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}
