use axum::{
    extract::Request,
    http::{header, HeaderValue},
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tracing::{field::Empty, Span};

/// Span the `TraceLayer` opens for every request. `status` and `latency_us`
/// are filled in by [`timing_middleware`] once the handler returns.
pub fn request_span(req: &Request) -> Span {
    tracing::info_span!(
        "request",
        method = %req.method(),
        path = %req.uri().path(),
        status = Empty,
        latency_us = Empty,
    )
}

/// Records handler latency on the request span and reports it to the
/// dashboard through `X-Response-Time-Us` and `Server-Timing`.
///
/// SSE responses are left untouched: their handler returns as soon as the
/// headers are ready, so the number would say nothing about the stream.
pub async fn timing_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let mut response = next.run(req).await;
    let latency_us = start.elapsed().as_micros() as u64;

    let span = Span::current();
    span.record("status", response.status().as_u16());

    if is_event_stream(&response) {
        return response;
    }
    span.record("latency_us", latency_us);

    let headers = response.headers_mut();
    headers.insert("X-Response-Time-Us", HeaderValue::from(latency_us));
    let server_timing = format!("total;dur={:.3}", latency_us as f64 / 1000.0);
    if let Ok(val) = HeaderValue::from_str(&server_timing) {
        headers.insert("Server-Timing", val);
    }

    response
}

fn is_event_stream(response: &Response) -> bool {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("text/event-stream"))
}
