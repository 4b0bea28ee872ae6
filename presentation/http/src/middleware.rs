//! Middleware for the relay router

use axum::{
    extract::Request,
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{debug, info, warn, Instrument};
use uuid::Uuid;

/// Header carrying the per-request id back to the caller
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Request logging middleware
pub async fn request_logging(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let request_id = Uuid::new_v4();
    let start_time = Instant::now();

    let span = tracing::info_span!("relay_request", %request_id, %method);

    async move {
        debug!("Incoming request: {} {}", method, uri);

        let mut response = next.run(request).await;

        let duration = start_time.elapsed();
        let status = response.status();

        if status.is_success() {
            info!("{} {} - {} ({:?})", method, uri, status, duration);
        } else {
            warn!("{} {} - {} ({:?})", method, uri, status, duration);
        }

        if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
            response.headers_mut().insert(REQUEST_ID_HEADER, value);
        }
        response
    }
    .instrument(span)
    .await
}

/// CORS layer for the configured origins.
///
/// The layer answers every `OPTIONS` request itself with an empty 200.
/// `*` (or no usable origin) allows any origin. A single origin is always
/// sent as-is. With several, a listed `Origin` is echoed and any other gets
/// no `Access-Control-Allow-Origin` header, so browsers refuse the response.
pub fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(allow_origin(allowed_origins))
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

fn allow_origin(allowed_origins: &[String]) -> AllowOrigin {
    if allowed_origins.iter().any(|o| o == "*") {
        return AllowOrigin::any();
    }

    let mut origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Ignoring invalid CORS origin '{}': {}", o, e);
                None
            }
        })
        .collect();

    match origins.len() {
        0 => AllowOrigin::any(),
        1 => AllowOrigin::exact(origins.remove(0)),
        _ => AllowOrigin::list(origins),
    }
}
