//! Middleware for the HTTP interface

use super::paths::X_REQUEST_ID;
use crate::config::CorsSettings;
use axum::{
    extract::Request,
    middleware::{from_fn, Next},
    response::Response,
    Router,
};
use http::{header, HeaderValue, Method};
use std::time::Instant;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info, warn};
use uuid::Uuid;

/// Request ID middleware - ensures every request has a unique ID for tracing
///
/// A valid UUID supplied by the client is kept; anything else is replaced.
pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| Uuid::parse_str(s).ok())
        .unwrap_or_else(Uuid::now_v7);
    let header_value = HeaderValue::from_str(&request_id.to_string()).ok();

    if let Some(value) = &header_value {
        request.headers_mut().insert(X_REQUEST_ID, value.clone());
    }

    let mut response = next.run(request).await;

    if let Some(value) = header_value {
        response.headers_mut().insert(X_REQUEST_ID, value);
    }
    response
}

/// Logging middleware - logs request/response details with timing
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();

    // Extract request details before passing ownership
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    info!(%request_id, method = %method, %path, "Incoming request");

    let response = next.run(request).await;
    let status = response.status().as_u16();
    let duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

    if response.status().is_server_error() {
        error!(%request_id, method = %method, %path, status, duration_ms, "Request failed");
    } else if response.status().is_client_error() {
        warn!(%request_id, method = %method, %path, status, duration_ms, "Request rejected");
    } else {
        info!(%request_id, method = %method, %path, status, duration_ms, "Request completed");
    }

    response
}

/// Builder for composing the middleware stack
pub struct ApiMiddlewareStack {
    cors: CorsLayer,
}

impl ApiMiddlewareStack {
    pub fn new(cors: &CorsSettings) -> Self {
        Self {
            cors: cors_layer(cors),
        }
    }

    /// Apply the complete middleware stack to a router
    ///
    /// Outer to inner: CORS, HTTP trace span, request ID, logging.
    pub fn apply_to_router<S>(self, router: Router<S>) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        router
            .layer(from_fn(logging_middleware))
            .layer(from_fn(request_id_middleware))
            .layer(TraceLayer::new_for_http())
            .layer(self.cors)
    }
}

fn cors_layer(settings: &CorsSettings) -> CorsLayer {
    let origins: Vec<HeaderValue> = settings
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true)
}
