use axum::http::{header, Method};
use tower_http::cors::{Any, CorsLayer};

/// Mini-Apps are served from Telegram's web views on arbitrary origins, so the
/// origin stays open; methods and headers are limited to what the API uses.
pub fn mini_app_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_origin(Any)
}
