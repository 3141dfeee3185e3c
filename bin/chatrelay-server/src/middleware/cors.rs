use tower_http::cors::{Any, CorsLayer};

use crate::config::Config;

/// CORS layer from `CHATRELAY_CORS_ORIGINS`.
///
/// Unset (or an unparsable list) allows any origin, which suits a browser
/// front-end served from a dev server on another port.
pub fn cors_layer(config: &Config) -> CorsLayer {
    let origins: Vec<axum::http::HeaderValue> = config
        .cors_allowed_origins
        .as_deref()
        .unwrap_or_default()
        .split(',')
        .filter_map(|s| s.trim().parse().ok())
        .collect();

    let layer = CorsLayer::new().allow_headers(Any).allow_methods(Any);
    if origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(origins)
    }
}
