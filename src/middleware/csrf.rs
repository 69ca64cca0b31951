//! Cross-Site Request Forgery (CSRF) protection middleware.
//!
//! State-changing requests must carry a fixed `X-CSRF-Token` header. A
//! cross-origin page cannot set a custom header without a CORS preflight,
//! and release builds answer no preflights.

use axum::{
    extract::Request,
    http::{HeaderMap, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

pub const CSRF_HEADER: &str = "X-CSRF-Token";
pub const CSRF_EXPECTED_VALUE: &str = "mcp-config-manager";

/// Rejects POST/PUT/DELETE/PATCH requests lacking the CSRF header with 403.
pub async fn csrf_protection_middleware(req: Request, next: Next) -> Response {
    let method = req.method();

    if matches!(method, &Method::POST | &Method::PUT | &Method::DELETE | &Method::PATCH)
        && !validate_csrf_token(req.headers())
    {
        tracing::warn!("Rejected {} {} without CSRF token", method, req.uri().path());
        return (
            StatusCode::FORBIDDEN,
            Json(json!({
                "error": {
                    "code": "CSRF_TOKEN_MISSING",
                    "message": format!("CSRF token required. Include '{}' header with value '{}'",
                        CSRF_HEADER, CSRF_EXPECTED_VALUE),
                },
                "status": 403,
            })),
        )
            .into_response();
    }

    next.run(req).await
}

fn validate_csrf_token(headers: &HeaderMap) -> bool {
    headers
        .get(CSRF_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|v| v == CSRF_EXPECTED_VALUE)
        .unwrap_or(false)
}
