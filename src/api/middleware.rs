//! API Middleware
//!
//! Principal resolution and request logging.
//!
//! Authentication proper lives with the external identity provider; requests
//! arrive carrying the already-authenticated principal id, and this layer
//! resolves it to an id/role pair every handler receives explicitly.

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{Principal, Role};

/// Header carrying the authenticated principal id, set by the identity
/// collaborator in front of this service.
pub const PRINCIPAL_HEADER: &str = "X-Principal-Id";

// =========================================================================
// Principal Resolution Middleware
// =========================================================================

/// Resolve the acting principal from the X-Principal-Id header.
pub async fn principal_middleware(
    State(pool): State<PgPool>,
    headers: HeaderMap,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, Response> {
    let principal_id = match headers.get(PRINCIPAL_HEADER).and_then(|v| v.to_str().ok()) {
        Some(value) => value,
        None => {
            return Err((
                StatusCode::UNAUTHORIZED,
                Json(json!({
                    "error": "Missing X-Principal-Id header",
                    "error_code": "missing_principal"
                })),
            )
                .into_response());
        }
    };

    let principal_id = match Uuid::parse_str(principal_id) {
        Ok(id) => id,
        Err(_) => {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "Invalid X-Principal-Id header format",
                    "error_code": "invalid_principal_id"
                })),
            )
                .into_response());
        }
    };

    let role: Option<String> = match sqlx::query_scalar("SELECT role FROM profiles WHERE id = $1")
        .bind(principal_id)
        .fetch_optional(&pool)
        .await
    {
        Ok(role) => role,
        Err(e) => {
            tracing::error!("Database error during principal resolution: {}", e);
            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Internal server error",
                    "error_code": "database_error"
                })),
            )
                .into_response());
        }
    };

    let role = match role {
        Some(role) => role,
        None => {
            return Err((
                StatusCode::UNAUTHORIZED,
                Json(json!({
                    "error": "Unknown principal",
                    "error_code": "unknown_principal"
                })),
            )
                .into_response());
        }
    };

    let role: Role = match role.parse() {
        Ok(role) => role,
        Err(e) => {
            tracing::error!("Corrupt role for principal {}: {}", principal_id, e);
            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Internal server error",
                    "error_code": "internal_error"
                })),
            )
                .into_response());
        }
    };

    request
        .extensions_mut()
        .insert(Principal::new(principal_id, role));

    Ok(next.run(request).await)
}

// =========================================================================
// Header masking
// =========================================================================

/// Headers that should be masked in logs
const SENSITIVE_HEADERS: &[&str] = &[
    "authorization",
    "cookie",
    "set-cookie",
];

/// Mask sensitive headers for logging
pub fn mask_headers_for_logging(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(name, value)| {
            let name_lower = name.as_str().to_lowercase();
            let masked_value = if SENSITIVE_HEADERS.contains(&name_lower.as_str()) {
                "[REDACTED]".to_string()
            } else {
                value.to_str().unwrap_or("[invalid utf8]").to_string()
            };
            (name.to_string(), masked_value)
        })
        .collect()
}

// =========================================================================
// Request Logging Middleware
// =========================================================================

/// Request logging middleware
pub async fn logging_middleware(
    request: Request<Body>,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();

    let headers = mask_headers_for_logging(request.headers());

    let start = std::time::Instant::now();

    tracing::info!(
        method = %method,
        uri = %uri,
        headers = ?headers,
        "Incoming request"
    );

    let response = next.run(request).await;

    let duration = start.elapsed();
    let status = response.status();

    tracing::info!(
        method = %method,
        uri = %uri,
        status = %status,
        duration_ms = %duration.as_millis(),
        "Request completed"
    );

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_headers_for_logging() {
        let mut headers = HeaderMap::new();
        headers.insert("content-type", "application/json".parse().unwrap());
        headers.insert("authorization", "Bearer secret-token".parse().unwrap());
        headers.insert("x-principal-id", "1234".parse().unwrap());

        let masked = mask_headers_for_logging(&headers);

        let auth = masked.iter().find(|(k, _)| k == "authorization");
        let content_type = masked.iter().find(|(k, _)| k == "content-type");
        let principal = masked.iter().find(|(k, _)| k == "x-principal-id");

        assert_eq!(auth.unwrap().1, "[REDACTED]");
        assert_eq!(content_type.unwrap().1, "application/json");
        assert_eq!(principal.unwrap().1, "1234");
    }

    #[test]
    fn test_sensitive_headers_list() {
        assert!(SENSITIVE_HEADERS.contains(&"authorization"));
        assert!(SENSITIVE_HEADERS.contains(&"cookie"));
        assert!(!SENSITIVE_HEADERS.contains(&"content-type"));
    }
}
