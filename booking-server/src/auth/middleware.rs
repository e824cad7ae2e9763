//! Authentication middleware
//!
//! Axum middleware for JWT authentication and role checks.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::auth::{CurrentUser, JwtService};
use crate::core::ServerState;
use crate::security_log;
use crate::utils::AppError;

/// Routes that skip authentication entirely.
///
/// Mirrors the public surface of the system: credential issuance, the
/// liveness probe, the room catalogue and the event stream.
fn is_public_route(method: &http::Method, path: &str) -> bool {
    if path == "/api/auth/login" || path == "/api/auth/register" {
        return true;
    }
    if path == "/api/health" || path == "/api/events" {
        return true;
    }
    // Room catalogue is browsable without credentials
    if method == &http::Method::GET && path == "/api/rooms" {
        return true;
    }
    false
}

/// Authentication middleware - requires a valid Bearer token
///
/// Extracts and validates the JWT from `Authorization: Bearer <token>`.
/// On success the resolved [`CurrentUser`] is injected into the request
/// extensions for handlers to pick up.
///
/// # Errors
///
/// | Condition | Status |
/// |------|------------|
/// | missing Authorization header | 401 unauthorized |
/// | expired token | 401 token_expired |
/// | invalid token | 401 invalid_token |
pub async fn require_auth(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let path = req.uri().path();

    // Let CORS preflight through
    if req.method() == http::Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    // Non-API routes fall through to the 404 handler
    if !path.starts_with("/api/") {
        return Ok(next.run(req).await);
    }

    if is_public_route(req.method(), path) {
        return Ok(next.run(req).await);
    }

    let jwt_service = state.get_jwt_service();
    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(header) => JwtService::extract_from_header(header)
            .ok_or_else(AppError::invalid_token)?,
        None => {
            security_log!("WARN", "auth_missing", uri = format!("{:?}", req.uri()));
            return Err(AppError::unauthorized());
        }
    };

    match jwt_service.validate_token(token) {
        Ok(claims) => {
            let user = CurrentUser::try_from(claims).map_err(|e| {
                security_log!("WARN", "auth_malformed_claims", error = e);
                AppError::invalid_token()
            })?;
            req.extensions_mut().insert(user);
            Ok(next.run(req).await)
        }
        Err(e) => {
            security_log!(
                "WARN",
                "auth_failed",
                error = format!("{}", e),
                uri = format!("{:?}", req.uri())
            );

            match e {
                crate::auth::JwtError::ExpiredToken => Err(AppError::token_expired()),
                _ => Err(AppError::invalid_token()),
            }
        }
    }
}

/// Admin middleware - requires the Admin role
///
/// # Errors
///
/// Non-admin callers get 403 Forbidden
pub async fn require_admin(req: Request, next: Next) -> Result<Response, AppError> {
    let user = req
        .extensions()
        .get::<CurrentUser>()
        .ok_or(AppError::Unauthorized)?;
    if !user.is_admin() {
        security_log!(
            "WARN",
            "admin_required",
            user_id = user.id.clone(),
            username = user.username.clone()
        );
        return Err(AppError::forbidden("Access denied. Admin only."));
    }

    Ok(next.run(req).await)
}
