//! Middleware for JWT token validation and authentication

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::Response,
};
use axum_extra::TypedHeader;
use axum_extra::headers::{Authorization, authorization::Bearer};
use tracing::error;
use uuid::Uuid;

use crate::AppState;

/// Authenticated user ID extracted from a validated token
#[derive(Debug, Clone, Copy)]
pub struct AuthUserId(pub Uuid);

/// Extract and validate the Bearer token from the Authorization header
pub async fn auth_middleware(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let TypedHeader(Authorization(bearer)) = bearer.ok_or(StatusCode::UNAUTHORIZED)?;

    let claims = state
        .jwt_service
        .validate_token(bearer.token())
        .map_err(|e| {
            error!("Failed to validate token: {}", e);
            StatusCode::UNAUTHORIZED
        })?;

    // Make the user ID available to handlers
    req.extensions_mut().insert(AuthUserId(claims.sub));

    Ok(next.run(req).await)
}
