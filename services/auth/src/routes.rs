//! Authentication service routes

use axum::{
    Extension, Json, Router,
    extract::State,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use tracing::{error, info};

use crate::{
    AppState,
    middleware::{AuthUserId, auth_middleware},
    models::{
        LoginRequest, RegisterRequest, SubscriptionUpdateRequest, TokenResponse,
        UpdateUserRequest, UserResponse,
    },
    validation::{validate_email, validate_password},
};

/// Create the router for the authentication service
pub fn create_router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route(
            "/users/me",
            get(get_current_user)
                .put(update_current_user)
                .delete(delete_current_user),
        )
        .route("/users/me/subscription", put(update_subscription))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .merge(protected_routes)
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "auth-service"
    }))
}

/// User registration endpoint
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AuthError> {
    info!("Registration attempt for {}", payload.email);

    validate_email(&payload.email).map_err(AuthError::Validation)?;
    validate_password(&payload.password).map_err(AuthError::Validation)?;

    let existing = state
        .user_repository
        .find_by_email(&payload.email)
        .await
        .map_err(|e| {
            error!("Failed to look up user: {:#}", e);
            AuthError::InternalServerError
        })?;
    if existing.is_some() {
        return Err(AuthError::EmailTaken);
    }

    let user = state
        .user_repository
        .create(&payload.email, &payload.password)
        .await
        .map_err(|e| {
            error!("Failed to create user: {:#}", e);
            AuthError::InternalServerError
        })?;

    // Confirmation email is fire-and-forget; a delivery failure must not
    // fail the registration.
    let mailer = state.mailer.clone();
    let to = user.email.clone();
    tokio::spawn(async move {
        if let Err(e) = mailer
            .send(
                &to,
                "Welcome to BIN Alert!",
                "Thank you for registering with BIN Alert. \
                 You're now ready to start receiving alerts!",
                "registration-confirmation",
            )
            .await
        {
            error!("Failed to send registration email to {}: {:#}", to, e);
        }
    });

    let access_token = state.jwt_service.generate_access_token(&user).map_err(|e| {
        error!("Failed to generate access token: {:#}", e);
        AuthError::InternalServerError
    })?;

    let response = TokenResponse {
        access_token,
        token_type: "Bearer".to_string(),
        expires_in: state.jwt_service.access_token_expiry(),
        user: UserResponse::from(&user),
    };

    Ok((StatusCode::CREATED, Json(response)))
}

/// User login endpoint
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AuthError> {
    info!("Login attempt for {}", payload.email);

    let allowed = state
        .rate_limiter
        .is_allowed(&payload.email)
        .await
        .map_err(|e| {
            error!("Rate limiter failure: {:#}", e);
            AuthError::InternalServerError
        })?;
    if !allowed {
        return Err(AuthError::TooManyRequests);
    }

    let user = state
        .user_repository
        .find_by_email(&payload.email)
        .await
        .map_err(|e| {
            error!("Failed to look up user: {:#}", e);
            AuthError::InternalServerError
        })?
        .ok_or(AuthError::Unauthorized)?;

    let verified = state
        .user_repository
        .verify_password(&user, &payload.password)
        .await
        .map_err(|e| {
            error!("Failed to verify password: {:#}", e);
            AuthError::InternalServerError
        })?;
    if !verified {
        return Err(AuthError::Unauthorized);
    }

    let access_token = state.jwt_service.generate_access_token(&user).map_err(|e| {
        error!("Failed to generate access token: {:#}", e);
        AuthError::InternalServerError
    })?;

    let response = TokenResponse {
        access_token,
        token_type: "Bearer".to_string(),
        expires_in: state.jwt_service.access_token_expiry(),
        user: UserResponse::from(&user),
    };

    Ok((StatusCode::OK, Json(response)))
}

/// Return the current user's profile
pub async fn get_current_user(
    State(state): State<AppState>,
    Extension(AuthUserId(user_id)): Extension<AuthUserId>,
) -> Result<impl IntoResponse, AuthError> {
    let user = state
        .user_repository
        .find_by_id(user_id)
        .await
        .map_err(|e| {
            error!("Failed to load user: {:#}", e);
            AuthError::InternalServerError
        })?
        .ok_or(AuthError::Unauthorized)?;

    Ok(Json(UserResponse::from(&user)))
}

/// Update the current user's email and/or password
pub async fn update_current_user(
    State(state): State<AppState>,
    Extension(AuthUserId(user_id)): Extension<AuthUserId>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<impl IntoResponse, AuthError> {
    let current = state
        .user_repository
        .find_by_id(user_id)
        .await
        .map_err(|e| {
            error!("Failed to load user: {:#}", e);
            AuthError::InternalServerError
        })?
        .ok_or(AuthError::Unauthorized)?;

    if let Some(email) = &payload.email {
        validate_email(email).map_err(AuthError::Validation)?;

        if *email != current.email {
            let taken = state
                .user_repository
                .find_by_email(email)
                .await
                .map_err(|e| {
                    error!("Failed to look up user: {:#}", e);
                    AuthError::InternalServerError
                })?;
            if taken.is_some() {
                return Err(AuthError::EmailTaken);
            }
        }
    }
    if let Some(password) = &payload.password {
        validate_password(password).map_err(AuthError::Validation)?;
    }

    let user = state
        .user_repository
        .update_profile(user_id, payload.email.as_deref(), payload.password.as_deref())
        .await
        .map_err(|e| {
            error!("Failed to update user: {:#}", e);
            AuthError::InternalServerError
        })?
        .ok_or(AuthError::Unauthorized)?;

    Ok(Json(UserResponse::from(&user)))
}

/// Delete the current user's account; saved searches cascade-delete
pub async fn delete_current_user(
    State(state): State<AppState>,
    Extension(AuthUserId(user_id)): Extension<AuthUserId>,
) -> Result<impl IntoResponse, AuthError> {
    let deleted = state.user_repository.delete(user_id).await.map_err(|e| {
        error!("Failed to delete user: {:#}", e);
        AuthError::InternalServerError
    })?;

    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AuthError::Unauthorized)
    }
}

/// Change the current user's subscription tier
///
/// Existing searches keep their fields; the new tier takes effect on the
/// next create or update.
pub async fn update_subscription(
    State(state): State<AppState>,
    Extension(AuthUserId(user_id)): Extension<AuthUserId>,
    Json(payload): Json<SubscriptionUpdateRequest>,
) -> Result<impl IntoResponse, AuthError> {
    let user = state
        .user_repository
        .update_tier(user_id, payload.subscription_tier)
        .await
        .map_err(|e| {
            error!("Failed to update subscription tier: {:#}", e);
            AuthError::InternalServerError
        })?
        .ok_or(AuthError::Unauthorized)?;

    Ok(Json(UserResponse::from(&user)))
}

/// Custom error type for authentication errors
#[derive(Debug)]
pub enum AuthError {
    Unauthorized,
    EmailTaken,
    Validation(String),
    TooManyRequests,
    InternalServerError,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AuthError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            AuthError::EmailTaken => (
                StatusCode::BAD_REQUEST,
                "Email already registered".to_string(),
            ),
            AuthError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            AuthError::TooManyRequests => (
                StatusCode::TOO_MANY_REQUESTS,
                "Too many login attempts, try again later".to_string(),
            ),
            AuthError::InternalServerError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = Json(serde_json::json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn auth_error_status_codes() {
        assert_eq!(
            AuthError::Unauthorized.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::EmailTaken.into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AuthError::Validation("bad".to_string())
                .into_response()
                .status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AuthError::TooManyRequests.into_response().status(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            AuthError::InternalServerError.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
