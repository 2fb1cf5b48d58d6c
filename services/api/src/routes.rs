//! API service routes for saved-search CRUD

use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::get,
};
use policy::{SearchDraft, SearchPatch};
use serde_json::json;
use uuid::Uuid;

use crate::{
    error::ApiError, middleware::auth_middleware, models::CurrentUser, state::AppState,
};

/// Create the router for the API service
pub fn create_router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route(
            "/saved-searches",
            get(list_saved_searches).post(create_saved_search),
        )
        .route(
            "/saved-searches/:id",
            get(get_saved_search)
                .put(update_saved_search)
                .delete(delete_saved_search),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .merge(protected_routes)
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "api-service"
    }))
}

/// List the current user's saved searches
pub async fn list_saved_searches(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, ApiError> {
    let searches = state
        .search_repository
        .list_for_user(user.id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list saved searches: {:#}", e);
            ApiError::InternalServerError
        })?;

    Ok(Json(searches))
}

/// Get one saved search owned by the current user
pub async fn get_saved_search(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let search = state
        .search_repository
        .find_owned(id, user.id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load saved search: {:#}", e);
            ApiError::InternalServerError
        })?
        .ok_or(ApiError::NotFound)?;

    Ok(Json(search))
}

/// Create a saved search for the current user
///
/// The request body has no frequency field; the stored frequency comes
/// from the tier rules. Policy violations map to 400 with the rule's
/// message.
pub async fn create_saved_search(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(draft): Json<SearchDraft>,
) -> Result<impl IntoResponse, ApiError> {
    let search = state.search_repository.create(&user, &draft).await?;

    Ok((StatusCode::CREATED, Json(search)))
}

/// Update a saved search owned by the current user
pub async fn update_saved_search(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(patch): Json<SearchPatch>,
) -> Result<impl IntoResponse, ApiError> {
    let search = state
        .search_repository
        .update(&user, id, &patch)
        .await?
        .ok_or(ApiError::NotFound)?;

    Ok(Json(search))
}

/// Delete a saved search owned by the current user
pub async fn delete_saved_search(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let deleted = state
        .search_repository
        .delete(id, user.id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete saved search: {:#}", e);
            ApiError::InternalServerError
        })?;

    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound)
    }
}
