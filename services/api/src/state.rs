//! Application state shared across handlers

use sqlx::PgPool;

use crate::middleware::JwtVerifier;
use crate::repositories::{UserRepository, search::SearchRepository};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub jwt_verifier: JwtVerifier,
    pub user_repository: UserRepository,
    pub search_repository: SearchRepository,
}
