//! Repositories for database operations

use anyhow::Result;
use policy::Tier;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::models::CurrentUser;

pub mod search;

/// User repository for database operations
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a user by ID, with the subscription tier materialized
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<CurrentUser>> {
        let row = sqlx::query(
            r#"
            SELECT id, email, subscription_tier
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                let tier: String = row.get("subscription_tier");
                let subscription_tier = tier
                    .parse::<Tier>()
                    .map_err(|e| anyhow::anyhow!("Corrupt tier value in users row: {}", e))?;

                Ok(Some(CurrentUser {
                    id: row.get("id"),
                    email: row.get("email"),
                    subscription_tier,
                }))
            }
            None => Ok(None),
        }
    }
}
