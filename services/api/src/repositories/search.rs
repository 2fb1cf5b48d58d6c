//! Saved-search repository for database operations
//!
//! Create runs inside a transaction holding a per-user advisory lock, so
//! two concurrent creates for the same user serialize and cannot both
//! pass the quota check.

use anyhow::Result;
use policy::{ListingType, PolicyError, SearchDraft, SearchPatch, SearchSpec};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use thiserror::Error;
use uuid::Uuid;

use crate::models::CurrentUser;
use crate::models::search::SavedSearch;

/// Failure of a validated write: either a policy violation to surface to
/// the caller, or a storage fault
#[derive(Debug, Error)]
pub enum SearchRepoError {
    #[error(transparent)]
    Policy(#[from] PolicyError),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl From<sqlx::Error> for SearchRepoError {
    fn from(e: sqlx::Error) -> Self {
        SearchRepoError::Storage(e.into())
    }
}

fn map_search(row: PgRow) -> Result<SavedSearch> {
    let listing_type: String = row.get("listing_type");
    let listing_type = listing_type
        .parse::<ListingType>()
        .map_err(|e| anyhow::anyhow!("Corrupt listing type in saved_searches row: {}", e))?;

    Ok(SavedSearch {
        id: row.get("id"),
        user_id: row.get("user_id"),
        search_query: row.get("search_query"),
        min_price: row.get("min_price"),
        max_price: row.get("max_price"),
        frequency: row.get("frequency"),
        locations: row.get("locations"),
        listing_type,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

/// Saved-search repository
#[derive(Clone)]
pub struct SearchRepository {
    pool: PgPool,
}

impl SearchRepository {
    /// Create a new saved-search repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List the caller's saved searches
    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<SavedSearch>> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, search_query, min_price, max_price, frequency,
                   locations, listing_type, created_at, updated_at
            FROM saved_searches
            WHERE user_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(map_search).collect()
    }

    /// Find a saved search scoped to its owner
    ///
    /// A record owned by someone else comes back as `None`, exactly like a
    /// missing one.
    pub async fn find_owned(&self, id: Uuid, user_id: Uuid) -> Result<Option<SavedSearch>> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, search_query, min_price, max_price, frequency,
                   locations, listing_type, created_at, updated_at
            FROM saved_searches
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(map_search).transpose()
    }

    /// Validate and create a saved search for the caller
    ///
    /// The count-then-insert runs under `pg_advisory_xact_lock` keyed by
    /// the user ID, which serializes concurrent creates per user.
    pub async fn create(
        &self,
        user: &CurrentUser,
        draft: &SearchDraft,
    ) -> Result<SavedSearch, SearchRepoError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1)::bigint)")
            .bind(user.id.to_string())
            .execute(&mut *tx)
            .await?;

        let existing_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM saved_searches WHERE user_id = $1")
                .bind(user.id)
                .fetch_one(&mut *tx)
                .await?;

        let spec = policy::validate_create(user.subscription_tier, existing_count, draft)?;

        let row = sqlx::query(
            r#"
            INSERT INTO saved_searches
                (user_id, search_query, min_price, max_price, frequency, locations, listing_type)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, user_id, search_query, min_price, max_price, frequency,
                      locations, listing_type, created_at, updated_at
            "#,
        )
        .bind(user.id)
        .bind(&spec.search_query)
        .bind(spec.min_price)
        .bind(spec.max_price)
        .bind(spec.frequency)
        .bind(&spec.locations)
        .bind(spec.listing_type.as_str())
        .fetch_one(&mut *tx)
        .await?;

        let search = map_search(row)?;
        tx.commit().await?;

        Ok(search)
    }

    /// Validate and apply a partial update to a caller-owned saved search
    ///
    /// Returns `None` when the record is missing or not owned. The
    /// frequency is re-stamped from the caller's current tier even for an
    /// empty patch.
    pub async fn update(
        &self,
        user: &CurrentUser,
        id: Uuid,
        patch: &SearchPatch,
    ) -> Result<Option<SavedSearch>, SearchRepoError> {
        let Some(current) = self.find_owned(id, user.id).await? else {
            return Ok(None);
        };

        let spec: SearchSpec =
            policy::validate_update(user.subscription_tier, &current.spec(), patch)?;

        let row = sqlx::query(
            r#"
            UPDATE saved_searches
            SET search_query = $3, min_price = $4, max_price = $5, frequency = $6,
                locations = $7, listing_type = $8, updated_at = now()
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, search_query, min_price, max_price, frequency,
                      locations, listing_type, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(user.id)
        .bind(&spec.search_query)
        .bind(spec.min_price)
        .bind(spec.max_price)
        .bind(spec.frequency)
        .bind(&spec.locations)
        .bind(spec.listing_type.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(map_search).transpose().map_err(Into::into)
    }

    /// Delete a caller-owned saved search; false when missing or not owned
    pub async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM saved_searches WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
