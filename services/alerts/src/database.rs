//! Database access for the alert service

use anyhow::Result;
use policy::{ListingType, Tier};
use sqlx::{PgPool, Row};

use crate::models::{SearchOwner, WatchedSearch};
use crate::poller::SearchStore;

/// Read-only view over saved searches, with owners joined in
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl SearchStore for Database {
    /// Load every saved search with its owning user in a single query
    async fn list_all_with_owners(&self) -> Result<Vec<WatchedSearch>> {
        let rows = sqlx::query(
            r#"
            SELECT s.id, s.search_query, s.min_price, s.max_price, s.frequency,
                   s.locations, s.listing_type,
                   u.id AS owner_id, u.email, u.subscription_tier
            FROM saved_searches s
            JOIN users u ON u.id = s.user_id
            ORDER BY s.created_at
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                let tier: String = row.get("subscription_tier");
                let subscription_tier = tier
                    .parse::<Tier>()
                    .map_err(|e| anyhow::anyhow!("Corrupt tier value in users row: {}", e))?;

                let listing_type: String = row.get("listing_type");
                let listing_type = listing_type.parse::<ListingType>().map_err(|e| {
                    anyhow::anyhow!("Corrupt listing type in saved_searches row: {}", e)
                })?;

                Ok(WatchedSearch {
                    id: row.get("id"),
                    owner: SearchOwner {
                        id: row.get("owner_id"),
                        email: row.get("email"),
                        subscription_tier,
                    },
                    search_query: row.get("search_query"),
                    min_price: row.get("min_price"),
                    max_price: row.get("max_price"),
                    frequency: row.get("frequency"),
                    locations: row.get("locations"),
                    listing_type,
                })
            })
            .collect()
    }
}
