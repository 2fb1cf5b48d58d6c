//! Saved-search models for the API service
//!
//! Create and update request bodies are the policy crate's `SearchDraft`
//! and `SearchPatch` types; neither carries a frequency field, so a
//! client-supplied frequency can never reach storage.

use chrono::{DateTime, Utc};
use policy::{ListingType, SearchSpec};
use serde::Serialize;
use uuid::Uuid;

/// A persisted saved search, as returned to the owner
#[derive(Debug, Clone, Serialize)]
pub struct SavedSearch {
    pub id: Uuid,
    pub user_id: Uuid,
    pub search_query: String,
    pub min_price: Option<i32>,
    pub max_price: Option<i32>,
    /// Polling frequency in seconds, always server-computed from the tier
    pub frequency: i32,
    pub locations: Option<String>,
    pub listing_type: ListingType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SavedSearch {
    /// The policy-level view of this record, used as the base for updates
    pub fn spec(&self) -> SearchSpec {
        SearchSpec {
            search_query: self.search_query.clone(),
            min_price: self.min_price,
            max_price: self.max_price,
            frequency: self.frequency,
            locations: self.locations.clone(),
            listing_type: self.listing_type,
        }
    }
}
