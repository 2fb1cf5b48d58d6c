//! Models for the alert service

use policy::{ListingType, Tier};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Owner of a saved search, embedded by value
///
/// The store materializes the owner into every row it returns, so nothing
/// downstream depends on an open transaction or a lazy relation.
#[derive(Debug, Clone)]
pub struct SearchOwner {
    pub id: Uuid,
    pub email: String,
    pub subscription_tier: Tier,
}

/// A saved search loaded for checking, with its owner attached
#[derive(Debug, Clone)]
pub struct WatchedSearch {
    pub id: Uuid,
    pub owner: SearchOwner,
    pub search_query: String,
    pub min_price: Option<i32>,
    pub max_price: Option<i32>,
    /// Per-search frequency in seconds; carried in data but the loop
    /// currently runs on one fixed global interval
    pub frequency: i32,
    pub locations: Option<String>,
    pub listing_type: ListingType,
}

/// A marketplace item matched by a saved search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub title: String,
    pub price: f64,
}
