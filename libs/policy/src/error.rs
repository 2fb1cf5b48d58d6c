//! Policy violation errors
//!
//! These are validation results returned to the caller, never retried.
//! Messages are user-facing and name the limit that was exceeded.

use thiserror::Error;

use crate::tier::Tier;

/// A tier-rule violation found while validating a saved-search definition
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PolicyError {
    /// The user already owns the maximum number of saved searches
    #[error("{tier} tier allows at most {limit} saved search(es)")]
    QuotaExceeded { tier: Tier, limit: i64 },

    /// The search query has more words than the tier allows
    #[error("{tier} tier allows at most {limit} word(s) in the search query")]
    QueryTooLong { tier: Tier, limit: usize },

    /// The location list violates the tier's location rule
    #[error("{0}")]
    InvalidLocation(String),

    /// Minimum price is greater than maximum price
    #[error("minimum price {min} cannot exceed maximum price {max}")]
    InvalidPriceRange { min: i32, max: i32 },
}
