//! Saved-search value types shared between the policy engine and its callers

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error returned when a string does not name a known listing type
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown listing type: {0}")]
pub struct UnknownListingType(pub String);

/// Listing-type filter for a saved search
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingType {
    #[default]
    All,
    Auction,
    BuyItNow,
}

impl ListingType {
    /// Canonical name, as stored in the database
    pub fn as_str(&self) -> &'static str {
        match self {
            ListingType::All => "all",
            ListingType::Auction => "auction",
            ListingType::BuyItNow => "buy_it_now",
        }
    }
}

impl fmt::Display for ListingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ListingType {
    type Err = UnknownListingType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(ListingType::All),
            "auction" => Ok(ListingType::Auction),
            "buy_it_now" => Ok(ListingType::BuyItNow),
            other => Err(UnknownListingType(other.to_string())),
        }
    }
}

/// Proposed saved-search fields on create
///
/// There is deliberately no frequency field here: the polling frequency is
/// computed from the owner's tier and never accepted from input.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchDraft {
    pub search_query: String,
    pub min_price: Option<i32>,
    pub max_price: Option<i32>,
    /// Comma-separated location list, normalized by the engine
    pub locations: Option<String>,
    pub listing_type: Option<ListingType>,
}

/// Partial saved-search fields on update; absent fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchPatch {
    pub search_query: Option<String>,
    pub min_price: Option<i32>,
    pub max_price: Option<i32>,
    pub locations: Option<String>,
    pub listing_type: Option<ListingType>,
}

/// A validated, normalized saved-search definition ready to persist
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchSpec {
    pub search_query: String,
    pub min_price: Option<i32>,
    pub max_price: Option<i32>,
    /// Polling frequency in seconds, stamped from the owner's current tier
    pub frequency: i32,
    /// Normalized comma-separated locations; `None` means no filter
    pub locations: Option<String>,
    pub listing_type: ListingType,
}

/// Split a raw comma-separated location string into trimmed, non-empty parts
pub fn parse_locations(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|loc| !loc.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_locations_trims_and_drops_empty_segments() {
        assert_eq!(
            parse_locations(" USA , Canada ,, Mexico ,"),
            vec!["USA", "Canada", "Mexico"]
        );
    }

    #[test]
    fn parse_locations_of_blank_input_is_empty() {
        assert!(parse_locations("").is_empty());
        assert!(parse_locations(" , , ").is_empty());
    }

    #[test]
    fn listing_type_round_trips() {
        for lt in [ListingType::All, ListingType::Auction, ListingType::BuyItNow] {
            assert_eq!(lt.as_str().parse::<ListingType>(), Ok(lt));
        }
        assert!("Buy It Now New".parse::<ListingType>().is_err());
    }
}
