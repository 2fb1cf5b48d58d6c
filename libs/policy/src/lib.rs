//! Saved-search policy engine for the BIN Alert application
//!
//! Pure validation and normalization logic: given a user's subscription
//! tier and a proposed saved-search definition, this crate enforces the
//! per-tier limits (search count, query word count, allowed locations)
//! and computes the tier-enforced polling frequency. No I/O happens here;
//! callers own persistence and must serialize the count-then-insert path
//! per user (see `services/api`).

pub mod engine;
pub mod error;
pub mod search;
pub mod tier;

pub use engine::{validate_create, validate_update};
pub use error::PolicyError;
pub use search::{ListingType, SearchDraft, SearchPatch, SearchSpec, UnknownListingType, parse_locations};
pub use tier::{LocationRule, Tier, TierRules, UnknownTier};
