//! Subscription tiers and the static per-tier rule table

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Subscription tier governing quota and feature limits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Free,
    Mid,
    Top,
}

/// Error returned when a tier string does not name a known tier
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown subscription tier: {0}")]
pub struct UnknownTier(pub String);

impl FromStr for Tier {
    type Err = UnknownTier;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "free" => Ok(Tier::Free),
            "mid" => Ok(Tier::Mid),
            "top" => Ok(Tier::Top),
            other => Err(UnknownTier(other.to_string())),
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Location constraint applied by a tier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationRule {
    /// Only the named location is allowed (matched case-insensitively)
    Only(&'static str),
    /// At most this many locations, any values
    AtMost(usize),
    /// No constraint on locations
    Unlimited,
}

/// Static rule set for one tier
#[derive(Debug, Clone, Copy)]
pub struct TierRules {
    /// Maximum number of saved searches a user may own
    pub max_searches: i64,
    /// Maximum number of whitespace-separated words in a search query
    pub max_query_words: usize,
    /// Enforced polling frequency in seconds, never client-settable
    pub default_frequency: i32,
    /// Location constraint for this tier
    pub location_rule: LocationRule,
}

const FREE_RULES: TierRules = TierRules {
    max_searches: 1,
    max_query_words: 1,
    default_frequency: 3600,
    location_rule: LocationRule::Only("USA"),
};

const MID_RULES: TierRules = TierRules {
    max_searches: 3,
    max_query_words: 2,
    default_frequency: 1800,
    location_rule: LocationRule::AtMost(5),
};

const TOP_RULES: TierRules = TierRules {
    max_searches: 25,
    max_query_words: 5,
    default_frequency: 30,
    location_rule: LocationRule::Unlimited,
};

impl Tier {
    /// Lowercase canonical name, as stored in the database
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Free => "free",
            Tier::Mid => "mid",
            Tier::Top => "top",
        }
    }

    /// Rule set for this tier
    pub fn rules(&self) -> &'static TierRules {
        match self {
            Tier::Free => &FREE_RULES,
            Tier::Mid => &MID_RULES,
            Tier::Top => &TOP_RULES,
        }
    }
}
