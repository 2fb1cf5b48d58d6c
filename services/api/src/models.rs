//! API models for request and response payloads

use policy::Tier;
use uuid::Uuid;

pub mod search;

/// Authenticated user resolved by the middleware, tier included
///
/// Carried by value through request extensions so handlers never need a
/// second lookup.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: Uuid,
    pub email: String,
    pub subscription_tier: Tier,
}
