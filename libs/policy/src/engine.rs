//! Validation and normalization of saved-search definitions

use crate::error::PolicyError;
use crate::search::{SearchDraft, SearchPatch, SearchSpec, parse_locations};
use crate::tier::{LocationRule, Tier};

/// Validate a proposed saved search against the owner's tier rules
///
/// `existing_count` is the number of saved searches the user already owns;
/// the caller must read it under the same per-user serialization it uses
/// for the insert, or two concurrent creates can both pass the quota check.
/// On success the returned spec carries the tier's enforced frequency.
pub fn validate_create(
    tier: Tier,
    existing_count: i64,
    draft: &SearchDraft,
) -> Result<SearchSpec, PolicyError> {
    let rules = tier.rules();

    if existing_count >= rules.max_searches {
        return Err(PolicyError::QuotaExceeded {
            tier,
            limit: rules.max_searches,
        });
    }

    check_query(tier, &draft.search_query)?;
    let locations = check_locations(tier, draft.locations.as_deref())?;
    check_price_range(draft.min_price, draft.max_price)?;

    Ok(SearchSpec {
        search_query: draft.search_query.clone(),
        min_price: draft.min_price,
        max_price: draft.max_price,
        frequency: rules.default_frequency,
        locations,
        listing_type: draft.listing_type.unwrap_or_default(),
    })
}

/// Validate an update against the owner's *current* tier rules
///
/// Only fields present in the patch are re-checked and replaced. The
/// frequency is re-stamped to the current tier default unconditionally,
/// since the tier may have changed after the record was created. The
/// quota is not re-checked on update.
pub fn validate_update(
    tier: Tier,
    current: &SearchSpec,
    patch: &SearchPatch,
) -> Result<SearchSpec, PolicyError> {
    let rules = tier.rules();
    let mut next = current.clone();

    if let Some(query) = &patch.search_query {
        check_query(tier, query)?;
        next.search_query = query.clone();
    }
    if let Some(min) = patch.min_price {
        next.min_price = Some(min);
    }
    if let Some(max) = patch.max_price {
        next.max_price = Some(max);
    }
    if let Some(raw) = &patch.locations {
        next.locations = check_locations(tier, Some(raw))?;
    }
    if let Some(listing_type) = patch.listing_type {
        next.listing_type = listing_type;
    }

    // Cross-field check runs on the merged pair, not just the patched side.
    check_price_range(next.min_price, next.max_price)?;

    next.frequency = rules.default_frequency;
    Ok(next)
}

fn check_query(tier: Tier, query: &str) -> Result<(), PolicyError> {
    let limit = tier.rules().max_query_words;
    if query.split_whitespace().count() > limit {
        return Err(PolicyError::QueryTooLong { tier, limit });
    }
    Ok(())
}

fn check_locations(tier: Tier, raw: Option<&str>) -> Result<Option<String>, PolicyError> {
    let parsed = raw.map(parse_locations).unwrap_or_default();

    match tier.rules().location_rule {
        LocationRule::Only(allowed) => {
            if parsed.iter().any(|loc| !loc.eq_ignore_ascii_case(allowed)) {
                return Err(PolicyError::InvalidLocation(format!(
                    "{tier} tier only supports searches in {allowed}"
                )));
            }
        }
        LocationRule::AtMost(limit) => {
            if parsed.len() > limit {
                return Err(PolicyError::InvalidLocation(format!(
                    "{tier} tier supports at most {limit} locations"
                )));
            }
        }
        LocationRule::Unlimited => {}
    }

    if parsed.is_empty() {
        Ok(None)
    } else {
        Ok(Some(parsed.join(",")))
    }
}

fn check_price_range(min: Option<i32>, max: Option<i32>) -> Result<(), PolicyError> {
    if let (Some(min), Some(max)) = (min, max) {
        if min > max {
            return Err(PolicyError::InvalidPriceRange { min, max });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::ListingType;

    fn draft(query: &str) -> SearchDraft {
        SearchDraft {
            search_query: query.to_string(),
            min_price: None,
            max_price: None,
            locations: None,
            listing_type: None,
        }
    }

    #[test]
    fn stamps_tier_default_frequency_on_create() {
        for (tier, expected) in [(Tier::Free, 3600), (Tier::Mid, 1800), (Tier::Top, 30)] {
            let spec = validate_create(tier, 0, &draft("laptop")).unwrap();
            assert_eq!(spec.frequency, expected);
        }
    }

    #[test]
    fn free_tier_second_search_exceeds_quota() {
        assert_eq!(
            validate_create(Tier::Free, 1, &draft("laptop")),
            Err(PolicyError::QuotaExceeded {
                tier: Tier::Free,
                limit: 1
            })
        );
    }

    #[test]
    fn top_tier_quota_boundary() {
        assert!(validate_create(Tier::Top, 24, &draft("laptop")).is_ok());
        assert_eq!(
            validate_create(Tier::Top, 25, &draft("laptop")),
            Err(PolicyError::QuotaExceeded {
                tier: Tier::Top,
                limit: 25
            })
        );
    }

    #[test]
    fn free_tier_word_count_boundary() {
        assert!(validate_create(Tier::Free, 0, &draft("laptop")).is_ok());
        assert_eq!(
            validate_create(Tier::Free, 0, &draft("gaming laptop")),
            Err(PolicyError::QueryTooLong {
                tier: Tier::Free,
                limit: 1
            })
        );
    }

    #[test]
    fn mid_tier_allows_two_words() {
        assert!(validate_create(Tier::Mid, 0, &draft("gaming laptop")).is_ok());
        assert!(matches!(
            validate_create(Tier::Mid, 0, &draft("cheap gaming laptop")),
            Err(PolicyError::QueryTooLong { .. })
        ));
    }

    #[test]
    fn free_tier_rejects_non_usa_locations() {
        let mut d = draft("laptop");
        d.locations = Some("Canada".to_string());
        assert!(matches!(
            validate_create(Tier::Free, 0, &d),
            Err(PolicyError::InvalidLocation(_))
        ));
    }

    #[test]
    fn free_tier_accepts_usa_any_case() {
        for raw in ["usa", "USA", "Usa", " usa , USA "] {
            let mut d = draft("laptop");
            d.locations = Some(raw.to_string());
            let spec = validate_create(Tier::Free, 0, &d).unwrap();
            assert!(spec.locations.is_some(), "locations dropped for {raw:?}");
        }
    }

    #[test]
    fn mid_tier_location_count_boundary() {
        let mut d = draft("laptop");
        d.locations = Some("a,b,c,d,e".to_string());
        assert!(validate_create(Tier::Mid, 0, &d).is_ok());

        d.locations = Some("a,b,c,d,e,f".to_string());
        assert!(matches!(
            validate_create(Tier::Mid, 0, &d),
            Err(PolicyError::InvalidLocation(_))
        ));
    }

    #[test]
    fn top_tier_locations_are_unlimited() {
        let mut d = draft("vintage mechanical keyboard");
        d.locations = Some((0..40).map(|i| format!("loc{i}")).collect::<Vec<_>>().join(","));
        assert!(validate_create(Tier::Top, 0, &d).is_ok());
    }

    #[test]
    fn blank_locations_mean_no_filter() {
        let mut d = draft("laptop");
        d.locations = Some(" , ,".to_string());
        let spec = validate_create(Tier::Free, 0, &d).unwrap();
        assert_eq!(spec.locations, None);
    }

    #[test]
    fn locations_are_normalized() {
        let mut d = draft("laptop");
        d.locations = Some(" usa ,  USA ".to_string());
        let spec = validate_create(Tier::Free, 0, &d).unwrap();
        assert_eq!(spec.locations.as_deref(), Some("usa,USA"));
    }

    #[test]
    fn inverted_price_range_is_rejected() {
        let mut d = draft("laptop");
        d.min_price = Some(100);
        d.max_price = Some(50);
        assert_eq!(
            validate_create(Tier::Free, 0, &d),
            Err(PolicyError::InvalidPriceRange { min: 100, max: 50 })
        );
    }

    #[test]
    fn single_sided_price_bounds_are_fine() {
        let mut d = draft("laptop");
        d.min_price = Some(100);
        assert!(validate_create(Tier::Free, 0, &d).is_ok());

        let mut d = draft("laptop");
        d.max_price = Some(50);
        assert!(validate_create(Tier::Free, 0, &d).is_ok());
    }

    #[test]
    fn listing_type_defaults_to_all() {
        let spec = validate_create(Tier::Free, 0, &draft("laptop")).unwrap();
        assert_eq!(spec.listing_type, ListingType::All);
    }

    fn existing_spec() -> SearchSpec {
        SearchSpec {
            search_query: "laptop".to_string(),
            min_price: Some(50),
            max_price: Some(500),
            frequency: 3600,
            locations: Some("USA".to_string()),
            listing_type: ListingType::BuyItNow,
        }
    }

    #[test]
    fn empty_patch_restamps_frequency_and_keeps_fields() {
        let current = existing_spec();
        let next = validate_update(Tier::Free, &current, &SearchPatch::default()).unwrap();
        assert_eq!(next, current);

        // After a tier change, the same empty patch moves the frequency.
        let next = validate_update(Tier::Top, &current, &SearchPatch::default()).unwrap();
        assert_eq!(next.frequency, 30);
        assert_eq!(next.search_query, current.search_query);
        assert_eq!(next.min_price, current.min_price);
        assert_eq!(next.max_price, current.max_price);
        assert_eq!(next.locations, current.locations);
        assert_eq!(next.listing_type, current.listing_type);
    }

    #[test]
    fn update_rechecks_patched_query() {
        let patch = SearchPatch {
            search_query: Some("gaming laptop".to_string()),
            ..SearchPatch::default()
        };
        assert!(matches!(
            validate_update(Tier::Free, &existing_spec(), &patch),
            Err(PolicyError::QueryTooLong { .. })
        ));
        assert!(validate_update(Tier::Mid, &existing_spec(), &patch).is_ok());
    }

    #[test]
    fn update_price_check_sees_merged_pair() {
        // Patch only the minimum above the stored maximum.
        let patch = SearchPatch {
            min_price: Some(600),
            ..SearchPatch::default()
        };
        assert_eq!(
            validate_update(Tier::Free, &existing_spec(), &patch),
            Err(PolicyError::InvalidPriceRange { min: 600, max: 500 })
        );
    }

    #[test]
    fn update_does_not_recheck_quota() {
        // A free user with an over-quota record from an earlier tier can
        // still edit it.
        let patch = SearchPatch {
            min_price: Some(10),
            ..SearchPatch::default()
        };
        assert!(validate_update(Tier::Free, &existing_spec(), &patch).is_ok());
    }

    #[test]
    fn update_validates_patched_locations_against_current_tier() {
        let patch = SearchPatch {
            locations: Some("Canada".to_string()),
            ..SearchPatch::default()
        };
        assert!(matches!(
            validate_update(Tier::Free, &existing_spec(), &patch),
            Err(PolicyError::InvalidLocation(_))
        ));
        assert!(validate_update(Tier::Mid, &existing_spec(), &patch).is_ok());
    }
}
