//! eBay Browse API client, the concrete item source

use anyhow::Result;
use policy::ListingType;
use serde::Deserialize;
use tracing::debug;

use crate::models::{Item, WatchedSearch};
use crate::poller::ItemSource;

/// Configuration for the eBay Browse API client
#[derive(Debug, Clone)]
pub struct EbayConfig {
    /// Item summary search endpoint
    pub api_url: String,
    /// OAuth application token
    pub oauth_token: String,
}

impl EbayConfig {
    /// Create a new EbayConfig from environment variables
    ///
    /// # Environment Variables
    /// - `EBAY_API_URL`: search endpoint (default: production Browse API)
    /// - `EBAY_OAUTH_TOKEN`: application token (default: empty, calls will fail)
    pub fn from_env() -> Result<Self> {
        let api_url = std::env::var("EBAY_API_URL").unwrap_or_else(|_| {
            "https://api.ebay.com/buy/browse/v1/item_summary/search".to_string()
        });
        let oauth_token = std::env::var("EBAY_OAUTH_TOKEN").unwrap_or_default();

        Ok(EbayConfig {
            api_url,
            oauth_token,
        })
    }
}

#[derive(Deserialize)]
struct BrowseResponse {
    #[serde(rename = "itemSummaries", default)]
    item_summaries: Vec<ItemSummary>,
}

#[derive(Deserialize)]
struct ItemSummary {
    title: String,
    price: Option<ItemPrice>,
}

#[derive(Deserialize)]
struct ItemPrice {
    value: String,
}

/// eBay Browse API client
#[derive(Clone)]
pub struct EbayClient {
    http: reqwest::Client,
    config: EbayConfig,
}

impl EbayClient {
    pub fn new(config: EbayConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }
}

/// Translate the search definition into a Browse API filter expression
fn build_filter(search: &WatchedSearch) -> Option<String> {
    let mut parts = Vec::new();

    match (search.min_price, search.max_price) {
        (Some(min), Some(max)) => parts.push(format!("price:[{min}..{max}]")),
        (Some(min), None) => parts.push(format!("price:[{min}..]")),
        (None, Some(max)) => parts.push(format!("price:[..{max}]")),
        (None, None) => {}
    }

    match search.listing_type {
        ListingType::All => {}
        ListingType::Auction => parts.push("buyingOptions:{AUCTION}".to_string()),
        ListingType::BuyItNow => parts.push("buyingOptions:{FIXED_PRICE}".to_string()),
    }

    if let Some(locations) = &search.locations {
        let countries = policy::parse_locations(locations).join("|");
        if !countries.is_empty() {
            parts.push(format!("itemLocationCountry:{{{countries}}}"));
        }
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(","))
    }
}

impl ItemSource for EbayClient {
    /// Query the Browse API for newly listed items matching the search
    async fn find_new_items(&self, search: &WatchedSearch) -> Result<Vec<Item>> {
        let mut query = vec![
            ("q".to_string(), search.search_query.clone()),
            ("sort".to_string(), "newlyListed".to_string()),
            ("limit".to_string(), "20".to_string()),
        ];
        if let Some(filter) = build_filter(search) {
            query.push(("filter".to_string(), filter));
        }

        debug!(search_id = %search.id, "Querying item source");

        let response: BrowseResponse = self
            .http
            .get(&self.config.api_url)
            .bearer_auth(&self.config.oauth_token)
            .query(&query)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let items = response
            .item_summaries
            .into_iter()
            .map(|summary| Item {
                title: summary.title,
                price: summary
                    .price
                    .and_then(|p| p.value.parse().ok())
                    .unwrap_or(0.0),
            })
            .collect();

        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SearchOwner;
    use policy::Tier;
    use uuid::Uuid;

    fn search() -> WatchedSearch {
        WatchedSearch {
            id: Uuid::new_v4(),
            owner: SearchOwner {
                id: Uuid::new_v4(),
                email: "a@example.com".to_string(),
                subscription_tier: Tier::Top,
            },
            search_query: "laptop".to_string(),
            min_price: None,
            max_price: None,
            frequency: 30,
            locations: None,
            listing_type: ListingType::All,
        }
    }

    #[test]
    fn no_filter_for_bare_search() {
        assert_eq!(build_filter(&search()), None);
    }

    #[test]
    fn filter_includes_price_range_and_buying_option() {
        let mut s = search();
        s.min_price = Some(50);
        s.max_price = Some(500);
        s.listing_type = ListingType::BuyItNow;
        assert_eq!(
            build_filter(&s).as_deref(),
            Some("price:[50..500],buyingOptions:{FIXED_PRICE}")
        );
    }

    #[test]
    fn filter_handles_open_ended_prices_and_locations() {
        let mut s = search();
        s.max_price = Some(100);
        s.locations = Some("US, CA".to_string());
        assert_eq!(
            build_filter(&s).as_deref(),
            Some("price:[..100],itemLocationCountry:{US|CA}")
        );
    }

    #[test]
    fn browse_response_parses_and_defaults() {
        let body = r#"{"itemSummaries":[{"title":"ThinkPad","price":{"value":"199.99"}},{"title":"No price"}]}"#;
        let parsed: BrowseResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.item_summaries.len(), 2);
        assert!(parsed.item_summaries[1].price.is_none());

        let empty: BrowseResponse = serde_json::from_str("{}").unwrap();
        assert!(empty.item_summaries.is_empty());
    }
}
