//! Periodic evaluation loop over saved searches
//!
//! The poller wakes on a fixed interval, loads every saved search together
//! with its owner, asks the item source for fresh matches and notifies the
//! owner when there are any. A failure while checking one search is logged
//! and never stops the sweep over the remaining searches.

use std::time::Duration;

use anyhow::Result;
use tokio::sync::watch;
use tracing::{error, info};

use crate::models::{Item, WatchedSearch};

/// Fixed sweep interval
pub const POLL_INTERVAL: Duration = Duration::from_secs(60);

/// Source of saved searches to evaluate
pub trait SearchStore {
    async fn list_all_with_owners(&self) -> Result<Vec<WatchedSearch>>;
}

/// Source of marketplace items matching a saved search
pub trait ItemSource {
    async fn find_new_items(&self, search: &WatchedSearch) -> Result<Vec<Item>>;
}

/// Delivery channel for alerts
pub trait Notifier {
    async fn send_email(&self, to: &str, subject: &str, body: &str) -> Result<()>;
    async fn send_message(&self, text: &str) -> Result<()>;
}

/// The evaluation loop itself, generic over its collaborators
pub struct Poller<R, S, N> {
    store: R,
    source: S,
    notifier: N,
    interval: Duration,
}

impl<R, S, N> Poller<R, S, N>
where
    R: SearchStore,
    S: ItemSource,
    N: Notifier,
{
    pub fn new(store: R, source: S, notifier: N) -> Self {
        Self::with_interval(store, source, notifier, POLL_INTERVAL)
    }

    pub fn with_interval(store: R, source: S, notifier: N, interval: Duration) -> Self {
        Self {
            store,
            source,
            notifier,
            interval,
        }
    }

    /// Run sweeps until the shutdown flag flips to true
    ///
    /// The sleep runs after every sweep, success or fault; cancellation
    /// takes effect at that suspension point.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        info!(interval_secs = self.interval.as_secs(), "Poller started");
        loop {
            let notified = self.tick().await;
            if notified > 0 {
                info!(notified, "Sweep complete");
            }

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("Poller stopping");
                        return;
                    }
                }
            }
        }
    }

    /// Evaluate every saved search once, returning how many produced an alert
    pub async fn tick(&self) -> usize {
        let searches = match self.store.list_all_with_owners().await {
            Ok(searches) => searches,
            Err(e) => {
                error!("Failed to load saved searches: {}", e);
                return 0;
            }
        };

        let mut notified = 0;
        for search in &searches {
            match self.check_search(search).await {
                Ok(true) => notified += 1,
                Ok(false) => {}
                Err(e) => {
                    // One broken search must not starve the rest
                    error!(search_id = %search.id, "Search check failed: {}", e);
                }
            }
        }
        notified
    }

    async fn check_search(&self, search: &WatchedSearch) -> Result<bool> {
        let items = self.source.find_new_items(search).await?;
        if items.is_empty() {
            return Ok(false);
        }

        let summary = render_summary(&search.search_query, &items);
        let subject = format!("New listings for \"{}\"", search.search_query);
        self.notifier
            .send_email(&search.owner.email, &subject, &summary)
            .await?;
        if let Err(e) = self.notifier.send_message(&summary).await {
            error!(search_id = %search.id, "Broadcast message failed: {}", e);
        }
        Ok(true)
    }
}

/// Plain-text digest of matched items
fn render_summary(query: &str, items: &[Item]) -> String {
    let mut out = format!("Found {} new listing(s) for \"{}\":\n", items.len(), query);
    for item in items {
        out.push_str(&format!("- {}: ${:.2}\n", item.title, item.price));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SearchOwner;
    use policy::{ListingType, Tier};
    use std::sync::{Arc, Mutex};
    use uuid::Uuid;

    fn watched(query: &str, email: &str) -> WatchedSearch {
        WatchedSearch {
            id: Uuid::new_v4(),
            owner: SearchOwner {
                id: Uuid::new_v4(),
                email: email.to_string(),
                subscription_tier: Tier::Free,
            },
            search_query: query.to_string(),
            min_price: None,
            max_price: None,
            frequency: 3600,
            locations: None,
            listing_type: ListingType::All,
        }
    }

    struct MockStore {
        searches: Vec<WatchedSearch>,
    }

    impl SearchStore for MockStore {
        async fn list_all_with_owners(&self) -> Result<Vec<WatchedSearch>> {
            Ok(self.searches.clone())
        }
    }

    struct FailingStore;

    impl SearchStore for FailingStore {
        async fn list_all_with_owners(&self) -> Result<Vec<WatchedSearch>> {
            anyhow::bail!("connection refused")
        }
    }

    /// Returns one item per search, except for the configured poison query
    struct MockSource {
        poison_query: Option<String>,
    }

    impl ItemSource for MockSource {
        async fn find_new_items(&self, search: &WatchedSearch) -> Result<Vec<Item>> {
            if self.poison_query.as_deref() == Some(search.search_query.as_str()) {
                anyhow::bail!("upstream 503");
            }
            Ok(vec![Item {
                title: format!("match for {}", search.search_query),
                price: 42.5,
            }])
        }
    }

    struct EmptySource;

    impl ItemSource for EmptySource {
        async fn find_new_items(&self, _search: &WatchedSearch) -> Result<Vec<Item>> {
            Ok(Vec::new())
        }
    }

    #[derive(Clone, Default)]
    struct MockNotifier {
        emails: Arc<Mutex<Vec<(String, String)>>>,
    }

    impl Notifier for MockNotifier {
        async fn send_email(&self, to: &str, subject: &str, _body: &str) -> Result<()> {
            self.emails
                .lock()
                .unwrap()
                .push((to.to_string(), subject.to_string()));
            Ok(())
        }

        async fn send_message(&self, _text: &str) -> Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn faulting_search_does_not_stop_the_sweep() {
        let store = MockStore {
            searches: vec![
                watched("laptop", "a@example.com"),
                watched("camera", "b@example.com"),
                watched("bike", "c@example.com"),
            ],
        };
        let source = MockSource {
            poison_query: Some("camera".to_string()),
        };
        let notifier = MockNotifier::default();
        let poller = Poller::new(store, source, notifier.clone());

        let notified = poller.tick().await;

        assert_eq!(notified, 2);
        let emails = notifier.emails.lock().unwrap();
        assert_eq!(emails.len(), 2);
        assert_eq!(emails[0].0, "a@example.com");
        assert_eq!(emails[1].0, "c@example.com");
    }

    #[tokio::test]
    async fn no_items_means_no_notification() {
        let store = MockStore {
            searches: vec![watched("laptop", "a@example.com")],
        };
        let poller = Poller::new(store, EmptySource, MockNotifier::default());

        assert_eq!(poller.tick().await, 0);
    }

    #[tokio::test]
    async fn store_failure_yields_empty_sweep() {
        let poller = Poller::new(
            FailingStore,
            MockSource { poison_query: None },
            MockNotifier::default(),
        );

        assert_eq!(poller.tick().await, 0);
    }

    #[tokio::test]
    async fn run_exits_on_shutdown_signal() {
        let store = MockStore {
            searches: Vec::new(),
        };
        let poller = Poller::with_interval(
            store,
            EmptySource,
            MockNotifier::default(),
            Duration::from_millis(5),
        );
        let (tx, rx) = watch::channel(false);

        let handle = tokio::spawn(async move { poller.run(rx).await });
        tokio::time::sleep(Duration::from_millis(20)).await;
        tx.send(true).unwrap();

        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("poller did not stop")
            .unwrap();
    }

    #[test]
    fn summary_lists_items_with_prices() {
        let items = vec![
            Item {
                title: "ThinkPad X1".to_string(),
                price: 199.99,
            },
            Item {
                title: "MacBook Air".to_string(),
                price: 450.0,
            },
        ];
        let summary = render_summary("laptop", &items);
        assert!(summary.starts_with("Found 2 new listing(s) for \"laptop\""));
        assert!(summary.contains("- ThinkPad X1: $199.99"));
        assert!(summary.contains("- MacBook Air: $450.00"));
    }
}
