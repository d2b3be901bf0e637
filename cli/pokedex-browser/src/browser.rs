//! Pagination and search over the catalog working set.

use std::num::NonZeroU32;

use futures::future::{join_all, try_join_all};
use pokedex_catalog::{CatalogClientError, ClientTrait, PokemonDetail};
use tokio::sync::broadcast;
use tracing::{debug, instrument};

use crate::events::CatalogEvent;

/// How many summaries the prefix scan pulls in one unpaged listing call.
///
/// The catalog has no native search endpoint, so prefix search is a
/// client-side approximation over the first chunk of the listing. The bound
/// trades completeness against request volume.
pub const PREFIX_SCAN_LIMIT: NonZeroU32 = NonZeroU32::new(1000).unwrap();

const EVENT_CHANNEL_CAPACITY: usize = 16;

/// Owns the pagination and search state and the currently visible working
/// set of detail entries.
///
/// All mutating operations take `&mut self`, so a page change and a search
/// can never be in flight at the same time; whichever completes has the final
/// word by construction.
pub struct CatalogBrowser<C> {
    client: C,
    current_page: u32,
    per_page: NonZeroU32,
    total_count: u64,
    query: String,
    working_set: Vec<PokemonDetail>,
    events: broadcast::Sender<CatalogEvent>,
}

impl<C: ClientTrait> CatalogBrowser<C> {
    pub fn new(client: C, per_page: NonZeroU32) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            client,
            current_page: 1,
            per_page,
            total_count: 0,
            query: String::new(),
            working_set: Vec::new(),
            events,
        }
    }

    /// Subscribe to load outcomes. Intended for the rendering layer.
    pub fn subscribe(&self) -> broadcast::Receiver<CatalogEvent> {
        self.events.subscribe()
    }

    /// The currently visible ordered sequence of detail entries.
    pub fn working_set(&self) -> &[PokemonDetail] {
        &self.working_set
    }

    /// Current page number; never below 1, even while the catalog is empty.
    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn per_page(&self) -> NonZeroU32 {
        self.per_page
    }

    pub fn total_count(&self) -> u64 {
        self.total_count
    }

    /// The active free-text query; empty means search is off.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Number of pages implied by the last seen total count; 0 while the
    /// catalog is empty.
    pub fn total_pages(&self) -> u32 {
        total_pages(self.total_count, self.per_page)
    }

    /// A window of page numbers centered on the current page, at most three
    /// wide and clamped to `[1, total_pages]`.
    pub fn visible_pages(&self) -> Vec<u32> {
        page_window(self.current_page, self.total_pages())
    }

    /// Return pagination, query, and working set to their initial state
    /// without issuing a fetch.
    pub fn reset(&mut self) {
        self.current_page = 1;
        self.total_count = 0;
        self.query.clear();
        self.working_set.clear();
    }

    /// Load the current page: one listing call, then one detail fetch per
    /// summary, all issued concurrently and awaited as a batch.
    ///
    /// On success the working set is replaced, sorted ascending by weight
    /// (ties keep listing order), and a [`CatalogEvent::Loaded`] is emitted.
    /// Any failure aborts the whole load, leaves the previous working set
    /// untouched, emits [`CatalogEvent::LoadFailed`], and returns the error.
    /// Nothing is retried.
    #[instrument(skip_all, fields(page = self.current_page, per_page = %self.per_page))]
    pub async fn fetch_catalog_page(&mut self) -> Result<(), CatalogClientError> {
        match self.load_current_page().await {
            Ok((mut entries, total)) => {
                entries.sort_by_key(|entry| entry.weight);
                debug!(entries = entries.len(), total, "replacing working set");
                self.working_set = entries;
                self.total_count = total;
                let _ = self.events.send(CatalogEvent::Loaded {
                    entries: self.working_set.clone(),
                    total,
                });
                Ok(())
            },
            Err(err) => {
                debug!(%err, "page load failed, keeping previous working set");
                let _ = self.events.send(CatalogEvent::LoadFailed {
                    error: err.to_string(),
                });
                Err(err)
            },
        }
    }

    async fn load_current_page(
        &self,
    ) -> Result<(Vec<PokemonDetail>, u64), CatalogClientError> {
        let offset = u64::from(self.current_page - 1) * u64::from(self.per_page.get());
        let page = self.client.page(self.per_page, offset).await?;
        let details = try_join_all(
            page.results
                .iter()
                .map(|summary| self.client.pokemon_by_url(&summary.url)),
        )
        .await?;
        Ok((details, page.count))
    }

    /// Move `delta` pages and reload.
    ///
    /// A move that would land outside `[1, total_pages]` is a no-op: no state
    /// change, no request, `Ok(false)`. Otherwise the page is updated and the
    /// load awaited before returning `Ok(true)`.
    pub async fn change_page(&mut self, delta: i64) -> Result<bool, CatalogClientError> {
        let target = i64::from(self.current_page) + delta;
        if target < 1 || target > i64::from(self.total_pages()) {
            debug!(target, total_pages = self.total_pages(), "page change out of range");
            return Ok(false);
        }
        self.current_page = target as u32;
        self.fetch_catalog_page().await?;
        Ok(true)
    }

    /// Search the catalog.
    ///
    /// - An empty query turns search off and delegates to
    ///   [`Self::fetch_catalog_page`].
    /// - A query that parses as an integer is an exact-id lookup: a singleton
    ///   working set on success, an empty one on any failure. "Not found" is
    ///   an outcome here, not a fault, so no event is emitted.
    /// - Anything else is a case-insensitive name-prefix scan over the first
    ///   [`PREFIX_SCAN_LIMIT`] summaries; candidates whose detail fetch fails
    ///   are dropped individually, and a failed listing yields an empty set.
    #[instrument(skip_all, fields(query = %query))]
    pub async fn search(&mut self, query: &str) -> Result<(), CatalogClientError> {
        self.query = query.to_string();
        if query.is_empty() {
            return self.fetch_catalog_page().await;
        }

        if let Ok(id) = query.trim().parse::<u64>() {
            self.working_set = match self.client.pokemon(&id.to_string()).await {
                Ok(detail) => vec![detail],
                Err(err) => {
                    debug!(id, %err, "id lookup failed, treating as no match");
                    Vec::new()
                },
            };
            return Ok(());
        }

        self.working_set = self.prefix_scan(query).await;
        Ok(())
    }

    async fn prefix_scan(&self, query: &str) -> Vec<PokemonDetail> {
        let listing = match self.client.page(PREFIX_SCAN_LIMIT, 0).await {
            Ok(page) => page,
            Err(err) => {
                debug!(%err, "prefix listing failed, returning no matches");
                return Vec::new();
            },
        };

        let needle = query.to_lowercase();
        let candidates = listing
            .results
            .into_iter()
            .filter(|summary| summary.name.to_lowercase().starts_with(&needle));

        let fetched = join_all(candidates.map(|summary| {
            let client = &self.client;
            async move { client.pokemon_by_url(&summary.url).await }
        }))
        .await;

        fetched
            .into_iter()
            .filter_map(|result| match result {
                Ok(detail) => Some(detail),
                Err(err) => {
                    debug!(%err, "dropping candidate that failed to resolve");
                    None
                },
            })
            .collect()
    }
}

/// `ceil(total_count / per_page)`, with an empty catalog giving 0 pages.
pub(crate) fn total_pages(total_count: u64, per_page: NonZeroU32) -> u32 {
    total_count.div_ceil(u64::from(per_page.get())) as u32
}

/// `max(1, current-1) ..= min(total, current+1)`; shrinks rather than erring
/// when fewer than three pages exist, empty when there are none.
pub(crate) fn page_window(current_page: u32, total_pages: u32) -> Vec<u32> {
    let start = current_page.saturating_sub(1).max(1);
    let end = total_pages.min(current_page.saturating_add(1));
    (start..=end).collect()
}

#[cfg(test)]
mod tests {
    use httpmock::prelude::*;
    use pokedex_catalog::{CatalogClientConfig, PokeApiClient};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use serde_json::json;

    use super::*;

    fn browser(server: &MockServer, per_page: u32) -> CatalogBrowser<PokeApiClient> {
        let client = PokeApiClient::new(CatalogClientConfig {
            base_url: server.base_url(),
            user_agent: None,
        })
        .unwrap();
        CatalogBrowser::new(client, NonZeroU32::new(per_page).unwrap())
    }

    fn detail_body(id: u64, name: &str, weight: u32) -> serde_json::Value {
        json!({
            "id": id,
            "name": name,
            "weight": weight,
            "height": 7,
            "types": [{ "slot": 1, "type": { "name": "grass", "url": "t/12" } }],
            "sprites": { "front_default": "default.png" },
            "species": { "name": name, "url": format!("species/{id}") }
        })
    }

    fn mock_detail<'a>(
        server: &'a MockServer,
        id: u64,
        name: &str,
        weight: u32,
    ) -> httpmock::Mock<'a> {
        let body = detail_body(id, name, weight);
        server.mock(move |when, then| {
            when.method(GET).path(format!("/pokemon/{id}"));
            then.status(200).json_body(body.clone());
        })
    }

    fn listing_body(server: &MockServer, count: u64, entries: &[(u64, &str)]) -> serde_json::Value {
        let results: Vec<_> = entries
            .iter()
            .map(|(id, name)| {
                json!({ "name": name, "url": server.url(format!("/pokemon/{id}")) })
            })
            .collect();
        json!({ "count": count, "results": results })
    }

    fn names(entries: &[pokedex_catalog::PokemonDetail]) -> Vec<&str> {
        entries.iter().map(|entry| entry.name.as_str()).collect()
    }

    #[tokio::test]
    async fn fetch_sorts_by_weight_and_keeps_listing_order_on_ties() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET)
                .path("/pokemon")
                .query_param("limit", "10")
                .query_param("offset", "0");
            then.status(200).json_body(listing_body(&server, 3, &[
                (2, "ivysaur"),
                (1, "bulbasaur"),
                (3, "venusaur"),
            ]));
        });
        mock_detail(&server, 2, "ivysaur", 85);
        mock_detail(&server, 1, "bulbasaur", 69);
        mock_detail(&server, 3, "venusaur", 69);

        let mut browser = browser(&server, 10);
        let mut events = browser.subscribe();
        browser.fetch_catalog_page().await.unwrap();

        // 69-weight ties keep listing order: bulbasaur before venusaur.
        assert_eq!(names(browser.working_set()), vec![
            "bulbasaur", "venusaur", "ivysaur"
        ]);
        assert_eq!(browser.total_count(), 3);

        match events.try_recv().unwrap() {
            CatalogEvent::Loaded { entries, total } => {
                assert_eq!(entries.len(), 3);
                assert_eq!(total, 3);
            },
            other => panic!("expected Loaded, found {other:?}"),
        }
    }

    #[tokio::test]
    async fn failed_page_load_keeps_previous_working_set() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET)
                .path("/pokemon")
                .query_param("offset", "0");
            then.status(200)
                .json_body(listing_body(&server, 20, &[(1, "bulbasaur")]));
        });
        server.mock(|when, then| {
            when.method(GET)
                .path("/pokemon")
                .query_param("offset", "10");
            then.status(200)
                .json_body(listing_body(&server, 20, &[(999, "missingno")]));
        });
        mock_detail(&server, 1, "bulbasaur", 69);
        server.mock(|when, then| {
            when.method(GET).path("/pokemon/999");
            then.status(500);
        });

        let mut browser = browser(&server, 10);
        let mut events = browser.subscribe();
        browser.fetch_catalog_page().await.unwrap();
        let _ = events.try_recv().unwrap();

        let err = browser.change_page(1).await.unwrap_err();
        assert!(matches!(err, CatalogClientError::Http { .. }));
        // Prior page 1 content stays visible; only the page number moved.
        assert_eq!(names(browser.working_set()), vec!["bulbasaur"]);
        assert_eq!(browser.current_page(), 2);
        assert!(matches!(
            events.try_recv().unwrap(),
            CatalogEvent::LoadFailed { .. }
        ));
    }

    #[tokio::test]
    async fn out_of_range_page_change_is_a_noop() {
        let server = MockServer::start_async().await;
        let listing = server.mock(|when, then| {
            when.method(GET)
                .path("/pokemon")
                .query_param("offset", "0");
            then.status(200)
                .json_body(listing_body(&server, 45, &[(1, "bulbasaur")]));
        });
        mock_detail(&server, 1, "bulbasaur", 69);

        let mut browser = browser(&server, 10);

        // An empty catalog has zero pages, so every move is out of range.
        assert!(!browser.change_page(1).await.unwrap());
        listing.assert_hits(0);

        browser.fetch_catalog_page().await.unwrap();
        listing.assert_hits(1);
        assert_eq!(browser.total_pages(), 5);

        assert!(!browser.change_page(-1).await.unwrap());
        assert!(!browser.change_page(5).await.unwrap());
        assert_eq!(browser.current_page(), 1);
        // Neither no-op issued a request.
        listing.assert_hits(1);
    }

    #[tokio::test]
    async fn empty_query_delegates_to_page_fetch() {
        let server = MockServer::start_async().await;
        let listing = server.mock(|when, then| {
            when.method(GET)
                .path("/pokemon")
                .query_param("limit", "10")
                .query_param("offset", "0");
            then.status(200)
                .json_body(listing_body(&server, 1, &[(1, "bulbasaur")]));
        });
        mock_detail(&server, 1, "bulbasaur", 69);

        let mut browser = browser(&server, 10);
        browser.search("").await.unwrap();

        assert_eq!(names(browser.working_set()), vec!["bulbasaur"]);
        assert_eq!(browser.query(), "");
        listing.assert();
    }

    #[tokio::test]
    async fn id_search_yields_singleton_on_success() {
        let server = MockServer::start_async().await;
        mock_detail(&server, 1, "bulbasaur", 69);

        let mut browser = browser(&server, 10);
        browser.search("1").await.unwrap();

        assert_eq!(names(browser.working_set()), vec!["bulbasaur"]);
        assert_eq!(browser.query(), "1");
    }

    #[tokio::test]
    async fn id_search_yields_empty_set_on_miss() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/pokemon/99999");
            then.status(404);
        });

        let mut browser = browser(&server, 10);
        let mut events = browser.subscribe();
        browser.search("99999").await.unwrap();

        assert!(browser.working_set().is_empty());
        // A miss is an outcome, not a fault.
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn prefix_search_is_case_insensitive_and_drops_failing_candidates() {
        let server = MockServer::start_async().await;
        let listing = server.mock(|when, then| {
            when.method(GET)
                .path("/pokemon")
                .query_param("limit", "1000")
                .query_param("offset", "0");
            then.status(200).json_body(listing_body(&server, 4, &[
                (4, "charmander"),
                (5, "charmeleon"),
                (6, "charizard"),
                (1, "bulbasaur"),
            ]));
        });
        mock_detail(&server, 4, "charmander", 85);
        mock_detail(&server, 6, "charizard", 905);
        server.mock(|when, then| {
            when.method(GET).path("/pokemon/5");
            then.status(500);
        });

        let mut browser = browser(&server, 10);
        browser.search("CHAR").await.unwrap();

        // charmeleon's detail fetch failed and was dropped, not fatal.
        assert_eq!(names(browser.working_set()), vec!["charmander", "charizard"]);
        listing.assert();
    }

    #[tokio::test]
    async fn prefix_search_with_failed_listing_yields_empty_set() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET)
                .path("/pokemon")
                .query_param("limit", "10")
                .query_param("offset", "0");
            then.status(200)
                .json_body(listing_body(&server, 1, &[(1, "bulbasaur")]));
        });
        server.mock(|when, then| {
            when.method(GET)
                .path("/pokemon")
                .query_param("limit", "1000");
            then.status(500);
        });
        mock_detail(&server, 1, "bulbasaur", 69);

        let mut browser = browser(&server, 10);
        browser.fetch_catalog_page().await.unwrap();
        assert_eq!(browser.working_set().len(), 1);

        browser.search("bulba").await.unwrap();
        assert!(browser.working_set().is_empty());
    }

    #[tokio::test]
    async fn repeated_fetch_against_stable_data_is_idempotent() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET)
                .path("/pokemon")
                .query_param("offset", "0");
            then.status(200).json_body(listing_body(&server, 2, &[
                (1, "bulbasaur"),
                (2, "ivysaur"),
            ]));
        });
        mock_detail(&server, 1, "bulbasaur", 69);
        mock_detail(&server, 2, "ivysaur", 85);

        let mut browser = browser(&server, 10);
        browser.fetch_catalog_page().await.unwrap();
        let first = browser.working_set().to_vec();
        browser.fetch_catalog_page().await.unwrap();
        assert_eq!(browser.working_set(), first.as_slice());
    }

    #[tokio::test]
    async fn visible_pages_follow_the_current_page() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/pokemon");
            then.status(200).json_body(listing_body(&server, 45, &[]));
        });

        let mut browser = browser(&server, 10);
        assert_eq!(browser.visible_pages(), Vec::<u32>::new());

        browser.fetch_catalog_page().await.unwrap();
        assert_eq!(browser.visible_pages(), vec![1, 2]);
    }

    #[tokio::test]
    async fn reset_returns_to_initial_state_without_fetching() {
        let server = MockServer::start_async().await;
        let listing = server.mock(|when, then| {
            when.method(GET).path("/pokemon");
            then.status(200)
                .json_body(listing_body(&server, 45, &[(1, "bulbasaur")]));
        });
        mock_detail(&server, 1, "bulbasaur", 69);

        let mut browser = browser(&server, 10);
        browser.fetch_catalog_page().await.unwrap();
        browser.search("bulba").await.unwrap();
        let hits_before = listing.hits();

        browser.reset();
        assert_eq!(browser.current_page(), 1);
        assert_eq!(browser.total_count(), 0);
        assert_eq!(browser.query(), "");
        assert!(browser.working_set().is_empty());
        // reset never talks to the network
        assert_eq!(listing.hits(), hits_before);
    }

    #[test]
    fn total_pages_rounds_up() {
        let per_page = NonZeroU32::new(10).unwrap();
        assert_eq!(total_pages(45, per_page), 5);
        assert_eq!(total_pages(25, per_page), 3);
        assert_eq!(total_pages(0, per_page), 0);
    }

    #[test]
    fn page_window_shrinks_at_the_edges() {
        assert_eq!(page_window(1, 10), vec![1, 2]);
        assert_eq!(page_window(5, 10), vec![4, 5, 6]);
        assert_eq!(page_window(10, 10), vec![9, 10]);
        assert_eq!(page_window(1, 1), vec![1]);
        assert_eq!(page_window(1, 0), Vec::<u32>::new());
    }

    proptest! {
        #[test]
        fn total_pages_is_the_ceiling(total in 0u64..100_000, per_page in 1u32..1_000) {
            let per = NonZeroU32::new(per_page).unwrap();
            let expected = (total + u64::from(per_page) - 1) / u64::from(per_page);
            prop_assert_eq!(u64::from(total_pages(total, per)), expected);
        }

        #[test]
        fn page_window_stays_in_bounds(current in 1u32..1_000, total in 0u32..1_000) {
            let window = page_window(current, total);
            prop_assert!(window.len() <= 3);
            for page in window {
                prop_assert!((1..=total).contains(&page));
            }
        }
    }
}
