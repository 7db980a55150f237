use opentelemetry::Context;
use rand::{Rng, seq::index};
use shared::errors::ServiceError;
use std::collections::HashSet;
use tracing::{error, info};

use crate::abstract_trait::DynCatalogClient;

/// Upper bound on ids returned per request.
pub const MAX_RESPONSES: usize = 5;

/// Picks up to `max` distinct ids from `catalog` that are not in `seen`,
/// uniformly without replacement. Duplicate catalog entries count once.
pub fn select_recommendations<R: Rng + ?Sized>(
    catalog: &[String],
    seen: &[String],
    max: usize,
    rng: &mut R,
) -> Vec<String> {
    let seen: HashSet<&str> = seen.iter().map(String::as_str).collect();

    let mut unique = HashSet::with_capacity(catalog.len());
    let candidates: Vec<&str> = catalog
        .iter()
        .map(String::as_str)
        .filter(|id| !seen.contains(id) && unique.insert(*id))
        .collect();

    let amount = max.min(candidates.len());

    index::sample(rng, candidates.len(), amount)
        .into_iter()
        .map(|i| candidates[i].to_string())
        .collect()
}

#[derive(Clone)]
pub struct RecommendationSelector {
    catalog: DynCatalogClient,
    max_responses: usize,
}

impl RecommendationSelector {
    pub fn new(catalog: DynCatalogClient) -> Self {
        Self {
            catalog,
            max_responses: MAX_RESPONSES,
        }
    }

    /// Fetches the catalog fresh and samples from it. A catalog failure is
    /// returned as is; there is no partial result.
    pub async fn list_recommendations(
        &self,
        seen: &[String],
        cx: &Context,
    ) -> Result<Vec<String>, ServiceError> {
        let catalog = self.catalog.list_product_ids(cx).await.inspect_err(|e| {
            error!("❌ Failed to list products from catalog: {e}");
        })?;

        let product_ids =
            select_recommendations(&catalog, seen, self.max_responses, &mut rand::rng());

        info!("[Recv ListRecommendations] product_ids={product_ids:?}");
        Ok(product_ids)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::abstract_trait::CatalogClient;
    use async_trait::async_trait;
    use rand::{SeedableRng, rngs::StdRng};
    use std::{
        collections::BTreeSet,
        sync::{
            Arc,
            atomic::{AtomicUsize, Ordering},
        },
    };

    pub(crate) fn ids(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    pub(crate) struct FakeCatalog {
        pub products: Option<Vec<String>>,
        pub calls: AtomicUsize,
    }

    impl FakeCatalog {
        pub(crate) fn listing(products: &[&str]) -> Self {
            Self {
                products: Some(ids(products)),
                calls: AtomicUsize::new(0),
            }
        }

        pub(crate) fn unavailable() -> Self {
            Self {
                products: None,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl CatalogClient for FakeCatalog {
        async fn list_product_ids(&self, _cx: &Context) -> Result<Vec<String>, ServiceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.products
                .clone()
                .ok_or_else(|| ServiceError::Dependency("Unavailable: connection refused".into()))
        }
    }

    #[test]
    fn test_excludes_seen_and_caps_at_five() {
        let catalog = ids(&["1", "2", "3", "4", "5", "6", "7"]);
        let seen = ids(&["1", "2"]);
        let mut rng = StdRng::seed_from_u64(7);

        let picked = select_recommendations(&catalog, &seen, MAX_RESPONSES, &mut rng);

        let as_set: BTreeSet<&str> = picked.iter().map(String::as_str).collect();
        assert_eq!(picked.len(), 5);
        assert_eq!(as_set, BTreeSet::from(["3", "4", "5", "6", "7"]));
    }

    #[test]
    fn test_everything_seen_yields_empty() {
        let catalog = ids(&["1", "2"]);
        let mut rng = StdRng::seed_from_u64(1);

        assert!(select_recommendations(&catalog, &catalog, MAX_RESPONSES, &mut rng).is_empty());
        assert!(select_recommendations(&[], &[], MAX_RESPONSES, &mut rng).is_empty());
    }

    #[test]
    fn test_small_candidate_pool_returns_all() {
        let catalog = ids(&["a", "b", "c", "d"]);
        let seen = ids(&["d", "unknown"]);
        let mut rng = StdRng::seed_from_u64(3);

        let mut picked = select_recommendations(&catalog, &seen, MAX_RESPONSES, &mut rng);
        picked.sort();
        assert_eq!(picked, ids(&["a", "b", "c"]));
    }

    #[test]
    fn test_duplicate_catalog_entries_are_counted_once() {
        let catalog = ids(&["x", "x", "y", "y", "y"]);
        let mut rng = StdRng::seed_from_u64(11);

        let mut picked = select_recommendations(&catalog, &[], MAX_RESPONSES, &mut rng);
        picked.sort();
        assert_eq!(picked, ids(&["x", "y"]));
    }

    #[test]
    fn test_selection_invariants_hold_for_random_inputs() {
        let mut rng = StdRng::seed_from_u64(2024);

        for _ in 0..200 {
            let catalog_len = rng.random_range(0..30);
            let catalog: Vec<String> = (0..catalog_len)
                .map(|_| format!("p{}", rng.random_range(0..40)))
                .collect();
            let seen: Vec<String> = (0..rng.random_range(0..10))
                .map(|_| format!("p{}", rng.random_range(0..40)))
                .collect();

            let picked = select_recommendations(&catalog, &seen, MAX_RESPONSES, &mut rng);

            let candidates: BTreeSet<&str> = catalog
                .iter()
                .map(String::as_str)
                .filter(|id| !seen.iter().any(|s| s == id))
                .collect();
            let distinct: BTreeSet<&str> = picked.iter().map(String::as_str).collect();

            assert_eq!(picked.len(), MAX_RESPONSES.min(candidates.len()));
            assert_eq!(distinct.len(), picked.len());
            assert!(distinct.is_subset(&candidates));
        }
    }

    #[test]
    fn test_repeated_calls_vary() {
        let catalog: Vec<String> = (0..20).map(|i| format!("p{i}")).collect();
        let mut rng = StdRng::seed_from_u64(99);

        let outcomes: BTreeSet<Vec<String>> = (0..50)
            .map(|_| select_recommendations(&catalog, &[], MAX_RESPONSES, &mut rng))
            .collect();

        assert!(outcomes.len() > 1);
    }

    #[tokio::test]
    async fn test_catalog_is_fetched_on_every_call() {
        let catalog = Arc::new(FakeCatalog::listing(&["1", "2", "3"]));
        let selector = RecommendationSelector::new(catalog.clone());

        for _ in 0..3 {
            let picked = selector
                .list_recommendations(&ids(&["1"]), &Context::new())
                .await
                .unwrap();
            assert_eq!(picked.len(), 2);
        }

        assert_eq!(catalog.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_catalog_failure_is_propagated() {
        let selector = RecommendationSelector::new(Arc::new(FakeCatalog::unavailable()));

        let err = selector
            .list_recommendations(&[], &Context::new())
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::Dependency(_)));
    }
}
