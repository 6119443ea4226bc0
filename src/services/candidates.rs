use std::sync::Arc;

use crate::{
    models::Show,
    services::providers::{static_catalog::fallback_shows, CatalogProvider},
};

/// Supplies the candidate pool for scoring.
///
/// Never returns an empty pool: catalog failures and empty catalogs both fall
/// back to the fixed list in [`fallback_shows`].
#[derive(Clone)]
pub struct CandidateSupplier {
    catalog: Arc<dyn CatalogProvider>,
}

impl CandidateSupplier {
    pub fn new(catalog: Arc<dyn CatalogProvider>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &Arc<dyn CatalogProvider> {
        &self.catalog
    }

    pub async fn get_available_shows(&self, user_id: &str) -> Vec<Show> {
        match self.catalog.popular_shows().await {
            Ok(shows) if !shows.is_empty() => {
                tracing::debug!(
                    user_id = %user_id,
                    provider = self.catalog.name(),
                    count = shows.len(),
                    "Loaded candidate shows"
                );
                shows
            }
            Ok(_) => {
                tracing::warn!(
                    provider = self.catalog.name(),
                    "Catalog returned no shows, using fallback list"
                );
                fallback_shows()
            }
            Err(e) => {
                tracing::warn!(
                    provider = self.catalog.name(),
                    error = %e,
                    "Catalog unavailable, using fallback list"
                );
                fallback_shows()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::AppError, services::providers::MockCatalogProvider};

    fn supplier(mock: MockCatalogProvider) -> CandidateSupplier {
        CandidateSupplier::new(Arc::new(mock))
    }

    #[tokio::test]
    async fn test_catalog_failure_returns_fallback() {
        let mut catalog = MockCatalogProvider::new();
        catalog
            .expect_popular_shows()
            .returning(|| Err(AppError::ExternalApi("TMDB down".to_string())));
        catalog.expect_name().return_const("mock");

        let shows = supplier(catalog).get_available_shows("u1").await;
        assert_eq!(shows, fallback_shows());
    }

    #[tokio::test]
    async fn test_empty_catalog_returns_fallback() {
        let mut catalog = MockCatalogProvider::new();
        catalog.expect_popular_shows().returning(|| Ok(Vec::new()));
        catalog.expect_name().return_const("mock");

        let shows = supplier(catalog).get_available_shows("u1").await;
        assert!(!shows.is_empty());
    }

    #[tokio::test]
    async fn test_catalog_shows_pass_through() {
        let mut catalog = MockCatalogProvider::new();
        catalog
            .expect_popular_shows()
            .returning(|| Ok(fallback_shows().into_iter().take(2).collect()));
        catalog.expect_name().return_const("mock");

        let shows = supplier(catalog).get_available_shows("u1").await;
        assert_eq!(shows.len(), 2);
    }
}
