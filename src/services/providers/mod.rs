/// Catalog and chat-completion collaborators
///
/// Catalog providers supply candidate shows and hydrate ids into full details.
/// `TmdbProvider` talks to TMDB; `StaticCatalog` serves a fixed list when no
/// TMDB key is configured. The chat provider backs the AI scorer.
use crate::{
    error::AppResult,
    models::{Show, ShowDetail},
};

pub mod openai;
pub mod static_catalog;
pub mod tmdb;

#[cfg(test)]
pub use openai::MockChatProvider;
pub use openai::{ChatProvider, OpenAiChatProvider};
pub use static_catalog::StaticCatalog;
pub use tmdb::TmdbProvider;

/// Trait for content catalog providers
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Currently popular series, used as the candidate pool
    async fn popular_shows(&self) -> AppResult<Vec<Show>>;

    async fn show_details(&self, id: u64) -> AppResult<ShowDetail>;

    async fn movie_details(&self, id: u64) -> AppResult<ShowDetail>;

    /// Resolves an id of unknown type: TV first, then movie
    async fn content_details(&self, id: u64) -> AppResult<ShowDetail> {
        match self.show_details(id).await {
            Ok(details) => Ok(details),
            Err(e) => {
                tracing::debug!(id, error = %e, "No TV match, trying movie lookup");
                self.movie_details(id).await
            }
        }
    }

    /// Provider name for logging and source attribution
    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::AppError, models::MediaType};

    struct MoviesOnly;

    #[async_trait::async_trait]
    impl CatalogProvider for MoviesOnly {
        async fn popular_shows(&self) -> AppResult<Vec<Show>> {
            Ok(Vec::new())
        }

        async fn show_details(&self, id: u64) -> AppResult<ShowDetail> {
            Err(AppError::NotFound(format!("tv {}", id)))
        }

        async fn movie_details(&self, id: u64) -> AppResult<ShowDetail> {
            Ok(ShowDetail {
                media_type: MediaType::Movie,
                ..ShowDetail::placeholder(id)
            })
        }

        fn name(&self) -> &'static str {
            "movies-only"
        }
    }

    #[tokio::test]
    async fn test_content_details_falls_back_to_movie() {
        let details = MoviesOnly.content_details(27205).await.unwrap();
        assert_eq!(details.media_type, MediaType::Movie);
        assert_eq!(details.id, 27205);
    }
}
