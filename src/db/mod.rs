//! Storage collaborators: user profile data, aggregate analytics, and the
//! Redis cache used for catalog lookups.

use crate::{
    error::AppResult,
    models::{
        BehaviorMetrics, ContentEngagement, CurrentlyWatching, SimilarUser, StoredPreferences,
        UserBehaviorAnalytics, ViewingRecord, WatchlistEntry,
    },
};

pub mod memory;
pub mod postgres;
pub mod redis;

pub use memory::{InMemoryProfileStore, UserRecord};
pub use postgres::{create_pool, PgProfileStore};
pub use self::redis::create_redis_client;
pub use self::redis::Cache;
pub use self::redis::CacheKey;
pub use self::redis::CacheWriterHandle;

/// Per-user taste data as stored. The profile aggregator derives the rest.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ProfileStore: Send + Sync {
    /// Most recent first
    async fn viewing_history(&self, user_id: &str) -> AppResult<Vec<ViewingRecord>>;

    async fn watchlist(&self, user_id: &str) -> AppResult<Vec<WatchlistEntry>>;

    async fn currently_watching(&self, user_id: &str) -> AppResult<Vec<CurrentlyWatching>>;

    /// `None` when the user never saved preferences
    async fn preferences(&self, user_id: &str) -> AppResult<Option<StoredPreferences>>;

    async fn behavior_metrics(&self, user_id: &str) -> AppResult<Option<BehaviorMetrics>>;
}

/// Aggregates computed across users
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait AnalyticsProvider: Send + Sync {
    /// Summary over the user's most recent `sample_size` views
    async fn user_behavior_analytics(
        &self,
        user_id: &str,
        sample_size: usize,
    ) -> AppResult<UserBehaviorAnalytics>;

    /// Neighbours ordered by descending similarity
    async fn find_similar_users(&self, user_id: &str, limit: usize) -> AppResult<Vec<SimilarUser>>;

    /// Most viewed content across all users
    async fn content_engagement(&self, sample_size: usize) -> AppResult<Vec<ContentEngagement>>;
}
