use std::collections::HashMap;

use tokio::sync::RwLock;

use super::{AnalyticsProvider, ProfileStore};
use crate::{
    error::AppResult,
    models::{
        BehaviorMetrics, ContentEngagement, CurrentlyWatching, SimilarUser, StoredPreferences,
        UserBehaviorAnalytics, ViewingRecord, WatchlistEntry,
    },
};

/// Everything stored for one user
#[derive(Debug, Clone, Default)]
pub struct UserRecord {
    pub viewing_history: Vec<ViewingRecord>,
    pub watchlist: Vec<WatchlistEntry>,
    pub currently_watching: Vec<CurrentlyWatching>,
    pub preferences: Option<StoredPreferences>,
    pub behavior: Option<BehaviorMetrics>,
}

/// Profile store kept in process memory.
///
/// Used when no database is configured and in tests. Unknown users read as
/// empty records rather than errors.
#[derive(Default)]
pub struct InMemoryProfileStore {
    users: RwLock<HashMap<String, UserRecord>>,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_user(&self, user_id: impl Into<String>, record: UserRecord) {
        self.users.write().await.insert(user_id.into(), record);
    }

    async fn with_user<T>(&self, user_id: &str, f: impl FnOnce(&UserRecord) -> T) -> Option<T> {
        self.users.read().await.get(user_id).map(f)
    }
}

fn sorted_history(record: &UserRecord) -> Vec<ViewingRecord> {
    let mut history = record.viewing_history.clone();
    history.sort_by(|a, b| b.watched_at.cmp(&a.watched_at));
    history
}

#[async_trait::async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn viewing_history(&self, user_id: &str) -> AppResult<Vec<ViewingRecord>> {
        Ok(self
            .with_user(user_id, sorted_history)
            .await
            .unwrap_or_default())
    }

    async fn watchlist(&self, user_id: &str) -> AppResult<Vec<WatchlistEntry>> {
        Ok(self
            .with_user(user_id, |r| r.watchlist.clone())
            .await
            .unwrap_or_default())
    }

    async fn currently_watching(&self, user_id: &str) -> AppResult<Vec<CurrentlyWatching>> {
        Ok(self
            .with_user(user_id, |r| r.currently_watching.clone())
            .await
            .unwrap_or_default())
    }

    async fn preferences(&self, user_id: &str) -> AppResult<Option<StoredPreferences>> {
        Ok(self
            .with_user(user_id, |r| r.preferences.clone())
            .await
            .flatten())
    }

    async fn behavior_metrics(&self, user_id: &str) -> AppResult<Option<BehaviorMetrics>> {
        Ok(self
            .with_user(user_id, |r| r.behavior.clone())
            .await
            .flatten())
    }
}

#[async_trait::async_trait]
impl AnalyticsProvider for InMemoryProfileStore {
    async fn user_behavior_analytics(
        &self,
        user_id: &str,
        sample_size: usize,
    ) -> AppResult<UserBehaviorAnalytics> {
        let users = self.users.read().await;
        let Some(record) = users.get(user_id) else {
            return Ok(UserBehaviorAnalytics::default());
        };

        let history: Vec<ViewingRecord> = sorted_history(record)
            .into_iter()
            .take(sample_size)
            .collect();
        let total_views = history.len() as u64;
        let completion_rate = if history.is_empty() {
            0.0
        } else {
            history.iter().filter(|r| r.completed).count() as f64 / history.len() as f64
        };
        let ratings: Vec<f64> = history
            .iter()
            .filter_map(|r| r.rating.map(f64::from))
            .collect();
        let average_rating = if ratings.is_empty() {
            None
        } else {
            Some(ratings.iter().sum::<f64>() / ratings.len() as f64)
        };

        Ok(UserBehaviorAnalytics {
            total_views,
            favorite_genres: record
                .preferences
                .as_ref()
                .map(|p| p.favorite_genres.clone())
                .unwrap_or_default(),
            completion_rate,
            average_rating,
        })
    }

    /// Overlap of watched ids relative to the requesting user's history
    async fn find_similar_users(&self, user_id: &str, limit: usize) -> AppResult<Vec<SimilarUser>> {
        let users = self.users.read().await;
        let Some(record) = users.get(user_id) else {
            return Ok(Vec::new());
        };

        let mine: std::collections::HashSet<u64> =
            record.viewing_history.iter().map(|r| r.content_id).collect();
        if mine.is_empty() {
            return Ok(Vec::new());
        }

        let mut similar: Vec<SimilarUser> = users
            .iter()
            .filter(|(other_id, _)| other_id.as_str() != user_id)
            .filter_map(|(other_id, other)| {
                let theirs: std::collections::HashSet<u64> =
                    other.viewing_history.iter().map(|r| r.content_id).collect();
                let shared = mine.intersection(&theirs).count();
                (shared > 0).then(|| SimilarUser {
                    user_id: other_id.clone(),
                    similarity: shared as f64 / mine.len() as f64,
                })
            })
            .collect();

        similar.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.user_id.cmp(&b.user_id))
        });
        similar.truncate(limit);
        Ok(similar)
    }

    async fn content_engagement(&self, sample_size: usize) -> AppResult<Vec<ContentEngagement>> {
        let users = self.users.read().await;

        // content id -> (views, completed, rating sum, rating count)
        let mut stats: HashMap<u64, (u64, u64, f64, u64)> = HashMap::new();
        for record in users.values() {
            for view in &record.viewing_history {
                let entry = stats.entry(view.content_id).or_default();
                entry.0 += 1;
                if view.completed {
                    entry.1 += 1;
                }
                if let Some(rating) = view.rating {
                    entry.2 += f64::from(rating);
                    entry.3 += 1;
                }
            }
        }

        let mut engagement: Vec<ContentEngagement> = stats
            .into_iter()
            .map(|(content_id, (views, completed, rating_sum, rating_count))| ContentEngagement {
                content_id,
                views,
                completion_rate: completed as f64 / views as f64,
                average_rating: (rating_count > 0).then(|| rating_sum / rating_count as f64),
            })
            .collect();

        engagement.sort_by(|a, b| b.views.cmp(&a.views).then(a.content_id.cmp(&b.content_id)));
        engagement.truncate(sample_size);
        Ok(engagement)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MediaType;
    use chrono::{Duration, Utc};

    fn view(content_id: u64, days_ago: i64, completed: bool, rating: Option<u8>) -> ViewingRecord {
        ViewingRecord {
            content_id,
            media_type: MediaType::Tv,
            watched_at: Utc::now() - Duration::days(days_ago),
            watch_duration: if completed { 50 } else { 20 },
            total_duration: 50,
            completed,
            rating,
            skip_count: 0,
        }
    }

    async fn seeded_store() -> InMemoryProfileStore {
        let store = InMemoryProfileStore::new();
        store
            .insert_user(
                "alice",
                UserRecord {
                    viewing_history: vec![
                        view(1, 3, true, Some(9)),
                        view(2, 1, false, None),
                        view(3, 2, true, Some(7)),
                    ],
                    ..Default::default()
                },
            )
            .await;
        store
            .insert_user(
                "bob",
                UserRecord {
                    viewing_history: vec![view(1, 5, true, Some(8)), view(3, 4, true, None)],
                    ..Default::default()
                },
            )
            .await;
        store
            .insert_user(
                "carol",
                UserRecord {
                    viewing_history: vec![view(2, 5, true, None)],
                    ..Default::default()
                },
            )
            .await;
        store
    }

    #[tokio::test]
    async fn test_unknown_user_reads_empty() {
        let store = InMemoryProfileStore::new();
        assert!(store.viewing_history("nobody").await.unwrap().is_empty());
        assert!(store.preferences("nobody").await.unwrap().is_none());
        let analytics = store.user_behavior_analytics("nobody", 50).await.unwrap();
        assert_eq!(analytics.total_views, 0);
    }

    #[tokio::test]
    async fn test_history_is_most_recent_first() {
        let store = seeded_store().await;
        let history = store.viewing_history("alice").await.unwrap();
        let ids: Vec<u64> = history.iter().map(|r| r.content_id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[tokio::test]
    async fn test_behavior_analytics() {
        let store = seeded_store().await;
        let analytics = store.user_behavior_analytics("alice", 10).await.unwrap();
        assert_eq!(analytics.total_views, 3);
        assert!((analytics.completion_rate - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(analytics.average_rating, Some(8.0));
    }

    #[tokio::test]
    async fn test_similar_users_ranked_by_overlap() {
        let store = seeded_store().await;
        let similar = store.find_similar_users("alice", 10).await.unwrap();
        assert_eq!(similar.len(), 2);
        assert_eq!(similar[0].user_id, "bob");
        assert!((similar[0].similarity - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(similar[1].user_id, "carol");
        assert!(similar.iter().all(|s| (0.0..=1.0).contains(&s.similarity)));
    }

    #[tokio::test]
    async fn test_content_engagement_most_viewed_first() {
        let store = seeded_store().await;
        let engagement = store.content_engagement(2).await.unwrap();
        assert_eq!(engagement.len(), 2);
        assert_eq!(engagement[0].views, 2);
        assert_eq!(engagement[0].content_id, 1);
        assert_eq!(engagement[0].average_rating, Some(8.5));
    }
}
