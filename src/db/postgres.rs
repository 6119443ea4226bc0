use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{postgres::PgPoolOptions, types::Json, FromRow, PgPool};

use super::{AnalyticsProvider, ProfileStore};
use crate::{
    error::AppResult,
    models::{
        BehaviorMetrics, ContentComplexity, ContentEngagement, ContentPreferences, ContentRating,
        CurrentlyWatching, DeviceType, MediaType, PacePreference, SessionContext, SimilarUser,
        StoredPreferences, TemporalPatterns, TimeOfDay, UserBehaviorAnalytics, ViewingRecord,
        WatchlistEntry, WatchlistPriority,
    },
};

/// Creates a PostgreSQL connection pool
///
/// Establishes a pool of database connections for efficient reuse.
/// The pool automatically manages connection lifecycle and limits.
pub async fn create_pool(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    Ok(pool)
}

/// Profile and analytics store backed by the tables in `migrations/`
#[derive(Clone)]
pub struct PgProfileStore {
    pool: PgPool,
}

impl PgProfileStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct ViewingRow {
    content_id: i64,
    media_type: String,
    watched_at: DateTime<Utc>,
    watch_duration: i32,
    total_duration: i32,
    completed: bool,
    rating: Option<i16>,
    skip_count: i32,
}

impl From<ViewingRow> for ViewingRecord {
    fn from(row: ViewingRow) -> Self {
        ViewingRecord {
            content_id: row.content_id as u64,
            media_type: MediaType::parse(&row.media_type),
            watched_at: row.watched_at,
            watch_duration: row.watch_duration.max(0) as u32,
            total_duration: row.total_duration.max(0) as u32,
            completed: row.completed,
            rating: row.rating.map(|r| r.clamp(1, 10) as u8),
            skip_count: row.skip_count.max(0) as u32,
        }
    }
}

#[derive(FromRow)]
struct WatchlistRow {
    content_id: i64,
    media_type: String,
    added_at: DateTime<Utc>,
    priority: String,
    reason: Option<String>,
}

impl From<WatchlistRow> for WatchlistEntry {
    fn from(row: WatchlistRow) -> Self {
        let priority = match row.priority.as_str() {
            "high" => WatchlistPriority::High,
            "low" => WatchlistPriority::Low,
            _ => WatchlistPriority::Medium,
        };
        WatchlistEntry {
            content_id: row.content_id as u64,
            media_type: MediaType::parse(&row.media_type),
            added_at: row.added_at,
            priority,
            reason: row.reason,
        }
    }
}

#[derive(FromRow)]
struct CurrentlyWatchingRow {
    content_id: i64,
    media_type: String,
    progress: f64,
    last_watched: DateTime<Utc>,
    episodes_watched: Option<i32>,
    total_episodes: Option<i32>,
    binge_factor: f64,
}

impl From<CurrentlyWatchingRow> for CurrentlyWatching {
    fn from(row: CurrentlyWatchingRow) -> Self {
        CurrentlyWatching {
            content_id: row.content_id as u64,
            media_type: MediaType::parse(&row.media_type),
            progress: row.progress.clamp(0.0, 1.0),
            last_watched: row.last_watched,
            episodes_watched: row.episodes_watched.map(|e| e.max(0) as u32),
            total_episodes: row.total_episodes.map(|e| e.max(0) as u32),
            binge_factor: row.binge_factor.max(0.0),
        }
    }
}

#[derive(FromRow)]
struct PreferencesRow {
    favorite_genres: Vec<String>,
    preferred_networks: Vec<String>,
    content_rating: Option<String>,
    language_preferences: Vec<String>,
    mood: Option<String>,
    themes: Vec<String>,
    content_complexity: String,
    pace_preference: String,
    novelty_seeker: bool,
    comfort_watcher: bool,
    seasonal_trends: Json<HashMap<String, f64>>,
    temporal_patterns: Json<TemporalPatterns>,
    session_context: String,
    device_type: String,
}

/// Parses a lowercase enum name stored as text, falling back to the default
fn parse_label<T: serde::de::DeserializeOwned + Default>(value: &str) -> T {
    serde_json::from_value(serde_json::Value::String(value.to_lowercase())).unwrap_or_default()
}

impl From<PreferencesRow> for StoredPreferences {
    fn from(row: PreferencesRow) -> Self {
        StoredPreferences {
            favorite_genres: row.favorite_genres,
            preferred_networks: row.preferred_networks,
            content_rating: row.content_rating.as_deref().and_then(ContentRating::parse),
            language_preferences: row.language_preferences,
            preferences: ContentPreferences {
                mood: row.mood,
                themes: row.themes.into_iter().collect(),
                content_complexity: parse_label::<ContentComplexity>(&row.content_complexity),
                pace_preference: parse_label::<PacePreference>(&row.pace_preference),
                novelty_seeker: row.novelty_seeker,
                comfort_watcher: row.comfort_watcher,
            },
            seasonal_trends: row.seasonal_trends.0,
            temporal_patterns: row.temporal_patterns.0,
            session_context: parse_label::<SessionContext>(&row.session_context),
            device_type: parse_label::<DeviceType>(&row.device_type),
        }
    }
}

#[derive(FromRow)]
struct BehaviorRow {
    average_watch_time: f64,
    skip_rate: f64,
    binge_frequency: f64,
    completion_rate: f64,
    repeat_watching: f64,
    preferred_watch_times: Vec<String>,
    device_preferences: Json<HashMap<DeviceType, f64>>,
}

impl From<BehaviorRow> for BehaviorMetrics {
    fn from(row: BehaviorRow) -> Self {
        BehaviorMetrics {
            average_watch_time: row.average_watch_time,
            skip_rate: row.skip_rate,
            binge_frequency: row.binge_frequency,
            completion_rate: row.completion_rate,
            repeat_watching: row.repeat_watching,
            preferred_watch_times: row
                .preferred_watch_times
                .iter()
                .filter_map(|t| {
                    serde_json::from_value::<TimeOfDay>(serde_json::Value::String(t.to_lowercase()))
                        .ok()
                })
                .collect(),
            device_preferences: row.device_preferences.0,
        }
    }
}

#[derive(FromRow)]
struct AnalyticsRow {
    total_views: i64,
    completion_rate: Option<f64>,
    average_rating: Option<f64>,
}

#[derive(FromRow)]
struct SimilarUserRow {
    user_id: String,
    similarity: f64,
}

#[derive(FromRow)]
struct EngagementRow {
    content_id: i64,
    views: i64,
    completion_rate: f64,
    average_rating: Option<f64>,
}

#[async_trait::async_trait]
impl ProfileStore for PgProfileStore {
    async fn viewing_history(&self, user_id: &str) -> AppResult<Vec<ViewingRecord>> {
        let rows = sqlx::query_as::<_, ViewingRow>(
            r#"
            SELECT content_id, media_type, watched_at, watch_duration, total_duration,
                   completed, rating, skip_count
            FROM viewing_history
            WHERE user_id = $1
            ORDER BY watched_at DESC
            LIMIT 500
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ViewingRecord::from).collect())
    }

    async fn watchlist(&self, user_id: &str) -> AppResult<Vec<WatchlistEntry>> {
        let rows = sqlx::query_as::<_, WatchlistRow>(
            r#"
            SELECT content_id, media_type, added_at, priority, reason
            FROM watchlist
            WHERE user_id = $1
            ORDER BY added_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(WatchlistEntry::from).collect())
    }

    async fn currently_watching(&self, user_id: &str) -> AppResult<Vec<CurrentlyWatching>> {
        let rows = sqlx::query_as::<_, CurrentlyWatchingRow>(
            r#"
            SELECT content_id, media_type, progress, last_watched, episodes_watched,
                   total_episodes, binge_factor
            FROM currently_watching
            WHERE user_id = $1
            ORDER BY last_watched DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(CurrentlyWatching::from).collect())
    }

    async fn preferences(&self, user_id: &str) -> AppResult<Option<StoredPreferences>> {
        let row = sqlx::query_as::<_, PreferencesRow>(
            r#"
            SELECT favorite_genres, preferred_networks, content_rating, language_preferences,
                   mood, themes, content_complexity, pace_preference, novelty_seeker,
                   comfort_watcher, seasonal_trends, temporal_patterns, session_context,
                   device_type
            FROM user_preferences
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(StoredPreferences::from))
    }

    async fn behavior_metrics(&self, user_id: &str) -> AppResult<Option<BehaviorMetrics>> {
        let row = sqlx::query_as::<_, BehaviorRow>(
            r#"
            SELECT average_watch_time, skip_rate, binge_frequency, completion_rate,
                   repeat_watching, preferred_watch_times, device_preferences
            FROM user_behavior
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(BehaviorMetrics::from))
    }
}

#[async_trait::async_trait]
impl AnalyticsProvider for PgProfileStore {
    async fn user_behavior_analytics(
        &self,
        user_id: &str,
        sample_size: usize,
    ) -> AppResult<UserBehaviorAnalytics> {
        let row = sqlx::query_as::<_, AnalyticsRow>(
            r#"
            SELECT COUNT(*) AS total_views,
                   AVG(CASE WHEN completed THEN 1.0 ELSE 0.0 END)::float8 AS completion_rate,
                   AVG(rating)::float8 AS average_rating
            FROM (
                SELECT completed, rating
                FROM viewing_history
                WHERE user_id = $1
                ORDER BY watched_at DESC
                LIMIT $2
            ) recent
            "#,
        )
        .bind(user_id)
        .bind(sample_size as i64)
        .fetch_one(&self.pool)
        .await?;

        let favorite_genres: Option<(Vec<String>,)> =
            sqlx::query_as("SELECT favorite_genres FROM user_preferences WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(UserBehaviorAnalytics {
            total_views: row.total_views.max(0) as u64,
            favorite_genres: favorite_genres.map(|(g,)| g).unwrap_or_default(),
            completion_rate: row.completion_rate.unwrap_or(0.0),
            average_rating: row.average_rating,
        })
    }

    async fn find_similar_users(&self, user_id: &str, limit: usize) -> AppResult<Vec<SimilarUser>> {
        let rows = sqlx::query_as::<_, SimilarUserRow>(
            r#"
            WITH mine AS (
                SELECT DISTINCT content_id FROM viewing_history WHERE user_id = $1
            )
            SELECT v.user_id,
                   COUNT(DISTINCT v.content_id)::float8
                       / GREATEST((SELECT COUNT(*) FROM mine), 1)::float8 AS similarity
            FROM viewing_history v
            JOIN mine m ON m.content_id = v.content_id
            WHERE v.user_id <> $1
            GROUP BY v.user_id
            ORDER BY similarity DESC, v.user_id
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| SimilarUser {
                user_id: row.user_id,
                similarity: row.similarity.clamp(0.0, 1.0),
            })
            .collect())
    }

    async fn content_engagement(&self, sample_size: usize) -> AppResult<Vec<ContentEngagement>> {
        let rows = sqlx::query_as::<_, EngagementRow>(
            r#"
            SELECT content_id,
                   COUNT(*) AS views,
                   AVG(CASE WHEN completed THEN 1.0 ELSE 0.0 END)::float8 AS completion_rate,
                   AVG(rating)::float8 AS average_rating
            FROM viewing_history
            GROUP BY content_id
            ORDER BY views DESC, content_id
            LIMIT $1
            "#,
        )
        .bind(sample_size as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| ContentEngagement {
                content_id: row.content_id as u64,
                views: row.views.max(0) as u64,
                completion_rate: row.completion_rate,
                average_rating: row.average_rating,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_label_falls_back_to_default() {
        assert_eq!(parse_label::<SessionContext>("Family"), SessionContext::Family);
        assert_eq!(parse_label::<SessionContext>("party"), SessionContext::Solo);
        assert_eq!(parse_label::<DeviceType>("tv"), DeviceType::Tv);
        assert_eq!(parse_label::<PacePreference>(""), PacePreference::Medium);
    }

    #[test]
    fn test_viewing_row_conversion_clamps() {
        let row = ViewingRow {
            content_id: 1396,
            media_type: "tv".to_string(),
            watched_at: Utc::now(),
            watch_duration: -3,
            total_duration: 47,
            completed: false,
            rating: Some(14),
            skip_count: 2,
        };

        let record = ViewingRecord::from(row);
        assert_eq!(record.content_id, 1396);
        assert_eq!(record.media_type, MediaType::Tv);
        assert_eq!(record.watch_duration, 0);
        assert_eq!(record.rating, Some(10));
    }

    #[test]
    fn test_watchlist_priority_parsing() {
        let row = WatchlistRow {
            content_id: 1,
            media_type: "movie".to_string(),
            added_at: Utc::now(),
            priority: "high".to_string(),
            reason: None,
        };
        assert_eq!(WatchlistEntry::from(row).priority, WatchlistPriority::High);
    }
}
