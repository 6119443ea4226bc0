//! Profile aggregator: combines the stored profile pieces into an
//! `EnhancedUserProfile` and derives the fields that are never stored.
//!
//! Derived fields:
//! - `contextualCues.timeOfDay` from the local wall-clock hour
//! - `recentlyWatched` as the ten most recent views with an enjoyment score
//! - `behavioralData.bingePatterns` bucketed from episodes per session
//!
//! Store failures never fail the request. Each failing section falls back to
//! the matching part of [`default_profile`].

use std::sync::Arc;

use chrono::{Local, NaiveDateTime, Timelike};

use crate::{
    db::ProfileStore,
    models::{
        BehaviorMetrics, BehavioralData, BingePattern, ContextualCues, EnhancedUserProfile,
        RecentlyWatched, StoredPreferences, TimeOfDay, ViewingRecord,
    },
};

/// Views kept in `recentlyWatched`
pub const RECENTLY_WATCHED_LEN: usize = 10;

/// Episodes per session below which bingeing is light
pub const LIGHT_BINGE_MAX: f64 = 2.0;
/// Episodes per session below which bingeing is moderate
pub const MODERATE_BINGE_MAX: f64 = 4.0;

const COMPLETION_WEIGHT: f64 = 0.6;
const RATING_WEIGHT: f64 = 0.4;

pub fn binge_pattern(binge_frequency: f64) -> BingePattern {
    if binge_frequency < LIGHT_BINGE_MAX {
        BingePattern::Light
    } else if binge_frequency < MODERATE_BINGE_MAX {
        BingePattern::Moderate
    } else {
        BingePattern::Heavy
    }
}

/// Completion blended with the explicit rating when there is one, in [0, 1]
pub fn enjoyment_score(record: &ViewingRecord) -> f64 {
    let completion = record.completion_ratio();
    let score = match record.rating {
        Some(rating) => {
            COMPLETION_WEIGHT * completion + RATING_WEIGHT * (f64::from(rating) / 10.0)
        }
        None => completion,
    };
    score.clamp(0.0, 1.0)
}

fn default_cues(now: NaiveDateTime) -> ContextualCues {
    ContextualCues {
        time_of_day: TimeOfDay::from_hour(now.hour()),
        device_type: Default::default(),
        seasonal_trends: Default::default(),
        current_mood: None,
        session_context: Default::default(),
    }
}

/// Profile used for unknown users and whenever the stores are unreachable:
/// empty history, no favorites, neutral preferences.
pub fn default_profile(user_id: &str) -> EnhancedUserProfile {
    default_profile_at(user_id, Local::now().naive_local())
}

pub fn default_profile_at(user_id: &str, now: NaiveDateTime) -> EnhancedUserProfile {
    EnhancedUserProfile {
        user_id: user_id.to_string(),
        favorite_genres: Default::default(),
        preferred_networks: Default::default(),
        content_rating: None,
        language_preferences: Vec::new(),
        viewing_history: Vec::new(),
        watchlist: Vec::new(),
        currently_watching: Vec::new(),
        recently_watched: Vec::new(),
        behavioral_data: BehavioralData::default(),
        contextual_cues: default_cues(now),
        preferences: Default::default(),
        temporal_patterns: Default::default(),
    }
}

fn recently_watched(history: &[ViewingRecord]) -> Vec<RecentlyWatched> {
    let mut sorted: Vec<&ViewingRecord> = history.iter().collect();
    sorted.sort_by(|a, b| b.watched_at.cmp(&a.watched_at));
    sorted
        .into_iter()
        .take(RECENTLY_WATCHED_LEN)
        .map(|record| RecentlyWatched {
            content_id: record.content_id,
            media_type: record.media_type,
            watched_at: record.watched_at,
            enjoyment_score: enjoyment_score(record),
        })
        .collect()
}

/// Uses stored metrics when present, otherwise estimates from history
fn behavioral_data(metrics: Option<BehaviorMetrics>, history: &[ViewingRecord]) -> BehavioralData {
    match metrics {
        Some(metrics) => BehavioralData {
            average_watch_time: metrics.average_watch_time,
            skip_rate: metrics.skip_rate.clamp(0.0, 1.0),
            binge_patterns: binge_pattern(metrics.binge_frequency),
            completion_rate: metrics.completion_rate.clamp(0.0, 1.0),
            repeat_watching: metrics.repeat_watching.clamp(0.0, 1.0),
            preferred_watch_times: metrics.preferred_watch_times.into_iter().collect(),
            device_preferences: metrics.device_preferences,
        },
        None if history.is_empty() => BehavioralData::default(),
        None => {
            let views = history.len() as f64;
            BehavioralData {
                average_watch_time: history.iter().map(|r| f64::from(r.watch_duration)).sum::<f64>()
                    / views,
                completion_rate: history.iter().filter(|r| r.completed).count() as f64 / views,
                ..BehavioralData::default()
            }
        }
    }
}

/// Builds per-request profiles from a [`ProfileStore`]
#[derive(Clone)]
pub struct ProfileAggregator {
    store: Arc<dyn ProfileStore>,
}

impl ProfileAggregator {
    pub fn new(store: Arc<dyn ProfileStore>) -> Self {
        Self { store }
    }

    pub async fn build_profile(&self, user_id: &str) -> EnhancedUserProfile {
        self.build_profile_at(user_id, Local::now().naive_local())
            .await
    }

    pub async fn build_profile_at(&self, user_id: &str, now: NaiveDateTime) -> EnhancedUserProfile {
        let (history, watchlist, currently_watching, preferences, metrics) = tokio::join!(
            self.store.viewing_history(user_id),
            self.store.watchlist(user_id),
            self.store.currently_watching(user_id),
            self.store.preferences(user_id),
            self.store.behavior_metrics(user_id),
        );

        let history = or_default(history, user_id, "viewing history");
        let watchlist = or_default(watchlist, user_id, "watchlist");
        let currently_watching = or_default(currently_watching, user_id, "currently watching");
        let preferences: StoredPreferences =
            or_default(preferences, user_id, "preferences").unwrap_or_default();
        let metrics = or_default(metrics, user_id, "behavior metrics");

        let mut profile = default_profile_at(user_id, now);

        profile.favorite_genres = preferences.favorite_genres.into_iter().collect();
        profile.preferred_networks = preferences.preferred_networks.into_iter().collect();
        profile.content_rating = preferences.content_rating;
        profile.language_preferences = preferences.language_preferences;

        profile.contextual_cues.device_type = preferences.device_type;
        profile.contextual_cues.seasonal_trends = preferences.seasonal_trends;
        profile.contextual_cues.current_mood = preferences.preferences.mood.clone();
        profile.contextual_cues.session_context = preferences.session_context;
        profile.preferences = preferences.preferences;
        profile.temporal_patterns = preferences.temporal_patterns;

        profile.recently_watched = recently_watched(&history);
        profile.behavioral_data = behavioral_data(metrics, &history);
        profile.viewing_history = history;
        profile.watchlist = watchlist;
        profile.currently_watching = currently_watching;

        tracing::debug!(
            user_id = %user_id,
            history = profile.viewing_history.len(),
            favorite_genres = profile.favorite_genres.len(),
            binge = ?profile.behavioral_data.binge_patterns,
            "Built user profile"
        );

        profile
    }
}

fn or_default<T: Default>(
    result: crate::error::AppResult<T>,
    user_id: &str,
    section: &'static str,
) -> T {
    result.unwrap_or_else(|e| {
        tracing::warn!(
            user_id = %user_id,
            section,
            error = %e,
            "Profile store unavailable, using defaults"
        );
        T::default()
    })
}
