//! Taste and context profile assembled per request by the profile aggregator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use super::{ContentRating, MediaType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl TimeOfDay {
    /// Buckets a wall-clock hour: <12 morning, <17 afternoon, <21 evening, else night
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            0..=11 => TimeOfDay::Morning,
            12..=16 => TimeOfDay::Afternoon,
            17..=20 => TimeOfDay::Evening,
            _ => TimeOfDay::Night,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeOfDay::Morning => "morning",
            TimeOfDay::Afternoon => "afternoon",
            TimeOfDay::Evening => "evening",
            TimeOfDay::Night => "night",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    #[default]
    Unknown,
    Mobile,
    Tablet,
    Desktop,
    Tv,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BingePattern {
    #[default]
    Light,
    Moderate,
    Heavy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionContext {
    #[default]
    Solo,
    Family,
    Friends,
    Date,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentComplexity {
    Simple,
    #[default]
    Moderate,
    Complex,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PacePreference {
    Slow,
    #[default]
    Medium,
    Fast,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WatchlistPriority {
    High,
    #[default]
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewingRecord {
    pub content_id: u64,
    #[serde(rename = "type")]
    pub media_type: MediaType,
    pub watched_at: DateTime<Utc>,
    /// Minutes actually watched
    pub watch_duration: u32,
    /// Minutes of the full item
    pub total_duration: u32,
    pub completed: bool,
    /// Explicit 1..=10 rating
    #[serde(default)]
    pub rating: Option<u8>,
    #[serde(default)]
    pub skip_count: u32,
}

impl ViewingRecord {
    /// Fraction of the item watched, clamped to [0, 1]
    pub fn completion_ratio(&self) -> f64 {
        if self.total_duration == 0 {
            return if self.completed { 1.0 } else { 0.0 };
        }
        (self.watch_duration as f64 / self.total_duration as f64).clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchlistEntry {
    pub content_id: u64,
    #[serde(rename = "type")]
    pub media_type: MediaType,
    pub added_at: DateTime<Utc>,
    pub priority: WatchlistPriority,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentlyWatching {
    pub content_id: u64,
    #[serde(rename = "type")]
    pub media_type: MediaType,
    /// 0.0..=1.0
    pub progress: f64,
    pub last_watched: DateTime<Utc>,
    #[serde(default)]
    pub episodes_watched: Option<u32>,
    #[serde(default)]
    pub total_episodes: Option<u32>,
    pub binge_factor: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentlyWatched {
    pub content_id: u64,
    #[serde(rename = "type")]
    pub media_type: MediaType,
    pub watched_at: DateTime<Utc>,
    pub enjoyment_score: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BehavioralData {
    pub average_watch_time: f64,
    pub skip_rate: f64,
    pub binge_patterns: BingePattern,
    pub completion_rate: f64,
    pub repeat_watching: f64,
    pub preferred_watch_times: HashSet<TimeOfDay>,
    pub device_preferences: HashMap<DeviceType, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextualCues {
    pub time_of_day: TimeOfDay,
    pub device_type: DeviceType,
    /// Genre name to score multiplier
    pub seasonal_trends: HashMap<String, f64>,
    #[serde(default)]
    pub current_mood: Option<String>,
    pub session_context: SessionContext,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentPreferences {
    #[serde(default)]
    pub mood: Option<String>,
    #[serde(default)]
    pub themes: HashSet<String>,
    #[serde(default)]
    pub content_complexity: ContentComplexity,
    #[serde(default)]
    pub pace_preference: PacePreference,
    #[serde(default)]
    pub novelty_seeker: bool,
    #[serde(default)]
    pub comfort_watcher: bool,
}

/// Preferred genre names keyed by weekday ("monday"), month ("january")
/// and time slot ("evening")
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemporalPatterns {
    #[serde(default)]
    pub weekday: HashMap<String, Vec<String>>,
    #[serde(default)]
    pub month: HashMap<String, Vec<String>>,
    #[serde(default)]
    pub time_slot: HashMap<String, Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhancedUserProfile {
    pub user_id: String,
    pub favorite_genres: HashSet<String>,
    pub preferred_networks: HashSet<String>,
    #[serde(default)]
    pub content_rating: Option<ContentRating>,
    pub language_preferences: Vec<String>,
    pub viewing_history: Vec<ViewingRecord>,
    pub watchlist: Vec<WatchlistEntry>,
    pub currently_watching: Vec<CurrentlyWatching>,
    pub recently_watched: Vec<RecentlyWatched>,
    pub behavioral_data: BehavioralData,
    pub contextual_cues: ContextualCues,
    pub preferences: ContentPreferences,
    pub temporal_patterns: TemporalPatterns,
}

impl EnhancedUserProfile {
    /// Composite keys of everything in the viewing history
    pub fn watched_keys(&self) -> HashSet<(MediaType, u64)> {
        self.viewing_history
            .iter()
            .map(|r| (r.media_type, r.content_id))
            .collect()
    }

    pub fn history_ids(&self) -> Vec<u64> {
        self.viewing_history.iter().map(|r| r.content_id).collect()
    }

    /// 0..=1 estimate of how much signal this profile carries
    pub fn richness(&self) -> f64 {
        let history = (self.viewing_history.len() as f64 / 20.0).min(1.0);
        let genres = if self.favorite_genres.is_empty() { 0.0 } else { 1.0 };
        (history + genres) / 2.0
    }

    pub fn summary(&self) -> ProfileSummary {
        let mut favorite_genres: Vec<String> = self.favorite_genres.iter().cloned().collect();
        favorite_genres.sort();

        ProfileSummary {
            history_size: self.viewing_history.len(),
            watchlist_size: self.watchlist.len(),
            favorite_genres,
            binge_pattern: self.behavioral_data.binge_patterns,
            time_of_day: self.contextual_cues.time_of_day,
            completion_rate: self.behavioral_data.completion_rate,
        }
    }
}

/// Compact profile view returned in response metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSummary {
    pub history_size: usize,
    pub watchlist_size: usize,
    pub favorite_genres: Vec<String>,
    pub binge_pattern: BingePattern,
    pub time_of_day: TimeOfDay,
    pub completion_rate: f64,
}
