//! Records exchanged with the profile and analytics stores.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{
    ContentPreferences, ContentRating, DeviceType, SessionContext, TemporalPatterns, TimeOfDay,
};

/// Preferences as persisted, before the aggregator derives anything
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredPreferences {
    #[serde(default)]
    pub favorite_genres: Vec<String>,
    #[serde(default)]
    pub preferred_networks: Vec<String>,
    #[serde(default)]
    pub content_rating: Option<ContentRating>,
    #[serde(default)]
    pub language_preferences: Vec<String>,
    #[serde(default)]
    pub preferences: ContentPreferences,
    #[serde(default)]
    pub seasonal_trends: HashMap<String, f64>,
    #[serde(default)]
    pub temporal_patterns: TemporalPatterns,
    #[serde(default)]
    pub session_context: SessionContext,
    #[serde(default)]
    pub device_type: DeviceType,
}

/// Raw behavioral metrics; `binge_frequency` is episodes per viewing session
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BehaviorMetrics {
    pub average_watch_time: f64,
    pub skip_rate: f64,
    pub binge_frequency: f64,
    pub completion_rate: f64,
    pub repeat_watching: f64,
    #[serde(default)]
    pub preferred_watch_times: Vec<TimeOfDay>,
    #[serde(default)]
    pub device_preferences: HashMap<DeviceType, f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserBehaviorAnalytics {
    pub total_views: u64,
    pub favorite_genres: Vec<String>,
    pub completion_rate: f64,
    #[serde(default)]
    pub average_rating: Option<f64>,
}

/// Collaborative-filtering neighbour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimilarUser {
    pub user_id: String,
    /// 0.0..=1.0
    pub similarity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentEngagement {
    pub content_id: u64,
    pub views: u64,
    pub completion_rate: f64,
    #[serde(default)]
    pub average_rating: Option<f64>,
}
