use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{ProfileSummary, ShowDetail, ValidatedFilters};

/// Which scorer produced a batch of suggestions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreSource {
    Ai,
    Heuristic,
    Personalized,
}

impl ScoreSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreSource::Ai => "ai",
            ScoreSource::Heuristic => "heuristic",
            ScoreSource::Personalized => "personalized",
        }
    }
}

/// A content id picked by a scorer, before hydration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub content_id: u64,
    pub reason: String,
}

/// Per-item record of which subsystems influenced a recommendation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceAttribution {
    pub primary: String,
    #[serde(rename = "isAI")]
    pub is_ai: bool,
    #[serde(rename = "isTMDB")]
    pub is_tmdb: bool,
    pub is_trending: bool,
    pub is_collaborative: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationItem {
    pub content: ShowDetail,
    pub score: f64,
    pub reason: String,
    pub sources: SourceAttribution,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceMetrics {
    pub total_ms: u64,
    pub profile_ms: u64,
    pub candidates_ms: u64,
    pub scoring_ms: u64,
}

/// Echo of the validated filters, grouped for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSummary {
    pub filters: ValidatedFilters,
    pub sort_by: String,
    pub limit: usize,
    pub active_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilteredMetadata {
    pub applied_filters: Vec<String>,
    pub total_results: usize,
    pub excluded_shows: usize,
    pub user_profile: ProfileSummary,
    pub filter_summary: FilterSummary,
}

/// Body of `POST /enhanced-recommendations/filtered`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilteredRecommendationResponse {
    pub success: bool,
    pub recommendations: Vec<RecommendationItem>,
    pub confidence: f64,
    /// Source name to number of items it contributed
    pub sources: HashMap<String, usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performance_metrics: Option<PerformanceMetrics>,
    pub metadata: FilteredMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhancedMetadata {
    pub user_id: String,
    pub source: ScoreSource,
    pub ai_available: bool,
    pub total_results: usize,
    pub confidence: f64,
    pub similar_users: usize,
    pub generated_at: chrono::DateTime<chrono::Utc>,
}

/// Body of `POST /enhanced-recommendations`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhancedRecommendationResponse {
    pub success: bool,
    pub recommendations: Vec<RecommendationItem>,
    pub metadata: EnhancedMetadata,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_attribution_field_names() {
        let sources = SourceAttribution {
            primary: "ai".to_string(),
            is_ai: true,
            is_tmdb: true,
            is_trending: false,
            is_collaborative: true,
        };

        let value = serde_json::to_value(&sources).unwrap();
        assert_eq!(value["isAI"], true);
        assert_eq!(value["isTMDB"], true);
        assert_eq!(value["isTrending"], false);
        assert_eq!(value["isCollaborative"], true);
    }

    #[test]
    fn test_suggestion_deserializes_camel_case() {
        let suggestion: Suggestion =
            serde_json::from_str(r#"{"contentId": 1396, "reason": "Gritty drama"}"#).unwrap();
        assert_eq!(suggestion.content_id, 1396);
        assert_eq!(suggestion.reason, "Gritty drama");
    }
}
