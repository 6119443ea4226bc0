//! Recommendation engine.
//!
//! Scorers are tried in order and the first non-empty answer wins. The AI
//! scorer (when configured) runs first; the heuristic scorer is always last
//! and cannot fail, so the chain always produces suggestions.

pub mod ai;
pub mod heuristic;
pub mod personalization;

use std::{collections::HashSet, hash::Hash, sync::Arc};

use crate::{
    error::AppResult,
    models::{ContentEngagement, ScoreSource, SimilarUser, Suggestion, UserBehaviorAnalytics},
};

pub use ai::AiScorer;
pub use heuristic::HeuristicScorer;
pub use personalization::{PersonalizationScorer, ScoringWeights};

/// Suggestions requested from a scorer
pub const RECOMMENDATION_COUNT: usize = 10;

/// Everything a scorer may use to pick content
#[derive(Debug, Clone)]
pub struct ScoringRequest {
    pub user_id: String,
    pub genres: Vec<String>,
    pub moods: Vec<String>,
    /// Watched content ids
    pub history: Vec<u64>,
    pub preferences: Option<serde_json::Value>,
    pub analytics: UserBehaviorAnalytics,
    pub similar_users: Vec<SimilarUser>,
    pub engagement: Vec<ContentEngagement>,
    pub count: usize,
}

impl ScoringRequest {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            genres: Vec::new(),
            moods: Vec::new(),
            history: Vec::new(),
            preferences: None,
            analytics: UserBehaviorAnalytics::default(),
            similar_users: Vec::new(),
            engagement: Vec::new(),
            count: RECOMMENDATION_COUNT,
        }
    }

    pub fn with_genres(mut self, genres: Vec<String>) -> Self {
        self.genres = genres;
        self
    }
}

/// A scoring strategy in the engine's chain
#[async_trait::async_trait]
pub trait Scorer: Send + Sync {
    fn name(&self) -> &'static str;

    fn source(&self) -> ScoreSource;

    /// An error or an empty list hands over to the next scorer
    async fn suggest(&self, request: &ScoringRequest) -> AppResult<Vec<Suggestion>>;
}

/// Suggestions from the scorer that answered
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredBatch {
    pub suggestions: Vec<Suggestion>,
    pub source: ScoreSource,
}

#[derive(Clone)]
pub struct RecommendationEngine {
    scorers: Vec<Arc<dyn Scorer>>,
    ai_available: bool,
}

impl RecommendationEngine {
    /// AI first when configured, heuristic always last
    pub fn new(ai: Option<AiScorer>) -> Self {
        let mut scorers: Vec<Arc<dyn Scorer>> = Vec::new();
        let ai_available = ai.is_some();
        if let Some(ai) = ai {
            scorers.push(Arc::new(ai));
        }
        scorers.push(Arc::new(HeuristicScorer));

        Self {
            scorers,
            ai_available,
        }
    }

    pub fn ai_available(&self) -> bool {
        self.ai_available
    }

    pub async fn recommend(&self, request: &ScoringRequest) -> ScoredBatch {
        for scorer in &self.scorers {
            match scorer.suggest(request).await {
                Ok(suggestions) if !suggestions.is_empty() => {
                    let mut suggestions = dedupe_by_key(suggestions, |s| s.content_id);
                    suggestions.truncate(request.count);

                    tracing::info!(
                        user_id = %request.user_id,
                        scorer = scorer.name(),
                        count = suggestions.len(),
                        "Scorer produced suggestions"
                    );
                    return ScoredBatch {
                        suggestions,
                        source: scorer.source(),
                    };
                }
                Ok(_) => {
                    tracing::warn!(
                        scorer = scorer.name(),
                        "Scorer returned no suggestions, falling back"
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        scorer = scorer.name(),
                        error = %e,
                        "Scorer failed, falling back"
                    );
                }
            }
        }

        ScoredBatch {
            suggestions: Vec::new(),
            source: ScoreSource::Heuristic,
        }
    }
}

/// Keeps the first item for every key, preserving order
pub fn dedupe_by_key<T, K, F>(items: Vec<T>, key: F) -> Vec<T>
where
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(key(item)))
        .collect()
}
