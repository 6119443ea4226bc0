use std::{sync::Arc, time::Instant};

use chrono::{Local, Utc};

use crate::{
    db::{AnalyticsProvider, ProfileStore},
    error::AppResult,
    models::{
        EnhancedMetadata, EnhancedRecommendationResponse, FilteredRecommendationResponse,
        PerformanceMetrics, ValidatedFilters,
    },
    services::{
        assembler,
        candidates::CandidateSupplier,
        filters::FilterPipeline,
        profile::ProfileAggregator,
        providers::CatalogProvider,
        scoring::{
            dedupe_by_key, AiScorer, PersonalizationScorer, RecommendationEngine, ScoringRequest,
        },
    },
};

/// Views sampled for the behavior analytics summary
const ANALYTICS_SAMPLE: usize = 100;
/// Collaborative neighbours requested per user
const SIMILAR_USERS_LIMIT: usize = 10;
/// Rows of cross-user engagement passed to the AI scorer
const ENGAGEMENT_SAMPLE: usize = 50;

/// Input of the enhanced flow, after identity resolution
#[derive(Debug, Clone, Default)]
pub struct EnhancedRequest {
    pub user_id: String,
    pub genres: Vec<String>,
    pub history: Vec<u64>,
    pub moods: Vec<String>,
    pub preferences: Option<serde_json::Value>,
}

/// Orchestrates both recommendation flows.
///
/// Enhanced: profile and analytics, scorer chain, concurrent hydration,
/// dedup. Filtered: profile, candidates, personalization score, filter
/// pipeline, envelope.
#[derive(Clone)]
pub struct RecommendationService {
    profiles: ProfileAggregator,
    analytics: Arc<dyn AnalyticsProvider>,
    candidates: CandidateSupplier,
    engine: RecommendationEngine,
    personalization: PersonalizationScorer,
}

impl RecommendationService {
    pub fn new(
        store: Arc<dyn ProfileStore>,
        analytics: Arc<dyn AnalyticsProvider>,
        catalog: Arc<dyn CatalogProvider>,
        ai: Option<AiScorer>,
    ) -> Self {
        Self {
            profiles: ProfileAggregator::new(store),
            analytics,
            candidates: CandidateSupplier::new(catalog),
            engine: RecommendationEngine::new(ai),
            personalization: PersonalizationScorer::default(),
        }
    }

    pub fn ai_available(&self) -> bool {
        self.engine.ai_available()
    }

    fn catalog(&self) -> &Arc<dyn CatalogProvider> {
        self.candidates.catalog()
    }

    pub async fn enhanced(
        &self,
        request: EnhancedRequest,
    ) -> AppResult<EnhancedRecommendationResponse> {
        let user_id = request.user_id.as_str();

        let (profile, analytics, similar_users, engagement) = tokio::join!(
            self.profiles.build_profile(user_id),
            self.analytics.user_behavior_analytics(user_id, ANALYTICS_SAMPLE),
            self.analytics.find_similar_users(user_id, SIMILAR_USERS_LIMIT),
            self.analytics.content_engagement(ENGAGEMENT_SAMPLE),
        );

        let analytics = analytics.unwrap_or_else(|e| {
            tracing::warn!(user_id = %user_id, error = %e, "Behavior analytics unavailable");
            Default::default()
        });
        let similar_users = similar_users.unwrap_or_else(|e| {
            tracing::warn!(user_id = %user_id, error = %e, "Similar users unavailable");
            Vec::new()
        });
        let engagement = engagement.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Content engagement unavailable");
            Vec::new()
        });

        let mut history = request.history;
        history.extend(profile.history_ids());
        let history = dedupe_by_key(history, |id| *id);

        let genres = if request.genres.is_empty() {
            let mut favorites: Vec<String> = profile.favorite_genres.iter().cloned().collect();
            favorites.sort();
            favorites
        } else {
            request.genres
        };

        let scoring_request = ScoringRequest {
            genres,
            moods: request.moods,
            history,
            preferences: request.preferences,
            analytics,
            similar_users,
            engagement,
            ..ScoringRequest::new(user_id)
        };

        let batch = self.engine.recommend(&scoring_request).await;
        let details = assembler::hydrate(Arc::clone(self.catalog()), &batch.suggestions).await;
        let recommendations = assembler::assemble_enhanced(
            &batch.suggestions,
            details,
            batch.source,
            self.catalog().name(),
            !scoring_request.similar_users.is_empty(),
        );

        let confidence = assembler::enhanced_confidence(batch.source, profile.richness());

        tracing::info!(
            user_id = %user_id,
            source = batch.source.as_str(),
            count = recommendations.len(),
            confidence,
            "Generated enhanced recommendations"
        );

        Ok(EnhancedRecommendationResponse {
            success: true,
            metadata: EnhancedMetadata {
                user_id: user_id.to_string(),
                source: batch.source,
                ai_available: self.ai_available(),
                total_results: recommendations.len(),
                confidence,
                similar_users: scoring_request.similar_users.len(),
                generated_at: Utc::now(),
            },
            recommendations,
        })
    }

    pub async fn filtered(
        &self,
        user_id: &str,
        filters: ValidatedFilters,
    ) -> AppResult<FilteredRecommendationResponse> {
        let started = Instant::now();

        let profile = self.profiles.build_profile(user_id).await;
        let profile_ms = started.elapsed().as_millis() as u64;

        let candidates_started = Instant::now();
        let shows = self.candidates.get_available_shows(user_id).await;
        let candidates_ms = candidates_started.elapsed().as_millis() as u64;

        let scoring_started = Instant::now();
        let requested_platforms = filters.platform.clone().unwrap_or_default();
        let scored = {
            let mut rng = rand::rng();
            self.personalization.score_all(
                shows,
                &profile,
                &requested_platforms,
                Local::now().naive_local(),
                &mut rng,
            )
        };
        let pipeline = FilterPipeline::from_filters(&filters);
        let outcome = pipeline.run(scored, &profile, &filters);
        let scoring_ms = scoring_started.elapsed().as_millis() as u64;

        let metrics = PerformanceMetrics {
            total_ms: started.elapsed().as_millis() as u64,
            profile_ms,
            candidates_ms,
            scoring_ms,
        };

        tracing::info!(
            user_id = %user_id,
            filters = pipeline.len(),
            matched = outcome.matched,
            excluded = outcome.excluded,
            total_ms = metrics.total_ms,
            "Generated filtered recommendations"
        );

        Ok(assembler::assemble_filtered(
            outcome,
            &profile,
            &filters,
            self.catalog().name(),
            Some(metrics),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::{InMemoryProfileStore, MockAnalyticsProvider, UserRecord},
        error::AppError,
        models::{MediaType, ScoreSource, SortBy, StoredPreferences, ViewingRecord},
        services::providers::StaticCatalog,
    };

    fn service_with(store: InMemoryProfileStore) -> RecommendationService {
        let store = Arc::new(store);
        RecommendationService::new(store.clone(), store, Arc::new(StaticCatalog::new()), None)
    }

    #[tokio::test]
    async fn test_enhanced_heuristic_with_placeholders() {
        let service = service_with(InMemoryProfileStore::new());
        let response = service
            .enhanced(EnhancedRequest {
                user_id: "u1".to_string(),
                genres: vec!["Drama".to_string()],
                ..Default::default()
            })
            .await
            .unwrap();

        assert!(response.success);
        assert_eq!(response.metadata.source, ScoreSource::Heuristic);
        assert!(!response.metadata.ai_available);
        assert_eq!(response.recommendations.len(), 5);
        // 1396 is in the static catalog, 76331 is not
        assert_eq!(response.recommendations[0].content.title, "Breaking Bad");
        assert_eq!(response.recommendations[3].content.overview, "Details not available");
        assert!(response.recommendations.iter().all(|r| r.reason.contains("Drama")));
        assert!((0.0..=1.0).contains(&response.metadata.confidence));
    }

    #[tokio::test]
    async fn test_enhanced_uses_favorite_genres_when_none_requested() {
        let store = InMemoryProfileStore::new();
        store
            .insert_user(
                "fan",
                UserRecord {
                    preferences: Some(StoredPreferences {
                        favorite_genres: vec!["Comedy".to_string()],
                        ..Default::default()
                    }),
                    ..Default::default()
                },
            )
            .await;

        let response = service_with(store)
            .enhanced(EnhancedRequest {
                user_id: "fan".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(response.recommendations[0].content.id, 2316);
        assert!(response.recommendations[0].reason.contains("Comedy"));
    }

    #[tokio::test]
    async fn test_enhanced_survives_analytics_outage() {
        let mut analytics = MockAnalyticsProvider::new();
        analytics
            .expect_user_behavior_analytics()
            .returning(|_, _| Err(AppError::Internal("down".to_string())));
        analytics
            .expect_find_similar_users()
            .returning(|_, _| Err(AppError::Internal("down".to_string())));
        analytics
            .expect_content_engagement()
            .returning(|_| Err(AppError::Internal("down".to_string())));

        let service = RecommendationService::new(
            Arc::new(InMemoryProfileStore::new()),
            Arc::new(analytics),
            Arc::new(StaticCatalog::new()),
            None,
        );
        let response = service
            .enhanced(EnhancedRequest {
                user_id: "u1".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(response.recommendations.len(), 10);
        assert_eq!(response.metadata.similar_users, 0);
    }

    #[tokio::test]
    async fn test_filtered_empty_profile_no_filters() {
        let service = service_with(InMemoryProfileStore::new());
        let response = service
            .filtered("new-user", ValidatedFilters::default())
            .await
            .unwrap();

        assert!(response.success);
        assert!(!response.recommendations.is_empty());
        assert!((0.0..=1.0).contains(&response.confidence));
        assert!(response.performance_metrics.is_some());
        assert!(response.metadata.applied_filters.is_empty());
    }

    #[tokio::test]
    async fn test_filtered_and_semantics_and_sort() {
        let service = service_with(InMemoryProfileStore::new());
        let filters = ValidatedFilters {
            genre: Some(vec!["Drama".to_string()]),
            min_rating: Some(8.5),
            sort_by: Some(SortBy::Rating),
            ..Default::default()
        };

        let response = service.filtered("u1", filters).await.unwrap();
        let ratings: Vec<f64> = response
            .recommendations
            .iter()
            .map(|r| r.content.vote_average.unwrap_or_default())
            .collect();

        assert_eq!(ratings, vec![8.9, 8.7, 8.6, 8.5]);
        assert!(response
            .recommendations
            .iter()
            .all(|r| r.content.genres.iter().any(|g| g.name == "Drama")));
    }

    #[tokio::test]
    async fn test_filtered_hide_watched() {
        let store = InMemoryProfileStore::new();
        store
            .insert_user(
                "watcher",
                UserRecord {
                    viewing_history: vec![ViewingRecord {
                        content_id: 1396,
                        media_type: MediaType::Tv,
                        watched_at: Utc::now(),
                        watch_duration: 47,
                        total_duration: 47,
                        completed: true,
                        rating: Some(10),
                        skip_count: 0,
                    }],
                    ..Default::default()
                },
            )
            .await;

        let filters = ValidatedFilters {
            hide_watched: Some(true),
            ..Default::default()
        };
        let response = service_with(store).filtered("watcher", filters).await.unwrap();

        assert_eq!(response.recommendations.len(), 7);
        assert_eq!(response.metadata.excluded_shows, 1);
        assert!(response.recommendations.iter().all(|r| r.content.id != 1396));
    }
}
