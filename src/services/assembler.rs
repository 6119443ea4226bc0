//! Detail hydration and response assembly.

use std::{collections::HashMap, sync::Arc};

use crate::{
    error::AppError,
    models::{
        EnhancedUserProfile, FilterSummary, FilteredMetadata, FilteredRecommendationResponse,
        PerformanceMetrics, RecommendationItem, ScoreSource, Show, ShowDetail, SourceAttribution,
        Suggestion, ValidatedFilters,
    },
    services::{
        filter_options::genre_name,
        filters::{PipelineOutcome, ScoredShow},
        providers::CatalogProvider,
        scoring::dedupe_by_key,
    },
};

/// Base confidence of an AI-sourced batch
pub const AI_CONFIDENCE: f64 = 0.85;
/// Base confidence of a heuristic batch
pub const HEURISTIC_CONFIDENCE: f64 = 0.5;

/// Resolves every suggestion to full details concurrently.
///
/// Output order matches `suggestions`. A failed lookup yields
/// [`ShowDetail::placeholder`] for that id; the rest of the batch is unaffected.
pub async fn hydrate(
    catalog: Arc<dyn CatalogProvider>,
    suggestions: &[Suggestion],
) -> Vec<ShowDetail> {
    let tasks: Vec<_> = suggestions
        .iter()
        .map(|suggestion| {
            let catalog = Arc::clone(&catalog);
            let id = suggestion.content_id;
            (id, tokio::spawn(async move { catalog.content_details(id).await }))
        })
        .collect();

    let mut details = Vec::with_capacity(tasks.len());
    let mut failures = 0;

    for (id, task) in tasks {
        let result = match task.await {
            Ok(result) => result,
            Err(e) => Err(AppError::Internal(e.to_string())),
        };
        match result {
            Ok(detail) => details.push(detail),
            Err(e) => {
                tracing::warn!(
                    content_id = id,
                    error = %e,
                    "Detail lookup failed, using placeholder"
                );
                failures += 1;
                details.push(ShowDetail::placeholder(id));
            }
        }
    }

    if failures > 0 {
        tracing::warn!(
            success_count = details.len() - failures,
            error_count = failures,
            "Partial detail hydration failure"
        );
    }

    details
}

/// Rank-based score: first item 1.0, decreasing evenly
fn rank_score(index: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (total - index) as f64 / total as f64
}

pub fn enhanced_confidence(source: ScoreSource, richness: f64) -> f64 {
    let base = match source {
        ScoreSource::Ai => AI_CONFIDENCE,
        ScoreSource::Heuristic | ScoreSource::Personalized => HEURISTIC_CONFIDENCE,
    };
    (base * (0.5 + 0.5 * richness.clamp(0.0, 1.0))).clamp(0.0, 1.0)
}

/// `0.6 * mean item score + 0.4 * profile richness`
pub fn filtered_confidence(items: &[RecommendationItem], richness: f64) -> f64 {
    let mean = if items.is_empty() {
        0.0
    } else {
        items.iter().map(|i| i.score).sum::<f64>() / items.len() as f64
    };
    (0.6 * mean + 0.4 * richness.clamp(0.0, 1.0)).clamp(0.0, 1.0)
}

/// Pairs hydrated details with their suggestions and drops repeated
/// `(type, id)` pairs, keeping the first.
pub fn assemble_enhanced(
    suggestions: &[Suggestion],
    details: Vec<ShowDetail>,
    source: ScoreSource,
    catalog_name: &str,
    collaborative: bool,
) -> Vec<RecommendationItem> {
    let pairs: Vec<(ShowDetail, &Suggestion)> = details.into_iter().zip(suggestions).collect();
    let pairs = dedupe_by_key(pairs, |(detail, _)| detail.key());
    let total = pairs.len();

    pairs
        .into_iter()
        .enumerate()
        .map(|(index, (content, suggestion))| RecommendationItem {
            content,
            score: rank_score(index, total),
            reason: suggestion.reason.clone(),
            sources: SourceAttribution {
                primary: source.as_str().to_string(),
                is_ai: source == ScoreSource::Ai,
                is_tmdb: catalog_name == "tmdb",
                is_trending: source == ScoreSource::Heuristic,
                is_collaborative: source == ScoreSource::Ai && collaborative,
            },
        })
        .collect()
}

fn reason_for(show: &Show, profile: &EnhancedUserProfile) -> String {
    let favorite = show.genre_ids.iter().filter_map(|id| genre_name(*id)).find(|name| {
        profile
            .favorite_genres
            .iter()
            .any(|fav| fav.eq_ignore_ascii_case(name))
    });

    if let Some(genre) = favorite {
        format!("Because you like {}", genre)
    } else if show.vote_average >= 8.0 {
        format!("Highly rated ({:.1}/10)", show.vote_average)
    } else {
        "Popular right now".to_string()
    }
}

fn filtered_item(
    scored: &ScoredShow,
    profile: &EnhancedUserProfile,
    catalog_name: &str,
) -> RecommendationItem {
    RecommendationItem {
        content: ShowDetail::from(&scored.show),
        score: scored.score,
        reason: reason_for(&scored.show, profile),
        sources: SourceAttribution {
            primary: ScoreSource::Personalized.as_str().to_string(),
            is_ai: false,
            is_tmdb: catalog_name == "tmdb",
            is_trending: scored.show.popularity.is_some(),
            is_collaborative: false,
        },
    }
}

/// Builds the filtered response envelope from the pipeline outcome
pub fn assemble_filtered(
    outcome: PipelineOutcome,
    profile: &EnhancedUserProfile,
    filters: &ValidatedFilters,
    catalog_name: &str,
    metrics: Option<PerformanceMetrics>,
) -> FilteredRecommendationResponse {
    let recommendations: Vec<RecommendationItem> = outcome
        .items
        .iter()
        .map(|scored| filtered_item(scored, profile, catalog_name))
        .collect();

    let mut sources: HashMap<String, usize> = HashMap::new();
    for item in &recommendations {
        *sources.entry(item.sources.primary.clone()).or_default() += 1;
    }
    if !recommendations.is_empty() {
        sources.insert(catalog_name.to_string(), recommendations.len());
    }

    let applied_filters = filters.applied_filters();
    let confidence = filtered_confidence(&recommendations, profile.richness());

    FilteredRecommendationResponse {
        success: true,
        confidence,
        sources,
        performance_metrics: metrics,
        metadata: FilteredMetadata {
            total_results: recommendations.len(),
            excluded_shows: outcome.excluded,
            user_profile: profile.summary(),
            filter_summary: FilterSummary {
                filters: filters.clone(),
                sort_by: filters.sort_or_default().as_str().to_string(),
                limit: filters.limit_or_default(),
                active_count: applied_filters.len(),
            },
            applied_filters,
        },
        recommendations,
    }
}
