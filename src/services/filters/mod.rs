//! Filter/exclusion pipeline applied to scored candidates.
//!
//! Active filters combine with AND: a candidate survives only if every
//! filter keeps it. Sorting runs on the survivors and `limit` is applied
//! last so filtering never under-fills a capped page.

pub mod predicates;
pub mod sort;

use crate::models::{EnhancedUserProfile, Show, ValidatedFilters};

pub use predicates::*;
pub use sort::sort_candidates;

/// A catalog show with its personalization score
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredShow {
    pub show: Show,
    pub score: f64,
}

impl ScoredShow {
    pub fn new(show: Show, score: f64) -> Self {
        Self { show, score }
    }
}

/// Core trait for filtering candidates.
///
/// Filters take ownership of the candidate list and return the survivors
/// in their original order.
pub trait Filter: Send + Sync {
    /// Returns the name of this filter (for logging/debugging)
    fn name(&self) -> &str;

    fn apply(&self, candidates: Vec<ScoredShow>, profile: &EnhancedUserProfile) -> Vec<ScoredShow>;
}

/// Result of running the pipeline
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub items: Vec<ScoredShow>,
    /// Candidates removed by filters (not by the limit)
    pub excluded: usize,
    /// Candidates that passed every filter, before the limit
    pub matched: usize,
}

/// Chains filters together, then sorts and truncates.
pub struct FilterPipeline {
    filters: Vec<Box<dyn Filter>>,
}

impl FilterPipeline {
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
        }
    }

    /// Add a filter to the pipeline (builder pattern).
    pub fn add_filter(mut self, filter: impl Filter + 'static) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    /// Builds the pipeline for every active field of `filters`
    pub fn from_filters(filters: &ValidatedFilters) -> Self {
        let mut pipeline = Self::new();

        if filters.hide_watched == Some(true) {
            pipeline = pipeline.add_filter(HideWatchedFilter);
        }
        if let Some(genres) = &filters.genre {
            pipeline = pipeline.add_filter(GenreFilter::from_names(genres));
        }
        if let Some(mood) = &filters.mood {
            if let Some(filter) = MoodFilter::for_mood(mood) {
                pipeline = pipeline.add_filter(filter);
            } else {
                tracing::debug!(mood = %mood, "Unknown mood, no genre constraint applied");
            }
        }
        if let Some(platforms) = &filters.platform {
            pipeline = pipeline.add_filter(PlatformFilter::new(platforms));
        }
        if let Some(languages) = &filters.language {
            pipeline = pipeline.add_filter(LanguageFilter::new(languages));
        }
        if let Some(country) = &filters.country {
            pipeline = pipeline.add_filter(CountryFilter::new(country));
        }
        if let Some(runtime) = filters.runtime {
            pipeline = pipeline.add_filter(RuntimeFilter::new(runtime));
        }
        if let Some(rating) = filters.content_rating {
            pipeline = pipeline.add_filter(ContentRatingFilter::new(rating));
        }
        if filters.min_rating.is_some() || filters.max_rating.is_some() {
            pipeline = pipeline.add_filter(RatingRangeFilter::new(
                filters.min_rating,
                filters.max_rating,
            ));
        }
        if let Some(range) = filters.year_range {
            pipeline = pipeline.add_filter(YearRangeFilter::new(range));
        }

        pipeline
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Apply all filters in sequence to the candidates.
    pub fn apply(
        &self,
        candidates: Vec<ScoredShow>,
        profile: &EnhancedUserProfile,
    ) -> Vec<ScoredShow> {
        let mut current = candidates;
        for filter in &self.filters {
            let before = current.len();
            current = filter.apply(current, profile);
            tracing::debug!(
                filter = filter.name(),
                input = before,
                output = current.len(),
                "Filter applied"
            );
        }
        current
    }

    /// Filters, sorts by `filters.sortBy`, then truncates to the limit
    pub fn run(
        &self,
        candidates: Vec<ScoredShow>,
        profile: &EnhancedUserProfile,
        filters: &ValidatedFilters,
    ) -> PipelineOutcome {
        let total = candidates.len();
        let mut items = self.apply(candidates, profile);
        let matched = items.len();

        sort_candidates(&mut items, filters.sort_or_default());
        items.truncate(filters.limit_or_default());

        PipelineOutcome {
            items,
            excluded: total - matched,
            matched,
        }
    }
}

impl Default for FilterPipeline {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::models::{MediaType, Network};
    use crate::services::profile::default_profile;

    pub fn show(id: u64, title: &str, genre_ids: Vec<u32>, vote_average: f64) -> Show {
        Show {
            id,
            media_type: MediaType::Tv,
            title: title.to_string(),
            genre_ids,
            vote_average,
            popularity: None,
            overview: None,
            release_date: None,
            original_language: Some("en".to_string()),
            origin_country: vec!["US".to_string()],
            runtime_minutes: None,
            networks: vec![Network {
                id: 213,
                name: "Netflix".to_string(),
            }],
            content_rating: None,
        }
    }

    pub fn scored(show: Show, score: f64) -> ScoredShow {
        ScoredShow::new(show, score)
    }

    pub fn profile() -> EnhancedUserProfile {
        default_profile("test-user")
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::models::{MediaType, SortBy, ViewingRecord};
    use chrono::Utc;

    fn catalog() -> Vec<ScoredShow> {
        vec![
            scored(show(1, "Laugh Track", vec![35], 8.4), 0.5),
            scored(show(2, "Slow Burn", vec![18], 9.1), 0.7),
            scored(show(3, "Meh Comedy", vec![35, 18], 6.2), 0.9),
            scored(show(4, "Top Comedy", vec![35], 8.0), 0.3),
            scored(show(5, "Space Stuff", vec![10765], 7.7), 0.6),
        ]
    }

    #[test]
    fn test_empty_pipeline_keeps_everything() {
        let pipeline = FilterPipeline::new();
        let filtered = pipeline.apply(catalog(), &profile());
        assert_eq!(filtered.len(), 5);
    }

    #[test]
    fn test_filters_combine_with_and() {
        let filters = ValidatedFilters {
            genre: Some(vec!["Comedy".to_string()]),
            min_rating: Some(8.0),
            ..Default::default()
        };

        let pipeline = FilterPipeline::from_filters(&filters);
        assert_eq!(pipeline.len(), 2);

        let outcome = pipeline.run(catalog(), &profile(), &filters);
        assert!(!outcome.items.is_empty());
        for item in &outcome.items {
            assert!(item.show.genre_ids.contains(&35));
            assert!(item.show.vote_average >= 8.0);
        }
        let ids: Vec<u64> = outcome.items.iter().map(|i| i.show.id).collect();
        assert_eq!(ids, vec![1, 4]);
        assert_eq!(outcome.excluded, 3);
    }

    #[test]
    fn test_inverted_rating_range_matches_nothing() {
        let filters = ValidatedFilters {
            min_rating: Some(8.0),
            max_rating: Some(3.0),
            ..Default::default()
        };
        let outcome = FilterPipeline::from_filters(&filters).run(catalog(), &profile(), &filters);
        assert!(outcome.items.is_empty());
        assert_eq!(outcome.excluded, 5);
    }

    #[test]
    fn test_limit_applied_after_filtering() {
        let filters = ValidatedFilters {
            genre: Some(vec!["Comedy".to_string()]),
            limit: Some(2),
            ..Default::default()
        };

        let outcome = FilterPipeline::from_filters(&filters).run(catalog(), &profile(), &filters);
        // Three comedies survive the filter; the limit trims to the two most relevant
        assert_eq!(outcome.matched, 3);
        assert_eq!(outcome.items.len(), 2);
        let ids: Vec<u64> = outcome.items.iter().map(|i| i.show.id).collect();
        assert_eq!(ids, vec![3, 1]);
    }

    #[test]
    fn test_hide_watched_excludes_history() {
        let mut profile = profile();
        profile.viewing_history.push(ViewingRecord {
            content_id: 2,
            media_type: MediaType::Tv,
            watched_at: Utc::now(),
            watch_duration: 50,
            total_duration: 50,
            completed: true,
            rating: Some(9),
            skip_count: 0,
        });
        // Same id but a movie: different composite key, must survive
        profile.viewing_history.push(ViewingRecord {
            content_id: 5,
            media_type: MediaType::Movie,
            watched_at: Utc::now(),
            watch_duration: 90,
            total_duration: 120,
            completed: false,
            rating: None,
            skip_count: 1,
        });

        let filters = ValidatedFilters {
            hide_watched: Some(true),
            ..Default::default()
        };
        let outcome = FilterPipeline::from_filters(&filters).run(catalog(), &profile, &filters);
        let ids: Vec<u64> = outcome.items.iter().map(|i| i.show.id).collect();
        assert!(!ids.contains(&2));
        assert!(ids.contains(&5));
        assert_eq!(outcome.excluded, 1);
    }

    #[test]
    fn test_hide_watched_false_adds_no_filter() {
        let filters = ValidatedFilters {
            hide_watched: Some(false),
            ..Default::default()
        };
        assert!(FilterPipeline::from_filters(&filters).is_empty());
    }

    #[test]
    fn test_sort_by_rating_scenario() {
        let candidates = vec![
            scored(show(1, "A", vec![18], 9.0), 0.1),
            scored(show(2, "B", vec![18], 5.5), 0.9),
            scored(show(3, "C", vec![18], 7.2), 0.5),
        ];
        let filters = ValidatedFilters {
            sort_by: Some(SortBy::Rating),
            ..Default::default()
        };

        let outcome = FilterPipeline::from_filters(&filters).run(candidates, &profile(), &filters);
        let ratings: Vec<f64> = outcome.items.iter().map(|i| i.show.vote_average).collect();
        assert_eq!(ratings, vec![9.0, 7.2, 5.5]);
    }
}
