//! Individual filters. Each is a pure predicate over candidate metadata.
//!
//! Platform, runtime and content-rating filters need the field to be present:
//! a candidate without networks, runtime or certification is excluded while
//! one of those filters is active. Language, country and year filters keep
//! candidates that lack the field.

use std::collections::HashSet;

use super::{Filter, ScoredShow};
use crate::models::{ContentRating, EnhancedUserProfile, RuntimeBucket, Show, YearRange};
use crate::services::filter_options::{genre_id, mood_genres, PLATFORMS};
use chrono::Datelike;

fn retain(
    candidates: Vec<ScoredShow>,
    predicate: impl Fn(&Show) -> bool,
) -> Vec<ScoredShow> {
    candidates
        .into_iter()
        .filter(|candidate| predicate(&candidate.show))
        .collect()
}

/// Drops anything whose `(type, id)` is in the viewing history
pub struct HideWatchedFilter;

impl Filter for HideWatchedFilter {
    fn name(&self) -> &str {
        "HideWatchedFilter"
    }

    fn apply(&self, candidates: Vec<ScoredShow>, profile: &EnhancedUserProfile) -> Vec<ScoredShow> {
        let watched = profile.watched_keys();
        retain(candidates, |show| !watched.contains(&show.key()))
    }
}

/// Keeps candidates carrying at least one requested genre
pub struct GenreFilter {
    genre_ids: HashSet<u32>,
}

impl GenreFilter {
    /// Names that do not resolve to a known genre can never match
    pub fn from_names(names: &[String]) -> Self {
        let genre_ids = names.iter().filter_map(|name| genre_id(name)).collect();
        Self { genre_ids }
    }
}

impl Filter for GenreFilter {
    fn name(&self) -> &str {
        "GenreFilter"
    }

    fn apply(
        &self,
        candidates: Vec<ScoredShow>,
        _profile: &EnhancedUserProfile,
    ) -> Vec<ScoredShow> {
        retain(candidates, |show| {
            show.genre_ids.iter().any(|id| self.genre_ids.contains(id))
        })
    }
}

/// Keeps candidates in a genre associated with the mood
pub struct MoodFilter {
    genre_ids: HashSet<u32>,
}

impl MoodFilter {
    pub fn for_mood(mood: &str) -> Option<Self> {
        mood_genres(mood).map(|genres| Self {
            genre_ids: genres.iter().copied().collect(),
        })
    }
}

impl Filter for MoodFilter {
    fn name(&self) -> &str {
        "MoodFilter"
    }

    fn apply(
        &self,
        candidates: Vec<ScoredShow>,
        _profile: &EnhancedUserProfile,
    ) -> Vec<ScoredShow> {
        retain(candidates, |show| {
            show.genre_ids.iter().any(|id| self.genre_ids.contains(id))
        })
    }
}

/// Matches network names case-insensitively, or TMDB network ids
pub struct PlatformFilter {
    names: HashSet<String>,
    ids: HashSet<u64>,
}

impl PlatformFilter {
    pub fn new(platforms: &[String]) -> Self {
        let mut names = HashSet::new();
        let mut ids = HashSet::new();
        for platform in platforms {
            if let Ok(id) = platform.parse::<u64>() {
                ids.insert(id);
            } else {
                names.insert(platform.to_lowercase());
                if let Some((id, _)) = PLATFORMS
                    .iter()
                    .find(|(_, name)| name.eq_ignore_ascii_case(platform))
                {
                    ids.insert(*id);
                }
            }
        }
        Self { names, ids }
    }

    pub fn matches(&self, show: &Show) -> bool {
        show.networks.iter().any(|network| {
            self.ids.contains(&network.id) || self.names.contains(&network.name.to_lowercase())
        })
    }
}

impl Filter for PlatformFilter {
    fn name(&self) -> &str {
        "PlatformFilter"
    }

    fn apply(
        &self,
        candidates: Vec<ScoredShow>,
        _profile: &EnhancedUserProfile,
    ) -> Vec<ScoredShow> {
        retain(candidates, |show| self.matches(show))
    }
}

pub struct LanguageFilter {
    languages: HashSet<String>,
}

impl LanguageFilter {
    pub fn new(languages: &[String]) -> Self {
        Self {
            languages: languages.iter().map(|l| l.to_lowercase()).collect(),
        }
    }
}

impl Filter for LanguageFilter {
    fn name(&self) -> &str {
        "LanguageFilter"
    }

    fn apply(
        &self,
        candidates: Vec<ScoredShow>,
        _profile: &EnhancedUserProfile,
    ) -> Vec<ScoredShow> {
        retain(candidates, |show| match &show.original_language {
            Some(language) => self.languages.contains(&language.to_lowercase()),
            None => true,
        })
    }
}

pub struct CountryFilter {
    country: String,
}

impl CountryFilter {
    pub fn new(country: &str) -> Self {
        Self {
            country: country.to_uppercase(),
        }
    }
}

impl Filter for CountryFilter {
    fn name(&self) -> &str {
        "CountryFilter"
    }

    fn apply(
        &self,
        candidates: Vec<ScoredShow>,
        _profile: &EnhancedUserProfile,
    ) -> Vec<ScoredShow> {
        retain(candidates, |show| {
            show.origin_country.is_empty()
                || show
                    .origin_country
                    .iter()
                    .any(|c| c.eq_ignore_ascii_case(&self.country))
        })
    }
}

pub struct RuntimeFilter {
    bucket: RuntimeBucket,
}

impl RuntimeFilter {
    pub fn new(bucket: RuntimeBucket) -> Self {
        Self { bucket }
    }
}

impl Filter for RuntimeFilter {
    fn name(&self) -> &str {
        "RuntimeFilter"
    }

    fn apply(
        &self,
        candidates: Vec<ScoredShow>,
        _profile: &EnhancedUserProfile,
    ) -> Vec<ScoredShow> {
        if self.bucket == RuntimeBucket::All {
            return candidates;
        }
        retain(candidates, |show| {
            show.runtime_minutes
                .is_some_and(|minutes| self.bucket.contains(minutes))
        })
    }
}

pub struct ContentRatingFilter {
    rating: ContentRating,
}

impl ContentRatingFilter {
    pub fn new(rating: ContentRating) -> Self {
        Self { rating }
    }
}

impl Filter for ContentRatingFilter {
    fn name(&self) -> &str {
        "ContentRatingFilter"
    }

    fn apply(
        &self,
        candidates: Vec<ScoredShow>,
        _profile: &EnhancedUserProfile,
    ) -> Vec<ScoredShow> {
        retain(candidates, |show| {
            show.content_rating.as_deref() == Some(self.rating.as_str())
        })
    }
}

/// Inclusive vote-average bounds. An inverted range keeps nothing.
pub struct RatingRangeFilter {
    min: Option<f64>,
    max: Option<f64>,
}

impl RatingRangeFilter {
    pub fn new(min: Option<f64>, max: Option<f64>) -> Self {
        Self { min, max }
    }
}

impl Filter for RatingRangeFilter {
    fn name(&self) -> &str {
        "RatingRangeFilter"
    }

    fn apply(
        &self,
        candidates: Vec<ScoredShow>,
        _profile: &EnhancedUserProfile,
    ) -> Vec<ScoredShow> {
        retain(candidates, |show| {
            self.min.map_or(true, |min| show.vote_average >= min)
                && self.max.map_or(true, |max| show.vote_average <= max)
        })
    }
}

/// Inclusive release-year bounds
pub struct YearRangeFilter {
    range: YearRange,
}

impl YearRangeFilter {
    pub fn new(range: YearRange) -> Self {
        Self { range }
    }
}

impl Filter for YearRangeFilter {
    fn name(&self) -> &str {
        "YearRangeFilter"
    }

    fn apply(
        &self,
        candidates: Vec<ScoredShow>,
        _profile: &EnhancedUserProfile,
    ) -> Vec<ScoredShow> {
        retain(candidates, |show| match show.release_date {
            Some(date) => {
                let year = date.year();
                self.range.min.map_or(true, |min| year >= min)
                    && self.range.max.map_or(true, |max| year <= max)
            }
            None => true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::models::{Network, TmdbTvResult};
    use chrono::NaiveDate;

    fn ids(items: &[ScoredShow]) -> Vec<u64> {
        items.iter().map(|i| i.show.id).collect()
    }

    #[test]
    fn test_genre_filter_by_name_and_id() {
        let candidates = vec![
            scored(show(1, "A", vec![35], 7.0), 0.0),
            scored(show(2, "B", vec![18], 7.0), 0.0),
            scored(show(3, "C", vec![], 7.0), 0.0),
        ];
        let filter = GenreFilter::from_names(&["comedy".to_string(), "18".to_string()]);
        assert_eq!(ids(&filter.apply(candidates, &profile())), vec![1, 2]);
    }

    #[test]
    fn test_unknown_genre_matches_nothing() {
        let candidates = vec![scored(show(1, "A", vec![35], 7.0), 0.0)];
        let filter = GenreFilter::from_names(&["Polka".to_string()]);
        assert!(filter.apply(candidates, &profile()).is_empty());
    }

    #[test]
    fn test_mood_filter() {
        let candidates = vec![
            scored(show(1, "Sitcom", vec![35], 7.0), 0.0),
            scored(show(2, "Slasher", vec![27], 7.0), 0.0),
        ];
        let filter = MoodFilter::for_mood("happy").unwrap();
        assert_eq!(ids(&filter.apply(candidates, &profile())), vec![1]);
        assert!(MoodFilter::for_mood("wistful").is_none());
    }

    #[test]
    fn test_platform_filter_by_name_or_id() {
        let mut hbo = show(2, "B", vec![18], 7.0);
        hbo.networks = vec![Network {
            id: 49,
            name: "HBO".to_string(),
        }];
        let mut unknown = show(3, "C", vec![18], 7.0);
        unknown.networks.clear();

        let candidates = vec![
            scored(show(1, "A", vec![18], 7.0), 0.0),
            scored(hbo, 0.0),
            scored(unknown, 0.0),
        ];

        let filter = PlatformFilter::new(&["hbo".to_string()]);
        assert_eq!(ids(&filter.apply(candidates.clone(), &profile())), vec![2]);

        let filter = PlatformFilter::new(&["213".to_string()]);
        assert_eq!(ids(&filter.apply(candidates, &profile())), vec![1]);
    }

    #[test]
    fn test_platform_filter_excludes_bare_listing_entries() {
        let listing: Vec<TmdbTvResult> = serde_json::from_str(
            r#"[
                {"id": 1396, "name": "Breaking Bad", "genre_ids": [18], "vote_average": 8.9},
                {"id": 94605, "name": "Arcane", "genre_ids": [16], "vote_average": 8.7}
            ]"#,
        )
        .unwrap();
        let mut candidates: Vec<ScoredShow> = listing
            .into_iter()
            .map(|result| scored(Show::from(result), 0.0))
            .collect();
        candidates.push(scored(show(3, "On Netflix", vec![18], 7.0), 0.0));

        let filter = PlatformFilter::new(&["Netflix".to_string()]);
        assert_eq!(ids(&filter.apply(candidates, &profile())), vec![3]);
    }

    #[test]
    fn test_language_and_country() {
        let mut korean = show(2, "B", vec![18], 7.0);
        korean.original_language = Some("ko".to_string());
        korean.origin_country = vec!["KR".to_string()];

        let candidates = vec![scored(show(1, "A", vec![18], 7.0), 0.0), scored(korean, 0.0)];

        let filter = LanguageFilter::new(&["KO".to_string()]);
        assert_eq!(ids(&filter.apply(candidates.clone(), &profile())), vec![2]);

        let filter = CountryFilter::new("us");
        assert_eq!(ids(&filter.apply(candidates, &profile())), vec![1]);
    }

    #[test]
    fn test_runtime_filter() {
        let mut short = show(1, "A", vec![18], 7.0);
        short.runtime_minutes = Some(22);
        let mut long = show(2, "B", vec![18], 7.0);
        long.runtime_minutes = Some(95);
        let unknown = show(3, "C", vec![18], 7.0);

        let candidates = vec![scored(short, 0.0), scored(long, 0.0), scored(unknown, 0.0)];

        let filter = RuntimeFilter::new(RuntimeBucket::Short);
        assert_eq!(ids(&filter.apply(candidates.clone(), &profile())), vec![1]);

        let filter = RuntimeFilter::new(RuntimeBucket::All);
        assert_eq!(filter.apply(candidates, &profile()).len(), 3);
    }

    #[test]
    fn test_content_rating_filter() {
        let mut mature = show(1, "A", vec![18], 7.0);
        mature.content_rating = Some("TV-MA".to_string());
        let mut kids = show(2, "B", vec![16], 7.0);
        kids.content_rating = Some("TV-Y".to_string());

        let unrated = show(3, "C", vec![16], 7.0);

        let candidates = vec![scored(mature, 0.0), scored(kids, 0.0), scored(unrated, 0.0)];
        let filter = ContentRatingFilter::new(ContentRating::TvY);
        assert_eq!(ids(&filter.apply(candidates, &profile())), vec![2]);
    }

    #[test]
    fn test_rating_range_is_inclusive() {
        let candidates = vec![
            scored(show(1, "A", vec![18], 6.0), 0.0),
            scored(show(2, "B", vec![18], 8.0), 0.0),
            scored(show(3, "C", vec![18], 9.5), 0.0),
        ];
        let filter = RatingRangeFilter::new(Some(6.0), Some(8.0));
        assert_eq!(ids(&filter.apply(candidates, &profile())), vec![1, 2]);
    }

    #[test]
    fn test_year_range_filter() {
        let mut old = show(1, "A", vec![18], 7.0);
        old.release_date = NaiveDate::from_ymd_opt(1994, 9, 22);
        let mut new = show(2, "B", vec![18], 7.0);
        new.release_date = NaiveDate::from_ymd_opt(2019, 7, 4);

        let candidates = vec![scored(old, 0.0), scored(new, 0.0)];
        let filter = YearRangeFilter::new(YearRange {
            min: Some(2000),
            max: None,
        });
        assert_eq!(ids(&filter.apply(candidates.clone(), &profile())), vec![2]);

        let inverted = YearRangeFilter::new(YearRange {
            min: Some(2020),
            max: Some(1990),
        });
        assert!(inverted.apply(candidates, &profile()).is_empty());
    }
}
