//! Personalization score for the filtered path.
//!
//! `score = 0.4 * genre overlap + 0.2 * platform match + 0.2 * rating/10
//! + 0.2 * exploration`, then scaled by the best matching seasonal multiplier
//! and nudged up when a temporal pattern names one of the show's genres.
//! The result is clamped to [0, 1].

use std::collections::HashSet;

use chrono::NaiveDateTime;
use rand::Rng;

use crate::{
    models::{EnhancedUserProfile, Show},
    services::{
        filter_options::genre_name,
        filters::{PlatformFilter, ScoredShow},
    },
};

/// Bonus when today's weekday, month or time slot prefers one of the genres
pub const TEMPORAL_BONUS: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringWeights {
    pub genre: f64,
    pub platform: f64,
    pub rating: f64,
    pub exploration: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            genre: 0.4,
            platform: 0.2,
            rating: 0.2,
            exploration: 0.2,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PersonalizationScorer {
    weights: ScoringWeights,
}

fn lowercase_genres(show: &Show) -> HashSet<String> {
    show.genre_ids
        .iter()
        .filter_map(|id| genre_name(*id))
        .map(str::to_lowercase)
        .collect()
}

impl PersonalizationScorer {
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> ScoringWeights {
        self.weights
    }

    /// Share of the show's genres that are among the user's favorites
    pub fn genre_overlap(show: &Show, profile: &EnhancedUserProfile) -> f64 {
        if show.genre_ids.is_empty() {
            return 0.0;
        }
        let favorites: HashSet<String> = profile
            .favorite_genres
            .iter()
            .map(|g| g.to_lowercase())
            .collect();
        let matching = show
            .genre_ids
            .iter()
            .filter_map(|id| genre_name(*id))
            .filter(|name| favorites.contains(&name.to_lowercase()))
            .count();
        matching as f64 / show.genre_ids.len() as f64
    }

    fn seasonal_multiplier(genres: &HashSet<String>, profile: &EnhancedUserProfile) -> f64 {
        profile
            .contextual_cues
            .seasonal_trends
            .iter()
            .filter(|(genre, _)| genres.contains(&genre.to_lowercase()))
            .map(|(_, multiplier)| *multiplier)
            .filter(|m| m.is_finite() && *m >= 0.0)
            .fold(None, |best: Option<f64>, m| Some(best.map_or(m, |b| b.max(m))))
            .unwrap_or(1.0)
    }

    fn temporal_match(
        genres: &HashSet<String>,
        profile: &EnhancedUserProfile,
        now: NaiveDateTime,
    ) -> bool {
        let patterns = &profile.temporal_patterns;
        let weekday = now.format("%A").to_string().to_lowercase();
        let month = now.format("%B").to_string().to_lowercase();
        let slot = profile.contextual_cues.time_of_day.as_str();

        [
            patterns.weekday.get(&weekday),
            patterns.month.get(&month),
            patterns.time_slot.get(slot),
        ]
        .into_iter()
        .flatten()
        .flatten()
        .any(|genre| genres.contains(&genre.to_lowercase()))
    }

    pub fn score<R: Rng>(
        &self,
        show: &Show,
        profile: &EnhancedUserProfile,
        platforms: &PlatformFilter,
        now: NaiveDateTime,
        rng: &mut R,
    ) -> f64 {
        let w = self.weights;
        let platform_match = if platforms.matches(show) { 1.0 } else { 0.0 };
        let rating = (show.vote_average / 10.0).clamp(0.0, 1.0);

        let base = w.genre * Self::genre_overlap(show, profile)
            + w.platform * platform_match
            + w.rating * rating
            + w.exploration * rng.random::<f64>();

        let genres = lowercase_genres(show);
        let mut score = base * Self::seasonal_multiplier(&genres, profile);
        if Self::temporal_match(&genres, profile, now) {
            score += TEMPORAL_BONUS;
        }
        score.clamp(0.0, 1.0)
    }

    /// Scores every candidate against the profile. Preferred networks and the
    /// requested platforms both count as a platform match.
    pub fn score_all<R: Rng>(
        &self,
        shows: Vec<Show>,
        profile: &EnhancedUserProfile,
        requested_platforms: &[String],
        now: NaiveDateTime,
        rng: &mut R,
    ) -> Vec<ScoredShow> {
        let mut platforms: Vec<String> = profile.preferred_networks.iter().cloned().collect();
        platforms.extend(requested_platforms.iter().cloned());
        let platforms = PlatformFilter::new(&platforms);

        shows
            .into_iter()
            .map(|show| {
                let score = self.score(&show, profile, &platforms, now, rng);
                ScoredShow::new(show, score)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::filters::test_support::{profile, show};
    use chrono::NaiveDate;
    use rand::{rngs::StdRng, SeedableRng};

    fn friday_evening() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 10, 4)
            .unwrap()
            .and_hms_opt(19, 0, 0)
            .unwrap()
    }

    fn no_exploration() -> PersonalizationScorer {
        PersonalizationScorer::new(ScoringWeights {
            exploration: 0.0,
            ..Default::default()
        })
    }

    #[test]
    fn test_default_weights_sum_to_one() {
        let w = ScoringWeights::default();
        assert!((w.genre + w.platform + w.rating + w.exploration - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_genre_overlap_ratio() {
        let mut user = profile();
        user.favorite_genres.insert("drama".to_string());
        let candidate = show(1, "Crime Drama", vec![18, 80], 8.0);
        assert!((PersonalizationScorer::genre_overlap(&candidate, &user) - 0.5).abs() < 1e-9);

        let untagged = show(2, "Untagged", vec![], 8.0);
        assert_eq!(PersonalizationScorer::genre_overlap(&untagged, &user), 0.0);
    }

    #[test]
    fn test_deterministic_components() {
        let mut user = profile();
        user.favorite_genres.insert("Drama".to_string());
        user.preferred_networks.insert("Netflix".to_string());
        let mut rng = StdRng::seed_from_u64(7);

        let scored = no_exploration().score_all(
            vec![show(1, "Drama on Netflix", vec![18], 9.0)],
            &user,
            &[],
            friday_evening(),
            &mut rng,
        );
        // 0.4 + 0.2 + 0.18
        assert!((scored[0].score - 0.78).abs() < 1e-9);
    }

    #[test]
    fn test_requested_platform_counts_as_match() {
        let user = profile();
        let mut rng = StdRng::seed_from_u64(7);
        let candidate = show(1, "Netflix Show", vec![35], 5.0);

        let without = no_exploration().score_all(
            vec![candidate.clone()],
            &user,
            &[],
            friday_evening(),
            &mut rng,
        );
        let with = no_exploration().score_all(
            vec![candidate],
            &user,
            &["netflix".to_string()],
            friday_evening(),
            &mut rng,
        );
        assert!((with[0].score - without[0].score - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_modifiers_and_clamp() {
        let mut user = profile();
        user.favorite_genres.insert("Comedy".to_string());
        user.contextual_cues.seasonal_trends.insert("Comedy".to_string(), 3.0);
        let mut rng = StdRng::seed_from_u64(1);

        let boosted = PersonalizationScorer::default().score_all(
            vec![show(1, "Sitcom", vec![35], 9.5)],
            &user,
            &[],
            friday_evening(),
            &mut rng,
        );
        assert_eq!(boosted[0].score, 1.0);

        let mut user = profile();
        user.temporal_patterns
            .weekday
            .insert("friday".to_string(), vec!["Comedy".to_string()]);
        let plain = no_exploration().score_all(
            vec![show(2, "Sitcom", vec![35], 5.0)],
            &profile(),
            &[],
            friday_evening(),
            &mut rng,
        );
        let friday = no_exploration().score_all(
            vec![show(2, "Sitcom", vec![35], 5.0)],
            &user,
            &[],
            friday_evening(),
            &mut rng,
        );
        assert!((friday[0].score - plain[0].score - TEMPORAL_BONUS).abs() < 1e-9);
    }

    #[test]
    fn test_scores_stay_in_unit_range() {
        let mut user = profile();
        user.favorite_genres.insert("Drama".to_string());
        let mut rng = StdRng::seed_from_u64(42);
        let shows: Vec<Show> = (0..50)
            .map(|i| show(i, "Show", vec![18, 35], (i % 11) as f64))
            .collect();

        let scored = PersonalizationScorer::default().score_all(
            shows,
            &user,
            &[],
            friday_evening(),
            &mut rng,
        );
        assert!(scored.iter().all(|s| (0.0..=1.0).contains(&s.score)));
    }
}
