//! Enumerated values accepted by the recommendation filters.
//!
//! Genre and network ids follow TMDB's numbering so catalog items can be
//! matched without a second lookup.

use serde::Serialize;

use crate::models::{
    filters::{DEFAULT_LIMIT, MAX_LIMIT, MAX_RATING, MIN_LIMIT, MIN_RATING},
    ContentRating, RuntimeBucket, SortBy,
};

/// TMDB genre ids (movie and TV lists merged)
pub const GENRES: &[(u32, &str)] = &[
    (28, "Action"),
    (12, "Adventure"),
    (16, "Animation"),
    (35, "Comedy"),
    (80, "Crime"),
    (99, "Documentary"),
    (18, "Drama"),
    (10751, "Family"),
    (14, "Fantasy"),
    (36, "History"),
    (27, "Horror"),
    (10402, "Music"),
    (9648, "Mystery"),
    (10749, "Romance"),
    (878, "Science Fiction"),
    (53, "Thriller"),
    (10752, "War"),
    (37, "Western"),
    (10759, "Action & Adventure"),
    (10762, "Kids"),
    (10763, "News"),
    (10764, "Reality"),
    (10765, "Sci-Fi & Fantasy"),
    (10766, "Soap"),
    (10767, "Talk"),
    (10768, "War & Politics"),
];

/// Mood name to the genres that satisfy it
pub const MOODS: &[(&str, &[u32])] = &[
    ("happy", &[35, 16, 10751]),
    ("excited", &[28, 12, 10759, 53]),
    ("relaxed", &[99, 10764, 16, 10402]),
    ("thoughtful", &[18, 99, 36, 10768]),
    ("scared", &[27, 53, 9648]),
    ("romantic", &[10749, 18]),
    ("adventurous", &[12, 14, 10765, 878]),
    ("nostalgic", &[10751, 16, 36, 37]),
];

/// TMDB network ids of the supported platforms
pub const PLATFORMS: &[(u64, &str)] = &[
    (213, "Netflix"),
    (49, "HBO"),
    (453, "Hulu"),
    (1024, "Prime Video"),
    (2739, "Disney+"),
    (2552, "Apple TV+"),
    (4330, "Paramount+"),
    (3353, "Peacock"),
];

pub const COUNTRIES: &[&str] = &["US", "GB", "CA", "AU", "DE", "FR", "ES", "JP", "KR", "IN"];

pub const LANGUAGES: &[(&str, &str)] = &[
    ("en", "English"),
    ("es", "Spanish"),
    ("fr", "French"),
    ("de", "German"),
    ("ja", "Japanese"),
    ("ko", "Korean"),
    ("hi", "Hindi"),
    ("it", "Italian"),
    ("pt", "Portuguese"),
];

pub fn genre_name(id: u32) -> Option<&'static str> {
    GENRES.iter().find(|(gid, _)| *gid == id).map(|(_, name)| *name)
}

/// Resolves a genre by name (case-insensitive) or by its numeric id
pub fn genre_id(name_or_id: &str) -> Option<u32> {
    let trimmed = name_or_id.trim();
    if let Ok(id) = trimmed.parse::<u32>() {
        return genre_name(id).map(|_| id);
    }
    GENRES
        .iter()
        .find(|(_, name)| name.eq_ignore_ascii_case(trimmed))
        .map(|(id, _)| *id)
}

/// Genres for a mood, `None` for moods outside the known set
pub fn mood_genres(mood: &str) -> Option<&'static [u32]> {
    let mood = mood.trim();
    MOODS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(mood))
        .map(|(_, genres)| *genres)
}

#[derive(Debug, Serialize)]
pub struct NamedOption {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationBounds {
    pub max_limit: u32,
    pub min_limit: u32,
    pub default_limit: u32,
    pub min_rating: f64,
    pub max_rating: f64,
}

/// Body of `GET /filter-options`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterOptions {
    pub success: bool,
    pub moods: Vec<String>,
    pub genres: Vec<NamedOption>,
    pub platforms: Vec<NamedOption>,
    pub countries: Vec<String>,
    pub runtime_options: Vec<String>,
    pub content_ratings: Vec<String>,
    pub sort_options: Vec<String>,
    pub languages: Vec<NamedOption>,
    pub validation: ValidationBounds,
}

pub fn filter_options() -> FilterOptions {
    FilterOptions {
        success: true,
        moods: MOODS.iter().map(|(name, _)| name.to_string()).collect(),
        genres: GENRES
            .iter()
            .map(|(id, name)| NamedOption {
                id: id.to_string(),
                name: name.to_string(),
            })
            .collect(),
        platforms: PLATFORMS
            .iter()
            .map(|(id, name)| NamedOption {
                id: id.to_string(),
                name: name.to_string(),
            })
            .collect(),
        countries: COUNTRIES.iter().map(|c| c.to_string()).collect(),
        runtime_options: RuntimeBucket::VALUES
            .iter()
            .map(|r| r.as_str().to_string())
            .collect(),
        content_ratings: ContentRating::VALUES
            .iter()
            .map(|r| r.as_str().to_string())
            .collect(),
        sort_options: SortBy::VALUES.iter().map(|s| s.as_str().to_string()).collect(),
        languages: LANGUAGES
            .iter()
            .map(|(code, name)| NamedOption {
                id: code.to_string(),
                name: name.to_string(),
            })
            .collect(),
        validation: ValidationBounds {
            max_limit: MAX_LIMIT,
            min_limit: MIN_LIMIT,
            default_limit: DEFAULT_LIMIT,
            min_rating: MIN_RATING,
            max_rating: MAX_RATING,
        },
    }
}
