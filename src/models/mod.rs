use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

pub mod analytics;
pub mod filters;
pub mod profile;
pub mod recommendation;

pub use analytics::*;
pub use filters::{ContentRating, RuntimeBucket, SortBy, ValidatedFilters, YearRange};
pub use profile::*;
pub use recommendation::*;

/// Kind of catalog item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Movie,
    Tv,
    /// Placeholder records whose type could not be resolved
    Unknown,
}

impl Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaType::Movie => write!(f, "movie"),
            MediaType::Tv => write!(f, "tv"),
            MediaType::Unknown => write!(f, "unknown"),
        }
    }
}

impl MediaType {
    pub fn parse(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "movie" => MediaType::Movie,
            "tv" | "series" | "tv_series" => MediaType::Tv,
            _ => MediaType::Unknown,
        }
    }
}

/// A broadcaster or streaming platform carrying a show
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Network {
    pub id: u64,
    pub name: String,
}

/// A candidate show as supplied by the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Show {
    pub id: u64,
    #[serde(rename = "type")]
    pub media_type: MediaType,
    pub title: String,
    #[serde(default)]
    pub genre_ids: Vec<u32>,
    pub vote_average: f64,
    #[serde(default)]
    pub popularity: Option<f64>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub release_date: Option<NaiveDate>,
    #[serde(default)]
    pub original_language: Option<String>,
    #[serde(default)]
    pub origin_country: Vec<String>,
    #[serde(default)]
    pub runtime_minutes: Option<u32>,
    #[serde(default)]
    pub networks: Vec<Network>,
    #[serde(default)]
    pub content_rating: Option<String>,
}

impl Show {
    /// Composite identity used for dedup and watched-history matching
    pub fn key(&self) -> (MediaType, u64) {
        (self.media_type, self.id)
    }

    /// Fills networks, runtime and content rating that the listing lacked
    pub fn fill_from(&mut self, detail: &ShowDetail) {
        if self.networks.is_empty() {
            self.networks = detail.networks.clone();
        }
        if self.runtime_minutes.is_none() {
            self.runtime_minutes = detail.runtime_minutes;
        }
        if self.content_rating.is_none() {
            self.content_rating = detail.content_rating.clone();
        }
    }
}

/// A genre as returned by detail lookups
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Genre {
    pub id: u32,
    pub name: String,
}

/// Fully hydrated show detail returned to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowDetail {
    pub id: u64,
    #[serde(rename = "type")]
    pub media_type: MediaType,
    pub title: String,
    pub overview: String,
    #[serde(default)]
    pub genres: Vec<Genre>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub release_date: Option<NaiveDate>,
    #[serde(default)]
    pub runtime_minutes: Option<u32>,
    #[serde(default)]
    pub networks: Vec<Network>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_rating: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
}

impl ShowDetail {
    /// Stand-in record for an item whose detail lookup failed
    pub fn placeholder(id: u64) -> Self {
        Self {
            id,
            media_type: MediaType::Unknown,
            title: format!("Content {}", id),
            overview: "Details not available".to_string(),
            genres: Vec::new(),
            vote_average: None,
            release_date: None,
            runtime_minutes: None,
            networks: Vec::new(),
            content_rating: None,
            poster_path: None,
        }
    }

    pub fn key(&self) -> (MediaType, u64) {
        (self.media_type, self.id)
    }
}

impl From<&Show> for ShowDetail {
    fn from(show: &Show) -> Self {
        let genres = show
            .genre_ids
            .iter()
            .map(|id| Genre {
                id: *id,
                name: crate::services::filter_options::genre_name(*id)
                    .unwrap_or("Unknown")
                    .to_string(),
            })
            .collect();

        Self {
            id: show.id,
            media_type: show.media_type,
            title: show.title.clone(),
            overview: show.overview.clone().unwrap_or_default(),
            genres,
            vote_average: Some(show.vote_average),
            release_date: show.release_date,
            runtime_minutes: show.runtime_minutes,
            networks: show.networks.clone(),
            content_rating: show.content_rating.clone(),
            poster_path: None,
        }
    }
}

// ============================================================================
// TMDB API Types
// ============================================================================

/// Entry of a TMDB `/tv/popular` page
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbTvResult {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub genre_ids: Vec<u32>,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub popularity: Option<f64>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub first_air_date: Option<String>,
    #[serde(default)]
    pub original_language: Option<String>,
    #[serde(default)]
    pub origin_country: Vec<String>,
}

/// TMDB returns "" for unknown dates
fn parse_tmdb_date(value: Option<&str>) -> Option<NaiveDate> {
    value.and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
}

impl From<TmdbTvResult> for Show {
    fn from(result: TmdbTvResult) -> Self {
        Show {
            id: result.id,
            media_type: MediaType::Tv,
            title: result.name,
            genre_ids: result.genre_ids,
            vote_average: result.vote_average,
            popularity: result.popularity,
            release_date: parse_tmdb_date(result.first_air_date.as_deref()),
            overview: result.overview,
            original_language: result.original_language,
            origin_country: result.origin_country,
            runtime_minutes: None,
            networks: Vec::new(),
            content_rating: None,
        }
    }
}

/// TMDB `/tv/{id}` response
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbTvDetails {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub genres: Vec<Genre>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub first_air_date: Option<String>,
    #[serde(default)]
    pub episode_run_time: Vec<u32>,
    #[serde(default)]
    pub networks: Vec<Network>,
    #[serde(default)]
    pub poster_path: Option<String>,
    /// Present when requested with `append_to_response=content_ratings`
    #[serde(default)]
    pub content_ratings: Option<TmdbContentRatings>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbContentRatings {
    #[serde(default)]
    pub results: Vec<TmdbContentRating>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbContentRating {
    pub iso_3166_1: String,
    pub rating: String,
}

impl TmdbTvDetails {
    /// US certification, the scale the rating filter uses
    fn us_rating(&self) -> Option<String> {
        self.content_ratings
            .as_ref()?
            .results
            .iter()
            .find(|r| r.iso_3166_1 == "US" && !r.rating.trim().is_empty())
            .map(|r| r.rating.trim().to_string())
    }
}

impl From<TmdbTvDetails> for ShowDetail {
    fn from(details: TmdbTvDetails) -> Self {
        let content_rating = details.us_rating();
        ShowDetail {
            id: details.id,
            media_type: MediaType::Tv,
            title: details.name,
            overview: details.overview.unwrap_or_default(),
            genres: details.genres,
            vote_average: details.vote_average,
            release_date: parse_tmdb_date(details.first_air_date.as_deref()),
            runtime_minutes: details.episode_run_time.first().copied(),
            networks: details.networks,
            content_rating,
            poster_path: details.poster_path,
        }
    }
}

/// TMDB `/movie/{id}` response
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbMovieDetails {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub genres: Vec<Genre>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub runtime: Option<u32>,
    #[serde(default)]
    pub poster_path: Option<String>,
}

impl From<TmdbMovieDetails> for ShowDetail {
    fn from(details: TmdbMovieDetails) -> Self {
        ShowDetail {
            id: details.id,
            media_type: MediaType::Movie,
            title: details.title,
            overview: details.overview.unwrap_or_default(),
            genres: details.genres,
            vote_average: details.vote_average,
            release_date: parse_tmdb_date(details.release_date.as_deref()),
            runtime_minutes: details.runtime,
            networks: Vec::new(),
            content_rating: None,
            poster_path: details.poster_path,
        }
    }
}
