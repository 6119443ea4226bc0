use serde::{Deserialize, Serialize};

/// Default page size when the caller does not ask for one
pub const DEFAULT_LIMIT: u32 = 12;
/// Upper bound applied to any requested limit
pub const MAX_LIMIT: u32 = 50;
pub const MIN_LIMIT: u32 = 1;
pub const MIN_RATING: f64 = 0.0;
pub const MAX_RATING: f64 = 10.0;
/// Year range minimums must be strictly greater than this
pub const EARLIEST_YEAR_EXCLUSIVE: i32 = 1900;

/// Episode/feature length bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeBucket {
    All,
    /// Under 30 minutes
    Short,
    /// 30 to 60 minutes inclusive
    Standard,
    /// Over 60 minutes
    Long,
}

impl RuntimeBucket {
    pub const VALUES: [RuntimeBucket; 4] = [
        RuntimeBucket::All,
        RuntimeBucket::Short,
        RuntimeBucket::Standard,
        RuntimeBucket::Long,
    ];

    pub fn parse(value: &str) -> Option<Self> {
        Self::VALUES.into_iter().find(|v| v.as_str() == value)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RuntimeBucket::All => "all",
            RuntimeBucket::Short => "short",
            RuntimeBucket::Standard => "standard",
            RuntimeBucket::Long => "long",
        }
    }

    pub fn contains(&self, minutes: u32) -> bool {
        match self {
            RuntimeBucket::All => true,
            RuntimeBucket::Short => minutes < 30,
            RuntimeBucket::Standard => (30..=60).contains(&minutes),
            RuntimeBucket::Long => minutes > 60,
        }
    }
}

/// Ordering applied to the filtered result set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    #[default]
    Relevance,
    Rating,
    Popularity,
    Recent,
    Alphabetical,
}

impl SortBy {
    pub const VALUES: [SortBy; 5] = [
        SortBy::Relevance,
        SortBy::Rating,
        SortBy::Popularity,
        SortBy::Recent,
        SortBy::Alphabetical,
    ];

    pub fn parse(value: &str) -> Option<Self> {
        Self::VALUES.into_iter().find(|v| v.as_str() == value)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortBy::Relevance => "relevance",
            SortBy::Rating => "rating",
            SortBy::Popularity => "popularity",
            SortBy::Recent => "recent",
            SortBy::Alphabetical => "alphabetical",
        }
    }
}

/// Movie (MPAA) and TV parental guideline ratings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentRating {
    G,
    #[serde(rename = "PG")]
    Pg,
    #[serde(rename = "PG-13")]
    Pg13,
    R,
    #[serde(rename = "NC-17")]
    Nc17,
    #[serde(rename = "TV-Y")]
    TvY,
    #[serde(rename = "TV-Y7")]
    TvY7,
    #[serde(rename = "TV-G")]
    TvG,
    #[serde(rename = "TV-PG")]
    TvPg,
    #[serde(rename = "TV-14")]
    Tv14,
    #[serde(rename = "TV-MA")]
    TvMa,
}

impl ContentRating {
    pub const VALUES: [ContentRating; 11] = [
        ContentRating::G,
        ContentRating::Pg,
        ContentRating::Pg13,
        ContentRating::R,
        ContentRating::Nc17,
        ContentRating::TvY,
        ContentRating::TvY7,
        ContentRating::TvG,
        ContentRating::TvPg,
        ContentRating::Tv14,
        ContentRating::TvMa,
    ];

    pub fn parse(value: &str) -> Option<Self> {
        Self::VALUES.into_iter().find(|v| v.as_str() == value)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentRating::G => "G",
            ContentRating::Pg => "PG",
            ContentRating::Pg13 => "PG-13",
            ContentRating::R => "R",
            ContentRating::Nc17 => "NC-17",
            ContentRating::TvY => "TV-Y",
            ContentRating::TvY7 => "TV-Y7",
            ContentRating::TvG => "TV-G",
            ContentRating::TvPg => "TV-PG",
            ContentRating::Tv14 => "TV-14",
            ContentRating::TvMa => "TV-MA",
        }
    }
}

/// Release year bounds; either side may be absent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct YearRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<i32>,
}

/// Sanitized filter record. Only the filter validator constructs these from
/// caller input; every field has already passed its own check.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatedFilters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime: Option<RuntimeBucket>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_rating: Option<ContentRating>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year_range: Option<YearRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<SortBy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hide_watched: Option<bool>,
}

impl ValidatedFilters {
    pub fn limit_or_default(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_LIMIT) as usize
    }

    pub fn sort_or_default(&self) -> SortBy {
        self.sort_by.unwrap_or_default()
    }

    /// Keys of every filter that survived validation with a usable value.
    /// Reported back in response metadata only.
    pub fn applied_filters(&self) -> Vec<String> {
        let mut applied = Vec::new();
        let mut push = |present: bool, key: &str| {
            if present {
                applied.push(key.to_string());
            }
        };

        push(self.mood.is_some(), "mood");
        push(self.genre.as_ref().is_some_and(|v| !v.is_empty()), "genre");
        push(self.platform.as_ref().is_some_and(|v| !v.is_empty()), "platform");
        push(self.language.as_ref().is_some_and(|v| !v.is_empty()), "language");
        push(self.country.is_some(), "country");
        push(self.runtime.is_some(), "runtime");
        push(self.content_rating.is_some(), "contentRating");
        push(self.min_rating.is_some(), "minRating");
        push(self.max_rating.is_some(), "maxRating");
        push(
            self.year_range
                .is_some_and(|r| r.min.is_some() || r.max.is_some()),
            "yearRange",
        );
        push(self.sort_by.is_some(), "sortBy");
        push(self.limit.is_some(), "limit");
        push(self.hide_watched.is_some(), "hideWatched");

        applied
    }
}
