use chrono::NaiveDate;

use crate::{
    error::{AppError, AppResult},
    models::{MediaType, Network, Show, ShowDetail},
    services::providers::CatalogProvider,
};

/// Built-in catalog of well-known series.
///
/// Serves as the candidate pool when TMDB is not configured and as the
/// fallback list whenever the live catalog fails or comes back empty.
#[derive(Debug, Clone)]
pub struct StaticCatalog {
    shows: Vec<Show>,
}

impl Default for StaticCatalog {
    fn default() -> Self {
        Self {
            shows: fallback_shows(),
        }
    }
}

impl StaticCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shows(&self) -> &[Show] {
        &self.shows
    }

    fn find(&self, id: u64) -> Option<&Show> {
        self.shows.iter().find(|s| s.id == id)
    }
}

#[allow(clippy::too_many_arguments)]
fn series(
    id: u64,
    title: &str,
    genre_ids: &[u32],
    vote_average: f64,
    popularity: f64,
    first_aired: (i32, u32, u32),
    country: &str,
    runtime: u32,
    network: (u64, &str),
    rating: &str,
) -> Show {
    Show {
        id,
        media_type: MediaType::Tv,
        title: title.to_string(),
        genre_ids: genre_ids.to_vec(),
        vote_average,
        popularity: Some(popularity),
        overview: None,
        release_date: NaiveDate::from_ymd_opt(first_aired.0, first_aired.1, first_aired.2),
        original_language: Some("en".to_string()),
        origin_country: vec![country.to_string()],
        runtime_minutes: Some(runtime),
        networks: vec![Network {
            id: network.0,
            name: network.1.to_string(),
        }],
        content_rating: Some(rating.to_string()),
    }
}

/// The fixed candidate list used when the catalog is unavailable
pub fn fallback_shows() -> Vec<Show> {
    vec![
        series(
            1396,
            "Breaking Bad",
            &[18, 80],
            8.9,
            310.0,
            (2008, 1, 20),
            "US",
            47,
            (174, "AMC"),
            "TV-MA",
        ),
        series(
            1399,
            "Game of Thrones",
            &[10765, 18, 10759],
            8.4,
            420.0,
            (2011, 4, 17),
            "US",
            60,
            (49, "HBO"),
            "TV-MA",
        ),
        series(
            66732,
            "Stranger Things",
            &[18, 10765, 9648],
            8.6,
            390.0,
            (2016, 7, 15),
            "US",
            51,
            (213, "Netflix"),
            "TV-14",
        ),
        series(2316, "The Office", &[35], 8.6, 280.0, (2005, 3, 24), "US", 22, (6, "NBC"), "TV-14"),
        series(
            82856,
            "The Mandalorian",
            &[10765, 10759, 18],
            8.5,
            240.0,
            (2019, 11, 12),
            "US",
            38,
            (2739, "Disney+"),
            "TV-14",
        ),
        series(
            65494,
            "The Crown",
            &[18],
            8.2,
            150.0,
            (2016, 11, 4),
            "GB",
            58,
            (213, "Netflix"),
            "TV-MA",
        ),
        series(
            71446,
            "Money Heist",
            &[80, 18],
            8.2,
            200.0,
            (2017, 5, 2),
            "ES",
            70,
            (213, "Netflix"),
            "TV-MA",
        ),
        series(
            94605,
            "Arcane",
            &[16, 18, 10765, 10759],
            8.7,
            260.0,
            (2021, 11, 6),
            "US",
            40,
            (213, "Netflix"),
            "TV-14",
        ),
    ]
}

#[async_trait::async_trait]
impl CatalogProvider for StaticCatalog {
    async fn popular_shows(&self) -> AppResult<Vec<Show>> {
        Ok(self.shows.clone())
    }

    async fn show_details(&self, id: u64) -> AppResult<ShowDetail> {
        self.find(id)
            .map(ShowDetail::from)
            .ok_or_else(|| AppError::NotFound(format!("Show {} not in static catalog", id)))
    }

    async fn movie_details(&self, id: u64) -> AppResult<ShowDetail> {
        Err(AppError::NotFound(format!(
            "Movie {} not in static catalog",
            id
        )))
    }

    fn name(&self) -> &'static str {
        "static"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_list_is_non_empty_and_unique() {
        let shows = fallback_shows();
        assert_eq!(shows.len(), 8);
        let mut ids: Vec<u64> = shows.iter().map(|s| s.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 8);
    }

    #[tokio::test]
    async fn test_details_for_known_and_unknown_ids() {
        let catalog = StaticCatalog::new();

        let details = catalog.content_details(1396).await.unwrap();
        assert_eq!(details.title, "Breaking Bad");
        assert_eq!(details.genres[0].name, "Drama");

        let missing = catalog.content_details(42).await;
        assert!(matches!(missing, Err(AppError::NotFound(_))));
    }
}
