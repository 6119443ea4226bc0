/// TMDB catalog provider
///
/// Candidates come from `/tv/popular`; ids are hydrated through `/tv/{id}` and
/// `/movie/{id}`. All three lookups go through the Redis cache when one is
/// configured.
///
/// Popular listings carry no networks, runtime or certification, so each
/// candidate is completed from its (cached) `/tv/{id}` record.
use crate::{
    cached,
    db::{Cache, CacheKey},
    error::{AppError, AppResult},
    models::{Show, ShowDetail, TmdbMovieDetails, TmdbTvDetails, TmdbTvResult},
    services::providers::CatalogProvider,
};
use reqwest::{Client as HttpClient, StatusCode};
use serde::{de::DeserializeOwned, Deserialize};
use tokio::task::JoinSet;

/// Popular pages fetched per candidate request
const POPULAR_PAGES: u32 = 2;

#[derive(Clone)]
pub struct TmdbProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    cache: Option<Cache>,
}

#[derive(Deserialize)]
struct PopularPage {
    #[serde(default)]
    results: Vec<TmdbTvResult>,
}

impl TmdbProvider {
    pub fn new(api_key: String, api_url: String, cache: Option<Cache>) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
            cache,
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&'static str, String)],
    ) -> AppResult<T> {
        let url = format!("{}{}", self.api_url, path);
        let mut query = vec![
            ("api_key", self.api_key.clone()),
            ("language", "en-US".to_string()),
        ];
        query.extend_from_slice(params);

        let response = self.http_client.get(&url).query(&query).send().await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(AppError::NotFound(format!("TMDB has no resource at {}", path)));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "TMDB API returned status {}: {}",
                status, body
            )));
        }

        Ok(response.json().await?)
    }

    async fn popular_page(&self, page: u32) -> AppResult<Vec<Show>> {
        let key = CacheKey::PopularTv(page);
        cached!(self.cache.as_ref(), key, key.ttl(), async {
            let response: PopularPage =
                self.get_json("/tv/popular", &[("page", page.to_string())]).await?;
            Ok::<_, AppError>(response.results.into_iter().map(Show::from).collect::<Vec<Show>>())
        })
    }

    /// Completes listing entries from their detail records. A failed lookup
    /// leaves that show as listed.
    async fn fill_details(&self, mut shows: Vec<Show>) -> Vec<Show> {
        let mut lookups = JoinSet::new();
        for (index, show) in shows.iter().enumerate() {
            let provider = self.clone();
            let id = show.id;
            lookups.spawn(async move { (index, id, provider.show_details(id).await) });
        }

        let mut failed = 0;
        while let Some(joined) = lookups.join_next().await {
            match joined {
                Ok((index, _, Ok(detail))) => shows[index].fill_from(&detail),
                Ok((_, id, Err(e))) => {
                    failed += 1;
                    tracing::debug!(id, error = %e, "TMDB detail lookup failed");
                }
                Err(e) => {
                    failed += 1;
                    tracing::error!(error = %e, "TMDB detail task failed");
                }
            }
        }

        if failed > 0 {
            tracing::warn!(failed, total = shows.len(), "Some TMDB candidates left unhydrated");
        }
        shows
    }
}

#[async_trait::async_trait]
impl CatalogProvider for TmdbProvider {
    async fn popular_shows(&self) -> AppResult<Vec<Show>> {
        let mut shows = Vec::new();
        let mut last_error = None;

        for page in 1..=POPULAR_PAGES {
            match self.popular_page(page).await {
                Ok(mut results) => shows.append(&mut results),
                Err(e) => {
                    tracing::warn!(page, error = %e, "Failed to fetch TMDB popular page");
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) if shows.is_empty() => Err(e),
            _ => {
                tracing::info!(count = shows.len(), "Fetched popular shows from TMDB");
                Ok(self.fill_details(shows).await)
            }
        }
    }

    async fn show_details(&self, id: u64) -> AppResult<ShowDetail> {
        let key = CacheKey::TvDetails(id);
        cached!(self.cache.as_ref(), key, key.ttl(), async {
            let params = [("append_to_response", "content_ratings".to_string())];
            let details: TmdbTvDetails = self.get_json(&format!("/tv/{}", id), &params).await?;
            Ok::<_, AppError>(ShowDetail::from(details))
        })
    }

    async fn movie_details(&self, id: u64) -> AppResult<ShowDetail> {
        let key = CacheKey::MovieDetails(id);
        cached!(self.cache.as_ref(), key, key.ttl(), async {
            let details: TmdbMovieDetails = self.get_json(&format!("/movie/{}", id), &[]).await?;
            Ok::<_, AppError>(ShowDetail::from(details))
        })
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}
