use crate::{
    error::AppResult,
    models::{ScoreSource, Suggestion},
    services::scoring::{dedupe_by_key, Scorer, ScoringRequest},
};

/// Curated TMDB TV ids per genre
const GENRE_POOLS: &[(&str, &[u64])] = &[
    ("Drama", &[1396, 1399, 65494, 76331, 60059]),
    ("Comedy", &[2316, 48891, 8592, 97546, 1668]),
    ("Sci-Fi & Fantasy", &[66732, 82856, 42009, 63247, 70523]),
    ("Crime", &[71446, 60574, 63351, 67744, 46648]),
    ("Animation", &[94605, 60625, 246, 61222]),
    ("Documentary", &[83880, 68595, 64439]),
    ("Action & Adventure", &[76479, 108978, 71912]),
    ("Mystery", &[107113, 19885, 1920]),
];

/// Used when no requested genre has a pool
const DEFAULT_POOL: &[u64] = &[1396, 66732, 2316, 76479, 94605, 1399, 60574, 97546, 42009, 71446];

fn pool_for(genre: &str) -> Option<&'static [u64]> {
    let genre = genre.trim();
    GENRE_POOLS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(genre))
        .map(|(_, ids)| *ids)
}

/// Deterministic fallback built from per-genre pools
pub struct HeuristicScorer;

impl HeuristicScorer {
    pub fn pick(&self, genres: &[String], count: usize) -> Vec<Suggestion> {
        let pooled: Vec<u64> = genres
            .iter()
            .filter_map(|genre| pool_for(genre))
            .flat_map(|ids| ids.iter().copied())
            .collect();
        let ids = if pooled.is_empty() {
            DEFAULT_POOL.to_vec()
        } else {
            pooled
        };

        let reason = if genres.is_empty() {
            "Popular recommendation".to_string()
        } else {
            format!("Popular {} recommendation", genres.join(", "))
        };

        let mut ids = dedupe_by_key(ids, |id| *id);
        ids.truncate(count);
        ids.into_iter()
            .map(|content_id| Suggestion {
                content_id,
                reason: reason.clone(),
            })
            .collect()
    }
}

#[async_trait::async_trait]
impl Scorer for HeuristicScorer {
    fn name(&self) -> &'static str {
        "heuristic"
    }

    fn source(&self) -> ScoreSource {
        ScoreSource::Heuristic
    }

    async fn suggest(&self, request: &ScoringRequest) -> AppResult<Vec<Suggestion>> {
        Ok(self.pick(&request.genres, request.count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn genres(names: &[&str]) -> Vec<String> {
        names.iter().map(|g| g.to_string()).collect()
    }

    #[test]
    fn test_drama_pool() {
        let picks = HeuristicScorer.pick(&genres(&["Drama"]), 10);
        let ids: Vec<u64> = picks.iter().map(|s| s.content_id).collect();
        assert_eq!(ids, vec![1396, 1399, 65494, 76331, 60059]);
        assert!(picks.iter().all(|s| s.reason == "Popular Drama recommendation"));
    }

    #[test]
    fn test_pools_concatenate_then_truncate() {
        let picks = HeuristicScorer.pick(&genres(&["Comedy", "Crime", "Drama"]), 10);
        assert_eq!(picks.len(), 10);
        assert_eq!(picks[0].content_id, 2316);
        assert_eq!(picks[5].content_id, 71446);
        assert_eq!(picks[0].reason, "Popular Comedy, Crime, Drama recommendation");
    }

    #[test]
    fn test_no_genres_uses_default_pool() {
        let picks = HeuristicScorer.pick(&[], 10);
        assert_eq!(picks.len(), 10);
        assert_eq!(picks[0].reason, "Popular recommendation");
    }

    #[test]
    fn test_unknown_genre_uses_default_pool_but_names_it() {
        let picks = HeuristicScorer.pick(&genres(&["Telenovela"]), 10);
        assert_eq!(picks.len(), 10);
        assert!(picks[0].reason.contains("Telenovela"));
    }

    #[test]
    fn test_genre_lookup_ignores_case() {
        let picks = HeuristicScorer.pick(&genres(&["sci-fi & fantasy"]), 3);
        let ids: Vec<u64> = picks.iter().map(|s| s.content_id).collect();
        assert_eq!(ids, vec![66732, 82856, 42009]);
    }
}
