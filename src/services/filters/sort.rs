use std::cmp::Ordering;

use super::ScoredShow;
use crate::models::SortBy;

fn descending(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

/// Stable sort: equal keys keep their insertion order
pub fn sort_candidates(candidates: &mut [ScoredShow], sort_by: SortBy) {
    match sort_by {
        SortBy::Relevance => candidates.sort_by(|a, b| descending(a.score, b.score)),
        SortBy::Rating => {
            candidates.sort_by(|a, b| descending(a.show.vote_average, b.show.vote_average))
        }
        // Ranked items first; the rest by rating, since the scales differ
        SortBy::Popularity => {
            candidates.sort_by(|a, b| match (a.show.popularity, b.show.popularity) {
                (Some(a), Some(b)) => descending(a, b),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => descending(a.show.vote_average, b.show.vote_average),
            })
        }
        // Undated items go last
        SortBy::Recent => {
            candidates.sort_by(|a, b| match (a.show.release_date, b.show.release_date) {
                (Some(a), Some(b)) => b.cmp(&a),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            })
        }
        SortBy::Alphabetical => candidates.sort_by(|a, b| {
            a.show
                .title
                .to_lowercase()
                .cmp(&b.show.title.to_lowercase())
        }),
    }
}
