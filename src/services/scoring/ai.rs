use std::{fmt::Write as _, sync::Arc, time::Duration};

use serde::Deserialize;
use serde_json::Value;

use crate::{
    error::{AppError, AppResult},
    models::{ScoreSource, Suggestion},
    services::{
        providers::ChatProvider,
        scoring::{Scorer, ScoringRequest},
    },
};

const SYSTEM_PROMPT: &str = "You are a TV and movie recommendation engine. \
Recommend titles by TMDB id. Respond only with JSON of the form \
{\"recommendations\": [{\"contentId\": <number>, \"reason\": <string>}]}.";

const DEFAULT_REASON: &str = "Recommended for you";

/// Similar users and engagement rows included in the prompt
const PROMPT_SAMPLE: usize = 10;

#[derive(Deserialize)]
struct Envelope {
    recommendations: Vec<Value>,
}

/// Scores through a chat-completion model.
///
/// Timeouts, provider errors and malformed answers all surface as
/// `AppError::AiScorer`, which the engine treats as a soft failure.
pub struct AiScorer {
    chat: Arc<dyn ChatProvider>,
    timeout: Duration,
}

impl AiScorer {
    pub fn new(chat: Arc<dyn ChatProvider>, timeout: Duration) -> Self {
        Self { chat, timeout }
    }
}

fn join_or(values: &[String], empty: &str) -> String {
    if values.is_empty() {
        empty.to_string()
    } else {
        values.join(", ")
    }
}

pub fn build_prompt(request: &ScoringRequest) -> String {
    let mut prompt = String::new();

    let _ = writeln!(
        prompt,
        "Recommend exactly {} titles for user {}.",
        request.count, request.user_id
    );
    let _ = writeln!(prompt, "Requested genres: {}", join_or(&request.genres, "any"));
    let _ = writeln!(prompt, "Requested moods: {}", join_or(&request.moods, "any"));
    if let Some(preferences) = &request.preferences {
        let _ = writeln!(prompt, "Stated preferences: {}", preferences);
    }

    let history: Vec<String> = request.history.iter().map(u64::to_string).collect();
    let _ = writeln!(prompt, "Already watched (do not recommend): {}", join_or(&history, "none"));

    let analytics = &request.analytics;
    let _ = writeln!(
        prompt,
        "Viewing analytics: {} total views, completion rate {:.2}, \
         average rating {}, top genres {}",
        analytics.total_views,
        analytics.completion_rate,
        analytics
            .average_rating
            .map(|r| format!("{:.1}", r))
            .unwrap_or_else(|| "n/a".to_string()),
        join_or(&analytics.favorite_genres, "unknown"),
    );

    if !request.similar_users.is_empty() {
        let _ = writeln!(prompt, "Similar users (id: similarity):");
        for user in request.similar_users.iter().take(PROMPT_SAMPLE) {
            let _ = writeln!(prompt, "- {}: {:.2}", user.user_id, user.similarity);
        }
    }

    if !request.engagement.is_empty() {
        let _ = writeln!(prompt, "Most engaged content (id: views, completion):");
        for row in request.engagement.iter().take(PROMPT_SAMPLE) {
            let _ = writeln!(
                prompt,
                "- {}: {} views, {:.2}",
                row.content_id, row.views, row.completion_rate
            );
        }
    }

    let _ = write!(
        prompt,
        "Return {{\"recommendations\": [{{\"contentId\": number, \"reason\": string}}]}} \
         with {} entries.",
        request.count
    );
    prompt
}

/// Strips a surrounding markdown code fence, if any
fn strip_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

fn content_id(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Parses the `{"recommendations": [...]}` envelope. Entries without a usable
/// `contentId` are skipped.
pub fn parse_suggestions(text: &str) -> AppResult<Vec<Suggestion>> {
    let envelope: Envelope = serde_json::from_str(strip_fence(text))
        .map_err(|e| AppError::AiScorer(format!("Malformed AI response: {}", e)))?;

    Ok(envelope
        .recommendations
        .iter()
        .filter_map(|entry| {
            let content_id = content_id(entry.get("contentId")?)?;
            let reason = entry
                .get("reason")
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .unwrap_or(DEFAULT_REASON)
                .to_string();
            Some(Suggestion { content_id, reason })
        })
        .collect())
}

#[async_trait::async_trait]
impl Scorer for AiScorer {
    fn name(&self) -> &'static str {
        "ai"
    }

    fn source(&self) -> ScoreSource {
        ScoreSource::Ai
    }

    async fn suggest(&self, request: &ScoringRequest) -> AppResult<Vec<Suggestion>> {
        let prompt = build_prompt(request);

        let answer = tokio::time::timeout(self.timeout, self.chat.complete(SYSTEM_PROMPT, &prompt))
            .await
            .map_err(|_| {
                AppError::AiScorer(format!("AI scorer timed out after {:?}", self.timeout))
            })??;

        parse_suggestions(&answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::{ContentEngagement, SimilarUser, UserBehaviorAnalytics},
        services::providers::MockChatProvider,
    };

    #[test]
    fn test_prompt_embeds_profile_signals() {
        let mut request = ScoringRequest::new("alice").with_genres(vec!["Drama".to_string()]);
        request.moods = vec!["thoughtful".to_string()];
        request.history = vec![1396, 1399];
        request.analytics = UserBehaviorAnalytics {
            total_views: 42,
            favorite_genres: vec!["Crime".to_string()],
            completion_rate: 0.8,
            average_rating: Some(8.25),
        };
        request.similar_users = vec![SimilarUser {
            user_id: "bob".to_string(),
            similarity: 0.75,
        }];
        request.engagement = vec![ContentEngagement {
            content_id: 66732,
            views: 120,
            completion_rate: 0.9,
            average_rating: None,
        }];

        let prompt = build_prompt(&request);
        assert!(prompt.contains("exactly 10 titles"));
        assert!(prompt.contains("Requested genres: Drama"));
        assert!(prompt.contains("thoughtful"));
        assert!(prompt.contains("1396, 1399"));
        assert!(prompt.contains("42 total views"));
        assert!(prompt.contains("- bob: 0.75"));
        assert!(prompt.contains("- 66732: 120 views"));
        assert!(prompt.contains("\"recommendations\""));
    }

    #[test]
    fn test_parse_accepts_fenced_json_and_string_ids() {
        let text = r#"```json
{"recommendations": [{"contentId": "1396", "reason": "Classic"}, {"contentId": 66732}]}
```"#;
        let suggestions = parse_suggestions(text).unwrap();
        assert_eq!(suggestions.len(), 2);
        assert_eq!(suggestions[0].content_id, 1396);
        assert_eq!(suggestions[1].reason, DEFAULT_REASON);
    }

    #[test]
    fn test_parse_skips_entries_without_id() {
        let text = r#"{"recommendations": [
            {"title": "Breaking Bad"},
            {"contentId": -4},
            {"contentId": 7, "reason": "ok"}
        ]}"#;
        let suggestions = parse_suggestions(text).unwrap();
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].content_id, 7);
    }

    #[test]
    fn test_parse_rejects_wrong_schema() {
        assert!(matches!(
            parse_suggestions(r#"{"shows": [1, 2, 3]}"#),
            Err(AppError::AiScorer(_))
        ));
        assert!(parse_suggestions("not json").is_err());
    }

    #[tokio::test]
    async fn test_suggest_returns_whole_answer() {
        let mut chat = MockChatProvider::new();
        chat.expect_complete().returning(|_, _| {
            let entries: Vec<String> = (1..=15)
                .map(|id| format!(r#"{{"contentId": {}, "reason": "r"}}"#, id))
                .collect();
            Ok(format!(r#"{{"recommendations": [{}]}}"#, entries.join(",")))
        });

        let scorer = AiScorer::new(Arc::new(chat), Duration::from_secs(5));
        let suggestions = scorer.suggest(&ScoringRequest::new("u")).await.unwrap();
        assert_eq!(suggestions.len(), 15);
    }
}
