use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::Value;

use super::AppState;
use crate::{
    error::{AppError, AppResult},
    middleware::AuthUser,
    models::{EnhancedRecommendationResponse, FilteredRecommendationResponse},
    services::{filter_validator::validate_filters, EnhancedRequest},
};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EnhancedRecommendationBody {
    pub user_id: Option<String>,
    pub genres: Vec<String>,
    pub history: Vec<u64>,
    pub moods: Vec<String>,
    pub preferences: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FilteredRecommendationBody {
    pub filters: Value,
}

/// `userId` from the body wins over the caller identity
fn resolve_user_id(body_user_id: Option<String>, auth: Option<&AuthUser>) -> Option<String> {
    body_user_id
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .or_else(|| auth.map(|user| user.id().to_string()))
}

pub async fn enhanced(
    State(state): State<AppState>,
    auth: Option<Extension<AuthUser>>,
    body: Result<Json<EnhancedRecommendationBody>, JsonRejection>,
) -> AppResult<Json<EnhancedRecommendationResponse>> {
    let Json(body) = body?;
    let user_id = resolve_user_id(body.user_id, auth.as_ref().map(|Extension(user)| user))
        .ok_or_else(|| AppError::InvalidInput("User ID is required".to_string()))?;

    tracing::info!(
        user_id = %user_id,
        genres = body.genres.len(),
        history = body.history.len(),
        "Enhanced recommendation request"
    );

    let response = state
        .service
        .enhanced(EnhancedRequest {
            user_id,
            genres: body.genres,
            history: body.history,
            moods: body.moods,
            preferences: body.preferences,
        })
        .await?;

    Ok(Json(response))
}

pub async fn filtered(
    State(state): State<AppState>,
    auth: Option<Extension<AuthUser>>,
    body: Result<Json<FilteredRecommendationBody>, JsonRejection>,
) -> AppResult<Json<FilteredRecommendationResponse>> {
    let Some(Extension(user)) = auth else {
        return Err(AppError::Unauthorized("Authentication required".to_string()));
    };
    let Json(body) = body?;

    let filters = validate_filters(&body.filters);
    let response = state.service.filtered(user.id(), filters).await?;

    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_user_id_precedence() {
        let caller = AuthUser("caller".to_string());

        assert_eq!(
            resolve_user_id(Some("body".to_string()), Some(&caller)).as_deref(),
            Some("body")
        );
        assert_eq!(
            resolve_user_id(Some("  ".to_string()), Some(&caller)).as_deref(),
            Some("caller")
        );
        assert_eq!(resolve_user_id(None, None), None);
    }

    #[test]
    fn test_enhanced_body_defaults() {
        let body: EnhancedRecommendationBody =
            serde_json::from_value(serde_json::json!({ "genres": ["Drama"] })).unwrap();
        assert!(body.user_id.is_none());
        assert_eq!(body.genres, vec!["Drama"]);
        assert!(body.history.is_empty());
    }
}
