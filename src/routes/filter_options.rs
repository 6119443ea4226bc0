use axum::Json;

use crate::services::filter_options::{filter_options, FilterOptions};

/// Valid values for every filter field, plus validation bounds
pub async fn options() -> Json<FilterOptions> {
    Json(filter_options())
}
