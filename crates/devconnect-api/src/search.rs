use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;

use devconnect_types::api::SearchResponse;

use crate::auth::AppState;
use crate::error::{ApiError, join_error};
use crate::posts::to_response;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub keyword: String,
    #[serde(default)]
    pub page: u32,
    #[serde(default = "default_size")]
    pub size: u32,
}

fn default_size() -> u32 {
    5
}

/// Keyword search across public posts' titles and tech stacks. Pages are
/// 0-based; `size` is clamped to keep result sets bounded.
pub async fn posts(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<SearchResponse>, ApiError> {
    let size = query.size.clamp(1, 50);
    let offset = query.page.saturating_mul(size);

    let db = state.clone();
    let keyword = query.keyword.clone();
    let (rows, total) =
        tokio::task::spawn_blocking(move || db.db.search_public_posts(&keyword, size, offset))
            .await
            .map_err(join_error)??;

    Ok(Json(SearchResponse {
        items: rows.into_iter().map(to_response).collect(),
        page: query.page,
        size,
        total,
    }))
}
