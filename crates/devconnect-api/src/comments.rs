use std::collections::HashMap;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use devconnect_auth::policy;
use devconnect_db::models::ReactionWithUser;
use devconnect_types::api::{CommentRequest, CommentResponse};

use crate::auth::AppState;
use crate::error::{ApiError, join_error};
use crate::middleware::{CurrentUser, MaybeUser};
use crate::posts::{ensure_open_for_interaction, ensure_readable, parse_uuid};
use crate::reactions::summarize;

pub async fn create(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Path(post_id): Path<Uuid>,
    Json(req): Json<CommentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let content = req.content.trim();
    if content.is_empty() {
        return Err(ApiError::Validation("content must not be blank"));
    }

    let post = state
        .db
        .get_post(&post_id.to_string())?
        .ok_or(ApiError::NotFound("post"))?;
    ensure_open_for_interaction(&post.visibility, "cannot comment on a private post")?;

    let comment_id = Uuid::new_v4();
    state
        .db
        .create_comment(&comment_id.to_string(), &post.id, &principal.id.to_string(), content)?;

    Ok((
        StatusCode::CREATED,
        Json(CommentResponse {
            id: comment_id,
            content: content.to_string(),
            username: principal.username,
            reactions: vec![],
        }),
    ))
}

/// Comments under a post, each with its aggregated reactions. Fetched in
/// two queries and grouped in memory to avoid a query per comment.
pub async fn for_post(
    State(state): State<AppState>,
    MaybeUser(viewer): MaybeUser,
    Path(post_id): Path<Uuid>,
) -> Result<Json<Vec<CommentResponse>>, ApiError> {
    let post = state
        .db
        .get_post(&post_id.to_string())?
        .ok_or(ApiError::NotFound("post"))?;
    ensure_readable(viewer.as_ref(), &post.author_id, &post.visibility)?;

    let db = state.clone();
    let pid = post.id;
    let (rows, reaction_rows) = tokio::task::spawn_blocking(move || {
        let rows = db.db.list_comments_for_post(&pid)?;
        let ids: Vec<String> = rows.iter().map(|r| r.id.clone()).collect();
        let reaction_rows = db.db.list_reactions_for_comments(&ids)?;
        Ok::<_, anyhow::Error>((rows, reaction_rows))
    })
    .await
    .map_err(join_error)??;

    let mut by_comment: HashMap<String, Vec<ReactionWithUser>> = HashMap::new();
    for row in reaction_rows {
        by_comment.entry(row.target_id.clone()).or_default().push(row);
    }

    let comments = rows
        .into_iter()
        .map(|row| {
            let reactions = by_comment
                .remove(&row.id)
                .map(|group| summarize(&group))
                .unwrap_or_default();
            CommentResponse {
                id: parse_uuid(&row.id, "comment id"),
                content: row.content,
                username: row.author_username,
                reactions,
            }
        })
        .collect();

    Ok(Json(comments))
}

/// Only the comment's author may delete it; the post owner has no say.
pub async fn remove(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Path(comment_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let row = state
        .db
        .get_comment(&comment_id.to_string())?
        .ok_or(ApiError::NotFound("comment"))?;
    if !policy::can_mutate(Some(&principal), parse_uuid(&row.author_id, "comment author id")) {
        return Err(ApiError::Forbidden("access denied"));
    }

    state.db.delete_comment(&row.id)?;
    Ok(StatusCode::NO_CONTENT)
}
