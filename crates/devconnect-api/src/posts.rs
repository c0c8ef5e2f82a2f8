use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use tracing::warn;
use uuid::Uuid;

use devconnect_auth::policy;
use devconnect_db::models::{NewPost, PostRow};
use devconnect_types::api::{PostRequest, PostResponse};
use devconnect_types::models::{Principal, Visibility};

use crate::auth::AppState;
use crate::error::{ApiError, join_error};
use crate::middleware::{CurrentUser, MaybeUser};

#[derive(Debug, Deserialize)]
pub struct AuthorQuery {
    pub username: String,
}

pub async fn create(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Json(req): Json<PostRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let title = req
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(ApiError::Validation("title must not be blank"))?;
    let content = req.content.unwrap_or_default();
    let tech_stack = req.tech_stack.unwrap_or_default();
    let visibility = req.visibility.unwrap_or(Visibility::Public);

    let post_id = Uuid::new_v4();
    state.db.create_post(NewPost {
        id: &post_id.to_string(),
        author_id: &principal.id.to_string(),
        title,
        content: &content,
        tech_stack: &tech_stack,
        visibility,
    })?;

    let now = Utc::now();
    Ok((
        StatusCode::CREATED,
        Json(PostResponse {
            id: post_id,
            title: title.to_string(),
            content,
            tech_stack,
            visibility,
            username: principal.username,
            created_at: now,
            updated_at: now,
            comment_count: 0,
            reaction_count: 0,
        }),
    ))
}

pub async fn public_feed(State(state): State<AppState>) -> Result<Json<Vec<PostResponse>>, ApiError> {
    // Run the blocking listing off the async runtime
    let db = state.clone();
    let rows = tokio::task::spawn_blocking(move || db.db.list_public_posts())
        .await
        .map_err(join_error)??;

    Ok(Json(rows.into_iter().map(to_response).collect()))
}

pub async fn my_posts(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
) -> Result<Json<Vec<PostResponse>>, ApiError> {
    let db = state.clone();
    let username = principal.username;
    let rows = tokio::task::spawn_blocking(move || db.db.list_posts_by_author(&username, true))
        .await
        .map_err(join_error)??;

    Ok(Json(rows.into_iter().map(to_response).collect()))
}

/// Posts by one author. The author sees their private posts too; everyone
/// else, including anonymous callers, gets the public subset.
pub async fn by_author(
    State(state): State<AppState>,
    MaybeUser(viewer): MaybeUser,
    Query(query): Query<AuthorQuery>,
) -> Result<Json<Vec<PostResponse>>, ApiError> {
    if state.db.get_user_by_username(&query.username)?.is_none() {
        return Err(ApiError::NotFound("user"));
    }
    let include_private = viewer.is_some_and(|p| p.username == query.username);

    let db = state.clone();
    let username = query.username;
    let rows =
        tokio::task::spawn_blocking(move || db.db.list_posts_by_author(&username, include_private))
            .await
            .map_err(join_error)??;

    Ok(Json(rows.into_iter().map(to_response).collect()))
}

pub async fn update(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Path(post_id): Path<Uuid>,
    Json(req): Json<PostRequest>,
) -> Result<Json<PostResponse>, ApiError> {
    let row = state
        .db
        .get_post(&post_id.to_string())?
        .ok_or(ApiError::NotFound("post"))?;
    if !policy::can_mutate(Some(&principal), parse_uuid(&row.author_id, "post author id")) {
        return Err(ApiError::Forbidden("access denied"));
    }

    let title = match req.title.as_deref().map(str::trim) {
        Some(t) if !t.is_empty() => t.to_string(),
        Some(_) => return Err(ApiError::Validation("title must not be blank")),
        None => row.title.clone(),
    };
    let content = req.content.unwrap_or_else(|| row.content.clone());
    let tech_stack = req
        .tech_stack
        .unwrap_or_else(|| parse_string_list(&row.tech_stack, "post tech stack"));
    let visibility = match req.visibility {
        Some(v) => v,
        None => parse_visibility(&row.visibility)?,
    };

    state
        .db
        .update_post(&row.id, &title, &content, &tech_stack, visibility)?;

    // Re-read for the bumped updated_at and current counts.
    let fresh = state
        .db
        .get_post(&row.id)?
        .ok_or(ApiError::NotFound("post"))?;
    Ok(Json(to_response(fresh)))
}

pub async fn remove(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Path(post_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let row = state
        .db
        .get_post(&post_id.to_string())?
        .ok_or(ApiError::NotFound("post"))?;
    if !policy::can_mutate(Some(&principal), parse_uuid(&row.author_id, "post author id")) {
        return Err(ApiError::Forbidden("access denied"));
    }

    state.db.delete_post(&row.id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) fn to_response(row: PostRow) -> PostResponse {
    let visibility = Visibility::parse(&row.visibility).unwrap_or_else(|| {
        warn!("Corrupt visibility '{}' on post '{}'", row.visibility, row.id);
        Visibility::Private
    });
    PostResponse {
        id: parse_uuid(&row.id, "post id"),
        title: row.title,
        content: row.content,
        tech_stack: parse_string_list(&row.tech_stack, "post tech stack"),
        visibility,
        username: row.author_username,
        created_at: parse_timestamp(&row.created_at, "post created_at"),
        updated_at: parse_timestamp(&row.updated_at, "post updated_at"),
        comment_count: row.comment_count,
        reaction_count: row.reaction_count,
    }
}

/// Gate for reading a post or anything hanging off it.
pub(crate) fn ensure_readable(
    viewer: Option<&Principal>,
    author_id: &str,
    raw_visibility: &str,
) -> Result<(), ApiError> {
    let visibility = parse_visibility(raw_visibility)?;
    let owner = parse_uuid(author_id, "post author id");
    if !policy::can_read(viewer, owner, visibility) {
        return Err(ApiError::Forbidden("access denied"));
    }
    Ok(())
}

/// Gate for creating comments or reactions under a post.
pub(crate) fn ensure_open_for_interaction(
    raw_visibility: &str,
    denial: &'static str,
) -> Result<(), ApiError> {
    let visibility = parse_visibility(raw_visibility)?;
    if !policy::can_comment_or_react(visibility) {
        return Err(ApiError::Forbidden(denial));
    }
    Ok(())
}

pub(crate) fn parse_visibility(raw: &str) -> Result<Visibility, ApiError> {
    Visibility::parse(raw)
        .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("unknown visibility in store: {raw}")))
}

pub(crate) fn parse_uuid(raw: &str, context: &str) -> Uuid {
    raw.parse().unwrap_or_else(|err| {
        warn!("Corrupt {context} '{raw}': {err}");
        Uuid::default()
    })
}

pub(crate) fn parse_string_list(raw: &str, context: &str) -> Vec<String> {
    serde_json::from_str(raw).unwrap_or_else(|err| {
        warn!("Corrupt {context} '{raw}': {err}");
        Vec::new()
    })
}

pub(crate) fn parse_timestamp(raw: &str, context: &str) -> DateTime<Utc> {
    raw.parse::<DateTime<Utc>>()
        .or_else(|_| {
            // SQLite stores timestamps as "YYYY-MM-DD HH:MM:SS" without timezone.
            // Parse as naive UTC and convert.
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|err| {
            warn!("Corrupt {context} '{raw}': {err}");
            DateTime::default()
        })
}
