use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::warn;
use uuid::Uuid;

use devconnect_db::models::ReactionWithUser;
use devconnect_types::api::{ReactionRequest, ReactionResponse, ReactionSummary};
use devconnect_types::models::Principal;
use devconnect_types::reaction::{ReactionTarget, ReactionType};

use crate::auth::AppState;
use crate::error::{ApiError, join_error};
use crate::middleware::{CurrentUser, MaybeUser};
use crate::posts::{ensure_open_for_interaction, ensure_readable};

pub async fn react_to_post(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Path(post_id): Path<Uuid>,
    Json(req): Json<ReactionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let post = state
        .db
        .get_post(&post_id.to_string())?
        .ok_or(ApiError::NotFound("post"))?;
    ensure_open_for_interaction(&post.visibility, "cannot react to a private post")?;

    toggle(state, principal, ReactionTarget::Post(post_id), req.kind).await
}

/// Reacting to a comment is gated by the parent post's visibility, same
/// as reacting to the post itself.
pub async fn react_to_comment(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Path(comment_id): Path<Uuid>,
    Json(req): Json<ReactionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let comment = state
        .db
        .get_comment(&comment_id.to_string())?
        .ok_or(ApiError::NotFound("comment"))?;
    let post = state
        .db
        .get_post(&comment.post_id)?
        .ok_or(ApiError::NotFound("post"))?;
    ensure_open_for_interaction(&post.visibility, "cannot react to a private post")?;

    toggle(state, principal, ReactionTarget::Comment(comment_id), req.kind).await
}

async fn toggle(
    state: AppState,
    principal: Principal,
    target: ReactionTarget,
    requested: ReactionType,
) -> Result<(StatusCode, Json<ReactionResponse>), ApiError> {
    let reaction_id = Uuid::new_v4();

    // Run the blocking toggle off the async runtime
    let db = state.clone();
    let user_id = principal.id.to_string();
    let transition = tokio::task::spawn_blocking(move || {
        db.db
            .toggle_reaction(&reaction_id.to_string(), &user_id, target, requested)
    })
    .await
    .map_err(join_error)?
    .map_err(ApiError::from_db)?;

    Ok((
        StatusCode::CREATED,
        Json(ReactionResponse {
            kind: transition.next,
            user_id: principal.id,
            target: target.into(),
        }),
    ))
}

pub async fn post_reactions(
    State(state): State<AppState>,
    MaybeUser(viewer): MaybeUser,
    Path(post_id): Path<Uuid>,
) -> Result<Json<Vec<ReactionSummary>>, ApiError> {
    let post = state
        .db
        .get_post(&post_id.to_string())?
        .ok_or(ApiError::NotFound("post"))?;
    ensure_readable(viewer.as_ref(), &post.author_id, &post.visibility)?;

    let db = state.clone();
    let target = ReactionTarget::Post(post_id);
    let rows = tokio::task::spawn_blocking(move || db.db.list_reactions_for_target(target))
        .await
        .map_err(join_error)??;

    Ok(Json(summarize(&rows)))
}

pub async fn comment_reactions(
    State(state): State<AppState>,
    MaybeUser(viewer): MaybeUser,
    Path(comment_id): Path<Uuid>,
) -> Result<Json<Vec<ReactionSummary>>, ApiError> {
    let comment = state
        .db
        .get_comment(&comment_id.to_string())?
        .ok_or(ApiError::NotFound("comment"))?;
    let post = state
        .db
        .get_post(&comment.post_id)?
        .ok_or(ApiError::NotFound("post"))?;
    ensure_readable(viewer.as_ref(), &post.author_id, &post.visibility)?;

    let db = state.clone();
    let target = ReactionTarget::Comment(comment_id);
    let rows = tokio::task::spawn_blocking(move || db.db.list_reactions_for_target(target))
        .await
        .map_err(join_error)??;

    Ok(Json(summarize(&rows)))
}

/// Group reactions by type for a listing. A type's position is fixed by
/// its first occurrence in storage order; usernames keep storage order
/// within their group.
pub fn summarize(rows: &[ReactionWithUser]) -> Vec<ReactionSummary> {
    let mut groups: Vec<ReactionSummary> = Vec::new();
    for row in rows {
        let Some(kind) = ReactionType::parse(&row.reaction_type) else {
            warn!("Unknown reaction type in store: {}", row.reaction_type);
            continue;
        };
        match groups.iter_mut().find(|group| group.kind == kind) {
            Some(group) => {
                group.count += 1;
                group.usernames.push(row.username.clone());
            }
            None => groups.push(ReactionSummary {
                kind,
                count: 1,
                usernames: vec![row.username.clone()],
            }),
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(reaction_type: &str, username: &str) -> ReactionWithUser {
        ReactionWithUser {
            target_id: "t".into(),
            reaction_type: reaction_type.into(),
            username: username.into(),
        }
    }

    #[test]
    fn groups_form_in_first_seen_order() {
        let rows = vec![row("LIKE", "u1"), row("LOVE", "u3"), row("LIKE", "u2")];
        let summary = summarize(&rows);

        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].kind, ReactionType::Like);
        assert_eq!(summary[0].count, 2);
        assert_eq!(summary[0].usernames, ["u1", "u2"]);
        assert_eq!(summary[1].kind, ReactionType::Love);
        assert_eq!(summary[1].count, 1);
        assert_eq!(summary[1].usernames, ["u3"]);
    }

    #[test]
    fn empty_input_gives_empty_summary() {
        assert!(summarize(&[]).is_empty());
    }

    #[test]
    fn unknown_stored_types_are_skipped() {
        let rows = vec![row("WOW", "u1"), row("LIKE", "u2")];
        let summary = summarize(&rows);
        assert_eq!(summary.len(), 1);
        assert_eq!(summary[0].kind, ReactionType::Like);
        assert_eq!(summary[0].usernames, ["u2"]);
    }
}
