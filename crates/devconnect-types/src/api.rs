use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::Visibility;
use crate::reaction::{ReactionTarget, ReactionType, TargetKind};

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// The token travels only in the auth cookie. The body keeps a null
/// placeholder so clients written against the old body-token contract
/// still parse the response.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: Option<String>,
}

// -- Users --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
}

/// What a user sees of their own account.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfileResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub bio: Option<String>,
    pub skills: Vec<String>,
    pub show_email_publicly: bool,
}

/// What everyone else sees. The email is present only when the owner
/// opted into showing it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUserProfileResponse {
    pub id: Uuid,
    pub username: String,
    pub bio: Option<String>,
    pub skills: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Partial profile update; absent fields keep their stored value.
/// Changing the username invalidates the caller's current token subject,
/// forcing a fresh login on the next request.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub bio: Option<String>,
    pub skills: Option<Vec<String>>,
    pub show_email_publicly: Option<bool>,
}

// -- Posts --

/// Shared by create and update. Create requires a non-blank title and
/// defaults visibility to PUBLIC; update treats absent fields as "keep".
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct PostRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub tech_stack: Option<Vec<String>>,
    pub visibility: Option<Visibility>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub tech_stack: Vec<String>,
    pub visibility: Visibility,
    pub username: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub comment_count: i64,
    pub reaction_count: i64,
}

// -- Comments --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommentRequest {
    pub content: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: Uuid,
    pub content: String,
    pub username: String,
    pub reactions: Vec<ReactionSummary>,
}

// -- Reactions --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReactionRequest {
    #[serde(rename = "type")]
    pub kind: ReactionType,
}

/// State of the caller's reaction after a toggle. `kind` is null when the
/// toggle retracted the reaction.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactionResponse {
    #[serde(rename = "type")]
    pub kind: Option<ReactionType>,
    pub user_id: Uuid,
    pub target: TargetRef,
}

#[derive(Debug, Serialize)]
pub struct TargetRef {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: TargetKind,
}

impl From<ReactionTarget> for TargetRef {
    fn from(target: ReactionTarget) -> Self {
        Self {
            id: target.id(),
            kind: target.kind(),
        }
    }
}

/// One group in an aggregated reaction listing: every user who currently
/// holds `kind` on the target, in insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactionSummary {
    #[serde(rename = "type")]
    pub kind: ReactionType,
    pub count: usize,
    pub usernames: Vec<String>,
}

// -- Search --

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub items: Vec<PostResponse>,
    pub page: u32,
    pub size: u32,
    pub total: u64,
}
