//! Row types mapping one-to-one onto SQLite rows, kept separate from the
//! wire DTOs in devconnect-types. Timestamps stay as the TEXT SQLite
//! produced; list columns (skills, tech_stack) stay as JSON TEXT. The API
//! layer parses both when building responses.

use devconnect_types::models::Visibility;

pub struct UserRow {
    pub id: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub bio: Option<String>,
    pub skills: String,
    pub show_email_publicly: bool,
    pub created_at: String,
}

pub struct PostRow {
    pub id: String,
    pub author_id: String,
    pub author_username: String,
    pub title: String,
    pub content: String,
    pub tech_stack: String,
    pub visibility: String,
    pub created_at: String,
    pub updated_at: String,
    pub comment_count: i64,
    pub reaction_count: i64,
}

pub struct CommentRow {
    pub id: String,
    pub post_id: String,
    pub author_id: String,
    pub author_username: String,
    pub content: String,
    pub created_at: String,
}

pub struct ReactionRow {
    pub id: String,
    pub user_id: String,
    pub target_kind: String,
    pub target_id: String,
    pub reaction_type: String,
    pub created_at: String,
}

/// Reaction joined with the reacting user's name, in storage order, the
/// shape the summary aggregation consumes.
pub struct ReactionWithUser {
    pub target_id: String,
    pub reaction_type: String,
    pub username: String,
}

pub struct NewUser<'a> {
    pub id: &'a str,
    pub username: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub bio: Option<&'a str>,
    pub skills: &'a [String],
    pub show_email_publicly: bool,
}

pub struct NewPost<'a> {
    pub id: &'a str,
    pub author_id: &'a str,
    pub title: &'a str,
    pub content: &'a str,
    pub tech_stack: &'a [String],
    pub visibility: Visibility,
}
