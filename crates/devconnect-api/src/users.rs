use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::info;
use uuid::Uuid;

use devconnect_auth::password;
use devconnect_db::models::{NewUser, UserRow};
use devconnect_types::api::{
    PublicUserProfileResponse, RegisterRequest, UpdateProfileRequest, UserProfileResponse,
};

use crate::auth::AppState;
use crate::error::ApiError;
use crate::middleware::CurrentUser;
use crate::posts::{parse_string_list, parse_uuid};

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_username(&req.username)?;
    if req.password.len() < 8 {
        return Err(ApiError::Validation("password must be at least 8 characters"));
    }
    if !req.email.contains('@') {
        return Err(ApiError::Validation("email must be a valid address"));
    }

    // Check if username is taken
    if state.db.get_user_by_username(&req.username)?.is_some() {
        return Err(ApiError::Conflict("username is already taken"));
    }

    let password_hash = password::hash(&req.password)?;
    let user_id = Uuid::new_v4();

    state
        .db
        .create_user(NewUser {
            id: &user_id.to_string(),
            username: &req.username,
            email: &req.email,
            password_hash: &password_hash,
            bio: req.bio.as_deref(),
            skills: &req.skills,
            show_email_publicly: false,
        })
        .map_err(ApiError::from_db)?;

    info!("registered user {}", req.username);

    Ok((
        StatusCode::CREATED,
        Json(UserProfileResponse {
            id: user_id,
            username: req.username,
            email: req.email,
            bio: req.bio,
            skills: req.skills,
            show_email_publicly: false,
        }),
    ))
}

pub async fn list(
    State(state): State<AppState>,
    CurrentUser(_): CurrentUser,
) -> Result<Json<Vec<PublicUserProfileResponse>>, ApiError> {
    let rows = state.db.list_users()?;
    Ok(Json(rows.into_iter().map(public_profile_of).collect()))
}

pub async fn my_profile(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
) -> Result<Json<UserProfileResponse>, ApiError> {
    let row = state
        .db
        .get_user_by_id(&principal.id.to_string())?
        .ok_or(ApiError::NotFound("user"))?;
    Ok(Json(own_profile(row)))
}

pub async fn update_my_profile(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<UserProfileResponse>, ApiError> {
    let current = state
        .db
        .get_user_by_id(&principal.id.to_string())?
        .ok_or(ApiError::NotFound("user"))?;

    let username = match req.username {
        Some(new_name) if new_name != current.username => {
            validate_username(&new_name)?;
            if state.db.get_user_by_username(&new_name)?.is_some() {
                return Err(ApiError::Conflict("username is already taken"));
            }
            new_name
        }
        Some(unchanged) => unchanged,
        None => current.username.clone(),
    };
    let email = req.email.unwrap_or_else(|| current.email.clone());
    if !email.contains('@') {
        return Err(ApiError::Validation("email must be a valid address"));
    }
    let bio = req.bio.or_else(|| current.bio.clone());
    let skills = req
        .skills
        .unwrap_or_else(|| parse_string_list(&current.skills, "user skills"));
    let show_email_publicly = req.show_email_publicly.unwrap_or(current.show_email_publicly);

    state
        .db
        .update_user(&current.id, &username, &email, bio.as_deref(), &skills, show_email_publicly)
        .map_err(ApiError::from_db)?;

    Ok(Json(UserProfileResponse {
        id: principal.id,
        username,
        email,
        bio,
        skills,
        show_email_publicly,
    }))
}

pub async fn public_profile(
    State(state): State<AppState>,
    CurrentUser(_): CurrentUser,
    Path(username): Path<String>,
) -> Result<Json<PublicUserProfileResponse>, ApiError> {
    let row = state
        .db
        .get_user_by_username(&username)?
        .ok_or(ApiError::NotFound("user"))?;
    Ok(Json(public_profile_of(row)))
}

fn validate_username(username: &str) -> Result<(), ApiError> {
    if username.len() < 3 || username.len() > 32 {
        return Err(ApiError::Validation("username must be between 3 and 32 characters"));
    }
    Ok(())
}

fn own_profile(row: UserRow) -> UserProfileResponse {
    UserProfileResponse {
        id: parse_uuid(&row.id, "user id"),
        username: row.username,
        email: row.email,
        bio: row.bio,
        skills: parse_string_list(&row.skills, "user skills"),
        show_email_publicly: row.show_email_publicly,
    }
}

fn public_profile_of(row: UserRow) -> PublicUserProfileResponse {
    let email = row.show_email_publicly.then_some(row.email);
    PublicUserProfileResponse {
        id: parse_uuid(&row.id, "user id"),
        username: row.username,
        bio: row.bio,
        skills: parse_string_list(&row.skills, "user skills"),
        email,
    }
}
