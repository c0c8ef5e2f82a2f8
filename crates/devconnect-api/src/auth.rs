use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use tracing::info;

use devconnect_auth::password;
use devconnect_auth::token::TokenService;
use devconnect_db::Database;
use devconnect_types::api::{LoginRequest, LoginResponse};

use crate::error::ApiError;

/// Name of the cookie carrying the identity token.
pub const AUTH_COOKIE: &str = "DEVCONNECT_JWT";

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub tokens: TokenService,
}

/// Credential check plus token issue. The token is set as an HttpOnly
/// cookie; the response body deliberately carries a null token. Unknown
/// user and wrong password are indistinguishable to the caller.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .db
        .get_user_by_username(&req.username)?
        .ok_or(ApiError::Unauthorized)?;

    if !password::verify(&req.password, &user.password)? {
        return Err(ApiError::Unauthorized);
    }

    let token = state.tokens.issue(&user.username)?;
    info!("login: {}", user.username);

    let cookie = Cookie::build((AUTH_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();

    Ok((jar.add(cookie), Json(LoginResponse { token: None })))
}

/// Stateless logout: expire the cookie client-side. The token itself
/// stays valid until its expiry; there is no server-side revocation list.
pub async fn logout(jar: CookieJar) -> impl IntoResponse {
    let mut removal = Cookie::build((AUTH_COOKIE, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();
    removal.make_removal();

    (jar.add(removal), StatusCode::NO_CONTENT)
}
