pub mod auth;
pub mod comments;
pub mod error;
pub mod middleware;
pub mod posts;
pub mod reactions;
pub mod search;
pub mod users;

use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::{delete, get, post, put};

use crate::auth::AppState;

/// Build the full application router. Identity resolution happens once in
/// [`middleware::resolve_identity`]; handlers opt into enforcement through
/// the `CurrentUser`/`MaybeUser` extractors.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/api/users/register", post(users::register))
        .route("/api/users", get(users::list))
        .route("/api/users/me", get(users::my_profile).put(users::update_my_profile))
        .route("/api/users/{username}", get(users::public_profile))
        .route("/api/posts", post(posts::create).get(posts::by_author))
        .route("/api/posts/public", get(posts::public_feed))
        .route("/api/posts/my-post", get(posts::my_posts))
        .route("/api/posts/{post_id}", put(posts::update).delete(posts::remove))
        .route(
            "/api/posts/{post_id}/comments",
            post(comments::create).get(comments::for_post),
        )
        .route("/api/comments/{comment_id}", delete(comments::remove))
        .route(
            "/api/posts/{post_id}/reactions",
            post(reactions::react_to_post).get(reactions::post_reactions),
        )
        .route(
            "/api/comments/{comment_id}/reactions",
            post(reactions::react_to_comment).get(reactions::comment_reactions),
        )
        .route("/api/search", get(search::posts))
        .layer(from_fn_with_state(state.clone(), middleware::resolve_identity))
        .with_state(state)
}
