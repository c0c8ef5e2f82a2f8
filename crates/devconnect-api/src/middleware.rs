use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::{debug, error, warn};
use uuid::Uuid;

use devconnect_types::models::Principal;

use crate::auth::{AUTH_COOKIE, AppState};
use crate::error::ApiError;

/// Route prefixes reachable with zero identity. The resolver skips these
/// entirely, so even a rotten token cannot block them.
pub const PUBLIC_ROUTES: &[&str] = &[
    "/auth/login",
    "/auth/logout",
    "/api/users/register",
    "/api/posts/public",
    "/api/search",
];

/// Per-request identity state. Starts Unauthenticated; only a token that
/// verifies AND whose subject still resolves to a stored user moves it to
/// Authenticated.
#[derive(Debug, Clone)]
pub enum AuthContext {
    Unauthenticated,
    Authenticated(Principal),
}

pub fn is_public_route(path: &str) -> bool {
    PUBLIC_ROUTES.iter().any(|prefix| path.starts_with(prefix))
}

/// Resolve the caller's identity and attach it to the request.
///
/// This middleware never rejects: missing, invalid, and expired
/// credentials all leave the request Unauthenticated, and the
/// [`CurrentUser`]/[`MaybeUser`] extractors decide per handler what that
/// means. An Authenticated context set earlier in the chain is kept as-is.
pub async fn resolve_identity(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    if is_public_route(req.uri().path()) {
        return next.run(req).await;
    }
    if matches!(req.extensions().get::<AuthContext>(), Some(AuthContext::Authenticated(_))) {
        return next.run(req).await;
    }

    let context = match extract_token(&req) {
        Some(token) => authenticate(&state, &token),
        None => AuthContext::Unauthenticated,
    };
    req.extensions_mut().insert(context);

    next.run(req).await
}

/// Token source priority: the auth cookie first, then a bearer header.
fn extract_token(req: &Request) -> Option<String> {
    let jar = CookieJar::from_headers(req.headers());
    if let Some(cookie) = jar.get(AUTH_COOKIE) {
        return Some(cookie.value().to_string());
    }

    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.to_string())
}

fn authenticate(state: &AppState, token: &str) -> AuthContext {
    let claims = match state.tokens.verify(token) {
        Ok(claims) => claims,
        Err(err) => {
            debug!("token rejected: {err}");
            return AuthContext::Unauthenticated;
        }
    };

    match state.db.get_user_by_username(&claims.sub) {
        Ok(Some(user)) => match user.id.parse::<Uuid>() {
            Ok(id) => AuthContext::Authenticated(Principal {
                id,
                username: user.username,
            }),
            Err(err) => {
                warn!("Corrupt user id '{}': {}", user.id, err);
                AuthContext::Unauthenticated
            }
        },
        Ok(None) => {
            debug!("token subject '{}' no longer exists", claims.sub);
            AuthContext::Unauthenticated
        }
        Err(err) => {
            error!("user lookup during identity resolution failed: {err:#}");
            AuthContext::Unauthenticated
        }
    }
}

/// Extracts the authenticated principal; rejects with 401 when the
/// request carries no resolved identity.
pub struct CurrentUser(pub Principal);

impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<AuthContext>() {
            Some(AuthContext::Authenticated(principal)) => Ok(CurrentUser(principal.clone())),
            _ => Err(ApiError::Unauthorized),
        }
    }
}

/// Like [`CurrentUser`] but infallible, for reads that serve both
/// anonymous and authenticated callers with different projections.
pub struct MaybeUser(pub Option<Principal>);

impl<S: Send + Sync> FromRequestParts<S> for MaybeUser {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let principal = match parts.extensions.get::<AuthContext>() {
            Some(AuthContext::Authenticated(principal)) => Some(principal.clone()),
            _ => None,
        };
        Ok(MaybeUser(principal))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    fn request_with_headers(headers: &[(&str, &str)]) -> Request {
        let mut builder = Request::builder().uri("/api/posts");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn public_prefixes_skip_identity() {
        assert!(is_public_route("/auth/login"));
        assert!(is_public_route("/auth/logout"));
        assert!(is_public_route("/api/users/register"));
        assert!(is_public_route("/api/posts/public"));
        assert!(is_public_route("/api/search"));

        assert!(!is_public_route("/api/posts"));
        assert!(!is_public_route("/api/users/me"));
        assert!(!is_public_route("/api/comments/abc"));
    }

    #[test]
    fn cookie_outranks_bearer_header() {
        let req = request_with_headers(&[
            ("cookie", "DEVCONNECT_JWT=from-cookie"),
            ("authorization", "Bearer from-header"),
        ]);
        assert_eq!(extract_token(&req).as_deref(), Some("from-cookie"));
    }

    #[test]
    fn bearer_header_is_the_fallback() {
        let req = request_with_headers(&[("authorization", "Bearer from-header")]);
        assert_eq!(extract_token(&req).as_deref(), Some("from-header"));
    }

    #[test]
    fn non_bearer_schemes_and_bare_requests_yield_nothing() {
        let req = request_with_headers(&[("authorization", "Basic dXNlcjpwdw==")]);
        assert_eq!(extract_token(&req), None);
        assert_eq!(extract_token(&request_with_headers(&[])), None);
    }

    #[test]
    fn unrelated_cookies_are_ignored() {
        let req = request_with_headers(&[("cookie", "theme=dark; other=1")]);
        assert_eq!(extract_token(&req), None);
    }
}
