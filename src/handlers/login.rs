use axum::{
    body::Bytes,
    extract::State,
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use tracing::{info, warn};

use crate::auth::TOKEN_COOKIE;
use crate::middleware::json_body;
use crate::types::LoginRequest;
use crate::{JournalError, router::JournalState};

/// /api/login -> exchanges a shared token for a session cookie.
///
/// With no tokens configured there is nothing to log in to and every method
/// gets `204 No Content`.
pub async fn login(
    State(state): State<JournalState>,
    method: Method,
    jar: CookieJar,
    body: Bytes,
) -> Result<Response, JournalError> {
    if state.tokens.is_empty() {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }

    if method != Method::POST {
        return Err(JournalError::MethodNotAllowed);
    }

    let req: LoginRequest = json_body::decode(&body)?;
    if !state.tokens.allowed(&req.token) {
        warn!("login rejected");
        return Err(JournalError::Unauthorized);
    }

    let jar = jar.add(build_cookie(req.token, state.secure_cookie));
    info!("login accepted");
    Ok((jar, StatusCode::OK).into_response())
}

fn build_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build(Cookie::new(TOKEN_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cookie_attributes() {
        let cookie = build_cookie("abc".to_string(), false);
        assert_eq!(cookie.name(), "kj_token");
        assert_eq!(cookie.value(), "abc");
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_ne!(cookie.secure(), Some(true));

        assert_eq!(build_cookie("abc".to_string(), true).secure(), Some(true));
    }
}
