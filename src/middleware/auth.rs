use axum::extract::{FromRef, FromRequestParts};
use axum::http::{HeaderMap, header::COOKIE, request::Parts};
use axum_extra::extract::cookie::Cookie;
use tracing::debug;

use crate::auth::{TOKEN_COOKIE, TokenStore};
use crate::error::JournalError;

/// Ensure the inbound request carries an allowed token.
/// Accepts, checked in this order:
/// - Cookie: `kj_token=...`
/// - Header: `X-Auth-Token: ...`
/// - Header: `Authorization: Bearer ...`
/// - Query string: `?token=...`
///
/// An empty token store admits everything.
pub fn ensure_authorized(
    tokens: &TokenStore,
    headers: &HeaderMap,
    query: Option<&str>,
) -> Result<(), JournalError> {
    if tokens.is_empty() {
        return Ok(());
    }

    // 1) cookie: kj_token (first occurrence only)
    if let Some(value) = first_cookie_value(headers, TOKEN_COOKIE)
        && tokens.allowed(&value)
    {
        return Ok(());
    }

    // 2) header: X-Auth-Token
    if let Some(hv) = header_str(headers, "x-auth-token")
        && tokens.allowed(hv)
    {
        return Ok(());
    }

    // 3) header: Authorization: Bearer <token>
    if let Some(token) =
        header_str(headers, "authorization").and_then(|auth| auth.strip_prefix("Bearer "))
        && tokens.allowed(token)
    {
        return Ok(());
    }

    // 4) query: token=... (first occurrence only)
    if let Some(token) = query.and_then(|qs| first_query_value(qs, "token"))
        && tokens.allowed(&token)
    {
        return Ok(());
    }

    debug!("request rejected: no allowed token presented");
    Err(JournalError::Unauthorized)
}

fn header_str<'h>(headers: &'h HeaderMap, name: &str) -> Option<&'h str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// First cookie named `name` across all `Cookie` headers, in request order.
pub fn first_cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|c| c.name() == name)
        .map(|c| c.value().to_string())
}

/// First value of `name` in a raw query string.
pub fn first_query_value(query: &str, name: &str) -> Option<String> {
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.into_owned())
}

/// Gate for protected routes; mount with `middleware::from_extractor_with_state`.
#[derive(Debug, Clone, Copy)]
pub struct RequireToken;

impl<S> FromRequestParts<S> for RequireToken
where
    TokenStore: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = JournalError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let tokens = TokenStore::from_ref(state);
        ensure_authorized(&tokens, &parts.headers, parts.uri.query())?;
        Ok(Self)
    }
}
