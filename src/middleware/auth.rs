use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use axum::response::{Html, IntoResponse, Response};
use axum_extra::extract::cookie::{Cookie, Key, PrivateCookieJar, SameSite};
use time::Duration;

use crate::server::pages;

pub const LOGIN_COOKIE: &str = "logged_in";

/// True when the private login cookie is present and decrypts.
pub fn is_logged_in(jar: &PrivateCookieJar) -> bool {
    jar.get(LOGIN_COOKIE).is_some()
}

pub fn login_cookie(secure: bool) -> Cookie<'static> {
    Cookie::build(Cookie::new(LOGIN_COOKIE, "true"))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .max_age(Duration::hours(12))
        .build()
}

pub fn clear_login_cookie() -> Cookie<'static> {
    Cookie::build(Cookie::new(LOGIN_COOKIE, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

/// Gate for pages behind `/login`. Rejects with the "Access denied" page.
#[derive(Debug, Clone, Copy)]
pub struct RequireLogin;

impl<S> FromRequestParts<S> for RequireLogin
where
    S: Send + Sync,
    Key: FromRef<S>,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let jar = match PrivateCookieJar::<Key>::from_request_parts(parts, state).await {
            Ok(jar) => jar,
            Err(never) => match never {},
        };
        if is_logged_in(&jar) {
            return Ok(Self);
        }
        Err(Html(pages::access_denied()).into_response())
    }
}
