use crate::db::driver::Driver;
use crate::db::models::LogRecord;
use crate::error::ErrorKind;
use crate::middleware::auth::{RequireLogin, clear_login_cookie, login_cookie};
use crate::middleware::client::ClientMeta;
use crate::server::pages;
use crate::server::router::AppState;
use crate::service::search::{format_results, search_letters};
use axum::extract::{Form, Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum_extra::extract::cookie::PrivateCookieJar;
use serde::Deserialize;
use subtle::ConstantTimeEq;
use tracing::{error, info};

#[derive(Debug, Deserialize)]
pub struct SearchForm {
    pub phrase: String,
    pub letters: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    pub key: Option<String>,
}

/// GET / and GET /entry
pub async fn entry_page() -> Html<String> {
    Html(pages::entry())
}

/// POST /search4 -> renders results right away; the log row is written in the background.
pub async fn do_search<D: Driver>(
    State(state): State<AppState<D>>,
    client: ClientMeta,
    Form(form): Form<SearchForm>,
) -> Html<String> {
    let results = format_results(&search_letters(&form.phrase, &form.letters));

    let record = LogRecord::new(
        form.phrase.clone(),
        form.letters.clone(),
        client.addr,
        client.user_agent,
        results.clone(),
    );
    state.log_writer.spawn(record);

    Html(pages::results(&form.phrase, &form.letters, &results))
}

/// GET /viewlog -> the log table, for logged-in users only.
pub async fn view_the_log<D: Driver>(
    _login: RequireLogin,
    State(state): State<AppState<D>>,
) -> Response {
    match state.store.fetch_all().await {
        Ok(records) => Html(pages::view_log(state.store.columns(), &records)).into_response(),
        Err(e) => {
            let hint = match e.kind() {
                ErrorKind::Connection => "is the database switched on?",
                ErrorKind::Credentials => "user name and/or password seem to be incorrect",
                ErrorKind::Query => "the SQL statement has errors",
                ErrorKind::Unknown => "something went wrong",
            };
            error!(kind = %e.kind(), cause = %e.driver_error(), "viewlog failed: {hint}");
            (StatusCode::INTERNAL_SERVER_ERROR, "Error").into_response()
        }
    }
}

/// GET /login[?key=...] -> sets the private login cookie.
pub async fn do_login<D: Driver>(
    State(state): State<AppState<D>>,
    Query(query): Query<LoginQuery>,
    jar: PrivateCookieJar,
) -> Response {
    if let Some(expected) = state.login_key.as_deref() {
        let given = query.key.as_deref().unwrap_or("");
        if !bool::from(given.as_bytes().ct_eq(expected.as_bytes())) {
            return StatusCode::NOT_FOUND.into_response();
        }
    }

    info!("login cookie issued");
    let jar = jar.add(login_cookie(!state.insecure_cookie));
    (jar, "You are now logged in.").into_response()
}

/// GET /logout
pub async fn do_logout(jar: PrivateCookieJar) -> impl IntoResponse {
    (jar.remove(clear_login_cookie()), "You are now logged out.")
}
