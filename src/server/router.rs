use crate::config::Config;
use crate::db::driver::Driver;
use crate::db::request_log::RequestLogStore;
use crate::error::AppError;
use crate::server::handlers;
use crate::service::log_writer::LogWriter;
use axum::Router;
use axum::extract::FromRef;
use axum::routing::{get, post};
use axum_extra::extract::cookie::Key;
use std::sync::Arc;

/// Shared state for all routes. Everything in here is read-only.
pub struct AppState<D: Driver> {
    pub store: RequestLogStore<D>,
    pub log_writer: LogWriter<D>,
    pub cookie_key: Key,
    pub login_key: Option<Arc<str>>,
    pub insecure_cookie: bool,
}

impl<D: Driver> Clone for AppState<D> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            log_writer: self.log_writer.clone(),
            cookie_key: self.cookie_key.clone(),
            login_key: self.login_key.clone(),
            insecure_cookie: self.insecure_cookie,
        }
    }
}

impl<D: Driver> AppState<D> {
    pub fn new(driver: Arc<D>, cfg: &Config) -> Result<Self, AppError> {
        let store = RequestLogStore::new(
            driver,
            Arc::new(cfg.database.clone()),
            cfg.request_log.columns,
        );
        let mut log_writer = LogWriter::from_store(store.clone());
        if let Some(latency) = cfg.request_log.simulated_latency() {
            log_writer = log_writer.with_simulated_latency(latency);
        }
        Ok(Self {
            store,
            log_writer,
            cookie_key: cfg.cookie_key()?,
            login_key: cfg.basic.login_key.as_deref().map(Arc::from),
            insecure_cookie: cfg.basic.insecure_cookie,
        })
    }
}

impl<D: Driver> FromRef<AppState<D>> for Key {
    fn from_ref(state: &AppState<D>) -> Self {
        state.cookie_key.clone()
    }
}

pub fn app_router<D: Driver>(state: AppState<D>) -> Router {
    Router::new()
        .route("/", get(handlers::entry_page))
        .route("/entry", get(handlers::entry_page))
        .route("/search4", post(handlers::do_search::<D>))
        .route("/viewlog", get(handlers::view_the_log::<D>))
        .route("/login", get(handlers::do_login::<D>))
        .route("/logout", get(handlers::do_logout))
        .with_state(state)
}
