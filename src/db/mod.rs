//! Database module: scoped sessions over a pluggable driver, plus the request log table.
//!
//! Layout:
//! - `driver.rs`: the driver traits and `DriverError`
//! - `sqlx_driver.rs`: the sqlx `Any` implementation (MySQL, SQLite)
//! - `classify.rs`: driver failure -> `DbError` kind
//! - `session.rs`: `SessionHandle`, `SessionScope`, `with_session`
//! - `models.rs` / `schema.rs` / `request_log.rs`: the `log` table

pub mod classify;
pub mod config;
pub mod driver;
pub mod models;
pub mod request_log;
pub mod schema;
pub mod session;
pub mod sqlx_driver;

pub use classify::{Phase, classify};
pub use config::{Engine, SessionConfig};
pub use driver::{Driver, DriverConnection, DriverCursor, DriverError, FailureCategory, Param, Row};
pub use models::{LogColumns, LogRecord};
pub use request_log::{RequestLogStore, fetch_log, init_schema};
pub use session::{CursorOf, SessionHandle, SessionScope, with_session};
pub use sqlx_driver::SqlxDriver;
