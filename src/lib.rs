pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod server;
pub mod service;

pub use db::{LogRecord, SessionConfig, SessionScope, with_session};
pub use error::{AppError, DbError, ErrorKind};
pub use service::log_writer::LogWriter;
