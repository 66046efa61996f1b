use crate::db::driver::DriverError;
use std::fmt;
use thiserror::Error as ThisError;

/// Classified database failure. Only `db::classify` builds these.
#[derive(Debug, ThisError)]
pub enum DbError {
    #[error("Connection error: {0}")]
    Connection(#[source] DriverError),

    #[error("Credentials error: {0}")]
    Credentials(#[source] DriverError),

    #[error("SQL error: {0}")]
    Query(#[source] DriverError),

    #[error("Unknown database error: {0}")]
    Unknown(#[source] DriverError),
}

/// Tag of a [`DbError`], handy for structured log fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Connection,
    Credentials,
    Query,
    Unknown,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::Connection => "Connection",
            ErrorKind::Credentials => "Credentials",
            ErrorKind::Query => "Query",
            ErrorKind::Unknown => "Unknown",
        };
        f.write_str(s)
    }
}

impl DbError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DbError::Connection(_) => ErrorKind::Connection,
            DbError::Credentials(_) => ErrorKind::Credentials,
            DbError::Query(_) => ErrorKind::Query,
            DbError::Unknown(_) => ErrorKind::Unknown,
        }
    }

    pub fn driver_error(&self) -> &DriverError {
        match self {
            DbError::Connection(e)
            | DbError::Credentials(e)
            | DbError::Query(e)
            | DbError::Unknown(e) => e,
        }
    }

    pub fn into_driver_error(self) -> DriverError {
        match self {
            DbError::Connection(e)
            | DbError::Credentials(e)
            | DbError::Query(e)
            | DbError::Unknown(e) => e,
        }
    }
}

#[derive(Debug, ThisError)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] Box<figment::Error>),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Address parse error: {0}")]
    AddrParse(#[from] std::net::AddrParseError),

    #[error("Database error: {0}")]
    Database(#[from] DbError),
}

impl From<figment::Error> for AppError {
    fn from(e: figment::Error) -> Self {
        AppError::Config(Box::new(e))
    }
}
