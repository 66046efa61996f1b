//! Driver seam between the session layer and a concrete database client.
//!
//! A [`Driver`] opens [`DriverConnection`]s; a connection hands out one
//! [`DriverCursor`] per session. Every failure crossing this seam is a
//! [`DriverError`], tagged with the driver's own notion of what went wrong.

use crate::db::config::SessionConfig;
use async_trait::async_trait;
use std::error::Error as StdError;
use std::fmt;

/// Statement parameter. All columns this crate touches are text; `None` binds NULL.
pub type Param = Option<String>;

/// One fetched row, cells in select-list order.
pub type Row = Vec<Option<String>>;

pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// What the driver reported, before any session-level interpretation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureCategory {
    /// Host unreachable, refused, reset, timed out, TLS failure.
    Transport,
    /// The server refused the identity or its privileges.
    Authorization,
    /// The server rejected a statement or its result could not be read.
    Statement,
    Other,
}

impl fmt::Display for FailureCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FailureCategory::Transport => "transport",
            FailureCategory::Authorization => "authorization",
            FailureCategory::Statement => "statement",
            FailureCategory::Other => "other",
        };
        f.write_str(s)
    }
}

/// A failure raised by a driver, with its native cause preserved.
#[derive(Debug)]
pub struct DriverError {
    category: FailureCategory,
    source: BoxError,
}

impl DriverError {
    pub fn new(category: FailureCategory, source: impl Into<BoxError>) -> Self {
        Self {
            category,
            source: source.into(),
        }
    }

    pub fn transport(source: impl Into<BoxError>) -> Self {
        Self::new(FailureCategory::Transport, source)
    }

    pub fn authorization(source: impl Into<BoxError>) -> Self {
        Self::new(FailureCategory::Authorization, source)
    }

    pub fn statement(source: impl Into<BoxError>) -> Self {
        Self::new(FailureCategory::Statement, source)
    }

    pub fn other(source: impl Into<BoxError>) -> Self {
        Self::new(FailureCategory::Other, source)
    }

    pub fn category(&self) -> FailureCategory {
        self.category
    }

    /// The native driver error.
    pub fn cause(&self) -> &(dyn StdError + Send + Sync + 'static) {
        self.source.as_ref()
    }

    pub fn into_cause(self) -> BoxError {
        self.source
    }
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failure: {}", self.category, self.source)
    }
}

impl StdError for DriverError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(self.source.as_ref())
    }
}

/// Opens connections. Implementations are stateless and shared across tasks.
#[async_trait]
pub trait Driver: Send + Sync + 'static {
    type Connection: DriverConnection;

    async fn connect(&self, config: &SessionConfig) -> Result<Self::Connection, DriverError>;
}

/// One live connection with an open transaction.
#[async_trait]
pub trait DriverConnection: Send + 'static {
    type Cursor: DriverCursor;

    async fn cursor(&mut self) -> Result<Self::Cursor, DriverError>;

    async fn commit(&mut self) -> Result<(), DriverError>;

    async fn close(self) -> Result<(), DriverError>;
}

/// Executes statements on the connection it came from and buffers the result set.
#[async_trait]
pub trait DriverCursor: Send + 'static {
    async fn execute(&mut self, sql: &str, params: &[Param]) -> Result<(), DriverError>;

    /// Drain the rows produced by the last `execute`.
    fn fetch_all(&mut self) -> Vec<Row>;

    async fn close(self) -> Result<(), DriverError>;
}
