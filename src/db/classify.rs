//! Maps driver failures onto the four [`DbError`] kinds.

use crate::db::driver::{DriverError, FailureCategory};
use crate::error::DbError;

/// Where in the session lifecycle a failure was observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Connecting or obtaining the cursor.
    Open,
    /// Running the unit of work or committing it.
    Execute,
}

/// Total over every `(phase, category)` pair; the cause is moved, never dropped.
pub fn classify(phase: Phase, err: DriverError) -> DbError {
    match (phase, err.category()) {
        (Phase::Open, FailureCategory::Transport) => DbError::Connection(err),
        // A server that rejects the session parameters (unknown database,
        // access denied to it) has rejected the login as configured.
        (Phase::Open, FailureCategory::Authorization | FailureCategory::Statement) => {
            DbError::Credentials(err)
        }
        (Phase::Execute, FailureCategory::Statement) => DbError::Query(err),
        (Phase::Open, FailureCategory::Other)
        | (
            Phase::Execute,
            FailureCategory::Transport | FailureCategory::Authorization | FailureCategory::Other,
        ) => DbError::Unknown(err),
    }
}
