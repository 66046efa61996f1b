//! Scoped database sessions.
//!
//! A session is one connection plus one cursor, opened for exactly one unit of
//! work. [`SessionScope::run`] commits and then releases on every exit path
//! (success, failure, or panic) before reporting the outcome.

use crate::db::classify::{Phase, classify};
use crate::db::config::SessionConfig;
use crate::db::driver::{Driver, DriverConnection, DriverCursor, DriverError};
use crate::error::DbError;
use futures::FutureExt;
use futures::future::BoxFuture;
use std::panic::AssertUnwindSafe;
use tracing::{debug, warn};

/// The cursor type a unit of work receives for driver `D`.
pub type CursorOf<D> = <<D as Driver>::Connection as DriverConnection>::Cursor;

struct OpenSession<C: DriverConnection> {
    conn: C,
    cursor: C::Cursor,
}

/// One connection and its cursor. Either both are live or both are released.
pub struct SessionHandle<C: DriverConnection> {
    open: Option<OpenSession<C>>,
}

impl<C: DriverConnection> SessionHandle<C> {
    /// Connect and obtain a cursor. A cursor failure closes the connection first.
    pub async fn open<D>(driver: &D, config: &SessionConfig) -> Result<Self, DbError>
    where
        D: Driver<Connection = C>,
    {
        let mut conn = driver
            .connect(config)
            .await
            .map_err(|e| classify(Phase::Open, e))?;

        let cursor = match conn.cursor().await {
            Ok(cursor) => cursor,
            Err(e) => {
                if let Err(close_err) = conn.close().await {
                    warn!(error = %close_err, "failed to release connection after cursor error");
                }
                return Err(classify(Phase::Open, e));
            }
        };

        debug!(
            engine = %config.engine,
            host = %config.host,
            database = %config.database,
            "session opened"
        );
        Ok(Self {
            open: Some(OpenSession { conn, cursor }),
        })
    }

    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    pub fn cursor_mut(&mut self) -> Option<&mut C::Cursor> {
        self.open.as_mut().map(|s| &mut s.cursor)
    }

    /// Optionally commit, then release the cursor and the connection.
    ///
    /// Release always happens. Only a commit failure is returned; release
    /// failures are logged. Calling this on a closed handle does nothing.
    pub async fn close(&mut self, commit: bool) -> Result<(), DbError> {
        let Some(OpenSession { mut conn, cursor }) = self.open.take() else {
            return Ok(());
        };

        let committed = if commit {
            conn.commit()
                .await
                .map_err(|e| classify(Phase::Execute, e))
        } else {
            Ok(())
        };

        if let Err(e) = cursor.close().await {
            warn!(error = %e, "failed to release cursor");
        }
        if let Err(e) = conn.close().await {
            warn!(error = %e, "failed to release connection");
        }

        debug!(commit, committed = committed.is_ok(), "session closed");
        committed
    }
}

impl<C: DriverConnection> Drop for SessionHandle<C> {
    fn drop(&mut self) {
        if self.open.is_some() {
            warn!("session handle dropped while open; uncommitted work is discarded");
        }
    }
}

/// Entry point for database access: one scope, one session, one unit of work.
///
/// Not shareable: `run` consumes the scope, so every unit of work opens its
/// own handle.
pub struct SessionScope<'a, D: Driver> {
    driver: &'a D,
    config: &'a SessionConfig,
}

impl<'a, D: Driver> SessionScope<'a, D> {
    pub fn new(driver: &'a D, config: &'a SessionConfig) -> Self {
        Self { driver, config }
    }

    /// Open a session, run `work` once on its cursor, commit, release.
    ///
    /// - open failure: returned classified, `work` never runs;
    /// - `work` failure: committed and released first, then returned as
    ///   `Query` (statement failures) or `Unknown` carrying the failure as is;
    /// - `work` panic: committed and released, then the panic resumes;
    /// - success: the value, unless the commit itself failed.
    pub async fn run<T, F>(self, work: F) -> Result<T, DbError>
    where
        T: Send,
        F: for<'c> FnOnce(&'c mut CursorOf<D>) -> BoxFuture<'c, Result<T, DriverError>> + Send,
    {
        let mut handle = SessionHandle::open(self.driver, self.config).await?;

        let outcome = match handle.cursor_mut() {
            Some(cursor) => AssertUnwindSafe(async move { work(cursor).await })
                .catch_unwind()
                .await,
            None => Ok(Err(DriverError::other("session closed before its unit of work ran"))),
        };

        let closed = handle.close(true).await;

        match outcome {
            Ok(Ok(value)) => closed.map(|()| value),
            Ok(Err(work_err)) => {
                if let Err(e) = closed {
                    warn!(kind = %e.kind(), error = %e, "commit after failed unit of work also failed");
                }
                Err(classify(Phase::Execute, work_err))
            }
            Err(panic) => {
                if let Err(e) = closed {
                    warn!(kind = %e.kind(), error = %e, "commit after panicked unit of work failed");
                }
                std::panic::resume_unwind(panic)
            }
        }
    }
}

/// One-call form of [`SessionScope::run`].
pub async fn with_session<D, T, F>(driver: &D, config: &SessionConfig, work: F) -> Result<T, DbError>
where
    D: Driver,
    T: Send,
    F: for<'c> FnOnce(&'c mut CursorOf<D>) -> BoxFuture<'c, Result<T, DriverError>> + Send,
{
    SessionScope::new(driver, config).run(work).await
}
