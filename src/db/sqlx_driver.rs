//! [`Driver`] over sqlx's `Any` backend: MySQL in production, SQLite locally.
//!
//! Each session gets its own `AnyConnection` with a transaction opened at
//! connect time. The connection and its cursor share it behind a mutex that
//! only the owning session ever locks.

use crate::db::config::{Engine, SessionConfig};
use crate::db::driver::{
    Driver, DriverConnection, DriverCursor, DriverError, FailureCategory, Param, Row,
};
use async_trait::async_trait;
use sqlx::any::{AnyRow, install_default_drivers};
use sqlx::{AnyConnection, Connection, Executor, Row as _};
use std::io;
use std::sync::Arc;
use tokio::sync::Mutex;
use url::Url;

impl From<sqlx::Error> for DriverError {
    fn from(e: sqlx::Error) -> Self {
        let category = match &e {
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => FailureCategory::Transport,
            // SQLSTATE class 28: invalid authorization specification
            sqlx::Error::Database(db) if db.code().is_some_and(|c| c.starts_with("28")) => {
                FailureCategory::Authorization
            }
            sqlx::Error::Database(_)
            | sqlx::Error::RowNotFound
            | sqlx::Error::TypeNotFound { .. }
            | sqlx::Error::ColumnIndexOutOfBounds { .. }
            | sqlx::Error::ColumnNotFound(_)
            | sqlx::Error::ColumnDecode { .. }
            | sqlx::Error::Decode(_) => FailureCategory::Statement,
            _ => FailureCategory::Other,
        };
        DriverError::new(category, e)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SqlxDriver;

impl SqlxDriver {
    pub fn new() -> Self {
        install_default_drivers();
        Self
    }
}

impl Default for SqlxDriver {
    fn default() -> Self {
        Self::new()
    }
}

/// Build the connection URL. The result carries the password; never log it.
fn connection_url(config: &SessionConfig) -> Result<String, DriverError> {
    match config.engine {
        Engine::Sqlite => Ok(format!("sqlite:{}?mode=rwc", config.database)),
        Engine::Mysql => {
            let mut url = Url::parse("mysql://localhost").map_err(DriverError::other)?;
            url.set_host(Some(&config.host))
                .map_err(|e| DriverError::transport(format!("invalid host: {e}")))?;
            url.set_username(&config.user)
                .map_err(|()| DriverError::authorization("invalid user name"))?;
            if !config.password.is_empty() {
                url.set_password(Some(&config.password))
                    .map_err(|()| DriverError::authorization("invalid password"))?;
            }
            if let Some(port) = config.port {
                url.set_port(Some(port))
                    .map_err(|()| DriverError::transport("invalid port"))?;
            }
            url.set_path(&config.database);
            Ok(url.into())
        }
    }
}

/// SQLite takes the write lock up front so concurrent sessions queue on the
/// busy timeout instead of failing a lock upgrade at commit.
fn begin_sql(engine: Engine) -> &'static str {
    match engine {
        Engine::Mysql => "BEGIN",
        Engine::Sqlite => "BEGIN IMMEDIATE",
    }
}

fn decode_row(row: &AnyRow) -> Result<Row, sqlx::Error> {
    (0..row.len())
        .map(|i| row.try_get::<Option<String>, _>(i))
        .collect()
}

#[async_trait]
impl Driver for SqlxDriver {
    type Connection = SqlxConnection;

    async fn connect(&self, config: &SessionConfig) -> Result<SqlxConnection, DriverError> {
        let url = connection_url(config)?;
        let connecting = AnyConnection::connect(&url);
        let mut conn = match config.connect_timeout() {
            Some(limit) => tokio::time::timeout(limit, connecting)
                .await
                .map_err(|_| {
                    DriverError::transport(io::Error::new(
                        io::ErrorKind::TimedOut,
                        format!("connect timed out after {}ms", limit.as_millis()),
                    ))
                })??,
            None => connecting.await?,
        };

        Executor::execute(&mut conn, begin_sql(config.engine)).await?;

        Ok(SqlxConnection {
            conn: Arc::new(Mutex::new(conn)),
        })
    }
}

pub struct SqlxConnection {
    conn: Arc<Mutex<AnyConnection>>,
}

#[async_trait]
impl DriverConnection for SqlxConnection {
    type Cursor = SqlxCursor;

    async fn cursor(&mut self) -> Result<SqlxCursor, DriverError> {
        Ok(SqlxCursor {
            conn: Arc::clone(&self.conn),
            rows: Vec::new(),
        })
    }

    async fn commit(&mut self) -> Result<(), DriverError> {
        let mut conn = self.conn.lock().await;
        Executor::execute(&mut *conn, "COMMIT").await?;
        Ok(())
    }

    async fn close(self) -> Result<(), DriverError> {
        match Arc::try_unwrap(self.conn) {
            Ok(conn) => Ok(conn.into_inner().close().await?),
            Err(_) => Err(DriverError::other("connection still referenced by a cursor")),
        }
    }
}

pub struct SqlxCursor {
    conn: Arc<Mutex<AnyConnection>>,
    rows: Vec<Row>,
}

#[async_trait]
impl DriverCursor for SqlxCursor {
    async fn execute(&mut self, sql: &str, params: &[Param]) -> Result<(), DriverError> {
        let query = params
            .iter()
            .fold(sqlx::query(sql), |query, param| query.bind(param.clone()));

        let mut conn = self.conn.lock().await;
        let rows = query.fetch_all(&mut *conn).await?;
        self.rows = rows.iter().map(decode_row).collect::<Result<_, _>>()?;
        Ok(())
    }

    fn fetch_all(&mut self) -> Vec<Row> {
        std::mem::take(&mut self.rows)
    }

    async fn close(self) -> Result<(), DriverError> {
        Ok(())
    }
}
