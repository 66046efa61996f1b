use crate::db::config::SessionConfig;
use crate::db::driver::{Driver, DriverCursor, DriverError, Param, Row};
use crate::db::models::{LogColumns, LogRecord};
use crate::db::schema::init_sql;
use crate::db::session::with_session;
use crate::error::DbError;
use std::sync::Arc;

pub fn insert_sql(columns: LogColumns) -> &'static str {
    match columns {
        LogColumns::WithClientAddr => {
            "INSERT INTO log (phrase, letters, ip, browser_string, results) VALUES (?, ?, ?, ?, ?)"
        }
        LogColumns::WithoutClientAddr => {
            "INSERT INTO log (phrase, letters, browser_string, results) VALUES (?, ?, ?, ?)"
        }
    }
}

/// No ORDER BY: rows come back in whatever order the engine keeps them.
pub fn select_sql(columns: LogColumns) -> &'static str {
    match columns {
        LogColumns::WithClientAddr => {
            "SELECT phrase, letters, ip, browser_string, results FROM log"
        }
        LogColumns::WithoutClientAddr => "SELECT phrase, letters, browser_string, results FROM log",
    }
}

fn record_params(record: &LogRecord, columns: LogColumns) -> Vec<Param> {
    let mut params = Vec::with_capacity(columns.column_count());
    params.push(Some(record.phrase.clone()));
    params.push(Some(record.letters.clone()));
    if columns.includes_client_addr() {
        params.push(record.client_addr.clone());
    }
    params.push(Some(record.user_agent.clone()));
    params.push(Some(record.results.clone()));
    params
}

fn row_to_record(row: Row, columns: LogColumns) -> Result<LogRecord, DriverError> {
    if row.len() != columns.column_count() {
        return Err(DriverError::statement(format!(
            "log row has {} columns, expected {}",
            row.len(),
            columns.column_count()
        )));
    }
    let mut cells = row.into_iter();

    let phrase = cells.next().flatten().unwrap_or_default();
    let letters = cells.next().flatten().unwrap_or_default();
    // NULL reads back as None; an empty address stays Some("").
    let client_addr = if columns.includes_client_addr() {
        cells.next().flatten()
    } else {
        None
    };
    let user_agent = cells.next().flatten().unwrap_or_default();
    let results = cells.next().flatten().unwrap_or_default();

    Ok(LogRecord {
        phrase,
        letters,
        client_addr,
        user_agent,
        results,
    })
}

pub async fn insert_record<C: DriverCursor>(
    cursor: &mut C,
    record: &LogRecord,
    columns: LogColumns,
) -> Result<(), DriverError> {
    let params = record_params(record, columns);
    cursor.execute(insert_sql(columns), &params).await
}

pub async fn read_records<C: DriverCursor>(
    cursor: &mut C,
    columns: LogColumns,
) -> Result<Vec<LogRecord>, DriverError> {
    cursor.execute(select_sql(columns), &[]).await?;
    cursor
        .fetch_all()
        .into_iter()
        .map(|row| row_to_record(row, columns))
        .collect()
}

/// Run the engine's DDL in one session.
pub async fn init_schema<D: Driver>(driver: &D, config: &SessionConfig) -> Result<(), DbError> {
    let ddl = init_sql(config.engine);
    with_session(driver, config, move |cursor| {
        Box::pin(async move {
            for stmt in ddl.split(';').map(str::trim).filter(|s| !s.is_empty()) {
                cursor.execute(stmt, &[]).await?;
            }
            Ok::<(), DriverError>(())
        })
    })
    .await
}

/// Every row of the log table, read in one session.
pub async fn fetch_log<D: Driver>(
    driver: &D,
    config: &SessionConfig,
    columns: LogColumns,
) -> Result<Vec<LogRecord>, DbError> {
    with_session(driver, config, move |cursor| {
        Box::pin(read_records(cursor, columns))
    })
    .await
}

/// Request log table access. Every call runs in its own session.
pub struct RequestLogStore<D: Driver> {
    driver: Arc<D>,
    config: Arc<SessionConfig>,
    columns: LogColumns,
}

impl<D: Driver> Clone for RequestLogStore<D> {
    fn clone(&self) -> Self {
        Self {
            driver: Arc::clone(&self.driver),
            config: Arc::clone(&self.config),
            columns: self.columns,
        }
    }
}

impl<D: Driver> RequestLogStore<D> {
    pub fn new(driver: Arc<D>, config: Arc<SessionConfig>, columns: LogColumns) -> Self {
        Self {
            driver,
            config,
            columns,
        }
    }

    pub fn columns(&self) -> LogColumns {
        self.columns
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Create the `log` table if missing, using the DDL for the configured engine.
    pub async fn init_schema(&self) -> Result<(), DbError> {
        init_schema(self.driver.as_ref(), &self.config).await
    }

    pub async fn insert(&self, record: LogRecord) -> Result<(), DbError> {
        let columns = self.columns;
        with_session(self.driver.as_ref(), &self.config, move |cursor| {
            Box::pin(async move { insert_record(cursor, &record, columns).await })
        })
        .await
    }

    pub async fn fetch_all(&self) -> Result<Vec<LogRecord>, DbError> {
        fetch_log(self.driver.as_ref(), &self.config, self.columns).await
    }
}
