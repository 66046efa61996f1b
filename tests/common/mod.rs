#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::io;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;
use vsearch_web::db::{
    Driver, DriverConnection, DriverCursor, DriverError, FailureCategory, Param, Row,
    SessionConfig,
};

/// Driver calls in the order they happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Connect,
    Cursor,
    Execute(String),
    Commit,
    CloseCursor,
    CloseConnection,
}

pub type CallLog = Arc<Mutex<Vec<Call>>>;

fn record(log: &CallLog, call: Call) {
    log.lock().expect("call log poisoned").push(call);
}

/// In-memory driver that records every call and fails on request.
#[derive(Clone, Default)]
pub struct FakeDriver {
    calls: CallLog,
    connect_failure: Option<FailureCategory>,
    rejected_password: Option<String>,
    cursor_failure: bool,
    commit_failure: Option<FailureCategory>,
    failing_sql: Option<String>,
    rows: Vec<Row>,
}

impl FakeDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_connect(mut self, category: FailureCategory) -> Self {
        self.connect_failure = Some(category);
        self
    }

    pub fn rejecting_password(mut self, password: &str) -> Self {
        self.rejected_password = Some(password.to_string());
        self
    }

    pub fn failing_cursor(mut self) -> Self {
        self.cursor_failure = true;
        self
    }

    pub fn failing_commit(mut self, category: FailureCategory) -> Self {
        self.commit_failure = Some(category);
        self
    }

    /// Any statement containing `needle` fails as a statement error.
    pub fn failing_sql(mut self, needle: &str) -> Self {
        self.failing_sql = Some(needle.to_string());
        self
    }

    pub fn returning_rows(mut self, rows: Vec<Row>) -> Self {
        self.rows = rows;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().expect("call log poisoned").clone()
    }

    pub fn count(&self, call: &Call) -> usize {
        self.calls().iter().filter(|c| *c == call).count()
    }
}

#[async_trait]
impl Driver for FakeDriver {
    type Connection = FakeConnection;

    async fn connect(&self, config: &SessionConfig) -> Result<FakeConnection, DriverError> {
        record(&self.calls, Call::Connect);
        if let Some(category) = self.connect_failure {
            return Err(DriverError::new(
                category,
                io::Error::new(io::ErrorKind::ConnectionRefused, "connection refused"),
            ));
        }
        if self.rejected_password.as_deref() == Some(config.password.as_str()) {
            return Err(DriverError::authorization(format!(
                "Access denied for user '{}'@'{}'",
                config.user, config.host
            )));
        }
        Ok(FakeConnection {
            driver: self.clone(),
        })
    }
}

pub struct FakeConnection {
    driver: FakeDriver,
}

#[async_trait]
impl DriverConnection for FakeConnection {
    type Cursor = FakeCursor;

    async fn cursor(&mut self) -> Result<FakeCursor, DriverError> {
        record(&self.driver.calls, Call::Cursor);
        if self.driver.cursor_failure {
            return Err(DriverError::other("cursor limit reached"));
        }
        Ok(FakeCursor {
            driver: self.driver.clone(),
            pending: Vec::new(),
        })
    }

    async fn commit(&mut self) -> Result<(), DriverError> {
        record(&self.driver.calls, Call::Commit);
        match self.driver.commit_failure {
            Some(category) => Err(DriverError::new(category, "commit failed")),
            None => Ok(()),
        }
    }

    async fn close(self) -> Result<(), DriverError> {
        record(&self.driver.calls, Call::CloseConnection);
        Ok(())
    }
}

pub struct FakeCursor {
    driver: FakeDriver,
    pending: Vec<Row>,
}

#[async_trait]
impl DriverCursor for FakeCursor {
    async fn execute(&mut self, sql: &str, _params: &[Param]) -> Result<(), DriverError> {
        record(&self.driver.calls, Call::Execute(sql.to_string()));
        if let Some(needle) = &self.driver.failing_sql
            && sql.contains(needle.as_str())
        {
            return Err(DriverError::statement(format!(
                "You have an error in your SQL syntax near '{needle}'"
            )));
        }
        if sql.trim_start().to_uppercase().starts_with("SELECT") {
            self.pending = self.driver.rows.clone();
        }
        Ok(())
    }

    fn fetch_all(&mut self) -> Vec<Row> {
        std::mem::take(&mut self.pending)
    }

    async fn close(self) -> Result<(), DriverError> {
        record(&self.driver.calls, Call::CloseCursor);
        Ok(())
    }
}

/// A fresh SQLite file path under the temp dir.
pub fn temp_sqlite_path(tag: &str) -> std::path::PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time before UNIX_EPOCH")
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!(
        "vsearch-{tag}-{}-{}.sqlite",
        std::process::id(),
        nanos
    ));
    path
}

/// One captured tracing event, rendered as `message key=value ...`.
#[derive(Debug, Clone)]
pub struct CapturedEvent {
    pub level: Level,
    pub text: String,
    pub fields: HashMap<String, String>,
}

#[derive(Default)]
struct FieldVisitor {
    fields: HashMap<String, String>,
}

impl Visit for FieldVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.fields
            .insert(field.name().to_string(), format!("{value:?}"));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.fields
            .insert(field.name().to_string(), value.to_string());
    }
}

/// Collects events in memory for assertions.
#[derive(Clone, Default)]
pub struct CaptureLayer {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl CaptureLayer {
    pub fn events(&self) -> Vec<CapturedEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn lines_containing(&self, needle: &str) -> Vec<CapturedEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.text.contains(needle))
            .collect()
    }
}

impl<S: Subscriber> Layer<S> for CaptureLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);

        let mut text = visitor.fields.get("message").cloned().unwrap_or_default();
        let mut keys: Vec<_> = visitor.fields.keys().filter(|k| *k != "message").collect();
        keys.sort();
        for key in keys {
            text.push_str(&format!(" {key}={}", visitor.fields[key]));
        }

        let captured = CapturedEvent {
            level: *event.metadata().level(),
            text,
            fields: visitor.fields,
        };
        self.events
            .lock()
            .map(|mut events| events.push(captured))
            .ok();
    }
}
