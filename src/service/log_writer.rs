use crate::db::config::SessionConfig;
use crate::db::driver::Driver;
use crate::db::models::{LogColumns, LogRecord};
use crate::db::request_log::RequestLogStore;
use crate::error::DbError;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::instrument::WithSubscriber;
use tracing::{debug, error};

/// Writes one request log row per completed search, off the request path.
pub struct LogWriter<D: Driver> {
    store: RequestLogStore<D>,
    simulated_latency: Option<Duration>,
}

impl<D: Driver> Clone for LogWriter<D> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            simulated_latency: self.simulated_latency,
        }
    }
}

impl<D: Driver> LogWriter<D> {
    pub fn new(driver: Arc<D>, config: Arc<SessionConfig>, columns: LogColumns) -> Self {
        Self::from_store(RequestLogStore::new(driver, config, columns))
    }

    pub fn from_store(store: RequestLogStore<D>) -> Self {
        Self {
            store,
            simulated_latency: None,
        }
    }

    /// Sleep before every write, to reproduce a slow database.
    pub fn with_simulated_latency(mut self, latency: Duration) -> Self {
        self.simulated_latency = Some(latency).filter(|d| !d.is_zero());
        self
    }

    pub fn columns(&self) -> LogColumns {
        self.store.columns()
    }

    /// Persist `record` and report the classified outcome.
    pub async fn write(&self, record: LogRecord) -> Result<(), DbError> {
        if let Some(latency) = self.simulated_latency {
            tokio::time::sleep(latency).await;
        }
        self.store.insert(record).await
    }

    /// Start `write` on its own task and return immediately.
    ///
    /// Failures end here: each one becomes a single `error!` event with its
    /// kind and cause. The task never panics on a database failure.
    pub fn spawn(&self, record: LogRecord) -> JoinHandle<()> {
        let writer = self.clone();
        tokio::spawn(
            async move {
                let phrase_len = record.phrase.len();
                match writer.write(record).await {
                    Ok(()) => debug!(phrase_len, "request logged"),
                    Err(e) => error!(
                        kind = %e.kind(),
                        cause = %e.driver_error(),
                        "request log write failed: {e}"
                    ),
                }
            }
            .with_current_subscriber(),
        )
    }
}
