//! In-memory connection used by unit tests.

use crate::client::Connection;
use crate::error::{TableError, TableResult};
use crate::row::Row;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_postgres::types::ToSql;

#[derive(Default)]
struct State {
    rows: Vec<Row>,
    failure: Option<String>,
    delay: Option<Duration>,
    escape: Option<fn(&str) -> String>,
    executed: Vec<(String, usize)>,
    queried: Vec<(String, usize)>,
}

/// Records every statement and answers with canned rows or a canned failure.
#[derive(Clone, Default)]
pub(crate) struct FakeConnection {
    state: Arc<Mutex<State>>,
}

impl FakeConnection {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_rows(self, rows: Vec<Row>) -> Self {
        self.lock().rows = rows;
        self
    }

    pub(crate) fn fail_with(self, message: &str) -> Self {
        self.lock().failure = Some(message.to_string());
        self
    }

    pub(crate) fn with_delay(self, delay: Duration) -> Self {
        self.lock().delay = Some(delay);
        self
    }

    /// Replace the default literal escaping.
    pub(crate) fn with_escape(self, escape: fn(&str) -> String) -> Self {
        self.lock().escape = Some(escape);
        self
    }

    /// `(sql, param_count)` for every `execute` call.
    pub(crate) fn executed(&self) -> Vec<(String, usize)> {
        self.lock().executed.clone()
    }

    /// `(sql, param_count)` for every `query` call.
    pub(crate) fn queried(&self) -> Vec<(String, usize)> {
        self.lock().queried.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    async fn respond(&self) -> TableResult<()> {
        let (delay, failure) = {
            let state = self.lock();
            (state.delay, state.failure.clone())
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        match failure {
            Some(message) => Err(TableError::Connection(message)),
            None => Ok(()),
        }
    }
}

impl Connection for FakeConnection {
    async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> TableResult<Vec<Row>> {
        self.lock().queried.push((sql.to_string(), params.len()));
        self.respond().await?;
        Ok(self.lock().rows.clone())
    }

    async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> TableResult<u64> {
        self.lock().executed.push((sql.to_string(), params.len()));
        self.respond().await?;
        Ok(1)
    }

    fn escape_literal(&self, value: &str) -> String {
        match self.lock().escape {
            Some(escape) => escape(value),
            None => crate::sanitize::escape_literal(value),
        }
    }
}
