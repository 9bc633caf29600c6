//! The relational connection capability consumed by table operations.

use crate::error::{TableError, TableResult};
use crate::row::Row;
use tokio_postgres::types::ToSql;

/// A trait over database clients and transactions.
///
/// Table operations only need four things from a connection: run a statement,
/// run a query and decode its rows, escape a string for literal embedding, and
/// report the last generated identifier. Implementations exist for
/// `tokio_postgres::Client`, `tokio_postgres::Transaction` and (with the
/// `pool` feature) `deadpool_postgres::Client`.
pub trait Connection: Send + Sync {
    /// Execute a query and return all rows decoded as text.
    fn query(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl std::future::Future<Output = TableResult<Vec<Row>>> + Send;

    /// Execute a statement and return the number of affected rows.
    fn execute(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl std::future::Future<Output = TableResult<u64>> + Send;

    /// Escape a string so it can be embedded between single quotes.
    ///
    /// The default is [`crate::sanitize::escape_literal`], which doubles single
    /// quotes and backslashes. Overrides must double backslashes too: inline
    /// rendering switches to `E'...'` for any value containing one.
    fn escape_literal(&self, value: &str) -> String {
        crate::sanitize::escape_literal(value)
    }

    /// The last identifier generated by a sequence in this session.
    ///
    /// Issues `SELECT lastval()`; any failure (including "lastval is not yet
    /// defined in this session") yields `None`.
    fn last_insert_id(&self) -> impl std::future::Future<Output = Option<i64>> + Send {
        async move {
            let rows = self.query("SELECT lastval()", &[]).await.ok()?;
            rows.first()?.get_index(0)?.parse().ok()
        }
    }

    /// Return a cancellation token for the underlying connection, if supported.
    fn cancel_token(&self) -> Option<tokio_postgres::CancelToken> {
        None
    }
}

/// Open a single `NoTls` connection and drive it on a background task.
///
/// The returned client implements [`Connection`]. The background task ends
/// when the client is dropped.
pub async fn connect(database_url: &str) -> TableResult<tokio_postgres::Client> {
    let (client, connection) = tokio_postgres::connect(database_url, tokio_postgres::NoTls)
        .await
        .map_err(|e| TableError::Connection(e.to_string()))?;
    tokio::spawn(async move {
        if let Err(e) = connection.await {
            tracing::warn!(target: crate::log::TARGET, error = %e, "connection closed with error");
        }
    });
    Ok(client)
}

fn decode_rows(rows: Vec<tokio_postgres::Row>) -> TableResult<Vec<Row>> {
    rows.iter().map(Row::from_pg).collect()
}

impl Connection for tokio_postgres::Client {
    async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> TableResult<Vec<Row>> {
        let rows = tokio_postgres::Client::query(self, sql, params)
            .await
            .map_err(TableError::from)?;
        decode_rows(rows)
    }

    async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> TableResult<u64> {
        tokio_postgres::Client::execute(self, sql, params)
            .await
            .map_err(TableError::from)
    }

    fn cancel_token(&self) -> Option<tokio_postgres::CancelToken> {
        Some(tokio_postgres::Client::cancel_token(self))
    }
}

impl Connection for tokio_postgres::Transaction<'_> {
    async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> TableResult<Vec<Row>> {
        let rows = tokio_postgres::Transaction::query(self, sql, params)
            .await
            .map_err(TableError::from)?;
        decode_rows(rows)
    }

    async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> TableResult<u64> {
        tokio_postgres::Transaction::execute(self, sql, params)
            .await
            .map_err(TableError::from)
    }

    fn cancel_token(&self) -> Option<tokio_postgres::CancelToken> {
        Some(tokio_postgres::Transaction::cancel_token(self))
    }
}

#[cfg(feature = "pool")]
impl Connection for deadpool_postgres::Client {
    async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> TableResult<Vec<Row>> {
        let client: &tokio_postgres::Client = self;
        Connection::query(client, sql, params).await
    }

    async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> TableResult<u64> {
        let client: &tokio_postgres::Client = self;
        Connection::execute(client, sql, params).await
    }

    fn cancel_token(&self) -> Option<tokio_postgres::CancelToken> {
        let client: &tokio_postgres::Client = self;
        Connection::cancel_token(client)
    }
}

impl<C: Connection> Connection for &C {
    fn query(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl std::future::Future<Output = TableResult<Vec<Row>>> + Send {
        (**self).query(sql, params)
    }

    fn execute(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl std::future::Future<Output = TableResult<u64>> + Send {
        (**self).execute(sql, params)
    }

    fn escape_literal(&self, value: &str) -> String {
        (**self).escape_literal(value)
    }

    fn last_insert_id(&self) -> impl std::future::Future<Output = Option<i64>> + Send {
        (**self).last_insert_id()
    }

    fn cancel_token(&self) -> Option<tokio_postgres::CancelToken> {
        (**self).cancel_token()
    }
}
