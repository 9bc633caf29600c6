//! Statement execution against an injected connection.

use crate::client::Connection;
use crate::config::TableOpsConfig;
use crate::error::{TableError, TableResult};
use crate::log;
use crate::qb::{
    BuiltQuery, DeleteQb, InsertQb, SelectQb, SqlQb, SqlValue, StatementKind, UpdateQb,
    ValueBinding,
};
use crate::row::Row;
use crate::sanitize::{FieldSanitizer, Purifier, TagStripper, sanitize_row};
use crate::table::{Columns, Fields, JoinChain, OrderSpec, Predicates};
use tokio_postgres::types::ToSql;

/// Table operations over one connection and one purifier.
///
/// Every call is a single round trip. `TableOps` does no locking; share it
/// across tasks only if the connection itself tolerates concurrent use.
///
/// # Example
///
/// ```ignore
/// use tablekit::{TableOps, pairs};
///
/// let ops = TableOps::new(client);
/// ops.insert("cars", &pairs([("make", "ford"), ("model", "focus")])).await?;
/// let id = ops.fetch_last_insert_id().await;
/// let rows = ops.select_where("cars", ["make", "model"], &pairs([("make", "ford")])).await?;
/// ```
pub struct TableOps<C, P = TagStripper> {
    conn: C,
    purifier: P,
    config: TableOpsConfig,
}

impl<C: Connection> TableOps<C> {
    /// Create table operations with the default [`TagStripper`] purifier.
    pub fn new(conn: C) -> Self {
        Self::with_purifier(conn, TagStripper)
    }
}

impl<C: Connection, P: Purifier> TableOps<C, P> {
    pub fn with_purifier(conn: C, purifier: P) -> Self {
        Self {
            conn,
            purifier,
            config: TableOpsConfig::default(),
        }
    }

    pub fn with_config(mut self, config: TableOpsConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &TableOpsConfig {
        &self.config
    }

    pub fn connection(&self) -> &C {
        &self.conn
    }

    pub fn purifier(&self) -> &P {
        &self.purifier
    }

    pub fn into_inner(self) -> C {
        self.conn
    }

    // ==================== Raw statements ====================

    /// Run INSERT/UPDATE/DELETE text and return the text itself.
    pub async fn execute_write(&self, sql: &str) -> TableResult<String> {
        self.execute_inner(None, sql, &[]).await?;
        Ok(sql.to_string())
    }

    /// Run SELECT text and return its rows.
    pub async fn execute_read(&self, sql: &str) -> TableResult<Vec<Row>> {
        self.query_inner(Some(StatementKind::Select), sql, &[]).await
    }

    /// The last identifier generated in this session, or `None` if there is none.
    pub async fn fetch_last_insert_id(&self) -> Option<i64> {
        self.log(None, "SELECT lastval()", 0);
        self.conn.last_insert_id().await
    }

    // ==================== Builders ====================

    /// Run a write builder and return its SQL with values rendered inline.
    pub async fn run_write<Q: SqlQb>(&self, qb: &Q) -> TableResult<String> {
        let style = self.config.style();
        let debug_sql = qb.build(style.inline())?.sql;
        match style.binding {
            ValueBinding::Inline => {
                self.execute_inner(Some(qb.kind()), &debug_sql, &[]).await?;
            }
            ValueBinding::Bound => {
                let built = qb.build(style)?;
                self.execute_built(qb.kind(), &built).await?;
            }
        }
        Ok(debug_sql)
    }

    /// Run a SELECT builder.
    pub async fn fetch(&self, qb: &SelectQb) -> TableResult<Vec<Row>> {
        let built = qb.build(self.config.style())?;
        let params = built.params_ref();
        self.query_inner(Some(StatementKind::Select), &built.sql, &params)
            .await
    }

    /// Run the COUNT form of a SELECT builder.
    pub async fn count(&self, qb: &SelectQb) -> TableResult<i64> {
        let built = qb.build_count(self.config.style())?;
        let params = built.params_ref();
        let rows = self
            .with_timeout(self.run_query(Some(StatementKind::Select), &built.sql, &params))
            .await?;
        let value = rows.first().and_then(|row| row.get_index(0));
        value
            .and_then(|v| v.parse().ok())
            .ok_or_else(|| TableError::decode("count", format!("expected integer, got {value:?}")))
    }

    // ==================== Table operations ====================

    /// INSERT one row; values are purified then escaped.
    pub async fn insert(&self, table: &str, fields: &Fields) -> TableResult<String> {
        let values = self.sanitizer().sanitize_fields(fields);
        self.run_write(&InsertQb::new(table).set_all(values)).await
    }

    /// UPDATE rows matching `predicates`; values are purified then escaped.
    pub async fn update(
        &self,
        table: &str,
        fields: &Fields,
        predicates: &Predicates,
    ) -> TableResult<String> {
        let values = self.sanitizer().sanitize_fields(fields);
        let mut qb = UpdateQb::new(table).set_all(values);
        for (col, value) in self.predicate_values(predicates) {
            qb = qb.filter(&col, value);
        }
        self.run_write(&qb).await
    }

    /// DELETE rows matching `predicates`.
    pub async fn delete(&self, table: &str, predicates: &Predicates) -> TableResult<String> {
        let mut qb = DeleteQb::new(table);
        for (col, value) in self.predicate_values(predicates) {
            qb = qb.filter(&col, value);
        }
        self.run_write(&qb).await
    }

    /// SELECT a projection of every row.
    pub async fn select(&self, table: &str, columns: impl Into<Columns>) -> TableResult<Vec<Row>> {
        self.fetch(&SelectQb::new(table).columns(columns)).await
    }

    /// SELECT rows matching `predicates`.
    pub async fn select_where(
        &self,
        table: &str,
        columns: impl Into<Columns>,
        predicates: &Predicates,
    ) -> TableResult<Vec<Row>> {
        self.select_where_order(table, columns, predicates, &OrderSpec::new())
            .await
    }

    /// SELECT rows matching `predicates` in `ordering` order.
    pub async fn select_where_order(
        &self,
        table: &str,
        columns: impl Into<Columns>,
        predicates: &Predicates,
        ordering: &OrderSpec,
    ) -> TableResult<Vec<Row>> {
        let qb = SelectQb::new(table).columns(columns).order(ordering);
        self.fetch(&self.filtered(qb, predicates)).await
    }

    /// SELECT over a join chain.
    pub async fn select_join(
        &self,
        chain: &JoinChain,
        columns: impl Into<Columns>,
        predicates: &Predicates,
        ordering: &OrderSpec,
    ) -> TableResult<Vec<Row>> {
        let qb = SelectQb::join(chain.clone())
            .columns(columns)
            .order(ordering);
        self.fetch(&self.filtered(qb, predicates)).await
    }

    /// SELECT DISTINCT one column.
    pub async fn select_distinct(
        &self,
        table: &str,
        column: &str,
        predicates: &Predicates,
        ordering: &OrderSpec,
    ) -> TableResult<Vec<Row>> {
        let qb = SelectQb::new(table).distinct(column).order(ordering);
        self.fetch(&self.filtered(qb, predicates)).await
    }

    // ==================== Internals ====================

    fn sanitizer(&self) -> FieldSanitizer<'_, P, C> {
        FieldSanitizer::new(&self.purifier, &self.conn)
    }

    fn filtered(&self, mut qb: SelectQb, predicates: &Predicates) -> SelectQb {
        for (col, value) in self.predicate_values(predicates) {
            qb = qb.filter(&col, value);
        }
        qb
    }

    fn predicate_values(&self, predicates: &Predicates) -> Vec<(String, SqlValue)> {
        predicates
            .iter()
            .map(|(col, value)| {
                let escaped = self.conn.escape_literal(value);
                (
                    col.clone(),
                    SqlValue {
                        bound: value.clone(),
                        escaped,
                    },
                )
            })
            .collect()
    }

    fn log(&self, kind: Option<StatementKind>, sql: &str, param_count: usize) {
        if self.config.log_sql {
            log::statement(
                self.config.log_level,
                self.config.max_sql_log_length,
                kind,
                sql,
                param_count,
            );
        }
    }

    async fn execute_built(&self, kind: StatementKind, built: &BuiltQuery) -> TableResult<u64> {
        let params = built.params_ref();
        self.execute_inner(Some(kind), &built.sql, &params).await
    }

    async fn execute_inner(
        &self,
        kind: Option<StatementKind>,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> TableResult<u64> {
        self.log(kind, sql, params.len());
        let result = self.with_timeout(self.conn.execute(sql, params)).await;
        if let Err(e) = &result {
            log::failure(self.config.max_sql_log_length, sql, e);
        }
        result
    }

    async fn query_inner(
        &self,
        kind: Option<StatementKind>,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> TableResult<Vec<Row>> {
        let rows = self.with_timeout(self.run_query(kind, sql, params)).await?;
        if self.config.escape_rows {
            Ok(rows.into_iter().map(sanitize_row).collect())
        } else {
            Ok(rows)
        }
    }

    async fn run_query(
        &self,
        kind: Option<StatementKind>,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> TableResult<Vec<Row>> {
        self.log(kind, sql, params.len());
        let result = self.conn.query(sql, params).await;
        if let Err(e) = &result {
            log::failure(self.config.max_sql_log_length, sql, e);
        }
        result
    }

    async fn with_timeout<T, F>(&self, future: F) -> TableResult<T>
    where
        F: std::future::Future<Output = TableResult<T>>,
    {
        match self.config.query_timeout {
            Some(timeout) => {
                tokio::pin!(future);
                tokio::select! {
                    result = &mut future => result,
                    _ = tokio::time::sleep(timeout) => {
                        if let Some(cancel_token) = self.conn.cancel_token() {
                            tokio::spawn(async move {
                                let _ = cancel_token.cancel_query(tokio_postgres::NoTls).await;
                            });
                        }
                        let err = TableError::Timeout(timeout);
                        tracing::warn!(target: log::TARGET, error = %err, "statement timed out");
                        Err(err)
                    }
                }
            }
            None => future.await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ident::IdentQuoting;
    use crate::sanitize::NoopPurifier;
    use crate::table::pairs;
    use crate::testing::FakeConnection;
    use std::time::Duration;

    fn ops(conn: FakeConnection) -> TableOps<FakeConnection> {
        TableOps::new(conn)
    }

    #[tokio::test]
    async fn execute_write_returns_sql() {
        let conn = FakeConnection::new();
        let ops = ops(conn.clone());
        let sql = "DELETE FROM cars WHERE id = '1'";
        assert_eq!(ops.execute_write(sql).await.unwrap(), sql);
        assert_eq!(conn.executed(), vec![(sql.to_string(), 0)]);
    }

    #[tokio::test]
    async fn execute_write_surfaces_failures() {
        let conn = FakeConnection::new().fail_with("relation \"cars\" does not exist");
        let err = ops(conn).execute_write("DELETE FROM cars").await.unwrap_err();
        assert!(matches!(err, TableError::Connection(_)));
    }

    #[tokio::test]
    async fn execute_read_sanitizes_cells() {
        let conn = FakeConnection::new().with_rows(vec![Row::from_pairs([
            ("make", Some("<b>ford</b> & co".to_string())),
            ("note", None),
        ])]);
        let rows = ops(conn).execute_read("SELECT * FROM cars").await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("make"), Some("&lt;b&gt;ford&lt;/b&gt; & co"));
        assert!(rows[0].is_null("note"));
    }

    #[tokio::test]
    async fn execute_read_raw_when_escaping_disabled() {
        let conn = FakeConnection::new()
            .with_rows(vec![Row::from_pairs([("make", Some("<b>".to_string()))])]);
        let ops = ops(conn).with_config(TableOpsConfig::new().escape_rows(false));
        let rows = ops.execute_read("SELECT make FROM cars").await.unwrap();
        assert_eq!(rows[0].get("make"), Some("<b>"));
    }

    #[tokio::test]
    async fn execute_read_empty_result_is_empty_vec() {
        let rows = ops(FakeConnection::new())
            .execute_read("SELECT * FROM cars")
            .await
            .unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn last_insert_id_none_without_insert() {
        let conn = FakeConnection::new().fail_with("lastval is not yet defined in this session");
        assert_eq!(ops(conn).fetch_last_insert_id().await, None);
    }

    #[tokio::test]
    async fn last_insert_id_parses_value() {
        let conn = FakeConnection::new()
            .with_rows(vec![Row::from_pairs([("lastval", Some("42".to_string()))])]);
        assert_eq!(ops(conn).fetch_last_insert_id().await, Some(42));
    }

    #[tokio::test]
    async fn insert_purifies_binds_and_returns_inline_sql() {
        let conn = FakeConnection::new();
        let ops = ops(conn.clone());
        let debug = ops
            .insert(
                "cars",
                &pairs([("make", "<script>x()</script>ford"), ("owner", "o'neil")]),
            )
            .await
            .unwrap();
        assert_eq!(
            debug,
            "INSERT INTO cars (make,owner) VALUES ('ford', 'o''neil')"
        );
        assert_eq!(
            conn.executed(),
            vec![("INSERT INTO cars (make,owner) VALUES ($1, $2)".to_string(), 2)]
        );
    }

    #[tokio::test]
    async fn insert_inline_mode_executes_literal_sql() {
        let conn = FakeConnection::new();
        let ops = TableOps::with_purifier(conn.clone(), NoopPurifier)
            .with_config(TableOpsConfig::new().value_binding(ValueBinding::Inline));
        let debug = ops.insert("cars", &pairs([("make", "<i>x</i>")])).await.unwrap();
        assert_eq!(debug, "INSERT INTO cars (make) VALUES ('<i>x</i>')");
        assert_eq!(conn.executed(), vec![(debug, 0)]);
    }

    #[tokio::test]
    async fn update_and_delete_require_predicates() {
        let ops = ops(FakeConnection::new());
        let err = ops
            .update("cars", &pairs([("make", "ford")]), &Predicates::new())
            .await
            .unwrap_err();
        assert!(err.is_build());
        let err = ops.delete("cars", &Predicates::new()).await.unwrap_err();
        assert!(err.is_build());
    }

    #[tokio::test]
    async fn update_renders_set_and_where() {
        let conn = FakeConnection::new();
        let debug = ops(conn.clone())
            .update("cars", &pairs([("model", "ka")]), &pairs([("id", "7")]))
            .await
            .unwrap();
        assert_eq!(debug, "UPDATE cars SET model = 'ka' WHERE id = '7'");
        assert_eq!(conn.executed()[0].1, 2);
    }

    #[tokio::test]
    async fn select_where_order_builds_bound_query() {
        let conn = FakeConnection::new();
        let ops = ops(conn.clone());
        ops.select_where_order(
            "cars",
            ["make", "model"],
            &pairs([("make", "ford")]),
            &pairs([("model", "ASC")]),
        )
        .await
        .unwrap();
        assert_eq!(
            conn.queried(),
            vec![(
                "SELECT make,model FROM cars WHERE make = $1 ORDER BY model ASC".to_string(),
                1
            )]
        );
    }

    #[tokio::test]
    async fn select_join_and_distinct() {
        let conn = FakeConnection::new();
        let ops = ops(conn.clone()).with_config(
            TableOpsConfig::new().ident_quoting(IdentQuoting::Standard),
        );
        let chain = JoinChain::new().table("cars", "id").table("user", "car_id");
        ops.select_join(&chain, Columns::All, &Predicates::new(), &OrderSpec::new())
            .await
            .unwrap();
        ops.select_distinct("cars", "make", &Predicates::new(), &pairs([("make", "DESC")]))
            .await
            .unwrap();
        let queried: Vec<String> = conn.queried().into_iter().map(|(sql, _)| sql).collect();
        assert_eq!(
            queried,
            vec![
                r#"SELECT * FROM cars JOIN "user" ON "user".car_id=cars.id"#.to_string(),
                "SELECT DISTINCT make FROM cars ORDER BY make DESC".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn select_predicates_use_connection_escaping() {
        let conn = FakeConnection::new().with_escape(|v: &str| v.replace('\'', "\\'"));
        let ops = ops(conn.clone())
            .with_config(TableOpsConfig::new().value_binding(ValueBinding::Inline));
        ops.select_where("cars", Columns::All, &pairs([("owner", "o'neil")]))
            .await
            .unwrap();
        ops.select_distinct("cars", "make", &pairs([("owner", "o'neil")]), &OrderSpec::new())
            .await
            .unwrap();
        let queried: Vec<String> = conn.queried().into_iter().map(|(sql, _)| sql).collect();
        assert_eq!(
            queried,
            vec![
                r"SELECT * FROM cars WHERE owner = 'o\'neil'".to_string(),
                r"SELECT DISTINCT make FROM cars WHERE owner = 'o\'neil'".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn count_parses_first_cell() {
        let conn = FakeConnection::new()
            .with_rows(vec![Row::from_pairs([("count", Some("3".to_string()))])]);
        let n = ops(conn)
            .count(&SelectQb::new("cars").filter("make", "ford"))
            .await
            .unwrap();
        assert_eq!(n, 3);
    }

    #[tokio::test]
    async fn timeout_is_opt_in() {
        let conn = FakeConnection::new().with_delay(Duration::from_millis(200));
        let ops = ops(conn)
            .with_config(TableOpsConfig::new().query_timeout(Duration::from_millis(10)));
        let err = ops.execute_read("SELECT 1").await.unwrap_err();
        assert!(err.is_timeout());
    }
}
