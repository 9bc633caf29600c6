//! SELECT builder over a table or a join chain.

use crate::error::{TableError, TableResult};
use crate::ident::quote_list;
use crate::qb::param::{ParamList, SqlValue};
use crate::qb::{BuiltQuery, SqlQb, StatementKind, Style, push_where};
use crate::table::{Columns, JoinChain, OrderSpec, Predicates};

#[derive(Clone, Debug)]
enum Source {
    Table(String),
    Join(JoinChain),
}

/// SELECT builder with equality predicates, ordering and pagination.
#[derive(Clone, Debug)]
pub struct SelectQb {
    source: Source,
    columns: Columns,
    distinct: Option<String>,
    predicates: Vec<(String, SqlValue)>,
    ordering: Vec<(String, String)>,
    limit: Option<i64>,
    offset: Option<i64>,
}

impl SelectQb {
    /// Create a SELECT builder for a table (all columns).
    pub fn new(table: &str) -> Self {
        Self::with_source(Source::Table(table.to_string()))
    }

    /// Create a SELECT builder over a join chain (all columns).
    pub fn join(chain: JoinChain) -> Self {
        Self::with_source(Source::Join(chain))
    }

    fn with_source(source: Source) -> Self {
        Self {
            source,
            columns: Columns::All,
            distinct: None,
            predicates: Vec::new(),
            ordering: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    // ==================== Projection ====================

    /// Set the column projection.
    pub fn columns(mut self, columns: impl Into<Columns>) -> Self {
        self.columns = columns.into();
        self
    }

    /// Project `SELECT DISTINCT <column>` instead of the column list.
    pub fn distinct(mut self, column: &str) -> Self {
        self.distinct = Some(column.to_string());
        self
    }

    // ==================== WHERE ====================

    /// Add WHERE: column = value
    pub fn filter(mut self, column: &str, value: impl Into<SqlValue>) -> Self {
        self.predicates.push((column.to_string(), value.into()));
        self
    }

    /// Add every entry of a predicate set, in order.
    pub fn filters(mut self, predicates: &Predicates) -> Self {
        for (col, value) in predicates {
            self.predicates.push((col.clone(), SqlValue::text(value.as_str())));
        }
        self
    }

    // ==================== Ordering & pagination ====================

    /// Add ORDER BY column with direction `ASC` or `DESC`.
    pub fn order_by(mut self, column: &str, direction: &str) -> Self {
        self.ordering.push((column.to_string(), direction.to_string()));
        self
    }

    /// Add every entry of an ordering spec, in order.
    pub fn order(mut self, spec: &OrderSpec) -> Self {
        for (col, dir) in spec {
            self.ordering.push((col.clone(), dir.clone()));
        }
        self
    }

    pub fn limit(mut self, n: i64) -> Self {
        self.limit = Some(n);
        self
    }

    pub fn offset(mut self, n: i64) -> Self {
        self.offset = Some(n);
        self
    }

    // ==================== Build helpers ====================

    fn push_from(&self, sql: &mut String, style: Style) -> TableResult<()> {
        sql.push_str(" FROM ");
        match &self.source {
            Source::Table(table) => sql.push_str(&style.ident(table)),
            Source::Join(chain) => {
                let steps = chain.steps()?;
                sql.push_str(&style.ident(chain.root().unwrap_or_default()));
                for step in steps {
                    let table = style.ident(&step.table);
                    sql.push_str(&format!(
                        " JOIN {} ON {}.{}={}.{}",
                        table,
                        table,
                        style.ident(&step.column),
                        style.ident(&step.main_table),
                        style.ident(&step.main_column),
                    ));
                }
            }
        }
        Ok(())
    }

    fn push_order(&self, sql: &mut String, style: Style) -> TableResult<()> {
        if self.ordering.is_empty() {
            return Ok(());
        }
        let mut items = Vec::with_capacity(self.ordering.len());
        for (col, dir) in &self.ordering {
            let dir = normalize_direction(dir)?;
            items.push(format!("{} {}", style.ident(col), dir));
        }
        sql.push_str(" ORDER BY ");
        sql.push_str(&items.join(", "));
        Ok(())
    }

    fn projection(&self, style: Style) -> TableResult<String> {
        if let Some(col) = &self.distinct {
            return Ok(format!("DISTINCT {}", style.ident(col)));
        }
        let cols = self.columns.resolve()?;
        if cols.is_empty() {
            return Ok("*".to_string());
        }
        Ok(quote_list(cols, ",", style.quoting))
    }

    /// Build the `SELECT COUNT(*)` form of this query (no ordering or pagination).
    ///
    /// A DISTINCT query counts distinct values: `SELECT COUNT(DISTINCT col)`.
    pub fn build_count(&self, style: Style) -> TableResult<BuiltQuery> {
        let mut params = ParamList::new();
        let mut sql = match &self.distinct {
            Some(col) => format!("SELECT COUNT(DISTINCT {})", style.ident(col)),
            None => String::from("SELECT COUNT(*)"),
        };
        self.push_from(&mut sql, style)?;
        push_where(&mut sql, &self.predicates, style, &mut params);
        Ok(BuiltQuery::new(sql, params))
    }
}

fn normalize_direction(dir: &str) -> TableResult<&'static str> {
    match dir.trim().to_ascii_uppercase().as_str() {
        "ASC" => Ok("ASC"),
        "DESC" => Ok("DESC"),
        other => Err(TableError::build(format!(
            "invalid ORDER BY direction: {other:?}"
        ))),
    }
}

impl SqlQb for SelectQb {
    fn build(&self, style: Style) -> TableResult<BuiltQuery> {
        let mut params = ParamList::new();
        let mut sql = format!("SELECT {}", self.projection(style)?);
        self.push_from(&mut sql, style)?;
        push_where(&mut sql, &self.predicates, style, &mut params);
        self.push_order(&mut sql, style)?;
        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }
        if let Some(offset) = self.offset {
            sql.push_str(&format!(" OFFSET {}", offset));
        }
        Ok(BuiltQuery::new(sql, params))
    }

    fn kind(&self) -> StatementKind {
        StatementKind::Select
    }
}
