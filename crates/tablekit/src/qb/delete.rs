//! DELETE builder.

use crate::error::{TableError, TableResult};
use crate::qb::param::{ParamList, SqlValue};
use crate::qb::{BuiltQuery, SqlQb, StatementKind, Style, push_where};
use crate::table::Predicates;

/// DELETE builder.
///
/// A DELETE without predicates is rejected unless [`DeleteQb::all_rows`] is set.
#[derive(Clone, Debug)]
pub struct DeleteQb {
    table: String,
    predicates: Vec<(String, SqlValue)>,
    all_rows: bool,
}

impl DeleteQb {
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            predicates: Vec::new(),
            all_rows: false,
        }
    }

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

    /// Allow the statement to run without a WHERE clause.
    pub fn all_rows(mut self) -> Self {
        self.all_rows = true;
        self
    }
}

impl SqlQb for DeleteQb {
    fn build(&self, style: Style) -> TableResult<BuiltQuery> {
        if self.predicates.is_empty() && !self.all_rows {
            return Err(TableError::build(format!(
                "DELETE FROM {} has no predicates; call all_rows() to delete every row",
                self.table
            )));
        }
        let mut params = ParamList::new();
        let mut sql = format!("DELETE FROM {}", style.ident(&self.table));
        push_where(&mut sql, &self.predicates, style, &mut params);
        Ok(BuiltQuery::new(sql, params))
    }

    fn kind(&self) -> StatementKind {
        StatementKind::Delete
    }
}
