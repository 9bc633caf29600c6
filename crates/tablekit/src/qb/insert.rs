//! INSERT builder.

use crate::error::{TableError, TableResult};
use crate::ident::quote_list;
use crate::qb::param::{ParamList, SqlValue, render_value};
use crate::qb::{BuiltQuery, SqlQb, StatementKind, Style};

/// INSERT builder for a single row.
#[derive(Clone, Debug)]
pub struct InsertQb {
    table: String,
    fields: Vec<(String, SqlValue)>,
    returning: Vec<String>,
}

impl InsertQb {
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            fields: Vec::new(),
            returning: Vec::new(),
        }
    }

    /// Set a column value.
    pub fn set(mut self, column: &str, value: impl Into<SqlValue>) -> Self {
        self.fields.push((column.to_string(), value.into()));
        self
    }

    /// Set many column values, in order.
    pub fn set_all<K, V>(mut self, fields: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<SqlValue>,
    {
        for (col, value) in fields {
            self.fields.push((col.into(), value.into()));
        }
        self
    }

    /// Add a RETURNING clause.
    pub fn returning(mut self, columns: &[&str]) -> Self {
        self.returning = columns.iter().map(|c| c.to_string()).collect();
        self
    }
}

impl SqlQb for InsertQb {
    fn build(&self, style: Style) -> TableResult<BuiltQuery> {
        if self.fields.is_empty() {
            return Err(TableError::build(format!(
                "INSERT into {} has no values",
                self.table
            )));
        }

        let mut params = ParamList::new();
        let columns: Vec<&str> = self.fields.iter().map(|(c, _)| c.as_str()).collect();
        let values: Vec<String> = self
            .fields
            .iter()
            .map(|(_, v)| render_value(v, style.binding, &mut params))
            .collect();

        let mut sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            style.ident(&self.table),
            quote_list(&columns, ",", style.quoting),
            values.join(", ")
        );
        if !self.returning.is_empty() {
            sql.push_str(" RETURNING ");
            sql.push_str(&quote_list(&self.returning, ", ", style.quoting));
        }
        Ok(BuiltQuery::new(sql, params))
    }

    fn kind(&self) -> StatementKind {
        StatementKind::Insert
    }
}
