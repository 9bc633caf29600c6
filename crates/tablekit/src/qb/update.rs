//! UPDATE builder.

use crate::error::{TableError, TableResult};
use crate::qb::param::{ParamList, SqlValue, render_value};
use crate::qb::{BuiltQuery, SqlQb, StatementKind, Style, push_where};
use crate::table::Predicates;

/// UPDATE builder.
///
/// An UPDATE without predicates is rejected unless [`UpdateQb::all_rows`] is set.
#[derive(Clone, Debug)]
pub struct UpdateQb {
    table: String,
    fields: Vec<(String, SqlValue)>,
    predicates: Vec<(String, SqlValue)>,
    all_rows: bool,
}

impl UpdateQb {
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            fields: Vec::new(),
            predicates: Vec::new(),
            all_rows: false,
        }
    }

    /// Add SET column = value.
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

impl SqlQb for UpdateQb {
    fn build(&self, style: Style) -> TableResult<BuiltQuery> {
        if self.fields.is_empty() {
            return Err(TableError::build(format!(
                "UPDATE {} has no SET fields",
                self.table
            )));
        }
        if self.predicates.is_empty() && !self.all_rows {
            return Err(TableError::build(format!(
                "UPDATE {} has no predicates; call all_rows() to update every row",
                self.table
            )));
        }

        let mut params = ParamList::new();
        let assignments: Vec<String> = self
            .fields
            .iter()
            .map(|(col, value)| {
                format!(
                    "{} = {}",
                    style.ident(col),
                    render_value(value, style.binding, &mut params)
                )
            })
            .collect();

        let mut sql = format!(
            "UPDATE {} SET {}",
            style.ident(&self.table),
            assignments.join(", ")
        );
        push_where(&mut sql, &self.predicates, style, &mut params);
        Ok(BuiltQuery::new(sql, params))
    }

    fn kind(&self) -> StatementKind {
        StatementKind::Update
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_basic() {
        let qb = UpdateQb::new("cars").set("model", "fiesta").filter("id", "7");
        let built = qb.build(Style::default()).unwrap();
        assert_eq!(built.sql, "UPDATE cars SET model = $1 WHERE id = $2");
        assert_eq!(built.params.len(), 2);
    }

    #[test]
    fn test_update_inline() {
        let qb = UpdateQb::new("cars")
            .set_all([("make", "ford"), ("model", "ka")])
            .filter("id", "7");
        assert_eq!(
            qb.to_inline_sql().unwrap(),
            "UPDATE cars SET make = 'ford', model = 'ka' WHERE id = '7'"
        );
    }

    #[test]
    fn test_update_requires_fields() {
        let qb = UpdateQb::new("cars").filter("id", "7");
        assert!(qb.to_sql().unwrap_err().is_build());
    }

    #[test]
    fn test_update_requires_predicates() {
        let qb = UpdateQb::new("cars").set("make", "ford");
        assert!(qb.to_sql().unwrap_err().is_build());
        assert_eq!(
            qb.all_rows().to_sql().unwrap(),
            "UPDATE cars SET make = $1"
        );
    }
}
