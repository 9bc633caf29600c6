//! Composable statement builders.
//!
//! One builder per statement kind, each with optional chained clauses. Values
//! are bound as `$n` parameters by default and can be rendered inline (escaped)
//! with [`ValueBinding::Inline`]. Identifiers go through
//! [`crate::ident::quote_ident`].
//!
//! # Usage
//!
//! ```ignore
//! use tablekit::qb::{self, SqlQb};
//! use tablekit::JoinChain;
//!
//! let q = qb::select("cars")
//!     .columns(["make", "model"])
//!     .filter("make", "ford")
//!     .order_by("model", "ASC");
//! assert_eq!(q.to_sql()?, "SELECT make,model FROM cars WHERE make = $1 ORDER BY model ASC");
//!
//! let chain = JoinChain::new().table("cars", "id").table("owners", "car_id");
//! let q = qb::join(chain).distinct("owners.name");
//!
//! let q = qb::insert("cars").set("make", "ford").set("model", "focus");
//! assert_eq!(q.to_inline_sql()?, "INSERT INTO cars (make,model) VALUES ('ford', 'focus')");
//! ```

mod delete;
mod insert;
mod param;
mod select;
mod update;


pub use delete::DeleteQb;
pub use insert::InsertQb;
pub use param::{Param, ParamList, SqlValue, ValueBinding};
pub use select::SelectQb;
pub use update::UpdateQb;

use crate::error::TableResult;
use crate::ident::{IdentQuoting, quote_ident};
use crate::table::JoinChain;
use std::fmt;
use tokio_postgres::types::ToSql;

/// Create a SELECT builder over one table.
pub fn select(table: &str) -> SelectQb {
    SelectQb::new(table)
}

/// Create a SELECT builder over a join chain.
pub fn join(chain: JoinChain) -> SelectQb {
    SelectQb::join(chain)
}

/// Create an INSERT builder.
pub fn insert(table: &str) -> InsertQb {
    InsertQb::new(table)
}

/// Create an UPDATE builder.
pub fn update(table: &str) -> UpdateQb {
    UpdateQb::new(table)
}

/// Create a DELETE builder.
pub fn delete(table: &str) -> DeleteQb {
    DeleteQb::new(table)
}

/// Rendering options shared by all builders.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Style {
    pub quoting: IdentQuoting,
    pub binding: ValueBinding,
}

impl Style {
    pub fn new(quoting: IdentQuoting, binding: ValueBinding) -> Self {
        Self { quoting, binding }
    }

    /// Same quoting, values embedded as literals.
    pub fn inline(self) -> Self {
        Self {
            binding: ValueBinding::Inline,
            ..self
        }
    }

    pub(crate) fn ident(&self, name: &str) -> String {
        quote_ident(name, self.quoting)
    }
}

/// The kind of statement a builder produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Select,
    Insert,
    Update,
    Delete,
}

impl StatementKind {
    pub fn is_write(&self) -> bool {
        !matches!(self, StatementKind::Select)
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StatementKind::Select => "SELECT",
            StatementKind::Insert => "INSERT",
            StatementKind::Update => "UPDATE",
            StatementKind::Delete => "DELETE",
        };
        f.write_str(s)
    }
}

/// SQL text plus its bound parameters.
#[derive(Debug, Clone)]
pub struct BuiltQuery {
    pub sql: String,
    pub params: ParamList,
}

impl BuiltQuery {
    pub fn new(sql: String, params: ParamList) -> Self {
        Self { sql, params }
    }

    /// Get parameters as references for tokio-postgres.
    pub fn params_ref(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.params.as_refs()
    }
}

/// Base trait for all builders.
pub trait SqlQb: Sync {
    /// Render SQL and collect parameters.
    fn build(&self, style: Style) -> TableResult<BuiltQuery>;

    /// Statement kind, used for logging and dispatch.
    fn kind(&self) -> StatementKind;

    /// SQL with `$n` placeholders.
    fn to_sql(&self) -> TableResult<String> {
        Ok(self.build(Style::default())?.sql)
    }

    /// SQL with values embedded as escaped literals.
    fn to_inline_sql(&self) -> TableResult<String> {
        Ok(self.build(Style::default().inline())?.sql)
    }
}

/// Render ` WHERE a = $1 AND b = $2`, or nothing for an empty predicate list.
pub(crate) fn push_where(
    sql: &mut String,
    predicates: &[(String, SqlValue)],
    style: Style,
    params: &mut ParamList,
) {
    if predicates.is_empty() {
        return;
    }
    sql.push_str(" WHERE ");
    for (i, (col, value)) in predicates.iter().enumerate() {
        if i > 0 {
            sql.push_str(" AND ");
        }
        sql.push_str(&style.ident(col));
        sql.push_str(" = ");
        sql.push_str(&param::render_value(value, style.binding, params));
    }
}
