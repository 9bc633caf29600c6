//! Inline SQL fragments.
//!
//! These functions compose SQL text by concatenation and quote identifiers with
//! [`escape_identifier_or_literal`]. They are pure and side-effect free.
//!
//! **WHERE values are inlined verbatim.** [`build_where`] wraps each value in
//! single quotes without escaping it (beyond the reserved-word rule shared
//! with identifiers), so values must already have gone through
//! [`crate::sanitize::FieldSanitizer`] or come from a trusted source. The
//! builders in [`crate::qb`] bind values as parameters instead.
//!
//! # Example
//! ```ignore
//! use tablekit::fragment::{build_select, build_where, build_order_by};
//! use tablekit::pairs;
//!
//! let sql = build_select("cars", &["make", "model"])?;
//! let sql = build_where(&sql, &pairs([("make", "ford")]));
//! let sql = build_order_by(&sql, &pairs([("model", "ASC")]));
//! assert_eq!(sql, "SELECT make,model FROM cars WHERE make = 'ford' ORDER BY model ASC");
//! ```

use crate::error::{TableError, TableResult};
use crate::reserved::escape_identifier_or_literal;
use crate::table::{JoinChain, OrderSpec, Predicates};

fn projection<S: AsRef<str>>(columns: &[S]) -> TableResult<String> {
    if columns.is_empty() {
        return Err(TableError::build("column list cannot be empty"));
    }
    if columns.len() == 1 && columns[0].as_ref() == "*" {
        return Ok("*".to_string());
    }
    Ok(columns
        .iter()
        .map(|c| escape_identifier_or_literal(c.as_ref()))
        .collect::<Vec<_>>()
        .join(","))
}

/// `SELECT <col1>,<col2>,... FROM <table>`
pub fn build_select<S: AsRef<str>>(table: &str, columns: &[S]) -> TableResult<String> {
    let cols = projection(columns)?;
    Ok(format!(
        "SELECT {} FROM {}",
        cols,
        escape_identifier_or_literal(table)
    ))
}

/// `SELECT COUNT(*) FROM <table>`
pub fn build_count(table: &str) -> String {
    format!("SELECT COUNT(*) FROM {}", escape_identifier_or_literal(table))
}

/// Append ` WHERE <col> = '<value>' AND ...`; appends nothing for an empty set.
///
/// Values go through the same reserved-word rule as columns, so a value that
/// is itself a keyword ends up quoted twice: `status = ''order''`.
pub fn build_where(base_sql: &str, predicates: &Predicates) -> String {
    if predicates.is_empty() {
        return base_sql.to_string();
    }
    let conditions: Vec<String> = predicates
        .iter()
        .map(|(col, value)| {
            format!(
                "{} = '{}'",
                escape_identifier_or_literal(col),
                escape_identifier_or_literal(value)
            )
        })
        .collect();
    format!("{} WHERE {}", base_sql, conditions.join(" AND "))
}

/// Append ` ORDER BY <col> <DIR>, ...`; appends nothing for an empty spec.
///
/// Direction tokens are passed through unchanged.
pub fn build_order_by(base_sql: &str, ordering: &OrderSpec) -> String {
    if ordering.is_empty() {
        return base_sql.to_string();
    }
    let items: Vec<String> = ordering
        .iter()
        .map(|(col, dir)| format!("{} {}", escape_identifier_or_literal(col), dir))
        .collect();
    format!("{} ORDER BY {}", base_sql, items.join(", "))
}

/// `SELECT <columns> FROM <main> JOIN <t> ON <t>.<col>=<main>.<main_col> ...`
pub fn build_join<S: AsRef<str>>(chain: &JoinChain, columns: &[S]) -> TableResult<String> {
    let cols = projection(columns)?;
    let steps = chain.steps()?;
    let root = chain.root().unwrap_or_default();

    let mut sql = format!("SELECT {} FROM {}", cols, escape_identifier_or_literal(root));
    for step in &steps {
        let table = escape_identifier_or_literal(&step.table);
        sql.push_str(&format!(
            " JOIN {} ON {}.{}={}.{}",
            table,
            table,
            escape_identifier_or_literal(&step.column),
            escape_identifier_or_literal(&step.main_table),
            escape_identifier_or_literal(&step.main_column),
        ));
    }
    Ok(sql)
}

/// `SELECT DISTINCT <column> FROM <table>`
pub fn build_distinct(table: &str, column: &str) -> String {
    format!(
        "SELECT DISTINCT {} FROM {}",
        escape_identifier_or_literal(column),
        escape_identifier_or_literal(table)
    )
}

/// Turn join-built SQL into a DISTINCT projection by replacing its `SELECT *` prefix.
///
/// SQL that does not start with `SELECT *` is returned unchanged.
pub fn distinct_join(join_sql: &str, column: &str) -> String {
    match join_sql.strip_prefix("SELECT *") {
        Some(rest) => format!(
            "SELECT DISTINCT {}{}",
            escape_identifier_or_literal(column),
            rest
        ),
        None => join_sql.to_string(),
    }
}
