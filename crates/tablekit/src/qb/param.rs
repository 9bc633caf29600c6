//! Parameter storage and value rendering.

use crate::sanitize::escape_literal;
use crate::types::TextValue;
use std::sync::Arc;
use tokio_postgres::types::ToSql;

/// A clone-friendly parameter wrapper using Arc.
#[derive(Clone)]
pub struct Param(pub(crate) Arc<dyn ToSql + Send + Sync>);

impl Param {
    /// Create a new parameter from any ToSql value.
    pub fn new<T: ToSql + Send + Sync + 'static>(value: T) -> Self {
        Param(Arc::new(value))
    }

    /// Get a reference to the inner value as a ToSql trait object.
    pub fn as_ref(&self) -> &(dyn ToSql + Sync) {
        &*self.0 as &(dyn ToSql + Sync)
    }
}

impl std::fmt::Debug for Param {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Param").field(&"<dyn ToSql>").finish()
    }
}

/// A collection of parameters that can be built into references.
#[derive(Clone, Debug, Default)]
pub struct ParamList {
    params: Vec<Param>,
}

impl ParamList {
    pub fn new() -> Self {
        Self { params: Vec::new() }
    }

    /// Add a parameter and return its 1-based index.
    pub fn push<T: ToSql + Send + Sync + 'static>(&mut self, value: T) -> usize {
        self.params.push(Param::new(value));
        self.params.len()
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Get all parameters as references for tokio-postgres.
    pub fn as_refs(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.params.iter().map(|p| p.as_ref()).collect()
    }
}

/// A value carried by the builders, in both of its renderable forms.
///
/// `bound` is what gets sent as a parameter; `escaped` is what gets embedded
/// between single quotes when SQL is rendered inline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlValue {
    pub bound: String,
    pub escaped: String,
}

impl SqlValue {
    /// A raw value, escaped with the PostgreSQL literal rules.
    pub fn text(value: impl Into<String>) -> Self {
        let bound = value.into();
        let escaped = escape_literal(&bound);
        Self { bound, escaped }
    }

    /// The escaped value wrapped in single quotes.
    ///
    /// Values containing a backslash use the `E'...'` form, so the doubled
    /// backslashes in `escaped` read back as one regardless of
    /// `standard_conforming_strings`.
    pub fn literal(&self) -> String {
        if self.bound.contains('\\') {
            format!("E'{}'", self.escaped)
        } else {
            format!("'{}'", self.escaped)
        }
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::text(value)
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::text(value)
    }
}

impl From<&String> for SqlValue {
    fn from(value: &String) -> Self {
        SqlValue::text(value.as_str())
    }
}

/// How values reach the server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ValueBinding {
    /// `$1, $2, ...` placeholders with values sent as parameters.
    #[default]
    Bound,
    /// Escaped values embedded as quoted literals (`E'...'` when the value
    /// contains a backslash).
    Inline,
}

/// Push `value` in the requested binding mode and return its SQL text.
pub(crate) fn render_value(value: &SqlValue, binding: ValueBinding, params: &mut ParamList) -> String {
    match binding {
        ValueBinding::Bound => {
            let idx = params.push(TextValue::new(value.bound.clone()));
            format!("${idx}")
        }
        ValueBinding::Inline => value.literal(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_value_is_escaped_for_literals() {
        let v = SqlValue::text("o'neil");
        assert_eq!(v.bound, "o'neil");
        assert_eq!(v.literal(), "'o''neil'");
    }

    #[test]
    fn backslash_values_use_escape_string_syntax() {
        let v = SqlValue::text(r"C:\tmp");
        assert_eq!(v.escaped, r"C:\\tmp");
        assert_eq!(v.literal(), r"E'C:\\tmp'");

        let mut params = ParamList::new();
        let sql = render_value(&v, ValueBinding::Inline, &mut params);
        assert_eq!(sql, r"E'C:\\tmp'");
    }

    #[test]
    fn render_bound_numbers_placeholders() {
        let mut params = ParamList::new();
        let a = render_value(&"x".into(), ValueBinding::Bound, &mut params);
        let b = render_value(&"y".into(), ValueBinding::Bound, &mut params);
        assert_eq!((a.as_str(), b.as_str()), ("$1", "$2"));
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn render_inline_pushes_nothing() {
        let mut params = ParamList::new();
        let sql = render_value(&"x".into(), ValueBinding::Inline, &mut params);
        assert_eq!(sql, "'x'");
        assert!(params.is_empty());
    }
}
