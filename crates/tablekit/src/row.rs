//! Decoded result rows.

use crate::error::{TableError, TableResult};
use crate::types::RawText;
use indexmap::IndexMap;
use serde::Serialize;
use tokio_postgres::types::Type;

/// One result row: column name → text value, in result order.
///
/// SQL NULL is kept as `None`. Rows are produced fresh for every read and are
/// owned by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Row {
    cells: IndexMap<String, Option<String>>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<K, I>(items: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Option<String>)>,
    {
        Self {
            cells: items.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    pub fn insert(&mut self, column: impl Into<String>, value: Option<String>) {
        self.cells.insert(column.into(), value);
    }

    /// Value of `column`; `None` if the column is missing or NULL.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.cells.get(column).and_then(|v| v.as_deref())
    }

    /// Value at position `idx`; `None` if out of range or NULL.
    pub fn get_index(&self, idx: usize) -> Option<&str> {
        self.cells.get_index(idx).and_then(|(_, v)| v.as_deref())
    }

    /// Whether `column` is present and NULL.
    pub fn is_null(&self, column: &str) -> bool {
        matches!(self.cells.get(column), Some(None))
    }

    pub fn contains(&self, column: &str) -> bool {
        self.cells.contains_key(column)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.cells.iter().map(|(k, v)| (k.as_str(), v.as_deref()))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn into_inner(self) -> IndexMap<String, Option<String>> {
        self.cells
    }

    /// Transform every cell, keeping column order.
    pub fn map_values(self, mut f: impl FnMut(Option<String>) -> Option<String>) -> Self {
        Self {
            cells: self.cells.into_iter().map(|(k, v)| (k, f(v))).collect(),
        }
    }

    /// Decode a driver row, rendering every cell as text.
    pub fn from_pg(row: &tokio_postgres::Row) -> TableResult<Self> {
        let mut cells = IndexMap::with_capacity(row.len());
        for (idx, column) in row.columns().iter().enumerate() {
            let value = decode_cell(row, idx, column.name(), column.type_())?;
            cells.insert(column.name().to_string(), value);
        }
        Ok(Self { cells })
    }
}

impl<'a> IntoIterator for &'a Row {
    type Item = (&'a String, &'a Option<String>);
    type IntoIter = indexmap::map::Iter<'a, String, Option<String>>;

    fn into_iter(self) -> Self::IntoIter {
        self.cells.iter()
    }
}

fn decode_cell(
    row: &tokio_postgres::Row,
    idx: usize,
    name: &str,
    ty: &Type,
) -> TableResult<Option<String>> {
    let err = |e: tokio_postgres::Error| TableError::decode(name, e.to_string());

    macro_rules! text {
        ($t:ty) => {
            row.try_get::<_, Option<$t>>(idx)
                .map_err(err)?
                .map(|v| v.to_string())
        };
    }

    let value = match *ty {
        Type::BOOL => row
            .try_get::<_, Option<bool>>(idx)
            .map_err(err)?
            .map(|b| if b { "t" } else { "f" }.to_string()),
        Type::INT2 => text!(i16),
        Type::INT4 => text!(i32),
        Type::INT8 => text!(i64),
        Type::OID => text!(u32),
        Type::CHAR => text!(i8),
        Type::FLOAT4 => text!(f32),
        Type::FLOAT8 => text!(f64),
        Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME | Type::UNKNOWN => text!(String),
        Type::JSON | Type::JSONB => text!(serde_json::Value),
        Type::UUID => text!(uuid::Uuid),
        Type::DATE => text!(chrono::NaiveDate),
        Type::TIME => text!(chrono::NaiveTime),
        Type::TIMESTAMP => text!(chrono::NaiveDateTime),
        Type::TIMESTAMPTZ => row
            .try_get::<_, Option<chrono::DateTime<chrono::Utc>>>(idx)
            .map_err(err)?
            .map(|v| v.to_rfc3339()),
        Type::BYTEA => row
            .try_get::<_, Option<Vec<u8>>>(idx)
            .map_err(err)?
            .map(|bytes| {
                let mut out = String::with_capacity(2 + bytes.len() * 2);
                out.push_str("\\x");
                for b in bytes {
                    out.push_str(&format!("{b:02x}"));
                }
                out
            }),
        #[cfg(feature = "rust_decimal")]
        Type::NUMERIC => text!(rust_decimal::Decimal),
        _ => row
            .try_get::<_, Option<RawText>>(idx)
            .map_err(err)?
            .map(|raw| raw.0),
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Row {
        Row::from_pairs([
            ("id", Some("7".to_string())),
            ("make", Some("ford".to_string())),
            ("note", None),
        ])
    }

    #[test]
    fn get_by_name_and_index() {
        let row = sample();
        assert_eq!(row.get("make"), Some("ford"));
        assert_eq!(row.get_index(0), Some("7"));
        assert_eq!(row.get("missing"), None);
    }

    #[test]
    fn null_is_distinct_from_missing() {
        let row = sample();
        assert!(row.is_null("note"));
        assert!(!row.is_null("missing"));
        assert!(row.contains("note"));
        assert_eq!(row.get("note"), None);
    }

    #[test]
    fn columns_keep_result_order() {
        let row = sample();
        let cols: Vec<_> = row.columns().collect();
        assert_eq!(cols, ["id", "make", "note"]);
        assert_eq!(row.len(), 3);
    }

    #[test]
    fn map_values_keeps_order() {
        let row = sample().map_values(|v| v.map(|s| s.to_uppercase()));
        let pairs: Vec<_> = row.iter().collect();
        assert_eq!(
            pairs,
            [("id", Some("7")), ("make", Some("FORD")), ("note", None)]
        );
    }

    #[test]
    fn serializes_as_object() {
        let json = serde_json::to_string(&sample()).unwrap();
        assert_eq!(json, r#"{"id":"7","make":"ford","note":null}"#);
    }
}
