//! Table-operation inputs: projections, predicate sets, ordering specs, field
//! sets and join chains.

use crate::error::{TableError, TableResult};
use indexmap::IndexMap;

/// Ordered column → equality value conditions, combined with AND.
pub type Predicates = IndexMap<String, String>;

/// Ordered column → direction token (`ASC` / `DESC`).
pub type OrderSpec = IndexMap<String, String>;

/// Ordered column → value pairs for INSERT and UPDATE.
pub type Fields = IndexMap<String, String>;

/// Build an ordered string map from pairs.
///
/// ```ignore
/// let preds = tablekit::pairs([("make", "ford"), ("model", "focus")]);
/// ```
pub fn pairs<K, V, I>(items: I) -> IndexMap<String, String>
where
    K: Into<String>,
    V: Into<String>,
    I: IntoIterator<Item = (K, V)>,
{
    items
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

/// A column projection: either every column or an explicit ordered list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Columns {
    #[default]
    All,
    List(Vec<String>),
}

impl Columns {
    pub fn list<S: Into<String>>(cols: impl IntoIterator<Item = S>) -> Self {
        Columns::List(cols.into_iter().map(Into::into).collect())
    }

    /// Normalize the projection: a single `*` element means all columns.
    ///
    /// An empty list cannot be rendered and is rejected.
    pub fn resolve(&self) -> TableResult<&[String]> {
        match self {
            Columns::All => Ok(&[]),
            Columns::List(cols) if cols.is_empty() => {
                Err(TableError::build("column list cannot be empty"))
            }
            Columns::List(cols) if cols.len() == 1 && cols[0] == "*" => Ok(&[]),
            Columns::List(cols) => Ok(cols),
        }
    }
}

impl<S: Into<String>> From<Vec<S>> for Columns {
    fn from(cols: Vec<S>) -> Self {
        Columns::list(cols)
    }
}

impl<S: Into<String> + Clone> From<&[S]> for Columns {
    fn from(cols: &[S]) -> Self {
        Columns::list(cols.iter().cloned())
    }
}

impl<S: Into<String>, const N: usize> From<[S; N]> for Columns {
    fn from(cols: [S; N]) -> Self {
        Columns::list(cols)
    }
}

/// One equality join: `JOIN <table> ON <table>.<column>=<main>.<main_column>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinStep {
    pub table: String,
    pub column: String,
    pub main_table: String,
    pub main_column: String,
}

/// Ordered tables joined by equality against a shifting main table.
///
/// The first table is the initial main table and its column is the join key
/// later tables compare against. A table listed in the switch map becomes the
/// main table (with the switch column as key) once it has been joined.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JoinChain {
    tables: IndexMap<String, String>,
    switch: IndexMap<String, String>,
}

impl JoinChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a chain from an ordered table → column map.
    pub fn from_map(tables: IndexMap<String, String>) -> Self {
        Self {
            tables,
            switch: IndexMap::new(),
        }
    }

    /// Append a table and its join column.
    pub fn table(mut self, table: impl Into<String>, column: impl Into<String>) -> Self {
        self.tables.insert(table.into(), column.into());
        self
    }

    /// Make `table` the main table for joins after it, keyed on `column`.
    pub fn switch_to(mut self, table: impl Into<String>, column: impl Into<String>) -> Self {
        self.switch.insert(table.into(), column.into());
        self
    }

    /// Replace the whole switch map.
    pub fn with_switch(mut self, switch: IndexMap<String, String>) -> Self {
        self.switch = switch;
        self
    }

    /// The initial main table.
    pub fn root(&self) -> Option<&str> {
        self.tables.keys().next().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Resolve the chain into join steps in order.
    pub fn steps(&self) -> TableResult<Vec<JoinStep>> {
        if self.tables.len() < 2 {
            return Err(TableError::build(
                "join chain needs a main table and at least one joined table",
            ));
        }

        let mut iter = self.tables.iter();
        let Some((first_table, first_column)) = iter.next() else {
            return Err(TableError::build("join chain is empty"));
        };
        let mut main_table = first_table.as_str();
        let mut main_column = first_column.as_str();

        let mut steps = Vec::with_capacity(self.tables.len() - 1);
        for (table, column) in iter {
            steps.push(JoinStep {
                table: table.clone(),
                column: column.clone(),
                main_table: main_table.to_string(),
                main_column: main_column.to_string(),
            });
            if let Some(switch_column) = self.switch.get(table) {
                main_table = table.as_str();
                main_column = switch_column.as_str();
            }
        }
        Ok(steps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn columns_wildcard_resolves_to_all() {
        assert!(Columns::All.resolve().unwrap().is_empty());
        assert!(Columns::from(["*"]).resolve().unwrap().is_empty());
    }

    #[test]
    fn columns_empty_list_is_rejected() {
        let cols = Columns::List(Vec::new());
        assert!(cols.resolve().unwrap_err().is_build());
    }

    #[test]
    fn pairs_keep_insertion_order() {
        let map = pairs([("z", "1"), ("a", "2"), ("m", "3")]);
        let keys: Vec<_> = map.keys().map(String::as_str).collect();
        assert_eq!(keys, ["z", "a", "m"]);
    }

    #[test]
    fn chain_joins_against_root_by_default() {
        let chain = JoinChain::new()
            .table("cars", "id")
            .table("owners", "car_id")
            .table("services", "car_id");
        let steps = chain.steps().unwrap();
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].main_table, "cars");
        assert_eq!(steps[1].main_table, "cars");
        assert_eq!(steps[1].main_column, "id");
    }

    #[test]
    fn chain_switch_rebinds_main_table() {
        let chain = JoinChain::new()
            .table("cars", "id")
            .table("owners", "car_id")
            .table("addresses", "owner_id")
            .switch_to("owners", "id");
        let steps = chain.steps().unwrap();
        assert_eq!(steps[0].main_table, "cars");
        assert_eq!(steps[1].table, "addresses");
        assert_eq!(steps[1].main_table, "owners");
        assert_eq!(steps[1].main_column, "id");
    }

    #[test]
    fn chain_switch_on_root_is_ignored() {
        let chain = JoinChain::new()
            .table("cars", "id")
            .table("owners", "car_id")
            .switch_to("cars", "vin");
        let steps = chain.steps().unwrap();
        assert_eq!(steps[0].main_column, "id");
    }

    #[test]
    fn chain_needs_two_tables() {
        let chain = JoinChain::new().table("cars", "id");
        assert!(chain.steps().unwrap_err().is_build());
        assert!(JoinChain::new().steps().is_err());
    }
}
