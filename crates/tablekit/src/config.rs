//! Executor configuration.

use crate::ident::IdentQuoting;
use crate::qb::{Style, ValueBinding};
use std::time::Duration;
use tracing::Level;

/// Configuration for [`crate::TableOps`].
#[derive(Debug, Clone)]
pub struct TableOpsConfig {
    /// How reserved identifiers are quoted.
    pub ident_quoting: IdentQuoting,
    /// Whether values are bound as parameters or embedded as literals.
    pub value_binding: ValueBinding,
    /// Whether returned cells are HTML-escaped for display.
    pub escape_rows: bool,
    /// Query timeout duration. No timeout unless set.
    pub query_timeout: Option<Duration>,
    /// Whether to emit a tracing event for every statement.
    pub log_sql: bool,
    /// Tracing level for statement events.
    pub log_level: Level,
    /// Truncate logged SQL to this many bytes. `None` means no truncation.
    pub max_sql_log_length: Option<usize>,
}

impl Default for TableOpsConfig {
    fn default() -> Self {
        Self {
            ident_quoting: IdentQuoting::Legacy,
            value_binding: ValueBinding::Bound,
            escape_rows: true,
            query_timeout: None,
            log_sql: true,
            log_level: Level::DEBUG,
            max_sql_log_length: Some(200),
        }
    }
}

impl TableOpsConfig {
    /// Create a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ident_quoting(mut self, quoting: IdentQuoting) -> Self {
        self.ident_quoting = quoting;
        self
    }

    pub fn value_binding(mut self, binding: ValueBinding) -> Self {
        self.value_binding = binding;
        self
    }

    /// Return raw cell values instead of display-escaped ones.
    pub fn escape_rows(mut self, enabled: bool) -> Self {
        self.escape_rows = enabled;
        self
    }

    /// Set query timeout.
    pub fn query_timeout(mut self, duration: Duration) -> Self {
        self.query_timeout = Some(duration);
        self
    }

    pub fn log_sql(mut self, enabled: bool) -> Self {
        self.log_sql = enabled;
        self
    }

    pub fn log_level(mut self, level: Level) -> Self {
        self.log_level = level;
        self
    }

    pub fn max_sql_log_length(mut self, len: Option<usize>) -> Self {
        self.max_sql_log_length = len;
        self
    }

    /// Rendering style for the builders.
    pub fn style(&self) -> Style {
        Style::new(self.ident_quoting, self.value_binding)
    }
}
