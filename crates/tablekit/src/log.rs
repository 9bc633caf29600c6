//! `tracing` events for executed statements.

use crate::qb::StatementKind;
use tracing::Level;

pub(crate) const TARGET: &str = "tablekit.sql";

pub(crate) fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}

fn display_sql(sql: &str, max_len: Option<usize>) -> String {
    match max_len {
        Some(max) if sql.len() > max => format!("{}...", truncate_sql_bytes(sql, max)),
        _ => sql.to_string(),
    }
}

/// Emit the SQL that is about to run at a runtime-chosen level.
pub(crate) fn statement(
    level: Level,
    max_len: Option<usize>,
    kind: Option<StatementKind>,
    sql: &str,
    param_count: usize,
) {
    macro_rules! emit_at_level {
        ($level:expr, $($field:tt)*) => {
            match $level {
                Level::ERROR => tracing::error!($($field)*),
                Level::WARN  => tracing::warn!($($field)*),
                Level::INFO  => tracing::info!($($field)*),
                Level::DEBUG => tracing::debug!($($field)*),
                Level::TRACE => tracing::trace!($($field)*),
            }
        };
    }

    let sql = display_sql(sql, max_len);
    let kind = kind.map(|k| k.to_string());
    let kind = kind.as_deref().unwrap_or("-");
    emit_at_level!(
        level,
        target: TARGET,
        kind,
        param_count,
        sql = %sql,
    );
}

/// Emit a failed statement at WARN.
pub(crate) fn failure(max_len: Option<usize>, sql: &str, error: &crate::TableError) {
    let sql = display_sql(sql, max_len);
    tracing::warn!(target: TARGET, sql = %sql, error = %error, "statement failed");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_respects_char_boundary() {
        let sql = "SELECT 'héllo'";
        // 'é' spans bytes 9..11; cutting at 10 must back off to 9.
        assert_eq!(truncate_sql_bytes(sql, 10), "SELECT 'h");
        assert_eq!(truncate_sql_bytes(sql, 100), sql);
    }

    #[test]
    fn display_sql_appends_ellipsis() {
        assert_eq!(display_sql("SELECT * FROM cars", Some(6)), "SELECT...");
        assert_eq!(display_sql("SELECT 1", None), "SELECT 1");
    }
}
