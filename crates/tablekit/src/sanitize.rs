//! Value sanitizers for the write and read paths.
//!
//! - Write path: every INSERT/UPDATE value is purified ([`Purifier`]) and then
//!   escaped for literal embedding ([`Connection::escape_literal`]), in that order.
//! - Read path: every returned cell is HTML-escaped for redisplay, with `&amp;`
//!   restored to `&` ([`sanitize_cell`]).

use crate::client::Connection;
use crate::qb::SqlValue;
use crate::row::Row;
use crate::table::Fields;
use indexmap::IndexMap;
use regex::Regex;
use std::sync::OnceLock;

/// Strips or neutralizes unsafe markup in a text value before it is stored.
pub trait Purifier: Send + Sync {
    fn purify(&self, text: &str) -> String;
}

impl<F> Purifier for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn purify(&self, text: &str) -> String {
        self(text)
    }
}

/// Passes values through untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopPurifier;

impl Purifier for NoopPurifier {
    fn purify(&self, text: &str) -> String {
        text.to_string()
    }
}

/// Removes markup: `<script>`/`<style>` elements with their bodies, then every
/// remaining tag. Text between tags is kept.
#[derive(Debug, Clone, Copy, Default)]
pub struct TagStripper;

impl Purifier for TagStripper {
    fn purify(&self, text: &str) -> String {
        static BLOCK_RE: OnceLock<Regex> = OnceLock::new();
        static TAG_RE: OnceLock<Regex> = OnceLock::new();

        let block = BLOCK_RE.get_or_init(|| {
            Regex::new(r"(?is)<\s*(script|style)\b[^>]*>.*?<\s*/\s*(script|style)\s*>")
                .expect("invalid built-in block regex")
        });
        let tag = TAG_RE.get_or_init(|| {
            Regex::new(r"(?s)<[^>]*>").expect("invalid built-in tag regex")
        });

        let without_blocks = block.replace_all(text, "");
        tag.replace_all(&without_blocks, "").into_owned()
    }
}

/// Purifies then escapes values destined for INSERT/UPDATE.
pub struct FieldSanitizer<'a, P: ?Sized, C: ?Sized> {
    purifier: &'a P,
    conn: &'a C,
}

impl<'a, P, C> FieldSanitizer<'a, P, C>
where
    P: Purifier + ?Sized,
    C: Connection + ?Sized,
{
    pub fn new(purifier: &'a P, conn: &'a C) -> Self {
        Self { purifier, conn }
    }

    /// Purify `value`, then escape the purified text.
    ///
    /// The purified text is what gets bound as a parameter; the escaped text is
    /// what gets embedded when SQL is rendered inline.
    pub fn sanitize(&self, value: &str) -> SqlValue {
        let bound = self.purifier.purify(value);
        let escaped = self.conn.escape_literal(&bound);
        SqlValue { bound, escaped }
    }

    /// Sanitize every value of a field set, keeping column order.
    pub fn sanitize_fields(&self, fields: &Fields) -> IndexMap<String, SqlValue> {
        fields
            .iter()
            .map(|(col, value)| (col.clone(), self.sanitize(value)))
            .collect()
    }
}

/// PostgreSQL literal escaping: `'` becomes `''` and `\` becomes `\\`.
///
/// Backslashes are doubled so the result is correct inside an `E'...'`
/// literal, which [`SqlValue::literal`] emits whenever the value contains one.
/// Values without backslashes read the same under either setting of
/// `standard_conforming_strings`.
pub fn escape_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\'' => out.push_str("''"),
            '\\' => out.push_str("\\\\"),
            _ => out.push(ch),
        }
    }
    out
}

/// HTML-escape a cell for redisplay (quotes included), then restore `&amp;` to `&`.
///
/// Restoring `&` keeps ampersands already present from being double-escaped;
/// it also means a literal `&lt;` in the source is displayed as `<`.
pub fn sanitize_cell(value: &str) -> String {
    html_escape::encode_quoted_attribute(value).replace("&amp;", "&")
}

/// Apply [`sanitize_cell`] to every non-NULL cell of a row.
pub fn sanitize_row(row: Row) -> Row {
    row.map_values(|v| v.map(|s| sanitize_cell(&s)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::pairs;
    use crate::testing::FakeConnection;

    #[test]
    fn sanitize_cell_escapes_markup_and_quotes() {
        let out = sanitize_cell(r#"<b class="x">it's</b>"#);
        assert!(out.starts_with("&lt;b class=&quot;x&quot;&gt;it"));
        assert!(out.ends_with("s&lt;/b&gt;"));
        assert!(!out.contains('\''));
        assert!(!out.contains('<'));
    }

    #[test]
    fn sanitize_cell_keeps_ampersands() {
        assert_eq!(sanitize_cell("fish & chips"), "fish & chips");
    }

    #[test]
    fn sanitize_cell_is_idempotent_on_plain_text() {
        for x in ["ford", "Focus2012", "abc123XYZ", ""] {
            let once = sanitize_cell(x);
            assert_eq!(sanitize_cell(&once), once);
            assert_eq!(once, x);
        }
    }

    #[test]
    fn sanitize_row_skips_nulls() {
        let row = Row::from_pairs([
            ("name", Some("<i>ann</i>".to_string())),
            ("nick", None),
        ]);
        let row = sanitize_row(row);
        assert_eq!(row.get("name"), Some("&lt;i&gt;ann&lt;/i&gt;"));
        assert!(row.is_null("nick"));
    }

    #[test]
    fn tag_stripper_removes_tags_and_scripts() {
        let purified = TagStripper.purify("<p>hi <script>alert(1)</script>there</p>");
        assert_eq!(purified, "hi there");
        assert_eq!(TagStripper.purify("plain"), "plain");
        assert_eq!(
            TagStripper.purify("<STYLE type='text/css'>p{}</STYLE>ok"),
            "ok"
        );
    }

    #[test]
    fn closures_are_purifiers() {
        let upper = |s: &str| s.to_uppercase();
        assert_eq!(upper.purify("abc"), "ABC");
    }

    #[test]
    fn field_sanitizer_purifies_before_escaping() {
        let conn = FakeConnection::new();
        let sanitizer = FieldSanitizer::new(&TagStripper, &conn);
        let value = sanitizer.sanitize("<b>o'neil</b>");
        assert_eq!(value.bound, "o'neil");
        assert_eq!(value.escaped, "o''neil");
    }

    #[test]
    fn field_sanitizer_keeps_column_order() {
        let conn = FakeConnection::new();
        let purifier = NoopPurifier;
        let sanitizer = FieldSanitizer::new(&purifier, &conn);
        let out = sanitizer.sanitize_fields(&pairs([("model", "ka"), ("make", "ford")]));
        let cols: Vec<_> = out.keys().map(String::as_str).collect();
        assert_eq!(cols, ["model", "make"]);
        assert_eq!(out["make"].literal(), "'ford'");
    }

    #[test]
    fn escape_literal_doubles_quotes() {
        assert_eq!(escape_literal("o'neil"), "o''neil");
        assert_eq!(escape_literal("plain"), "plain");
    }

    #[test]
    fn escape_literal_doubles_backslashes() {
        assert_eq!(escape_literal(r"C:\tmp\'x"), r"C:\\tmp\\''x");
    }
}
