//! Identifier quoting.
//!
//! Identifiers are emitted bare unless they are reserved keywords. Dotted names
//! (`schema.table`, `table.column`) are checked part by part, and the wildcard
//! `*` is never quoted.
//!
//! # Example
//! ```ignore
//! use tablekit::ident::{quote_ident, IdentQuoting};
//!
//! assert_eq!(quote_ident("order", IdentQuoting::Legacy), "'order'");
//! assert_eq!(quote_ident("order", IdentQuoting::Standard), "\"order\"");
//! assert_eq!(quote_ident("cars.make", IdentQuoting::Legacy), "cars.make");
//! ```

use crate::reserved::is_reserved;

/// How reserved identifiers are quoted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IdentQuoting {
    /// Wrap reserved identifiers in single quotes.
    #[default]
    Legacy,
    /// Wrap reserved identifiers in double quotes, escaping `"` as `""`.
    Standard,
}

/// Render one identifier, quoting reserved parts.
pub fn quote_ident(name: &str, quoting: IdentQuoting) -> String {
    let mut out = String::with_capacity(name.len() + 2);
    write_ident(&mut out, name, quoting);
    out
}

/// Render a list of identifiers joined by `sep`.
pub fn quote_list<S: AsRef<str>>(names: &[S], sep: &str, quoting: IdentQuoting) -> String {
    let mut out = String::new();
    for (i, name) in names.iter().enumerate() {
        if i > 0 {
            out.push_str(sep);
        }
        write_ident(&mut out, name.as_ref(), quoting);
    }
    out
}

pub(crate) fn write_ident(out: &mut String, name: &str, quoting: IdentQuoting) {
    if name == "*" {
        out.push('*');
        return;
    }
    for (i, part) in name.split('.').enumerate() {
        if i > 0 {
            out.push('.');
        }
        if part == "*" || !is_reserved(part) {
            out.push_str(part);
            continue;
        }
        match quoting {
            IdentQuoting::Legacy => {
                out.push('\'');
                out.push_str(part);
                out.push('\'');
            }
            IdentQuoting::Standard => {
                out.push('"');
                for ch in part.trim().chars() {
                    if ch == '"' {
                        out.push('"');
                        out.push('"');
                    } else {
                        out.push(ch);
                    }
                }
                out.push('"');
            }
        }
    }
}
