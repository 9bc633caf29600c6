//! Text-format parameter and cell types.
//!
//! Table operations carry every value as a string. [`TextValue`] binds a string
//! in the PostgreSQL text format so the server parses it into whatever the
//! target column type is, and [`RawText`] reads back cells whose type has no
//! dedicated decoder.

mod text;

pub use text::{RawText, TextValue};
