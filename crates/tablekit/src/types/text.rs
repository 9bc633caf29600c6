use bytes::BytesMut;
use std::error::Error;
use tokio_postgres::types::{Format, FromSql, IsNull, ToSql, Type};

/// A string parameter sent in the text wire format.
///
/// Unlike `String`, which only binds to text-like columns, a `TextValue` is
/// accepted for any column type; the server converts it the same way it would
/// convert a quoted literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextValue(pub String);

impl TextValue {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ToSql for TextValue {
    fn to_sql(
        &self,
        _ty: &Type,
        out: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        if self.0.contains('\0') {
            return Err("text parameter cannot contain NUL character".into());
        }
        out.extend_from_slice(self.0.as_bytes());
        Ok(IsNull::No)
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }

    fn encode_format(&self, _ty: &Type) -> Format {
        Format::Text
    }

    tokio_postgres::types::to_sql_checked!();
}

/// Fallback decoder for cells of types without a dedicated conversion.
///
/// Enum labels and other text-shaped binary payloads decode cleanly; anything
/// that is not valid UTF-8 is rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawText(pub String);

impl<'a> FromSql<'a> for RawText {
    fn from_sql(_ty: &Type, raw: &'a [u8]) -> Result<Self, Box<dyn Error + Sync + Send>> {
        let text = std::str::from_utf8(raw)?;
        Ok(RawText(text.to_string()))
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_value_encodes_verbatim() {
        let mut buf = BytesMut::new();
        let value = TextValue::new("42");
        let is_null = value.to_sql(&Type::INT4, &mut buf).unwrap();
        assert!(matches!(is_null, IsNull::No));
        assert_eq!(&buf[..], b"42");
        assert!(matches!(value.encode_format(&Type::INT4), Format::Text));
    }

    #[test]
    fn text_value_rejects_nul() {
        let mut buf = BytesMut::new();
        assert!(TextValue::new("a\0b").to_sql(&Type::TEXT, &mut buf).is_err());
    }

    #[test]
    fn raw_text_decodes_utf8() {
        let decoded = RawText::from_sql(&Type::TEXT, "süd".as_bytes()).unwrap();
        assert_eq!(decoded.0, "süd");
        assert!(RawText::from_sql(&Type::TEXT, &[0xff, 0xfe]).is_err());
    }
}
