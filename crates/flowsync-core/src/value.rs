//! Property value types and literal source rendering.
//!
//! [`ValueType`] is the closed set of value categories a property may hold;
//! [`PropertyValue`] is the tagged payload. A property's value, when present,
//! must satisfy its declared value type ([`ValueType::admits`]) -- the
//! property builder and the copy contract both enforce this.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The closed set of property value categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueType {
    /// A string literal, quoted when rendered.
    Text,
    /// An expression in the underlying language, rendered verbatim.
    Expression,
    Boolean,
    Numeric,
    /// A type descriptor such as `http.Client`, rendered verbatim.
    TypeDescriptor,
    /// A bare identifier (variable or binding name).
    Identifier,
}

impl ValueType {
    /// Returns `true` if `value` satisfies this value type.
    pub fn admits(&self, value: &PropertyValue) -> bool {
        value.value_type() == *self
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ValueType::Text => "text",
            ValueType::Expression => "expression",
            ValueType::Boolean => "boolean",
            ValueType::Numeric => "numeric",
            ValueType::TypeDescriptor => "typeDescriptor",
            ValueType::Identifier => "identifier",
        };
        f.write_str(s)
    }
}

/// A typed property value.
///
/// Note: `Numeric` stores `f64`. Whole numbers render without a fractional
/// part so that extraction and re-rendering round-trip textually.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropertyValue {
    Text(String),
    Expression(String),
    Boolean(bool),
    Numeric(f64),
    TypeDescriptor(String),
    Identifier(String),
}

impl PropertyValue {
    /// Returns the value type this payload satisfies.
    pub fn value_type(&self) -> ValueType {
        match self {
            PropertyValue::Text(_) => ValueType::Text,
            PropertyValue::Expression(_) => ValueType::Expression,
            PropertyValue::Boolean(_) => ValueType::Boolean,
            PropertyValue::Numeric(_) => ValueType::Numeric,
            PropertyValue::TypeDescriptor(_) => ValueType::TypeDescriptor,
            PropertyValue::Identifier(_) => ValueType::Identifier,
        }
    }

    /// Renders the value as literal source text.
    ///
    /// `Text` is double-quoted with `\` and `"` escaped; everything else is
    /// emitted verbatim.
    pub fn render(&self) -> String {
        match self {
            PropertyValue::Text(s) => {
                let escaped = s.replace('\\', "\\\\").replace('"', "\\\"");
                format!("\"{}\"", escaped)
            }
            PropertyValue::Expression(s)
            | PropertyValue::TypeDescriptor(s)
            | PropertyValue::Identifier(s) => s.clone(),
            PropertyValue::Boolean(b) => b.to_string(),
            PropertyValue::Numeric(n) => {
                if n.fract() == 0.0 && n.is_finite() && n.abs() < i64::MAX as f64 {
                    format!("{}", *n as i64)
                } else {
                    format!("{}", n)
                }
            }
        }
    }

    /// Parses literal source text into a value of the given type.
    ///
    /// Returns `None` when the text does not fit the type; callers translate
    /// that into a `MalformedSource` error with file/position context.
    pub fn parse(value_type: ValueType, text: &str) -> Option<PropertyValue> {
        let text = text.trim();
        match value_type {
            ValueType::Text => {
                let inner = text.strip_prefix('"')?.strip_suffix('"')?;
                Some(PropertyValue::Text(
                    inner.replace("\\\"", "\"").replace("\\\\", "\\"),
                ))
            }
            ValueType::Expression => Some(PropertyValue::Expression(text.to_string())),
            ValueType::Boolean => match text {
                "true" => Some(PropertyValue::Boolean(true)),
                "false" => Some(PropertyValue::Boolean(false)),
                _ => None,
            },
            ValueType::Numeric => text.parse::<f64>().ok().map(PropertyValue::Numeric),
            ValueType::TypeDescriptor => Some(PropertyValue::TypeDescriptor(text.to_string())),
            ValueType::Identifier => {
                let valid = !text.is_empty()
                    && text
                        .chars()
                        .all(|c| c.is_alphanumeric() || c == '_' || c == '.');
                valid.then(|| PropertyValue::Identifier(text.to_string()))
            }
        }
    }

    /// Shorthand constructor for a text value.
    pub fn text(s: impl Into<String>) -> Self {
        PropertyValue::Text(s.into())
    }

    /// Shorthand constructor for an expression value.
    pub fn expression(s: impl Into<String>) -> Self {
        PropertyValue::Expression(s.into())
    }

    /// Shorthand constructor for an identifier value.
    pub fn identifier(s: impl Into<String>) -> Self {
        PropertyValue::Identifier(s.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admits_matches_payload_type() {
        assert!(ValueType::Text.admits(&PropertyValue::text("hi")));
        assert!(ValueType::Boolean.admits(&PropertyValue::Boolean(true)));
        assert!(!ValueType::Text.admits(&PropertyValue::Boolean(true)));
        assert!(!ValueType::Numeric.admits(&PropertyValue::identifier("x")));
    }

    #[test]
    fn text_renders_quoted_and_escaped() {
        assert_eq!(PropertyValue::text("hello").render(), "\"hello\"");
        assert_eq!(
            PropertyValue::text("say \"hi\"").render(),
            "\"say \\\"hi\\\"\""
        );
    }

    #[test]
    fn whole_numerics_render_without_fraction() {
        assert_eq!(PropertyValue::Numeric(30.0).render(), "30");
        assert_eq!(PropertyValue::Numeric(2.5).render(), "2.5");
        assert_eq!(PropertyValue::Numeric(-7.0).render(), "-7");
    }

    #[test]
    fn expressions_render_verbatim() {
        assert_eq!(
            PropertyValue::expression("count + 1").render(),
            "count + 1"
        );
        assert_eq!(
            PropertyValue::TypeDescriptor("http.Client".into()).render(),
            "http.Client"
        );
    }

    #[test]
    fn parse_render_roundtrip() {
        let cases = [
            (ValueType::Text, "\"csv loader\""),
            (ValueType::Expression, "a + b"),
            (ValueType::Boolean, "true"),
            (ValueType::Numeric, "42"),
            (ValueType::Numeric, "2.5"),
            (ValueType::TypeDescriptor, "http.Client"),
            (ValueType::Identifier, "backend"),
        ];
        for (ty, text) in cases {
            let value = PropertyValue::parse(ty, text).unwrap();
            assert_eq!(value.render(), text, "round-trip for {}", ty);
        }
    }

    #[test]
    fn parse_rejects_mismatched_text() {
        assert!(PropertyValue::parse(ValueType::Boolean, "yes").is_none());
        assert!(PropertyValue::parse(ValueType::Numeric, "abc").is_none());
        assert!(PropertyValue::parse(ValueType::Text, "unquoted").is_none());
        assert!(PropertyValue::parse(ValueType::Identifier, "not an ident").is_none());
    }

    #[test]
    fn serde_roundtrip() {
        let vals = vec![
            PropertyValue::text("x"),
            PropertyValue::expression("f(1)"),
            PropertyValue::Boolean(false),
            PropertyValue::Numeric(3.25),
            PropertyValue::TypeDescriptor("sql.Pool".into()),
            PropertyValue::identifier("conn"),
        ];
        for v in &vals {
            let json = serde_json::to_string(v).unwrap();
            let back: PropertyValue = serde_json::from_str(&json).unwrap();
            assert_eq!(*v, back);
        }
    }
}
