//! Expansion of structured values into name/value pairs.
//!
//! Template parameters, query strings, headers and form bodies can all be
//! supplied as a single `Serialize` value (usually a struct or a
//! `serde_json::json!` object). [`expand`] walks the value's named fields in
//! declaration order and renders each one as a string.

use serde::Serialize;
use serde_json::Value;

use crate::error::ValidationError;

/// Result of expanding a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expanded {
    /// A value with named fields, in declaration order.
    Pairs(Vec<(String, String)>),
    /// A bare scalar (string, number or boolean), rendered as text.
    Scalar(String),
}

/// Expands a serializable value into name/value pairs.
///
/// - structs and maps become [`Expanded::Pairs`]; `null` fields render as an
///   empty string rather than being omitted
/// - strings, numbers and booleans become [`Expanded::Scalar`]
/// - `null` / `()` expand to no pairs
///
/// ## Errors
///
/// Returns [`ValidationError::JsonSerialize`] if the value cannot be
/// represented, and [`ValidationError::NotAnObject`] for sequences.
///
/// ## Examples
///
/// ```rust
/// use resty::expand::{expand, Expanded};
///
/// #[derive(serde::Serialize)]
/// struct Filter { page: u32, q: Option<String> }
///
/// let pairs = expand(&Filter { page: 2, q: None }).unwrap();
/// assert_eq!(
///     pairs,
///     Expanded::Pairs(vec![
///         ("page".to_string(), "2".to_string()),
///         ("q".to_string(), String::new()),
///     ])
/// );
/// ```
pub fn expand<T: Serialize + ?Sized>(value: &T) -> Result<Expanded, ValidationError> {
    let value = serde_json::to_value(value).map_err(ValidationError::JsonSerialize)?;
    expand_value(&value)
}

/// Expands an already-converted JSON value.
pub fn expand_value(value: &Value) -> Result<Expanded, ValidationError> {
    match value {
        Value::Object(map) => Ok(Expanded::Pairs(
            map.iter()
                .map(|(name, value)| (name.clone(), value_to_text(value)))
                .collect(),
        )),
        Value::Null => Ok(Expanded::Pairs(Vec::new())),
        Value::Array(_) => Err(ValidationError::NotAnObject { found: "a sequence" }),
        scalar => Ok(Expanded::Scalar(value_to_text(scalar))),
    }
}

/// Renders a single JSON value as the text placed into a URL, header or form.
///
/// Strings are used verbatim, `null` becomes empty and nested structures fall
/// back to compact JSON.
pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        nested => nested.to_string(),
    }
}

/// Returns a short description of a value's shape for error messages.
pub(crate) fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Serialize)]
    struct Person {
        id: u32,
        email: String,
        is_active: bool,
        nickname: Option<String>,
    }

    #[test]
    fn test_struct_fields_keep_declaration_order() {
        let person = Person {
            id: 1,
            email: "abc@abc.com".to_string(),
            is_active: true,
            nickname: None,
        };
        let Expanded::Pairs(pairs) = expand(&person).unwrap() else {
            panic!("expected pairs");
        };
        let names: Vec<_> = pairs.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["id", "email", "is_active", "nickname"]);
        assert_eq!(pairs[2].1, "true");
        assert_eq!(pairs[3].1, "");
    }

    #[test]
    fn test_scalars() {
        assert_eq!(expand(&123456).unwrap(), Expanded::Scalar("123456".to_string()));
        assert_eq!(expand("flag").unwrap(), Expanded::Scalar("flag".to_string()));
        assert_eq!(expand(&false).unwrap(), Expanded::Scalar("false".to_string()));
    }

    #[test]
    fn test_unit_expands_to_nothing() {
        assert_eq!(expand(&()).unwrap(), Expanded::Pairs(Vec::new()));
    }

    #[test]
    fn test_sequence_is_rejected() {
        let err = expand(&vec![1, 2, 3]).unwrap_err();
        assert!(matches!(err, ValidationError::NotAnObject { .. }));
    }

    #[test]
    fn test_nested_values_render_as_json() {
        let Expanded::Pairs(pairs) = expand(&json!({ "tags": ["a", "b"] })).unwrap() else {
            panic!("expected pairs");
        };
        assert_eq!(pairs, vec![("tags".to_string(), r#"["a","b"]"#.to_string())]);
    }

    #[test]
    fn test_describe() {
        assert_eq!(describe(&json!(1)), "a number");
        assert_eq!(describe(&json!({})), "an object");
    }
}
