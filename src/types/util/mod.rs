//! Small helpers shared by the document and relation layers.

pub mod case;

pub use self::case::{strip_getter, to_camel_case, to_snake_case};

use serde_json::Value;

/// `true` when a raw value should be treated as if the field were absent.
pub(crate) fn is_absent(value: Option<&Value>) -> bool {
    matches!(value, None | Some(Value::Null))
}

/// Short human description of a JSON value's shape, used in log output.
pub(crate) fn shape_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn null_counts_as_absent() {
        assert!(is_absent(None));
        assert!(is_absent(Some(&Value::Null)));
        assert!(!is_absent(Some(&json!(0))));
        assert!(!is_absent(Some(&json!(false))));
    }

    #[test]
    fn shapes() {
        assert_eq!(shape_of(&json!([1])), "sequence");
        assert_eq!(shape_of(&json!({})), "object");
        assert_eq!(shape_of(&json!("x")), "string");
    }
}
