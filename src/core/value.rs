use std::fmt;

use serde::{Deserialize, Serialize};

/// The Alias for serde_json::Value, the payload of every state.
pub type StateValue = serde_json::Value;

/// Declared type of a state, derived once from the first value written to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Null,
    Boolean,
    Number,
    String,
    Array,
    Object,
}

impl ValueKind {
    pub fn of(value: &StateValue) -> Self {
        match value {
            StateValue::Null => ValueKind::Null,
            StateValue::Bool(_) => ValueKind::Boolean,
            StateValue::Number(_) => ValueKind::Number,
            StateValue::String(_) => ValueKind::String,
            StateValue::Array(_) => ValueKind::Array,
            StateValue::Object(_) => ValueKind::Object,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKind::Null => "null",
            ValueKind::Boolean => "boolean",
            ValueKind::Number => "number",
            ValueKind::String => "string",
            ValueKind::Array => "array",
            ValueKind::Object => "object",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Loose equality used to decide whether a state write can be skipped.
///
/// Scalars follow the host's loose (`==`) comparison: booleans count as `1`
/// and `0`, numeric strings compare numerically and a blank string is `0`.
/// `null` only equals `null`. Arrays and objects compare structurally with
/// each other and never equal a scalar.
pub fn loosely_equal(a: &StateValue, b: &StateValue) -> bool {
    use serde_json::Value::{Array, Null, Object, String as Str};

    match (a, b) {
        (Null, Null) => true,
        (Null, _) | (_, Null) => false,
        (Str(x), Str(y)) => x == y,
        (Array(_) | Object(_), Array(_) | Object(_)) => a == b,
        (Array(_) | Object(_), _) | (_, Array(_) | Object(_)) => false,
        _ => match (as_number(a), as_number(b)) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        },
    }
}

fn as_number(value: &StateValue) -> Option<f64> {
    match value {
        StateValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        StateValue::Number(n) => n.as_f64(),
        StateValue::String(s) => string_to_number(s),
        _ => None,
    }
}

fn string_to_number(s: &str) -> Option<f64> {
    let t = s.trim();
    match t {
        "" => Some(0.0),
        "Infinity" | "+Infinity" => Some(f64::INFINITY),
        "-Infinity" => Some(f64::NEG_INFINITY),
        _ if t
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-')) =>
        {
            t.parse().ok()
        }
        _ => None,
    }
}

/// Renders any `Debug` value on a single line, for log messages.
pub fn inspect<T: fmt::Debug + ?Sized>(value: &T) -> String {
    format!("{:?}", value).replace('\n', " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_value_kind_dispatch() {
        assert_eq!(ValueKind::of(&json!(3)), ValueKind::Number);
        assert_eq!(ValueKind::of(&json!(1.5)), ValueKind::Number);
        assert_eq!(ValueKind::of(&json!("x")), ValueKind::String);
        assert_eq!(ValueKind::of(&json!(true)), ValueKind::Boolean);
        assert_eq!(ValueKind::of(&json!(null)), ValueKind::Null);
        assert_eq!(ValueKind::of(&json!([1])), ValueKind::Array);
        assert_eq!(ValueKind::of(&json!({"a": 1})), ValueKind::Object);
    }

    #[test]
    fn test_value_kind_serializes_lowercase() {
        assert_eq!(serde_json::to_value(ValueKind::Number).unwrap(), json!("number"));
        assert_eq!(ValueKind::Boolean.to_string(), "boolean");
    }

    #[test]
    fn test_loosely_equal_numbers_and_strings() {
        assert!(loosely_equal(&json!(5), &json!(5.0)));
        assert!(loosely_equal(&json!(5), &json!("5")));
        assert!(loosely_equal(&json!(" 5 "), &json!(5)));
        assert!(loosely_equal(&json!(""), &json!(0)));
        assert!(!loosely_equal(&json!(5), &json!(6)));
        assert!(!loosely_equal(&json!("inf"), &json!(f64::MAX)));
        assert!(!loosely_equal(&json!("abc"), &json!(0)));
        assert!(!loosely_equal(&json!("5"), &json!("5.0")));
    }

    #[test]
    fn test_loosely_equal_booleans_count_as_numbers() {
        assert!(loosely_equal(&json!(1), &json!(true)));
        assert!(loosely_equal(&json!(false), &json!(0)));
        assert!(loosely_equal(&json!("1"), &json!(true)));
        assert!(loosely_equal(&json!(true), &json!(true)));
        assert!(!loosely_equal(&json!("true"), &json!(true)));
        assert!(!loosely_equal(&json!(false), &json!("false")));
        assert!(!loosely_equal(&json!(2), &json!(true)));
    }

    #[test]
    fn test_loosely_equal_null_and_compounds() {
        assert!(loosely_equal(&json!(null), &json!(null)));
        assert!(!loosely_equal(&json!(null), &json!(0)));
        assert!(!loosely_equal(&json!(false), &json!(null)));
        assert!(loosely_equal(&json!({"a": 1}), &json!({"a": 1})));
        assert!(!loosely_equal(&json!([1]), &json!(1)));
    }

    #[test]
    fn test_inspect_is_single_line() {
        struct Multiline;

        impl fmt::Debug for Multiline {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("first\nsecond")
            }
        }

        assert_eq!(inspect(&Multiline), "first second");
    }
}
