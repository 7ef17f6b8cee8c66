//! Field-level decoding for score requests
//!
//! Each helper reads one JSON field and reports whether it was missing,
//! usable, or present but unusable. The adapter decides the fallback.

use serde_json::{Map, Value};

/// Outcome of reading one field
#[derive(Debug, Clone, PartialEq)]
pub enum Field<T> {
    /// Key absent or explicitly `null`
    Missing,
    Valid(T),
    /// Key present with the wrong type or a non-finite number
    Invalid,
}

impl<T> Field<T> {
    pub fn is_invalid(&self) -> bool {
        matches!(self, Field::Invalid)
    }
}

/// Look up the first of `keys` present in `obj`
pub fn lookup<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|k| obj.get(*k))
}

pub fn number(value: Option<&Value>) -> Field<f64> {
    match value {
        None | Some(Value::Null) => Field::Missing,
        Some(Value::Number(n)) => match n.as_f64() {
            Some(v) if v.is_finite() => Field::Valid(v),
            _ => Field::Invalid,
        },
        Some(_) => Field::Invalid,
    }
}

pub fn boolean(value: Option<&Value>) -> Field<bool> {
    match value {
        None | Some(Value::Null) => Field::Missing,
        Some(Value::Bool(b)) => Field::Valid(*b),
        Some(_) => Field::Invalid,
    }
}

pub fn string(value: Option<&Value>) -> Field<&str> {
    match value {
        None | Some(Value::Null) => Field::Missing,
        Some(Value::String(s)) => Field::Valid(s.as_str()),
        Some(_) => Field::Invalid,
    }
}

pub fn object(value: Option<&Value>) -> Field<&Map<String, Value>> {
    match value {
        None | Some(Value::Null) => Field::Missing,
        Some(Value::Object(map)) => Field::Valid(map),
        Some(_) => Field::Invalid,
    }
}

pub fn array(value: Option<&Value>) -> Field<&Vec<Value>> {
    match value {
        None | Some(Value::Null) => Field::Missing,
        Some(Value::Array(items)) => Field::Valid(items),
        Some(_) => Field::Invalid,
    }
}

/// Human-readable JSON type name for error messages
pub fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_number_field() {
        assert_eq!(number(None), Field::Missing);
        assert_eq!(number(Some(&json!(null))), Field::Missing);
        assert_eq!(number(Some(&json!(7))), Field::Valid(7.0));
        assert_eq!(number(Some(&json!(6.5))), Field::Valid(6.5));
        assert_eq!(number(Some(&json!("7"))), Field::Invalid);
        assert_eq!(number(Some(&json!([7]))), Field::Invalid);
    }

    #[test]
    fn test_lookup_prefers_first_key() {
        let value = json!({"ELI": 3, "eli": 8});
        let obj = value.as_object().unwrap();
        assert_eq!(lookup(obj, &["ELI", "eli"]), Some(&json!(3)));
        assert_eq!(lookup(obj, &["missing"]), None);
    }

    #[test]
    fn test_container_fields() {
        assert!(array(Some(&json!({"a": 1}))).is_invalid());
        assert!(object(Some(&json!([1]))).is_invalid());
        assert_eq!(boolean(Some(&json!(true))), Field::Valid(true));
        assert_eq!(string(Some(&json!("Work"))), Field::Valid("Work"));
        assert_eq!(kind(&json!(1.5)), "number");
    }
}
