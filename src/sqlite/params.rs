use rusqlite::types::Value;

use crate::driver::DriverError;
use crate::types::{ParamType, SqlValue};

/// Convert a bound value to the `SQLite` value its declared type asks for.
///
/// `NULL` passes through every type; booleans are stored as 0/1.
///
/// # Errors
/// Returns a `22018` [`DriverError`] when the value cannot represent the type.
pub fn coerce(value: &SqlValue, ty: ParamType) -> Result<Value, DriverError> {
    let coerced = match (ty, value) {
        (ParamType::Null, _) | (_, SqlValue::Null) => Some(Value::Null),

        (ParamType::Str, SqlValue::Text(s)) => Some(Value::Text(s.clone())),
        (ParamType::Str, SqlValue::Int(i)) => Some(Value::Text(i.to_string())),
        (ParamType::Str, SqlValue::Float(f)) => Some(Value::Text(f.to_string())),
        (ParamType::Str, SqlValue::Bool(b)) => {
            Some(Value::Text(if *b { "1" } else { "" }.to_owned()))
        }
        (ParamType::Str, SqlValue::Blob(bytes)) => Some(Value::Blob(bytes.clone())),

        (ParamType::Int, SqlValue::Int(i)) => Some(Value::Integer(*i)),
        (ParamType::Int, SqlValue::Bool(b)) => Some(Value::Integer(i64::from(*b))),
        (ParamType::Int, SqlValue::Text(s)) => s.trim().parse::<i64>().ok().map(Value::Integer),
        #[allow(clippy::cast_possible_truncation)]
        (ParamType::Int, SqlValue::Float(f)) if f.fract() == 0.0 && f.is_finite() => {
            Some(Value::Integer(*f as i64))
        }
        (ParamType::Int, SqlValue::Float(_) | SqlValue::Blob(_)) => None,

        (ParamType::Bool, SqlValue::Bool(b)) => Some(Value::Integer(i64::from(*b))),
        (ParamType::Bool, SqlValue::Int(i)) => Some(Value::Integer(i64::from(*i != 0))),
        (ParamType::Bool, SqlValue::Text(s)) => parse_bool(s).map(|b| Value::Integer(i64::from(b))),
        (ParamType::Bool, SqlValue::Float(_) | SqlValue::Blob(_)) => None,
    };
    coerced.ok_or_else(|| {
        DriverError::new(
            "22018",
            format!("value {value:?} cannot be bound as {ty}"),
        )
    })
}

fn parse_bool(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strings_accept_scalars() {
        assert_eq!(
            coerce(&SqlValue::Int(7), ParamType::Str).unwrap(),
            Value::Text("7".into())
        );
        assert_eq!(
            coerce(&SqlValue::Text("x".into()), ParamType::Str).unwrap(),
            Value::Text("x".into())
        );
    }

    #[test]
    fn integers_parse_or_fail() {
        assert_eq!(
            coerce(&SqlValue::Text(" 42 ".into()), ParamType::Int).unwrap(),
            Value::Integer(42)
        );
        assert_eq!(
            coerce(&SqlValue::Float(3.0), ParamType::Int).unwrap(),
            Value::Integer(3)
        );
        let err = coerce(&SqlValue::Text("abc".into()), ParamType::Int).unwrap_err();
        assert_eq!(err.sqlstate, "22018");
        assert!(coerce(&SqlValue::Float(3.5), ParamType::Int).is_err());
    }

    #[test]
    fn booleans_and_nulls() {
        assert_eq!(
            coerce(&SqlValue::Text("true".into()), ParamType::Bool).unwrap(),
            Value::Integer(1)
        );
        assert_eq!(coerce(&SqlValue::Int(0), ParamType::Bool).unwrap(), Value::Integer(0));
        assert!(coerce(&SqlValue::Text("maybe".into()), ParamType::Bool).is_err());
        assert_eq!(coerce(&SqlValue::Int(5), ParamType::Null).unwrap(), Value::Null);
        assert_eq!(coerce(&SqlValue::Null, ParamType::Int).unwrap(), Value::Null);
    }
}
