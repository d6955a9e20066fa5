//! Conversions between [`Value`] and `sea_query::Value`.

use crate::executor::OrmError;
use crate::value::Value;

impl From<Value> for sea_query::Value {
    fn from(value: Value) -> Self {
        match value {
            // untyped NULL; the server infers the placeholder type
            Value::Null => sea_query::Value::String(None),
            Value::Bool(b) => sea_query::Value::Bool(Some(b)),
            Value::Int(i) => sea_query::Value::BigInt(Some(i)),
            Value::Float(f) => sea_query::Value::Double(Some(f)),
            Value::String(s) => sea_query::Value::String(Some(s)),
            Value::Bytes(b) => sea_query::Value::Bytes(Some(b)),
        }
    }
}

/// Convert the parameters collected by a `sea-query` builder into [`Value`]s.
pub(crate) fn from_sea_values(values: sea_query::Values) -> Result<Vec<Value>, OrmError> {
    values.0.into_iter().map(from_sea_value).collect()
}

fn from_sea_value(value: sea_query::Value) -> Result<Value, OrmError> {
    use sea_query::Value as Sea;

    let value = match value {
        Sea::Bool(v) => v.map(Value::Bool),
        Sea::TinyInt(v) => v.map(|i| Value::Int(i.into())),
        Sea::SmallInt(v) => v.map(|i| Value::Int(i.into())),
        Sea::Int(v) => v.map(|i| Value::Int(i.into())),
        Sea::BigInt(v) => v.map(Value::Int),
        Sea::TinyUnsigned(v) => v.map(|i| Value::Int(i.into())),
        Sea::SmallUnsigned(v) => v.map(|i| Value::Int(i.into())),
        Sea::Unsigned(v) => v.map(|i| Value::Int(i.into())),
        Sea::Float(v) => v.map(|f| Value::Float(f.into())),
        Sea::Double(v) => v.map(Value::Float),
        Sea::String(v) => v.map(Value::String),
        Sea::Char(v) => v.map(|c| Value::String(c.to_string())),
        Sea::Bytes(v) => v.map(Value::Bytes),
        other => {
            return Err(OrmError::ParseError(format!(
                "unsupported statement parameter: {other:?}"
            )));
        }
    };
    Ok(value.unwrap_or(Value::Null))
}
