//! Conversions between [`Value`]/[`Row`] and `may_postgres`.
//!
//! Parameters are bound through `ToSql for Value`, which narrows to the type
//! the server inferred for each placeholder and refuses types the variant
//! cannot represent. Result columns are decoded by their declared PostgreSQL
//! type.

use crate::executor::OrmError;
use crate::value::{Row, Value};
use bytes::BytesMut;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use may_postgres::Row as PgRow;
use may_postgres::types::{IsNull, ToSql, Type};
use postgres_types::{to_sql_checked, WrongType};
use rust_decimal::Decimal;
use std::error::Error;

type BoxError = Box<dyn Error + Sync + Send>;

impl ToSql for Value {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
        match self {
            Value::Null => Ok(IsNull::Yes),
            Value::Bool(b) if *ty == Type::BOOL => b.to_sql(ty, out),
            Value::Int(i) if *ty == Type::INT2 => i16::try_from(*i)?.to_sql(ty, out),
            Value::Int(i) if *ty == Type::INT4 => i32::try_from(*i)?.to_sql(ty, out),
            Value::Int(i) if *ty == Type::INT8 => i.to_sql(ty, out),
            Value::Int(i) if *ty == Type::OID => u32::try_from(*i)?.to_sql(ty, out),
            Value::Int(i) if *ty == Type::FLOAT4 => (*i as f32).to_sql(ty, out),
            Value::Int(i) if *ty == Type::FLOAT8 => (*i as f64).to_sql(ty, out),
            Value::Int(i) if *ty == Type::NUMERIC => Decimal::from(*i).to_sql(ty, out),
            Value::Float(f) if *ty == Type::FLOAT4 => (*f as f32).to_sql(ty, out),
            Value::Float(f) if *ty == Type::FLOAT8 => f.to_sql(ty, out),
            Value::Float(f) if *ty == Type::NUMERIC => Decimal::try_from(*f)?.to_sql(ty, out),
            Value::String(s) => string_to_sql(s, ty, out),
            Value::Bytes(b) if *ty == Type::BYTEA => b.to_sql(ty, out),
            other => Err(mismatch(other, ty)),
        }
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }

    to_sql_checked!();
}

/// Strings bind to text columns, and to the types [`decode_column`] reads
/// back as strings.
fn string_to_sql(s: &str, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
    if <&str as ToSql>::accepts(ty) {
        s.to_sql(ty, out)
    } else if *ty == Type::UUID {
        uuid::Uuid::parse_str(s)?.to_sql(ty, out)
    } else if *ty == Type::JSON || *ty == Type::JSONB {
        serde_json::from_str::<serde_json::Value>(s)?.to_sql(ty, out)
    } else if *ty == Type::NUMERIC {
        s.parse::<Decimal>()?.to_sql(ty, out)
    } else if *ty == Type::DATE {
        s.parse::<NaiveDate>()?.to_sql(ty, out)
    } else if *ty == Type::TIME {
        s.parse::<NaiveTime>()?.to_sql(ty, out)
    } else if *ty == Type::TIMESTAMP {
        s.parse::<NaiveDateTime>()?.to_sql(ty, out)
    } else if *ty == Type::TIMESTAMPTZ {
        DateTime::parse_from_rfc3339(s)?
            .with_timezone(&Utc)
            .to_sql(ty, out)
    } else {
        Err(mismatch(&Value::String(String::new()), ty))
    }
}

fn mismatch(value: &Value, ty: &Type) -> BoxError {
    let err = match value {
        Value::Bool(_) => WrongType::new::<bool>(ty.clone()),
        Value::Int(_) => WrongType::new::<i64>(ty.clone()),
        Value::Float(_) => WrongType::new::<f64>(ty.clone()),
        Value::Bytes(_) => WrongType::new::<Vec<u8>>(ty.clone()),
        Value::Null | Value::String(_) => WrongType::new::<String>(ty.clone()),
    };
    Box::new(err)
}

/// Borrow a parameter list in the shape `may_postgres` expects.
pub(crate) fn as_params(values: &[Value]) -> Vec<&dyn ToSql> {
    values.iter().map(|v| v as &dyn ToSql).collect()
}

/// Decode every column of a driver row into a [`Row`].
pub(crate) fn decode_row(row: &PgRow) -> Result<Row, OrmError> {
    let mut out = Row::with_capacity(row.columns().len());
    for (idx, column) in row.columns().iter().enumerate() {
        let value = decode_column(row, idx, column.type_())?;
        out.push(column.name(), value);
    }
    Ok(out)
}

fn decode_column(row: &PgRow, idx: usize, ty: &Type) -> Result<Value, OrmError> {
    let value = if *ty == Type::BOOL {
        row.try_get::<_, Option<bool>>(idx)?.map(Value::Bool)
    } else if *ty == Type::INT2 {
        row.try_get::<_, Option<i16>>(idx)?.map(|v| Value::Int(v.into()))
    } else if *ty == Type::INT4 {
        row.try_get::<_, Option<i32>>(idx)?.map(|v| Value::Int(v.into()))
    } else if *ty == Type::INT8 {
        row.try_get::<_, Option<i64>>(idx)?.map(Value::Int)
    } else if *ty == Type::OID {
        row.try_get::<_, Option<u32>>(idx)?.map(|v| Value::Int(v.into()))
    } else if *ty == Type::FLOAT4 {
        row.try_get::<_, Option<f32>>(idx)?.map(|v| Value::Float(v.into()))
    } else if *ty == Type::FLOAT8 {
        row.try_get::<_, Option<f64>>(idx)?.map(Value::Float)
    } else if *ty == Type::NUMERIC {
        row.try_get::<_, Option<Decimal>>(idx)?
            .map(|d| Value::String(d.to_string()))
    } else if *ty == Type::TEXT
        || *ty == Type::VARCHAR
        || *ty == Type::BPCHAR
        || *ty == Type::NAME
        || *ty == Type::UNKNOWN
    {
        row.try_get::<_, Option<String>>(idx)?.map(Value::String)
    } else if *ty == Type::BYTEA {
        row.try_get::<_, Option<Vec<u8>>>(idx)?.map(Value::Bytes)
    } else if *ty == Type::UUID {
        row.try_get::<_, Option<uuid::Uuid>>(idx)?
            .map(|u| Value::String(u.to_string()))
    } else if *ty == Type::JSON || *ty == Type::JSONB {
        row.try_get::<_, Option<serde_json::Value>>(idx)?
            .map(|j| Value::String(j.to_string()))
    } else if *ty == Type::DATE {
        row.try_get::<_, Option<NaiveDate>>(idx)?
            .map(|d| Value::String(d.to_string()))
    } else if *ty == Type::TIME {
        row.try_get::<_, Option<NaiveTime>>(idx)?
            .map(|t| Value::String(t.to_string()))
    } else if *ty == Type::TIMESTAMP {
        row.try_get::<_, Option<NaiveDateTime>>(idx)?
            .map(|t| Value::String(t.format("%Y-%m-%dT%H:%M:%S%.f").to_string()))
    } else if *ty == Type::TIMESTAMPTZ {
        row.try_get::<_, Option<DateTime<Utc>>>(idx)?
            .map(|t| Value::String(t.to_rfc3339()))
    } else {
        return Err(OrmError::ParseError(format!(
            "unsupported column type `{}` at index {idx}",
            ty.name()
        )));
    };
    Ok(value.unwrap_or(Value::Null))
}
