//! Mapping between [`SqlValue`] and the PostgreSQL wire format

use crate::domain::{Result, SqlRow, SqlValue, TargetError};
use bytes::BytesMut;
use std::error::Error;
use tokio_postgres::types::{to_sql_checked, IsNull, ToSql, Type};
use tokio_postgres::Row;

type BoxError = Box<dyn Error + Sync + Send>;

fn is_text(ty: &Type) -> bool {
    *ty == Type::TEXT || *ty == Type::VARCHAR || *ty == Type::BPCHAR || *ty == Type::NAME
}

fn mismatch(value: &SqlValue, ty: &Type) -> BoxError {
    format!("cannot encode {} parameter as {}", value.kind(), ty.name()).into()
}

impl ToSql for SqlValue {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> std::result::Result<IsNull, BoxError> {
        match self {
            SqlValue::Null => Ok(IsNull::Yes),
            SqlValue::Bool(v) if *ty == Type::BOOL => v.to_sql(ty, out),
            SqlValue::Text(v) if is_text(ty) => v.as_str().to_sql(ty, out),
            SqlValue::Int(v) if *ty == Type::INT2 => i16::try_from(*v)?.to_sql(ty, out),
            SqlValue::Int(v) if *ty == Type::INT4 => i32::try_from(*v)?.to_sql(ty, out),
            SqlValue::Int(v) if *ty == Type::INT8 => v.to_sql(ty, out),
            SqlValue::Int(v) if *ty == Type::FLOAT8 => (*v as f64).to_sql(ty, out),
            SqlValue::Int(v) if *ty == Type::FLOAT4 => (*v as f32).to_sql(ty, out),
            SqlValue::Float(v) if *ty == Type::FLOAT8 => v.to_sql(ty, out),
            SqlValue::Float(v) if *ty == Type::FLOAT4 => (*v as f32).to_sql(ty, out),
            other => Err(mismatch(other, ty)),
        }
    }

    fn accepts(ty: &Type) -> bool {
        *ty == Type::BOOL
            || *ty == Type::INT2
            || *ty == Type::INT4
            || *ty == Type::INT8
            || *ty == Type::FLOAT4
            || *ty == Type::FLOAT8
            || is_text(ty)
    }

    to_sql_checked!();
}

/// Borrows a parameter slice in the form tokio-postgres expects
pub fn as_params(values: &[SqlValue]) -> Vec<&(dyn ToSql + Sync)> {
    values.iter().map(|v| v as &(dyn ToSql + Sync)).collect()
}

/// Converts a result row into a driver-neutral [`SqlRow`]
///
/// # Errors
///
/// Returns `TargetError::UnsupportedColumnType` for column types the engine
/// never selects.
pub fn row_to_sql_row(row: &Row) -> Result<SqlRow> {
    let mut values = Vec::with_capacity(row.len());

    for (idx, column) in row.columns().iter().enumerate() {
        let ty = column.type_();
        let decoded = if *ty == Type::BOOL {
            row.try_get::<_, Option<bool>>(idx).map(SqlValue::from)
        } else if *ty == Type::INT2 {
            row.try_get::<_, Option<i16>>(idx)
                .map(|v| v.map(i64::from).into())
        } else if *ty == Type::INT4 {
            row.try_get::<_, Option<i32>>(idx)
                .map(|v| v.map(i64::from).into())
        } else if *ty == Type::INT8 {
            row.try_get::<_, Option<i64>>(idx).map(SqlValue::from)
        } else if *ty == Type::FLOAT4 {
            row.try_get::<_, Option<f32>>(idx)
                .map(|v| v.map(f64::from).into())
        } else if *ty == Type::FLOAT8 {
            row.try_get::<_, Option<f64>>(idx).map(SqlValue::from)
        } else if is_text(ty) {
            row.try_get::<_, Option<String>>(idx).map(SqlValue::from)
        } else {
            return Err(TargetError::UnsupportedColumnType {
                column: column.name().to_string(),
                column_type: ty.name().to_string(),
            }
            .into());
        };

        let value = decoded.map_err(|e| {
            TargetError::QueryFailed(format!("Failed to decode column {}: {e}", column.name()))
        })?;
        values.push(value);
    }

    Ok(SqlRow::new(values))
}
