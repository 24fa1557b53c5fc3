use chrono::{NaiveDate, NaiveDateTime};
use serde_json::Value;
use sqlx::MySqlPool;

use crate::error::ApiError;

/// ===============================
/// SQL bindable value enum
/// ===============================
#[derive(Debug)]
pub enum SqlValue {
    String(String),
    I64(i64),
    F64(f64),
    Bool(bool),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Null,
}

/// LIMIT/OFFSET start position for a 1-based page. Computed in i64, the
/// type it is bound as, so oversized page numbers cannot wrap.
pub fn page_offset(page: u32, per_page: u32) -> i64 {
    (page as i64 - 1) * per_page as i64
}

/// ===============================
/// SQL update container
/// ===============================
#[derive(Debug)]
pub struct SqlUpdate {
    pub sql: String,
    pub values: Vec<SqlValue>,
}

/// ===============================
/// Build dynamic UPDATE SQL
/// ===============================
///
/// Only columns in `allowed` may appear in the payload, so callers
/// control exactly which columns a PUT endpoint can touch.
pub fn build_update_sql(
    table: &str,
    payload: &Value,
    allowed: &[&str],
    id_column: &str,
    id_value: i64,
) -> Result<SqlUpdate, ApiError> {
    let obj = payload
        .as_object()
        .ok_or_else(|| ApiError::validation("Payload must be a JSON object"))?;

    if obj.is_empty() {
        return Err(ApiError::validation("No fields provided for update"));
    }

    for key in obj.keys() {
        if !allowed.contains(&key.as_str()) {
            return Err(ApiError::validation(format!("Unknown field: {}", key)));
        }
    }

    // Build SET clause
    let set_clause = obj
        .keys()
        .map(|k| format!("{} = ?", k))
        .collect::<Vec<_>>()
        .join(", ");

    let sql = format!("UPDATE {} SET {} WHERE {} = ?", table, set_clause, id_column);

    let mut values = Vec::with_capacity(obj.len() + 1);

    // Convert JSON values → SqlValue
    for value in obj.values() {
        match value {
            Value::String(s) => {
                if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
                    values.push(SqlValue::Date(d));
                } else if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
                    values.push(SqlValue::DateTime(dt));
                } else {
                    values.push(SqlValue::String(s.clone()));
                }
            }
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    values.push(SqlValue::I64(i));
                } else if let Some(f) = n.as_f64() {
                    values.push(SqlValue::F64(f));
                }
            }
            Value::Bool(b) => values.push(SqlValue::Bool(*b)),
            Value::Null => values.push(SqlValue::Null),
            _ => return Err(ApiError::validation("Unsupported JSON value type")),
        }
    }

    // WHERE id = ?
    values.push(SqlValue::I64(id_value));

    Ok(SqlUpdate { sql, values })
}

/// ===============================
/// Execute the update
/// ===============================
pub async fn execute_update(pool: &MySqlPool, update: SqlUpdate) -> Result<u64, ApiError> {
    let mut query = sqlx::query(&update.sql);

    for value in update.values {
        query = match value {
            SqlValue::String(v) => query.bind(v),
            SqlValue::I64(v) => query.bind(v),
            SqlValue::F64(v) => query.bind(v),
            SqlValue::Bool(v) => query.bind(v),
            SqlValue::Date(v) => query.bind(v),
            SqlValue::DateTime(v) => query.bind(v),
            SqlValue::Null => query.bind(None::<String>),
        };
    }

    let result = query.execute(pool).await?;
    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builds_set_clause_for_allowed_columns() {
        let payload = json!({"name": "Ana", "monthly_salary": 30000.0});
        let update =
            build_update_sql("employees", &payload, &["name", "monthly_salary"], "id", 5)
                .unwrap();
        assert!(update.sql.starts_with("UPDATE employees SET "));
        assert!(update.sql.contains("name = ?"));
        assert!(update.sql.contains("monthly_salary = ?"));
        assert!(update.sql.ends_with("WHERE id = ?"));
        assert_eq!(update.values.len(), 3);
    }

    #[test]
    fn rejects_unknown_column() {
        let payload = json!({"is_admin": true});
        let err = build_update_sql("employees", &payload, &["name"], "id", 5).unwrap_err();
        assert!(err.to_string().contains("Unknown field"));
    }

    #[test]
    fn rejects_empty_payload() {
        let payload = json!({});
        assert!(build_update_sql("employees", &payload, &["name"], "id", 1).is_err());
    }

    #[test]
    fn page_offset_survives_absurd_page_numbers() {
        assert_eq!(page_offset(1, 20), 0);
        assert_eq!(page_offset(3, 20), 40);
        assert_eq!(page_offset(u32::MAX, 100), (u32::MAX as i64 - 1) * 100);
    }

    #[test]
    fn parses_date_strings() {
        let payload = json!({"hire_date": "2023-04-01"});
        let update = build_update_sql("employees", &payload, &["hire_date"], "id", 2).unwrap();
        assert!(matches!(update.values[0], SqlValue::Date(_)));
    }
}
