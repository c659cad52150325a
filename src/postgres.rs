//! Binding generated queries onto sqlx
//!
//! Produces an unexecuted `sqlx` query; running it is up to the caller.

use serde_json::Value;
use sqlx::Postgres;
use sqlx::postgres::PgArguments;
use sqlx::query::Query;

use crate::types::GeneratedQuery;

impl GeneratedQuery {
    /// Create a sqlx query with every value bound in placeholder order
    ///
    /// Values bind with the type of their JSON form: booleans as `bool`,
    /// integers as `int8`, other numbers as `float8`, strings and `NULL` as
    /// `text`, arrays and objects as `jsonb`. A `NULL` or string value therefore
    /// only fits a text-compatible column; cast the placeholder in SQL
    /// (`$1::uuid`) or bind through sqlx directly for other column types.
    pub fn to_sqlx(&self) -> Query<'_, Postgres, PgArguments> {
        self.values
            .iter()
            .fold(sqlx::query(&self.text), |query, value| bind_value(query, value))
    }
}

fn bind_value<'q>(
    query: Query<'q, Postgres, PgArguments>,
    value: &'q Value,
) -> Query<'q, Postgres, PgArguments> {
    match value {
        Value::Null => query.bind(None::<String>),
        Value::Bool(b) => query.bind(*b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => query.bind(i),
            None => query.bind(n.as_f64()),
        },
        Value::String(s) => query.bind(s.as_str()),
        Value::Array(_) | Value::Object(_) => query.bind(value),
    }
}
