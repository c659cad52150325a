//! SQL identifier allow-list
//!
//! Table and column names are interpolated into SQL text verbatim. When they
//! may come from untrusted input, check them here first.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{QueryBuilderError, Result};

static IDENTIFIER_PART: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_$]*$").expect("identifier pattern is valid")
});

/// PostgreSQL reserved keywords that cannot be used as unquoted identifiers
pub const POSTGRES_RESERVED_WORDS: &[&str] = &[
    "ALL",
    "ANALYSE",
    "ANALYZE",
    "AND",
    "ANY",
    "ARRAY",
    "AS",
    "ASC",
    "ASYMMETRIC",
    "BOTH",
    "CASE",
    "CAST",
    "CHECK",
    "COLLATE",
    "COLUMN",
    "CONSTRAINT",
    "CREATE",
    "CURRENT_CATALOG",
    "CURRENT_DATE",
    "CURRENT_ROLE",
    "CURRENT_TIME",
    "CURRENT_TIMESTAMP",
    "CURRENT_USER",
    "DEFAULT",
    "DEFERRABLE",
    "DESC",
    "DISTINCT",
    "DO",
    "ELSE",
    "END",
    "EXCEPT",
    "FALSE",
    "FETCH",
    "FOR",
    "FOREIGN",
    "FROM",
    "GRANT",
    "GROUP",
    "HAVING",
    "IN",
    "INITIALLY",
    "INTERSECT",
    "INTO",
    "LATERAL",
    "LEADING",
    "LIMIT",
    "LOCALTIME",
    "LOCALTIMESTAMP",
    "NOT",
    "NULL",
    "OFFSET",
    "ON",
    "ONLY",
    "OR",
    "ORDER",
    "PLACING",
    "PRIMARY",
    "REFERENCES",
    "RETURNING",
    "SELECT",
    "SESSION_USER",
    "SOME",
    "SYMMETRIC",
    "TABLE",
    "THEN",
    "TO",
    "TRAILING",
    "TRUE",
    "UNION",
    "UNIQUE",
    "USER",
    "USING",
    "VARIADIC",
    "WHEN",
    "WHERE",
    "WINDOW",
    "WITH",
];

/// Validate a table or column name
///
/// Rules:
/// - Dotted names (`schema.table`) are checked part by part
/// - Each part starts with a letter or underscore
/// - Each part contains only letters, digits, underscores and `$`
/// - No part may be a PostgreSQL reserved word
///
/// # Example
/// ```
/// use simple_query_builder::sql::validate_identifier;
///
/// assert!(validate_identifier("products").is_ok());
/// assert!(validate_identifier("public.orderItems").is_ok());
/// assert!(validate_identifier("select").is_err()); // reserved keyword
/// assert!(validate_identifier("name; DROP TABLE x").is_err());
/// ```
pub fn validate_identifier(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(QueryBuilderError::validation("Identifier cannot be empty"));
    }

    for part in name.split('.') {
        if !IDENTIFIER_PART.is_match(part) {
            return Err(QueryBuilderError::validation(format!(
                "Identifier '{}' is invalid. Each part must start with a letter or underscore and contain only letters, digits, underscores and '$'.",
                name
            )));
        }

        if POSTGRES_RESERVED_WORDS.contains(&part.to_uppercase().as_str()) {
            return Err(QueryBuilderError::validation(format!(
                "Identifier '{}' is a PostgreSQL reserved keyword and cannot be used.",
                part
            )));
        }
    }

    Ok(())
}

/// Validate an entry of the select list; `*` is accepted
pub fn validate_select_column(name: &str) -> Result<()> {
    if name == "*" {
        return Ok(());
    }
    validate_identifier(name)
}
