//! Query assembly
//!
//! `QueryBuilder` turns a table name, a column-value map and light modifiers
//! into SQL text plus ordered bind values. It performs no I/O and keeps no
//! state between calls, so one builder can be shared freely across threads.

use std::borrow::Cow;

use serde_json::Value;

use crate::config::{BuilderConfig, OrderByPolicy, PaginationPolicy};
use crate::error::Result;
use crate::sql::clause::{build_equality_clauses, build_like_clauses};
use crate::sql::order::{build_bound_order_by, build_whitelist_order_by};
use crate::sql::pagination::{build_always_on_pagination, build_conditional_pagination};
use crate::sql::sanitize::{validate_identifier, validate_select_column};
use crate::types::{ColumnValues, FindOptions, GeneratedQuery, LikeSpec};

/// Builds parameterized `SELECT`, `UPDATE`, `DELETE` and `INSERT` statements
#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    config: BuilderConfig,
}

impl QueryBuilder {
    pub fn new(config: BuilderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    /// Build a `SELECT` from a flat parameter map
    ///
    /// The reserved keys `limit`, `offset`, `orderBy` and `isAscOrder` are
    /// taken out as modifiers; every other entry becomes a filter.
    ///
    /// # Example
    /// ```
    /// use serde_json::json;
    /// use simple_query_builder::{LikeSpec, QueryBuilder};
    ///
    /// let params = json!({ "a": 1, "b": "x" }).as_object().cloned().unwrap();
    /// let query = QueryBuilder::default()
    ///     .find("t", &params, &["a", "b"], &LikeSpec::columns(["b"]))
    ///     .unwrap();
    ///
    /// assert_eq!(query.text, "SELECT a, b FROM t WHERE a=$1 AND b like $2 LIMIT $3 OFFSET $4");
    /// assert_eq!(query.values, vec![json!(1), json!("%x%"), json!(10), json!(0)]);
    /// ```
    pub fn find<S: AsRef<str>>(
        &self,
        table: &str,
        params: &ColumnValues,
        columns_to_select: &[S],
        like: &LikeSpec,
    ) -> Result<GeneratedQuery> {
        let (options, filters) = FindOptions::extract(params)?;
        self.find_with_options(table, &filters, &options, columns_to_select, like)
    }

    /// Build a `SELECT` from explicit filters and options
    ///
    /// Every entry of `filters` is a filter, including ones named like the
    /// reserved modifier keys.
    pub fn find_with_options<S: AsRef<str>>(
        &self,
        table: &str,
        filters: &ColumnValues,
        options: &FindOptions,
        columns_to_select: &[S],
        like: &LikeSpec,
    ) -> Result<GeneratedQuery> {
        if self.config.validate_identifiers {
            validate_identifier(table)?;
            for column in columns_to_select {
                validate_select_column(column.as_ref())?;
            }
            validate_filter_columns(filters, like)?;
        }

        let select_list = if columns_to_select.is_empty() {
            "*".to_string()
        } else {
            columns_to_select
                .iter()
                .map(|c| c.as_ref())
                .collect::<Vec<_>>()
                .join(", ")
        };

        let mut text = format!("SELECT {} FROM {}", select_list, table);
        let (where_clause, mut values) = build_where_clause(filters, like);
        text.push_str(&where_clause);

        match self.config.order_by {
            OrderByPolicy::BoundColumn => {
                if let Some((clause, value)) = build_bound_order_by(
                    options.order_by.as_ref(),
                    options.is_asc_order,
                    values.len() + 1,
                )? {
                    text.push_str(&clause);
                    values.push(value);
                }
            }
            OrderByPolicy::Whitelist => {
                if let Some(clause) =
                    build_whitelist_order_by(options.order_by.as_ref(), columns_to_select)
                {
                    text.push_str(&clause);
                }
            }
        }

        let (page_clause, page_values) = match self.config.pagination {
            PaginationPolicy::Conditional => build_conditional_pagination(
                options.limit.as_ref(),
                options.offset.as_ref(),
                values.len() + 1,
            ),
            PaginationPolicy::AlwaysOn => build_always_on_pagination(
                options.limit.as_ref(),
                options.offset.as_ref(),
                values.len() + 1,
                self.config.default_limit,
                self.config.default_offset,
            ),
        };
        text.push_str(&page_clause);
        values.extend(page_values);

        let query = GeneratedQuery::new(text, values);
        tracing::debug!(table, sql = %query.text, params = query.values.len(), "built select query");
        Ok(query)
    }

    /// Build `SELECT COUNT(*)` over the same filters `find` would apply
    ///
    /// Ordering and pagination modifiers are ignored.
    pub fn count(
        &self,
        table: &str,
        params: &ColumnValues,
        like: &LikeSpec,
    ) -> Result<GeneratedQuery> {
        let (_, filters) = FindOptions::extract(params)?;
        if self.config.validate_identifiers {
            validate_identifier(table)?;
            validate_filter_columns(&filters, like)?;
        }

        let (where_clause, values) = build_where_clause(&filters, like);
        let query = GeneratedQuery::new(
            format!("SELECT COUNT(*) FROM {}{}", table, where_clause),
            values,
        );
        tracing::debug!(table, sql = %query.text, params = query.values.len(), "built count query");
        Ok(query)
    }

    /// Build `UPDATE <table> SET ... WHERE <pk>=$n`
    ///
    /// The primary key column is never part of the `SET` list, and its value
    /// always comes from `primary_key_value`.
    pub fn update(
        &self,
        table: &str,
        params: &ColumnValues,
        primary_key_column: &str,
        primary_key_value: impl Into<Value>,
    ) -> Result<GeneratedQuery> {
        if self.config.validate_identifiers {
            validate_identifier(table)?;
            validate_identifier(primary_key_column)?;
            validate_columns(params.keys())?;
        }

        let columns: Vec<&str> = params
            .keys()
            .map(String::as_str)
            .filter(|c| *c != primary_key_column)
            .collect();

        let mut set = build_equality_clauses(&columns, params);
        set.values.push(primary_key_value.into());

        let query = GeneratedQuery::new(
            format!(
                "UPDATE {} SET {} WHERE {}=${}",
                table,
                set.join(", "),
                primary_key_column,
                set.values.len()
            ),
            set.values,
        );
        tracing::debug!(table, sql = %query.text, params = query.values.len(), "built update query");
        Ok(query)
    }

    /// Build `DELETE FROM <table> WHERE <pk>=$1`
    pub fn delete(
        &self,
        table: &str,
        primary_key_column: &str,
        primary_key_value: impl Into<Value>,
    ) -> Result<GeneratedQuery> {
        if self.config.validate_identifiers {
            validate_identifier(table)?;
            validate_identifier(primary_key_column)?;
        }

        let query = GeneratedQuery::new(
            format!("DELETE FROM {} WHERE {}=$1", table, primary_key_column),
            vec![primary_key_value.into()],
        );
        tracing::debug!(table, sql = %query.text, "built delete query");
        Ok(query)
    }

    /// Build `INSERT INTO <table> (...) VALUES (...) RETURNING <pk>`
    ///
    /// Columns are inserted in map order. `primary_key_column` only names the
    /// returned column; it is inserted like any other when present in `params`.
    pub fn insert(
        &self,
        table: &str,
        primary_key_column: &str,
        params: &ColumnValues,
    ) -> Result<GeneratedQuery> {
        if self.config.validate_identifiers {
            validate_identifier(table)?;
            validate_identifier(primary_key_column)?;
            validate_columns(params.keys())?;
        }

        let columns: Vec<&str> = params.keys().map(String::as_str).collect();
        let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("${}", i)).collect();

        let query = GeneratedQuery::new(
            format!(
                "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
                table,
                columns.join(", "),
                placeholders.join(", "),
                primary_key_column
            ),
            params.values().cloned().collect(),
        );
        tracing::debug!(table, sql = %query.text, params = query.values.len(), "built insert query");
        Ok(query)
    }
}

/// Render ` WHERE ...` for equality filters followed by like filters
///
/// Returns an empty clause when there is nothing to filter on.
fn build_where_clause(filters: &ColumnValues, like: &LikeSpec) -> (String, Vec<Value>) {
    let (equality_source, like_source) = split_like_filters(filters, like);

    let equality_columns: Vec<&str> = equality_source.keys().map(String::as_str).collect();
    let equality = build_equality_clauses(&equality_columns, &equality_source);
    let like = build_like_clauses(&like_source, equality.len());

    if equality.is_empty() && like.is_empty() {
        return (String::new(), Vec::new());
    }

    let mut clause = String::from(" WHERE ");
    clause.push_str(&equality.join(" AND "));
    if !equality.is_empty() && !like.is_empty() {
        clause.push_str(" AND ");
    }
    clause.push_str(&like.join(" AND "));

    let mut values = equality.values;
    values.extend(like.values);
    (clause, values)
}

/// Separate the equality filters from the substring filters
fn split_like_filters<'a>(
    filters: &'a ColumnValues,
    like: &'a LikeSpec,
) -> (Cow<'a, ColumnValues>, Cow<'a, ColumnValues>) {
    match like {
        LikeSpec::None => (Cow::Borrowed(filters), Cow::Owned(ColumnValues::new())),
        LikeSpec::Values(values) => (Cow::Borrowed(filters), Cow::Borrowed(values)),
        LikeSpec::Columns(columns) => {
            let mut equality = ColumnValues::new();
            let mut substring = ColumnValues::new();
            for (column, value) in filters {
                if columns.iter().any(|c| c == column) {
                    substring.insert(column.clone(), value.clone());
                } else {
                    equality.insert(column.clone(), value.clone());
                }
            }
            (Cow::Owned(equality), Cow::Owned(substring))
        }
    }
}

fn validate_columns<'a>(columns: impl IntoIterator<Item = &'a String>) -> Result<()> {
    for column in columns {
        validate_identifier(column)?;
    }
    Ok(())
}

fn validate_filter_columns(filters: &ColumnValues, like: &LikeSpec) -> Result<()> {
    validate_columns(filters.keys())?;
    if let LikeSpec::Values(values) = like {
        validate_columns(values.keys())?;
    }
    Ok(())
}

// ============================================================================
// Default-configured entry points
// ============================================================================

/// `find` with the default configuration (whitelist ordering, always-on pagination)
pub fn find<S: AsRef<str>>(
    table: &str,
    params: &ColumnValues,
    columns_to_select: &[S],
    like: &LikeSpec,
) -> Result<GeneratedQuery> {
    QueryBuilder::default().find(table, params, columns_to_select, like)
}

/// `update` with the default configuration
pub fn update(
    table: &str,
    params: &ColumnValues,
    primary_key_column: &str,
    primary_key_value: impl Into<Value>,
) -> Result<GeneratedQuery> {
    QueryBuilder::default().update(table, params, primary_key_column, primary_key_value)
}

/// `delete` with the default configuration
pub fn delete(
    table: &str,
    primary_key_column: &str,
    primary_key_value: impl Into<Value>,
) -> Result<GeneratedQuery> {
    QueryBuilder::default().delete(table, primary_key_column, primary_key_value)
}

/// `insert` with the default configuration
pub fn insert(
    table: &str,
    primary_key_column: &str,
    params: &ColumnValues,
) -> Result<GeneratedQuery> {
    QueryBuilder::default().insert(table, primary_key_column, params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QueryBuilderError;
    use serde_json::json;

    fn params(value: Value) -> ColumnValues {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {}", other),
        }
    }

    fn legacy() -> QueryBuilder {
        QueryBuilder::new(BuilderConfig::legacy())
    }

    fn validating() -> QueryBuilder {
        QueryBuilder::new(BuilderConfig::builder().validate_identifiers(true).build())
    }

    // ==================== WHERE composition ====================

    #[test]
    fn test_where_equality_only() {
        let (clause, values) =
            build_where_clause(&params(json!({ "a": 1, "b": 2 })), &LikeSpec::None);

        assert_eq!(clause, " WHERE a=$1 AND b=$2");
        assert_eq!(values, vec![json!(1), json!(2)]);
    }

    #[test]
    fn test_where_like_only() {
        let like = LikeSpec::values(params(json!({ "name": "wid" })));
        let (clause, values) = build_where_clause(&ColumnValues::new(), &like);

        assert_eq!(clause, " WHERE name like $1");
        assert_eq!(values, vec![json!("%wid%")]);
    }

    #[test]
    fn test_where_equality_then_like_map() {
        let like = LikeSpec::values(params(json!({ "name": "wid", "sku": "01" })));
        let (clause, values) = build_where_clause(&params(json!({ "active": true })), &like);

        assert_eq!(clause, " WHERE active=$1 AND name like $2 AND sku like $3");
        assert_eq!(values, vec![json!(true), json!("%wid%"), json!("%01%")]);
    }

    #[test]
    fn test_where_like_columns_move_out_of_equality() {
        let like = LikeSpec::columns(["name"]);
        let (clause, values) = build_where_clause(
            &params(json!({ "name": "wid", "active": true, "kind": "tool" })),
            &like,
        );

        assert_eq!(clause, " WHERE active=$1 AND kind=$2 AND name like $3");
        assert_eq!(values, vec![json!(true), json!("tool"), json!("%wid%")]);
    }

    #[test]
    fn test_where_like_columns_absent_from_filters_are_skipped() {
        let like = LikeSpec::columns(["name"]);
        let (clause, values) = build_where_clause(&params(json!({ "a": 1 })), &like);

        assert_eq!(clause, " WHERE a=$1");
        assert_eq!(values, vec![json!(1)]);
    }

    #[test]
    fn test_where_like_map_keeps_equality_on_same_column() {
        let like = LikeSpec::values(params(json!({ "name": "wid" })));
        let (clause, _) = build_where_clause(&params(json!({ "name": "Widget" })), &like);

        assert_eq!(clause, " WHERE name=$1 AND name like $2");
    }

    #[test]
    fn test_where_empty() {
        let (clause, values) =
            build_where_clause(&ColumnValues::new(), &LikeSpec::columns(["x"]));

        assert_eq!(clause, "");
        assert!(values.is_empty());
    }

    // ==================== find (default policies) ====================

    #[test]
    fn test_find_no_filters_always_paginates() {
        let query = find("t", &ColumnValues::new(), &["a", "b"], &LikeSpec::None).unwrap();

        assert_eq!(query.text, "SELECT a, b FROM t LIMIT $1 OFFSET $2");
        assert_eq!(query.values, vec![json!(10), json!(0)]);
    }

    #[test]
    fn test_find_whitelist_order_by_list() {
        let query = find(
            "products",
            &params(json!({
                "active": true,
                "orderBy": ["price.desc", "secret", "name"],
                "limit": "25",
                "offset": 50
            })),
            &["name", "price"],
            &LikeSpec::None,
        )
        .unwrap();

        assert_eq!(
            query.text,
            "SELECT name, price FROM products WHERE active=$1 ORDER BY price DESC, name ASC LIMIT $2 OFFSET $3"
        );
        assert_eq!(query.values, vec![json!(true), json!(25), json!(50)]);
    }

    #[test]
    fn test_find_whitelist_ignores_is_asc_order() {
        let query = find(
            "t",
            &params(json!({ "orderBy": "a", "isAscOrder": false })),
            &["a"],
            &LikeSpec::None,
        )
        .unwrap();

        assert_eq!(query.text, "SELECT a FROM t ORDER BY a ASC LIMIT $1 OFFSET $2");
    }

    #[test]
    fn test_ascending_option_applies_to_bound_column_only() {
        let options = FindOptions::new().order_by("a").ascending(false);
        let filters = ColumnValues::new();

        let whitelist = QueryBuilder::default()
            .find_with_options("t", &filters, &options, &["a"], &LikeSpec::None)
            .unwrap();
        assert_eq!(whitelist.text, "SELECT a FROM t ORDER BY a ASC LIMIT $1 OFFSET $2");

        let bound = QueryBuilder::new(BuilderConfig::legacy())
            .find_with_options("t", &filters, &options, &["a"], &LikeSpec::None)
            .unwrap();
        assert_eq!(bound.text, "SELECT a FROM t ORDER BY $1 DESC");

        let suffixed = QueryBuilder::default()
            .find_with_options(
                "t",
                &filters,
                &FindOptions::new().order_by("a.desc"),
                &["a"],
                &LikeSpec::None,
            )
            .unwrap();
        assert_eq!(suffixed.text, "SELECT a FROM t ORDER BY a DESC LIMIT $1 OFFSET $2");
    }

    #[test]
    fn test_find_invalid_order_by_shape_fails() {
        let result = find("t", &params(json!({ "orderBy": 7 })), &["a"], &LikeSpec::None);
        assert!(matches!(result, Err(QueryBuilderError::InvalidModifier(_))));
    }

    #[test]
    fn test_find_empty_select_list_uses_star() {
        let query = find::<&str>("t", &ColumnValues::new(), &[], &LikeSpec::None).unwrap();
        assert_eq!(query.text, "SELECT * FROM t LIMIT $1 OFFSET $2");
    }

    #[test]
    fn test_find_with_options_treats_reserved_names_as_filters() {
        let options = FindOptions::new().limit(5);
        let query = QueryBuilder::default()
            .find_with_options(
                "t",
                &params(json!({ "limit": 3 })),
                &options,
                &["limit"],
                &LikeSpec::None,
            )
            .unwrap();

        assert_eq!(query.text, "SELECT limit FROM t WHERE limit=$1 LIMIT $2 OFFSET $3");
        assert_eq!(query.values, vec![json!(3), json!(5), json!(0)]);
    }

    #[test]
    fn test_find_custom_default_limit() {
        let builder = QueryBuilder::new(BuilderConfig::builder().default_limit(50).build());
        let query = builder
            .find("t", &params(json!({ "limit": "abc" })), &["a"], &LikeSpec::None)
            .unwrap();

        assert_eq!(query.values, vec![json!(50), json!(0)]);
    }

    // ==================== find (legacy policies) ====================

    #[test]
    fn test_legacy_find_full() {
        let query = legacy()
            .find(
                "theTable",
                &params(json!({
                    "fee": "fi",
                    "fo": "fum",
                    "orderBy": "foo",
                    "limit": 10,
                    "offset": 20,
                    "isAscOrder": false
                })),
                &["foo", "bar"],
                &LikeSpec::None,
            )
            .unwrap();

        assert_eq!(
            query.text,
            "SELECT foo, bar FROM theTable WHERE fee=$1 AND fo=$2 ORDER BY $3 DESC LIMIT $4 OFFSET $5"
        );
        assert_eq!(
            query.values,
            vec![json!("fi"), json!("fum"), json!("foo"), json!(10), json!(20)]
        );
    }

    #[test]
    fn test_legacy_find_no_where() {
        let query = legacy()
            .find("theTable", &ColumnValues::new(), &["foo", "bar"], &LikeSpec::None)
            .unwrap();

        assert_eq!(query.text, "SELECT foo, bar FROM theTable");
        assert!(query.values.is_empty());
    }

    #[test]
    fn test_legacy_find_order_after_like() {
        let like = LikeSpec::values(params(json!({ "name": "x" })));
        let query = legacy()
            .find(
                "t",
                &params(json!({ "a": 1, "orderBy": "name", "isAscOrder": true })),
                &["a", "name"],
                &like,
            )
            .unwrap();

        assert_eq!(query.text, "SELECT a, name FROM t WHERE a=$1 AND name like $2 ORDER BY $3 ASC");
        assert_eq!(query.values, vec![json!(1), json!("%x%"), json!("name")]);
    }

    #[test]
    fn test_legacy_find_rejects_order_list() {
        let result = legacy().find(
            "t",
            &params(json!({ "orderBy": ["a.desc"] })),
            &["a"],
            &LikeSpec::None,
        );
        assert!(result.is_err());
    }

    // ==================== count ====================

    #[test]
    fn test_count_ignores_modifiers() {
        let query = QueryBuilder::default()
            .count(
                "t",
                &params(json!({ "a": 1, "limit": 5, "orderBy": "a" })),
                &LikeSpec::columns(["a"]),
            )
            .unwrap();

        assert_eq!(query.text, "SELECT COUNT(*) FROM t WHERE a like $1");
        assert_eq!(query.values, vec![json!("%1%")]);
    }

    #[test]
    fn test_count_without_filters() {
        let query = QueryBuilder::default()
            .count("t", &ColumnValues::new(), &LikeSpec::None)
            .unwrap();

        assert_eq!(query.text, "SELECT COUNT(*) FROM t");
        assert!(query.values.is_empty());
    }

    // ==================== update / delete / insert ====================

    #[test]
    fn test_update_excludes_primary_key() {
        let query = update("t", &params(json!({ "a": 1, "b": 2, "pk": 9 })), "pk", 9).unwrap();

        assert_eq!(query.text, "UPDATE t SET a=$1, b=$2 WHERE pk=$3");
        assert_eq!(query.values, vec![json!(1), json!(2), json!(9)]);
    }

    #[test]
    fn test_update_primary_key_value_comes_from_argument() {
        let query = update("t", &params(json!({ "a": 1, "pk": 100 })), "pk", 9).unwrap();

        assert_eq!(query.text, "UPDATE t SET a=$1 WHERE pk=$2");
        assert_eq!(query.values, vec![json!(1), json!(9)]);
    }

    #[test]
    fn test_delete() {
        let query = delete("t", "pk", 5).unwrap();

        assert_eq!(query.text, "DELETE FROM t WHERE pk=$1");
        assert_eq!(query.values, vec![json!(5)]);
    }

    #[test]
    fn test_insert_keeps_primary_key_column() {
        let query = insert("t", "id", &params(json!({ "id": "u1", "a": 1 }))).unwrap();

        assert_eq!(query.text, "INSERT INTO t (id, a) VALUES ($1, $2) RETURNING id");
        assert_eq!(query.values, vec![json!("u1"), json!(1)]);
    }

    // ==================== Identifier validation ====================

    #[test]
    fn test_validation_disabled_by_default() {
        let query = delete("t; DROP TABLE x", "pk", 1).unwrap();
        assert_eq!(query.text, "DELETE FROM t; DROP TABLE x WHERE pk=$1");
    }

    #[test]
    fn test_validation_rejects_bad_table() {
        let result = validating().delete("t; DROP TABLE x", "pk", 1);
        assert!(matches!(result, Err(QueryBuilderError::Validation(_))));
    }

    #[test]
    fn test_validation_rejects_bad_filter_column() {
        let result = validating().find(
            "t",
            &params(json!({ "a OR 1=1 --": 1 })),
            &["a"],
            &LikeSpec::None,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_validation_rejects_bad_like_column() {
        let like = LikeSpec::values(params(json!({ "bad name": "x" })));
        let result = validating().count("t", &ColumnValues::new(), &like);
        assert!(result.is_err());
    }

    #[test]
    fn test_validation_rejects_bad_insert_column() {
        let result = validating().insert("t", "id", &params(json!({ "a)": 1 })));
        assert!(result.is_err());
    }

    #[test]
    fn test_validation_accepts_good_input() {
        let builder = validating();

        assert!(
            builder
                .find("public.items", &params(json!({ "a": 1, "limit": 5 })), &["*"], &LikeSpec::None)
                .is_ok()
        );
        assert!(builder.update("items", &params(json!({ "a": 1 })), "id", 1).is_ok());
        assert!(builder.insert("items", "id", &params(json!({ "a": 1 }))).is_ok());
    }
}
