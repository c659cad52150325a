//! # simple-query-builder
//!
//! Deterministic assembly of parameterized PostgreSQL statements.
//!
//! Given a table name, an ordered column-value map and a few modifiers, the
//! builder returns SQL text using `$1`, `$2`, ... placeholders together with the
//! values to bind, in placeholder order. Nothing is executed and no connection
//! is held.
//!
//! ## Features
//!
//! - **find**: `SELECT` with equality filters, substring (`like`) filters,
//!   `ORDER BY` and `LIMIT`/`OFFSET`
//! - **count**: `SELECT COUNT(*)` over the same filters
//! - **update**: `UPDATE ... SET ... WHERE <pk>=$n`
//! - **delete**: `DELETE FROM ... WHERE <pk>=$1`
//! - **insert**: `INSERT INTO ... VALUES ... RETURNING <pk>`
//! - **sqlx binding** (feature `postgres`): turn a result into an unexecuted
//!   `sqlx` query
//!
//! ## Quick Start
//!
//! ```rust
//! use serde_json::json;
//! use simple_query_builder::{ColumnValues, LikeSpec, delete, find, insert, update};
//!
//! fn params(value: serde_json::Value) -> ColumnValues {
//!     value.as_object().cloned().unwrap_or_default()
//! }
//!
//! let query = find(
//!     "products",
//!     &params(json!({ "in_stock": true, "orderBy": "name.desc", "limit": 20 })),
//!     &["id", "name"],
//!     &LikeSpec::None,
//! )?;
//! assert_eq!(
//!     query.text,
//!     "SELECT id, name FROM products WHERE in_stock=$1 ORDER BY name DESC LIMIT $2 OFFSET $3"
//! );
//! assert_eq!(query.values, vec![json!(true), json!(20), json!(0)]);
//!
//! let query = update("products", &params(json!({ "name": "Widget" })), "id", 7)?;
//! assert_eq!(query.text, "UPDATE products SET name=$1 WHERE id=$2");
//!
//! let query = delete("products", "id", 7)?;
//! assert_eq!(query.text, "DELETE FROM products WHERE id=$1");
//!
//! let query = insert("products", "id", &params(json!({ "name": "Widget" })))?;
//! assert_eq!(query.text, "INSERT INTO products (name) VALUES ($1) RETURNING id");
//! # Ok::<(), simple_query_builder::QueryBuilderError>(())
//! ```
//!
//! ## Configuration
//!
//! Ordering and pagination each come in two policies, chosen per builder:
//!
//! ```rust
//! use simple_query_builder::{BuilderConfig, OrderByPolicy, PaginationPolicy, QueryBuilder};
//!
//! let builder = QueryBuilder::new(
//!     BuilderConfig::builder()
//!         .order_by(OrderByPolicy::Whitelist)      // default
//!         .pagination(PaginationPolicy::AlwaysOn)  // default
//!         .default_limit(10)                       // default
//!         .validate_identifiers(true)              // off by default
//!         .build(),
//! );
//!
//! // Bound order-by column and conditional pagination
//! let legacy = QueryBuilder::new(BuilderConfig::legacy());
//! ```
//!
//! ## Identifiers
//!
//! Table and column names are interpolated into the SQL text as given; only
//! values are parameterized. Pass trusted identifiers, or enable
//! `validate_identifiers` to reject anything outside a conservative allow-list.

pub mod builder;
pub mod config;
pub mod error;
#[cfg(feature = "postgres")]
pub mod postgres;
pub mod sql;
pub mod types;

// Re-export main types for convenience
pub use builder::{QueryBuilder, delete, find, insert, update};
pub use config::{BuilderConfig, BuilderConfigBuilder, OrderByPolicy, PaginationPolicy};
pub use error::{QueryBuilderError, Result};
pub use types::{
    ColumnValues, FindOptions, GeneratedQuery, LikeSpec, OrderBy, RESERVED_KEYS, SortDirection,
};

// Re-export SQL utilities for advanced users
pub use sql::sanitize::validate_identifier;
