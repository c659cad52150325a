//! SQL fragment builders
//!
//! Clause, ordering and pagination pieces composed by `QueryBuilder`, plus the
//! optional identifier allow-list.

pub mod clause;
pub mod order;
pub mod pagination;
pub mod sanitize;

pub use clause::{ClauseSet, build_equality_clauses, build_like_clauses};
pub use order::{build_bound_order_by, build_whitelist_order_by, resolve_order_terms};
pub use pagination::{build_always_on_pagination, build_conditional_pagination, coerce_page};
pub use sanitize::{POSTGRES_RESERVED_WORDS, validate_identifier, validate_select_column};
