//! ORDER BY rendering
//!
//! Two policies: a single bound column, or literal `column[.direction]` tokens
//! filtered against the selected columns.

use serde_json::Value;

use crate::error::{QueryBuilderError, Result};
use crate::types::{OrderBy, SortDirection};

/// Render ` ORDER BY $n [ASC|DESC]` binding the column name as a value
///
/// `next_param` is the placeholder number to use. Returns `None` when there is
/// no order-by column or it is empty; a token list is rejected.
pub fn build_bound_order_by(
    order_by: Option<&OrderBy>,
    is_asc_order: Option<bool>,
    next_param: usize,
) -> Result<Option<(String, Value)>> {
    let column = match order_by {
        None => return Ok(None),
        Some(OrderBy::Column(c)) => c,
        Some(OrderBy::Tokens(_)) => {
            return Err(QueryBuilderError::invalid_modifier(
                "bound order-by takes a single column name, not a list",
            ));
        }
    };

    if column.is_empty() {
        return Ok(None);
    }

    let mut clause = format!(" ORDER BY ${}", next_param);
    match is_asc_order {
        Some(true) => clause.push_str(" ASC"),
        Some(false) => clause.push_str(" DESC"),
        None => {}
    }

    Ok(Some((clause, Value::String(column.clone()))))
}

/// Parse, filter and deduplicate order tokens
///
/// A token is `column` or `column.direction`. Tokens naming a column outside
/// `allowed` or carrying an unknown direction are dropped. A repeated column
/// keeps its first position and takes the last direction.
pub fn resolve_order_terms<S: AsRef<str>>(
    order_by: &OrderBy,
    allowed: &[S],
) -> Vec<(String, SortDirection)> {
    let mut terms: Vec<(String, SortDirection)> = Vec::new();

    for token in order_by.tokens() {
        let (column, direction) = match token.split_once('.') {
            Some((column, direction)) => (column, SortDirection::parse(direction)),
            None => (token, Some(SortDirection::Asc)),
        };

        if !allowed.iter().any(|a| a.as_ref() == column) {
            tracing::trace!(token, "dropping order token for unselected column");
            continue;
        }
        let Some(direction) = direction else {
            tracing::trace!(token, "dropping order token with invalid direction");
            continue;
        };

        match terms.iter_mut().find(|(c, _)| c == column) {
            Some(existing) => existing.1 = direction,
            None => terms.push((column.to_string(), direction)),
        }
    }

    terms
}

/// Render ` ORDER BY col1 ASC, col2 DESC` from whitelisted tokens
///
/// Returns `None` when no token survives.
pub fn build_whitelist_order_by<S: AsRef<str>>(
    order_by: Option<&OrderBy>,
    allowed: &[S],
) -> Option<String> {
    let terms = resolve_order_terms(order_by?, allowed);
    if terms.is_empty() {
        return None;
    }

    let parts: Vec<String> = terms
        .iter()
        .map(|(column, direction)| format!("{} {}", column, direction.as_sql()))
        .collect();

    Some(format!(" ORDER BY {}", parts.join(", ")))
}
