//! Core type definitions for query assembly
//!
//! Includes the column-value map, the generated query, find options and like
//! specifications.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{QueryBuilderError, Result};

/// Insertion-ordered mapping from column name to bind value
pub type ColumnValues = serde_json::Map<String, Value>;

/// Keys that a flat parameter map reserves for find modifiers
pub const RESERVED_KEYS: [&str; 4] = ["limit", "offset", "orderBy", "isAscOrder"];

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$(\d+)").expect("placeholder pattern is valid"));

// ============================================================================
// Generated Query
// ============================================================================

/// SQL text with positional placeholders and the values to bind
///
/// `values[i]` binds to `$i+1` in `text`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedQuery {
    /// SQL statement using `$1`, `$2`, ... placeholders
    pub text: String,
    /// Bind values in placeholder order
    pub values: Vec<Value>,
}

impl GeneratedQuery {
    pub fn new(text: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            text: text.into(),
            values,
        }
    }

    /// Highest placeholder number referenced in `text`
    pub fn placeholder_count(&self) -> usize {
        PLACEHOLDER
            .captures_iter(&self.text)
            .filter_map(|c| c[1].parse::<usize>().ok())
            .max()
            .unwrap_or(0)
    }
}

// ============================================================================
// Ordering
// ============================================================================

/// Sort direction of an `ORDER BY` term
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// Parse `asc`/`desc`, ignoring case
    pub fn parse(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("asc") {
            Some(Self::Asc)
        } else if s.eq_ignore_ascii_case("desc") {
            Some(Self::Desc)
        } else {
            None
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Requested ordering: one column, or a list of `column[.direction]` tokens
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderBy {
    Column(String),
    Tokens(Vec<String>),
}

impl OrderBy {
    /// Read an order-by modifier from a JSON value
    ///
    /// `null` means no ordering. Anything other than a string or a list of
    /// strings is rejected.
    pub fn from_value(value: &Value) -> Result<Option<Self>> {
        match value {
            Value::Null => Ok(None),
            Value::String(s) => Ok(Some(Self::Column(s.clone()))),
            Value::Array(items) => {
                let tokens = items
                    .iter()
                    .map(|item| {
                        item.as_str().map(str::to_string).ok_or_else(|| {
                            QueryBuilderError::invalid_modifier(format!(
                                "orderBy list entries must be strings, got {}",
                                item
                            ))
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(Some(Self::Tokens(tokens)))
            }
            other => Err(QueryBuilderError::invalid_modifier(format!(
                "orderBy must be a string or a list of strings, got {}",
                other
            ))),
        }
    }

    /// Tokens in request order
    pub fn tokens(&self) -> Vec<&str> {
        match self {
            Self::Column(c) => vec![c.as_str()],
            Self::Tokens(t) => t.iter().map(String::as_str).collect(),
        }
    }
}

impl From<&str> for OrderBy {
    fn from(column: &str) -> Self {
        Self::Column(column.to_string())
    }
}

impl From<String> for OrderBy {
    fn from(column: String) -> Self {
        Self::Column(column)
    }
}

impl From<Vec<String>> for OrderBy {
    fn from(tokens: Vec<String>) -> Self {
        Self::Tokens(tokens)
    }
}

impl From<Vec<&str>> for OrderBy {
    fn from(tokens: Vec<&str>) -> Self {
        Self::Tokens(tokens.into_iter().map(str::to_string).collect())
    }
}

// ============================================================================
// Find Options
// ============================================================================

/// Modifiers for `find`, kept apart from the filter columns
///
/// `limit` and `offset` stay as raw JSON so that pagination can apply its
/// coercion rules to strings, blanks and other loose input.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindOptions {
    pub limit: Option<Value>,
    pub offset: Option<Value>,
    pub order_by: Option<OrderBy>,
    /// Direction under `OrderByPolicy::BoundColumn`; unused by the whitelist
    pub is_asc_order: Option<bool>,
}

impl FindOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn limit(mut self, limit: impl Into<Value>) -> Self {
        self.limit = Some(limit.into());
        self
    }

    pub fn offset(mut self, offset: impl Into<Value>) -> Self {
        self.offset = Some(offset.into());
        self
    }

    pub fn order_by(mut self, order_by: impl Into<OrderBy>) -> Self {
        self.order_by = Some(order_by.into());
        self
    }

    /// Set the sort direction for `OrderByPolicy::BoundColumn` only
    ///
    /// Under `OrderByPolicy::Whitelist` this is ignored; each token picks its
    /// own direction with a `.asc` or `.desc` suffix.
    pub fn ascending(mut self, ascending: bool) -> Self {
        self.is_asc_order = Some(ascending);
        self
    }

    /// Split the reserved modifier keys out of a flat parameter map
    ///
    /// Returns the options and the remaining filter columns in their original
    /// order. A `null` modifier counts as absent.
    pub fn extract(params: &ColumnValues) -> Result<(Self, ColumnValues)> {
        let mut options = Self::default();
        let mut filters = ColumnValues::new();

        for (key, value) in params {
            match key.as_str() {
                "limit" => options.limit = non_null(value),
                "offset" => options.offset = non_null(value),
                "orderBy" => options.order_by = OrderBy::from_value(value)?,
                "isAscOrder" => options.is_asc_order = non_null(value).map(|v| is_truthy(&v)),
                _ => {
                    filters.insert(key.clone(), value.clone());
                }
            }
        }

        Ok((options, filters))
    }
}

fn non_null(value: &Value) -> Option<Value> {
    if value.is_null() {
        None
    } else {
        Some(value.clone())
    }
}

/// Loose truthiness: `null`, `false`, `0` and `""` are false
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

// ============================================================================
// Like Specification
// ============================================================================

/// Which columns are matched by substring search
#[derive(Debug, Clone, Default, PartialEq)]
pub enum LikeSpec {
    /// No substring filters
    #[default]
    None,
    /// Explicit column to substring map, independent of the filter map
    Values(ColumnValues),
    /// Columns whose value in the filter map is matched by substring
    Columns(Vec<String>),
}

impl LikeSpec {
    pub fn columns<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Columns(columns.into_iter().map(Into::into).collect())
    }

    pub fn values(values: ColumnValues) -> Self {
        Self::Values(values)
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::None => true,
            Self::Values(v) => v.is_empty(),
            Self::Columns(c) => c.is_empty(),
        }
    }
}
