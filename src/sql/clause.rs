//! Equality and substring clause building
//!
//! Both builders emit `(clauses, values)` pairs whose placeholders are
//! numbered by position. Column names are interpolated verbatim and must come
//! from trusted input.

use serde_json::Value;

use crate::types::ColumnValues;

/// Clause fragments and the values bound by them, in the same order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClauseSet {
    pub clauses: Vec<String>,
    pub values: Vec<Value>,
}

impl ClauseSet {
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    /// Join the clause fragments with `separator`
    pub fn join(&self, separator: &str) -> String {
        self.clauses.join(separator)
    }
}

/// Build `col=$n` fragments for `columns`, reading values from `source`
///
/// `n` is the 1-based position within this set; callers appending after other
/// placeholders must start this set first. A column missing from `source`
/// binds `NULL`.
pub fn build_equality_clauses<S: AsRef<str>>(columns: &[S], source: &ColumnValues) -> ClauseSet {
    let mut set = ClauseSet::default();
    for (i, column) in columns.iter().enumerate() {
        let column = column.as_ref();
        set.clauses.push(format!("{}=${}", column, i + 1));
        set.values.push(source.get(column).cloned().unwrap_or(Value::Null));
    }
    set
}

/// Build `col like $n` fragments for every entry of `source`
///
/// `n` is `offset` plus the 1-based position, where `offset` is the number of
/// placeholders already allocated. Values are wrapped as `%value%` without
/// escaping `%` or `_`.
pub fn build_like_clauses(source: &ColumnValues, offset: usize) -> ClauseSet {
    let mut set = ClauseSet::default();
    for (i, (column, value)) in source.iter().enumerate() {
        set.clauses.push(format!("{} like ${}", column, offset + i + 1));
        set.values
            .push(Value::String(format!("%{}%", value_to_pattern_text(value))));
    }
    set
}

/// Text form of a value inside a like pattern
fn value_to_pattern_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => value.to_string(),
    }
}
