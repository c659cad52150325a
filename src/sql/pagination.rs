//! LIMIT/OFFSET rendering

use serde_json::Value;

/// Result of reading a pagination value as an integer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PageNumber {
    Absent,
    Blank,
    NonNumeric,
    Number(i64),
}

fn parse_page_number(value: Option<&Value>) -> PageNumber {
    match value {
        None | Some(Value::Null) => PageNumber::Absent,
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
            .map_or(PageNumber::NonNumeric, PageNumber::Number),
        Some(Value::String(s)) => {
            let s = s.trim();
            if s.is_empty() {
                PageNumber::Blank
            } else if let Ok(n) = s.parse::<i64>() {
                PageNumber::Number(n)
            } else {
                s.parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite())
                    .map_or(PageNumber::NonNumeric, |f| PageNumber::Number(f.trunc() as i64))
            }
        }
        Some(_) => PageNumber::NonNumeric,
    }
}

/// Loose comparison against zero: `0`, `false`, and blank or zero strings match
fn loosely_zero(value: &Value) -> bool {
    match value {
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => {
            let s = s.trim();
            s.is_empty() || s.parse::<f64>().is_ok_and(|f| f == 0.0)
        }
        _ => false,
    }
}

/// Render ` LIMIT $n [OFFSET $n]` only when a non-zero limit is present
///
/// Values are bound exactly as given. `OFFSET` requires a rendered `LIMIT`.
pub fn build_conditional_pagination(
    limit: Option<&Value>,
    offset: Option<&Value>,
    next_param: usize,
) -> (String, Vec<Value>) {
    let mut clause = String::new();
    let mut values = Vec::new();

    let Some(limit) = limit.filter(|l| !l.is_null() && !loosely_zero(l)) else {
        return (clause, values);
    };

    values.push(limit.clone());
    clause.push_str(&format!(" LIMIT ${}", next_param + values.len() - 1));

    if let Some(offset) = offset.filter(|o| !o.is_null()) {
        values.push(offset.clone());
        clause.push_str(&format!(" OFFSET ${}", next_param + values.len() - 1));
    }

    (clause, values)
}

/// Coerce a limit/offset pair to integers, falling back to the defaults
///
/// The limit must be a positive integer and the offset a non-negative one;
/// the defaults are held to the same bounds.
/// A non-numeric limit also resets the offset, while a blank or missing limit
/// keeps it.
pub fn coerce_page(
    limit: Option<&Value>,
    offset: Option<&Value>,
    default_limit: i64,
    default_offset: i64,
) -> (i64, i64) {
    let default_limit = default_limit.max(1);
    let default_offset = default_offset.max(0);

    let parsed_limit = parse_page_number(limit);
    let limit = match parsed_limit {
        PageNumber::Number(n) if n > 0 => n,
        _ => default_limit,
    };

    let offset = match (parsed_limit, parse_page_number(offset)) {
        (PageNumber::NonNumeric, _) => default_offset,
        (_, PageNumber::Number(n)) if n >= 0 => n,
        _ => default_offset,
    };

    (limit, offset)
}

/// Render ` LIMIT $n OFFSET $n+1` with coerced values
pub fn build_always_on_pagination(
    limit: Option<&Value>,
    offset: Option<&Value>,
    next_param: usize,
    default_limit: i64,
    default_offset: i64,
) -> (String, Vec<Value>) {
    let (limit, offset) = coerce_page(limit, offset, default_limit, default_offset);
    (
        format!(" LIMIT ${} OFFSET ${}", next_param, next_param + 1),
        vec![Value::from(limit), Value::from(offset)],
    )
}
