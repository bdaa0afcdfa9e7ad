//! Filter and ordering evaluation over JSON rows.

use std::cmp::Ordering;

use chrono::{DateTime, FixedOffset};
use serde_json::Value;

use filekeep_core::types::{FilterField, FilterOp, FilterValue, Row, SortField};

/// Whether `row` satisfies every filter.
pub fn matches_all(row: &Row, filters: &[FilterField]) -> bool {
    filters.iter().all(|f| matches(row, f))
}

/// Whether `row` satisfies a single filter. Absent columns read as null.
pub fn matches(row: &Row, filter: &FilterField) -> bool {
    let value = row.get(&filter.field).unwrap_or(&Value::Null);
    match filter.op {
        FilterOp::Eq => equals(value, &filter.value),
        FilterOp::Ne => !equals(value, &filter.value),
        FilterOp::IsNull => value.is_null(),
        FilterOp::IsNotNull => !value.is_null(),
        FilterOp::In => match (&filter.value, value.as_str()) {
            (FilterValue::StringList(list), Some(s)) => list.iter().any(|item| item == s),
            _ => false,
        },
        FilterOp::Contains => match (&filter.value, value.as_array()) {
            (FilterValue::String(needle), Some(items)) => {
                items.iter().any(|item| item.as_str() == Some(needle.as_str()))
            }
            _ => false,
        },
        FilterOp::ILike => match (&filter.value, value.as_str()) {
            (FilterValue::String(pattern), Some(s)) => {
                let needle = pattern.trim_matches('%').to_lowercase();
                s.to_lowercase().contains(&needle)
            }
            _ => false,
        },
    }
}

fn equals(value: &Value, expected: &FilterValue) -> bool {
    match expected {
        FilterValue::String(s) => value.as_str() == Some(s.as_str()),
        FilterValue::Integer(i) => value.as_i64() == Some(*i),
        FilterValue::Boolean(b) => value.as_bool() == Some(*b),
        FilterValue::Null => value.is_null(),
        FilterValue::StringList(_) => false,
    }
}

/// Compare two rows under a list of sort fields.
pub fn compare_rows(a: &Row, b: &Row, sort: &[SortField]) -> Ordering {
    for field in sort {
        let left = a.get(&field.field).unwrap_or(&Value::Null);
        let right = b.get(&field.field).unwrap_or(&Value::Null);
        let ordering = field.direction.apply(compare_values(left, right));
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

/// Total order over JSON scalars: null < bool < number < string.
///
/// Strings that both parse as RFC 3339 timestamps compare chronologically,
/// since their textual form varies in fractional-second precision.
fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Less,
        (_, Value::Null) => Ordering::Greater,
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => match (timestamp(x), timestamp(y)) {
            (Some(tx), Some(ty)) => tx.cmp(&ty),
            _ => x.cmp(y),
        },
        _ => rank(a).cmp(&rank(b)),
    }
}

fn timestamp(s: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(s).ok()
}

fn rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}
