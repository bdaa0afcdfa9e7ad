//! Filter and query types for record store access.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::sorting::SortField;

/// Filter comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOp {
    /// Exact equality.
    Eq,
    /// Not equal.
    Ne,
    /// Case-insensitive substring match (`%` wildcards are implied).
    ILike,
    /// Membership in a list of values.
    In,
    /// Field is absent or null.
    IsNull,
    /// Field is present and not null.
    IsNotNull,
    /// Array field contains the value.
    Contains,
}

/// A dynamic filter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// A string value (ids are compared as strings).
    String(String),
    /// An integer value.
    Integer(i64),
    /// A boolean value.
    Boolean(bool),
    /// A list of string values (for the `In` operator).
    StringList(Vec<String>),
    /// No value (for `IsNull`, `IsNotNull`).
    Null,
}

/// A single filter condition on a named field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterField {
    /// The column or field name to filter on.
    pub field: String,
    /// The comparison operator.
    pub op: FilterOp,
    /// The value to compare against.
    pub value: FilterValue,
}

impl FilterField {
    /// Create a new filter field.
    pub fn new(field: impl Into<String>, op: FilterOp, value: FilterValue) -> Self {
        Self {
            field: field.into(),
            op,
            value,
        }
    }

    /// Shorthand for an equality filter.
    pub fn eq(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(field, FilterOp::Eq, FilterValue::String(value.into()))
    }

    /// Equality on an id column.
    pub fn eq_id(field: impl Into<String>, id: impl Into<Uuid>) -> Self {
        Self::eq(field, id.into().to_string())
    }

    /// Equality on a boolean column.
    pub fn eq_bool(field: impl Into<String>, value: bool) -> Self {
        Self::new(field, FilterOp::Eq, FilterValue::Boolean(value))
    }

    /// Field is null (or absent).
    pub fn is_null(field: impl Into<String>) -> Self {
        Self::new(field, FilterOp::IsNull, FilterValue::Null)
    }

    /// Field is set.
    pub fn is_not_null(field: impl Into<String>) -> Self {
        Self::new(field, FilterOp::IsNotNull, FilterValue::Null)
    }

    /// Equality on an optional id column: `None` becomes an `IsNull` filter.
    pub fn eq_opt_id(field: impl Into<String>, id: Option<impl Into<Uuid>>) -> Self {
        match id {
            Some(id) => Self::eq_id(field, id),
            None => Self::is_null(field),
        }
    }

    /// Array column contains `value`.
    pub fn contains(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(field, FilterOp::Contains, FilterValue::String(value.into()))
    }

    /// Shorthand for a case-insensitive substring filter.
    pub fn ilike(field: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::new(field, FilterOp::ILike, FilterValue::String(pattern.into()))
    }

    /// Membership in a list of ids.
    pub fn in_ids<I: Into<Uuid>>(field: impl Into<String>, ids: impl IntoIterator<Item = I>) -> Self {
        let ids = ids.into_iter().map(|id| id.into().to_string()).collect();
        Self::new(field, FilterOp::In, FilterValue::StringList(ids))
    }
}

/// A filtered, ordered, optionally windowed query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Query {
    /// Conditions, all of which must hold.
    pub filters: Vec<FilterField>,
    /// Ordering, applied in sequence.
    pub sort: Vec<SortField>,
    /// Number of leading rows to skip.
    pub offset: Option<u64>,
    /// Maximum number of rows to return.
    pub limit: Option<u64>,
}

impl Query {
    /// Create an unfiltered query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a query from a filter list.
    pub fn with_filters(filters: Vec<FilterField>) -> Self {
        Self {
            filters,
            ..Self::default()
        }
    }

    /// Add a filter condition.
    pub fn filter(mut self, filter: FilterField) -> Self {
        self.filters.push(filter);
        self
    }

    /// Add an ordering.
    pub fn order_by(mut self, sort: SortField) -> Self {
        self.sort.push(sort);
        self
    }

    /// Restrict the result to `limit` rows starting at `offset`.
    pub fn window(mut self, offset: u64, limit: u64) -> Self {
        self.offset = Some(offset);
        self.limit = Some(limit);
        self
    }
}
