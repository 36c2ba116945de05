//! Paging and ordering for list queries
//!
//! [`Filters`] carries the page, page size, and sort key of one list request
//! together with the resource's sort allow-list. It validates into a
//! [`Validator`] instead of failing, and resolves the `ORDER BY` column only
//! from the allow-list so request text never reaches SQL.
//!
//! # Example
//!
//! ```rust
//! use todo_api::repository::{Filters, OrderDirection};
//! use todo_api::validator::Validator;
//!
//! const SAFELIST: &[&str] = &["id", "task_name", "-id", "-task_name"];
//!
//! let filters = Filters::new(3, 20, "-task_name", SAFELIST);
//! let mut v = Validator::new();
//! filters.validate(&mut v);
//!
//! assert!(v.valid());
//! assert_eq!(filters.offset(), 40);
//! assert_eq!(filters.sort_column(), Some("task_name"));
//! assert_eq!(filters.sort_direction(), OrderDirection::Descending);
//! ```

use std::fmt;

use serde::Serialize;

use crate::validator::{permitted_value, Validator};

/// Largest page number a client may request
pub const MAX_PAGE: i64 = 10_000_000;

/// Largest page size a client may request
pub const MAX_PAGE_SIZE: i64 = 100;

/// Direction for ordering results
///
/// ```rust
/// use todo_api::repository::OrderDirection;
///
/// assert_eq!(OrderDirection::Ascending.as_sql(), "ASC");
/// assert_eq!(format!("{}", OrderDirection::Descending), "desc");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderDirection {
    /// Sort in ascending order (A-Z, 0-9)
    #[default]
    Ascending,
    /// Sort in descending order (Z-A, 9-0)
    Descending,
}

impl OrderDirection {
    /// SQL keyword for this direction
    #[must_use]
    pub const fn as_sql(&self) -> &'static str {
        match self {
            Self::Ascending => "ASC",
            Self::Descending => "DESC",
        }
    }
}

impl fmt::Display for OrderDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ascending => write!(f, "asc"),
            Self::Descending => write!(f, "desc"),
        }
    }
}

/// Page, page size, and sort key of a single list request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filters {
    /// 1-indexed page number
    pub page: i64,
    /// Number of items per page
    pub page_size: i64,
    /// Requested sort key, optionally prefixed with `-`
    pub sort: String,
    /// Sort keys this resource permits
    pub sort_safelist: &'static [&'static str],
}

impl Filters {
    /// Build filters for one request
    pub fn new(
        page: i64,
        page_size: i64,
        sort: impl Into<String>,
        sort_safelist: &'static [&'static str],
    ) -> Self {
        Self {
            page,
            page_size,
            sort: sort.into(),
            sort_safelist,
        }
    }

    /// Record every out-of-range or disallowed value in `v`
    pub fn validate(&self, v: &mut Validator) {
        v.check(self.page > 0, "page", "must be greater than zero");
        v.check(self.page <= MAX_PAGE, "page", "must be a maximum of 10 million");
        v.check(self.page_size > 0, "page_size", "must be greater than zero");
        v.check(
            self.page_size <= MAX_PAGE_SIZE,
            "page_size",
            "must be a maximum of 100",
        );
        v.check(
            permitted_value(&self.sort.as_str(), self.sort_safelist),
            "sort",
            "invalid sort value",
        );
    }

    /// Column to order by, taken from the allow-list entry that matches `sort`
    ///
    /// Returns `None` when `sort` is not allow-listed; callers must refuse to
    /// query in that case.
    #[must_use]
    pub fn sort_column(&self) -> Option<&'static str> {
        self.sort_safelist
            .iter()
            .find(|safe| **safe == self.sort)
            .map(|safe| safe.trim_start_matches('-'))
    }

    /// Descending when the sort key carries a leading `-`
    #[must_use]
    pub fn sort_direction(&self) -> OrderDirection {
        if self.sort.starts_with('-') {
            OrderDirection::Descending
        } else {
            OrderDirection::Ascending
        }
    }

    #[must_use]
    pub fn limit(&self) -> i64 {
        self.page_size
    }

    #[must_use]
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.page_size)
    }
}

/// Pagination summary returned alongside a page of results
///
/// Serializes as an empty object when nothing matched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Metadata {
    #[serde(skip_serializing_if = "is_zero")]
    pub current_page: i64,
    #[serde(skip_serializing_if = "is_zero")]
    pub page_size: i64,
    #[serde(skip_serializing_if = "is_zero")]
    pub first_page: i64,
    #[serde(skip_serializing_if = "is_zero")]
    pub last_page: i64,
    #[serde(skip_serializing_if = "is_zero")]
    pub total_records: i64,
}

fn is_zero(value: &i64) -> bool {
    *value == 0
}

/// Derive pagination metadata for a result set
///
/// An empty result set yields the zero value; there are no page bounds to
/// report.
///
/// ```rust
/// use todo_api::repository::{calculate_metadata, Metadata};
///
/// let meta = calculate_metadata(25, 1, 20);
/// assert_eq!(meta.last_page, 2);
/// assert_eq!(calculate_metadata(0, 1, 20), Metadata::default());
/// ```
#[must_use]
pub fn calculate_metadata(total_records: i64, page: i64, page_size: i64) -> Metadata {
    if total_records == 0 || page_size <= 0 {
        return Metadata::default();
    }

    Metadata {
        current_page: page,
        page_size,
        first_page: 1,
        last_page: (total_records + page_size - 1) / page_size,
        total_records,
    }
}
