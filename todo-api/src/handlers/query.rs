//! Query-string parameters shared by every list endpoint
//!
//! Values arrive as text so that a non-integer `page` becomes a field-level
//! validation error instead of a rejected request. Resource query types embed
//! [`ListQuery`] with `#[serde(flatten)]` and add their own filter fields.
//!
//! # Example
//!
//! ```rust
//! use todo_api::handlers::ListQuery;
//! use todo_api::validator::Validator;
//!
//! const SAFELIST: &[&str] = &["id", "-id"];
//!
//! let query = ListQuery {
//!     page: Some("2".to_string()),
//!     ..ListQuery::default()
//! };
//! let mut v = Validator::new();
//! let filters = query.filters(SAFELIST, &mut v);
//!
//! assert!(v.valid());
//! assert_eq!(filters.page, 2);
//! assert_eq!(filters.page_size, 20);
//! assert_eq!(filters.sort, "id");
//! ```

use serde::Deserialize;

use crate::repository::Filters;
use crate::validator::Validator;

/// Page used when none is requested
pub const DEFAULT_PAGE: i64 = 1;

/// Page size used when none is requested
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Sort key used when none is requested
pub const DEFAULT_SORT: &str = "id";

/// Paging and sort parameters of a list request
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ListQuery {
    pub page: Option<String>,
    pub page_size: Option<String>,
    pub sort: Option<String>,
}

impl ListQuery {
    /// Resolve into [`Filters`], recording every problem in `v`
    pub fn filters(&self, sort_safelist: &'static [&'static str], v: &mut Validator) -> Filters {
        let page = read_int(self.page.as_deref(), "page", DEFAULT_PAGE, v);
        let page_size = read_int(self.page_size.as_deref(), "page_size", DEFAULT_PAGE_SIZE, v);
        let sort = self
            .sort
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_SORT);

        let filters = Filters::new(page, page_size, sort, sort_safelist);
        filters.validate(v);
        filters
    }
}

fn read_int(raw: Option<&str>, key: &str, default: i64, v: &mut Validator) -> i64 {
    match raw {
        None | Some("") => default,
        Some(text) => text.parse().unwrap_or_else(|_| {
            v.add_error(key, "must be an integer value");
            default
        }),
    }
}

/// Split a comma-separated list, trimming entries and dropping empty ones
///
/// ```rust
/// use todo_api::handlers::query::read_csv;
///
/// assert_eq!(read_csv(Some("urgent, blocked,,")), vec!["urgent", "blocked"]);
/// assert!(read_csv(None).is_empty());
/// ```
pub fn read_csv(raw: Option<&str>) -> Vec<String> {
    raw.map(|text| {
        text.split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}
