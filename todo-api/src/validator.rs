//! Field-level input validation
//!
//! A [`Validator`] collects one message per field. The first failing check for
//! a field is the one reported; later failures for the same field are ignored,
//! so checks should be ordered from most to least fundamental.
//!
//! # Example
//!
//! ```rust
//! use todo_api::validator::Validator;
//!
//! let mut v = Validator::new();
//! v.check(!"".is_empty(), "name", "must be provided");
//! v.check("".len() <= 200, "name", "must not be more than 200 bytes long");
//!
//! assert!(!v.valid());
//! assert_eq!(v.errors().get("name").map(String::as_str), Some("must be provided"));
//! ```

use std::collections::{BTreeMap, HashSet};
use std::hash::Hash;
use std::sync::LazyLock;

use regex::Regex;

/// Email addresses, as accepted by the HTML living standard
pub static EMAIL_RX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    )
    .expect("email regex is valid")
});

/// Phone numbers with an optional country code and common separators
pub static PHONE_RX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\+?\(?[0-9]{3}\)?\s?-?[0-9]{3}\s?-?[0-9]{4}$").expect("phone regex is valid")
});

/// Absolute http(s) URLs with a host
pub static WEBSITE_RX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://[a-zA-Z0-9](?:[a-zA-Z0-9-]*[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]*[a-zA-Z0-9])?)*(?::[0-9]{1,5})?(?:[/?#]\S*)?$")
        .expect("website regex is valid")
});

/// Accumulates validation failures as a field → message map
///
/// One instance per request; it is not meant to be shared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Validator {
    errors: BTreeMap<String, String>,
}

impl Validator {
    /// Create an empty validator
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when no failure has been recorded
    #[must_use]
    pub fn valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Record `message` for `key` unless the field already has an error
    pub fn add_error(&mut self, key: impl Into<String>, message: impl Into<String>) {
        self.errors
            .entry(key.into())
            .or_insert_with(|| message.into());
    }

    /// Record `message` for `key` when `ok` is false
    pub fn check(&mut self, ok: bool, key: &str, message: &str) {
        if !ok {
            self.add_error(key, message);
        }
    }

    /// Recorded failures, ordered by field name
    #[must_use]
    pub fn errors(&self) -> &BTreeMap<String, String> {
        &self.errors
    }

    /// Consume the validator, returning the recorded failures
    #[must_use]
    pub fn into_errors(self) -> BTreeMap<String, String> {
        self.errors
    }
}

/// Returns true if `value` is one of `list`
pub fn permitted_value<T: PartialEq>(value: &T, list: &[T]) -> bool {
    list.contains(value)
}

/// Returns true if every element of `values` is distinct
pub fn unique<T: Eq + Hash>(values: &[T]) -> bool {
    let mut seen = HashSet::with_capacity(values.len());
    values.iter().all(|value| seen.insert(value))
}

/// Returns true if `value` matches `rx`
pub fn matches(value: &str, rx: &Regex) -> bool {
    rx.is_match(value)
}

/// Shared checks for a required text field with a byte-length ceiling
pub fn check_required_text(v: &mut Validator, value: &str, key: &str, max_bytes: usize) {
    v.check(!value.is_empty(), key, "must be provided");
    v.check(
        value.len() <= max_bytes,
        key,
        &format!("must not be more than {max_bytes} bytes long"),
    );
}

/// Shared checks for a set-like list of 1–5 distinct entries
pub fn check_entries(v: &mut Validator, values: &[String], key: &str) {
    v.check(!values.is_empty(), key, "must contain at least 1 entry");
    v.check(values.len() <= 5, key, "must not contain more than 5 entries");
    v.check(unique(values), key, "must not contain duplicate entries");
}
