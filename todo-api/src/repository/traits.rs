//! Repository trait definitions
//!
//! - [`Entity`]: a persisted resource type (its table, columns, sort allow-list
//!   and field validation)
//! - [`ListFilter`]: resource-specific list filters (free-text terms and a
//!   multi-valued tag filter)
//! - [`Repository`]: the five model operations, implemented once per backend
//!
//! The trait uses `async_trait` so repositories can be held as
//! `Arc<dyn Repository<E>>` and swapped between PostgreSQL and the in-process
//! store at startup.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::postgres::PgRow;
use sqlx::FromRow;

use super::error::RepositoryError;
use super::filters::{Filters, Metadata};
use crate::validator::Validator;

/// Result type for repository operations
pub type RepositoryResult<T> = std::result::Result<T, RepositoryError>;

/// Storage-assigned fields carried by every persisted item
///
/// `id` and `created_at` never change after insert. `version` starts at 1 and
/// grows by exactly 1 on every successful update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, FromRow)]
pub struct Record {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub version: i32,
}

/// A column value written by insert and update
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum FieldValue {
    Text(String),
    List(Vec<String>),
}

impl FieldValue {
    /// The text payload, if this is a text column
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::List(_) => None,
        }
    }

    /// The list payload, if this is an array column
    #[must_use]
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::Text(_) => None,
            Self::List(values) => Some(values),
        }
    }
}

/// Resource-specific list filters
pub trait ListFilter: Send + Sync {
    /// `(column, query)` pairs for the full-text filters
    ///
    /// Empty queries are returned too; backends skip them.
    fn text_terms(&self) -> Vec<(&'static str, &str)>;

    /// Tags every returned row must contain (superset match); empty matches all
    fn tags(&self) -> &[String];
}

/// A resource type persisted in one table
pub trait Entity:
    Clone + Send + Sync + Unpin + 'static + for<'r> FromRow<'r, PgRow>
{
    /// Filters accepted by list queries for this resource
    type Filter: ListFilter;

    /// Singular name used in logs and error context
    const KIND: &'static str;

    /// Table holding this resource
    const TABLE: &'static str;

    /// Data columns, in the order [`Entity::fields`] yields them
    const COLUMNS: &'static [&'static str];

    /// The `text[]` column matched by [`ListFilter::tags`]
    const TAGS_COLUMN: &'static str;

    /// Sort keys a list request may use
    const SORT_SAFELIST: &'static [&'static str];

    fn record(&self) -> &Record;

    fn record_mut(&mut self) -> &mut Record;

    /// Record every field rule violation in `v`
    fn validate(&self, v: &mut Validator);

    /// Column/value pairs for every data column
    fn fields(&self) -> Vec<(&'static str, FieldValue)>;

    /// Value of a single data column
    fn field(&self, column: &str) -> Option<FieldValue> {
        self.fields()
            .into_iter()
            .find(|(name, _)| *name == column)
            .map(|(_, value)| value)
    }
}

/// The model operations for one resource type
///
/// Inputs are expected to have passed [`Entity::validate`]; repositories do
/// not re-validate.
#[async_trait]
pub trait Repository<E: Entity>: Send + Sync {
    /// Persist a new item
    ///
    /// On success the storage-assigned id, `created_at` and `version = 1` are
    /// written back into `item`.
    async fn insert(&self, item: &mut E) -> RepositoryResult<()>;

    /// Fetch one item by id
    ///
    /// Ids below 1 are reported as not found without touching storage.
    async fn get(&self, id: i64) -> RepositoryResult<E>;

    /// Conditionally write `item` if its version is still current
    ///
    /// A stale version, or a row that no longer exists, is an edit conflict.
    /// On success the incremented version is written back into `item`.
    async fn update(&self, item: &mut E) -> RepositoryResult<()>;

    /// Remove one item by id
    async fn delete(&self, id: i64) -> RepositoryResult<()>;

    /// One page of matching items plus pagination metadata
    ///
    /// Fails with [`RepositoryErrorKind::InvalidSort`](super::RepositoryErrorKind::InvalidSort)
    /// before querying when the sort key is not allow-listed.
    async fn get_all(
        &self,
        filter: &E::Filter,
        filters: &Filters,
    ) -> RepositoryResult<(Vec<E>, Metadata)>;
}
