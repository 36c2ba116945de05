//! Persistence for resource models
//!
//! # Features
//!
//! - **Generic model operations**: [`Repository`] insert, get, update, delete
//!   and get_all for any [`Entity`]
//! - **Optimistic concurrency**: updates are conditional on the version the
//!   caller last read; a mismatch is [`RepositoryErrorKind::EditConflict`]
//! - **Safe ordering**: [`Filters`] resolves `ORDER BY` only from a per-resource
//!   allow-list
//! - **Pagination metadata**: [`calculate_metadata`] derives page bounds from
//!   the total match count
//! - **Two backends**: [`PgRepository`] for PostgreSQL and [`MemoryRepository`]
//!   with identical semantics

pub mod error;
pub mod filters;
pub mod memory;
pub mod postgres;
pub mod search;
pub mod traits;

pub use error::{RepositoryError, RepositoryErrorKind, RepositoryOperation};
pub use filters::{calculate_metadata, Filters, Metadata, OrderDirection, MAX_PAGE, MAX_PAGE_SIZE};
pub use memory::MemoryRepository;
pub use postgres::PgRepository;
pub use traits::{Entity, FieldValue, ListFilter, Record, Repository, RepositoryResult};
