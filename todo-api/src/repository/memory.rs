//! In-process repository
//!
//! Mirrors [`PgRepository`](super::PgRepository): storage-assigned ids and
//! versions, conditional updates, `simple` full-text matching, superset tag
//! matching and `(sort column, id)` ordering. Used when no database is
//! configured and by the test suite.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::marker::PhantomData;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::instrument;

use super::error::{RepositoryError, RepositoryOperation};
use super::filters::{calculate_metadata, Filters, Metadata, OrderDirection};
use super::search::matches_plain_query;
use super::traits::{Entity, FieldValue, ListFilter, Record, Repository, RepositoryResult};

#[derive(Debug)]
struct Table<E> {
    next_id: i64,
    rows: BTreeMap<i64, E>,
}

/// Repository for `E` held in process memory
#[derive(Debug)]
pub struct MemoryRepository<E> {
    table: RwLock<Table<E>>,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> Default for MemoryRepository<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Entity> MemoryRepository<E> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            table: RwLock::new(Table {
                next_id: 1,
                rows: BTreeMap::new(),
            }),
            _entity: PhantomData,
        }
    }
}

fn sort_value<E: Entity>(item: &E, column: &str) -> Option<FieldValue> {
    if column == "id" {
        None
    } else {
        item.field(column)
    }
}

fn compare<E: Entity>(a: &E, b: &E, column: &str, direction: OrderDirection) -> Ordering {
    let primary = if column == "id" {
        a.record().id.cmp(&b.record().id)
    } else {
        sort_value(a, column).cmp(&sort_value(b, column))
    };
    let primary = match direction {
        OrderDirection::Ascending => primary,
        OrderDirection::Descending => primary.reverse(),
    };
    primary.then_with(|| a.record().id.cmp(&b.record().id))
}

fn is_match<E: Entity>(item: &E, filter: &E::Filter) -> bool {
    let text_ok = filter
        .text_terms()
        .into_iter()
        .filter(|(_, query)| !query.is_empty())
        .all(|(column, query)| {
            item.field(column)
                .as_ref()
                .and_then(FieldValue::as_text)
                .is_some_and(|document| matches_plain_query(document, query))
        });

    let wanted = filter.tags();
    let tags_ok = wanted.is_empty()
        || item
            .field(E::TAGS_COLUMN)
            .as_ref()
            .and_then(FieldValue::as_list)
            .is_some_and(|stored| wanted.iter().all(|tag| stored.contains(tag)));

    text_ok && tags_ok
}

#[async_trait]
impl<E: Entity> Repository<E> for MemoryRepository<E> {
    #[instrument(skip_all, fields(kind = E::KIND))]
    async fn insert(&self, item: &mut E) -> RepositoryResult<()> {
        let mut table = self.table.write().await;
        let id = table.next_id;
        table.next_id += 1;

        *item.record_mut() = Record {
            id,
            created_at: Utc::now(),
            version: 1,
        };
        table.rows.insert(id, item.clone());

        tracing::debug!(kind = E::KIND, id, "inserted");
        Ok(())
    }

    #[instrument(skip(self), fields(kind = E::KIND))]
    async fn get(&self, id: i64) -> RepositoryResult<E> {
        if id < 1 {
            return Err(RepositoryError::not_found(E::KIND, id));
        }
        self.table
            .read()
            .await
            .rows
            .get(&id)
            .cloned()
            .ok_or_else(|| RepositoryError::not_found(E::KIND, id))
    }

    #[instrument(skip_all, fields(kind = E::KIND, id = item.record().id, version = item.record().version))]
    async fn update(&self, item: &mut E) -> RepositoryResult<()> {
        let id = item.record().id;
        let mut table = self.table.write().await;

        let Some(stored) = table.rows.get_mut(&id) else {
            tracing::warn!(kind = E::KIND, id, "edit conflict");
            return Err(RepositoryError::edit_conflict(E::KIND, id));
        };
        if stored.record().version != item.record().version {
            tracing::warn!(kind = E::KIND, id, "edit conflict");
            return Err(RepositoryError::edit_conflict(E::KIND, id));
        }

        let record = stored.record().clone();
        let version = record.version + 1;
        *stored = item.clone();
        *stored.record_mut() = Record { version, ..record };
        item.record_mut().version = version;

        tracing::debug!(kind = E::KIND, id, version, "updated");
        Ok(())
    }

    #[instrument(skip(self), fields(kind = E::KIND))]
    async fn delete(&self, id: i64) -> RepositoryResult<()> {
        let not_found =
            || RepositoryError::not_found(E::KIND, id).with_operation(RepositoryOperation::Delete);
        if id < 1 {
            return Err(not_found());
        }
        match self.table.write().await.rows.remove(&id) {
            Some(_) => {
                tracing::debug!(kind = E::KIND, id, "deleted");
                Ok(())
            }
            None => Err(not_found()),
        }
    }

    #[instrument(skip_all, fields(kind = E::KIND, page = filters.page, sort = %filters.sort))]
    async fn get_all(
        &self,
        filter: &E::Filter,
        filters: &Filters,
    ) -> RepositoryResult<(Vec<E>, Metadata)> {
        let column = filters
            .sort_column()
            .ok_or_else(|| RepositoryError::invalid_sort(&filters.sort))?;
        let direction = filters.sort_direction();

        let table = self.table.read().await;
        let mut matched: Vec<&E> = table
            .rows
            .values()
            .filter(|item| is_match(*item, filter))
            .collect();
        matched.sort_by(|a, b| compare(*a, *b, column, direction));

        let total_records = i64::try_from(matched.len()).unwrap_or(i64::MAX);
        let offset = usize::try_from(filters.offset()).unwrap_or(usize::MAX);
        let limit = usize::try_from(filters.limit()).unwrap_or(0);
        let items: Vec<E> = matched
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect();

        let metadata = calculate_metadata(total_records, filters.page, filters.page_size);
        tracing::debug!(kind = E::KIND, returned = items.len(), total_records, "listed");
        Ok((items, metadata))
    }
}
