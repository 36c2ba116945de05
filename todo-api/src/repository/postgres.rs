//! PostgreSQL-backed repository
//!
//! SQL is assembled with [`QueryBuilder`]: every value is a bound parameter,
//! and the only identifiers spliced into the text are the entity's own table
//! and column constants plus the allow-listed sort column.

use std::future::Future;
use std::marker::PhantomData;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use tracing::instrument;

use super::error::{RepositoryError, RepositoryOperation};
use super::filters::{calculate_metadata, Filters, Metadata};
use super::traits::{Entity, FieldValue, ListFilter, Record, Repository, RepositoryResult};

/// Repository for `E` over a shared connection pool
///
/// Every statement is bounded by `query_timeout`; on expiry the statement's
/// future is dropped, which cancels it, and a timeout error is returned.
#[derive(Debug, Clone)]
pub struct PgRepository<E> {
    pool: PgPool,
    query_timeout: Duration,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> PgRepository<E> {
    /// Create a repository using `pool`
    pub fn new(pool: PgPool, query_timeout: Duration) -> Self {
        Self {
            pool,
            query_timeout,
            _entity: PhantomData,
        }
    }

    async fn bounded<T, F>(&self, operation: RepositoryOperation, query: F) -> RepositoryResult<T>
    where
        F: Future<Output = Result<T, sqlx::Error>> + Send,
    {
        let outcome = match tokio::time::timeout(self.query_timeout, query).await {
            Ok(result) => result.map_err(|e| RepositoryError::from_sqlx(operation, e)),
            Err(_) => Err(RepositoryError::timeout(
                operation,
                format!("query exceeded {:?}", self.query_timeout),
            )),
        };
        outcome.map_err(|e| {
            tracing::error!(
                kind = E::KIND,
                operation = %e.operation,
                error_kind = %e.kind,
                error = %e.message,
                "storage failure"
            );
            e.with_entity_type(E::KIND)
        })
    }
}

fn push_value(builder: &mut QueryBuilder<'static, Postgres>, value: FieldValue) {
    match value {
        FieldValue::Text(text) => builder.push_bind(text),
        FieldValue::List(values) => builder.push_bind(values),
    };
}

fn select_columns<E: Entity>() -> String {
    let mut columns = String::from("id, created_at, version");
    for column in E::COLUMNS {
        columns.push_str(", ");
        columns.push_str(column);
    }
    columns
}

/// `INSERT ... RETURNING id, created_at, version`
pub(crate) fn insert_query<E: Entity>(item: &E) -> QueryBuilder<'static, Postgres> {
    let fields = item.fields();
    let mut builder = QueryBuilder::new("INSERT INTO ");
    builder.push(E::TABLE).push(" (");
    builder.push(
        fields
            .iter()
            .map(|(column, _)| *column)
            .collect::<Vec<_>>()
            .join(", "),
    );
    builder.push(") VALUES (");
    for (i, (_, value)) in fields.into_iter().enumerate() {
        if i > 0 {
            builder.push(", ");
        }
        push_value(&mut builder, value);
    }
    builder.push(") RETURNING id, created_at, version");
    builder
}

pub(crate) fn get_query<E: Entity>(id: i64) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new("SELECT ");
    builder
        .push(select_columns::<E>())
        .push(" FROM ")
        .push(E::TABLE)
        .push(" WHERE id = ")
        .push_bind(id);
    builder
}

/// Conditional update guarded by the version the caller last read
pub(crate) fn update_query<E: Entity>(item: &E) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new("UPDATE ");
    builder.push(E::TABLE).push(" SET ");
    for (column, value) in item.fields() {
        builder.push(column).push(" = ");
        push_value(&mut builder, value);
        builder.push(", ");
    }
    builder
        .push("version = version + 1 WHERE id = ")
        .push_bind(item.record().id)
        .push(" AND version = ")
        .push_bind(item.record().version)
        .push(" RETURNING version");
    builder
}

pub(crate) fn delete_query<E: Entity>(id: i64) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new("DELETE FROM ");
    builder.push(E::TABLE).push(" WHERE id = ").push_bind(id);
    builder
}

/// Append ` WHERE ...` for the non-empty free-text terms and the tag superset
fn push_filters<E: Entity>(builder: &mut QueryBuilder<'static, Postgres>, filter: &E::Filter) {
    builder.push(" WHERE TRUE");

    for (column, query) in filter.text_terms() {
        if query.is_empty() {
            continue;
        }
        builder
            .push(" AND to_tsvector('simple', ")
            .push(column)
            .push(") @@ plainto_tsquery('simple', ")
            .push_bind(query.to_string())
            .push(")");
    }

    let tags = filter.tags();
    if !tags.is_empty() {
        builder
            .push(" AND ")
            .push(E::TAGS_COLUMN)
            .push(" @> ")
            .push_bind(tags.to_vec());
    }
}

/// Filtered page query with the total match count in every row
///
/// Returns `None` when the sort key is not allow-listed.
pub(crate) fn list_query<E: Entity>(
    filter: &E::Filter,
    filters: &Filters,
) -> Option<QueryBuilder<'static, Postgres>> {
    let sort_column = filters.sort_column()?;

    let mut builder = QueryBuilder::new("SELECT count(*) OVER() AS total_records, ");
    builder
        .push(select_columns::<E>())
        .push(" FROM ")
        .push(E::TABLE);
    push_filters::<E>(&mut builder, filter);

    builder
        .push(" ORDER BY ")
        .push(sort_column)
        .push(" ")
        .push(filters.sort_direction().as_sql())
        .push(", id ASC LIMIT ")
        .push_bind(filters.limit())
        .push(" OFFSET ")
        .push_bind(filters.offset());

    Some(builder)
}

/// Match count alone, for pages that start past the last match
pub(crate) fn count_query<E: Entity>(filter: &E::Filter) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new("SELECT count(*) FROM ");
    builder.push(E::TABLE);
    push_filters::<E>(&mut builder, filter);
    builder
}

#[async_trait]
impl<E: Entity> Repository<E> for PgRepository<E> {
    #[instrument(skip_all, fields(kind = E::KIND))]
    async fn insert(&self, item: &mut E) -> RepositoryResult<()> {
        let mut builder = insert_query(item);
        let record = self
            .bounded(
                RepositoryOperation::Insert,
                builder.build_query_as::<Record>().fetch_one(&self.pool),
            )
            .await?;

        tracing::debug!(kind = E::KIND, id = record.id, "inserted");
        *item.record_mut() = record;
        Ok(())
    }

    #[instrument(skip(self), fields(kind = E::KIND))]
    async fn get(&self, id: i64) -> RepositoryResult<E> {
        if id < 1 {
            return Err(RepositoryError::not_found(E::KIND, id));
        }

        let mut builder = get_query::<E>(id);
        self.bounded(
            RepositoryOperation::Get,
            builder.build_query_as::<E>().fetch_optional(&self.pool),
        )
        .await?
        .ok_or_else(|| RepositoryError::not_found(E::KIND, id))
    }

    #[instrument(skip_all, fields(kind = E::KIND, id = item.record().id, version = item.record().version))]
    async fn update(&self, item: &mut E) -> RepositoryResult<()> {
        let id = item.record().id;
        let mut builder = update_query(item);
        let version = self
            .bounded(
                RepositoryOperation::Update,
                builder.build_query_scalar::<i32>().fetch_optional(&self.pool),
            )
            .await?;

        match version {
            Some(version) => {
                tracing::debug!(kind = E::KIND, id, version, "updated");
                item.record_mut().version = version;
                Ok(())
            }
            None => {
                tracing::warn!(kind = E::KIND, id, "edit conflict");
                Err(RepositoryError::edit_conflict(E::KIND, id))
            }
        }
    }

    #[instrument(skip(self), fields(kind = E::KIND))]
    async fn delete(&self, id: i64) -> RepositoryResult<()> {
        if id < 1 {
            return Err(RepositoryError::not_found(E::KIND, id)
                .with_operation(RepositoryOperation::Delete));
        }

        let mut builder = delete_query::<E>(id);
        let result = self
            .bounded(
                RepositoryOperation::Delete,
                builder.build().execute(&self.pool),
            )
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found(E::KIND, id)
                .with_operation(RepositoryOperation::Delete));
        }
        tracing::debug!(kind = E::KIND, id, "deleted");
        Ok(())
    }

    #[instrument(skip_all, fields(kind = E::KIND, page = filters.page, sort = %filters.sort))]
    async fn get_all(
        &self,
        filter: &E::Filter,
        filters: &Filters,
    ) -> RepositoryResult<(Vec<E>, Metadata)> {
        let mut builder = list_query::<E>(filter, filters)
            .ok_or_else(|| RepositoryError::invalid_sort(&filters.sort))?;

        let rows: Vec<PgRow> = self
            .bounded(
                RepositoryOperation::GetAll,
                builder.build().fetch_all(&self.pool),
            )
            .await?;

        let mut total_records = 0;
        if rows.is_empty() && filters.offset() > 0 {
            let mut builder = count_query::<E>(filter);
            total_records = self
                .bounded(
                    RepositoryOperation::GetAll,
                    builder.build_query_scalar::<i64>().fetch_one(&self.pool),
                )
                .await?;
        }

        let mut items = Vec::with_capacity(rows.len());
        for row in &rows {
            total_records = row
                .try_get::<i64, _>("total_records")
                .map_err(|e| RepositoryError::from_sqlx(RepositoryOperation::GetAll, e))?;
            items.push(
                E::from_row(row)
                    .map_err(|e| RepositoryError::from_sqlx(RepositoryOperation::GetAll, e))?,
            );
        }

        let metadata = calculate_metadata(total_records, filters.page, filters.page_size);
        tracing::debug!(kind = E::KIND, returned = items.len(), total_records, "listed");
        Ok((items, metadata))
    }
}
