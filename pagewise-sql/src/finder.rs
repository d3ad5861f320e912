//! SQL-backed finders and counter.

use std::sync::Arc;

use async_trait::async_trait;
use pagewise::{
    Counter, Error, KeysetAdapter, KeysetFinder, KeysetQuery, OffsetAdapter, OffsetFinder, OrderBy,
};
use serde::de::DeserializeOwned;
use serde_json::Value as Json;
use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::builder::{QueryResult, SelectBuilder};
use crate::dialect::Dialect;
use crate::error::SqlError;
use crate::executor::{Executor, Row};
use crate::keyset::{Bound, keyset_filter};
use crate::source::Table;

/// One table behind an [`Executor`], usable as a [`KeysetFinder`], an
/// [`OffsetFinder`] and a [`Counter`].
///
/// Cloning is cheap; clones share the table and the executor.
#[derive(Debug)]
pub struct SqlStore<D, E> {
    dialect: D,
    table: Arc<Table>,
    executor: Arc<E>,
}

impl<D: Clone, E> Clone for SqlStore<D, E> {
    fn clone(&self) -> Self {
        Self {
            dialect: self.dialect.clone(),
            table: Arc::clone(&self.table),
            executor: Arc::clone(&self.executor),
        }
    }
}

impl<D: Dialect, E: Executor> SqlStore<D, E> {
    /// Store reading `table` through `executor`.
    pub fn new(dialect: D, table: Table, executor: E) -> Self {
        Self {
            dialect,
            table: Arc::new(table),
            executor: Arc::new(executor),
        }
    }

    /// Table description.
    pub fn table(&self) -> &Table {
        &self.table
    }

    /// Underlying executor.
    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// SQL for one keyset range.
    ///
    /// Bounds compare in the forward order; the rows are sorted by
    /// [`KeysetQuery::fetch_order`].
    pub fn keyset_query(&self, query: &KeysetQuery<'_>) -> Result<QueryResult, SqlError> {
        let mut select = self.table.select(self.dialect);
        if let Some(after) = query.after {
            select = select.filter(keyset_filter(
                query.order_bys,
                after,
                &self.table,
                Bound::After,
            )?);
        }
        if let Some(before) = query.before {
            select = select.filter(keyset_filter(
                query.order_bys,
                before,
                &self.table,
                Bound::Before,
            )?);
        }
        let select = self.sorted(select, &query.fetch_order())?;
        Ok(select.limit(query.limit).build())
    }

    /// SQL for one offset range.
    pub fn offset_query(
        &self,
        order_bys: &[OrderBy],
        skip: usize,
        limit: usize,
    ) -> Result<QueryResult, SqlError> {
        let select = self.sorted(self.table.select(self.dialect), order_bys)?;
        Ok(select.limit(limit).offset(skip).build())
    }

    /// SQL counting every row under the base filter.
    pub fn count_query(&self) -> QueryResult {
        self.table.select(self.dialect).count().build()
    }

    fn sorted(
        &self,
        mut select: SelectBuilder<D>,
        order_bys: &[OrderBy],
    ) -> Result<SelectBuilder<D>, SqlError> {
        for order_by in order_bys {
            select = select.order_by(self.table.column_for(&order_by.field)?, order_by.desc);
        }
        Ok(select)
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        ctx: &CancellationToken,
        query: &QueryResult,
    ) -> Result<Vec<T>, Error> {
        trace!(sql = %query.sql, params = query.params.len(), "fetch page");
        let rows = self.executor.fetch_all(ctx, query).await?;
        rows.into_iter().map(|row| self.decode(row)).collect()
    }

    fn decode<T: DeserializeOwned>(&self, row: Row) -> Result<T, Error> {
        let record = self.table.row_to_record(row);
        serde_json::from_value(Json::Object(record))
            .map_err(|err| SqlError::Decode(err.to_string()).into())
    }
}

#[async_trait]
impl<T, D, E> KeysetFinder<T> for SqlStore<D, E>
where
    T: DeserializeOwned + Send + 'static,
    D: Dialect,
    E: Executor,
{
    async fn find(&self, ctx: &CancellationToken, query: &KeysetQuery<'_>) -> Result<Vec<T>, Error> {
        let sql = self.keyset_query(query)?;
        self.fetch(ctx, &sql).await
    }
}

#[async_trait]
impl<T, D, E> OffsetFinder<T> for SqlStore<D, E>
where
    T: DeserializeOwned + Send + 'static,
    D: Dialect,
    E: Executor,
{
    async fn find(
        &self,
        ctx: &CancellationToken,
        order_bys: &[OrderBy],
        skip: usize,
        limit: usize,
    ) -> Result<Vec<T>, Error> {
        let sql = self.offset_query(order_bys, skip, limit)?;
        self.fetch(ctx, &sql).await
    }
}

#[async_trait]
impl<D: Dialect, E: Executor> Counter for SqlStore<D, E> {
    async fn count(&self, ctx: &CancellationToken) -> Result<usize, Error> {
        let query = self.count_query();
        trace!(sql = %query.sql, "count rows");
        let rows = self.executor.fetch_all(ctx, &query).await?;
        let count = rows
            .first()
            .and_then(|row| row.get("count"))
            .and_then(Json::as_u64)
            .and_then(|n| usize::try_from(n).ok())
            .ok_or(SqlError::MissingCount)?;
        Ok(count)
    }
}

/// Keyset adapter over `store`, counting with the same store.
pub fn keyset_adapter<T, D, E>(store: SqlStore<D, E>) -> KeysetAdapter<T, SqlStore<D, E>>
where
    T: DeserializeOwned + Send + 'static,
    D: Dialect,
    E: Executor + 'static,
{
    KeysetAdapter::new(store.clone()).with_counter(store)
}

/// Offset adapter over `store`, counting with the same store.
pub fn offset_adapter<T, D, E>(store: SqlStore<D, E>) -> OffsetAdapter<T, SqlStore<D, E>>
where
    T: DeserializeOwned + Send + 'static,
    D: Dialect,
    E: Executor + 'static,
{
    OffsetAdapter::new(store.clone()).with_counter(store)
}
