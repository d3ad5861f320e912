//! In-memory store.
//!
//! [`VecStore`] answers keyset, offset and count requests over a `Vec` of
//! serializable records. Records are ordered by their serialized field
//! values, exactly as keyset cursors see them.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::cursor::{Counter, Keyset, KeysetFinder, KeysetQuery, OffsetFinder};
use crate::error::Error;
use crate::order::{OrderBy, field_names};

/// A shared, immutable set of records.
#[derive(Debug)]
pub struct VecStore<T> {
    records: Arc<Vec<T>>,
}

impl<T> Clone for VecStore<T> {
    fn clone(&self) -> Self {
        Self {
            records: Arc::clone(&self.records),
        }
    }
}

impl<T: Serialize + Clone> VecStore<T> {
    /// Store over `records`.
    pub fn new(records: Vec<T>) -> Self {
        Self {
            records: Arc::new(records),
        }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// `true` if the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Every record with its keyset under `order_bys`, sorted.
    fn sorted(&self, order_bys: &[OrderBy]) -> Result<Vec<(Keyset, &T)>, Error> {
        let keys = field_names(order_bys);
        let mut rows = self
            .records
            .iter()
            .map(|record| {
                Keyset::from_record(record, &keys)
                    .map(|keyset| (keyset, record))
                    .map_err(Error::store)
            })
            .collect::<Result<Vec<_>, _>>()?;
        rows.sort_by(|(a, _), (b, _)| a.cmp_by(b, order_bys));
        Ok(rows)
    }
}

#[async_trait]
impl<T> KeysetFinder<T> for VecStore<T>
where
    T: Serialize + Clone + Send + Sync + 'static,
{
    async fn find(&self, ctx: &CancellationToken, query: &KeysetQuery<'_>) -> Result<Vec<T>, Error> {
        if ctx.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let fetch_order = query.fetch_order();
        let mut rows = self.sorted(&fetch_order)?;
        rows.retain(|(keyset, _)| query.contains(keyset));

        Ok(rows
            .into_iter()
            .take(query.limit)
            .map(|(_, record)| record.clone())
            .collect())
    }
}

#[async_trait]
impl<T> OffsetFinder<T> for VecStore<T>
where
    T: Serialize + Clone + Send + Sync + 'static,
{
    async fn find(
        &self,
        ctx: &CancellationToken,
        order_bys: &[OrderBy],
        skip: usize,
        limit: usize,
    ) -> Result<Vec<T>, Error> {
        if ctx.is_cancelled() {
            return Err(Error::Cancelled);
        }

        Ok(self
            .sorted(order_bys)?
            .into_iter()
            .skip(skip)
            .take(limit)
            .map(|(_, record)| record.clone())
            .collect())
    }
}

#[async_trait]
impl<T> Counter for VecStore<T>
where
    T: Send + Sync + 'static,
{
    async fn count(&self, ctx: &CancellationToken) -> Result<usize, Error> {
        if ctx.is_cancelled() {
            return Err(Error::Cancelled);
        }
        Ok(self.records.len())
    }
}
