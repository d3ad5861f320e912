//! Database access seam.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value as Json};
use tokio_util::sync::CancellationToken;

use crate::builder::QueryResult;

/// A fetched row, keyed by column name.
pub type Row = Map<String, Json>;

/// Runs a parameterized query and returns its rows as JSON objects.
///
/// Implement this over whatever driver the application uses; the finders in
/// this crate only build SQL and decode rows.
#[async_trait]
pub trait Executor: Send + Sync {
    /// Run `query` and collect every row.
    async fn fetch_all(
        &self,
        ctx: &CancellationToken,
        query: &QueryResult,
    ) -> Result<Vec<Row>, pagewise::Error>;
}

#[async_trait]
impl<E: Executor + ?Sized> Executor for Arc<E> {
    async fn fetch_all(
        &self,
        ctx: &CancellationToken,
        query: &QueryResult,
    ) -> Result<Vec<Row>, pagewise::Error> {
        (**self).fetch_all(ctx, query).await
    }
}
