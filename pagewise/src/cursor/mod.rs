//! Cursor codecs and the adapters that turn finders into
//! [`ApplyCursors`](crate::ApplyCursors) implementations.

mod keyset;
mod offset;

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::Error;

pub use keyset::{
    Keyset, KeysetAdapter, KeysetFinder, KeysetQuery, decode_keyset_cursor, encode_keyset_cursor,
};
pub use offset::{Base64Offset, OffsetAdapter, OffsetCursorParser, OffsetFinder};

/// Total number of records, ignoring pagination bounds.
///
/// Optional: adapters built without a counter report `total_count: None`
/// and degrade their boundary flags to "a cursor was supplied".
#[async_trait]
pub trait Counter: Send + Sync {
    /// Count every record the finder can return.
    async fn count(&self, ctx: &CancellationToken) -> Result<usize, Error>;
}

#[async_trait]
impl<C: Counter + ?Sized> Counter for Arc<C> {
    async fn count(&self, ctx: &CancellationToken) -> Result<usize, Error> {
        (**self).count(ctx).await
    }
}

/// Run a store call, failing fast on a cancelled token and abandoning the
/// call if the token fires while it is pending.
pub(crate) async fn until_cancelled<F, R>(ctx: &CancellationToken, fut: F) -> Result<R, Error>
where
    F: Future<Output = Result<R, Error>>,
{
    if ctx.is_cancelled() {
        return Err(Error::Cancelled);
    }
    ctx.run_until_cancelled(fut).await.ok_or(Error::Cancelled)?
}

/// Count with an optional counter.
pub(crate) async fn count_with(
    ctx: &CancellationToken,
    counter: Option<&Arc<dyn Counter>>,
) -> Result<Option<usize>, Error> {
    match counter {
        Some(counter) => until_cancelled(ctx, counter.count(ctx)).await.map(Some),
        None => Ok(None),
    }
}
