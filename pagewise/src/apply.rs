//! The callback seam between the paginator and a backing store.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::connection::ApplyCursorsResponse;
use crate::error::Error;
use crate::request::ApplyCursorsRequest;

/// Resolves a bounded, ordered range into edges.
///
/// Implemented by [`KeysetAdapter`](crate::KeysetAdapter) and
/// [`OffsetAdapter`](crate::OffsetAdapter), decorated by
/// [`Transformed`](crate::wrap::Transformed), and called by
/// [`Paginator`](crate::Paginator).
///
/// Implementations return edges in forward order per `req.order_bys`, at
/// most `req.limit` of them. When `req.from_last` is set they return the
/// tail end of the range.
#[async_trait]
pub trait ApplyCursors<T>: Send + Sync {
    /// Fetch the range described by `req`.
    async fn apply_cursors(
        &self,
        ctx: &CancellationToken,
        req: &ApplyCursorsRequest,
    ) -> Result<ApplyCursorsResponse<T>, Error>;
}

#[async_trait]
impl<T, A> ApplyCursors<T> for Arc<A>
where
    T: Send + 'static,
    A: ApplyCursors<T> + ?Sized,
{
    async fn apply_cursors(
        &self,
        ctx: &CancellationToken,
        req: &ApplyCursorsRequest,
    ) -> Result<ApplyCursorsResponse<T>, Error> {
        (**self).apply_cursors(ctx, req).await
    }
}
