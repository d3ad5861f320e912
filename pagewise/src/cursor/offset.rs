//! Offset cursors.

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tokio_util::sync::CancellationToken;

use super::{Counter, count_with, until_cancelled};
use crate::apply::ApplyCursors;
use crate::connection::{ApplyCursorsResponse, CursorFn, LazyEdge};
use crate::error::{CursorError, Error, MAX_CURSOR_SIZE};
use crate::order::OrderBy;
use crate::request::ApplyCursorsRequest;
use crate::wrap::{CursorTransform, Transformed};

/// Encodes zero-based record positions as cursor strings.
pub trait OffsetCursorParser: Send + Sync {
    /// Encode `offset`.
    fn encode(&self, offset: usize) -> Result<String, CursorError>;

    /// Decode a cursor produced by [`encode`](Self::encode).
    fn decode(&self, cursor: &str) -> Result<usize, CursorError>;
}

/// Default offset codec: standard base64 of the decimal offset.
///
/// ```
/// use pagewise::{Base64Offset, OffsetCursorParser};
///
/// assert_eq!(Base64Offset.encode(9).unwrap(), "OQ==");
/// assert_eq!(Base64Offset.decode("OQ==").unwrap(), 9);
/// ```
///
/// This is framing, not protection. Wrap the adapter with
/// [`AesGcmCursor`](crate::wrap::AesGcmCursor) to make cursors opaque.
#[derive(Debug, Clone, Copy, Default)]
#[allow(clippy::exhaustive_structs)]
pub struct Base64Offset;

impl OffsetCursorParser for Base64Offset {
    fn encode(&self, offset: usize) -> Result<String, CursorError> {
        Ok(STANDARD.encode(offset.to_string()))
    }

    fn decode(&self, cursor: &str) -> Result<usize, CursorError> {
        if cursor.len() > MAX_CURSOR_SIZE {
            return Err(CursorError::TooLarge);
        }
        let bytes = STANDARD
            .decode(cursor)
            .map_err(|_| CursorError::InvalidBase64)?;
        let text =
            std::str::from_utf8(&bytes).map_err(|e| CursorError::InvalidFormat(e.to_string()))?;
        let invalid = |e: std::num::ParseIntError| CursorError::InvalidFormat(e.to_string());
        if text.starts_with('-') {
            let offset: i64 = text.parse().map_err(invalid)?;
            return Err(CursorError::NegativeOffset(offset));
        }
        text.parse().map_err(invalid)
    }
}

/// Offset-mode store access: a plain ranged fetch.
#[async_trait]
pub trait OffsetFinder<T>: Send + Sync {
    /// Skip `skip` records in `order_bys` order and return up to `limit`.
    async fn find(
        &self,
        ctx: &CancellationToken,
        order_bys: &[OrderBy],
        skip: usize,
        limit: usize,
    ) -> Result<Vec<T>, Error>;
}

#[async_trait]
impl<T, F> OffsetFinder<T> for Arc<F>
where
    T: Send + 'static,
    F: OffsetFinder<T> + ?Sized,
{
    async fn find(
        &self,
        ctx: &CancellationToken,
        order_bys: &[OrderBy],
        skip: usize,
        limit: usize,
    ) -> Result<Vec<T>, Error> {
        (**self).find(ctx, order_bys, skip, limit).await
    }
}

/// Turns an [`OffsetFinder`] into an [`ApplyCursors`] implementation.
pub struct OffsetAdapter<T, F> {
    finder: F,
    counter: Option<Arc<dyn Counter>>,
    parser: Arc<dyn OffsetCursorParser>,
    _marker: PhantomData<fn() -> T>,
}

impl<T, F: OffsetFinder<T>> OffsetAdapter<T, F> {
    /// Adapter without a counter, using [`Base64Offset`].
    pub fn new(finder: F) -> Self {
        Self {
            finder,
            counter: None,
            parser: Arc::new(Base64Offset),
            _marker: PhantomData,
        }
    }

    /// Report total counts and exact boundary flags using `counter`.
    pub fn with_counter(mut self, counter: impl Counter + 'static) -> Self {
        self.counter = Some(Arc::new(counter));
        self
    }

    /// Replace the offset codec.
    pub fn with_parser(mut self, parser: impl OffsetCursorParser + 'static) -> Self {
        self.parser = Arc::new(parser);
        self
    }

    /// Decorate with a cursor transform.
    pub fn wrap<X: CursorTransform>(self, transform: X) -> Transformed<Self, X> {
        Transformed::new(self, transform)
    }
}

impl<T, F: std::fmt::Debug> std::fmt::Debug for OffsetAdapter<T, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OffsetAdapter")
            .field("finder", &self.finder)
            .field("counter", &self.counter.is_some())
            .finish_non_exhaustive()
    }
}

/// Compute `(skip, limit)` for a request.
///
/// `after` wins as the lower bound; otherwise `before - limit`. A `last`
/// request takes the tail below `upper` (the `before` offset clamped to the
/// total count, or the total alone when no `before` was given), never
/// reaching back past `after`.
/// The limit is capped so the fetch never crosses `upper`.
fn offset_window(
    after: Option<usize>,
    before: Option<usize>,
    limit: usize,
    from_last: bool,
    total_count: Option<usize>,
) -> (usize, usize) {
    let lower = after.map_or(0, |a| a.saturating_add(1));
    let upper = match (before, total_count) {
        (Some(before), Some(total)) => Some(before.min(total)),
        (Some(before), None) => Some(before),
        (None, total) if from_last => total,
        (None, _) => None,
    };

    let skip = match (after, upper) {
        (_, Some(upper)) if from_last => upper.saturating_sub(limit).max(lower),
        (Some(_), _) => lower,
        (None, _) => upper.map_or(0, |u| u.saturating_sub(limit)),
    };
    let limit = upper.map_or(limit, |upper| limit.min(upper.saturating_sub(skip)));
    (skip, limit)
}

#[async_trait]
impl<T, F> ApplyCursors<T> for OffsetAdapter<T, F>
where
    T: Send + Sync + 'static,
    F: OffsetFinder<T>,
{
    async fn apply_cursors(
        &self,
        ctx: &CancellationToken,
        req: &ApplyCursorsRequest,
    ) -> Result<ApplyCursorsResponse<T>, Error> {
        if req.after.is_some() && req.after == req.before {
            return Err(Error::AfterEqualsBefore);
        }

        let after = req
            .after
            .as_deref()
            .map(|c| self.parser.decode(c))
            .transpose()
            .map_err(Error::invalid_after)?;
        let before = req
            .before
            .as_deref()
            .map(|c| self.parser.decode(c))
            .transpose()
            .map_err(Error::invalid_before)?;
        if let (Some(after), Some(before)) = (after, before) {
            if after == before {
                return Err(Error::AfterEqualsBefore);
            }
            if after > before {
                return Err(Error::InvalidRange { after, before });
            }
        }

        let total_count = count_with(ctx, self.counter.as_ref()).await?;
        let (skip, limit) = offset_window(after, before, req.limit, req.from_last, total_count);

        let nodes = if limit == 0 || total_count.is_some_and(|total| skip >= total) {
            tracing::trace!(skip, limit, ?total_count, "offset fetch skipped");
            Vec::new()
        } else {
            tracing::trace!(skip, limit, "offset fetch");
            until_cancelled(ctx, self.finder.find(ctx, &req.order_bys, skip, limit)).await?
        };

        let edges = nodes
            .into_iter()
            .enumerate()
            .map(|(i, node)| {
                let parser = Arc::clone(&self.parser);
                let offset = skip.saturating_add(i);
                let cursor: CursorFn<T> =
                    Arc::new(move |_: &T| parser.encode(offset).map_err(Error::EncodeCursor));
                LazyEdge::new(node, cursor)
            })
            .collect();

        let (has_after_or_previous, has_before_or_next) = match total_count {
            Some(total) => (
                after.is_some_and(|a| a < total),
                before.is_some_and(|b| b < total),
            ),
            None => (after.is_some(), before.is_some()),
        };

        Ok(ApplyCursorsResponse::new(edges)
            .with_total_count(total_count)
            .with_boundaries(has_after_or_previous, has_before_or_next))
    }
}
