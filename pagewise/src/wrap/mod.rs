//! Cursor transforms.
//!
//! A [`CursorTransform`] rewrites cursor strings on their way out and back
//! in. [`Transformed`] applies one to any [`ApplyCursors`] implementation,
//! so adapters and finders never see the outer representation:
//!
//! ```
//! use pagewise::memory::VecStore;
//! use pagewise::wrap::{AesGcmCursor, Base64Cursor};
//! use pagewise::KeysetAdapter;
//!
//! let store: VecStore<serde_json::Value> = VecStore::new(vec![]);
//! let apply = KeysetAdapter::new(store)
//!     .wrap(Base64Cursor)
//!     .wrap(AesGcmCursor::new([7u8; 32]));
//! # let _ = apply;
//! ```
//!
//! Transforms compose outside-in when decoding and inside-out when
//! encoding. Counts and boundary flags pass through untouched.

mod cipher;
mod url_safe;

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::apply::ApplyCursors;
use crate::connection::{ApplyCursorsResponse, CursorFn};
use crate::error::{CursorError, Error};
use crate::request::ApplyCursorsRequest;

pub use self::cipher::AesGcmCursor;
pub use self::url_safe::Base64Cursor;

/// A reversible rewrite of cursor strings.
pub trait CursorTransform: Send + Sync + 'static {
    /// Rewrite a cursor on its way to the client.
    fn encode(&self, cursor: &str) -> Result<String, CursorError>;

    /// Undo [`encode`](Self::encode) on a cursor coming back from a client.
    fn decode(&self, cursor: &str) -> Result<String, CursorError>;
}

/// An [`ApplyCursors`] implementation decorated with a [`CursorTransform`].
#[derive(Debug)]
pub struct Transformed<A, X> {
    inner: A,
    transform: Arc<X>,
}

impl<A, X: CursorTransform> Transformed<A, X> {
    /// Decorate `inner` with `transform`.
    pub fn new(inner: A, transform: X) -> Self {
        Self {
            inner,
            transform: Arc::new(transform),
        }
    }

    /// Add another transform on the outside.
    pub fn wrap<Y: CursorTransform>(self, transform: Y) -> Transformed<Self, Y> {
        Transformed::new(self, transform)
    }

    /// The decorated implementation.
    pub const fn inner(&self) -> &A {
        &self.inner
    }
}

#[async_trait]
impl<T, A, X> ApplyCursors<T> for Transformed<A, X>
where
    T: Send + 'static,
    A: ApplyCursors<T>,
    X: CursorTransform,
{
    async fn apply_cursors(
        &self,
        ctx: &CancellationToken,
        req: &ApplyCursorsRequest,
    ) -> Result<ApplyCursorsResponse<T>, Error> {
        let mut inner_req = req.clone();
        inner_req.after = req
            .after
            .as_deref()
            .map(|c| self.transform.decode(c))
            .transpose()
            .map_err(Error::invalid_after)?;
        inner_req.before = req
            .before
            .as_deref()
            .map(|c| self.transform.decode(c))
            .transpose()
            .map_err(Error::invalid_before)?;

        let mut resp = self.inner.apply_cursors(ctx, &inner_req).await?;
        for edge in &mut resp.edges {
            let inner = Arc::clone(&edge.cursor);
            let transform = Arc::clone(&self.transform);
            let cursor: CursorFn<T> = Arc::new(move |node: &T| {
                let raw = inner(node)?;
                transform.encode(&raw).map_err(Error::EncodeCursor)
            });
            edge.cursor = cursor;
        }
        Ok(resp)
    }
}
