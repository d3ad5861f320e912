// =============================================================================
// CRATE-LEVEL QUALITY LINTS (following Tokio/Serde standards)
// =============================================================================
#![forbid(unsafe_code)]
#![deny(unused_must_use)]
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![warn(rust_2018_idioms)]
#![warn(unreachable_pub)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::broken_intra_doc_links)]
// =============================================================================
// CLIPPY CONFIGURATION
// =============================================================================
#![allow(clippy::doc_markdown)] // Field names in docs
#![allow(clippy::missing_errors_doc)] // # Errors sections - doc-heavy
#![allow(clippy::missing_panics_doc)] // # Panics sections - doc-heavy
#![allow(clippy::module_name_repetitions)] // Type names matching module - acceptable
#![allow(clippy::return_self_not_must_use)] // Builder pattern methods return Self
#![allow(clippy::must_use_candidate)] // Fluent API doesn't need must_use

//! # pagewise - Relay cursor pagination
//!
//! Validates Relay connection arguments (`first`, `last`, `after`,
//! `before`), fetches exactly one page from a store and returns a
//! [`Connection`] with edges, opaque cursors and accurate
//! [`PageInfo`] flags.
//!
//! The store is reached through [`ApplyCursors`]. Two adapters implement it
//! on top of simpler finder traits:
//!
//! - [`KeysetAdapter`] over a [`KeysetFinder`]: cursors carry the ordering
//!   field values of a record, so pages stay stable under inserts.
//! - [`OffsetAdapter`] over an [`OffsetFinder`]: cursors carry a row
//!   position.
//!
//! Either can be decorated with a [`CursorTransform`](wrap::CursorTransform),
//! such as URL-safe base64 or AES-GCM encryption.
//!
//! ## Quick Start
//!
//! ```
//! use pagewise::memory::VecStore;
//! use pagewise::wrap::AesGcmCursor;
//! use pagewise::{KeysetAdapter, OrderBy, PaginateRequest, Paginator};
//! use tokio_util::sync::CancellationToken;
//!
//! #[derive(Clone, serde::Serialize)]
//! struct User { id: u32, age: u32 }
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let store = VecStore::new((0..30).map(|id| User { id, age: 100 - id }).collect());
//! let paginator = Paginator::builder()
//!     .max_limit(20)
//!     .limit_if_not_set(10)
//!     .order_bys_if_not_set(vec![OrderBy::asc("id"), OrderBy::desc("age")])
//!     .apply_cursors(
//!         KeysetAdapter::new(store.clone())
//!             .with_counter(store)
//!             .wrap(AesGcmCursor::new([7u8; 32])),
//!     )
//!     .build();
//!
//! let ctx = CancellationToken::new();
//! let first = paginator.paginate(&ctx, &PaginateRequest::new().first(5)).await.unwrap();
//! assert_eq!(first.page_info.total_count, Some(30));
//! assert!(first.page_info.has_next_page);
//!
//! let end = first.page_info.end_cursor.clone().unwrap();
//! let next = paginator
//!     .paginate(&ctx, &PaginateRequest::new().first(5).after(end))
//!     .await
//!     .unwrap();
//! assert_eq!(next.edges[0].node.id, 5);
//! assert!(next.page_info.has_previous_page);
//! # });
//! ```

mod apply;
mod config;
mod connection;
mod cursor;
mod error;
pub mod memory;
mod order;
mod paginator;
mod request;
pub mod wrap;

pub use apply::ApplyCursors;
pub use config::{DEFAULT_LIMIT_IF_NOT_SET, DEFAULT_MAX_LIMIT, PaginationConfig};
pub use connection::{ApplyCursorsResponse, Connection, CursorFn, Edge, LazyEdge, PageInfo};
pub use cursor::{
    Base64Offset, Counter, Keyset, KeysetAdapter, KeysetFinder, KeysetQuery, OffsetAdapter,
    OffsetCursorParser, OffsetFinder, decode_keyset_cursor, encode_keyset_cursor,
};
pub use error::{Boundary, BoxError, ConfigError, CursorError, Error, LimitArg};
pub use order::{OrderBy, OrderByParseError, duplicated_fields, field_names};
pub use paginator::{Paginator, PaginatorBuilder};
pub use request::{ApplyCursorsRequest, PaginateRequest};

/// Prelude module for convenient imports.
///
/// ```
/// use pagewise::prelude::*;
/// let req = PaginateRequest::new().first(10).order_by(OrderBy::desc("created_at"));
/// assert_eq!(req.first, Some(10));
/// ```
pub mod prelude {
    pub use crate::wrap::{AesGcmCursor, Base64Cursor, CursorTransform};
    pub use crate::{
        ApplyCursors, ApplyCursorsRequest, ApplyCursorsResponse, Base64Offset, Connection,
        Counter, Edge, Error, Keyset, KeysetAdapter, KeysetFinder, KeysetQuery, LazyEdge,
        OffsetAdapter, OffsetCursorParser, OffsetFinder, OrderBy, PageInfo, PaginateRequest,
        PaginationConfig, Paginator,
    };
}


// ============================================================================
// API Contract Tests (compile-time assertions)
// ============================================================================
