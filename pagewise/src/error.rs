//! Error types for pagination.
//!
//! Three layers, mirroring when a failure can happen:
//!
//! - [`ConfigError`] is raised while building a [`Paginator`](crate::Paginator)
//!   and indicates a programmer error.
//! - [`Error`] is returned per request: validation failures, cursors that
//!   cannot be decoded, cancellation and store failures.
//! - [`CursorError`] describes why a single cursor could not be encoded or
//!   decoded. It travels inside [`Error::InvalidCursor`] and
//!   [`Error::EncodeCursor`].

use std::fmt;

/// Maximum allowed cursor size in bytes (4KB).
pub(crate) const MAX_CURSOR_SIZE: usize = 4 * 1024;

/// The cursor argument an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Boundary {
    /// The `after` argument.
    After,
    /// The `before` argument.
    Before,
}

impl fmt::Display for Boundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::After => f.write_str("after"),
            Self::Before => f.write_str("before"),
        }
    }
}

/// The limit argument an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum LimitArg {
    /// The `first` argument.
    First,
    /// The `last` argument.
    Last,
}

impl fmt::Display for LimitArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::First => f.write_str("first"),
            Self::Last => f.write_str("last"),
        }
    }
}

/// Error encoding or decoding a single cursor.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum CursorError {
    /// The base64 encoding is invalid.
    #[error("invalid base64 encoding in cursor")]
    InvalidBase64,
    /// The cursor payload could not be parsed.
    #[error("invalid cursor format: {0}")]
    InvalidFormat(String),
    /// The cursor exceeds the maximum allowed size.
    #[error("cursor exceeds maximum size ({}KB limit)", MAX_CURSOR_SIZE / 1024)]
    TooLarge,
    /// The record did not serialize to a JSON object.
    #[error("record must serialize to a JSON object")]
    NotAnObject,
    /// An ordering field is missing from the serialized record.
    #[error("field {0:?} not found in record")]
    MissingField(String),
    /// The decoded keyset has a different number of keys than the order.
    #[error("cursor length != keys length ({found} != {expected})")]
    KeyCountMismatch {
        /// Number of ordering fields.
        expected: usize,
        /// Number of keys found in the cursor.
        found: usize,
    },
    /// An ordering field is missing from the decoded keyset.
    #[error("key {0:?} not found in cursor")]
    MissingKey(String),
    /// The decoded offset is negative.
    #[error("offset cursor must not be negative, got {0}")]
    NegativeOffset(i64),
    /// Authenticated decryption failed (wrong key or tampered payload).
    #[error("cursor authentication failed")]
    Decrypt,
    /// Serialization failed while producing a cursor.
    #[error("serialize cursor: {0}")]
    Serialize(String),
}

impl CursorError {
    /// Returns `true` if this is an encoding/format error.
    ///
    /// Covers everything a client can cause by sending a malformed,
    /// stale or tampered cursor.
    #[inline]
    #[must_use]
    pub const fn is_format_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidBase64
                | Self::InvalidFormat(_)
                | Self::KeyCountMismatch { .. }
                | Self::MissingKey(_)
                | Self::NegativeOffset(_)
                | Self::Decrypt
        )
    }

    /// Returns `true` if this is a size/limit error.
    #[inline]
    #[must_use]
    pub const fn is_limit_error(&self) -> bool {
        matches!(self, Self::TooLarge)
    }
}

/// Invalid paginator configuration.
///
/// Returned by [`PaginatorBuilder::try_build`](crate::PaginatorBuilder::try_build)
/// and [`PaginationConfig::validate`](crate::PaginationConfig::validate).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// `limit_if_not_set` is zero.
    #[error("limit_if_not_set must be greater than 0")]
    LimitIfNotSetZero,
    /// `max_limit` is smaller than `limit_if_not_set`.
    #[error(
        "max_limit must be greater than or equal to limit_if_not_set ({max_limit} < {limit_if_not_set})"
    )]
    MaxLimitBelowDefault {
        /// Configured maximum.
        max_limit: usize,
        /// Configured default.
        limit_if_not_set: usize,
    },
    /// No apply-cursors callback was supplied.
    #[error("apply_cursors must be set")]
    MissingApplyCursors,
    /// The default order is empty.
    #[error("order_bys_if_not_set must be set")]
    EmptyDefaultOrderBys,
    /// The default order names a field more than once.
    #[error("order_bys_if_not_set has duplicated fields [{}]", .0.join(", "))]
    DuplicateDefaultOrderBys(Vec<String>),
}

/// Boxed error coming from a finder, counter or executor.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Pagination request error.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Both `first` and `last` were supplied.
    #[error("first and last cannot be used together")]
    FirstAndLast,
    /// `first` or `last` is negative.
    #[error("{arg} must be a non-negative integer")]
    NegativeLimit {
        /// Offending argument.
        arg: LimitArg,
    },
    /// `first` or `last` exceeds the configured maximum.
    #[error("{arg} must be less than or equal to max limit ({limit} > {max})")]
    LimitExceeded {
        /// Offending argument.
        arg: LimitArg,
        /// Requested limit.
        limit: i64,
        /// Configured maximum.
        max: usize,
    },
    /// The effective order names a field more than once.
    #[error("duplicated order by fields [{}]", .fields.join(", "))]
    DuplicateOrderBy {
        /// Every repeated field, once each.
        fields: Vec<String>,
    },
    /// `after` and `before` identify the same position.
    #[error("after == before")]
    AfterEqualsBefore,
    /// The decoded `after` offset is past the `before` offset.
    #[error("after >= before ({after} >= {before})")]
    InvalidRange {
        /// Decoded `after` offset.
        after: usize,
        /// Decoded `before` offset.
        before: usize,
    },
    /// A cursor argument could not be decoded.
    #[error("invalid {boundary} cursor: {source}")]
    InvalidCursor {
        /// Which argument was rejected.
        boundary: Boundary,
        /// Why it was rejected.
        #[source]
        source: CursorError,
    },
    /// A cursor could not be produced for a fetched record.
    #[error("encode cursor: {0}")]
    EncodeCursor(#[source] CursorError),
    /// The caller cancelled the request.
    #[error("pagination cancelled")]
    Cancelled,
    /// Failure reported by the backing store.
    #[error(transparent)]
    Store(BoxError),
}

impl Error {
    /// Wrap a store failure.
    pub fn store(err: impl Into<BoxError>) -> Self {
        Self::Store(err.into())
    }

    /// Build an [`Error::InvalidCursor`] for the `after` argument.
    pub const fn invalid_after(source: CursorError) -> Self {
        Self::InvalidCursor {
            boundary: Boundary::After,
            source,
        }
    }

    /// Build an [`Error::InvalidCursor`] for the `before` argument.
    pub const fn invalid_before(source: CursorError) -> Self {
        Self::InvalidCursor {
            boundary: Boundary::Before,
            source,
        }
    }

    /// Returns `true` if the request arguments were rejected before any
    /// store access.
    #[must_use]
    pub const fn is_request_error(&self) -> bool {
        matches!(
            self,
            Self::FirstAndLast
                | Self::NegativeLimit { .. }
                | Self::LimitExceeded { .. }
                | Self::DuplicateOrderBy { .. }
                | Self::AfterEqualsBefore
                | Self::InvalidRange { .. }
        )
    }

    /// Returns `true` if a cursor argument was stale, malformed or tampered.
    #[must_use]
    pub const fn is_invalid_cursor(&self) -> bool {
        matches!(self, Self::InvalidCursor { .. })
    }

    /// Returns `true` if the request was cancelled.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// The boundary of an [`Error::InvalidCursor`], if any.
    #[must_use]
    pub const fn boundary(&self) -> Option<Boundary> {
        match self {
            Self::InvalidCursor { boundary, .. } => Some(*boundary),
            _ => None,
        }
    }
}
