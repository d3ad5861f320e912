//! Pagination requests.

use serde::{Deserialize, Serialize};

use crate::order::OrderBy;

/// Relay connection arguments.
///
/// Integer arguments are signed because they usually arrive straight from a
/// GraphQL `Int` or a query string; [`Paginator`](crate::Paginator) rejects
/// negative values.
///
/// ```
/// use pagewise::{OrderBy, PaginateRequest};
///
/// let req: PaginateRequest =
///     serde_json::from_str(r#"{"first":2,"after":"{\"id\":1}","orderBys":[{"field":"id"}]}"#)
///         .unwrap();
/// assert_eq!(req, PaginateRequest::new().first(2).after("{\"id\":1}").order_by(OrderBy::asc("id")));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
#[non_exhaustive]
pub struct PaginateRequest {
    /// Return the first `n` records after `after`.
    pub first: Option<i64>,
    /// Return the last `n` records before `before`.
    pub last: Option<i64>,
    /// Exclusive lower bound.
    pub after: Option<String>,
    /// Exclusive upper bound.
    pub before: Option<String>,
    /// Order override; the paginator default applies when empty.
    pub order_bys: Vec<OrderBy>,
}

impl PaginateRequest {
    /// An empty request: default limit, default order, no bounds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `first`.
    pub const fn first(mut self, n: i64) -> Self {
        self.first = Some(n);
        self
    }

    /// Set `last`.
    pub const fn last(mut self, n: i64) -> Self {
        self.last = Some(n);
        self
    }

    /// Set the `after` cursor.
    pub fn after(mut self, cursor: impl Into<String>) -> Self {
        self.after = Some(cursor.into());
        self
    }

    /// Set the `before` cursor.
    pub fn before(mut self, cursor: impl Into<String>) -> Self {
        self.before = Some(cursor.into());
        self
    }

    /// Append one order-by component.
    pub fn order_by(mut self, order_by: OrderBy) -> Self {
        self.order_bys.push(order_by);
        self
    }

    /// Replace the order.
    pub fn order_bys(mut self, order_bys: Vec<OrderBy>) -> Self {
        self.order_bys = order_bys;
        self
    }
}

/// Arguments handed to an [`ApplyCursors`](crate::ApplyCursors) implementation.
///
/// `limit` already includes the probe row the paginator uses to detect a
/// further page.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct ApplyCursorsRequest {
    /// Opaque `after` cursor.
    pub after: Option<String>,
    /// Opaque `before` cursor.
    pub before: Option<String>,
    /// Effective order; never empty.
    pub order_bys: Vec<OrderBy>,
    /// Maximum number of edges to return.
    pub limit: usize,
    /// Fetch the tail end of the range (`last` was supplied).
    pub from_last: bool,
}

impl ApplyCursorsRequest {
    /// Forward request without bounds.
    pub const fn new(order_bys: Vec<OrderBy>, limit: usize) -> Self {
        Self {
            after: None,
            before: None,
            order_bys,
            limit,
            from_last: false,
        }
    }

    /// Set the `after` cursor.
    pub fn after(mut self, cursor: impl Into<String>) -> Self {
        self.after = Some(cursor.into());
        self
    }

    /// Set the `before` cursor.
    pub fn before(mut self, cursor: impl Into<String>) -> Self {
        self.before = Some(cursor.into());
        self
    }

    /// Set `from_last`.
    pub const fn from_last(mut self, from_last: bool) -> Self {
        self.from_last = from_last;
        self
    }
}
