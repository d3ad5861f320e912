//! Connection, edge and page info types.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Deferred cursor computation for one node.
///
/// Adapters attach one to every edge; transforms compose over it; the
/// paginator calls it last, and not at all in nodes-only mode.
pub type CursorFn<T> = Arc<dyn Fn(&T) -> Result<String, Error> + Send + Sync>;

/// An edge whose cursor has not been computed yet.
pub struct LazyEdge<T> {
    /// The record.
    pub node: T,
    /// Computes the record's cursor.
    pub cursor: CursorFn<T>,
}

impl<T> LazyEdge<T> {
    /// Pair a node with its cursor function.
    pub fn new(node: T, cursor: CursorFn<T>) -> Self {
        Self { node, cursor }
    }

    /// Compute the cursor.
    pub fn cursor(&self) -> Result<String, Error> {
        (self.cursor)(&self.node)
    }

    /// Materialize into an [`Edge`].
    pub fn into_edge(self) -> Result<Edge<T>, Error> {
        let cursor = self.cursor()?;
        Ok(Edge {
            node: self.node,
            cursor,
        })
    }
}

impl<T: Clone> Clone for LazyEdge<T> {
    fn clone(&self) -> Self {
        Self {
            node: self.node.clone(),
            cursor: Arc::clone(&self.cursor),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for LazyEdge<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyEdge")
            .field("node", &self.node)
            .finish_non_exhaustive()
    }
}

/// A record with its cursor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct Edge<T> {
    /// The record.
    pub node: T,
    /// Opaque position of the record.
    pub cursor: String,
}

impl<T> Edge<T> {
    /// Create an edge.
    pub fn new(node: T, cursor: impl Into<String>) -> Self {
        Self {
            node,
            cursor: cursor.into(),
        }
    }
}

/// Page boundaries of a connection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct PageInfo {
    /// Total matching records, when a counter is configured.
    pub total_count: Option<usize>,
    /// Whether records exist after this page.
    pub has_next_page: bool,
    /// Whether records exist before this page.
    pub has_previous_page: bool,
    /// Cursor of the first edge.
    pub start_cursor: Option<String>,
    /// Cursor of the last edge.
    pub end_cursor: Option<String>,
}

impl PageInfo {
    /// Page info with the given boundary flags and nothing else.
    #[must_use]
    pub const fn new(has_next_page: bool, has_previous_page: bool) -> Self {
        Self {
            total_count: None,
            has_next_page,
            has_previous_page,
            start_cursor: None,
            end_cursor: None,
        }
    }

    /// Set the total count.
    #[must_use]
    pub const fn with_total_count(mut self, total_count: Option<usize>) -> Self {
        self.total_count = total_count;
        self
    }

    /// Set the start and end cursors.
    #[must_use]
    pub fn with_cursors(mut self, start: Option<String>, end: Option<String>) -> Self {
        self.start_cursor = start;
        self.end_cursor = end;
        self
    }
}

/// A page of results.
///
/// `edges` is populated normally. A nodes-only paginator fills `nodes`
/// instead and leaves both page cursors unset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct Connection<T> {
    /// Records with cursors.
    pub edges: Vec<Edge<T>>,
    /// Records without cursors (nodes-only mode).
    pub nodes: Vec<T>,
    /// Page boundaries.
    pub page_info: PageInfo,
}

impl<T> Connection<T> {
    /// Number of records on this page, whichever list carries them.
    pub fn len(&self) -> usize {
        self.edges.len() + self.nodes.len()
    }

    /// `true` when the page is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate the page's records.
    pub fn iter_nodes(&self) -> impl Iterator<Item = &T> {
        self.edges.iter().map(|e| &e.node).chain(self.nodes.iter())
    }
}

/// What an [`ApplyCursors`](crate::ApplyCursors) implementation returns.
#[non_exhaustive]
pub struct ApplyCursorsResponse<T> {
    /// Fetched records in forward order.
    pub edges: Vec<LazyEdge<T>>,
    /// Total matching records, when a counter is configured.
    pub total_count: Option<usize>,
    /// Records may exist before the fetched range.
    pub has_after_or_previous: bool,
    /// Records may exist after the fetched range.
    pub has_before_or_next: bool,
}

impl<T> ApplyCursorsResponse<T> {
    /// A response carrying `edges` and no boundary facts.
    pub const fn new(edges: Vec<LazyEdge<T>>) -> Self {
        Self {
            edges,
            total_count: None,
            has_after_or_previous: false,
            has_before_or_next: false,
        }
    }

    /// Set the total count.
    #[must_use]
    pub fn with_total_count(mut self, total_count: Option<usize>) -> Self {
        self.total_count = total_count;
        self
    }

    /// Set both boundary flags.
    #[must_use]
    pub fn with_boundaries(mut self, has_after_or_previous: bool, has_before_or_next: bool) -> Self {
        self.has_after_or_previous = has_after_or_previous;
        self.has_before_or_next = has_before_or_next;
        self
    }
}

impl<T: fmt::Debug> fmt::Debug for ApplyCursorsResponse<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApplyCursorsResponse")
            .field("edges", &self.edges)
            .field("total_count", &self.total_count)
            .field("has_after_or_previous", &self.has_after_or_previous)
            .field("has_before_or_next", &self.has_before_or_next)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lazy_edge_materializes_cursor() {
        let cursor: CursorFn<u32> = Arc::new(|n| Ok(format!("c{n}")));
        let edge = LazyEdge::new(7, cursor).into_edge().unwrap();
        assert_eq!(edge, Edge::new(7, "c7"));
    }

    #[test]
    fn test_page_info_serializes_camel_case() {
        let info = PageInfo::new(true, false)
            .with_total_count(Some(100))
            .with_cursors(Some("a".into()), Some("b".into()));
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "totalCount": 100,
                "hasNextPage": true,
                "hasPreviousPage": false,
                "startCursor": "a",
                "endCursor": "b",
            })
        );
    }

    #[test]
    fn test_connection_len_counts_either_list() {
        let conn = Connection {
            edges: vec![Edge::new(1, "a")],
            nodes: vec![],
            page_info: PageInfo::default(),
        };
        assert_eq!(conn.len(), 1);
        assert_eq!(conn.iter_nodes().copied().collect::<Vec<_>>(), vec![1]);

        let conn = Connection::<i32> {
            edges: vec![],
            nodes: vec![],
            page_info: PageInfo::default(),
        };
        assert!(conn.is_empty());
    }
}
