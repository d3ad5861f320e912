//! The pagination engine.

use std::fmt;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::apply::ApplyCursors;
use crate::config::PaginationConfig;
use crate::connection::{Connection, Edge, LazyEdge, PageInfo};
use crate::error::{ConfigError, Error, LimitArg};
use crate::order::{OrderBy, duplicated_fields};
use crate::request::{ApplyCursorsRequest, PaginateRequest};

/// Validates Relay connection arguments, fetches one page through an
/// [`ApplyCursors`] implementation and assembles the [`Connection`].
///
/// The paginator asks for one record more than the page holds. That probe
/// row proves whether another page exists in the fetch direction; the
/// opposite direction is reported by the adapter's boundary flags.
///
/// ```
/// use pagewise::memory::VecStore;
/// use pagewise::{KeysetAdapter, OrderBy, PaginateRequest, Paginator};
/// use tokio_util::sync::CancellationToken;
///
/// #[derive(Clone, serde::Serialize)]
/// struct Item { id: u32 }
///
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// let store = VecStore::new((0..5).map(|id| Item { id }).collect());
/// let paginator = Paginator::builder()
///     .max_limit(10)
///     .limit_if_not_set(2)
///     .order_bys_if_not_set(vec![OrderBy::asc("id")])
///     .apply_cursors(KeysetAdapter::new(store))
///     .build();
///
/// let page = paginator
///     .paginate(&CancellationToken::new(), &PaginateRequest::new())
///     .await
///     .unwrap();
/// assert_eq!(page.edges.len(), 2);
/// assert!(page.page_info.has_next_page);
/// assert_eq!(page.page_info.end_cursor.as_deref(), Some(r#"{"id":1}"#));
/// # });
/// ```
pub struct Paginator<T> {
    config: PaginationConfig,
    apply_cursors: Arc<dyn ApplyCursors<T>>,
}

impl<T> Clone for Paginator<T> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            apply_cursors: Arc::clone(&self.apply_cursors),
        }
    }
}

impl<T> fmt::Debug for Paginator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Paginator")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<T: Send + 'static> Paginator<T> {
    /// Start building a paginator.
    pub fn builder() -> PaginatorBuilder<T> {
        PaginatorBuilder::new()
    }

    /// Build from a loaded configuration.
    pub fn from_config(
        config: PaginationConfig,
        apply_cursors: impl ApplyCursors<T> + 'static,
    ) -> Result<Self, ConfigError> {
        PaginatorBuilder {
            config,
            apply_cursors: Some(Arc::new(apply_cursors)),
        }
        .try_build()
    }

    /// The settings this paginator was built with.
    pub const fn config(&self) -> &PaginationConfig {
        &self.config
    }

    /// Fetch one page.
    ///
    /// Request validation happens before any store access; cancellation is
    /// checked before dispatch and by the adapters around every store call.
    pub async fn paginate(
        &self,
        ctx: &CancellationToken,
        req: &PaginateRequest,
    ) -> Result<Connection<T>, Error> {
        let (limit, from_last) = self.resolve_limit(req)?;

        let order_bys = if req.order_bys.is_empty() {
            self.config.order_bys_if_not_set.clone()
        } else {
            req.order_bys.clone()
        };
        let dups = duplicated_fields(&order_bys);
        if !dups.is_empty() {
            return Err(Error::DuplicateOrderBy { fields: dups });
        }

        if req.after.is_some() && req.after == req.before {
            return Err(Error::AfterEqualsBefore);
        }
        if ctx.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let apply_req = ApplyCursorsRequest {
            after: req.after.clone(),
            before: req.before.clone(),
            order_bys,
            limit: limit.saturating_add(1),
            from_last,
        };
        debug!(
            limit,
            from_last,
            has_after = apply_req.after.is_some(),
            has_before = apply_req.before.is_some(),
            order = %DisplayOrder(&apply_req.order_bys),
            "paginate"
        );

        let resp = self.apply_cursors.apply_cursors(ctx, &apply_req).await?;

        let mut edges = resp.edges;
        let fetched = edges.len();
        let has_more = fetched > limit;
        let (has_next_page, has_previous_page) = if from_last {
            if has_more {
                edges.drain(..fetched - limit);
            }
            (resp.has_before_or_next, has_more || resp.has_after_or_previous)
        } else {
            edges.truncate(limit);
            (has_more || resp.has_before_or_next, resp.has_after_or_previous)
        };

        let page_info =
            PageInfo::new(has_next_page, has_previous_page).with_total_count(resp.total_count);

        let conn = if self.config.nodes_only {
            Connection {
                edges: Vec::new(),
                nodes: edges.into_iter().map(|edge| edge.node).collect(),
                page_info,
            }
        } else {
            let edges = edges
                .into_iter()
                .map(LazyEdge::into_edge)
                .collect::<Result<Vec<Edge<T>>, _>>()?;
            let start = edges.first().map(|e| e.cursor.clone());
            let end = edges.last().map(|e| e.cursor.clone());
            Connection {
                edges,
                nodes: Vec::new(),
                page_info: page_info.with_cursors(start, end),
            }
        };

        debug!(
            fetched,
            returned = conn.len(),
            has_next_page,
            has_previous_page,
            total_count = ?conn.page_info.total_count,
            "page assembled"
        );
        Ok(conn)
    }

    fn resolve_limit(&self, req: &PaginateRequest) -> Result<(usize, bool), Error> {
        let check = |n: i64, arg: LimitArg| -> Result<usize, Error> {
            let limit = usize::try_from(n).map_err(|_| Error::NegativeLimit { arg })?;
            if limit > self.config.max_limit {
                return Err(Error::LimitExceeded {
                    arg,
                    limit: n,
                    max: self.config.max_limit,
                });
            }
            Ok(limit)
        };

        match (req.first, req.last) {
            (Some(_), Some(_)) => Err(Error::FirstAndLast),
            (Some(first), None) => Ok((check(first, LimitArg::First)?, false)),
            (None, Some(last)) => Ok((check(last, LimitArg::Last)?, true)),
            (None, None) => Ok((self.config.limit_if_not_set, false)),
        }
    }
}

struct DisplayOrder<'a>(&'a [OrderBy]);

impl fmt::Display for DisplayOrder<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, order_by) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{order_by}")?;
        }
        Ok(())
    }
}

/// Builder for [`Paginator`].
///
/// Starts from [`PaginationConfig::default`]; the apply-cursors callback
/// and a default order are required.
pub struct PaginatorBuilder<T> {
    config: PaginationConfig,
    apply_cursors: Option<Arc<dyn ApplyCursors<T>>>,
}

impl<T> fmt::Debug for PaginatorBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaginatorBuilder")
            .field("config", &self.config)
            .field("apply_cursors", &self.apply_cursors.is_some())
            .finish()
    }
}

impl<T: Send + 'static> Default for PaginatorBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send + 'static> PaginatorBuilder<T> {
    /// Builder with default limits and nothing else.
    pub fn new() -> Self {
        Self {
            config: PaginationConfig::default(),
            apply_cursors: None,
        }
    }

    /// Start from a loaded configuration.
    pub fn config(mut self, config: PaginationConfig) -> Self {
        self.config = config;
        self
    }

    /// Skip cursor computation and return bare nodes.
    pub const fn nodes_only(mut self, nodes_only: bool) -> Self {
        self.config.nodes_only = nodes_only;
        self
    }

    /// Largest `first`/`last` a request may ask for.
    pub const fn max_limit(mut self, max_limit: usize) -> Self {
        self.config.max_limit = max_limit;
        self
    }

    /// Page size when neither `first` nor `last` is given.
    pub const fn limit_if_not_set(mut self, limit: usize) -> Self {
        self.config.limit_if_not_set = limit;
        self
    }

    /// Order used when the request has none.
    pub fn order_bys_if_not_set(mut self, order_bys: Vec<OrderBy>) -> Self {
        self.config.order_bys_if_not_set = order_bys;
        self
    }

    /// The store-backed callback.
    pub fn apply_cursors(mut self, apply_cursors: impl ApplyCursors<T> + 'static) -> Self {
        self.apply_cursors = Some(Arc::new(apply_cursors));
        self
    }

    /// The store-backed callback, already shared.
    pub fn apply_cursors_shared(mut self, apply_cursors: Arc<dyn ApplyCursors<T>>) -> Self {
        self.apply_cursors = Some(apply_cursors);
        self
    }

    /// Validate and build.
    pub fn try_build(self) -> Result<Paginator<T>, ConfigError> {
        self.config.validate_limits()?;
        let apply_cursors = self
            .apply_cursors
            .ok_or(ConfigError::MissingApplyCursors)?;
        self.config.validate_order()?;
        Ok(Paginator {
            config: self.config,
            apply_cursors,
        })
    }

    /// Validate and build.
    ///
    /// # Panics
    ///
    /// Panics if the configuration is invalid. A paginator is built once at
    /// startup, so a bad configuration is a programmer error.
    pub fn build(self) -> Paginator<T> {
        match self.try_build() {
            Ok(paginator) => paginator,
            Err(err) => panic!("invalid paginator configuration: {err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::{ApplyCursorsResponse, CursorFn};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Returns `n` numbered edges and records the last request.
    struct Fixed {
        n: usize,
        flags: (bool, bool),
        seen: Mutex<Option<ApplyCursorsRequest>>,
    }

    impl Fixed {
        fn new(n: usize) -> Self {
            Self {
                n,
                flags: (false, false),
                seen: Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl ApplyCursors<usize> for Fixed {
        async fn apply_cursors(
            &self,
            _ctx: &CancellationToken,
            req: &ApplyCursorsRequest,
        ) -> Result<ApplyCursorsResponse<usize>, Error> {
            *self.seen.lock().unwrap() = Some(req.clone());
            let cursor: CursorFn<usize> = Arc::new(|n: &usize| Ok(format!("c{n}")));
            let edges = (0..self.n.min(req.limit))
                .map(|i| LazyEdge::new(i, Arc::clone(&cursor)))
                .collect();
            Ok(ApplyCursorsResponse::new(edges).with_boundaries(self.flags.0, self.flags.1))
        }
    }

    fn paginator(apply: Arc<Fixed>) -> Paginator<usize> {
        Paginator::builder()
            .max_limit(20)
            .limit_if_not_set(10)
            .order_bys_if_not_set(vec![OrderBy::asc("id")])
            .apply_cursors_shared(apply)
            .build()
    }

    async fn run(p: &Paginator<usize>, req: PaginateRequest) -> Result<Connection<usize>, Error> {
        p.paginate(&CancellationToken::new(), &req).await
    }

    #[tokio::test]
    async fn test_requests_probe_row() {
        let apply = Arc::new(Fixed::new(100));
        let p = paginator(Arc::clone(&apply));

        let conn = run(&p, PaginateRequest::new()).await.unwrap();
        let seen = apply.seen.lock().unwrap().clone().unwrap();
        assert_eq!(seen.limit, 11);
        assert!(!seen.from_last);
        assert_eq!(seen.order_bys, vec![OrderBy::asc("id")]);

        assert_eq!(conn.edges.len(), 10);
        assert!(conn.page_info.has_next_page);
        assert!(!conn.page_info.has_previous_page);
        assert_eq!(conn.page_info.start_cursor.as_deref(), Some("c0"));
        assert_eq!(conn.page_info.end_cursor.as_deref(), Some("c9"));
    }

    #[tokio::test]
    async fn test_from_last_drops_leading_probe() {
        let apply = Arc::new(Fixed::new(100));
        let p = paginator(Arc::clone(&apply));

        let conn = run(&p, PaginateRequest::new().last(3)).await.unwrap();
        assert!(apply.seen.lock().unwrap().as_ref().unwrap().from_last);
        let nodes: Vec<usize> = conn.iter_nodes().copied().collect();
        assert_eq!(nodes, vec![1, 2, 3]);
        assert!(conn.page_info.has_previous_page);
        assert!(!conn.page_info.has_next_page);
    }

    #[tokio::test]
    async fn test_boundary_flags_pass_through() {
        let apply = Arc::new(Fixed {
            n: 2,
            flags: (true, true),
            seen: Mutex::new(None),
        });
        let p = paginator(apply);

        let conn = run(&p, PaginateRequest::new().first(5)).await.unwrap();
        assert_eq!(conn.edges.len(), 2);
        assert!(conn.page_info.has_next_page);
        assert!(conn.page_info.has_previous_page);
    }

    #[tokio::test]
    async fn test_validation_errors() {
        let p = paginator(Arc::new(Fixed::new(0)));

        let err = run(&p, PaginateRequest::new().first(1).last(1)).await.unwrap_err();
        assert_eq!(err.to_string(), "first and last cannot be used together");

        let err = run(&p, PaginateRequest::new().first(-1)).await.unwrap_err();
        assert_eq!(err.to_string(), "first must be a non-negative integer");

        let err = run(&p, PaginateRequest::new().last(-1)).await.unwrap_err();
        assert_eq!(err.to_string(), "last must be a non-negative integer");

        let err = run(&p, PaginateRequest::new().first(21)).await.unwrap_err();
        assert!(matches!(err, Error::LimitExceeded { max: 20, .. }));

        let req = PaginateRequest::new()
            .order_by(OrderBy::asc("ID"))
            .order_by(OrderBy::desc("ID"));
        let err = run(&p, req).await.unwrap_err();
        assert_eq!(err.to_string(), "duplicated order by fields [ID]");

        let err = run(&p, PaginateRequest::new().after("x").before("x"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::AfterEqualsBefore));
        assert!(err.is_request_error());
    }

    #[tokio::test]
    async fn test_nodes_only_skips_cursors() {
        let p = Paginator::builder()
            .nodes_only(true)
            .limit_if_not_set(2)
            .order_bys_if_not_set(vec![OrderBy::asc("id")])
            .apply_cursors(Fixed::new(5))
            .build();

        let conn = run(&p, PaginateRequest::new()).await.unwrap();
        assert!(conn.edges.is_empty());
        assert_eq!(conn.nodes, vec![0, 1]);
        assert!(conn.page_info.has_next_page);
        assert_eq!(conn.page_info.start_cursor, None);
        assert_eq!(conn.page_info.end_cursor, None);
    }

    #[tokio::test]
    async fn test_cancelled_before_dispatch() {
        let apply = Arc::new(Fixed::new(5));
        let p = paginator(Arc::clone(&apply));
        let ctx = CancellationToken::new();
        ctx.cancel();

        let err = p.paginate(&ctx, &PaginateRequest::new()).await.unwrap_err();
        assert!(err.is_cancelled());
        assert!(apply.seen.lock().unwrap().is_none());
    }

    #[test]
    fn test_try_build_reports_config_errors() {
        let base = || {
            Paginator::<usize>::builder()
                .max_limit(20)
                .limit_if_not_set(10)
                .order_bys_if_not_set(vec![OrderBy::asc("id")])
        };

        assert_eq!(
            base().limit_if_not_set(0).try_build().unwrap_err(),
            ConfigError::LimitIfNotSetZero
        );
        assert!(matches!(
            base().max_limit(5).try_build().unwrap_err(),
            ConfigError::MaxLimitBelowDefault { .. }
        ));
        assert_eq!(
            base().try_build().unwrap_err(),
            ConfigError::MissingApplyCursors
        );
        assert_eq!(
            base()
                .order_bys_if_not_set(vec![])
                .apply_cursors(Fixed::new(0))
                .try_build()
                .unwrap_err(),
            ConfigError::EmptyDefaultOrderBys
        );
    }

    #[test]
    #[should_panic(expected = "limit_if_not_set must be greater than 0")]
    fn test_build_panics_on_zero_default_limit() {
        let _ = Paginator::<usize>::builder()
            .limit_if_not_set(0)
            .order_bys_if_not_set(vec![OrderBy::asc("id")])
            .apply_cursors(Fixed::new(0))
            .build();
    }
}
