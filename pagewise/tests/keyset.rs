//! Keyset pagination over the in-memory store.

mod common;

use common::{User, capped_paginator, ids, keyset_cursor, paginate, paginator, store};
use pagewise::memory::VecStore;
use pagewise::{
    Boundary, CursorError, Error, KeysetAdapter, KeysetFinder, KeysetQuery, LimitArg, OrderBy,
    PaginateRequest, Paginator,
};
use tokio_util::sync::CancellationToken;

struct Case {
    name: &'static str,
    req: PaginateRequest,
    ids: Vec<i64>,
    has_next: bool,
    has_prev: bool,
}

fn cases() -> Vec<Case> {
    vec![
        Case {
            name: "limit if not set",
            req: PaginateRequest::new(),
            ids: (0..10).collect(),
            has_next: true,
            has_prev: false,
        },
        Case {
            name: "first after",
            req: PaginateRequest::new().first(2).after(keyset_cursor(0)),
            ids: vec![1, 2],
            has_next: true,
            has_prev: true,
        },
        Case {
            name: "last before",
            req: PaginateRequest::new().last(2).before(keyset_cursor(8)),
            ids: vec![6, 7],
            has_next: true,
            has_prev: true,
        },
        Case {
            name: "after and before",
            req: PaginateRequest::new()
                .first(8)
                .after(keyset_cursor(0))
                .before(keyset_cursor(4)),
            ids: vec![1, 2, 3],
            has_next: true,
            has_prev: true,
        },
        Case {
            name: "after the last record",
            req: PaginateRequest::new().after(keyset_cursor(99)),
            ids: vec![],
            has_next: false,
            has_prev: true,
        },
        Case {
            name: "before the first record",
            req: PaginateRequest::new().before(keyset_cursor(0)),
            ids: vec![],
            has_next: true,
            has_prev: false,
        },
        Case {
            name: "first larger than the table",
            req: PaginateRequest::new().first(200),
            ids: (0..100).collect(),
            has_next: false,
            has_prev: false,
        },
        Case {
            name: "first zero",
            req: PaginateRequest::new().first(0),
            ids: vec![],
            has_next: true,
            has_prev: false,
        },
        Case {
            name: "last zero",
            req: PaginateRequest::new().last(0),
            ids: vec![],
            has_next: false,
            has_prev: true,
        },
        Case {
            name: "first runs off the end",
            req: PaginateRequest::new().first(10).after(keyset_cursor(95)),
            ids: vec![96, 97, 98, 99],
            has_next: false,
            has_prev: true,
        },
        Case {
            name: "last runs off the start",
            req: PaginateRequest::new().last(10).before(keyset_cursor(4)),
            ids: vec![0, 1, 2, 3],
            has_next: true,
            has_prev: false,
        },
    ]
}

async fn check_cases(p: &Paginator<User>, total: Option<usize>) {
    for case in cases() {
        let conn = paginate(p, case.req.clone())
            .await
            .unwrap_or_else(|e| panic!("{}: {e}", case.name));

        assert_eq!(ids(&conn), case.ids, "{}", case.name);
        assert_eq!(conn.page_info.has_next_page, case.has_next, "{}: has_next", case.name);
        assert_eq!(conn.page_info.has_previous_page, case.has_prev, "{}: has_prev", case.name);
        assert_eq!(conn.page_info.total_count, total, "{}: total", case.name);

        let first = case.ids.first().map(|&i| keyset_cursor(i as usize));
        let last = case.ids.last().map(|&i| keyset_cursor(i as usize));
        assert_eq!(conn.page_info.start_cursor, first, "{}: start", case.name);
        assert_eq!(conn.page_info.end_cursor, last, "{}: end", case.name);
        for edge in &conn.edges {
            assert_eq!(edge.cursor, keyset_cursor(edge.node.id as usize));
        }
    }
}

#[tokio::test]
async fn test_scenarios_with_counter() {
    let p = paginator(KeysetAdapter::new(store()).with_counter(store()));
    check_cases(&p, Some(100)).await;
}

#[tokio::test]
async fn test_scenarios_without_counter() {
    let p = paginator(KeysetAdapter::new(store()));
    check_cases(&p, None).await;
}

#[tokio::test]
async fn test_small_max_limit() {
    let p = capped_paginator(KeysetAdapter::new(store()).with_counter(store()));

    let conn = paginate(&p, PaginateRequest::new()).await.unwrap();
    assert_eq!(ids(&conn), (0..10).collect::<Vec<_>>());
    assert!(conn.page_info.has_next_page);
    assert!(!conn.page_info.has_previous_page);
    assert_eq!(conn.page_info.start_cursor, Some(keyset_cursor(0)));
    assert_eq!(conn.page_info.end_cursor, Some(keyset_cursor(9)));
    assert_eq!(conn.page_info.total_count, Some(100));

    let conn = paginate(&p, PaginateRequest::new().first(20)).await.unwrap();
    assert_eq!(conn.edges.len(), 20);
    assert!(conn.page_info.has_next_page);

    let err = paginate(&p, PaginateRequest::new().first(21)).await.unwrap_err();
    assert!(matches!(
        err,
        Error::LimitExceeded {
            arg: LimitArg::First,
            limit: 21,
            max: 20,
        }
    ));
    assert!(err.is_request_error());

    let err = paginate(&p, PaginateRequest::new().last(21)).await.unwrap_err();
    assert!(matches!(
        err,
        Error::LimitExceeded {
            arg: LimitArg::Last,
            ..
        }
    ));
}

#[tokio::test]
async fn test_walk_forward_and_back() {
    let p = paginator(KeysetAdapter::new(store()));

    let mut seen = Vec::new();
    let mut req = PaginateRequest::new().first(7);
    loop {
        let conn = paginate(&p, req.clone()).await.unwrap();
        seen.extend(ids(&conn));
        if !conn.page_info.has_next_page {
            break;
        }
        req = PaginateRequest::new()
            .first(7)
            .after(conn.page_info.end_cursor.unwrap());
    }
    assert_eq!(seen, (0..100).collect::<Vec<_>>());

    let mut seen = Vec::new();
    let mut req = PaginateRequest::new().last(7);
    loop {
        let conn = paginate(&p, req.clone()).await.unwrap();
        let mut page = ids(&conn);
        page.extend(seen);
        seen = page;
        if !conn.page_info.has_previous_page {
            break;
        }
        req = PaginateRequest::new()
            .last(7)
            .before(conn.page_info.start_cursor.unwrap());
    }
    assert_eq!(seen, (0..100).collect::<Vec<_>>());
}

#[tokio::test]
async fn test_custom_order() {
    let p = paginator(KeysetAdapter::new(store()));
    let req = PaginateRequest::new()
        .first(3)
        .order_bys(vec![OrderBy::asc("age"), OrderBy::desc("name")]);

    let conn = paginate(&p, req).await.unwrap();
    assert_eq!(ids(&conn), vec![99, 98, 97]);
    assert_eq!(
        conn.page_info.end_cursor.as_deref(),
        Some(r#"{"age":3,"name":"name97"}"#)
    );
}

#[tokio::test]
async fn test_invalid_cursors() {
    let p = paginator(KeysetAdapter::new(store()));

    let err = paginate(&p, PaginateRequest::new().after("garbage"))
        .await
        .unwrap_err();
    assert_eq!(err.boundary(), Some(Boundary::After));
    assert!(matches!(
        err,
        Error::InvalidCursor {
            source: CursorError::InvalidFormat(_),
            ..
        }
    ));

    // cursor minted under a different order
    let err = paginate(&p, PaginateRequest::new().before(r#"{"id":3}"#))
        .await
        .unwrap_err();
    assert_eq!(err.boundary(), Some(Boundary::Before));
    assert!(err.to_string().contains("cursor length != keys length (1 != 2)"));

    let err = paginate(&p, PaginateRequest::new().after(r#"{"id":3,"name":"x"}"#))
        .await
        .unwrap_err();
    assert!(err.to_string().contains(r#"key "age" not found in cursor"#));
}

#[tokio::test]
async fn test_equal_keysets_rejected() {
    let p = paginator(KeysetAdapter::new(store()));
    // same keyset, different key order in the JSON text
    let req = PaginateRequest::new()
        .after(r#"{"id":3,"age":97}"#)
        .before(r#"{"age":97,"id":3}"#);
    let err = paginate(&p, req).await.unwrap_err();
    assert!(matches!(err, Error::AfterEqualsBefore));
}

#[tokio::test]
async fn test_nodes_only() {
    let p = Paginator::builder()
        .nodes_only(true)
        .limit_if_not_set(3)
        .order_bys_if_not_set(common::default_order())
        .apply_cursors(KeysetAdapter::new(store()))
        .build();

    let conn = paginate(&p, PaginateRequest::new()).await.unwrap();
    assert!(conn.edges.is_empty());
    assert_eq!(conn.nodes.iter().map(|u| u.id).collect::<Vec<_>>(), vec![0, 1, 2]);
    assert!(conn.page_info.has_next_page);
    assert_eq!(conn.page_info.start_cursor, None);
}

/// Never resolves.
struct Stuck;

#[async_trait::async_trait]
impl KeysetFinder<User> for Stuck {
    async fn find(
        &self,
        _ctx: &CancellationToken,
        _query: &KeysetQuery<'_>,
    ) -> Result<Vec<User>, Error> {
        std::future::pending().await
    }
}

#[tokio::test]
async fn test_cancelled_context() {
    let p = paginator(KeysetAdapter::new(store()));
    let ctx = CancellationToken::new();
    ctx.cancel();
    let err = p.paginate(&ctx, &PaginateRequest::new()).await.unwrap_err();
    assert!(err.is_cancelled());
}

#[tokio::test]
async fn test_cancellation_abandons_pending_fetch() {
    let p = paginator(KeysetAdapter::new(Stuck));
    let ctx = CancellationToken::new();

    let canceller = ctx.clone();
    tokio::spawn(async move {
        tokio::task::yield_now().await;
        canceller.cancel();
    });

    let err = p.paginate(&ctx, &PaginateRequest::new()).await.unwrap_err();
    assert!(err.is_cancelled());
}

#[tokio::test]
async fn test_store_errors_propagate() {
    #[derive(Debug, Clone, serde::Serialize)]
    struct Bare {
        id: i64,
    }

    let p = Paginator::builder()
        .order_bys_if_not_set(vec![OrderBy::asc("missing")])
        .apply_cursors(KeysetAdapter::new(VecStore::new(vec![Bare { id: 1 }])))
        .build();

    let err = p
        .paginate(&CancellationToken::new(), &PaginateRequest::new())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Store(_)));
    assert_eq!(err.to_string(), r#"field "missing" not found in record"#);
}
