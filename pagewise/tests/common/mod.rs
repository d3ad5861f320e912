//! Shared fixtures: 100 users where record `i` has `id = i`,
//! `name = "name{i}"` and `age = 100 - i`.

#![allow(dead_code)]

use pagewise::memory::VecStore;
use pagewise::{
    ApplyCursors, Base64Offset, Connection, Error, OffsetCursorParser, OrderBy, PaginateRequest,
    Paginator, encode_keyset_cursor,
};
use serde::Serialize;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub age: i64,
}

pub fn users() -> Vec<User> {
    (0..100)
        .map(|i| User {
            id: i,
            name: format!("name{i}"),
            age: 100 - i,
        })
        .collect()
}

pub fn store() -> VecStore<User> {
    VecStore::new(users())
}

pub fn default_order() -> Vec<OrderBy> {
    vec![OrderBy::asc("id"), OrderBy::desc("age")]
}

/// Paginator with `max_limit = 300` and `limit_if_not_set = 10`.
pub fn paginator(apply: impl ApplyCursors<User> + 'static) -> Paginator<User> {
    Paginator::builder()
        .max_limit(300)
        .limit_if_not_set(10)
        .order_bys_if_not_set(default_order())
        .apply_cursors(apply)
        .build()
}

/// Paginator with `max_limit = 20` and `limit_if_not_set = 10`.
pub fn capped_paginator(apply: impl ApplyCursors<User> + 'static) -> Paginator<User> {
    Paginator::builder()
        .max_limit(20)
        .limit_if_not_set(10)
        .order_bys_if_not_set(default_order())
        .apply_cursors(apply)
        .build()
}

pub fn keyset_cursor(i: usize) -> String {
    encode_keyset_cursor(&users()[i], &["id", "age"]).unwrap()
}

pub fn offset_cursor(i: usize) -> String {
    Base64Offset.encode(i).unwrap()
}

pub async fn paginate(p: &Paginator<User>, req: PaginateRequest) -> Result<Connection<User>, Error> {
    p.paginate(&CancellationToken::new(), &req).await
}

pub fn ids(conn: &Connection<User>) -> Vec<i64> {
    conn.iter_nodes().map(|u| u.id).collect()
}
