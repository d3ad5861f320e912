//! In-memory SQLite executor and fixtures.
//!
//! `users` holds 100 rows where row `i` has `id = i`, `name = "name{i}"`
//! and `age = 100 - i`.

#![allow(dead_code)]

use std::sync::Mutex;

use async_trait::async_trait;
use pagewise::{
    ApplyCursors, Base64Offset, Connection, Error, OffsetCursorParser, OrderBy, PaginateRequest,
    Paginator, encode_keyset_cursor,
};
use pagewise_sql::{Executor, QueryResult, Row, Sqlite, SqlStore, Table, Value};
use rusqlite::types::{Value as SqlValue, ValueRef};
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value as Json};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub age: i64,
}

/// SQLite connection that records every statement it runs.
#[derive(Debug)]
pub struct SqliteDb {
    conn: Mutex<rusqlite::Connection>,
    log: Mutex<Vec<String>>,
}

impl SqliteDb {
    pub fn new(schema: &str) -> Self {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        conn.execute_batch(schema).unwrap();
        Self {
            conn: Mutex::new(conn),
            log: Mutex::new(Vec::new()),
        }
    }

    pub fn users() -> Self {
        let db = Self::new(
            "CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT NOT NULL, age INTEGER NOT NULL);",
        );
        {
            let conn = db.conn.lock().unwrap();
            for i in 0..100i64 {
                conn.execute(
                    "INSERT INTO users (id, name, age) VALUES (?1, ?2, ?3)",
                    rusqlite::params![i, format!("name{i}"), 100 - i],
                )
                .unwrap();
            }
        }
        db
    }

    pub fn execute(&self, sql: &str) {
        self.conn.lock().unwrap().execute_batch(sql).unwrap();
    }

    /// Statements run so far, oldest first.
    pub fn statements(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    /// Most recent page fetch, skipping counts.
    pub fn last_fetch(&self) -> String {
        self.statements()
            .into_iter()
            .rev()
            .find(|sql| !sql.starts_with("SELECT COUNT(*)"))
            .unwrap_or_default()
    }

    fn run(&self, query: &QueryResult) -> rusqlite::Result<Vec<Row>> {
        self.log.lock().unwrap().push(query.sql.clone());

        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&query.sql)?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let params: Vec<SqlValue> = query.params.iter().map(to_sql).collect();

        let mut rows = stmt.query(rusqlite::params_from_iter(params))?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let mut record = Row::new();
            for (i, column) in columns.iter().enumerate() {
                record.insert(column.clone(), to_json(row.get_ref(i)?));
            }
            out.push(record);
        }
        Ok(out)
    }
}

#[async_trait]
impl Executor for SqliteDb {
    async fn fetch_all(
        &self,
        _ctx: &CancellationToken,
        query: &QueryResult,
    ) -> Result<Vec<Row>, Error> {
        self.run(query).map_err(Error::store)
    }
}

fn to_sql(value: &Value) -> SqlValue {
    match value {
        Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
        Value::Int(i) => SqlValue::Integer(*i),
        Value::Float(f) => SqlValue::Real(*f),
        Value::String(s) => SqlValue::Text(s.clone()),
        _ => SqlValue::Null,
    }
}

fn to_json(value: ValueRef<'_>) -> Json {
    match value {
        ValueRef::Null | ValueRef::Blob(_) => Json::Null,
        ValueRef::Integer(i) => Json::from(i),
        ValueRef::Real(f) => Number::from_f64(f).map_or(Json::Null, Json::Number),
        ValueRef::Text(bytes) => Json::String(String::from_utf8_lossy(bytes).into_owned()),
    }
}

pub fn users_table() -> Table {
    Table::new("users").field("id").field("name").field("age")
}

pub fn store() -> SqlStore<Sqlite, SqliteDb> {
    SqlStore::new(Sqlite, users_table(), SqliteDb::users())
}

pub fn default_order() -> Vec<OrderBy> {
    vec![OrderBy::asc("id"), OrderBy::desc("age")]
}

pub fn paginator<T>(apply: impl ApplyCursors<T> + 'static) -> Paginator<T>
where
    T: Send + 'static,
{
    Paginator::builder()
        .max_limit(300)
        .limit_if_not_set(10)
        .order_bys_if_not_set(default_order())
        .apply_cursors(apply)
        .build()
}

pub fn user(i: i64) -> User {
    User {
        id: i,
        name: format!("name{i}"),
        age: 100 - i,
    }
}

pub fn keyset_cursor(i: i64) -> String {
    encode_keyset_cursor(&user(i), &["id", "age"]).unwrap()
}

pub fn offset_cursor(i: usize) -> String {
    Base64Offset.encode(i).unwrap()
}

pub async fn paginate<T: Send + 'static>(
    p: &Paginator<T>,
    req: PaginateRequest,
) -> Result<Connection<T>, Error> {
    p.paginate(&CancellationToken::new(), &req).await
}

pub fn ids(conn: &Connection<User>) -> Vec<i64> {
    conn.iter_nodes().map(|u| u.id).collect()
}
