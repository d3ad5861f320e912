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
#![allow(clippy::doc_markdown)] // Code items in docs - extensive doc changes needed
#![allow(clippy::missing_errors_doc)] // # Errors sections - doc-heavy
#![allow(clippy::missing_panics_doc)] // # Panics sections - doc-heavy
#![allow(clippy::module_name_repetitions)] // Type names matching module - acceptable
#![allow(clippy::return_self_not_must_use)] // Builder pattern methods return Self
#![allow(clippy::must_use_candidate)] // Fluent API doesn't need must_use
#![allow(clippy::match_same_arms)] // Operator tables read clearer unmerged

//! # pagewise-sql - SQL finders for pagewise
//!
//! Generates parameterized SQL for the [`pagewise`] finder traits, for
//! Postgres and `SQLite`:
//!
//! - keyset ranges become a row-value seek predicate,
//!   `a > $1 OR (a = $2 AND b > $3)`, with descending fields flipped;
//! - offset ranges become `ORDER BY ... LIMIT n OFFSET m`;
//! - counts become `SELECT COUNT(*) AS count`.
//!
//! Running the SQL is left to an [`Executor`] over the driver of your
//! choice. Rows come back as JSON objects and deserialize into the record
//! type.
//!
//! ## Quick Start
//!
//! ```
//! use pagewise::{KeysetQuery, Keyset, OrderBy};
//! use pagewise_sql::{Postgres, Table};
//! # use pagewise_sql::{Executor, QueryResult, Row, SqlStore};
//! # use tokio_util::sync::CancellationToken;
//! # #[derive(Debug)]
//! # struct Db;
//! # #[async_trait::async_trait]
//! # impl Executor for Db {
//! #     async fn fetch_all(&self, _: &CancellationToken, _: &QueryResult)
//! #         -> Result<Vec<Row>, pagewise::Error> { Ok(Vec::new()) }
//! # }
//!
//! let users = Table::new("users").field("id").field("name").field("age");
//! let store = SqlStore::new(Postgres, users, Db);
//!
//! let order = [OrderBy::asc("age"), OrderBy::desc("name")];
//! let after = Keyset::new().field("age", 30).field("name", "Ada");
//! let query = store
//!     .keyset_query(&KeysetQuery::new(&order, 11).after(Some(&after)))
//!     .unwrap();
//!
//! assert_eq!(
//!     query.sql,
//!     "SELECT id, name, age FROM users WHERE (age > $1 OR (age = $2 AND name < $3)) \
//!      ORDER BY age ASC, name DESC LIMIT 11"
//! );
//! ```
//!
//! Plug the store into a paginator with [`keyset_adapter`] or
//! [`offset_adapter`]; both count through the same table.

mod builder;
mod dialect;
mod error;
mod executor;
mod finder;
mod keyset;
mod source;
mod validate;

pub use builder::{
    CompoundFilter, Filter, FilterExpr, LogicalOp, Operator, QueryResult, SelectBuilder, Value,
    and, not, or, simple,
};
pub use dialect::{Dialect, Postgres, Sqlite};
pub use error::SqlError;
pub use executor::{Executor, Row};
pub use finder::{SqlStore, keyset_adapter, offset_adapter};
pub use keyset::{Bound, keyset_filter};
pub use source::Table;
pub use validate::{assert_valid_sql_identifier, is_valid_sql_identifier};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::{
        Dialect, Executor, FilterExpr, Operator, Postgres, QueryResult, Row, SqlError, SqlStore,
        Sqlite, Table, Value, and, keyset_adapter, not, offset_adapter, or, simple,
    };
}


// ============================================================================
// API Contract Tests (compile-time assertions)
// ============================================================================
