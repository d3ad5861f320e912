//! SELECT query builder.

use std::fmt::Write as _;

use crate::dialect::Dialect;
use crate::validate::assert_valid_sql_identifier;

use super::filter::render_expr;
use super::types::{FilterExpr, QueryResult};

/// Column with direction for ORDER BY.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SortColumn {
    column: String,
    desc: bool,
}

/// SELECT builder with dialect support.
///
/// ```
/// use pagewise_sql::{Operator, Postgres, SelectBuilder, simple};
///
/// let query = SelectBuilder::new(Postgres, "users")
///     .fields(&["id", "name"])
///     .filter(simple("active", Operator::Eq, true))
///     .order_by("name", true)
///     .limit(10)
///     .build();
///
/// assert_eq!(
///     query.sql,
///     "SELECT id, name FROM users WHERE active = $1 ORDER BY name DESC LIMIT 10"
/// );
/// ```
#[derive(Debug, Clone)]
pub struct SelectBuilder<D: Dialect> {
    dialect: D,
    table: String,
    fields: Vec<String>,
    filters: Vec<FilterExpr>,
    sorts: Vec<SortColumn>,
    limit: Option<usize>,
    offset: Option<usize>,
    count: bool,
}

impl<D: Dialect> SelectBuilder<D> {
    /// Create a new query builder for the given table.
    ///
    /// # Panics
    ///
    /// Panics if the table name is not a valid SQL identifier.
    pub fn new(dialect: D, table: impl Into<String>) -> Self {
        let table = table.into();
        assert_valid_sql_identifier(&table, "table");
        Self {
            dialect,
            table,
            fields: Vec::new(),
            filters: Vec::new(),
            sorts: Vec::new(),
            limit: None,
            offset: None,
            count: false,
        }
    }

    /// Set the fields to SELECT.
    ///
    /// # Panics
    ///
    /// Panics if any field name is not a valid SQL identifier.
    pub fn fields<S: AsRef<str>>(mut self, fields: &[S]) -> Self {
        self.fields = fields
            .iter()
            .map(|field| {
                let field = field.as_ref();
                assert_valid_sql_identifier(field, "field");
                field.to_string()
            })
            .collect();
        self
    }

    /// Add a WHERE condition; conditions are ANDed in insertion order.
    pub fn filter(mut self, expr: FilterExpr) -> Self {
        self.filters.push(expr);
        self
    }

    /// Add a WHERE condition if present.
    pub fn filter_opt(self, expr: Option<FilterExpr>) -> Self {
        match expr {
            Some(expr) => self.filter(expr),
            None => self,
        }
    }

    /// Add a sort column.
    ///
    /// # Panics
    ///
    /// Panics if the column name is not a valid SQL identifier.
    pub fn order_by(mut self, column: impl Into<String>, desc: bool) -> Self {
        let column = column.into();
        assert_valid_sql_identifier(&column, "sort field");
        self.sorts.push(SortColumn { column, desc });
        self
    }

    /// Set a limit.
    pub const fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Set an offset.
    pub const fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Select `COUNT(*) AS count` instead of fields; ORDER BY, LIMIT and
    /// OFFSET are dropped.
    pub const fn count(mut self) -> Self {
        self.count = true;
        self
    }

    /// Build the SQL query and parameters.
    pub fn build(self) -> QueryResult {
        let mut params = Vec::new();
        let mut param_idx = 1usize;

        let select = if self.count {
            "COUNT(*) AS count".to_string()
        } else if self.fields.is_empty() {
            "*".to_string()
        } else {
            self.fields.join(", ")
        };
        let mut sql = format!("SELECT {select} FROM {}", self.table);

        if !self.filters.is_empty() {
            let mut conditions = Vec::with_capacity(self.filters.len());
            for expr in &self.filters {
                let (condition, new_params, new_idx) = render_expr(&self.dialect, expr, param_idx);
                conditions.push(condition);
                params.extend(new_params);
                param_idx = new_idx;
            }
            let _ = write!(sql, " WHERE {}", conditions.join(" AND "));
        }

        if self.count {
            return QueryResult { sql, params };
        }

        if !self.sorts.is_empty() {
            let sort_parts: Vec<String> = self
                .sorts
                .iter()
                .map(|s| format!("{} {}", s.column, if s.desc { "DESC" } else { "ASC" }))
                .collect();
            let _ = write!(sql, " ORDER BY {}", sort_parts.join(", "));
        }

        if let Some(limit) = self.limit {
            let _ = write!(sql, " LIMIT {limit}");
        }
        if let Some(offset) = self.offset {
            let _ = write!(sql, " OFFSET {offset}");
        }

        QueryResult { sql, params }
    }
}
