//! Table description: name, field to column mapping and a base filter.

use heck::ToSnakeCase;
use serde_json::{Map, Value as Json};

use crate::builder::{FilterExpr, SelectBuilder};
use crate::dialect::Dialect;
use crate::error::SqlError;
use crate::validate::{assert_valid_sql_identifier, is_valid_sql_identifier};

/// Where records come from and how their fields map to columns.
///
/// Record fields are the names `T` serializes with; columns are what the
/// database calls them. Unmapped fields fall back to their snake_case form.
///
/// ```
/// use pagewise_sql::{Operator, Table, simple};
///
/// let users = Table::new("users")
///     .field("id")
///     .field("name")
///     .column("createdAt", "created_at")
///     .base_filter(simple("deleted", Operator::Eq, false));
///
/// assert_eq!(users.column_for("createdAt").unwrap(), "created_at");
/// assert_eq!(users.column_for("updatedAt").unwrap(), "updated_at");
/// assert!(users.column_for("name; DROP").is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    name: String,
    columns: Vec<(String, String)>,
    base_filter: Option<FilterExpr>,
}

impl Table {
    /// Table `name` with no columns yet.
    ///
    /// # Panics
    ///
    /// Panics if the table name is not a valid SQL identifier.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        assert_valid_sql_identifier(&name, "table");
        Self {
            name,
            columns: Vec::new(),
            base_filter: None,
        }
    }

    /// Select `field` from the column of the same name.
    pub fn field(self, field: impl Into<String>) -> Self {
        let field = field.into();
        let column = field.clone();
        self.column(field, column)
    }

    /// Select `field` from `column`.
    ///
    /// # Panics
    ///
    /// Panics if the column name is not a valid SQL identifier.
    pub fn column(mut self, field: impl Into<String>, column: impl Into<String>) -> Self {
        let column = column.into();
        assert_valid_sql_identifier(&column, "column");
        self.columns.push((field.into(), column));
        self
    }

    /// Condition applied to every fetch and count, such as tenant scoping
    /// or soft-delete filtering.
    pub fn base_filter(mut self, expr: FilterExpr) -> Self {
        self.base_filter = Some(expr);
        self
    }

    /// Table name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Column holding `field`.
    ///
    /// Fields come from requests, so an unmapped field that is not a plain
    /// identifier is rejected rather than interpolated.
    pub fn column_for(&self, field: &str) -> Result<String, SqlError> {
        if let Some((_, column)) = self.columns.iter().find(|(f, _)| f == field) {
            return Ok(column.clone());
        }
        if !is_valid_sql_identifier(field) {
            return Err(SqlError::InvalidColumn(field.to_string()));
        }
        let column = field.to_snake_case();
        if is_valid_sql_identifier(&column) {
            Ok(column)
        } else {
            Err(SqlError::InvalidColumn(field.to_string()))
        }
    }

    /// SELECT over the mapped columns with the base filter applied.
    pub(crate) fn select<D: Dialect>(&self, dialect: D) -> SelectBuilder<D> {
        let columns: Vec<&str> = self.columns.iter().map(|(_, c)| c.as_str()).collect();
        SelectBuilder::new(dialect, &self.name)
            .fields(&columns)
            .filter_opt(self.base_filter.clone())
    }

    /// Rename a fetched row from columns to fields.
    ///
    /// Columns the table does not map are dropped.
    pub(crate) fn row_to_record(&self, mut row: Map<String, Json>) -> Map<String, Json> {
        if self.columns.is_empty() {
            return row;
        }
        self.columns
            .iter()
            .filter_map(|(field, column)| row.remove(column).map(|v| (field.clone(), v)))
            .collect()
    }
}
