//! Ordering fields.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One component of a composite sort order.
///
/// A sequence of `OrderBy` values defines a total order over records. Field
/// names must be unique within one sequence.
///
/// # Example
///
/// ```
/// use pagewise::OrderBy;
///
/// let order = vec![OrderBy::desc("createdAt"), OrderBy::asc("id")];
/// assert_eq!(order[0].to_string(), "createdAt DESC");
/// assert_eq!(order[0].reversed(), OrderBy::asc("createdAt"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct OrderBy {
    /// Field name as it appears in the serialized record.
    pub field: String,
    /// Sort descending.
    #[serde(default)]
    pub desc: bool,
}

impl OrderBy {
    /// Create an order-by component.
    pub fn new(field: impl Into<String>, desc: bool) -> Self {
        Self {
            field: field.into(),
            desc,
        }
    }

    /// Ascending order on `field`.
    pub fn asc(field: impl Into<String>) -> Self {
        Self::new(field, false)
    }

    /// Descending order on `field`.
    pub fn desc(field: impl Into<String>) -> Self {
        Self::new(field, true)
    }

    /// The same field with the opposite direction.
    #[must_use]
    pub fn reversed(&self) -> Self {
        Self::new(self.field.clone(), !self.desc)
    }

    /// Parse a sort string like `"name,-createdAt"`.
    ///
    /// Fields prefixed with `-` are sorted descending. Empty segments are
    /// skipped.
    ///
    /// # Security Note
    ///
    /// If `allowed` is empty, ALL fields are allowed. For user input, always
    /// provide an explicit whitelist to prevent sorting by sensitive columns.
    pub fn parse_list(sort: &str, allowed: &[&str]) -> Result<Vec<Self>, OrderByParseError> {
        let mut result = Vec::new();

        for part in sort.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }

            let (field, desc) = match part.strip_prefix('-') {
                Some(stripped) => (stripped.trim(), true),
                None => (part, false),
            };

            if field.is_empty() {
                return Err(OrderByParseError::EmptyField);
            }
            if !allowed.is_empty() && !allowed.contains(&field) {
                return Err(OrderByParseError::NotAllowed {
                    field: field.to_string(),
                    allowed: allowed.iter().map(|s| (*s).to_string()).collect(),
                });
            }

            result.push(Self::new(field, desc));
        }

        Ok(result)
    }
}

impl fmt::Display for OrderBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dir = if self.desc { "DESC" } else { "ASC" };
        write!(f, "{} {dir}", self.field)
    }
}

/// Error parsing a sort string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum OrderByParseError {
    /// A `-` prefix without a field name.
    #[error("sort field name is empty")]
    EmptyField,
    /// The field is not in the allow-list.
    #[error("sort field '{field}' not allowed. Allowed: {allowed:?}")]
    NotAllowed {
        /// Rejected field.
        field: String,
        /// Allowed fields.
        allowed: Vec<String>,
    },
}

/// Every field that appears more than once, in order of first repetition.
pub fn duplicated_fields(order_bys: &[OrderBy]) -> Vec<String> {
    let mut seen: Vec<&str> = Vec::with_capacity(order_bys.len());
    let mut dups: Vec<String> = Vec::new();
    for order_by in order_bys {
        let field = order_by.field.as_str();
        if seen.contains(&field) {
            if !dups.iter().any(|d| d == field) {
                dups.push(field.to_string());
            }
        } else {
            seen.push(field);
        }
    }
    dups
}

/// Field names of an order, in order.
pub fn field_names(order_bys: &[OrderBy]) -> Vec<&str> {
    order_bys.iter().map(|o| o.field.as_str()).collect()
}
