//! Keyset predicates.

use pagewise::{Keyset, OrderBy};
use serde_json::Value as Json;

use crate::builder::{CompoundFilter, Filter, FilterExpr, LogicalOp, Operator, Value};
use crate::error::SqlError;
use crate::source::Table;

/// Which side of the keyset a predicate keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Bound {
    /// Rows strictly after the keyset in the connection order.
    After,
    /// Rows strictly before the keyset in the connection order.
    Before,
}

/// Build the seek predicate for one keyset bound.
///
/// `(a, b) > (1, 2)` expands to `a > 1 OR (a = 1 AND b > 2)`, one OR branch
/// per ordering field. Descending fields flip the comparison, and so does
/// [`Bound::Before`].
///
/// ```
/// use pagewise::{Keyset, OrderBy};
/// use pagewise_sql::{Bound, Postgres, SelectBuilder, Table, keyset_filter};
///
/// let users = Table::new("users");
/// let order = [OrderBy::asc("age"), OrderBy::desc("name")];
/// let keyset = Keyset::new().field("age", 85).field("name", "name15");
///
/// let expr = keyset_filter(&order, &keyset, &users, Bound::After).unwrap();
/// let query = SelectBuilder::new(Postgres, "users").filter(expr).build();
/// assert_eq!(
///     query.sql,
///     "SELECT * FROM users WHERE (age > $1 OR (age = $2 AND name < $3))"
/// );
/// ```
pub fn keyset_filter(
    order_bys: &[OrderBy],
    keyset: &Keyset,
    table: &Table,
    bound: Bound,
) -> Result<FilterExpr, SqlError> {
    let mut ors = Vec::with_capacity(order_bys.len());
    let mut eqs: Vec<FilterExpr> = Vec::with_capacity(order_bys.len());

    for order_by in order_bys {
        let json = keyset
            .get(&order_by.field)
            .ok_or_else(|| SqlError::MissingKey(order_by.field.clone()))?;
        let value = bind_value(&order_by.field, json)?;
        let column = table.column_for(&order_by.field)?;

        let op = match (bound, order_by.desc) {
            (Bound::After, false) | (Bound::Before, true) => Operator::Gt,
            (Bound::After, true) | (Bound::Before, false) => Operator::Lt,
        };
        let cmp = FilterExpr::Simple(Filter {
            field: column.clone(),
            op,
            value: value.clone(),
        });

        let branch = if eqs.is_empty() {
            cmp
        } else {
            let mut ands = eqs.clone();
            ands.push(cmp);
            FilterExpr::Compound(CompoundFilter {
                op: LogicalOp::And,
                filters: ands,
            })
        };
        ors.push(branch);

        eqs.push(FilterExpr::Simple(Filter {
            field: column,
            op: Operator::Eq,
            value,
        }));
    }

    Ok(FilterExpr::Compound(CompoundFilter {
        op: LogicalOp::Or,
        filters: ors,
    }))
}

/// Convert a keyset value into a bind parameter.
pub(crate) fn bind_value(field: &str, json: &Json) -> Result<Value, SqlError> {
    Ok(match json {
        Json::Null => Value::Null,
        Json::Bool(b) => Value::Bool(*b),
        Json::Number(n) => match n.as_i64() {
            Some(i) => Value::Int(i),
            None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
        },
        Json::String(s) => Value::String(s.clone()),
        Json::Array(_) | Json::Object(_) => {
            return Err(SqlError::UnsupportedValue(field.to_string()));
        },
    })
}
