//! Rendering filter trees to SQL fragments.

use super::types::{CompoundFilter, Filter, FilterExpr, LogicalOp, Operator, Value};
use crate::dialect::Dialect;

/// Build a filter expression (simple or compound).
pub(super) fn render_expr<D: Dialect>(
    dialect: &D,
    expr: &FilterExpr,
    start_idx: usize,
) -> (String, Vec<Value>, usize) {
    match expr {
        FilterExpr::Simple(filter) => render_condition(dialect, filter, start_idx),
        FilterExpr::Compound(compound) => render_compound(dialect, compound, start_idx),
    }
}

/// Build a compound filter (AND, OR, NOT).
fn render_compound<D: Dialect>(
    dialect: &D,
    compound: &CompoundFilter,
    start_idx: usize,
) -> (String, Vec<Value>, usize) {
    let mut idx = start_idx;
    let mut all_params = Vec::new();
    let mut conditions = Vec::new();

    for filter_expr in &compound.filters {
        let (condition, params, new_idx) = render_expr(dialect, filter_expr, idx);
        conditions.push(condition);
        all_params.extend(params);
        idx = new_idx;
    }

    let joiner = match compound.op {
        LogicalOp::And => " AND ",
        LogicalOp::Or => " OR ",
        LogicalOp::Not => {
            let inner = conditions.into_iter().next().unwrap_or_default();
            return (format!("NOT ({inner})"), all_params, idx);
        },
    };

    let sql = match conditions.len() {
        // Empty AND is always true, empty OR never
        0 if compound.op == LogicalOp::And => "1=1".to_string(),
        0 => "1=0".to_string(),
        1 => conditions.into_iter().next().unwrap_or_default(),
        _ => format!("({})", conditions.join(joiner)),
    };

    (sql, all_params, idx)
}

/// Build a single filter condition.
fn render_condition<D: Dialect>(
    dialect: &D,
    filter: &Filter,
    start_idx: usize,
) -> (String, Vec<Value>, usize) {
    let field = &filter.field;
    let idx = start_idx;

    match (filter.op, &filter.value) {
        // NULL handling
        (Operator::Eq, Value::Null) => (format!("{field} IS NULL"), vec![], idx),
        (Operator::Ne, Value::Null) => (format!("{field} IS NOT NULL"), vec![], idx),

        (Operator::In, Value::Array(values)) if values.is_empty() => {
            ("1=0".to_string(), vec![], idx)
        },
        (Operator::In, Value::Array(values)) => {
            let (sql, params) = dialect.in_clause(field, values, idx);
            let new_idx = idx + params.len();
            (sql, params, new_idx)
        },

        (op, value) => {
            let sql = format!("{} {} {}", field, op.as_sql(), dialect.param(idx));
            (sql, vec![value.clone()], idx + 1)
        },
    }
}
