//! Query builder for SQL generation with parameterization.

mod filter;
mod select;
mod types;

pub use select::SelectBuilder;
pub use types::{
    CompoundFilter, Filter, FilterExpr, LogicalOp, Operator, QueryResult, Value, and, not, or,
    simple,
};
