//! Placeholder syntax per database.

use crate::Value;

/// How a database spells bind parameters.
///
/// Placeholders are numbered from 1 in the order parameters appear in the
/// statement; builders thread the next free index through every fragment.
pub trait Dialect: Clone + Copy + Send + Sync + 'static {
    /// Placeholder for parameter `idx`.
    fn param(&self, idx: usize) -> String;

    /// `field` IN `values`, starting at parameter `start_idx`.
    ///
    /// Returns the fragment and the parameters it binds; the caller advances
    /// its index by the number of parameters returned.
    fn in_clause(&self, field: &str, values: &[Value], start_idx: usize) -> (String, Vec<Value>);
}

/// Postgres: `$1`, and IN lists bound as a single array.
#[derive(Debug, Clone, Copy, Default)]
#[allow(clippy::exhaustive_structs)]
pub struct Postgres;

impl Dialect for Postgres {
    fn param(&self, idx: usize) -> String {
        format!("${idx}")
    }

    fn in_clause(&self, field: &str, values: &[Value], start_idx: usize) -> (String, Vec<Value>) {
        (
            format!("{field} = ANY({})", self.param(start_idx)),
            vec![Value::Array(values.to_vec())],
        )
    }
}

/// SQLite: `?1`, and IN lists expanded to one parameter per value.
#[derive(Debug, Clone, Copy, Default)]
#[allow(clippy::exhaustive_structs)]
pub struct Sqlite;

impl Dialect for Sqlite {
    fn param(&self, idx: usize) -> String {
        format!("?{idx}")
    }

    fn in_clause(&self, field: &str, values: &[Value], start_idx: usize) -> (String, Vec<Value>) {
        let placeholders = (start_idx..start_idx + values.len())
            .map(|idx| self.param(idx))
            .collect::<Vec<_>>()
            .join(", ");
        (format!("{field} IN ({placeholders})"), values.to_vec())
    }
}
