//! Identifier checks.
//!
//! Every table, column and sort name ends up interpolated into SQL text, so
//! each one passes through here first. Values never do; they are bound.

/// Longest identifier Postgres keeps without truncation.
const MAX_IDENTIFIER_LEN: usize = 63;

/// `true` if `s` is a bare SQL identifier: an ASCII letter or `_` followed by
/// ASCII letters, digits or `_`, at most 63 bytes.
///
/// ```
/// use pagewise_sql::is_valid_sql_identifier;
///
/// assert!(is_valid_sql_identifier("created_at"));
/// assert!(!is_valid_sql_identifier("2fast"));
/// assert!(!is_valid_sql_identifier("users.id"));
/// assert!(!is_valid_sql_identifier("age; DROP TABLE users"));
/// ```
#[must_use]
pub fn is_valid_sql_identifier(s: &str) -> bool {
    let bytes = s.as_bytes();
    match bytes.split_first() {
        Some((first, rest)) if bytes.len() <= MAX_IDENTIFIER_LEN => {
            (first.is_ascii_alphabetic() || *first == b'_')
                && rest.iter().all(|b| b.is_ascii_alphanumeric() || *b == b'_')
        },
        _ => false,
    }
}

/// Panic unless `s` is a bare SQL identifier.
///
/// For names that come from code. `context` names the role in the message,
/// e.g. `"Invalid SQL column name ..."`.
pub fn assert_valid_sql_identifier(s: &str, context: &str) {
    assert!(
        is_valid_sql_identifier(s),
        "Invalid SQL {context} name {s:?}: expected [A-Za-z_][A-Za-z0-9_]* of at most {MAX_IDENTIFIER_LEN} bytes"
    );
}
