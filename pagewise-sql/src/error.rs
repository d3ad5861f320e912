//! SQL adapter errors.
//!
//! All of these reach callers as [`pagewise::Error::Store`].

/// Failure while turning a page request into SQL or a row into a record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum SqlError {
    /// A requested field does not name a usable column.
    #[error("field {0:?} does not map to a valid column")]
    InvalidColumn(String),
    /// A keyset has no value for an ordering field.
    #[error("missing field {0:?} in keyset")]
    MissingKey(String),
    /// A keyset value is an array or object.
    #[error("keyset value for field {0:?} cannot be bound as a SQL parameter")]
    UnsupportedValue(String),
    /// A row did not deserialize into the record type.
    #[error("decode row: {0}")]
    Decode(String),
    /// The count query returned no usable `count` column.
    #[error("count query returned no count")]
    MissingCount,
}

impl From<SqlError> for pagewise::Error {
    fn from(err: SqlError) -> Self {
        Self::store(err)
    }
}
