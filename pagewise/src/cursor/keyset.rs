//! Keyset cursors.
//!
//! A keyset cursor is the record projected onto the active ordering fields
//! and serialized as a JSON object with sorted keys:
//!
//! ```
//! use pagewise::{Keyset, decode_keyset_cursor, encode_keyset_cursor};
//!
//! #[derive(serde::Serialize)]
//! struct User { id: u32, name: &'static str, age: u32 }
//!
//! let user = User { id: 7, name: "name7", age: 93 };
//! let cursor = encode_keyset_cursor(&user, &["name", "id"]).unwrap();
//! assert_eq!(cursor, r#"{"id":7,"name":"name7"}"#);
//!
//! let keyset: Keyset = decode_keyset_cursor(&cursor, &["id", "name"]).unwrap();
//! assert_eq!(keyset.get("id"), Some(&serde_json::json!(7)));
//! ```

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use super::{Counter, count_with, until_cancelled};
use crate::apply::ApplyCursors;
use crate::connection::{ApplyCursorsResponse, CursorFn, LazyEdge};
use crate::error::{CursorError, Error, MAX_CURSOR_SIZE};
use crate::order::{OrderBy, field_names};
use crate::request::ApplyCursorsRequest;
use crate::wrap::{CursorTransform, Transformed};

/// Ordering-field values captured from one record.
///
/// Keys are kept sorted, so equal keysets always serialize to identical
/// strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Keyset(BTreeMap<String, Value>);

impl Keyset {
    /// Empty keyset.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Add a field value.
    pub fn field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    /// Project a record onto `keys`.
    ///
    /// Fails if the record does not serialize to an object or lacks a key.
    pub fn from_record<T, K>(record: &T, keys: &[K]) -> Result<Self, CursorError>
    where
        T: Serialize + ?Sized,
        K: AsRef<str>,
    {
        let value =
            serde_json::to_value(record).map_err(|e| CursorError::Serialize(e.to_string()))?;
        let Value::Object(mut object) = value else {
            return Err(CursorError::NotAnObject);
        };

        let mut fields = BTreeMap::new();
        for key in keys {
            let key = key.as_ref();
            let value = object
                .remove(key)
                .ok_or_else(|| CursorError::MissingField(key.to_string()))?;
            fields.insert(key.to_string(), value);
        }
        Ok(Self(fields))
    }

    /// Value of `field`.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// `true` if no fields are captured.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate fields in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Serialize as a cursor string.
    pub fn encode(&self) -> Result<String, CursorError> {
        serde_json::to_string(&self.0).map_err(|e| CursorError::Serialize(e.to_string()))
    }

    /// Compare two keysets lexicographically under `order_bys`.
    ///
    /// The first field that differs decides; descending fields flip the
    /// comparison. Fields missing from either side compare as null.
    pub fn cmp_by(&self, other: &Self, order_bys: &[OrderBy]) -> Ordering {
        for order_by in order_bys {
            let left = self.get(&order_by.field).unwrap_or(&Value::Null);
            let right = other.get(&order_by.field).unwrap_or(&Value::Null);
            let ord = cmp_json(left, right);
            let ord = if order_by.desc { ord.reverse() } else { ord };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    }
}

impl FromIterator<(String, Value)> for Keyset {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<Keyset> for BTreeMap<String, Value> {
    fn from(keyset: Keyset) -> Self {
        keyset.0
    }
}

/// Total order over JSON scalars: null < bool < number < string < array < object.
fn cmp_json(a: &Value, b: &Value) -> Ordering {
    const fn rank(v: &Value) -> u8 {
        match v {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 2,
            Value::String(_) => 3,
            Value::Array(_) => 4,
            Value::Object(_) => 5,
        }
    }

    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => {
            if let (Some(x), Some(y)) = (x.as_i64(), y.as_i64()) {
                x.cmp(&y)
            } else if let (Some(x), Some(y)) = (x.as_u64(), y.as_u64()) {
                x.cmp(&y)
            } else {
                let x = x.as_f64().unwrap_or(f64::NAN);
                let y = y.as_f64().unwrap_or(f64::NAN);
                x.total_cmp(&y)
            }
        },
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Array(x), Value::Array(y)) => {
            for (l, r) in x.iter().zip(y) {
                let ord = cmp_json(l, r);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            x.len().cmp(&y.len())
        },
        _ => rank(a).cmp(&rank(b)),
    }
}

/// Encode `node` as a keyset cursor over `keys`.
pub fn encode_keyset_cursor<T, K>(node: &T, keys: &[K]) -> Result<String, CursorError>
where
    T: Serialize + ?Sized,
    K: AsRef<str>,
{
    Keyset::from_record(node, keys)?.encode()
}

/// Decode a keyset cursor, requiring exactly `keys`.
///
/// A cursor produced under a different order (more, fewer or other fields)
/// is rejected.
pub fn decode_keyset_cursor<K: AsRef<str>>(cursor: &str, keys: &[K]) -> Result<Keyset, CursorError> {
    if cursor.len() > MAX_CURSOR_SIZE {
        return Err(CursorError::TooLarge);
    }

    let fields: BTreeMap<String, Value> =
        serde_json::from_str(cursor).map_err(|e| CursorError::InvalidFormat(e.to_string()))?;

    if fields.len() != keys.len() {
        return Err(CursorError::KeyCountMismatch {
            expected: keys.len(),
            found: fields.len(),
        });
    }
    for key in keys {
        let key = key.as_ref();
        if !fields.contains_key(key) {
            return Err(CursorError::MissingKey(key.to_string()));
        }
    }

    Ok(Keyset(fields))
}

/// A keyset range to fetch.
#[derive(Debug, Clone, Copy)]
#[non_exhaustive]
pub struct KeysetQuery<'a> {
    /// Return records strictly after this keyset.
    pub after: Option<&'a Keyset>,
    /// Return records strictly before this keyset.
    pub before: Option<&'a Keyset>,
    /// Forward order of the connection.
    pub order_bys: &'a [OrderBy],
    /// Maximum number of records.
    pub limit: usize,
    /// Fetch from the tail end: sort by the reversed order.
    pub from_last: bool,
}

impl<'a> KeysetQuery<'a> {
    /// Forward query without bounds.
    pub const fn new(order_bys: &'a [OrderBy], limit: usize) -> Self {
        Self {
            after: None,
            before: None,
            order_bys,
            limit,
            from_last: false,
        }
    }

    /// Set the lower bound.
    #[must_use]
    pub const fn after(mut self, keyset: Option<&'a Keyset>) -> Self {
        self.after = keyset;
        self
    }

    /// Set the upper bound.
    #[must_use]
    pub const fn before(mut self, keyset: Option<&'a Keyset>) -> Self {
        self.before = keyset;
        self
    }

    /// Set `from_last`.
    #[must_use]
    pub const fn from_last(mut self, from_last: bool) -> Self {
        self.from_last = from_last;
        self
    }

    /// The order the store should sort by: reversed when `from_last`.
    pub fn fetch_order(&self) -> Vec<OrderBy> {
        if self.from_last {
            self.order_bys.iter().map(OrderBy::reversed).collect()
        } else {
            self.order_bys.to_vec()
        }
    }

    /// `true` if `keyset` lies strictly inside the bounds.
    pub fn contains(&self, keyset: &Keyset) -> bool {
        let after_ok = self
            .after
            .is_none_or(|a| keyset.cmp_by(a, self.order_bys) == Ordering::Greater);
        let before_ok = self
            .before
            .is_none_or(|b| keyset.cmp_by(b, self.order_bys) == Ordering::Less);
        after_ok && before_ok
    }
}

/// Keyset-mode store access.
///
/// Returns up to `query.limit` records strictly inside the bounds, sorted by
/// [`KeysetQuery::fetch_order`].
#[async_trait]
pub trait KeysetFinder<T>: Send + Sync {
    /// Fetch one range.
    async fn find(&self, ctx: &CancellationToken, query: &KeysetQuery<'_>) -> Result<Vec<T>, Error>;
}

#[async_trait]
impl<T, F> KeysetFinder<T> for Arc<F>
where
    T: Send + 'static,
    F: KeysetFinder<T> + ?Sized,
{
    async fn find(&self, ctx: &CancellationToken, query: &KeysetQuery<'_>) -> Result<Vec<T>, Error> {
        (**self).find(ctx, query).await
    }
}

/// Turns a [`KeysetFinder`] into an [`ApplyCursors`] implementation.
pub struct KeysetAdapter<T, F> {
    finder: F,
    counter: Option<Arc<dyn Counter>>,
    _marker: PhantomData<fn() -> T>,
}

impl<T, F: KeysetFinder<T>> KeysetAdapter<T, F> {
    /// Adapter without a counter.
    pub const fn new(finder: F) -> Self {
        Self {
            finder,
            counter: None,
            _marker: PhantomData,
        }
    }

    /// Report total counts and exact boundary flags using `counter`.
    pub fn with_counter(mut self, counter: impl Counter + 'static) -> Self {
        self.counter = Some(Arc::new(counter));
        self
    }

    /// Decorate with a cursor transform.
    pub fn wrap<X: CursorTransform>(self, transform: X) -> Transformed<Self, X> {
        Transformed::new(self, transform)
    }
}

impl<T, F: std::fmt::Debug> std::fmt::Debug for KeysetAdapter<T, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeysetAdapter")
            .field("finder", &self.finder)
            .field("counter", &self.counter.is_some())
            .finish()
    }
}

#[async_trait]
impl<T, F> ApplyCursors<T> for KeysetAdapter<T, F>
where
    T: Serialize + Send + Sync + 'static,
    F: KeysetFinder<T>,
{
    async fn apply_cursors(
        &self,
        ctx: &CancellationToken,
        req: &ApplyCursorsRequest,
    ) -> Result<ApplyCursorsResponse<T>, Error> {
        if req.after.is_some() && req.after == req.before {
            return Err(Error::AfterEqualsBefore);
        }

        let keys = field_names(&req.order_bys);
        let after = req
            .after
            .as_deref()
            .map(|c| decode_keyset_cursor(c, &keys))
            .transpose()
            .map_err(Error::invalid_after)?;
        let before = req
            .before
            .as_deref()
            .map(|c| decode_keyset_cursor(c, &keys))
            .transpose()
            .map_err(Error::invalid_before)?;
        if after.is_some() && after == before {
            return Err(Error::AfterEqualsBefore);
        }

        let total_count = count_with(ctx, self.counter.as_ref()).await?;

        let mut nodes = if req.limit == 0 || total_count == Some(0) {
            tracing::trace!(limit = req.limit, ?total_count, "keyset fetch skipped");
            Vec::new()
        } else {
            let query = KeysetQuery::new(&req.order_bys, req.limit)
                .after(after.as_ref())
                .before(before.as_ref())
                .from_last(req.from_last);
            until_cancelled(ctx, self.finder.find(ctx, &query)).await?
        };
        if req.from_last {
            nodes.reverse();
        }

        let keys: Vec<String> = keys.iter().map(|k| (*k).to_string()).collect();
        let cursor: CursorFn<T> = Arc::new(move |node: &T| {
            encode_keyset_cursor(node, &keys).map_err(Error::EncodeCursor)
        });
        let edges = nodes
            .into_iter()
            .map(|node| LazyEdge::new(node, Arc::clone(&cursor)))
            .collect();

        Ok(ApplyCursorsResponse::new(edges)
            .with_total_count(total_count)
            .with_boundaries(after.is_some(), before.is_some()))
    }
}
