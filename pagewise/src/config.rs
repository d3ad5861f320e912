//! Paginator configuration.
//!
//! [`PaginationConfig`] deserializes from any serde format, so services can
//! keep page limits next to the rest of their settings:
//!
//! ```
//! use pagewise::{OrderBy, PaginationConfig};
//!
//! let config: PaginationConfig = serde_json::from_str(
//!     r#"{"maxLimit": 50, "limitIfNotSet": 10, "orderBysIfNotSet": [{"field": "id"}]}"#,
//! )
//! .unwrap();
//! assert!(config.validate().is_ok());
//! assert_eq!(config.order_bys_if_not_set, vec![OrderBy::asc("id")]);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::order::{OrderBy, duplicated_fields};

/// Default for [`PaginationConfig::max_limit`].
pub const DEFAULT_MAX_LIMIT: usize = 100;

/// Default for [`PaginationConfig::limit_if_not_set`].
pub const DEFAULT_LIMIT_IF_NOT_SET: usize = 20;

/// Static settings of a [`Paginator`](crate::Paginator).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
#[non_exhaustive]
pub struct PaginationConfig {
    /// Skip cursor computation and return bare nodes.
    pub nodes_only: bool,
    /// Largest `first`/`last` a request may ask for.
    pub max_limit: usize,
    /// Page size when neither `first` nor `last` is given.
    pub limit_if_not_set: usize,
    /// Order used when the request has none.
    pub order_bys_if_not_set: Vec<OrderBy>,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            nodes_only: false,
            max_limit: DEFAULT_MAX_LIMIT,
            limit_if_not_set: DEFAULT_LIMIT_IF_NOT_SET,
            order_bys_if_not_set: Vec::new(),
        }
    }
}

impl PaginationConfig {
    /// Defaults with the given default order.
    #[must_use]
    pub fn new(order_bys_if_not_set: Vec<OrderBy>) -> Self {
        Self {
            order_bys_if_not_set,
            ..Self::default()
        }
    }

    /// Check every setting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_limits()?;
        self.validate_order()
    }

    pub(crate) const fn validate_limits(&self) -> Result<(), ConfigError> {
        if self.limit_if_not_set == 0 {
            return Err(ConfigError::LimitIfNotSetZero);
        }
        if self.max_limit < self.limit_if_not_set {
            return Err(ConfigError::MaxLimitBelowDefault {
                max_limit: self.max_limit,
                limit_if_not_set: self.limit_if_not_set,
            });
        }
        Ok(())
    }

    pub(crate) fn validate_order(&self) -> Result<(), ConfigError> {
        if self.order_bys_if_not_set.is_empty() {
            return Err(ConfigError::EmptyDefaultOrderBys);
        }
        let dups = duplicated_fields(&self.order_bys_if_not_set);
        if !dups.is_empty() {
            return Err(ConfigError::DuplicateDefaultOrderBys(dups));
        }
        Ok(())
    }
}
