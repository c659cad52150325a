//! Configuration for QueryBuilder
//!
//! Selects the ordering and pagination policies used by `find`. The two
//! policies of each kind are mutually exclusive; a builder applies exactly one.

use serde::{Deserialize, Deserializer, Serialize};

/// How `ORDER BY` is rendered by `find`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderByPolicy {
    /// Bind the single order-by column as a value: `ORDER BY $n [ASC|DESC]`.
    ///
    /// Kept for parity with the legacy helper. Most engines reject a bound
    /// identifier here, so prefer `Whitelist` for new code.
    BoundColumn,
    /// Render `column[.direction]` tokens as literal identifiers, keeping only
    /// columns that are also selected.
    #[default]
    Whitelist,
}

/// How `LIMIT`/`OFFSET` are rendered by `find`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaginationPolicy {
    /// Emit `LIMIT` only for a present, non-zero limit, and `OFFSET` only after it.
    Conditional,
    /// Always emit `LIMIT $n OFFSET $n`, coercing bad input to the defaults.
    #[default]
    AlwaysOn,
}

fn default_limit() -> i64 {
    10
}

fn default_offset() -> i64 {
    0
}

/// Smallest usable fallback limit
const MIN_DEFAULT_LIMIT: i64 = 1;

fn clamp_limit<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    Ok(i64::deserialize(deserializer)?.max(MIN_DEFAULT_LIMIT))
}

fn clamp_offset<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    Ok(i64::deserialize(deserializer)?.max(0))
}

/// Configuration for the query builder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuilderConfig {
    /// Ordering policy (default: whitelist)
    #[serde(default)]
    pub order_by: OrderByPolicy,
    /// Pagination policy (default: always-on)
    #[serde(default)]
    pub pagination: PaginationPolicy,
    /// Limit used by always-on pagination when none is usable (default: 10, at least 1)
    #[serde(default = "default_limit", deserialize_with = "clamp_limit")]
    pub default_limit: i64,
    /// Offset used by always-on pagination when none is usable (default: 0, never negative)
    #[serde(default = "default_offset", deserialize_with = "clamp_offset")]
    pub default_offset: i64,
    /// Reject table and column names that fail `validate_identifier` (default: false)
    #[serde(default)]
    pub validate_identifiers: bool,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            order_by: OrderByPolicy::default(),
            pagination: PaginationPolicy::default(),
            default_limit: default_limit(),
            default_offset: default_offset(),
            validate_identifiers: false,
        }
    }
}

impl BuilderConfig {
    /// Create a new configuration builder
    pub fn builder() -> BuilderConfigBuilder {
        BuilderConfigBuilder::new()
    }

    /// Bound order-by column with conditional pagination
    pub fn legacy() -> Self {
        Self::builder()
            .order_by(OrderByPolicy::BoundColumn)
            .pagination(PaginationPolicy::Conditional)
            .build()
    }
}

/// Builder for BuilderConfig
#[derive(Debug, Default)]
pub struct BuilderConfigBuilder {
    config: BuilderConfig,
}

impl BuilderConfigBuilder {
    /// Create a new builder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the ordering policy
    pub fn order_by(mut self, policy: OrderByPolicy) -> Self {
        self.config.order_by = policy;
        self
    }

    /// Set the pagination policy
    pub fn pagination(mut self, policy: PaginationPolicy) -> Self {
        self.config.pagination = policy;
        self
    }

    /// Set the fallback limit for always-on pagination; values below 1 become 1
    pub fn default_limit(mut self, limit: i64) -> Self {
        self.config.default_limit = limit.max(MIN_DEFAULT_LIMIT);
        self
    }

    /// Set the fallback offset for always-on pagination; negative values become 0
    pub fn default_offset(mut self, offset: i64) -> Self {
        self.config.default_offset = offset.max(0);
        self
    }

    /// Enable or disable identifier validation
    pub fn validate_identifiers(mut self, enabled: bool) -> Self {
        self.config.validate_identifiers = enabled;
        self
    }

    /// Build the configuration
    pub fn build(self) -> BuilderConfig {
        self.config
    }
}
