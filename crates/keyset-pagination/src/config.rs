//! Paginator configuration resolved once at setup time.

use std::fmt;

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};

use crate::{PaginationError, Result};

/// Default name the pagination operation is installed under.
pub const DEFAULT_METHOD_NAME: &str = "paginate";

/// Default unique tiebreaker field.
pub const DEFAULT_PRIMARY_KEY_FIELD: &str = "id";

/// Configuration for a [`Paginator`].
///
/// ## Example
///
/// ```rust
/// use keyset_pagination::PaginationConfig;
///
/// let config = PaginationConfig::default()
///     .with_primary_key_field("uuid")
///     .with_legacy_cursors(false);
/// assert!(config.validate().is_ok());
/// ```
///
/// [`Paginator`]: crate::Paginator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "pagination configurations must be used to create a paginator"]
pub struct PaginationConfig {
    /// Name under which the pagination operation is installed
    #[cfg_attr(
        feature = "config",
        arg(long = "method-name", env = "KEYSET_METHOD_NAME", default_value = DEFAULT_METHOD_NAME)
    )]
    #[serde(default = "default_method_name")]
    pub method_name: String,

    /// Unique field appended to every ordering as the final tiebreaker
    #[cfg_attr(
        feature = "config",
        arg(
            long = "primary-key-field",
            env = "KEYSET_PRIMARY_KEY_FIELD",
            default_value = DEFAULT_PRIMARY_KEY_FIELD
        )
    )]
    #[serde(default = "default_primary_key_field")]
    pub primary_key_field: String,

    /// Accept bare-array cursors (treated as `next`) in the prev/next API
    #[cfg_attr(
        feature = "config",
        arg(
            long = "legacy-cursors",
            env = "KEYSET_LEGACY_CURSORS",
            default_value_t = true,
            action = clap::ArgAction::Set
        )
    )]
    #[serde(default = "default_legacy_cursors")]
    pub legacy_cursors: bool,
}

fn default_method_name() -> String {
    DEFAULT_METHOD_NAME.to_owned()
}

fn default_primary_key_field() -> String {
    DEFAULT_PRIMARY_KEY_FIELD.to_owned()
}

fn default_legacy_cursors() -> bool {
    true
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            method_name: default_method_name(),
            primary_key_field: default_primary_key_field(),
            legacy_cursors: default_legacy_cursors(),
        }
    }
}

impl PaginationConfig {
    /// Sets the name the operation is installed under.
    pub fn with_method_name(mut self, method_name: impl Into<String>) -> Self {
        self.method_name = method_name.into();
        self
    }

    /// Sets the default tiebreaker field.
    pub fn with_primary_key_field(mut self, field: impl Into<String>) -> Self {
        self.primary_key_field = field.into();
        self
    }

    /// Enables or disables decoding of bare-array cursors in the prev/next API.
    pub fn with_legacy_cursors(mut self, enabled: bool) -> Self {
        self.legacy_cursors = enabled;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.method_name.trim().is_empty() {
            return Err(PaginationError::invalid_arguments(
                "method_name cannot be empty",
            ));
        }

        if self.primary_key_field.trim().is_empty() {
            return Err(PaginationError::invalid_arguments(
                "primary_key_field cannot be empty",
            ));
        }

        Ok(())
    }
}

impl fmt::Display for PaginationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PaginationConfig(method: {}, primary_key: {}, legacy_cursors: {})",
            self.method_name, self.primary_key_field, self.legacy_cursors
        )
    }
}
