//! Error types for reconciliation passes.

use crate::gateway::{GatewayError, Scope};
use secsync_types::ConfigItem;
use thiserror::Error;

/// Result type alias for reconciliation operations.
pub type ReconResult<T> = Result<T, ReconError>;

/// Errors surfaced by the pass driver.
///
/// The diff and match primitives themselves are total and never fail;
/// everything here originates at the gateway boundary or from a create
/// whose handle never became visible.
#[derive(Debug, Error)]
pub enum ReconError {
    /// A gateway call failed after exhausting its retry budget.
    #[error("{operation} failed in scope {scope}: {source}")]
    Gateway {
        /// The operation that failed ("create", "delete", "list").
        operation: String,
        /// The scope the pass was reconciling.
        scope: String,
        /// The final gateway error.
        #[source]
        source: GatewayError,
    },

    /// A created rule never appeared in subsequent listings.
    ///
    /// The item's field values are included verbatim so the end user can
    /// identify which declared rule could not be confirmed.
    #[error("could not confirm creation of rule {item} in scope {scope} after {attempts} attempts")]
    CreateNotConfirmed {
        /// The scope the rule was created in.
        scope: String,
        /// Rendered field values of the submitted rule.
        item: String,
        /// Number of list-and-match attempts made.
        attempts: u32,
    },

    /// An observed rule scheduled for deletion carries no handle.
    ///
    /// Listings are expected to attach a handle to every rule; a gateway
    /// that omits one cannot have that rule deleted.
    #[error("observed rule {item} in scope {scope} has no handle; cannot delete")]
    MissingHandle {
        /// The scope being reconciled.
        scope: String,
        /// Rendered field values of the observed rule.
        item: String,
    },
}

impl ReconError {
    /// Wraps a gateway failure with its operation and scope.
    pub fn gateway(operation: impl Into<String>, scope: &Scope, source: GatewayError) -> Self {
        Self::Gateway {
            operation: operation.into(),
            scope: scope.to_string(),
            source,
        }
    }

    /// Creates a create-confirmation failure.
    pub fn create_not_confirmed(scope: &Scope, item: &ConfigItem, attempts: u32) -> Self {
        Self::CreateNotConfirmed {
            scope: scope.to_string(),
            item: item.to_string(),
            attempts,
        }
    }

    /// Creates a missing-handle failure.
    pub fn missing_handle(scope: &Scope, item: &ConfigItem) -> Self {
        Self::MissingHandle {
            scope: scope.to_string(),
            item: item.to_string(),
        }
    }
}
