//! Remote control-plane gateway abstraction.
//!
//! The engine never talks to the network itself. Per-rule-type adapters
//! supply a [`RemoteGateway`] implementation that knows the concrete RPC
//! surface (transport, signing, marshalling); the engine only requires the
//! three capabilities below and that `list` eventually reflects all prior
//! successful `create`/`delete` calls to the same scope. Eventual, not
//! immediate, consistency is assumed throughout.

use crate::retry::Retryable;
use async_trait::async_trait;
use secsync_types::{ConfigItem, Handle};
use std::fmt;
use thiserror::Error;

/// The sub-resource collection one reconciliation pass operates on, e.g.
/// all ACL rules of one protected instance.
///
/// Desired and observed collections within a pass must describe the same
/// scope; mixing scopes is a caller error the engine cannot detect.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Scope {
    /// The remote instance the rules belong to.
    pub instance: String,
    /// The rule table on that instance (ACL, geo-block, speed-limit, ...).
    pub table: String,
}

impl Scope {
    /// Creates a new scope.
    pub fn new(instance: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            instance: instance.into(),
            table: table.into(),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.instance, self.table)
    }
}

/// Errors reported by a gateway implementation.
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    /// The remote control plane rejected the request.
    #[error("remote rejected {operation}: {message} (code {code})")]
    Remote {
        /// The operation that failed ("create", "delete", "list").
        operation: String,
        /// Remote error code.
        code: String,
        /// Remote error message.
        message: String,
    },

    /// The request never reached the remote, or the response was lost.
    #[error("transport failure during {operation}: {message}")]
    Transport {
        /// The operation that failed.
        operation: String,
        /// Error message.
        message: String,
    },

    /// The remote throttled the request.
    #[error("throttled during {operation}: {message}")]
    Throttled {
        /// The operation that failed.
        operation: String,
        /// Error message.
        message: String,
    },
}

impl GatewayError {
    /// Creates a remote-rejection error.
    pub fn remote(
        operation: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Remote {
            operation: operation.into(),
            code: code.into(),
            message: message.into(),
        }
    }

    /// Creates a transport error.
    pub fn transport(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transport {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Creates a throttling error.
    pub fn throttled(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Throttled {
            operation: operation.into(),
            message: message.into(),
        }
    }
}

impl Retryable for GatewayError {
    /// Transport failures and throttling are transient; an explicit remote
    /// rejection is not.
    fn is_retryable(&self) -> bool {
        matches!(
            self,
            GatewayError::Transport { .. } | GatewayError::Throttled { .. }
        )
    }
}

/// Capability to mutate and observe one remote rule collection.
///
/// Each call must be independently safe to retry. `create` takes the rule
/// by value fields only (any attached handle is ignored); `delete`
/// addresses a rule solely by the handle learned from a prior listing;
/// `list` returns every sibling rule in the scope, each carrying its
/// handle.
#[async_trait]
pub trait RemoteGateway: Send + Sync {
    /// Submits a new rule to the scope.
    async fn create(&self, scope: &Scope, item: &ConfigItem) -> Result<(), GatewayError>;

    /// Removes the rule with the given handle from the scope.
    async fn delete(&self, scope: &Scope, handle: &Handle) -> Result<(), GatewayError>;

    /// Lists all rules currently visible in the scope.
    async fn list(&self, scope: &Scope) -> Result<Vec<ConfigItem>, GatewayError>;
}

#[async_trait]
impl<G: RemoteGateway + ?Sized> RemoteGateway for &G {
    async fn create(&self, scope: &Scope, item: &ConfigItem) -> Result<(), GatewayError> {
        (**self).create(scope, item).await
    }

    async fn delete(&self, scope: &Scope, handle: &Handle) -> Result<(), GatewayError> {
        (**self).delete(scope, handle).await
    }

    async fn list(&self, scope: &Scope) -> Result<Vec<ConfigItem>, GatewayError> {
        (**self).list(scope).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_display() {
        let scope = Scope::new("ddos-20481", "acl");
        assert_eq!(scope.to_string(), "ddos-20481/acl");
    }

    #[test]
    fn test_error_classification() {
        assert!(GatewayError::transport("list", "connection reset").is_retryable());
        assert!(GatewayError::throttled("create", "rate exceeded").is_retryable());
        assert!(!GatewayError::remote("create", "InvalidParameter", "bad port").is_retryable());
    }

    #[test]
    fn test_error_display_carries_context() {
        let err = GatewayError::remote("create", "LimitExceeded", "too many rules");
        assert_eq!(
            err.to_string(),
            "remote rejected create: too many rules (code LimitExceeded)"
        );
    }
}
