//! Reconciliation pass driver.
//!
//! One pass converges a single remote scope to the desired rule
//! collection: list the scope, diff, apply deletes by their known handles,
//! apply creates, then resolve each created rule's handle by re-listing
//! and matching. Every RPC runs under the configured [`RetryPolicy`].
//!
//! The driver keeps no state between passes. If a pass fails after some
//! creates or deletes already succeeded, those rules are simply part of
//! the observed state next time; re-running the pass computes the
//! remaining delta.

use crate::diff::diff;
use crate::error::{ReconError, ReconResult};
use crate::gateway::{RemoteGateway, Scope};
use crate::key::KeyProfile;
use crate::matcher::find_handle;
use crate::retry::RetryPolicy;
use log::{debug, info};
use secsync_types::{ConfigItem, Handle};
use tokio::time::sleep;

/// Retry budgets for one reconciliation pass.
#[derive(Debug, Clone, Default)]
pub struct ReconcilerConfig {
    /// Policy for individual create/delete/list RPCs.
    pub rpc_retry: RetryPolicy,
    /// Policy for the list-and-match loop that resolves the handle of a
    /// just-created rule. Attempts bound how long the pass waits for the
    /// remote listing to reflect the create.
    pub resolve_retry: RetryPolicy,
}

/// Outcome of a completed reconciliation pass.
#[derive(Debug, Clone, Default)]
pub struct PassReport {
    /// Rules created in this pass, with their resolved handles.
    pub created: Vec<(ConfigItem, Handle)>,
    /// Handles of rules deleted in this pass.
    pub deleted: Vec<Handle>,
    /// Number of desired rules that were already present remotely.
    pub unchanged: usize,
}

impl PassReport {
    /// Returns true if the pass made no remote changes.
    pub fn is_noop(&self) -> bool {
        self.created.is_empty() && self.deleted.is_empty()
    }
}

/// Drives reconciliation passes over a [`RemoteGateway`].
///
/// Holds only the gateway and retry configuration; a single value can be
/// shared across tasks and scopes.
#[derive(Debug)]
pub struct Reconciler<G> {
    gateway: G,
    config: ReconcilerConfig,
}

impl<G: RemoteGateway> Reconciler<G> {
    /// Creates a reconciler with default retry budgets.
    pub fn new(gateway: G) -> Self {
        Self {
            gateway,
            config: ReconcilerConfig::default(),
        }
    }

    /// Replaces the retry configuration.
    pub fn with_config(mut self, config: ReconcilerConfig) -> Self {
        self.config = config;
        self
    }

    /// Returns the underlying gateway.
    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Runs one reconciliation pass for the scope.
    ///
    /// Deletes are applied before creates so that replacing a rule whose
    /// configuration changed cannot trip per-scope quota limits mid-pass.
    /// Independent creates and deletes are otherwise commutative.
    ///
    /// # Errors
    ///
    /// Returns the first RPC failure that survives its retry budget, a
    /// [`ReconError::MissingHandle`] if a listed rule scheduled for
    /// deletion carries no handle, or
    /// [`ReconError::CreateNotConfirmed`] if a created rule never became
    /// visible. Rules already applied before the failure stay applied;
    /// the pass is safe to re-run.
    pub async fn reconcile<P>(
        &self,
        scope: &Scope,
        desired: &[ConfigItem],
        profile: &P,
    ) -> ReconResult<PassReport>
    where
        P: KeyProfile + Sync + ?Sized,
    {
        let observed = self.list(scope).await?;
        let plan = diff(desired, &observed, profile);
        let unchanged = desired.len() - plan.to_create.len();

        info!(
            "reconciling scope {}: {} observed, {} to create, {} to delete, {} unchanged",
            scope,
            observed.len(),
            plan.to_create.len(),
            plan.to_delete.len(),
            unchanged
        );

        let mut report = PassReport {
            unchanged,
            ..PassReport::default()
        };

        for item in &plan.to_delete {
            let handle = item
                .handle()
                .ok_or_else(|| ReconError::missing_handle(scope, item))?;

            self.config
                .rpc_retry
                .run("delete", || self.gateway.delete(scope, handle))
                .await
                .map_err(|e| ReconError::gateway("delete", scope, e))?;

            debug!("deleted rule {} from scope {}", handle, scope);
            report.deleted.push(handle.clone());
        }

        for item in &plan.to_create {
            self.config
                .rpc_retry
                .run("create", || self.gateway.create(scope, item))
                .await
                .map_err(|e| ReconError::gateway("create", scope, e))?;

            let handle = self.resolve_handle(scope, item, profile).await?;
            debug!("created rule {} in scope {} as {}", item, scope, handle);
            report.created.push((item.clone(), handle));
        }

        info!(
            "scope {} converged: {} created, {} deleted, {} unchanged",
            scope,
            report.created.len(),
            report.deleted.len(),
            report.unchanged
        );
        Ok(report)
    }

    /// Discovers the handle of a just-created rule by listing the scope
    /// and matching by value, under the resolve retry budget.
    async fn resolve_handle<P>(
        &self,
        scope: &Scope,
        item: &ConfigItem,
        profile: &P,
    ) -> ReconResult<Handle>
    where
        P: KeyProfile + Sync + ?Sized,
    {
        let attempts = self.config.resolve_retry.attempts();

        for attempt in 1..=attempts {
            let listed = self.list(scope).await?;
            if let Some(handle) = find_handle(item, &listed, profile) {
                return Ok(handle);
            }

            if attempt < attempts {
                let delay = self.config.resolve_retry.delay_for(attempt);
                debug!(
                    "rule {} not yet visible in scope {} (attempt {}/{}), re-listing in {:?}",
                    item, scope, attempt, attempts, delay
                );
                sleep(delay).await;
            }
        }

        Err(ReconError::create_not_confirmed(scope, item, attempts))
    }

    async fn list(&self, scope: &Scope) -> ReconResult<Vec<ConfigItem>> {
        self.config
            .rpc_retry
            .run("list", || self.gateway.list(scope))
            .await
            .map_err(|e| ReconError::gateway("list", scope, e))
    }
}
