//! In-memory gateway with fault injection.

use async_trait::async_trait;
use log::debug;
use secsync_recon::{GatewayError, RemoteGateway, Scope};
use secsync_types::{ConfigItem, Handle, Value};
use std::collections::HashMap;
use std::sync::Mutex;

/// Gateway call accounting, for asserting retry behavior.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    /// Total create calls received, including failed ones.
    pub creates: u64,
    /// Total delete calls received, including failed ones.
    pub deletes: u64,
    /// Total list calls received, including failed ones.
    pub lists: u64,
}

#[derive(Debug, Clone)]
struct StoredRule {
    item: ConfigItem,
    /// Number of list calls this rule stays invisible for (eventual
    /// consistency simulation).
    hidden_for: u32,
}

#[derive(Debug, Default)]
struct State {
    scopes: HashMap<Scope, Vec<StoredRule>>,
    next_handle: u64,
    fail_creates: u32,
    fail_deletes: u32,
    fail_lists: u32,
    /// When set, create calls beyond this many successes are rejected
    /// with a permanent remote error.
    deny_creates_after: Option<u64>,
    creates_ok: u64,
    calls: CallCounts,
}

/// In-memory [`RemoteGateway`] mimicking an identifier-less control plane.
///
/// Behaves like the real thing in the ways the engine cares about:
/// created rules get a server-assigned handle the caller never sees in the
/// create response, listings attach handles, and listings may lag behind
/// creates. Transient transport faults and permanent rejections can be
/// injected to exercise retry and resumability paths.
#[derive(Debug, Default)]
pub struct MemoryGateway {
    state: Mutex<State>,
    visibility_lag: u32,
    /// Server-stamped metadata field attached to every stored rule.
    stamp_field: Option<String>,
}

impl MemoryGateway {
    /// Creates an empty gateway with immediate visibility.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes newly created rules invisible for the given number of list
    /// calls.
    pub fn with_visibility_lag(mut self, lag: u32) -> Self {
        self.visibility_lag = lag;
        self
    }

    /// Stamps every stored rule with a server-populated metadata field
    /// (a monotonic integer, standing in for a creation timestamp).
    pub fn with_stamped_field(mut self, field: impl Into<String>) -> Self {
        self.stamp_field = Some(field.into());
        self
    }

    /// Fails the next `n` create calls with a transient transport error.
    pub fn fail_next_creates(&self, n: u32) {
        self.state.lock().unwrap().fail_creates = n;
    }

    /// Fails the next `n` delete calls with a transient transport error.
    pub fn fail_next_deletes(&self, n: u32) {
        self.state.lock().unwrap().fail_deletes = n;
    }

    /// Fails the next `n` list calls with a transient transport error.
    pub fn fail_next_lists(&self, n: u32) {
        self.state.lock().unwrap().fail_lists = n;
    }

    /// Permanently rejects create calls once `n` creates have succeeded.
    pub fn deny_creates_after(&self, n: u64) {
        let mut state = self.state.lock().unwrap();
        state.deny_creates_after = Some(state.creates_ok + n);
    }

    /// Lifts a previous [`deny_creates_after`](Self::deny_creates_after).
    pub fn allow_all_creates(&self) {
        self.state.lock().unwrap().deny_creates_after = None;
    }

    /// Returns every stored rule in the scope, visible or not, with
    /// handles attached.
    pub fn snapshot(&self, scope: &Scope) -> Vec<ConfigItem> {
        let state = self.state.lock().unwrap();
        state
            .scopes
            .get(scope)
            .map(|rules| rules.iter().map(|r| r.item.clone()).collect())
            .unwrap_or_default()
    }

    /// Returns the call counts so far.
    pub fn call_counts(&self) -> CallCounts {
        self.state.lock().unwrap().calls
    }
}

#[async_trait]
impl RemoteGateway for MemoryGateway {
    async fn create(&self, scope: &Scope, item: &ConfigItem) -> Result<(), GatewayError> {
        let mut state = self.state.lock().unwrap();
        state.calls.creates += 1;

        if state.fail_creates > 0 {
            state.fail_creates -= 1;
            return Err(GatewayError::transport("create", "injected fault"));
        }
        if let Some(limit) = state.deny_creates_after {
            if state.creates_ok >= limit {
                return Err(GatewayError::remote(
                    "create",
                    "LimitExceeded",
                    "rule quota exhausted",
                ));
            }
        }

        state.next_handle += 1;
        state.creates_ok += 1;
        let handle = Handle::new(format!("{}-{}", scope.table, state.next_handle))
            .expect("generated handle is non-empty");

        let mut stored = item.without_handle();
        if let Some(field) = &self.stamp_field {
            stored.set(field.clone(), Value::Int(state.next_handle as i64));
        }
        stored.set_handle(handle.clone());

        debug!("memory gateway: created {} in {}", handle, scope);
        state.scopes.entry(scope.clone()).or_default().push(StoredRule {
            item: stored,
            hidden_for: self.visibility_lag,
        });
        Ok(())
    }

    async fn delete(&self, scope: &Scope, handle: &Handle) -> Result<(), GatewayError> {
        let mut state = self.state.lock().unwrap();
        state.calls.deletes += 1;

        if state.fail_deletes > 0 {
            state.fail_deletes -= 1;
            return Err(GatewayError::transport("delete", "injected fault"));
        }

        let rules = state.scopes.entry(scope.clone()).or_default();
        match rules.iter().position(|r| r.item.handle() == Some(handle)) {
            Some(pos) => {
                rules.remove(pos);
                debug!("memory gateway: deleted {} from {}", handle, scope);
                Ok(())
            }
            None => Err(GatewayError::remote(
                "delete",
                "NotFound",
                format!("no rule with handle {}", handle),
            )),
        }
    }

    async fn list(&self, scope: &Scope) -> Result<Vec<ConfigItem>, GatewayError> {
        let mut state = self.state.lock().unwrap();
        state.calls.lists += 1;

        if state.fail_lists > 0 {
            state.fail_lists -= 1;
            return Err(GatewayError::transport("list", "injected fault"));
        }

        let mut visible = Vec::new();
        if let Some(rules) = state.scopes.get_mut(scope) {
            for rule in rules.iter_mut() {
                if rule.hidden_for > 0 {
                    rule.hidden_for -= 1;
                } else {
                    visible.push(rule.item.clone());
                }
            }
        }
        Ok(visible)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scope() -> Scope {
        Scope::new("inst-1", "acl")
    }

    fn rule(port: i64) -> ConfigItem {
        ConfigItem::new().with("action", "drop").with("port", port)
    }

    #[tokio::test]
    async fn test_create_assigns_handle_visible_via_list() {
        let gw = MemoryGateway::new();
        gw.create(&scope(), &rule(80)).await.unwrap();

        let listed = gw.list(&scope()).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert!(listed[0].handle().is_some());
        assert_eq!(listed[0].get("port").and_then(|v| v.as_int()), Some(80));
    }

    #[tokio::test]
    async fn test_visibility_lag_hides_rule_then_reveals_it() {
        let gw = MemoryGateway::new().with_visibility_lag(2);
        gw.create(&scope(), &rule(80)).await.unwrap();

        assert!(gw.list(&scope()).await.unwrap().is_empty());
        assert!(gw.list(&scope()).await.unwrap().is_empty());
        assert_eq!(gw.list(&scope()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_unknown_handle_is_permanent_error() {
        let gw = MemoryGateway::new();
        let err = gw
            .delete(&scope(), &"acl-99".parse().unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Remote { .. }));
    }

    #[tokio::test]
    async fn test_injected_faults_decrement() {
        let gw = MemoryGateway::new();
        gw.fail_next_lists(1);

        assert!(gw.list(&scope()).await.is_err());
        assert!(gw.list(&scope()).await.is_ok());
        assert_eq!(gw.call_counts().lists, 2);
    }
}
