//! Fixture builders for common rule shapes.

use secsync_recon::{FieldFilter, ReconcilerConfig, RetryPolicy, Scope};
use secsync_types::{ConfigItem, Value};
use std::time::Duration;

/// Scope of the ACL table on a test instance.
pub fn acl_scope() -> Scope {
    Scope::new("ddos-20481", "acl")
}

/// An ACL rule matching one destination port.
pub fn acl_rule(action: &str, port: i64) -> ConfigItem {
    ConfigItem::new()
        .with("action", action)
        .with("d_port_start", port)
        .with("d_port_end", port)
}

/// A geo-block rule with an order-insensitive protocol list.
pub fn geo_rule(region: &str, action: &str, protocols: &[&str]) -> ConfigItem {
    ConfigItem::new()
        .with("region", region)
        .with("action", action)
        .with(
            "protocols",
            protocols.iter().map(|p| Value::from(*p)).collect::<Vec<_>>(),
        )
}

/// Profile excluding the server-populated metadata fields the control
/// plane attaches to listed rules.
pub fn metadata_profile() -> FieldFilter {
    FieldFilter::ignoring(["create_time", "modify_time", "policy_id"])
}

/// Retry budgets shrunk to keep test runs fast.
pub fn fast_config() -> ReconcilerConfig {
    ReconcilerConfig {
        rpc_retry: RetryPolicy::new(3, Duration::from_millis(1)),
        resolve_retry: RetryPolicy::new(5, Duration::from_millis(1)),
    }
}
