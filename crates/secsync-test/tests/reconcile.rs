//! End-to-end reconciliation passes against the in-memory gateway.

use pretty_assertions::assert_eq;
use secsync_recon::{AllFields, Reconciler};
use secsync_test::{acl_rule, acl_scope, fast_config, geo_rule, metadata_profile, MemoryGateway};
use secsync_types::ConfigItem;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Stored rules compared by configuration only.
fn visible_configs(gw: &MemoryGateway) -> Vec<ConfigItem> {
    gw.snapshot(&acl_scope())
        .iter()
        .map(ConfigItem::without_handle)
        .collect()
}

#[tokio::test]
async fn test_initial_pass_creates_everything() {
    init_logging();
    let gw = MemoryGateway::new();
    let reconciler = Reconciler::new(&gw).with_config(fast_config());

    let desired = vec![acl_rule("drop", 80), acl_rule("drop", 443)];
    let report = reconciler
        .reconcile(&acl_scope(), &desired, &AllFields)
        .await
        .unwrap();

    assert_eq!(report.created.len(), 2);
    assert_eq!(report.deleted.len(), 0);
    assert_eq!(report.unchanged, 0);

    // Each created rule resolved to a distinct handle.
    assert_ne!(report.created[0].1, report.created[1].1);
    assert_eq!(visible_configs(&gw), desired);
}

#[tokio::test]
async fn test_second_pass_is_noop() {
    init_logging();
    let gw = MemoryGateway::new();
    let reconciler = Reconciler::new(&gw).with_config(fast_config());
    let desired = vec![acl_rule("drop", 80), acl_rule("drop", 443)];

    reconciler
        .reconcile(&acl_scope(), &desired, &AllFields)
        .await
        .unwrap();
    let report = reconciler
        .reconcile(&acl_scope(), &desired, &AllFields)
        .await
        .unwrap();

    assert!(report.is_noop());
    assert_eq!(report.unchanged, 2);
}

#[tokio::test]
async fn test_acl_scenario_converges_with_minimal_changes() {
    init_logging();
    let gw = MemoryGateway::new();
    let scope = acl_scope();

    // Remote already holds port-80 and port-22 rules.
    use secsync_recon::RemoteGateway;
    gw.create(&scope, &acl_rule("drop", 80)).await.unwrap();
    gw.create(&scope, &acl_rule("drop", 22)).await.unwrap();
    let port22_handle = gw.snapshot(&scope)[1].handle().cloned().unwrap();

    let reconciler = Reconciler::new(&gw).with_config(fast_config());
    let desired = vec![acl_rule("drop", 80), acl_rule("drop", 443)];
    let report = reconciler
        .reconcile(&scope, &desired, &AllFields)
        .await
        .unwrap();

    // Port 80 untouched, 443 created, 22 deleted by its known handle.
    assert_eq!(report.unchanged, 1);
    assert_eq!(report.created.len(), 1);
    assert_eq!(report.created[0].0, acl_rule("drop", 443));
    assert_eq!(report.deleted, vec![port22_handle]);

    let mut remote = visible_configs(&gw);
    remote.sort_by_key(|r| r.get("d_port_start").and_then(|v| v.as_int()));
    assert_eq!(remote, vec![acl_rule("drop", 80), acl_rule("drop", 443)]);
}

#[tokio::test]
async fn test_duplicate_rules_reconcile_as_multisets() {
    init_logging();
    let gw = MemoryGateway::new();
    let scope = acl_scope();
    let rule = acl_rule("drop", 80);
    let reconciler = Reconciler::new(&gw).with_config(fast_config());

    // One remote copy, two desired: exactly one extra create.
    use secsync_recon::RemoteGateway;
    gw.create(&scope, &rule).await.unwrap();
    let report = reconciler
        .reconcile(&scope, &[rule.clone(), rule.clone()], &AllFields)
        .await
        .unwrap();
    assert_eq!(report.created.len(), 1);
    assert_eq!(report.deleted.len(), 0);
    assert_eq!(gw.snapshot(&scope).len(), 2);

    // Back down to one desired copy: exactly one surplus delete.
    let report = reconciler
        .reconcile(&scope, &[rule.clone()], &AllFields)
        .await
        .unwrap();
    assert_eq!(report.created.len(), 0);
    assert_eq!(report.deleted.len(), 1);
    assert_eq!(gw.snapshot(&scope).len(), 1);
}

#[tokio::test]
async fn test_protocol_list_order_does_not_churn() {
    init_logging();
    let gw = MemoryGateway::new();
    let scope = acl_scope();
    let reconciler = Reconciler::new(&gw).with_config(fast_config());

    // Remote stores the protocol list in a different order than declared.
    use secsync_recon::RemoteGateway;
    gw.create(&scope, &geo_rule("ap-east", "drop", &["udp", "tcp"]))
        .await
        .unwrap();

    let desired = vec![geo_rule("ap-east", "drop", &["tcp", "udp"])];
    let report = reconciler
        .reconcile(&scope, &desired, &AllFields)
        .await
        .unwrap();

    assert!(report.is_noop());
    assert_eq!(report.unchanged, 1);
}

#[tokio::test]
async fn test_server_metadata_is_ignored_under_profile() {
    init_logging();
    // The control plane stamps every stored rule with a creation marker.
    let gw = MemoryGateway::new().with_stamped_field("create_time");
    let reconciler = Reconciler::new(&gw).with_config(fast_config());
    let profile = metadata_profile();
    let desired = vec![acl_rule("drop", 80), acl_rule("drop", 443)];

    let report = reconciler
        .reconcile(&acl_scope(), &desired, &profile)
        .await
        .unwrap();
    assert_eq!(report.created.len(), 2);

    // The stamp must not make already-converged rules look different.
    let report = reconciler
        .reconcile(&acl_scope(), &desired, &profile)
        .await
        .unwrap();
    assert!(report.is_noop());
}
