//! End-to-end synchronization runs against the in-memory store.
//!
//! Every test writes real document fixtures to a temp directory and runs the
//! full guard → load → fetch → diff → apply → prune sequence.

mod common;

use common::{SyncHarness, ACCOUNT_ID};

use paramsync::error::StoreError;
use paramsync::store::{ParameterKind, StaticIdentity, StoreCall};
use paramsync::{ApplyOutcome, SyncConfig, SyncError};

const SETTINGS: &str = r#"
database:
  host: db.internal
  port: 5432
  replicas:
    - db-1
    - db-2
feature:
  beta: "on"
"#;

#[tokio::test(start_paused = true)]
async fn test_unchanged_parameters_are_not_written() {
    let harness = SyncHarness::with_page_size(20);
    let mut document = String::from("keys:\n");
    let mut seeded = Vec::new();
    for i in 0..60 {
        document.push_str(&format!("  k{:02}: v{}\n", i, i));
        seeded.push((format!("/svc/keys/k{:02}", i), format!("v{}", i)));
    }
    for (name, value) in &seeded {
        harness.store.seed(name.as_str(), value.as_str()).await;
    }
    let source = harness.write_document("settings.yaml", &document);

    let report = harness
        .synchronizer(SyncConfig::default())
        .run(&harness.request(&source, "svc"))
        .await
        .unwrap();

    assert_eq!(report.statistics.parameters, 60);
    assert_eq!(report.statistics.existing, 60);
    assert_eq!(report.statistics.unchanged, 60);
    assert_eq!(report.statistics.created + report.statistics.updated, 0);
    assert_eq!(harness.store.put_count().await, 0);

    let lists = harness
        .store
        .calls()
        .await
        .into_iter()
        .filter(|c| matches!(c, StoreCall::List(_)))
        .count();
    assert_eq!(lists, 3);
}

#[tokio::test(start_paused = true)]
async fn test_only_changed_values_are_saved() {
    let harness = SyncHarness::new();
    harness
        .seed(&[
            ("/svc/database/host", "db.internal"),
            ("/svc/database/port", "5433"),
        ])
        .await;
    let source = harness.write_document("settings.yaml", SETTINGS);

    let report = harness
        .synchronizer(SyncConfig::default())
        .run(&harness.request(&source, "/svc/"))
        .await
        .unwrap();

    assert_eq!(report.prefix, "/svc/");
    assert_eq!(report.statistics.created, 2);
    assert_eq!(report.statistics.updated, 1);
    assert_eq!(report.statistics.unchanged, 1);
    assert_eq!(report.statistics.failed, 0);

    assert_eq!(
        harness.store.get("/svc/database/port").await.as_deref(),
        Some("5432")
    );
    assert_eq!(
        harness.store.get("/svc/database/replicas").await.as_deref(),
        Some("db-1,db-2")
    );
    assert_eq!(
        harness.store.kind_of("/svc/database/replicas").await,
        Some(ParameterKind::StringList)
    );
    assert_eq!(harness.store.put_count().await, 3);
}

#[tokio::test(start_paused = true)]
async fn test_directory_source_with_clean_prunes_orphans() {
    let harness = SyncHarness::new();
    harness
        .seed(&[
            ("/svc/app/name", "demo"),
            ("/svc/legacy/flag", "1"),
            ("/other/untouched", "x"),
        ])
        .await;
    harness.write_document("app.yaml", "name: demo\n");
    harness.write_document("db/primary.yml", "host: db1\n");
    harness.write_document("notes.txt", "ignored\n");

    let config = SyncConfig::default().with_clean(true);
    let report = harness
        .synchronizer(config)
        .run(&harness.request(&harness.documents_dir, "svc"))
        .await
        .unwrap();

    assert_eq!(report.statistics.parameters, 2);
    assert_eq!(report.statistics.created, 1);
    assert_eq!(report.statistics.deleted, 1);
    assert_eq!(
        report.pruned.as_ref().map(|p| p.deleted.clone()),
        Some(vec!["/svc/legacy/flag".to_string()])
    );

    let snapshot = harness.store.snapshot().await;
    assert_eq!(
        snapshot.keys().cloned().collect::<Vec<_>>(),
        vec![
            "/other/untouched".to_string(),
            "/svc/app/name".to_string(),
            "/svc/db/primary/host".to_string(),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_orphans_are_kept_without_clean() {
    let harness = SyncHarness::new();
    harness.seed(&[("/svc/legacy/flag", "1")]).await;
    let source = harness.write_document("settings.yaml", "a: 1\n");

    let report = harness
        .synchronizer(SyncConfig::default())
        .run(&harness.request(&source, "svc"))
        .await
        .unwrap();

    assert!(report.pruned.is_none());
    assert!(report.plan.delete_candidates.contains("/svc/legacy/flag"));
    assert!(harness.store.delete_calls().await.is_empty());
    assert_eq!(
        harness.store.get("/svc/legacy/flag").await.as_deref(),
        Some("1")
    );
}

#[tokio::test(start_paused = true)]
async fn test_identity_mismatch_makes_no_store_calls() {
    let harness = SyncHarness::with_identity(StaticIdentity::new("999999999999"));
    let source = harness.write_document("settings.yaml", SETTINGS);

    let err = harness
        .synchronizer(SyncConfig::default().with_clean(true))
        .run(&harness.request(&source, "svc"))
        .await
        .unwrap_err();

    match err {
        SyncError::IdentityMismatch { actual, expected } => {
            assert_eq!(actual, "999999999999");
            assert_eq!(expected, ACCOUNT_ID);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(harness.store.calls().await.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_identity_lookup_failure_is_fatal() {
    let harness = SyncHarness::with_identity(StaticIdentity::failing(StoreError::Transport(
        "no credentials".to_string(),
    )));
    let source = harness.write_document("settings.yaml", SETTINGS);

    let err = harness
        .synchronizer(SyncConfig::default())
        .run(&harness.request(&source, "svc"))
        .await
        .unwrap_err();

    assert!(matches!(err, SyncError::IdentityCheck(_)));
    assert!(harness.store.calls().await.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_missing_source_is_a_load_error() {
    let harness = SyncHarness::new();
    let source = harness.documents_dir.join("missing.yaml");

    let err = harness
        .synchronizer(SyncConfig::default())
        .run(&harness.request(&source, "svc"))
        .await
        .unwrap_err();

    assert!(matches!(err, SyncError::Load(_)));
    assert!(harness.store.calls().await.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_malformed_document_is_a_load_error() {
    let harness = SyncHarness::new();
    let source = harness.write_document("settings.yaml", "a: [unclosed\n");

    let err = harness
        .synchronizer(SyncConfig::default())
        .run(&harness.request(&source, "svc"))
        .await
        .unwrap_err();

    assert!(err.to_string().contains("Failed to parse YAML"));
    assert_eq!(harness.store.put_count().await, 0);
}

#[tokio::test(start_paused = true)]
async fn test_listing_failure_aborts_before_writes() {
    let harness = SyncHarness::with_page_size(1);
    harness.seed(&[("/svc/a", "1"), ("/svc/b", "2")]).await;
    harness
        .store
        .fail_list_page(1, StoreError::Transport("connection reset".to_string()))
        .await;
    let source = harness.write_document("settings.yaml", "a: 2\n");

    let err = harness
        .synchronizer(SyncConfig::default())
        .run(&harness.request(&source, "svc"))
        .await
        .unwrap_err();

    match err {
        SyncError::Fetch { path, .. } => assert_eq!(path, "/svc"),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(harness.store.put_count().await, 0);
}

#[tokio::test(start_paused = true)]
async fn test_delete_failure_after_writes() {
    let harness = SyncHarness::new();
    harness.seed(&[("/svc/stale", "x")]).await;
    harness
        .store
        .fail_next_delete(StoreError::Service("AccessDenied: nope".to_string()))
        .await;
    let source = harness.write_document("settings.yaml", "fresh: 1\n");

    let err = harness
        .synchronizer(SyncConfig::default().with_clean(true))
        .run(&harness.request(&source, "svc"))
        .await
        .unwrap_err();

    assert!(matches!(err, SyncError::Delete(_)));
    assert_eq!(harness.store.get("/svc/fresh").await.as_deref(), Some("1"));
    assert_eq!(harness.store.get("/svc/stale").await.as_deref(), Some("x"));
}

#[tokio::test(start_paused = true)]
async fn test_rate_limited_write_recovers_during_run() {
    let harness = SyncHarness::new();
    harness
        .store
        .fail_puts(
            "/svc/database/host",
            vec![
                StoreError::RateLimited("Rate exceeded".to_string()),
                StoreError::RateLimited("Rate exceeded".to_string()),
            ],
        )
        .await;
    let source = harness.write_document("settings.yaml", SETTINGS);
    let mut logs = harness.logs.subscribe();

    let report = harness
        .synchronizer(SyncConfig::default())
        .run(&harness.request(&source, "svc"))
        .await
        .unwrap();

    assert_eq!(report.statistics.created, 4);
    let host = report
        .outcomes
        .iter()
        .find(|o| o.name == "/svc/database/host")
        .unwrap();
    assert_eq!(host.attempts, 3);
    assert_eq!(host.outcome, ApplyOutcome::Succeeded);

    let warnings = SyncHarness::drain(&mut logs)
        .into_iter()
        .filter(|e| e.level == "WARN")
        .count();
    assert_eq!(warnings, 2);
}

#[tokio::test(start_paused = true)]
async fn test_unsupported_values_are_reported_not_fatal() {
    let harness = SyncHarness::new();
    let source = harness.write_document("settings.yaml", "enabled: true\nname: demo\nempty:\n");

    let report = harness
        .synchronizer(SyncConfig::default())
        .run(&harness.request(&source, "svc"))
        .await
        .unwrap();

    assert_eq!(report.statistics.created, 1);
    assert_eq!(report.statistics.failed, 2);
    assert!(report
        .failures()
        .all(|o| matches!(o.outcome, ApplyOutcome::InvalidValue(_))));
    assert_eq!(harness.store.put_count().await, 1);
}
