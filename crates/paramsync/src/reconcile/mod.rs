//! Reconciliation of desired configuration against the remote store.

pub mod apply;
pub mod diff;
pub mod engine;
pub mod fetch;
pub mod flatten;
pub mod identity;
pub mod keys;
pub mod prune;
pub mod retry;

pub use apply::{put_request, ApplyEngine, ApplyOutcome, ChangeKind, KeyOutcome};
pub use diff::{diff, DesiredParameter, DesiredState, ReconciliationPlan};
pub use engine::{PlannedSync, SyncReport, SyncRequest, SyncStatistics, Synchronizer};
pub use fetch::fetch_all;
pub use flatten::{flatten, FlatEntry, KeyPath, LeafValue};
pub use identity::verify_identity;
pub use keys::{listing_path, normalize_prefix, to_external_key, SEPARATOR};
pub use prune::{prune, PruneOutcome, PruneTarget};
pub use retry::{RetryDecision, RetryPolicy};
