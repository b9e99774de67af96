//! Synchronization run: guard → load → flatten → fetch → diff → apply → prune.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info_span, Instrument};
use uuid::Uuid;

use super::apply::{ApplyEngine, ChangeKind, KeyOutcome};
use super::diff::{diff, DesiredParameter, DesiredState, ReconciliationPlan};
use super::fetch::fetch_all;
use super::flatten::flatten;
use super::identity::verify_identity;
use super::keys::{listing_path, normalize_prefix};
use super::prune::{prune, PruneOutcome};
use crate::config::SyncConfig;
use crate::document::{DocumentLoader, FsDocumentLoader};
use crate::error::Result;
use crate::logging::{RunLogger, TracingLogger};
use crate::store::{IdentityService, ParameterStore};

/// What to synchronize and where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncRequest {
    /// Document file or directory holding the desired configuration.
    pub source: PathBuf,
    /// Namespace prefix for parameter names.
    pub prefix: String,
    /// Identity the store credentials must belong to.
    pub expected_identity: String,
}

impl SyncRequest {
    pub fn new(
        source: impl Into<PathBuf>,
        prefix: impl Into<String>,
        expected_identity: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            prefix: prefix.into(),
            expected_identity: expected_identity.into(),
        }
    }
}

/// Counters reported at the end of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncStatistics {
    /// Desired parameters.
    pub parameters: usize,
    /// Remote parameters under the prefix before the run.
    pub existing: usize,
    pub created: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub deleted: usize,
    /// Planned writes that did not succeed.
    pub failed: usize,
}

/// Desired and remote state compared, before anything is written.
#[derive(Debug, Clone)]
pub struct PlannedSync {
    pub prefix: String,
    pub parameters: Vec<DesiredParameter>,
    pub existing: BTreeMap<String, String>,
    pub plan: ReconciliationPlan,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    pub run_id: String,
    pub prefix: String,
    pub statistics: SyncStatistics,
    pub plan: ReconciliationPlan,
    pub outcomes: Vec<KeyOutcome>,
    /// Present when pruning ran.
    pub pruned: Option<PruneOutcome>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl SyncReport {
    /// Outcomes of the writes that did not succeed.
    pub fn failures(&self) -> impl Iterator<Item = &KeyOutcome> {
        self.outcomes.iter().filter(|o| !o.outcome.is_success())
    }
}

/// Reconciles a configuration document into a parameter store.
pub struct Synchronizer {
    store: Arc<dyn ParameterStore>,
    identity: Arc<dyn IdentityService>,
    loader: Arc<dyn DocumentLoader>,
    logger: Arc<dyn RunLogger>,
    config: SyncConfig,
}

impl Synchronizer {
    /// Creates a synchronizer reading documents from the filesystem and
    /// logging through `tracing`.
    pub fn new(
        store: Arc<dyn ParameterStore>,
        identity: Arc<dyn IdentityService>,
        config: SyncConfig,
    ) -> Self {
        Self {
            store,
            identity,
            loader: Arc::new(FsDocumentLoader::new()),
            logger: Arc::new(TracingLogger),
            config,
        }
    }

    pub fn with_loader(mut self, loader: Arc<dyn DocumentLoader>) -> Self {
        self.loader = loader;
        self
    }

    pub fn with_logger(mut self, logger: Arc<dyn RunLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Verifies the identity, loads the document and diffs it against the
    /// remote snapshot without writing anything.
    pub async fn plan(&self, request: &SyncRequest) -> Result<PlannedSync> {
        let logger = self.logger.as_ref();

        verify_identity(self.identity.as_ref(), logger, &request.expected_identity).await?;

        let prefix = normalize_prefix(&request.prefix);

        let document = self.loader.load(&request.source)?;
        logger.info(&format!(
            "Loaded {} into settings object",
            request.source.display()
        ));

        let desired = DesiredState::from_entries(
            &prefix,
            flatten(&document, self.config.keep_sequences_as_leaves),
        );
        drop(document);

        for name in desired.collisions() {
            logger.warn(&format!(
                "Parameter {} is produced more than once, the last value wins",
                name
            ));
        }
        logger.info(&format!("Parameters to be set {} keys", desired.len()));

        let path = listing_path(&prefix);
        let existing = fetch_all(self.store.as_ref(), &path).await?;
        logger.info(&format!(
            "Found {} existing parameters under {}",
            existing.len(),
            path
        ));

        let plan = diff(&desired.comparable_values(), &existing);
        logger.debug(&format!(
            "Plan: {} to create, {} to update, {} unchanged, {} not desired",
            plan.created.len(),
            plan.updated.len(),
            plan.unchanged.len(),
            plan.delete_candidates.len()
        ));

        Ok(PlannedSync {
            prefix,
            parameters: desired.into_parameters(),
            existing,
            plan,
        })
    }

    /// Runs a full synchronization.
    ///
    /// Identity, load and fetch failures abort before any write. Write
    /// failures are recorded per key. A failing prune is returned as an
    /// error after all writes have been made.
    pub async fn run(&self, request: &SyncRequest) -> Result<SyncReport> {
        let run_id = Uuid::new_v4().to_string();
        let span = info_span!("sync_run", run_id = %run_id, prefix = %request.prefix);

        self.run_inner(run_id, request).instrument(span).await
    }

    async fn run_inner(&self, run_id: String, request: &SyncRequest) -> Result<SyncReport> {
        let started_at = Utc::now();
        let logger = self.logger.as_ref();

        let planned = self.plan(request).await?;

        let outcomes = ApplyEngine::new(self.store.as_ref(), logger, &self.config)
            .apply(&planned.parameters, &planned.plan)
            .await;

        let mut statistics = SyncStatistics {
            parameters: planned.parameters.len(),
            existing: planned.existing.len(),
            unchanged: planned.plan.unchanged.len(),
            ..SyncStatistics::default()
        };
        for outcome in &outcomes {
            match (outcome.change, outcome.outcome.is_success()) {
                (ChangeKind::Create, true) => statistics.created += 1,
                (ChangeKind::Update, true) => statistics.updated += 1,
                (_, false) => statistics.failed += 1,
            }
        }

        let pruned = if self.config.clean {
            let outcome = prune(
                self.store.as_ref(),
                logger,
                planned.plan.delete_candidates.clone(),
            )
            .await
            .inspect_err(|_| {
                logger.error(&format!(
                    "Pruning failed after {} created and {} updated parameters were saved",
                    statistics.created, statistics.updated
                ));
            })?;
            statistics.deleted = outcome.deleted_count();
            Some(outcome)
        } else {
            if !planned.plan.delete_candidates.is_empty() {
                logger.debug(&format!(
                    "{} parameters are not desired; clean is disabled, keeping them",
                    planned.plan.delete_candidates.len()
                ));
            }
            None
        };

        logger.info(&format!(
            "Synchronized {} parameters to {}: {} created, {} updated, {} unchanged, {} deleted, {} failed",
            statistics.parameters,
            planned.prefix,
            statistics.created,
            statistics.updated,
            statistics.unchanged,
            statistics.deleted,
            statistics.failed
        ));

        Ok(SyncReport {
            run_id,
            prefix: planned.prefix,
            statistics,
            plan: planned.plan,
            outcomes,
            pruned,
            started_at,
            finished_at: Utc::now(),
        })
    }
}
