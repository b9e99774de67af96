//! Test harness for isolated synchronization runs.
//!
//! The `SyncHarness` struct owns:
//! - A temporary directory for document fixtures
//! - An `InMemoryParameterStore` shared with the synchronizer
//! - A `LogBroadcaster` capturing run logs

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;
use tokio::sync::broadcast::error::TryRecvError;

use paramsync::logging::LogEvent;
use paramsync::store::{InMemoryParameterStore, StaticIdentity};
use paramsync::{LogBroadcaster, SyncConfig, SyncRequest, Synchronizer};

/// Account the harness identity service answers with.
pub const ACCOUNT_ID: &str = "123456789012";

pub struct SyncHarness {
    /// Temporary directory holding document fixtures.
    temp_dir: TempDir,
    /// Directory documents are written to.
    pub documents_dir: PathBuf,
    /// Remote store shared with every synchronizer built by the harness.
    pub store: Arc<InMemoryParameterStore>,
    /// Identity service shared with every synchronizer built by the harness.
    pub identity: Arc<StaticIdentity>,
    /// Captures the run logs.
    pub logs: Arc<LogBroadcaster>,
}

impl SyncHarness {
    /// Create a harness whose identity matches [`ACCOUNT_ID`].
    pub fn new() -> Self {
        Self::with_identity(StaticIdentity::new(ACCOUNT_ID))
    }

    pub fn with_identity(identity: StaticIdentity) -> Self {
        Self::build(identity, InMemoryParameterStore::new())
    }

    /// Create a harness whose store returns `page_size` parameters per page.
    pub fn with_page_size(page_size: usize) -> Self {
        Self::build(
            StaticIdentity::new(ACCOUNT_ID),
            InMemoryParameterStore::with_page_size(page_size),
        )
    }

    fn build(identity: StaticIdentity, store: InMemoryParameterStore) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let documents_dir = temp_dir.path().join("documents");
        std::fs::create_dir_all(&documents_dir).expect("Failed to create documents dir");

        Self {
            temp_dir,
            documents_dir,
            store: Arc::new(store),
            identity: Arc::new(identity),
            logs: Arc::new(LogBroadcaster::default()),
        }
    }

    pub fn temp_path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Write a document fixture relative to the documents directory.
    pub fn write_document(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.documents_dir.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create fixture dir");
        }
        std::fs::write(&path, content).expect("Failed to write document");
        path
    }

    /// Seed the remote store with `(name, value)` pairs.
    pub async fn seed(&self, parameters: &[(&str, &str)]) {
        for (name, value) in parameters {
            self.store.seed(*name, *value).await;
        }
    }

    pub fn synchronizer(&self, config: SyncConfig) -> Synchronizer {
        Synchronizer::new(self.store.clone(), self.identity.clone(), config)
            .with_logger(self.logs.clone())
    }

    pub fn request(&self, source: &Path, prefix: &str) -> SyncRequest {
        SyncRequest::new(source, prefix, ACCOUNT_ID)
    }

    /// Drain the log events captured so far from `receiver`.
    pub fn drain(
        receiver: &mut tokio::sync::broadcast::Receiver<LogEvent>,
    ) -> Vec<LogEvent> {
        let mut events = Vec::new();
        loop {
            match receiver.try_recv() {
                Ok(event) => events.push(event),
                Err(TryRecvError::Lagged(_)) => continue,
                Err(_) => break,
            }
        }
        events
    }
}
