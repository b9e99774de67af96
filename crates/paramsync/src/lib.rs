pub mod config;
pub mod document;
pub mod error;
pub mod logging;
pub mod reconcile;
pub mod store;

pub use config::{load_config, AwsConnection, SyncConfig};
pub use document::{DocumentFormat, DocumentLoader, FsDocumentLoader, StructuredValue};
pub use error::{ConfigError, LoadError, Result, StoreError, SyncError};
pub use logging::{init_tracing, LogBroadcaster, RunLogger, TracingLogger};
pub use reconcile::{
    ApplyOutcome, PruneOutcome, PruneTarget, ReconciliationPlan, SyncReport, SyncRequest,
    SyncStatistics, Synchronizer,
};
pub use store::{IdentityService, InMemoryParameterStore, ParameterStore, StaticIdentity};
