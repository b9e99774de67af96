use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors that abort a synchronization run.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("The caller identity ({actual}) does not match the expected identity ({expected})")]
    IdentityMismatch { actual: String, expected: String },

    #[error("Failed to resolve the caller identity: {0}")]
    IdentityCheck(#[source] StoreError),

    #[error("Failed to load document: {0}")]
    Load(#[from] LoadError),

    #[error("Failed to get existing parameters under '{path}': {source}")]
    Fetch {
        path: String,
        #[source]
        source: StoreError,
    },

    #[error("Invalid parameter type for delete candidates: {0}")]
    InvalidParameterType(String),

    #[error("Failed to delete dead parameters: {0}")]
    Delete(#[source] StoreError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Document path not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read document '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to walk document directory '{path}': {source}")]
    ReadDirectory {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Failed to parse YAML in '{path}': {message}")]
    ParseYaml { path: PathBuf, message: String },

    #[error("Failed to parse JSON in '{path}': {message}")]
    ParseJson { path: PathBuf, message: String },

    #[error("Unsupported document format: {0}")]
    UnsupportedFormat(PathBuf),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config YAML: {0}")]
    ParseYaml(#[from] serde_yaml::Error),

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },
}

/// Failures reported by the remote parameter store or identity service.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Service error: {0}")]
    Service(String),

    #[error("Transport error: {0}")]
    Transport(String),
}

impl StoreError {
    /// Returns true if the request was throttled and may succeed when retried later.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, StoreError::RateLimited(_))
    }
}

/// Classifies a service error code and message into a store error variant.
pub fn classify_service_error(code: Option<&str>, message: &str) -> StoreError {
    let code = code.unwrap_or_default();
    let lower = message.to_lowercase();

    if matches!(
        code,
        "ThrottlingException" | "TooManyUpdates" | "TooManyRequestsException" | "Throttling"
    ) || lower.contains("rate exceeded")
        || lower.contains("too many updates")
        || lower.contains("throttl")
    {
        return StoreError::RateLimited(message.trim().to_string());
    }

    if code.is_empty() {
        return StoreError::Transport(message.trim().to_string());
    }

    StoreError::Service(format!("{}: {}", code, message.trim()))
}

pub type Result<T> = std::result::Result<T, SyncError>;
