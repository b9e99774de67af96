//! Remote parameter store and identity capabilities.
//!
//! The reconciliation engine only talks to these traits. Shipped backends:
//! - [`memory::InMemoryParameterStore`] for tests and dry runs
//! - `aws::SsmParameterStore` / `aws::StsIdentityService` (feature `aws`)

#[cfg(feature = "aws")]
pub mod aws;
pub mod memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

pub use memory::{InMemoryParameterStore, StaticIdentity, StoreCall};

/// Type under which a parameter is stored remotely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParameterKind {
    String,
    StringList,
}

impl ParameterKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterKind::String => "String",
            ParameterKind::StringList => "StringList",
        }
    }
}

/// A single write of one parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutParameterRequest {
    pub name: String,
    pub value: String,
    pub kind: ParameterKind,
    pub overwrite: bool,
}

impl PutParameterRequest {
    /// Creates an overwriting write request.
    pub fn new(name: impl Into<String>, value: impl Into<String>, kind: ParameterKind) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            kind,
            overwrite: true,
        }
    }
}

/// One page of a "list by prefix" request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListParametersRequest {
    pub path: String,
    pub recursive: bool,
    pub with_decryption: bool,
    pub next_token: Option<String>,
}

impl ListParametersRequest {
    /// Recursive, decrypted listing of `path`, starting at `next_token`.
    pub fn recursive(path: impl Into<String>, next_token: Option<String>) -> Self {
        Self {
            path: path.into(),
            recursive: true,
            with_decryption: true,
            next_token,
        }
    }
}

/// A parameter as stored remotely. Values are always strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteParameter {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterPage {
    pub parameters: Vec<RemoteParameter>,
    /// Continuation token; `None` on the last page.
    pub next_token: Option<String>,
}

/// Result of a batched delete.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteResult {
    pub deleted: Vec<String>,
    /// Names the store rejected (non-existent or malformed).
    pub invalid: Vec<String>,
}

/// Flat, remote key-value parameter store.
#[async_trait]
pub trait ParameterStore: Send + Sync {
    /// Writes one parameter.
    async fn put_parameter(&self, request: PutParameterRequest) -> Result<(), StoreError>;

    /// Returns one page of parameters under a path.
    async fn list_by_prefix(
        &self,
        request: ListParametersRequest,
    ) -> Result<ParameterPage, StoreError>;

    /// Deletes parameters by name in a single call.
    async fn delete_parameters(&self, names: Vec<String>) -> Result<DeleteResult, StoreError>;
}

/// Resolves the identity the store credentials belong to.
#[async_trait]
pub trait IdentityService: Send + Sync {
    async fn caller_identity(&self) -> Result<String, StoreError>;
}
