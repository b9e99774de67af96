//! In-memory parameter store used for dry runs and tests.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{
    DeleteResult, IdentityService, ListParametersRequest, ParameterKind, ParameterPage,
    ParameterStore, PutParameterRequest, RemoteParameter,
};
use crate::error::StoreError;

const DEFAULT_PAGE_SIZE: usize = 10;

/// A call received by [`InMemoryParameterStore`], in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    Put(PutParameterRequest),
    List(ListParametersRequest),
    Delete(Vec<String>),
}

#[derive(Debug, Clone)]
struct StoredParameter {
    value: String,
    kind: ParameterKind,
}

#[derive(Debug, Default)]
struct MemoryState {
    parameters: BTreeMap<String, StoredParameter>,
    put_failures: HashMap<String, VecDeque<StoreError>>,
    list_failures: HashMap<usize, StoreError>,
    delete_failure: Option<StoreError>,
    calls: Vec<StoreCall>,
}

/// Parameter store held entirely in memory.
///
/// Listing is paginated with `page_size` entries per page, and failures can
/// be scripted per key, per page or for the next delete.
#[derive(Debug)]
pub struct InMemoryParameterStore {
    state: Mutex<MemoryState>,
    page_size: usize,
}

impl Default for InMemoryParameterStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryParameterStore {
    pub fn new() -> Self {
        Self::with_page_size(DEFAULT_PAGE_SIZE)
    }

    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            state: Mutex::new(MemoryState::default()),
            page_size: page_size.max(1),
        }
    }

    /// Stores a parameter without recording a call.
    pub async fn seed(&self, name: impl Into<String>, value: impl Into<String>) {
        self.state.lock().await.parameters.insert(
            name.into(),
            StoredParameter {
                value: value.into(),
                kind: ParameterKind::String,
            },
        );
    }

    /// Makes the next writes of `name` fail with `errors`, one per attempt.
    pub async fn fail_puts(&self, name: impl Into<String>, errors: Vec<StoreError>) {
        self.state
            .lock()
            .await
            .put_failures
            .entry(name.into())
            .or_default()
            .extend(errors);
    }

    /// Makes the listing request for the zero-based `page` fail.
    pub async fn fail_list_page(&self, page: usize, error: StoreError) {
        self.state.lock().await.list_failures.insert(page, error);
    }

    /// Makes the next delete call fail.
    pub async fn fail_next_delete(&self, error: StoreError) {
        self.state.lock().await.delete_failure = Some(error);
    }

    pub async fn get(&self, name: &str) -> Option<String> {
        self.state
            .lock()
            .await
            .parameters
            .get(name)
            .map(|p| p.value.clone())
    }

    pub async fn kind_of(&self, name: &str) -> Option<ParameterKind> {
        self.state.lock().await.parameters.get(name).map(|p| p.kind)
    }

    /// All stored parameters by name.
    pub async fn snapshot(&self) -> BTreeMap<String, String> {
        self.state
            .lock()
            .await
            .parameters
            .iter()
            .map(|(k, v)| (k.clone(), v.value.clone()))
            .collect()
    }

    pub async fn calls(&self) -> Vec<StoreCall> {
        self.state.lock().await.calls.clone()
    }

    /// Number of write attempts received, including failed ones.
    pub async fn put_count(&self) -> usize {
        self.state
            .lock()
            .await
            .calls
            .iter()
            .filter(|c| matches!(c, StoreCall::Put(_)))
            .count()
    }

    pub async fn delete_calls(&self) -> Vec<Vec<String>> {
        self.state
            .lock()
            .await
            .calls
            .iter()
            .filter_map(|c| match c {
                StoreCall::Delete(names) => Some(names.clone()),
                _ => None,
            })
            .collect()
    }
}

/// Returns true if `name` lies under `path`, directly when not recursive.
fn under_path(name: &str, path: &str, recursive: bool) -> bool {
    let base = if path.ends_with('/') {
        path.to_string()
    } else {
        format!("{}/", path)
    };

    match name.strip_prefix(base.as_str()) {
        Some(rest) if !rest.is_empty() => recursive || !rest.contains('/'),
        _ => false,
    }
}

#[async_trait]
impl ParameterStore for InMemoryParameterStore {
    async fn put_parameter(&self, request: PutParameterRequest) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        state.calls.push(StoreCall::Put(request.clone()));

        if let Some(error) = state
            .put_failures
            .get_mut(&request.name)
            .and_then(|queue| queue.pop_front())
        {
            return Err(error);
        }

        if !request.overwrite && state.parameters.contains_key(&request.name) {
            return Err(StoreError::Service(format!(
                "ParameterAlreadyExists: {}",
                request.name
            )));
        }

        state.parameters.insert(
            request.name,
            StoredParameter {
                value: request.value,
                kind: request.kind,
            },
        );
        Ok(())
    }

    async fn list_by_prefix(
        &self,
        request: ListParametersRequest,
    ) -> Result<ParameterPage, StoreError> {
        let mut state = self.state.lock().await;
        state.calls.push(StoreCall::List(request.clone()));

        let offset = match &request.next_token {
            Some(token) => token
                .parse::<usize>()
                .map_err(|_| StoreError::Service(format!("InvalidNextToken: {}", token)))?,
            None => 0,
        };

        let page_index = offset / self.page_size;
        if let Some(error) = state.list_failures.remove(&page_index) {
            return Err(error);
        }

        let matching: Vec<RemoteParameter> = state
            .parameters
            .iter()
            .filter(|(name, _)| under_path(name, &request.path, request.recursive))
            .map(|(name, p)| RemoteParameter {
                name: name.clone(),
                value: p.value.clone(),
            })
            .collect();

        let end = (offset + self.page_size).min(matching.len());
        let parameters = matching.get(offset..end).unwrap_or_default().to_vec();
        let next_token = (end < matching.len()).then(|| end.to_string());

        Ok(ParameterPage {
            parameters,
            next_token,
        })
    }

    async fn delete_parameters(&self, names: Vec<String>) -> Result<DeleteResult, StoreError> {
        let mut state = self.state.lock().await;
        state.calls.push(StoreCall::Delete(names.clone()));

        if let Some(error) = state.delete_failure.take() {
            return Err(error);
        }

        let mut result = DeleteResult::default();
        for name in names {
            if state.parameters.remove(&name).is_some() {
                result.deleted.push(name);
            } else {
                result.invalid.push(name);
            }
        }
        Ok(result)
    }
}

/// Identity service answering with a fixed identity or error.
#[derive(Debug)]
pub struct StaticIdentity {
    identity: Result<String, StoreError>,
    calls: AtomicUsize,
}

impl StaticIdentity {
    pub fn new(identity: impl Into<String>) -> Self {
        Self {
            identity: Ok(identity.into()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(error: StoreError) -> Self {
        Self {
            identity: Err(error),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityService for StaticIdentity {
    async fn caller_identity(&self) -> Result<String, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.identity.clone()
    }
}
