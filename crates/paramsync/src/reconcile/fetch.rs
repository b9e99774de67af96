//! Snapshot of the remote parameters under a path.

use std::collections::BTreeMap;

use crate::error::{Result, SyncError};
use crate::store::{ListParametersRequest, ParameterStore};

/// Fetches every parameter under `path`, following continuation tokens.
///
/// A failing page fails the whole fetch; earlier pages are discarded.
pub async fn fetch_all(store: &dyn ParameterStore, path: &str) -> Result<BTreeMap<String, String>> {
    let mut parameters = BTreeMap::new();
    let mut next_token: Option<String> = None;
    let mut pages = 0usize;

    loop {
        let page = store
            .list_by_prefix(ListParametersRequest::recursive(path, next_token.take()))
            .await
            .map_err(|source| SyncError::Fetch {
                path: path.to_string(),
                source,
            })?;
        pages += 1;

        tracing::debug!(
            path = %path,
            page = pages,
            count = page.parameters.len(),
            "Fetched parameter page"
        );

        for parameter in page.parameters {
            parameters.insert(parameter.name, parameter.value);
        }

        match page.next_token {
            Some(token) => next_token = Some(token),
            None => break,
        }
    }

    Ok(parameters)
}
