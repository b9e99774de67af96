//! Deletes remote parameters that are no longer desired.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use serde::Serialize;

use crate::error::{Result, SyncError};
use crate::logging::RunLogger;
use crate::store::ParameterStore;

/// Names to delete, normalized from the accepted input shapes.
///
/// Sets and maps contribute their keys in sorted order, sequences keep
/// their order, and strings are split on `,` with empty segments dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PruneTarget {
    names: Vec<String>,
}

impl PruneTarget {
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn into_names(self) -> Vec<String> {
        self.names
    }
}

impl From<Vec<String>> for PruneTarget {
    fn from(names: Vec<String>) -> Self {
        Self { names }
    }
}

impl From<&[&str]> for PruneTarget {
    fn from(names: &[&str]) -> Self {
        Self {
            names: names.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl From<BTreeSet<String>> for PruneTarget {
    fn from(names: BTreeSet<String>) -> Self {
        Self {
            names: names.into_iter().collect(),
        }
    }
}

impl From<HashSet<String>> for PruneTarget {
    fn from(names: HashSet<String>) -> Self {
        Self::from(names.into_iter().collect::<BTreeSet<_>>())
    }
}

impl<V> From<BTreeMap<String, V>> for PruneTarget {
    fn from(map: BTreeMap<String, V>) -> Self {
        Self {
            names: map.into_keys().collect(),
        }
    }
}

impl<V> From<HashMap<String, V>> for PruneTarget {
    fn from(map: HashMap<String, V>) -> Self {
        Self::from(map.into_keys().collect::<BTreeSet<_>>())
    }
}

impl From<&str> for PruneTarget {
    fn from(joined: &str) -> Self {
        Self {
            names: joined
                .split(',')
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }
}

impl From<String> for PruneTarget {
    fn from(joined: String) -> Self {
        Self::from(joined.as_str())
    }
}

impl TryFrom<serde_json::Value> for PruneTarget {
    type Error = SyncError;

    /// Accepts arrays of strings, comma-joined strings and objects (keys).
    fn try_from(value: serde_json::Value) -> Result<Self> {
        use serde_json::Value;

        match value {
            Value::String(joined) => Ok(Self::from(joined)),
            Value::Object(map) => Ok(Self {
                names: map.into_iter().map(|(k, _)| k).collect(),
            }),
            Value::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::String(name) => Ok(name),
                    other => Err(SyncError::InvalidParameterType(format!(
                        "array containing {}",
                        json_type(&other)
                    ))),
                })
                .collect::<Result<Vec<_>>>()
                .map(Self::from),
            other => Err(SyncError::InvalidParameterType(
                json_type(&other).to_string(),
            )),
        }
    }
}

fn json_type(value: &serde_json::Value) -> &'static str {
    use serde_json::Value;

    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Names the store deleted and rejected during a prune.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PruneOutcome {
    pub deleted: Vec<String>,
    pub invalid: Vec<String>,
}

impl PruneOutcome {
    pub fn deleted_count(&self) -> usize {
        self.deleted.len()
    }

    pub fn invalid_count(&self) -> usize {
        self.invalid.len()
    }
}

/// Deletes `target` in one batched call.
///
/// An empty target makes no call. Names rejected by the store are reported,
/// not treated as failures; a failing call is returned as
/// [`SyncError::Delete`].
pub async fn prune(
    store: &dyn ParameterStore,
    logger: &dyn RunLogger,
    target: impl Into<PruneTarget>,
) -> Result<PruneOutcome> {
    let target = target.into();
    if target.is_empty() {
        logger.info("No dead parameters to delete");
        return Ok(PruneOutcome::default());
    }

    logger.info(&format!("Deleting {} dead parameters", target.len()));

    let result = store
        .delete_parameters(target.into_names())
        .await
        .map_err(|e| {
            logger.error(&format!("Failed to delete dead parameters: {}", e));
            SyncError::Delete(e)
        })?;

    logger.info(&format!("DeletedParameters: {}", result.deleted.len()));
    if !result.invalid.is_empty() {
        logger.warn(&format!(
            "InvalidParameters: {} ({})",
            result.invalid.len(),
            result.invalid.join(", ")
        ));
    }

    Ok(PruneOutcome {
        deleted: result.deleted,
        invalid: result.invalid,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::logging::LogBroadcaster;
    use crate::store::InMemoryParameterStore;
    use serde_json::json;

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    async fn seeded_store() -> InMemoryParameterStore {
        let store = InMemoryParameterStore::new();
        store.seed("param1", "value1").await;
        store.seed("param2", "value2").await;
        store
    }

    #[tokio::test]
    async fn test_prune_deletes_given_names() {
        let store = seeded_store().await;
        let logger = LogBroadcaster::default();

        let outcome = prune(&store, &logger, names(&["param1", "param2", "param3"]))
            .await
            .unwrap();

        assert_eq!(outcome.deleted_count(), 2);
        assert_eq!(outcome.invalid, names(&["param3"]));
        assert_eq!(
            store.delete_calls().await,
            vec![names(&["param1", "param2", "param3"])]
        );
    }

    #[tokio::test]
    async fn test_prune_empty_is_noop() {
        let store = seeded_store().await;
        let logger = LogBroadcaster::default();

        let outcome = prune(&store, &logger, Vec::<String>::new()).await.unwrap();

        assert_eq!(outcome.deleted_count(), 0);
        assert!(store.calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_input_shapes_normalize_to_same_call() {
        let mut map = BTreeMap::new();
        map.insert("a".to_string(), 1);
        map.insert("b".to_string(), 2);

        let targets = vec![
            PruneTarget::from("a,b"),
            PruneTarget::from(map),
            PruneTarget::from(names(&["a", "b"])),
            PruneTarget::from(names(&["b", "a"]).into_iter().collect::<BTreeSet<_>>()),
            PruneTarget::try_from(json!(["a", "b"])).unwrap(),
            PruneTarget::try_from(json!({"a": 1, "b": 2})).unwrap(),
        ];

        for target in targets {
            let store = InMemoryParameterStore::new();
            let logger = LogBroadcaster::default();
            prune(&store, &logger, target).await.unwrap();
            assert_eq!(store.delete_calls().await, vec![names(&["a", "b"])]);
        }
    }

    #[test]
    fn test_joined_string_drops_empty_segments() {
        assert_eq!(PruneTarget::from("a,,b,").names(), names(&["a", "b"]).as_slice());
        assert!(PruneTarget::from("").is_empty());
    }

    #[test]
    fn test_rejects_other_shapes() {
        let err = PruneTarget::try_from(json!(123)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid parameter type for delete candidates: number"
        );
        assert!(matches!(
            PruneTarget::try_from(json!(["a", 1])),
            Err(SyncError::InvalidParameterType(_))
        ));
        assert!(PruneTarget::try_from(json!(null)).is_err());
    }

    #[tokio::test]
    async fn test_prune_transport_failure() {
        let store = seeded_store().await;
        store
            .fail_next_delete(StoreError::Transport("SSM API error".to_string()))
            .await;
        let logger = LogBroadcaster::default();

        let err = prune(&store, &logger, names(&["param1", "param2"]))
            .await
            .unwrap_err();

        assert!(matches!(err, SyncError::Delete(_)));
        assert_eq!(store.delete_calls().await.len(), 1);
        assert_eq!(store.get("param1").await.as_deref(), Some("value1"));
    }
}
