//! Classifies desired parameters against the remote snapshot.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use super::flatten::{FlatEntry, LeafValue};
use super::keys::to_external_key;

/// A parameter the run wants to exist, in document order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DesiredParameter {
    pub name: String,
    pub value: LeafValue,
}

/// Desired parameters keyed by external name, in traversal order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DesiredState {
    parameters: Vec<DesiredParameter>,
    /// Names produced more than once by flattening.
    collisions: Vec<String>,
}

impl DesiredState {
    /// Maps flattened entries under `prefix`.
    ///
    /// Entries that map to an already produced name replace its value and
    /// keep its position.
    pub fn from_entries(prefix: &str, entries: Vec<FlatEntry>) -> Self {
        let mut parameters: Vec<DesiredParameter> = Vec::with_capacity(entries.len());
        let mut positions: BTreeMap<String, usize> = BTreeMap::new();
        let mut collisions = Vec::new();

        for entry in entries {
            let name = to_external_key(prefix, &entry.path);
            match positions.get(&name) {
                Some(&index) => {
                    parameters[index].value = entry.value;
                    collisions.push(name);
                }
                None => {
                    positions.insert(name.clone(), parameters.len());
                    parameters.push(DesiredParameter {
                        name,
                        value: entry.value,
                    });
                }
            }
        }

        Self {
            parameters,
            collisions,
        }
    }

    pub fn parameters(&self) -> &[DesiredParameter] {
        &self.parameters
    }

    pub fn collisions(&self) -> &[String] {
        &self.collisions
    }

    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    /// Comparable string form of every desired parameter.
    pub fn comparable_values(&self) -> BTreeMap<String, String> {
        self.parameters
            .iter()
            .map(|p| (p.name.clone(), p.value.comparable()))
            .collect()
    }

    pub fn into_parameters(self) -> Vec<DesiredParameter> {
        self.parameters
    }
}

/// Outcome of comparing desired and remote state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationPlan {
    pub created: BTreeSet<String>,
    pub updated: BTreeSet<String>,
    pub unchanged: BTreeSet<String>,
    /// Remote names with no desired counterpart.
    pub delete_candidates: BTreeSet<String>,
}

impl ReconciliationPlan {
    /// True if `name` has to be written.
    pub fn requires_write(&self, name: &str) -> bool {
        self.created.contains(name) || self.updated.contains(name)
    }

    pub fn is_create(&self, name: &str) -> bool {
        self.created.contains(name)
    }

    /// Number of parameters to write.
    pub fn change_count(&self) -> usize {
        self.created.len() + self.updated.len()
    }

    /// Number of desired parameters covered by the plan.
    pub fn desired_count(&self) -> usize {
        self.change_count() + self.unchanged.len()
    }
}

/// Compares desired comparable values against remote values.
///
/// Equality is exact string equality. The result does not depend on the
/// iteration order of either input.
pub fn diff<'a, D>(desired: D, remote: &BTreeMap<String, String>) -> ReconciliationPlan
where
    D: IntoIterator<Item = (&'a String, &'a String)>,
{
    let mut plan = ReconciliationPlan::default();
    let mut desired_names = BTreeSet::new();

    for (name, value) in desired {
        desired_names.insert(name.as_str());
        match remote.get(name) {
            None => {
                plan.created.insert(name.clone());
            }
            Some(existing) if existing == value => {
                plan.unchanged.insert(name.clone());
            }
            Some(_) => {
                plan.updated.insert(name.clone());
            }
        }
    }

    plan.delete_candidates = remote
        .keys()
        .filter(|name| !desired_names.contains(name.as_str()))
        .cloned()
        .collect();

    plan
}
