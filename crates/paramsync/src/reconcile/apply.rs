//! Applies planned creates and updates, one key at a time.

use std::time::Duration;

use serde::Serialize;

use super::diff::{DesiredParameter, ReconciliationPlan};
use super::flatten::LeafValue;
use super::retry::{RetryDecision, RetryPolicy};
use crate::config::SyncConfig;
use crate::logging::RunLogger;
use crate::store::{ParameterKind, ParameterStore, PutParameterRequest};

/// Result of applying one parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "camelCase")]
pub enum ApplyOutcome {
    Succeeded,
    /// The value has no remote representation; nothing was sent.
    InvalidValue(String),
    /// The store rejected the write with a non-retryable error.
    FailedPermanently(String),
    /// Every allowed attempt was rate limited.
    FailedAfterRetries(String),
}

impl ApplyOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ApplyOutcome::Succeeded)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ChangeKind {
    Create,
    Update,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyOutcome {
    pub name: String,
    pub change: ChangeKind,
    /// Write calls made for this key.
    pub attempts: u32,
    pub outcome: ApplyOutcome,
}

/// Builds the write request for a desired parameter.
///
/// Lists become `StringList` parameters joined with `,`; text and numbers
/// become `String` parameters. Other values have no representation.
pub fn put_request(parameter: &DesiredParameter) -> Result<PutParameterRequest, String> {
    let name = parameter.name.as_str();
    match &parameter.value {
        LeafValue::List(items) => Ok(PutParameterRequest::new(
            name,
            items.join(","),
            ParameterKind::StringList,
        )),
        LeafValue::Text(text) => Ok(PutParameterRequest::new(
            name,
            text.as_str(),
            ParameterKind::String,
        )),
        LeafValue::Number(n) => Ok(PutParameterRequest::new(
            name,
            n.to_string(),
            ParameterKind::String,
        )),
        other => Err(format!(
            "Invalid parameter value for {}: {} values are not supported",
            name,
            other.kind()
        )),
    }
}

/// Writes planned changes with per-key retries and flat-rate pacing.
pub struct ApplyEngine<'a> {
    store: &'a dyn ParameterStore,
    logger: &'a dyn RunLogger,
    policy: RetryPolicy,
    batch_count: usize,
    pause: Duration,
}

impl<'a> ApplyEngine<'a> {
    pub fn new(
        store: &'a dyn ParameterStore,
        logger: &'a dyn RunLogger,
        config: &SyncConfig,
    ) -> Self {
        Self {
            store,
            logger,
            policy: RetryPolicy::from_config(config),
            batch_count: config.batch_count.max(1),
            pause: config.pause_time(),
        }
    }

    /// Applies every parameter the plan marks as created or updated, in
    /// the order of `parameters`.
    ///
    /// Failures are recorded per key and never stop the remaining keys.
    pub async fn apply(
        &self,
        parameters: &[DesiredParameter],
        plan: &ReconciliationPlan,
    ) -> Vec<KeyOutcome> {
        let mut outcomes = Vec::with_capacity(plan.change_count());

        for parameter in parameters.iter().filter(|p| plan.requires_write(&p.name)) {
            if !outcomes.is_empty() && outcomes.len() % self.batch_count == 0 {
                self.logger.debug(&format!(
                    "Processed {} parameters, pausing for {}ms",
                    outcomes.len(),
                    self.pause.as_millis()
                ));
                tokio::time::sleep(self.pause).await;
            }

            let change = if plan.is_create(&parameter.name) {
                ChangeKind::Create
            } else {
                ChangeKind::Update
            };

            let (outcome, attempts) = self.write(parameter).await;
            match &outcome {
                ApplyOutcome::Succeeded => {
                    self.logger.info(&format!("Saved parameter {}", parameter.name));
                }
                ApplyOutcome::InvalidValue(reason)
                | ApplyOutcome::FailedPermanently(reason)
                | ApplyOutcome::FailedAfterRetries(reason) => {
                    self.logger.error(&format!(
                        "Failed to save parameter {}: {}",
                        parameter.name, reason
                    ));
                }
            }

            outcomes.push(KeyOutcome {
                name: parameter.name.clone(),
                change,
                attempts,
                outcome,
            });
        }

        outcomes
    }

    /// Writes one parameter, retrying rate-limited attempts.
    ///
    /// Returns the outcome and the number of write calls made.
    pub async fn write(&self, parameter: &DesiredParameter) -> (ApplyOutcome, u32) {
        let request = match put_request(parameter) {
            Ok(request) => request,
            Err(reason) => return (ApplyOutcome::InvalidValue(reason), 0),
        };

        let mut attempt = 0u32;
        loop {
            let error = match self.store.put_parameter(request.clone()).await {
                Ok(()) => return (ApplyOutcome::Succeeded, attempt + 1),
                Err(error) => error,
            };

            match self.policy.decide(attempt, &error) {
                RetryDecision::Retry(delay) => {
                    self.logger.warn(&format!(
                        "Rate limited saving {} (attempt {}/{}), retrying in {}ms",
                        parameter.name,
                        attempt + 1,
                        self.policy.max_attempts(),
                        delay.as_millis()
                    ));
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                RetryDecision::GiveUp if error.is_rate_limited() => {
                    return (
                        ApplyOutcome::FailedAfterRetries(format!(
                            "gave up after {} attempts: {}",
                            attempt + 1,
                            error
                        )),
                        attempt + 1,
                    );
                }
                RetryDecision::GiveUp => {
                    return (ApplyOutcome::FailedPermanently(error.to_string()), attempt + 1);
                }
            }
        }
    }
}
