use std::time::Duration;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

/// Options recognized by the synchronization engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncConfig {
    /// Delete remote parameters under the prefix that are no longer desired.
    #[serde(default)]
    pub clean: bool,
    /// Number of processed keys between pacing pauses.
    #[serde(default = "default_batch_count")]
    pub batch_count: usize,
    /// Pacing pause and base retry backoff, in milliseconds.
    #[serde(default = "default_pause_time_ms")]
    pub pause_time_ms: u64,
    /// Write attempts per key, including the first one.
    #[serde(default = "default_max_save_attempts")]
    pub max_save_attempts: u32,
    /// Store sequences as one list parameter instead of one parameter per element.
    #[serde(default = "default_true")]
    pub keep_sequences_as_leaves: bool,
    /// Connection settings for the AWS backend.
    #[serde(default)]
    pub aws: Option<AwsConnection>,
}

fn default_batch_count() -> usize {
    20
}

fn default_pause_time_ms() -> u64 {
    1500
}

fn default_max_save_attempts() -> u32 {
    5
}

fn default_true() -> bool {
    true
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            clean: false,
            batch_count: default_batch_count(),
            pause_time_ms: default_pause_time_ms(),
            max_save_attempts: default_max_save_attempts(),
            keep_sequences_as_leaves: true,
            aws: None,
        }
    }
}

impl SyncConfig {
    pub fn pause_time(&self) -> Duration {
        Duration::from_millis(self.pause_time_ms)
    }

    pub fn with_clean(mut self, clean: bool) -> Self {
        self.clean = clean;
        self
    }

    pub fn with_batch_count(mut self, batch_count: usize) -> Self {
        self.batch_count = batch_count;
        self
    }

    pub fn with_pause_time_ms(mut self, pause_time_ms: u64) -> Self {
        self.pause_time_ms = pause_time_ms;
        self
    }

    pub fn with_max_save_attempts(mut self, max_save_attempts: u32) -> Self {
        self.max_save_attempts = max_save_attempts;
        self
    }
}

/// Region and optional explicit credentials for the AWS backend.
///
/// Without explicit keys the default AWS credential chain is used.
#[derive(Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AwsConnection {
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub access_key_id: Option<String>,
    #[serde(default, skip_serializing)]
    secret_access_key: Option<String>,
}

impl AwsConnection {
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: Some(region.into()),
            ..Self::default()
        }
    }

    pub fn with_credentials(
        mut self,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
    ) -> Self {
        self.access_key_id = Some(access_key_id.into());
        self.secret_access_key = Some(secret_access_key.into());
        self
    }

    pub fn secret_access_key(&self) -> Option<SecretString> {
        self.secret_access_key
            .as_ref()
            .map(|s| SecretString::from(s.clone()))
    }

    /// True when both an access key id and a secret are configured.
    pub fn has_explicit_credentials(&self) -> bool {
        self.access_key_id.is_some() && self.secret_access_key.is_some()
    }
}

impl std::fmt::Debug for AwsConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AwsConnection")
            .field("region", &self.region)
            .field("access_key_id", &self.access_key_id)
            .field(
                "secret_access_key",
                &self.secret_access_key.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}
