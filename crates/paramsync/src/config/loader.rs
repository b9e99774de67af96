use std::path::Path;

use crate::config::schema::SyncConfig;
use crate::document::DocumentFormat;
use crate::error::ConfigError;

/// Loads engine options from a YAML or JSON file, chosen by extension.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<SyncConfig, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    let format = DocumentFormat::from_path(path).unwrap_or(DocumentFormat::Yaml);
    load_config_from_str(&content, format)
}

pub fn load_config_from_str(
    content: &str,
    format: DocumentFormat,
) -> Result<SyncConfig, ConfigError> {
    let config: SyncConfig = match format {
        DocumentFormat::Yaml => serde_yaml::from_str(content)?,
        DocumentFormat::Json => serde_json::from_str(content)?,
    };

    validate_config(&config)?;

    Ok(config)
}

pub fn validate_config(config: &SyncConfig) -> Result<(), ConfigError> {
    if config.batch_count == 0 {
        return Err(ConfigError::Validation {
            message: "batchCount must be at least 1".to_string(),
        });
    }

    if config.max_save_attempts == 0 {
        return Err(ConfigError::Validation {
            message: "maxSaveAttempts must be at least 1".to_string(),
        });
    }

    Ok(())
}
