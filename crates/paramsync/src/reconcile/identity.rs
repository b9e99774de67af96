//! Precondition check on the identity the store credentials belong to.

use crate::error::{Result, SyncError};
use crate::logging::RunLogger;
use crate::store::IdentityService;

/// Fails unless the caller identity equals `expected`.
pub async fn verify_identity(
    service: &dyn IdentityService,
    logger: &dyn RunLogger,
    expected: &str,
) -> Result<()> {
    logger.info(&format!(
        "Checking the caller identity against the expected identity ({})...",
        expected
    ));

    let actual = service.caller_identity().await.map_err(|e| {
        logger.error(&format!("Failed to resolve the caller identity: {}", e));
        SyncError::IdentityCheck(e)
    })?;

    if actual != expected {
        let err = SyncError::IdentityMismatch {
            actual,
            expected: expected.to_string(),
        };
        logger.error(&err.to_string());
        return Err(err);
    }

    logger.info(&format!(
        "The caller identity matches the expected identity ({})",
        expected
    ));
    Ok(())
}
