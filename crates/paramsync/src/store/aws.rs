//! AWS Systems Manager Parameter Store and STS backends.
//!
//! Uses the official SDK crates with either the default credential chain
//! or explicit keys from [`AwsConnection`].

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_sdk_ssm::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_ssm::types::ParameterType;
use secrecy::ExposeSecret;

use super::{
    DeleteResult, IdentityService, ListParametersRequest, ParameterKind, ParameterPage,
    ParameterStore, PutParameterRequest, RemoteParameter,
};
use crate::config::AwsConnection;
use crate::error::{classify_service_error, StoreError};

/// Maximum names accepted by one `DeleteParameters` call.
const DELETE_CHUNK_SIZE: usize = 10;

/// Builds the shared SDK configuration for `connection`.
pub async fn aws_sdk_config(connection: &AwsConnection) -> SdkConfig {
    let mut builder = aws_config::defaults(BehaviorVersion::latest());

    if let Some(region) = &connection.region {
        builder = builder.region(Region::new(region.clone()));
    }

    if let (Some(access_key), Some(secret_key)) = (
        connection.access_key_id.as_ref(),
        connection.secret_access_key(),
    ) {
        let credentials = aws_sdk_ssm::config::Credentials::new(
            access_key,
            secret_key.expose_secret(),
            None,
            None,
            "paramsync-explicit",
        );
        builder = builder.credentials_provider(credentials);
    }

    let config = builder.load().await;

    tracing::info!(
        region = ?config.region().map(|r| r.as_ref().to_string()),
        explicit_creds = connection.has_explicit_credentials(),
        "AWS SDK configuration loaded"
    );

    config
}

fn store_error<E>(err: SdkError<E>) -> StoreError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
{
    match err.as_service_error() {
        Some(service) => {
            classify_service_error(service.code(), service.message().unwrap_or_default())
        }
        None => StoreError::Transport(DisplayErrorContext(&err).to_string()),
    }
}

fn parameter_type(kind: ParameterKind) -> ParameterType {
    match kind {
        ParameterKind::String => ParameterType::String,
        ParameterKind::StringList => ParameterType::StringList,
    }
}

/// Parameter store backed by AWS Systems Manager.
#[derive(Debug, Clone)]
pub struct SsmParameterStore {
    client: aws_sdk_ssm::Client,
}

impl SsmParameterStore {
    pub fn new(config: &SdkConfig) -> Self {
        Self::from_client(aws_sdk_ssm::Client::new(config))
    }

    pub fn from_client(client: aws_sdk_ssm::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ParameterStore for SsmParameterStore {
    async fn put_parameter(&self, request: PutParameterRequest) -> Result<(), StoreError> {
        self.client
            .put_parameter()
            .name(request.name)
            .value(request.value)
            .r#type(parameter_type(request.kind))
            .overwrite(request.overwrite)
            .send()
            .await
            .map_err(store_error)?;
        Ok(())
    }

    async fn list_by_prefix(
        &self,
        request: ListParametersRequest,
    ) -> Result<ParameterPage, StoreError> {
        let output = self
            .client
            .get_parameters_by_path()
            .path(request.path)
            .recursive(request.recursive)
            .with_decryption(request.with_decryption)
            .set_next_token(request.next_token)
            .send()
            .await
            .map_err(store_error)?;

        let parameters = output
            .parameters()
            .iter()
            .filter_map(|p| {
                Some(RemoteParameter {
                    name: p.name()?.to_string(),
                    value: p.value().unwrap_or_default().to_string(),
                })
            })
            .collect();

        Ok(ParameterPage {
            parameters,
            next_token: output.next_token().map(str::to_string),
        })
    }

    async fn delete_parameters(&self, names: Vec<String>) -> Result<DeleteResult, StoreError> {
        let mut result = DeleteResult::default();

        for chunk in names.chunks(DELETE_CHUNK_SIZE) {
            let output = self
                .client
                .delete_parameters()
                .set_names(Some(chunk.to_vec()))
                .send()
                .await
                .map_err(store_error)?;

            result
                .deleted
                .extend(output.deleted_parameters().iter().cloned());
            result
                .invalid
                .extend(output.invalid_parameters().iter().cloned());
        }

        Ok(result)
    }
}

/// Identity service returning the AWS account id of the caller.
#[derive(Debug, Clone)]
pub struct StsIdentityService {
    client: aws_sdk_sts::Client,
}

impl StsIdentityService {
    pub fn new(config: &SdkConfig) -> Self {
        Self::from_client(aws_sdk_sts::Client::new(config))
    }

    pub fn from_client(client: aws_sdk_sts::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl IdentityService for StsIdentityService {
    async fn caller_identity(&self) -> Result<String, StoreError> {
        let output = self
            .client
            .get_caller_identity()
            .send()
            .await
            .map_err(store_error)?;

        output
            .account()
            .map(str::to_string)
            .ok_or_else(|| StoreError::Service("GetCallerIdentity returned no account".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameter_type_mapping() {
        assert_eq!(parameter_type(ParameterKind::String), ParameterType::String);
        assert_eq!(
            parameter_type(ParameterKind::StringList),
            ParameterType::StringList
        );
    }
}
