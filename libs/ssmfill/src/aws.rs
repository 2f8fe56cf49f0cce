use aws_sdk_ssm::Client;
use aws_sdk_ssm::config::Region;
use aws_sdk_ssm::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_ssm::operation::get_parameter::GetParameterError;
use tokio::runtime::Runtime;

use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::store::ParameterStore;

/// [`ParameterStore`] backed by AWS Systems Manager Parameter Store.
///
/// Every fetch is a blocking `GetParameter` call with decryption enabled,
/// driven on a private single-threaded runtime. Must not be used from within
/// an async context.
pub struct SsmStore {
    client: Client,
    runtime: Runtime,
}

impl std::fmt::Debug for SsmStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SsmStore")
            .field("region", &self.client.config().region())
            .finish()
    }
}

impl SsmStore {
    /// Client configured from the ambient AWS environment.
    pub fn from_env() -> Result<Self, StoreError> {
        Self::from_config(&StoreConfig::default())
    }

    /// Client configured from `config`, falling back to the ambient AWS
    /// environment for anything it leaves unset.
    pub fn from_config(config: &StoreConfig) -> Result<Self, StoreError> {
        let runtime = build_runtime()?;

        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(region) = &config.region {
            loader = loader.region(Region::new(region.clone()));
        }
        if let Some(profile) = &config.profile {
            loader = loader.profile_name(profile);
        }
        if let Some(endpoint) = &config.endpoint_url {
            loader = loader.endpoint_url(endpoint);
        }
        let sdk_config = runtime.block_on(loader.load());

        tracing::info!(
            region = ?sdk_config.region(),
            profile = ?config.profile,
            endpoint = ?config.endpoint_url,
            "built SSM client"
        );
        Ok(Self {
            client: Client::new(&sdk_config),
            runtime,
        })
    }

    /// Wrap an existing client, e.g. one shared with other services.
    pub fn with_client(client: Client) -> Result<Self, StoreError> {
        Ok(Self {
            client,
            runtime: build_runtime()?,
        })
    }

    pub fn client(&self) -> &Client {
        &self.client
    }
}

impl ParameterStore for SsmStore {
    fn fetch(&self, key: &str) -> Result<String, StoreError> {
        let request = self
            .client
            .get_parameter()
            .name(key)
            .with_decryption(true)
            .send();
        let output = self
            .runtime
            .block_on(request)
            .map_err(|e| classify(key, e))?;

        output
            .parameter()
            .and_then(|p| p.value())
            .map(str::to_owned)
            .ok_or_else(|| StoreError::MissingValue {
                key: key.to_string(),
            })
    }
}

fn build_runtime() -> Result<Runtime, StoreError> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| StoreError::Client(format!("failed to start runtime: {e}")))
}

fn classify(key: &str, err: SdkError<GetParameterError>) -> StoreError {
    let key = key.to_string();
    match err {
        SdkError::ServiceError(ctx) => {
            let err = ctx.into_err();
            if err.is_parameter_not_found() {
                StoreError::NotFound { key }
            } else if err.code() == Some("AccessDeniedException") {
                StoreError::AccessDenied {
                    key,
                    message: err.message().unwrap_or("access denied").to_string(),
                }
            } else {
                StoreError::Service {
                    key,
                    message: DisplayErrorContext(&err).to_string(),
                }
            }
        }
        other => StoreError::Transport {
            key,
            message: DisplayErrorContext(&other).to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use aws_sdk_ssm::error::ErrorMetadata;
    use aws_sdk_ssm::operation::get_parameter::GetParameterOutput;
    use aws_sdk_ssm::types::Parameter;
    use aws_sdk_ssm::types::error::{InternalServerError, ParameterNotFound};
    use aws_smithy_mocks::{mock, mock_client};

    use super::*;

    const KEY: &str = "/app/db/password";

    #[test]
    fn fetch_requests_decryption() {
        let rule = mock!(aws_sdk_ssm::Client::get_parameter)
            .match_requests(|req| req.name() == Some(KEY) && req.with_decryption() == Some(true))
            .then_output(|| {
                GetParameterOutput::builder()
                    .parameter(Parameter::builder().name(KEY).value("s3cret").build())
                    .build()
            });
        let store = SsmStore::with_client(mock_client!(aws_sdk_ssm, [&rule])).unwrap();

        assert_eq!(store.fetch(KEY).unwrap(), "s3cret");
        assert_eq!(rule.num_calls(), 1);
    }

    #[test]
    fn response_without_value_is_missing_value() {
        let rule = mock!(aws_sdk_ssm::Client::get_parameter)
            .then_output(|| GetParameterOutput::builder().build());
        let store = SsmStore::with_client(mock_client!(aws_sdk_ssm, [&rule])).unwrap();

        let err = store.fetch(KEY).unwrap_err();
        assert!(matches!(err, StoreError::MissingValue { ref key } if key == KEY), "{err}");
    }

    #[test]
    fn parameter_not_found_maps_to_not_found() {
        let rule = mock!(aws_sdk_ssm::Client::get_parameter).then_error(|| {
            GetParameterError::ParameterNotFound(ParameterNotFound::builder().build())
        });
        let store = SsmStore::with_client(mock_client!(aws_sdk_ssm, [&rule])).unwrap();

        let err = store.fetch(KEY).unwrap_err();
        assert!(matches!(err, StoreError::NotFound { ref key } if key == KEY), "{err}");
    }

    #[test]
    fn access_denied_code_maps_to_access_denied() {
        let rule = mock!(aws_sdk_ssm::Client::get_parameter).then_error(|| {
            GetParameterError::generic(
                ErrorMetadata::builder()
                    .code("AccessDeniedException")
                    .message("not allowed")
                    .build(),
            )
        });
        let store = SsmStore::with_client(mock_client!(aws_sdk_ssm, [&rule])).unwrap();

        match store.fetch(KEY).unwrap_err() {
            StoreError::AccessDenied { key, message } => {
                assert_eq!(key, KEY);
                assert_eq!(message, "not allowed");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn other_service_errors_map_to_service() {
        let rule = mock!(aws_sdk_ssm::Client::get_parameter).then_error(|| {
            GetParameterError::InternalServerError(
                InternalServerError::builder().message("boom").build(),
            )
        });
        let store = SsmStore::with_client(mock_client!(aws_sdk_ssm, [&rule])).unwrap();

        let err = store.fetch(KEY).unwrap_err();
        assert!(matches!(err, StoreError::Service { ref key, .. } if key == KEY), "{err}");
    }

    #[test]
    fn dispatch_failures_map_to_transport() {
        let err = classify(KEY, SdkError::timeout_error("took too long"));
        assert!(matches!(err, StoreError::Transport { ref key, .. } if key == KEY), "{err}");
        assert_eq!(err.key(), Some(KEY));
    }
}
