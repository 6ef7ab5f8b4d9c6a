//! Admin user/password authentication against the Cognito identity provider.

use async_trait::async_trait;
use aws_config::{BehaviorVersion, SdkConfig};
use aws_sdk_cognitoidentityprovider::Client;
use aws_sdk_cognitoidentityprovider::config::http::HttpResponse;
use aws_sdk_cognitoidentityprovider::config::retry::RetryConfig;
use aws_sdk_cognitoidentityprovider::config::{self, Region};
use aws_sdk_cognitoidentityprovider::error::{DisplayErrorContext, SdkError};
use aws_sdk_cognitoidentityprovider::operation::admin_initiate_auth::{
    AdminInitiateAuthError, AdminInitiateAuthOutput,
};
use aws_sdk_cognitoidentityprovider::types::AuthFlowType;
use tokio::sync::OnceCell;
use url::Url;

use super::{Credential, CredentialProvider, Secrets};
use crate::context::RequestContext;
use crate::error::{AuthError, TransportError};
use crate::logging::targets;

/// The authentication flow identifier sent with every login.
pub const ADMIN_USER_PASSWORD_AUTH: &str = "ADMIN_USER_PASSWORD_AUTH";

#[derive(Debug, Clone)]
enum ConfigSource {
    Shared(SdkConfig),
    Environment,
}

/// Logs in with the admin user/password flow and returns the identity token.
///
/// One signed `AdminInitiateAuth` call per [`obtain`](CredentialProvider::obtain),
/// with SDK retries disabled and no caching. The SDK client is built on first
/// use, from either a caller-supplied [`SdkConfig`] or the default AWS
/// credential chain.
///
/// # Example
///
/// ```ignore
/// use gql_client::{IdentityServiceProvider, Secrets};
///
/// let provider = IdentityServiceProvider::from_env("eu-west-1")?;
/// let credential = provider.obtain(&ctx, &Secrets::new(client, pool, user, pass)).await?;
/// ```
#[derive(Debug, Clone)]
pub struct IdentityServiceProvider {
    source: ConfigSource,
    region: Option<String>,
    endpoint: Option<String>,
    client: OnceCell<Client>,
}

impl IdentityServiceProvider {
    /// Use a loaded AWS configuration for credentials, region and endpoint.
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            source: ConfigSource::Shared(config.clone()),
            region: None,
            endpoint: None,
            client: OnceCell::new(),
        }
    }

    /// Resolve credentials from the default AWS chain and log in within `region`.
    pub fn from_env(region: &str) -> Result<Self, AuthError> {
        if region.is_empty() {
            return Err(AuthError::MissingParameter("region"));
        }
        Ok(Self {
            source: ConfigSource::Environment,
            region: Some(region.to_string()),
            endpoint: None,
            client: OnceCell::new(),
        })
    }

    /// Override the region taken from the configuration.
    pub fn with_region(mut self, region: &str) -> Self {
        if !region.is_empty() {
            self.region = Some(region.to_string());
            self.client = OnceCell::new();
        }
        self
    }

    /// Send logins to `endpoint` instead of the regional public endpoint.
    pub fn with_endpoint(mut self, endpoint: &str) -> Result<Self, AuthError> {
        Url::parse(endpoint).map_err(|e| AuthError::InvalidEndpoint {
            url: endpoint.to_string(),
            message: e.to_string(),
        })?;
        self.endpoint = Some(endpoint.to_string());
        self.client = OnceCell::new();
        Ok(self)
    }

    /// The region override, if any.
    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    /// The endpoint override, if any.
    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }

    async fn client(&self) -> &Client {
        self.client
            .get_or_init(|| async {
                let shared = match &self.source {
                    ConfigSource::Shared(config) => config.clone(),
                    ConfigSource::Environment => {
                        aws_config::defaults(BehaviorVersion::latest()).load().await
                    }
                };
                let mut builder =
                    config::Builder::from(&shared).retry_config(RetryConfig::disabled());
                if let Some(region) = &self.region {
                    builder = builder.region(Region::new(region.clone()));
                }
                if let Some(endpoint) = &self.endpoint {
                    builder = builder.endpoint_url(endpoint);
                }
                Client::from_conf(builder.build())
            })
            .await
    }
}

fn id_token(output: &AdminInitiateAuthOutput) -> Option<Credential> {
    output
        .authentication_result()
        .and_then(|result| result.id_token())
        .filter(|token| !token.is_empty())
        .map(Credential::bearer)
}

fn classify(err: SdkError<AdminInitiateAuthError, HttpResponse>) -> AuthError {
    let message = DisplayErrorContext(&err).to_string();
    match err {
        SdkError::ServiceError(service) => {
            let status = service.raw().status().as_u16();
            if (200..=299).contains(&status) {
                return AuthError::Decode(Box::new(service.into_err()));
            }
            let body = service
                .raw()
                .body()
                .bytes()
                .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
                .unwrap_or(message);
            AuthError::Rejected { status, body }
        }
        SdkError::TimeoutError(_) => TransportError::Timeout.into(),
        SdkError::DispatchFailure(_) => TransportError::Connection(message).into(),
        SdkError::ResponseError(_) => AuthError::Decode(message.into()),
        _ => TransportError::Request(message).into(),
    }
}

#[async_trait]
impl CredentialProvider for IdentityServiceProvider {
    async fn obtain(
        &self,
        ctx: &RequestContext,
        secrets: &Secrets,
    ) -> Result<Option<Credential>, AuthError> {
        secrets.validate()?;

        let login = async {
            self.client()
                .await
                .admin_initiate_auth()
                .auth_flow(AuthFlowType::from(ADMIN_USER_PASSWORD_AUTH))
                .client_id(&secrets.client_id)
                .user_pool_id(&secrets.pool_id)
                .auth_parameters("USERNAME", &secrets.username)
                .auth_parameters("PASSWORD", &secrets.password)
                .send()
                .await
        };

        let output = match ctx.run(login).await? {
            Ok(output) => output,
            Err(err) => {
                let err = classify(err);
                if let AuthError::Rejected { status, .. } = &err {
                    tracing::debug!(
                        target: targets::AUTH,
                        status = *status,
                        "identity service rejected login"
                    );
                }
                return Err(err);
            }
        };

        let credential = id_token(&output);
        if credential.is_none() {
            tracing::warn!(
                target: targets::AUTH,
                "login succeeded without an id token, continuing unauthenticated"
            );
        }
        Ok(credential)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_cognitoidentityprovider::types::{AuthenticationResultType, ChallengeNameType};

    fn output(token: Option<&str>) -> AdminInitiateAuthOutput {
        let mut result = AuthenticationResultType::builder().access_token("access");
        if let Some(token) = token {
            result = result.id_token(token);
        }
        AdminInitiateAuthOutput::builder()
            .authentication_result(result.build())
            .build()
    }

    #[test]
    fn test_flow_identifier() {
        assert_eq!(
            AuthFlowType::from(ADMIN_USER_PASSWORD_AUTH),
            AuthFlowType::AdminUserPasswordAuth
        );
    }

    #[test]
    fn test_token_extraction() {
        assert_eq!(
            id_token(&output(Some("id-tok"))),
            Some(Credential::bearer("id-tok"))
        );
        assert_eq!(id_token(&output(Some(""))), None);
        assert_eq!(id_token(&output(None)), None);
        assert_eq!(
            id_token(
                &AdminInitiateAuthOutput::builder()
                    .challenge_name(ChallengeNameType::NewPasswordRequired)
                    .session("s")
                    .build()
            ),
            None
        );
    }

    #[test]
    fn test_region_and_endpoint_overrides() {
        let provider = IdentityServiceProvider::from_env("eu-west-1").unwrap();
        assert_eq!(provider.region(), Some("eu-west-1"));
        assert_eq!(provider.endpoint(), None);

        let provider = provider
            .with_region("")
            .with_endpoint("http://127.0.0.1:9229")
            .unwrap();
        assert_eq!(provider.region(), Some("eu-west-1"));
        assert_eq!(provider.endpoint(), Some("http://127.0.0.1:9229"));

        assert!(matches!(
            IdentityServiceProvider::from_env(""),
            Err(AuthError::MissingParameter("region"))
        ));
    }

    #[test]
    fn test_invalid_endpoint() {
        let provider = IdentityServiceProvider::from_env("eu-west-1").unwrap();
        assert!(matches!(
            provider.with_endpoint("not a url"),
            Err(AuthError::InvalidEndpoint { .. })
        ));
    }

    #[test]
    fn test_classify_non_service_failures() {
        let err = classify(SdkError::timeout_error("slow"));
        assert!(matches!(err, AuthError::Transport(TransportError::Timeout)));

        let err = classify(SdkError::construction_failure("bad input"));
        assert!(matches!(
            err,
            AuthError::Transport(TransportError::Request(ref message)) if message.contains("bad input")
        ));
    }
}
