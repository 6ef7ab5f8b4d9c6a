//! GraphQL client implementation.

use std::fmt;
use std::sync::Arc;

use aws_config::SdkConfig;
use http::HeaderValue;
use http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use super::reconcile::reconcile;
use super::request::{GraphQLRequest, INTROSPECTION_QUERY};
use crate::auth::{Credential, CredentialProvider, IdentityServiceProvider, Secrets};
use crate::context::RequestContext;
use crate::error::{Error, Result};
use crate::http::{HttpClient, HttpClientBuilder, HttpRequest, RequestOption};
use crate::logging::targets;

const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Identity settings for clients that log in with user/password secrets.
#[derive(Clone, Default, Deserialize)]
pub struct AuthorizationOptions {
    /// Region of the identity service. Required unless an AWS configuration
    /// is supplied through [`ClientOptions::aws_config`].
    #[serde(default)]
    pub region: String,
    /// Explicit identity endpoint, overriding the regional one.
    #[serde(default)]
    pub identity_endpoint: Option<String>,
    /// The identity application's client id.
    pub client_id: String,
    /// The user pool the account lives in.
    pub user_pool_id: String,
    /// Account name.
    pub username: String,
    /// Account password.
    pub password: String,
}

impl AuthorizationOptions {
    /// The secrets exchanged for a credential on every call.
    pub fn secrets(&self) -> Secrets {
        Secrets::new(
            &self.client_id,
            &self.user_pool_id,
            &self.username,
            &self.password,
        )
    }

    fn provider(&self, aws_config: Option<&SdkConfig>) -> Result<IdentityServiceProvider> {
        let provider = match aws_config {
            Some(config) => IdentityServiceProvider::new(config).with_region(&self.region),
            None => IdentityServiceProvider::from_env(&self.region)?,
        };
        match &self.identity_endpoint {
            Some(endpoint) => Ok(provider.with_endpoint(endpoint)?),
            None => Ok(provider),
        }
    }
}

impl fmt::Debug for AuthorizationOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthorizationOptions")
            .field("region", &self.region)
            .field("identity_endpoint", &self.identity_endpoint)
            .field("client_id", &self.client_id)
            .field("user_pool_id", &self.user_pool_id)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Everything needed to construct a [`GraphQLClient`] in one value.
#[derive(Clone, Debug, Default)]
pub struct ClientOptions {
    /// The GraphQL endpoint.
    pub base_url: String,
    /// Transport to use; a default client is built when absent.
    pub http_client: Option<HttpClient>,
    /// Options applied to every request, before per-call options.
    pub request_options: Vec<RequestOption>,
    /// Identity settings; requests are unauthenticated when absent.
    pub authorization: Option<AuthorizationOptions>,
    /// AWS configuration used to sign identity logins. The default AWS
    /// credential chain is loaded on first login when absent.
    pub aws_config: Option<SdkConfig>,
}

/// Builder for creating a GraphQL client.
pub struct GraphQLClientBuilder {
    url: String,
    http_client: Option<HttpClient>,
    http_client_builder: Option<HttpClientBuilder>,
    request_options: Vec<RequestOption>,
    credentials: Option<Authenticator>,
}

impl GraphQLClientBuilder {
    /// Create a new builder with the specified GraphQL endpoint URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            http_client: None,
            http_client_builder: None,
            request_options: Vec::new(),
            credentials: None,
        }
    }

    /// Use an existing HTTP client.
    pub fn http_client(mut self, client: HttpClient) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Use a custom HTTP client builder.
    pub fn http_client_builder(mut self, builder: HttpClientBuilder) -> Self {
        self.http_client_builder = Some(builder);
        self
    }

    /// Add an option applied to every request.
    pub fn request_option(mut self, option: RequestOption) -> Self {
        self.request_options.push(option);
        self
    }

    /// Add several client-wide options.
    pub fn request_options(mut self, options: impl IntoIterator<Item = RequestOption>) -> Self {
        self.request_options.extend(options);
        self
    }

    /// Authenticate non-introspection requests with credentials from `provider`.
    pub fn credentials(mut self, provider: Arc<dyn CredentialProvider>, secrets: Secrets) -> Self {
        self.credentials = Some(Authenticator { provider, secrets });
        self
    }

    /// Build the GraphQL client.
    ///
    /// The endpoint URL is not checked here; a malformed one surfaces as
    /// [`Error::RequestConstruction`] on the first call.
    pub fn build(self) -> Result<GraphQLClient> {
        let http_client = if let Some(client) = self.http_client {
            client
        } else if let Some(builder) = self.http_client_builder {
            builder.build()?
        } else {
            HttpClient::new()?
        };

        Ok(GraphQLClient {
            inner: Arc::new(GraphQLClientInner {
                http_client,
                url: self.url,
                request_options: self.request_options,
                authenticator: self.credentials,
            }),
        })
    }
}

struct Authenticator {
    provider: Arc<dyn CredentialProvider>,
    secrets: Secrets,
}

struct GraphQLClientInner {
    http_client: HttpClient,
    url: String,
    request_options: Vec<RequestOption>,
    authenticator: Option<Authenticator>,
}

/// An authenticated GraphQL-over-HTTP client.
///
/// Each call encodes the request envelope, attaches a fresh bearer credential
/// unless the query is [`INTROSPECTION_QUERY`], applies client-wide and then
/// per-call [`RequestOption`]s, sends the request and reconciles the response
/// into data or an [`Error`]. The client is cheap to clone and safe to share
/// between tasks.
///
/// # Example
///
/// ```ignore
/// use gql_client::{GraphQLClient, RequestContext, StaticCredentialProvider, Secrets};
///
/// let client = GraphQLClient::builder("https://api.example.com/graphql")
///     .credentials(Arc::new(StaticCredentialProvider::new(token)), Secrets::default())
///     .build()?;
///
/// let ctx = RequestContext::new().with_timeout(Duration::from_secs(5));
/// let user: UserData = client
///     .post(&ctx, "GetUser", GET_USER, &json!({"id": "123"}))
///     .await?;
/// ```
#[derive(Clone)]
pub struct GraphQLClient {
    inner: Arc<GraphQLClientInner>,
}

impl GraphQLClient {
    /// Create a new builder for configuring a GraphQL client.
    pub fn builder(url: impl Into<String>) -> GraphQLClientBuilder {
        GraphQLClientBuilder::new(url)
    }

    /// Create a client from a single options value.
    ///
    /// With `authorization` set, non-introspection requests first log in
    /// against the identity service with a signed `AdminInitiateAuth` call.
    pub fn from_options(options: ClientOptions) -> Result<Self> {
        let ClientOptions {
            base_url,
            http_client,
            request_options,
            authorization,
            aws_config,
        } = options;

        let http_client = match http_client {
            Some(client) => client,
            None => HttpClient::new()?,
        };

        let mut builder = GraphQLClientBuilder::new(base_url)
            .http_client(http_client)
            .request_options(request_options);
        if let Some(authorization) = authorization {
            let provider = authorization.provider(aws_config.as_ref())?;
            builder = builder.credentials(Arc::new(provider), authorization.secrets());
        }
        builder.build()
    }

    /// Get the GraphQL endpoint URL.
    pub fn url(&self) -> &str {
        &self.inner.url
    }

    /// Execute an operation and decode its `data` into `T`.
    ///
    /// `variables` must serialize to a JSON object, or to `null` for none.
    /// An empty `operation_name` is left out of the request body.
    pub async fn post<T, V>(
        &self,
        ctx: &RequestContext,
        operation_name: &str,
        query: &str,
        variables: &V,
    ) -> Result<T>
    where
        T: DeserializeOwned,
        V: Serialize + ?Sized,
    {
        self.post_with(ctx, operation_name, query, variables, &[])
            .await
    }

    /// Like [`post`](Self::post), with extra options applied after the
    /// client-wide ones.
    pub async fn post_with<T, V>(
        &self,
        ctx: &RequestContext,
        operation_name: &str,
        query: &str,
        variables: &V,
        options: &[RequestOption],
    ) -> Result<T>
    where
        T: DeserializeOwned,
        V: Serialize + ?Sized,
    {
        let request = self
            .build_request(ctx, operation_name, query, variables, options)
            .await?;

        tracing::debug!(
            target: targets::GRAPHQL,
            operation = operation_name,
            url = %request.url,
            authenticated = request.headers.contains_key(AUTHORIZATION),
            "posting graphql request"
        );

        let response = self.inner.http_client.execute(ctx, request).await?;

        tracing::debug!(
            target: targets::GRAPHQL,
            operation = operation_name,
            status = response.status,
            "graphql response received"
        );

        reconcile(&response.body, response.status)
    }

    /// Fetch the schema using introspection.
    ///
    /// Never authenticated. Returns the raw introspection result as JSON.
    pub async fn introspect(&self, ctx: &RequestContext) -> Result<Value> {
        self.post(ctx, "IntrospectionQuery", INTROSPECTION_QUERY, &())
            .await
    }

    /// Build the outbound request for one call without sending it.
    ///
    /// Headers are applied in this order: `Authorization` (skipped for the
    /// introspection query), client-wide options, per-call options, then
    /// `Content-Type` and `Accept`. Options therefore override the
    /// credential, while the two JSON headers always end up as
    /// `application/json; charset=utf-8`.
    pub async fn build_request<V>(
        &self,
        ctx: &RequestContext,
        operation_name: &str,
        query: &str,
        variables: &V,
        options: &[RequestOption],
    ) -> Result<HttpRequest>
    where
        V: Serialize + ?Sized,
    {
        let envelope = GraphQLRequest::new(query)
            .operation_name(operation_name)
            .variables(variables)?;
        let body = envelope.encode()?;

        let url = Url::parse(&self.inner.url).map_err(|e| Error::RequestConstruction {
            url: self.inner.url.clone(),
            message: e.to_string(),
        })?;
        let mut request = HttpRequest::post(url, body);

        if !envelope.is_introspection() {
            if let Some(credential) = self.credential(ctx).await? {
                let mut value = HeaderValue::from_str(&credential.header_value()).map_err(|e| {
                    Error::RequestConstruction {
                        url: self.inner.url.clone(),
                        message: format!("invalid credential: {e}"),
                    }
                })?;
                value.set_sensitive(true);
                request.set_header(AUTHORIZATION, value);
            }
        }

        for option in self.inner.request_options.iter().chain(options) {
            option.apply(&mut request);
        }

        request.set_header(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
        request.set_header(ACCEPT, HeaderValue::from_static(JSON_CONTENT_TYPE));
        Ok(request)
    }

    async fn credential(&self, ctx: &RequestContext) -> Result<Option<Credential>> {
        let Some(auth) = &self.inner.authenticator else {
            return Ok(None);
        };
        let credential = auth.provider.obtain(ctx, &auth.secrets).await?;
        if credential.is_none() {
            tracing::debug!(target: targets::GRAPHQL, "no credential issued, sending unauthenticated");
        }
        Ok(credential)
    }
}

impl fmt::Debug for GraphQLClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphQLClient")
            .field("url", &self.inner.url)
            .field("request_options", &self.inner.request_options.len())
            .field(
                "provider",
                &self.inner.authenticator.as_ref().map(|auth| &auth.provider),
            )
            .finish()
    }
}
