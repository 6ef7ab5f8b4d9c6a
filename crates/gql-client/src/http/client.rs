//! HTTP client implementation.

use std::sync::Arc;
use std::time::Duration;

use super::request::HttpRequest;
use super::response::HttpResponse;
use crate::context::RequestContext;
use crate::error::{Error, Result, TransportError};
use crate::logging::targets;

/// Configuration for the HTTP client.
#[derive(Clone, Debug)]
pub struct HttpClientConfig {
    /// Request timeout.
    pub timeout: Option<Duration>,
    /// Connect timeout.
    pub connect_timeout: Option<Duration>,
    /// Default user agent.
    pub user_agent: Option<String>,
    /// Proxy URL.
    pub proxy: Option<String>,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Some(Duration::from_secs(30)),
            connect_timeout: Some(Duration::from_secs(10)),
            user_agent: Some(format!("gql-client/{} (Rust)", env!("CARGO_PKG_VERSION"))),
            proxy: None,
        }
    }
}

/// Builder for creating an HTTP client with custom configuration.
pub struct HttpClientBuilder {
    config: HttpClientConfig,
    default_headers: http::HeaderMap,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClientBuilder {
    /// Create a new builder with default configuration.
    pub fn new() -> Self {
        Self {
            config: HttpClientConfig::default(),
            default_headers: http::HeaderMap::new(),
        }
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = Some(timeout);
        self
    }

    /// Disable request timeout.
    pub fn no_timeout(mut self) -> Self {
        self.config.timeout = None;
        self
    }

    /// Set the connect timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = Some(timeout);
        self
    }

    /// Set the user agent string.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = Some(user_agent.into());
        self
    }

    /// Set a proxy URL.
    pub fn proxy(mut self, proxy_url: impl Into<String>) -> Self {
        self.config.proxy = Some(proxy_url.into());
        self
    }

    /// Add a default header that will be sent with every request.
    pub fn default_header(
        mut self,
        name: impl TryInto<http::HeaderName>,
        value: impl TryInto<http::HeaderValue>,
    ) -> Result<Self> {
        let name = name.try_into().map_err(|_| Error::RequestConstruction {
            url: String::new(),
            message: "invalid default header name".to_string(),
        })?;
        let value = value.try_into().map_err(|_| Error::RequestConstruction {
            url: String::new(),
            message: format!("invalid value for default header '{name}'"),
        })?;
        self.default_headers.insert(name, value);
        Ok(self)
    }

    /// Build the HTTP client.
    pub fn build(self) -> Result<HttpClient> {
        let mut builder = reqwest::Client::builder();

        if let Some(timeout) = self.config.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(connect_timeout) = self.config.connect_timeout {
            builder = builder.connect_timeout(connect_timeout);
        }

        if let Some(ref ua) = self.config.user_agent {
            builder = builder.user_agent(ua);
        }

        if let Some(ref proxy_url) = self.config.proxy {
            let proxy = reqwest::Proxy::all(proxy_url).map_err(|e| Error::RequestConstruction {
                url: proxy_url.clone(),
                message: format!("invalid proxy: {e}"),
            })?;
            builder = builder.proxy(proxy);
        }

        builder = builder.default_headers(self.default_headers);

        let client = builder.build().map_err(|e| Error::RequestConstruction {
            url: String::new(),
            message: format!("failed to build HTTP client: {e}"),
        })?;

        Ok(HttpClient {
            inner: Arc::new(HttpClientInner {
                client,
                config: self.config,
            }),
        })
    }
}

/// Internal state for the HTTP client.
struct HttpClientInner {
    client: reqwest::Client,
    config: HttpClientConfig,
}

/// The transport every GraphQL and identity call goes through.
///
/// The client is cheaply cloneable and thread-safe. Clones share the same
/// underlying connection pool and configuration.
#[derive(Clone)]
pub struct HttpClient {
    inner: Arc<HttpClientInner>,
}

impl HttpClient {
    /// Create a new HTTP client with default configuration.
    pub fn new() -> Result<Self> {
        HttpClientBuilder::new().build()
    }

    /// Create a builder for configuring a new HTTP client.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::new()
    }

    /// Wrap an already configured reqwest client.
    pub fn from_reqwest(client: reqwest::Client) -> Self {
        Self {
            inner: Arc::new(HttpClientInner {
                client,
                config: HttpClientConfig::default(),
            }),
        }
    }

    /// Get the client's configuration.
    ///
    /// For clients created with [`HttpClient::from_reqwest`] this is the
    /// default configuration, not the wrapped client's.
    pub fn config(&self) -> &HttpClientConfig {
        &self.inner.config
    }

    /// Send a request and read the whole response body.
    ///
    /// Performs exactly one round trip. Cancellation or expiry of `ctx` at any
    /// point, including while the body is being read, aborts the call with
    /// [`Error::Transport`]. A body that cannot be read in full yields
    /// [`Error::Read`]. The connection is released on every path.
    pub async fn execute(&self, ctx: &RequestContext, request: HttpRequest) -> Result<HttpResponse> {
        let HttpRequest {
            method,
            url,
            headers,
            body,
            timeout,
        } = request;

        tracing::trace!(target: targets::HTTP, %method, %url, "sending request");

        let mut req_builder = self
            .inner
            .client
            .request(method, url)
            .headers(headers)
            .body(body);
        if let Some(timeout) = timeout {
            req_builder = req_builder.timeout(timeout);
        }

        let round_trip = async move {
            let response = req_builder
                .send()
                .await
                .map_err(|e| Error::Transport(TransportError::from(e)))?;
            let status = response.status().as_u16();
            let headers = response.headers().clone();
            let body = response
                .bytes()
                .await
                .map_err(|e| Error::Read(TransportError::from(e)))?;
            Ok::<_, Error>(HttpResponse {
                status,
                headers,
                body,
            })
        };

        let response = ctx.run(round_trip).await.map_err(Error::Transport)??;
        tracing::trace!(
            target: targets::HTTP,
            status = response.status,
            bytes = response.body.len(),
            "received response"
        );
        Ok(response)
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("config", &self.inner.config)
            .finish()
    }
}
