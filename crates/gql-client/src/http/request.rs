//! Outbound HTTP request and request options.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http::{HeaderMap, HeaderName, HeaderValue, Method};
use url::Url;

/// A built HTTP request ready to be executed.
///
/// Request options receive a mutable reference to this value, so every
/// field is public.
#[derive(Clone, Debug)]
pub struct HttpRequest {
    /// The HTTP method.
    pub method: Method,
    /// The request URL.
    pub url: Url,
    /// Request headers.
    pub headers: HeaderMap,
    /// Request body.
    pub body: Bytes,
    /// Request timeout override.
    pub timeout: Option<Duration>,
}

impl HttpRequest {
    /// Create a POST request with the given body.
    pub fn post(url: Url, body: impl Into<Bytes>) -> Self {
        Self {
            method: Method::POST,
            url,
            headers: HeaderMap::new(),
            body: body.into(),
            timeout: None,
        }
    }

    /// Set a header, replacing any previous values for the same name.
    pub fn set_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers.insert(name, value);
    }

    /// Get a header value as text.
    pub fn header(&self, name: impl http::header::AsHeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// A customization applied to an outgoing request before it is sent.
///
/// Options are applied in registration order, so later options overwrite
/// headers set by earlier ones.
///
/// # Example
///
/// ```ignore
/// use gql_client::http::RequestOption;
///
/// let trace = RequestOption::header(
///     HeaderName::from_static("x-trace-id"),
///     HeaderValue::from_static("abc123"),
/// );
/// let tenant = RequestOption::new(|req| {
///     req.url.query_pairs_mut().append_pair("tenant", "acme");
/// });
/// ```
#[derive(Clone)]
pub struct RequestOption(Arc<dyn Fn(&mut HttpRequest) + Send + Sync>);

impl RequestOption {
    /// Wrap an arbitrary mutation.
    pub fn new(apply: impl Fn(&mut HttpRequest) + Send + Sync + 'static) -> Self {
        Self(Arc::new(apply))
    }

    /// Set a header.
    pub fn header(name: HeaderName, value: HeaderValue) -> Self {
        Self::new(move |req| req.set_header(name.clone(), value.clone()))
    }

    /// Override the request timeout.
    pub fn timeout(timeout: Duration) -> Self {
        Self::new(move |req| req.timeout = Some(timeout))
    }

    /// Apply the option to a request.
    pub fn apply(&self, request: &mut HttpRequest) {
        (self.0)(request)
    }
}

impl fmt::Debug for RequestOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestOption").finish_non_exhaustive()
    }
}
