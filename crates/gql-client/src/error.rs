//! Error types for the GraphQL client.
//!
//! Failures fall into two groups. Most variants of [`Error`] are fatal and
//! describe why a call could not complete at all (encoding, transport,
//! authentication, undecodable payloads). [`Error::Composite`] is the
//! expected failure shape of a call that did complete: it carries a
//! [`NetworkError`] when the HTTP status was outside 2xx, the server's
//! [`GraphQLErrorList`] when the response listed errors, or both.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::graphql::{GraphQLError, GraphQLErrorList};

/// Failures of the underlying HTTP round trip.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The caller cancelled the request context.
    #[error("request was cancelled")]
    Cancelled,
    /// The request context's deadline passed before the call finished.
    #[error("request deadline exceeded")]
    DeadlineExceeded,
    /// The HTTP client's own timeout fired.
    #[error("request timed out")]
    Timeout,
    /// Connection refused or failed.
    #[error("connection error: {0}")]
    Connection(String),
    /// Redirect limit exceeded.
    #[error("too many redirects")]
    TooManyRedirects,
    /// Any other request or body error reported by the HTTP stack.
    #[error("{0}")]
    Request(String),
}

impl Error {
    pub(crate) fn encode(source: serde_json::Error) -> Self {
        Self::Encode {
            message: source.to_string(),
            source: Some(source),
        }
    }

    pub(crate) fn invalid_envelope(message: impl Into<String>) -> Self {
        Self::Encode {
            message: message.into(),
            source: None,
        }
    }
}

impl TransportError {
    /// Whether this failure came from the caller's context rather than the network.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled | Self::DeadlineExceeded)
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect() {
            Self::Connection(err.to_string())
        } else if err.is_redirect() {
            Self::TooManyRedirects
        } else {
            Self::Request(err.to_string())
        }
    }
}

/// Failures while obtaining a credential from the identity service.
#[derive(Debug, Error)]
pub enum AuthError {
    /// One of the long-lived secrets was empty.
    #[error("missing authorization parameter '{0}'")]
    MissingParameter(&'static str),
    /// The identity endpoint could not be used to build a request.
    #[error("invalid identity endpoint '{url}': {message}")]
    InvalidEndpoint {
        /// The configured endpoint.
        url: String,
        /// Why it was rejected.
        message: String,
    },
    /// The identity round trip failed.
    #[error("identity request failed: {0}")]
    Transport(#[from] TransportError),
    /// The identity service answered with a non-2xx status.
    #[error("identity service rejected the request with status {status}: {body}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Response body as text.
        body: String,
    },
    /// The identity service answered 2xx with a body that could not be decoded.
    #[error("failed to decode identity response: {0}")]
    Decode(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// The network half of a [`CompositeError`]: the HTTP status was outside 2xx.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetworkError {
    /// The HTTP status code.
    pub code: u16,
    /// `"Response body "` followed by the raw body text.
    pub message: String,
}

impl NetworkError {
    pub(crate) fn from_response(code: u16, body: &[u8]) -> Self {
        Self {
            code,
            message: format!("Response body {}", String::from_utf8_lossy(body)),
        }
    }
}

impl fmt::Display for NetworkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}: {}", self.code, self.message)
    }
}

impl std::error::Error for NetworkError {}

/// Network and protocol failures of a single completed call.
///
/// Renders as JSON so both halves show up in logs:
/// `{"networkErrors":{"code":500,"message":"..."},"graphqlErrors":[...]}`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CompositeError {
    /// Populated when the HTTP status was outside 2xx.
    #[serde(rename = "networkErrors")]
    pub network_error: Option<NetworkError>,
    /// Populated when the response carried a non-empty `errors` member.
    #[serde(rename = "graphqlErrors")]
    pub graphql_errors: Option<GraphQLErrorList>,
}

impl CompositeError {
    /// Returns true when at least one kind of failure is present.
    pub fn has_errors(&self) -> bool {
        self.network_error.is_some()
            || self
                .graphql_errors
                .as_ref()
                .is_some_and(|errors| !errors.is_empty())
    }

    /// The protocol errors in server order, or an empty slice.
    pub fn errors(&self) -> &[GraphQLError] {
        self.graphql_errors
            .as_ref()
            .map(GraphQLErrorList::as_slice)
            .unwrap_or(&[])
    }
}

impl fmt::Display for CompositeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(self) {
            Ok(json) => f.write_str(&json),
            Err(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for CompositeError {}

/// Every way a GraphQL call can fail.
#[derive(Debug, Error)]
pub enum Error {
    /// The request envelope could not be encoded.
    #[error("failed to encode request: {message}")]
    Encode {
        /// What was wrong with the envelope.
        message: String,
        /// The serializer's complaint, when serialization itself failed.
        #[source]
        source: Option<serde_json::Error>,
    },
    /// The outbound HTTP request could not be constructed.
    #[error("failed to create request for '{url}': {message}")]
    RequestConstruction {
        /// The endpoint the request was aimed at.
        url: String,
        /// Why construction failed.
        message: String,
    },
    /// The credential lookup for a non-introspection request failed.
    #[error("failed to login: {0}")]
    Auth(#[from] AuthError),
    /// Sending the request failed or was cancelled.
    #[error("request failed: {0}")]
    Transport(#[source] TransportError),
    /// The response arrived but its body could not be read in full.
    #[error("failed to read response body: {0}")]
    Read(#[source] TransportError),
    /// The response body is not a JSON object.
    #[error("failed to decode data {body}: {source}")]
    EnvelopeDecode {
        /// The raw body text.
        body: String,
        /// The decoder's complaint.
        #[source]
        source: serde_json::Error,
    },
    /// A 2xx response carried an `errors` member that is not a list of GraphQL errors.
    #[error("failed to parse graphql errors, response content {body}: {source}")]
    ProtocolErrorDecode {
        /// The raw body text.
        body: String,
        /// The decoder's complaint.
        #[source]
        source: serde_json::Error,
    },
    /// A 2xx response carried `data` that does not fit the target type.
    #[error("failed to decode data into response {body}: {source}")]
    DataDecode {
        /// The raw body text.
        body: String,
        /// The decoder's complaint.
        #[source]
        source: serde_json::Error,
    },
    /// Network and/or protocol errors from a completed call.
    #[error(transparent)]
    Composite(CompositeError),
}

impl Error {
    /// The composite failure, if this is one.
    pub fn composite(&self) -> Option<&CompositeError> {
        match self {
            Self::Composite(composite) => Some(composite),
            _ => None,
        }
    }

    /// The non-2xx network error carried by a composite failure.
    pub fn network_error(&self) -> Option<&NetworkError> {
        self.composite()
            .and_then(|composite| composite.network_error.as_ref())
    }

    /// The protocol errors carried by a composite failure, or an empty slice.
    pub fn graphql_errors(&self) -> &[GraphQLError] {
        self.composite().map(CompositeError::errors).unwrap_or(&[])
    }

    /// Whether the call was aborted by the caller's context.
    pub fn is_cancellation(&self) -> bool {
        match self {
            Self::Transport(err) | Self::Read(err) => err.is_cancellation(),
            Self::Auth(AuthError::Transport(err)) => err.is_cancellation(),
            _ => false,
        }
    }
}

/// A specialized Result type for client operations.
pub type Result<T> = std::result::Result<T, Error>;
