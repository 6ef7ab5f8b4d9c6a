//! Authenticated GraphQL-over-HTTP client.
//!
//! This crate provides:
//!
//! - **GraphQL client**: envelope encoding, bearer authentication and
//!   reconciliation of HTTP and GraphQL failures into one error model
//! - **Credential providers**: signed admin user/password login against the
//!   Cognito identity provider, or a fixed token
//! - **HTTP transport**: a single round trip with cancellation and deadlines
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use std::time::Duration;
//! use gql_client::{GraphQLClient, IdentityServiceProvider, RequestContext, Secrets};
//!
//! let identity = IdentityServiceProvider::from_env("eu-west-1")?;
//!
//! let client = GraphQLClient::builder("https://api.example.com/graphql")
//!     .credentials(Arc::new(identity), Secrets::new(client_id, pool_id, user, password))
//!     .build()?;
//!
//! let ctx = RequestContext::new().with_timeout(Duration::from_secs(10));
//! let data: Viewer = client.post(&ctx, "Viewer", "{ viewer { id } }", &()).await?;
//! ```
//!
//! ## Errors
//!
//! A call that completed but failed returns [`Error::Composite`], carrying a
//! [`NetworkError`] for a non-2xx status, the server's GraphQL errors, or
//! both. Every other [`Error`] variant means the call could not complete.
//!
//! ```ignore
//! match client.post::<Viewer, _>(&ctx, "Viewer", QUERY, &()).await {
//!     Ok(viewer) => println!("{}", viewer.id),
//!     Err(Error::Composite(composite)) => eprintln!("{composite}"),
//!     Err(err) => return Err(err.into()),
//! }
//! ```
//!
//! ## Request options
//!
//! ```ignore
//! let trace = RequestOption::header(
//!     HeaderName::from_static("x-trace-id"),
//!     HeaderValue::from_static("abc123"),
//! );
//! let data: Viewer = client.post_with(&ctx, "Viewer", QUERY, &(), &[trace]).await?;
//! ```

mod auth;
mod context;
mod error;
pub mod graphql;
pub mod http;
pub mod logging;

pub use auth::{
    ADMIN_USER_PASSWORD_AUTH, Credential, CredentialProvider, IdentityServiceProvider, Secrets,
    StaticCredentialProvider,
};
pub use context::RequestContext;
pub use error::{AuthError, CompositeError, Error, NetworkError, Result, TransportError};

// Re-export commonly used types at the crate root
pub use graphql::{
    AuthorizationOptions, ClientOptions, GraphQLClient, GraphQLClientBuilder, GraphQLError,
    GraphQLErrorList, GraphQLRequest, INTROSPECTION_QUERY,
};
pub use self::http::{HttpClient, HttpClientBuilder, HttpRequest, HttpResponse, RequestOption};
