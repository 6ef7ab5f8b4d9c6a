//! Logging facilities.
//!
//! The client is instrumented with the `tracing` crate and never installs a
//! subscriber itself. To see its events, install one in your application:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("gql_client=debug")
//!     .init();
//! ```
//!
//! Credentials and passwords are never recorded; events only say whether a
//! request was authenticated.

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// GraphQL request building and response reconciliation.
    pub const GRAPHQL: &str = "gql_client::graphql";
    /// HTTP round trips.
    pub const HTTP: &str = "gql_client::http";
    /// Credential lookups against the identity service.
    pub const AUTH: &str = "gql_client::auth";
}
