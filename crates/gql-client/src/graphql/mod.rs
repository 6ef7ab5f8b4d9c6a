//! GraphQL requests over HTTP.
//!
//! This module provides:
//! - Query and mutation execution with JSON variables
//! - Bearer authentication on every call except schema introspection
//! - Reconciliation of HTTP status and GraphQL `errors` into one error value
//!
//! # Example
//!
//! ```ignore
//! use gql_client::graphql::GraphQLClient;
//! use gql_client::RequestContext;
//!
//! let client = GraphQLClient::builder("https://api.example.com/graphql").build()?;
//!
//! #[derive(Deserialize)]
//! struct UserData {
//!     user: User,
//! }
//!
//! let ctx = RequestContext::new();
//! let data: UserData = client
//!     .post(&ctx, "GetUser", r#"
//!         query GetUser($id: ID!) {
//!             user(id: $id) {
//!                 id
//!                 name
//!             }
//!         }
//!     "#, &json!({"id": "123"}))
//!     .await?;
//! ```
//!
//! # Partial failures
//!
//! A response that carries both `data` and `errors` is reported as
//! [`Error::Composite`](crate::Error::Composite) holding only the error list.
//!
//! ```ignore
//! match client.post::<UserData, _>(&ctx, "GetUser", QUERY, &vars).await {
//!     Ok(data) => println!("{}", data.user.name),
//!     Err(err) => {
//!         for e in err.graphql_errors() {
//!             eprintln!("graphql error: {e}");
//!         }
//!     }
//! }
//! ```

mod client;
mod reconcile;
mod request;
mod response;

pub use client::{AuthorizationOptions, ClientOptions, GraphQLClient, GraphQLClientBuilder};
pub use reconcile::reconcile;
pub use request::{GraphQLRequest, INTROSPECTION_QUERY, Variables};
pub use response::{GraphQLError, GraphQLErrorList, GraphQLLocation, PathSegment};
