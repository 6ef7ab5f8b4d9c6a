//! HTTP transport for the GraphQL client.
//!
//! [`HttpClient`] wraps a `reqwest` client and performs single round trips
//! bounded by a [`RequestContext`](crate::RequestContext). Requests are plain
//! [`HttpRequest`] values that [`RequestOption`]s may rewrite before sending.
//!
//! # Example
//!
//! ```ignore
//! use gql_client::http::{HttpClient, HttpRequest};
//! use gql_client::RequestContext;
//!
//! let client = HttpClient::builder()
//!     .timeout(Duration::from_secs(60))
//!     .user_agent("MyApp/1.0")
//!     .build()?;
//!
//! let request = HttpRequest::post(url, r#"{"query":"{ ping }"}"#);
//! let response = client.execute(&RequestContext::new(), request).await?;
//! println!("{}: {}", response.status, response.text());
//! ```

mod client;
mod request;
mod response;

pub use client::{HttpClient, HttpClientBuilder, HttpClientConfig};
pub use request::{HttpRequest, RequestOption};
pub use response::HttpResponse;
