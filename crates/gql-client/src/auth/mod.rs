//! Bearer credentials for GraphQL requests.
//!
//! Every non-introspection request asks a [`CredentialProvider`] for a fresh
//! [`Credential`]. Nothing is cached between calls, so concurrent requests
//! never share token state.
//!
//! [`IdentityServiceProvider`] implements the SigV4-signed admin
//! user/password flow of the Cognito identity provider. [`StaticCredentialProvider`] hands out a
//! token the caller already holds.

mod identity;

use std::fmt;

use async_trait::async_trait;
use serde::Deserialize;

use crate::context::RequestContext;
use crate::error::AuthError;

pub use identity::{ADMIN_USER_PASSWORD_AUTH, IdentityServiceProvider};

/// A short-lived bearer token.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    bearer_token: String,
}

impl Credential {
    /// Wrap a bearer token.
    pub fn bearer(token: impl Into<String>) -> Self {
        Self {
            bearer_token: token.into(),
        }
    }

    /// The raw token.
    pub fn token(&self) -> &str {
        &self.bearer_token
    }

    /// The `Authorization` header value, `Bearer <token>`.
    pub fn header_value(&self) -> String {
        format!("Bearer {}", self.bearer_token)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("bearer_token", &"<redacted>")
            .finish()
    }
}

/// The long-lived secrets exchanged for a credential.
#[derive(Clone, Default, Deserialize)]
pub struct Secrets {
    /// The identity application's client id.
    pub client_id: String,
    /// The user pool the account lives in.
    pub pool_id: String,
    /// Account name.
    pub username: String,
    /// Account password.
    pub password: String,
}

impl Secrets {
    /// Bundle the four secrets.
    pub fn new(
        client_id: impl Into<String>,
        pool_id: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            pool_id: pool_id.into(),
            username: username.into(),
            password: password.into(),
        }
    }

    /// Fails with the name of the first empty secret.
    pub fn validate(&self) -> Result<(), AuthError> {
        let fields = [
            ("client_id", &self.client_id),
            ("pool_id", &self.pool_id),
            ("username", &self.username),
            ("password", &self.password),
        ];
        match fields.iter().find(|(_, value)| value.is_empty()) {
            Some((name, _)) => Err(AuthError::MissingParameter(*name)),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for Secrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Secrets")
            .field("client_id", &self.client_id)
            .field("pool_id", &self.pool_id)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Source of bearer credentials.
///
/// `Ok(None)` means the provider answered without a usable token; the request
/// then goes out unauthenticated. Errors abort the request.
#[async_trait]
pub trait CredentialProvider: Send + Sync + fmt::Debug {
    /// Obtain a fresh credential for one request.
    async fn obtain(
        &self,
        ctx: &RequestContext,
        secrets: &Secrets,
    ) -> Result<Option<Credential>, AuthError>;
}

/// Hands out the same token on every call.
#[derive(Clone, Debug)]
pub struct StaticCredentialProvider {
    credential: Credential,
}

impl StaticCredentialProvider {
    /// Serve the given token.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            credential: Credential::bearer(token),
        }
    }
}

#[async_trait]
impl CredentialProvider for StaticCredentialProvider {
    async fn obtain(
        &self,
        ctx: &RequestContext,
        _secrets: &Secrets,
    ) -> Result<Option<Credential>, AuthError> {
        ctx.check()?;
        Ok(Some(self.credential.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_value() {
        let credential = Credential::bearer("abc.def");
        assert_eq!(credential.token(), "abc.def");
        assert_eq!(credential.header_value(), "Bearer abc.def");
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let secrets = Secrets::new("client", "pool", "user", "hunter2");
        let debug = format!("{secrets:?}");
        assert!(debug.contains("client"));
        assert!(!debug.contains("hunter2"));

        let debug = format!("{:?}", Credential::bearer("tok-123"));
        assert!(!debug.contains("tok-123"));
    }

    #[test]
    fn test_validate_reports_first_missing() {
        assert!(Secrets::new("c", "p", "u", "pw").validate().is_ok());

        let err = Secrets::new("c", "", "", "pw").validate().unwrap_err();
        assert!(matches!(err, AuthError::MissingParameter("pool_id")));

        let err = Secrets::default().validate().unwrap_err();
        assert!(matches!(err, AuthError::MissingParameter("client_id")));
    }

    #[tokio::test]
    async fn test_static_provider() {
        let provider = StaticCredentialProvider::new("fixed");
        let credential = provider
            .obtain(&RequestContext::new(), &Secrets::default())
            .await
            .unwrap();
        assert_eq!(credential, Some(Credential::bearer("fixed")));
    }

    #[tokio::test]
    async fn test_static_provider_honours_cancellation() {
        let ctx = RequestContext::new();
        ctx.cancel();
        let err = StaticCredentialProvider::new("fixed")
            .obtain(&ctx, &Secrets::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Transport(_)));
    }
}
