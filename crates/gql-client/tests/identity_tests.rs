//! Integration tests for the identity-service credential provider.

use std::time::Duration;

use aws_config::{BehaviorVersion, Region};
use aws_sdk_cognitoidentityprovider::config::Credentials;
use gql_client::{
    AuthError, Credential, CredentialProvider, IdentityServiceProvider, RequestContext, Secrets,
    TransportError,
};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn provider(server: &MockServer) -> IdentityServiceProvider {
    let config = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new("eu-west-1"))
        .credentials_provider(Credentials::new("AKIDEXAMPLE", "secret", None, None, "test"))
        .load()
        .await;
    IdentityServiceProvider::new(&config)
        .with_endpoint(&server.uri())
        .unwrap()
}

fn secrets() -> Secrets {
    Secrets::new("client-1", "pool-1", "alice", "s3cret")
}

#[tokio::test]
async fn test_login_request_and_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/"))
        .and(header("content-type", "application/x-amz-json-1.1"))
        .and(header(
            "x-amz-target",
            "AWSCognitoIdentityProviderService.AdminInitiateAuth",
        ))
        .and(body_json(json!({
            "AuthFlow": "ADMIN_USER_PASSWORD_AUTH",
            "ClientId": "client-1",
            "UserPoolId": "pool-1",
            "AuthParameters": {"USERNAME": "alice", "PASSWORD": "s3cret"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "AuthenticationResult": {
                "AccessToken": "access",
                "IdToken": "id-token",
                "RefreshToken": "refresh",
                "TokenType": "Bearer",
                "ExpiresIn": 3600
            },
            "ChallengeParameters": {}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let credential = provider(&server)
        .await
        .obtain(&RequestContext::new(), &secrets())
        .await
        .unwrap();
    assert_eq!(credential, Some(Credential::bearer("id-token")));
}

#[tokio::test]
async fn test_login_is_signed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"AuthenticationResult": {"IdToken": "signed"}})),
        )
        .mount(&server)
        .await;

    provider(&server)
        .await
        .obtain(&RequestContext::new(), &secrets())
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let authorization = requests[0]
        .headers
        .get("authorization")
        .expect("login must carry a signature")
        .to_str()
        .unwrap();
    assert!(authorization.starts_with("AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/"));
    assert!(authorization.contains("/eu-west-1/cognito-idp/aws4_request"));
    assert!(authorization.contains("x-amz-target"));
    assert!(requests[0].headers.get("x-amz-date").is_some());
}

#[tokio::test]
async fn test_empty_token_is_soft_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"AuthenticationResult": {"IdToken": ""}})),
        )
        .mount(&server)
        .await;

    let credential = provider(&server)
        .await
        .obtain(&RequestContext::new(), &secrets())
        .await
        .unwrap();
    assert!(credential.is_none());
}

#[tokio::test]
async fn test_rejected_login() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "__type": "UserNotFoundException",
            "message": "User does not exist."
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = provider(&server)
        .await
        .obtain(&RequestContext::new(), &secrets())
        .await
        .unwrap_err();
    match err {
        AuthError::Rejected { status, body } => {
            assert_eq!(status, 400);
            assert!(body.contains("UserNotFoundException"));
        }
        other => panic!("expected rejection, got {other:?}"),
    }
}

#[tokio::test]
async fn test_non_json_success_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = provider(&server)
        .await
        .obtain(&RequestContext::new(), &secrets())
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::Decode(_)), "got {err:?}");
    assert!(std::error::Error::source(&err).is_some());
}

#[tokio::test]
async fn test_missing_secret_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = provider(&server)
        .await
        .obtain(
            &RequestContext::new(),
            &Secrets::new("client-1", "", "alice", "s3cret"),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::MissingParameter("pool_id")));
}

#[tokio::test]
async fn test_deadline_applies_to_login() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"AuthenticationResult": {"IdToken": "late"}}))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let ctx = RequestContext::new().with_timeout(Duration::from_millis(100));
    let err = provider(&server)
        .await
        .obtain(&ctx, &secrets())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AuthError::Transport(TransportError::DeadlineExceeded)
    ));
}
