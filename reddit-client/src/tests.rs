use crate::{AuthState, RedditClient, RedditCredentials, RedditToken};
use reality_gap_core::{ConfigError, RetryConfig, Secrets};
use std::time::{Duration, Instant};

fn create_test_credentials() -> RedditCredentials {
    RedditCredentials::new(
        "test_client_id".to_string(),
        "test_client_secret".to_string(),
        "reality-gap/0.1 by test_user".to_string(),
    )
}

fn create_test_client() -> RedditClient {
    RedditClient::new(
        create_test_credentials(),
        Duration::from_millis(10),
        RetryConfig::immediate(1),
    )
    .unwrap()
}

#[test]
fn test_credentials_from_secrets() {
    let secrets = Secrets::from_json(
        r#"{
            "REDDIT_CLIENT_ID": "abc",
            "REDDIT_CLIENT_SECRET": "shh",
            "REDDIT_USER_AGENT": "reality-gap/0.1"
        }"#,
    )
    .unwrap();

    let credentials = RedditCredentials::from_secrets(&secrets).unwrap();
    assert_eq!(credentials.client_id, "abc");
    assert_eq!(credentials.client_secret, "shh");
    assert_eq!(credentials.user_agent, "reality-gap/0.1");
}

#[test]
fn test_credentials_missing_field() {
    let secrets = Secrets::from_json(r#"{"REDDIT_CLIENT_ID": "abc"}"#).unwrap();
    let result = RedditCredentials::from_secrets(&secrets);
    assert!(matches!(result, Err(ConfigError::MissingField { .. })));
}

#[tokio::test]
async fn test_client_creation() {
    let client = create_test_client();
    assert!(!client.is_authenticated());
    assert!(!client.needs_refresh());
    assert!(matches!(
        client.get_auth_state(),
        AuthState::NotAuthenticated
    ));
    assert_eq!(client.api().user_agent(), "reality-gap/0.1 by test_user");
}

#[test]
fn test_token_expiry() {
    let valid = RedditToken::new("valid".to_string(), Some(Duration::from_secs(3600)));
    assert!(!valid.is_expired());

    // Inside the refresh margin counts as expired
    let expiring = RedditToken::new("expiring".to_string(), Some(Duration::from_secs(30)));
    assert!(expiring.is_expired());

    let expired = RedditToken {
        access_token: "expired".to_string(),
        expires_at: Some(Instant::now()),
    };
    assert!(expired.is_expired());

    let no_expiry = RedditToken::new("forever".to_string(), None);
    assert!(!no_expiry.is_expired());
}

#[tokio::test]
async fn test_auth_state_transitions() {
    let mut client = create_test_client();

    client.set_token(RedditToken::new(
        "valid".to_string(),
        Some(Duration::from_secs(3600)),
    ));
    assert!(client.is_authenticated());
    assert!(!client.needs_refresh());

    client.set_token(RedditToken::new(
        "stale".to_string(),
        Some(Duration::from_secs(1)),
    ));
    assert!(!client.is_authenticated());
    assert!(client.needs_refresh());
}

#[tokio::test]
async fn test_access_token_reuses_valid_token() {
    let mut client = create_test_client();
    client.set_token(RedditToken::new(
        "cached".to_string(),
        Some(Duration::from_secs(3600)),
    ));

    let token = client.access_token().await.unwrap();
    assert_eq!(token, "cached");
}
