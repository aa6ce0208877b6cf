pub mod api;
pub mod rate_limiter;
pub mod search;

#[cfg(test)]
mod tests;

pub use api::{RedditApiClient, RedditListing, RedditPostData, RedditSubredditData, SearchParams};
pub use rate_limiter::{RateLimitConfig, RateLimitStatus, RateLimiter};
pub use search::{
    clean_text, harvest, plan_queries, search_all_pages, HarvestProgress, HarvestStats,
    LogProgress, SearchBackend, SearchQuery,
};

use oauth2::basic::BasicClient;
use oauth2::{AuthUrl, ClientId, ClientSecret, HttpRequest, HttpResponse, TokenResponse, TokenUrl};
use reality_gap_core::{
    ConfigError, CoreError, RedditApiError, RetryConfig, RetryExecutor, Secrets,
};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

pub const REDDIT_AUTH_URL: &str = "https://www.reddit.com/api/v1/authorize";
pub const REDDIT_TOKEN_URL: &str = "https://www.reddit.com/api/v1/access_token";

/// Tokens are refreshed this long before Reddit considers them expired.
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Script-app credentials for the client-credentials grant.
#[derive(Debug, Clone, PartialEq)]
pub struct RedditCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub user_agent: String,
}

impl RedditCredentials {
    pub fn new(client_id: String, client_secret: String, user_agent: String) -> Self {
        Self {
            client_id,
            client_secret,
            user_agent,
        }
    }

    pub fn from_secrets(secrets: &Secrets) -> Result<Self, ConfigError> {
        Ok(Self::new(
            secrets.reddit_client_id()?.to_string(),
            secrets.reddit_client_secret()?.to_string(),
            secrets.reddit_user_agent()?.to_string(),
        ))
    }
}

#[derive(Debug, Clone)]
pub struct RedditToken {
    pub access_token: String,
    pub expires_at: Option<Instant>,
}

impl RedditToken {
    pub fn new(access_token: String, expires_in: Option<Duration>) -> Self {
        Self {
            access_token,
            expires_at: expires_in.map(|d| Instant::now() + d),
        }
    }

    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => Instant::now() + TOKEN_EXPIRY_MARGIN >= expires_at,
            None => false,
        }
    }
}

#[derive(Debug, Clone)]
pub enum AuthState {
    NotAuthenticated,
    Authenticated(RedditToken),
}

/// Application-only Reddit client: OAuth token handling, paced API calls and
/// retries around every request.
pub struct RedditClient {
    oauth_client: BasicClient,
    token_http: reqwest::Client,
    api: RedditApiClient,
    retry: RetryExecutor,
    auth_state: AuthState,
}

impl RedditClient {
    pub fn new(
        credentials: RedditCredentials,
        request_delay: Duration,
        retry_config: RetryConfig,
    ) -> Result<Self, CoreError> {
        let auth_url = AuthUrl::new(REDDIT_AUTH_URL.to_string()).map_err(|e| {
            RedditApiError::AuthenticationFailed {
                reason: format!("Invalid auth URL: {}", e),
            }
        })?;
        let token_url = TokenUrl::new(REDDIT_TOKEN_URL.to_string()).map_err(|e| {
            RedditApiError::AuthenticationFailed {
                reason: format!("Invalid token URL: {}", e),
            }
        })?;

        let oauth_client = BasicClient::new(
            ClientId::new(credentials.client_id),
            Some(ClientSecret::new(credentials.client_secret)),
            auth_url,
            Some(token_url),
        );

        // Reddit rejects token requests without a descriptive user agent
        let token_http = reqwest::Client::builder()
            .user_agent(credentials.user_agent.as_str())
            .redirect(reqwest::redirect::Policy::none())
            .timeout(Duration::from_secs(30))
            .build()?;

        let api = RedditApiClient::new(&credentials.user_agent, request_delay)?;

        Ok(Self {
            oauth_client,
            token_http,
            api,
            retry: RetryExecutor::new(retry_config),
            auth_state: AuthState::NotAuthenticated,
        })
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(&self.auth_state, AuthState::Authenticated(token) if !token.is_expired())
    }

    pub fn needs_refresh(&self) -> bool {
        matches!(&self.auth_state, AuthState::Authenticated(token) if token.is_expired())
    }

    pub fn get_auth_state(&self) -> &AuthState {
        &self.auth_state
    }

    pub fn set_token(&mut self, token: RedditToken) {
        self.auth_state = AuthState::Authenticated(token);
    }

    pub fn api(&self) -> &RedditApiClient {
        &self.api
    }

    pub fn retry_executor(&self) -> &RetryExecutor {
        &self.retry
    }

    /// Requests a fresh application-only token.
    pub async fn authenticate(&mut self) -> Result<(), CoreError> {
        info!("Requesting Reddit application token");
        let http = self.token_http.clone();

        let response = self
            .oauth_client
            .exchange_client_credentials()
            .request_async(|request| send_oauth_request(http, request))
            .await
            .map_err(|e| {
                warn!("Reddit token exchange failed: {}", e);
                RedditApiError::AuthenticationFailed {
                    reason: e.to_string(),
                }
            })?;

        let token = RedditToken::new(
            response.access_token().secret().to_string(),
            response.expires_in(),
        );
        debug!("Reddit token valid for {:?}", response.expires_in());
        self.auth_state = AuthState::Authenticated(token);
        Ok(())
    }

    /// Current access token, re-authenticating when it is missing or expiring.
    pub async fn access_token(&mut self) -> Result<String, CoreError> {
        if !self.is_authenticated() {
            if self.needs_refresh() {
                info!("Reddit token expiring, refreshing");
            }
            self.authenticate().await?;
        }
        match &self.auth_state {
            AuthState::Authenticated(token) => Ok(token.access_token.clone()),
            AuthState::NotAuthenticated => Err(RedditApiError::InvalidToken.into()),
        }
    }

    /// Confirms the credentials work by calling `/api/v1/me`.
    pub async fn verify(&mut self) -> Result<(), CoreError> {
        let token = self.access_token().await?;
        let api = &self.api;
        self.retry
            .execute("reddit_verify", || api.get_me(&token))
            .await?;
        info!("Reddit credentials verified");
        Ok(())
    }

    pub async fn subscriber_count(&mut self, subreddit: &str) -> Result<Option<u64>, CoreError> {
        let token = self.access_token().await?;
        let api = &self.api;
        let info = self
            .retry
            .execute(&format!("reddit_about_{}", subreddit), || {
                api.get_subreddit_info(&token, subreddit)
            })
            .await?;
        Ok(info.subscribers)
    }
}

impl SearchBackend for RedditClient {
    async fn search_page(
        &mut self,
        subreddit: &str,
        params: &SearchParams<'_>,
    ) -> Result<RedditListing<RedditPostData>, CoreError> {
        let token = self.access_token().await?;
        let api = &self.api;
        let result = self
            .retry
            .execute(&format!("reddit_search_{}", subreddit), || {
                api.search_subreddit(&token, subreddit, params)
            })
            .await;

        // A rejected token mid-run is replaced once before giving up
        match result {
            Err(CoreError::RedditApi(RedditApiError::InvalidToken)) => {
                warn!("Reddit token rejected, re-authenticating");
                self.authenticate().await?;
                let token = self.access_token().await?;
                self.api.search_subreddit(&token, subreddit, params).await
            }
            other => other,
        }
    }
}

async fn send_oauth_request(
    http: reqwest::Client,
    request: HttpRequest,
) -> Result<HttpResponse, reqwest::Error> {
    let response = http
        .request(request.method, request.url.as_str())
        .headers(request.headers)
        .body(request.body)
        .send()
        .await?;

    let status_code = response.status();
    let headers = response.headers().clone();
    let body = response.bytes().await?.to_vec();

    Ok(HttpResponse {
        status_code,
        headers,
        body,
    })
}
