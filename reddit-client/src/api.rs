use crate::rate_limiter::{RateLimitConfig, RateLimitStatus, RateLimiter};
use reality_gap_core::{CoreError, RedditApiError};
use reqwest::{Client, Method, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info, warn};

pub const REDDIT_API_BASE: &str = "https://oauth.reddit.com";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditListing<T> {
    pub kind: String,
    pub data: RedditListingData<T>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditListingData<T> {
    pub children: Vec<RedditListingChild<T>>,
    pub after: Option<String>,
    pub before: Option<String>,
    #[serde(default)]
    pub dist: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditListingChild<T> {
    pub kind: String,
    pub data: T,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditPostData {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub selftext: String,
    pub subreddit: String,
    pub created_utc: f64,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub num_comments: u32,
    #[serde(default)]
    pub permalink: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditSubredditData {
    pub display_name: String,
    #[serde(default)]
    pub subscribers: Option<u64>,
    #[serde(default)]
    pub active_user_count: Option<u64>,
}

/// Parameters of one `/r/{sub}/search` page request.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchParams<'a> {
    pub query: &'a str,
    pub sort: &'a str,
    pub time_filter: &'a str,
    pub limit: u32,
    pub after: Option<&'a str>,
}

impl SearchParams<'_> {
    pub fn to_query(&self) -> Vec<(&str, String)> {
        let mut params = vec![
            ("q", self.query.to_string()),
            ("sort", self.sort.to_string()),
            ("limit", self.limit.to_string()),
            ("restrict_sr", "true".to_string()),
            ("t", self.time_filter.to_string()),
            ("raw_json", "1".to_string()),
        ];
        if let Some(after) = self.after {
            params.push(("after", after.to_string()));
        }
        params
    }
}

#[derive(Debug)]
pub struct RedditApiClient {
    http_client: Client,
    rate_limiter: RateLimiter,
    user_agent: String,
}

impl RedditApiClient {
    pub fn new(user_agent: &str, request_delay: Duration) -> Result<Self, CoreError> {
        let rate_limiter = RateLimiter::new(RateLimitConfig::reddit_search(request_delay));

        let http_client = Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http_client,
            rate_limiter,
            user_agent: user_agent.to_string(),
        })
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub async fn make_request(
        &self,
        method: Method,
        endpoint: &str,
        access_token: &str,
        query_params: Option<&[(&str, String)]>,
    ) -> Result<Response, CoreError> {
        let url = format!("{}{}", REDDIT_API_BASE, endpoint);

        let waited = self.rate_limiter.acquire_permit().await;
        debug!("Request slot for {} {} after {:?}", method, endpoint, waited);

        let mut request_builder = self
            .http_client
            .request(method.clone(), &url)
            .bearer_auth(access_token)
            .header("User-Agent", &self.user_agent);

        if let Some(params) = query_params {
            request_builder = request_builder.query(params);
        }

        debug!("Making Reddit API request: {} {}", method, endpoint);
        let response = request_builder.send().await.map_err(|e| {
            error!("Network error for {} {}: {}", method, endpoint, e);
            if e.is_timeout() {
                CoreError::RedditApi(RedditApiError::RequestTimeout)
            } else {
                CoreError::Network(e)
            }
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        error!("Request failed with status: {} for {}", status, endpoint);
        let error = status_to_error(status, retry_after_header(&response), endpoint);
        if let CoreError::RedditApi(RedditApiError::RateLimitExceeded { retry_after }) = &error {
            self.rate_limiter
                .record_rate_limited(Duration::from_secs(*retry_after))
                .await;
        }
        Err(error)
    }

    pub async fn get_me(&self, access_token: &str) -> Result<serde_json::Value, CoreError> {
        let response = self
            .make_request(Method::GET, "/api/v1/me", access_token, None)
            .await?;
        response.json().await.map_err(|e| {
            error!("Failed to parse /api/v1/me response: {}", e);
            CoreError::RedditApi(RedditApiError::InvalidResponse {
                details: "Failed to parse identity response".to_string(),
            })
        })
    }

    pub async fn search_subreddit(
        &self,
        access_token: &str,
        subreddit: &str,
        params: &SearchParams<'_>,
    ) -> Result<RedditListing<RedditPostData>, CoreError> {
        let endpoint = format!("/r/{}/search", subreddit);
        let query = params.to_query();

        let response = self
            .make_request(Method::GET, &endpoint, access_token, Some(query.as_slice()))
            .await
            .map_err(|e| match e {
                CoreError::RequestFailed {
                    status_code: Some(404),
                    ..
                } => CoreError::RedditApi(RedditApiError::SubredditNotFound {
                    subreddit: subreddit.to_string(),
                }),
                other => other,
            })?;

        let listing: RedditListing<RedditPostData> = response.json().await.map_err(|e| {
            error!("Failed to parse search results: {}", e);
            CoreError::RedditApi(RedditApiError::InvalidResponse {
                details: format!("Failed to parse search results for r/{}", subreddit),
            })
        })?;

        debug!(
            "Retrieved {} posts from r/{} for '{}'",
            listing.data.children.len(),
            subreddit,
            params.query
        );
        Ok(listing)
    }

    pub async fn get_subreddit_info(
        &self,
        access_token: &str,
        subreddit: &str,
    ) -> Result<RedditSubredditData, CoreError> {
        let endpoint = format!("/r/{}/about", subreddit);

        let response = self
            .make_request(Method::GET, &endpoint, access_token, None)
            .await?;

        let subreddit_response: RedditListingChild<RedditSubredditData> =
            response.json().await.map_err(|e| {
                error!("Failed to parse subreddit info: {}", e);
                CoreError::RedditApi(RedditApiError::InvalidResponse {
                    details: format!("Failed to parse info for r/{}", subreddit),
                })
            })?;

        info!(
            "r/{} has {} subscribers",
            subreddit,
            subreddit_response.data.subscribers.unwrap_or_default()
        );
        Ok(subreddit_response.data)
    }

    pub async fn rate_limit_status(&self) -> RateLimitStatus {
        self.rate_limiter.status().await
    }
}

fn retry_after_header(response: &Response) -> Option<u64> {
    response
        .headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<f64>().ok())
        .map(|secs| secs.ceil() as u64)
}

/// Maps a non-success status to the error taxonomy. 429 without a header
/// falls back to a 60 second wait.
pub fn status_to_error(status: StatusCode, retry_after: Option<u64>, endpoint: &str) -> CoreError {
    match status {
        StatusCode::TOO_MANY_REQUESTS => {
            let retry_after = retry_after.unwrap_or(60);
            warn!("Rate limited, retry after {} seconds", retry_after);
            CoreError::RedditApi(RedditApiError::RateLimitExceeded { retry_after })
        }
        StatusCode::UNAUTHORIZED => CoreError::RedditApi(RedditApiError::InvalidToken),
        StatusCode::FORBIDDEN => CoreError::RedditApi(RedditApiError::Forbidden {
            resource: endpoint.to_string(),
        }),
        s if s.is_server_error() => CoreError::RedditApi(RedditApiError::ServerError {
            status_code: s.as_u16(),
        }),
        s => CoreError::RequestFailed {
            message: format!("Reddit returned {} for {}", s, endpoint),
            status_code: Some(s.as_u16()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_parsing() {
        let body = r#"{
            "kind": "Listing",
            "data": {
                "after": "t3_abc",
                "before": null,
                "dist": 1,
                "modhash": "",
                "children": [
                    {"kind": "t3", "data": {
                        "id": "abc",
                        "title": "Laid off after 6 years",
                        "selftext": "",
                        "subreddit": "layoffs",
                        "created_utc": 1609459200.0,
                        "score": 42,
                        "num_comments": 7,
                        "permalink": "/r/layoffs/comments/abc/",
                        "over_18": false
                    }}
                ]
            }
        }"#;
        let listing: RedditListing<RedditPostData> = serde_json::from_str(body).unwrap();
        assert_eq!(listing.data.after.as_deref(), Some("t3_abc"));
        assert_eq!(listing.data.children.len(), 1);
        let post = &listing.data.children[0].data;
        assert_eq!(post.id, "abc");
        assert_eq!(post.score, 42);
    }

    #[test]
    fn test_subreddit_about_parsing() {
        let body = r#"{"kind": "t5", "data": {"display_name": "jobs", "subscribers": 2100000, "active_user_count": null}}"#;
        let about: RedditListingChild<RedditSubredditData> = serde_json::from_str(body).unwrap();
        assert_eq!(about.data.subscribers, Some(2_100_000));
    }

    #[test]
    fn test_search_params() {
        let params = SearchParams {
            query: "layoff timestamp:1577836800..1609459200",
            sort: "relevance",
            time_filter: "all",
            limit: 100,
            after: Some("t3_x"),
        };
        let query = params.to_query();
        assert!(query.contains(&("restrict_sr", "true".to_string())));
        assert!(query.contains(&("limit", "100".to_string())));
        assert!(query.contains(&("after", "t3_x".to_string())));
    }

    #[test]
    fn test_status_mapping() {
        assert!(matches!(
            status_to_error(StatusCode::TOO_MANY_REQUESTS, Some(7), "/r/jobs/search"),
            CoreError::RedditApi(RedditApiError::RateLimitExceeded { retry_after: 7 })
        ));
        assert!(matches!(
            status_to_error(StatusCode::TOO_MANY_REQUESTS, None, "/r/jobs/search"),
            CoreError::RedditApi(RedditApiError::RateLimitExceeded { retry_after: 60 })
        ));
        assert!(matches!(
            status_to_error(StatusCode::UNAUTHORIZED, None, "/api/v1/me"),
            CoreError::RedditApi(RedditApiError::InvalidToken)
        ));
        assert!(matches!(
            status_to_error(StatusCode::BAD_GATEWAY, None, "/r/jobs/search"),
            CoreError::RedditApi(RedditApiError::ServerError { status_code: 502 })
        ));
        assert!(matches!(
            status_to_error(StatusCode::NOT_FOUND, None, "/r/nope/search"),
            CoreError::RequestFailed {
                status_code: Some(404),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_api_client_creation() {
        let client = RedditApiClient::new("test-user-agent/1.0", Duration::from_secs(1)).unwrap();
        assert_eq!(client.user_agent(), "test-user-agent/1.0");

        let status = client.rate_limit_status().await;
        assert_eq!(status.requests, 0);
    }
}
