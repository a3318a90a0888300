//! Twitter API adapter for posting generated tweets.

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use super::Poster;
use crate::config::credentials::TwitterCredentials;

/// Default API base URL (v2)
pub const DEFAULT_API_URL: &str = "https://api.twitter.com/2";

/// Errors from the posting API
#[derive(Debug, Error)]
pub enum PostError {
    #[error("Failed to reach Twitter API: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Twitter API rejected the tweet ({status}): {message}")]
    Rejected { status: u16, message: String },
}

/// Twitter API client
pub struct TwitterClient {
    /// OAuth 2.0 user-context access token
    bearer_token: String,
    /// API base URL
    api_url: String,
    /// HTTP client
    client: reqwest::Client,
}

/// Response from `POST /tweets`
#[derive(Debug, Deserialize)]
struct TweetResponse {
    data: Option<TweetData>,
    title: Option<String>,
    detail: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TweetData {
    id: String,
}

impl TwitterClient {
    /// Create a new client against the public API
    pub fn new(bearer_token: String) -> Self {
        Self::with_api_url(bearer_token, DEFAULT_API_URL.to_string())
    }

    /// Create a client against a custom base URL
    pub fn with_api_url(bearer_token: String, api_url: String) -> Self {
        Self {
            bearer_token,
            api_url: api_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Create from credentials
    pub fn from_credentials(credentials: TwitterCredentials) -> Self {
        match credentials.api_url {
            Some(api_url) => Self::with_api_url(credentials.bearer_token, api_url),
            None => Self::new(credentials.bearer_token),
        }
    }

    /// Build API URL
    fn api_url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.api_url, endpoint)
    }

    /// Post a status update, returning the new tweet id
    pub async fn send_tweet(&self, text: &str) -> Result<String, PostError> {
        let url = self.api_url("tweets");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.bearer_token)
            .json(&serde_json::json!({ "text": text }))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        let parsed: Option<TweetResponse> = serde_json::from_str(&body).ok();

        if !status.is_success() {
            let message = parsed
                .and_then(|r| r.detail.or(r.title))
                .unwrap_or(body);
            return Err(PostError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        match parsed.and_then(|r| r.data) {
            Some(data) => Ok(data.id),
            None => Err(PostError::Rejected {
                status: status.as_u16(),
                message: format!("Unexpected response: {}", body),
            }),
        }
    }
}

#[async_trait]
impl Poster for TwitterClient {
    fn name(&self) -> &str {
        "twitter"
    }

    async fn post(&self, message: &str) -> Result<String, PostError> {
        self.send_tweet(message).await
    }
}
