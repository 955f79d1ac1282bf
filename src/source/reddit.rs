//! Reddit API HTTP client
//!
//! Provides a submission source backed by the Reddit API with:
//! - Application-only OAuth (client credentials)
//! - One bounded search per fetch, paged with the listing cursor
//! - Error handling with network vs API error distinction
//! - Retry logic with exponential backoff

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::header::USER_AGENT;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::{RawSubmission, SubmissionSource};

/// Reddit never returns more than this many search results
pub const MAX_SEARCH_LIMIT: usize = 1000;

/// Most children Reddit puts in one listing page
pub const PAGE_SIZE: usize = 100;

/// Upper bound on a single backoff wait
const MAX_BACKOFF_SECS: u64 = 300;

static COMMUNITY_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_]{1,21}$").expect("Invalid community name regex"));

/// Whether `name` is a well-formed community name (without the `r/` prefix)
pub fn is_valid_community(name: &str) -> bool {
    COMMUNITY_NAME.is_match(name)
}

/// Exponential backoff for the given attempt, capped
fn backoff_secs(attempt: u32) -> u64 {
    2_u64.saturating_pow(attempt).min(MAX_BACKOFF_SECS)
}

// =============================================================================
// Error Types
// =============================================================================

/// Reddit API errors
#[derive(Debug, Error)]
pub enum RedditError {
    /// Network error (connection failed, timeout, etc.)
    #[error("Network error: {0}")]
    Network(String),

    /// API error (4xx/5xx responses)
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// Response parsing error
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded, retry after {retry_after_secs} seconds")]
    RateLimit { retry_after_secs: u64 },

    /// Rejected credentials or forbidden community
    #[error("Unauthorized")]
    Unauthorized,

    /// Community does not exist
    #[error("Community not found: {0}")]
    NotFound(String),

    /// Community name that cannot be put in a request path
    #[error("Invalid community name: {0}")]
    InvalidCommunity(String),
}

impl From<reqwest::Error> for RedditError {
    fn from(err: reqwest::Error) -> Self {
        RedditError::Network(err.to_string())
    }
}

// =============================================================================
// Internal API Response Types
// =============================================================================

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<Child>,
    /// Cursor of the next page, absent on the last one
    #[serde(default)]
    after: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Child {
    data: SubmissionData,
}

#[derive(Debug, Deserialize)]
struct SubmissionData {
    title: String,
    created_utc: f64,
    #[serde(default)]
    num_comments: u64,
    #[serde(default)]
    url: String,
}

impl SubmissionData {
    fn into_raw(self) -> Result<RawSubmission, RedditError> {
        let secs = self.created_utc.trunc() as i64;
        let nanos = (self.created_utc.fract() * 1e9).round() as u32;
        let created_utc = DateTime::<Utc>::from_timestamp(secs, nanos.min(999_999_999))
            .ok_or_else(|| {
                RedditError::Parse(format!("invalid created_utc {}", self.created_utc))
            })?;

        Ok(RawSubmission {
            title: self.title,
            created_utc,
            comment_count: self.num_comments,
            url: self.url,
        })
    }
}

// =============================================================================
// Reddit Client
// =============================================================================

/// Reddit API client
pub struct RedditClient {
    client: reqwest::Client,
    client_id: String,
    client_secret: String,
    user_agent: String,
    search_query: String,
    auth_url: String,
    api_url: String,
    timeout: Duration,
    max_retries: u32,
}

impl RedditClient {
    /// Host issuing OAuth tokens
    pub const DEFAULT_AUTH_URL: &'static str = "https://www.reddit.com";

    /// Host serving authenticated API requests
    pub const DEFAULT_API_URL: &'static str = "https://oauth.reddit.com";

    /// Search terms used to find discussion threads
    pub const DEFAULT_SEARCH_QUERY: &'static str = "episode discussion";

    /// Create a new Reddit client
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        user_agent: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            user_agent: user_agent.into(),
            search_query: Self::DEFAULT_SEARCH_QUERY.to_string(),
            auth_url: Self::DEFAULT_AUTH_URL.to_string(),
            api_url: Self::DEFAULT_API_URL.to_string(),
            timeout: Duration::from_secs(30),
            max_retries: 3,
        }
    }

    /// Point the client at other hosts (used by tests against a mock server)
    pub fn with_base_urls(mut self, auth_url: impl Into<String>, api_url: impl Into<String>) -> Self {
        self.auth_url = auth_url.into();
        self.api_url = api_url.into();
        self
    }

    /// Override the search terms
    pub fn with_search_query(mut self, query: impl Into<String>) -> Self {
        self.search_query = query.into();
        self
    }

    /// Override request timeout and retry count
    pub fn with_retry_policy(mut self, timeout: Duration, max_retries: u32) -> Self {
        self.timeout = timeout;
        self.max_retries = max_retries;
        self
    }

    /// Search a community for up to `limit` submissions
    ///
    /// Pages through the listing until `limit` submissions are collected or
    /// Reddit reports no further page.
    pub async fn search(&self, community: &str, limit: usize) -> Result<Vec<RawSubmission>, RedditError> {
        if !is_valid_community(community) {
            return Err(RedditError::InvalidCommunity(community.to_string()));
        }

        let limit = limit.clamp(1, MAX_SEARCH_LIMIT);
        info!("Searching r/{} for `{}` (limit={})", community, self.search_query, limit);

        let mut token = None;
        let mut submissions = Vec::with_capacity(limit);
        let mut after: Option<String> = None;

        while submissions.len() < limit {
            let page_size = (limit - submissions.len()).min(PAGE_SIZE);
            let (page, next) = self
                .search_page_with_retry(&mut token, community, page_size, after.as_deref())
                .await?;

            debug!("Page of {} submissions from r/{}", page.len(), community);
            let empty = page.is_empty();
            submissions.extend(page);

            match next {
                Some(cursor) if !empty => after = Some(cursor),
                _ => break,
            }
        }

        submissions.truncate(limit);
        info!("Found {} submissions in r/{}", submissions.len(), community);
        Ok(submissions)
    }

    /// Fetch one page, retrying rate limits and network failures
    async fn search_page_with_retry(
        &self,
        token: &mut Option<String>,
        community: &str,
        page_size: usize,
        after: Option<&str>,
    ) -> Result<(Vec<RawSubmission>, Option<String>), RedditError> {
        let mut retry_count = 0;

        loop {
            match self.search_page(token, community, page_size, after).await {
                Ok(page) => return Ok(page),
                Err(RedditError::RateLimit { retry_after_secs }) if retry_count < self.max_retries => {
                    // Exponential backoff with rate limit hint
                    let wait_time = std::cmp::max(retry_after_secs, backoff_secs(retry_count));
                    warn!("Rate limited by Reddit, waiting {}s", wait_time);
                    tokio::time::sleep(Duration::from_secs(wait_time)).await;
                    retry_count += 1;
                }
                Err(RedditError::Network(msg)) if retry_count < self.max_retries => {
                    let wait_time = backoff_secs(retry_count);
                    warn!("Network error talking to Reddit ({}), retrying in {}s", msg, wait_time);
                    tokio::time::sleep(Duration::from_secs(wait_time)).await;
                    retry_count += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn search_page(
        &self,
        token: &mut Option<String>,
        community: &str,
        page_size: usize,
        after: Option<&str>,
    ) -> Result<(Vec<RawSubmission>, Option<String>), RedditError> {
        let bearer = match token.clone() {
            Some(bearer) => bearer,
            None => {
                let fresh = self.access_token().await?;
                *token = Some(fresh.clone());
                fresh
            }
        };

        let url = format!("{}/r/{}/search", self.api_url, community);
        let page_size = page_size.to_string();

        let mut request = self
            .client
            .get(&url)
            .header(USER_AGENT, &self.user_agent)
            .bearer_auth(bearer)
            .query(&[
                ("q", self.search_query.as_str()),
                ("restrict_sr", "1"),
                ("sort", "relevance"),
                ("limit", page_size.as_str()),
                ("raw_json", "1"),
            ]);
        if let Some(cursor) = after {
            request = request.query(&[("after", cursor)]);
        }

        let response = request.timeout(self.timeout).send().await?;

        let status = response.status();
        check_status(&response, community)?;

        let response_text = response.text().await?;
        if !status.is_success() {
            return Err(RedditError::Api {
                status: status.as_u16(),
                message: response_text,
            });
        }

        let listing: Listing = serde_json::from_str(&response_text)
            .map_err(|e| RedditError::Parse(format!("{}: {}", e, response_text)))?;

        let page = listing
            .data
            .children
            .into_iter()
            .map(|child| child.data.into_raw())
            .collect::<Result<Vec<_>, _>>()?;

        Ok((page, listing.data.after))
    }

    /// Obtain an application-only bearer token
    async fn access_token(&self) -> Result<String, RedditError> {
        let url = format!("{}/api/v1/access_token", self.auth_url);
        debug!("Requesting access token from {}", url);

        let response = self
            .client
            .post(&url)
            .header(USER_AGENT, &self.user_agent)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .timeout(self.timeout)
            .send()
            .await?;

        let status = response.status();
        check_status(&response, "").map_err(|e| match e {
            RedditError::NotFound(_) => RedditError::Api {
                status: 404,
                message: format!("token endpoint not found: {}", url),
            },
            other => other,
        })?;

        let response_text = response.text().await?;
        if !status.is_success() {
            return Err(RedditError::Api {
                status: status.as_u16(),
                message: response_text,
            });
        }

        let token: TokenResponse = serde_json::from_str(&response_text)
            .map_err(|e| RedditError::Parse(format!("{}: {}", e, response_text)))?;

        // Reddit answers bad credentials with 200 and an error body
        if let Some(error) = token.error {
            warn!("Token request rejected: {}", error);
            return Err(RedditError::Unauthorized);
        }

        token
            .access_token
            .ok_or_else(|| RedditError::Parse("No access_token in response".to_string()))
    }

    /// Get the user agent
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Get the search query
    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    /// Get the API base URL
    pub fn api_url(&self) -> &str {
        &self.api_url
    }
}

/// Map the status codes every Reddit endpoint shares
fn check_status(response: &reqwest::Response, community: &str) -> Result<(), RedditError> {
    match response.status().as_u16() {
        429 => {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(60);
            Err(RedditError::RateLimit {
                retry_after_secs: retry_after,
            })
        }
        401 | 403 => Err(RedditError::Unauthorized),
        404 => Err(RedditError::NotFound(community.to_string())),
        _ => Ok(()),
    }
}

#[async_trait]
impl SubmissionSource for RedditClient {
    async fn fetch(&self, community: &str, limit: usize) -> Result<Vec<RawSubmission>, RedditError> {
        self.search(community, limit).await
    }
}
