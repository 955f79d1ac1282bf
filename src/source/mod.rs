//! Submission source module
//!
//! Provides the raw submissions the classifier works on. The classifier
//! never fetches anything itself; it consumes what a [`SubmissionSource`]
//! returns.

pub mod reddit;

pub use reddit::{is_valid_community, RedditClient, RedditError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A submission as returned by the forum, before any classification
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawSubmission {
    /// Submission title
    pub title: String,
    /// Creation time
    pub created_utc: DateTime<Utc>,
    /// Number of comments
    pub comment_count: u64,
    /// Link to the submission (or to what it links to)
    pub url: String,
}

impl RawSubmission {
    /// Create a new raw submission
    pub fn new(
        title: impl Into<String>,
        created_utc: DateTime<Utc>,
        comment_count: u64,
        url: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            created_utc,
            comment_count,
            url: url.into(),
        }
    }
}

/// Anything that can return the discussion submissions of a community
#[async_trait]
pub trait SubmissionSource: Send + Sync {
    /// Fetch at most `limit` submissions for `community` in one bounded fetch
    async fn fetch(&self, community: &str, limit: usize)
        -> Result<Vec<RawSubmission>, RedditError>;
}

#[async_trait]
impl<T: SubmissionSource + ?Sized> SubmissionSource for Box<T> {
    async fn fetch(&self, community: &str, limit: usize) -> Result<Vec<RawSubmission>, RedditError> {
        (**self).fetch(community, limit).await
    }
}

#[async_trait]
impl<T: SubmissionSource + ?Sized> SubmissionSource for std::sync::Arc<T> {
    async fn fetch(&self, community: &str, limit: usize) -> Result<Vec<RawSubmission>, RedditError> {
        (**self).fetch(community, limit).await
    }
}
