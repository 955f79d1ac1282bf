//! API data models

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};

use crate::classify::ClassifyError;
use crate::finder::FinderError;
use crate::source::RedditError;

/// Query string of `GET /discussions`
#[derive(Debug, Deserialize)]
pub struct DiscussionsQuery {
    /// Community name, without the `r/` prefix
    pub subreddit: String,
    /// Overrides the configured search limit
    pub limit: Option<usize>,
}

/// Body of `GET /`
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: u16,
}

/// Error returned by a handler, rendered as `{"error": message}`
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<FinderError> for ApiError {
    fn from(err: FinderError) -> Self {
        let status = match &err {
            FinderError::Classify(ClassifyError::EmptyBatch) => StatusCode::NOT_FOUND,
            FinderError::Classify(_) => StatusCode::INTERNAL_SERVER_ERROR,
            FinderError::Source(RedditError::NotFound(_)) => StatusCode::NOT_FOUND,
            FinderError::Source(RedditError::RateLimit { .. }) => StatusCode::SERVICE_UNAVAILABLE,
            FinderError::Source(RedditError::InvalidCommunity(_)) => StatusCode::BAD_REQUEST,
            FinderError::Source(_) => StatusCode::BAD_GATEWAY,
            FinderError::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(serde_json::json!({"error": self.message}))).into_response()
    }
}
