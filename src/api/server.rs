//! HTTP server implementation for the API

use anyhow::Result;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

use super::models::{ApiError, DiscussionsQuery, StatusResponse};
use crate::classify::{DiscussionRecord, OutlierFilter};
use crate::config::AppConfig;
use crate::finder::DiscussionFinder;
use crate::source::reddit::MAX_SEARCH_LIMIT;
use crate::source::{is_valid_community, SubmissionSource};

/// Finder shared by all requests
pub type SharedFinder = Arc<DiscussionFinder<Box<dyn SubmissionSource>>>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub finder: SharedFinder,
}

impl AppState {
    /// Wrap any submission source
    pub fn new(finder: DiscussionFinder<Box<dyn SubmissionSource>>) -> Self {
        Self {
            finder: Arc::new(finder),
        }
    }
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(status_handler))
        .route("/discussions", get(discussions_handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Configure and start the HTTP server
pub async fn serve(config: &AppConfig) -> Result<()> {
    let source: Box<dyn SubmissionSource> = Box::new(config.reddit_client()?);
    let finder = DiscussionFinder::new(source)
        .with_limit(config.search_limit())
        .with_filter(OutlierFilter::with_threshold(config.outlier_threshold()));
    let app = router(AppState::new(finder));

    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    info!("API server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("API server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        // No signal handler available: run until the process is killed
        std::future::pending::<()>().await;
    }
}

/// Liveness handler
async fn status_handler() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: StatusCode::OK.as_u16(),
    })
}

/// Discussions of one community
async fn discussions_handler(
    State(state): State<AppState>,
    Query(query): Query<DiscussionsQuery>,
) -> Result<Json<Vec<DiscussionRecord>>, ApiError> {
    let subreddit = query.subreddit.trim().trim_start_matches("r/");
    if subreddit.is_empty() {
        return Err(ApiError::bad_request("subreddit must not be empty"));
    }
    if !is_valid_community(subreddit) {
        return Err(ApiError::bad_request(format!(
            "invalid subreddit name `{}`",
            subreddit
        )));
    }

    if let Some(limit) = query.limit {
        if limit == 0 || limit > MAX_SEARCH_LIMIT {
            return Err(ApiError::bad_request(format!(
                "limit must be between 1 and {}",
                MAX_SEARCH_LIMIT
            )));
        }
    }

    let report = state.finder.report(subreddit, query.limit).await?;
    Ok(Json(report.discussions))
}
