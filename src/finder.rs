//! Discussion finder
//!
//! Runs the classification pipeline (pattern selection, extraction,
//! outlier removal) over the submissions of one community.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;
use tracing::info;

use crate::classify::{extract, select_pattern, ClassifyError, DiscussionRecord, OutlierFilter};
use crate::source::{RawSubmission, RedditError, SubmissionSource};

/// Default number of submissions fetched per community
pub const DEFAULT_SEARCH_LIMIT: usize = 200;

/// Errors surfaced to callers of the finder
#[derive(Debug, Error)]
pub enum FinderError {
    /// The submission source failed; never retried here
    #[error(transparent)]
    Source(#[from] RedditError),

    /// The batch could not be classified
    #[error(transparent)]
    Classify(#[from] ClassifyError),

    /// The blocking classification task panicked or was cancelled
    #[error("Classification task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Classify a batch of submissions into ordered discussion records
pub fn find_discussions(
    submissions: &[RawSubmission],
    filter: &OutlierFilter,
) -> Result<Vec<DiscussionRecord>, ClassifyError> {
    let pattern = select_pattern(submissions.iter().map(|s| s.title.as_str()))?;
    let records = extract(submissions, pattern);
    Ok(filter.filter(records))
}

/// Counts describing one run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DiscussionSummary {
    /// Community searched
    pub community: String,
    /// Submissions returned by the source
    pub submission_count: usize,
    /// Discussions kept after classification
    pub discussion_count: usize,
    /// Distinct seasons among the kept discussions
    pub season_count: usize,
}

impl DiscussionSummary {
    /// Summarize a finished run
    pub fn new(community: &str, submission_count: usize, discussions: &[DiscussionRecord]) -> Self {
        let seasons: BTreeSet<u32> = discussions.iter().map(|d| d.season).collect();
        Self {
            community: community.to_string(),
            submission_count,
            discussion_count: discussions.len(),
            season_count: seasons.len(),
        }
    }
}

/// Discussions of one community plus their summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscussionReport {
    pub meta: DiscussionSummary,
    pub discussions: Vec<DiscussionRecord>,
}

/// Fetches a community's submissions and classifies them
pub struct DiscussionFinder<S> {
    source: S,
    limit: usize,
    filter: OutlierFilter,
}

impl<S: SubmissionSource> DiscussionFinder<S> {
    /// Create a finder with the default limit and outlier threshold
    pub fn new(source: S) -> Self {
        Self {
            source,
            limit: DEFAULT_SEARCH_LIMIT,
            filter: OutlierFilter::new(),
        }
    }

    /// Override the number of submissions fetched
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Override the outlier filter
    pub fn with_filter(mut self, filter: OutlierFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Default fetch limit
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Ordered discussions of `community`
    pub async fn discussions(&self, community: &str) -> Result<Vec<DiscussionRecord>, FinderError> {
        Ok(self.report(community, None).await?.discussions)
    }

    /// Discussions of `community` with a summary, optionally overriding the limit
    ///
    /// Classification is quadratic in the batch size and runs on the
    /// blocking thread pool, so async workers keep serving while it runs.
    pub async fn report(
        &self,
        community: &str,
        limit: Option<usize>,
    ) -> Result<DiscussionReport, FinderError> {
        let limit = limit.unwrap_or(self.limit);
        let submissions = self.source.fetch(community, limit).await?;
        let submission_count = submissions.len();

        let filter = self.filter;
        let discussions =
            tokio::task::spawn_blocking(move || find_discussions(&submissions, &filter)).await??;
        let meta = DiscussionSummary::new(community, submission_count, &discussions);

        info!(
            "r/{}: {} discussions across {} seasons from {} submissions",
            community, meta.discussion_count, meta.season_count, meta.submission_count
        );

        Ok(DiscussionReport { meta, discussions })
    }
}
