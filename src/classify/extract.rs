//! Discussion record extraction
//!
//! Converts the submissions that match the selected pattern into ordered
//! discussion records.

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::pattern::TitlePattern;
use super::ClassifyError;
use crate::source::RawSubmission;

/// Display format for creation times
///
/// The time is rendered in the host's local zone but labelled `UTC`. This
/// matches the format existing consumers parse; see DESIGN.md.
const CREATED_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

/// One episode discussion thread
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DiscussionRecord {
    /// Season number (1 when the convention has no season)
    pub season: u32,
    /// Episode number
    pub episode: u32,
    /// Original submission title
    pub title: String,
    /// Creation time, e.g. "2021-05-01 08:00:00 UTC"
    pub created: String,
    /// Number of comments
    pub comment_count: u64,
    /// Submission URL
    pub url: String,
}

impl DiscussionRecord {
    /// Build a record from a submission the pattern matched
    ///
    /// Returns `Ok(None)` when the pattern does not match the title.
    pub fn from_submission(
        submission: &RawSubmission,
        pattern: &TitlePattern,
    ) -> Result<Option<Self>, ClassifyError> {
        let Some((season, episode)) = pattern.captures(&submission.title) else {
            return Ok(None);
        };

        let season = parse_field(&submission.title, "season", pattern.has_season, season)?;
        let episode = parse_field(&submission.title, "episode", pattern.has_episode, episode)?;

        Ok(Some(Self {
            season,
            episode,
            title: submission.title.clone(),
            created: format_created(submission.created_utc),
            comment_count: submission.comment_count,
            url: submission.url.clone(),
        }))
    }

    /// Ordering key: season, then episode, then title
    pub fn sort_key(&self) -> (u32, u32, &str) {
        (self.season, self.episode, &self.title)
    }
}

fn parse_field(
    title: &str,
    field: &'static str,
    captured_by_pattern: bool,
    value: Option<&str>,
) -> Result<u32, ClassifyError> {
    match value {
        Some(value) if captured_by_pattern => {
            value
                .parse::<u32>()
                .map_err(|_| ClassifyError::UnparseableField {
                    title: title.to_string(),
                    field,
                    value: value.to_string(),
                })
        }
        _ => Ok(1),
    }
}

/// Render a creation time for display
pub fn format_created(created_utc: DateTime<Utc>) -> String {
    created_utc
        .with_timezone(&Local)
        .format(CREATED_FORMAT)
        .to_string()
}

/// Extract records for every submission matching `pattern`, sorted by
/// season, episode and title
///
/// Titles that do not match are skipped. A title whose numbers cannot be
/// parsed is skipped too; neither aborts the batch.
pub fn extract(submissions: &[RawSubmission], pattern: &TitlePattern) -> Vec<DiscussionRecord> {
    let mut records: Vec<DiscussionRecord> = submissions
        .iter()
        .filter_map(|submission| match DiscussionRecord::from_submission(submission, pattern) {
            Ok(Some(record)) => {
                debug!("Matched: `{}`", record.title);
                Some(record)
            }
            Ok(None) => None,
            Err(e) => {
                warn!("Dropping submission: {}", e);
                None
            }
        })
        .collect();

    records.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
    records
}
