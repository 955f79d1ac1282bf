//! Title classification module
//!
//! Turns a batch of raw submission titles into ordered discussion records:
//!
//! 1. [`select_pattern`] picks the title convention the community uses
//! 2. [`extract`] pulls season/episode numbers out of matching titles
//! 3. [`OutlierFilter`] drops titles that do not look like the rest
//!
//! All three steps are pure functions of their input.

mod extract;
mod outlier;
mod pattern;
mod similarity;

pub use extract::{extract, DiscussionRecord};
pub use outlier::{OutlierFilter, DEFAULT_OUTLIER_THRESHOLD};
pub use pattern::{first_match, select_pattern, PatternKind, TitlePattern, TITLE_PATTERNS};
pub use similarity::{indel_ratio, partial_ratio};

use thiserror::Error;

/// Classification errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ClassifyError {
    /// No titles to choose a pattern from
    #[error("Empty batch: no titles to classify")]
    EmptyBatch,

    /// A captured season/episode does not fit an integer
    #[error("Unparseable {field} `{value}` in title `{title}`")]
    UnparseableField {
        title: String,
        field: &'static str,
        value: String,
    },
}
