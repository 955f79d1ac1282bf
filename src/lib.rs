//! episode-finder: episode discussion threads of a community
//!
//! This library finds a community's episode discussion threads, works out
//! which title convention the community uses, extracts season and episode
//! numbers and drops threads whose titles do not fit in.
//!
//! # Features
//!
//! - Title convention selection by popularity ("S01E02", "1x02",
//!   "Season 1 Episode 2", "Episode 2")
//! - Season/episode extraction and ordering
//! - Outlier removal by partial-ratio title similarity
//! - Reddit submission source
//! - HTTP API
//!
//! # Modules
//!
//! - `classify`: pattern selection, extraction and outlier filtering
//! - `finder`: pipeline orchestration over a submission source
//! - `source`: submission sources (Reddit)
//! - `config`: configuration file and environment handling
//! - `api`: HTTP server

pub mod api;
pub mod classify;
pub mod config;
pub mod finder;
pub mod source;

// Re-export commonly used types
pub use classify::{ClassifyError, DiscussionRecord, OutlierFilter};
pub use config::AppConfig;
pub use finder::{find_discussions, DiscussionFinder, DiscussionReport, FinderError};
pub use source::{RawSubmission, RedditClient, SubmissionSource};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
