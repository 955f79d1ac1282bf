//! Title pattern table and pattern selection
//!
//! Communities name their discussion threads after one of a handful of
//! conventions. The table below lists them in priority order; selection
//! counts, per title, the first convention that matches and keeps the most
//! popular one.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fmt;
use tracing::{debug, info};

use super::ClassifyError;

/// Known title conventions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    /// "S01E02"
    SeasonEpisodeCode,
    /// "1x02"
    CrossNotation,
    /// "Season 1 Episode 2"
    SeasonEpisodeWords,
    /// "Episode 2", season implied
    EpisodeOnly,
}

impl fmt::Display for PatternKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PatternKind::SeasonEpisodeCode => "S<season>E<episode>",
            PatternKind::CrossNotation => "<season>x<episode>",
            PatternKind::SeasonEpisodeWords => "Season <season> Episode <episode>",
            PatternKind::EpisodeOnly => "Episode <episode>",
        };
        f.write_str(name)
    }
}

/// One entry of the pattern table
#[derive(Debug)]
pub struct TitlePattern {
    kind: PatternKind,
    regex: Regex,
    /// Whether the regex captures `season`; absent seasons default to 1
    pub has_season: bool,
    /// Whether the regex captures `episode`; absent episodes default to 1
    pub has_episode: bool,
}

impl TitlePattern {
    fn new(kind: PatternKind, source: &str, has_season: bool, has_episode: bool) -> Self {
        Self {
            kind,
            regex: Regex::new(source).expect("Invalid title pattern"),
            has_season,
            has_episode,
        }
    }

    /// Convention this pattern recognises
    pub fn kind(&self) -> PatternKind {
        self.kind
    }

    /// Regex source
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Test a title (case-insensitive, anywhere in the title)
    pub fn is_match(&self, title: &str) -> bool {
        self.regex.is_match(title)
    }

    /// Raw `(season, episode)` captures, `None` for a field the pattern lacks
    pub fn captures<'t>(&self, title: &'t str) -> Option<(Option<&'t str>, Option<&'t str>)> {
        let caps = self.regex.captures(title)?;
        let season = caps.name("season").map(|m| m.as_str());
        let episode = caps.name("episode").map(|m| m.as_str());
        Some((season, episode))
    }
}

/// Candidate conventions in priority order
pub static TITLE_PATTERNS: Lazy<[TitlePattern; 4]> = Lazy::new(|| {
    [
        TitlePattern::new(
            PatternKind::SeasonEpisodeCode,
            r"(?i)s(?P<season>\d+)e(?P<episode>\d+)",
            true,
            true,
        ),
        TitlePattern::new(
            PatternKind::CrossNotation,
            r"(?i)(?P<season>\d+)x(?P<episode>\d+)",
            true,
            true,
        ),
        TitlePattern::new(
            PatternKind::SeasonEpisodeWords,
            r"(?i)season\s+(?P<season>\d+)\s+episodes?\s+(?P<episode>\d+)",
            true,
            true,
        ),
        TitlePattern::new(
            PatternKind::EpisodeOnly,
            r"(?i)episodes?\s+(?P<episode>\d+)\b",
            false,
            true,
        ),
    ]
});

/// First pattern in priority order that matches `title`
pub fn first_match(title: &str) -> Option<&'static TitlePattern> {
    TITLE_PATTERNS.iter().find(|pattern| pattern.is_match(title))
}

/// Pick the convention that describes most titles of the batch
///
/// Ties go to the pattern declared first. A batch where nothing matches
/// still yields the first pattern; extraction then produces no records.
pub fn select_pattern<I, S>(titles: I) -> Result<&'static TitlePattern, ClassifyError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut counts = [0usize; 4];
    let mut seen = 0usize;

    for title in titles {
        seen += 1;
        let title = title.as_ref();
        if let Some(idx) = TITLE_PATTERNS.iter().position(|p| p.is_match(title)) {
            counts[idx] += 1;
        } else {
            debug!("No pattern matches `{}`", title);
        }
    }

    if seen == 0 {
        return Err(ClassifyError::EmptyBatch);
    }

    let mut best = 0;
    for (idx, &count) in counts.iter().enumerate() {
        // strict comparison keeps the earlier pattern on ties
        if count > counts[best] {
            best = idx;
        }
    }

    let selected = &TITLE_PATTERNS[best];
    info!(
        "Most common pattern: `{}` (matched {} of {} titles)",
        selected.kind(),
        counts[best],
        seen
    );
    Ok(selected)
}
