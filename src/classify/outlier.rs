//! Outlier removal over a batch of discussion records
//!
//! Some titles match the season/episode pattern by accident ("I have a
//! question about the ending of s01e08"). They read differently from the
//! community's regular discussion threads, so their average similarity to
//! the rest of the batch sits far from everybody else's.

use statrs::statistics::Statistics;
use tracing::{debug, info};

use super::extract::DiscussionRecord;
use super::similarity::partial_ratio_chars;

/// Default distance from the mean, in population standard deviations,
/// beyond which a record is dropped
pub const DEFAULT_OUTLIER_THRESHOLD: f64 = 2.0;

/// Removes records whose title similarity profile deviates from the batch
#[derive(Debug, Clone, Copy)]
pub struct OutlierFilter {
    threshold: f64,
}

impl Default for OutlierFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl OutlierFilter {
    /// Create a filter with the default 2σ threshold
    pub fn new() -> Self {
        Self {
            threshold: DEFAULT_OUTLIER_THRESHOLD,
        }
    }

    /// Create a filter with a custom σ multiplier
    pub fn with_threshold(threshold: f64) -> Self {
        Self { threshold }
    }

    /// Get the σ multiplier
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Mean partial-ratio similarity of each title to every title of the
    /// batch, itself included (scored 100)
    pub fn similarity_scores(&self, records: &[DiscussionRecord]) -> Vec<f64> {
        let n = records.len();
        let titles: Vec<Vec<char>> = records.iter().map(|r| r.title.chars().collect()).collect();
        let mut sums = vec![100u64; n];

        for i in 0..n {
            for j in (i + 1)..n {
                let score = u64::from(partial_ratio_chars(&titles[i], &titles[j]));
                sums[i] += score;
                sums[j] += score;
            }
        }

        sums.into_iter().map(|sum| sum as f64 / n as f64).collect()
    }

    /// Keep the records whose similarity lies within `threshold` σ of the mean
    ///
    /// Scores are computed once for the whole batch and never recomputed as
    /// records are dropped. Order is preserved.
    pub fn filter(&self, records: Vec<DiscussionRecord>) -> Vec<DiscussionRecord> {
        if records.len() < 2 {
            return records;
        }

        let scores = self.similarity_scores(&records);
        let mean = scores.iter().mean();
        let std_dev = scores.iter().population_std_dev();
        let max_deviation = self.threshold * std_dev;

        debug!(
            "Similarity mean = {:.2}, std dev = {:.2}, max deviation = {:.2}",
            mean, std_dev, max_deviation
        );

        let before = records.len();
        let retained: Vec<DiscussionRecord> = records
            .into_iter()
            .zip(scores)
            .filter_map(|(record, score)| {
                let deviation = (score - mean).abs();
                if deviation > max_deviation {
                    info!(
                        "Removing `{}`: similarity {:.2} deviates {:.2} from mean {:.2} (max {:.2})",
                        record.title, score, deviation, mean, max_deviation
                    );
                    None
                } else {
                    Some(record)
                }
            })
            .collect();

        info!("Removed {} of {} discussions as outliers", before - retained.len(), before);
        retained
    }
}
