//! String similarity metrics
//!
//! `partial_ratio` scores how well the shorter of two strings fits
//! somewhere inside the longer one, on a 0-100 scale. Windows of the longer
//! string are chosen from the matching blocks of a longest-common-substring
//! decomposition and scored with the indel ratio.

/// Indel similarity in `0.0..=1.0`: `2 * LCS / (|a| + |b|)`
pub fn indel_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    indel_ratio_chars(&a, &b)
}

fn indel_ratio_chars(a: &[char], b: &[char]) -> f64 {
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * lcs_len(a, b) as f64 / total as f64
}

/// Longest common subsequence length
fn lcs_len(a: &[char], b: &[char]) -> usize {
    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];

    for &ca in a {
        for (j, &cb) in b.iter().enumerate() {
            curr[j + 1] = if ca == cb {
                prev[j] + 1
            } else {
                curr[j].max(prev[j + 1])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Longest common substring of `a[alo..ahi]` and `b[blo..bhi]`
///
/// Returns `(i, j, k)` with `a[i..i+k] == b[j..j+k]`; the earliest `i`, then
/// the earliest `j`, wins among equally long matches.
fn longest_match(
    a: &[char],
    b: &[char],
    (alo, ahi): (usize, usize),
    (blo, bhi): (usize, usize),
) -> (usize, usize, usize) {
    let width = bhi - blo;
    let mut prev = vec![0usize; width + 1];
    let mut curr = vec![0usize; width + 1];
    let (mut best_i, mut best_j, mut best_k) = (alo, blo, 0);

    for i in alo..ahi {
        for j in blo..bhi {
            let col = j - blo;
            curr[col + 1] = if a[i] == b[j] { prev[col] + 1 } else { 0 };
            let k = curr[col + 1];
            if k > best_k {
                best_i = i + 1 - k;
                best_j = j + 1 - k;
                best_k = k;
            }
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    (best_i, best_j, best_k)
}

/// Non-overlapping matching blocks `(i, j, k)`, ordered by position
fn matching_blocks(a: &[char], b: &[char]) -> Vec<(usize, usize, usize)> {
    let mut queue = vec![((0, a.len()), (0, b.len()))];
    let mut blocks = Vec::new();

    while let Some(((alo, ahi), (blo, bhi))) = queue.pop() {
        let (i, j, k) = longest_match(a, b, (alo, ahi), (blo, bhi));
        if k == 0 {
            continue;
        }
        blocks.push((i, j, k));
        if alo < i && blo < j {
            queue.push(((alo, i), (blo, j)));
        }
        if i + k < ahi && j + k < bhi {
            queue.push(((i + k, ahi), (j + k, bhi)));
        }
    }

    blocks.sort_unstable();
    blocks
}

/// Best-aligned substring similarity in `0..=100`
///
/// Symmetric. 100 means the shorter string occurs (almost) verbatim in the
/// longer one. Two empty strings score 100, one empty string scores 0.
pub fn partial_ratio(a: &str, b: &str) -> u8 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    partial_ratio_chars(&a, &b)
}

/// `partial_ratio` over pre-split strings
pub(crate) fn partial_ratio_chars(a: &[char], b: &[char]) -> u8 {
    if a.is_empty() && b.is_empty() {
        return 100;
    }
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    let (shorter, longer) = if a.len() <= b.len() { (a, b) } else { (b, a) };

    // Every window is the whole longer string
    if shorter.len() == longer.len() {
        return to_percent(indel_ratio_chars(shorter, longer));
    }

    if longer.windows(shorter.len()).any(|window| window == shorter) {
        return 100;
    }

    let slack = longer.len() - shorter.len();
    let mut starts: Vec<usize> = matching_blocks(shorter, longer)
        .into_iter()
        .map(|(i, j, _)| j.saturating_sub(i).min(slack))
        .collect();
    starts.dedup();

    let mut best = 0.0f64;
    for start in starts {
        let window = &longer[start..start + shorter.len()];
        let ratio = indel_ratio_chars(shorter, window);
        if ratio > 0.995 {
            return 100;
        }
        best = best.max(ratio);
    }

    to_percent(best)
}

fn to_percent(ratio: f64) -> u8 {
    (ratio * 100.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indel_ratio() {
        assert!((indel_ratio("abc", "abc") - 1.0).abs() < 1e-12);
        assert!((indel_ratio("abc", "xyz")).abs() < 1e-12);
        // LCS("abcd", "abed") = 3
        assert!((indel_ratio("abcd", "abed") - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_longest_match_prefers_earliest() {
        let a: Vec<char> = "abxab".chars().collect();
        let b: Vec<char> = "ab".chars().collect();
        assert_eq!(longest_match(&a, &b, (0, a.len()), (0, b.len())), (0, 0, 2));
    }

    #[test]
    fn test_matching_blocks() {
        let a: Vec<char> = "abxcd".chars().collect();
        let b: Vec<char> = "abcd".chars().collect();
        assert_eq!(matching_blocks(&a, &b), vec![(0, 0, 2), (3, 2, 2)]);
    }

    #[test]
    fn test_partial_ratio_contained() {
        assert_eq!(partial_ratio("S01E01", "S01E01 Discussion Thread"), 100);
        assert_eq!(partial_ratio("Discussion", "[Spoilers] S02E03 Discussion"), 100);
    }

    #[test]
    fn test_partial_ratio_identical() {
        assert_eq!(partial_ratio("Episode 1 Discussion", "Episode 1 Discussion"), 100);
    }

    #[test]
    fn test_partial_ratio_equal_length_one_char_apart() {
        // LCS 16 of 17 characters each: 32 / 34
        assert_eq!(partial_ratio("S01E01 Discussion", "S01E02 Discussion"), 94);
    }

    #[test]
    fn test_partial_ratio_symmetric() {
        let pairs = [
            ("S01E01 Discussion", "I have a question about the ending of s01e08"),
            ("abc", "zzabzzc"),
            ("Season 1 Episode 2", "Episode 2"),
        ];
        for (a, b) in pairs {
            assert_eq!(partial_ratio(a, b), partial_ratio(b, a));
        }
    }

    #[test]
    fn test_partial_ratio_unrelated() {
        assert!(partial_ratio("S01E01 Discussion", "qqqq") < 30);
        assert_eq!(partial_ratio("abc", "xyz"), 0);
    }

    #[test]
    fn test_partial_ratio_chars_matches_str_version() {
        let pairs = [
            ("S01E04 \"The Long Night\" Post-Episode Discussion", "I have a question about the ending of s01e04"),
            ("Episode 12 Discussion", "Episode 2 Discussion"),
            ("abc", "zzabzzc"),
        ];
        for (a, b) in pairs {
            let a_chars: Vec<char> = a.chars().collect();
            let b_chars: Vec<char> = b.chars().collect();
            assert_eq!(partial_ratio_chars(&a_chars, &b_chars), partial_ratio(a, b));
        }
    }

    #[test]
    fn test_partial_ratio_one_window_off() {
        // best window of "zzabzzc" is "zab" or "abz": LCS 2 of 3
        assert_eq!(partial_ratio("abc", "zzabzzc"), 67);
    }

    #[test]
    fn test_partial_ratio_empty() {
        assert_eq!(partial_ratio("", ""), 100);
        assert_eq!(partial_ratio("", "abc"), 0);
    }
}
