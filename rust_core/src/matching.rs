//! Fuzzy string matching for OCR-noisy names.
//!
//! This module provides:
//! - A longest-matching-blocks similarity ratio (Ratcliff/Obershelp)
//! - A gated best-candidate search with substring-containment boost
//!
//! Inputs are strict-normalized before scoring, so the ratio operates on
//! ASCII bytes. Short strings are refused rather than scored: a two-letter
//! query matches half the roster at any useful cutoff.

use crate::config::MatcherConfig;
use crate::normalize::normalize_strict;

/// Similarity of two strings in `[0, 1]`: twice the total length of their
/// matching blocks over the sum of their lengths. Equal strings score 1.0,
/// disjoint strings 0.0. Two empty strings score 1.0.
pub fn sequence_ratio(a: &str, b: &str) -> f64 {
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    let matched = matching_total(a.as_bytes(), b.as_bytes());
    2.0 * matched as f64 / total as f64
}

/// Sum of matching-block lengths, found by recursively splitting both
/// strings around their longest common substring.
fn matching_total(a: &[u8], b: &[u8]) -> usize {
    let mut total = 0;
    let mut pending = vec![(0, a.len(), 0, b.len())];
    while let Some((alo, ahi, blo, bhi)) = pending.pop() {
        if alo >= ahi || blo >= bhi {
            continue;
        }
        let (i, j, size) = longest_match(a, b, alo, ahi, blo, bhi);
        if size > 0 {
            total += size;
            pending.push((alo, i, blo, j));
            pending.push((i + size, ahi, j + size, bhi));
        }
    }
    total
}

/// Longest common substring of `a[alo..ahi]` and `b[blo..bhi]`, returned as
/// `(start_in_a, start_in_b, length)`. Ties prefer the earliest start in
/// `a`, then the earliest in `b`.
fn longest_match(
    a: &[u8],
    b: &[u8],
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let mut best_i = alo;
    let mut best_j = blo;
    let mut best_size = 0;

    let width = bhi - blo;
    // run_len[j - blo] = length of the common suffix ending at a[i], b[j]
    let mut run_len = vec![0usize; width];
    for i in alo..ahi {
        let mut next = vec![0usize; width];
        for j in blo..bhi {
            if a[i] == b[j] {
                let len = if j > blo { run_len[j - blo - 1] + 1 } else { 1 };
                next[j - blo] = len;
                if len > best_size {
                    best_i = i + 1 - len;
                    best_j = j + 1 - len;
                    best_size = len;
                }
            }
        }
        run_len = next;
    }

    (best_i, best_j, best_size)
}

/// Best fuzzy candidate for `query`, or `None` if nothing clears `cutoff`.
///
/// Both sides are strict-normalized first. Queries shorter than
/// `min_query_len` are refused outright; candidates shorter than
/// `min_candidate_len` are skipped. When one normalized string contains the
/// other and the longer side has more than 3 characters, the score is
/// raised to at least `containment_floor`. Ties keep the candidate scanned
/// first.
pub fn best_fuzzy_match<'a, T, I>(
    query: &str,
    candidates: I,
    cutoff: f64,
    cfg: &MatcherConfig,
) -> Option<(T, f64)>
where
    I: IntoIterator<Item = (&'a str, T)>,
{
    let query_strict = normalize_strict(query);
    if query_strict.len() < cfg.min_query_len {
        return None;
    }

    let mut best: Option<(T, f64)> = None;
    let mut best_score = 0.0;

    for (name, value) in candidates {
        let cand_strict = normalize_strict(name);
        if cand_strict.len() < cfg.min_candidate_len {
            continue;
        }

        let mut score = sequence_ratio(&query_strict, &cand_strict);

        let (shorter, longer) = if query_strict.len() <= cand_strict.len() {
            (query_strict.as_str(), cand_strict.as_str())
        } else {
            (cand_strict.as_str(), query_strict.as_str())
        };
        if longer.len() > 3 && longer.contains(shorter) {
            score = score.max(cfg.containment_floor);
        }

        if score > best_score && score >= cutoff {
            best_score = score;
            best = Some((value, score));
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratio_known_values() {
        assert_eq!(sequence_ratio("booyah", "booyah"), 1.0);
        assert_eq!(sequence_ratio("abcd", "wxyz"), 0.0);
        // common block "bcd": 2 * 3 / 8
        assert_eq!(sequence_ratio("abcd", "bcde"), 0.75);
        assert_eq!(sequence_ratio("", ""), 1.0);
        assert_eq!(sequence_ratio("abc", ""), 0.0);
    }

    #[test]
    fn test_ratio_counts_split_blocks() {
        // blocks "ab" and "cd" survive around the mismatch: 2 * 4 / 10
        assert_eq!(sequence_ratio("abxcd", "abycd"), 0.8);
    }

    #[test]
    fn test_team_cutoff_boundary_inclusive() {
        let cfg = MatcherConfig::default();
        // common prefix of 7 over lengths 10 + 10: exactly 0.70
        assert_eq!(sequence_ratio("abcdefgxyz", "abcdefgpqr"), 0.70);
        let hit = best_fuzzy_match("abcdefgxyz", vec![("abcdefgpqr", 1)], 0.70, &cfg);
        assert_eq!(hit.map(|(v, _)| v), Some(1));
    }

    #[test]
    fn test_below_cutoff_rejected() {
        let cfg = MatcherConfig::default();
        // 69 shared over lengths 100 + 100: exactly 0.69
        let a = format!("{}{}", "a".repeat(69), "b".repeat(31));
        let b = format!("{}{}", "a".repeat(69), "c".repeat(31));
        assert_eq!(sequence_ratio(&a, &b), 0.69);
        let hit = best_fuzzy_match(&a, vec![(b.as_str(), 1)], 0.70, &cfg);
        assert!(hit.is_none());
    }

    #[test]
    fn test_containment_boost() {
        let cfg = MatcherConfig::default();
        // raw ratio 2 * 3 / 12 = 0.5, but "abc" is contained in the candidate
        let hit = best_fuzzy_match("abc", vec![("xxxxxxabc", 1)], 0.80, &cfg);
        let (value, score) = hit.unwrap();
        assert_eq!(value, 1);
        assert!(score >= 0.90);
    }

    #[test]
    fn test_containment_after_normalization() {
        let cfg = MatcherConfig::default();
        // "progamer" is contained in strict("pro_gamer_x") = "progamerx"
        let hit = best_fuzzy_match("progamer", vec![("pro_gamer_x", 1)], 0.80, &cfg);
        assert!(hit.is_some());
    }

    #[test]
    fn test_short_query_refused() {
        let cfg = MatcherConfig::default();
        assert!(best_fuzzy_match("ab", vec![("abcd", 1)], 0.10, &cfg).is_none());
        // symbols normalize away entirely
        assert!(best_fuzzy_match("!!", vec![("abcd", 1)], 0.10, &cfg).is_none());
    }

    #[test]
    fn test_short_candidate_skipped() {
        let cfg = MatcherConfig::default();
        // identical text, but the candidate normalizes to 3 chars
        assert!(best_fuzzy_match("abc", vec![("abc", 1)], 0.10, &cfg).is_none());
        assert!(best_fuzzy_match("abcd", vec![("a-b-c", 1)], 0.10, &cfg).is_none());
    }

    #[test]
    fn test_tie_keeps_first_scanned() {
        let cfg = MatcherConfig::default();
        let hit = best_fuzzy_match(
            "abcd",
            vec![("abcdx", "first"), ("abcdy", "second")],
            0.80,
            &cfg,
        );
        assert_eq!(hit.map(|(v, _)| v), Some("first"));
    }

    #[test]
    fn test_best_of_many() {
        let cfg = MatcherConfig::default();
        let hit = best_fuzzy_match(
            "GodLike Esports",
            vec![("Team Elite", 1), ("GodLike", 2), ("TSM Entity", 3)],
            0.70,
            &cfg,
        );
        assert_eq!(hit.map(|(v, _)| v), Some(2));
    }
}
