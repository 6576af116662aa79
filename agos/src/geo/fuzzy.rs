//! Fuzzy matching against cache keys
//!
//! Last resort before the hard default: normalized Levenshtein
//! similarity between the input and every cached name, with a fixed
//! acceptance cutoff.

/// Minimum similarity for a fuzzy match to be accepted.
pub const FUZZY_CUTOFF: f64 = 0.5;

/// Similarity in [0, 1]: 1.0 for identical strings, scaled by edit
/// distance over the longer length.
pub fn similarity(a: &str, b: &str) -> f64 {
    if a == b {
        return 1.0;
    }
    let longest = a.chars().count().max(b.chars().count());
    if longest == 0 {
        return 1.0;
    }
    1.0 - levenshtein(a, b) as f64 / longest as f64
}

/// Best candidate above [`FUZZY_CUTOFF`], if any.
pub fn closest_match<'a>(input: &str, candidates: &'a [String]) -> Option<&'a str> {
    let mut best: Option<(&str, f64)> = None;
    for candidate in candidates {
        let score = similarity(input, candidate);
        if score >= FUZZY_CUTOFF && best.map_or(true, |(_, b)| score > b) {
            best = Some((candidate, score));
        }
    }
    best.map(|(name, _)| name)
}

fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_strings_score_one() {
        assert!((similarity("marikina", "marikina") - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn typo_clears_cutoff() {
        assert!(similarity("marikna", "marikina") >= FUZZY_CUTOFF);
        assert!(similarity("sebu", "cebu") >= FUZZY_CUTOFF);
    }

    #[test]
    fn unrelated_strings_fall_below_cutoff() {
        assert!(similarity("zamboanga", "cebu") < FUZZY_CUTOFF);
    }

    #[test]
    fn closest_match_picks_best_candidate() {
        let candidates = vec![
            "marikina".to_string(),
            "manila".to_string(),
            "makati".to_string(),
        ];
        assert_eq!(closest_match("marikna", &candidates), Some("marikina"));
        assert_eq!(closest_match("xyzzy123", &candidates), None);
    }

    #[test]
    fn empty_candidates_yield_none() {
        assert_eq!(closest_match("marikina", &[]), None);
    }
}
