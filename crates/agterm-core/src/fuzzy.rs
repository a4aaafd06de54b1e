//! Fuzzy ranking of candidates against a free-text query.

use std::collections::HashMap;

/// Minimum final score (inclusive) for a candidate to be returned.
pub const ACCEPT_THRESHOLD: f64 = 0.5;

/// Added when the query is a literal substring of the candidate key, so a
/// short exact fragment outranks a long, loosely similar name.
pub const SUBSTRING_BONUS: f64 = 0.4;

/// From this length on, characters that make up more than 1% of `b` are
/// left out of the match index.
const AUTOJUNK_MIN_LEN: usize = 200;

/// A scored candidate.
#[derive(Debug)]
pub struct FuzzyMatch<'a, T> {
    pub score: f64,
    pub candidate: &'a T,
}

/// Longest-matching-blocks similarity `2*M / (|a| + |b|)` in `0.0..=1.0`.
///
/// `M` counts the characters in the matching blocks: the longest common
/// block, then recursively the longest blocks left and right of it. Two
/// empty strings are identical (1.0).
pub fn similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    let matched = BlockMatcher::new(&a, &b).matched_len();
    2.0 * matched as f64 / total as f64
}

struct BlockMatcher<'a> {
    a: &'a [char],
    b: &'a [char],
    /// Ascending positions of each character in `b`.
    b2j: HashMap<char, Vec<usize>>,
}

impl<'a> BlockMatcher<'a> {
    fn new(a: &'a [char], b: &'a [char]) -> Self {
        let mut b2j: HashMap<char, Vec<usize>> = HashMap::new();
        for (j, &c) in b.iter().enumerate() {
            b2j.entry(c).or_default().push(j);
        }
        if b.len() >= AUTOJUNK_MIN_LEN {
            let popular = b.len() / 100 + 1;
            b2j.retain(|_, positions| positions.len() <= popular);
        }
        Self { a, b, b2j }
    }

    /// Longest block `(i, j, len)` with `a[i..i+len] == b[j..j+len]` inside
    /// the given ranges. Ties go to the earliest `i`, then the earliest `j`.
    fn longest_match(&self, alo: usize, ahi: usize, blo: usize, bhi: usize) -> (usize, usize, usize) {
        let (mut best_i, mut best_j, mut best_len) = (alo, blo, 0);
        let mut run_ending_at: HashMap<usize, usize> = HashMap::new();
        for i in alo..ahi {
            let mut next: HashMap<usize, usize> = HashMap::new();
            if let Some(positions) = self.b2j.get(&self.a[i]) {
                for &j in positions {
                    if j < blo {
                        continue;
                    }
                    if j >= bhi {
                        break;
                    }
                    let prev = j
                        .checked_sub(1)
                        .and_then(|p| run_ending_at.get(&p))
                        .copied()
                        .unwrap_or(0);
                    let len = prev + 1;
                    next.insert(j, len);
                    if len > best_len {
                        best_i = i + 1 - len;
                        best_j = j + 1 - len;
                        best_len = len;
                    }
                }
            }
            run_ending_at = next;
        }

        // Grow the block over characters dropped from the index.
        while best_i > alo && best_j > blo && self.a[best_i - 1] == self.b[best_j - 1] {
            best_i -= 1;
            best_j -= 1;
            best_len += 1;
        }
        while best_i + best_len < ahi
            && best_j + best_len < bhi
            && self.a[best_i + best_len] == self.b[best_j + best_len]
        {
            best_len += 1;
        }
        (best_i, best_j, best_len)
    }

    /// Total length of all matching blocks.
    fn matched_len(&self) -> usize {
        let mut matched = 0;
        let mut pending = vec![(0, self.a.len(), 0, self.b.len())];
        while let Some((alo, ahi, blo, bhi)) = pending.pop() {
            let (i, j, len) = self.longest_match(alo, ahi, blo, bhi);
            if len == 0 {
                continue;
            }
            matched += len;
            if alo < i && blo < j {
                pending.push((alo, i, blo, j));
            }
            if i + len < ahi && j + len < bhi {
                pending.push((i + len, ahi, j + len, bhi));
            }
        }
        matched
    }
}

/// Score one key against an already lower-cased query.
fn score(query_lower: &str, key: &str) -> f64 {
    let key_lower = key.to_lowercase();
    let mut score = similarity(query_lower, &key_lower);
    if key_lower.contains(query_lower) {
        score += SUBSTRING_BONUS;
    }
    score
}

/// Rank `candidates` by similarity of `key(candidate)` to `query`.
///
/// Case-insensitive. Results are best-first and limited to scores at or above
/// [`ACCEPT_THRESHOLD`]. The sort is stable: equal scores keep input order.
pub fn rank<'a, T, F>(query: &str, candidates: &'a [T], key: F) -> Vec<FuzzyMatch<'a, T>>
where
    F: Fn(&T) -> &str,
{
    let query_lower = query.to_lowercase();
    let mut scored: Vec<FuzzyMatch<'a, T>> = candidates
        .iter()
        .map(|candidate| FuzzyMatch {
            score: score(&query_lower, key(candidate)),
            candidate,
        })
        .collect();
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored.retain(|m| m.score >= ACCEPT_THRESHOLD);
    scored
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names<'a>(matches: &[FuzzyMatch<'a, &'a str>]) -> Vec<&'a str> {
        matches.iter().map(|m| *m.candidate).collect()
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn similarity_bounds() {
        assert!(approx(similarity("abc", "abc"), 1.0));
        assert!(approx(similarity("", ""), 1.0));
        assert!(approx(similarity("abc", "xyz"), 0.0));
        // 4 shared chars over 4 + 5
        assert!(approx(similarity("buil", "build"), 8.0 / 9.0));
    }

    #[test]
    fn similarity_counts_blocks_not_subsequences() {
        // Only "er" lines up as a block; "r" and "e" before it are crossed.
        assert!(approx(similarity("server", "worker"), 1.0 / 3.0));
        // "ts" is the longest block and nothing matches around it.
        assert!(approx(similarity("tset", "tests"), 4.0 / 9.0));
        // Blocks on both sides of the longest one are counted.
        assert!(approx(similarity("abxcd", "abycd"), 8.0 / 10.0));
    }

    #[test]
    fn similarity_is_order_sensitive_on_ties() {
        // The first longest block wins, so the split differs by direction.
        assert!(approx(similarity("ab", "ba"), 0.5));
        assert!(approx(similarity("ba", "ab"), 0.5));
    }

    #[test]
    fn long_keys_ignore_popular_characters_in_index() {
        // "a" is too common in a 301-char key to seed a block, so only the
        // "b" lines up and the "aa" before it has nothing left to match.
        let key = format!("b{}", "a".repeat(300));
        assert!(approx(similarity("aab", &key), 2.0 / 304.0));
        // A seeded block still grows over popular neighbours.
        let key = format!("{}b{}", "a".repeat(250), "a".repeat(250));
        assert!(approx(similarity("aba", &key), 6.0 / 504.0));
    }

    #[test]
    fn loose_overlap_is_rejected() {
        let candidates = ["worker"];
        assert!(rank("server", &candidates, |s| *s).is_empty());
    }

    #[test]
    fn exact_name_scores_ratio_plus_bonus() {
        let candidates = ["zsh"];
        let ranked = rank("zsh", &candidates, |s| *s);
        assert_eq!(ranked.len(), 1);
        assert!(approx(ranked[0].score, 1.0 + SUBSTRING_BONUS));
    }

    #[test]
    fn below_threshold_is_dropped_even_when_alone() {
        // "xyz" vs "zsh": one shared char, ratio 2/6, no substring.
        let candidates = ["zsh"];
        assert!(rank("xyz", &candidates, |s| *s).is_empty());
    }

    #[test]
    fn substring_bonus_lifts_short_fragment() {
        let candidates = ["buildx", "build"];
        let ranked = rank("buil", &candidates, |s| *s);
        assert_eq!(names(&ranked), vec!["build", "buildx"]);

        let expected_build = similarity("buil", "build") + SUBSTRING_BONUS;
        let expected_buildx = similarity("buil", "buildx") + SUBSTRING_BONUS;
        assert!(approx(ranked[0].score, expected_build));
        assert!(approx(ranked[1].score, expected_buildx));
        assert!(ranked[1].score >= ACCEPT_THRESHOLD);
    }

    #[test]
    fn substring_beats_longer_loose_match() {
        // "api" is contained in the long name; "apx" only overlaps loosely.
        let candidates = ["apx", "my-api-server-logs"];
        let ranked = rank("api", &candidates, |s| *s);
        assert_eq!(ranked[0].candidate, &"my-api-server-logs");
    }

    #[test]
    fn case_insensitive() {
        let candidates = ["Claude Code"];
        let ranked = rank("claude", &candidates, |s| *s);
        assert_eq!(ranked.len(), 1);
        assert!(ranked[0].score > 1.0);
    }

    #[test]
    fn ties_keep_input_order() {
        let candidates = ["shell", "shell"];
        let ranked = rank("shell", &candidates, |s| *s);
        assert_eq!(ranked.len(), 2);
        assert!(std::ptr::eq(ranked[0].candidate, &candidates[0]));
        assert!(std::ptr::eq(ranked[1].candidate, &candidates[1]));
    }

    #[test]
    fn empty_query_matches_nothing_meaningful() {
        // Empty query is a substring of everything but scores only the bonus.
        let candidates = ["zsh", "build"];
        assert!(rank("", &candidates, |s| *s).is_empty());
    }

    #[test]
    fn key_selector_picks_field() {
        struct Item {
            label: String,
        }
        let items = vec![
            Item {
                label: "frontend".into(),
            },
            Item {
                label: "backend".into(),
            },
        ];
        let ranked = rank("back", &items, |i| i.label.as_str());
        assert_eq!(ranked[0].candidate.label, "backend");
    }
}
