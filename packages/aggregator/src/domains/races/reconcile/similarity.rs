//! Pure title-similarity scoring for duplicate detection.
//!
//! Scores are integers from 0 to 100. Two titles are compared on their
//! sorted-token form: lowercase, split on non-alphanumeric characters, tokens
//! sorted and rejoined. This makes the score insensitive to word order,
//! casing and punctuation, so "Carrera Popular Murcia 5K" and
//! "CARRERA POPULAR MURCIA - 5K" score 100.

/// Score above which two same-date titles are considered the same race.
///
/// The comparison is strictly greater-than: a score of exactly 70 keeps
/// both records.
pub const DEFAULT_SIMILARITY_THRESHOLD: u8 = 70;

/// Token-sort similarity between two titles, 0..=100.
///
/// Both inputs empty scores 100 (nothing disagrees); one empty input
/// scores 0.
pub fn token_sort_ratio(a: &str, b: &str) -> u8 {
    ratio(&sort_tokens(a), &sort_tokens(b))
}

/// Lowercase, split on non-alphanumeric runs, sort tokens, rejoin.
fn sort_tokens(s: &str) -> String {
    let lower = s.to_lowercase();
    let mut tokens: Vec<&str> = lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

/// Matching-character ratio: `round(100 * 2 * lcs / (len_a + len_b))`.
fn ratio(a: &str, b: &str) -> u8 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 100;
    }
    let common = longest_common_subsequence(&a, &b);
    ((400 * common + total) / (2 * total)) as u8
}

/// Classic two-row LCS over characters.
fn longest_common_subsequence(a: &[char], b: &[char]) -> usize {
    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];

    for &ca in a {
        for (j, &cb) in b.iter().enumerate() {
            curr[j + 1] = if ca == cb {
                prev[j] + 1
            } else {
                prev[j + 1].max(curr[j])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}
