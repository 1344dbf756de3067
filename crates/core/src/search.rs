//! Fuzzy search over in-memory records.
//!
//! Each record exposes a set of weighted keys. A query matches a key value
//! when its approximate substring distance, divided by the query length,
//! is within [`DEFAULT_THRESHOLD`]. Per-key scores are combined into one
//! relevance score (lower is better) and matches are returned best first.

// ---------------------------------------------------------------------------
// Tuning
// ---------------------------------------------------------------------------

/// Highest normalized distance still counted as a match (0.0 = exact).
pub const DEFAULT_THRESHOLD: f64 = 0.3;

/// Queries shorter than this never match.
pub const MIN_MATCH_CHAR_LENGTH: usize = 2;

/// Stand-in for a perfect score so weights still separate exact matches.
const EPSILON: f64 = 1e-3;

// ---------------------------------------------------------------------------
// Keys
// ---------------------------------------------------------------------------

/// A searchable field of `T` and its relative weight.
pub struct SearchKey<T> {
    pub name: &'static str,
    pub weight: f64,
    pub values: fn(&T) -> Vec<&str>,
}

/// A scored match, borrowing the matched record.
#[derive(Debug, Clone, Copy)]
pub struct SearchHit<'a, T> {
    /// Position of `item` in the searched slice.
    pub index: usize,
    pub item: &'a T,
    pub score: f64,
}

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

/// Smallest edit distance between `pattern` and any substring of `text`.
fn substring_distance(pattern: &[char], text: &[char]) -> usize {
    let mut prev = vec![0usize; text.len() + 1];
    for (i, pc) in pattern.iter().enumerate() {
        let mut cur = vec![i + 1; text.len() + 1];
        for (j, tc) in text.iter().enumerate() {
            let substitution = prev[j] + usize::from(pc != tc);
            cur[j + 1] = substitution.min(prev[j + 1] + 1).min(cur[j] + 1);
        }
        prev = cur;
    }
    prev.into_iter().min().unwrap_or(pattern.len())
}

/// Normalized score of `query` against one value, or `None` if it does not
/// match. `query` must already be lowercased.
pub fn score_value(query: &str, value: &str, threshold: f64) -> Option<f64> {
    let pattern: Vec<char> = query.chars().collect();
    if pattern.len() < MIN_MATCH_CHAR_LENGTH {
        return None;
    }
    let text: Vec<char> = value.to_lowercase().chars().collect();
    if text.is_empty() {
        return None;
    }
    let score = substring_distance(&pattern, &text) as f64 / pattern.len() as f64;
    (score <= threshold).then_some(score)
}

/// Relevance of `item` for `query`, or `None` when no key matches.
fn score_item<T>(item: &T, query: &str, keys: &[SearchKey<T>], threshold: f64) -> Option<f64> {
    let total_weight: f64 = keys.iter().map(|k| k.weight).sum();
    let mut matched = false;
    let mut combined = 1.0;

    for key in keys {
        let best = (key.values)(item)
            .into_iter()
            .filter_map(|v| score_value(query, v, threshold))
            .fold(None, |acc: Option<f64>, s| Some(acc.map_or(s, |a| a.min(s))));
        if let Some(score) = best {
            matched = true;
            combined *= score.max(EPSILON).powf(key.weight / total_weight);
        }
    }

    matched.then_some(combined)
}

/// Search `items`, returning matches ordered by relevance. Ties keep the
/// input order. A blank query returns nothing.
pub fn fuzzy_search<'a, T>(
    items: &'a [T],
    query: &str,
    keys: &[SearchKey<T>],
    threshold: f64,
) -> Vec<SearchHit<'a, T>> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return Vec::new();
    }

    let mut hits: Vec<SearchHit<'a, T>> = items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| {
            score_item(item, &query, keys, threshold).map(|score| SearchHit { index, item, score })
        })
        .collect();
    hits.sort_by(|a, b| a.score.total_cmp(&b.score));
    hits
}

// ---------------------------------------------------------------------------
// Pagination helpers
// ---------------------------------------------------------------------------

/// Clamp a requested page count to the pages `total` results fill, and to
/// at least one page.
pub fn clamp_pages(pages: Option<usize>, total: usize, page_size: usize) -> usize {
    let last_page = total.div_ceil(page_size.max(1)).max(1);
    pages.unwrap_or(1).clamp(1, last_page)
}
