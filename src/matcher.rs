use crate::model::AppEntry;
use std::cmp::{Ordering, Reverse};
use std::sync::{Arc, PoisonError, RwLock};

/// Added when the query and the name start with the same character.
pub const FIRST_CHAR_BONUS: usize = 2;

/// The live search text. Writers replace the whole string, so a reader always
/// sees one complete value.
#[derive(Clone, Default)]
pub struct QueryCell(Arc<RwLock<Arc<str>>>);

impl QueryCell {
    pub fn new(query: &str) -> Self {
        Self(Arc::new(RwLock::new(Arc::from(query))))
    }

    pub fn set(&self, query: &str) {
        *self.0.write().unwrap_or_else(PoisonError::into_inner) = Arc::from(query);
    }

    pub fn load(&self) -> Arc<str> {
        Arc::clone(&self.0.read().unwrap_or_else(PoisonError::into_inner))
    }
}

impl std::fmt::Debug for QueryCell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("QueryCell").field(&self.load()).finish()
    }
}

/// Something the scorer can rank.
pub trait Rankable {
    fn name(&self) -> &str;

    fn generic_name(&self) -> &str {
        ""
    }
}

impl Rankable for AppEntry {
    fn name(&self) -> &str {
        &self.name
    }

    fn generic_name(&self) -> &str {
        &self.generic_name
    }
}

impl Rankable for String {
    fn name(&self) -> &str {
        self
    }
}

/// Length of the longest run of characters shared by `a` and `b`, ignoring case.
pub fn longest_common_substring_length(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.to_lowercase().chars().collect();
    let b: Vec<char> = b.to_lowercase().chars().collect();
    lcs_folded(&a, &b)
}

// https://www.geeksforgeeks.org/dsa/longest-common-substring-dp-29/
fn lcs_folded(a: &[char], b: &[char]) -> usize {
    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];
    let mut best = 0;

    for &ca in a {
        for (j, &cb) in b.iter().enumerate() {
            curr[j + 1] = if ca == cb { prev[j] + 1 } else { 0 };
            best = best.max(curr[j + 1]);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    best
}

/// A lowercased query, prepared once per sort pass.
struct FoldedQuery {
    chars: Vec<char>,
}

impl FoldedQuery {
    fn new(query: &str) -> Self {
        Self { chars: query.to_lowercase().chars().collect() }
    }

    fn score_text(&self, text: &str) -> usize {
        let text: Vec<char> = text.to_lowercase().chars().collect();
        lcs_folded(&self.chars, &text)
    }
}

/// Orders entries against the query held in a shared `QueryCell`.
#[derive(Clone, Debug)]
pub struct Scorer {
    query: QueryCell,
    match_generic_name: bool,
}

impl Scorer {
    pub fn new(query: QueryCell, match_generic_name: bool) -> Self {
        Self { query, match_generic_name }
    }

    pub fn query(&self) -> &QueryCell {
        &self.query
    }

    /// Score of `item` for `query`; higher is better, 0 is no match.
    pub fn score<T: Rankable + ?Sized>(&self, query: &str, item: &T) -> usize {
        self.score_folded(&FoldedQuery::new(query), item)
    }

    fn score_folded<T: Rankable + ?Sized>(&self, query: &FoldedQuery, item: &T) -> usize {
        let Some(&first) = query.chars.first() else {
            return 0;
        };

        let name = item.name().to_lowercase();
        let mut score = lcs_folded(&query.chars, &name.chars().collect::<Vec<_>>());

        if self.match_generic_name && !item.generic_name().is_empty() {
            score += query.score_text(item.generic_name());
        }
        if name.starts_with(first) {
            score += FIRST_CHAR_BONUS;
        }
        score
    }

    /// Compares two items with the query that is live right now. Higher
    /// scores come first; ties compare equal so a stable sort keeps them put.
    pub fn compare<T: Rankable + ?Sized>(&self, a: &T, b: &T) -> Ordering {
        let query = FoldedQuery::new(&self.query.load());
        self.score_folded(&query, b).cmp(&self.score_folded(&query, a))
    }

    /// Re-sorts `order` (indices into `items`) in place for the live query and
    /// returns the query it used. Ties fall back to catalog position, so the
    /// same query always yields the same order.
    pub fn sort_indices<T: Rankable>(&self, items: &[T], order: &mut [usize]) -> Arc<str> {
        let query = self.query.load();
        let folded = FoldedQuery::new(&query);
        order.sort_by_cached_key(|&i| (Reverse(self.score_folded(&folded, &items[i])), i));
        query
    }

    /// Indices of matching items, best first.
    pub fn rank<T: Rankable>(&self, items: &[T]) -> Vec<usize> {
        let query = self.query.load();
        let folded = FoldedQuery::new(&query);
        let mut scored: Vec<(usize, usize)> = items
            .iter()
            .enumerate()
            .map(|(i, item)| (self.score_folded(&folded, item), i))
            .filter(|&(score, _)| score > 0)
            .collect();
        scored.sort_by_key(|&(score, i)| (Reverse(score), i));
        scored.into_iter().map(|(_, i)| i).collect()
    }
}
