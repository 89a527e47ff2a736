//! Fuzzy signature matching against an [`AbiIndex`].
//!
//! Candidates are scored by
//!
//! ```text
//! levenshtein(candidate, target) + 2 * |arity(candidate) - arity(target)| - 3 * same_name
//! ```
//!
//! over the full normalized strings. Lower is better; ties go to the candidate
//! that appears first in the index.

use serde::{Deserialize, Serialize};

use crate::index::{AbiIndex, IndexedFunction};
use crate::signature::normalize;

const ARITY_WEIGHT: i64 = 2;
const SAME_NAME_BONUS: i64 = 3;

/// Classic insert/delete/substitute edit distance over chars.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];
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

/// How much a proposed correction can be trusted, derived from its score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    pub fn from_score(score: i64) -> Self {
        match score {
            s if s <= 3 => Confidence::High,
            s if s <= 10 => Confidence::Medium,
            _ => Confidence::Low,
        }
    }
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Confidence::Low => "low",
            Confidence::Medium => "medium",
            Confidence::High => "high",
        };
        write!(f, "{s}")
    }
}

/// A scored candidate.
#[derive(Debug, Clone)]
pub struct Candidate<'a> {
    pub function: &'a IndexedFunction,
    pub score: i64,
}

impl Candidate<'_> {
    pub fn confidence(&self) -> Confidence {
        Confidence::from_score(self.score)
    }
}

/// The comparison side of a match: what the descriptor key claims.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchTarget {
    pub name: String,
    pub arity: usize,
    pub normalized: String,
}

impl MatchTarget {
    /// Normalize `key`; an unparseable key is compared verbatim with no name
    /// and zero arity.
    pub fn from_key(key: &str) -> Self {
        match normalize(key) {
            Some(sig) => Self {
                arity: sig.arity(),
                name: sig.name,
                normalized: sig.normalized,
            },
            None => Self {
                name: String::new(),
                arity: 0,
                normalized: key.trim().to_string(),
            },
        }
    }
}

/// Ranks index entries against a target signature.
pub struct FuzzyMatcher<'a> {
    index: &'a AbiIndex,
}

impl<'a> FuzzyMatcher<'a> {
    pub fn new(index: &'a AbiIndex) -> Self {
        Self { index }
    }

    /// Score one candidate against `target`.
    pub fn score(candidate: &IndexedFunction, target: &MatchTarget) -> i64 {
        let distance = levenshtein(&candidate.normalized.normalized, &target.normalized) as i64;
        let arity = (candidate.normalized.arity() as i64 - target.arity as i64).abs();
        let same_name = !target.name.is_empty() && candidate.normalized.name == target.name;
        distance + ARITY_WEIGHT * arity - if same_name { SAME_NAME_BONUS } else { 0 }
    }

    /// Best candidate in the whole index, or `None` if the index is empty.
    pub fn best(&self, key: &str) -> Option<Candidate<'a>> {
        self.best_among(self.index.functions(), &MatchTarget::from_key(key))
    }

    /// Best candidate among `candidates` (e.g. overloads of one name).
    pub fn best_among<'c>(
        &self,
        candidates: impl IntoIterator<Item = &'c IndexedFunction>,
        target: &MatchTarget,
    ) -> Option<Candidate<'c>> {
        candidates
            .into_iter()
            .map(|function| Candidate {
                function,
                score: Self::score(function, target),
            })
            .min_by_key(|c| c.score)
    }

    /// Every candidate, best first. Equal scores keep index order.
    pub fn rank(&self, key: &str) -> Vec<Candidate<'a>> {
        let target = MatchTarget::from_key(key);
        let mut ranked: Vec<Candidate<'a>> = self
            .index
            .functions()
            .iter()
            .map(|function| Candidate {
                function,
                score: Self::score(function, &target),
            })
            .collect();
        ranked.sort_by_key(|c| c.score);
        ranked
    }
}
