//! Edit-distance search over stored questions.

use crate::knowledge::{CategoryKind, KnowledgeBase, KnowledgeEntry, Question};
use crate::normalize::normalize;

/// One scannable question with the category it came from.
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    /// Canonical (already normalized) question text.
    pub key: &'a str,
    pub entry: &'a KnowledgeEntry,
    pub category: CategoryKind,
}

impl<'a> Candidate<'a> {
    pub fn from_question(question: &'a Question, category: CategoryKind) -> Self {
        Self {
            key: &question.normalized,
            entry: &question.entry,
            category,
        }
    }
}

/// Closest candidate found by [`best_match`].
#[derive(Debug, Clone, Copy)]
pub struct BestMatch<'a> {
    pub key: &'a str,
    pub entry: &'a KnowledgeEntry,
    pub category: CategoryKind,
    pub distance: usize,
}

impl<'a> BestMatch<'a> {
    /// Keeps the match only if its distance is at most `threshold`.
    pub fn within(self, threshold: usize) -> Option<Self> {
        (self.distance <= threshold).then_some(self)
    }
}

/// Character-level Levenshtein distance with unit costs.
#[inline]
pub fn edit_distance(a: &str, b: &str) -> usize {
    strsim::levenshtein(a, b)
}

/// Returns the candidate with the smallest edit distance to `normalize(input)`.
///
/// Every candidate is scored; on equal distance the first one scanned wins.
/// `None` when there are no candidates.
pub fn best_match<'a, I>(input: &str, candidates: I) -> Option<BestMatch<'a>>
where
    I: IntoIterator<Item = Candidate<'a>>,
{
    let query = normalize(input);
    let mut best: Option<BestMatch<'a>> = None;
    for candidate in candidates {
        let distance = edit_distance(&query, candidate.key);
        if best.map_or(true, |b| distance < b.distance) {
            best = Some(BestMatch {
                key: candidate.key,
                entry: candidate.entry,
                category: candidate.category,
                distance,
            });
        }
    }
    best
}

/// Candidates of one category in insertion order; empty if the category is absent.
pub fn candidates(kb: &KnowledgeBase, kind: CategoryKind) -> impl Iterator<Item = Candidate<'_>> + '_ {
    kb.category(kind)
        .into_iter()
        .flat_map(move |c| c.questions().map(move |q| Candidate::from_question(q, kind)))
}
