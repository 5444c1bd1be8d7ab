//! Ranking of alignment results

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::score::AlignmentResult;

/// Best-first order: score, then score modifier (both descending), then font
/// registration order, then code point
pub fn compare_results(a: &AlignmentResult, b: &AlignmentResult) -> Ordering {
    b.score
        .cmp(&a.score)
        .then_with(|| b.score_modifier.total_cmp(&a.score_modifier))
        .then_with(|| a.font_index.cmp(&b.font_index))
        .then_with(|| a.character.cmp(&b.character))
}

/// Bounded best-first collection of results
#[derive(Debug, Clone)]
pub struct TopResults {
    keep: usize,
    results: Vec<AlignmentResult>,
}

impl TopResults {
    pub fn new(keep: usize) -> Self {
        Self {
            keep,
            results: Vec::with_capacity(keep + 1),
        }
    }

    /// Insert a result, dropping the worst one if more than `keep` are held
    pub fn push(&mut self, result: AlignmentResult) {
        let pos = self
            .results
            .partition_point(|r| compare_results(r, &result) != Ordering::Greater);
        if pos >= self.keep {
            return;
        }
        self.results.insert(pos, result);
        self.results.truncate(self.keep);
    }

    /// Worst result still kept, if the collection is full
    pub fn threshold(&self) -> Option<&AlignmentResult> {
        if self.results.len() < self.keep {
            None
        } else {
            self.results.last()
        }
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Results, best first
    pub fn into_vec(self) -> Vec<AlignmentResult> {
        self.results
    }
}

/// Merge two result lists keeping the best result per character
///
/// On equal scores the result from `first` is kept. The merged list is
/// sorted best first and cut to `keep` entries.
pub fn combine_results(
    first: Vec<AlignmentResult>,
    second: Vec<AlignmentResult>,
    keep: usize,
) -> Vec<AlignmentResult> {
    let mut best: HashMap<char, AlignmentResult> = HashMap::with_capacity(first.len() + second.len());
    for result in first.into_iter().chain(second) {
        match best.get(&result.character) {
            Some(existing) if existing.score >= result.score => {}
            _ => {
                best.insert(result.character, result);
            }
        }
    }
    let mut merged: Vec<AlignmentResult> = best.into_values().collect();
    merged.sort_by(compare_results);
    merged.truncate(keep);
    merged
}
