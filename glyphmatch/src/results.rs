//! Recognition result set

use std::fmt;

use glyphmatch_align::AlignmentResult;
use glyphmatch_core::Rect;
use glyphmatch_sched::TaskOutcome;
use serde::{Deserialize, Serialize};

/// Ranked candidates for each recognized character position
///
/// Stored by field rather than per position: index `i` of `characters`,
/// `scores`, `locations` and `failures` all describe the same position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognitionResults {
    /// Candidate characters per position, best first
    pub characters: Vec<String>,
    /// Scores matching `characters`
    pub scores: Vec<Vec<i32>>,
    /// Source rectangle of each position in the target image
    pub locations: Vec<Rect>,
    /// Reading orientation of the first position
    pub vertical: bool,
    /// Failure message for positions whose alignment failed
    pub failures: Vec<Option<String>>,
}

impl RecognitionResults {
    pub(crate) fn from_outcomes(
        outcomes: Vec<TaskOutcome<Vec<AlignmentResult>>>,
        locations: Vec<Rect>,
        vertical: bool,
    ) -> Self {
        let mut characters = Vec::with_capacity(outcomes.len());
        let mut scores = Vec::with_capacity(outcomes.len());
        let mut failures = Vec::with_capacity(outcomes.len());
        for outcome in outcomes {
            match outcome {
                Ok(ranked) => {
                    characters.push(ranked.iter().map(|r| r.character).collect());
                    scores.push(ranked.iter().map(|r| r.score).collect());
                    failures.push(None);
                }
                Err(failure) => {
                    characters.push(String::new());
                    scores.push(Vec::new());
                    failures.push(Some(failure.message));
                }
            }
        }
        Self {
            characters,
            scores,
            locations,
            vertical,
            failures,
        }
    }

    /// Number of character positions
    pub fn len(&self) -> usize {
        self.characters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }

    /// Best candidate of every position, skipping positions without one
    pub fn best_match(&self) -> String {
        self.characters.iter().filter_map(|c| c.chars().next()).collect()
    }

    /// Best candidate at `index`
    pub fn best_at(&self, index: usize) -> Option<char> {
        self.characters.get(index)?.chars().next()
    }

    /// Normalized gap between the best and second-best score at `index`
    ///
    /// A single candidate is fully dominant (1.0). Returns `None` for a
    /// position without candidates or a non-positive best score.
    pub fn dominance(&self, index: usize) -> Option<f32> {
        let scores = self.scores.get(index)?;
        let best = *scores.first()?;
        if best <= 0 {
            return None;
        }
        let Some(&second) = scores.get(1) else {
            return Some(1.0);
        };
        Some((best - second) as f32 / best as f32)
    }

    /// Whether the best candidate at `index` leads by more than `margin`
    pub fn is_confident(&self, index: usize, margin: f32) -> bool {
        self.dominance(index).is_some_and(|d| d > margin)
    }
}

impl fmt::Display for RecognitionResults {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, candidates) in self.characters.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            match self.failures.get(i).and_then(Option::as_ref) {
                Some(message) => write!(f, "{i}: failed ({message})")?,
                None => {
                    write!(f, "{i}:")?;
                    for (c, score) in candidates.chars().zip(&self.scores[i]).take(5) {
                        write!(f, " {c}={score}")?;
                    }
                }
            }
        }
        Ok(())
    }
}
