//! Right-to-left reconstruction of complete paths.
//!
//! The forward trellis only stores back-references. Walking them from the
//! last position turns each complete path into a chain of forward pointers
//! starting at position 0, which `extract` then reads in order.

use serde::Serialize;
use tracing::{debug, debug_span};

use super::cell::{BoundedCell, Scored};
use super::trellis::{ForwardTrellis, TrellisRef, TrellisValue};
use crate::token::PhraseToken;

/// Forward pointer into the backward matrix: position and slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatrixRef {
    step: usize,
    slot: usize,
}

impl MatrixRef {
    pub fn step(&self) -> usize {
        self.step
    }

    pub fn slot(&self) -> usize {
        self.slot
    }
}

/// A trellis record re-expressed with a forward pointer.
///
/// `score` and `sentence_length` are those of the complete path the value
/// belongs to, not of the prefix ending here.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatrixValue {
    pub token: PhraseToken,
    pub score: f32,
    pub sentence_length: u32,
    secondary: PhraseToken,
    /// Trellis back-reference not yet walked.
    pending: Option<TrellisRef>,
    next: Option<MatrixRef>,
}

impl Default for MatrixValue {
    fn default() -> Self {
        Self {
            token: PhraseToken::NULL,
            score: f32::NEG_INFINITY,
            sentence_length: 0,
            secondary: PhraseToken::NULL,
            pending: None,
            next: None,
        }
    }
}

impl Scored for MatrixValue {
    fn score(&self) -> f32 {
        self.score
    }
}

impl MatrixValue {
    pub(crate) fn from_trellis(value: &TrellisValue) -> Self {
        Self {
            token: value.token(),
            score: value.score,
            sentence_length: value.sentence_length,
            secondary: value.secondary(),
            pending: value.predecessor(),
            next: None,
        }
    }

    pub fn next(&self) -> Option<MatrixRef> {
        self.next
    }
}

pub type MatrixStep<const K: usize> = BoundedCell<MatrixValue, K>;

/// One phrase of a result, covering positions `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct MatchedSpan {
    pub start: usize,
    pub end: usize,
    pub token: PhraseToken,
}

/// A complete token sequence covering the whole key matrix.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    pub spans: Vec<MatchedSpan>,
    /// Natural-log path probability.
    pub score: f32,
    /// Rendered length in characters.
    pub sentence_length: u32,
}

impl MatchResult {
    pub fn tokens(&self) -> Vec<PhraseToken> {
        self.spans.iter().map(|s| s.token).collect()
    }

    /// Per-position layout: the token at each span start, `NULL` elsewhere.
    pub fn positional(&self, size: usize) -> Vec<PhraseToken> {
        let mut out = vec![PhraseToken::NULL; size];
        for span in &self.spans {
            if let Some(slot) = out.get_mut(span.start) {
                *slot = span.token;
            }
        }
        out
    }
}

pub struct BackwardMatrix<const K: usize> {
    steps: Vec<MatrixStep<K>>,
}

impl<const K: usize> Default for BackwardMatrix<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const K: usize> BackwardMatrix<K> {
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Reset to positions `0..=length` and install `tail` at `length`.
    pub fn set_tail(&mut self, tail: MatrixStep<K>, length: usize) {
        self.steps.clear();
        self.steps.resize_with(length + 1, MatrixStep::<K>::new);
        self.steps[length] = tail;
    }

    pub fn step(&self, position: usize) -> Option<&MatrixStep<K>> {
        self.steps.get(position)
    }

    /// Walk every pending back-reference from the last position down to 1.
    ///
    /// Values at a position are final once all later positions have been
    /// walked, so forward pointers never go stale.
    pub fn back_trace(&mut self, trellis: &ForwardTrellis<K>) {
        let length = self.steps.len().saturating_sub(1);
        let _span = debug_span!("back_trace", length).entered();
        for position in (1..self.steps.len()).rev() {
            let values: Vec<MatrixValue> = self.steps[position].iter().copied().collect();
            for (slot, value) in values.into_iter().enumerate() {
                let Some(pending) = value.pending else {
                    continue;
                };
                let Some(prev) = trellis.resolve(pending.step(), value.secondary, pending.slot()) else {
                    continue;
                };
                let inverted = MatrixValue {
                    token: prev.token(),
                    score: value.score,
                    sentence_length: value.sentence_length,
                    secondary: prev.secondary(),
                    pending: prev.predecessor(),
                    next: Some(MatrixRef {
                        step: position,
                        slot,
                    }),
                };
                if let Some(step) = self.steps.get_mut(pending.step()) {
                    step.evaluate(inverted);
                }
            }
        }
        debug!(heads = self.steps.first().map_or(0, |s| s.len()));
    }

    /// Read every chain starting at position 0 into a result.
    pub fn extract(&self) -> Vec<MatchResult> {
        let Some(head) = self.steps.first() else {
            return Vec::new();
        };
        let last = self.steps.len() - 1;
        let mut results = Vec::with_capacity(head.len());
        for value in head.iter() {
            let mut spans = Vec::new();
            let mut start = 0;
            let mut cursor = value.next;
            while let Some(at) = cursor {
                let Some(next) = self.steps.get(at.step).and_then(|s| s.get(at.slot)) else {
                    break;
                };
                spans.push(MatchedSpan {
                    start,
                    end: at.step,
                    token: next.token,
                });
                start = at.step;
                cursor = next.next;
            }
            if spans.is_empty() || start != last {
                continue;
            }
            results.push(MatchResult {
                spans,
                score: value.score,
                sentence_length: value.sentence_length,
            });
        }
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(n: u32) -> PhraseToken {
        PhraseToken(n)
    }

    /// seed -> 20 over [0,1) -> 21 over [1,2), plus 22 over [0,2).
    fn small_trellis() -> ForwardTrellis<2> {
        let mut trellis = ForwardTrellis::<2>::new();
        trellis.reset(2);
        trellis.seed(&[]);
        let seed = trellis.candidates_at(0)[0];
        trellis.insert(1, t(20), seed.extend(t(20), -1.0, 1).unwrap());
        trellis.insert(2, t(22), seed.extend(t(22), -3.0, 2).unwrap());
        let first = trellis.candidates_at(1)[0];
        trellis.insert(2, t(21), first.extend(t(21), -1.0, 1).unwrap());
        trellis
    }

    #[test]
    fn reconstructs_paths() {
        let trellis = small_trellis();
        let mut matrix = BackwardMatrix::<2>::new();
        matrix.set_tail(trellis.tail(), 2);
        matrix.back_trace(&trellis);
        let mut results = matrix.extract();
        results.sort_by(|a, b| b.score.total_cmp(&a.score));

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].tokens(), vec![t(20), t(21)]);
        assert_eq!(results[0].score, -2.0);
        assert_eq!(results[0].sentence_length, 2);
        assert_eq!(
            results[0].spans,
            vec![
                MatchedSpan { start: 0, end: 1, token: t(20) },
                MatchedSpan { start: 1, end: 2, token: t(21) },
            ]
        );
        assert_eq!(results[1].tokens(), vec![t(22)]);
        assert_eq!(results[1].positional(3), vec![t(22), PhraseToken::NULL, PhraseToken::NULL]);
    }

    #[test]
    fn single_best_path_with_k_one() {
        let mut trellis = ForwardTrellis::<1>::new();
        trellis.reset(2);
        trellis.seed(&[]);
        let seed = trellis.candidates_at(0)[0];
        trellis.insert(1, t(20), seed.extend(t(20), -1.0, 1).unwrap());
        trellis.insert(2, t(22), seed.extend(t(22), -3.0, 2).unwrap());
        let first = trellis.candidates_at(1)[0];
        trellis.insert(2, t(21), first.extend(t(21), -1.0, 1).unwrap());

        let mut matrix = BackwardMatrix::<1>::new();
        matrix.set_tail(trellis.tail(), 2);
        matrix.back_trace(&trellis);
        assert_eq!(matrix.step(0).map(|s| s.len()), Some(1));
        let results = matrix.extract();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].tokens(), vec![t(20), t(21)]);
    }

    #[test]
    fn empty_tail_extracts_nothing() {
        let trellis = small_trellis();
        let mut matrix = BackwardMatrix::<2>::new();
        matrix.set_tail(MatrixStep::new(), 2);
        matrix.back_trace(&trellis);
        assert!(matrix.extract().is_empty());
        assert!(BackwardMatrix::<2>::new().extract().is_empty());
    }
}
