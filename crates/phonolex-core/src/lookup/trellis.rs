use std::collections::HashMap;

use super::backward::{MatrixStep, MatrixValue};
use super::cell::{BoundedCell, Scored};
use crate::token::PhraseToken;

/// Back-reference to a record in the forward trellis: position and slot.
///
/// Only the trellis hands these out, so a reference always names a slot
/// that existed when it was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrellisRef {
    step: usize,
    slot: usize,
}

impl TrellisRef {
    pub fn step(&self) -> usize {
        self.step
    }

    pub fn slot(&self) -> usize {
        self.slot
    }
}

/// One partial-path hypothesis ending at a position with a token.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrellisValue {
    /// `[previous token, current token]`.
    pub handles: [PhraseToken; 2],
    /// Rendered length of the path so far, in characters.
    pub sentence_length: u32,
    /// Natural-log path probability.
    pub score: f32,
    pub(crate) predecessor: Option<TrellisRef>,
    /// Where this record itself lives; set by `candidates_at`.
    pub(crate) visiting: Option<TrellisRef>,
}

impl Default for TrellisValue {
    fn default() -> Self {
        Self {
            handles: [PhraseToken::NULL; 2],
            sentence_length: 0,
            score: f32::NEG_INFINITY,
            predecessor: None,
            visiting: None,
        }
    }
}

impl Scored for TrellisValue {
    fn score(&self) -> f32 {
        self.score
    }
}

impl TrellisValue {
    fn seed(token: PhraseToken) -> Self {
        Self {
            handles: [PhraseToken::NULL, token],
            score: 0.0,
            ..Self::default()
        }
    }

    pub fn token(&self) -> PhraseToken {
        self.handles[1]
    }

    /// Token of the record this one extends (`NULL` for seeds).
    pub fn secondary(&self) -> PhraseToken {
        self.handles[0]
    }

    pub fn predecessor(&self) -> Option<TrellisRef> {
        self.predecessor
    }

    /// Continue this record with `token`. `transition` is a log
    /// probability, `length` the rendered length of `token`.
    ///
    /// Returns `None` unless the record came from `candidates_at`.
    pub fn extend(&self, token: PhraseToken, transition: f32, length: u32) -> Option<TrellisValue> {
        let from = self.visiting?;
        Some(TrellisValue {
            handles: [self.token(), token],
            sentence_length: self.sentence_length.saturating_add(length),
            score: self.score + transition,
            predecessor: Some(from),
            visiting: None,
        })
    }
}

/// Cells of one position, in first-insertion order.
struct TrellisStep<const K: usize> {
    index: HashMap<PhraseToken, usize>,
    cells: Vec<(PhraseToken, BoundedCell<TrellisValue, K>)>,
}

impl<const K: usize> Default for TrellisStep<K> {
    fn default() -> Self {
        Self {
            index: HashMap::new(),
            cells: Vec::new(),
        }
    }
}

impl<const K: usize> TrellisStep<K> {
    fn cell(&self, token: PhraseToken) -> Option<&BoundedCell<TrellisValue, K>> {
        self.index.get(&token).map(|&i| &self.cells[i].1)
    }

    fn cell_mut(&mut self, token: PhraseToken) -> &mut BoundedCell<TrellisValue, K> {
        let i = match self.index.get(&token) {
            Some(&i) => i,
            None => {
                let i = self.cells.len();
                self.index.insert(token, i);
                self.cells.push((token, BoundedCell::new()));
                i
            }
        };
        &mut self.cells[i].1
    }

    fn records(&self) -> usize {
        self.cells.iter().map(|(_, cell)| cell.len()).sum()
    }
}

/// Left-to-right N-best table: per position, per token, the K best
/// partial paths ending there.
pub struct ForwardTrellis<const K: usize> {
    steps: Vec<TrellisStep<K>>,
}

impl<const K: usize> Default for ForwardTrellis<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const K: usize> ForwardTrellis<K> {
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Drop everything and allocate positions `0..=length`.
    pub fn reset(&mut self, length: usize) {
        self.steps.clear();
        self.steps.resize_with(length + 1, TrellisStep::default);
    }

    /// Index of the last position, or `None` before `reset`.
    pub fn length(&self) -> Option<usize> {
        self.steps.len().checked_sub(1)
    }

    /// Fill position 0 with one record per distinct prefix token.
    ///
    /// Null tokens are ignored; with no usable prefix the sentence start
    /// is used. Does nothing if position 0 is already filled.
    pub fn seed(&mut self, prefixes: &[PhraseToken]) {
        let Some(first) = self.steps.first_mut() else {
            return;
        };
        if !first.cells.is_empty() {
            return;
        }
        let mut tokens: Vec<PhraseToken> = prefixes.iter().copied().filter(|t| !t.is_null()).collect();
        if tokens.is_empty() {
            tokens.push(PhraseToken::SENTENCE_START);
        }
        for token in tokens {
            if first.cell(token).is_none() {
                first.cell_mut(token).evaluate(TrellisValue::seed(token));
            }
        }
    }

    /// Offer `candidate` to the cell of `token` at `position`.
    ///
    /// Rejects out-of-range positions, candidates for another token, and
    /// candidates whose predecessor is not strictly earlier.
    pub fn insert(&mut self, position: usize, token: PhraseToken, candidate: TrellisValue) -> bool {
        if position >= self.steps.len() || candidate.token() != token {
            return false;
        }
        match candidate.predecessor {
            Some(pred) if pred.step < position => {}
            _ => return false,
        }
        let candidate = TrellisValue {
            visiting: None,
            ..candidate
        };
        self.steps[position].cell_mut(token).evaluate(candidate)
    }

    /// Every record at `position`, each marked with its own location.
    pub fn candidates_at(&self, position: usize) -> Vec<TrellisValue> {
        let Some(step) = self.steps.get(position) else {
            return Vec::new();
        };
        let mut out = Vec::with_capacity(step.records());
        for (_, cell) in &step.cells {
            for (slot, value) in cell.iter().enumerate() {
                out.push(TrellisValue {
                    visiting: Some(TrellisRef { step: position, slot }),
                    ..*value
                });
            }
        }
        out
    }

    pub fn resolve(&self, position: usize, token: PhraseToken, slot: usize) -> Option<TrellisValue> {
        self.steps.get(position)?.cell(token)?.get(slot).copied()
    }

    /// Tokens holding at least one record at `position`, in insertion order.
    pub fn tokens_at(&self, position: usize) -> Vec<PhraseToken> {
        self.steps
            .get(position)
            .map(|step| step.cells.iter().map(|(t, _)| *t).collect())
            .unwrap_or_default()
    }

    /// Number of records at `position`.
    pub fn records_at(&self, position: usize) -> usize {
        self.steps.get(position).map_or(0, TrellisStep::records)
    }

    /// The K best records at the last position.
    pub fn tail(&self) -> MatrixStep<K> {
        let mut tail = MatrixStep::<K>::new();
        if let Some(last) = self.steps.last() {
            for (_, cell) in &last.cells {
                for value in cell.iter() {
                    tail.evaluate(MatrixValue::from_trellis(value));
                }
            }
        }
        tail
    }
}
