//! Per-input state around a lookup: the current key matrix, the user's
//! fixed selections and the committed context.

use tracing::debug;

use crate::lookup::{Constraints, MatchResult, PhoneticLookup};
use crate::matrix::PhoneticKeyMatrix;
use crate::token::PhraseToken;

/// One input being composed.
///
/// Constraints are revalidated whenever the matrix changes, so they never
/// refer to spans the current input cannot read.
pub struct LookupSession<'a, const K: usize> {
    lookup: PhoneticLookup<'a, K>,
    matrix: PhoneticKeyMatrix,
    constraints: Constraints,
    prefixes: Vec<PhraseToken>,
    results: Vec<MatchResult>,
}

impl<'a, const K: usize> LookupSession<'a, K> {
    pub fn new(lookup: PhoneticLookup<'a, K>, matrix: PhoneticKeyMatrix) -> Self {
        let mut constraints = Constraints::new();
        constraints.validate(&matrix, lookup.table());
        Self {
            lookup,
            matrix,
            constraints,
            prefixes: Vec::new(),
            results: Vec::new(),
        }
    }

    /// Replace the key matrix. Returns true if any fixed selection had to
    /// be dropped. Previous results are discarded.
    pub fn set_matrix(&mut self, matrix: PhoneticKeyMatrix) -> bool {
        self.matrix = matrix;
        self.results.clear();
        let dropped = self.constraints.validate(&self.matrix, self.lookup.table());
        if dropped {
            debug!(size = self.matrix.size(), "constraints invalidated by new input");
        }
        dropped
    }

    pub fn matrix(&self) -> &PhoneticKeyMatrix {
        &self.matrix
    }

    /// Tokens committed before this input, used as bigram context.
    pub fn set_prefixes(&mut self, prefixes: Vec<PhraseToken>) {
        self.prefixes = prefixes;
    }

    pub fn prefixes(&self) -> &[PhraseToken] {
        &self.prefixes
    }

    pub fn constraints(&self) -> &Constraints {
        &self.constraints
    }

    /// Fix `[start, end)` to `token`. Returns the number of positions
    /// covered, 0 if nothing changed.
    pub fn fix(&mut self, start: usize, end: usize, token: PhraseToken) -> usize {
        self.constraints.add(start, end, token)
    }

    /// Release the selection covering `position`.
    pub fn unfix(&mut self, position: usize) -> bool {
        self.constraints.clear(position)
    }

    pub fn unfix_all(&mut self) {
        self.constraints.clear_all();
    }

    /// Drop selections the current matrix cannot read. Returns true if any
    /// were dropped.
    pub fn validate(&mut self) -> bool {
        self.constraints.validate(&self.matrix, self.lookup.table())
    }

    /// Run the lookup on the current state and keep the results.
    pub fn guess(&mut self) -> &[MatchResult] {
        self.results = self
            .lookup
            .get_best_match(&self.prefixes, &self.matrix, &self.constraints);
        &self.results
    }

    /// Results of the last `guess`.
    pub fn results(&self) -> &[MatchResult] {
        &self.results
    }

    pub fn lookup(&self) -> &PhoneticLookup<'a, K> {
        &self.lookup
    }
}
