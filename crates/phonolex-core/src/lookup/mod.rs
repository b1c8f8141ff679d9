//! N-best phonetic lookup over a key matrix.
//!
//! A forward pass fills a trellis left to right, keeping the K best partial
//! paths per (position, token). A backward pass then turns the K best
//! complete paths into ordered token sequences. Fixed selections from
//! `Constraints` restrict which spans may be read and how.

mod backward;
mod cell;
mod constraints;
mod score;
mod trellis;

#[cfg(test)]
pub(crate) mod testutil;
#[cfg(test)]
mod tests;

use std::collections::HashSet;

use tracing::{debug, debug_span};

use crate::dict::{BigramModel, PhoneticTable, PhraseIndex, SpanMatch};
use crate::matrix::PhoneticKeyMatrix;
use crate::settings::settings;
use crate::token::PhraseToken;

use score::{Interpolation, TransitionModel};

pub use backward::{BackwardMatrix, MatchResult, MatchedSpan, MatrixRef, MatrixStep, MatrixValue};
pub use cell::{BoundedCell, Scored};
pub use constraints::{Constraint, Constraints};
pub use score::Lambdas;
pub use trellis::{ForwardTrellis, TrellisRef, TrellisValue};

/// Beam-bounded N-best decoder. `K` bounds both the records kept per
/// (position, token) and the number of results.
///
/// The trellis and backward matrix are reused across calls; collaborators
/// are borrowed read-only.
pub struct PhoneticLookup<'a, const K: usize> {
    table: &'a dyn PhoneticTable,
    phrases: &'a dyn PhraseIndex,
    system_bigram: Option<&'a dyn BigramModel>,
    user_bigram: Option<&'a dyn BigramModel>,
    lambdas: Lambdas,
    max_phrase_length: usize,
    forward: ForwardTrellis<K>,
    backward: BackwardMatrix<K>,
}

impl<'a, const K: usize> PhoneticLookup<'a, K> {
    /// Unigram-only lookup; interpolation weights and span length come from
    /// the `[lookup]` settings.
    pub fn new(table: &'a dyn PhoneticTable, phrases: &'a dyn PhraseIndex) -> Self {
        Self {
            table,
            phrases,
            system_bigram: None,
            user_bigram: None,
            lambdas: Lambdas::from_settings(),
            max_phrase_length: settings().lookup.max_phrase_length,
            forward: ForwardTrellis::new(),
            backward: BackwardMatrix::new(),
        }
    }

    pub fn with_system_bigram(mut self, bigram: &'a dyn BigramModel) -> Self {
        self.system_bigram = Some(bigram);
        self
    }

    pub fn with_user_bigram(mut self, bigram: &'a dyn BigramModel) -> Self {
        self.user_bigram = Some(bigram);
        self
    }

    pub fn with_lambdas(mut self, lambdas: Lambdas) -> Self {
        self.lambdas = lambdas;
        self
    }

    /// Longest span, in positions, looked up in the phonetic table.
    pub fn with_max_phrase_length(mut self, max: usize) -> Self {
        self.max_phrase_length = max.max(1);
        self
    }

    pub fn table(&self) -> &'a dyn PhoneticTable {
        self.table
    }

    /// Trellis of the last search.
    pub fn forward_trellis(&self) -> &ForwardTrellis<K> {
        &self.forward
    }

    /// Backward matrix of the last search.
    pub fn backward_matrix(&self) -> &BackwardMatrix<K> {
        &self.backward
    }

    /// Find up to K token sequences covering `matrix`, best first.
    ///
    /// `prefixes` are the tokens committed before this input (bigram
    /// context only); with none, the sentence start is assumed. Never
    /// fails: an empty matrix or an unreadable span yields no results.
    pub fn get_best_match(
        &mut self,
        prefixes: &[PhraseToken],
        matrix: &PhoneticKeyMatrix,
        constraints: &Constraints,
    ) -> Vec<MatchResult> {
        let size = matrix.size();
        let _span = debug_span!("get_best_match", size, k = K, prefixes = prefixes.len()).entered();
        if size <= 1 || K == 0 {
            return Vec::new();
        }

        let length = size - 1;
        self.forward.reset(length);
        self.forward.seed(prefixes);

        let model = Interpolation::new(self.phrases, self.system_bigram, self.user_bigram, self.lambdas);
        let mut matches: Vec<SpanMatch> = Vec::new();
        let mut inserted = 0usize;

        for start in 0..length {
            let constraint = constraints.get(start);
            if matches!(constraint, Constraint::NoSearch { .. }) {
                continue;
            }
            let candidates = self.forward.candidates_at(start);
            if candidates.is_empty() {
                continue;
            }

            if let Constraint::OneStep { token, end } = constraint {
                if end > length {
                    continue;
                }
                let info = model.phrase(token);
                let rendered = info.map_or(0, |i| i.length);
                for cur in &candidates {
                    let transition = model.forced_transition(cur.token(), token, info);
                    if let Some(next) = cur.extend(token, transition, rendered) {
                        inserted += usize::from(self.forward.insert(end, token, next));
                    }
                }
                continue;
            }

            let limit = self.span_limit(start, length, constraints);
            for end in matrix
                .ends(start, self.max_phrase_length)
                .into_iter()
                .take_while(|&end| end <= limit)
            {
                matches.clear();
                self.table.search(matrix, start, end, &mut matches);
                for found in &matches {
                    let Some(info) = model.phrase(found.token) else {
                        continue;
                    };
                    for cur in &candidates {
                        let Some(transition) =
                            model.transition(cur.token(), found.token, Some(info), found.pronunciation)
                        else {
                            continue;
                        };
                        if let Some(next) = cur.extend(found.token, transition, info.length) {
                            inserted += usize::from(self.forward.insert(end, found.token, next));
                        }
                    }
                }
            }
        }

        let tail = self.forward.tail();
        self.backward.set_tail(tail, length);
        self.backward.back_trace(&self.forward);
        let mut results = self.backward.extract();
        results.sort_by(|a, b| b.score.total_cmp(&a.score));
        let extracted = results.len();
        dedup_by_spans(&mut results);

        debug!(
            inserted,
            extracted,
            result_count = results.len(),
            best_score = results.first().map(|r| r.score)
        );
        results
    }

    /// Furthest end for a free span starting at `start`: within
    /// `max_phrase_length`, and not past the next constrained position.
    fn span_limit(&self, start: usize, length: usize, constraints: &Constraints) -> usize {
        let limit = length.min(start.saturating_add(self.max_phrase_length));
        (start + 1..limit)
            .find(|&p| constraints.get(p) != Constraint::None)
            .unwrap_or(limit)
    }
}

/// Keep only the first result of each distinct span sequence. Paths that
/// differ only in their context token read the same; after the sort the
/// first one is the best scoring.
fn dedup_by_spans(results: &mut Vec<MatchResult>) {
    let mut seen: HashSet<Vec<MatchedSpan>> = HashSet::with_capacity(results.len());
    results.retain(|result| seen.insert(result.spans.clone()));
}
