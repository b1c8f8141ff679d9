//! Transition scoring: interpolated unigram/bigram probabilities in log space.

use crate::dict::{BigramModel, PhraseIndex, PhraseInfo};
use crate::settings::settings;
use crate::token::PhraseToken;

use super::constraints::PRONUNCIATION_EPSILON;

/// Log score of a forced step the model gives no probability. Lies below
/// the log of the smallest positive `f64`, so it never outranks a step with
/// any evidence, whatever the predecessor.
pub(crate) const UNSEEN_FORCED_SCORE: f32 = -745.0;

/// Interpolation weights for the bigram and unigram estimates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lambdas {
    pub bigram: f32,
    pub unigram: f32,
}

impl Lambdas {
    pub fn from_settings() -> Self {
        let s = &settings().lookup;
        Self {
            bigram: s.bigram_lambda,
            unigram: s.unigram_lambda,
        }
    }
}

impl Default for Lambdas {
    fn default() -> Self {
        Self::from_settings()
    }
}

/// Scores one step of a path, as a natural-log probability.
pub(crate) trait TransitionModel: Send + Sync {
    /// Step from `prev` into `token` read with the given pronunciation
    /// probability. `None` when the step is impossible.
    fn transition(
        &self,
        prev: PhraseToken,
        token: PhraseToken,
        info: Option<PhraseInfo>,
        pronunciation: f32,
    ) -> Option<f32>;

    /// Step into a user-fixed token. Always possible; falls back to
    /// `UNSEEN_FORCED_SCORE` when the model gives it no probability.
    fn forced_transition(&self, prev: PhraseToken, token: PhraseToken, info: Option<PhraseInfo>) -> f32;
}

/// Jelinek-Mercer smoothing of a system and an optional user bigram model
/// with the unigram distribution.
pub(crate) struct Interpolation<'a> {
    phrases: &'a dyn PhraseIndex,
    system: Option<&'a dyn BigramModel>,
    user: Option<&'a dyn BigramModel>,
    lambdas: Lambdas,
    total: f64,
}

impl<'a> Interpolation<'a> {
    pub fn new(
        phrases: &'a dyn PhraseIndex,
        system: Option<&'a dyn BigramModel>,
        user: Option<&'a dyn BigramModel>,
        lambdas: Lambdas,
    ) -> Self {
        Self {
            phrases,
            system,
            user,
            lambdas,
            total: phrases.total_frequency() as f64,
        }
    }

    fn unigram(&self, info: Option<PhraseInfo>) -> f64 {
        match info {
            Some(info) if self.total > 0.0 => f64::from(info.frequency) / self.total,
            _ => 0.0,
        }
    }

    /// Merged system + user estimate of P(token | prev).
    fn bigram(&self, prev: PhraseToken, token: PhraseToken) -> f64 {
        let mut freq = 0u64;
        let mut total = 0u64;
        for model in [self.system, self.user].into_iter().flatten() {
            freq += u64::from(model.frequency(prev, token).unwrap_or(0));
            total += u64::from(model.total_frequency(prev));
        }
        if freq == 0 || total == 0 {
            return 0.0;
        }
        freq as f64 / total as f64
    }

    fn mix(&self, prev: PhraseToken, token: PhraseToken, info: Option<PhraseInfo>) -> (f64, f64, f64) {
        let u = self.unigram(info);
        let b = self.bigram(prev, token);
        let p = f64::from(self.lambdas.bigram) * b + f64::from(self.lambdas.unigram) * u;
        (u, b, p)
    }

    pub fn phrase(&self, token: PhraseToken) -> Option<PhraseInfo> {
        self.phrases.phrase(token)
    }
}

impl TransitionModel for Interpolation<'_> {
    fn transition(
        &self,
        prev: PhraseToken,
        token: PhraseToken,
        info: Option<PhraseInfo>,
        pronunciation: f32,
    ) -> Option<f32> {
        if pronunciation <= PRONUNCIATION_EPSILON {
            return None;
        }
        let (u, b, p) = self.mix(prev, token, info);
        if u == 0.0 && b == 0.0 {
            return None;
        }
        let p = p * f64::from(pronunciation);
        if p <= 0.0 {
            return None;
        }
        Some(p.ln() as f32)
    }

    fn forced_transition(&self, prev: PhraseToken, token: PhraseToken, info: Option<PhraseInfo>) -> f32 {
        let (_, _, p) = self.mix(prev, token, info);
        if p > 0.0 {
            p.ln() as f32
        } else {
            UNSEEN_FORCED_SCORE
        }
    }
}
