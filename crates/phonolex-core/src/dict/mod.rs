//! Dictionary-side collaborators of the lookup.
//!
//! The lookup only sees the `PhoneticTable`, `PhraseIndex` and `BigramModel`
//! traits. `Lexicon` and `Bigram` are in-memory implementations with a
//! tab-separated text format and a compact binary format.

mod bigram;
mod io;
mod lexicon;

pub use bigram::Bigram;
pub use io::{detect, FileKind};
pub use lexicon::{Lexicon, LexiconEntry};

use std::io as std_io;

use crate::matrix::PhoneticKeyMatrix;
use crate::token::PhraseToken;

/// Unified error type for lexicon and bigram loading and saving.
#[derive(Debug, thiserror::Error)]
pub enum DictError {
    #[error("IO error: {0}")]
    Io(#[from] std_io::Error),

    #[error("invalid header (too short)")]
    InvalidHeader,

    #[error("invalid magic bytes (expected PLXL or PLXB)")]
    InvalidMagic,

    #[error("unsupported version: {0}")]
    UnsupportedVersion(u8),

    #[error("serialization error: {0}")]
    Serialize(bincode::Error),

    #[error("deserialization error: {0}")]
    Deserialize(bincode::Error),

    #[error("parse error at line {line}: {reason}")]
    Parse { line: usize, reason: String },
}

/// A phrase token whose spelling matches a span, with the probability of
/// that pronunciation given the span's readings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpanMatch {
    pub token: PhraseToken,
    pub pronunciation: f32,
}

/// Per-phrase statistics used for scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhraseInfo {
    /// Unigram frequency.
    pub frequency: u32,
    /// Rendered length in characters.
    pub length: u32,
}

/// Spelling-to-token lookup over a key matrix.
pub trait PhoneticTable: Send + Sync {
    /// Append every token whose spelling matches `[start, end)` to `out`.
    fn search(&self, matrix: &PhoneticKeyMatrix, start: usize, end: usize, out: &mut Vec<SpanMatch>);

    /// Pronunciation probability of `token` over `[start, end)`; 0.0 when
    /// the token cannot be spelled that way.
    fn pronunciation(
        &self,
        matrix: &PhoneticKeyMatrix,
        start: usize,
        end: usize,
        token: PhraseToken,
    ) -> f32;
}

pub trait PhraseIndex: Send + Sync {
    fn phrase(&self, token: PhraseToken) -> Option<PhraseInfo>;
    /// Sum of all unigram frequencies.
    fn total_frequency(&self) -> u64;
}

pub trait BigramModel: Send + Sync {
    /// Joint frequency of `next` following `prev`, `None` when unobserved.
    fn frequency(&self, prev: PhraseToken, next: PhraseToken) -> Option<u32>;
    /// Sum of frequencies of everything observed after `prev`.
    fn total_frequency(&self, prev: PhraseToken) -> u32;
}

/// Iterate over the non-empty, non-comment lines of a text data file.
///
/// Yields `(line_number, fields)` with 1-based line numbers. Fields are
/// tab-separated when the line contains a tab, whitespace-separated otherwise.
pub(crate) fn data_lines(text: &str) -> impl Iterator<Item = (usize, Vec<&str>)> {
    text.lines().enumerate().filter_map(|(i, line)| {
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() || line.starts_with('#') {
            return None;
        }
        let fields = if line.contains('\t') {
            line.split('\t').map(str::trim).collect()
        } else {
            line.split_whitespace().collect()
        };
        Some((i + 1, fields))
    })
}

/// Parse a numeric field, reporting the field name on failure.
pub(crate) fn parse_field<T: std::str::FromStr>(
    line: usize,
    name: &str,
    value: &str,
) -> Result<T, DictError>
where
    T::Err: std::fmt::Display,
{
    value.parse().map_err(|e| DictError::Parse {
        line,
        reason: format!("invalid {name} '{value}': {e}"),
    })
}
