use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{data_lines, parse_field, BigramModel, DictError};
use crate::token::PhraseToken;

/// Frequencies of everything observed after one token.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct SingleGram {
    total: u32,
    next: HashMap<PhraseToken, u32>,
}

/// In-memory bigram counts, usable as either the system or the user model.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Bigram {
    grams: HashMap<PhraseToken, SingleGram>,
}

impl Bigram {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `frequency` observations of `next` following `prev`.
    pub fn insert(&mut self, prev: PhraseToken, next: PhraseToken, frequency: u32) {
        let gram = self.grams.entry(prev).or_default();
        let count = gram.next.entry(next).or_insert(0);
        *count = count.saturating_add(frequency);
        gram.total = gram.total.saturating_add(frequency);
    }

    /// Number of distinct (prev, next) pairs.
    pub fn len(&self) -> usize {
        self.grams.values().map(|g| g.next.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Parse the text format: `prev next frequency` per line.
    pub fn from_text(text: &str) -> Result<Self, DictError> {
        let mut bigram = Self::new();
        for (line, fields) in data_lines(text) {
            if fields.len() != 3 {
                return Err(DictError::Parse {
                    line,
                    reason: format!("expected 3 fields, got {}", fields.len()),
                });
            }
            let prev: PhraseToken = parse_field(line, "prev token", fields[0])?;
            let next: PhraseToken = parse_field(line, "next token", fields[1])?;
            let frequency: u32 = parse_field(line, "frequency", fields[2])?;
            bigram.insert(prev, next, frequency);
        }
        Ok(bigram)
    }
}

impl BigramModel for Bigram {
    fn frequency(&self, prev: PhraseToken, next: PhraseToken) -> Option<u32> {
        self.grams.get(&prev)?.next.get(&next).copied()
    }

    fn total_frequency(&self, prev: PhraseToken) -> u32 {
        self.grams.get(&prev).map_or(0, |g| g.total)
    }
}
