use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{data_lines, parse_field, DictError, PhoneticTable, PhraseIndex, PhraseInfo, SpanMatch};
use crate::matrix::PhoneticKeyMatrix;
use crate::token::PhraseToken;

/// One pronunciation of a phrase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LexiconEntry {
    /// Keys joined with `'`, e.g. `"ni'hao"`.
    pub spelling: String,
    pub text: String,
    pub token: PhraseToken,
    pub frequency: u32,
}

struct PhraseRecord {
    text: String,
    frequency: u32,
    length: u32,
}

/// In-memory phrase dictionary.
///
/// A token may appear under several spellings (polyphones). Its unigram
/// frequency is the sum over its entries; each entry's share of that sum is
/// the probability of that pronunciation.
pub struct Lexicon {
    pub(super) entries: Vec<LexiconEntry>,
    /// spelling → indices into `entries`
    by_spelling: HashMap<String, Vec<usize>>,
    phrases: HashMap<PhraseToken, PhraseRecord>,
    total_frequency: u64,
    /// Longest spelling, in keys.
    max_keys: usize,
}

impl Lexicon {
    pub fn from_entries(entries: impl IntoIterator<Item = LexiconEntry>) -> Self {
        let entries: Vec<LexiconEntry> = entries.into_iter().collect();
        let mut by_spelling: HashMap<String, Vec<usize>> = HashMap::new();
        let mut phrases: HashMap<PhraseToken, PhraseRecord> = HashMap::new();
        let mut total_frequency = 0u64;
        let mut max_keys = 0;

        for (idx, entry) in entries.iter().enumerate() {
            by_spelling.entry(entry.spelling.clone()).or_default().push(idx);
            max_keys = max_keys.max(entry.spelling.split('\'').count());
            total_frequency += u64::from(entry.frequency);
            let record = phrases.entry(entry.token).or_insert_with(|| PhraseRecord {
                text: entry.text.clone(),
                frequency: 0,
                length: entry.text.chars().count() as u32,
            });
            record.frequency = record.frequency.saturating_add(entry.frequency);
        }

        Self {
            entries,
            by_spelling,
            phrases,
            total_frequency,
            max_keys,
        }
    }

    /// Parse the text format: `spelling text token frequency` per line.
    pub fn from_text(text: &str) -> Result<Self, DictError> {
        let mut entries = Vec::new();
        for (line, fields) in data_lines(text) {
            if fields.len() != 4 {
                return Err(DictError::Parse {
                    line,
                    reason: format!("expected 4 fields, got {}", fields.len()),
                });
            }
            let token: PhraseToken = parse_field(line, "token", fields[2])?;
            if token.is_reserved() {
                return Err(DictError::Parse {
                    line,
                    reason: format!("token {token} is reserved"),
                });
            }
            entries.push(LexiconEntry {
                spelling: fields[0].to_string(),
                text: fields[1].to_string(),
                token,
                frequency: parse_field(line, "frequency", fields[3])?,
            });
        }
        Ok(Self::from_entries(entries))
    }

    /// Display text of a phrase.
    pub fn text(&self, token: PhraseToken) -> Option<&str> {
        self.phrases.get(&token).map(|p| p.text.as_str())
    }

    /// Returns (phrase_count, entry_count).
    pub fn stats(&self) -> (usize, usize) {
        (self.phrases.len(), self.entries.len())
    }

    pub fn entries(&self) -> &[LexiconEntry] {
        &self.entries
    }

    /// Probability of `entry` among the pronunciations of its token.
    fn share(&self, entry: &LexiconEntry) -> f32 {
        let Some(record) = self.phrases.get(&entry.token) else {
            return 0.0;
        };
        if record.frequency == 0 {
            // No statistics: every listed pronunciation is equally likely.
            let count = self.entries.iter().filter(|e| e.token == entry.token).count();
            return 1.0 / count.max(1) as f32;
        }
        entry.frequency as f32 / record.frequency as f32
    }

    /// Accumulate pronunciation probabilities over all spellings of the span,
    /// keeping tokens in first-seen order.
    fn accumulate(
        &self,
        matrix: &PhoneticKeyMatrix,
        start: usize,
        end: usize,
        only: Option<PhraseToken>,
    ) -> Vec<SpanMatch> {
        let mut found: Vec<SpanMatch> = Vec::new();
        let mut slots: HashMap<PhraseToken, usize> = HashMap::new();
        for spelling in matrix.spellings(start, end, self.max_keys) {
            let Some(rows) = self.by_spelling.get(&spelling.key) else {
                continue;
            };
            for &row in rows {
                let entry = &self.entries[row];
                if only.is_some_and(|t| t != entry.token) {
                    continue;
                }
                let p = spelling.weight * self.share(entry);
                match slots.get(&entry.token) {
                    Some(&slot) => found[slot].pronunciation += p,
                    None => {
                        slots.insert(entry.token, found.len());
                        found.push(SpanMatch {
                            token: entry.token,
                            pronunciation: p,
                        });
                    }
                }
            }
        }
        for m in &mut found {
            m.pronunciation = m.pronunciation.min(1.0);
        }
        found
    }
}

impl PhoneticTable for Lexicon {
    fn search(&self, matrix: &PhoneticKeyMatrix, start: usize, end: usize, out: &mut Vec<SpanMatch>) {
        out.extend(self.accumulate(matrix, start, end, None));
    }

    fn pronunciation(
        &self,
        matrix: &PhoneticKeyMatrix,
        start: usize,
        end: usize,
        token: PhraseToken,
    ) -> f32 {
        self.accumulate(matrix, start, end, Some(token))
            .first()
            .map_or(0.0, |m| m.pronunciation)
    }
}

impl PhraseIndex for Lexicon {
    fn phrase(&self, token: PhraseToken) -> Option<PhraseInfo> {
        self.phrases.get(&token).map(|p| PhraseInfo {
            frequency: p.frequency,
            length: p.length,
        })
    }

    fn total_frequency(&self) -> u64 {
        self.total_frequency
    }
}
