//! Positional key matrix for an ambiguous spelled input.
//!
//! Each position holds outgoing `PhoneticKey` edges; a key spells one unit
//! (usually a syllable) and leads to a later position. A span `[start, end)`
//! is readable when some chain of keys connects the two positions. The last
//! position is terminal and carries no keys.

use std::collections::BTreeSet;

use crate::settings::settings;

/// One phonetic reading leaving a position.
#[derive(Debug, Clone, PartialEq)]
pub struct PhoneticKey {
    pub key: String,
    /// Position this key leads to (exclusive end of the unit).
    pub end: usize,
    /// Confidence of this reading, in `(0, 1]`.
    pub weight: f32,
}

/// A complete spelling of a span: keys joined with `'` and their combined weight.
#[derive(Debug, Clone, PartialEq)]
pub struct Spelling {
    pub key: String,
    pub weight: f32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PhoneticKeyMatrix {
    positions: Vec<Vec<PhoneticKey>>,
}

impl PhoneticKeyMatrix {
    /// Create a matrix with `size` positions and no keys.
    pub fn new(size: usize) -> Self {
        Self {
            positions: vec![Vec::new(); size],
        }
    }

    /// Build a matrix with one position per syllable, each syllable listing
    /// its alternative readings with their weights.
    pub fn from_syllables(syllables: &[Vec<(String, f32)>]) -> Self {
        if syllables.is_empty() {
            return Self::default();
        }
        let mut matrix = Self::new(syllables.len() + 1);
        for (start, alternatives) in syllables.iter().enumerate() {
            for (key, weight) in alternatives {
                matrix.add_key(start, start + 1, key.clone(), *weight);
            }
        }
        matrix
    }

    /// Build a matrix from a pre-segmented spelling such as `"ni'hao"`.
    ///
    /// Syllables are separated by `'` or whitespace; `|` lists fuzzy
    /// alternatives within a syllable (`"zi|zhi"`). The first alternative
    /// weighs 1.0, the rest weigh `matrix.fuzzy_weight`.
    pub fn from_spelling(input: &str) -> Self {
        let fuzzy_weight = settings().matrix.fuzzy_weight;
        let syllables: Vec<Vec<(String, f32)>> = input
            .split(|c: char| c == '\'' || c.is_whitespace())
            .filter(|s| !s.is_empty())
            .map(|syllable| {
                syllable
                    .split('|')
                    .filter(|alt| !alt.is_empty())
                    .enumerate()
                    .map(|(i, alt)| {
                        let weight = if i == 0 { 1.0 } else { fuzzy_weight };
                        (alt.to_string(), weight)
                    })
                    .collect()
            })
            .collect();
        Self::from_syllables(&syllables)
    }

    /// Number of positions, including the terminal one.
    pub fn size(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Add a reading spanning `[start, end)`. Returns false when the span is
    /// out of range or the weight is not in `(0, 1]`.
    pub fn add_key(&mut self, start: usize, end: usize, key: impl Into<String>, weight: f32) -> bool {
        if start >= end || end >= self.positions.len() {
            return false;
        }
        if !(weight > 0.0 && weight <= 1.0) {
            return false;
        }
        self.positions[start].push(PhoneticKey {
            key: key.into(),
            end,
            weight,
        });
        true
    }

    /// Keys leaving `position` (empty when out of range).
    pub fn keys(&self, position: usize) -> &[PhoneticKey] {
        self.positions
            .get(position)
            .map(|keys| keys.as_slice())
            .unwrap_or(&[])
    }

    /// End positions reachable from `start` through at most `max_keys` keys,
    /// in ascending order.
    pub fn ends(&self, start: usize, max_keys: usize) -> Vec<usize> {
        let mut reached = BTreeSet::new();
        let mut frontier = vec![start];
        for _ in 0..max_keys {
            let mut next = Vec::new();
            for &position in &frontier {
                for key in self.keys(position) {
                    if reached.insert(key.end) {
                        next.push(key.end);
                    }
                }
            }
            if next.is_empty() {
                break;
            }
            frontier = next;
        }
        reached.into_iter().collect()
    }

    /// Every key chain spelling exactly `[start, end)` with at most
    /// `max_keys` keys.
    pub fn spellings(&self, start: usize, end: usize, max_keys: usize) -> Vec<Spelling> {
        let mut out = Vec::new();
        if start >= end || end >= self.positions.len() {
            return out;
        }
        let mut keys: Vec<&str> = Vec::new();
        self.collect_spellings(start, end, max_keys, 1.0, &mut keys, &mut out);
        out
    }

    fn collect_spellings<'a>(
        &'a self,
        position: usize,
        end: usize,
        budget: usize,
        weight: f32,
        keys: &mut Vec<&'a str>,
        out: &mut Vec<Spelling>,
    ) {
        if position == end {
            out.push(Spelling {
                key: keys.join("'"),
                weight,
            });
            return;
        }
        if budget == 0 {
            return;
        }
        for key in self.keys(position) {
            if key.end > end {
                continue;
            }
            keys.push(&key.key);
            self.collect_spellings(key.end, end, budget - 1, weight * key.weight, keys, out);
            keys.pop();
        }
    }
}
