use tracing::trace;

use crate::dict::PhoneticTable;
use crate::matrix::PhoneticKeyMatrix;
use crate::token::PhraseToken;

/// Pronunciations at or below this are treated as impossible.
pub(crate) const PRONUNCIATION_EPSILON: f32 = f32::EPSILON;

/// Restriction attached to one key-matrix position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Constraint {
    #[default]
    None,
    /// The span `[position, end)` must be read as `token`.
    OneStep { token: PhraseToken, end: usize },
    /// Inside a one-step span governed by the constraint at `start`.
    NoSearch { start: usize },
}

/// User-fixed selections for one input, one entry per key-matrix position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Constraints {
    entries: Vec<Constraint>,
}

impl Constraints {
    pub fn new() -> Self {
        Self::default()
    }

    /// An unconstrained table for a matrix of `len` positions.
    pub fn with_len(len: usize) -> Self {
        Self {
            entries: vec![Constraint::None; len],
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Out-of-range positions read as `None`.
    pub fn get(&self, position: usize) -> Constraint {
        self.entries.get(position).copied().unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, Constraint)> + '_ {
        self.entries.iter().copied().enumerate()
    }

    /// Fix `[start, end)` to `token`. Returns the number of positions the
    /// new constraint covers, or 0 if nothing changed.
    ///
    /// Any constraint overlapping the span is cleared first, along with
    /// the whole span it governs.
    pub fn add(&mut self, start: usize, end: usize, token: PhraseToken) -> usize {
        if start >= end || end >= self.entries.len() || token.is_null() {
            return 0;
        }
        if self.entries[start] == (Constraint::OneStep { token, end }) {
            return 0;
        }
        for position in start..end {
            self.clear(position);
        }
        self.entries[start] = Constraint::OneStep { token, end };
        for entry in &mut self.entries[start + 1..end] {
            *entry = Constraint::NoSearch { start };
        }
        end - start
    }

    /// Remove the constraint covering `position`. Returns false when the
    /// position was unconstrained.
    pub fn clear(&mut self, position: usize) -> bool {
        let (start, end) = match self.get(position) {
            Constraint::None => return false,
            Constraint::OneStep { end, .. } => (position, end),
            Constraint::NoSearch { start } => match self.get(start) {
                Constraint::OneStep { end, .. } if start < position && position < end => (start, end),
                // dangling
                _ => (position, position + 1),
            },
        };
        let end = end.min(self.entries.len());
        for entry in &mut self.entries[start..end] {
            *entry = Constraint::None;
        }
        true
    }

    pub fn clear_all(&mut self) {
        self.entries.fill(Constraint::None);
    }

    /// Re-fit the table to `matrix` and drop one-step constraints it can no
    /// longer satisfy. Returns true if any constraint was removed.
    pub fn validate(&mut self, matrix: &PhoneticKeyMatrix, table: &dyn PhoneticTable) -> bool {
        let size = matrix.size();
        let mut changed = false;

        if self.entries.len() > size {
            for position in size..self.entries.len() {
                changed |= self.clear(position);
            }
            self.entries.truncate(size);
        }
        self.entries.resize(size, Constraint::None);

        for start in 0..size {
            let Constraint::OneStep { token, end } = self.entries[start] else {
                continue;
            };
            let stale = end >= size || table.pronunciation(matrix, start, end, token) <= PRONUNCIATION_EPSILON;
            if stale {
                trace!(start, end, token = token.0, "dropping stale constraint");
                self.clear(start);
                changed = true;
            }
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dict::Lexicon;

    fn t(n: u32) -> PhraseToken {
        PhraseToken(n)
    }

    #[test]
    fn add_installs_span() {
        let mut c = Constraints::with_len(5);
        assert_eq!(c.add(1, 3, t(14)), 2);
        assert_eq!(c.get(0), Constraint::None);
        assert_eq!(c.get(1), Constraint::OneStep { token: t(14), end: 3 });
        assert_eq!(c.get(2), Constraint::NoSearch { start: 1 });
        assert_eq!(c.get(3), Constraint::None);
        assert_eq!(c.get(99), Constraint::None);
    }

    #[test]
    fn add_rejects_bad_spans() {
        let mut c = Constraints::with_len(3);
        assert_eq!(c.add(1, 1, t(14)), 0);
        assert_eq!(c.add(2, 1, t(14)), 0);
        assert_eq!(c.add(0, 3, t(14)), 0, "end must be before the terminal position");
        assert_eq!(c.add(0, 1, PhraseToken::NULL), 0);
        assert_eq!(c.add(0, 2, t(14)), 2);
        assert_eq!(c.add(0, 2, t(14)), 0, "identical constraint");
        assert_eq!(c.add(0, 2, t(15)), 2, "replacing the token counts");
    }

    #[test]
    fn add_clears_overlapping_spans() {
        let mut c = Constraints::with_len(6);
        c.add(0, 2, t(20));
        c.add(3, 5, t(21));
        assert_eq!(c.add(1, 4, t(22)), 3);
        assert_eq!(c.get(0), Constraint::None);
        assert_eq!(c.get(1), Constraint::OneStep { token: t(22), end: 4 });
        assert_eq!(c.get(3), Constraint::NoSearch { start: 1 });
        // The tail of the cleared [3, 5) span is released too.
        assert_eq!(c.get(4), Constraint::None);
    }

    #[test]
    fn clear_from_interior_position() {
        let mut c = Constraints::with_len(5);
        c.add(0, 3, t(20));
        assert!(c.clear(2));
        assert!(c.iter().all(|(_, entry)| entry == Constraint::None));
        assert!(!c.clear(2));
        assert!(!c.clear(42));
    }

    #[test]
    fn clear_all_resets() {
        let mut c = Constraints::with_len(4);
        c.add(0, 1, t(20));
        c.add(1, 3, t(21));
        c.clear_all();
        assert_eq!(c.len(), 4);
        assert!(c.iter().all(|(_, entry)| entry == Constraint::None));
    }

    #[test]
    fn validate_tracks_matrix() {
        let lex = Lexicon::from_text("ni\t你\t10\t100\nhao\t好\t12\t80\nni'hao\t你好\t14\t50\n").unwrap();
        let matrix = PhoneticKeyMatrix::from_spelling("ni'hao");
        let mut c = Constraints::new();
        assert!(c.is_empty());
        assert!(!c.validate(&matrix, &lex));
        assert_eq!(c.len(), 3);

        assert_eq!(c.add(0, 2, t(14)), 2);
        assert!(!c.validate(&matrix, &lex));
        assert_eq!(c.get(0), Constraint::OneStep { token: t(14), end: 2 });

        // "ni'ma": 你好 no longer readable over [0, 2).
        let changed = PhoneticKeyMatrix::from_spelling("ni'ma");
        assert!(c.validate(&changed, &lex));
        assert_eq!(c.get(0), Constraint::None);
        assert_eq!(c.get(1), Constraint::None);

        // Shrinking cuts off constraints past the new end.
        c.add(0, 1, t(10));
        c.add(1, 2, t(12));
        let short = PhoneticKeyMatrix::from_spelling("ni");
        assert!(c.validate(&short, &lex));
        assert_eq!(c.len(), 2);
        assert_eq!(c.get(0), Constraint::OneStep { token: t(10), end: 1 });
    }
}
