/// A record that competes for a slot by score (higher is better).
pub trait Scored: Copy {
    fn score(&self) -> f32;
}

/// Fixed-capacity container keeping the `K` best-scoring records seen.
///
/// Storage is an owned `[T; K]` plus an occupied count; slots past `len`
/// hold default values and are never read. Records are not kept in any
/// order, so a slot index stays valid until that record is evicted.
#[derive(Debug, Clone)]
pub struct BoundedCell<T, const K: usize> {
    len: usize,
    items: [T; K],
}

impl<T: Scored + Default, const K: usize> Default for BoundedCell<T, K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Scored + Default, const K: usize> BoundedCell<T, K> {
    pub fn new() -> Self {
        Self {
            len: 0,
            items: [T::default(); K],
        }
    }

    /// Offer a record. Returns true if it was stored.
    ///
    /// While there is room the record is appended. Once full, it replaces
    /// the lowest-scoring record only if its score is strictly greater, so
    /// on equal scores the earlier record stays.
    pub fn evaluate(&mut self, item: T) -> bool {
        if self.len < K {
            self.items[self.len] = item;
            self.len += 1;
            return true;
        }

        let Some(min_slot) = self.min_slot() else {
            return false;
        };
        if item.score() > self.items[min_slot].score() {
            self.items[min_slot] = item;
            return true;
        }
        false
    }

    /// Slot of the lowest score; the first one on ties.
    fn min_slot(&self) -> Option<usize> {
        let mut min: Option<usize> = None;
        for (slot, item) in self.as_slice().iter().enumerate() {
            match min {
                Some(m) if self.items[m].score() <= item.score() => {}
                _ => min = Some(slot),
            }
        }
        min
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len == K
    }

    pub fn capacity(&self) -> usize {
        K
    }

    pub fn get(&self, slot: usize) -> Option<&T> {
        self.as_slice().get(slot)
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items[..self.len]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.as_slice().iter()
    }

    pub fn clear(&mut self) {
        self.len = 0;
    }
}
