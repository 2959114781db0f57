//! Per-entity balance accumulation for rankings.

use crate::amount::Amount;
use compact_str::CompactString;
use std::collections::HashMap;

/// Accumulates balances per entity (wallet or validator operator address)
/// while preserving insertion order.
///
/// Insertion order matters for ranking: ties in the top-N output rank the
/// entity seen first higher, and no secondary key exists upstream.
#[derive(Debug, Clone, Default)]
pub struct EntityTally {
    index: HashMap<CompactString, usize>,
    entries: Vec<(CompactString, Amount)>,
}

impl EntityTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `amount` to the entity's running balance.
    pub fn add(&mut self, entity: &str, amount: Amount) {
        match self.index.get(entity) {
            Some(&i) => self.entries[i].1 += amount,
            None => {
                self.index
                    .insert(CompactString::from(entity), self.entries.len());
                self.entries.push((CompactString::from(entity), amount));
            }
        }
    }

    /// Merge another tally into this one, preserving this tally's
    /// first-seen order for entities present in both.
    pub fn merge(&mut self, other: EntityTally) {
        for (entity, amount) in other.entries {
            self.add(&entity, amount);
        }
    }

    pub fn get(&self, entity: &str) -> Option<Amount> {
        self.index.get(entity).map(|&i| self.entries[i].1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Top `n` entities by balance, descending. Stable sort keeps
    /// first-seen entities ahead on equal balances.
    pub fn top_n(&self, n: usize) -> Vec<(CompactString, Amount)> {
        let mut ranked = self.entries.clone();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(n);
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_add_accumulates() {
        let mut tally = EntityTally::new();
        tally.add("heli1aaa", Amount(100));
        tally.add("heli1bbb", Amount(50));
        tally.add("heli1aaa", Amount(25));

        assert_eq!(tally.len(), 2);
        assert_eq!(tally.get("heli1aaa"), Some(Amount(125)));
        assert_eq!(tally.get("heli1bbb"), Some(Amount(50)));
        assert_eq!(tally.get("heli1ccc"), None);
    }

    #[test]
    fn test_top_n_sorted_descending() {
        let mut tally = EntityTally::new();
        tally.add("low", Amount(10));
        tally.add("high", Amount(300));
        tally.add("mid", Amount(200));

        let top = tally.top_n(2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].0.as_str(), "high");
        assert_eq!(top[1].0.as_str(), "mid");
    }

    #[test]
    fn test_top_n_tie_break_is_insertion_order() {
        let mut tally = EntityTally::new();
        tally.add("first", Amount(100));
        tally.add("second", Amount(100));
        tally.add("third", Amount(100));

        let top = tally.top_n(3);
        assert_eq!(top[0].0.as_str(), "first");
        assert_eq!(top[1].0.as_str(), "second");
        assert_eq!(top[2].0.as_str(), "third");
    }

    #[test]
    fn test_top_n_truncates() {
        let mut tally = EntityTally::new();
        for i in 0..20 {
            tally.add(&format!("heli1w{}", i), Amount(i));
        }
        assert_eq!(tally.top_n(10).len(), 10);
        assert_eq!(tally.top_n(50).len(), 20);
    }

    #[test]
    fn test_merge() {
        let mut a = EntityTally::new();
        a.add("x", Amount(1));
        a.add("y", Amount(2));

        let mut b = EntityTally::new();
        b.add("y", Amount(3));
        b.add("z", Amount(4));

        a.merge(b);
        assert_eq!(a.get("x"), Some(Amount(1)));
        assert_eq!(a.get("y"), Some(Amount(5)));
        assert_eq!(a.get("z"), Some(Amount(4)));
    }
}
