//! Insertion-ordered table with an id index.

use std::collections::HashMap;
use std::hash::Hash;

/// Rows in insertion order plus a position index by id.
///
/// Rows are never removed, so stored positions stay valid.
pub(crate) struct Table<K, V> {
    rows: Vec<V>,
    index: HashMap<K, usize>,
}

impl<K: Eq + Hash, V> Table<K, V> {
    pub(crate) fn new() -> Self {
        Self {
            rows: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Append a row and return its position.
    pub(crate) fn insert(&mut self, id: K, row: V) -> usize {
        let pos = self.rows.len();
        self.rows.push(row);
        let _ = self.index.insert(id, pos);
        pos
    }

    pub(crate) fn get<Q>(&self, id: &Q) -> Option<&V>
    where
        K: std::borrow::Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.index.get(id).map(|&pos| &self.rows[pos])
    }

    pub(crate) fn get_mut<Q>(&mut self, id: &Q) -> Option<&mut V>
    where
        K: std::borrow::Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        let pos = *self.index.get(id)?;
        self.rows.get_mut(pos)
    }

    pub(crate) fn at(&self, pos: usize) -> Option<&V> {
        self.rows.get(pos)
    }

    pub(crate) fn iter(&self) -> impl DoubleEndedIterator<Item = &V> {
        self.rows.iter()
    }

    pub(crate) fn len(&self) -> usize {
        self.rows.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_get() {
        let mut table: Table<String, u32> = Table::new();
        let pos = table.insert("a".into(), 1);
        assert_eq!(pos, 0);
        assert_eq!(table.get("a"), Some(&1));
        assert_eq!(table.at(0), Some(&1));
        assert!(table.get("b").is_none());
    }

    #[test]
    fn iteration_preserves_insertion_order() {
        let mut table: Table<String, u32> = Table::new();
        for (i, key) in ["c", "a", "b"].iter().enumerate() {
            let _ = table.insert((*key).to_owned(), i as u32);
        }
        let rows: Vec<u32> = table.iter().copied().collect();
        assert_eq!(rows, [0, 1, 2]);
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn get_mut_updates_in_place() {
        let mut table: Table<String, u32> = Table::new();
        let _ = table.insert("a".into(), 1);
        *table.get_mut("a").unwrap() += 10;
        assert_eq!(table.get("a"), Some(&11));
    }
}
