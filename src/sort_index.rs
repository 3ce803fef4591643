/// Sort index over a single column.
///
/// A `SortIndex` is a permutation of row positions that visits the column in
/// ascending value order. It is built with a stable sort, so rows holding equal
/// keys keep their physical order. The index is immutable: requesting a
/// different key means building a new one.

use crate::column::Column;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortIndex {
    key: String,
    /// order[rank] = physical row position
    order: Vec<usize>,
}

impl SortIndex {
    /// Build the ascending permutation for `column`.
    pub fn build(column: &Column) -> Self {
        let values = column.values();
        let mut order: Vec<usize> = (0..values.len()).collect();
        // sort_by is stable; ties stay in physical order
        order.sort_by(|&a, &b| values[a].cmp(&values[b]));

        SortIndex {
            key: column.name().to_string(),
            order,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn order(&self) -> &[usize] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Physical row position at the given sorted rank.
    pub fn position(&self, rank: usize) -> Option<usize> {
        self.order.get(rank).copied()
    }
}
