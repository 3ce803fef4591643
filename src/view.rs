/// Row views over a Dataset.
///
/// Views hand out rows lazily without copying or reordering columns. `Rows`
/// walks physical order; `PartialView` walks an explicit list of positions,
/// such as a filtered id list or a sort permutation.

use crate::dataset::{Dataset, Row};
use crate::error::{DatasetError, Result};

/// Iterator over every row in physical order.
pub struct Rows<'a> {
    dataset: &'a Dataset,
    index: usize,
}

impl<'a> Rows<'a> {
    pub(crate) fn new(dataset: &'a Dataset) -> Self {
        Rows { dataset, index: 0 }
    }
}

impl<'a> Iterator for Rows<'a> {
    type Item = Row;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.dataset.len() {
            None
        } else {
            let row = self
                .dataset
                .item(self.index)
                .expect("row index is below dataset length");
            self.index += 1;
            Some(row)
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.dataset.len().saturating_sub(self.index);
        (remaining, Some(remaining))
    }
}

/// Rows at a caller-supplied list of positions, in the given order.
///
/// The view is restartable: every call to `iter` starts from the first
/// position. A position outside the dataset yields an error for that element
/// only.
///
/// # Examples
///
/// ```
/// use cdset::{row, Dataset, PartialView, Value};
///
/// let mut ds = Dataset::new();
/// for i in 0..5 {
///     ds.append(row! { "id" => i }).unwrap();
/// }
///
/// let picked = [4, 1];
/// let view = PartialView::new(&ds, &picked);
/// let ids: Vec<Value> = view.iter().map(|r| r.unwrap()["id"].clone()).collect();
/// assert_eq!(ids, vec![Value::Integer(4), Value::Integer(1)]);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct PartialView<'a> {
    dataset: &'a Dataset,
    indices: &'a [usize],
}

impl<'a> PartialView<'a> {
    pub fn new(dataset: &'a Dataset, indices: &'a [usize]) -> Self {
        PartialView { dataset, indices }
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Row at view position `index`.
    pub fn get_row(&self, index: usize) -> Result<Row> {
        let position = *self.indices.get(index).ok_or(DatasetError::IndexOutOfRange {
            index,
            len: self.indices.len(),
        })?;
        self.dataset.item(position)
    }

    /// Physical positions backing the view.
    pub fn indices(&self) -> &'a [usize] {
        self.indices
    }

    pub fn iter(&self) -> PartialIter<'a> {
        PartialIter {
            dataset: self.dataset,
            positions: self.indices.iter(),
        }
    }
}

impl<'a> IntoIterator for PartialView<'a> {
    type Item = Result<Row>;
    type IntoIter = PartialIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, 'v> IntoIterator for &'v PartialView<'a> {
    type Item = Result<Row>;
    type IntoIter = PartialIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

pub struct PartialIter<'a> {
    dataset: &'a Dataset,
    positions: std::slice::Iter<'a, usize>,
}

impl<'a> Iterator for PartialIter<'a> {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        self.positions.next().map(|&pos| self.dataset.item(pos))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.positions.size_hint()
    }
}

impl<'a> ExactSizeIterator for PartialIter<'a> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row;
    use crate::Value;

    fn sample() -> Dataset {
        let mut ds = Dataset::new();
        for (name, score) in [("ann", 3), ("bob", 1), ("cyd", 2)] {
            ds.append(row! { "name" => name, "score" => score }).unwrap();
        }
        ds
    }

    #[test]
    fn test_rows_physical_order() {
        let ds = sample();
        let names: Vec<Value> = ds.iter_rows().map(|r| r["name"].clone()).collect();
        assert_eq!(names, vec![Value::from("ann"), Value::from("bob"), Value::from("cyd")]);
        assert_eq!(ds.iter_rows().size_hint(), (3, Some(3)));
    }

    #[test]
    fn test_rows_yield_every_back_filled_row() {
        let mut ds = sample();
        ds.append(row! { "name" => "dee", "score" => 4, "team" => "red" }).unwrap();

        let rows: Vec<Row> = ds.iter_rows().collect();
        assert_eq!(rows.len(), ds.len());
        assert_eq!(ds.iter_rows().count(), 4);
        for row in &rows[..3] {
            assert_eq!(row["team"], Value::Null);
        }
        assert_eq!(rows[3]["team"], Value::from("red"));
    }

    #[test]
    fn test_partial_view_order_and_restart() {
        let ds = sample();
        let ids = vec![2, 0, 2];
        let view = PartialView::new(&ds, &ids);

        let first: Vec<Row> = view.iter().collect::<Result<_>>().unwrap();
        let second: Vec<Row> = view.iter().collect::<Result<_>>().unwrap();
        assert_eq!(first.len(), 3);
        assert_eq!(first, second);
        assert_eq!(first[0]["name"], Value::from("cyd"));
        assert_eq!(first[1]["name"], Value::from("ann"));
        assert_eq!(view.get_row(1).unwrap()["score"], Value::Integer(3));
    }

    #[test]
    fn test_partial_view_out_of_range() {
        let ds = sample();
        let ids = vec![1, 7];
        let view = PartialView::new(&ds, &ids);

        let results: Vec<Result<Row>> = view.into_iter().collect();
        assert!(results[0].is_ok());
        assert!(matches!(
            results[1],
            Err(DatasetError::IndexOutOfRange { index: 7, len: 3 })
        ));
        assert!(matches!(
            view.get_row(2),
            Err(DatasetError::IndexOutOfRange { index: 2, len: 2 })
        ));
    }

    #[test]
    fn test_empty_view() {
        let ds = sample();
        let view = PartialView::new(&ds, &[]);
        assert!(view.is_empty());
        assert_eq!(view.iter().count(), 0);
    }
}
