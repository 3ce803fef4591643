/// cdset Dataset Implementation
///
/// A Dataset stores rows as parallel named columns. Columns appear on the first
/// row that mentions them and are back-filled with nulls for earlier rows, so
/// every column always has exactly `len()` entries.
///
/// A dataset can build a sort index over one column at a time. The index is
/// cached until the dataset is mutated or a different column is requested, and
/// `group_by` reuses it to aggregate contiguous runs of equal keys.
///
/// # Examples
///
/// ```
/// use cdset::{Dataset, Value, row};
///
/// let mut ds = Dataset::new();
/// ds.append(row! { "a" => 1, "b" => "x" }).unwrap();
/// ds.append(row! { "a" => 2, "b" => "y" }).unwrap();
///
/// assert_eq!(ds.len(), 2);
/// assert_eq!(ds.item(0).unwrap()["b"], Value::from("x"));
///
/// // Missing an existing column is rejected and nothing changes
/// assert!(ds.append(row! { "a" => 3 }).is_err());
/// assert_eq!(ds.len(), 2);
/// ```

use crate::column::{Column, Value};
use crate::error::{DatasetError, Result};
use crate::group::aggregate_runs;
use crate::sort_index::SortIndex;
use crate::view::{PartialView, Rows};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// A materialized row: column name to value.
pub type Row = HashMap<String, Value>;

/// Column names in insertion order.
///
/// Insertion order only matters for display and serialization; lookups are by
/// name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    names: Vec<String>,
}

impl Schema {
    /// Returns the number of columns in the schema.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns true if the schema has no columns.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Returns a list of all column names.
    pub fn get_column_names(&self) -> Vec<&str> {
        self.names.iter().map(|name| name.as_str()).collect()
    }

    /// Returns the index of a column by name, or None if not found.
    pub fn get_column_index(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get_column_index(name).is_some()
    }

    fn push(&mut self, name: String) {
        self.names.push(name);
    }
}

/// Column-oriented row store.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    schema: Schema,
    /// columns[i] belongs to schema.names[i]
    columns: Vec<Column>,
    size: usize,
    /// Last column passed to `sort`; survives mutations so the index can be
    /// rebuilt on demand.
    sort_key: Option<String>,
    /// Valid for `sort_key` only; cleared by every mutation.
    cached_sort: Option<SortIndex>,
    sort_builds: usize,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.schema.get_column_names()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn column(&self, name: &str) -> Result<&Column> {
        let col_idx = self
            .schema
            .get_column_index(name)
            .ok_or_else(|| DatasetError::UnknownColumn(name.to_string()))?;
        Ok(&self.columns[col_idx])
    }

    /// Column most recently passed to `sort`, if any.
    pub fn sort_key(&self) -> Option<&str> {
        self.sort_key.as_deref()
    }

    /// Number of sort permutations built over the dataset's lifetime.
    pub fn sort_builds(&self) -> usize {
        self.sort_builds
    }

    /// Append one row.
    ///
    /// The row must carry a value for every existing column and may introduce
    /// new ones. New columns are pre-filled with nulls for all earlier rows and
    /// added to the schema in name order. Validation runs before any column is
    /// touched, so on error the dataset is unchanged.
    pub fn append(&mut self, mut row: Row) -> Result<()> {
        // Validate existing columns first
        for col in &self.columns {
            let value = row.get(col.name()).ok_or_else(|| DatasetError::SchemaMismatch {
                column: col.name().to_string(),
            })?;
            col.accepts(value)?;
        }

        let mut new_names: Vec<String> = row
            .keys()
            .filter(|name| !self.schema.contains(name))
            .cloned()
            .collect();
        new_names.sort();

        for col in self.columns.iter_mut() {
            let value = row.remove(col.name()).unwrap_or(Value::Null);
            col.append(value)?;
        }

        for name in new_names {
            let value = row.remove(&name).unwrap_or(Value::Null);
            let mut col = Column::with_nulls(name.clone(), self.size);
            col.append(value)?;
            log::trace!("new column '{}' back-filled with {} nulls", name, self.size);
            self.schema.push(name);
            self.columns.push(col);
        }

        self.size += 1;
        self.invalidate_sort();
        log::trace!("appended row {}", self.size - 1);
        Ok(())
    }

    /// Append rows in order, returning how many were added.
    ///
    /// Each row is appended atomically; rows before a failing row stay in the
    /// dataset. The error carries the offset of the failing row.
    pub fn extend<I>(&mut self, rows: I) -> Result<usize>
    where
        I: IntoIterator<Item = Row>,
    {
        let mut count = 0;
        for (offset, row) in rows.into_iter().enumerate() {
            self.append(row).map_err(|e| DatasetError::RowOffset {
                offset,
                source: Box::new(e),
            })?;
            count += 1;
        }
        Ok(count)
    }

    /// Materialize the row at physical position `idx`.
    pub fn item(&self, idx: usize) -> Result<Row> {
        if idx >= self.size {
            return Err(DatasetError::IndexOutOfRange {
                index: idx,
                len: self.size,
            });
        }

        let mut result = HashMap::with_capacity(self.columns.len());
        for col in &self.columns {
            result.insert(col.name().to_string(), col.get(idx)?.clone());
        }
        Ok(result)
    }

    /// Materialize the row at `rank` in the current sort order.
    ///
    /// If the index was discarded by a mutation since the last `sort`, it is
    /// rebuilt for the same column first.
    pub fn sorted_item(&mut self, rank: usize) -> Result<Row> {
        let key = self.sort_key.clone().ok_or(DatasetError::NoSortIndex)?;
        let len = self.size;
        let position = self
            .sort(&key)?
            .position(rank)
            .ok_or(DatasetError::IndexOutOfRange { index: rank, len })?;
        self.item(position)
    }

    /// Unique values of `column`, in ascending order.
    pub fn distinct(&self, column: &str) -> Result<BTreeSet<Value>> {
        Ok(self.column(column)?.iter().cloned().collect())
    }

    /// Sort index for `column`, built on first request and cached.
    ///
    /// Asking again for the same column with no mutation in between returns the
    /// cached index without sorting.
    pub fn sort(&mut self, column: &str) -> Result<&SortIndex> {
        let col_idx = self
            .schema
            .get_column_index(column)
            .ok_or_else(|| DatasetError::UnknownColumn(column.to_string()))?;

        let hit = matches!(&self.cached_sort, Some(index) if index.key() == column);
        if !hit {
            let index = SortIndex::build(&self.columns[col_idx]);
            self.sort_builds += 1;
            log::debug!("built sort index on '{}' over {} rows", column, index.len());
            self.cached_sort = Some(index);
        }
        self.sort_key = Some(column.to_string());

        self.cached_sort.as_ref().ok_or(DatasetError::NoSortIndex)
    }

    /// Group the values of `value` by equal keys of `key` and reduce each
    /// group.
    ///
    /// Groups come back in ascending key order. An empty dataset yields an
    /// empty map without looking up either column, since a dataset with no rows
    /// has no columns yet.
    ///
    /// ```
    /// use cdset::{Aggregate, Dataset, Value, row};
    ///
    /// let mut ds = Dataset::new();
    /// for (a, b) in [(1, 10), (2, 20), (1, 5), (3, 1), (2, 2)] {
    ///     ds.append(row! { "a" => a, "b" => b }).unwrap();
    /// }
    ///
    /// let sums = ds.group_by("a", "b", |run| Aggregate::Sum.reduce(run)).unwrap();
    /// assert_eq!(sums[&Value::Integer(1)], Value::Integer(15));
    /// assert_eq!(sums[&Value::Integer(2)], Value::Integer(22));
    /// assert_eq!(sums[&Value::Integer(3)], Value::Integer(1));
    /// ```
    pub fn group_by<F, R>(&mut self, key: &str, value: &str, reducer: F) -> Result<BTreeMap<Value, R>>
    where
        F: FnMut(&[Value]) -> R,
    {
        if self.is_empty() {
            return Ok(BTreeMap::new());
        }

        let key_idx = self
            .schema
            .get_column_index(key)
            .ok_or_else(|| DatasetError::UnknownColumn(key.to_string()))?;
        let value_idx = self
            .schema
            .get_column_index(value)
            .ok_or_else(|| DatasetError::UnknownColumn(value.to_string()))?;

        self.sort(key)?;
        let order = match &self.cached_sort {
            Some(index) => index.order(),
            None => return Err(DatasetError::NoSortIndex),
        };

        let keys = self.columns[key_idx].values();
        let values = self.columns[value_idx].values();
        let pairs = order.iter().map(|&pos| (&keys[pos], &values[pos]));

        Ok(aggregate_runs(pairs, reducer).into_iter().collect())
    }

    /// Move every column of `other` into this dataset.
    ///
    /// Both datasets must have the same number of rows and share no column
    /// names; otherwise nothing is merged and `other` is dropped.
    pub fn merge(&mut self, other: Dataset) -> Result<()> {
        if self.size != other.size {
            return Err(DatasetError::MergeConflict(format!(
                "size mismatch: {} rows vs {} rows",
                self.size, other.size
            )));
        }
        if let Some(name) = other
            .schema
            .names
            .iter()
            .find(|name| self.schema.contains(name))
        {
            return Err(DatasetError::MergeConflict(format!(
                "column '{}' exists in both datasets",
                name
            )));
        }

        log::debug!(
            "merging {} columns into dataset with {} columns",
            other.columns.len(),
            self.columns.len()
        );
        for col in other.columns {
            self.schema.push(col.name().to_string());
            self.columns.push(col);
        }
        self.invalidate_sort();
        Ok(())
    }

    /// Rows in physical order.
    pub fn iter_rows(&self) -> Rows<'_> {
        Rows::new(self)
    }

    /// Rows in ascending order of `key`.
    pub fn sorted_items(&mut self, key: &str) -> Result<PartialView<'_>> {
        self.sort(key)?;
        let order = match &self.cached_sort {
            Some(index) => index.order(),
            None => return Err(DatasetError::NoSortIndex),
        };
        Ok(PartialView::new(self, order))
    }

    /// Serialize every row as one JSON object per line, keys in schema order.
    pub fn to_json_lines(&self) -> Result<String> {
        let mut out = String::new();
        for row in self.iter_rows() {
            out.push_str(&crate::ingest::row_to_json_line(&row, &self.schema)?);
            out.push('\n');
        }
        Ok(out)
    }

    fn invalidate_sort(&mut self) {
        self.cached_sort = None;
    }
}

/// Build a [`Row`] from `name => value` pairs.
///
/// ```
/// use cdset::{row, Value};
///
/// let r = row! { "id" => 7, "name" => "x", "score" => Value::Null };
/// assert_eq!(r["id"], Value::Integer(7));
/// ```
#[macro_export]
macro_rules! row {
    ($($name:expr => $value:expr),* $(,)?) => {{
        let mut row = $crate::Row::new();
        $(row.insert(::std::string::String::from($name), $crate::Value::from($value));)*
        row
    }};
}
