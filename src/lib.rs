/// cdset - Column-Oriented Dataset
///
/// An in-memory dataset that stores rows as parallel named columns, caches a
/// sort permutation over one column at a time and runs streaming group-by
/// aggregation over that ordering.

pub mod column;
pub mod dataset;
pub mod error;
pub mod group;
pub mod ingest;
pub mod sort_index;
pub mod view;

pub use column::{Column, ColumnKind, Value};
pub use dataset::{Dataset, Row, Schema};
pub use error::{DatasetError, Result};
pub use group::{aggregate_runs, Aggregate, Distribution};
pub use ingest::{load_json_lines, row_from_json_line, row_to_json_line, IngestSummary};
pub use sort_index::SortIndex;
pub use view::{PartialIter, PartialView, Rows};
