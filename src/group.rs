/// Group aggregation over an ordered key sequence.
///
/// `aggregate_runs` walks `(key, value)` pairs that are already ordered by key
/// and collapses every maximal run of equal keys with a reducer. It keeps no
/// state beyond the run being accumulated; the ordering comes from a
/// `SortIndex`.
///
/// # Examples
///
/// ```
/// use cdset::{aggregate_runs, Aggregate, Value};
///
/// let keys = [Value::from("a"), Value::from("a"), Value::from("b")];
/// let vals = [Value::Integer(1), Value::Integer(2), Value::Integer(5)];
///
/// let groups = aggregate_runs(keys.iter().zip(vals.iter()), |run| Aggregate::Sum.reduce(run));
/// assert_eq!(groups, vec![
///     (Value::from("a"), Value::Integer(3)),
///     (Value::from("b"), Value::Integer(5)),
/// ]);
/// ```

use crate::column::Value;
use std::collections::BTreeMap;

/// Collapse contiguous equal-key runs of `pairs` through `reducer`.
///
/// Results come out in input order, one per run. The run lengths passed to the
/// reducer always add up to the number of pairs consumed.
pub fn aggregate_runs<'a, I, F, R>(pairs: I, mut reducer: F) -> Vec<(Value, R)>
where
    I: IntoIterator<Item = (&'a Value, &'a Value)>,
    F: FnMut(&[Value]) -> R,
{
    let mut groups = Vec::new();
    // None until the first pair: no value can collide with it
    let mut current: Option<&'a Value> = None;
    let mut run: Vec<Value> = Vec::new();

    for (key, value) in pairs {
        if current != Some(key) {
            if let Some(prev) = current {
                groups.push((prev.clone(), reducer(&run)));
                run.clear();
            }
            current = Some(key);
        }
        run.push(value.clone());
    }

    if let Some(prev) = current {
        groups.push((prev.clone(), reducer(&run)));
    }

    groups
}

/// Built-in reducers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregate {
    /// Number of rows in the run, nulls included.
    Count,
    /// Sum of numeric values. Stays integer unless a float is present or the
    /// integer total overflows i64.
    Sum,
    /// Arithmetic mean of numeric values.
    Mean,
    Min,
    Max,
    /// Text rendering of every non-null value joined with ','.
    Concat,
}

impl Aggregate {
    /// Parse a reducer from its name.
    ///
    /// Accepts: "count", "sum", "mean"/"avg", "min", "max", "concat"
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "count" => Ok(Aggregate::Count),
            "sum" => Ok(Aggregate::Sum),
            "mean" | "avg" => Ok(Aggregate::Mean),
            "min" => Ok(Aggregate::Min),
            "max" => Ok(Aggregate::Max),
            "concat" => Ok(Aggregate::Concat),
            _ => Err(format!(
                "Unknown aggregate: '{}'. Use count, sum, mean, min, max or concat",
                s
            )),
        }
    }

    /// Apply the reducer to one run of values.
    ///
    /// Nulls are skipped by every reducer except `Count`. Numeric reducers
    /// return `Null` when the run holds no numeric values.
    pub fn reduce(&self, values: &[Value]) -> Value {
        match self {
            Aggregate::Count => Value::Integer(values.len() as i64),
            Aggregate::Sum => sum(values),
            Aggregate::Mean => {
                let nums: Vec<f64> = values.iter().filter_map(Value::as_f64).collect();
                if nums.is_empty() {
                    Value::Null
                } else {
                    Value::Float(nums.iter().sum::<f64>() / nums.len() as f64)
                }
            }
            Aggregate::Min => values
                .iter()
                .filter(|v| v.as_f64().is_some())
                .min()
                .cloned()
                .unwrap_or(Value::Null),
            Aggregate::Max => values
                .iter()
                .filter(|v| v.as_f64().is_some())
                .max()
                .cloned()
                .unwrap_or(Value::Null),
            Aggregate::Concat => {
                let parts: Vec<String> = values
                    .iter()
                    .filter(|v| !v.is_null())
                    .map(|v| v.to_string())
                    .collect();
                Value::Text(parts.join(","))
            }
        }
    }
}

/// Integers are summed exactly until the total leaves the i64 range; from
/// then on the sum continues in f64 and the result is a float.
fn sum(values: &[Value]) -> Value {
    let mut int_total: Option<i64> = Some(0);
    let mut float_total: f64 = 0.0;
    let mut saw_float = false;
    let mut saw_number = false;

    for value in values {
        match value {
            Value::Integer(n) => {
                saw_number = true;
                int_total = match int_total {
                    Some(total) => match total.checked_add(*n) {
                        Some(next) => Some(next),
                        None => {
                            float_total += total as f64 + *n as f64;
                            None
                        }
                    },
                    None => {
                        float_total += *n as f64;
                        None
                    }
                };
            }
            Value::Float(f) => {
                float_total += f;
                saw_float = true;
                saw_number = true;
            }
            _ => {}
        }
    }

    match int_total {
        _ if !saw_number => Value::Null,
        Some(total) if !saw_float => Value::Integer(total),
        Some(total) => Value::Float(float_total + total as f64),
        None => Value::Float(float_total),
    }
}

/// Frequency distribution of values.
///
/// Counts how often each value occurs. Two distributions can be folded
/// together with `accumulate`, which adds counts key by key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Distribution {
    counts: BTreeMap<Value, u64>,
}

impl Distribution {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a distribution from one run of values, e.g. inside a `group_by`
    /// reducer.
    pub fn from_values(values: &[Value]) -> Self {
        let mut dist = Distribution::new();
        for value in values {
            dist.add(value.clone());
        }
        dist
    }

    pub fn add(&mut self, value: Value) {
        *self.counts.entry(value).or_insert(0) += 1;
    }

    /// Add every count of `other` into this distribution.
    pub fn accumulate(&mut self, other: &Distribution) {
        for (value, count) in &other.counts {
            *self.counts.entry(value.clone()).or_insert(0) += count;
        }
    }

    pub fn count(&self, value: &Value) -> u64 {
        self.counts.get(value).copied().unwrap_or(0)
    }

    /// Total number of observations.
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Entries ordered by value.
    pub fn iter(&self) -> impl Iterator<Item = (&Value, u64)> {
        self.counts.iter().map(|(v, c)| (v, *c))
    }

    /// Entries ordered by descending count, ties by ascending value.
    pub fn by_frequency(&self) -> Vec<(&Value, u64)> {
        let mut entries: Vec<(&Value, u64)> = self.iter().collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ints(values: &[i64]) -> Vec<Value> {
        values.iter().map(|&v| Value::Integer(v)).collect()
    }

    #[test]
    fn test_runs_are_detected() {
        let keys = ints(&[1, 1, 2, 2, 2, 3]);
        let vals = ints(&[10, 5, 20, 2, 1, 7]);

        let groups = aggregate_runs(keys.iter().zip(vals.iter()), |run| run.len());
        assert_eq!(
            groups,
            vec![(Value::Integer(1), 2), (Value::Integer(2), 3), (Value::Integer(3), 1)]
        );
    }

    #[test]
    fn test_first_key_equal_to_default_value() {
        // A leading run keyed by 0, 0.0 or "" must form its own group
        let keys = ints(&[0, 0, 1]);
        let vals = ints(&[4, 5, 6]);
        let groups = aggregate_runs(keys.iter().zip(vals.iter()), |run| Aggregate::Sum.reduce(run));
        assert_eq!(
            groups,
            vec![(Value::Integer(0), Value::Integer(9)), (Value::Integer(1), Value::Integer(6))]
        );

        let keys = vec![Value::Float(0.0)];
        let vals = ints(&[1]);
        let groups = aggregate_runs(keys.iter().zip(vals.iter()), |run| run.len());
        assert_eq!(groups, vec![(Value::Float(0.0), 1)]);

        let keys = vec![Value::from(""), Value::from(""), Value::from("x")];
        let vals = ints(&[1, 1, 1]);
        let groups = aggregate_runs(keys.iter().zip(vals.iter()), |run| run.len());
        assert_eq!(groups, vec![(Value::from(""), 2), (Value::from("x"), 1)]);
    }

    #[test]
    fn test_empty_input() {
        let groups = aggregate_runs(std::iter::empty(), |run: &[Value]| run.len());
        assert!(groups.is_empty());
    }

    #[test]
    fn test_null_keys_form_a_group() {
        let keys = vec![Value::Null, Value::Null, Value::Integer(1)];
        let vals = ints(&[1, 2, 3]);
        let groups = aggregate_runs(keys.iter().zip(vals.iter()), |run| run.len());
        assert_eq!(groups, vec![(Value::Null, 2), (Value::Integer(1), 1)]);
    }

    #[test]
    fn test_aggregate_from_str() {
        assert_eq!(Aggregate::from_str("SUM").unwrap(), Aggregate::Sum);
        assert_eq!(Aggregate::from_str("avg").unwrap(), Aggregate::Mean);
        assert!(Aggregate::from_str("median").is_err());
    }

    #[test]
    fn test_builtin_reducers() {
        let run = vec![Value::Integer(4), Value::Null, Value::Integer(1), Value::Integer(7)];
        assert_eq!(Aggregate::Count.reduce(&run), Value::Integer(4));
        assert_eq!(Aggregate::Sum.reduce(&run), Value::Integer(12));
        assert_eq!(Aggregate::Mean.reduce(&run), Value::Float(4.0));
        assert_eq!(Aggregate::Min.reduce(&run), Value::Integer(1));
        assert_eq!(Aggregate::Max.reduce(&run), Value::Integer(7));
        assert_eq!(Aggregate::Concat.reduce(&run), Value::from("4,1,7"));

        let floats = vec![Value::Float(0.5), Value::Float(1.25)];
        assert_eq!(Aggregate::Sum.reduce(&floats), Value::Float(1.75));

        let text = vec![Value::from("a"), Value::from("b")];
        assert_eq!(Aggregate::Sum.reduce(&text), Value::Null);
        assert_eq!(Aggregate::Max.reduce(&text), Value::Null);
        assert_eq!(Aggregate::Concat.reduce(&text), Value::from("a,b"));
    }

    #[test]
    fn test_sum_promotes_to_float_on_overflow() {
        let run = vec![Value::Integer(i64::MAX), Value::Integer(1)];
        assert_eq!(Aggregate::Sum.reduce(&run), Value::Float(i64::MAX as f64 + 1.0));

        let run = vec![Value::Integer(i64::MIN), Value::Integer(-1), Value::Integer(5)];
        assert_eq!(Aggregate::Sum.reduce(&run), Value::Float(i64::MIN as f64 - 1.0 + 5.0));

        // Stays integer right up to the boundary
        let run = vec![Value::Integer(i64::MAX - 1), Value::Integer(1)];
        assert_eq!(Aggregate::Sum.reduce(&run), Value::Integer(i64::MAX));
    }

    #[test]
    fn test_group_by_sum_does_not_wrap() {
        let mut ds = crate::Dataset::new();
        ds.append(crate::row! { "k" => 1, "v" => i64::MAX }).unwrap();
        ds.append(crate::row! { "k" => 1, "v" => 1 }).unwrap();

        let sums = ds.group_by("k", "v", |run| Aggregate::Sum.reduce(run)).unwrap();
        let total = sums[&Value::Integer(1)].as_f64().unwrap();
        assert!(total > 0.0);
        assert_eq!(sums[&Value::Integer(1)], Value::Float(9_223_372_036_854_775_808.0));
    }

    #[test]
    fn test_distribution_accumulate() {
        let mut left = Distribution::from_values(&[Value::from("a"), Value::from("b"), Value::from("a")]);
        let right = Distribution::from_values(&[Value::from("b"), Value::from("c")]);

        left.accumulate(&right);
        assert_eq!(left.count(&Value::from("a")), 2);
        assert_eq!(left.count(&Value::from("b")), 2);
        assert_eq!(left.count(&Value::from("c")), 1);
        assert_eq!(left.count(&Value::from("z")), 0);
        assert_eq!(left.total(), 5);
        assert_eq!(left.len(), 3);

        let ranked: Vec<(&Value, u64)> = left.by_frequency();
        assert_eq!(ranked[0], (&Value::from("a"), 2));
        assert_eq!(ranked[1], (&Value::from("b"), 2));
        assert_eq!(ranked[2], (&Value::from("c"), 1));
    }
}
