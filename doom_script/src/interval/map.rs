//! Canonical interval map over `i64` indices
//!
//! Stored intervals are closed, sorted by start, pairwise disjoint, and two
//! touching intervals never hold equal values. Indices not covered by any
//! stored interval are unset. Tracked bounds only ever grow.

use crate::logging::codes;
use serde::ser::{Serialize, SerializeSeq, Serializer};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum IntervalError {
    #[error("Invalid interval range: start {start} is greater than end {end}")]
    InvalidRange { start: i64, end: i64 },
}

impl IntervalError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            IntervalError::InvalidRange { .. } => codes::interval::INVALID_RANGE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntervalMap<V> {
    /// start -> (end, value)
    intervals: BTreeMap<i64, (i64, V)>,
    bounds: Option<(i64, i64)>,
}

impl<V> Default for IntervalMap<V> {
    fn default() -> Self {
        Self {
            intervals: BTreeMap::new(),
            bounds: None,
        }
    }
}

impl<V: Clone + PartialEq> IntervalMap<V> {
    /// Map with `[min, max]` set to `initial` (or merely tracked, if `None`)
    pub fn new(min: i64, max: i64, initial: Option<V>) -> Result<Self, IntervalError> {
        let mut map = Self::default();
        map.set(min, max, initial)?;
        Ok(map)
    }

    /// Overwrite `[start, end]` with `value`; `None` clears the range
    pub fn set(&mut self, start: i64, end: i64, value: Option<V>) -> Result<(), IntervalError> {
        if start > end {
            return Err(IntervalError::InvalidRange { start, end });
        }

        self.carve(start, end);

        if let Some(value) = value {
            let mut new_start = start;
            let mut new_end = end;

            if let Some(before) = start.checked_sub(1) {
                let left = self
                    .intervals
                    .range(..start)
                    .next_back()
                    .filter(|(_, (left_end, left_value))| *left_end == before && *left_value == value)
                    .map(|(left_start, _)| *left_start);
                if let Some(left_start) = left {
                    self.intervals.remove(&left_start);
                    new_start = left_start;
                }
            }

            if let Some(after) = end.checked_add(1) {
                let right_matches = self
                    .intervals
                    .get(&after)
                    .is_some_and(|(_, right_value)| *right_value == value);
                if right_matches {
                    if let Some((right_end, _)) = self.intervals.remove(&after) {
                        new_end = right_end;
                    }
                }
            }

            self.intervals.insert(new_start, (new_end, value));
        }

        self.bounds = Some(match self.bounds {
            Some((min, max)) => (min.min(start), max.max(end)),
            None => (start, end),
        });
        Ok(())
    }

    /// Single-index convenience for [`set`](Self::set)
    pub fn set_index(&mut self, index: i64, value: Option<V>) {
        let result = self.set(index, index, value);
        debug_assert!(result.is_ok(), "one-index range rejected: {:?}", result.err());
    }

    /// Remove everything inside `[start, end]`, keeping the outside remainders
    fn carve(&mut self, start: i64, end: i64) {
        // An interval starting left of `start` may reach into the range
        let straddling = self
            .intervals
            .range(..start)
            .next_back()
            .filter(|(_, (left_end, _))| *left_end >= start)
            .map(|(left_start, _)| *left_start);
        if let Some(left_start) = straddling {
            if let Some((left_end, value)) = self.intervals.remove(&left_start) {
                if left_end > end {
                    self.intervals.insert(end + 1, (left_end, value.clone()));
                }
                self.intervals.insert(left_start, (start - 1, value));
            }
        }

        let inside: Vec<i64> = self.intervals.range(start..=end).map(|(s, _)| *s).collect();
        for inner_start in inside {
            if let Some((inner_end, value)) = self.intervals.remove(&inner_start) {
                if inner_end > end {
                    self.intervals.insert(end + 1, (inner_end, value));
                }
            }
        }
    }

    /// Distinct values of intervals touching `[min, max]`, in index order
    pub fn value_set(&self, min: i64, max: i64) -> Vec<&V> {
        let mut values: Vec<&V> = Vec::new();
        for (_, _, value) in self.intervals_in(min, max) {
            if !values.contains(&value) {
                values.push(value);
            }
        }
        values
    }
}

impl<V> IntervalMap<V> {
    pub fn get(&self, index: i64) -> Option<&V> {
        self.intervals
            .range(..=index)
            .next_back()
            .filter(|(_, (end, _))| *end >= index)
            .map(|(_, (_, value))| value)
    }

    pub fn get_or<'a>(&'a self, index: i64, default: &'a V) -> &'a V {
        self.get(index).unwrap_or(default)
    }

    pub fn min_index(&self) -> Option<i64> {
        self.bounds.map(|(min, _)| min)
    }

    pub fn max_index(&self) -> Option<i64> {
        self.bounds.map(|(_, max)| max)
    }

    /// Count of indices between the tracked bounds
    pub fn width(&self) -> u64 {
        self.bounds
            .map(|(min, max)| max.abs_diff(min) + 1)
            .unwrap_or(0)
    }

    /// Stored intervals as `(start, end, value)`, in order
    pub fn intervals(&self) -> impl Iterator<Item = (i64, i64, &V)> {
        self.intervals
            .iter()
            .map(|(start, (end, value))| (*start, *end, value))
    }

    /// Stored intervals overlapping `[min, max]`
    pub fn intervals_in(&self, min: i64, max: i64) -> impl Iterator<Item = (i64, i64, &V)> {
        let (min, max) = (min.min(max), min.max(max));
        let first = self
            .intervals
            .range(..min)
            .next_back()
            .filter(|(_, (end, _))| *end >= min)
            .map(|(start, _)| *start)
            .unwrap_or(min);
        self.intervals
            .range(first..=max)
            .map(|(start, (end, value))| (*start, *end, value))
    }

    /// Value at every index of `[min, max]`, `None` for gaps
    pub fn value_list(&self, min: i64, max: i64) -> Vec<Option<&V>> {
        let (min, max) = (min.min(max), min.max(max));
        (min..=max).map(|index| self.get(index)).collect()
    }

    /// First index in `[from, to]` holding no value
    pub fn first_unset(&self, from: i64, to: i64) -> Option<i64> {
        let mut candidate = from;
        while candidate <= to {
            let covering_end = self
                .intervals
                .range(..=candidate)
                .next_back()
                .filter(|(_, (end, _))| *end >= candidate)
                .map(|(_, (end, _))| *end);
            match covering_end {
                None => return Some(candidate),
                Some(end) => candidate = end.checked_add(1)?,
            }
        }
        None
    }

    /// Number of stored intervals
    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }
}

impl<V: PartialEq> IntervalMap<V> {
    /// Number of indices holding `value`
    pub fn index_width(&self, value: &V) -> u64 {
        self.intervals
            .iter()
            .filter(|(_, (_, stored))| stored == value)
            .map(|(start, (end, _))| end.abs_diff(*start) + 1)
            .sum()
    }
}

impl<V: fmt::Display> fmt::Display for IntervalMap<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, (start, end, value)) in self.intervals().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "([{}, {}]: {})", start, end, value)?;
        }
        write!(f, "]")
    }
}

#[derive(serde::Serialize)]
struct IntervalEntry<'a, V> {
    start: i64,
    end: i64,
    value: &'a V,
}

/// Serializes as a sequence of `{start, end, value}` records
impl<V: Serialize> Serialize for IntervalMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.intervals.len()))?;
        for (start, end, value) in self.intervals() {
            seq.serialize_element(&IntervalEntry { start, end, value })?;
        }
        seq.end()
    }
}
