//! Sparse index-to-value storage over closed integer intervals

pub mod map;

pub use map::{IntervalError, IntervalMap};
