//! The `OutputWriter` trait implemented by all backend writers.

use crate::{EventRow, LineageRow, OutputResult, TrajectoryRow};

/// Trait implemented by CSV, SQLite, and Parquet writers.
///
/// All methods are infallible from the observer's perspective — errors are
/// stored internally and retrieved with [`PopOutputObserver::take_error`][crate::observer::PopOutputObserver::take_error].
pub trait OutputWriter {
    /// Write a batch of population-size trajectory samples.
    fn write_trajectory(&mut self, rows: &[TrajectoryRow]) -> OutputResult<()>;

    /// Write a batch of driver events.
    fn write_events(&mut self, rows: &[EventRow]) -> OutputResult<()>;

    /// Write a batch of lineage adjacency edges.
    fn write_lineage(&mut self, rows: &[LineageRow]) -> OutputResult<()>;

    /// Flush and close all underlying file handles.
    ///
    /// Idempotent — safe to call more than once.
    fn finish(&mut self) -> OutputResult<()>;
}
