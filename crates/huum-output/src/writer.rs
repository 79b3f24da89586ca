//! The `OutputWriter` trait implemented by series writers.

use huum_core::SimTime;

use crate::OutputResult;

/// A sink for one recorded series.
///
/// Errors are returned to the caller; [`SimOutputObserver`][crate::SimOutputObserver]
/// keeps the first one for [`take_error`][crate::SimOutputObserver::take_error].
pub trait OutputWriter {
    /// Offer the values recorded at `current`; `last` is the previous
    /// record time.  The writer's filter decides what reaches the file.
    fn write_record(&mut self, values: &[f64], current: SimTime, last: SimTime) -> OutputResult<()>;

    /// Write whatever the filter held back and flush.
    ///
    /// Idempotent; safe to call more than once.
    fn close(&mut self, current: SimTime) -> OutputResult<()>;
}
