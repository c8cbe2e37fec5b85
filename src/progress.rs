// src/progress.rs
/// Lightweight progress reporting used by long-running passes (collect/enrich).
/// Frontends implement this to surface status to users.
pub trait Progress {
    /// Called at the start with the total number of items, if known.
    fn begin(&mut self, _total: Option<usize>) {}

    /// Free-form status line for human eyes.
    fn log(&mut self, _msg: &str) {}

    /// One source batch was processed.
    fn batch_done(&mut self, _batch: usize, _fetched: usize, _written: usize) {}

    /// One input row was processed (1-based row number).
    fn item_done(&mut self, _row: usize) {}

    /// Called at the end, successful or not.
    fn finish(&mut self) {}
}

/// A no-op progress sink.
pub struct NullProgress;
impl Progress for NullProgress {}
