// src/source.rs
//
// Record sources yield candidate records one batch at a time. A batch is
// whatever the source produces per wait: one results page, one chunk of an
// input file. `Ok(None)` means the source is exhausted; that is the normal
// end of a run, not an error.

use std::{collections::VecDeque, fs::File, path::Path};

use tracing::debug;

use crate::{
    delim::{self, Delim},
    error::Result,
    record::Record,
};

pub trait RecordSource {
    /// Block until the next batch is available. `None` once exhausted.
    fn next_batch(&mut self) -> Result<Option<Vec<Record>>>;
}

impl<S: RecordSource + ?Sized> RecordSource for &mut S {
    fn next_batch(&mut self) -> Result<Option<Vec<Record>>> {
        (**self).next_batch()
    }
}

/* ---------------- In-memory ---------------- */

/// Pre-built batches, handed out in order.
#[derive(Clone, Debug, Default)]
pub struct VecSource {
    batches: VecDeque<Vec<Record>>,
}

impl VecSource {
    pub fn new<I: IntoIterator<Item = Vec<Record>>>(batches: I) -> Self {
        Self { batches: batches.into_iter().collect() }
    }

    pub fn remaining(&self) -> usize { self.batches.len() }
}

impl RecordSource for VecSource {
    fn next_batch(&mut self) -> Result<Option<Vec<Record>>> {
        Ok(self.batches.pop_front())
    }
}

/* ---------------- CSV file ---------------- */

/// Reads an input file with a header row, `batch_size` rows at a time.
/// Data rows before `start_row` (1-based) are skipped.
pub struct CsvSource {
    rdr: ::csv::Reader<File>,
    headers: ::csv::StringRecord,
    batch_size: usize,
    start_row: usize,
    row_no: usize,
}

impl CsvSource {
    pub fn open(path: &Path, delim: Delim, batch_size: usize, start_row: usize) -> Result<Self> {
        let mut rdr = delim::open_reader(path, delim)?;
        let headers = rdr.headers()?.clone();
        debug!(path = %path.display(), columns = headers.len(), "Opened input");
        Ok(Self {
            rdr,
            headers,
            batch_size: batch_size.max(1),
            start_row: start_row.max(1),
            row_no: 0,
        })
    }

    pub fn headers(&self) -> Vec<String> {
        self.headers.iter().map(str::to_owned).collect()
    }
}

impl RecordSource for CsvSource {
    fn next_batch(&mut self) -> Result<Option<Vec<Record>>> {
        let mut batch = Vec::with_capacity(self.batch_size);
        let mut row = ::csv::StringRecord::new();

        while batch.len() < self.batch_size {
            if !self.rdr.read_record(&mut row)? {
                break;
            }
            self.row_no += 1;
            if self.row_no < self.start_row {
                debug!(row = self.row_no, "Skipping row before start row");
                continue;
            }
            batch.push(Record::from_row(self.headers.iter(), row.iter()));
        }

        if batch.is_empty() { Ok(None) } else { Ok(Some(batch)) }
    }
}
