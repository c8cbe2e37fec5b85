// src/store.rs
//
// Append-only delimited output. The file on disk is the durable source of
// truth: its header fixes the column order for every later append, and the
// dedup index is rebuilt from its rows on each run.

use std::{
    collections::HashSet,
    fs::{File, OpenOptions},
    io::{BufWriter, Read, Seek, SeekFrom, Write},
    path::{Path, PathBuf},
};

use tracing::{debug, info, warn};

use crate::{
    delim::{self, Delim},
    error::{CollectError, Result},
    file::{ensure_parent, is_absent_or_empty},
    record::Record,
};

#[derive(Debug)]
pub struct OutputStore {
    path: PathBuf,
    delim: Delim,
    schema: Option<Vec<String>>,
}

impl OutputStore {
    pub fn new(path: impl Into<PathBuf>, delim: Delim) -> Self {
        Self { path: path.into(), delim, schema: None }
    }

    pub fn path(&self) -> &Path { &self.path }
    pub fn delim(&self) -> Delim { self.delim }

    /// Established column order, once initialized.
    pub fn schema(&self) -> Option<&[String]> { self.schema.as_deref() }

    pub fn exists(&self) -> bool { !is_absent_or_empty(&self.path) }

    /// Create the store with a header row if it does not exist yet.
    /// An existing store keeps its own header, which becomes the schema.
    /// A store holding only blank lines is rewritten with `schema`.
    pub fn ensure_initialized(&mut self, schema: &[String]) -> Result<()> {
        if self.exists() {
            match delim::read_header(&self.path, self.delim)? {
                Some(existing) => {
                    if existing != schema {
                        warn!(
                            path = %self.path.display(),
                            existing = ?existing,
                            requested = ?schema,
                            "Output header differs from configured schema; keeping the file's header"
                        );
                    }
                    self.terminate_last_row()?;
                    debug!(path = %self.path.display(), "Output store already initialized");
                    self.schema = Some(existing);
                    return Ok(());
                }
                None => warn!(path = %self.path.display(), "Output store has no header; rewriting it"),
            }
        }

        ensure_parent(&self.path)?;
        let file = File::create(&self.path)?; // also replaces a zero-length file
        let mut out = BufWriter::new(file);
        delim::write_row(&mut out, schema, self.delim)?;
        out.flush()?;
        info!(path = %self.path.display(), columns = schema.len(), "Created output store");
        self.schema = Some(schema.to_vec());
        Ok(())
    }

    /// Append one record. Fields outside the schema are rejected before
    /// anything is written; schema fields the record lacks stay empty.
    pub fn append(&mut self, record: &Record) -> Result<()> {
        let schema = self
            .schema
            .as_deref()
            .ok_or_else(|| CollectError::NotInitialized(self.path.clone()))?;

        if let Some(field) = record.field_names().find(|f| !schema.iter().any(|s| s.as_str() == *f)) {
            return Err(CollectError::SchemaMismatch { field: s!(field) });
        }

        let row = record.to_row(schema);
        let file = OpenOptions::new().append(true).open(&self.path)?;
        let mut out = BufWriter::new(file);
        delim::write_row(&mut out, &row, self.delim)?;
        out.flush()?;
        Ok(())
    }

    /// Close an unterminated last row so the next append starts a new line.
    fn terminate_last_row(&self) -> Result<()> {
        let mut file = OpenOptions::new().read(true).append(true).open(&self.path)?;
        file.seek(SeekFrom::End(-1))?;
        let mut last = [0u8; 1];
        file.read_exact(&mut last)?;
        if !matches!(last[0], b'\n' | b'\r') {
            warn!(path = %self.path.display(), "Last row has no terminator; closing it");
            file.write_all(b"\r\n")?;
            file.flush()?;
        }
        Ok(())
    }

    /// Every persisted row, in file order. A missing store reads as empty.
    pub fn read_all(&self) -> Result<Vec<Record>> {
        read_records(&self.path, self.delim)
    }
}

/// Read every data row of a delimited file as records.
/// Missing and zero-length files yield no rows.
pub fn read_records(path: &Path, delim: Delim) -> Result<Vec<Record>> {
    if is_absent_or_empty(path) {
        return Ok(Vec::new());
    }
    let mut rdr = delim::open_reader(path, delim)?;
    let headers = rdr.headers()?.clone();
    let mut out = Vec::new();
    for row in rdr.records() {
        let row = row?;
        out.push(Record::from_row(headers.iter(), row.iter()));
    }
    Ok(out)
}

/// Header fields that appear more than once.
pub fn duplicate_columns(schema: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut dups = Vec::new();
    for col in schema {
        if !seen.insert(col.as_str()) && !dups.contains(col) {
            dups.push(col.clone());
        }
    }
    dups
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_columns_reported_once() {
        let schema: Vec<String> = ["a", "b", "a", "a"].map(String::from).to_vec();
        assert_eq!(duplicate_columns(&schema), vec![s!("a")]);
    }
}
