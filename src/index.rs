// src/index.rs
//
// In-memory set of identity keys already persisted. Built once per run from
// the output store, grows as rows are appended, never shrinks.

use std::{borrow::Borrow, collections::HashSet, path::Path};

use tracing::info;

use crate::{
    delim::Delim,
    error::Result,
    record::{IdentityKey, KeyFields, Record},
    store::read_records,
};

#[derive(Clone, Debug, Default)]
pub struct DedupIndex {
    keys: HashSet<IdentityKey>,
    skipped: usize,
}

impl DedupIndex {
    pub fn new() -> Self { Self::default() }

    /// Index the keys of previously persisted rows. Unkeyable rows are
    /// skipped, not errors.
    pub fn build<I>(existing_rows: I, keys: &KeyFields) -> Self
    where
        I: IntoIterator,
        I::Item: Borrow<Record>,
    {
        let mut index = Self::new();
        for row in existing_rows {
            match keys.key_of(row.borrow()) {
                Some(k) => { index.keys.insert(k); }
                None => index.skipped += 1,
            }
        }
        index
    }

    /// Build from the store file. No file yet → empty index (first run).
    pub fn from_store(path: &Path, delim: Delim, keys: &KeyFields) -> Result<Self> {
        let rows = read_records(path, delim)?;
        let index = Self::build(&rows, keys);
        info!(
            path = %path.display(),
            rows = rows.len(),
            keys = index.len(),
            unkeyable = index.skipped,
            "Built dedup index"
        );
        Ok(index)
    }

    pub fn contains(&self, key: &IdentityKey) -> bool { self.keys.contains(key) }

    /// True if the key was not yet present.
    pub fn insert(&mut self, key: IdentityKey) -> bool { self.keys.insert(key) }

    pub fn len(&self) -> usize { self.keys.len() }
    pub fn is_empty(&self) -> bool { self.keys.is_empty() }

    /// Rows passed to `build` that had no usable key.
    pub fn skipped(&self) -> usize { self.skipped }

    pub fn iter(&self) -> impl Iterator<Item = &IdentityKey> { self.keys.iter() }
}
