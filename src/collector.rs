// src/collector.rs
//
// The incremental collect loop: pull a batch, drop what the store already
// has, append the rest, remember their keys.

use tracing::{debug, info};

use crate::{
    config::Config,
    error::Result,
    index::DedupIndex,
    progress::Progress,
    record::{KeyFields, Record},
    source::RecordSource,
    store::OutputStore,
};

/// Append the records of `batch` that are not yet represented in `index`,
/// in batch order, and return how many were written.
///
/// Unkeyable records are always written. Keys are inserted as each record is
/// appended, so a key repeated later in the same batch is already a duplicate.
pub fn collect(
    batch: &[Record],
    keys: &KeyFields,
    index: &mut DedupIndex,
    store: &mut OutputStore,
) -> Result<usize> {
    let mut written = 0;
    for record in batch {
        match keys.key_of(record) {
            None => {
                store.append(record)?;
                written += 1;
            }
            Some(key) if index.contains(&key) => {
                debug!(key = ?key.parts(), "Duplicate, skipping");
            }
            Some(key) => {
                store.append(record)?;
                index.insert(key);
                written += 1;
            }
        }
    }
    Ok(written)
}

/// Summary of one collect run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub batches: usize,
    pub fetched: usize,
    pub written: usize,
    pub duplicates: usize,
}

/// Key fields, index and store for one run.
#[derive(Debug)]
pub struct Collector {
    keys: KeyFields,
    index: DedupIndex,
    store: OutputStore,
}

impl Collector {
    /// Wire up an already-initialized store and a prebuilt index.
    pub fn new(keys: KeyFields, index: DedupIndex, store: OutputStore) -> Self {
        Self { keys, index, store }
    }

    /// Initialize the output store from `config` and rebuild the index from
    /// whatever it already holds.
    pub fn open(config: &Config) -> Result<Self> {
        config.validate()?;
        let keys = config.keys();
        let mut store = OutputStore::new(&config.output_path, config.format);
        store.ensure_initialized(&config.schema)?;
        let index = DedupIndex::from_store(store.path(), store.delim(), &keys)?;
        Ok(Self::new(keys, index, store))
    }

    pub fn collect(&mut self, batch: &[Record]) -> Result<usize> {
        collect(batch, &self.keys, &mut self.index, &mut self.store)
    }

    /// Drain `source`, one batch at a time, until it is exhausted.
    pub fn run<S: RecordSource>(
        &mut self,
        mut source: S,
        mut progress: Option<&mut dyn Progress>,
    ) -> Result<RunSummary> {
        let mut summary = RunSummary::default();

        if let Some(p) = progress.as_deref_mut() {
            p.begin(None);
        }

        let result = loop {
            let batch = match source.next_batch() {
                Ok(Some(batch)) => batch,
                Ok(None) => break Ok(()),
                Err(e) => break Err(e),
            };
            summary.batches += 1;

            let written = match self.collect(&batch) {
                Ok(n) => n,
                Err(e) => break Err(e),
            };
            summary.fetched += batch.len();
            summary.written += written;
            summary.duplicates += batch.len() - written;

            info!(
                batch = summary.batches,
                fetched = batch.len(),
                written,
                "Processed batch"
            );
            if let Some(p) = progress.as_deref_mut() {
                p.batch_done(summary.batches, batch.len(), written);
            }
        };

        if let Some(p) = progress.as_deref_mut() {
            p.finish();
        }
        result?;

        info!(
            batches = summary.batches,
            fetched = summary.fetched,
            written = summary.written,
            duplicates = summary.duplicates,
            "Source exhausted"
        );
        Ok(summary)
    }

    pub fn index(&self) -> &DedupIndex { &self.index }
    pub fn store(&self) -> &OutputStore { &self.store }
    pub fn keys(&self) -> &KeyFields { &self.keys }
}
