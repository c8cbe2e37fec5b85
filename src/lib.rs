// src/lib.rs

#[macro_use]
pub mod macros;

pub mod config;
pub mod error;
pub mod log;
pub mod progress;

pub mod delim;
pub mod file;
pub mod record;

pub mod collector;
pub mod enrich;
pub mod index;
pub mod session;
pub mod source;
pub mod store;

#[cfg(feature = "cli")]
pub mod cli;

pub use collector::{Collector, RunSummary, collect};
pub use error::{CollectError, Result};
pub use index::DedupIndex;
pub use record::{IdentityKey, KeyFields, Record};
pub use source::{CsvSource, RecordSource, VecSource};
pub use store::OutputStore;
