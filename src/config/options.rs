// src/config/options.rs
use std::path::PathBuf;

use chrono::{Local, NaiveDate};
use tracing::info;

use super::consts::*;
use crate::{
    delim::Delim,
    error::{CollectError, Result},
    file::{dated_filename, resolve_out_path},
    record::KeyFields,
    store::duplicate_columns,
};

/// Everything a run needs, passed explicitly into each component.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Input file for CSV-backed sources and the enrichment pass.
    pub input_path: Option<PathBuf>,
    /// Output file or directory as given (`OUTPUT_CSV`, `-o`); `None` means
    /// the dated default name in the working directory.
    pub output_target: Option<String>,
    /// Stem of the dated default name.
    pub output_prefix: String,
    /// Resolved from the three fields above by `resolve_output`.
    pub output_path: PathBuf,
    pub session_store_path: PathBuf,
    /// Ordered identity-key fields; must be a subset of `schema`.
    pub key_fields: Vec<String>,
    /// Header written when the output store is created.
    pub schema: Vec<String>,
    /// Placeholder values that count as "no value" for key fields.
    pub missing_markers: Vec<String>,
    pub format: Delim,
    pub batch_size: usize,
    /// 1-based first data row to process from the input.
    pub start_row: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_path: None,
            output_target: None,
            output_prefix: s!(DEFAULT_OUTPUT_PREFIX),
            output_path: default_output_path(DEFAULT_OUTPUT_PREFIX, Delim::Csv, today()),
            session_store_path: PathBuf::from(DEFAULT_SESSION_STORE),
            key_fields: to_strings(DEFAULT_KEY_FIELDS),
            schema: to_strings(DEFAULT_SCHEMA),
            missing_markers: to_strings(DEFAULT_MISSING_MARKERS),
            format: Delim::Csv,
            batch_size: DEFAULT_BATCH_SIZE,
            start_row: DEFAULT_START_ROW,
        }
    }
}

impl Config {
    /// Load `.env` (if any), then read the process environment.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(|k| std::env::var(k).ok())
    }

    /// Build from any variable lookup. Unset or blank variables keep defaults.
    pub fn from_vars<F>(var: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |k: &str| var(k).filter(|v| !v.trim().is_empty());
        let mut cfg = Config::default();

        if let Some(v) = get("OUTPUT_FORMAT") {
            cfg.format = Delim::parse(&v)
                .ok_or_else(|| CollectError::config(format!("unknown OUTPUT_FORMAT: {v}")))?;
        }

        if let Some(v) = get("OUTPUT_PREFIX") { cfg.output_prefix = v; }
        cfg.output_target = get("OUTPUT_CSV");
        cfg.resolve_output()?;

        cfg.input_path = get("INPUT_CSV").map(PathBuf::from);
        if let Some(v) = get("SESSION_STORE") { cfg.session_store_path = PathBuf::from(v); }
        if let Some(v) = get("KEY_FIELDS") { cfg.key_fields = split_list(&v); }
        if let Some(v) = get("SCHEMA") { cfg.schema = split_list(&v); }
        if let Some(v) = var("MISSING_MARKERS") { cfg.missing_markers = split_list(&v); }
        if let Some(v) = get("BATCH_SIZE") { cfg.batch_size = parse_num("BATCH_SIZE", &v)?; }
        if let Some(v) = get("START_ROW") { cfg.start_row = parse_num("START_ROW", &v)?; }

        cfg.validate()?;
        Ok(cfg)
    }

    /// Recompute `output_path` after the target, prefix or format changed.
    /// A directory target or no target gets `<prefix>_<MMDD>.<format ext>`.
    pub fn resolve_output(&mut self) -> Result<()> {
        let default_name = dated_filename(&self.output_prefix, today(), self.format.ext());
        self.output_path = match &self.output_target {
            Some(t) => resolve_out_path(t, &default_name)?,
            None => PathBuf::from(default_name),
        };
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.schema.is_empty() {
            return Err(CollectError::config("schema is empty"));
        }
        let dups = duplicate_columns(&self.schema);
        if !dups.is_empty() {
            return Err(CollectError::config(format!("duplicate schema fields: {}", dups.join(", "))));
        }
        if self.key_fields.is_empty() {
            return Err(CollectError::config("no key fields"));
        }
        if let Some(k) = self.key_fields.iter().find(|k| !self.schema.contains(k)) {
            return Err(CollectError::config(format!("key field `{k}` is not in the schema")));
        }
        if self.batch_size == 0 {
            return Err(CollectError::config("batch size must be at least 1"));
        }
        if self.start_row == 0 {
            return Err(CollectError::config("start row is 1-based"));
        }
        Ok(())
    }

    pub fn keys(&self) -> KeyFields {
        KeyFields::new(self.key_fields.iter().cloned())
            .with_missing_markers(self.missing_markers.iter().cloned())
    }

    pub fn log_summary(&self) {
        info!("Config loaded:");
        info!("  input:    {}", self.input_path.as_ref().map_or(s!("<not set>"), |p| p.display().to_string()));
        info!("  output:   {} ({})", self.output_path.display(), self.format.ext());
        info!("  session:  {}", self.session_store_path.display());
        info!("  key:      {}", self.key_fields.join("+"));
        info!("  schema:   {}", self.schema.join(","));
        info!("  batch:    {} rows, from row {}", self.batch_size, self.start_row);
    }
}

pub fn default_output_path(prefix: &str, format: Delim, date: NaiveDate) -> PathBuf {
    PathBuf::from(dated_filename(prefix, date, format.ext()))
}

fn today() -> NaiveDate { Local::now().date_naive() }

fn to_strings(v: &[&str]) -> Vec<String> {
    v.iter().map(|s| s.to_string()).collect()
}

/// Comma-separated list; blanks dropped.
pub fn split_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_owned)
        .collect()
}

fn parse_num(name: &str, v: &str) -> Result<usize> {
    v.trim()
        .parse()
        .map_err(|_| CollectError::config(format!("{name} must be a positive integer, got `{v}`")))
}
