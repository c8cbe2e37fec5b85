// src/enrich.rs
//
// Follow-up passes over a collected file: read every row, derive one extra
// column from an existing one, write a new file. Deriving the value (visit a
// job link, open a company's about page, ask a finance site for a ticker) is
// the lookup's business; this module owns the file shape.

use std::{fs::{self, File}, io::BufWriter, path::Path};

use tracing::{debug, info, warn};
use url::Url;

use crate::{
    delim::{self, Delim},
    error::{CollectError, Result},
    file::ensure_parent,
    progress::Progress,
    record::Record,
};

/// Derives a value from one field of a row. `Ok(None)` means "nothing found".
pub trait FieldLookup {
    fn lookup(&mut self, value: &str) -> Result<Option<String>>;
}

impl<F> FieldLookup for F
where
    F: FnMut(&str) -> Result<Option<String>>,
{
    fn lookup(&mut self, value: &str) -> Result<Option<String>> {
        self(value)
    }
}

/// Website URL → its network location (`host[:port]`).
#[derive(Clone, Copy, Debug, Default)]
pub struct DomainLookup;

impl FieldLookup for DomainLookup {
    fn lookup(&mut self, value: &str) -> Result<Option<String>> {
        Ok(domain_of(value))
    }
}

pub fn domain_of(url: &str) -> Option<String> {
    let u = Url::parse(url.trim()).ok()?;
    let host = u.host_str()?;
    Some(match u.port() {
        Some(p) => format!("{host}:{p}"),
        None => s!(host),
    })
}

/// Company page URL → its about page.
#[derive(Clone, Copy, Debug, Default)]
pub struct AboutPageLookup;

impl FieldLookup for AboutPageLookup {
    fn lookup(&mut self, value: &str) -> Result<Option<String>> {
        let base = value.trim().trim_end_matches('/');
        if base.is_empty() {
            return Ok(None);
        }
        Ok(Some(format!("{base}/about")))
    }
}

/* ---------------- Pass ---------------- */

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnrichSpec {
    pub source_field: String,
    pub target_field: String,
    /// Place the new column right after this one; `None` appends it.
    pub insert_after: Option<String>,
    /// 1-based first data row; earlier rows are left out of the output.
    pub start_row: usize,
    /// Lookup results treated as "nothing found" (e.g. `PRIVATE` tickers).
    pub reject_values: Vec<String>,
}

impl EnrichSpec {
    pub fn new(source_field: impl Into<String>, target_field: impl Into<String>) -> Self {
        Self {
            source_field: source_field.into(),
            target_field: target_field.into(),
            insert_after: None,
            start_row: 1,
            reject_values: Vec::new(),
        }
    }

    pub fn after(mut self, field: impl Into<String>) -> Self {
        self.insert_after = Some(field.into());
        self
    }

    pub fn start_row(mut self, row: usize) -> Self {
        self.start_row = row.max(1);
        self
    }

    pub fn reject<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.reject_values = values.into_iter().map(Into::into).collect();
        self
    }

    /// Output header: input header plus the target column. A target that is
    /// already present keeps its position and gets overwritten.
    pub fn output_header(&self, input: &[String]) -> Result<Vec<String>> {
        if !input.contains(&self.source_field) {
            return Err(CollectError::MissingColumn(self.source_field.clone()));
        }
        let mut header = input.to_vec();
        if header.contains(&self.target_field) {
            return Ok(header);
        }
        match &self.insert_after {
            Some(after) => {
                let at = header
                    .iter()
                    .position(|h| h == after)
                    .ok_or_else(|| CollectError::MissingColumn(after.clone()))?;
                header.insert(at + 1, self.target_field.clone());
            }
            None => header.push(self.target_field.clone()),
        }
        Ok(header)
    }

    fn accept(&self, found: Option<String>) -> Option<String> {
        found
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty() && !self.reject_values.iter().any(|r| r == v))
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EnrichSummary {
    /// Rows written to the output.
    pub rows: usize,
    /// Rows whose target column got a value.
    pub filled: usize,
    /// Rows with no source value; the lookup was not called.
    pub skipped: usize,
    /// Rows whose lookup failed.
    pub failed: usize,
}

/// Run `lookup` over every row of `input` and write the enriched rows to
/// `output` (replacing it). A failed lookup leaves the cell empty.
/// `output` must not be the input file.
pub fn enrich<L: FieldLookup + ?Sized>(
    input: &Path,
    output: &Path,
    delim: Delim,
    spec: &EnrichSpec,
    lookup: &mut L,
    mut progress: Option<&mut dyn Progress>,
) -> Result<EnrichSummary> {
    if same_file(input, output) {
        return Err(CollectError::config(format!(
            "enrich output {} is the input file",
            output.display()
        )));
    }

    let mut rdr = delim::open_reader(input, delim)?;
    let in_header: Vec<String> = rdr.headers()?.iter().map(str::to_owned).collect();
    let out_header = spec.output_header(&in_header)?;

    ensure_parent(output)?;
    let mut wtr = delim::writer(BufWriter::new(File::create(output)?), delim);
    wtr.write_record(&out_header)?;

    if let Some(p) = progress.as_deref_mut() {
        p.begin(None);
    }

    let mut summary = EnrichSummary::default();
    let mut row = ::csv::StringRecord::new();
    let mut row_no = 0usize;

    while rdr.read_record(&mut row)? {
        row_no += 1;
        if row_no < spec.start_row {
            debug!(row = row_no, "Skipping row before start row");
            continue;
        }

        let mut record = Record::from_row(&in_header, row.iter());
        let source = record.get(&spec.source_field).unwrap_or("").trim().to_string();

        let value = if source.is_empty() {
            info!(row = row_no, field = %spec.source_field, "Missing source value, skipping lookup");
            summary.skipped += 1;
            None
        } else {
            match lookup.lookup(&source) {
                Ok(found) => spec.accept(found),
                Err(e) => {
                    warn!(row = row_no, value = %source, error = %e, "Lookup failed");
                    summary.failed += 1;
                    None
                }
            }
        };

        if value.is_some() {
            summary.filled += 1;
        }
        record.set(spec.target_field.clone(), value.unwrap_or_default());
        wtr.write_record(record.to_row(&out_header))?;
        summary.rows += 1;

        if let Some(p) = progress.as_deref_mut() {
            p.item_done(row_no);
        }
    }

    wtr.flush()?;
    if let Some(p) = progress.as_deref_mut() {
        p.finish();
    }

    info!(
        output = %output.display(),
        rows = summary.rows,
        filled = summary.filled,
        skipped = summary.skipped,
        failed = summary.failed,
        "Enrichment done"
    );
    Ok(summary)
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}
