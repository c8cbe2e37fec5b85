// src/delim.rs
//
// Delimited-text plumbing shared by the output store, the CSV record source
// and the enrichment pass. Everything goes through the `csv` crate; this
// module only pins the dialect (separator, terminator, quoting).

use std::{fs::File, io::Write, path::Path};

use crate::error::Result;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Delim {
    #[default]
    Csv,
    Tsv,
}

impl Delim {
    pub fn byte(self) -> u8 {
        match self { Delim::Csv => b',', Delim::Tsv => b'\t' }
    }

    pub fn ext(self) -> &'static str {
        match self { Delim::Csv => "csv", Delim::Tsv => "tsv" }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Some(Delim::Csv),
            "tsv" => Some(Delim::Tsv),
            _ => None,
        }
    }
}

/* ---------------- Reading ---------------- */

/// Reader over a file with a header row. Ragged rows are tolerated.
pub fn open_reader(path: &Path, delim: Delim) -> Result<::csv::Reader<File>> {
    let rdr = ::csv::ReaderBuilder::new()
        .delimiter(delim.byte())
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;
    Ok(rdr)
}

/// Header row of an existing file; `None` when the file has no header.
pub fn read_header(path: &Path, delim: Delim) -> Result<Option<Vec<String>>> {
    let mut rdr = open_reader(path, delim)?;
    let h = rdr.headers()?;
    if h.is_empty() {
        return Ok(None);
    }
    Ok(Some(h.iter().map(str::to_owned).collect()))
}

/* ---------------- Writing ---------------- */

/// Writer in the store dialect: CRLF rows, quote only when needed.
/// Headers are written explicitly by callers.
pub fn writer<W: Write>(w: W, delim: Delim) -> ::csv::Writer<W> {
    ::csv::WriterBuilder::new()
        .delimiter(delim.byte())
        .has_headers(false)
        .terminator(::csv::Terminator::CRLF)
        .quote_style(::csv::QuoteStyle::Necessary)
        .from_writer(w)
}

/// Write a single row to any writer.
pub fn write_row<W: Write, S: AsRef<[u8]>>(w: W, row: &[S], delim: Delim) -> Result<()> {
    let mut wtr = writer(w, delim);
    wtr.write_record(row)?;
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quotes_only_when_needed() {
        let mut buf = Vec::new();
        write_row(&mut buf, &["plain", "a,b", "say \"hi\""], Delim::Csv).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "plain,\"a,b\",\"say \"\"hi\"\"\"\r\n");
    }

    #[test]
    fn tsv_keeps_commas_bare() {
        let mut buf = Vec::new();
        write_row(&mut buf, &["a,b", "c"], Delim::Tsv).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "a,b\tc\r\n");
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(Delim::parse(" TSV "), Some(Delim::Tsv));
        assert_eq!(Delim::parse("json"), None);
    }
}
