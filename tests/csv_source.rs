// tests/csv_source.rs

use std::fs;

use listing_collect::{CsvSource, RecordSource, delim::Delim};

fn write_input(dir: &std::path::Path, rows: usize) -> std::path::PathBuf {
    let path = dir.join("input.csv");
    let mut text = String::from("title,company,link\n");
    for i in 1..=rows {
        text.push_str(&format!("Job {i},Co {i},L{i}\n"));
    }
    fs::write(&path, text).unwrap();
    path
}

#[test]
fn yields_fixed_size_batches_then_exhausts() {
    let tmp = tempfile::tempdir().unwrap();
    let path = write_input(tmp.path(), 5);
    let mut src = CsvSource::open(&path, Delim::Csv, 2, 1).unwrap();

    let sizes: Vec<usize> = std::iter::from_fn(|| src.next_batch().unwrap())
        .map(|b| b.len())
        .collect();
    assert_eq!(sizes, vec![2, 2, 1]);
    assert!(src.next_batch().unwrap().is_none());
}

#[test]
fn start_row_skips_earlier_rows() {
    let tmp = tempfile::tempdir().unwrap();
    let path = write_input(tmp.path(), 4);
    let mut src = CsvSource::open(&path, Delim::Csv, 10, 3).unwrap();

    let batch = src.next_batch().unwrap().unwrap();
    let titles: Vec<&str> = batch.iter().filter_map(|r| r.get("title")).collect();
    assert_eq!(titles, vec!["Job 3", "Job 4"]);
    assert!(src.next_batch().unwrap().is_none());
}

#[test]
fn header_only_input_is_immediately_exhausted() {
    let tmp = tempfile::tempdir().unwrap();
    let path = write_input(tmp.path(), 0);
    let mut src = CsvSource::open(&path, Delim::Csv, 10, 1).unwrap();
    assert_eq!(src.headers(), vec!["title", "company", "link"]);
    assert!(src.next_batch().unwrap().is_none());
}
