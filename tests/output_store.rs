// tests/output_store.rs
//
// Output store: header lifecycle and the schema policy.

use std::fs;

use listing_collect::{record, CollectError, OutputStore, delim::Delim};

fn cols(v: &[&str]) -> Vec<String> {
    v.iter().map(|s| s.to_string()).collect()
}

#[test]
fn first_run_creates_header_only_store() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("out/jobs.csv");
    let mut store = OutputStore::new(&path, Delim::Csv);
    assert!(!store.exists());

    store.ensure_initialized(&cols(&["title", "company", "link"])).unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), "title,company,link\r\n");
    assert!(store.read_all().unwrap().is_empty());
}

#[test]
fn initialization_is_idempotent() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("jobs.csv");
    let schema = cols(&["title", "company", "link"]);

    let mut store = OutputStore::new(&path, Delim::Csv);
    store.ensure_initialized(&schema).unwrap();
    store.append(&record! { "title" => "SDR", "company" => "Acme", "link" => "L1" }).unwrap();

    let mut again = OutputStore::new(&path, Delim::Csv);
    again.ensure_initialized(&schema).unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), "title,company,link\r\nSDR,Acme,L1\r\n");
}

#[test]
fn existing_header_wins_over_requested_schema() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("jobs.csv");
    fs::write(&path, "company,title,link\r\nAcme,SDR,L1\r\n").unwrap();

    let mut store = OutputStore::new(&path, Delim::Csv);
    store.ensure_initialized(&cols(&["title", "company", "link"])).unwrap();
    assert_eq!(store.schema().unwrap(), &cols(&["company", "title", "link"])[..]);

    store.append(&record! { "title" => "AE", "company" => "Beta", "link" => "L2" }).unwrap();
    assert!(fs::read_to_string(&path).unwrap().ends_with("Beta,AE,L2\r\n"));
}

#[test]
fn zero_length_file_gets_a_header() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("jobs.csv");
    fs::write(&path, "").unwrap();

    let mut store = OutputStore::new(&path, Delim::Csv);
    store.ensure_initialized(&cols(&["title", "link"])).unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), "title,link\r\n");
}

#[test]
fn unknown_field_is_rejected_and_nothing_written() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("jobs.csv");
    let mut store = OutputStore::new(&path, Delim::Csv);
    store.ensure_initialized(&cols(&["title", "link"])).unwrap();

    let err = store
        .append(&record! { "title" => "SDR", "link" => "L1", "salary" => "$1" })
        .unwrap_err();
    assert!(matches!(err, CollectError::SchemaMismatch { field } if field == "salary"));
    assert_eq!(fs::read_to_string(&path).unwrap(), "title,link\r\n");
}

#[test]
fn missing_fields_are_left_empty() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("jobs.csv");
    let mut store = OutputStore::new(&path, Delim::Csv);
    store.ensure_initialized(&cols(&["title", "salary", "link"])).unwrap();
    store.append(&record! { "link" => "L1" }).unwrap();

    let rows = store.read_all().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("title"), Some(""));
    assert_eq!(rows[0].get("link"), Some("L1"));
}

#[test]
fn append_before_init_fails() {
    let tmp = tempfile::tempdir().unwrap();
    let mut store = OutputStore::new(tmp.path().join("jobs.csv"), Delim::Csv);
    let err = store.append(&record! { "title" => "SDR" }).unwrap_err();
    assert!(matches!(err, CollectError::NotInitialized(_)));
}

#[test]
fn values_with_delimiters_round_trip() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("jobs.tsv");
    let mut store = OutputStore::new(&path, Delim::Tsv);
    store.ensure_initialized(&cols(&["title", "location"])).unwrap();

    let r = record! { "title" => "SDR, \"Enterprise\"", "location" => "Austin\tTX" };
    store.append(&r).unwrap();
    assert_eq!(store.read_all().unwrap(), vec![r]);
}

#[test]
fn unterminated_last_row_is_closed_before_appending() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("jobs.csv");
    fs::write(&path, "title,company,link\nSDR,Acme,L1").unwrap();

    let mut store = OutputStore::new(&path, Delim::Csv);
    store.ensure_initialized(&cols(&["title", "company", "link"])).unwrap();
    store.append(&record! { "title" => "AE", "company" => "Beta", "link" => "L2" }).unwrap();

    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "title,company,link\nSDR,Acme,L1\r\nAE,Beta,L2\r\n"
    );
    let rows = store.read_all().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].get("link"), Some("L1"));
    assert_eq!(rows[1].get("link"), Some("L2"));
}

#[test]
fn unterminated_header_is_closed_before_appending() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("jobs.csv");
    fs::write(&path, "title,company,link").unwrap();

    let mut store = OutputStore::new(&path, Delim::Csv);
    store.ensure_initialized(&cols(&["title", "company", "link"])).unwrap();
    store.append(&record! { "title" => "AE", "company" => "Beta", "link" => "L2" }).unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), "title,company,link\r\nAE,Beta,L2\r\n");
    assert_eq!(store.read_all().unwrap().len(), 1);
}

#[test]
fn terminated_store_is_left_untouched() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("jobs.csv");
    fs::write(&path, "title,link\nSDR,L1\n").unwrap();

    let mut store = OutputStore::new(&path, Delim::Csv);
    store.ensure_initialized(&cols(&["title", "link"])).unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), "title,link\nSDR,L1\n");
}

#[test]
fn blank_store_gets_the_header_rewritten() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("jobs.csv");
    fs::write(&path, "\r\n").unwrap();

    let mut store = OutputStore::new(&path, Delim::Csv);
    store.ensure_initialized(&cols(&["title", "company", "link"])).unwrap();
    store.append(&record! { "title" => "AE", "company" => "Beta", "link" => "L2" }).unwrap();
    store.append(&record! { "title" => "SDR", "company" => "Acme", "link" => "L3" }).unwrap();

    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "title,company,link\r\nAE,Beta,L2\r\nSDR,Acme,L3\r\n"
    );
    let rows = store.read_all().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1].get("company"), Some("Acme"));
}
