use std::io::Write;

use motorlab_config::load_gains_csv;
use tempfile::NamedTempFile;

fn write_csv(contents: &str) -> NamedTempFile {
    let mut f = NamedTempFile::new().expect("temp file");
    f.write_all(contents.as_bytes()).expect("write");
    f.flush().expect("flush");
    f
}

#[test]
fn loads_valid_list_in_order() {
    let f = write_csv("gain\n1\n5\n50\n1000\n");
    let gains = load_gains_csv(f.path()).expect("loads");
    assert_eq!(gains, vec![1.0, 5.0, 50.0, 1000.0]);
}

#[test]
fn accepts_fractional_gains() {
    let f = write_csv("gain\n0.5\n12.5\n");
    let gains = load_gains_csv(f.path()).expect("loads");
    assert_eq!(gains, vec![0.5, 12.5]);
}

#[test]
fn rejects_wrong_header() {
    let f = write_csv("kp\n1\n5\n");
    let err = load_gains_csv(f.path()).expect_err("wrong header");
    assert!(err.to_string().contains("header"));
}

#[test]
fn rejects_negative_value_with_row_number() {
    let f = write_csv("gain\n1\n-5\n");
    let err = load_gains_csv(f.path()).expect_err("negative gain");
    assert!(err.to_string().contains("row 3"));
}

#[test]
fn rejects_non_numeric_row() {
    let f = write_csv("gain\nfast\n");
    assert!(load_gains_csv(f.path()).is_err());
}

#[test]
fn rejects_empty_list() {
    let f = write_csv("gain\n");
    let err = load_gains_csv(f.path()).expect_err("empty list");
    assert!(err.to_string().contains("no values"));
}
