use std::fs;

use roster_ingest::{IngestError, IngestOptions, read_table};

#[test]
fn reads_csv_file_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("members.csv");
    fs::write(
        &path,
        "First Name,Last Name,Mobile\nJane,Doe,0400 000 000\nJoe,Bloggs,\n",
    )
    .unwrap();

    let table = read_table(&path, &IngestOptions::for_path(&path)).unwrap();
    assert_eq!(table.headers(), ["First Name", "Last Name", "Mobile"]);
    assert_eq!(table.row_count(), 2);
    assert_eq!(table.rows()[1].value("Mobile"), "");
}

#[test]
fn reads_tab_separated_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("employers.tsv");
    fs::write(&path, "name\tabn\nAcme Pty Ltd\t51 824 753 556\n").unwrap();

    let table = read_table(&path, &IngestOptions::for_path(&path)).unwrap();
    assert_eq!(table.rows()[0].value("abn"), "51 824 753 556");
}

#[test]
fn short_rows_are_padded() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("short.csv");
    fs::write(&path, "a,b,c\n1\n").unwrap();

    let table = read_table(&path, &IngestOptions::default()).unwrap();
    assert_eq!(table.rows()[0].value("c"), "");
}

#[test]
fn missing_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let err = read_table(&dir.path().join("nope.csv"), &IngestOptions::default()).unwrap_err();
    assert!(matches!(err, IngestError::FileNotFound { .. }));
}

#[test]
fn utf16_input_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("utf16.csv");
    fs::write(&path, [0xFF, 0xFE, b'a', 0x00]).unwrap();

    let err = read_table(&path, &IngestOptions::default()).unwrap_err();
    assert!(matches!(
        err,
        IngestError::UnsupportedEncoding {
            encoding: "UTF-16 LE",
            ..
        }
    ));
}
