use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::io::Write;
use std::process::Command;
use tempfile::NamedTempFile;

#[test]
fn test_malformed_csv_handling() {
    let mut requests = NamedTempFile::new().unwrap();
    writeln!(requests, "transactionID, otp, createdTime").unwrap();
    // Valid request
    writeln!(requests, "R1, 4821, 0").unwrap();
    // Text in the timestamp field
    writeln!(requests, "R2, 9999, not-a-time").unwrap();
    // Missing column
    writeln!(requests, "R2, 9999").unwrap();
    // Valid request again
    writeln!(requests, "R3, 1111, 5000").unwrap();

    let mut confirmations = NamedTempFile::new().unwrap();
    writeln!(confirmations, "transactionID, otp, createdTime").unwrap();
    writeln!(confirmations, "R1, 4821, 1000").unwrap();
    writeln!(confirmations, "R3, 2222, 6000").unwrap();

    let mut cmd = Command::new(cargo_bin!("otpmatch"));
    cmd.arg(requests.path()).arg(confirmations.path());

    // Bad rows are skipped with a warning; the rest of the stream joins.
    cmd.assert()
        .success()
        .stderr(predicate::str::contains("skipping malformed row"))
        .stdout(predicate::str::contains("R1,Success"))
        .stdout(predicate::str::contains("R3,Failure"))
        .stdout(predicate::str::contains("R2").not());
}

#[test]
fn test_empty_transaction_id_skipped() {
    let mut requests = NamedTempFile::new().unwrap();
    writeln!(requests, "transactionID, otp, createdTime").unwrap();
    writeln!(requests, ", 4821, 0").unwrap();
    writeln!(requests, "R4, 4821, 100").unwrap();

    let mut confirmations = NamedTempFile::new().unwrap();
    writeln!(confirmations, "transactionID, otp, createdTime").unwrap();
    writeln!(confirmations, "R4, 4821, 1000").unwrap();

    let mut cmd = Command::new(cargo_bin!("otpmatch"));
    cmd.arg(requests.path()).arg(confirmations.path());

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("empty transactionID"))
        .stdout(predicate::str::contains("R4,Success"));
}

#[test]
fn test_header_only_files() {
    let mut requests = NamedTempFile::new().unwrap();
    writeln!(requests, "transactionID, otp, createdTime").unwrap();

    let mut confirmations = NamedTempFile::new().unwrap();
    writeln!(confirmations, "transactionID, otp, createdTime").unwrap();

    let mut cmd = Command::new(cargo_bin!("otpmatch"));
    cmd.arg(requests.path()).arg(confirmations.path());

    // No events, no statuses: stdout stays empty.
    cmd.assert().success().stdout(predicate::str::is_empty());
}
