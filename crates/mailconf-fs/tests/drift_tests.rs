//! Drift detection and conditional write behaviour

use assert_fs::prelude::*;
use mailconf_fs::{Drift, WriteOutcome, has_drifted, write_if_different};
use predicates::prelude::*;
use pretty_assertions::assert_eq;
use rstest::rstest;

#[test]
fn absent_target_reports_absent() {
    let temp = assert_fs::TempDir::new().unwrap();
    let target = temp.child("header_checks");

    let drift = has_drifted(target.path(), b"/^Received:/ IGNORE").unwrap();

    assert_eq!(drift, Drift::Absent);
    target.assert(predicate::path::missing());
}

#[rstest]
#[case::identical("smtpd_tls_security_level = may\n", Drift::Same)]
#[case::trailing_newline("smtpd_tls_security_level = may", Drift::Different)]
#[case::single_byte("smtpd_tls_security_level = mAy\n", Drift::Different)]
#[case::empty("", Drift::Different)]
fn existing_target_compares_bytes(#[case] deployed: &str, #[case] expected: Drift) {
    let temp = assert_fs::TempDir::new().unwrap();
    let target = temp.child("main.cf");
    target.write_str(deployed).unwrap();

    let drift = has_drifted(target.path(), b"smtpd_tls_security_level = may\n").unwrap();

    assert_eq!(drift, expected);
}

#[test]
fn drift_check_cleans_up_staging_file() {
    let temp = assert_fs::TempDir::new().unwrap();
    let target = temp.child("master.cf");
    target.write_str("old").unwrap();

    has_drifted(target.path(), b"new").unwrap();

    let entries: Vec<_> = std::fs::read_dir(temp.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().to_string())
        .collect();
    assert_eq!(entries, vec!["master.cf".to_string()]);
    target.assert("old");
}

#[test]
fn write_if_different_creates_absent_file() {
    let temp = assert_fs::TempDir::new().unwrap();
    let target = temp.child("opendkim.conf");

    let outcome = write_if_different(target.path(), b"Syslog yes\n").unwrap();

    assert_eq!(outcome, WriteOutcome::Written);
    target.assert("Syslog yes\n");
}

#[test]
fn write_if_different_replaces_drifted_file() {
    let temp = assert_fs::TempDir::new().unwrap();
    let target = temp.child("opendkim.conf");
    target.write_str("Syslog no\n").unwrap();

    let outcome = write_if_different(target.path(), b"Syslog yes\n").unwrap();

    assert_eq!(outcome, WriteOutcome::Written);
    target.assert("Syslog yes\n");
}

#[test]
fn write_if_different_is_idempotent() {
    let temp = assert_fs::TempDir::new().unwrap();
    let target = temp.child("opendmarc.conf");

    let first = write_if_different(target.path(), b"AuthservID mail.example.com\n").unwrap();
    let second = write_if_different(target.path(), b"AuthservID mail.example.com\n").unwrap();

    assert_eq!(first, WriteOutcome::Written);
    assert_eq!(second, WriteOutcome::Unchanged);
}

#[cfg(unix)]
#[test]
fn unchanged_file_keeps_its_modification_time() {
    let temp = assert_fs::TempDir::new().unwrap();
    let target = temp.child("dovecot.conf");
    target.write_str("protocols = imap\n").unwrap();
    let before = std::fs::metadata(target.path()).unwrap().modified().unwrap();

    std::thread::sleep(std::time::Duration::from_millis(20));
    write_if_different(target.path(), b"protocols = imap\n").unwrap();

    let after = std::fs::metadata(target.path()).unwrap().modified().unwrap();
    assert_eq!(before, after);
}
