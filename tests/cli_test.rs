use assert_cmd::prelude::*; // Add methods on commands
use predicates::prelude::*;
use std::process::Command; // Run programs
use tempfile;
type STDRESULT = Result<(),Box<dyn std::error::Error>>;

fn round_trip_test(method: &str) -> STDRESULT {
    let temp_dir = tempfile::tempdir()?;
    let orig_path = temp_dir.path().join("sample.txt");
    let cmp_path = temp_dir.path().join("sample.cmp");
    let out_path = temp_dir.path().join("sample.out");
    let dat = "I am Sam. Sam I am. I do not like this Sam I am.\n".repeat(20);
    std::fs::write(&orig_path,&dat)?;
    let mut cmd = Command::cargo_bin("hufflz")?;
    cmd.arg("compress")
        .arg("-m").arg(method)
        .arg("-i").arg(&orig_path)
        .arg("-o").arg(&cmp_path)
        .assert()
        .success();
    let mut cmd = Command::cargo_bin("hufflz")?;
    cmd.arg("expand")
        .arg("-m").arg(method)
        .arg("-i").arg(&cmp_path)
        .arg("-o").arg(&out_path)
        .assert()
        .success();
    match (std::fs::read(&orig_path),std::fs::read(&out_path)) {
        (Ok(v1),Ok(v2)) => {
            assert_eq!(v1,v2);
        },
        _ => panic!("unable to compare output with original")
    }
    Ok(())
}

#[test]
fn huffman_round_trip() -> STDRESULT {
    round_trip_test("huffman")
}

#[test]
fn lz77_round_trip() -> STDRESULT {
    round_trip_test("lz77")
}

#[test]
fn lz78_round_trip() -> STDRESULT {
    round_trip_test("lz78")
}

#[test]
fn demo_reports_round_trips() -> STDRESULT {
    let mut cmd = Command::cargo_bin("hufflz")?;
    cmd.arg("demo")
        .assert()
        .success()
        .stdout(predicate::str::contains("round trip: ok"))
        .stderr(predicate::str::contains("data corruption").not());
    Ok(())
}
