use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use std::time::Duration;

/// The binary with user settings shut out: no `BRFUCKY_*` variables and a
/// config path that does not exist.
fn cargo_bin() -> Command {
    let mut cmd = Command::cargo_bin("brfucky").unwrap();
    cmd.env_remove("BRFUCKY_TAPE_SIZE")
        .env_remove("BRFUCKY_UNMATCHED_OPEN")
        .arg("--config")
        .arg(Path::new(env!("CARGO_TARGET_TMPDIR")).join("no-such-brfucky.toml"));
    cmd
}

#[test]
fn test_input_flag_runs_code_verbatim() {
    cargo_bin()
        .timeout(Duration::from_secs(2))
        .arg("-i").arg("++++++++[>++++++++<-]>.")
        .assert()
        .success()
        .stdout("@")
        .stderr(predicate::str::is_empty());
}

#[test]
fn test_input_flag_without_value_reads_stdin() {
    let hello = "++++++++++[>+++++++>++++++++++>+++>+<<<<-]>++.>+.+++++++..+++.>++.<<+++++++++++++++.>.+++.------.--------.>+.>.";
    cargo_bin()
        .timeout(Duration::from_secs(2))
        .arg("--input")
        .write_stdin(hello)
        .assert()
        .success()
        .stdout("Hello World!\n");
}

#[test]
fn test_stdin_comments_and_newlines_are_ignored() {
    cargo_bin()
        .timeout(Duration::from_secs(2))
        .arg("-i")
        .write_stdin("add three, then print\n+++\n.\n")
        .assert()
        .success()
        .stdout(predicate::eq(&[3u8][..]));
}

#[test]
fn test_raw_bytes_are_written_without_newline() {
    // 200 is not valid UTF-8 on its own; it must come through untouched.
    let code = format!("{}.", "+".repeat(200));
    let out = cargo_bin()
        .timeout(Duration::from_secs(2))
        .arg("-i").arg(code)
        .output()
        .unwrap();
    assert!(out.status.success());
    assert_eq!(out.stdout, vec![200]);
}

#[test]
fn test_no_input_flag_runs_nothing() {
    cargo_bin()
        .timeout(Duration::from_secs(2))
        .write_stdin("+++.")
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::is_empty());
}

#[test]
fn test_empty_stdin_exits_clean_and_quiet() {
    cargo_bin()
        .timeout(Duration::from_secs(2))
        .arg("-i")
        .write_stdin("")
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::is_empty());
}
