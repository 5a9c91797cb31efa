use assert_cmd::Command;
use predicates::boolean::PredicateBooleanExt;
use predicates::str::{contains, ends_with, is_empty, starts_with};

const BINARY_NAME: &str = "rush";

#[test]
fn uci_setup() {
    let mut cmd = Command::cargo_bin(BINARY_NAME).expect("Binary should be built");

    drop(
        cmd.write_stdin("uci\nisready\nquit\n")
            .assert()
            .success()
            .stdout(
                contains("id name rush")
                    .and(contains("id author"))
                    .and(contains("uciok"))
                    .and(ends_with("readyok\n")),
            ),
    );
}

#[test]
fn finds_mate() {
    let mut cmd = Command::cargo_bin(BINARY_NAME).expect("Binary should be built");

    drop(
        cmd.args(["--depth", "2", "--seed", "1"])
            .write_stdin("position startpos moves f2f3 e7e5 g2g4\ngo\nquit\n")
            .assert()
            .success()
            .stdout(
                starts_with("info depth 2 score cp 1000000 nodes ")
                    .and(ends_with("bestmove d8h4\n")),
            ),
    );
}

#[test]
fn logs_stay_out_of_stdout() {
    let mut cmd = Command::cargo_bin(BINARY_NAME).expect("Binary should be built");

    drop(
        cmd.env("RUSH_LOG", "debug")
            .args(["--depth", "1", "--nodes", "50", "--movetime", "1000"])
            .write_stdin("go\n")
            .assert()
            .success()
            .stdout(starts_with("info depth 1 ").and(contains("bestmove ")))
            .stderr(contains("searched")),
    );
}

#[test]
fn rejects_illegal_moves() {
    let mut cmd = Command::cargo_bin(BINARY_NAME).expect("Binary should be built");

    drop(
        cmd.write_stdin("position startpos moves e2e5\npgn\n")
            .assert()
            .success()
            .stdout(contains("info string Illegal move e2e5").and(ends_with("\n*\n"))),
    );
}

#[test]
fn unknown_flags() {
    let mut cmd = Command::cargo_bin(BINARY_NAME).expect("Binary should be built");

    drop(
        cmd.arg("--fast")
            .assert()
            .failure()
            .stdout(is_empty()),
    );
}
