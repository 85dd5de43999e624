mod common;

use std::fs;

use assert_cmd::Command;
use common::{TestWorkspace, fixture_path};
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use schema_discovery::schema::{SqlType, TableSchema};

fn bin() -> Command {
    Command::cargo_bin("schema-discovery").expect("binary exists")
}

#[test]
fn prints_create_table_for_pipe_delimited_file() {
    bin()
        .arg(fixture_path("measurements.dat").to_str().unwrap())
        .assert()
        .success()
        .stdout(contains("CREATE TABLE \"measurements\" ("))
        .stdout(contains("\t\"reading\" decimal(5, 3),"))
        .stdout(contains("\t\"population\" bigint,"))
        .stdout(contains("\t\"missing\" tinyint\n);"));
}

#[test]
fn honours_separator_skip_and_null_flags() {
    bin()
        .args([
            "-F",
            ",",
            "-B",
            "2",
            "-N",
            "NULL",
            "-t",
            "sales",
            fixture_path("sales.csv").to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(contains("CREATE TABLE \"sales\" ("))
        .stdout(contains("\t\"units\" smallint,"))
        .stdout(contains("\t\"price\" decimal(4, 2),"))
        .stdout(contains("\t\"notes\" string\n);"));
}

#[test]
fn describes_each_file_in_turn() {
    let workspace = TestWorkspace::new();
    let first = workspace.write("first.csv", "a\n1\n");
    let second = workspace.write("second.csv", "b\nx\n");
    let assert = bin()
        .args([first.to_str().unwrap(), second.to_str().unwrap()])
        .assert()
        .success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("utf8");
    assert_eq!(
        stdout,
        "CREATE TABLE \"first\" (\n\t\"a\" tinyint\n);\n\nCREATE TABLE \"second\" (\n\t\"b\" string\n);\n"
    );
}

#[test]
fn reads_stdin_with_dash() {
    bin()
        .args(["--sep", "tab", "-"])
        .write_stdin("id\tscore\n1\t2.5\n2\t10\n")
        .assert()
        .success()
        .stdout(contains("CREATE TABLE \"stdin\" ("))
        .stdout(contains("\t\"score\" decimal(3, 1)"));
}

#[test]
fn ragged_input_fails_without_output() {
    let workspace = TestWorkspace::new();
    let path = workspace.write("ragged.csv", "a,b\n1,2\n3\n");
    bin()
        .arg(path.to_str().unwrap())
        .assert()
        .failure()
        .stdout("")
        .stderr(contains("line 3 has 1 field(s), expected 2"));
}

#[test]
fn empty_input_reports_no_columns() {
    let workspace = TestWorkspace::new();
    let path = workspace.write("empty.csv", "");
    bin()
        .arg(path.to_str().unwrap())
        .assert()
        .failure()
        .stdout("")
        .stderr(contains("no columns to describe"));
}

#[test]
fn failure_in_a_later_file_suppresses_all_output() {
    let workspace = TestWorkspace::new();
    let good = workspace.write("good.csv", "a\n1\n");
    let bad = workspace.write("bad.csv", "a,b\n1\n");
    bin()
        .args([good.to_str().unwrap(), bad.to_str().unwrap()])
        .assert()
        .failure()
        .stdout("")
        .stderr(contains("bad.csv"));
}

#[test]
fn json_output_round_trips() {
    let workspace = TestWorkspace::new();
    let output = workspace.path().join("schema.json");
    bin()
        .args([
            "--format",
            "json",
            "-o",
            output.to_str().unwrap(),
            fixture_path("measurements.dat").to_str().unwrap(),
        ])
        .assert()
        .success();

    let contents = fs::read_to_string(&output).expect("read json");
    let schemas: Vec<TableSchema> = serde_json::from_str(&contents).expect("parse json");
    assert_eq!(schemas.len(), 1);
    assert_eq!(schemas[0].table_name, "measurements");
    assert_eq!(schemas[0].column_type("label"), Some(SqlType::String));
}

#[test]
fn yaml_output_lists_types() {
    let workspace = TestWorkspace::new();
    let path = workspace.write("t.csv", "n,v\n1,0.25\n");
    bin()
        .args(["--format", "yaml", path.to_str().unwrap()])
        .assert()
        .success()
        .stdout(contains("table_name: t"))
        .stdout(contains("name: n").and(contains("type: tinyint")));
}

#[test]
fn decodes_requested_input_encoding() {
    let workspace = TestWorkspace::new();
    let path = workspace.write_bytes("latin.csv", b"id,name\n1,Caf\xe9\n");
    bin()
        .args(["--input-encoding", "windows-1252", path.to_str().unwrap()])
        .assert()
        .success()
        .stdout(contains("\t\"name\" string"));
}

#[test]
fn table_flag_requires_single_file() {
    let workspace = TestWorkspace::new();
    let first = workspace.write("one.csv", "a\n1\n");
    let second = workspace.write("two.csv", "a\n1\n");
    bin()
        .args(["-t", "x", first.to_str().unwrap(), second.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(contains("single input file"));
}

#[test]
fn parallel_flag_accepts_negative_values() {
    bin()
        .args(["-P", "-1", fixture_path("measurements.dat").to_str().unwrap()])
        .assert()
        .success()
        .stdout(contains("\t\"ratio\" decimal(4, 3),"));
}
