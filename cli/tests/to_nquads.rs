//! Integration tests for the `mantic` binary.

use assert_cmd::Command;
use assert_fs::prelude::*;
use predicates::prelude::*;

fn mantic() -> Command {
    Command::cargo_bin("mantic").unwrap()
}

#[test]
fn converts_turtle_from_stdin_to_stdout() {
    mantic()
        .arg("to-nquads")
        .write_stdin(
            "@prefix ex: <http://example.com/> .\n\
             ex:s ex:p \"v\" , ex:o .\n",
        )
        .assert()
        .success()
        .stdout(
            "<http://example.com/s> <http://example.com/p> \"v\" .\n\
             <http://example.com/s> <http://example.com/p> <http://example.com/o> .\n",
        );
}

#[test]
fn assigns_the_target_graph_to_untagged_statements() {
    mantic()
        .args(["to-nquads", "--graph", "http://example.com/g"])
        .write_stdin("<http://example.com/s> <http://example.com/p> <http://example.com/o> .\n")
        .assert()
        .success()
        .stdout(
            "<http://example.com/s> <http://example.com/p> <http://example.com/o> <http://example.com/g> .\n",
        );
}

#[test]
fn explicit_graph_blocks_win_over_the_target_graph() {
    mantic()
        .args(["to-nquads", "--graph", "http://example.com/target"])
        .write_stdin(
            "<http://example.com/g> { <http://example.com/s> <http://example.com/p> <http://example.com/o> . }\n",
        )
        .assert()
        .success()
        .stdout(predicate::str::contains("<http://example.com/g> .\n"))
        .stdout(predicate::str::contains("target").not());
}

#[test]
fn reads_and_writes_files_guessing_the_format() {
    let dir = assert_fs::TempDir::new().unwrap();
    let input = dir.child("data.nq");
    input
        .write_str("<http://example.com/s> <http://example.com/p> \"x\" <http://example.com/g> .\n")
        .unwrap();
    let output = dir.child("out.nq");
    mantic()
        .args(["to-nquads", "-f"])
        .arg(input.path())
        .arg("-o")
        .arg(output.path())
        .assert()
        .success();
    output.assert(
        "<http://example.com/s> <http://example.com/p> \"x\" <http://example.com/g> .\n",
    );
}

#[test]
fn base_option_resolves_relative_iris() {
    mantic()
        .args(["to-nquads", "--base", "http://example.com/dir/"])
        .write_stdin("<s> <p> <../o> .\n")
        .assert()
        .success()
        .stdout(
            "<http://example.com/dir/s> <http://example.com/dir/p> <http://example.com/o> .\n",
        );
}

#[test]
fn syntax_errors_give_a_diagnostic_with_position_and_nonzero_exit() {
    mantic()
        .arg("to-nquads")
        .write_stdin("<http://example.com/s> <http://example.com/p> .\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("line 1"))
        .stderr(predicate::str::contains("expected an object"));
}

#[test]
fn undeclared_prefix_gives_a_resolution_diagnostic() {
    mantic()
        .arg("to-nquads")
        .write_stdin("ex:s <http://example.com/p> <http://example.com/o> .\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("'ex:' has not been declared"));
}

#[test]
fn n3_formulas_are_reported_as_unsupported() {
    mantic()
        .arg("to-nquads")
        .write_stdin(
            "<http://example.com/s> <http://example.com/p> { <http://example.com/a> <http://example.com/b> <http://example.com/c> } .\n",
        )
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported construct"));
}

#[test]
fn invalid_target_graph_iri_is_rejected() {
    mantic()
        .args(["to-nquads", "--graph", "not an iri"])
        .write_stdin("")
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid target graph IRI"));
}

#[test]
fn bnf2html_renders_linked_productions() {
    mantic()
        .args(["bnf2html", "--title", "Turtle"])
        .write_stdin("[1] doc ::= statement*\n[2] statement ::= doc '.'\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("<title>Turtle</title>"))
        .stdout(predicate::str::contains("<tr id=\"statement\">"))
        .stdout(predicate::str::contains("<a href=\"#doc\">doc</a>"));
}
