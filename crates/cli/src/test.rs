use std::fs;
use std::path::Path;

use indoc::indoc;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

use super::*;

const SNAPSHOT: &str = indoc!(
    r#"
    [
      {
        "name": "java.util.function.Supplier",
        "kind": "interface",
        "type_params": [{ "name": "T" }],
        "methods": [{ "name": "get", "return_type": "T", "modifiers": ["abstract"] }]
      },
      {
        "name": "java.util.function.Function",
        "kind": "interface",
        "type_params": [{ "name": "T" }, { "name": "R" }],
        "methods": [
          { "name": "apply", "params": [{ "name": "t", "ty": "T" }], "return_type": "R", "modifiers": ["abstract"] }
        ]
      },
      {
        "name": "a.Expr",
        "kind": "abstract_class",
        "methods": [
          {
            "name": "match",
            "type_params": [{ "name": "R" }],
            "params": [{ "name": "cases", "ty": "a.Expr.Cases<R>" }],
            "return_type": "R",
            "modifiers": ["abstract"]
          }
        ]
      },
      {
        "name": "a.Expr.Cases",
        "kind": "interface",
        "type_params": [{ "name": "R" }],
        "methods": [
          { "name": "Const", "params": [{ "name": "value", "ty": "int" }], "return_type": "R", "modifiers": ["abstract"] },
          {
            "name": "Add",
            "params": [{ "name": "left", "ty": "a.Expr" }, { "name": "right", "ty": "a.Expr" }],
            "return_type": "R",
            "modifiers": ["abstract"]
          }
        ]
      },
      {
        "name": "a.Broken",
        "kind": "abstract_class",
        "methods": [{ "name": "size", "return_type": "int", "modifiers": ["abstract"] }]
      }
    ]
    "#
);

fn snapshot_in(dir: &TempDir) -> String {
    let path = dir.path().join("snapshot.json");
    fs::write(&path, SNAPSHOT).unwrap();
    path.to_string_lossy().into_owned()
}

fn run(args: &[&str], mode: DeriveMode) -> i32 {
    let matches = build_app()
        .try_get_matches_from(std::iter::once("adt").chain(args.iter().copied()))
        .unwrap();
    let (_, matches) = matches.subcommand().unwrap();
    derive(matches, mode).unwrap()
}

#[test]
fn derive_writes_one_file_per_class() {
    let dir = TempDir::new().unwrap();
    let snapshot = snapshot_in(&dir);
    let out = dir.path().join("out");
    let out_arg = out.to_string_lossy().into_owned();

    let exit_code = run(
        &["derive", &snapshot, "a.Expr", "--out", &out_arg, "--max-threads", "2"],
        DeriveMode::Write,
    );

    assert_eq!(exit_code, 0);
    let source = fs::read_to_string(out.join("a").join("Exprs.java")).unwrap();
    assert!(source.starts_with("package a;\n"));
    assert!(source.contains("final class Exprs"));
    assert!(source.contains("Const(int value)"));
}

#[test]
fn check_fails_on_errors_and_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let snapshot = snapshot_in(&dir);

    let exit_code = run(&["check", &snapshot, "a.Expr", "a.Broken"], DeriveMode::Check);

    assert_eq!(exit_code, 1);
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn job_file_adds_configuration() {
    let dir = TempDir::new().unwrap();
    let snapshot = snapshot_in(&dir);
    let job = dir.path().join("job.json");
    fs::write(
        &job,
        r#"{ "defaults": { "inClass": "{ClassName}Derived" }, "types": [{ "name": "a.Expr" }] }"#,
    )
    .unwrap();
    let out = dir.path().join("out");

    let exit_code = run(
        &[
            "derive",
            &snapshot,
            "--job",
            &job.to_string_lossy(),
            "--out",
            &out.to_string_lossy(),
        ],
        DeriveMode::Write,
    );

    assert_eq!(exit_code, 0);
    assert!(out.join("a").join("ExprDerived.java").is_file());
    assert!(!out.join("a").join("Exprs.java").exists());
}

#[test]
fn nothing_to_derive() {
    let dir = TempDir::new().unwrap();
    let snapshot = snapshot_in(&dir);

    assert_eq!(run(&["check", &snapshot], DeriveMode::Check), 1);
}

#[test]
fn unreadable_snapshot_is_an_io_error() {
    let matches = build_app()
        .try_get_matches_from(["adt", "check", "/nonexistent/snapshot.json", "a.Expr"])
        .unwrap();
    let (_, matches) = matches.subcommand().unwrap();

    let error = derive(matches, DeriveMode::Check).unwrap_err();

    assert!(error.to_string().contains("/nonexistent/snapshot.json"));
}

#[test]
fn unknown_flavour_is_rejected() {
    let error = build_app()
        .try_get_matches_from(["adt", "check", "snapshot.json", "--flavour", "scala"])
        .unwrap_err();

    assert_eq!(error.kind(), clap::error::ErrorKind::InvalidValue);
}

#[test]
fn units_go_under_their_package() {
    let path = unit_path(Path::new("out"), &QualifiedName::from("com.example.Exprs"));
    assert_eq!(path, Path::new("out/com/example/Exprs.java"));

    let path = unit_path(Path::new("out"), &QualifiedName::from("Exprs"));
    assert_eq!(path, Path::new("out/Exprs.java"));
}
