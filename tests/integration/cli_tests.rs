//! CLI integration tests
//!
//! These tests verify that the CLI works correctly with various options.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const MARKED: &str = r##"package com.example;

import javax.annotation.CheckReturnValue;

class Example {
    @CheckReturnValue(suggest = "#computeAndStore")
    int compute() { return 1; }

    void run() {
        compute();
    }
}
"##;

const CLEAN: &str = r#"package com.example;

import javax.annotation.CheckReturnValue;

class Example {
    @CheckReturnValue
    int compute() { return 1; }

    int run() {
        return compute();
    }
}
"#;

fn project(files: &[(&str, &str)]) -> TempDir {
    let temp = TempDir::new().expect("Failed to create temp dir");
    for (name, content) in files {
        let path = temp.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        fs::write(path, content).expect("Failed to write file");
    }
    temp
}

fn cli(path: &Path) -> Command {
    let mut command = Command::cargo_bin("checkreturnvalue").expect("Binary not built");
    command.env("NO_COLOR", "1").arg(path).arg("--quiet");
    command
}

// ============================================================================
// Basic CLI Tests
// ============================================================================

#[test]
fn test_cli_help() {
    Command::cargo_bin("checkreturnvalue")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("checkreturnvalue"))
        .stdout(predicate::str::contains("--profile"))
        .stdout(predicate::str::contains("--no-misuse-check"))
        .stdout(predicate::str::contains("--parallel"));
}

#[test]
fn test_cli_version() {
    Command::cargo_bin("checkreturnvalue")
        .unwrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

// ============================================================================
// Analysis
// ============================================================================

#[test]
fn test_ignored_value_fails_the_run() {
    let temp = project(&[("src/com/example/Example.java", MARKED)]);

    cli(temp.path())
        .assert()
        .code(1)
        .stdout(predicate::str::contains(
            "The result of 'compute' is not used; did you mean to call 'computeAndStore' instead?",
        ))
        .stdout(predicate::str::contains("CRV001"));
}

#[test]
fn test_clean_project_succeeds() {
    let temp = project(&[("src/com/example/Example.java", CLEAN)]);

    cli(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("No ignored return values found"));
}

#[test]
fn test_parallel_mode_matches_sequential() {
    let temp = project(&[
        ("src/com/example/Example.java", MARKED),
        ("src/com/example/Other.kt", "package com.example\n\nfun other(e: Example) {\n    e.compute()\n}\n"),
    ]);

    let sequential = cli(temp.path()).arg("--format").arg("json").output().unwrap();
    let parallel = cli(temp.path())
        .args(["--format", "json", "--parallel"])
        .output()
        .unwrap();

    assert_eq!(sequential.stdout, parallel.stdout);
    let json: serde_json::Value = serde_json::from_slice(&parallel.stdout).unwrap();
    assert_eq!(json["total_issues"], 2);
}

#[test]
fn test_json_output() {
    let temp = project(&[("src/com/example/Example.java", MARKED)]);

    let output = cli(temp.path()).args(["--format", "json"]).output().unwrap();
    assert_eq!(output.status.code(), Some(1));

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["rule"], "ConfigurableCheckReturnValue");
    assert_eq!(json["issues"][0]["code"], "CRV001");
    assert_eq!(json["issues"][0]["fix"], "computeAndStore");
    assert_eq!(json["issues"][0]["line"], 10);
}

#[test]
fn test_sarif_output_file() {
    let temp = project(&[("src/com/example/Example.java", MARKED)]);
    let report = temp.path().join("report.sarif");

    cli(temp.path())
        .args(["--format", "sarif", "--output"])
        .arg(&report)
        .assert()
        .code(1);

    let sarif: serde_json::Value = serde_json::from_str(&fs::read_to_string(&report).unwrap()).unwrap();
    assert_eq!(sarif["version"], "2.1.0");
    assert_eq!(sarif["runs"][0]["results"][0]["ruleId"], "CRV001");
}

// ============================================================================
// Configuration flags
// ============================================================================

#[test]
fn test_gradle_properties_in_project_root() {
    let source = MARKED.replace("javax.annotation.CheckReturnValue", "com.example.Pure")
        .replace("@CheckReturnValue", "@Pure");
    let temp = project(&[("src/com/example/Example.java", &source)]);

    cli(temp.path()).assert().success();

    fs::write(
        temp.path().join("gradle.properties"),
        "configurableCheckReturnValue.customAnnotations=com.example.Pure\n",
    )
    .unwrap();
    cli(temp.path()).assert().code(1);
}

#[test]
fn test_custom_and_excluded_annotation_flags() {
    let temp = project(&[("src/com/example/Example.java", MARKED)]);

    cli(temp.path())
        .args(["--exclude-annotation", "javax.annotation.CheckReturnValue"])
        .args(["--exclude-annotation", "CheckReturnValue"])
        .assert()
        .success();
}

#[test]
fn test_exemption_flag() {
    let source = MARKED.replace("class Example", "@com.example.MayIgnore\nclass Example");
    let temp = project(&[("src/com/example/Example.java", &source)]);

    cli(temp.path()).assert().code(1);
    cli(temp.path())
        .args(["--exemption", "com.example.MayIgnore"])
        .assert()
        .success();
}

#[test]
fn test_misuse_warnings_do_not_fail() {
    let source = "class Logger {\n    @CheckReturnValue\n    void log() {}\n}\n";
    let temp = project(&[("Logger.java", source)]);

    cli(temp.path())
        .args(["--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("CRV003"));

    cli(temp.path())
        .args(["--format", "json", "--no-misuse-check"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"total_issues\": 0"));
}

#[test]
fn test_optional_profile_flag() {
    let temp = project(&[("src/com/example/Example.java", MARKED)]);

    cli(temp.path()).args(["--profile", "optional"]).assert().success();
}

#[test]
fn test_config_file_flag() {
    let temp = project(&[("src/com/example/Example.java", MARKED)]);
    let config = temp.path().join("custom.yml");
    fs::write(&config, "annotations:\n  exclude:\n    - javax.annotation.CheckReturnValue\n    - CheckReturnValue\n").unwrap();

    cli(temp.path()).arg("--config").arg(&config).assert().success();
}

#[test]
fn test_single_file_path() {
    let temp = project(&[("Example.java", MARKED)]);

    cli(&temp.path().join("Example.java")).assert().code(1);
}
