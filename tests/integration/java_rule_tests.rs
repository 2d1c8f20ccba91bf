//! Java rule tests
//!
//! Whole-pipeline checks on small Java projects written to a temp dir.

use checkreturnvalue::analysis::{Analyzer, Finding, IssueKind};
use checkreturnvalue::config::{Config, ProjectProperties, RuleProfile};
use checkreturnvalue::discovery::FileFinder;
use checkreturnvalue::index::IndexBuilder;
use std::path::Path;

const CHECK_RETURN_VALUE: &str = r#"
package com.google.errorprone.annotations;

public @interface CheckReturnValue {
}
"#;

/// Write files into a temp project and run the default analysis
fn analyze(files: &[(&str, &str)]) -> Vec<Finding> {
    analyze_with(&Config::default(), &ProjectProperties::default(), files)
}

fn analyze_with(config: &Config, properties: &ProjectProperties, files: &[(&str, &str)]) -> Vec<Finding> {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    for (name, content) in files {
        let path = temp_dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        std::fs::write(&path, content).expect("Failed to write file");
    }

    let sources = FileFinder::new(config)
        .find_files(temp_dir.path())
        .expect("Failed to discover files");
    let mut builder = IndexBuilder::new();
    for source in &sources {
        builder.process_file(source).expect("Failed to process file");
    }

    let findings = Analyzer::from_config(config, properties).analyze(&builder.build());
    findings
        .into_iter()
        .map(|mut finding| {
            let relative = finding
                .location
                .file
                .strip_prefix(temp_dir.path())
                .map(Path::to_path_buf)
                .unwrap_or_else(|_| finding.location.file.clone());
            finding.location.file = relative;
            finding
        })
        .collect()
}

fn ignored(findings: &[Finding]) -> Vec<(String, usize)> {
    findings
        .iter()
        .filter(|f| f.issue == IssueKind::IgnoredReturnValue)
        .map(|f| (f.message.clone(), f.location.line))
        .collect()
}

fn example(body: &str) -> String {
    format!(
        "package test.foo;\nimport com.google.errorprone.annotations.CheckReturnValue;\nclass Example {{\n{}\n}}\n",
        body
    )
}

// ============================================================================
// Statement positions
// ============================================================================

#[test]
fn test_basic_ignored_call() {
    let source = example(
        "  @CheckReturnValue\n  public int foo() {\n    return 2;\n  }\n  public void bar() {\n    foo();\n  }",
    );
    let findings = analyze(&[
        ("com/google/errorprone/annotations/CheckReturnValue.java", CHECK_RETURN_VALUE),
        ("test/foo/Example.java", &source),
    ]);

    assert_eq!(
        ignored(&findings),
        vec![("The result of 'foo' is not used".to_string(), 9)]
    );
    assert_eq!(
        findings[0].location.file,
        Path::new("test/foo/Example.java")
    );
}

#[test]
fn test_consumed_values_are_not_reported() {
    let source = example(
        r#"
  @CheckReturnValue
  public int foo() { return 2; }
  void take(int value) {}
  int assigned() { int x = foo(); return x; }
  int returned() { return foo(); }
  void argument() { take(foo()); }
  int field = foo();
  boolean condition() { if (foo() > 1) { return true; } return false; }
  java.util.function.IntSupplier supplier() { return () -> foo(); }"#,
    );
    let findings = analyze(&[("test/foo/Example.java", &source)]);

    assert!(ignored(&findings).is_empty(), "{:?}", ignored(&findings));
}

#[test]
fn test_discarded_in_nested_statements() {
    let source = example(
        r#"
  @CheckReturnValue
  public int foo() { return 2; }
  void loops(boolean flag) {
    if (flag) {
      foo();
    }
    for (int i = 0; i < 3; i++) foo();
    try {
      foo();
    } finally {
      int ok = foo();
    }
  }"#,
    );
    let findings = analyze(&[("test/foo/Example.java", &source)]);

    let lines: Vec<usize> = ignored(&findings).into_iter().map(|(_, line)| line).collect();
    // a braceless loop body counts as consumed by the loop
    assert_eq!(lines, vec![9, 13]);
}

#[test]
fn test_constructor_and_initializer_bodies() {
    let source = example(
        r#"
  @CheckReturnValue
  static int foo() { return 2; }
  static { foo(); }
  { foo(); }
  Example() { foo(); }"#,
    );
    let findings = analyze(&[("test/foo/Example.java", &source)]);

    assert_eq!(ignored(&findings).len(), 3);
}

#[test]
fn test_chained_calls() {
    let source = r#"
package test.foo;
import javax.annotation.CheckReturnValue;
class Builder {
  @CheckReturnValue
  Builder name(String name) { return this; }
  Builder size(int size) { return this; }
  void build() {
    name("a").size(1);
    size(1).name("b");
    Builder kept = size(2).name("c");
  }
}
"#;
    let findings = analyze(&[("test/foo/Builder.java", source)]);

    assert_eq!(
        ignored(&findings),
        vec![("The result of 'name' is not used".to_string(), 10)]
    );
}

// ============================================================================
// Scopes and exemptions
// ============================================================================

#[test]
fn test_suggested_alternative() {
    let source = example(
        "  @CheckReturnValue(suggest = \"#bar\")\n  public int foo() { return 2; }\n  public void run() { foo(); }",
    );
    let findings = analyze(&[("test/foo/Example.java", &source)]);

    assert_eq!(findings.len(), 1);
    assert_eq!(
        findings[0].message,
        "The result of 'foo' is not used; did you mean to call 'bar' instead?"
    );
    assert_eq!(findings[0].fix.as_deref(), Some("bar"));
}

#[test]
fn test_exemption_on_enclosing_class() {
    let source = r#"
package test.foo;
import com.google.errorprone.annotations.CanIgnoreReturnValue;
import com.google.errorprone.annotations.CheckReturnValue;
@CanIgnoreReturnValue
class Example {
  @CheckReturnValue
  public int foo() { return 2; }

  public void bar() {
    foo();
  }
}
"#;
    assert!(ignored(&analyze(&[("test/foo/Example.java", source)])).is_empty());
}

#[test]
fn test_exemption_on_calling_method() {
    let source = r#"
package test.foo;
import com.google.errorprone.annotations.CanIgnoreReturnValue;
import com.google.errorprone.annotations.CheckReturnValue;
class Example {
  @CheckReturnValue
  public int foo() { return 2; }

  @CanIgnoreReturnValue
  public int bar() {
    foo();
    return 1;
  }

  public void baz() {
    foo();
  }
}
"#;
    let findings = analyze(&[("test/foo/Example.java", source)]);
    let lines: Vec<usize> = ignored(&findings).into_iter().map(|(_, line)| line).collect();
    assert_eq!(lines, vec![16]);
}

#[test]
fn test_exemption_on_package() {
    let package_info = "@com.google.errorprone.annotations.CanIgnoreReturnValue\npackage test.lib;\n";
    let source = r#"
package test.lib;
import com.google.errorprone.annotations.CheckReturnValue;
class Example {
  @CheckReturnValue
  public int foo() { return 2; }

  public void bar() {
    foo();
  }
}
"#;
    let findings = analyze(&[
        ("test/lib/package-info.java", package_info),
        ("test/lib/Example.java", source),
    ]);
    assert!(ignored(&findings).is_empty());
}

#[test]
fn test_custom_exemption_annotation_by_simple_name() {
    let exemption = "package foo.bar;\npublic @interface CanIgnoreReturnValue {}\n";
    let source = r#"
package test;
import foo.bar.CanIgnoreReturnValue;
@io.reactivex.annotations.OptionalCheckReturnValue
public class TestCustomCanIgnoreReturnValueAnnotation {
  @CanIgnoreReturnValue
  public String ignored() {
    return null;
  }
  public String checked() {
    return null;
  }
  public void doIt() {
    ignored();
    checked();
  }
}
"#;
    let mut config = Config::default();
    config.profile = RuleProfile::Optional;
    let findings = analyze_with(
        &config,
        &ProjectProperties::default(),
        &[
            ("foo/bar/CanIgnoreReturnValue.java", exemption),
            ("test/TestCustomCanIgnoreReturnValueAnnotation.java", source),
        ],
    );

    assert_eq!(
        ignored(&findings),
        vec![("The result of 'checked' is not used".to_string(), 15)]
    );
}

#[test]
fn test_class_marker_with_exempt_method() {
    let api = r#"
package test.api;
import com.google.errorprone.annotations.CanIgnoreReturnValue;
import com.google.errorprone.annotations.CheckReturnValue;
@CheckReturnValue
public class Api {
  public static int required() { return 1; }
  @CanIgnoreReturnValue
  public static int optional() { return 2; }
}
"#;
    let caller = r#"
package test.app;
import test.api.Api;
class Caller {
  void run() {
    Api.required();
    Api.optional();
  }
}
"#;
    let findings = analyze(&[("test/api/Api.java", api), ("test/app/Caller.java", caller)]);

    assert_eq!(
        ignored(&findings),
        vec![("The result of 'required' is not used".to_string(), 6)]
    );
}

#[test]
fn test_marked_package() {
    let package_info = "@javax.annotation.CheckReturnValue\npackage test.pure;\n";
    let source = "package test.pure;\nclass Math {\n  static int twice(int x) { return x * 2; }\n  void run() {\n    twice(2);\n  }\n}\n";
    let findings = analyze(&[
        ("test/pure/package-info.java", package_info),
        ("test/pure/Math.java", source),
    ]);

    assert_eq!(
        ignored(&findings),
        vec![("The result of 'twice' is not used".to_string(), 5)]
    );
}

#[test]
fn test_unrelated_receiver_is_not_resolved() {
    let bag = r#"
package a;
import javax.annotation.CheckReturnValue;
public class Bag {
  @CheckReturnValue
  public boolean add(Object o) { return true; }
}
"#;
    let user = r#"package a;
import java.util.ArrayList;
class User { void run(Bag bag) { ArrayList<String> list = new ArrayList<>(); list.add("x");
    bag.add("y");
  }
}
"#;
    let findings = analyze(&[("a/Bag.java", bag), ("a/User.java", user)]);

    assert_eq!(
        ignored(&findings),
        vec![("The result of 'add' is not used".to_string(), 4)]
    );
}

// ============================================================================
// Configuration driven markers
// ============================================================================

#[test]
fn test_custom_annotation_from_properties() {
    let source = r#"
package test.foo;
import foo.bar.CustomAnnotation;
class Example {
  @CustomAnnotation
  public int foo() { return 2; }
  public void bar() {
    foo();
  }
}
"#;
    let properties =
        ProjectProperties::parse("configurableCheckReturnValue.customAnnotations=foo.bar.CustomAnnotation\n")
            .unwrap();
    let findings = analyze_with(
        &Config::default(),
        &properties,
        &[("test/foo/Example.java", source)],
    );
    assert_eq!(
        ignored(&findings),
        vec![("The result of 'foo' is not used".to_string(), 8)]
    );

    assert!(ignored(&analyze(&[("test/foo/Example.java", source)])).is_empty());
}

#[test]
fn test_excluded_annotation_from_properties() {
    let source = example("  @CheckReturnValue\n  public int foo() { return 2; }\n  public void bar() { foo(); }");
    let properties = ProjectProperties::parse(
        "configurableCheckReturnValue.excludeAnnotations=CheckReturnValue:com.google.errorprone.annotations.CheckReturnValue\n",
    )
    .unwrap();
    let findings = analyze_with(
        &Config::default(),
        &properties,
        &[("test/foo/Example.java", &source)],
    );
    assert!(ignored(&findings).is_empty());
}

#[test]
fn test_excluding_one_qualified_default() {
    let source = r#"
package test.foo;
import javax.annotation.CheckReturnValue;
class Example {
  @CheckReturnValue
  public int foo() { return 2; }
  @com.google.errorprone.annotations.CheckReturnValue
  public int bar() { return 3; }
  public void run() {
    foo();
    bar();
  }
}
"#;
    let properties = ProjectProperties::parse(
        "configurableCheckReturnValue.excludeAnnotations=javax.annotation.CheckReturnValue\n",
    )
    .unwrap();
    let findings = analyze_with(
        &Config::default(),
        &properties,
        &[("test/foo/Example.java", source)],
    );

    assert_eq!(
        ignored(&findings),
        vec![("The result of 'bar' is not used".to_string(), 11)]
    );
}

// ============================================================================
// Declaration validation
// ============================================================================

#[test]
fn test_misuse_findings() {
    let source = r#"
package test.foo;
import com.google.errorprone.annotations.CanIgnoreReturnValue;
import com.google.errorprone.annotations.CheckReturnValue;
class Example {
  @CheckReturnValue
  @CanIgnoreReturnValue
  public int both() { return 1; }

  @CheckReturnValue
  public void nothing() {}
}
"#;
    let findings = analyze(&[("test/foo/Example.java", source)]);
    let misuse: Vec<(IssueKind, &str)> = findings
        .iter()
        .filter(|f| f.issue != IssueKind::IgnoredReturnValue)
        .map(|f| (f.issue, f.message.as_str()))
        .collect();

    assert_eq!(
        misuse,
        vec![
            (
                IssueKind::ConflictingAnnotations,
                "@CheckReturnValue and @CanIgnoreReturnValue cannot both be applied to the same method"
            ),
            (
                IssueKind::AnnotationOnVoidMethod,
                "@CheckReturnValue may not be applied to void-returning methods"
            ),
        ]
    );
}
