//! Kotlin rule tests
//!
//! Kotlin treats blocks, `if`, `when`, `try` and lambdas as value producing,
//! so the same call can be consumed or discarded depending on where the
//! enclosing construct sits.

use checkreturnvalue::analysis::{Analyzer, Finding, IssueKind};
use checkreturnvalue::config::{Config, ProjectProperties, RuleProfile};
use checkreturnvalue::discovery::{FileType, SourceFile};
use checkreturnvalue::index::IndexBuilder;

fn analyze(files: &[(&str, &str)]) -> Vec<Finding> {
    analyze_with(&Config::default(), files)
}

fn analyze_with(config: &Config, files: &[(&str, &str)]) -> Vec<Finding> {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let mut builder = IndexBuilder::new();

    for (name, content) in files {
        let path = temp_dir.path().join(name);
        std::fs::write(&path, content).expect("Failed to write file");
        let file_type = FileType::from_path(&path).expect("Unsupported fixture");
        builder
            .process_file(&SourceFile::new(path, file_type))
            .expect("Failed to process file");
    }

    Analyzer::from_config(config, &ProjectProperties::default()).analyze(&builder.build())
}

/// Lines of ignored-return findings
fn reported_lines(findings: &[Finding]) -> Vec<usize> {
    findings
        .iter()
        .filter(|f| f.issue == IssueKind::IgnoredReturnValue)
        .map(|f| f.location.line)
        .collect()
}

const PARSER: &str = r#"import javax.annotation.CheckReturnValue

class Parser {
    @CheckReturnValue
    fun parse(text: String): Int = text.length
}
"#;

// ============================================================================
// Statement and expression positions
// ============================================================================

#[test]
fn test_statement_is_discarded_and_initializer_is_used() {
    let source = r#"fun run(parser: Parser) {
    parser.parse("a")
    val length = parser.parse("b")
    println(parser.parse("c"))
    parser.parse("d")
}
"#;
    let findings = analyze(&[("Parser.kt", PARSER), ("Run.kt", source)]);

    assert_eq!(reported_lines(&findings), vec![2, 5]);
    assert!(findings
        .iter()
        .all(|f| f.message == "The result of 'parse' is not used"));
}

#[test]
fn test_value_producing_constructs() {
    let source = r#"fun asBody(parser: Parser, flag: Boolean) = if (flag) parser.parse("a") else 0

fun asInitializer(parser: Parser, flag: Boolean) {
    val value = if (flag) {
        parser.parse("b")
    } else {
        0
    }
    val caught = try {
        parser.parse("c")
    } catch (e: Exception) {
        -1
    }
    println(value + caught)
}

fun asReturn(parser: Parser, kind: Int): Int {
    return when (kind) {
        1 -> parser.parse("d")
        else -> {
            parser.parse("e")
        }
    }
}

fun asStatement(parser: Parser, flag: Boolean) {
    if (flag) {
        parser.parse("f")
    }
}
"#;
    let findings = analyze(&[("Parser.kt", PARSER), ("Values.kt", source)]);

    assert_eq!(reported_lines(&findings), vec![28]);
}

#[test]
fn test_lambda_bodies() {
    let source = r#"fun lambdas(parser: Parser, items: List<String>) {
    val sizes = items.map { parser.parse(it) }
    items.forEach {
        parser.parse(it)
        println(it)
    }
    val last = items.map {
        println(it)
        parser.parse(it)
    }
}
"#;
    let findings = analyze(&[("Parser.kt", PARSER), ("Lambdas.kt", source)]);

    // every statement of a lambda body counts as consumed
    assert!(reported_lines(&findings).is_empty());
}

#[test]
fn test_chained_calls_judged_on_last_selector() {
    let source = r#"import javax.annotation.CheckReturnValue

class Query {
    @CheckReturnValue
    fun where(clause: String): Query = this
    fun limit(count: Int): Query = this
}

fun build(query: Query) {
    query.where("a").limit(1)
    query.limit(1).where("b")
}
"#;
    let findings = analyze(&[("Query.kt", source)]);

    assert_eq!(reported_lines(&findings), vec![11]);
}

#[test]
fn test_initializers_and_constructors() {
    let source = r#"import javax.annotation.CheckReturnValue

@CheckReturnValue
fun compute(): Int = 1

class Holder(val value: Int) {
    init {
        compute()
    }

    constructor() : this(0) {
        compute()
    }

    val property: Int
        get() {
            compute()
            return 2
        }
}
"#;
    let findings = analyze(&[("Holder.kt", source)]);

    assert_eq!(reported_lines(&findings), vec![8, 12, 17]);
}

// ============================================================================
// Scopes
// ============================================================================

#[test]
fn test_file_level_exemption() {
    let source = r#"@file:com.google.errorprone.annotations.CanIgnoreReturnValue

fun run(parser: Parser) {
    parser.parse("a")
}
"#;
    let findings = analyze(&[("Parser.kt", PARSER), ("Run.kt", source)]);

    assert!(reported_lines(&findings).is_empty());
}

#[test]
fn test_file_level_marker() {
    let source = r#"@file:CheckReturnValue

fun twice(x: Int): Int = x * 2

fun run() {
    twice(2)
}
"#;
    let findings = analyze(&[("Math.kt", source)]);

    assert_eq!(reported_lines(&findings), vec![6]);
}

#[test]
fn test_calls_into_java() {
    let api = r#"import com.google.errorprone.annotations.CanIgnoreReturnValue;
import com.google.errorprone.annotations.CheckReturnValue;

@CheckReturnValue
public class Api {
    public static int required() { return 1; }

    @CanIgnoreReturnValue
    public static int optional() { return 2; }
}
"#;
    let source = r#"fun run() {
    Api.required()
    Api.optional()
}
"#;
    let findings = analyze(&[("Api.java", api), ("Run.kt", source)]);

    assert_eq!(reported_lines(&findings), vec![2]);
    assert_eq!(
        findings[0].location.file.file_name().unwrap().to_string_lossy(),
        "Run.kt"
    );
}

// ============================================================================
// Profiles and misuse
// ============================================================================

#[test]
fn test_optional_profile() {
    let source = r#"import io.reactivex.annotations.OptionalCheckReturnValue
import javax.annotation.CheckReturnValue

class Stream {
    @OptionalCheckReturnValue
    fun subscribe(): Int = 1

    @CheckReturnValue
    fun map(): Stream = this
}

fun run(stream: Stream) {
    stream.subscribe()
    stream.map()
}
"#;
    let mut config = Config::default();
    config.profile = RuleProfile::Optional;
    let findings = analyze_with(&config, &[("Stream.kt", source)]);

    assert_eq!(reported_lines(&findings), vec![13]);

    let findings = analyze(&[("Stream.kt", source)]);
    assert_eq!(reported_lines(&findings), vec![14]);
}

#[test]
fn test_marker_on_unit_function() {
    let source = r#"import javax.annotation.CheckReturnValue

class Logger {
    @CheckReturnValue
    fun log(message: String) {
        println(message)
    }
}
"#;
    let findings = analyze(&[("Logger.kt", source)]);

    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].issue, IssueKind::AnnotationOnVoidMethod);
    assert_eq!(
        findings[0].message,
        "@CheckReturnValue may not be applied to void-returning methods"
    );
}
