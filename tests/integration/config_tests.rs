//! Configuration tests
//!
//! Config files, `gradle.properties` and how they combine into the effective
//! marker set.

use checkreturnvalue::config::{
    Config, ProjectProperties, RuleProfile, CAN_IGNORE_RETURN_VALUE, DEFAULT_MARKERS,
    OPTIONAL_CHECK_RETURN_VALUE, PROPERTY_FILE,
};
use checkreturnvalue::index::Annotation;
use std::fs;
use tempfile::TempDir;

fn annotation(qualified: &str) -> Annotation {
    let simple = qualified.rsplit('.').next().unwrap_or(qualified);
    Annotation::new(simple, qualified)
}

// ============================================================================
// Config files
// ============================================================================

#[test]
fn test_yaml_config() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join(".checkreturnvalue.yml");
    fs::write(
        &path,
        r#"
profile: optional
annotations:
  custom:
    - com.example.MustUse
  exemption: com.example.MayIgnore
explanations:
  - owner: com.example.Cache
    method: evict
    text: Eviction may be refused
checks:
  misuse: false
report:
  format: sarif
"#,
    )
    .unwrap();

    let config = Config::from_default_locations(temp.path()).unwrap();
    assert_eq!(config.profile, RuleProfile::Optional);
    assert_eq!(config.annotations.custom, vec!["com.example.MustUse"]);
    assert_eq!(config.annotations.exemption, "com.example.MayIgnore");
    assert_eq!(config.explanations.len(), 1);
    assert_eq!(config.explanations[0].method, "evict");
    assert!(config.checks.ignored_return);
    assert!(!config.checks.misuse);
    assert_eq!(config.report.format, "sarif");

    let markers = config.marker_set(&ProjectProperties::default());
    assert_eq!(
        markers.markers(),
        &[
            OPTIONAL_CHECK_RETURN_VALUE.to_string(),
            "com.example.MustUse".to_string()
        ]
    );
    assert!(markers.is_exemption(&annotation("com.example.MayIgnore")));
}

#[test]
fn test_toml_config() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("checkreturnvalue.toml");
    fs::write(
        &path,
        r#"
exclude = ["**/legacy/**"]

[annotations]
exclude = ["CheckReturnValue"]
"#,
    )
    .unwrap();

    let config = Config::from_file(&path).unwrap();
    assert_eq!(config.profile, RuleProfile::Configurable);
    assert_eq!(config.annotations.exemption, CAN_IGNORE_RETURN_VALUE);
    assert!(config.should_exclude(std::path::Path::new("app/legacy/Old.java")));

    let markers = config.marker_set(&ProjectProperties::default());
    assert_eq!(markers.markers().len(), DEFAULT_MARKERS.len() - 1);
    assert!(!markers.is_marker(&annotation("com.example.CheckReturnValue")));
    assert!(!markers.is_marker(&annotation("javax.annotation.CheckReturnValue")));
    assert!(markers.is_marker(&annotation("androidx.annotation.CheckResult")));
}

#[test]
fn test_invalid_config_file_is_an_error() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("broken.toml");
    fs::write(&path, "profile = [unterminated").unwrap();

    assert!(Config::from_file(&path).is_err());
}

#[test]
fn test_missing_config_uses_defaults() {
    let temp = TempDir::new().unwrap();
    let config = Config::from_default_locations(temp.path()).unwrap();

    assert!(config.targets.is_empty());
    assert!(config.checks.ignored_return && config.checks.misuse);
    assert_eq!(config.report.format, "terminal");
}

// ============================================================================
// gradle.properties
// ============================================================================

#[test]
fn test_properties_file_extends_markers() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join(PROPERTY_FILE);
    fs::write(
        &path,
        "org.gradle.jvmargs=-Xmx2g\n\
         configurableCheckReturnValue.customAnnotations=foo.bar.CustomAnnotation:Pure\n\
         configurableCheckReturnValue.excludeAnnotations=javax.annotation.CheckReturnValue\n",
    )
    .unwrap();

    let properties = ProjectProperties::load_or_default(&path);
    let markers = Config::default().marker_set(&properties);

    assert!(markers.is_marker(&annotation("foo.bar.CustomAnnotation")));
    assert!(markers.is_marker(&annotation("any.where.Pure")));
    assert!(!markers.is_marker(&annotation("foo.baz.CustomAnnotation")));
    assert!(markers
        .markers()
        .iter()
        .all(|m| m != "javax.annotation.CheckReturnValue"));
}

#[test]
fn test_malformed_properties_fall_back_to_defaults() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join(PROPERTY_FILE);
    fs::write(
        &path,
        "configurableCheckReturnValue.customAnnotations=foo.Bar\nbroken=\\u12\n",
    )
    .unwrap();

    let properties = ProjectProperties::load_or_default(&path);
    assert!(properties.is_empty());

    let markers = Config::default().marker_set(&properties);
    assert_eq!(markers.markers().len(), DEFAULT_MARKERS.len());
}

#[test]
fn test_exemption_cannot_become_a_marker() {
    let properties = ProjectProperties::parse(&format!(
        "configurableCheckReturnValue.customAnnotations={}:CanIgnoreReturnValue\n",
        CAN_IGNORE_RETURN_VALUE
    ))
    .unwrap();
    let markers = Config::default().marker_set(&properties);
    let exemption = annotation(CAN_IGNORE_RETURN_VALUE);

    assert!(!markers.is_marker(&exemption));
    assert!(markers.is_exemption(&exemption));
}
