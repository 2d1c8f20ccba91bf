mod loader;
mod markers;
mod properties;

pub use loader::{glob_match, AnnotationConfig, ChecksConfig, Config, ExplanationEntry, ReportConfig};
pub use markers::{
    MarkerSet, RuleProfile, CAN_IGNORE_RETURN_VALUE, DEFAULT_MARKERS, OPTIONAL_CHECK_RETURN_VALUE,
};
pub use properties::{
    ProjectProperties, PropertiesError, CUSTOM_ANNOTATIONS_KEY, EXCLUDE_ANNOTATIONS_KEY,
    PROPERTY_FILE,
};
