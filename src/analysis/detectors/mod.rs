// Detectors run over the whole project index

mod annotation_misuse;
mod check_return;

pub use annotation_misuse::AnnotationMisuseDetector;
pub use check_return::CheckReturnValueDetector;

use crate::analysis::Finding;
use crate::index::ProjectIndex;

/// Trait for project-wide detectors
pub trait Detector {
    /// Run the detector on the index and return found issues
    fn detect(&self, index: &ProjectIndex) -> Vec<Finding>;
}
