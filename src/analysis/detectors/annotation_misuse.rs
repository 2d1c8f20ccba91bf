//! Annotation Misuse Detector
//!
//! Validates where markers and the exemption are declared:
//! - a method or class carrying both a marker and the exemption
//! - a marker or exemption on a method that returns nothing

use super::Detector;
use crate::analysis::{sort_findings, Finding, IssueKind};
use crate::config::MarkerSet;
use crate::index::{short_name, Annotation, Location, ProjectIndex};
use rayon::prelude::*;
use tracing::debug;

pub struct AnnotationMisuseDetector {
    markers: MarkerSet,
}

impl AnnotationMisuseDetector {
    pub fn new(markers: MarkerSet) -> Self {
        Self { markers }
    }

    fn conflict(&self, marker: &Annotation, kind: &str, name: &str, location: &Location) -> Finding {
        Finding::new(
            IssueKind::ConflictingAnnotations,
            location.clone(),
            name,
            format!(
                "@{} and @{} cannot both be applied to the same {}",
                marker.simple_name(),
                short_name(self.markers.exemption()),
                kind
            ),
        )
    }
}

impl Default for AnnotationMisuseDetector {
    fn default() -> Self {
        Self::new(MarkerSet::default())
    }
}

impl Detector for AnnotationMisuseDetector {
    fn detect(&self, index: &ProjectIndex) -> Vec<Finding> {
        let mut findings: Vec<Finding> = index
            .units()
            .par_iter()
            .flat_map(|unit| {
                let mut found = Vec::new();

                for class in &unit.classes {
                    let marker = self.markers.find_marker(&class.annotations);
                    if let (Some(marker), true) =
                        (marker, self.markers.contains_exemption(&class.annotations))
                    {
                        found.push(self.conflict(marker, "class", &class.name, &class.location));
                    }
                }

                for method in &unit.methods {
                    let marker = self.markers.find_marker(&method.annotations);
                    let exemption = self.markers.find_exemption(&method.annotations);

                    if let (Some(marker), Some(_)) = (marker, exemption) {
                        found.push(self.conflict(marker, "method", &method.name, &method.location));
                    }

                    if method.is_constructor || method.returns_void != Some(true) {
                        continue;
                    }
                    if let Some(annotation) = marker.or(exemption) {
                        found.push(Finding::new(
                            IssueKind::AnnotationOnVoidMethod,
                            method.location.clone(),
                            &method.name,
                            format!(
                                "@{} may not be applied to void-returning methods",
                                annotation.simple_name()
                            ),
                        ));
                    }
                }

                found
            })
            .collect();

        sort_findings(&mut findings);
        debug!("Found {} annotation misuses", findings.len());
        findings
    }
}
