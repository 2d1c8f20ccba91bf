use super::detectors::{AnnotationMisuseDetector, CheckReturnValueDetector, Detector};
use super::{sort_findings, AnnotationPolicy, ExplanationTable, Finding};
use crate::config::{Config, ProjectProperties};
use crate::index::ProjectIndex;
use tracing::{debug, info};

/// Runs the detectors enabled by a configuration over a project index
pub struct Analyzer {
    detectors: Vec<Box<dyn Detector>>,
}

impl Analyzer {
    pub fn from_config(config: &Config, properties: &ProjectProperties) -> Self {
        let markers = config.marker_set(properties);
        debug!(
            "Effective markers: {} (exemption: {})",
            markers.markers().join(", "),
            markers.exemption()
        );

        let mut explanations = ExplanationTable::default();
        explanations.extend(&config.explanations);

        let mut detectors: Vec<Box<dyn Detector>> = Vec::new();
        if config.checks.ignored_return {
            detectors.push(Box::new(CheckReturnValueDetector::new(AnnotationPolicy::new(
                markers.clone(),
                explanations,
            ))));
        }
        if config.checks.misuse {
            detectors.push(Box::new(AnnotationMisuseDetector::new(markers)));
        }

        Self { detectors }
    }

    pub fn analyze(&self, index: &ProjectIndex) -> Vec<Finding> {
        info!("Running {} detectors...", self.detectors.len());

        let mut findings: Vec<Finding> = self
            .detectors
            .iter()
            .flat_map(|detector| detector.detect(index))
            .collect();

        sort_findings(&mut findings);
        findings
    }
}
