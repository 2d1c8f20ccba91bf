//! Ignored Return Value Detector
//!
//! Reports calls to methods whose result must be consumed when the call
//! site throws that result away.
//!
//! ## Detection Algorithm
//!
//! 1. Resolve each call site to the declared methods it may invoke
//! 2. Find the marker in effect for them (method, classes, package)
//! 3. Collect the annotations visible around the call site
//! 4. Ask the usage analysis whether the value is discarded
//! 5. Let the annotation policy decide and word the finding
//!
//! ## Examples Detected
//!
//! ```java
//! @CheckReturnValue
//! BigDecimal add(BigDecimal other) { ... }
//!
//! total.add(tax);               // BAD: the sum is lost
//! total = total.add(tax);       // GOOD
//! ```

use super::Detector;
use crate::analysis::{
    is_value_discarded, sort_findings, AnnotationPolicy, CallResolver, CallTarget, Finding,
};
use crate::index::ProjectIndex;
use crate::parser::ParsedUnit;
use rayon::prelude::*;
use tracing::{debug, trace};

/// Detector for discarded results of marked methods
pub struct CheckReturnValueDetector {
    policy: AnnotationPolicy,
}

impl CheckReturnValueDetector {
    pub fn new(policy: AnnotationPolicy) -> Self {
        Self { policy }
    }

    fn detect_unit(
        &self,
        resolver: &CallResolver<'_>,
        unit_index: usize,
        unit: &ParsedUnit,
    ) -> Vec<Finding> {
        let mut findings = Vec::new();

        for call in &unit.calls {
            let Some(target) = resolver.resolve(unit_index, call) else {
                continue;
            };

            let discarded = is_value_discarded(&unit.tree, call.node);
            trace!(
                "{} -> {} (discarded: {})",
                call.location,
                target.decl.name,
                discarded
            );

            let scopes = resolver.scope_annotations(unit_index, call);
            let call_target = CallTarget {
                name: &target.decl.name,
                owner: target.owner.map(|class| class.qualified_name.as_str()),
            };

            if let Some(report) =
                self.policy
                    .should_report(call_target, target.marker, &scopes, discarded)
            {
                findings.push(Finding::ignored_return(call.location.clone(), &report));
            }
        }

        findings
    }
}

impl Default for CheckReturnValueDetector {
    fn default() -> Self {
        Self::new(AnnotationPolicy::default())
    }
}

impl Detector for CheckReturnValueDetector {
    fn detect(&self, index: &ProjectIndex) -> Vec<Finding> {
        let resolver = CallResolver::new(index, self.policy.markers());

        let mut findings: Vec<Finding> = index
            .units()
            .par_iter()
            .enumerate()
            .flat_map(|(unit_index, unit)| self.detect_unit(&resolver, unit_index, unit))
            .collect();

        sort_findings(&mut findings);
        debug!("Found {} ignored return values", findings.len());
        findings
    }
}
