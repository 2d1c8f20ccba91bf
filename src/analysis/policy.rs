//! Decides whether a discarded result is reported and builds the message

use crate::config::{ExplanationEntry, MarkerSet};
use crate::index::Annotation;
use std::collections::HashMap;

const ATTR_SUGGEST: &str = "suggest";

const RECT_INTERSECT_EXPLANATION: &str = "If the rectangles do not intersect, no change is made and the \
original rectangle is not modified. These methods return false to indicate that this has happened.";

/// Annotations visible at a call site: enclosing member, enclosing classes, package or file
#[derive(Debug, Clone, Default)]
pub struct ScopeAnnotations<'a> {
    pub member: Vec<&'a Annotation>,
    pub class: Vec<&'a Annotation>,
    pub package: Vec<&'a Annotation>,
}

impl<'a> ScopeAnnotations<'a> {
    pub fn all(&self) -> impl Iterator<Item = &'a Annotation> + '_ {
        self.member
            .iter()
            .chain(self.class.iter())
            .chain(self.package.iter())
            .copied()
    }
}

/// The invoked declaration as far as messages are concerned
#[derive(Debug, Clone, Copy)]
pub struct CallTarget<'a> {
    /// Simple name of the called method
    pub name: &'a str,
    /// Qualified name of the declaring type, when known
    pub owner: Option<&'a str>,
}

/// Extra explanations keyed by (qualified owner type, method name)
#[derive(Debug, Clone)]
pub struct ExplanationTable {
    entries: HashMap<(String, String), String>,
}

impl ExplanationTable {
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    pub fn insert(&mut self, owner: &str, method: &str, text: &str) {
        self.entries
            .insert((owner.to_string(), method.to_string()), text.to_string());
    }

    pub fn extend<'e>(&mut self, entries: impl IntoIterator<Item = &'e ExplanationEntry>) {
        for entry in entries {
            self.insert(&entry.owner, &entry.method, &entry.text);
        }
    }

    pub fn lookup(&self, owner: &str, method: &str) -> Option<&str> {
        self.entries
            .get(&(owner.to_string(), method.to_string()))
            .map(String::as_str)
    }
}

impl Default for ExplanationTable {
    fn default() -> Self {
        let mut table = Self::empty();
        table.insert("android.graphics.Rect", "intersect", RECT_INTERSECT_EXPLANATION);
        table
    }
}

/// A discarded result that should be reported
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnValueReport {
    pub method: String,
    pub suggestion: Option<String>,
    pub explanation: Option<String>,
}

impl ReturnValueReport {
    pub fn message(&self) -> String {
        let message = match &self.suggestion {
            Some(alternative) => format!(
                "The result of '{}' is not used; did you mean to call '{}' instead?",
                self.method, alternative
            ),
            None => format!("The result of '{}' is not used", self.method),
        };

        match &self.explanation {
            Some(explanation) => format!("{}. {}", message, explanation),
            None => message,
        }
    }
}

/// Marker/exemption policy for the ignored-return rule
#[derive(Debug, Clone, Default)]
pub struct AnnotationPolicy {
    markers: MarkerSet,
    explanations: ExplanationTable,
}

impl AnnotationPolicy {
    pub fn new(markers: MarkerSet, explanations: ExplanationTable) -> Self {
        Self {
            markers,
            explanations,
        }
    }

    pub fn markers(&self) -> &MarkerSet {
        &self.markers
    }

    /// `marker` is the annotation applied to the call target
    pub fn should_report(
        &self,
        target: CallTarget<'_>,
        marker: &Annotation,
        scopes: &ScopeAnnotations<'_>,
        discarded: bool,
    ) -> Option<ReturnValueReport> {
        if self.markers.is_exemption(marker) {
            return None;
        }
        if scopes.all().any(|annotation| self.markers.is_exemption(annotation)) {
            return None;
        }
        if !discarded {
            return None;
        }

        let suggestion = marker
            .attribute(ATTR_SUGGEST)
            .map(|value| value.trim_start_matches('#').to_string())
            .filter(|value| !value.is_empty());

        let explanation = match suggestion {
            Some(_) => None,
            None => target
                .owner
                .and_then(|owner| self.explanations.lookup(owner, target.name))
                .map(str::to_string),
        };

        Some(ReturnValueReport {
            method: target.name.to_string(),
            suggestion,
            explanation,
        })
    }
}
