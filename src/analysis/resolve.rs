//! Structural resolution of call sites to declared methods
//!
//! No type information is available, so a call is matched by simple name and
//! arity, then narrowed by what the receiver says about the declaring class.
//! A call is treated as marked only when every remaining candidate is.

use super::policy::ScopeAnnotations;
use crate::config::MarkerSet;
use crate::index::{Annotation, CallSite, ClassDecl, MethodDecl, MethodRef, ProjectIndex, Receiver};
use tracing::trace;

/// Marker that applies to a declaration and where it came from
#[derive(Debug, Clone, Copy)]
pub struct ResolvedTarget<'a> {
    pub method: MethodRef,
    pub decl: &'a MethodDecl,
    /// Declaring class shared by every candidate; `None` for top-level
    /// functions or overloads declared on different classes
    pub owner: Option<&'a ClassDecl>,
    pub marker: &'a Annotation,
}

/// What one scope level says about the return value
enum ScopeVerdict<'a> {
    Exempt,
    Marked(&'a Annotation),
    Silent,
}

pub struct CallResolver<'a> {
    index: &'a ProjectIndex,
    markers: &'a MarkerSet,
}

impl<'a> CallResolver<'a> {
    pub fn new(index: &'a ProjectIndex, markers: &'a MarkerSet) -> Self {
        Self { index, markers }
    }

    /// Declared methods a call site may invoke
    pub fn candidates(&self, unit_index: usize, call: &CallSite) -> Vec<MethodRef> {
        let matching: Vec<MethodRef> = self
            .index
            .methods_named(&call.name)
            .iter()
            .copied()
            .filter(|method| {
                let decl = self.index.method(*method);
                !decl.is_constructor && decl.accepts_arity(call.arity)
            })
            .collect();

        if matching.is_empty() {
            return matching;
        }

        match &call.receiver {
            Receiver::Implicit | Receiver::This => {
                let unit = self.index.unit(unit_index);
                let enclosing = unit.enclosing_classes(call.node);
                let members = self.filtered(&matching, |method, decl| {
                    method.unit == unit_index
                        && decl.owner.map(|owner| enclosing.contains(&owner)).unwrap_or(false)
                });
                if !members.is_empty() {
                    return members;
                }

                let top_level = self.filtered(&matching, |_, decl| decl.owner.is_none());
                if top_level.is_empty() {
                    matching
                } else {
                    top_level
                }
            }
            Receiver::Named(name) => match self.receiver_type(call, name) {
                // a known receiver type rules out every method it does not declare
                Some(receiver_type) => {
                    self.filtered(&matching, |method, _| self.declared_on(method, receiver_type))
                }
                None => {
                    let owned = self.filtered(&matching, |method, _| {
                        self.index
                            .owner_chain(method)
                            .next()
                            .map(|class| &class.name == name)
                            .unwrap_or(false)
                    });
                    if owned.is_empty() {
                        matching
                    } else {
                        owned
                    }
                }
            },
            Receiver::Expression => matching,
        }
    }

    fn filtered(&self, methods: &[MethodRef], keep: impl Fn(MethodRef, &MethodDecl) -> bool) -> Vec<MethodRef> {
        methods
            .iter()
            .copied()
            .filter(|method| keep(*method, self.index.method(*method)))
            .collect()
    }

    /// Type a named receiver stands for: the declared type of the variable,
    /// or the name itself when it names a class
    fn receiver_type<'c>(&self, call: &'c CallSite, name: &'c str) -> Option<&'c str> {
        call.receiver_type.as_deref().or_else(|| {
            let names_class = self.index.declares_class(name)
                || name.chars().next().map(char::is_uppercase).unwrap_or(false);
            names_class.then_some(name)
        })
    }

    /// Whether `method` is a member of `type_name` (or an enclosing class of a
    /// member, for companions) or an extension on it
    fn declared_on(&self, method: MethodRef, type_name: &str) -> bool {
        let decl = self.index.method(method);
        match decl.owner {
            Some(_) => self
                .index
                .owner_chain(method)
                .any(|class| class.name == type_name),
            None => decl.extension_of.as_deref() == Some(type_name),
        }
    }

    /// Marker in effect for a method, searching the method, its classes
    /// (innermost first) and then its package. An exemption stops the search.
    pub fn applied_marker(&self, method: MethodRef) -> Option<&'a Annotation> {
        let index = self.index;
        let decl = index.method(method);

        match self.verdict(decl.annotations.iter()) {
            ScopeVerdict::Exempt => return None,
            ScopeVerdict::Marked(marker) => return Some(marker),
            ScopeVerdict::Silent => {}
        }

        for class in index.owner_chain(method) {
            match self.verdict(class.annotations.iter()) {
                ScopeVerdict::Exempt => return None,
                ScopeVerdict::Marked(marker) => return Some(marker),
                ScopeVerdict::Silent => {}
            }
        }

        let unit = index.unit(method.unit);
        let package = index
            .package_annotations(unit.package.as_deref())
            .iter()
            .chain(unit.file_annotations.iter());
        match self.verdict(package) {
            ScopeVerdict::Marked(marker) => Some(marker),
            _ => None,
        }
    }

    fn verdict(&self, annotations: impl Iterator<Item = &'a Annotation>) -> ScopeVerdict<'a> {
        let mut marker = None;
        for annotation in annotations {
            if self.markers.is_exemption(annotation) {
                return ScopeVerdict::Exempt;
            }
            if marker.is_none() && self.markers.is_marker(annotation) {
                marker = Some(annotation);
            }
        }
        marker.map_or(ScopeVerdict::Silent, ScopeVerdict::Marked)
    }

    /// Resolve a call to a marked target, if every candidate is marked
    pub fn resolve(&self, unit_index: usize, call: &CallSite) -> Option<ResolvedTarget<'a>> {
        let candidates = self.candidates(unit_index, call);
        let first = *candidates.first()?;

        let mut markers = candidates.iter().map(|method| self.applied_marker(*method));
        let marker = markers.next().flatten()?;
        if markers.any(|other| other.is_none()) {
            trace!(
                "'{}' at {} has unmarked overloads, skipping",
                call.name,
                call.location
            );
            return None;
        }

        // overloads on different classes leave the owner open
        let owner = self.index.owner_chain(first).next();
        let shared_owner = candidates.iter().all(|method| {
            let other = self.index.owner_chain(*method).next();
            other.map(|class| &class.qualified_name) == owner.map(|class| &class.qualified_name)
        });

        Some(ResolvedTarget {
            method: first,
            decl: self.index.method(first),
            owner: if shared_owner { owner } else { None },
            marker,
        })
    }

    /// Annotations visible at the call site itself
    pub fn scope_annotations(&self, unit_index: usize, call: &CallSite) -> ScopeAnnotations<'a> {
        let unit = self.index.unit(unit_index);

        let member = unit
            .enclosing_method(call.node)
            .map(|method| unit.methods[method].annotations.iter().collect())
            .unwrap_or_default();

        let class = unit
            .enclosing_classes(call.node)
            .into_iter()
            .flat_map(|class| unit.classes[class].annotations.iter())
            .collect();

        let package = self
            .index
            .package_annotations(unit.package.as_deref())
            .iter()
            .chain(unit.file_annotations.iter())
            .collect();

        ScopeAnnotations {
            member,
            class,
            package,
        }
    }
}
