//! Hierarchy resolution.
//!
//! Dereferences a match's own class and every ancestor in its hierarchy into
//! class details. Each lookup is independent and attempted exactly once; a
//! failed lookup becomes [`ClassLookup::Unresolved`] and never affects the
//! primary class or sibling ancestors.

use tracing::warn;

use bioann_client::AnnotationService;
use bioann_model::{AnnotationMatch, ClassLookup, ClassRef, ResolvedAncestor, ResolvedMatch};

/// Resolves matched classes and their ancestry through an [`AnnotationService`].
pub struct HierarchyResolver<'a, S: ?Sized> {
    service: &'a S,
}

impl<'a, S: AnnotationService + ?Sized> HierarchyResolver<'a, S> {
    pub fn new(service: &'a S) -> Self {
        Self { service }
    }

    /// Resolve the primary class, then each hierarchy entry in response order.
    pub fn resolve_match(&self, annotation: &AnnotationMatch) -> ResolvedMatch {
        let primary = self.lookup(&annotation.annotated_class);
        let ancestry = annotation
            .hierarchy
            .iter()
            .map(|entry| ResolvedAncestor {
                class_id: entry.annotated_class.id.clone(),
                distance: entry.distance,
                detail: self.lookup(&entry.annotated_class),
            })
            .collect();
        ResolvedMatch { primary, ancestry }
    }

    /// Look up one class reference.
    pub fn lookup(&self, class: &ClassRef) -> ClassLookup {
        let Some(url) = class.self_url() else {
            warn!(class_id = %class.id, "class reference has no links.self");
            return ClassLookup::Unresolved {
                url: None,
                reason: "class reference has no links.self".to_string(),
            };
        };
        match self.service.fetch_class_detail(url) {
            Ok(detail) => ClassLookup::Resolved(detail),
            Err(error) => {
                warn!(class_id = %class.id, url, %error, "class lookup failed");
                ClassLookup::Unresolved {
                    url: Some(url.to_string()),
                    reason: error.to_string(),
                }
            }
        }
    }
}
