pub mod annotation;
pub mod class;
pub mod error;
pub mod flat;

pub use annotation::{AnnotationMatch, ClassLinks, ClassRef, HierarchyEntry, SpanMatch};
pub use class::{ClassDetail, ClassLookup};
pub use error::{Result, ServiceError};
pub use flat::{
    AnnotatedText, AnnotationLine, FlatAnnotationRow, LineMatch, LineStatus, ResolvedAncestor,
    ResolvedMatch,
};
