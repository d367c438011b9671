pub mod annotation;
pub mod report;

pub use annotation::{Annotation, AnnotationLevel};
pub use report::{Conclusion, ConclusionPolicy, DiagnosticReport};
