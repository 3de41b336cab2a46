//! Annotation: acquiring extra identifiers from pluggable sources.
//!
//! Every source implements [`Annotator`] and is keyed by a stable slug.
//! The [`AnnotationEngine`] picks sources for an entity category, runs them
//! and merges their output into [`AssignedIds`], which keeps track of which
//! source proposed which identifier.
//!
//! # Built-in annotators
//!
//! - `kestrel-text-search`, `kestrel-vector-search`, `kestrel-hybrid-search`
//!   ([`SearchAnnotator`])
//! - `metabolomics-workbench` ([`WorkbenchAnnotator`]), selected for small
//!   molecules

mod annotator;
mod assigned;
mod breaker;
mod engine;
mod search;
mod workbench;

pub use annotator::{AnnotationRequest, Annotator};
pub use assigned::{AssignedIds, IdMetadata, LocalIds, VocabIds};
pub use breaker::CircuitBreaker;
pub use engine::{AnnotateOptions, AnnotationEngine, AnnotationMode};
pub use search::{HYBRID_MIN_SCORE, SearchAnnotator};
pub use workbench::{WORKBENCH_SLUG, WorkbenchAnnotator};
