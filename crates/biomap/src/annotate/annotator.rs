//! The annotator contract.

use serde::{Deserialize, Serialize};

use crate::entity::{Dataset, Entity};
use crate::error::Result;

use super::assigned::AssignedIds;

/// What an annotator is asked to look up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationRequest {
    /// Field holding the entity name.
    pub name_field: String,
    /// Standardized category (`biolink:SmallMolecule`).
    pub category: String,
    /// Curie prefixes results are restricted to, if any.
    pub prefixes: Option<Vec<String>>,
}

impl AnnotationRequest {
    /// Create a request with no prefix restriction.
    pub fn new(name_field: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            name_field: name_field.into(),
            category: category.into(),
            prefixes: None,
        }
    }

    /// Restrict results to the given curie prefixes.
    pub fn with_prefixes(mut self, prefixes: Option<Vec<String>>) -> Self {
        self.prefixes = prefixes;
        self
    }
}

/// A source that proposes identifiers for an entity given its name.
///
/// Results are keyed by [`slug`](Self::slug) in [`AssignedIds`]. The bulk
/// method must return one result per row, in row order, equal to what
/// [`get_annotations`](Self::get_annotations) returns for that row.
pub trait Annotator: Send + Sync {
    /// Stable provenance key.
    fn slug(&self) -> &str;

    /// Prepare an entity before annotation.
    ///
    /// The default is an unchanged copy. Implementations use this to hide
    /// provided identifiers so the lookup cannot see the expected answer.
    fn prepare(&self, entity: &Entity, provided_id_fields: &[String]) -> Entity {
        let _ = provided_id_fields;
        entity.clone()
    }

    /// Prepare every row of a dataset.
    fn prepare_dataset(&self, dataset: &Dataset, provided_id_fields: &[String]) -> Dataset {
        Dataset::new(
            dataset
                .iter()
                .map(|entity| self.prepare(entity, provided_id_fields))
                .collect(),
        )
    }

    /// Annotate one entity.
    fn get_annotations(&self, entity: &Entity, request: &AnnotationRequest) -> Result<AssignedIds>;

    /// Annotate every row of a dataset.
    ///
    /// The default calls [`get_annotations`](Self::get_annotations) per row;
    /// implementations override it to batch their lookups.
    fn get_annotations_bulk(
        &self,
        dataset: &Dataset,
        request: &AnnotationRequest,
    ) -> Result<Vec<AssignedIds>> {
        dataset
            .iter()
            .map(|entity| self.get_annotations(entity, request))
            .collect()
    }
}
