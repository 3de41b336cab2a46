//! Metabolomics Workbench RefMet annotator for metabolites.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use tracing::{info, warn};

use crate::entity::{Dataset, Entity};
use crate::error::Result;
use crate::services::{RefMetRecord, RefMetService, WorkbenchConfig};

use super::annotator::{AnnotationRequest, Annotator};
use super::assigned::{AssignedIds, IdMetadata};
use super::breaker::CircuitBreaker;

/// Provenance key of this annotator.
pub const WORKBENCH_SLUG: &str = "metabolomics-workbench";

/// Looks up metabolite names in RefMet.
///
/// Identifiers are recorded under their RefMet field names (`refmet_id`,
/// `pubchem_cid`, `inchi_key`, `smiles`); the normalizer maps those names
/// to vocabularies. Lookup faults trip a circuit breaker: while it is open,
/// lookups are skipped and the entity gets an empty annotation.
pub struct WorkbenchAnnotator {
    service: Arc<dyn RefMetService>,
    breaker: CircuitBreaker,
}

impl WorkbenchAnnotator {
    /// Create an annotator with the default breaker settings.
    pub fn new(service: Arc<dyn RefMetService>) -> Self {
        Self::with_config(service, &WorkbenchConfig::default())
    }

    /// Create an annotator with the breaker settings from `config`.
    pub fn with_config(service: Arc<dyn RefMetService>, config: &WorkbenchConfig) -> Self {
        Self {
            service,
            breaker: CircuitBreaker::new(WORKBENCH_SLUG, config.failure_threshold, config.cooldown),
        }
    }

    /// Whether lookups are currently being skipped.
    pub fn is_tripped(&self) -> bool {
        self.breaker.is_open()
    }

    /// Look up a name, treating faults as "no data".
    fn fetch(&self, name: &str) -> Option<RefMetRecord> {
        if !self.breaker.allow() {
            warn!("Skipping RefMet lookup for '{}': service is unavailable", name);
            return None;
        }
        match self.service.lookup(name) {
            Ok(record) => {
                self.breaker.record_success();
                record
            }
            Err(e) => {
                warn!("RefMet lookup for '{}' failed: {}", name, e);
                self.breaker.record_failure();
                None
            }
        }
    }

    fn annotations_from(&self, record: Option<&RefMetRecord>) -> AssignedIds {
        let mut assigned = AssignedIds::new();
        assigned.touch_source(WORKBENCH_SLUG);
        if let Some(record) = record {
            for (field, local_id) in record.identifiers() {
                assigned.insert(WORKBENCH_SLUG, field, local_id, IdMetadata::new());
            }
        }
        assigned
    }
}

impl Annotator for WorkbenchAnnotator {
    fn slug(&self) -> &str {
        WORKBENCH_SLUG
    }

    fn get_annotations(&self, entity: &Entity, request: &AnnotationRequest) -> Result<AssignedIds> {
        let Some(name) = entity.text(&request.name_field) else {
            return Ok(AssignedIds::new());
        };
        Ok(self.annotations_from(self.fetch(name).as_ref()))
    }

    fn get_annotations_bulk(
        &self,
        dataset: &Dataset,
        request: &AnnotationRequest,
    ) -> Result<Vec<AssignedIds>> {
        let names: BTreeSet<&str> = dataset
            .iter()
            .filter_map(|entity| entity.text(&request.name_field))
            .collect();

        info!("Fetching RefMet data for {} unique metabolite names", names.len());
        let records: BTreeMap<&str, Option<RefMetRecord>> =
            names.into_iter().map(|name| (name, self.fetch(name))).collect();

        Ok(dataset
            .iter()
            .map(|entity| match entity.text(&request.name_field) {
                Some(name) => self.annotations_from(records.get(name).and_then(Option::as_ref)),
                None => AssignedIds::new(),
            })
            .collect())
    }
}
