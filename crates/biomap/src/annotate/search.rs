//! Annotators backed by KG name search.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde_json::json;
use tracing::{debug, info, warn};

use crate::entity::{Dataset, Entity};
use crate::error::Result;
use crate::services::{SearchHit, SearchKind, SearchRequest, SearchResults, SearchService};

use super::annotator::{AnnotationRequest, Annotator};
use super::assigned::{AssignedIds, IdMetadata};

/// Minimum hybrid-search score kept (hybrid scores range 0-5).
pub const HYBRID_MIN_SCORE: f64 = 0.5;

/// Annotates entities with the top hit of a text, vector or hybrid search.
///
/// The hit id `PREFIX:local` is split at the first colon into vocabulary
/// and local id; its score is kept as metadata.
pub struct SearchAnnotator {
    service: Arc<dyn SearchService>,
    kind: SearchKind,
    min_score: Option<f64>,
}

impl SearchAnnotator {
    /// Create an annotator for one search endpoint.
    pub fn new(service: Arc<dyn SearchService>, kind: SearchKind) -> Self {
        let min_score = match kind {
            SearchKind::Hybrid => Some(HYBRID_MIN_SCORE),
            SearchKind::Text | SearchKind::Vector => None,
        };
        Self {
            service,
            kind,
            min_score,
        }
    }

    /// Exact and fuzzy text search.
    pub fn text(service: Arc<dyn SearchService>) -> Self {
        Self::new(service, SearchKind::Text)
    }

    /// Embedding similarity search.
    pub fn vector(service: Arc<dyn SearchService>) -> Self {
        Self::new(service, SearchKind::Vector)
    }

    /// Hybrid search; hits below [`HYBRID_MIN_SCORE`] are dropped.
    pub fn hybrid(service: Arc<dyn SearchService>) -> Self {
        Self::new(service, SearchKind::Hybrid)
    }

    /// Override the minimum score.
    pub fn with_min_score(mut self, min_score: Option<f64>) -> Self {
        self.min_score = min_score;
        self
    }

    /// The search endpoint in use.
    pub fn kind(&self) -> SearchKind {
        self.kind
    }

    fn search(&self, names: Vec<String>, request: &AnnotationRequest) -> Result<SearchResults> {
        let search = SearchRequest::new(self.kind, names)
            .with_limit(1)
            .with_category(request.category.clone())
            .with_prefixes(request.prefixes.clone());
        let mut results = self.service.search(&search)?;

        if let Some(min_score) = self.min_score {
            for hits in results.values_mut() {
                hits.retain(|hit| hit.score >= min_score);
            }
        }
        Ok(results)
    }

    fn annotations_from(&self, hits: Option<&Vec<SearchHit>>) -> AssignedIds {
        let mut assigned = AssignedIds::new();
        assigned.touch_source(self.slug());

        let Some(hit) = hits.and_then(|hits| hits.first()) else {
            return assigned;
        };
        match hit.id.split_once(':') {
            Some((vocab, local_id)) => {
                let mut metadata = IdMetadata::new();
                metadata.insert("score".to_string(), json!(hit.score));
                assigned.insert(self.slug(), vocab, local_id, metadata);
            }
            None => warn!("Search hit '{}' is not a curie. Skipping.", hit.id),
        }
        assigned
    }
}

impl Annotator for SearchAnnotator {
    fn slug(&self) -> &str {
        match self.kind {
            SearchKind::Text => "kestrel-text-search",
            SearchKind::Vector => "kestrel-vector-search",
            SearchKind::Hybrid => "kestrel-hybrid-search",
        }
    }

    fn prepare(&self, entity: &Entity, provided_id_fields: &[String]) -> Entity {
        entity.without_fields(provided_id_fields)
    }

    fn get_annotations(&self, entity: &Entity, request: &AnnotationRequest) -> Result<AssignedIds> {
        let Some(name) = entity.text(&request.name_field) else {
            debug!("Entity has no name in '{}', skipping {}", request.name_field, self.slug());
            return Ok(AssignedIds::new());
        };

        let results = self.search(vec![name.to_string()], request)?;
        Ok(self.annotations_from(results.get(name)))
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

        info!(
            "Getting {} results for {} entities ({} unique names)",
            self.kind,
            dataset.len(),
            names.len()
        );
        let results = if names.is_empty() {
            SearchResults::new()
        } else {
            self.search(names.into_iter().map(str::to_string).collect(), request)?
        };

        Ok(dataset
            .iter()
            .map(|entity| match entity.text(&request.name_field) {
                Some(name) => self.annotations_from(results.get(name)),
                None => AssignedIds::new(),
            })
            .collect())
    }
}
