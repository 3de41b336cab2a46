//! Annotator selection and execution.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::entity::{Dataset, Entity};
use crate::error::{MapperError, Result};
use crate::services::{
    BiolinkTaxonomy, CategoryService, RefMetService, SearchService, WorkbenchConfig,
};

use super::annotator::{AnnotationRequest, Annotator};
use super::assigned::AssignedIds;
use super::search::SearchAnnotator;
use super::workbench::{WORKBENCH_SLUG, WorkbenchAnnotator};

const SMALL_MOLECULE: &str = "biolink:SmallMolecule";

/// Which records get annotated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationMode {
    /// Every record.
    All,
    /// Only records without any provided identifier.
    #[default]
    Missing,
    /// No record.
    None,
}

impl FromStr for AnnotationMode {
    type Err = MapperError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "all" => Ok(AnnotationMode::All),
            "missing" => Ok(AnnotationMode::Missing),
            "none" => Ok(AnnotationMode::None),
            other => Err(MapperError::InvalidMode(other.to_string())),
        }
    }
}

impl fmt::Display for AnnotationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AnnotationMode::All => "all",
            AnnotationMode::Missing => "missing",
            AnnotationMode::None => "none",
        };
        f.write_str(s)
    }
}

/// Options for one annotation run.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotateOptions {
    /// Field holding the entity name.
    pub name_field: String,
    /// Fields holding caller-provided identifiers.
    pub provided_id_fields: Vec<String>,
    /// Standardized category of the entities.
    pub category: String,
    /// Which records to annotate.
    pub mode: AnnotationMode,
    /// Pinned annotator slugs; `None` selects automatically.
    pub annotators: Option<Vec<String>>,
    /// Curie prefixes annotators are restricted to.
    pub prefixes: Option<Vec<String>>,
}

impl AnnotateOptions {
    /// Options with automatic selection and `missing` mode.
    pub fn new(name_field: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            name_field: name_field.into(),
            provided_id_fields: Vec::new(),
            category: category.into(),
            mode: AnnotationMode::default(),
            annotators: None,
            prefixes: None,
        }
    }

    fn request(&self) -> AnnotationRequest {
        AnnotationRequest::new(self.name_field.clone(), self.category.clone())
            .with_prefixes(self.prefixes.clone())
    }
}

/// Selects annotators for a category and merges their results.
///
/// Automatic selection adds the Metabolomics Workbench annotator for
/// anything that is-a small molecule, then appends the fallback search
/// annotator.
pub struct AnnotationEngine {
    annotators: IndexMap<String, Arc<dyn Annotator>>,
    taxonomy: Arc<dyn CategoryService>,
    fallback: Option<String>,
}

impl AnnotationEngine {
    /// Create an engine with no annotators.
    pub fn new(taxonomy: Arc<dyn CategoryService>) -> Self {
        Self {
            annotators: IndexMap::new(),
            taxonomy,
            fallback: None,
        }
    }

    /// Create an engine with the built-in annotators registered.
    ///
    /// Hybrid search is the fallback.
    pub fn standard(
        search: Arc<dyn SearchService>,
        refmet: Arc<dyn RefMetService>,
        workbench: &WorkbenchConfig,
    ) -> Self {
        let mut engine = Self::new(Arc::new(BiolinkTaxonomy::new()));
        engine.register(Arc::new(SearchAnnotator::text(search.clone())));
        engine.register(Arc::new(SearchAnnotator::vector(search.clone())));
        engine.register(Arc::new(SearchAnnotator::hybrid(search)));
        engine.register(Arc::new(WorkbenchAnnotator::with_config(refmet, workbench)));
        engine.fallback = Some("kestrel-hybrid-search".to_string());
        engine
    }

    /// Register an annotator under its slug, replacing any previous one.
    pub fn register(&mut self, annotator: Arc<dyn Annotator>) {
        let slug = annotator.slug().to_string();
        if self.fallback.is_none() {
            self.fallback = Some(slug.clone());
        }
        self.annotators.insert(slug, annotator);
    }

    /// Set the annotator appended to every automatic selection.
    pub fn with_fallback(mut self, slug: impl Into<String>) -> Self {
        self.fallback = Some(slug.into());
        self
    }

    /// The taxonomy used for selection.
    pub fn taxonomy(&self) -> &dyn CategoryService {
        self.taxonomy.as_ref()
    }

    /// Registered slugs in registration order.
    pub fn slugs(&self) -> impl Iterator<Item = &str> {
        self.annotators.keys().map(String::as_str)
    }

    /// Choose annotators for a category, or resolve pinned slugs.
    pub fn select_annotators(
        &self,
        category: &str,
        pinned: Option<&[String]>,
    ) -> Result<Vec<Arc<dyn Annotator>>> {
        if let Some(pinned) = pinned {
            if pinned.is_empty() {
                return Err(MapperError::NoAnnotators);
            }
            return pinned
                .iter()
                .map(|slug| {
                    self.annotators
                        .get(slug)
                        .cloned()
                        .ok_or_else(|| MapperError::UnknownAnnotator(slug.clone()))
                })
                .collect();
        }

        let mut selected: Vec<Arc<dyn Annotator>> = Vec::new();
        if self.is_small_molecule(category) {
            if let Some(annotator) = self.annotators.get(WORKBENCH_SLUG) {
                selected.push(annotator.clone());
            }
        }
        if let Some(annotator) = self.fallback.as_ref().and_then(|s| self.annotators.get(s)) {
            if !selected.iter().any(|a| a.slug() == annotator.slug()) {
                selected.push(annotator.clone());
            }
        }

        if selected.is_empty() {
            return Err(MapperError::NoAnnotators);
        }
        Ok(selected)
    }

    fn is_small_molecule(&self, category: &str) -> bool {
        self.taxonomy
            .ancestors(category)
            .is_ok_and(|ancestors| ancestors.contains(SMALL_MOLECULE))
    }

    /// Selection for a run; `None` when the mode skips annotation.
    fn plan(&self, options: &AnnotateOptions) -> Result<Option<Vec<Arc<dyn Annotator>>>> {
        if options.mode == AnnotationMode::None {
            if let Some(pinned) = options.annotators.as_deref() {
                self.select_annotators(&options.category, Some(pinned))?;
            }
            debug!("Skipping all annotation since mode={}", options.mode);
            return Ok(None);
        }
        let annotators = self.select_annotators(&options.category, options.annotators.as_deref())?;
        debug!(
            "Using annotators: {:?}",
            annotators.iter().map(|a| a.slug()).collect::<Vec<_>>()
        );
        Ok(Some(annotators))
    }

    /// Annotate one entity.
    pub fn annotate(&self, entity: &Entity, options: &AnnotateOptions) -> Result<AssignedIds> {
        let Some(annotators) = self.plan(options)? else {
            return Ok(AssignedIds::new());
        };

        if options.mode == AnnotationMode::Missing
            && entity.has_any_value(&options.provided_id_fields)
        {
            debug!("Entity has provided ids and mode=missing, skipping annotation");
            return Ok(AssignedIds::new());
        }

        let request = options.request();
        let mut assigned = AssignedIds::new();
        for annotator in &annotators {
            let prepared = annotator.prepare(entity, &options.provided_id_fields);
            assigned.merge(&annotator.get_annotations(&prepared, &request)?);
        }
        Ok(assigned)
    }

    /// Annotate a dataset; returns one entry per row, in row order.
    pub fn annotate_dataset(
        &self,
        dataset: &Dataset,
        options: &AnnotateOptions,
    ) -> Result<Vec<AssignedIds>> {
        let mut results = vec![AssignedIds::new(); dataset.len()];
        let Some(annotators) = self.plan(options)? else {
            return Ok(results);
        };

        let targets: Vec<usize> = dataset
            .iter()
            .enumerate()
            .filter(|(_, entity)| {
                options.mode == AnnotationMode::All
                    || !entity.has_any_value(&options.provided_id_fields)
            })
            .map(|(index, _)| index)
            .collect();
        if options.mode == AnnotationMode::Missing {
            info!("Mode is 'missing': annotating {} of {} rows", targets.len(), dataset.len());
        }
        if targets.is_empty() {
            return Ok(results);
        }

        let subset = Dataset::new(targets.iter().map(|&i| dataset.rows[i].clone()).collect());
        let request = options.request();
        for annotator in &annotators {
            let prepared = annotator.prepare_dataset(&subset, &options.provided_id_fields);
            let annotations = annotator.get_annotations_bulk(&prepared, &request)?;
            if annotations.len() != subset.len() {
                return Err(MapperError::RowCountMismatch {
                    expected: subset.len(),
                    actual: annotations.len(),
                });
            }
            for (&index, assigned) in targets.iter().zip(&annotations) {
                results[index].merge(assigned);
            }
        }
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{MockKestrel, MockRefMet, RefMetRecord, SearchHit};

    fn engine() -> (AnnotationEngine, Arc<MockKestrel>, Arc<MockRefMet>) {
        let kestrel = Arc::new(
            MockKestrel::new().with_hits("carnitine", vec![SearchHit::new("CHEBI:17126", 3.0)]),
        );
        let refmet = Arc::new(MockRefMet::new().with_record(
            "carnitine",
            RefMetRecord {
                refmet_id: Some("RM0008606".to_string()),
                ..Default::default()
            },
        ));
        let engine =
            AnnotationEngine::standard(kestrel.clone(), refmet.clone(), &WorkbenchConfig::default());
        (engine, kestrel, refmet)
    }

    fn options(category: &str, mode: AnnotationMode) -> AnnotateOptions {
        AnnotateOptions {
            provided_id_fields: vec!["hmdb".to_string()],
            mode,
            ..AnnotateOptions::new("name", category)
        }
    }

    #[test]
    fn test_mode_from_str() {
        assert_eq!("all".parse::<AnnotationMode>().unwrap(), AnnotationMode::All);
        assert_eq!("none".parse::<AnnotationMode>().unwrap(), AnnotationMode::None);
        assert!(matches!(
            "some".parse::<AnnotationMode>(),
            Err(MapperError::InvalidMode(ref m)) if m == "some"
        ));
    }

    #[test]
    fn test_automatic_selection() {
        let (engine, _, _) = engine();
        let slugs = |category: &str| -> Vec<String> {
            engine
                .select_annotators(category, None)
                .unwrap()
                .iter()
                .map(|a| a.slug().to_string())
                .collect()
        };
        assert_eq!(
            slugs("biolink:SmallMolecule"),
            vec!["metabolomics-workbench", "kestrel-hybrid-search"]
        );
        assert_eq!(slugs("biolink:Protein"), vec!["kestrel-hybrid-search"]);
        assert_eq!(slugs("biolink:NamedThing"), vec!["kestrel-hybrid-search"]);
    }

    #[test]
    fn test_pinned_selection_errors() {
        let (engine, _, _) = engine();
        let pinned = vec!["kestrel-text-search".to_string()];
        assert_eq!(engine.select_annotators("x", Some(pinned.as_slice())).unwrap().len(), 1);

        let unknown = vec!["nope".to_string()];
        assert!(matches!(
            engine.select_annotators("x", Some(unknown.as_slice())),
            Err(MapperError::UnknownAnnotator(_))
        ));
        assert!(matches!(
            engine.select_annotators("x", Some(Vec::new().as_slice())),
            Err(MapperError::NoAnnotators)
        ));
        let empty = AnnotationEngine::new(Arc::new(BiolinkTaxonomy::new()));
        assert!(matches!(empty.select_annotators("x", None), Err(MapperError::NoAnnotators)));
    }

    #[test]
    fn test_annotate_merges_sources() {
        let (engine, _, _) = engine();
        let entity = Entity::new().with("name", "carnitine");
        let assigned = engine
            .annotate(&entity, &options("biolink:SmallMolecule", AnnotationMode::All))
            .unwrap();
        assert!(assigned.contains("metabolomics-workbench", "refmet_id", "RM0008606"));
        assert!(assigned.contains("kestrel-hybrid-search", "CHEBI", "17126"));
    }

    #[test]
    fn test_missing_mode_skips_provided() {
        let (engine, kestrel, _) = engine();
        let entity = Entity::new().with("name", "carnitine").with("hmdb", "HMDB0000062");
        let assigned = engine
            .annotate(&entity, &options("biolink:Protein", AnnotationMode::Missing))
            .unwrap();
        assert!(assigned.is_empty());
        assert_eq!(kestrel.search_calls(), 0);

        let dashed = Entity::new().with("name", "carnitine").with("hmdb", "-");
        let assigned = engine
            .annotate(&dashed, &options("biolink:Protein", AnnotationMode::Missing))
            .unwrap();
        assert!(!assigned.is_empty());
    }

    #[test]
    fn test_none_mode_still_validates_pins() {
        let (engine, _, _) = engine();
        let mut opts = options("biolink:Protein", AnnotationMode::None);
        let dataset = Dataset::new(vec![Entity::new().with("name", "carnitine"); 3]);
        let results = engine.annotate_dataset(&dataset, &opts).unwrap();
        assert_eq!(results, vec![AssignedIds::new(); 3]);

        opts.annotators = Some(vec!["nope".to_string()]);
        assert!(engine.annotate_dataset(&dataset, &opts).is_err());
    }
}
