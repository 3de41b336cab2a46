//! Main KgMapper struct and public API.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::annotate::{AnnotateOptions, AnnotationEngine, AnnotationMode, AssignedIds};
use crate::entity::{Dataset, Entity};
use crate::error::{MapperError, Result};
use crate::link::{KgLinks, Linker};
use crate::normalize::{DEFAULT_ARRAY_DELIMITERS, NormalizeOptions, Normalization, Normalizer};
use crate::resolve::{Resolution, Resolver};
use crate::services::{
    KestrelClient, KestrelConfig, KgService, RefMetService, SearchService, WorkbenchClient,
    WorkbenchConfig,
};

/// Provided-id values that mean "no id" in source datasets.
pub const PROVIDED_ID_SENTINELS: &[&str] = &["-", "NO_MATCH"];

/// Configuration for a [`KgMapper`].
#[derive(Debug, Clone)]
pub struct MapperConfig {
    /// Kestrel KG and search API.
    pub kestrel: KestrelConfig,
    /// Metabolomics Workbench API.
    pub workbench: WorkbenchConfig,
    /// Delimiters used when a mapping call does not set its own.
    pub default_array_delimiters: Vec<char>,
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            kestrel: KestrelConfig::default(),
            workbench: WorkbenchConfig::default(),
            default_array_delimiters: DEFAULT_ARRAY_DELIMITERS.to_vec(),
        }
    }
}

impl MapperConfig {
    /// Default configuration with Kestrel settings from the environment.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            kestrel: KestrelConfig::from_env()?,
            ..Default::default()
        })
    }
}

/// Per-call mapping options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingOptions {
    /// Field holding the entity name.
    pub name_field: String,
    /// Fields holding caller-provided identifiers.
    pub provided_id_fields: Vec<String>,
    /// Free-text entity type (`metabolite`, `protein`, ...).
    pub entity_type: String,
    /// Delimiters for packed id strings; `None` uses the mapper default.
    pub array_delimiters: Option<Vec<char>>,
    /// Abort on the first invalid identifier.
    pub stop_on_invalid_id: bool,
    /// Which records get annotated.
    pub annotation_mode: AnnotationMode,
    /// Pinned annotator slugs; `None` selects by category.
    pub annotators: Option<Vec<String>>,
    /// Curie prefixes annotators may return.
    pub allowed_prefixes: Option<Vec<String>>,
}

impl MappingOptions {
    /// Options for entities of `entity_type` named in `name_field`.
    pub fn new(name_field: impl Into<String>, entity_type: impl Into<String>) -> Self {
        Self {
            name_field: name_field.into(),
            provided_id_fields: Vec::new(),
            entity_type: entity_type.into(),
            array_delimiters: None,
            stop_on_invalid_id: false,
            annotation_mode: AnnotationMode::default(),
            annotators: None,
            allowed_prefixes: None,
        }
    }

    /// Set the provided-id fields.
    pub fn with_provided_id_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.provided_id_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Set the delimiters for packed id strings.
    pub fn with_array_delimiters(mut self, delimiters: Vec<char>) -> Self {
        self.array_delimiters = Some(delimiters);
        self
    }

    /// Abort on the first invalid identifier.
    pub fn with_stop_on_invalid_id(mut self, stop: bool) -> Self {
        self.stop_on_invalid_id = stop;
        self
    }

    /// Set the annotation mode.
    pub fn with_annotation_mode(mut self, mode: AnnotationMode) -> Self {
        self.annotation_mode = mode;
        self
    }

    /// Pin the annotators to run.
    pub fn with_annotators<I, S>(mut self, slugs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.annotators = Some(slugs.into_iter().map(Into::into).collect());
        self
    }

    /// Restrict annotator results to these curie prefixes.
    pub fn with_allowed_prefixes<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_prefixes = Some(prefixes.into_iter().map(Into::into).collect());
        self
    }
}

/// One entity after all four stages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappedEntity {
    /// Working copy of the input (sentinel ids blanked).
    pub entity: Entity,
    /// Identifiers from annotators.
    pub assigned_ids: AssignedIds,
    /// Curies and diagnostics.
    pub normalization: Normalization,
    /// KG node votes.
    pub links: KgLinks,
    /// Chosen KG nodes.
    pub resolution: Resolution,
}

impl MappedEntity {
    /// The working copy with every stage output added as fields.
    ///
    /// Stage fields replace input fields of the same name.
    pub fn to_entity(&self) -> Result<Entity> {
        let mut fields = vec![(
            "assigned_ids".to_string(),
            serde_json::to_value(&self.assigned_ids)?,
        )];
        for stage in [
            serde_json::to_value(&self.normalization)?,
            serde_json::to_value(&self.links)?,
            serde_json::to_value(&self.resolution)?,
        ] {
            if let Value::Object(object) = stage {
                fields.extend(object);
            }
        }
        Ok(self.entity.with_fields(fields))
    }
}

/// A dataset after all four stages, one row per input row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MappedDataset {
    /// Mapped rows, in input order.
    pub rows: Vec<MappedEntity>,
}

impl MappedDataset {
    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the dataset has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterate over rows in order.
    pub fn iter(&self) -> impl Iterator<Item = &MappedEntity> {
        self.rows.iter()
    }

    /// All rows with stage outputs merged in as fields.
    pub fn to_dataset(&self) -> Result<Dataset> {
        let rows = self
            .rows
            .iter()
            .map(MappedEntity::to_entity)
            .collect::<Result<Vec<_>>>()?;
        Ok(Dataset::new(rows))
    }
}

/// Maps entities and datasets onto knowledge-graph nodes.
///
/// Runs annotation, normalization, linking and resolution in order. Inputs
/// are never modified; every stage reads a working copy.
pub struct KgMapper {
    config: MapperConfig,
    normalizer: Normalizer,
    engine: AnnotationEngine,
    linker: Linker,
    resolver: Resolver,
}

impl KgMapper {
    /// Create a mapper that talks to the configured HTTP services.
    pub fn new(config: MapperConfig) -> Result<Self> {
        let kestrel = Arc::new(KestrelClient::new(config.kestrel.clone())?);
        let refmet = Arc::new(WorkbenchClient::new(config.workbench.clone())?);
        Ok(Self::with_services(config, kestrel.clone(), kestrel, refmet))
    }

    /// Create a mapper from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(MapperConfig::from_env()?)
    }

    /// Create a mapper over explicit service implementations.
    pub fn with_services(
        config: MapperConfig,
        kg: Arc<dyn KgService>,
        search: Arc<dyn SearchService>,
        refmet: Arc<dyn RefMetService>,
    ) -> Self {
        let engine = AnnotationEngine::standard(search, refmet, &config.workbench);
        Self {
            config,
            normalizer: Normalizer::new(),
            engine,
            linker: Linker::new(kg),
            resolver: Resolver::new(),
        }
    }

    /// Replace the normalizer (e.g. one over a custom registry).
    pub fn with_normalizer(mut self, normalizer: Normalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    /// Replace the annotation engine.
    pub fn with_engine(mut self, engine: AnnotationEngine) -> Self {
        self.engine = engine;
        self
    }

    /// The configuration in use.
    pub fn config(&self) -> &MapperConfig {
        &self.config
    }

    /// The normalizer in use.
    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    /// The linker in use.
    pub fn linker(&self) -> &Linker {
        &self.linker
    }

    fn stage_options(&self, options: &MappingOptions) -> (AnnotateOptions, NormalizeOptions) {
        let category = self.engine.taxonomy().standardize(&options.entity_type);
        let annotate = AnnotateOptions {
            name_field: options.name_field.clone(),
            provided_id_fields: options.provided_id_fields.clone(),
            category,
            mode: options.annotation_mode,
            annotators: options.annotators.clone(),
            prefixes: options.allowed_prefixes.clone(),
        };
        let normalize = NormalizeOptions {
            provided_id_fields: options.provided_id_fields.clone(),
            array_delimiters: options
                .array_delimiters
                .clone()
                .unwrap_or_else(|| self.config.default_array_delimiters.clone()),
            stop_on_invalid_id: options.stop_on_invalid_id,
        };
        (annotate, normalize)
    }

    /// Map a single entity.
    pub fn map_entity(&self, entity: &Entity, options: &MappingOptions) -> Result<MappedEntity> {
        debug!("Mapping entity to KG: {:?}", entity.text(&options.name_field));
        let (annotate, normalize) = self.stage_options(options);
        let working =
            entity.with_sentinels_blanked(&options.provided_id_fields, PROVIDED_ID_SENTINELS);

        let assigned_ids = self.engine.annotate(&working, &annotate)?;
        let normalization = self.normalizer.normalize(&working, &assigned_ids, &normalize)?;
        let links = self.linker.link(&normalization)?;
        let resolution = self.resolver.resolve(&links);

        Ok(MappedEntity {
            entity: working,
            assigned_ids,
            normalization,
            links,
            resolution,
        })
    }

    /// Map every row of a dataset.
    ///
    /// Annotation lookups and canonicalization are batched across rows; the
    /// per-row results equal those of [`map_entity`](Self::map_entity).
    pub fn map_dataset(&self, dataset: &Dataset, options: &MappingOptions) -> Result<MappedDataset> {
        info!(
            "Beginning to map dataset to KG ({} rows, entity type '{}')",
            dataset.len(),
            options.entity_type
        );
        let (annotate, normalize) = self.stage_options(options);
        let working = Dataset::new(
            dataset
                .iter()
                .map(|row| {
                    row.with_sentinels_blanked(&options.provided_id_fields, PROVIDED_ID_SENTINELS)
                })
                .collect(),
        );

        let assigned = self.engine.annotate_dataset(&working, &annotate)?;
        info!("Annotation done for {} rows", assigned.len());
        let normalizations = self.normalizer.normalize_dataset(&working, &assigned, &normalize)?;
        let links = self.linker.link_dataset(&normalizations)?;
        let resolutions = self.resolver.resolve_dataset(&links);

        let rows: Vec<MappedEntity> = working
            .rows
            .into_iter()
            .zip(assigned)
            .zip(normalizations)
            .zip(links)
            .zip(resolutions)
            .map(|((((entity, assigned_ids), normalization), links), resolution)| MappedEntity {
                entity,
                assigned_ids,
                normalization,
                links,
                resolution,
            })
            .collect();

        if rows.len() != dataset.len() {
            return Err(MapperError::RowCountMismatch {
                expected: dataset.len(),
                actual: rows.len(),
            });
        }
        Ok(MappedDataset { rows })
    }
}
