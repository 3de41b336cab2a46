//! biomap: harmonizing biological entity records against a knowledge graph.
//!
//! Records carry arbitrary local identifiers (HMDB ids, KEGG codes, UniProt
//! accessions, ...) in arbitrarily named fields. biomap turns them into
//! canonical knowledge-graph nodes in four stages:
//!
//! 1. **Annotate** - ask pluggable sources for extra identifiers by name
//! 2. **Normalize** - validate and convert local ids into curies
//! 3. **Link** - canonicalize curies to KG nodes in one batched request
//! 4. **Resolve** - pick one node per record by majority vote
//!
//! # Core Principles
//!
//! - **Non-destructive**: input records are never modified
//! - **Full provenance**: every identifier remembers which source proposed it
//! - **Batch-equivalent**: mapping a dataset gives the same per-row result
//!   as mapping each row alone, with far fewer round trips
//!
//! # Example
//!
//! ```no_run
//! use biomap::{Entity, KgMapper, MappingOptions};
//!
//! let mapper = KgMapper::from_env().unwrap();
//! let entity = Entity::new()
//!     .with("name", "carnitine")
//!     .with("hmdb_id", "HMDB0000062");
//! let options = MappingOptions::new("name", "metabolite").with_provided_id_fields(["hmdb_id"]);
//!
//! let mapped = mapper.map_entity(&entity, &options).unwrap();
//! println!("Curies: {:?}", mapped.normalization.curies);
//! println!("Chosen node: {:?}", mapped.resolution.chosen_kg_id);
//! ```

pub mod annotate;
pub mod entity;
pub mod error;
pub mod link;
pub mod normalize;
pub mod resolve;
pub mod services;
pub mod vocab;

mod mapper;

pub use crate::mapper::{
    KgMapper, MappedDataset, MappedEntity, MapperConfig, MappingOptions, PROVIDED_ID_SENTINELS,
};
pub use annotate::{AnnotationEngine, AnnotationMode, Annotator, AssignedIds};
pub use entity::{Dataset, Entity};
pub use error::{MapperError, Result};
pub use link::{KgLinks, Linker};
pub use normalize::{Curie, Normalization, Normalizer};
pub use resolve::{Resolution, Resolver};
pub use vocab::{VocabRegistry, Vocabulary};
