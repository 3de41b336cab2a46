//! External collaborators of the pipeline.
//!
//! Each collaborator sits behind a small trait so the pipeline stages can
//! be exercised against in-memory mocks:
//!
//! - [`KgService`] - curie canonicalization (used by the linker)
//! - [`SearchService`] - text, vector and hybrid name search (search annotators)
//! - [`RefMetService`] - metabolite name lookup (Metabolomics Workbench annotator)
//! - [`CategoryService`] - entity-type taxonomy (annotator selection)
//!
//! # Implementations
//!
//! - **Kestrel** - KG and search API (requires `KESTREL_API_KEY`)
//! - **Metabolomics Workbench** - RefMet REST API, no key needed
//! - **Biolink** - embedded category table, no network access
//!
//! # Example
//!
//! ```no_run
//! use biomap::services::{KestrelClient, KgService};
//!
//! let kestrel = KestrelClient::from_env().unwrap();
//! let nodes = kestrel.canonicalize(&["CHEBI:17126".to_string()]).unwrap();
//! ```

mod biolink;
mod kestrel;
mod mock;
mod service;
mod workbench;

pub use biolink::{BiolinkTaxonomy, ROOT_CATEGORY, singularize};
pub use kestrel::{DEFAULT_KESTREL_URL, KestrelClient, KestrelConfig};
pub use mock::{MockKestrel, MockRefMet};
pub use service::{
    CanonicalMap, CategoryService, KgService, RefMetRecord, RefMetService, SearchHit, SearchKind,
    SearchRequest, SearchResults, SearchService,
};
pub use workbench::{DEFAULT_WORKBENCH_URL, WorkbenchClient, WorkbenchConfig, parse_match};
