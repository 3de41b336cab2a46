//! Collaborator traits and their request/response types.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Curie -> canonical KG node id.
pub type CanonicalMap = BTreeMap<String, String>;

/// Search text -> ranked hits.
pub type SearchResults = BTreeMap<String, Vec<SearchHit>>;

/// Knowledge-graph canonicalization.
///
/// Implementations must be thread-safe (Send + Sync) so one client can be
/// shared by every pipeline stage.
pub trait KgService: Send + Sync {
    /// Resolve curies to canonical KG node ids.
    ///
    /// Curies the KG does not know are simply absent from the result.
    fn canonicalize(&self, curies: &[String]) -> Result<CanonicalMap>;

    /// Name of this service (for logging).
    fn name(&self) -> &str;
}

/// Which search endpoint to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchKind {
    /// Exact and fuzzy text matching.
    #[default]
    Text,
    /// Embedding similarity.
    Vector,
    /// Combined text and vector ranking.
    Hybrid,
}

impl SearchKind {
    /// Endpoint path for this kind of search.
    pub fn endpoint(&self) -> &'static str {
        match self {
            SearchKind::Text => "text-search",
            SearchKind::Vector => "vector-search",
            SearchKind::Hybrid => "hybrid-search",
        }
    }
}

impl fmt::Display for SearchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.endpoint())
    }
}

/// A batch search request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Endpoint to call.
    #[serde(skip)]
    pub kind: SearchKind,

    /// Texts to search for.
    pub search_text: Vec<String>,

    /// Hits to return per text.
    pub limit: usize,

    /// Restrict hits to this category.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_filter: Option<String>,

    /// Restrict hits to these curie prefixes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix_filter: Option<Vec<String>>,
}

impl SearchRequest {
    /// Create a request for the given texts.
    pub fn new(kind: SearchKind, search_text: Vec<String>) -> Self {
        Self {
            kind,
            search_text,
            limit: 10,
            category_filter: None,
            prefix_filter: None,
        }
    }

    /// Set the hit limit.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Set the category filter.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category_filter = Some(category.into());
        self
    }

    /// Set the prefix filter.
    pub fn with_prefixes(mut self, prefixes: Option<Vec<String>>) -> Self {
        self.prefix_filter = prefixes;
        self
    }
}

/// One ranked search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    /// KG node id (a curie).
    pub id: String,
    /// Relevance score; scale depends on the endpoint.
    #[serde(default)]
    pub score: f64,
}

impl SearchHit {
    /// Create a hit.
    pub fn new(id: impl Into<String>, score: f64) -> Self {
        Self {
            id: id.into(),
            score,
        }
    }
}

/// Name search over the KG.
pub trait SearchService: Send + Sync {
    /// Run a batch search. The result holds an entry for every text the
    /// service answered for; texts with no hits may be absent.
    fn search(&self, request: &SearchRequest) -> Result<SearchResults>;

    /// Name of this service (for logging).
    fn name(&self) -> &str;
}

/// A RefMet record from a metabolite reference database.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RefMetRecord {
    /// RefMet id (`RM0008606`).
    #[serde(default)]
    pub refmet_id: Option<String>,
    /// PubChem compound id.
    #[serde(default)]
    pub pubchem_cid: Option<String>,
    /// Standard InChIKey.
    #[serde(default)]
    pub inchi_key: Option<String>,
    /// SMILES string.
    #[serde(default)]
    pub smiles: Option<String>,
}

impl RefMetRecord {
    /// The identifier fields that are present, keyed by source field name.
    pub fn identifiers(&self) -> Vec<(&'static str, &str)> {
        [
            ("refmet_id", &self.refmet_id),
            ("pubchem_cid", &self.pubchem_cid),
            ("inchi_key", &self.inchi_key),
            ("smiles", &self.smiles),
        ]
        .into_iter()
        .filter_map(|(field, value)| Some((field, value.as_deref()?)))
        .collect()
    }
}

/// Metabolite name lookup.
pub trait RefMetService: Send + Sync {
    /// Look up a metabolite by name. `None` means no match.
    fn lookup(&self, name: &str) -> Result<Option<RefMetRecord>>;

    /// Name of this service (for logging).
    fn name(&self) -> &str;
}

/// Entity-type taxonomy.
pub trait CategoryService: Send + Sync {
    /// Map a free-text entity type to a canonical category (`biolink:SmallMolecule`).
    ///
    /// Unknown types fall back to the root category.
    fn standardize(&self, entity_type: &str) -> String;

    /// The category and all categories below it.
    fn descendants(&self, category: &str) -> Result<BTreeSet<String>>;

    /// The category and all categories above it.
    fn ancestors(&self, category: &str) -> Result<BTreeSet<String>>;
}
