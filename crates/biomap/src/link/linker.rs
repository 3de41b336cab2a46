//! Curie to KG node linking.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::Result;
use crate::normalize::Normalization;
use crate::services::{CanonicalMap, KgService};

/// KG node id -> curies that canonicalized to it ("votes").
pub type VoteMap = BTreeMap<String, Vec<String>>;

/// Linking result for one entity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KgLinks {
    /// Votes from all curies.
    pub kg_ids: VoteMap,
    /// Votes from provided curies.
    pub kg_ids_provided: VoteMap,
    /// Votes per annotator slug.
    pub kg_ids_assigned: BTreeMap<String, VoteMap>,
    /// Curies the KG could not canonicalize.
    pub curie_misses: Vec<String>,
}

/// Links normalized curies to canonical KG nodes.
pub struct Linker {
    kg: Arc<dyn KgService>,
}

impl Linker {
    /// Create a linker over a KG service.
    pub fn new(kg: Arc<dyn KgService>) -> Self {
        Self { kg }
    }

    /// Canonicalize arbitrary curies in one request.
    ///
    /// Duplicates are removed and the request is sorted; an empty input
    /// makes no request at all.
    pub fn canonicalize<S: AsRef<str>>(&self, curies: &[S]) -> Result<CanonicalMap> {
        let unique: BTreeSet<&str> = curies.iter().map(|c| c.as_ref()).collect();
        if unique.is_empty() {
            return Ok(CanonicalMap::new());
        }
        let request: Vec<String> = unique.into_iter().map(str::to_string).collect();
        debug!("Canonicalizing {} curies with {}", request.len(), self.kg.name());
        self.kg.canonicalize(&request)
    }

    /// Link one entity's curies.
    pub fn link(&self, normalization: &Normalization) -> Result<KgLinks> {
        let canonical = self.canonicalize(&normalization.curies)?;
        Ok(format_links(normalization, &canonical))
    }

    /// Link every row with a single canonicalization request.
    pub fn link_dataset(&self, normalizations: &[Normalization]) -> Result<Vec<KgLinks>> {
        let all_curies: Vec<&str> = normalizations
            .iter()
            .flat_map(|n| n.curies.iter().map(String::as_str))
            .collect();
        info!("Linking curies for {} rows", normalizations.len());

        let canonical = self.canonicalize(&all_curies)?;
        Ok(normalizations
            .iter()
            .map(|n| format_links(n, &canonical))
            .collect())
    }
}

fn format_links(normalization: &Normalization, canonical: &CanonicalMap) -> KgLinks {
    KgLinks {
        kg_ids: reverse_curie_map(canonical, &normalization.curies),
        kg_ids_provided: reverse_curie_map(canonical, &normalization.curies_provided),
        kg_ids_assigned: normalization
            .curies_assigned
            .iter()
            .map(|(slug, curies)| (slug.clone(), reverse_curie_map(canonical, curies)))
            .collect(),
        curie_misses: normalization
            .curies
            .iter()
            .filter(|curie| !canonical.contains_key(*curie))
            .cloned()
            .collect(),
    }
}

/// Group a subset of curies by the KG node they canonicalize to.
///
/// Curies missing from `canonical` are dropped.
pub fn reverse_curie_map(canonical: &CanonicalMap, curies: &[String]) -> VoteMap {
    let mut votes = VoteMap::new();
    for curie in curies {
        if let Some(node) = canonical.get(curie).filter(|node| !node.is_empty()) {
            votes.entry(node.clone()).or_default().push(curie.clone());
        }
    }
    votes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::MockKestrel;

    fn kg() -> Arc<MockKestrel> {
        Arc::new(
            MockKestrel::new()
                .with_canonical("CHEBI:17126", "CHEBI:17126")
                .with_canonical("HMDB:HMDB0000062", "CHEBI:17126")
                .with_canonical("PUBCHEM.COMPOUND:10917", "CHEBI:16347"),
        )
    }

    fn normalization() -> Normalization {
        Normalization {
            curies: vec![
                "CHEBI:17126".to_string(),
                "HMDB:HMDB0000062".to_string(),
                "KEGG.COMPOUND:C00487".to_string(),
                "PUBCHEM.COMPOUND:10917".to_string(),
            ],
            curies_provided: vec!["HMDB:HMDB0000062".to_string(), "KEGG.COMPOUND:C00487".to_string()],
            curies_assigned: BTreeMap::from([(
                "kestrel-hybrid-search".to_string(),
                vec!["CHEBI:17126".to_string(), "PUBCHEM.COMPOUND:10917".to_string()],
            )]),
            ..Default::default()
        }
    }

    #[test]
    fn test_link_votes_and_misses() {
        let linker = Linker::new(kg());
        let links = linker.link(&normalization()).unwrap();

        assert_eq!(
            links.kg_ids["CHEBI:17126"],
            vec!["CHEBI:17126", "HMDB:HMDB0000062"]
        );
        assert_eq!(links.kg_ids["CHEBI:16347"], vec!["PUBCHEM.COMPOUND:10917"]);
        assert_eq!(links.kg_ids_provided.len(), 1);
        assert_eq!(links.kg_ids_assigned["kestrel-hybrid-search"].len(), 2);
        assert_eq!(links.curie_misses, vec!["KEGG.COMPOUND:C00487"]);
    }

    #[test]
    fn test_dataset_makes_one_request() {
        let service = kg();
        let linker = Linker::new(service.clone());
        let rows = vec![normalization(), Normalization::default(), normalization()];

        let links = linker.link_dataset(&rows).unwrap();
        assert_eq!(links.len(), 3);
        assert_eq!(service.canonicalize_calls(), 1);
        assert_eq!(service.canonicalize_requests()[0].len(), 4);
        assert_eq!(links[1], KgLinks::default());
        assert_eq!(links[0], linker.link(&rows[0]).unwrap());
    }

    #[test]
    fn test_empty_makes_no_request() {
        let service = kg();
        let linker = Linker::new(service.clone());
        let links = linker.link(&Normalization::default()).unwrap();
        assert_eq!(links, KgLinks::default());
        assert_eq!(service.canonicalize_calls(), 0);
    }
}
