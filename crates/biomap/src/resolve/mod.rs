//! Resolution: choosing one KG node per entity.
//!
//! Each candidate node carries the curies that voted for it. The node with
//! the most votes wins; equal counts go to the lexicographically smallest
//! node id so the result never depends on map iteration order.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::link::{KgLinks, VoteMap};

/// Resolution result for one entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    /// Chosen node over all curies.
    pub chosen_kg_id: Option<String>,
    /// Chosen node over provided curies.
    pub chosen_kg_id_provided: Option<String>,
    /// Chosen node over the votes of all annotators combined.
    pub chosen_kg_id_assigned: Option<String>,
}

/// Majority-vote resolver.
#[derive(Debug, Clone, Copy, Default)]
pub struct Resolver;

impl Resolver {
    /// Create a resolver.
    pub fn new() -> Self {
        Self
    }

    /// Resolve one entity.
    pub fn resolve(&self, links: &KgLinks) -> Resolution {
        let mut assigned_combined = VoteMap::new();
        for votes in links.kg_ids_assigned.values() {
            for (node, curies) in votes {
                assigned_combined
                    .entry(node.clone())
                    .or_default()
                    .extend(curies.iter().cloned());
            }
        }

        Resolution {
            chosen_kg_id: choose_best_kg_id(&links.kg_ids),
            chosen_kg_id_provided: choose_best_kg_id(&links.kg_ids_provided),
            chosen_kg_id_assigned: choose_best_kg_id(&assigned_combined),
        }
    }

    /// Resolve every row.
    pub fn resolve_dataset(&self, links: &[KgLinks]) -> Vec<Resolution> {
        debug!("Resolving {} rows", links.len());
        links.iter().map(|l| self.resolve(l)).collect()
    }
}

/// The node with the most supporting curies; ties go to the smallest id.
///
/// Returns `None` for an empty vote map.
pub fn choose_best_kg_id(votes: &VoteMap) -> Option<String> {
    votes
        .iter()
        .max_by(|(a_id, a), (b_id, b)| a.len().cmp(&b.len()).then_with(|| b_id.cmp(a_id)))
        .map(|(id, _)| id.clone())
}
