//! Identifiers assigned by annotators, namespaced by source.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Metadata attached to one assigned identifier (score, ...).
pub type IdMetadata = Map<String, Value>;

/// Local id -> metadata.
pub type LocalIds = BTreeMap<String, IdMetadata>;

/// Vocabulary field -> local ids.
pub type VocabIds = BTreeMap<String, LocalIds>;

/// Three-level mapping: annotator slug -> vocabulary -> local id -> metadata.
///
/// Merging never drops a `(source, vocabulary, id)` triple. When both sides
/// hold the same triple their metadata maps are merged key by key, with the
/// incoming side winning on conflicts.
///
/// A source may be present with no vocabularies: that records "this
/// annotator ran and found nothing", which is distinct from "never ran".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssignedIds {
    sources: BTreeMap<String, VocabIds>,
}

impl AssignedIds {
    /// Create an empty structure.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `source` ran, without adding any identifiers.
    pub fn touch_source(&mut self, source: &str) {
        self.sources.entry(source.to_string()).or_default();
    }

    /// Add one identifier, merging metadata if it is already present.
    pub fn insert(&mut self, source: &str, vocab: &str, local_id: &str, metadata: IdMetadata) {
        let entry = self
            .sources
            .entry(source.to_string())
            .or_default()
            .entry(vocab.to_string())
            .or_default()
            .entry(local_id.to_string())
            .or_default();
        entry.extend(metadata);
    }

    /// Merge `other` into `self`.
    pub fn merge(&mut self, other: &AssignedIds) {
        for (source, vocabs) in &other.sources {
            let target = self.sources.entry(source.clone()).or_default();
            for (vocab, ids) in vocabs {
                let target = target.entry(vocab.clone()).or_default();
                for (local_id, metadata) in ids {
                    target
                        .entry(local_id.clone())
                        .or_default()
                        .extend(metadata.iter().map(|(k, v)| (k.clone(), v.clone())));
                }
            }
        }
    }

    /// Merge two structures into a new one, leaving both inputs untouched.
    pub fn merged(&self, other: &AssignedIds) -> AssignedIds {
        let mut result = self.clone();
        result.merge(other);
        result
    }

    /// Vocabularies assigned by one source.
    pub fn source(&self, source: &str) -> Option<&VocabIds> {
        self.sources.get(source)
    }

    /// Iterate over sources in slug order.
    pub fn sources(&self) -> impl Iterator<Item = (&str, &VocabIds)> {
        self.sources.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Metadata for one triple.
    pub fn get(&self, source: &str, vocab: &str, local_id: &str) -> Option<&IdMetadata> {
        self.sources.get(source)?.get(vocab)?.get(local_id)
    }

    /// Whether a triple is present.
    pub fn contains(&self, source: &str, vocab: &str, local_id: &str) -> bool {
        self.get(source, vocab, local_id).is_some()
    }

    /// Every `(source, vocab, local_id)` triple.
    pub fn triples(&self) -> impl Iterator<Item = (&str, &str, &str)> {
        self.sources.iter().flat_map(|(source, vocabs)| {
            vocabs.iter().flat_map(move |(vocab, ids)| {
                ids.keys()
                    .map(move |id| (source.as_str(), vocab.as_str(), id.as_str()))
            })
        })
    }

    /// Number of triples.
    pub fn len(&self) -> usize {
        self.triples().count()
    }

    /// True when no source is recorded at all.
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}
