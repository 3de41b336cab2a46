//! Field-name inference, validation and curie construction.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::annotate::AssignedIds;
use crate::entity::{Dataset, Entity, clean_local_id};
use crate::error::{MapperError, Result};
use crate::vocab::{VocabRegistry, clean_vocab_prefix};

use super::curie::{Curie, strip_curie_prefix};
use super::parse::parse_delimited;

static SEPARATORS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[-\s]+").unwrap());

/// Field-name words that carry no vocabulary information.
const STRIPPED_TOKENS: &[&str] = &["id", "ids", "code", "cid", "codes", "list"];

/// Default characters that separate several ids packed into one string.
pub const DEFAULT_ARRAY_DELIMITERS: &[char] = &[',', ';'];

/// Options for one normalization run.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizeOptions {
    /// Fields holding caller-provided identifiers.
    pub provided_id_fields: Vec<String>,
    /// Characters to split delimited id strings on.
    pub array_delimiters: Vec<char>,
    /// Abort on the first identifier that fails validation.
    pub stop_on_invalid_id: bool,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            provided_id_fields: Vec::new(),
            array_delimiters: DEFAULT_ARRAY_DELIMITERS.to_vec(),
            stop_on_invalid_id: false,
        }
    }
}

/// Curies built from one group of id fields, with diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CurieSet {
    /// Curie -> IRI (when the vocabulary has one).
    pub curies: BTreeMap<String, Option<String>>,
    /// Field -> local ids that failed validation.
    pub invalid_ids: BTreeMap<String, Vec<String>>,
    /// Fields that matched no vocabulary.
    pub unrecognized_vocabs: BTreeSet<String>,
}

/// Normalization result for one entity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Normalization {
    /// Sorted union of provided and assigned curies.
    pub curies: Vec<String>,
    /// Curies from provided-id fields.
    pub curies_provided: Vec<String>,
    /// Curies per annotator slug.
    pub curies_assigned: BTreeMap<String, Vec<String>>,
    /// Curie -> IRI for every curie whose vocabulary has an IRI.
    pub iris: BTreeMap<String, String>,
    /// Provided field -> rejected local ids.
    pub invalid_ids_provided: BTreeMap<String, Vec<String>>,
    /// Annotator slug -> vocabulary field -> rejected local ids.
    pub invalid_ids_assigned: BTreeMap<String, BTreeMap<String, Vec<String>>>,
    /// Provided fields that matched no vocabulary.
    pub unrecognized_vocabs_provided: Vec<String>,
    /// Assigned vocabulary fields that matched no vocabulary.
    pub unrecognized_vocabs_assigned: Vec<String>,
}

/// Normalizes local identifiers into curies.
///
/// Holds the vocabulary registry and a field-name cache. The cache is only
/// ever added to, so concurrent readers see a consistent view.
#[derive(Debug)]
pub struct Normalizer {
    registry: Arc<VocabRegistry>,
    field_cache: RwLock<HashMap<String, BTreeSet<String>>>,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Normalizer {
    /// Create a normalizer over the built-in vocabulary registry.
    pub fn new() -> Self {
        Self::with_registry(VocabRegistry::standard())
    }

    /// Create a normalizer over a custom registry.
    pub fn with_registry(registry: Arc<VocabRegistry>) -> Self {
        Self {
            registry,
            field_cache: RwLock::new(HashMap::new()),
        }
    }

    /// The registry in use.
    pub fn registry(&self) -> &VocabRegistry {
        &self.registry
    }

    /// Determine which vocabularies an id field name refers to.
    ///
    /// Matching order: exact key, cached earlier result, explicit alias,
    /// root segment before a dot (`kegg` -> `kegg.compound`), key with dots
    /// removed (`keggcompound`). Returns `None` when nothing matches.
    pub fn determine_vocab(&self, field_name: &str) -> Option<BTreeSet<String>> {
        let cleaned = clean_field_name(field_name);
        debug!("Determining vocab for field '{}' (cleaned: '{}')", field_name, cleaned);

        if self.registry.contains(&cleaned) {
            return Some(BTreeSet::from([cleaned]));
        }
        if let Some(cached) = self.field_cache.read().get(&cleaned) {
            return Some(cached.clone());
        }

        let mut matches: BTreeSet<String> = self
            .registry
            .keys_for_alias(&cleaned)
            .iter()
            .cloned()
            .collect();
        for vocabulary in self.registry.iter() {
            let implicit_root = vocabulary.is_sub_vocabulary() && vocabulary.root() == cleaned;
            let dotless = vocabulary.key.replace('.', "") == cleaned;
            if implicit_root || dotless {
                matches.insert(vocabulary.key.clone());
            }
        }

        if matches.is_empty() {
            debug!("No vocab matches field '{}'", field_name);
            return None;
        }
        self.field_cache.write().insert(cleaned, matches.clone());
        Some(matches)
    }

    /// Whether `local_id` is valid for the vocabulary `vocab_key` after cleaning.
    pub fn is_valid_id(&self, local_id: &str, vocab_key: &str) -> bool {
        self.registry
            .get(vocab_key)
            .is_some_and(|vocabulary| vocabulary.check(local_id).is_some())
    }

    /// Build a curie from a local id and candidate vocabulary keys.
    ///
    /// A leading `PREFIX:` on the local id is stripped first. Candidates are
    /// tried in order; the first one whose validator accepts the cleaned id
    /// wins. Returns `None` when no candidate accepts it.
    pub fn construct_curie<I, S>(&self, local_id: &str, candidates: I) -> Option<Curie>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let local_id = strip_curie_prefix(local_id);
        candidates.into_iter().find_map(|key| {
            let vocabulary = self.registry.get(key.as_ref())?;
            let cleaned = vocabulary.check(local_id)?;
            let iri = vocabulary.iri_for(&cleaned);
            Some(Curie::new(vocabulary.prefix.clone(), cleaned, iri))
        })
    }

    /// Convert every local id of every field into curies.
    ///
    /// Empty ids (blank, dash) are skipped. Ids that fail validation are
    /// recorded per field, or abort the run when `stop_on_invalid_id` is set.
    pub fn get_curies<'a, I>(&self, local_ids: I, stop_on_invalid_id: bool) -> Result<CurieSet>
    where
        I: IntoIterator<Item = (&'a str, Vec<Value>)>,
    {
        let mut result = CurieSet::default();

        for (field, values) in local_ids {
            let Some(vocabs) = self.determine_vocab(field) else {
                result.unrecognized_vocabs.insert(field.to_string());
                continue;
            };

            for value in &values {
                let local_id = clean_local_id(value);
                if local_id.is_empty() {
                    continue;
                }
                match self.construct_curie(&local_id, &vocabs) {
                    Some(curie) => {
                        let iri = curie.iri.clone();
                        result.curies.insert(curie.to_string(), iri);
                    }
                    None if stop_on_invalid_id => {
                        error!("Local id '{}' is invalid for {:?}", local_id, vocabs);
                        return Err(MapperError::InvalidIdentifier {
                            field: field.to_string(),
                            local_id,
                            vocabularies: vocabs.into_iter().collect(),
                        });
                    }
                    None => {
                        warn!("Local id '{}' is invalid for {:?}. Skipping.", local_id, vocabs);
                        result
                            .invalid_ids
                            .entry(field.to_string())
                            .or_default()
                            .push(local_id);
                    }
                }
            }
        }

        Ok(result)
    }

    /// Normalize one entity's provided and assigned identifiers.
    pub fn normalize(
        &self,
        entity: &Entity,
        assigned: &AssignedIds,
        options: &NormalizeOptions,
    ) -> Result<Normalization> {
        let provided: Vec<(&str, Vec<Value>)> = options
            .provided_id_fields
            .iter()
            .filter_map(|field| {
                let value = entity.get(field)?;
                if value.is_null() {
                    return None;
                }
                Some((field.as_str(), parse_delimited(value, &options.array_delimiters)))
            })
            .collect();

        let provided = self.get_curies(provided, options.stop_on_invalid_id)?;

        let mut normalization = Normalization {
            curies_provided: provided.curies.keys().cloned().collect(),
            invalid_ids_provided: provided.invalid_ids,
            unrecognized_vocabs_provided: provided.unrecognized_vocabs.into_iter().collect(),
            ..Default::default()
        };

        let mut all_curies: BTreeMap<String, Option<String>> = provided.curies;
        let mut unrecognized_assigned = BTreeSet::new();

        for (slug, vocabs) in assigned.sources() {
            let fields = vocabs.iter().map(|(vocab, ids)| {
                let values = ids.keys().map(|id| Value::String(id.clone())).collect();
                (vocab.as_str(), values)
            });
            let annotator = self.get_curies(fields, options.stop_on_invalid_id)?;

            normalization
                .curies_assigned
                .insert(slug.to_string(), annotator.curies.keys().cloned().collect());
            if !annotator.invalid_ids.is_empty() {
                normalization
                    .invalid_ids_assigned
                    .insert(slug.to_string(), annotator.invalid_ids);
            }
            unrecognized_assigned.extend(annotator.unrecognized_vocabs);
            all_curies.extend(annotator.curies);
        }

        normalization.unrecognized_vocabs_assigned = unrecognized_assigned.into_iter().collect();
        normalization.iris = all_curies
            .iter()
            .filter_map(|(curie, iri)| Some((curie.clone(), iri.clone()?)))
            .collect();
        normalization.curies = all_curies.into_keys().collect();

        Ok(normalization)
    }

    /// Normalize every row of a dataset.
    ///
    /// `assigned` must hold one entry per row.
    pub fn normalize_dataset(
        &self,
        dataset: &Dataset,
        assigned: &[AssignedIds],
        options: &NormalizeOptions,
    ) -> Result<Vec<Normalization>> {
        if assigned.len() != dataset.len() {
            return Err(MapperError::RowCountMismatch {
                expected: dataset.len(),
                actual: assigned.len(),
            });
        }
        info!("Normalizing identifiers for {} rows", dataset.len());

        dataset
            .iter()
            .zip(assigned)
            .map(|(entity, ids)| self.normalize(entity, ids, options))
            .collect()
    }
}

/// Reduce an id field name to the form vocabulary keys are stored in.
///
/// `"HMDB ID"` -> `"hmdb"`, `"pubchem_cid"` -> `"pubchem"`,
/// `"KEGG.COMPOUND-codes"` -> `"kegg.compound"`.
pub fn clean_field_name(field_name: &str) -> String {
    let underscored = SEPARATORS.replace_all(field_name, "_").to_lowercase();
    let joined: String = underscored
        .split('_')
        .filter(|word| !STRIPPED_TOKENS.contains(word))
        .collect();
    clean_vocab_prefix(&joined)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotate::IdMetadata;
    use crate::vocab::{Vocabulary, validators};
    use serde_json::json;

    fn spec_registry() -> Arc<VocabRegistry> {
        Arc::new(VocabRegistry::from_vocabularies(vec![
            Vocabulary::new("KEGG.COMPOUND", validators::is_kegg_compound_id),
            Vocabulary::new("PUBCHEM.COMPOUND", validators::is_numeric_id),
        ]))
    }

    fn options(fields: &[&str]) -> NormalizeOptions {
        NormalizeOptions {
            provided_id_fields: fields.iter().map(|f| f.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_clean_field_name() {
        assert_eq!(clean_field_name("HMDB ID"), "hmdb");
        assert_eq!(clean_field_name("pubchem_cid"), "pubchem");
        assert_eq!(clean_field_name("inchi_key"), "inchikey");
        assert_eq!(clean_field_name("KEGG.COMPOUND-codes"), "kegg.compound");
        assert_eq!(clean_field_name("UniProt-IDs"), "uniprot");
    }

    #[test]
    fn test_determine_vocab_exact_and_alias() {
        let normalizer = Normalizer::new();
        assert_eq!(normalizer.determine_vocab("hmdb_id"), Some(BTreeSet::from(["hmdb".to_string()])));
        assert_eq!(normalizer.determine_vocab("refmet_id"), Some(BTreeSet::from(["rm".to_string()])));
        assert_eq!(normalizer.determine_vocab("UniProt"), Some(BTreeSet::from(["uniprotkb".to_string()])));
        assert_eq!(normalizer.determine_vocab("sample_weight"), None);
    }

    #[test]
    fn test_determine_vocab_implicit() {
        let normalizer = Normalizer::new();
        let pubchem = normalizer.determine_vocab("pubchem_cid").unwrap();
        assert_eq!(pubchem, BTreeSet::from(["pubchem.compound".to_string()]));

        let dotless = normalizer.determine_vocab("keggcompound").unwrap();
        assert_eq!(dotless, BTreeSet::from(["kegg.compound".to_string()]));

        // Ambiguous alias resolves to every match
        let gene = normalizer.determine_vocab("gene").unwrap();
        assert!(gene.contains("ensembl"));
        assert!(gene.contains("ncbigene"));
    }

    #[test]
    fn test_determine_vocab_is_cached() {
        let normalizer = Normalizer::new();
        let first = normalizer.determine_vocab("chembl").unwrap();
        assert!(first.contains("chembl.compound"));
        assert!(normalizer.field_cache.read().contains_key("chembl"));
        assert_eq!(normalizer.determine_vocab("ChEMBL"), Some(first));
    }

    #[test]
    fn test_construct_curie_first_valid_wins() {
        let normalizer = Normalizer::new();
        let curie = normalizer
            .construct_curie("C00487", ["kegg.drug", "kegg.compound", "kegg"])
            .unwrap();
        assert_eq!(curie.to_string(), "KEGG.COMPOUND:C00487");
        assert_eq!(curie.iri.as_deref(), Some("http://identifiers.org/kegg.compound/C00487"));

        assert!(normalizer.construct_curie("not-an-id", ["kegg.compound"]).is_none());
        assert!(normalizer.construct_curie("C00487", ["unknown.vocab"]).is_none());
    }

    #[test]
    fn test_construct_curie_strips_prefix_and_cleans() {
        let normalizer = Normalizer::new();
        let curie = normalizer.construct_curie("HMDB:HMDB00122", ["hmdb"]).unwrap();
        assert_eq!(curie.to_string(), "HMDB:HMDB0000122");
        let refmet = normalizer.construct_curie("RM0135901", ["rm"]).unwrap();
        assert_eq!(refmet.to_string(), "RM:0135901");
    }

    #[test]
    fn test_normalize_carnitine_example() {
        let normalizer = Normalizer::with_registry(spec_registry());
        let entity = Entity::new()
            .with("name", "carnitine")
            .with("kegg", json!(["C00487"]))
            .with("pubchem", "10917");

        let result = normalizer
            .normalize(&entity, &AssignedIds::new(), &options(&["kegg", "pubchem"]))
            .unwrap();

        assert_eq!(
            result.curies_provided,
            vec!["KEGG.COMPOUND:C00487", "PUBCHEM.COMPOUND:10917"]
        );
        assert!(result.invalid_ids_provided.is_empty());
        assert!(result.unrecognized_vocabs_provided.is_empty());
    }

    #[test]
    fn test_dash_is_absent_not_invalid() {
        let normalizer = Normalizer::new();
        let entity = Entity::new().with("name", "x").with("hmdb", "-");
        let result = normalizer
            .normalize(&entity, &AssignedIds::new(), &options(&["hmdb"]))
            .unwrap();
        assert!(result.curies.is_empty());
        assert!(result.invalid_ids_provided.is_empty());
    }

    #[test]
    fn test_invalid_and_unrecognized_are_separate() {
        let normalizer = Normalizer::new();
        let entity = Entity::new()
            .with("hmdb", "HMDB0000122, bogus")
            .with("lab_number", "42");
        let result = normalizer
            .normalize(&entity, &AssignedIds::new(), &options(&["hmdb", "lab_number"]))
            .unwrap();

        assert_eq!(result.curies_provided, vec!["HMDB:HMDB0000122"]);
        assert_eq!(result.invalid_ids_provided.get("hmdb"), Some(&vec!["bogus".to_string()]));
        assert_eq!(result.unrecognized_vocabs_provided, vec!["lab_number"]);
    }

    #[test]
    fn test_fail_fast() {
        let normalizer = Normalizer::new();
        let entity = Entity::new().with("hmdb", "bogus");
        let mut opts = options(&["hmdb"]);
        opts.stop_on_invalid_id = true;

        let err = normalizer.normalize(&entity, &AssignedIds::new(), &opts).unwrap_err();
        assert!(matches!(err, MapperError::InvalidIdentifier { ref local_id, .. } if local_id == "bogus"));
    }

    #[test]
    fn test_assigned_ids_keep_provenance() {
        let normalizer = Normalizer::new();
        let mut assigned = AssignedIds::new();
        assigned.insert("metabolomics-workbench", "refmet_id", "RM0135901", IdMetadata::new());
        assigned.insert("metabolomics-workbench", "pubchem_cid", "10917", IdMetadata::new());
        assigned.insert("metabolomics-workbench", "formula", "C7H15NO3", IdMetadata::new());
        assigned.insert("kestrel-hybrid-search", "CHEBI", "17126", IdMetadata::new());
        assigned.insert("kestrel-hybrid-search", "CHEBI", "abc", IdMetadata::new());

        let entity = Entity::new().with("name", "carnitine").with("hmdb", "HMDB0000062");
        let result = normalizer.normalize(&entity, &assigned, &options(&["hmdb"])).unwrap();

        assert_eq!(
            result.curies_assigned["metabolomics-workbench"],
            vec!["PUBCHEM.COMPOUND:10917", "RM:0135901"]
        );
        assert_eq!(result.curies_assigned["kestrel-hybrid-search"], vec!["CHEBI:17126"]);
        assert_eq!(
            result.invalid_ids_assigned["kestrel-hybrid-search"]["CHEBI"],
            vec!["abc".to_string()]
        );
        assert_eq!(result.unrecognized_vocabs_assigned, vec!["formula"]);
        assert_eq!(
            result.curies,
            vec![
                "CHEBI:17126",
                "HMDB:HMDB0000062",
                "PUBCHEM.COMPOUND:10917",
                "RM:0135901"
            ]
        );
        assert_eq!(
            result.iris.get("CHEBI:17126").map(String::as_str),
            Some("http://purl.obolibrary.org/obo/CHEBI_17126")
        );
    }

    #[test]
    fn test_dataset_requires_aligned_assignments() {
        let normalizer = Normalizer::new();
        let dataset = Dataset::new(vec![Entity::new().with("hmdb", "HMDB0000122")]);
        let err = normalizer
            .normalize_dataset(&dataset, &[], &options(&["hmdb"]))
            .unwrap_err();
        assert!(matches!(err, MapperError::RowCountMismatch { expected: 1, actual: 0 }));
    }
}
