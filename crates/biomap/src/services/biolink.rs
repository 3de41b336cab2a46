//! Embedded Biolink category taxonomy.

use std::collections::{BTreeSet, HashMap};

use once_cell::sync::Lazy;
use tracing::{info, warn};

use crate::error::{MapperError, Result};

use super::service::CategoryService;

/// Root of the category hierarchy.
pub const ROOT_CATEGORY: &str = "biolink:NamedThing";

/// `(class name, parent class name)`; the root has no parent.
const CATEGORIES: &[(&str, Option<&str>)] = &[
    ("NamedThing", None),
    ("Attribute", Some("NamedThing")),
    ("ClinicalAttribute", Some("Attribute")),
    ("ClinicalMeasurement", Some("ClinicalAttribute")),
    ("ClinicalModifier", Some("ClinicalAttribute")),
    ("OrganismAttribute", Some("Attribute")),
    ("PhenotypicQuality", Some("OrganismAttribute")),
    ("Activity", Some("NamedThing")),
    ("Procedure", Some("NamedThing")),
    ("Device", Some("NamedThing")),
    ("Event", Some("NamedThing")),
    ("Phenomenon", Some("NamedThing")),
    ("InformationContentEntity", Some("NamedThing")),
    ("Publication", Some("InformationContentEntity")),
    ("Dataset", Some("InformationContentEntity")),
    ("PlanetaryEntity", Some("NamedThing")),
    ("GeographicLocation", Some("PlanetaryEntity")),
    ("EnvironmentalFeature", Some("PlanetaryEntity")),
    ("OrganismTaxon", Some("NamedThing")),
    ("ClinicalEntity", Some("NamedThing")),
    ("ClinicalTrial", Some("ClinicalEntity")),
    ("ClinicalIntervention", Some("ClinicalEntity")),
    ("ChemicalEntity", Some("NamedThing")),
    ("MolecularEntity", Some("ChemicalEntity")),
    ("SmallMolecule", Some("MolecularEntity")),
    ("NucleicAcidEntity", Some("MolecularEntity")),
    ("ChemicalMixture", Some("ChemicalEntity")),
    ("MolecularMixture", Some("ChemicalMixture")),
    ("ComplexMolecularMixture", Some("ChemicalMixture")),
    ("ProcessedMaterial", Some("ChemicalMixture")),
    ("Food", Some("ChemicalMixture")),
    ("Drug", Some("MolecularMixture")),
    ("EnvironmentalFoodContaminant", Some("ChemicalEntity")),
    ("FoodAdditive", Some("ChemicalEntity")),
    ("Polypeptide", Some("ChemicalEntity")),
    ("Protein", Some("Polypeptide")),
    ("BiologicalEntity", Some("NamedThing")),
    ("Gene", Some("BiologicalEntity")),
    ("Transcript", Some("BiologicalEntity")),
    ("RNAProduct", Some("Transcript")),
    ("Genotype", Some("BiologicalEntity")),
    ("DiseaseOrPhenotypicFeature", Some("BiologicalEntity")),
    ("Disease", Some("DiseaseOrPhenotypicFeature")),
    ("PhenotypicFeature", Some("DiseaseOrPhenotypicFeature")),
    ("ClinicalFinding", Some("PhenotypicFeature")),
    ("BiologicalProcessOrActivity", Some("BiologicalEntity")),
    ("BiologicalProcess", Some("BiologicalProcessOrActivity")),
    ("Pathway", Some("BiologicalProcess")),
    ("PhysiologicalProcess", Some("BiologicalProcess")),
    ("Behavior", Some("BiologicalProcess")),
    ("MolecularActivity", Some("BiologicalProcessOrActivity")),
    ("OrganismalEntity", Some("BiologicalEntity")),
    ("AnatomicalEntity", Some("OrganismalEntity")),
    ("CellularComponent", Some("AnatomicalEntity")),
    ("GrossAnatomicalStructure", Some("AnatomicalEntity")),
    ("Cell", Some("OrganismalEntity")),
    ("IndividualOrganism", Some("OrganismalEntity")),
    ("PopulationOfIndividualOrganisms", Some("OrganismalEntity")),
];

/// Free-text entity types that name a category indirectly.
const ALIASES: &[(&str, &str)] = &[
    ("metabolite", "SmallMolecule"),
    ("lipid", "SmallMolecule"),
    ("clinicallab", "ClinicalFinding"),
    ("lab", "ClinicalFinding"),
];

static STANDARD: Lazy<BiolinkTaxonomy> = Lazy::new(BiolinkTaxonomy::build);

/// Category taxonomy backed by an embedded table.
///
/// Category lookups accept `biolink:SmallMolecule`, `SmallMolecule` or
/// `small molecule`; results are class URIs (`biolink:SmallMolecule`).
#[derive(Debug, Clone)]
pub struct BiolinkTaxonomy {
    /// lookup key -> class name
    names: HashMap<String, &'static str>,
    parents: HashMap<&'static str, &'static str>,
    children: HashMap<&'static str, Vec<&'static str>>,
}

impl Default for BiolinkTaxonomy {
    fn default() -> Self {
        STANDARD.clone()
    }
}

impl BiolinkTaxonomy {
    /// The embedded taxonomy.
    pub fn new() -> Self {
        Self::default()
    }

    fn build() -> Self {
        let mut names = HashMap::new();
        let mut parents = HashMap::new();
        let mut children: HashMap<&'static str, Vec<&'static str>> = HashMap::new();

        for &(name, parent) in CATEGORIES {
            names.insert(lookup_key(name), name);
            if let Some(parent) = parent {
                parents.insert(name, parent);
                children.entry(parent).or_default().push(name);
            }
        }

        Self {
            names,
            parents,
            children,
        }
    }

    /// Resolve a category string to its class name.
    fn class_name(&self, category: &str) -> Option<&'static str> {
        self.names.get(&lookup_key(category)).copied()
    }

    /// Whether the string names a known category.
    pub fn is_category(&self, category: &str) -> bool {
        self.class_name(category).is_some()
    }

    /// Number of known categories.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Always false; the table is never empty.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    fn require(&self, category: &str) -> Result<&'static str> {
        self.class_name(category)
            .ok_or_else(|| MapperError::UnknownCategory(category.to_string()))
    }
}

impl CategoryService for BiolinkTaxonomy {
    fn standardize(&self, entity_type: &str) -> String {
        let singular = singularize(entity_type.trim().trim_start_matches("biolink:"));
        let cleaned: String = singular.to_lowercase().split_whitespace().collect();
        let raw = ALIASES
            .iter()
            .find(|(alias, _)| *alias == cleaned)
            .map_or(cleaned.as_str(), |&(_, category)| category);

        match self.class_name(raw) {
            Some(name) => {
                let category = class_uri(name);
                info!("Biolink category for entity type '{}' is: {}", entity_type, category);
                category
            }
            None => {
                warn!(
                    "Could not find valid Biolink category for entity type '{}'. \
                     Will proceed with top-level category {}",
                    entity_type, ROOT_CATEGORY
                );
                ROOT_CATEGORY.to_string()
            }
        }
    }

    fn descendants(&self, category: &str) -> Result<BTreeSet<String>> {
        let start = self.require(category)?;
        let mut result = BTreeSet::new();
        let mut stack = vec![start];
        while let Some(name) = stack.pop() {
            if result.insert(class_uri(name)) {
                if let Some(children) = self.children.get(name) {
                    stack.extend(children.iter().copied());
                }
            }
        }
        Ok(result)
    }

    fn ancestors(&self, category: &str) -> Result<BTreeSet<String>> {
        let mut current = self.require(category)?;
        let mut result = BTreeSet::from([class_uri(current)]);
        while let Some(parent) = self.parents.get(current) {
            result.insert(class_uri(parent));
            current = *parent;
        }
        Ok(result)
    }
}

fn class_uri(name: &str) -> String {
    format!("biolink:{}", name)
}

fn lookup_key(category: &str) -> String {
    category
        .trim()
        .trim_start_matches("biolink:")
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Singularize the last word of a phrase.
///
/// `"metabolites"` -> `"metabolite"`, `"amino acids"` -> `"amino acid"`,
/// `"classes"` -> `"class"`.
pub fn singularize(phrase: &str) -> String {
    let mut words: Vec<String> = phrase.split_whitespace().map(str::to_string).collect();
    let Some(last) = words.last_mut() else {
        return phrase.to_string();
    };
    *last = singular_word(last);
    words.join(" ")
}

fn singular_word(word: &str) -> String {
    let lower = word.to_ascii_lowercase();
    if !word.is_ascii()
        || lower.len() <= 3
        || lower.ends_with("ss")
        || lower.ends_with("us")
        || lower.ends_with("is")
    {
        return word.to_string();
    }
    if lower.ends_with("ies") {
        return format!("{}y", &word[..word.len() - 3]);
    }
    let cut = if ["sses", "xes", "ches", "shes", "zes"].iter().any(|s| lower.ends_with(s)) {
        2
    } else if lower.ends_with('s') {
        1
    } else {
        0
    };
    word[..word.len() - cut].to_string()
}
