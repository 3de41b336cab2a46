//! Vocabulary registry: the table of known identifier namespaces.

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;
use once_cell::sync::Lazy;

use super::cleaners::{self, clean_vocab_prefix};
use super::validators as v;

/// Validator predicate over a cleaned local id.
pub type Validator = fn(&str) -> bool;

/// Cleaner applied to a local id before validation.
pub type Cleaner = fn(&str) -> String;

/// One identifier vocabulary (HMDB, KEGG.COMPOUND, UniProtKB, ...).
#[derive(Debug, Clone)]
pub struct Vocabulary {
    /// Canonical lowercase key (`kegg.compound`).
    pub key: String,
    /// Display-case prefix used in curies (`KEGG.COMPOUND`).
    pub prefix: String,
    /// IRI root the cleaned local id is appended to.
    pub iri: Option<String>,
    /// Alternative field names that map to this vocabulary.
    pub aliases: Vec<String>,
    validator: Validator,
    cleaner: Option<Cleaner>,
}

impl Vocabulary {
    /// Create a vocabulary; the key is derived from the prefix.
    pub fn new(prefix: impl Into<String>, validator: Validator) -> Self {
        let prefix = prefix.into();
        Self {
            key: clean_vocab_prefix(&prefix),
            prefix,
            iri: None,
            aliases: Vec::new(),
            validator,
            cleaner: None,
        }
    }

    /// Set the IRI root. An empty root means the vocabulary has no IRI.
    pub fn with_iri(mut self, iri: impl Into<String>) -> Self {
        let iri = iri.into();
        self.iri = if iri.is_empty() { None } else { Some(iri) };
        self
    }

    /// Set the cleaner.
    pub fn with_cleaner(mut self, cleaner: Cleaner) -> Self {
        self.cleaner = Some(cleaner);
        self
    }

    /// Set the aliases (stored in cleaned form).
    pub fn with_aliases(mut self, aliases: &[&str]) -> Self {
        self.aliases = aliases.iter().map(|a| clean_vocab_prefix(a)).collect();
        self
    }

    /// Root segment of the key (`kegg` for `kegg.compound`).
    pub fn root(&self) -> &str {
        self.key.split('.').next().unwrap_or(&self.key)
    }

    /// Whether the key names a sub-vocabulary.
    pub fn is_sub_vocabulary(&self) -> bool {
        self.key.contains('.')
    }

    /// Apply the cleaner, if any.
    pub fn clean(&self, local_id: &str) -> String {
        match self.cleaner {
            Some(cleaner) => cleaner(local_id),
            None => local_id.to_string(),
        }
    }

    /// Run the validator on an already-cleaned id.
    pub fn validate(&self, local_id: &str) -> bool {
        (self.validator)(local_id)
    }

    /// Clean then validate. Returns the cleaned id when it is valid.
    pub fn check(&self, local_id: &str) -> Option<String> {
        let cleaned = self.clean(local_id);
        self.validate(&cleaned).then_some(cleaned)
    }

    /// IRI for a cleaned local id.
    pub fn iri_for(&self, local_id: &str) -> Option<String> {
        self.iri.as_ref().map(|root| format!("{}{}", root, local_id))
    }
}

/// Read-only table of vocabularies keyed by canonical key.
#[derive(Debug, Clone, Default)]
pub struct VocabRegistry {
    vocabularies: IndexMap<String, Vocabulary>,
    alias_index: HashMap<String, Vec<String>>,
}

static STANDARD: Lazy<Arc<VocabRegistry>> =
    Lazy::new(|| Arc::new(VocabRegistry::from_vocabularies(standard_vocabularies())));

impl VocabRegistry {
    /// The built-in registry, loaded once per process.
    pub fn standard() -> Arc<VocabRegistry> {
        Arc::clone(&STANDARD)
    }

    /// Build a registry from a list of vocabularies. Later entries with the
    /// same key replace earlier ones.
    pub fn from_vocabularies(vocabularies: impl IntoIterator<Item = Vocabulary>) -> Self {
        let mut registry = Self::default();
        for vocabulary in vocabularies {
            registry.vocabularies.insert(vocabulary.key.clone(), vocabulary);
        }
        registry.rebuild_alias_index();
        registry
    }

    fn rebuild_alias_index(&mut self) {
        self.alias_index.clear();
        for vocabulary in self.vocabularies.values() {
            for alias in &vocabulary.aliases {
                self.alias_index
                    .entry(alias.clone())
                    .or_default()
                    .push(vocabulary.key.clone());
            }
        }
    }

    /// Look up a vocabulary by key.
    pub fn get(&self, key: &str) -> Option<&Vocabulary> {
        self.vocabularies.get(key)
    }

    /// Whether a key is registered.
    pub fn contains(&self, key: &str) -> bool {
        self.vocabularies.contains_key(key)
    }

    /// Vocabulary keys whose explicit aliases include `name`.
    pub fn keys_for_alias(&self, name: &str) -> &[String] {
        self.alias_index.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Iterate over all vocabularies in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Vocabulary> {
        self.vocabularies.values()
    }

    /// All keys in registration order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.vocabularies.keys().map(|k| k.as_str())
    }

    /// Number of vocabularies.
    pub fn len(&self) -> usize {
        self.vocabularies.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.vocabularies.is_empty()
    }
}

// =============================================================================
// BUILT-IN TABLE
// =============================================================================

fn vocab(prefix: &str, iri: &str, validator: Validator) -> Vocabulary {
    Vocabulary::new(prefix, validator).with_iri(iri)
}

const OBO: &str = "http://purl.obolibrary.org/obo/";

fn obo(prefix: &str, validator: Validator) -> Vocabulary {
    vocab(prefix, &format!("{}{}_", OBO, prefix), validator)
}

/// The built-in vocabulary table, alphabetical by key.
pub fn standard_vocabularies() -> Vec<Vocabulary> {
    vec![
        obo("AEO", v::is_seven_digit_id),
        vocab("AHRQ", "", v::is_ahrq_id),
        vocab("AraPort", "https://www.arabidopsis.org/servlets/TairObject?accession=", v::is_araport_id),
        vocab("ATC", "https://www.whocc.no/atc_ddd_index/?code=", v::is_atc_id),
        obo("BFO", v::is_digits),
        obo("BSPO", v::is_seven_digit_id),
        vocab("BVBRC", "https://www.bv-brc.org/view/Genome/", v::is_bvbrc_id),
        vocab("CAS", "http://identifiers.org/cas/", v::is_cas_id),
        vocab("CDCSVI", "", v::is_cdcsvi_id),
        obo("CDNO", v::is_seven_digit_id),
        vocab("CGNC", "https://vertebrate.genenames.org/data/gene-symbol-report/#!/cgnc_id/", v::is_numeric_id),
        obo("CHEBI", v::is_numeric_id),
        vocab("CHEMBL.COMPOUND", "http://identifiers.org/chembl.compound/", v::is_chembl_id),
        vocab("CHEMBL.MECHANISM", "https://www.ebi.ac.uk/chembl/mechanism/inspect/", v::is_chembl_mechanism_id),
        vocab("CHEMBL.TARGET", "http://identifiers.org/chembl.target/", v::is_chembl_id),
        vocab("CHR", "", v::is_chr_id),
        vocab("CHV", "", v::is_chv_id),
        obo("CL", v::is_digits),
        obo("CLO", v::is_seven_digit_id).with_aliases(&["celllineontology"]),
        vocab("ComplexPortal", "https://www.ebi.ac.uk/complexportal/complex/", v::is_complexportal_id),
        vocab("CVCL", "https://web.expasy.org/cellosaurus/CVCL_", v::is_cellosaurus_id),
        vocab("CYTOBAND", "", v::is_cytoband_id),
        vocab("dbSNP", "http://identifiers.org/dbsnp/", v::is_dbsnp_id),
        obo("DDANAT", v::is_seven_digit_id),
        vocab("dictyBase", "http://dictybase.org/gene/", v::is_dictybase_id),
        vocab("dictybase.gene", "http://dictybase.org/gene/", v::is_dictybase_id),
        obo("DOID", v::is_digits),
        vocab("DRUGBANK", "http://identifiers.org/drugbank/", v::is_drugbank_id),
        vocab("DrugCentral", "http://translator.ncats.nih.gov/DrugCentral_", v::is_numeric_id),
        vocab("EC", "http://identifiers.org/ec-code/", v::is_ec_id).with_aliases(&["explorenz"]),
        vocab("ecogene", "https://ecocyc.org/gene?orgid=ECOLI&id=", v::is_ecogene_id),
        obo("ECTO", v::is_numeric_id),
        vocab("EFO", "http://www.ebi.ac.uk/efo/EFO_", v::is_seven_digit_id),
        obo("EHDAA2", v::is_seven_digit_id),
        obo("EMAPA", v::is_numeric_id),
        vocab("ENSEMBL", "http://identifiers.org/ensembl/", v::is_ensembl_gene_id).with_aliases(&["gene"]),
        vocab("EnsemblGenomes", "https://www.ensemblgenomes.org/id/", v::is_ensemblgenomes_id),
        obo("ENVO", v::is_digits),
        obo("FAO", v::is_seven_digit_id),
        vocab("FB", "http://identifiers.org/fb/", v::is_flybase_id).with_aliases(&["flybase"]),
        obo("FBbt", v::is_fbbt_id),
        vocab("FIPS.PLACE", "", v::is_fips_place_id),
        vocab("FIPS.STATE", "", v::is_fips_state_id),
        obo("FMA", v::is_numeric_id),
        obo("FOODON", v::is_foodon_id),
        obo("GENEPIO", v::is_seven_digit_id),
        vocab("GeoNames", "http://www.geonames.org/search.html?q=", v::is_geonames_id),
        obo("GO", v::is_seven_digit_id),
        vocab("GTOPDB", "https://www.guidetopharmacology.org/GRAC/LigandDisplayForward?ligandId=", v::is_numeric_id),
        vocab("HCPCS", "http://purl.bioontology.org/ontology/HCPCS/", v::is_hcpcs_id),
        vocab("HGNC", "http://identifiers.org/hgnc/", v::is_numeric_id),
        vocab("HMDB", "http://www.hmdb.ca/metabolites/", v::is_hmdb_id).with_cleaner(cleaners::clean_hmdb_id),
        obo("HP", v::is_seven_digit_id).with_aliases(&["hpo"]),
        vocab("HPS", "", v::is_hps_id),
        vocab("ICD9", "http://translator.ncats.nih.gov/ICD9_", v::is_icd9_id),
        vocab("ICD10", "http://translator.ncats.nih.gov/ICD10_", v::is_icd10_id),
        vocab("ICD10PCS", "https://www.icd10data.com/ICD10PCS/Codes/", v::is_icd10pcs_id),
        vocab("icd11.foundation", "https://icd.who.int/browse11/l-m/en#/", v::is_numeric_id),
        vocab("INCHIKEY", "http://identifiers.org/inchikey/", v::is_inchikey_id),
        vocab("KEGG", "http://identifiers.org/kegg/", v::is_kegg_generic_id),
        vocab("KEGG.COMPOUND", "http://identifiers.org/kegg.compound/", v::is_kegg_compound_id),
        vocab("KEGG.DRUG", "http://identifiers.org/kegg.drug/", v::is_kegg_drug_id),
        vocab("KEGG.ENZYME", "https://www.kegg.jp/entry/ec:", v::is_ec_id),
        vocab("KEGG.GLYCAN", "http://identifiers.org/kegg.glycan/", v::is_kegg_glycan_id),
        vocab("KEGG.REACTION", "http://identifiers.org/kegg.reaction/", v::is_kegg_reaction_id),
        vocab("LIPIDBANK", "", v::is_lipidbank_id),
        vocab("LM", "https://www.lipidmaps.org/databases/lmsd/LM", v::is_lipidmaps_id)
            .with_cleaner(cleaners::clean_lipidmaps_id)
            .with_aliases(&["lipidmaps"]),
        vocab("LOINC", "http://loinc.org/rdf/", v::is_loinc_id),
        obo("MAXO", v::is_seven_digit_id),
        vocab("MEDDRA", "http://identifiers.org/meddra/", v::is_meddra_id),
        vocab("medgen", "https://www.ncbi.nlm.nih.gov/medgen/", v::is_numeric_id),
        vocab("MESH", "http://id.nlm.nih.gov/mesh/", v::is_mesh_id),
        vocab("metacyc.ec", "https://biocyc.org/META/NEW-IMAGE?type=EC-NUMBER&object=EC-", v::is_metacyc_ec_id),
        vocab("metacyc.pathway", "https://metacyc.org/pathway?orgid=META&id=", v::is_metacyc_pathway_id),
        vocab("metacyc.reaction", "https://identifiers.org/metacyc.reaction:", v::is_metacyc_reaction_id),
        vocab("MGI", "http://identifiers.org/mgi/MGI:", v::is_numeric_id),
        obo("MI", v::is_mi_id),
        vocab("mirbase", "https://mirbase.org/hairpin/", v::is_mirbase_id),
        vocab("MIRDB", "https://mirdb.org/cgi-bin/mature_mir.cgi?name=", v::is_mirdb_id),
        obo("MOD", v::is_mod_id),
        obo("MONDO", v::is_seven_digit_id),
        obo("NBO", v::is_seven_digit_id),
        vocab("NCBIGene", "http://identifiers.org/ncbigene/", v::is_digits)
            .with_aliases(&["entrez", "entrezgene", "gene"]),
        obo("NCBITaxon", v::is_numeric_id).with_aliases(&["ncbitaxonomy"]),
        obo("NCIT", v::is_ncit_id),
        vocab("NDDF", "http://purl.bioontology.org/ontology/NDDF/", v::is_numeric_id),
        vocab("NDFRT", "http://purl.bioontology.org/ontology/NDFRT/", v::is_ndfrt_id),
        vocab("NHANES", "https://dsld.od.nih.gov/label/", v::is_digits),
        obo("OBA", v::is_seven_digit_id),
        obo("OBI", v::is_seven_digit_id),
        vocab("OBO", OBO, v::is_obo_id),
        vocab("OMIM", "http://purl.bioontology.org/ontology/OMIM/", v::is_omim_id),
        vocab("OMIM.PS", "https://www.omim.org/phenotypicSeries/PS", v::is_omim_ps_id),
        vocab("ORPHANET", "http://www.orpha.net/ORDO/Orphanet_", v::is_numeric_id).with_aliases(&["orpha"]),
        vocab("PathWhiz", "http://smpdb.ca/pathwhiz/pathways/", v::is_pathwhiz_id),
        vocab("PathWhiz.Bound", "https://smpdb.ca/pathwhiz/reactions/", v::is_numeric_id),
        vocab("PathWhiz.Compound", "https://smpdb.ca/pathwhiz/metabolites/", v::is_numeric_id),
        vocab("PathWhiz.ElementCollection", "https://smpdb.ca/pathwhiz/", v::is_numeric_id),
        vocab("PathWhiz.NucleicAcid", "https://smpdb.ca/pathwhiz/", v::is_numeric_id),
        vocab("PathWhiz.ProteinComplex", "https://smpdb.ca/pathwhiz/", v::is_numeric_id),
        vocab("PathWhiz.Reaction", "https://smpdb.ca/pathwhiz/reactions/", v::is_numeric_id),
        obo("PATO", v::is_seven_digit_id),
        vocab("PDQ", "https://www.cancer.gov/publications/pdq", v::is_pdq_id),
        vocab("PFAM", "http://identifiers.org/pfam/", v::is_pfam_id),
        vocab("PHARMVAR", "", v::is_pharmvar_id),
        vocab("PLANTFA", "", v::is_plantfa_id),
        obo("PO", v::is_seven_digit_id),
        vocab("PomBase", "https://www.pombase.org/gene/", v::is_pombase_id),
        obo("PR", v::is_pr_id),
        vocab("PSY", "", v::is_numeric_id),
        vocab("PUBCHEM.COMPOUND", "http://pubchem.ncbi.nlm.nih.gov/compound/", v::is_numeric_id),
        vocab("REACT", "https://reactome.org/content/detail/", v::is_reactome_id).with_aliases(&["reactome"]),
        vocab("RGD", "http://identifiers.org/rgd/", v::is_numeric_id),
        vocab("RHEA", "http://identifiers.org/rhea/", v::is_numeric_id),
        vocab(
            "RM",
            "https://www.metabolomicsworkbench.org/databases/refmet/refmet_details.php?REFMET_ID=RM",
            v::is_seven_digit_id,
        )
        .with_cleaner(cleaners::clean_refmet_id)
        .with_aliases(&["refmet"]),
        vocab("RXCUI", "https://mor.nlm.nih.gov/RxNav/search?searchBy=RXCUI&searchTerm=", v::is_numeric_id),
        vocab("RXNORM", "http://purl.bioontology.org/ontology/RXNORM/", v::is_numeric_id),
        vocab("SGD", "http://identifiers.org/sgd/", v::is_sgd_id),
        vocab("SLM", "https://www.swisslipids.org/#/entity/SLM:", v::is_digits)
            .with_cleaner(cleaners::clean_swisslipids_id)
            .with_aliases(&["swisslipids"]),
        vocab("SMILES", "https://pubchem.ncbi.nlm.nih.gov/compound/", v::is_smiles_string),
        vocab("SMPDB", "https://smpdb.ca/view/", v::is_smpdb_id),
        vocab("SNOMEDCT", "http://snomed.info/id/", v::is_digits).with_aliases(&["snomed"]),
        obo("SO", v::is_seven_digit_id),
        vocab("ttd.target", "https://db.idrblab.net/ttd/data/target/details/", v::is_ttd_target_id),
        obo("UBERON", v::is_digits),
        vocab("UMLS", "http://identifiers.org/umls/", v::is_umls_id),
        vocab("UNII", "http://identifiers.org/unii/", v::is_unii_id),
        vocab("UniProtKB", "http://purl.uniprot.org/uniprot/", v::is_uniprot_id).with_aliases(&["uniprot"]),
        obo("UO", v::is_seven_digit_id),
        vocab("USZIPCODE", "https://www.unitedstateszipcodes.org/", v::is_uszipcode_id)
            .with_cleaner(cleaners::clean_zipcode),
        vocab("VANDF", "https://www.nlm.nih.gov/research/umls/sourcereleasedocs/current/VANDF/", v::is_token),
        vocab("VESICLEPEDIA", "http://microvesicles.org/exp_summary?exp_id=", v::is_digits),
        vocab("WB", "http://identifiers.org/wb/", v::is_wormbase_gene_id).with_aliases(&["wormbase"]),
        vocab("WIKIPATHWAYS", "http://identifiers.org/wikipathways/", v::is_wikipathways_id)
            .with_cleaner(cleaners::clean_wikipathways_id),
        obo("ZFA", v::is_seven_digit_id),
        vocab("ZFIN", "http://identifiers.org/zfin/", v::is_zfin_id),
    ]
}
