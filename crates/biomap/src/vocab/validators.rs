//! Local identifier validators, one predicate per vocabulary family.
//!
//! Every validator takes an already-cleaned local id (prefix stripped,
//! whitespace trimmed) and answers whether it is well formed for its
//! vocabulary. Validators never allocate beyond the lazily compiled regex.

use once_cell::sync::Lazy;
use regex::Regex;

// =============================================================================
// PATTERN VALIDATORS
// =============================================================================
// Each pattern is compiled once on first use.

macro_rules! pattern_validator {
    ($(#[$doc:meta])* $name:ident, $pattern:expr) => {
        $(#[$doc])*
        pub fn $name(local_id: &str) -> bool {
            static PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new($pattern).unwrap());
            PATTERN.is_match(local_id)
        }
    };
}

pattern_validator!(
    /// One or more ASCII digits (zero allowed).
    is_digits,
    r"^\d+$"
);
pattern_validator!(
    /// Exactly seven digits, the common OBO ontology width (HP, PATO, SO, ...).
    is_seven_digit_id,
    r"^\d{7}$"
);
pattern_validator!(
    /// LOINC codes (`27858-0`) or LOINC parts (`LP32606-3`).
    is_loinc_id,
    r"^(LP)?\d+-\d$"
);
pattern_validator!(
    /// Three uppercase letters and four digits (`XPR4101`).
    is_lipidbank_id,
    r"^[A-Z]{3}\d{4}$"
);
pattern_validator!(
    /// Two uppercase letters then uppercase alphanumerics (`ST02030282`).
    is_lipidmaps_id,
    r"^[A-Z]{2}[A-Z0-9]+$"
);
pattern_validator!(is_mesh_id, r"^[DCM]\d+$");
pattern_validator!(
    /// Three numeric EC groups and an alphanumeric final group.
    is_metacyc_ec_id,
    r"^\d+\.\d+\.\d+\.[a-zA-Z0-9]+$"
);
pattern_validator!(is_cellosaurus_id, r"^[A-Z0-9]{4}$");
pattern_validator!(
    /// Chromosome, arm, band and optional sub-band (`1p36.33`).
    is_cytoband_id,
    r"^(\d{1,2}|[XYxy])[pq]\d+(\.\d+)?$"
);
pattern_validator!(is_mirbase_id, r"^(MI|MIMAT)\d{7}$");
pattern_validator!(is_mirdb_id, r"^[a-z]{3}-(miR-)?[-a-z0-9]+$");
pattern_validator!(is_dbsnp_id, r"^rs\d+(\.\d+)?$");
pattern_validator!(is_ensembl_gene_id, r"^ENSG\d{11}$");
pattern_validator!(is_ensemblgenomes_id, r"^[A-Za-z0-9_.\-]+$");
pattern_validator!(is_plantfa_id, r"^\d{5}$");
pattern_validator!(
    /// Reactome stable ids (`R-HSA-162582`).
    is_reactome_id,
    r"^R-[A-Z]{3}-\d+$"
);
pattern_validator!(is_kegg_reaction_id, r"^R\d{5}$");
pattern_validator!(is_kegg_drug_id, r"^D\d{5}$");
pattern_validator!(
    /// `C` followed by exactly five digits.
    is_kegg_compound_id,
    r"^C\d{5}$"
);
pattern_validator!(is_kegg_glycan_id, r"^G\d{5}$");
pattern_validator!(
    /// Pathway maps (`04966`) or any single-letter KEGG entry (`C00031`).
    is_kegg_generic_id,
    r"^([A-Z]?\d{5})$"
);
pattern_validator!(is_wikipathways_id, r"^WP\d+$");
pattern_validator!(is_drugbank_id, r"^DB\d{5}$");
pattern_validator!(is_ncit_id, r"^C\d+$");
pattern_validator!(is_umls_cui, r"^C\d{7}$");
pattern_validator!(is_umls_mthu_id, r"^MTHU\d{6}$");
pattern_validator!(is_pfam_id, r"^(PF|CL)\d+$");
pattern_validator!(
    /// Gene symbol, star allele and optional sub-allele (`CYP26A1*1.001`).
    is_pharmvar_id,
    r"^[A-Z0-9]+\*\d+(\.\d+)?$"
);
pattern_validator!(is_uniprot_feature_id, r"^([A-Z0-9]{6}|[A-Z0-9]{10})-PRO_\d+$");
pattern_validator!(
    /// Standard InChIKey layout (`AMOFQIUOTAJRKS-UHFFFAOYSA-N`).
    is_inchikey_id,
    r"^([A-Z]{14}|[A-Z]{12})-[A-Z]{10}-[A-Z]$"
);
pattern_validator!(is_icd10_id, r"^[A-Z][A-Z0-9]{2}(\.[A-Z0-9]+)?$");
pattern_validator!(
    /// `HMDB` followed by five (legacy) or seven digits.
    is_hmdb_id,
    r"^HMDB(\d{5}|\d{7})$"
);
pattern_validator!(is_hps_id, r"^[a-zA-Z_]+$");
pattern_validator!(is_complexportal_id, r"^CPX-\d+$");
pattern_validator!(is_ahrq_id, r"^[A-Z0-9_]+$");
pattern_validator!(is_bvbrc_id, r"^\d+\.\d+$");
pattern_validator!(
    /// CAS registry numbers (`2906-39-0`).
    is_cas_id,
    r"^\d{2,7}-\d{2}-\d$"
);
pattern_validator!(is_cdcsvi_id, r"^[A-Z]+$");
pattern_validator!(is_chembl_id, r"^CHEMBL\d+$");
pattern_validator!(is_fips_place_id, r"^(\d{6}|\d{7}|\d{11}|\d{12})$");
pattern_validator!(is_fips_state_id, r"^\d{2}$");
pattern_validator!(is_geonames_id, r"^[A-Z]{2}(\.[A-Z0-9]+)*$");
pattern_validator!(is_ndfrt_id, r"^N\d{10}$");
pattern_validator!(is_atc_id, r"^[A-Z]\d{2}[A-Z]{2}\d{2}$");
pattern_validator!(
    /// FDA Unique Ingredient Identifiers: ten uppercase alphanumerics.
    is_unii_id,
    r"^[A-Z0-9]{10}$"
);
pattern_validator!(is_pathwhiz_id, r"^PW\d{6}$");
pattern_validator!(is_smpdb_id, r"^SMP\d{7}$");
pattern_validator!(is_omim_ps_id, r"^\d{6}$");
pattern_validator!(
    /// Lowercase mechanism slugs (`integrin_beta-7_antagonist`).
    is_chembl_mechanism_id,
    r"^[a-z0-9_()\-,./+']+$"
);
pattern_validator!(is_fbbt_id, r"^\d{8}$");
pattern_validator!(is_mod_id, r"^\d{5}$");
pattern_validator!(is_mi_id, r"^\d{4}$");
pattern_validator!(
    /// Generic OBO local ids; anything without whitespace.
    is_obo_id,
    r"^[A-Za-z0-9_#:.\-]+$"
);
pattern_validator!(is_meddra_id, r"^\d{8}$");
pattern_validator!(is_icd10pcs_id, r"^[A-Z0-9]{7}$");
pattern_validator!(is_hcpcs_id, r"^[A-Z]\d{4}$");
pattern_validator!(is_pdq_id, r"^CDR\d{10}$");
pattern_validator!(is_chv_id, r"^\d{10}$");
pattern_validator!(is_foodon_id, r"^\d{8}$");
pattern_validator!(
    /// FlyBase ids with a known type code (`FBgn0019985`, `FBtr0073412`).
    is_flybase_id,
    r"^FB(gn|tr|pp|al|ab|ba|cl|ig|lc|ms|rf|sf|st|te|tp|og|sn)\d{7}$"
);
pattern_validator!(is_wormbase_gene_id, r"^WBGene\d{8}$");
pattern_validator!(is_zfin_id, r"^ZDB-[A-Z]+-\d{6}-\d+$");
pattern_validator!(is_sgd_id, r"^S\d{9}$");
pattern_validator!(is_pombase_id, r"^SP[A-Z0-9]+\.\d+c?$");
pattern_validator!(is_dictybase_id, r"^DDB_G\d{7}$");
pattern_validator!(is_araport_id, r"^AT[1-5CM]G\d{5}$");
pattern_validator!(is_ecogene_id, r"^EG\d+$");
pattern_validator!(is_ttd_target_id, r"^T\d{5}$");
pattern_validator!(is_chr_chars, r"^[a-z0-9_/\-]+$");
pattern_validator!(is_smiles_chars, r"^[a-zA-Z0-9\[\](){}=#%+\\/@.\-*:]+$");
pattern_validator!(is_uniprot_shape, r"^([A-Z0-9]{6}|[A-Z0-9]{10})(-\d+)?$");
pattern_validator!(is_metacyc_reaction_chars, r"^[A-Za-z0-9\-.+]+$");
pattern_validator!(is_metacyc_pathway_chars, r"^[A-Z0-9\-+]+$");
pattern_validator!(is_icd9_code, r"^\d{3}(\.\d{1,2})?$");
pattern_validator!(is_zipcode_digits, r"^\d{5}$");

// =============================================================================
// COMPOSITE VALIDATORS
// =============================================================================

/// Positive integers (`0` is rejected).
pub fn is_numeric_id(local_id: &str) -> bool {
    is_digits(local_id) && local_id.bytes().any(|b| b != b'0')
}

/// UMLS concept ids or MTHU ids.
pub fn is_umls_id(local_id: &str) -> bool {
    is_umls_cui(local_id) || is_umls_mthu_id(local_id)
}

/// Canonical six-digit OMIM ids, or MTHU ids carried over from UMLS.
pub fn is_omim_id(local_id: &str) -> bool {
    is_omim_ps_id(local_id) || is_umls_mthu_id(local_id)
}

/// UniProtKB accessions (6 or 10 chars, optional isoform) or feature ids.
pub fn is_uniprot_id(local_id: &str) -> bool {
    if is_uniprot_feature_id(local_id) {
        return true;
    }
    if !is_uniprot_shape(local_id) {
        return false;
    }
    let base = local_id.split('-').next().unwrap_or(local_id);
    has_letter_and_digit(base)
}

/// Protein Ontology: UniProt-style six-character ids or nine-digit PR ids.
pub fn is_pr_id(local_id: &str) -> bool {
    if local_id.len() == 9 && is_digits(local_id) {
        return true;
    }
    local_id.len() == 6
        && local_id.bytes().all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
        && has_letter_and_digit(local_id)
}

/// EC numbers with one to four groups (`3.1.7.2`, `1.14.13.M81`, `3.4.-.-`).
pub fn is_ec_id(local_id: &str) -> bool {
    static GROUP: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+|[A-Z]+\d*|-)$").unwrap());
    let groups: Vec<&str> = local_id.split('.').collect();
    (1..=4).contains(&groups.len()) && groups.iter().all(|g| GROUP.is_match(g))
}

/// ICD-9 codes (`344.81`) or ranges (`317-319.99`).
pub fn is_icd9_id(local_id: &str) -> bool {
    match local_id.split_once('-') {
        Some((start, end)) => is_icd9_code(start) && is_icd9_code(end),
        None => is_icd9_code(local_id),
    }
}

/// Five-digit US ZIP codes, or `US` for the whole country.
pub fn is_uszipcode_id(local_id: &str) -> bool {
    is_zipcode_digits(local_id) || local_id == "US"
}

/// County Health Rankings measure slugs; must contain a letter.
pub fn is_chr_id(local_id: &str) -> bool {
    is_chr_chars(local_id) && local_id.chars().any(|c| c.is_ascii_alphabetic())
}

/// Permissive SMILES check: allowed character set and at least one atom letter.
pub fn is_smiles_string(local_id: &str) -> bool {
    is_smiles_chars(local_id) && local_id.chars().any(|c| c.is_ascii_alphabetic())
}

/// MetaCyc reaction ids (`TRANS-RXN0-593`, `3.2.1.68-RXN`).
///
/// Each dash-separated part is uppercase, purely alphabetic, or has no
/// letters at all, and the id mentions `RXN` somewhere.
pub fn is_metacyc_reaction_id(local_id: &str) -> bool {
    if !is_metacyc_reaction_chars(local_id) || !local_id.contains("RXN") {
        return false;
    }
    local_id.split('-').all(|part| {
        let has_alpha = part.chars().any(|c| c.is_ascii_alphabetic());
        let all_alpha = !part.is_empty() && part.chars().all(|c| c.is_ascii_alphabetic());
        !has_alpha || all_alpha || !part.chars().any(|c| c.is_ascii_lowercase())
    })
}

/// MetaCyc pathway ids (`PWY-5022`, `GLYCOLYSIS-PWY`).
pub fn is_metacyc_pathway_id(local_id: &str) -> bool {
    is_metacyc_pathway_chars(local_id) && local_id.chars().any(|c| c.is_ascii_uppercase())
}

/// Anything non-empty with no whitespace. Used for vocabularies whose ids
/// have no published structure (VANDF, GtoPdb ligands, ...).
pub fn is_token(local_id: &str) -> bool {
    !local_id.is_empty() && !local_id.chars().any(char::is_whitespace)
}

fn has_letter_and_digit(value: &str) -> bool {
    value.chars().any(|c| c.is_ascii_alphabetic()) && value.chars().any(|c| c.is_ascii_digit())
}
