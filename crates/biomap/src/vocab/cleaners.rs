//! Cleaners that bring raw local ids into the form their validator expects.

use once_cell::sync::Lazy;
use regex::Regex;

static NON_KEY_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9.]").unwrap());

/// Lowercase a vocabulary name and drop everything but `[a-z0-9.]`.
///
/// `"KEGG.COMPOUND"` -> `"kegg.compound"`, `"PathWhiz.Bound"` ->
/// `"pathwhiz.bound"`, `"uniprot_kb"` -> `"uniprotkb"`.
pub fn clean_vocab_prefix(vocab: &str) -> String {
    NON_KEY_CHARS
        .replace_all(&vocab.to_lowercase(), "")
        .into_owned()
}

/// Repair doubled prefixes and widen legacy five-digit HMDB ids to seven.
pub fn clean_hmdb_id(local_id: &str) -> String {
    let id = if local_id.starts_with("HMDBHMDB") {
        &local_id[4..]
    } else {
        local_id
    };

    match id.strip_prefix("HMDB") {
        Some(digits) if id.len() == 9 => format!("HMDB00{}", digits),
        _ => id.to_string(),
    }
}

/// Drop a leading `LM` (LIPID MAPS ids are stored without it).
pub fn clean_lipidmaps_id(local_id: &str) -> String {
    local_id.strip_prefix("LM").unwrap_or(local_id).to_string()
}

/// Drop a leading `RM` (RefMet ids are stored as bare digits).
pub fn clean_refmet_id(local_id: &str) -> String {
    local_id.strip_prefix("RM").unwrap_or(local_id).to_string()
}

/// Drop a leading `SLM:` that survives prefix stripping.
pub fn clean_swisslipids_id(local_id: &str) -> String {
    local_id.strip_prefix("SLM:").unwrap_or(local_id).to_string()
}

/// Strip a state prefix from ZIP codes like `AZ-85039`.
pub fn clean_zipcode(local_id: &str) -> String {
    local_id.rsplit('-').next().unwrap_or(local_id).to_string()
}

/// Strip the revision suffix from ids like `WP5395_r126912`.
pub fn clean_wikipathways_id(local_id: &str) -> String {
    local_id.split('_').next().unwrap_or(local_id).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_vocab_prefix() {
        assert_eq!(clean_vocab_prefix("KEGG.COMPOUND"), "kegg.compound");
        assert_eq!(clean_vocab_prefix("PathWhiz.Bound"), "pathwhiz.bound");
        assert_eq!(clean_vocab_prefix("uniprot_kb"), "uniprotkb");
        assert_eq!(clean_vocab_prefix("ICD-10"), "icd10");
    }

    #[test]
    fn test_clean_hmdb() {
        assert_eq!(clean_hmdb_id("HMDB00122"), "HMDB0000122");
        assert_eq!(clean_hmdb_id("HMDBHMDB0000122"), "HMDB0000122");
        assert_eq!(clean_hmdb_id("HMDBHMDB00122"), "HMDB0000122");
        assert_eq!(clean_hmdb_id("HMDB0000122"), "HMDB0000122");
    }

    #[test]
    fn test_prefix_cleaners() {
        assert_eq!(clean_lipidmaps_id("LMFA01010001"), "FA01010001");
        assert_eq!(clean_refmet_id("RM0135901"), "0135901");
        assert_eq!(clean_swisslipids_id("SLM:000399049"), "000399049");
        assert_eq!(clean_refmet_id("0135901"), "0135901");
    }

    #[test]
    fn test_zip_and_wikipathways() {
        assert_eq!(clean_zipcode("AZ-85039"), "85039");
        assert_eq!(clean_zipcode("85039"), "85039");
        assert_eq!(clean_wikipathways_id("WP5395_r126912"), "WP5395");
    }
}
