//! Compact identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A standardized identifier `PREFIX:local_id`, with its IRI when known.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Curie {
    /// Display-case vocabulary prefix.
    pub prefix: String,
    /// Cleaned local id.
    pub local_id: String,
    /// Resolvable IRI, if the vocabulary has one.
    pub iri: Option<String>,
}

impl Curie {
    /// Create a curie.
    pub fn new(prefix: impl Into<String>, local_id: impl Into<String>, iri: Option<String>) -> Self {
        Self {
            prefix: prefix.into(),
            local_id: local_id.into(),
            iri,
        }
    }
}

impl fmt::Display for Curie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.prefix, self.local_id)
    }
}

/// Strip a leading `PREFIX:` from a local id.
///
/// URLs keep their scheme; everything after the first colon is kept, so
/// `SLM:000399049` becomes `000399049` and `https://x/y` is unchanged.
pub fn strip_curie_prefix(local_id: &str) -> &str {
    if local_id.starts_with("http") {
        return local_id;
    }
    match local_id.split_once(':') {
        Some((_, rest)) => rest,
        None => local_id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let curie = Curie::new("KEGG.COMPOUND", "C00487", None);
        assert_eq!(curie.to_string(), "KEGG.COMPOUND:C00487");
    }

    #[test]
    fn test_strip_prefix() {
        assert_eq!(strip_curie_prefix("CHEBI:17126"), "17126");
        assert_eq!(strip_curie_prefix("17126"), "17126");
        assert_eq!(strip_curie_prefix("http://purl.obolibrary.org/obo/CHEBI_17126"), "http://purl.obolibrary.org/obo/CHEBI_17126");
        assert_eq!(strip_curie_prefix("OBO:INO_0000018"), "INO_0000018");
    }
}
