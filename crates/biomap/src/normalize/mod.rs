//! Normalization of local identifiers into curies.
//!
//! The [`Normalizer`] infers which vocabularies an id field refers to from
//! its name, cleans and validates every local id against those
//! vocabularies, and builds a [`Curie`] from the first vocabulary that
//! accepts it. Provided and assigned identifiers are kept apart so later
//! stages can report where each curie came from.
//!
//! # Example
//!
//! ```
//! use biomap::normalize::Normalizer;
//!
//! let normalizer = Normalizer::new();
//! let vocabs = normalizer.determine_vocab("HMDB ID").unwrap();
//! let curie = normalizer.construct_curie("HMDB00122", &vocabs).unwrap();
//! assert_eq!(curie.to_string(), "HMDB:HMDB0000122");
//! ```

mod curie;
mod normalizer;
mod parse;

pub use curie::{Curie, strip_curie_prefix};
pub use normalizer::{
    CurieSet, DEFAULT_ARRAY_DELIMITERS, NormalizeOptions, Normalization, Normalizer,
    clean_field_name,
};
pub use parse::{parse_delimited, parse_literal_list};
