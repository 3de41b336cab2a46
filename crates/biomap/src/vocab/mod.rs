//! Identifier vocabularies.
//!
//! A [`Vocabulary`] pairs a canonical lowercase key (`kegg.compound`) with a
//! display prefix (`KEGG.COMPOUND`), an optional IRI root, a validator, an
//! optional cleaner and a list of aliases. The [`VocabRegistry`] is the
//! read-only table the normalizer consults; the built-in one is loaded once
//! per process and shared by reference.
//!
//! # Example
//!
//! ```
//! use biomap::vocab::VocabRegistry;
//!
//! let registry = VocabRegistry::standard();
//! let hmdb = registry.get("hmdb").unwrap();
//! assert_eq!(hmdb.check("HMDB00122").as_deref(), Some("HMDB0000122"));
//! ```

pub mod cleaners;
mod registry;
pub mod validators;

pub use cleaners::clean_vocab_prefix;
pub use registry::{Cleaner, Validator, VocabRegistry, Vocabulary, standard_vocabularies};
