//! Linking: resolving curies to canonical KG nodes.
//!
//! The [`Linker`] sends every curie of an entity (or of a whole dataset, in
//! a single request) to the KG canonicalization service, then inverts the
//! answer into node -> supporting curies, per origin. Curies the KG does
//! not know are reported as misses.

mod linker;

pub use linker::{KgLinks, Linker, VoteMap, reverse_curie_map};
