//! Entity records and datasets.
//!
//! An [`Entity`] is one biological record (a protein, metabolite, disease,
//! ...) stored as an ordered mapping from field name to JSON value. A
//! [`Dataset`] is an ordered collection of entities sharing one schema.
//! Pipeline stages never mutate either; they read them by reference and
//! return derived values that can be merged onto a copy.

mod record;
mod value;

pub use record::{Dataset, Entity};
pub use value::{DASHES, clean_local_id, is_blank, is_dash, value_to_list};
