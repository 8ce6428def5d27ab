//! Bytecode object loading
//!
//! - [`loader`]: ELF parsing into a [`CollectionSpec`](crate::model::CollectionSpec)
//! - [`sections`]: section naming conventions

pub mod loader;
pub mod sections;

pub use loader::{load_collection_spec, parse_collection_spec};
