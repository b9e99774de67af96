//! Desired-state documents: the parsed value tree and its loaders.

pub mod loader;
pub mod value;

pub use loader::{DocumentFormat, DocumentLoader, FsDocumentLoader};
pub use value::{Number, StructuredValue};
