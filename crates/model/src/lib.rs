//! Microcheck Model Artifacts
//!
//! A model is an opaque byte blob handed unmodified to the inference engine.
//! The only thing read from it here is the schema version stored in its
//! FlatBuffers root table.

mod artifact;
mod error;
mod header;

pub use artifact::ModelArtifact;
pub use error::{ModelError, Result};
pub use header::{ModelHeader, FILE_IDENTIFIER, MIN_HEADER_LEN, SCHEMA_VERSION};
