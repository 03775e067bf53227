//! Model metadata for DDLSync
//!
//! This module holds the interface to the declarative model layer: per-model
//! descriptors and the shared metadata state that carries the
//! construct-declaration list.

pub mod metadata;

pub use metadata::{ConstructDeclaration, ModelDescriptor, ModelMetadata};
