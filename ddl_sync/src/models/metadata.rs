//! Model descriptors and shared metadata state
//!
//! The surrounding model layer owns table definitions; DDLSync only needs the
//! (schema, table) pair per model and a place to record which constructs were
//! declared against it. The construct-declaration list is append-only at
//! declaration time and read once per reconciliation pass.

use crate::ddl::operations::ConstructRef;

/// The (schema, table) identity of one declared model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelDescriptor {
    pub schema: Option<String>,
    pub table: String,
}

impl ModelDescriptor {
    pub fn new(schema: Option<String>, table: impl Into<String>) -> Self {
        Self {
            schema,
            table: table.into(),
        }
    }
}

/// One entry in the construct-declaration list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstructDeclaration {
    pub schema: Option<String>,
    pub table: String,
    pub ddl_name: String,
}

/// Shared metadata state holding the declared-construct list for all models
///
/// Mirrors the `info` side-channel a model-metadata object exposes: the binder
/// appends to it at declaration time, the reconciler reads it back as the
/// desired state.
#[derive(Debug, Default)]
pub struct ModelMetadata {
    constructs: Vec<ConstructDeclaration>,
}

impl ModelMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a declaration unless the identical entry is already present.
    ///
    /// Binding the same handler/model pair twice must never duplicate
    /// entries.
    pub fn append_construct(&mut self, declaration: ConstructDeclaration) {
        if !self.constructs.contains(&declaration) {
            self.constructs.push(declaration);
        }
    }

    /// The declared constructs, in declaration order
    pub fn constructs(&self) -> &[ConstructDeclaration] {
        &self.constructs
    }

    /// The desired state as (ddl_name, schema, table) triples
    pub fn desired_constructs(&self) -> Vec<ConstructRef> {
        self.constructs
            .iter()
            .map(|d| ConstructRef::new(d.ddl_name.clone(), d.schema.clone(), d.table.clone()))
            .collect()
    }
}
