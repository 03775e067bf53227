//! Handler registry and binder
//!
//! The registry maps each construct's DDL name to its handler and the
//! (schema, table) it was bound to. It is an explicitly owned context object
//! constructed once at startup and passed by reference into reconciliation
//! and execution, so tests can instantiate isolated registries. Entries are
//! write-once: created during the single-threaded bind phase, read-only
//! thereafter, never removed.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::ddl::handler::DdlHandler;
use crate::ddl::operations::DEFAULT_SCHEMA;
use crate::error::{Error, Result};
use crate::models::metadata::{ConstructDeclaration, ModelDescriptor, ModelMetadata};

/// One bound handler: the handler instance plus the (schema, table) it was
/// stamped with at bind time
#[derive(Clone)]
pub struct RegistryEntry {
    pub handler: Arc<dyn DdlHandler>,
    pub schema: Option<String>,
    pub table: String,
}

impl std::fmt::Debug for RegistryEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryEntry")
            .field("schema", &self.schema)
            .field("table", &self.table)
            .finish()
    }
}

/// Registry of bound DDL handlers, keyed by DDL name
///
/// Backed by an `IndexMap` so iteration order is the bind order, which keeps
/// identity-query scans and generated scripts reproducible.
#[derive(Debug, Default)]
pub struct DdlRegistry {
    entries: IndexMap<String, RegistryEntry>,
}

impl DdlRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a handler to a model.
    ///
    /// Computes the declared DDL name, stores the handler under it, and
    /// appends `{schema, table, ddl_name}` to the metadata's
    /// construct-declaration list. Binding the identical association twice is
    /// a no-op; binding the same DDL name to a differing (schema, table) is a
    /// configuration error.
    ///
    /// Returns the DDL name the handler was bound under.
    pub fn bind(
        &mut self,
        model: &ModelDescriptor,
        metadata: &mut ModelMetadata,
        handler: Arc<dyn DdlHandler>,
    ) -> Result<String> {
        let schema_name = model.schema.as_deref().unwrap_or(DEFAULT_SCHEMA);
        let ddl_name = handler.identity_from_declaration(schema_name, &model.table);

        if let Some(existing) = self.entries.get(&ddl_name) {
            if existing.schema != model.schema || existing.table != model.table {
                return Err(Error::IdentityCollision {
                    ddl_name,
                    existing_schema: existing.schema.clone(),
                    existing_table: existing.table.clone(),
                    schema: model.schema.clone(),
                    table: model.table.clone(),
                });
            }

            // Same association re-declared; keep the original entry.
            tracing::debug!(ddl_name = %ddl_name, "Handler already bound, skipping");
            return Ok(ddl_name);
        }

        metadata.append_construct(ConstructDeclaration {
            schema: model.schema.clone(),
            table: model.table.clone(),
            ddl_name: ddl_name.clone(),
        });

        tracing::debug!(
            ddl_name = %ddl_name,
            schema = model.schema.as_deref(),
            table = %model.table,
            "Bound DDL handler"
        );

        self.entries.insert(
            ddl_name.clone(),
            RegistryEntry {
                handler,
                schema: model.schema.clone(),
                table: model.table.clone(),
            },
        );

        Ok(ddl_name)
    }

    /// Look up the entry bound under a DDL name
    pub fn get(&self, ddl_name: &str) -> Option<&RegistryEntry> {
        self.entries.get(ddl_name)
    }

    /// All entries in bind order
    pub fn entries(&self) -> impl Iterator<Item = (&str, &RegistryEntry)> {
        self.entries.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
