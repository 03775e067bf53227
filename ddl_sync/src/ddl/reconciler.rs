//! Construct reconciler
//!
//! Diffs the declared construct list (desired state) against what the live
//! database reports (actual state) and emits the add/drop operations needed
//! to converge the two. Invoked explicitly by the surrounding migration
//! pipeline as its comparison hook.

use std::collections::HashMap;

use crate::db::connection::DatabaseConnection;
use crate::ddl::operations::{ConstructRef, DdlOperation};
use crate::ddl::registry::DdlRegistry;
use crate::error::{Error, Result};
use crate::models::metadata::ModelMetadata;

/// Scan the database for existing constructs and diff them against the
/// declared construct list.
///
/// `schemas` is the scan list supplied by the pipeline; a `None` entry means
/// the default schema. Returns the operations to append to the pipeline's
/// upgrade output: adds first, then drops, each group sorted by DDL name. If
/// any identity query fails, the whole pass fails and no operations are
/// produced.
pub async fn compare_ddl(
    schemas: &[Option<String>],
    connection: &DatabaseConnection,
    registry: &DdlRegistry,
    metadata: &ModelMetadata,
    default_schema: &str,
) -> Result<Vec<DdlOperation>> {
    tracing::info!(handlers = registry.len(), "Comparing declared DDL constructs");

    let mut actual: Vec<ConstructRef> = Vec::new();

    for schema in schemas {
        let schema_name = schema.as_deref().unwrap_or(default_schema);

        for (bound_name, entry) in registry.entries() {
            let statement = entry.handler.identity_query(schema_name, &entry.table);
            let rows = connection
                .fetch_identity_rows(&statement)
                .await
                .map_err(|e| {
                    Error::ReconcileError(format!(
                        "identity query for '{}' failed: {}",
                        bound_name, e
                    ))
                })?;

            for ddl_name in rows {
                // A handler bound without a schema reports its construct as
                // schema-less, matching how it was declared.
                let found_schema = entry
                    .schema
                    .as_ref()
                    .map(|_| schema_name.to_string());

                tracing::debug!(
                    ddl_name = %ddl_name,
                    schema = %schema_name,
                    table = %entry.table,
                    "Found existing construct"
                );

                actual.push(ConstructRef::new(ddl_name, found_schema, entry.table.clone()));
            }
        }
    }

    let desired = metadata.desired_constructs();

    Ok(diff_constructs(&desired, &actual, default_schema))
}

/// Compute the add/drop operations converging `actual` onto `desired`.
///
/// A construct is atomic: it either fully exists or does not, so this is a
/// plain set difference with no content diffing. Parameter changes must be
/// modeled by the declaring code as an explicit drop-then-add. A `None`
/// schema compares equal to the default schema, not as a wildcard.
pub fn diff_constructs(
    desired: &[ConstructRef],
    actual: &[ConstructRef],
    default_schema: &str,
) -> Vec<DdlOperation> {
    let desired_keys = keyed(desired, default_schema);
    let actual_keys = keyed(actual, default_schema);

    let mut to_add: Vec<&ConstructRef> = Vec::new();
    for (key, construct) in &desired_keys {
        if !actual_keys.contains_key(key) {
            to_add.push(*construct);
        }
    }

    let mut to_drop: Vec<&ConstructRef> = Vec::new();
    for (key, construct) in &actual_keys {
        if !desired_keys.contains_key(key) {
            to_drop.push(*construct);
        }
    }

    // Deterministic output order for reproducible generated scripts
    to_add.sort_by(|a, b| a.ddl_name.cmp(&b.ddl_name));
    to_drop.sort_by(|a, b| a.ddl_name.cmp(&b.ddl_name));

    let mut operations = Vec::with_capacity(to_add.len() + to_drop.len());

    for construct in to_add {
        tracing::info!(ddl_name = %construct.ddl_name, "Construct missing from database, adding");
        operations.push(DdlOperation::AddDdl(construct.clone()));
    }

    for construct in to_drop {
        tracing::info!(ddl_name = %construct.ddl_name, "Construct no longer declared, dropping");
        operations.push(DdlOperation::DropDdl(construct.clone()));
    }

    operations
}

type ConstructKey = (String, String, String);

fn keyed<'a>(
    constructs: &'a [ConstructRef],
    default_schema: &str,
) -> HashMap<ConstructKey, &'a ConstructRef> {
    constructs
        .iter()
        .map(|c| {
            let schema = c.schema.clone().unwrap_or_else(|| default_schema.to_string());
            ((c.ddl_name.clone(), schema, c.table.clone()), c)
        })
        .collect()
}
