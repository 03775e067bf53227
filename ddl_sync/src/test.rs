//! Tests for DDLSync
//!
//! This file contains unit and integration tests for the ddl_sync library.

use std::sync::Arc;

use pretty_assertions::assert_eq;
use rstest::*;
use tempfile::tempdir;

use crate::config::Config;
use crate::db::connection::DatabaseConnection;
use crate::db::executor::DdlExecutor;
use crate::db::scripts;
use crate::ddl::handler::DdlHandler;
use crate::ddl::operations::{ConstructRef, DdlOperation, DEFAULT_SCHEMA};
use crate::ddl::reconciler::{compare_ddl, diff_constructs};
use crate::ddl::registry::DdlRegistry;
use crate::ddl::timescale::{Hypertable, HypertableRetention, TableRetentionJob};
use crate::error::Error;
use crate::models::metadata::{ModelDescriptor, ModelMetadata};

/// Handler whose construct is a plain marker table, so the full
/// upgrade/identity/downgrade cycle can run against in-memory SQLite.
#[derive(Debug, Clone)]
struct MarkerTable {
    marker: String,
}

impl MarkerTable {
    fn new(marker: &str) -> Self {
        Self {
            marker: marker.to_string(),
        }
    }

    fn marker_name(&self, table: &str) -> String {
        format!("marker_{}_{}", table, self.marker)
    }
}

impl DdlHandler for MarkerTable {
    fn upgrade(&self, _schema: &str, table: &str) -> Vec<String> {
        vec![format!(
            "CREATE TABLE {} (id INTEGER)",
            self.marker_name(table)
        )]
    }

    fn downgrade(&self, _schema: &str, table: &str) -> Vec<String> {
        vec![format!("DROP TABLE {}", self.marker_name(table))]
    }

    fn identity_query(&self, _schema: &str, table: &str) -> String {
        format!(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name = '{}'",
            self.marker_name(table)
        )
    }

    fn identity_from_declaration(&self, _schema: &str, table: &str) -> String {
        self.marker_name(table)
    }
}

/// Handler that derives the same identity regardless of table, to provoke
/// collisions
#[derive(Debug, Clone)]
struct FixedName;

impl DdlHandler for FixedName {
    fn upgrade(&self, _schema: &str, _table: &str) -> Vec<String> {
        Vec::new()
    }

    fn downgrade(&self, _schema: &str, _table: &str) -> Vec<String> {
        Vec::new()
    }

    fn identity_query(&self, _schema: &str, _table: &str) -> String {
        String::new()
    }

    fn identity_from_declaration(&self, _schema: &str, _table: &str) -> String {
        "fixed_name".to_string()
    }
}

fn test_config() -> Config {
    let config_str = r###"
    [database]
    driver = "sqlite"
    url = "sqlite::memory:"
    pool_size = 1

    [reconcile]
    schemas = []
    dry_run = true
    "###;

    toml::from_str(config_str).expect("Failed to parse test config")
}

async fn sqlite_connection() -> DatabaseConnection {
    // One pooled connection, so every statement sees the same in-memory db
    let config = test_config();
    DatabaseConnection::connect(&config.database)
        .await
        .expect("Failed to open in-memory sqlite")
}

#[rstest]
#[case(None, "sensor")]
#[case(Some("metrics".to_string()), "vehicle")]
fn test_reversal_law(#[case] schema: Option<String>, #[case] table: &str) {
    let add = DdlOperation::add("hypertable_sensor_ts", schema.clone(), table);
    let drop = DdlOperation::drop("hypertable_sensor_ts", schema, table);

    assert_eq!(add.reverse(), drop);
    assert_eq!(drop.reverse(), add);
    assert_eq!(add.reverse().reverse(), add);
}

#[test]
fn test_render_substitutes_default_schema() {
    let op = DdlOperation::add("retention_vehicle", None, "vehicle");

    assert_eq!(op.render(), r#"add_ddl("retention_vehicle", "public", "vehicle")"#);
    assert_eq!(DEFAULT_SCHEMA, "public");
}

#[test]
fn test_render_keeps_explicit_schema() {
    let op = DdlOperation::drop("retention_vehicle", Some("fleet".to_string()), "vehicle");

    assert_eq!(op.render(), r#"drop_ddl("retention_vehicle", "fleet", "vehicle")"#);
}

#[test]
fn test_diff_emits_add_and_drop_only_for_disagreements() {
    let desired = vec![
        ConstructRef::new("a", Some("public".to_string()), "t1"),
        ConstructRef::new("b", Some("public".to_string()), "t2"),
    ];
    let actual = vec![
        ConstructRef::new("b", Some("public".to_string()), "t2"),
        ConstructRef::new("c", Some("public".to_string()), "t3"),
    ];

    let operations = diff_constructs(&desired, &actual, "public");

    assert_eq!(
        operations,
        vec![
            DdlOperation::add("a", Some("public".to_string()), "t1"),
            DdlOperation::drop("c", Some("public".to_string()), "t3"),
        ]
    );
}

#[test]
fn test_diff_treats_none_schema_as_default() {
    let desired = vec![ConstructRef::new("a", None, "t1")];
    let actual = vec![ConstructRef::new("a", Some("public".to_string()), "t1")];

    assert_eq!(diff_constructs(&desired, &actual, "public"), Vec::new());

    // A non-default schema is not a match for None
    let elsewhere = vec![ConstructRef::new("a", Some("fleet".to_string()), "t1")];
    let operations = diff_constructs(&desired, &elsewhere, "public");
    assert_eq!(operations.len(), 2);
}

#[test]
fn test_diff_output_is_sorted_by_ddl_name() {
    let desired = vec![
        ConstructRef::new("zeta", None, "t1"),
        ConstructRef::new("alpha", None, "t2"),
        ConstructRef::new("mid", None, "t3"),
    ];

    let operations = diff_constructs(&desired, &[], "public");
    let names: Vec<&str> = operations
        .iter()
        .map(|op| op.construct().ddl_name.as_str())
        .collect();

    assert_eq!(names, vec!["alpha", "mid", "zeta"]);
}

#[test]
fn test_hypertable_scenario_emits_add() {
    let desired = vec![ConstructRef::new(
        "hypertable_sensor_ts",
        Some("public".to_string()),
        "sensor",
    )];

    let operations = diff_constructs(&desired, &[], "public");

    assert_eq!(
        operations,
        vec![DdlOperation::add(
            "hypertable_sensor_ts",
            Some("public".to_string()),
            "sensor"
        )]
    );

    // Executing the add runs the handler's upgrade statements in order
    let handler = Hypertable::new("ts");
    let statements = handler.upgrade("public", "sensor");
    assert_eq!(statements, vec!["SELECT create_hypertable('public.sensor', 'ts')"]);
}

#[test]
fn test_bind_records_entry_and_declaration() {
    let mut registry = DdlRegistry::new();
    let mut metadata = ModelMetadata::new();
    let model = ModelDescriptor::new(Some("public".to_string()), "sensor");

    let ddl_name = registry
        .bind(&model, &mut metadata, Arc::new(Hypertable::new("ts")))
        .unwrap();

    assert_eq!(ddl_name, "hypertable_sensor_ts");
    assert_eq!(registry.len(), 1);

    let entry = registry.get("hypertable_sensor_ts").unwrap();
    assert_eq!(entry.schema.as_deref(), Some("public"));
    assert_eq!(entry.table, "sensor");

    let declarations = metadata.constructs();
    assert_eq!(declarations.len(), 1);
    assert_eq!(declarations[0].ddl_name, "hypertable_sensor_ts");
    assert_eq!(declarations[0].table, "sensor");
}

#[test]
fn test_bind_twice_is_idempotent() {
    let mut registry = DdlRegistry::new();
    let mut metadata = ModelMetadata::new();
    let model = ModelDescriptor::new(None, "sensor");

    registry
        .bind(&model, &mut metadata, Arc::new(Hypertable::new("ts")))
        .unwrap();
    registry
        .bind(&model, &mut metadata, Arc::new(Hypertable::new("ts")))
        .unwrap();

    assert_eq!(registry.len(), 1);
    assert_eq!(metadata.constructs().len(), 1);
}

#[test]
fn test_bind_rejects_identity_collision() {
    let mut registry = DdlRegistry::new();
    let mut metadata = ModelMetadata::new();

    registry
        .bind(
            &ModelDescriptor::new(None, "sensor"),
            &mut metadata,
            Arc::new(FixedName),
        )
        .unwrap();

    let result = registry.bind(
        &ModelDescriptor::new(None, "vehicle"),
        &mut metadata,
        Arc::new(FixedName),
    );

    assert!(matches!(result, Err(Error::IdentityCollision { .. })));
    assert_eq!(registry.len(), 1);
    assert_eq!(metadata.constructs().len(), 1);
}

#[test]
fn test_timescale_identities_agree_with_queries() {
    // The declared identity must be the exact string the identity query
    // selects for the same construct. The queries build it with CONCAT over
    // catalog columns; check the literal prefix and the filter values that
    // pin those columns.
    let hypertable = Hypertable::new("ts");
    assert_eq!(
        hypertable.identity_from_declaration("public", "sensor"),
        "hypertable_sensor_ts"
    );
    let query = hypertable.identity_query("public", "sensor");
    assert!(query.contains("CONCAT('hypertable_', d.hypertable_name, '_', d.column_name)"));
    assert!(query.contains("h.hypertable_name = 'sensor'"));
    assert!(query.contains("d.column_name = 'ts'"));
    assert!(query.contains("d.hypertable_schema = 'public'"));

    let retention = HypertableRetention::new("30 days");
    assert_eq!(
        retention.identity_from_declaration("public", "sensor"),
        "retention_policy_sensor"
    );
    let query = retention.identity_query("public", "sensor");
    assert!(query.contains("CONCAT('retention_policy_', j.hypertable_name)"));
    assert!(query.contains("j.hypertable_name = 'sensor'"));

    let job = TableRetentionJob::default();
    assert_eq!(
        job.identity_from_declaration("public", "vehicle"),
        "retention_vehicle"
    );
    let query = job.identity_query("public", "vehicle");
    assert!(query.contains("CONCAT(j.proc_name, '_', j.config->>'table')"));
    assert!(query.contains("j.proc_name = 'retention'"));
    assert!(query.contains("j.config->>'table' = 'vehicle'"));
}

#[test]
fn test_retention_job_targets_bound_table() {
    let job = TableRetentionJob::new("last_ts", 3600);
    let statements = job.upgrade("public", "vehicle");

    assert_eq!(statements.len(), 2);
    assert!(statements[0].starts_with("CREATE OR REPLACE PROCEDURE retention"));
    assert!(statements[1].contains(r#""table":"vehicle""#));
    assert!(statements[1].contains(r#""column":"last_ts""#));
    assert!(statements[1].contains(r#""expiry":3600"#));

    let downgrade = job.downgrade("public", "vehicle");
    assert_eq!(downgrade.len(), 1);
    assert!(downgrade[0].contains("delete_job"));
}

#[test]
fn test_hypertable_conversion_is_not_reversible() {
    let handler = Hypertable::default();
    assert!(handler.downgrade("public", "sensor").is_empty());
}

#[test]
fn test_config_loading() {
    let config = test_config();

    assert_eq!(config.database.driver, "sqlite");
    assert_eq!(config.reconcile.default_schema, "public");
    assert_eq!(config.reconcile.dry_run, true);
    assert!(config.reconcile.schemas.is_empty());
    assert!(config.logging.is_none());
}

#[test]
fn test_render_script_reverses_downgrade_section() {
    let operations = vec![
        DdlOperation::add("hypertable_sensor_ts", None, "sensor"),
        DdlOperation::add("retention_policy_sensor", None, "sensor"),
    ];

    let script = scripts::render_script(&operations);

    let expected = "-- upgrade\n\
        add_ddl(\"hypertable_sensor_ts\", \"public\", \"sensor\")\n\
        add_ddl(\"retention_policy_sensor\", \"public\", \"sensor\")\n\
        \n\
        -- downgrade\n\
        drop_ddl(\"retention_policy_sensor\", \"public\", \"sensor\")\n\
        drop_ddl(\"hypertable_sensor_ts\", \"public\", \"sensor\")\n";

    assert_eq!(script, expected);
}

#[test]
fn test_write_migration_script() {
    let dir = tempdir().unwrap();
    let operations = vec![DdlOperation::add("retention_vehicle", None, "vehicle")];

    let path =
        scripts::write_migration_script(dir.path().to_str().unwrap(), &operations).unwrap();

    let contents = std::fs::read_to_string(&path).unwrap();
    assert!(contents.contains(r#"add_ddl("retention_vehicle", "public", "vehicle")"#));
    assert!(contents.contains(r#"drop_ddl("retention_vehicle", "public", "vehicle")"#));
}

#[tokio::test]
async fn test_apply_fails_for_unbound_handler() {
    let connection = sqlite_connection().await;
    let executor = DdlExecutor::new(connection);
    let registry = DdlRegistry::new();

    let result = executor
        .apply(&registry, &DdlOperation::add("missing", None, "sensor"))
        .await;

    assert!(matches!(result, Err(Error::UnboundHandler(name)) if name == "missing"));
}

#[tokio::test]
async fn test_reconcile_and_apply_round_trip() {
    let connection = sqlite_connection().await;
    let executor = DdlExecutor::new(connection.clone());

    let mut registry = DdlRegistry::new();
    let mut metadata = ModelMetadata::new();
    registry
        .bind(
            &ModelDescriptor::new(None, "sensor"),
            &mut metadata,
            Arc::new(MarkerTable::new("v1")),
        )
        .unwrap();

    let schemas = vec![None];

    // Fresh database: the declared construct is missing, so reconciliation
    // emits exactly one add.
    let operations = compare_ddl(&schemas, &connection, &registry, &metadata, "public")
        .await
        .unwrap();
    assert_eq!(
        operations,
        vec![DdlOperation::add("marker_sensor_v1", None, "sensor")]
    );

    // After applying, declared and actual state agree: no operations.
    executor.apply_all(&registry, &operations).await.unwrap();
    let operations = compare_ddl(&schemas, &connection, &registry, &metadata, "public")
        .await
        .unwrap();
    assert_eq!(operations, Vec::new());

    // Removing the declaration flips the diff into a drop; applying it
    // removes the construct from the database again.
    let undeclared = ModelMetadata::new();
    let operations = compare_ddl(&schemas, &connection, &registry, &undeclared, "public")
        .await
        .unwrap();
    assert_eq!(
        operations,
        vec![DdlOperation::drop("marker_sensor_v1", None, "sensor")]
    );

    executor.apply_all(&registry, &operations).await.unwrap();
    let rows = connection
        .fetch_identity_rows(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name = 'marker_sensor_v1'",
        )
        .await
        .unwrap();
    assert!(rows.is_empty());
}
