//! DDLSync: reconciles engine-specific DDL constructs against live databases
//!
//! DDLSync lets non-standard database constructs (hypertable conversions,
//! retention policies, scheduled jobs) plug into a generic diff-and-apply
//! migration flow. A handler declares how to install, remove, and detect one
//! construct kind; the reconciler diffs the declared constructs against the
//! live database and emits the add/drop operations needed to converge them.

pub mod config;
pub mod db;
pub mod ddl;
pub mod error;
pub mod models;
pub mod utils;

// Re-export main types for easier access
pub use config::Config;
pub use db::connection::DatabaseConnection;
pub use db::executor::DdlExecutor;
pub use ddl::handler::DdlHandler;
pub use ddl::operations::{ConstructRef, DdlOperation, DEFAULT_SCHEMA};
pub use ddl::registry::DdlRegistry;
pub use error::{Error, Result};
pub use models::metadata::{ModelDescriptor, ModelMetadata};

use std::sync::Arc;

/// Initialize DDLSync with the specified configuration file
pub async fn init(config_path: &str) -> Result<DdlSyncClient> {
    let config = config::load_from_file(config_path)?;
    DdlSyncClient::new(config).await
}

/// The main client for interacting with DDLSync
pub struct DdlSyncClient {
    config: Config,
    db_connection: DatabaseConnection,
    registry: DdlRegistry,
    metadata: ModelMetadata,
}

impl DdlSyncClient {
    /// Create a new DDLSync client from configuration
    pub async fn new(config: Config) -> Result<Self> {
        let db_connection = DatabaseConnection::connect(&config.database).await?;

        Ok(Self {
            config,
            db_connection,
            registry: DdlRegistry::new(),
            metadata: ModelMetadata::new(),
        })
    }

    /// Bind a construct handler to a model, declaring the construct as
    /// desired state. Call once per handler/model pair during startup.
    pub fn bind_model(
        &mut self,
        model: &ModelDescriptor,
        handler: Arc<dyn DdlHandler>,
    ) -> Result<String> {
        self.registry.bind(model, &mut self.metadata, handler)
    }

    /// Diff declared constructs against the live database
    pub async fn reconcile(&self) -> Result<Vec<DdlOperation>> {
        let schemas = self.scan_schemas();

        ddl::reconciler::compare_ddl(
            &schemas,
            &self.db_connection,
            &self.registry,
            &self.metadata,
            &self.config.reconcile.default_schema,
        )
        .await
    }

    /// Apply reconciliation operations to the database
    pub async fn apply(&self, operations: &[DdlOperation]) -> Result<()> {
        if self.config.reconcile.dry_run {
            // Just log the operations without applying
            for operation in operations {
                tracing::info!(operation = %operation, "DDL operation (dry run)");
            }
            return Ok(());
        }

        if let Some(directory) = &self.config.reconcile.script_directory {
            db::scripts::write_migration_script(directory, operations)?;
        }

        let executor = DdlExecutor::new(self.db_connection.clone());
        executor.apply_all(&self.registry, operations).await
    }

    /// Complete workflow: reconcile declared constructs and apply the result
    pub async fn sync_constructs(&self) -> Result<()> {
        let operations = self.reconcile().await?;

        if operations.is_empty() {
            tracing::info!("Database constructs are already in sync with declarations");
            return Ok(());
        }

        self.apply(&operations).await
    }

    /// The declared-construct metadata
    pub fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }

    /// The handler registry
    pub fn registry(&self) -> &DdlRegistry {
        &self.registry
    }

    fn scan_schemas(&self) -> Vec<Option<String>> {
        if self.config.reconcile.schemas.is_empty() {
            vec![None]
        } else {
            self.config
                .reconcile
                .schemas
                .iter()
                .cloned()
                .map(Some)
                .collect()
        }
    }
}

#[cfg(test)]
mod test;
