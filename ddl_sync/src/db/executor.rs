//! DDL operation executor
//!
//! Turns an add/drop operation into its handler's SQL statements and runs
//! them in order against the database.

use crate::db::connection::DatabaseConnection;
use crate::ddl::operations::DdlOperation;
use crate::ddl::registry::DdlRegistry;
use crate::error::{Error, Result};

/// Executor that applies DDL operations through their bound handlers
pub struct DdlExecutor {
    connection: DatabaseConnection,
}

impl DdlExecutor {
    /// Create a new executor
    pub fn new(connection: DatabaseConnection) -> Self {
        Self { connection }
    }

    /// Apply a single operation.
    ///
    /// Looks up the operation's handler by DDL name, renders its upgrade (for
    /// add) or downgrade (for drop) statements with the default schema
    /// substituted, and executes them in order. A failed statement aborts the
    /// remaining statements of the operation; the transport error propagates
    /// unmodified.
    pub async fn apply(&self, registry: &DdlRegistry, operation: &DdlOperation) -> Result<()> {
        let construct = operation.construct();
        let entry = registry
            .get(&construct.ddl_name)
            .ok_or_else(|| Error::UnboundHandler(construct.ddl_name.clone()))?;

        let schema = construct.schema_or_default();
        let statements = match operation {
            DdlOperation::AddDdl(_) => entry.handler.upgrade(schema, &construct.table),
            DdlOperation::DropDdl(_) => entry.handler.downgrade(schema, &construct.table),
        };

        tracing::info!(
            ddl_name = %construct.ddl_name,
            statements = statements.len(),
            operation = %operation,
            "Applying DDL operation"
        );

        self.execute_batch(&statements).await
    }

    /// Apply a list of operations in order, stopping at the first failure
    pub async fn apply_all(
        &self,
        registry: &DdlRegistry,
        operations: &[DdlOperation],
    ) -> Result<()> {
        for operation in operations {
            self.apply(registry, operation).await?;
        }

        Ok(())
    }

    /// Execute multiple SQL statements in order
    async fn execute_batch(&self, statements: &[String]) -> Result<()> {
        for statement in statements {
            tracing::debug!(sql = %statement, "Executing DDL statement");
            self.connection.execute(statement).await?;
        }

        Ok(())
    }

    /// Get database connection
    pub fn get_connection(&self) -> &DatabaseConnection {
        &self.connection
    }
}
