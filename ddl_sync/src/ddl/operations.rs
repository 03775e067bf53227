//! Add/drop operation objects
//!
//! Operations are synthesized by the reconciler or authored directly in a
//! migration script, rendered into reproducible call expressions for
//! persisted scripts, and applied through their handler's SQL.

/// Schema name substituted when a model declares no schema
pub const DEFAULT_SCHEMA: &str = "public";

/// Identifies one construct instance: DDL name plus the (schema, table) it
/// lives on. A `None` schema means the database's default schema.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConstructRef {
    pub ddl_name: String,
    pub schema: Option<String>,
    pub table: String,
}

impl ConstructRef {
    pub fn new(
        ddl_name: impl Into<String>,
        schema: Option<String>,
        table: impl Into<String>,
    ) -> Self {
        Self {
            ddl_name: ddl_name.into(),
            schema,
            table: table.into(),
        }
    }

    /// Schema name with the default substituted when unset
    pub fn schema_or_default(&self) -> &str {
        self.schema.as_deref().unwrap_or(DEFAULT_SCHEMA)
    }
}

/// A migration operation over one construct
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DdlOperation {
    AddDdl(ConstructRef),
    DropDdl(ConstructRef),
}

impl DdlOperation {
    /// Construct an add operation
    pub fn add(
        ddl_name: impl Into<String>,
        schema: Option<String>,
        table: impl Into<String>,
    ) -> Self {
        DdlOperation::AddDdl(ConstructRef::new(ddl_name, schema, table))
    }

    /// Construct a drop operation
    pub fn drop(
        ddl_name: impl Into<String>,
        schema: Option<String>,
        table: impl Into<String>,
    ) -> Self {
        DdlOperation::DropDdl(ConstructRef::new(ddl_name, schema, table))
    }

    /// The construct this operation targets
    pub fn construct(&self) -> &ConstructRef {
        match self {
            DdlOperation::AddDdl(c) | DdlOperation::DropDdl(c) => c,
        }
    }

    /// The inverse operation, used to generate the downgrade path of a
    /// migration script
    pub fn reverse(&self) -> Self {
        match self {
            DdlOperation::AddDdl(c) => DdlOperation::DropDdl(c.clone()),
            DdlOperation::DropDdl(c) => DdlOperation::AddDdl(c.clone()),
        }
    }

    /// Serialize into a reproducible call expression for a persisted
    /// migration script.
    ///
    /// An unset schema renders as the literal default-schema token, never as
    /// an empty or null token.
    pub fn render(&self) -> String {
        let c = self.construct();
        let verb = match self {
            DdlOperation::AddDdl(_) => "add_ddl",
            DdlOperation::DropDdl(_) => "drop_ddl",
        };

        format!(
            "{}({:?}, {:?}, {:?})",
            verb,
            c.ddl_name,
            c.schema_or_default(),
            c.table
        )
    }
}

impl std::fmt::Display for DdlOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.render())
    }
}
