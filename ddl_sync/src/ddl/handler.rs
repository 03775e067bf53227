//! The DDL handler contract
//!
//! A handler is the unit of extensibility: one implementation per construct
//! kind (hypertable conversion, retention policy, scheduled job, ...). The
//! reconciler and executor only ever see this trait, never the construct's
//! SQL dialect.

/// Strategy object that knows how to install, remove, and detect one kind of
/// engine-specific DDL construct.
///
/// Every method is a pure function of the `(schema, table)` pair plus the
/// handler's own construct parameters. Default-schema substitution happens at
/// call sites, so implementations always receive a concrete schema name.
///
/// The central correctness invariant: [`identity_from_declaration`] must
/// produce the exact string that [`identity_query`]'s result column yields for
/// the same logical construct. If the two derivations disagree, reconciliation
/// emits spurious add/drop pairs on every pass. This is a logic defect the
/// diff engine cannot detect at runtime; it is caught by tests only.
///
/// [`identity_from_declaration`]: DdlHandler::identity_from_declaration
/// [`identity_query`]: DdlHandler::identity_query
pub trait DdlHandler: Send + Sync {
    /// SQL statements that install the construct, in execution order.
    ///
    /// Later statements may depend on earlier ones (e.g. a retention policy
    /// added after a hypertable conversion).
    fn upgrade(&self, schema: &str, table: &str) -> Vec<String>;

    /// SQL statements that remove the construct, ideally restoring the
    /// pre-upgrade state.
    ///
    /// Returns an empty vector when the construct is not reversible.
    fn downgrade(&self, schema: &str, table: &str) -> Vec<String>;

    /// A query that, run against the live database, returns zero or one row
    /// per matching construct with the DDL name in its single column.
    ///
    /// Must return no rows when the construct does not exist for the given
    /// `(schema, table)`.
    fn identity_query(&self, schema: &str, table: &str) -> String;

    /// Derive the DDL name from declared metadata. Pure, no I/O.
    ///
    /// Must agree bit-for-bit with the value [`identity_query`] produces for
    /// the same construct.
    ///
    /// [`identity_query`]: DdlHandler::identity_query
    fn identity_from_declaration(&self, schema: &str, table: &str) -> String;
}
