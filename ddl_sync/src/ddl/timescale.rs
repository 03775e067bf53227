//! TimescaleDB construct handlers
//!
//! One handler per construct: hypertable conversion, native retention policy,
//! and a job-based retention sweep for plain tables. Each derives its DDL
//! name the same way from declared metadata and from the Timescale
//! information views, which is what lets the reconciler detect them.

use crate::ddl::handler::DdlHandler;

/// Converts a table into a time-partitioned hypertable
#[derive(Debug, Clone)]
pub struct Hypertable {
    pub time_column_name: String,
}

impl Hypertable {
    pub fn new(time_column_name: impl Into<String>) -> Self {
        Self {
            time_column_name: time_column_name.into(),
        }
    }
}

impl Default for Hypertable {
    fn default() -> Self {
        Self::new("ts")
    }
}

impl DdlHandler for Hypertable {
    fn upgrade(&self, schema: &str, table: &str) -> Vec<String> {
        vec![format!(
            "SELECT create_hypertable('{}.{}', '{}')",
            schema, table, self.time_column_name
        )]
    }

    fn downgrade(&self, _schema: &str, _table: &str) -> Vec<String> {
        // Timescale has no un-hypertable path short of recreating the table
        Vec::new()
    }

    fn identity_query(&self, schema: &str, table: &str) -> String {
        format!(
            "SELECT CONCAT('hypertable_', d.hypertable_name, '_', d.column_name) \
             FROM timescaledb_information.hypertables h, timescaledb_information.dimensions d \
             WHERE h.hypertable_schema = d.hypertable_schema \
             AND h.hypertable_name = d.hypertable_name \
             AND h.hypertable_name = '{}' \
             AND d.column_name = '{}' \
             AND d.hypertable_schema = '{}'",
            table, self.time_column_name, schema
        )
    }

    fn identity_from_declaration(&self, _schema: &str, table: &str) -> String {
        format!("hypertable_{}_{}", table, self.time_column_name)
    }
}

/// Native Timescale retention policy on a hypertable
///
/// Composes with [`Hypertable`]: declare both against the same model and the
/// policy installs after the conversion.
#[derive(Debug, Clone)]
pub struct HypertableRetention {
    /// Drop-chunk horizon, e.g. `"30 days"`
    pub interval: String,
}

impl HypertableRetention {
    pub fn new(interval: impl Into<String>) -> Self {
        Self {
            interval: interval.into(),
        }
    }
}

impl DdlHandler for HypertableRetention {
    fn upgrade(&self, schema: &str, table: &str) -> Vec<String> {
        vec![format!(
            "SELECT add_retention_policy('{}.{}', INTERVAL '{}')",
            schema, table, self.interval
        )]
    }

    fn downgrade(&self, schema: &str, table: &str) -> Vec<String> {
        vec![format!(
            "SELECT remove_retention_policy('{}.{}', true)",
            schema, table
        )]
    }

    fn identity_query(&self, schema: &str, table: &str) -> String {
        format!(
            "SELECT CONCAT('retention_policy_', j.hypertable_name) \
             FROM timescaledb_information.jobs j \
             WHERE j.proc_name = 'policy_retention' \
             AND j.hypertable_schema = '{}' \
             AND j.hypertable_name = '{}'",
            schema, table
        )
    }

    fn identity_from_declaration(&self, _schema: &str, table: &str) -> String {
        format!("retention_policy_{}", table)
    }
}

/// Scheduled retention sweep for plain (non-hypertable) tables
///
/// Installs a `retention` procedure plus an `add_job` schedule that deletes
/// rows older than `expiry_seconds` based on a timestamp column.
/// See <https://docs.timescale.com/api/latest/actions/add_job/>.
#[derive(Debug, Clone)]
pub struct TableRetentionJob {
    pub time_column_name: String,
    pub expiry_seconds: i64,
}

impl TableRetentionJob {
    pub fn new(time_column_name: impl Into<String>, expiry_seconds: i64) -> Self {
        Self {
            time_column_name: time_column_name.into(),
            expiry_seconds,
        }
    }
}

impl Default for TableRetentionJob {
    fn default() -> Self {
        // 93 days
        Self::new("last_ts", 8_035_200)
    }
}

impl DdlHandler for TableRetentionJob {
    fn upgrade(&self, _schema: &str, table: &str) -> Vec<String> {
        vec![
            "CREATE OR REPLACE PROCEDURE retention(job_id INT, config JSONB) \
             LANGUAGE PLPGSQL AS \
             $$ \
             DECLARE \
                 t_table varchar := config->>'table'; \
                 t_column varchar := config->>'column'; \
                 t_expiry integer := config->>'expiry'; \
                 query varchar; \
             BEGIN \
                 query := 'delete from ' \
                 || quote_ident(t_table) \
                 || ' where EXTRACT(EPOCH FROM (now() - ' \
                 || quote_ident(t_column) \
                 || '))>' \
                 || t_expiry; \
                 EXECUTE query; \
                 RAISE NOTICE 'Executed job % with query %', job_id, query; \
             END \
             $$"
            .to_string(),
            format!(
                "SELECT add_job('retention', '1D', config => '{{\"table\":\"{}\", \"column\":\"{}\", \"expiry\":{}}}')",
                table, self.time_column_name, self.expiry_seconds
            ),
        ]
    }

    fn downgrade(&self, schema: &str, table: &str) -> Vec<String> {
        vec![format!(
            "SELECT delete_job(job_id) FROM timescaledb_information.jobs j \
             WHERE j.proc_schema = '{}' \
             AND j.proc_name = 'retention' \
             AND j.config->>'table' = '{}'",
            schema, table
        )]
    }

    fn identity_query(&self, schema: &str, table: &str) -> String {
        format!(
            "SELECT CONCAT(j.proc_name, '_', j.config->>'table') \
             FROM timescaledb_information.jobs j \
             WHERE j.proc_schema = '{}' \
             AND j.config->>'table' = '{}' \
             AND j.proc_name = 'retention'",
            schema, table
        )
    }

    fn identity_from_declaration(&self, _schema: &str, table: &str) -> String {
        format!("retention_{}", table)
    }
}
