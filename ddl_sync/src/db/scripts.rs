//! Migration script rendering
//!
//! Serializes a reconciliation result into a persisted migration script the
//! surrounding pipeline can version and replay. The upgrade section lists the
//! rendered call expressions in order; the downgrade section is derived by
//! reversing each operation in reverse order.

use chrono::Utc;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::ddl::operations::DdlOperation;
use crate::error::Result;

/// Write a migration script for the given operations and return its path
pub fn write_migration_script(directory: &str, operations: &[DdlOperation]) -> Result<PathBuf> {
    fs::create_dir_all(directory)?;

    let script_id = generate_script_id();
    let filename = format!("{}_ddl_sync.txt", script_id);
    let filepath = Path::new(directory).join(&filename);

    let mut file = File::create(&filepath)?;
    file.write_all(render_script(operations).as_bytes())?;

    tracing::info!(script = %filepath.display(), "Wrote migration script");

    Ok(filepath)
}

/// Render the upgrade/downgrade sections as reproducible call expressions
pub fn render_script(operations: &[DdlOperation]) -> String {
    let mut script = String::from("-- upgrade\n");

    for operation in operations {
        script.push_str(&operation.render());
        script.push('\n');
    }

    script.push_str("\n-- downgrade\n");

    for operation in operations.iter().rev() {
        script.push_str(&operation.reverse().render());
        script.push('\n');
    }

    script
}

/// Generate a script ID based on timestamp
fn generate_script_id() -> String {
    Utc::now().format("%Y%m%d%H%M%S").to_string()
}
