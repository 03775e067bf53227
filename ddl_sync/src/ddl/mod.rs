//! DDL construct handling for DDLSync
//!
//! This module contains the handler contract, the registry that binds handlers
//! to models, the add/drop operation objects, and the reconciler that diffs
//! declared constructs against the live database.

pub mod handler;
pub mod operations;
pub mod reconciler;
pub mod registry;
pub mod timescale;

pub use handler::DdlHandler;
pub use operations::{ConstructRef, DdlOperation, DEFAULT_SCHEMA};
pub use reconciler::{compare_ddl, diff_constructs};
pub use registry::{DdlRegistry, RegistryEntry};
