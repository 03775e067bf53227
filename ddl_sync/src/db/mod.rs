//! Database functionality for DDLSync
//!
//! This module handles database connections and DDL execution.

pub mod connection;
pub mod executor;
pub mod scripts;
