//! Utility functions for DDLSync

pub mod logging;

pub use logging::init_logging;
