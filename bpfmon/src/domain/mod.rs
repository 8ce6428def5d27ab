//! Domain model for bpfmon
//!
//! This module contains core domain types and errors that provide:
//! - Self-documenting function signatures
//! - Structured error handling

pub mod errors;
pub mod types;

// Re-export common types for convenience
pub use types::{MapName, SectionName};

pub use errors::{DecodeError, IndexError, LoadError, MonitorError, ReportError};
