//! Structured error types for bpfmon
//!
//! Using thiserror for automatic Display implementation and error chaining.

use thiserror::Error;

/// Failure to decode a raw event record
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("malformed input: need {needed} bytes, got {available}")]
    MalformedInput { needed: usize, available: usize },
}

/// Query against the indexes for an identifier they don't know
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IndexError {
    #[error("program {0} not found")]
    ProgramNotFound(String),

    #[error("map {0} not found")]
    MapNotFound(String),
}

/// Failure to turn an ELF file into program and map specifications
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("failed to parse ELF object: {0}")]
    InvalidObject(#[from] object::Error),

    #[error("not an eBPF object (architecture {0})")]
    NotBpf(String),

    #[error("map {name} in {section}: definition truncated ({available} of {needed} bytes)")]
    TruncatedMapDef { name: String, section: String, needed: usize, available: usize },

    #[error("section {section}: {len} bytes is not a whole number of instructions")]
    TruncatedInstructions { section: String, len: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Failure while producing a program, map or graph report
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("{0} section not found")]
    SectionNotFound(String),

    #[error("section {section} doesn't use eBPF helper {helper}")]
    HelperNotUsed { section: String, helper: String },

    #[error("section {section} doesn't use map {map}")]
    MapNotUsed { section: String, map: String },

    #[error(transparent)]
    Index(#[from] IndexError),

    #[error("invalid graph template: {0}")]
    Template(#[from] handlebars::TemplateError),

    #[error("failed to render graph: {0}")]
    Render(#[from] handlebars::RenderError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Failure while setting up or running the runtime monitor
#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("Failed to load probe object {path}: {error}")]
    ProbeLoadFailed { path: String, error: String },

    #[error("Map {0} not found in probe object")]
    MapNotFound(&'static str),

    #[error("No probe program could be attached")]
    NothingAttached,

    #[error("Event writer thread panicked")]
    WriterPanicked,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Map(#[from] aya::maps::MapError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_error_display() {
        let err = DecodeError::MalformedInput { needed: 96, available: 16 };
        assert_eq!(err.to_string(), "malformed input: need 96 bytes, got 16");
    }

    #[test]
    fn test_not_found_names_identifier() {
        let err = IndexError::MapNotFound("events".to_string());
        assert!(err.to_string().contains("events"));
        let err = IndexError::ProgramNotFound("kprobe/security_bpf".to_string());
        assert!(err.to_string().contains("kprobe/security_bpf"));
    }

    #[test]
    fn test_report_errors_name_the_section() {
        let err = ReportError::HelperNotUsed {
            section: "kprobe/a".to_string(),
            helper: "BpfKtimeGetNs".to_string(),
        };
        assert_eq!(err.to_string(), "section kprobe/a doesn't use eBPF helper BpfKtimeGetNs");

        let err: ReportError = IndexError::MapNotFound("events".to_string()).into();
        assert_eq!(err.to_string(), "map events not found");
    }
}
