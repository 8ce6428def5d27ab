//! Identifier aliases used across the indexes and reports
//!
//! Programs are identified by their ELF section name and maps by their symbol
//! name, exactly as the loader reports them.

/// ELF section name identifying a program (e.g. `kprobe/security_bpf`)
pub type SectionName = String;

/// Symbol name identifying a map (e.g. `bpf_context`)
pub type MapName = String;
