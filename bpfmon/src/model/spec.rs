//! Program and map specifications as read from a bytecode object
//!
//! These are the loader's view of an ELF file: nothing here has been loaded
//! into the kernel. The indexer only reads them.

use std::fmt;

use super::{AttachType, Instruction, MapType, ProgramType};

/// Byte order of the object file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ByteOrder {
    #[default]
    LittleEndian,
    BigEndian,
}

impl fmt::Display for ByteOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LittleEndian => f.write_str("LittleEndian"),
            Self::BigEndian => f.write_str("BigEndian"),
        }
    }
}

/// One program found in a bytecode object
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgramSpec {
    /// Function symbol name (falls back to the section name)
    pub name: String,
    /// ELF section holding the program, used as its identifier
    pub section_name: String,
    pub program_type: ProgramType,
    /// Attach type declared by the section name, 0 if none
    pub attach_type: AttachType,
    pub license: String,
    pub kernel_version: u32,
    pub byte_order: ByteOrder,
    pub instructions: Vec<Instruction>,
    /// Size of the program's code in bytes
    pub byte_len: usize,
}

/// One map declared in a bytecode object
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MapSpec {
    /// Map symbol name, used as its identifier
    pub name: String,
    pub section_name: String,
    pub map_type: MapType,
    pub key_size: u32,
    pub value_size: u32,
    pub max_entries: u32,
    pub flags: u32,
}

/// Everything the loader found in one bytecode object
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionSpec {
    pub programs: Vec<ProgramSpec>,
    pub maps: Vec<MapSpec>,
}

impl CollectionSpec {
    /// Program by section name
    #[must_use]
    pub fn program(&self, section: &str) -> Option<&ProgramSpec> {
        self.programs.iter().find(|p| p.section_name == section)
    }

    /// Map by name or by section name
    #[must_use]
    pub fn map(&self, name: &str) -> Option<&MapSpec> {
        self.maps.iter().find(|m| m.name == name).or_else(|| {
            self.maps.iter().find(|m| m.section_name == name)
        })
    }
}
