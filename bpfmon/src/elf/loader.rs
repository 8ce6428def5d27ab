//! Bytecode object reader
//!
//! Walks a relocatable eBPF ELF file and produces a [`CollectionSpec`]: one
//! [`ProgramSpec`] per executable section (other than `.text`) and one
//! [`MapSpec`] per map symbol. Nothing is loaded into the kernel.
//!
//! Functions in `.text` are not programs of their own. Every function a
//! program reaches through local calls is appended once to that program's
//! instructions, so the helpers and maps it uses count for the caller.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::ops::Bound::{Excluded, Unbounded};
use std::fs;
use std::path::Path;

use log::{debug, warn};
use object::{
    Architecture, BinaryFormat, Object, ObjectSection, ObjectSymbol, RelocationTarget, SectionIndex,
    SectionKind, SymbolKind,
};

use super::sections::{
    is_legacy_map_section, program_types, BTF_MAPS_SECTION, LICENSE_SECTION, TEXT_SECTION,
    VERSION_SECTION,
};
use crate::domain::LoadError;
use crate::model::insn::{OP_LDDW, SLOT_SIZE};
use crate::model::{ByteOrder, CollectionSpec, Instruction, MapSpec, MapType, ProgramSpec};

/// Size of a legacy `struct bpf_map_def` (five 32-bit words)
pub const MAP_DEF_SIZE: usize = 20;

/// Read and parse the object file at `path`
pub fn load_collection_spec<P: AsRef<Path>>(path: P) -> Result<CollectionSpec, LoadError> {
    let data = fs::read(path.as_ref())?;
    parse_collection_spec(&data)
}

/// Parse an in-memory object file
pub fn parse_collection_spec(data: &[u8]) -> Result<CollectionSpec, LoadError> {
    let file = object::File::parse(data)?;
    if file.format() != BinaryFormat::Elf || file.architecture() != Architecture::Bpf {
        return Err(LoadError::NotBpf(format!("{:?}", file.architecture())));
    }

    let byte_order =
        if file.is_little_endian() { ByteOrder::LittleEndian } else { ByteOrder::BigEndian };
    let license = read_license(&file)?;
    let kernel_version = read_version(&file, byte_order)?;
    let library = FunctionLibrary::read(&file, byte_order)?;

    let mut spec = CollectionSpec::default();
    for section in file.sections() {
        let name = section.name()?;
        if section.kind() == SectionKind::Text && name != TEXT_SECTION {
            let mut program = read_program(&file, &section, byte_order, &library)?;
            program.license.clone_from(&license);
            program.kernel_version = kernel_version;
            debug!(
                "program {} in {}: {} instructions",
                program.name,
                program.section_name,
                program.instructions.len()
            );
            spec.programs.push(program);
        } else if is_legacy_map_section(name) {
            let data = section.data()?;
            for (symbol, offset) in section_symbols(&file, section.index()) {
                spec.maps.push(read_map_def(&symbol, name, data, offset, byte_order)?);
            }
        } else if name == BTF_MAPS_SECTION {
            // Definitions live in BTF, which isn't read; keep the names
            for (symbol, _) in section_symbols(&file, section.index()) {
                spec.maps.push(MapSpec {
                    name: symbol,
                    section_name: name.to_string(),
                    map_type: MapType::UNSPEC,
                    ..MapSpec::default()
                });
            }
        }
    }

    debug!("object holds {} programs and {} maps", spec.programs.len(), spec.maps.len());
    Ok(spec)
}

/// Function symbols of the `.text` section, by start offset
#[derive(Debug, Default)]
struct FunctionTable {
    section: Option<SectionIndex>,
    names: BTreeMap<u64, String>,
}

impl FunctionTable {
    fn read(file: &object::File<'_>) -> Self {
        let Some(section) = file.section_by_name(TEXT_SECTION) else {
            return Self::default();
        };
        let names = file
            .symbols()
            .filter(|symbol| symbol.section_index() == Some(section.index()))
            .filter(|symbol| symbol.kind() == SymbolKind::Text)
            .filter_map(|symbol| match symbol.name() {
                Ok(name) if !name.is_empty() => Some((symbol.address(), name.to_string())),
                _ => None,
            })
            .collect();
        Self { section: Some(section.index()), names }
    }

    fn at(&self, offset: u64) -> Option<&String> {
        self.names.get(&offset)
    }
}

/// Decoded `.text` section, split into functions on demand
#[derive(Debug, Default)]
struct FunctionLibrary {
    table: FunctionTable,
    instructions: Vec<Instruction>,
    offsets: Vec<u64>,
    starts: HashMap<String, u64>,
}

impl FunctionLibrary {
    fn read(file: &object::File<'_>, byte_order: ByteOrder) -> Result<Self, LoadError> {
        let table = FunctionTable::read(file);
        let Some(section) = table.section.and_then(|index| file.section_by_index(index).ok()) else {
            return Ok(Self::default());
        };

        let (mut instructions, offsets) = read_code(file, &section, byte_order, &table)?;

        // Calls between functions of the same section carry no relocation
        for (insn, offset) in instructions.iter_mut().zip(&offsets) {
            if insn.is_local_call() && insn.reference.is_none() {
                insn.reference = call_target(*offset, insn.constant).and_then(|t| table.at(t)).cloned();
            }
        }

        let starts = table.names.iter().map(|(offset, name)| (name.clone(), *offset)).collect();
        debug!("{TEXT_SECTION}: {} functions", table.names.len());
        Ok(Self { table, instructions, offsets, starts })
    }

    /// Instructions of the named function, up to the next function symbol
    fn function(&self, name: &str) -> Option<&[Instruction]> {
        let start = *self.starts.get(name)?;
        let first = self.offsets.partition_point(|offset| *offset < start);
        let last = match self.table.names.range((Excluded(start), Unbounded)).next() {
            Some((end, _)) => self.offsets.partition_point(|offset| offset < end),
            None => self.offsets.len(),
        };
        self.instructions.get(first..last)
    }

    /// Append every function reachable from `instructions`, once each
    fn link(&self, section: &str, instructions: &mut Vec<Instruction>) {
        let mut linked = HashSet::new();
        let mut next = 0;
        while next < instructions.len() {
            let insn = &instructions[next];
            next += 1;
            if !insn.is_local_call() {
                continue;
            }
            let Some(callee) = insn.reference().map(str::to_string) else {
                continue;
            };
            if !linked.insert(callee.clone()) {
                continue;
            }
            match self.function(&callee) {
                Some(body) => instructions.extend_from_slice(body),
                None => warn!("{section}: call to unknown function {callee}"),
            }
        }
    }
}

/// Byte offset a local call at `offset` with immediate `imm` lands on
fn call_target(offset: u64, imm: i64) -> Option<u64> {
    let slot = i64::try_from(SLOT_SIZE).ok()?;
    let target = i64::try_from(offset).ok()?.checked_add(imm.checked_add(1)?.checked_mul(slot)?)?;
    u64::try_from(target).ok()
}

fn read_program<'data>(
    file: &object::File<'data>,
    section: &object::Section<'data, '_>,
    byte_order: ByteOrder,
    library: &FunctionLibrary,
) -> Result<ProgramSpec, LoadError> {
    let section_name = section.name()?.to_string();
    let (mut instructions, _) = read_code(file, section, byte_order, &library.table)?;
    library.link(&section_name, &mut instructions);

    let (program_type, attach_type) = program_types(&section_name);
    let name = entry_symbol(file, section.index()).unwrap_or_else(|| section_name.clone());

    Ok(ProgramSpec {
        name,
        section_name,
        program_type,
        attach_type,
        byte_order,
        instructions,
        byte_len: section.data()?.len(),
        ..ProgramSpec::default()
    })
}

/// Decode a code section and resolve its relocations into references
fn read_code<'data>(
    file: &object::File<'data>,
    section: &object::Section<'data, '_>,
    byte_order: ByteOrder,
    functions: &FunctionTable,
) -> Result<(Vec<Instruction>, Vec<u64>), LoadError> {
    let section_name = section.name()?;
    let (mut instructions, slot_offsets) = decode_instructions(section_name, section.data()?, byte_order)?;

    // Relocations are keyed by byte offset; map them back onto logical instructions
    let by_offset: HashMap<u64, usize> =
        slot_offsets.iter().enumerate().map(|(index, offset)| (*offset, index)).collect();
    for (offset, relocation) in section.relocations() {
        let RelocationTarget::Symbol(symbol_index) = relocation.target() else {
            continue;
        };
        let Some(&index) = by_offset.get(&offset) else {
            warn!("{section_name}: relocation at {offset:#x} is not on an instruction boundary");
            continue;
        };
        let symbol = file.symbol_by_index(symbol_index)?;
        let insn = &mut instructions[index];
        let target = if symbol.kind() == SymbolKind::Section {
            // Static functions: the immediate holds the callee's slot minus one
            let in_text = functions.section.is_some() && symbol.section_index() == functions.section;
            (in_text && insn.is_local_call())
                .then(|| call_target(0, insn.constant).and_then(|t| functions.at(t)))
                .flatten()
                .cloned()
        } else {
            Some(symbol.name()?.to_string()).filter(|name| !name.is_empty())
        };
        if target.is_some() {
            insn.reference = target;
        }
    }

    Ok((instructions, slot_offsets))
}

/// Decode a code section into instructions plus the byte offset of each one
pub fn decode_instructions(
    section: &str,
    data: &[u8],
    byte_order: ByteOrder,
) -> Result<(Vec<Instruction>, Vec<u64>), LoadError> {
    let truncated = || LoadError::TruncatedInstructions { section: section.to_string(), len: data.len() };
    if data.len() % SLOT_SIZE != 0 {
        return Err(truncated());
    }

    let mut instructions = Vec::with_capacity(data.len() / SLOT_SIZE);
    let mut offsets = Vec::with_capacity(data.len() / SLOT_SIZE);
    let mut slots = data.chunks_exact(SLOT_SIZE);
    let mut offset = 0u64;

    while let Some(slot) = slots.next() {
        let mut insn = decode_slot(slot, byte_order);
        if insn.opcode == OP_LDDW {
            let high = slots.next().ok_or_else(truncated)?;
            let high = word(&high[4..8], byte_order);
            let low = word(&slot[4..8], byte_order);
            #[allow(clippy::cast_possible_wrap)]
            let constant = ((u64::from(high) << 32) | u64::from(low)) as i64;
            insn.constant = constant;
        }
        offsets.push(offset);
        offset += (insn.slots() * SLOT_SIZE) as u64;
        instructions.push(insn);
    }

    Ok((instructions, offsets))
}

fn decode_slot(slot: &[u8], byte_order: ByteOrder) -> Instruction {
    let regs = slot[1];
    let (dst, src) = match byte_order {
        ByteOrder::LittleEndian => (regs & 0x0f, regs >> 4),
        ByteOrder::BigEndian => (regs >> 4, regs & 0x0f),
    };
    let offset = match byte_order {
        ByteOrder::LittleEndian => i16::from_le_bytes([slot[2], slot[3]]),
        ByteOrder::BigEndian => i16::from_be_bytes([slot[2], slot[3]]),
    };
    #[allow(clippy::cast_possible_wrap)]
    let constant = i64::from(word(&slot[4..8], byte_order) as i32);
    Instruction {
        opcode: slot[0],
        dst,
        src,
        offset,
        constant,
        reference: None,
    }
}

fn word(bytes: &[u8], byte_order: ByteOrder) -> u32 {
    let mut raw = [0u8; 4];
    raw.copy_from_slice(&bytes[..4]);
    match byte_order {
        ByteOrder::LittleEndian => u32::from_le_bytes(raw),
        ByteOrder::BigEndian => u32::from_be_bytes(raw),
    }
}

/// Name of the function symbol at the start of a section
fn entry_symbol(file: &object::File<'_>, section: SectionIndex) -> Option<String> {
    file.symbols()
        .filter(|symbol| symbol.section_index() == Some(section))
        .filter(|symbol| symbol.kind() == SymbolKind::Text && symbol.address() == 0)
        .find_map(|symbol| symbol.name().ok().filter(|name| !name.is_empty()).map(str::to_string))
}

/// Named symbols defined in a section, ordered by offset
fn section_symbols(file: &object::File<'_>, section: SectionIndex) -> Vec<(String, u64)> {
    let mut symbols: Vec<(String, u64)> = file
        .symbols()
        .filter(|symbol| symbol.section_index() == Some(section))
        .filter(|symbol| symbol.kind() != SymbolKind::Section)
        .filter_map(|symbol| match symbol.name() {
            Ok(name) if !name.is_empty() => Some((name.to_string(), symbol.address())),
            _ => None,
        })
        .collect();
    symbols.sort_by_key(|(_, offset)| *offset);
    symbols
}

fn read_map_def(
    name: &str,
    section: &str,
    data: &[u8],
    offset: u64,
    byte_order: ByteOrder,
) -> Result<MapSpec, LoadError> {
    let start = usize::try_from(offset).unwrap_or(usize::MAX);
    let def = start
        .checked_add(MAP_DEF_SIZE)
        .and_then(|end| data.get(start..end))
        .ok_or_else(|| LoadError::TruncatedMapDef {
            name: name.to_string(),
            section: section.to_string(),
            needed: MAP_DEF_SIZE,
            available: data.len().saturating_sub(start),
        })?;

    let field = |index: usize| word(&def[index * 4..index * 4 + 4], byte_order);
    Ok(MapSpec {
        name: name.to_string(),
        section_name: section.to_string(),
        map_type: MapType(field(0)),
        key_size: field(1),
        value_size: field(2),
        max_entries: field(3),
        flags: field(4),
    })
}

fn read_license(file: &object::File<'_>) -> Result<String, LoadError> {
    let Some(section) = file.section_by_name(LICENSE_SECTION) else {
        return Ok(String::new());
    };
    let data = section.data()?;
    let end = data.iter().position(|b| *b == 0).unwrap_or(data.len());
    Ok(String::from_utf8_lossy(&data[..end]).into_owned())
}

fn read_version(file: &object::File<'_>, byte_order: ByteOrder) -> Result<u32, LoadError> {
    let Some(section) = file.section_by_name(VERSION_SECTION) else {
        return Ok(0);
    };
    let data = section.data()?;
    if data.len() < 4 {
        warn!("version section holds {} bytes, ignoring", data.len());
        return Ok(0);
    }
    Ok(word(data, byte_order))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::HelperFunc;

    fn slot(opcode: u8, regs: u8, offset: i16, imm: i32) -> Vec<u8> {
        let mut bytes = vec![opcode, regs];
        bytes.extend_from_slice(&offset.to_le_bytes());
        bytes.extend_from_slice(&imm.to_le_bytes());
        bytes
    }

    #[test]
    fn test_decode_helper_call_and_exit() {
        let mut code = slot(0x85, 0, 0, 1);
        code.extend(slot(0x95, 0, 0, 0));

        let (insns, offsets) = decode_instructions("kprobe/x", &code, ByteOrder::LittleEndian).unwrap();
        assert_eq!(insns.len(), 2);
        assert_eq!(offsets, vec![0, 8]);
        assert_eq!(insns[0].helper(), Some(HelperFunc::MAP_LOOKUP_ELEM));
        assert_eq!(insns[1].to_string(), "exit");
    }

    #[test]
    fn test_wide_load_is_one_instruction() {
        let mut code = slot(0x18, 0x01, 0, 0x2000_0000);
        code.extend(slot(0, 0, 0, 0x1));
        code.extend(slot(0x95, 0, 0, 0));

        let (insns, offsets) = decode_instructions("xdp", &code, ByteOrder::LittleEndian).unwrap();
        assert_eq!(insns.len(), 2);
        assert_eq!(offsets, vec![0, 16]);
        assert_eq!(insns[0].dst, 1);
        assert_eq!(insns[0].constant, 0x1_2000_0000);
    }

    #[test]
    fn test_register_nibbles_follow_byte_order() {
        let code = slot(0xbf, 0x21, 0, 0);
        let (le, _) = decode_instructions("s", &code, ByteOrder::LittleEndian).unwrap();
        assert_eq!((le[0].dst, le[0].src), (1, 2));

        let (be, _) = decode_instructions("s", &code, ByteOrder::BigEndian).unwrap();
        assert_eq!((be[0].dst, be[0].src), (2, 1));
    }

    #[test]
    fn test_truncated_code_is_rejected() {
        let code = vec![0u8; 12];
        let err = decode_instructions("kprobe/x", &code, ByteOrder::LittleEndian).unwrap_err();
        assert!(matches!(err, LoadError::TruncatedInstructions { len: 12, .. }));

        // lddw missing its second slot
        let code = slot(0x18, 0x01, 0, 0);
        assert!(decode_instructions("kprobe/x", &code, ByteOrder::LittleEndian).is_err());
    }

    #[test]
    fn test_call_target_is_relative_to_next_slot() {
        assert_eq!(call_target(0, 1), Some(16));
        assert_eq!(call_target(16, -1), Some(16));
        assert_eq!(call_target(8, -3), None);
    }

    #[test]
    fn test_map_def_fields() {
        let mut data = vec![0u8; 4];
        for value in [27u32, 0, 0, 4096, 0] {
            data.extend_from_slice(&value.to_le_bytes());
        }
        let map = read_map_def("events", "maps/events", &data, 4, ByteOrder::LittleEndian).unwrap();
        assert_eq!(map.map_type, MapType::RINGBUF);
        assert_eq!(map.max_entries, 4096);
        assert_eq!(map.section_name, "maps/events");
    }

    #[test]
    fn test_short_map_def() {
        let data = vec![0u8; 12];
        let err = read_map_def("events", "maps", &data, 4, ByteOrder::LittleEndian).unwrap_err();
        assert!(matches!(err, LoadError::TruncatedMapDef { needed: 20, available: 8, .. }));
    }

    #[test]
    fn test_not_an_object() {
        assert!(parse_collection_spec(b"definitely not elf").is_err());
    }
}
