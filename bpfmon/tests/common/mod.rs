//! Synthetic eBPF objects for the integration tests
//!
//! Objects are assembled with `object`'s writer so the tests need no clang.

#![allow(dead_code)]

use object::write::{Object, Relocation, SectionId, Symbol, SymbolId, SymbolSection};
use object::{
    Architecture, BinaryFormat, Endianness, RelocationFlags, SectionKind, SymbolFlags, SymbolKind,
    SymbolScope,
};

pub const R_BPF_64_64: u32 = 1;
pub const R_BPF_64_32: u32 = 10;

/// Encode one little-endian instruction slot
pub fn slot(opcode: u8, dst: u8, src: u8, offset: i16, imm: i32) -> Vec<u8> {
    let mut bytes = vec![opcode, (src << 4) | (dst & 0x0f)];
    bytes.extend_from_slice(&offset.to_le_bytes());
    bytes.extend_from_slice(&imm.to_le_bytes());
    bytes
}

/// `r{dst} = <map> ll`, two slots, the map comes from a relocation
pub fn ld_map(dst: u8) -> Vec<u8> {
    let mut bytes = slot(0x18, dst, 1, 0, 0);
    bytes.extend(slot(0, 0, 0, 0, 0));
    bytes
}

/// `call <helper>`
pub fn call_helper(helper: i32) -> Vec<u8> {
    slot(0x85, 0, 0, 0, helper)
}

/// `call pc+N`, a call into another function of the object
pub fn call_local(offset: i32) -> Vec<u8> {
    slot(0x85, 0, 1, 0, offset)
}

pub fn mov_imm(dst: u8, imm: i32) -> Vec<u8> {
    slot(0xb7, dst, 0, 0, imm)
}

pub fn exit() -> Vec<u8> {
    slot(0x95, 0, 0, 0, 0)
}

/// Legacy `struct bpf_map_def`
pub fn map_def(map_type: u32, key_size: u32, value_size: u32, max_entries: u32, flags: u32) -> Vec<u8> {
    [map_type, key_size, value_size, max_entries, flags].iter().flat_map(|w| w.to_le_bytes()).collect()
}

/// Thin wrapper over the object writer
pub struct ObjectBuilder {
    obj: Object<'static>,
}

impl ObjectBuilder {
    pub fn new() -> Self {
        Self::with_architecture(Architecture::Bpf)
    }

    pub fn with_architecture(architecture: Architecture) -> Self {
        Self { obj: Object::new(BinaryFormat::Elf, architecture, Endianness::Little) }
    }

    /// Append more bytes to an existing section
    pub fn section_data(&mut self, section: SectionId, data: &[u8]) {
        self.obj.append_section_data(section, data, 8);
    }

    pub fn section(&mut self, name: &str, kind: SectionKind, data: &[u8]) -> SectionId {
        let id = self.obj.add_section(Vec::new(), name.as_bytes().to_vec(), kind);
        self.obj.append_section_data(id, data, 8);
        id
    }

    /// A code section with its entry function symbol at offset 0
    pub fn program(&mut self, section: &str, function: &str, code: &[Vec<u8>]) -> (SectionId, SymbolId) {
        let code: Vec<u8> = code.concat();
        let id = self.section(section, SectionKind::Text, &code);
        let symbol = self.symbol(function, id, 0, code.len() as u64, SymbolKind::Text);
        (id, symbol)
    }

    pub fn symbol(&mut self, name: &str, section: SectionId, value: u64, size: u64, kind: SymbolKind) -> SymbolId {
        self.obj.add_symbol(Symbol {
            name: name.as_bytes().to_vec(),
            value,
            size,
            kind,
            scope: SymbolScope::Linkage,
            weak: false,
            section: SymbolSection::Section(section),
            flags: SymbolFlags::None,
        })
    }

    pub fn section_symbol(&mut self, section: SectionId) -> SymbolId {
        self.obj.section_symbol(section)
    }

    /// Legacy map definitions in their own `maps/<name>` section
    pub fn legacy_map(&mut self, name: &str, def: &[u8]) -> SymbolId {
        let section = self.section(&format!("maps/{name}"), SectionKind::Data, def);
        self.symbol(name, section, 0, def.len() as u64, SymbolKind::Data)
    }

    pub fn relocate(&mut self, section: SectionId, offset: u64, symbol: SymbolId, r_type: u32) {
        self.obj
            .add_relocation(
                section,
                Relocation { offset, symbol, addend: 0, flags: RelocationFlags::Elf { r_type } },
            )
            .expect("relocation");
    }

    pub fn license(&mut self, license: &str) {
        let mut data = license.as_bytes().to_vec();
        data.push(0);
        self.section("license", SectionKind::Data, &data);
    }

    pub fn version(&mut self, version: u32) {
        self.section("version", SectionKind::Data, &version.to_le_bytes());
    }

    pub fn build(self) -> Vec<u8> {
        self.obj.write().expect("write object")
    }
}

/// Two kprobes sharing a ring buffer, an XDP program calling a subprogram,
/// and a map nobody uses.
///
/// | program             | helpers                      | maps              |
/// |---------------------|------------------------------|-------------------|
/// | kprobe/security_bpf | map_lookup_elem x2           | events x2, config |
/// | kprobe/check_helper | ringbuf_output               | events            |
/// | xdp                 | ktime_get_ns via `subprog`   |                   |
pub fn sample_object() -> Vec<u8> {
    let mut b = ObjectBuilder::new();

    let events = b.legacy_map("events", &map_def(27, 0, 0, 4096, 0));
    let config = b.legacy_map("config", &map_def(1, 4, 8, 16, 0));
    b.legacy_map("unused", &map_def(2, 4, 4, 1, 0));

    // kprobe/security_bpf
    let (sec, _) = b.program(
        "kprobe/security_bpf",
        "kprobe_security_bpf",
        &[
            ld_map(1),        // 0: slots 0-1
            call_helper(1),   // 1: slot 2
            ld_map(1),        // 2: slots 3-4
            call_helper(1),   // 3: slot 5
            ld_map(2),        // 4: slots 6-7
            mov_imm(0, 0),    // 5
            exit(),           // 6
        ],
    );
    b.relocate(sec, 0, events, R_BPF_64_64);
    b.relocate(sec, 24, events, R_BPF_64_64);
    b.relocate(sec, 48, config, R_BPF_64_64);

    // kprobe/check_helper_call
    let (sec, _) = b.program(
        "kprobe/check_helper_call",
        "kprobe_check_helper_call",
        &[ld_map(1), call_helper(130), exit()],
    );
    b.relocate(sec, 0, events, R_BPF_64_64);

    // xdp with a subprogram in .text
    let (_, subprog) = b.program(".text", "subprog", &[call_helper(5), exit()]);
    let (sec, _) = b.program("xdp", "xdp_prog", &[call_local(1), exit()]);
    b.relocate(sec, 0, subprog, R_BPF_64_32);

    b.license("GPL");
    b.version(0x0005_0800);
    b.build()
}
