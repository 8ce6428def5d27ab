//! Reading synthetic eBPF objects end to end

mod common;

use bpfmon::analysis::Indexes;
use bpfmon::domain::LoadError;
use bpfmon::elf::{load_collection_spec, parse_collection_spec};
use bpfmon::model::{AttachType, ByteOrder, HelperFunc, MapType, ProgramType};
use common::{call_helper, call_local, exit, ld_map, map_def, ObjectBuilder, R_BPF_64_32, R_BPF_64_64};
use object::{Architecture, SectionKind};

#[test]
fn test_programs_are_read_in_section_order() {
    let spec = parse_collection_spec(&common::sample_object()).expect("Failed to parse object");

    let sections: Vec<&str> = spec.programs.iter().map(|p| p.section_name.as_str()).collect();
    assert_eq!(sections, ["kprobe/security_bpf", "kprobe/check_helper_call", "xdp"]);

    let kprobe = spec.program("kprobe/security_bpf").expect("kprobe program");
    assert_eq!(kprobe.name, "kprobe_security_bpf");
    assert_eq!(kprobe.program_type, ProgramType::KPROBE);
    assert_eq!(kprobe.attach_type, AttachType(0));
    assert_eq!(kprobe.byte_order, ByteOrder::LittleEndian);
    assert_eq!(kprobe.license, "GPL");
    assert_eq!(kprobe.kernel_version, 0x0005_0800);

    let xdp = spec.program("xdp").expect("xdp program");
    assert_eq!(xdp.program_type, ProgramType::XDP);
}

#[test]
fn test_text_section_is_not_a_program() {
    let spec = parse_collection_spec(&common::sample_object()).expect("Failed to parse object");
    assert!(spec.program(".text").is_none());
}

#[test]
fn test_wide_loads_carry_map_references() {
    let spec = parse_collection_spec(&common::sample_object()).expect("Failed to parse object");
    let kprobe = spec.program("kprobe/security_bpf").expect("kprobe program");

    // Three lddw + two calls + mov + exit, over ten slots
    assert_eq!(kprobe.instructions.len(), 7);
    assert_eq!(kprobe.byte_len, 80);

    let references: Vec<Option<&str>> = kprobe.instructions.iter().map(|i| i.reference()).collect();
    assert_eq!(
        references,
        [Some("events"), None, Some("events"), None, Some("config"), None, None]
    );
    assert_eq!(kprobe.instructions[1].helper(), Some(HelperFunc::MAP_LOOKUP_ELEM));
}

#[test]
fn test_local_calls_are_not_helpers() {
    let spec = parse_collection_spec(&common::sample_object()).expect("Failed to parse object");
    let xdp = spec.program("xdp").expect("xdp program");

    assert_eq!(xdp.instructions[0].helper(), None);
    assert_eq!(xdp.instructions[0].reference(), Some("subprog"));
}

#[test]
fn test_subprograms_are_linked_into_callers() {
    let spec = parse_collection_spec(&common::sample_object()).expect("Failed to parse object");
    let xdp = spec.program("xdp").expect("xdp program");

    // call subprog; exit; then the body of subprog
    assert_eq!(xdp.instructions.len(), 4);
    assert_eq!(xdp.instructions[2].helper(), Some(HelperFunc::KTIME_GET_NS));
    assert_eq!(xdp.instructions[3].to_string(), "exit");
}

#[test]
fn test_static_and_nested_calls_are_followed() {
    let mut b = ObjectBuilder::new();
    let events = b.legacy_map("events", &map_def(27, 0, 0, 4096, 0));

    // .text: outer at 0 loads the map and calls inner at 32 without relocation
    let (text, _) = b.program(".text", "outer", &[ld_map(1), call_local(1), exit()]);
    b.symbol("inner", text, 32, 16, object::SymbolKind::Text);
    b.section_data(text, &[call_helper(5), exit()].concat());
    b.relocate(text, 0, events, R_BPF_64_64);

    // Two static calls to outer, relocated against the section symbol
    let (sec, _) = b.program("kprobe/a", "kprobe_a", &[call_local(-1), call_local(-1), exit()]);
    let text_symbol = b.section_symbol(text);
    b.relocate(sec, 0, text_symbol, R_BPF_64_32);
    b.relocate(sec, 8, text_symbol, R_BPF_64_32);

    let spec = parse_collection_spec(&b.build()).expect("Failed to parse object");
    let program = spec.program("kprobe/a").expect("kprobe program");

    let references: Vec<Option<&str>> = program.instructions.iter().map(|i| i.reference()).collect();
    assert_eq!(
        references,
        [Some("outer"), Some("outer"), None, Some("events"), Some("inner"), None, None, None],
        "outer and inner are appended once each"
    );

    let indexes = Indexes::build(&spec.programs, &spec.maps);
    assert_eq!(indexes.maps_of("kprobe/a").expect("known program").get("events"), Some(&1));
    assert_eq!(
        indexes.helpers_of("kprobe/a").expect("known program").get(&HelperFunc::KTIME_GET_NS),
        Some(&1)
    );
    assert_eq!(indexes.max_program_length(), 8);
}

#[test]
fn test_legacy_map_definitions() {
    let spec = parse_collection_spec(&common::sample_object()).expect("Failed to parse object");

    let names: Vec<&str> = spec.maps.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, ["events", "config", "unused"]);

    let events = spec.map("events").expect("events map");
    assert_eq!(events.section_name, "maps/events");
    assert_eq!(events.map_type, MapType::RINGBUF);
    assert_eq!(events.max_entries, 4096);

    let config = spec.map("config").expect("config map");
    assert_eq!(config.map_type, MapType::HASH);
    assert_eq!((config.key_size, config.value_size, config.max_entries), (4, 8, 16));
}

#[test]
fn test_btf_maps_keep_their_names() {
    let mut b = ObjectBuilder::new();
    let maps = b.section(".maps", SectionKind::Data, &[0u8; 32]);
    b.symbol("counters", maps, 0, 32, object::SymbolKind::Data);
    b.program("socket", "filter", &[call_helper(5), exit()]);

    let spec = parse_collection_spec(&b.build()).expect("Failed to parse object");
    let counters = spec.map("counters").expect("counters map");
    assert_eq!(counters.map_type, MapType::UNSPEC);
    assert_eq!(counters.section_name, ".maps");
    assert_eq!(spec.programs[0].program_type, ProgramType::SOCKET_FILTER);
}

#[test]
fn test_missing_license_and_version() {
    let mut b = ObjectBuilder::new();
    b.program("tracepoint/sched/sched_process_exec", "exec", &[exit()]);

    let spec = parse_collection_spec(&b.build()).expect("Failed to parse object");
    assert_eq!(spec.programs[0].license, "");
    assert_eq!(spec.programs[0].kernel_version, 0);
    assert_eq!(spec.programs[0].program_type, ProgramType::TRACEPOINT);
}

#[test]
fn test_truncated_map_definition() {
    let mut b = ObjectBuilder::new();
    b.legacy_map("short", &map_def(1, 4, 4, 1, 0)[..12]);

    let err = parse_collection_spec(&b.build()).expect_err("short map def should fail");
    assert!(matches!(err, LoadError::TruncatedMapDef { needed: 20, .. }), "unexpected error: {err}");
}

#[test]
fn test_foreign_architecture_is_rejected() {
    let mut b = ObjectBuilder::with_architecture(Architecture::X86_64);
    b.section(".text", SectionKind::Text, &[0xc3]);

    let err = parse_collection_spec(&b.build()).expect_err("x86 object should fail");
    assert!(matches!(err, LoadError::NotBpf(_)));
    assert!(err.to_string().contains("not an eBPF object"));
}

#[test]
fn test_load_from_disk() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("probe.o");
    std::fs::write(&path, common::sample_object()).expect("Failed to write object");

    let spec = load_collection_spec(&path).expect("Failed to load object");
    assert_eq!(spec.programs.len(), 3);
    assert_eq!(spec.maps.len(), 3);

    let err = load_collection_spec(dir.path().join("missing.o")).expect_err("missing file");
    assert!(matches!(err, LoadError::Io(_)));
}
