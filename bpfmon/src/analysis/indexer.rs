//! Cross-reference indexes over one bytecode object.
//!
//! [`Indexes::build`] makes a single pass over the programs of a
//! [`CollectionSpec`](crate::model::CollectionSpec) and records, for each
//! program, which helpers it calls and which maps it references, together with
//! the reverse direction of both relations.
//!
//! # Data Flow
//!
//! ```text
//! ProgramSpec.instructions
//!     │
//!     ├──► helper call ──► helpers_by_program[p][h] += 1
//!     │                    programs_by_helper[h][p] += 1
//!     │
//!     └──► map reference ─► maps_by_program[p][m] += 1
//!                           programs_by_map[m][p] += 1
//! ```
//!
//! Both directions are bumped by the same statement, so
//! `maps_by_program[p][m] == programs_by_map[m][p]` holds for every pair.
//!
//! Every container is ordered, which makes two builds over the same input
//! compare equal and keeps report output stable.

// Weights convert counts to f64
#![allow(clippy::cast_precision_loss)]

use std::collections::{BTreeMap, BTreeSet};

use crate::domain::{IndexError, MapName, SectionName};
use crate::model::{HelperFunc, MapSpec, MapType, ProgramSpec, ProgramType};

/// Per-key usage counts
pub type Counts<K> = BTreeMap<K, usize>;

static NO_PROGRAMS: Counts<SectionName> = BTreeMap::new();
static NO_NAMES: BTreeSet<String> = BTreeSet::new();

// =============================================================================
// INDEXES
// =============================================================================

/// Programs, helpers and maps of one object, cross-referenced.
///
/// Built once, read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Indexes {
    program_types: BTreeMap<SectionName, ProgramType>,
    program_lengths: BTreeMap<SectionName, usize>,
    programs_by_type: BTreeMap<ProgramType, BTreeSet<SectionName>>,
    helpers_by_program: BTreeMap<SectionName, Counts<HelperFunc>>,
    programs_by_helper: BTreeMap<HelperFunc, Counts<SectionName>>,

    map_types: BTreeMap<MapName, MapType>,
    maps_by_type: BTreeMap<MapType, BTreeSet<MapName>>,
    maps_by_program: BTreeMap<SectionName, Counts<MapName>>,
    programs_by_map: BTreeMap<MapName, Counts<SectionName>>,

    max_program_length: usize,
    max_programs_per_map: usize,
}

impl Indexes {
    /// Index every program and map of one object.
    ///
    /// Programs are keyed by section name, maps by name. A relocation naming
    /// something that isn't one of `maps` (a function, a global) is not a map
    /// reference and is skipped.
    #[must_use]
    pub fn build(programs: &[ProgramSpec], maps: &[MapSpec]) -> Self {
        let mut indexes = Self::default();

        for map in maps {
            indexes.map_types.insert(map.name.clone(), map.map_type);
            indexes.maps_by_type.entry(map.map_type).or_default().insert(map.name.clone());
            indexes.programs_by_map.entry(map.name.clone()).or_default();
        }

        for program in programs {
            indexes.add_program(program);
        }

        indexes.max_programs_per_map =
            indexes.programs_by_map.values().map(BTreeMap::len).max().unwrap_or(0);

        indexes
    }

    fn add_program(&mut self, program: &ProgramSpec) {
        let id = &program.section_name;
        let length = program.instructions.len();

        self.program_types.insert(id.clone(), program.program_type);
        self.program_lengths.insert(id.clone(), length);
        self.programs_by_type.entry(program.program_type).or_default().insert(id.clone());
        self.max_program_length = self.max_program_length.max(length);

        let helpers = self.helpers_by_program.entry(id.clone()).or_default();
        let maps = self.maps_by_program.entry(id.clone()).or_default();

        for insn in &program.instructions {
            if let Some(helper) = insn.helper() {
                *helpers.entry(helper).or_default() += 1;
                let callers = self.programs_by_helper.entry(helper).or_default();
                *callers.entry(id.clone()).or_default() += 1;
            }

            let Some(target) = insn.reference() else { continue };
            if let Some(users) = self.programs_by_map.get_mut(target) {
                *maps.entry(target.to_string()).or_default() += 1;
                *users.entry(id.clone()).or_default() += 1;
            }
        }
    }

    // -------------------------------------------------------------------------
    // Programs
    // -------------------------------------------------------------------------

    /// Every indexed program, by section name
    pub fn programs(&self) -> impl Iterator<Item = &str> + '_ {
        self.program_types.keys().map(String::as_str)
    }

    /// Programs declared with type `program_type`
    #[must_use]
    pub fn programs_of_type(&self, program_type: ProgramType) -> &BTreeSet<SectionName> {
        self.programs_by_type.get(&program_type).unwrap_or(&NO_NAMES)
    }

    /// Program types present, each with its programs
    pub fn program_types(&self) -> impl Iterator<Item = (ProgramType, &BTreeSet<SectionName>)> {
        self.programs_by_type.iter().map(|(t, programs)| (*t, programs))
    }

    /// Helpers called by `program`, with call counts
    pub fn helpers_of(&self, program: &str) -> Result<&Counts<HelperFunc>, IndexError> {
        self.helpers_by_program
            .get(program)
            .ok_or_else(|| IndexError::ProgramNotFound(program.to_string()))
    }

    /// Maps referenced by `program`, with reference counts
    pub fn maps_of(&self, program: &str) -> Result<&Counts<MapName>, IndexError> {
        self.maps_by_program
            .get(program)
            .ok_or_else(|| IndexError::ProgramNotFound(program.to_string()))
    }

    // -------------------------------------------------------------------------
    // Helpers
    // -------------------------------------------------------------------------

    /// Programs calling `helper`, with call counts
    ///
    /// Empty for helpers nobody calls; whether a helper id is valid at all is
    /// for the caller to check against [`HelperFunc::from_name`].
    #[must_use]
    pub fn programs_using_helper(&self, helper: HelperFunc) -> &Counts<SectionName> {
        self.programs_by_helper.get(&helper).unwrap_or(&NO_PROGRAMS)
    }

    /// Helpers called anywhere in the object, each with its callers
    pub fn helpers(&self) -> impl Iterator<Item = (HelperFunc, &Counts<SectionName>)> {
        self.programs_by_helper.iter().map(|(h, programs)| (*h, programs))
    }

    // -------------------------------------------------------------------------
    // Maps
    // -------------------------------------------------------------------------

    /// Type of map `map`
    pub fn map_type(&self, map: &str) -> Result<MapType, IndexError> {
        self.map_types.get(map).copied().ok_or_else(|| IndexError::MapNotFound(map.to_string()))
    }

    /// Maps declared with type `map_type`
    #[must_use]
    pub fn maps_of_type(&self, map_type: MapType) -> &BTreeSet<MapName> {
        self.maps_by_type.get(&map_type).unwrap_or(&NO_NAMES)
    }

    /// Map types present, each with its maps
    pub fn map_types(&self) -> impl Iterator<Item = (MapType, &BTreeSet<MapName>)> {
        self.maps_by_type.iter().map(|(t, maps)| (*t, maps))
    }

    /// Programs referencing `map`, with reference counts
    pub fn programs_using_map(&self, map: &str) -> Result<&Counts<SectionName>, IndexError> {
        self.programs_by_map.get(map).ok_or_else(|| IndexError::MapNotFound(map.to_string()))
    }

    // -------------------------------------------------------------------------
    // Selection and weights
    // -------------------------------------------------------------------------

    /// Programs matching every given criterion.
    ///
    /// With both a helper and a map the result is the programs that call the
    /// helper *and* reference the map. With neither it is every program.
    pub fn filter(
        &self,
        helper: Option<HelperFunc>,
        map: Option<&str>,
    ) -> Result<BTreeSet<&str>, IndexError> {
        let by_map = map.map(|m| self.programs_using_map(m)).transpose()?;
        let by_helper = helper.map(|h| self.programs_using_helper(h));

        Ok(self
            .programs()
            .filter(|p| by_helper.map_or(true, |users| users.contains_key(*p)))
            .filter(|p| by_map.map_or(true, |users| users.contains_key(*p)))
            .collect())
    }

    /// Length of the longest program, in instructions
    #[must_use]
    pub fn max_program_length(&self) -> usize {
        self.max_program_length
    }

    /// Most distinct programs referencing any single map
    #[must_use]
    pub fn max_programs_per_map(&self) -> usize {
        self.max_programs_per_map
    }

    /// Program length relative to the longest program, in `[0, 1]`
    pub fn program_weight(&self, program: &str) -> Result<f64, IndexError> {
        let length = self
            .program_lengths
            .get(program)
            .ok_or_else(|| IndexError::ProgramNotFound(program.to_string()))?;
        Ok(ratio(*length, self.max_program_length))
    }

    /// Number of programs using `map` relative to the busiest map, in `[0, 1]`
    pub fn map_weight(&self, map: &str) -> Result<f64, IndexError> {
        let users = self.programs_using_map(map)?;
        Ok(ratio(users.len(), self.max_programs_per_map))
    }
}

fn ratio(value: usize, max: usize) -> f64 {
    if max == 0 {
        0.0
    } else {
        value as f64 / max as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::insn::{CLASS_JMP, JMP_CALL, JMP_EXIT, OP_LDDW, PSEUDO_CALL};
    use crate::model::Instruction;

    fn call(helper: HelperFunc) -> Instruction {
        Instruction {
            opcode: CLASS_JMP | JMP_CALL,
            constant: i64::from(helper.0),
            ..Instruction::default()
        }
    }

    fn load_map(name: &str) -> Instruction {
        Instruction {
            opcode: OP_LDDW,
            dst: 1,
            reference: Some(name.to_string()),
            ..Instruction::default()
        }
    }

    fn exit() -> Instruction {
        Instruction { opcode: CLASS_JMP | JMP_EXIT, ..Instruction::default() }
    }

    fn program(section: &str, program_type: ProgramType, instructions: Vec<Instruction>) -> ProgramSpec {
        ProgramSpec {
            name: section.to_string(),
            section_name: section.to_string(),
            program_type,
            byte_len: instructions.len() * 8,
            instructions,
            ..ProgramSpec::default()
        }
    }

    fn map(name: &str, map_type: MapType) -> MapSpec {
        MapSpec { name: name.to_string(), map_type, ..MapSpec::default() }
    }

    fn fixture() -> Indexes {
        let programs = vec![
            program(
                "kprobe/a",
                ProgramType::KPROBE,
                vec![
                    load_map("events"),
                    call(HelperFunc::MAP_LOOKUP_ELEM),
                    load_map("events"),
                    call(HelperFunc::MAP_LOOKUP_ELEM),
                    exit(),
                ],
            ),
            program(
                "kprobe/b",
                ProgramType::KPROBE,
                vec![load_map("config"), call(HelperFunc::MAP_LOOKUP_ELEM), exit()],
            ),
            program(
                "xdp",
                ProgramType::XDP,
                vec![load_map("events"), call(HelperFunc::RINGBUF_OUTPUT), exit()],
            ),
        ];
        let maps = vec![map("events", MapType::RINGBUF), map("config", MapType::HASH)];
        Indexes::build(&programs, &maps)
    }

    #[test]
    fn test_forward_and_reverse_agree() {
        let indexes = fixture();
        for program in indexes.programs() {
            for (map, count) in indexes.maps_of(program).unwrap() {
                assert_eq!(indexes.programs_using_map(map).unwrap()[program], *count);
            }
            for (helper, count) in indexes.helpers_of(program).unwrap() {
                assert_eq!(indexes.programs_using_helper(*helper)[program], *count);
            }
        }
        assert_eq!(indexes.maps_of("kprobe/a").unwrap()["events"], 2);
        assert_eq!(indexes.helpers_of("kprobe/a").unwrap()[&HelperFunc::MAP_LOOKUP_ELEM], 2);
    }

    #[test]
    fn test_types_are_indexed() {
        let indexes = fixture();
        let kprobes: Vec<&str> =
            indexes.programs_of_type(ProgramType::KPROBE).iter().map(String::as_str).collect();
        assert_eq!(kprobes, vec!["kprobe/a", "kprobe/b"]);
        assert!(indexes.programs_of_type(ProgramType::LSM).is_empty());
        assert!(indexes.maps_of_type(MapType::RINGBUF).contains("events"));
        assert_eq!(indexes.map_type("config").unwrap(), MapType::HASH);
    }

    #[test]
    fn test_filter_is_conjunctive() {
        let indexes = fixture();

        let both = indexes.filter(Some(HelperFunc::MAP_LOOKUP_ELEM), Some("events")).unwrap();
        assert_eq!(both.into_iter().collect::<Vec<_>>(), vec!["kprobe/a"]);

        let helper_only = indexes.filter(Some(HelperFunc::MAP_LOOKUP_ELEM), None).unwrap();
        assert_eq!(helper_only.len(), 2);

        let map_only = indexes.filter(None, Some("events")).unwrap();
        assert_eq!(map_only.into_iter().collect::<Vec<_>>(), vec!["kprobe/a", "xdp"]);

        assert_eq!(indexes.filter(None, None).unwrap().len(), 3);
    }

    #[test]
    fn test_filter_with_unused_helper_is_empty() {
        let indexes = fixture();
        let none = indexes.filter(Some(HelperFunc::KTIME_GET_NS), Some("events")).unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn test_unknown_identifiers() {
        let indexes = fixture();
        assert_eq!(
            indexes.helpers_of("kprobe/missing"),
            Err(IndexError::ProgramNotFound("kprobe/missing".to_string()))
        );
        assert!(matches!(indexes.programs_using_map("nope"), Err(IndexError::MapNotFound(_))));
        assert!(matches!(indexes.filter(None, Some("nope")), Err(IndexError::MapNotFound(_))));
        assert!(indexes.programs_using_helper(HelperFunc::KTIME_GET_NS).is_empty());
    }

    #[test]
    fn test_unknown_reference_is_not_a_map() {
        let programs = vec![program("kprobe/a", ProgramType::KPROBE, vec![load_map("some_global"), exit()])];
        let indexes = Indexes::build(&programs, &[map("events", MapType::RINGBUF)]);
        assert!(indexes.maps_of("kprobe/a").unwrap().is_empty());
        assert!(indexes.programs_using_map("events").unwrap().is_empty());
        assert!(indexes.programs_using_map("some_global").is_err());
    }

    #[test]
    fn test_local_calls_are_not_helpers() {
        let local = Instruction {
            opcode: CLASS_JMP | JMP_CALL,
            src: PSEUDO_CALL,
            constant: 4,
            ..Instruction::default()
        };
        let programs = vec![program("kprobe/a", ProgramType::KPROBE, vec![local, exit()])];
        let indexes = Indexes::build(&programs, &[]);
        assert!(indexes.helpers_of("kprobe/a").unwrap().is_empty());
        assert_eq!(indexes.helpers().count(), 0);
    }

    #[test]
    fn test_weights() {
        let indexes = fixture();
        assert_eq!(indexes.max_program_length(), 5);
        assert_eq!(indexes.max_programs_per_map(), 2);
        assert!((indexes.program_weight("kprobe/a").unwrap() - 1.0).abs() < f64::EPSILON);
        assert!((indexes.program_weight("xdp").unwrap() - 0.6).abs() < 1e-9);
        assert!((indexes.map_weight("events").unwrap() - 1.0).abs() < f64::EPSILON);
        assert!((indexes.map_weight("config").unwrap() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_object_weights_are_zero() {
        let indexes = Indexes::build(&[], &[map("lonely", MapType::ARRAY)]);
        assert_eq!(indexes.max_program_length(), 0);
        assert_eq!(indexes.map_weight("lonely").unwrap(), 0.0);
        assert!(indexes.filter(None, None).unwrap().is_empty());
    }

    #[test]
    fn test_build_is_deterministic() {
        assert_eq!(fixture(), fixture());
    }
}
