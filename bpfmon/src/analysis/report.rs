//! Text reports over an indexed object
//!
//! Every report writes to an `io::Write` so the CLI can target stdout and
//! tests can target a `Vec<u8>`.

use std::io::Write;

use crate::analysis::Indexes;
use crate::domain::ReportError;
use crate::model::{CollectionSpec, HelperFunc, MapSpec, ProgramSpec};

/// Which programs `prog` should print
#[derive(Debug, Clone, Default)]
pub struct ProgramQuery {
    /// Only this section
    pub section: Option<String>,
    /// Only programs calling this helper
    pub helper: Option<HelperFunc>,
    /// Only programs referencing this map
    pub map: Option<String>,
    /// Include the disassembled bytecode
    pub dump_bytecode: bool,
}

/// Renders reports for one object and its indexes
pub struct Reporter<'a> {
    spec: &'a CollectionSpec,
    indexes: &'a Indexes,
}

impl<'a> Reporter<'a> {
    #[must_use]
    pub fn new(spec: &'a CollectionSpec, indexes: &'a Indexes) -> Self {
        Self { spec, indexes }
    }

    /// Print the programs selected by `query`, in object order.
    ///
    /// Helper and map filters combine: a program is shown only if it matches
    /// both. With an explicit section, a filter the section doesn't satisfy is
    /// an error rather than an empty report.
    pub fn show_programs<W: Write>(&self, out: &mut W, query: &ProgramQuery) -> Result<(), ReportError> {
        if let Some(section) = &query.section {
            let program = self
                .spec
                .program(section)
                .ok_or_else(|| ReportError::SectionNotFound(section.clone()))?;

            if let Some(helper) = query.helper {
                if !self.indexes.helpers_of(section)?.contains_key(&helper) {
                    return Err(ReportError::HelperNotUsed {
                        section: section.clone(),
                        helper: helper.to_string(),
                    });
                }
            }
            if let Some(map) = &query.map {
                if !self.indexes.maps_of(section)?.contains_key(map) {
                    return Err(ReportError::MapNotUsed { section: section.clone(), map: map.clone() });
                }
            }

            return self.write_program(out, program, query.dump_bytecode);
        }

        let selected = self.indexes.filter(query.helper, query.map.as_deref())?;
        for program in &self.spec.programs {
            if selected.contains(program.section_name.as_str()) {
                self.write_program(out, program, query.dump_bytecode)?;
            }
        }
        Ok(())
    }

    /// Print one map, looked up by name or section, or every map
    pub fn show_maps<W: Write>(&self, out: &mut W, section: Option<&str>) -> Result<(), ReportError> {
        match section {
            Some(section) => {
                let map = self
                    .spec
                    .map(section)
                    .ok_or_else(|| ReportError::SectionNotFound(section.to_string()))?;
                self.write_map(out, map)
            }
            None => {
                for map in &self.spec.maps {
                    self.write_map(out, map)?;
                }
                Ok(())
            }
        }
    }

    /// Print the object-wide summary: program types, helpers, map types
    pub fn show_summary<W: Write>(&self, out: &mut W) -> Result<(), ReportError> {
        let indexes = self.indexes;

        writeln!(
            out,
            "Program types report (detected {} different types):",
            indexes.program_types().count()
        )?;
        for (program_type, programs) in indexes.program_types() {
            writeln!(out, "  - {program_type}:")?;
            for program in programs {
                writeln!(out, "    * {program}")?;
            }
        }
        writeln!(out, "\n")?;

        writeln!(out, "eBPF helpers report (detected {} different helpers):", indexes.helpers().count())?;
        for (helper, programs) in indexes.helpers() {
            writeln!(out, "  - {helper}:")?;
            for (program, count) in programs {
                writeln!(out, "    * {program}: {count}")?;
            }
        }
        writeln!(out, "\n")?;

        writeln!(out, "Map types report (detected {} different types):", indexes.map_types().count())?;
        for (map_type, maps) in indexes.map_types() {
            writeln!(out, "  - {map_type}:")?;
            for map in maps {
                writeln!(out, "    * {map}")?;
                for (program, count) in indexes.programs_using_map(map)? {
                    writeln!(out, "      + {program}: {count}")?;
                }
            }
        }
        Ok(())
    }

    fn write_program<W: Write>(&self, out: &mut W, program: &ProgramSpec, dump: bool) -> Result<(), ReportError> {
        writeln!(out, "{}", program.name)?;
        writeln!(out, "  SectionName: {}", program.section_name)?;
        writeln!(out, "  Type: {}", program.program_type)?;
        writeln!(out, "  InstructionsCount: {}", program.instructions.len())?;
        match program.attach_type.name() {
            Some(name) => writeln!(out, "  AttachType: {} ({name})", program.attach_type.0)?,
            None => writeln!(out, "  AttachType: {}", program.attach_type.0)?,
        }
        writeln!(out, "  License: {}", program.license)?;
        writeln!(out, "  KernelVersion: {}", program.kernel_version)?;
        writeln!(out, "  ByteOrder: {}", program.byte_order)?;

        let helpers = self.indexes.helpers_of(&program.section_name)?;
        if !helpers.is_empty() {
            writeln!(out, "  Helpers:")?;
            for (helper, count) in helpers {
                writeln!(out, "    - {helper}: {count}")?;
            }
        }

        let maps = self.indexes.maps_of(&program.section_name)?;
        if !maps.is_empty() {
            writeln!(out, "  Maps:")?;
            for (map, count) in maps {
                writeln!(out, "    - {map}: {count}")?;
            }
        }

        if dump {
            writeln!(out, "  Bytecode:")?;
            let mut slot = 0;
            for insn in &program.instructions {
                writeln!(out, "    {slot:>4}: {insn}")?;
                slot += insn.slots();
            }
        }
        writeln!(out)?;
        Ok(())
    }

    fn write_map<W: Write>(&self, out: &mut W, map: &MapSpec) -> Result<(), ReportError> {
        writeln!(out, "{}", map.name)?;
        writeln!(out, "  SectionName: {}", map.section_name)?;
        writeln!(out, "  Type: {}", map.map_type)?;
        writeln!(out, "  Flags: {}", map.flags)?;
        writeln!(out, "  KeySize: {}", map.key_size)?;
        writeln!(out, "  ValueSize: {}", map.value_size)?;
        writeln!(out, "  MaxEntries: {}", map.max_entries)?;

        let programs = self.indexes.programs_using_map(&map.name)?;
        if !programs.is_empty() {
            writeln!(out, "  Programs:")?;
            for (program, count) in programs {
                writeln!(out, "    - {program}: {count}")?;
            }
        }
        writeln!(out)?;
        Ok(())
    }
}
