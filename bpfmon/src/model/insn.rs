//! eBPF instruction representation
//!
//! One [`Instruction`] per logical instruction: the 16-byte wide immediate load
//! occupies two 8-byte slots in the object file but is a single entry here.

use std::fmt;

use super::HelperFunc;

// Instruction classes (low 3 bits of the opcode)
pub const CLASS_LD: u8 = 0x00;
pub const CLASS_LDX: u8 = 0x01;
pub const CLASS_ST: u8 = 0x02;
pub const CLASS_STX: u8 = 0x03;
pub const CLASS_ALU: u8 = 0x04;
pub const CLASS_JMP: u8 = 0x05;
pub const CLASS_JMP32: u8 = 0x06;
pub const CLASS_ALU64: u8 = 0x07;

// Jump operations (high 4 bits)
pub const JMP_JA: u8 = 0x00;
pub const JMP_CALL: u8 = 0x80;
pub const JMP_EXIT: u8 = 0x90;

/// Source operand is a register rather than the immediate
pub const SRC_REG: u8 = 0x08;

/// Wide immediate load (`lddw`), spans two slots
pub const OP_LDDW: u8 = 0x18;

/// Source register value marking a call into another program region
pub const PSEUDO_CALL: u8 = 1;

/// Size of one instruction slot in bytes
pub const SLOT_SIZE: usize = 8;

/// A decoded eBPF instruction
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Instruction {
    pub opcode: u8,
    pub dst: u8,
    pub src: u8,
    pub offset: i16,
    /// Immediate, widened to 64 bits for `lddw`
    pub constant: i64,
    /// Symbol named by a relocation on this instruction (map or function)
    pub reference: Option<String>,
}

impl Instruction {
    /// Instruction class
    #[must_use]
    pub fn class(&self) -> u8 {
        self.opcode & 0x07
    }

    /// Operation bits of ALU and jump instructions
    #[must_use]
    pub fn op(&self) -> u8 {
        self.opcode & 0xf0
    }

    /// Whether this is a wide immediate load
    #[must_use]
    pub fn is_wide_load(&self) -> bool {
        self.opcode == OP_LDDW
    }

    /// Number of 8-byte slots this instruction occupies
    #[must_use]
    pub fn slots(&self) -> usize {
        if self.is_wide_load() {
            2
        } else {
            1
        }
    }

    /// A call to a kernel helper, as opposed to a call into another function
    /// of the same object
    #[must_use]
    pub fn is_helper_call(&self) -> bool {
        self.class() == CLASS_JMP && self.op() == JMP_CALL && self.src != PSEUDO_CALL
    }

    /// A call into another function of the same object
    #[must_use]
    pub fn is_local_call(&self) -> bool {
        self.class() == CLASS_JMP && self.op() == JMP_CALL && self.src == PSEUDO_CALL
    }

    /// Helper invoked by this instruction, if it is a helper call
    #[must_use]
    pub fn helper(&self) -> Option<HelperFunc> {
        if !self.is_helper_call() {
            return None;
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        Some(HelperFunc(self.constant as u32))
    }

    /// Symbolic reference, if any and non-empty
    #[must_use]
    pub fn reference(&self) -> Option<&str> {
        self.reference.as_deref().filter(|r| !r.is_empty())
    }

    fn size_suffix(&self) -> &'static str {
        match self.opcode & 0x18 {
            0x00 => "u32",
            0x08 => "u16",
            0x10 => "u8",
            _ => "u64",
        }
    }

    fn source(&self) -> String {
        if self.opcode & SRC_REG == 0 {
            self.constant.to_string()
        } else {
            format!("r{}", self.src)
        }
    }
}

fn alu_operator(op: u8) -> Option<&'static str> {
    Some(match op {
        0x00 => "+=",
        0x10 => "-=",
        0x20 => "*=",
        0x30 => "/=",
        0x40 => "|=",
        0x50 => "&=",
        0x60 => "<<=",
        0x70 => ">>=",
        0x90 => "%=",
        0xa0 => "^=",
        0xb0 => "=",
        0xc0 => "s>>=",
        _ => return None,
    })
}

fn jump_operator(op: u8) -> Option<&'static str> {
    Some(match op {
        0x10 => "==",
        0x20 => ">",
        0x30 => ">=",
        0x40 => "&",
        0x50 => "!=",
        0x60 => "s>",
        0x70 => "s>=",
        0xa0 => "<",
        0xb0 => "<=",
        0xc0 => "s<",
        0xd0 => "s<=",
        _ => return None,
    })
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (dst, off) = (self.dst, self.offset);
        match self.class() {
            CLASS_LD if self.is_wide_load() => {
                write!(f, "r{dst} = {:#x} ll", self.constant)?;
                if let Some(reference) = self.reference() {
                    write!(f, " <{reference}>")?;
                }
                Ok(())
            }
            CLASS_LDX => {
                write!(f, "r{dst} = *({} *)(r{} {off:+})", self.size_suffix(), self.src)
            }
            CLASS_ST => write!(f, "*({} *)(r{dst} {off:+}) = {}", self.size_suffix(), self.constant),
            CLASS_STX => write!(f, "*({} *)(r{dst} {off:+}) = r{}", self.size_suffix(), self.src),
            CLASS_ALU | CLASS_ALU64 => {
                let reg = if self.class() == CLASS_ALU { 'w' } else { 'r' };
                match (self.op(), alu_operator(self.op())) {
                    (0x80, _) => write!(f, "{reg}{dst} = -{reg}{dst}"),
                    (_, Some(operator)) => write!(f, "{reg}{dst} {operator} {}", self.source()),
                    _ => write!(f, "{reg}{dst} = be{}({reg}{dst})", self.constant),
                }
            }
            CLASS_JMP | CLASS_JMP32 => match self.op() {
                JMP_CALL => match self.helper() {
                    Some(helper) => write!(f, "call {helper}"),
                    None => write!(f, "call pc{:+}", self.constant),
                },
                JMP_EXIT => f.write_str("exit"),
                JMP_JA => write!(f, "goto pc{off:+}"),
                op => match jump_operator(op) {
                    Some(operator) => {
                        write!(f, "if r{dst} {operator} {} goto pc{off:+}", self.source())
                    }
                    None => write!(f, "jmp {:#04x}", self.opcode),
                },
            },
            _ => write!(
                f,
                "op {:#04x} dst=r{dst} src=r{} off={off} imm={}",
                self.opcode, self.src, self.constant
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(helper: i64, src: u8) -> Instruction {
        Instruction { opcode: 0x85, src, constant: helper, ..Instruction::default() }
    }

    #[test]
    fn test_helper_call_detection() {
        let ins = call(1, 0);
        assert!(ins.is_helper_call());
        assert_eq!(ins.helper(), Some(HelperFunc::MAP_LOOKUP_ELEM));
        assert_eq!(ins.to_string(), "call BpfMapLookupElem");
    }

    #[test]
    fn test_pseudo_call_is_not_a_helper() {
        let ins = call(12, PSEUDO_CALL);
        assert!(!ins.is_helper_call());
        assert!(ins.is_local_call());
        assert!(!call(1, 0).is_local_call());
        assert_eq!(ins.helper(), None);
        assert_eq!(ins.to_string(), "call pc+12");
    }

    #[test]
    fn test_wide_load_display_names_reference() {
        let ins = Instruction {
            opcode: OP_LDDW,
            dst: 1,
            src: 1,
            reference: Some("events".to_string()),
            ..Instruction::default()
        };
        assert_eq!(ins.slots(), 2);
        assert_eq!(ins.to_string(), "r1 = 0x0 ll <events>");
    }

    #[test]
    fn test_empty_reference_is_ignored() {
        let ins = Instruction { reference: Some(String::new()), ..Instruction::default() };
        assert_eq!(ins.reference(), None);
    }

    #[test]
    fn test_alu_and_jump_display() {
        let mov = Instruction { opcode: 0xb7, dst: 0, constant: 0, ..Instruction::default() };
        assert_eq!(mov.to_string(), "r0 = 0");
        let jeq = Instruction { opcode: 0x15, dst: 0, offset: 3, ..Instruction::default() };
        assert_eq!(jeq.to_string(), "if r0 == 0 goto pc+3");
        let exit = Instruction { opcode: 0x95, ..Instruction::default() };
        assert_eq!(exit.to_string(), "exit");
    }
}
