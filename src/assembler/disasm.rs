use crate::spec::types::hw::{
    sign_extend, Opcode, Word, IMMEDIATE_FLAG, OPCODE_MASK, WORD_MASK, WORD_WIDTH,
};
use std::fmt::Display;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Disasm {
    Immediate(Word),
    Inst(Opcode),
    Raw(Word),
}

impl Display for Disasm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Disasm::Immediate(val) => write!(f, "${}", val),
            Disasm::Inst(op) => write!(f, "{}", op),
            Disasm::Raw(raw) => write!(f, "{}", raw),
        }
    }
}

/// Decodes a word the way the CPU would see it. Immediates are printed as
/// the signed value they leave in the accumulator.
pub fn disassemble(w: Word) -> Disasm {
    if w & IMMEDIATE_FLAG != 0 && w & !WORD_MASK == 0 {
        let val = sign_extend(w);
        return Disasm::Immediate(if val & IMMEDIATE_FLAG != 0 {
            val - (1 << WORD_WIDTH)
        } else {
            val
        });
    }

    match Opcode::decode(w) {
        Some(op) if w & !OPCODE_MASK == 0 => Disasm::Inst(op),
        _ => Disasm::Raw(w),
    }
}
