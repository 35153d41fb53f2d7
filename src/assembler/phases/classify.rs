use crate::assembler::model::Encoding;
use crate::spec::types::hw::Opcode;
use std::collections::HashMap;
use strum::IntoEnumIterator;

const IMMEDIATE_PREFIX: char = '$';
const LABEL_DEF_SUFFIX: char = ':';

// This enum models what a single token means to the assembler. Classification never fails:
// anything which is not one of the special forms is a reference, and a reference which does
// not parse as a number is taken to be a label name.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Statement<'a> {
    Inst(Opcode),
    Reference(Encoding, &'a str),
    LabelDef(&'a str),
}

/// The mnemonics of the CPU, built once per assembler.
#[derive(Debug, Clone)]
pub struct InstructionTable(HashMap<String, Opcode>);

impl Default for InstructionTable {
    fn default() -> Self {
        InstructionTable(Opcode::iter().map(|op| (op.to_string(), op)).collect())
    }
}

impl InstructionTable {
    pub fn lookup(&self, mnemonic: &str) -> Option<Opcode> {
        self.0.get(mnemonic).copied()
    }

    pub fn classify<'a>(&self, raw: &'a str) -> Statement<'a> {
        if let Some(op) = self.lookup(raw) {
            Statement::Inst(op)
        } else if raw.starts_with(IMMEDIATE_PREFIX) {
            Statement::Reference(Encoding::Immediate, &raw[IMMEDIATE_PREFIX.len_utf8()..])
        } else if raw.ends_with(LABEL_DEF_SUFFIX) {
            Statement::LabelDef(&raw[..raw.len() - LABEL_DEF_SUFFIX.len_utf8()])
        } else {
            Statement::Reference(Encoding::Normal, raw)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mnemonics() {
        let table = InstructionTable::default();
        assert_eq!(table.classify("."), Statement::Inst(Opcode::Jump));
        assert_eq!(table.classify("-"), Statement::Inst(Opcode::Subtract));
        assert_eq!(table.classify("|"), Statement::Inst(Opcode::Nand));
        assert_eq!(table.classify("@"), Statement::Inst(Opcode::Fetch));
        assert_eq!(table.classify("!"), Statement::Inst(Opcode::Store));
        assert_eq!(table.classify("nop"), Statement::Inst(Opcode::Nop));
    }

    #[test]
    fn mnemonics_are_case_sensitive() {
        let table = InstructionTable::default();
        assert_eq!(
            table.classify("NOP"),
            Statement::Reference(Encoding::Normal, "NOP")
        );
    }

    #[test]
    fn immediate_takes_priority_over_label_def() {
        let table = InstructionTable::default();
        assert_eq!(
            table.classify("$x:"),
            Statement::Reference(Encoding::Immediate, "x:")
        );
        assert_eq!(table.classify("$"), Statement::Reference(Encoding::Immediate, ""));
    }

    #[test]
    fn label_defs() {
        let table = InstructionTable::default();
        assert_eq!(table.classify("loop:"), Statement::LabelDef("loop"));
        assert_eq!(table.classify("5:"), Statement::LabelDef("5"));
        assert_eq!(table.classify(":"), Statement::LabelDef(""));
        assert_eq!(table.classify("a::"), Statement::LabelDef("a:"));
    }

    #[test]
    fn plain_references() {
        let table = InstructionTable::default();
        assert_eq!(table.classify("42"), Statement::Reference(Encoding::Normal, "42"));
        assert_eq!(table.classify("12x"), Statement::Reference(Encoding::Normal, "12x"));
        assert_eq!(table.classify("x$"), Statement::Reference(Encoding::Normal, "x$"));
    }
}
