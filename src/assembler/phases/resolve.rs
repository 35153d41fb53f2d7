use super::classify::{InstructionTable, Statement};
use super::types::{LabelName, Loc, Located};
use crate::assembler::image::Image;
use crate::assembler::model::Encoding;
use crate::spec::types::hw::{parse_word_wrapping, Address, Word};
use indexmap::IndexMap;
use std::collections::HashMap;

/// A placeholder word waiting for the address of a label.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Relocation {
    encoding: Encoding,
    destination: Address,
    loc: Option<Loc>,
}

impl Relocation {
    fn resolve(&self, memory: &mut [Word], resolution: Address) {
        memory[self.destination] = self.encoding.encode_address(resolution);
    }
}

/// The state of a single assembly run.
///
/// A label name is either bound in `labels` or waiting in `backpatches`, never both.
pub struct Program {
    instructions: InstructionTable,
    memory: Vec<Word>,
    labels: HashMap<LabelName, Address>,
    backpatches: IndexMap<LabelName, Vec<Relocation>>,
}

impl Default for Program {
    fn default() -> Self {
        Program::new(InstructionTable::default())
    }
}

impl Program {
    pub fn new(instructions: InstructionTable) -> Self {
        Program {
            instructions,
            memory: Vec::new(),
            labels: HashMap::new(),
            backpatches: IndexMap::new(),
        }
    }

    /// The address the next emitted word will occupy.
    pub fn pc(&self) -> Address {
        self.memory.len()
    }

    pub fn memory(&self) -> &[Word] {
        &self.memory
    }

    pub fn label(&self, name: &str) -> Option<Address> {
        self.labels.get(name).copied()
    }

    pub fn is_pending(&self, name: &str) -> bool {
        self.backpatches.contains_key(name)
    }

    pub fn assemble_tokens<'a>(&mut self, tokens: impl IntoIterator<Item = Located<&'a str>>) {
        for token in tokens {
            self.assemble_token(token);
        }
    }

    pub fn assemble_token(&mut self, token: Located<&str>) {
        let loc = token.loc();
        match self.instructions.classify(token.value()) {
            Statement::Inst(op) => self.assemble(op.encode()),
            Statement::Reference(encoding, text) => self.assemble_reference(encoding, text, loc),
            Statement::LabelDef(label) => self.assemble_label(label),
        }
    }

    fn assemble(&mut self, w: Word) {
        self.memory.push(w);
    }

    fn assemble_reference(&mut self, encoding: Encoding, text: &str, loc: Option<Loc>) {
        if let Some(value) = parse_word_wrapping(text) {
            self.assemble(encoding.encode(value));
        } else if let Some(&addr) = self.labels.get(text) {
            self.assemble(encoding.encode_address(addr));
        } else {
            let rel = Relocation {
                encoding,
                destination: self.pc(),
                loc,
            };
            log::trace!("forward reference to '{}' at {:#05X}", text, rel.destination);
            self.backpatches
                .entry(text.to_owned())
                .or_insert_with(Vec::new)
                .push(rel);
            self.assemble(0);
        }
    }

    fn assemble_label(&mut self, label: &str) {
        self.resolve(label, self.pc());
    }

    fn resolve(&mut self, label: &str, addr: Address) {
        if let Some(rels) = self.backpatches.shift_remove(label) {
            log::trace!("'{}' resolves {} placeholder(s)", label, rels.len());
            for rel in rels {
                rel.resolve(&mut self.memory, addr);
            }
        }

        if let Some(prev) = self.labels.insert(label.to_owned(), addr) {
            log::debug!(
                "label '{}' redefined: {:#05X} -> {:#05X}",
                label,
                prev,
                addr
            );
        }
    }

    pub fn finish(self) -> Image {
        let undefined = self
            .backpatches
            .into_iter()
            .map(|(label, rels)| match rels.first().and_then(|rel| rel.loc) {
                Some(loc) => Located::with_loc(loc, label),
                None => Located::from(label),
            })
            .collect();

        Image::new(self.memory, self.labels, undefined)
    }
}

#[cfg(test)]
mod tests {
    use super::super::tokenize::tokenize;
    use super::Program;
    use crate::assembler::model::encode_immediate;

    fn program(source: &str) -> Program {
        let mut prog = Program::default();
        prog.assemble_tokens(tokenize(source));
        prog
    }

    #[test]
    fn literals_need_no_lookup() {
        let prog = program("7 -3 $7 $-1 +4");
        assert_eq!(prog.memory(), &[7, -3, 0x807, 0xFFF, 4]);
        assert!(!prog.is_pending("7"));
    }

    #[test]
    fn backward_reference() {
        let prog = program("nop a: nop a $a");
        assert_eq!(prog.memory(), &[1280, 1280, 1, encode_immediate(1)]);
    }

    #[test]
    fn forward_reference_is_patched_in_place() {
        let mut prog = program("a $a nop");
        assert_eq!(prog.memory(), &[0, 0, 1280]);
        assert!(prog.is_pending("a"));
        assert_eq!(prog.label("a"), None);

        prog.assemble_tokens(tokenize("a:"));
        assert_eq!(prog.memory(), &[3, encode_immediate(3), 1280]);
        assert!(!prog.is_pending("a"));
        assert_eq!(prog.label("a"), Some(3));
    }

    #[test]
    fn patching_touches_only_the_label_placeholders() {
        let prog = program("a b a 9 a: b:");
        assert_eq!(prog.memory(), &[4, 4, 4, 9]);

        let prog = program("a b a 9 a:");
        assert_eq!(prog.memory(), &[4, 0, 4, 9]);
        assert!(prog.is_pending("b"));
    }

    #[test]
    fn redefinition_only_affects_later_references() {
        let prog = program("l: nop $l l: nop l $l");
        assert_eq!(
            prog.memory(),
            &[1280, encode_immediate(0), 1280, 2, encode_immediate(2)]
        );
        assert_eq!(prog.label("l"), Some(2));
    }

    #[test]
    fn redefinition_after_forward_resolution() {
        let prog = program("x x: nop x: x");
        assert_eq!(prog.memory(), &[1, 1280, 2]);
    }

    #[test]
    fn label_definitions_emit_nothing() {
        let prog = program("a: b: c:");
        assert!(prog.memory().is_empty());
        assert_eq!(prog.label("c"), Some(0));
    }

    #[test]
    fn malformed_numbers_are_labels() {
        let prog = program("12x 0x10 1_000");
        assert_eq!(prog.memory(), &[0, 0, 0]);
        assert!(prog.is_pending("12x"));
        assert!(prog.is_pending("0x10"));
        assert!(prog.is_pending("1_000"));
    }

    #[test]
    fn oversized_literals_are_not_labels() {
        let prog = program("$99999999999999999999 99999999999999999999 -4294967297");
        assert_eq!(prog.memory(), &[0xFFF, 1_661_992_959, -1]);
        assert!(!prog.is_pending("99999999999999999999"));
    }

    #[test]
    fn numeric_label_names_are_shadowed_by_literals() {
        let prog = program("5: nop 5");
        assert_eq!(prog.memory(), &[1280, 5]);
        assert_eq!(prog.label("5"), Some(0));
    }

    #[test]
    fn finish_reports_in_first_reference_order() {
        let image = program("$b\na c b").finish();
        let undefined: Vec<_> = image
            .undefined_labels()
            .iter()
            .map(|l| (l.as_ref().value().clone(), l.loc().map(|loc| (loc.line(), loc.col()))))
            .collect();
        assert_eq!(
            undefined,
            vec![
                (String::from("b"), Some((1, 1))),
                (String::from("a"), Some((2, 1))),
                (String::from("c"), Some((2, 3))),
            ]
        );
    }
}
