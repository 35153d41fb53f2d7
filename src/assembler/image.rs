use super::disasm::disassemble;
use super::phases::types::{describe_loc, Error, LabelName, Located};
use crate::spec::types::hw::{words_to_bytes, Address, Byte, Word};
use itertools::Itertools;
use std::collections::HashMap;
use std::io::Write;

/// The finished output of an assembly run.
#[derive(Debug)]
pub struct Image {
    words: Vec<Word>,
    labels: HashMap<LabelName, Address>,
    undefined: Vec<Located<LabelName>>,
}

impl Image {
    pub(super) fn new(
        words: Vec<Word>,
        labels: HashMap<LabelName, Address>,
        undefined: Vec<Located<LabelName>>,
    ) -> Self {
        Image {
            words,
            labels,
            undefined,
        }
    }

    pub fn words(&self) -> &[Word] {
        &self.words
    }

    pub fn into_words(self) -> Vec<Word> {
        self.words
    }

    pub fn label(&self, name: &str) -> Option<Address> {
        self.labels.get(name).copied()
    }

    /// Labels which were referenced but never defined, each located at its
    /// first reference. Their placeholders hold zero.
    pub fn undefined_labels(&self) -> &[Located<LabelName>] {
        &self.undefined
    }

    pub fn deny_undefined(self) -> Result<Self, Error> {
        if self.undefined.is_empty() {
            Ok(self)
        } else {
            Err(Error::UndefinedLabels(self.undefined))
        }
    }

    /// One line per undefined label, in first-reference order.
    pub fn diagnostics(&self) -> Vec<String> {
        self.undefined
            .iter()
            .map(|label| {
                format!(
                    "label '{}' undefined (first referenced {})",
                    label.as_ref().value(),
                    describe_loc(label.loc())
                )
            })
            .collect()
    }

    pub fn warn_undefined_labels(&self) {
        for line in self.diagnostics() {
            log::warn!("{}", line);
        }
    }

    pub fn to_bytes(&self) -> Vec<Byte> {
        words_to_bytes(&self.words)
    }

    pub fn dump(&self, out: &mut impl Write) -> std::io::Result<()> {
        self.warn_undefined_labels();
        out.write_all(&self.to_bytes())?;
        out.flush()
    }

    pub fn listing(&self) -> String {
        let mut by_addr: HashMap<Address, Vec<&str>> = HashMap::new();
        for (label, addr) in &self.labels {
            by_addr.entry(*addr).or_default().push(label);
        }

        let label_column = |addr: Address| {
            by_addr
                .get(&addr)
                .map(|labels| labels.iter().sorted().map(|l| format!("{}:", l)).join(" "))
                .unwrap_or_default()
        };

        let mut lines = self
            .words
            .iter()
            .enumerate()
            .map(|(addr, w)| {
                format!(
                    "{:04X}: {:08X}  {:<8} {}",
                    addr,
                    w,
                    disassemble(*w).to_string(),
                    label_column(addr)
                )
                .trim_end()
                .to_owned()
            })
            .collect::<Vec<_>>();

        // Labels bound past the last word, e.g. a trailing `end:`.
        let trailing = label_column(self.words.len());
        if !trailing.is_empty() {
            lines.push(format!("{:04X}:                    {}", self.words.len(), trailing));
        }

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use crate::assembler::assemble;

    #[test]
    fn dump_writes_big_endian_words_only() {
        let image = assemble("nop $missing");
        let mut out = Vec::new();
        image.dump(&mut out).unwrap();
        assert_eq!(out, vec![0, 0, 5, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn one_diagnostic_per_undefined_label() {
        let image = assemble("$b a\n  b a: $c");
        assert_eq!(
            image.diagnostics(),
            vec![
                "label 'b' undefined (first referenced @(line: 1, col: 1))",
                "label 'c' undefined (first referenced @(line: 2, col: 8))",
            ]
        );
        assert!(assemble("x: $x").diagnostics().is_empty());
    }

    #[test]
    fn deny_undefined() {
        assert!(assemble("a: a").deny_undefined().is_ok());
        assert!(assemble("b").deny_undefined().is_err());
    }

    #[test]
    fn listing() {
        let image = assemble("start: $5 $end . end:");
        assert_eq!(
            image.listing(),
            "0000: 00000805  $5       start:\n\
             0001: 00000803  $3\n\
             0002: 00000000  .\n\
             0003:                    end:"
        );
    }
}
