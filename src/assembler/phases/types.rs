use derive_more::Constructor;
use std::fmt::Display;

/*
    Phases:

        1.  Tokenization: Each line of the source is stripped of its `;` comment and split at
            runs of whitespace. This is lazy, tokens are produced as the later phases ask for them.

        2.  Classification: Each token is turned into a `Statement` on its own, without looking
            at its neighbours. The first rule which matches wins:

                an instruction mnemonic             `.`, `-`, `|`, `@`, `!`, `nop`
                an immediate reference              `$` followed by a number or a label name
                a label definition                  a name followed by `:`
                a plain reference                   anything else, a number or a label name

        3.  Resolution: Statements are assembled in order into the memory image. A reference to
            a label which has not been defined yet leaves a zero placeholder and a `Relocation`
            behind; when the label is later defined every relocation waiting on it is patched
            and forgotten. There is no second scan over the source.

        4.  Output: Once the token stream is exhausted the image is frozen. Labels still waiting
            for a definition are reported and their placeholders stay zero.
*/

pub type LabelName = String;

#[derive(Debug, PartialEq, Clone, Copy, Eq, Constructor)]
pub struct Loc {
    line: usize,
    col: usize,
}

impl Loc {
    pub fn line(&self) -> usize {
        self.line
    }

    pub fn col(&self) -> usize {
        self.col
    }
}

#[derive(Debug, PartialEq, Clone, Eq)]
pub struct Located<T: Sized> {
    loc: Option<Loc>,
    val: T,
}

impl Display for Loc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(line: {}, col: {})", self.line, self.col)
    }
}

impl<T: Display> Display for Located<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.loc {
            None => write!(f, "@<unknown location>: {}", self.val),
            Some(loc) => write!(f, "@{}: {}", loc, self.val),
        }
    }
}

impl<T> Located<T> {
    fn new(loc: Option<Loc>, val: T) -> Self {
        Located { loc, val }
    }

    pub fn with_loc(loc: Loc, val: T) -> Self {
        Located::new(Some(loc), val)
    }

    pub fn loc(&self) -> Option<Loc> {
        self.loc
    }

    pub fn value(self) -> T {
        self.val
    }

    pub fn as_ref(&self) -> Located<&T> {
        Located::new(self.loc, &self.val)
    }
}

impl<T> From<T> for Located<T> {
    fn from(val: T) -> Self {
        Located { loc: None, val }
    }
}

#[derive(Debug)]
pub enum Error {
    UndefinedLabels(Vec<Located<LabelName>>),
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Assembly Error (in Resolver): ")?;
        match self {
            Error::UndefinedLabels(labels) => {
                write!(f, "{} undefined label(s):", labels.len())?;
                for label in labels {
                    write!(f, " '{}' {}", label.as_ref().value(), describe_loc(label.loc()))?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for Error {}

pub(crate) fn describe_loc(loc: Option<Loc>) -> String {
    match loc {
        None => String::from("@<unknown location>"),
        Some(loc) => format!("@{}", loc),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn located_display() {
        assert_eq!(
            format!("{}", Located::with_loc(Loc::new(3, 7), "loop")),
            "@(line: 3, col: 7): loop"
        );
        assert_eq!(format!("{}", Located::from("loop")), "@<unknown location>: loop");
    }

    #[test]
    fn undefined_labels_error_names_each_label() {
        let err = Error::UndefinedLabels(vec![
            Located::with_loc(Loc::new(1, 2), String::from("a")),
            Located::from(String::from("b")),
        ]);
        assert_eq!(
            err.to_string(),
            "Assembly Error (in Resolver): 2 undefined label(s): \
             'a' @(line: 1, col: 2) 'b' @<unknown location>"
        );
    }
}
