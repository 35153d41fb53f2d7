use crate::spec::types::hw::{bytes_to_words, Byte, Word, WORD_BYTES};
use std::fmt::Display;

#[derive(Debug, Clone, Copy, Default)]
pub struct LogLevel {
    pub internals: bool,
    pub stores: bool,
}

#[derive(Debug, PartialEq, Eq)]
pub enum LoadError {
    Parity(usize),
    Decimal { index: usize, token: String },
}

impl Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadError::Parity(len) => write!(
                f,
                "Binary length {} is not a multiple of the {} byte word size",
                len, WORD_BYTES
            ),
            LoadError::Decimal { index, token } => {
                write!(f, "Word {} is not a decimal integer: '{}'", index, token)
            }
        }
    }
}

impl std::error::Error for LoadError {}

pub fn load_binary(bytes: &[Byte]) -> Result<Vec<Word>, LoadError> {
    bytes_to_words(bytes).ok_or_else(|| LoadError::Parity(bytes.len()))
}

/// Loads an image written as whitespace separated decimal words.
pub fn load_decimal(text: &str) -> Result<Vec<Word>, LoadError> {
    text.split_ascii_whitespace()
        .enumerate()
        .map(|(index, token)| {
            token.parse::<Word>().map_err(|_| LoadError::Decimal {
                index,
                token: token.to_owned(),
            })
        })
        .collect()
}
