use derive_more::Display;
use enum_map::Enum;
use num_derive::FromPrimitive;
use static_assertions::const_assert;
use std::convert::TryInto;
use strum_macros::EnumIter;

pub type Byte = u8;

/// Storage type of a machine word. Only the bottom `WORD_WIDTH` bits are
/// meaningful to the CPU, but assembled words are not truncated.
pub type Word = i32;

pub type Address = usize;

pub const WORD_WIDTH: u32 = 12;
pub const WORD_BYTES: usize = std::mem::size_of::<Word>();

pub const fn bit(n: u32) -> Word {
    1 << n
}

pub const fn ones(n: u32) -> Word {
    bit(n) - 1
}

pub const IMMEDIATE_FLAG: Word = bit(WORD_WIDTH - 1);
pub const IMMEDIATE_PAYLOAD: Word = ones(WORD_WIDTH - 1);
pub const OPCODE_SHIFT: u32 = WORD_WIDTH - 4;
pub const OPCODE_MASK: Word = ones(WORD_WIDTH - 1) & !ones(OPCODE_SHIFT);
pub const WORD_MASK: Word = ones(WORD_WIDTH);

pub const MEMORY_SIZE: usize = 1 << (WORD_WIDTH - 1);
pub const ADDRESS_MASK: Word = ones(WORD_WIDTH - 1);

const_assert!(WORD_WIDTH < 32);
const_assert!(OPCODE_MASK == 0x700);
const_assert!(IMMEDIATE_FLAG == 0x800);

/// Interprets the immediate payload of `w` as a signed `WORD_WIDTH - 1` bit
/// value, replicated into the flag bit the way the CPU latches it.
pub const fn sign_extend(w: Word) -> Word {
    ((w & bit(WORD_WIDTH - 2)) << 1) | (w & IMMEDIATE_PAYLOAD)
}

pub fn words_to_bytes(v: &[Word]) -> Vec<Byte> {
    v.iter().flat_map(|w| w.to_be_bytes().to_vec()).collect()
}

// Returns none if the data is not a whole number of words.
pub fn bytes_to_words(bytes: &[Byte]) -> Option<Vec<Word>> {
    let chunks = bytes.chunks_exact(WORD_BYTES);
    if !chunks.remainder().is_empty() {
        return None;
    }

    chunks
        .map(|ch| ch.try_into().ok().map(Word::from_be_bytes))
        .collect()
}

/// Parses an optionally signed base-10 integer of any length, keeping the
/// value modulo 2^32. Anything else (hex, underscores, empty digits) is `None`.
pub fn parse_word_wrapping(text: &str) -> Option<Word> {
    let (negative, digits) = match *text.as_bytes().first()? {
        b'-' => (true, &text[1..]),
        b'+' => (false, &text[1..]),
        _ => (false, text),
    };

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let magnitude = digits.bytes().fold(0 as Word, |acc, b| {
        acc.wrapping_mul(10).wrapping_add(Word::from(b - b'0'))
    });

    Some(if negative {
        magnitude.wrapping_neg()
    } else {
        magnitude
    })
}

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, FromPrimitive, Enum, EnumIter)]
pub enum Opcode {
    #[display(fmt = ".")]
    Jump = 0,
    #[display(fmt = "-")]
    Subtract = 1,
    #[display(fmt = "|")]
    Nand = 2,
    #[display(fmt = "@")]
    Fetch = 3,
    #[display(fmt = "!")]
    Store = 4,
    #[display(fmt = "nop")]
    Nop = 5,
}

impl Opcode {
    pub const fn encode(self) -> Word {
        (self as Word) << OPCODE_SHIFT
    }

    pub fn decode(w: Word) -> Option<Opcode> {
        num_traits::FromPrimitive::from_i32((w & OPCODE_MASK) >> OPCODE_SHIFT)
    }
}
