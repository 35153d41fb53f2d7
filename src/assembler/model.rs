use crate::spec::types::hw::{Address, Word, IMMEDIATE_FLAG, IMMEDIATE_PAYLOAD};

/// How a resolved value is turned into the word stored in the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Immediate,
    Normal,
}

impl Encoding {
    pub fn encode(self, value: Word) -> Word {
        match self {
            Encoding::Immediate => encode_immediate(value),
            Encoding::Normal => encode_normal(value),
        }
    }

    pub fn encode_address(self, addr: Address) -> Word {
        self.encode(addr as Word)
    }
}

pub const fn encode_normal(value: Word) -> Word {
    value
}

/// Keeps the low bits of `value` and marks the word as an immediate,
/// whatever the sign or magnitude of `value`.
pub const fn encode_immediate(value: Word) -> Word {
    (value & IMMEDIATE_PAYLOAD) | IMMEDIATE_FLAG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normal_is_unmasked() {
        assert_eq!(encode_normal(5), 5);
        assert_eq!(encode_normal(-1), -1);
        assert_eq!(encode_normal(0x12345), 0x12345);
    }

    #[test]
    fn immediate_masks_and_flags() {
        assert_eq!(encode_immediate(0), 0x800);
        assert_eq!(encode_immediate(2), 0x802);
        assert_eq!(encode_immediate(0x7FF), 0xFFF);
        assert_eq!(encode_immediate(0x800), 0x800);
        assert_eq!(encode_immediate(-1), 0xFFF);
        assert_eq!(encode_immediate(-2048), 0x800);
    }

    #[test]
    fn immediate_property_over_range() {
        for v in -5000..5000 {
            assert_eq!(Encoding::Immediate.encode(v), (v & 0x7FF) | 0x800);
            assert_eq!(Encoding::Normal.encode(v), v);
        }
    }
}
