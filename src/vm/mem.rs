use crate::spec::types::hw::{Address, Word, ADDRESS_MASK, MEMORY_SIZE};
use std::fmt::Display;

pub struct Mem {
    data: Vec<Word>,
}

impl Display for Mem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let used = self.data.iter().filter(|w| **w != 0).count();
        write!(f, "MEM: {}/{} nonzero words", used, self.data.len())
    }
}

impl Mem {
    pub fn new(prog: &[Word]) -> Mem {
        if prog.len() > MEMORY_SIZE {
            log::warn!(
                "program is {} words long, only the first {} are loaded",
                prog.len(),
                MEMORY_SIZE
            );
        }

        let mut data = vec![0; MEMORY_SIZE];
        for (slot, w) in data.iter_mut().zip(prog) {
            *slot = *w;
        }
        Mem { data }
    }

    pub const fn mask(addr: Word) -> Address {
        (addr & ADDRESS_MASK) as Address
    }

    pub fn load(&self, addr: Address) -> Word {
        self.data[addr % MEMORY_SIZE]
    }

    pub fn store(&mut self, addr: Address, val: Word) {
        self.data[addr % MEMORY_SIZE] = val;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oversized_programs_are_truncated() {
        let prog: Vec<Word> = (0..(MEMORY_SIZE as Word + 10)).collect();
        let mem = Mem::new(&prog);
        assert_eq!(mem.load(MEMORY_SIZE - 1), MEMORY_SIZE as Word - 1);
        assert_eq!(mem.load(0), 0);
        assert_eq!(mem.load(5), 5);
    }

    #[test]
    fn addresses_are_masked_to_eleven_bits() {
        assert_eq!(Mem::mask(0x805), 5);
        assert_eq!(Mem::mask(-1), 0x7FF);
    }
}
