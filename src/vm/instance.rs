use super::{mem::Mem, types::LogLevel};
use crate::assembler::disasm::disassemble;
use crate::spec::types::hw::{
    sign_extend, Address, Opcode, Word, IMMEDIATE_FLAG, MEMORY_SIZE, WORD_MASK,
};
use ansi_term::Color;
use enum_map::EnumMap;
use std::fmt::Display;
use strum_macros::Display;

#[derive(Debug, Display, PartialEq, Eq, Clone, Copy)]
pub enum State {
    Running,
    Halted,
    Aborted,
}

pub struct Instance<'a> {
    log_level: &'a LogLevel,
    state: State,
    total_clocks: u64,

    p: Address,
    a: Word,
    x: Word,
    i: Word,
    mem: Mem,

    last_jump: Option<(Address, Word, Word)>,
    stored_since_jump: bool,
    last_store: Option<(Address, Word)>,

    immediates: u64,
    counts: EnumMap<Opcode, u64>,
}

impl<'a> Display for Instance<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "P/I: {:#05X}/{:#05X} ({})",
            self.p,
            self.i,
            disassemble(self.i)
        )?;
        writeln!(f, "A:   {:#05X} X:   {:#05X}", self.a, self.x)?;
        write!(f, "{}", self.mem)
    }
}

impl<'a> Instance<'a> {
    pub fn new(log_level: &'a LogLevel, prog: &[Word]) -> Self {
        Self {
            log_level,
            state: State::Running,
            total_clocks: 0,

            p: 0,
            a: 0,
            x: 0,
            i: 0,
            mem: Mem::new(prog),

            last_jump: None,
            stored_since_jump: false,
            last_store: None,

            immediates: 0,
            counts: EnumMap::default(),
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn total_clocks(&self) -> u64 {
        self.total_clocks
    }

    pub fn pc(&self) -> Address {
        self.p
    }

    pub fn a(&self) -> Word {
        self.a
    }

    pub fn x(&self) -> Word {
        self.x
    }

    pub fn load(&self, addr: Address) -> Word {
        self.mem.load(addr)
    }

    pub fn last_store(&self) -> Option<(Address, Word)> {
        self.last_store
    }

    pub fn immediates(&self) -> u64 {
        self.immediates
    }

    pub fn counts(&self) -> &EnumMap<Opcode, u64> {
        &self.counts
    }

    pub fn step(&mut self) {
        if self.state != State::Running {
            panic!("cpu not running!");
        }

        self.total_clocks += 1;

        let at = self.p;
        self.i = self.mem.load(self.p);
        self.p = (self.p + 1) % MEMORY_SIZE;

        if self.log_level.internals {
            println!("[{:#05X}] {}", at, disassemble(self.i));
        }

        if self.i & IMMEDIATE_FLAG != 0 {
            self.immediates += 1;
            self.x = self.a;
            self.a = sign_extend(self.i);
            return;
        }

        match Opcode::decode(self.i) {
            Some(op) => {
                self.counts[op] += 1;
                self.execute(op);
            }
            None => {
                log::warn!("invalid opcode in {:#05X} at {:#05X}", self.i, at);
                self.state = State::Aborted;
            }
        }
    }

    fn execute(&mut self, op: Opcode) {
        match op {
            Opcode::Jump => {
                if self.x & IMMEDIATE_FLAG != 0 {
                    self.a = self.x;
                } else {
                    let target = self.a;
                    self.a = self.p as Word;
                    self.p = target.rem_euclid(MEMORY_SIZE as Word) as Address;
                    self.note_jump();
                }
            }
            Opcode::Subtract => self.a = self.x.wrapping_sub(self.a) & WORD_MASK,
            Opcode::Nand => self.a = !(self.a & self.x),
            Opcode::Fetch => self.a = self.mem.load(Mem::mask(self.a)),
            Opcode::Store => self.store(Mem::mask(self.a), self.x),
            Opcode::Nop => (),
        }
    }

    fn store(&mut self, addr: Address, val: Word) {
        if self.log_level.stores {
            println!(
                "{} {}",
                Color::Cyan.paint(format!("mem[{}] ←", addr)),
                val
            );
        }

        self.mem.store(addr, val);
        self.last_store = Some((addr, val));
        self.stored_since_jump = true;
    }

    // Two identical jumps with no store in between mean the CPU will repeat itself forever.
    fn note_jump(&mut self) {
        let snapshot = (self.p, self.a, self.x);
        if !self.stored_since_jump && self.last_jump == Some(snapshot) {
            log::debug!("idle loop at {:#05X}, halting", self.p);
            self.state = State::Halted;
        }

        self.last_jump = Some(snapshot);
        self.stored_since_jump = false;
    }

    /// Runs until the CPU stops or `max_clocks` instructions have executed
    /// in this call, whichever is first.
    pub fn run(&mut self, max_clocks: Option<u64>) -> State {
        let mut clocks = 0;
        while self.state == State::Running {
            if let Some(max_clocks) = max_clocks {
                if clocks >= max_clocks {
                    break;
                }
            }

            self.step();
            clocks += 1;
        }

        self.state
    }
}
