use cavo::assembler;
use cavo::spec::types::hw::Word;
use cavo::vm::{Instance, LogLevel, State};

pub fn run_test(prog_src: &str) -> Vec<Word> {
    let image = assembler::assemble(prog_src)
        .deny_undefined()
        .expect("test program has undefined labels");

    let log_level = LogLevel::default();
    let mut vm = Instance::new(&log_level, image.words());
    assert_eq!(vm.run(Some(5_000_000)), State::Halted);

    (0..image.words().len()).map(|addr| vm.load(addr)).collect()
}
