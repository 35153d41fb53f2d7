use super::suite;
use crate::spec::types::hw::Word;
use crate::{assembler, assets, vm};
use ansi_term::Color::{Green, Red, Yellow};
use anyhow::Context;
use std::ffi::OsString;
use std::io::{Read, Write};
use std::{
    fmt::Display,
    path::{Path, PathBuf},
    str::FromStr,
    time::Instant,
};
use structopt::StructOpt;
use strum::IntoEnumIterator;

const STDIO_PATH: &str = "-";

#[cfg(windows)]
pub fn terminal_init() {
    logger_init();
    if ansi_term::enable_ansi_support().is_err() {
        log::warn!("Could not enable terminal ANSI support");
    }
}

#[cfg(not(windows))]
pub fn terminal_init() {
    logger_init();
}

fn logger_init() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp(None)
        .init();
}

#[derive(StructOpt, Debug)]
#[structopt(name = "cavo")]
pub enum CommandRoot {
    Asm(SubcommandAsm),
    Vm(SubcommandVm),
    Run(SubcommandRun),
    Suite(SubcommandSuite),
}

/// Assembles a source file into a flat big-endian memory image.
#[derive(StructOpt, Debug)]
#[structopt(name = "casm")]
pub struct SubcommandAsm {
    /// Source file, `-` or nothing for stdin
    #[structopt(name = "in.cas", parse(from_os_str))]
    in_src: Option<PathBuf>,

    /// Image file, `-` for stdout
    #[structopt(name = "out.cb", parse(from_os_str))]
    out_bin: Option<PathBuf>,

    /// Print a listing of the image to stderr
    #[structopt(short, long)]
    listing: bool,

    /// Fail instead of warning when a label is never defined
    #[structopt(long)]
    deny_undefined: bool,
}

#[derive(StructOpt, Debug)]
struct VmOpts {
    #[structopt(short, long, name = "max-clocks")]
    max_clocks: Option<ClockLimit>,

    /// Trace every instruction
    #[structopt(short, long)]
    verbose: bool,

    /// Do not report stores
    #[structopt(short, long)]
    quiet: bool,
}

impl VmOpts {
    fn log_level(&self) -> vm::LogLevel {
        vm::LogLevel {
            internals: self.verbose,
            stores: !self.quiet,
        }
    }
}

/// Runs a memory image.
#[derive(StructOpt, Debug)]
#[structopt(name = "cavo-vm")]
pub struct SubcommandVm {
    #[structopt(flatten)]
    vm_opts: VmOpts,

    /// Read the image as whitespace separated decimal words
    #[structopt(short, long)]
    decimal: bool,

    #[structopt(name = "prog.cb", parse(from_os_str))]
    in_prog_bin: PathBuf,
}

/// Assembles a source file and runs it.
#[derive(StructOpt, Debug)]
pub struct SubcommandRun {
    #[structopt(flatten)]
    vm_opts: VmOpts,

    #[structopt(name = "prog.cas", parse(from_os_str))]
    in_prog_src: PathBuf,
}

/// Runs every program in a directory, each must halt.
#[derive(StructOpt, Debug)]
pub struct SubcommandSuite {
    #[structopt(name = "suite/dir", parse(from_os_str))]
    suite_dir: Option<PathBuf>,

    #[structopt(short, long, parse(from_os_str))]
    only: Option<OsString>,

    #[structopt(short, long, name = "max-clocks")]
    max_clocks: Option<ClockLimit>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockLimit(Option<u64>);

impl Display for ClockLimit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            self.0.map(|lim| lim.to_string()).as_deref().unwrap_or("∞")
        )
    }
}

impl FromStr for ClockLimit {
    type Err = <u64 as FromStr>::Err;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("unlimited") || s.eq_ignore_ascii_case("infinity") || s.eq("∞")
        {
            Ok(ClockLimit(None))
        } else {
            Ok(ClockLimit(Some(u64::from_str(s)?)))
        }
    }
}

impl Default for ClockLimit {
    fn default() -> Self {
        ClockLimit(Some(1_000_000))
    }
}

impl ClockLimit {
    pub fn into_option(self) -> Option<u64> {
        self.0
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Summary {
    pub state: vm::State,
    pub total_clocks: u64,
    pub real_ns_elapsed: u128,
}

pub fn execute(prog: &[Word], log_level: &vm::LogLevel, max_clocks: Option<u64>) -> Summary {
    let mut inst = vm::Instance::new(log_level, prog);

    let start = Instant::now();
    let state = inst.run(max_clocks);

    Summary {
        state,
        total_clocks: inst.total_clocks(),
        real_ns_elapsed: start.elapsed().as_nanos(),
    }
}

fn is_stdio(path: &Path) -> bool {
    path == Path::new(STDIO_PATH)
}

fn read_source(path: Option<&Path>) -> anyhow::Result<Vec<u8>> {
    match path {
        None => {
            let mut source = Vec::new();
            std::io::stdin()
                .read_to_end(&mut source)
                .context("Failed to read source from stdin")?;
            Ok(source)
        }
        Some(path) => {
            std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))
        }
    }
}

pub fn assemble_path(path: &Path) -> anyhow::Result<assembler::Image> {
    Ok(assembler::assemble_lossy(&read_source(Some(path))?))
}

fn default_out_path(in_src: &Path) -> anyhow::Result<PathBuf> {
    let stem = in_src
        .file_stem()
        .with_context(|| format!("Cannot derive an output name from {}", in_src.display()))?;
    Ok(PathBuf::from(stem).with_extension(assets::BINARY_EXT))
}

fn exit_with(result: anyhow::Result<i32>) -> ! {
    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{} {:#}", Red.bold().paint("error:"), err);
            std::process::exit(2)
        }
    }
}

pub fn root(cmd: CommandRoot) -> ! {
    match cmd {
        CommandRoot::Asm(scmd) => asm(scmd),
        CommandRoot::Vm(scmd) => vm(scmd),
        CommandRoot::Run(scmd) => run(scmd),
        CommandRoot::Suite(scmd) => suite(scmd),
    };
}

fn asm_inner(cmd: SubcommandAsm) -> anyhow::Result<i32> {
    let in_src = cmd.in_src.filter(|path| !is_stdio(path));
    let image = assembler::assemble_lossy(&read_source(in_src.as_deref())?);

    if cmd.listing {
        eprintln!("{}", image.listing());
    }

    let image = if cmd.deny_undefined {
        image.deny_undefined()?
    } else {
        image
    };

    let out_name = match (cmd.out_bin, &in_src) {
        (Some(out_bin), _) if is_stdio(&out_bin) => None,
        (Some(out_bin), _) => Some(out_bin),
        (None, Some(in_src)) => Some(default_out_path(in_src)?),
        (None, None) => None,
    };

    match out_name {
        None => {
            let stdout = std::io::stdout();
            image
                .dump(&mut stdout.lock())
                .context("Failed to write image to stdout")?;
        }
        Some(out_name) => {
            let mut file = std::io::BufWriter::new(
                std::fs::File::create(&out_name)
                    .with_context(|| format!("Failed to create {}", out_name.display()))?,
            );
            image
                .dump(&mut file)
                .with_context(|| format!("Failed to write {}", out_name.display()))?;
            file.flush()?;
        }
    }

    Ok(0)
}

pub fn asm(cmd: SubcommandAsm) -> ! {
    exit_with(asm_inner(cmd))
}

fn vm_inner(cmd: SubcommandVm) -> anyhow::Result<i32> {
    let bytes = std::fs::read(&cmd.in_prog_bin)
        .with_context(|| format!("Failed to read {}", cmd.in_prog_bin.display()))?;
    let prog = if cmd.decimal {
        vm::load_decimal(&String::from_utf8_lossy(&bytes))
    } else {
        vm::load_binary(&bytes)
    }
    .with_context(|| format!("Failed to load {}", cmd.in_prog_bin.display()))?;

    Ok(run_prog_with_opts(&prog, &cmd.vm_opts))
}

pub fn vm(cmd: SubcommandVm) -> ! {
    exit_with(vm_inner(cmd))
}

fn run_inner(cmd: SubcommandRun) -> anyhow::Result<i32> {
    let image = assemble_path(&cmd.in_prog_src)?;
    image.warn_undefined_labels();

    Ok(run_prog_with_opts(image.words(), &cmd.vm_opts))
}

pub fn run(cmd: SubcommandRun) -> ! {
    exit_with(run_inner(cmd))
}

pub fn suite(cmd: SubcommandSuite) -> ! {
    let success = suite::run_suite(
        &cmd.suite_dir.unwrap_or_else(assets::default_suite_dir),
        cmd.only.as_ref(),
        cmd.max_clocks.unwrap_or_default().into_option(),
    );

    exit_with(success.map(|success| if success { 0 } else { 1 }))
}

fn state_to_exit_code(state: vm::State) -> i32 {
    match state {
        vm::State::Halted => 0,
        _ => 1,
    }
}

fn run_prog_with_opts(prog: &[Word], opts: &VmOpts) -> i32 {
    let log_level = opts.log_level();
    let mut inst = vm::Instance::new(&log_level, prog);
    let state = inst.run(opts.max_clocks.unwrap_or_default().into_option());

    let painted = match state {
        vm::State::Halted => Green.bold().paint(state.to_string()),
        vm::State::Running => Yellow.bold().paint("TIMEOUT"),
        vm::State::Aborted => Red.bold().paint(state.to_string()),
    };
    eprintln!("{} after {} clocks", painted, inst.total_clocks());

    if opts.verbose {
        eprintln!("{}", inst);
        if let Some((addr, val)) = inst.last_store() {
            eprintln!("last store: mem[{}] ← {}", addr, val);
        }
        eprintln!("immediates: {}", inst.immediates());
        for op in crate::spec::types::hw::Opcode::iter() {
            eprintln!("{:>10}: {}", op.to_string(), inst.counts()[op]);
        }
    }

    state_to_exit_code(state)
}
