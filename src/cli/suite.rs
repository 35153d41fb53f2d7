use super::command::{self, Summary};
use crate::{assembler, vm};
use ansi_term::Color::{Green, Red};
use anyhow::Context;
use derive_more::Constructor;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

#[derive(Constructor)]
struct UnitSrc {
    name: OsString,
    prog_src: PathBuf,
}

enum Outcome {
    Assembly(assembler::Error),
    Ran(Summary),
}

impl UnitSrc {
    fn execute(&self, max_clocks: Option<u64>) -> anyhow::Result<Outcome> {
        let source = std::fs::read(&self.prog_src)
            .with_context(|| format!("Failed to read {}", self.prog_src.display()))?;

        Ok(match assembler::assemble_lossy(&source).deny_undefined() {
            Err(err) => Outcome::Assembly(err),
            Ok(image) => Outcome::Ran(command::execute(
                image.words(),
                &vm::LogLevel::default(),
                max_clocks,
            )),
        })
    }
}

pub fn run_suite(
    suite_dir: &Path,
    only_this: Option<&OsString>,
    max_clocks: Option<u64>,
) -> anyhow::Result<bool> {
    let all_units = find_units(suite_dir)?;

    let mut selected_units = match only_this {
        None => all_units,
        Some(only_this) => vec![all_units
            .into_iter()
            .find(|unit| &unit.name == only_this)
            .with_context(|| {
                format!(
                    "No unit named '{}' in {}",
                    only_this.to_string_lossy(),
                    suite_dir.display()
                )
            })?],
    };

    selected_units.sort_unstable_by(|unit1, unit2| unit1.name.cmp(&unit2.name));

    run_units(&suite_dir.to_string_lossy(), max_clocks, &selected_units)
}

fn find_file_unit(path: &Path) -> Option<UnitSrc> {
    if !path.extension().map_or(false, |ext| ext == crate::assets::SOURCE_EXT) {
        return None;
    }

    Some(UnitSrc::new(path.file_stem()?.to_owned(), PathBuf::from(path)))
}

fn find_units(suite_dir: &Path) -> anyhow::Result<Vec<UnitSrc>> {
    let mut units = Vec::new();
    let entries = suite_dir
        .read_dir()
        .with_context(|| format!("Failed to read suite directory {}", suite_dir.display()))?;

    for entry in entries {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            units.extend(find_file_unit(&entry.path()));
        }
    }

    Ok(units)
}

fn run_units(name: &str, max_clocks: Option<u64>, units: &[UnitSrc]) -> anyhow::Result<bool> {
    let name_pad = units.iter().map(|unit| unit.name.len()).max().unwrap_or(0);

    println!("Running suite: '{}' ({} units)", name, units.len());
    println!("{:-<line_len$}", "", line_len = name_pad + 45);

    let mut passes = 0;
    for (num, unit) in units.iter().enumerate() {
        if run_unit(unit, num + 1, name_pad, max_clocks)? {
            passes += 1;
        }
    }
    let success = passes == units.len();

    println!("{:-<line_len$}", "", line_len = name_pad + 45);
    println!(
        "Suite Result: {}, {}/{} passes",
        if success {
            Green.bold().paint("SUCCESS")
        } else {
            Red.bold().paint("FAILED")
        },
        passes,
        units.len()
    );

    Ok(success)
}

fn run_unit(
    src: &UnitSrc,
    num: usize,
    name_pad: usize,
    max_clocks: Option<u64>,
) -> anyhow::Result<bool> {
    let (success, msg) = match src.execute(max_clocks)? {
        Outcome::Assembly(err) => (
            false,
            format!(
                "{}:\n\t{}",
                Red.bold().paint("FAIL: ASSEMBLY ERROR"),
                err.to_string().replace("\n", "\n\t")
            ),
        ),
        Outcome::Ran(summary) => {
            let msg = match summary.state {
                vm::State::Running => format!(
                    "{} after {} clocks",
                    Red.bold().paint("FAIL: DETERMINISTIC TIMEOUT"),
                    summary.total_clocks,
                ),
                vm::State::Halted => format!(
                    "{} {:7 } clocks {: >4}ms",
                    Green.bold().paint("PASS"),
                    summary.total_clocks,
                    summary.real_ns_elapsed / 1000 / 1000,
                ),
                vm::State::Aborted => format!("{}", Red.bold().paint("FAIL: ABORTED")),
            };

            (summary.state == vm::State::Halted, msg)
        }
    };

    println!(
        "Unit {:2 }: {} {}{}",
        num,
        src.name.to_string_lossy(),
        " ".repeat(name_pad - src.name.len()),
        msg
    );

    Ok(success)
}
